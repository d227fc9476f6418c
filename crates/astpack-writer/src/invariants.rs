//! Session invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use astpack_core::{DeclHandle, TypeHandle};

use crate::error::{Category, EmitError, Result};
use crate::session::Session;

impl Session<'_> {
    pub(crate) fn ensure_type_id(&self, handle: TypeHandle) -> Result<u32> {
        self.ids
            .types
            .get(handle)
            .ok_or(EmitError::UnassignedType(handle))
    }

    pub(crate) fn ensure_decl_id(&self, handle: DeclHandle) -> Result<u32> {
        self.ids
            .decls
            .get(handle)
            .ok_or(EmitError::UnassignedDecl(handle))
    }

    /// Nothing may be queued once the fixed point has been left.
    pub(crate) fn ensure_drained(&self) -> Result<()> {
        if self.ids.types.has_pending() {
            return Err(EmitError::QueueNotDrained {
                category: Category::Type,
                remaining: self.ids.types.pending_len(),
            });
        }
        if self.ids.decls.has_pending() {
            return Err(EmitError::QueueNotDrained {
                category: Category::Decl,
                remaining: self.ids.decls.pending_len(),
            });
        }
        Ok(())
    }

    pub(crate) fn ensure_offset_coverage(&self) -> Result<()> {
        self.ensure_drained()?;
        self.type_offsets.check_coverage(self.ids.types.len())?;
        self.decl_offsets.check_coverage(self.ids.decls.len())
    }
}
