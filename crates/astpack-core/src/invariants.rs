//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::{Decl, DeclContext, DeclHandle, IdentHandle, IdentifierInfo, Program};

impl Program {
    pub(crate) fn ensure_decl_mut(&mut self, handle: DeclHandle) -> &mut Decl {
        self.decls
            .get_mut(handle.index())
            .unwrap_or_else(|| panic!("ProgramBuilder: {handle} was not created by this builder"))
    }

    pub(crate) fn ensure_context_mut(&mut self, handle: DeclHandle) -> &mut DeclContext {
        let decl = self.ensure_decl_mut(handle);
        let kind = decl.kind.kind_name();
        decl.decl_context
            .as_mut()
            .unwrap_or_else(|| panic!("ProgramBuilder: {handle} ({kind}) is not a declaration context"))
    }

    pub(crate) fn ensure_ident_mut(&mut self, handle: IdentHandle) -> &mut IdentifierInfo {
        self.identifiers
            .get_mut(handle)
            .unwrap_or_else(|| panic!("ProgramBuilder: {handle} was not created by this builder"))
    }
}
