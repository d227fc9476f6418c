//! Per-category offset tables.

use astpack_bitstream::HashTableError;
use astpack_bitstream::io::{emit_u32, emit_u64};

use crate::error::{Category, EmitError, Result};

/// Dense `id - first_id → offset` array.
///
/// Offsets are bit positions for types and declarations and byte offsets
/// into a hash-table blob for identifiers and selectors. Zero marks a slot
/// that has not been recorded yet.
#[derive(Debug, Clone)]
pub struct OffsetIndex {
    category: Category,
    first_id: u32,
    offsets: Vec<u64>,
}

impl OffsetIndex {
    pub fn new(category: Category, first_id: u32) -> Self {
        Self {
            category,
            first_id,
            offsets: Vec::new(),
        }
    }

    /// Record `offset` for `id`, growing with zero fill as needed.
    pub fn record(&mut self, id: u32, offset: u64) {
        let index = (id - self.first_id) as usize;
        if index >= self.offsets.len() {
            self.offsets.resize(index + 1, 0);
        }
        self.offsets[index] = offset;
    }

    pub fn get(&self, id: u32) -> Option<u64> {
        let index = id.checked_sub(self.first_id)? as usize;
        self.offsets.get(index).copied().filter(|&offset| offset != 0)
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Every assigned ID has exactly one recorded offset.
    pub fn check_coverage(&self, assigned: usize) -> Result<()> {
        let recorded = self.offsets.iter().filter(|&&offset| offset != 0).count();
        if self.offsets.len() != assigned || recorded != assigned {
            return Err(EmitError::OffsetCoverage {
                category: self.category,
                recorded,
                assigned,
            });
        }
        Ok(())
    }

    pub fn to_u64_blob(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.offsets.len() * 8);
        for &offset in &self.offsets {
            emit_u64(&mut out, offset);
        }
        out
    }

    pub fn to_u32_blob(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.offsets.len() * 4);
        for &offset in &self.offsets {
            let narrow = u32::try_from(offset).map_err(|_| HashTableError::OffsetOverflow {
                offset: offset as usize,
            })?;
            emit_u32(&mut out, narrow);
        }
        Ok(out)
    }
}
