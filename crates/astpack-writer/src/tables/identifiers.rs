//! Identifier table.
//!
//! Entry layout: `u16 data_len, u16 key_len`, the NUL-terminated name, then
//! `u32 bits, u32 id`, an optional `u64` macro offset and the declaration
//! chain, most recently visible first. Identifiers that carry nothing beyond
//! their spelling follow the table as `u16 len` plus the NUL-terminated name,
//! which matches the key part of a table entry.

use log::debug;

use astpack_bitstream::constants::pch;
use astpack_bitstream::io::{emit_len16, emit_u32, emit_u64};
use astpack_bitstream::{
    Abbrev, HashTableError, HashTableInfo, OnDiskHashTableBuilder, bernstein_hash,
};
use astpack_core::{IdentHandle, IdentifierInfo, Program};

use super::new_table_blob;
use crate::error::{Category, EmitError, Result};
use crate::offsets::OffsetIndex;
use crate::session::Session;

struct IdentKey {
    name: String,
    id: u32,
}

struct IdentData {
    bits: u32,
    macro_offset: Option<u64>,
    /// Already in on-disk order.
    decl_ids: Vec<u32>,
}

struct IdentifierTableInfo {
    offsets: OffsetIndex,
}

impl HashTableInfo for IdentifierTableInfo {
    type Key = IdentKey;
    type Data = IdentData;

    fn hash(&self, key: &IdentKey) -> u32 {
        bernstein_hash(key.name.as_bytes())
    }

    fn emit_key_data_len(
        &mut self,
        out: &mut Vec<u8>,
        key: &IdentKey,
        data: &IdentData,
    ) -> std::result::Result<(usize, usize), HashTableError> {
        let key_len = key.name.len() + 1;
        let data_len = 8 + 8 * data.macro_offset.is_some() as usize + 4 * data.decl_ids.len();
        emit_len16(out, data_len)?;
        emit_len16(out, key_len)?;
        Ok((key_len, data_len))
    }

    fn emit_key(&mut self, out: &mut Vec<u8>, key: &IdentKey, _key_len: usize) {
        self.offsets.record(key.id, out.len() as u64);
        write_name(out, &key.name);
    }

    fn emit_data(&mut self, out: &mut Vec<u8>, key: &IdentKey, data: &IdentData, _: usize) {
        emit_u32(out, data.bits);
        emit_u32(out, key.id);
        if let Some(offset) = data.macro_offset {
            emit_u64(out, offset);
        }
        for &id in &data.decl_ids {
            emit_u32(out, id);
        }
    }
}

fn write_name(out: &mut Vec<u8>, name: &str) {
    out.extend_from_slice(name.as_bytes());
    out.push(0);
}

/// Whether the reader needs more than the spelling to rebuild the identifier.
fn is_interesting(program: &Program, handle: IdentHandle, info: &IdentifierInfo) -> bool {
    info.is_poisoned
        || info.is_extension
        || program.preprocessor.has_macro_definition(handle)
        || info.builtin_id != 0
        || info.token_kind.is_keyword()
        || !info.decls.is_empty()
}

fn identifier_bits(info: &IdentifierInfo, has_user_macro: bool) -> u32 {
    let mut bits = info.token_kind.0 as u32;
    bits = (bits << 10) | (info.builtin_id as u32 & 0x3ff);
    bits = (bits << 1) | has_user_macro as u32;
    bits = (bits << 1) | info.is_extension as u32;
    bits = (bits << 1) | info.is_poisoned as u32;
    (bits << 1) | info.is_cxx_operator_keyword as u32
}

impl Session<'_> {
    pub(crate) fn write_identifier_table(&mut self) -> Result<()> {
        let program = self.program;
        let mut builder = OnDiskHashTableBuilder::new(self.options.initial_buckets);
        let mut info = IdentifierTableInfo {
            offsets: OffsetIndex::new(Category::Identifier, self.ids.identifiers.first_id()),
        };
        let mut uninteresting = Vec::new();

        let assigned: Vec<(IdentHandle, u32)> = self.ids.identifiers.iter().collect();
        for (handle, id) in assigned {
            let ident = program.ident(handle)?;
            if ident.name.len() + 1 > u16::MAX as usize {
                return Err(EmitError::IdentifierTooLong(handle));
            }
            let key = IdentKey {
                name: ident.name.clone(),
                id,
            };
            if !is_interesting(program, handle, ident) {
                uninteresting.push(key);
                continue;
            }

            let has_user_macro = program
                .preprocessor
                .macro_info(handle)
                .is_some_and(|m| !m.is_builtin);
            let macro_offset = if has_user_macro {
                let offset = self
                    .macro_offsets
                    .get(&handle)
                    .copied()
                    .ok_or(EmitError::MissingMacroOffset(handle))?;
                Some(offset)
            } else {
                None
            };

            // Lookup walks the chain front to back, so the latest declaration goes first.
            let mut decl_ids = Vec::with_capacity(ident.decls.len());
            for &decl in ident.decls.iter().rev() {
                decl_ids.push(self.ensure_decl_id(decl)?);
            }

            let data = IdentData {
                bits: identifier_bits(ident, has_user_macro),
                macro_offset,
                decl_ids,
            };
            builder.insert(&info, key, data);
        }

        let in_table = builder.len();
        let mut blob = new_table_blob();
        let bucket_offset = builder.emit(&mut blob, &mut info)?;
        for key in &uninteresting {
            emit_len16(&mut blob, key.name.len() + 1)?;
            info.offsets.record(key.id, blob.len() as u64);
            write_name(&mut blob, &key.name);
        }
        debug!(
            "identifier table: {in_table} hashed, {} trailing, {} bytes",
            uninteresting.len(),
            blob.len()
        );

        let abbrev = self.stream.define_abbrev(
            Abbrev::new()
                .literal(pch::IDENTIFIER_TABLE as u64)
                .fixed(32)
                .blob(),
        )?;
        self.stream.emit_record_with_blob(
            abbrev,
            pch::IDENTIFIER_TABLE,
            &[bucket_offset as u64],
            &blob,
        )?;

        let offsets = info.offsets;
        offsets.check_coverage(self.ids.identifiers.len())?;
        self.write_key_offsets(pch::IDENTIFIER_OFFSET, &offsets)
    }
}
