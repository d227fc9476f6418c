//! Objective-C method pool and selector table.
//!
//! Keys are `u16 num_args` plus one `u32` identifier ID per slot (at least
//! one); data is `u16 instance_count, u16 factory_count` followed by the
//! method declaration IDs. Selectors referenced outside the pool are written
//! as bare keys after the table so every selector ID has an offset.

use log::debug;

use astpack_bitstream::constants::pch;
use astpack_bitstream::io::{emit_len16, emit_u16, emit_u32};
use astpack_bitstream::{
    Abbrev, HashTableError, HashTableInfo, OnDiskHashTableBuilder, bernstein_hash_partial,
};
use astpack_core::{DeclHandle, SelectorHandle};

use super::new_table_blob;
use crate::error::{Category, Result};
use crate::offsets::OffsetIndex;
use crate::session::Session;

struct SelectorKey {
    id: u32,
    num_args: u16,
    slot_ids: Vec<u32>,
    hash: u32,
}

/// Instance method IDs followed by factory method IDs.
struct MethodLists {
    instance_count: u16,
    factory_count: u16,
    ids: Vec<u32>,
}

impl MethodLists {
    fn new(instance: Vec<u32>, factory: Vec<u32>) -> std::result::Result<Self, HashTableError> {
        Ok(Self {
            instance_count: count16(instance.len())?,
            factory_count: count16(factory.len())?,
            ids: instance.into_iter().chain(factory).collect(),
        })
    }
}

fn count16(length: usize) -> std::result::Result<u16, HashTableError> {
    u16::try_from(length).map_err(|_| HashTableError::LengthOverflow { length })
}

struct MethodPoolInfo {
    offsets: OffsetIndex,
}

impl HashTableInfo for MethodPoolInfo {
    type Key = SelectorKey;
    type Data = MethodLists;

    fn hash(&self, key: &SelectorKey) -> u32 {
        key.hash
    }

    fn emit_key_data_len(
        &mut self,
        out: &mut Vec<u8>,
        key: &SelectorKey,
        data: &MethodLists,
    ) -> std::result::Result<(usize, usize), HashTableError> {
        let key_len = 2 + 4 * key.slot_ids.len();
        let data_len = 4 + 4 * data.ids.len();
        emit_len16(out, key_len)?;
        emit_len16(out, data_len)?;
        Ok((key_len, data_len))
    }

    fn emit_key(&mut self, out: &mut Vec<u8>, key: &SelectorKey, _key_len: usize) {
        self.offsets.record(key.id, out.len() as u64);
        write_selector_key(out, key);
    }

    fn emit_data(&mut self, out: &mut Vec<u8>, _key: &SelectorKey, data: &MethodLists, _: usize) {
        emit_u16(out, data.instance_count);
        emit_u16(out, data.factory_count);
        for &id in &data.ids {
            emit_u32(out, id);
        }
    }
}

fn write_selector_key(out: &mut Vec<u8>, key: &SelectorKey) {
    emit_u16(out, key.num_args);
    for &id in &key.slot_ids {
        emit_u32(out, id);
    }
}

impl Session<'_> {
    pub(crate) fn write_method_pool(&mut self) -> Result<()> {
        let program = self.program;
        let sema = &program.sema;

        let mut pool = Vec::new();
        for (&selector, instance) in &sema.instance_methods {
            let factory = sema
                .factory_methods
                .get(&selector)
                .map_or(&[][..], Vec::as_slice);
            pool.push((selector, instance.as_slice(), factory));
        }
        for (&selector, factory) in &sema.factory_methods {
            if !sema.instance_methods.contains_key(&selector) {
                pool.push((selector, &[][..], factory.as_slice()));
            }
        }

        if pool.is_empty() && self.ids.selectors.is_empty() {
            return Ok(());
        }

        let mut entries = Vec::with_capacity(pool.len());
        for (selector, instance, factory) in pool {
            let key = self.selector_key(selector)?;
            let methods = MethodLists::new(self.method_ids(instance)?, self.method_ids(factory)?)?;
            entries.push((key, methods));
        }

        let mut builder = OnDiskHashTableBuilder::new(self.options.initial_buckets);
        let mut info = MethodPoolInfo {
            offsets: OffsetIndex::new(Category::Selector, self.ids.selectors.first_id()),
        };
        let in_pool = entries.len();
        for (key, methods) in entries {
            builder.insert(&info, key, methods);
        }

        let mut blob = new_table_blob();
        let bucket_offset = builder.emit(&mut blob, &mut info)?;

        let assigned: Vec<(SelectorHandle, u32)> = self.ids.selectors.iter().collect();
        let mut trailing = 0;
        for (selector, id) in assigned {
            if info.offsets.get(id).is_some() {
                continue;
            }
            let key = self.selector_key(selector)?;
            info.offsets.record(id, blob.len() as u64);
            write_selector_key(&mut blob, &key);
            trailing += 1;
        }
        debug!("method pool: {in_pool} selectors pooled, {trailing} trailing");

        let abbrev = self.stream.define_abbrev(
            Abbrev::new()
                .literal(pch::METHOD_POOL as u64)
                .fixed(32)
                .fixed(32)
                .blob(),
        )?;
        self.stream.emit_record_with_blob(
            abbrev,
            pch::METHOD_POOL,
            &[bucket_offset as u64, in_pool as u64],
            &blob,
        )?;

        let offsets = info.offsets;
        offsets.check_coverage(self.ids.selectors.len())?;
        self.write_key_offsets(pch::SELECTOR_OFFSETS, &offsets)
    }

    /// Resolve a selector into its on-disk key, assigning IDs to it and its slots.
    fn selector_key(&mut self, handle: SelectorHandle) -> Result<SelectorKey> {
        let program = self.program;
        let selector = program.selector(handle)?;
        let id = self.ids.selectors.id_for(handle);

        let mut slot_ids = Vec::with_capacity(selector.slot_count());
        let mut hash = 5381;
        for index in 0..selector.slot_count() {
            let ident = selector.slot(index);
            if let Some(ident) = ident {
                hash = bernstein_hash_partial(program.ident_name(ident)?.as_bytes(), hash);
            }
            slot_ids.push(self.ids.identifiers.id_for_opt(ident));
        }

        Ok(SelectorKey {
            id,
            num_args: count16(selector.num_args as usize)?,
            slot_ids,
            hash,
        })
    }

    fn method_ids(&self, methods: &[DeclHandle]) -> Result<Vec<u32>> {
        methods
            .iter()
            .map(|&method| self.ensure_decl_id(method))
            .collect()
    }
}
