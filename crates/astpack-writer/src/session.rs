//! The serialization session.
//!
//! A [`Session`] owns every piece of mutable state of one pass: the output
//! stream, the ID tables with their pending queues, the offset indexes and
//! the counters that end up in the statistics record. The program itself is
//! only read.
//!
//! Types and declarations are never written recursively. Referencing one
//! assigns its ID and queues it; the driver keeps draining both queues until
//! neither grows, so arbitrarily cyclic graphs terminate.

use std::collections::HashMap;

use log::debug;

use astpack_bitstream::constants::{
    DECLS_BLOCK_ID, DECLS_CODE_WIDTH, MAGIC, NUM_PREDEF_TYPE_IDS, PCH_BLOCK_ID, PCH_CODE_WIDTH,
    SCHEMA, TYPE_QUAL_BITS, TYPES_BLOCK_ID, TYPES_CODE_WIDTH, pch,
};
use astpack_bitstream::{Abbrev, BitstreamWriter};
use astpack_core::{
    ApInt, ApsInt, DeclHandle, DeclName, IdentHandle, Program, QualType, SelectorHandle,
    SourceLocation, StmtHandle, Type, TypeHandle,
};

use crate::artifact::{Artifact, EmitStats};
use crate::error::{Category, Result, Warning};
use crate::id_space::{IdSpace, predefined_type_id};
use crate::offsets::OffsetIndex;
use crate::options::EmitOptions;

/// Fields of one record under construction.
pub(crate) type Record = Vec<u64>;

/// Serialize `program` with default options.
pub fn emit(program: &Program) -> Result<Artifact> {
    emit_with(program, &EmitOptions::default())
}

pub fn emit_with(program: &Program, options: &EmitOptions) -> Result<Artifact> {
    Session::new(program, options).run()
}

pub(crate) struct Session<'p> {
    pub(crate) program: &'p Program,
    pub(crate) options: &'p EmitOptions,
    pub(crate) stream: BitstreamWriter,
    pub(crate) ids: IdSpace,
    pub(crate) type_offsets: OffsetIndex,
    pub(crate) decl_offsets: OffsetIndex,
    /// Bit position of each written macro definition.
    pub(crate) macro_offsets: HashMap<IdentHandle, u64>,
    /// Statements referenced by the record being built, flushed right after it.
    pub(crate) pending_stmts: Vec<Option<StmtHandle>>,
    pub(crate) external_definitions: Record,
    /// Type node that names each typedef, tag or interface declaration.
    pub(crate) type_for_decl: HashMap<DeclHandle, TypeHandle>,
    pub(crate) stats: EmitStats,
    pub(crate) warnings: Vec<Warning>,
}

impl<'p> Session<'p> {
    pub(crate) fn new(program: &'p Program, options: &'p EmitOptions) -> Self {
        let mut type_for_decl = HashMap::new();
        for (i, ty) in program.types.iter().enumerate() {
            if let Type::Typedef { decl }
            | Type::Record { decl }
            | Type::Enum { decl }
            | Type::ObjCInterface { decl } = ty
            {
                type_for_decl.entry(*decl).or_insert(TypeHandle(i as u32));
            }
        }

        Self {
            program,
            options,
            stream: BitstreamWriter::new(),
            ids: IdSpace::new(),
            type_offsets: OffsetIndex::new(Category::Type, NUM_PREDEF_TYPE_IDS),
            decl_offsets: OffsetIndex::new(Category::Decl, 1),
            macro_offsets: HashMap::new(),
            pending_stmts: Vec::new(),
            external_definitions: Vec::new(),
            type_for_decl,
            stats: EmitStats::default(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn run(mut self) -> Result<Artifact> {
        let program = self.program;

        self.stream.write_magic(MAGIC);
        self.stream.emit_block_info(SCHEMA, self.options.block_names)?;

        // The translation unit always gets declaration ID 1.
        self.ids.decls.id_for(program.translation_unit);
        for &name in &program.builtin_names {
            let mut sink = Vec::new();
            self.add_ident_ref(&mut sink, Some(name))?;
        }

        // Everything these records reference must be queued before the fixed point.
        let mut special_types = Vec::new();
        for slot in program.sema.special_types.slots() {
            self.add_type_ref(&mut special_types, slot)?;
        }
        let mut tentative = Vec::new();
        for &decl in &program.sema.tentative_definitions {
            self.add_decl_ref(&mut tentative, Some(decl))?;
        }
        let mut locally_scoped = Vec::new();
        for &decl in &program.sema.locally_scoped_external_decls {
            self.add_decl_ref(&mut locally_scoped, Some(decl))?;
        }

        self.in_block(PCH_BLOCK_ID, PCH_CODE_WIDTH, |s| {
            s.write_target_triple()?;
            s.stream
                .emit_record(pch::LANGUAGE_OPTIONS, &program.lang_options.to_fields())?;
            s.write_source_manager()?;
            s.write_preprocessor()?;
            s.write_types_and_decls()?;
            s.write_method_pool()?;
            s.write_identifier_table()?;
            s.write_offset_tables()?;

            s.stream.emit_record(pch::SPECIAL_TYPES, &special_types)?;
            if !s.external_definitions.is_empty() {
                let externals = std::mem::take(&mut s.external_definitions);
                s.stream.emit_record(pch::EXTERNAL_DEFINITIONS, &externals)?;
            }
            if !tentative.is_empty() {
                s.stream.emit_record(pch::TENTATIVE_DEFINITIONS, &tentative)?;
            }
            if !locally_scoped.is_empty() {
                s.stream
                    .emit_record(pch::LOCALLY_SCOPED_EXTERNAL_DECLS, &locally_scoped)?;
            }

            let stats = &s.stats;
            let summary = [
                stats.statements as u64,
                stats.macros as u64,
                stats.lexical_contexts as u64,
                stats.visible_contexts as u64,
            ];
            s.stream.emit_record(pch::STATISTICS, &summary)?;
            Ok(())
        })?;

        self.ensure_drained()?;
        self.stats.identifiers = self.ids.identifiers.len();
        self.stats.selectors = self.ids.selectors.len();
        debug!(
            "artifact complete: {} types, {} decls, {} identifiers, {} rounds",
            self.stats.types, self.stats.decls, self.stats.identifiers, self.stats.rounds
        );

        Ok(Artifact {
            bytes: self.stream.finish()?,
            warnings: self.warnings,
            stats: self.stats,
            ids: self.ids,
        })
    }

    /// Run `f` inside a block. The block is closed even when `f` fails.
    pub(crate) fn in_block<T>(
        &mut self,
        block_id: u32,
        code_width: u8,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.stream.enter_block(block_id, code_width)?;
        let result = f(self);
        let exited = self.stream.exit_block();
        let value = result?;
        exited?;
        Ok(value)
    }

    fn write_target_triple(&mut self) -> Result<()> {
        let abbrev = self
            .stream
            .define_abbrev(Abbrev::new().literal(pch::TARGET_TRIPLE as u64).blob())?;
        self.stream.emit_record_with_blob(
            abbrev,
            pch::TARGET_TRIPLE,
            &[],
            self.program.target_triple.as_bytes(),
        )?;
        Ok(())
    }

    /// Alternate types and declarations blocks until neither queue has work.
    fn write_types_and_decls(&mut self) -> Result<()> {
        while self.ids.types.has_pending() || self.ids.decls.has_pending() {
            self.stats.rounds += 1;
            if self.ids.types.has_pending() {
                let written = self.in_block(TYPES_BLOCK_ID, TYPES_CODE_WIDTH, |s| {
                    let mut written = 0;
                    while let Some(handle) = s.ids.types.pop_pending() {
                        s.write_type(handle)?;
                        written += 1;
                    }
                    Ok(written)
                })?;
                debug!("round {}: types block with {written} types", self.stats.rounds);
            }
            if self.ids.decls.has_pending() {
                let written = self.in_block(DECLS_BLOCK_ID, DECLS_CODE_WIDTH, |s| {
                    let mut written = 0;
                    while let Some(handle) = s.ids.decls.pop_pending() {
                        s.write_decl(handle)?;
                        written += 1;
                    }
                    Ok(written)
                })?;
                debug!("round {}: decls block with {written} declarations", self.stats.rounds);
            }
        }
        Ok(())
    }

    fn write_offset_tables(&mut self) -> Result<()> {
        self.ensure_offset_coverage()?;

        let abbrev = self.stream.define_abbrev(
            Abbrev::new()
                .literal(pch::TYPE_OFFSET as u64)
                .fixed(32)
                .blob(),
        )?;
        self.stream.emit_record_with_blob(
            abbrev,
            pch::TYPE_OFFSET,
            &[self.type_offsets.len() as u64],
            &self.type_offsets.to_u64_blob(),
        )?;

        let abbrev = self.stream.define_abbrev(
            Abbrev::new()
                .literal(pch::DECL_OFFSET as u64)
                .fixed(32)
                .blob(),
        )?;
        self.stream.emit_record_with_blob(
            abbrev,
            pch::DECL_OFFSET,
            &[self.decl_offsets.len() as u64],
            &self.decl_offsets.to_u64_blob(),
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // References
    // ------------------------------------------------------------------

    /// Encoded type reference: `(id << 3) | cvr`. Builtins use their reserved ID.
    pub(crate) fn type_ref(&mut self, qual_type: QualType) -> Result<u64> {
        let id = match self.program.ty(qual_type.ty)?.builtin_kind() {
            Some(kind) => predefined_type_id(kind),
            None => self.ids.types.id_for(qual_type.ty),
        };
        Ok(((id as u64) << TYPE_QUAL_BITS) | qual_type.quals.cvr() as u64)
    }

    pub(crate) fn add_type_ref(&mut self, record: &mut Record, ty: Option<QualType>) -> Result<()> {
        let encoded = match ty {
            Some(ty) => self.type_ref(ty)?,
            None => 0,
        };
        record.push(encoded);
        Ok(())
    }

    pub(crate) fn add_decl_ref(
        &mut self,
        record: &mut Record,
        decl: Option<DeclHandle>,
    ) -> Result<()> {
        if let Some(handle) = decl {
            self.program.decl(handle)?;
        }
        record.push(self.ids.decls.id_for_opt(decl) as u64);
        Ok(())
    }

    pub(crate) fn add_ident_ref(
        &mut self,
        record: &mut Record,
        ident: Option<IdentHandle>,
    ) -> Result<()> {
        if let Some(handle) = ident {
            self.program.ident(handle)?;
        }
        record.push(self.ids.identifiers.id_for_opt(ident) as u64);
        Ok(())
    }

    pub(crate) fn add_selector_ref(
        &mut self,
        record: &mut Record,
        selector: SelectorHandle,
    ) -> Result<()> {
        self.program.selector(selector)?;
        record.push(self.ids.selectors.id_for(selector) as u64);
        Ok(())
    }

    /// Queue a statement to follow the current record. `None` writes a null marker.
    pub(crate) fn add_stmt(&mut self, stmt: Option<StmtHandle>) {
        self.pending_stmts.push(stmt);
    }

    pub(crate) fn add_decl_name(&mut self, record: &mut Record, name: &DeclName) -> Result<()> {
        match name {
            DeclName::Identifier(ident) => {
                record.push(0);
                self.add_ident_ref(record, *ident)?;
            }
            DeclName::Selector(handle) => {
                let kind = match self.program.selector(*handle)?.num_args {
                    0 => 1,
                    1 => 2,
                    _ => 3,
                };
                record.push(kind);
                self.add_selector_ref(record, *handle)?;
            }
            DeclName::CxxConstructor(ty) => {
                record.push(4);
                self.add_type_ref(record, Some(*ty))?;
            }
            DeclName::CxxDestructor(ty) => {
                record.push(5);
                self.add_type_ref(record, Some(*ty))?;
            }
            DeclName::CxxConversion(ty) => {
                record.push(6);
                self.add_type_ref(record, Some(*ty))?;
            }
            DeclName::CxxOperator(op) => {
                record.push(7);
                record.push(*op as u64);
            }
            DeclName::CxxUsingDirective => record.push(8),
        }
        Ok(())
    }
}

pub(crate) fn add_location(record: &mut Record, location: SourceLocation) {
    record.push(location.raw() as u64);
}

/// Bit width followed by exactly as many 64-bit words as the width needs.
pub(crate) fn add_ap_int(record: &mut Record, value: &ApInt) {
    record.push(value.bit_width as u64);
    let words = (value.bit_width as usize).div_ceil(64).max(1);
    for i in 0..words {
        record.push(value.words.get(i).copied().unwrap_or(0));
    }
}

pub(crate) fn add_aps_int(record: &mut Record, value: &ApsInt) {
    record.push(value.is_unsigned as u64);
    add_ap_int(record, &value.value);
}

pub(crate) fn add_string(record: &mut Record, text: &str) {
    record.push(text.len() as u64);
    record.extend(text.bytes().map(u64::from));
}
