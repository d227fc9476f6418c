//! Source manager block: entry table, `#line` table, header bookkeeping.

use log::trace;

use astpack_bitstream::constants::{
    SOURCE_MANAGER_BLOCK_ID, SOURCE_MANAGER_CODE_WIDTH, source_manager as sm,
};
use astpack_bitstream::{Abbrev, AbbrevId};
use astpack_core::{LineTable, SLocEntry};

use crate::error::{EmitError, Result};
use crate::session::{Record, Session};

struct EntryAbbrevs {
    file: AbbrevId,
    buffer: AbbrevId,
    buffer_blob: AbbrevId,
    instantiation: AbbrevId,
}

fn file_like(code: u32) -> Abbrev {
    Abbrev::new()
        .literal(code as u64)
        .vbr(8)
        .vbr(8)
        .fixed(2)
        .fixed(1)
        .blob()
}

impl Session<'_> {
    pub(crate) fn write_source_manager(&mut self) -> Result<()> {
        self.in_block(SOURCE_MANAGER_BLOCK_ID, SOURCE_MANAGER_CODE_WIDTH, |s| {
            let abbrevs = EntryAbbrevs {
                file: s.stream.define_abbrev(file_like(sm::SLOC_FILE_ENTRY))?,
                buffer: s.stream.define_abbrev(file_like(sm::SLOC_BUFFER_ENTRY))?,
                buffer_blob: s.stream.define_abbrev(
                    Abbrev::new()
                        .literal(sm::SLOC_BUFFER_BLOB as u64)
                        .blob(),
                )?,
                instantiation: s.stream.define_abbrev(
                    Abbrev::new()
                        .literal(sm::SLOC_INSTANTIATION_ENTRY as u64)
                        .vbr(8)
                        .vbr(8)
                        .vbr(8)
                        .vbr(8)
                        .vbr(6),
                )?,
            };
            s.write_sloc_entries(&abbrevs)?;
            s.write_line_table()?;
            s.write_header_file_infos()
        })
    }

    fn write_sloc_entries(&mut self, abbrevs: &EntryAbbrevs) -> Result<()> {
        let program = self.program;
        let manager = &program.source_manager;
        let entries = manager.entries.get(1..).unwrap_or_default();

        for (i, entry) in entries.iter().enumerate() {
            match entry {
                SLocEntry::File {
                    offset,
                    include_loc,
                    characteristic,
                    has_line_directives,
                    name,
                } => {
                    let fields = [
                        *offset as u64,
                        include_loc.raw() as u64,
                        characteristic.code(),
                        *has_line_directives as u64,
                    ];
                    self.stream.emit_record_with_blob(
                        abbrevs.file,
                        sm::SLOC_FILE_ENTRY,
                        &fields,
                        name.as_bytes(),
                    )?;
                }
                SLocEntry::Buffer {
                    offset,
                    include_loc,
                    characteristic,
                    has_line_directives,
                    name,
                    contents,
                } => {
                    let fields = [
                        *offset as u64,
                        include_loc.raw() as u64,
                        characteristic.code(),
                        *has_line_directives as u64,
                    ];
                    self.stream.emit_record_with_blob(
                        abbrevs.buffer,
                        sm::SLOC_BUFFER_ENTRY,
                        &fields,
                        &nul_terminated(name),
                    )?;
                    self.stream.emit_record_with_blob(
                        abbrevs.buffer_blob,
                        sm::SLOC_BUFFER_BLOB,
                        &[],
                        &nul_terminated(contents),
                    )?;
                }
                SLocEntry::Instantiation {
                    offset,
                    spelling_loc,
                    expansion_start,
                    expansion_end,
                } => {
                    // The entry spans up to the next one, minus the separator.
                    let next = entries
                        .get(i + 1)
                        .map_or(manager.next_offset, SLocEntry::offset);
                    let token_len = next
                        .checked_sub(*offset)
                        .and_then(|len| len.checked_sub(1))
                        .ok_or(EmitError::InstantiationLength { offset: *offset })?;
                    let fields = [
                        *offset as u64,
                        spelling_loc.raw() as u64,
                        expansion_start.raw() as u64,
                        expansion_end.raw() as u64,
                        token_len as u64,
                    ];
                    self.stream.emit_record_with_abbrev(
                        abbrevs.instantiation,
                        sm::SLOC_INSTANTIATION_ENTRY,
                        &fields,
                    )?;
                }
            }
        }
        trace!("source manager: {} entries", entries.len());
        Ok(())
    }

    fn write_line_table(&mut self) -> Result<()> {
        let program = self.program;
        let table = &program.source_manager.line_table;
        if table.is_empty() {
            return Ok(());
        }
        let record = line_table_record(table);
        self.stream.emit_record(sm::LINE_TABLE, &record)?;
        Ok(())
    }

    fn write_header_file_infos(&mut self) -> Result<()> {
        let program = self.program;
        for info in &program.preprocessor.header_files {
            let mut record = vec![
                info.is_import as u64,
                info.dir_kind as u64,
                info.num_includes as u64,
            ];
            self.add_ident_ref(&mut record, info.controlling_macro)?;
            self.stream.emit_record(sm::HEADER_FILE_INFO, &record)?;
        }
        Ok(())
    }
}

fn nul_terminated(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len() + 1);
    bytes.extend_from_slice(text.as_bytes());
    bytes.push(0);
    bytes
}

fn line_table_record(table: &LineTable) -> Record {
    let mut record = vec![table.filenames.len() as u64];
    for name in &table.filenames {
        record.push(name.len() as u64);
        record.extend(name.bytes().map(u64::from));
    }
    for (file_id, entries) in &table.files {
        record.push(*file_id as u64);
        record.push(entries.len() as u64);
        for entry in entries {
            record.push(entry.file_offset as u64);
            record.push(entry.line as u64);
            record.push(entry.filename_id as u64);
            record.push(entry.file_kind.code());
            record.push(entry.include_offset as u64);
        }
    }
    record
}
