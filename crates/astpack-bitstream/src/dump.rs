//! Human-readable stream dump for debugging and tests.

use std::fmt::Write as _;

use crate::constants::{BLOCKINFO_BLOCK_ID, blockinfo};
use crate::error::ReadError;
use crate::reader::{Entry, Names, ParsedStream, Record, parse};

/// Parse and dump a stream.
pub fn dump(bytes: &[u8]) -> Result<String, ReadError> {
    Ok(dump_parsed(&parse(bytes)?))
}

pub fn dump_parsed(stream: &ParsedStream) -> String {
    let mut out = String::new();
    let magic: String = stream.magic.iter().map(|&b| b as char).collect();
    let _ = writeln!(out, "magic {magic:?}");

    for entry in &stream.entries {
        match entry {
            Entry::EnterBlock {
                block_id, depth, ..
            } => {
                let _ = writeln!(out, "{}<{}>", indent(*depth), block_name(&stream.names, *block_id));
            }
            Entry::ExitBlock { block_id, depth } => {
                let _ = writeln!(out, "{}</{}>", indent(*depth), block_name(&stream.names, *block_id));
            }
            Entry::DefineAbbrev { id, depth } => {
                let _ = writeln!(out, "{}abbrev #{id}", indent(*depth));
            }
            Entry::Record { record, depth } => {
                let _ = writeln!(out, "{}{}", indent(*depth), record_line(&stream.names, record));
            }
        }
    }
    out
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn block_name(names: &Names, block_id: u32) -> String {
    if block_id == BLOCKINFO_BLOCK_ID {
        return "BLOCKINFO".to_string();
    }
    names
        .block(block_id)
        .map_or_else(|| format!("BLOCK{block_id}"), str::to_string)
}

fn text(fields: &[u64]) -> String {
    fields.iter().map(|&c| c as u8 as char).collect()
}

fn record_line(names: &Names, record: &Record) -> String {
    if record.block_id == BLOCKINFO_BLOCK_ID {
        return match (record.code, record.fields.split_first()) {
            (blockinfo::SETBID, _) => format!("SETBID {:?}", record.fields),
            (blockinfo::BLOCKNAME, _) => format!("BLOCKNAME {:?}", text(&record.fields)),
            (blockinfo::SETRECORDNAME, Some((code, name))) => {
                format!("SETRECORDNAME {code} {:?}", text(name))
            }
            (code, _) => format!("RECORD{code} {:?}", record.fields),
        };
    }

    let name = names
        .record(record.block_id, record.code)
        .map_or_else(|| format!("RECORD{}", record.code), str::to_string);
    let mut line = format!("{name} {:?}", record.fields);
    if let Some(blob) = &record.blob {
        let _ = write!(line, " blob({})", blob.len());
    }
    line
}
