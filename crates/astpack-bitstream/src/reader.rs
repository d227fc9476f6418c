//! Read-side cursor: parses a stream back into blocks and records.
//!
//! Used for verification and tooling. It understands everything the writer
//! produces, including abbreviations and the block-info names.

use std::collections::HashMap;

use crate::abbrev::{Abbrev, AbbrevOp, decode_char6};
use crate::constants::{
    BLOCKINFO_BLOCK_ID, DEFINE_ABBREV, END_BLOCK, ENTER_SUBBLOCK, FIRST_APPLICATION_ABBREV,
    TOP_LEVEL_CODE_WIDTH, UNABBREV_RECORD, blockinfo,
};
use crate::error::ReadError;

pub type Result<T> = std::result::Result<T, ReadError>;

/// Bit cursor over a byte slice, LSB-first.
pub struct BitCursor<'a> {
    bytes: &'a [u8],
    bit: u64,
}

impl<'a> BitCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, bit: 0 }
    }

    pub fn bit_position(&self) -> u64 {
        self.bit
    }

    pub fn at_end(&self) -> bool {
        self.bit >= self.bytes.len() as u64 * 8
    }

    pub fn read(&mut self, width: u8) -> Result<u64> {
        if self.bit + width as u64 > self.bytes.len() as u64 * 8 {
            return Err(ReadError::UnexpectedEof { bit: self.bit });
        }
        let mut value = 0u64;
        for i in 0..width as u64 {
            let pos = self.bit + i;
            let bit = (self.bytes[(pos >> 3) as usize] >> (pos & 7)) & 1;
            value |= (bit as u64) << i;
        }
        self.bit += width as u64;
        Ok(value)
    }

    pub fn read_vbr(&mut self, width: u8) -> Result<u64> {
        let continuation = 1u64 << (width - 1);
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let chunk = self.read(width)?;
            if shift < 64 {
                value |= (chunk & (continuation - 1)) << shift;
            }
            if chunk & continuation == 0 {
                return Ok(value);
            }
            shift += width as u32 - 1;
        }
    }

    pub fn align32(&mut self) {
        self.bit = self.bit.div_ceil(32) * 32;
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let start = (self.bit / 8) as usize;
        let bytes = self
            .bytes
            .get(start..start + len)
            .ok_or(ReadError::UnexpectedEof { bit: self.bit })?;
        self.bit += len as u64 * 8;
        Ok(bytes)
    }
}

/// A decoded record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// Bit position of the record's abbreviation ID.
    pub bit: u64,
    pub block_id: u32,
    pub code: u32,
    pub fields: Vec<u64>,
    pub blob: Option<Vec<u8>>,
    /// Abbreviation used, `None` for unabbreviated records.
    pub abbrev: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    EnterBlock { block_id: u32, bit: u64, depth: usize },
    ExitBlock { block_id: u32, depth: usize },
    DefineAbbrev { id: u32, depth: usize },
    Record { record: Record, depth: usize },
}

/// Block and record names announced by the block-info block.
#[derive(Clone, Debug, Default)]
pub struct Names {
    pub blocks: HashMap<u32, String>,
    pub records: HashMap<(u32, u32), String>,
}

impl Names {
    pub fn block(&self, block_id: u32) -> Option<&str> {
        self.blocks.get(&block_id).map(String::as_str)
    }

    pub fn record(&self, block_id: u32, code: u32) -> Option<&str> {
        self.records.get(&(block_id, code)).map(String::as_str)
    }
}

/// A whole stream, parsed.
#[derive(Clone, Debug)]
pub struct ParsedStream {
    pub magic: [u8; 4],
    pub entries: Vec<Entry>,
    pub names: Names,
}

impl ParsedStream {
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Record { record, .. } => Some(record),
            _ => None,
        })
    }

    /// Records directly or indirectly inside blocks with `block_id`.
    pub fn records_in(&self, block_id: u32) -> impl Iterator<Item = &Record> {
        self.records().filter(move |r| r.block_id == block_id)
    }

    /// The record whose abbreviation ID starts at `bit`.
    pub fn record_at(&self, bit: u64) -> Option<&Record> {
        self.records().find(|r| r.bit == bit)
    }

    /// The first record with `code` in `block_id`.
    pub fn find(&self, block_id: u32, code: u32) -> Option<&Record> {
        self.records_in(block_id).find(|r| r.code == code)
    }

    pub fn find_all(&self, block_id: u32, code: u32) -> Vec<&Record> {
        self.records_in(block_id).filter(|r| r.code == code).collect()
    }

    pub fn block_ids(&self) -> Vec<u32> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::EnterBlock { block_id, .. } => Some(*block_id),
                _ => None,
            })
            .collect()
    }
}

struct Scope {
    block_id: u32,
    code_width: u8,
    abbrevs: Vec<Abbrev>,
}

pub fn parse(bytes: &[u8]) -> Result<ParsedStream> {
    let mut cursor = BitCursor::new(bytes);
    let mut magic = [0u8; 4];
    for byte in magic.iter_mut() {
        *byte = cursor.read(8)? as u8;
    }

    let mut entries = Vec::new();
    let mut names = Names::default();
    let mut scopes: Vec<Scope> = Vec::new();
    let mut blockinfo_target: Option<u32> = None;

    while !cursor.at_end() {
        let code_width = scopes
            .last()
            .map_or(TOP_LEVEL_CODE_WIDTH, |scope| scope.code_width);
        let bit = cursor.bit_position();
        let abbrev_id = cursor.read(code_width)? as u32;

        match abbrev_id {
            END_BLOCK => {
                let scope = scopes.pop().ok_or(ReadError::UnbalancedEnd { bit })?;
                cursor.align32();
                entries.push(Entry::ExitBlock {
                    block_id: scope.block_id,
                    depth: scopes.len(),
                });
            }
            ENTER_SUBBLOCK => {
                let block_id = cursor.read_vbr(8)? as u32;
                let width = cursor.read_vbr(4)? as u8;
                cursor.align32();
                cursor.read(32)?;
                entries.push(Entry::EnterBlock {
                    block_id,
                    bit,
                    depth: scopes.len(),
                });
                scopes.push(Scope {
                    block_id,
                    code_width: width,
                    abbrevs: Vec::new(),
                });
            }
            _ if scopes.is_empty() => return Err(ReadError::TopLevelRecord { bit }),
            DEFINE_ABBREV => {
                let abbrev = read_abbrev(&mut cursor, bit)?;
                let depth = scopes.len();
                let scope = scopes.last_mut().ok_or(ReadError::TopLevelRecord { bit })?;
                scope.abbrevs.push(abbrev);
                entries.push(Entry::DefineAbbrev {
                    id: scope.abbrevs.len() as u32 - 1 + FIRST_APPLICATION_ABBREV,
                    depth,
                });
            }
            _ => {
                let depth = scopes.len();
                let scope = scopes.last().ok_or(ReadError::TopLevelRecord { bit })?;
                let record = if abbrev_id == UNABBREV_RECORD {
                    read_unabbreviated(&mut cursor, scope.block_id, bit)?
                } else {
                    let abbrev = (abbrev_id as usize)
                        .checked_sub(FIRST_APPLICATION_ABBREV as usize)
                        .and_then(|i| scope.abbrevs.get(i))
                        .ok_or(ReadError::UnknownAbbrev {
                            abbrev: abbrev_id,
                            bit,
                        })?;
                    read_abbreviated(&mut cursor, abbrev, abbrev_id, scope.block_id, bit)?
                };

                if record.block_id == BLOCKINFO_BLOCK_ID {
                    apply_blockinfo(&record, &mut blockinfo_target, &mut names);
                }
                entries.push(Entry::Record { record, depth });
            }
        }
    }

    if !scopes.is_empty() {
        return Err(ReadError::UnterminatedBlock {
            depth: scopes.len(),
        });
    }

    Ok(ParsedStream {
        magic,
        entries,
        names,
    })
}

fn apply_blockinfo(record: &Record, target: &mut Option<u32>, names: &mut Names) {
    let text = |fields: &[u64]| fields.iter().map(|&c| c as u8 as char).collect::<String>();
    match record.code {
        blockinfo::SETBID => *target = record.fields.first().map(|&id| id as u32),
        blockinfo::BLOCKNAME => {
            if let Some(block_id) = *target {
                names.blocks.insert(block_id, text(&record.fields));
            }
        }
        blockinfo::SETRECORDNAME => {
            if let (Some(block_id), Some((&code, name))) = (*target, record.fields.split_first()) {
                names.records.insert((block_id, code as u32), text(name));
            }
        }
        _ => {}
    }
}

fn read_abbrev(cursor: &mut BitCursor<'_>, bit: u64) -> Result<Abbrev> {
    let count = cursor.read_vbr(5)?;
    let mut ops = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let is_literal = cursor.read(1)? == 1;
        if is_literal {
            ops.push(AbbrevOp::Literal(cursor.read_vbr(8)?));
            continue;
        }
        let encoding = cursor.read(3)?;
        let width = if AbbrevOp::has_width(encoding) {
            cursor.read_vbr(5)? as u8
        } else {
            0
        };
        let op = AbbrevOp::from_encoding(encoding, width)
            .ok_or(ReadError::MalformedAbbrev { bit })?;
        ops.push(op);
    }
    let abbrev = Abbrev::from_ops(ops);
    abbrev
        .validate()
        .map_err(|_| ReadError::MalformedAbbrev { bit })?;
    Ok(abbrev)
}

fn read_unabbreviated(cursor: &mut BitCursor<'_>, block_id: u32, bit: u64) -> Result<Record> {
    let code = cursor.read_vbr(6)? as u32;
    let count = cursor.read_vbr(6)?;
    let mut fields = Vec::with_capacity(count as usize);
    for _ in 0..count {
        fields.push(cursor.read_vbr(6)?);
    }
    Ok(Record {
        bit,
        block_id,
        code,
        fields,
        blob: None,
        abbrev: None,
    })
}

fn read_scalar(cursor: &mut BitCursor<'_>, op: AbbrevOp) -> Result<u64> {
    match op {
        AbbrevOp::Fixed(width) => cursor.read(width),
        AbbrevOp::Vbr(width) => cursor.read_vbr(width),
        AbbrevOp::Char6 => Ok(decode_char6(cursor.read(6)?) as u64),
        AbbrevOp::Literal(value) => Ok(value),
        AbbrevOp::Array | AbbrevOp::Blob => Err(ReadError::MalformedAbbrev {
            bit: cursor.bit_position(),
        }),
    }
}

fn read_abbreviated(
    cursor: &mut BitCursor<'_>,
    abbrev: &Abbrev,
    abbrev_id: u32,
    block_id: u32,
    bit: u64,
) -> Result<Record> {
    let ops = abbrev.ops();
    let mut values = Vec::new();
    let mut blob = None;
    let mut i = 0;
    while i < ops.len() {
        match ops[i] {
            AbbrevOp::Array => {
                let len = cursor.read_vbr(6)?;
                let element = ops[i + 1];
                for _ in 0..len {
                    values.push(read_scalar(cursor, element)?);
                }
                i += 1;
            }
            AbbrevOp::Blob => {
                let len = cursor.read_vbr(6)? as usize;
                cursor.align32();
                blob = Some(cursor.read_bytes(len)?.to_vec());
                cursor.align32();
            }
            op => values.push(read_scalar(cursor, op)?),
        }
        i += 1;
    }

    let (&code, fields) = values
        .split_first()
        .ok_or(ReadError::MalformedAbbrev { bit })?;
    Ok(Record {
        bit,
        block_id,
        code: code as u32,
        fields: fields.to_vec(),
        blob,
        abbrev: Some(abbrev_id),
    })
}
