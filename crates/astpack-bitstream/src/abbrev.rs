//! Abbreviation schemas: how an abbreviated record's operands are bit-packed.

use crate::error::StreamError;

/// One operand of an abbreviation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum AbbrevOp {
    /// Value is implied; the record must carry exactly this value.
    Literal(u64),
    /// Fixed-width field.
    Fixed(u8),
    /// Variable-width field with the given chunk size.
    Vbr(u8),
    /// Length-prefixed array of the following operand.
    Array,
    /// Six-bit character from `[a-zA-Z0-9._]`.
    Char6,
    /// Length-prefixed, word-aligned byte payload.
    Blob,
}

impl AbbrevOp {
    /// Encoding tag written for non-literal operands.
    pub fn encoding(self) -> Option<u64> {
        match self {
            AbbrevOp::Literal(_) => None,
            AbbrevOp::Fixed(_) => Some(1),
            AbbrevOp::Vbr(_) => Some(2),
            AbbrevOp::Array => Some(3),
            AbbrevOp::Char6 => Some(4),
            AbbrevOp::Blob => Some(5),
        }
    }

    /// Inverse of [`AbbrevOp::encoding`]. `width` is ignored for operands without one.
    pub fn from_encoding(encoding: u64, width: u8) -> Option<Self> {
        match encoding {
            1 => Some(AbbrevOp::Fixed(width)),
            2 => Some(AbbrevOp::Vbr(width)),
            3 => Some(AbbrevOp::Array),
            4 => Some(AbbrevOp::Char6),
            5 => Some(AbbrevOp::Blob),
            _ => None,
        }
    }

    pub fn has_width(encoding: u64) -> bool {
        matches!(encoding, 1 | 2)
    }

    fn is_scalar(self) -> bool {
        matches!(
            self,
            AbbrevOp::Fixed(_) | AbbrevOp::Vbr(_) | AbbrevOp::Char6
        )
    }
}

/// An ordered list of operands. The first operand describes the record code.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Abbrev {
    ops: Vec<AbbrevOp>,
}

impl Abbrev {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn literal(mut self, value: u64) -> Self {
        self.ops.push(AbbrevOp::Literal(value));
        self
    }

    pub fn fixed(mut self, width: u8) -> Self {
        self.ops.push(AbbrevOp::Fixed(width));
        self
    }

    pub fn vbr(mut self, width: u8) -> Self {
        self.ops.push(AbbrevOp::Vbr(width));
        self
    }

    pub fn array(mut self) -> Self {
        self.ops.push(AbbrevOp::Array);
        self
    }

    pub fn char6(mut self) -> Self {
        self.ops.push(AbbrevOp::Char6);
        self
    }

    pub fn blob(mut self) -> Self {
        self.ops.push(AbbrevOp::Blob);
        self
    }

    pub fn ops(&self) -> &[AbbrevOp] {
        &self.ops
    }

    pub fn from_ops(ops: Vec<AbbrevOp>) -> Self {
        Self { ops }
    }

    /// Check the structural rules a reader relies on.
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.ops.is_empty() {
            return Err(StreamError::MalformedAbbrev("no operands"));
        }
        let last = self.ops.len() - 1;
        for (i, op) in self.ops.iter().enumerate() {
            match *op {
                AbbrevOp::Fixed(w) if w == 0 || w > 64 => {
                    return Err(StreamError::MalformedAbbrev("fixed width out of range"));
                }
                AbbrevOp::Vbr(w) if !(2..=32).contains(&w) => {
                    return Err(StreamError::MalformedAbbrev("vbr width out of range"));
                }
                AbbrevOp::Array => {
                    if i + 1 != last || !self.ops[last].is_scalar() {
                        return Err(StreamError::MalformedAbbrev(
                            "array must be followed by exactly one scalar element operand",
                        ));
                    }
                }
                AbbrevOp::Blob if i != last => {
                    return Err(StreamError::MalformedAbbrev("blob must be the last operand"));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

pub fn encode_char6(c: u8) -> Option<u64> {
    match c {
        b'a'..=b'z' => Some((c - b'a') as u64),
        b'A'..=b'Z' => Some((c - b'A') as u64 + 26),
        b'0'..=b'9' => Some((c - b'0') as u64 + 52),
        b'.' => Some(62),
        b'_' => Some(63),
        _ => None,
    }
}

pub fn decode_char6(v: u64) -> u8 {
    match v & 0x3f {
        v @ 0..=25 => b'a' + v as u8,
        v @ 26..=51 => b'A' + (v - 26) as u8,
        v @ 52..=61 => b'0' + (v - 52) as u8,
        62 => b'.',
        _ => b'_',
    }
}
