//! Bit-level container writer.
//!
//! Bits are packed LSB-first into 32-bit little-endian words. A block begins
//! with `ENTER_SUBBLOCK`, its ID and abbreviation width, then a word holding
//! the block length that is backpatched when the block closes.

use crate::abbrev::{Abbrev, AbbrevOp, encode_char6};
use crate::constants::{
    BLOCKINFO_BLOCK_ID, DEFINE_ABBREV, END_BLOCK, ENTER_SUBBLOCK, FIRST_APPLICATION_ABBREV,
    TOP_LEVEL_CODE_WIDTH, UNABBREV_RECORD,
};
use crate::error::StreamError;

pub type Result<T> = std::result::Result<T, StreamError>;

/// Handle to an abbreviation defined in the current block.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct AbbrevId(pub u32);

/// Where the writer is in the block structure.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StreamState {
    Closed,
    InBlockInfo,
    InBlock(usize),
}

#[derive(Debug)]
struct BlockScope {
    block_id: u32,
    prev_code_width: u8,
    /// Word index of the length placeholder.
    start_word: usize,
    prev_abbrevs: Vec<Abbrev>,
}

#[derive(Debug)]
pub struct BitstreamWriter {
    out: Vec<u8>,
    cur_value: u64,
    cur_bit: u32,
    code_width: u8,
    abbrevs: Vec<Abbrev>,
    scopes: Vec<BlockScope>,
    block_info_written: bool,
}

impl Default for BitstreamWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitstreamWriter {
    pub fn new() -> Self {
        Self {
            out: Vec::new(),
            cur_value: 0,
            cur_bit: 0,
            code_width: TOP_LEVEL_CODE_WIDTH,
            abbrevs: Vec::new(),
            scopes: Vec::new(),
            block_info_written: false,
        }
    }

    /// Write the file magic. Must precede everything else.
    pub fn write_magic(&mut self, magic: [u8; 4]) {
        for byte in magic {
            self.emit_bits(byte as u64, 8);
        }
    }

    /// Absolute position of the next bit to be written.
    pub fn bit_position(&self) -> u64 {
        self.out.len() as u64 * 8 + self.cur_bit as u64
    }

    pub fn state(&self) -> StreamState {
        match self.scopes.last() {
            None => StreamState::Closed,
            Some(scope) if scope.block_id == BLOCKINFO_BLOCK_ID => StreamState::InBlockInfo,
            Some(_) => StreamState::InBlock(self.scopes.len()),
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    // ------------------------------------------------------------------
    // Raw bits
    // ------------------------------------------------------------------

    /// Append up to 64 bits. The caller guarantees `value` fits in `width`.
    fn emit_bits(&mut self, value: u64, width: u8) {
        if width > 32 {
            self.emit_word_bits(value & 0xffff_ffff, 32);
            self.emit_word_bits(value >> 32, (width - 32) as u32);
        } else {
            self.emit_word_bits(value, width as u32);
        }
    }

    fn emit_word_bits(&mut self, value: u64, width: u32) {
        if width == 0 {
            return;
        }
        self.cur_value |= value << self.cur_bit;
        self.cur_bit += width;
        if self.cur_bit >= 32 {
            self.out
                .extend_from_slice(&(self.cur_value as u32).to_le_bytes());
            self.cur_value >>= 32;
            self.cur_bit -= 32;
        }
    }

    fn emit_vbr(&mut self, mut value: u64, width: u8) {
        let threshold = 1u64 << (width - 1);
        while value >= threshold {
            self.emit_bits((value & (threshold - 1)) | threshold, width);
            value >>= width - 1;
        }
        self.emit_bits(value, width);
    }

    fn emit_fixed(&mut self, value: u64, width: u8) -> Result<()> {
        if width < 64 && value >> width != 0 {
            return Err(StreamError::ValueTooWide { value, width });
        }
        self.emit_bits(value, width);
        Ok(())
    }

    fn flush_to_word(&mut self) {
        if self.cur_bit > 0 {
            self.out
                .extend_from_slice(&(self.cur_value as u32).to_le_bytes());
            self.cur_value = 0;
            self.cur_bit = 0;
        }
    }

    fn emit_code(&mut self, code: u32) -> Result<()> {
        self.emit_fixed(code as u64, self.code_width)
    }

    // ------------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------------

    /// Open the block-info block. Allowed once, before any other block.
    pub fn enter_block_info(&mut self, code_width: u8) -> Result<()> {
        if self.block_info_written || !self.scopes.is_empty() {
            return Err(StreamError::MisplacedBlockInfo);
        }
        self.enter_block_unchecked(BLOCKINFO_BLOCK_ID, code_width)
    }

    pub fn enter_block(&mut self, block_id: u32, code_width: u8) -> Result<()> {
        if block_id == BLOCKINFO_BLOCK_ID {
            return self.enter_block_info(code_width);
        }
        match self.state() {
            StreamState::InBlockInfo => return Err(StreamError::NestedInBlockInfo { block_id }),
            StreamState::Closed if !self.block_info_written => {
                return Err(StreamError::BlockInfoMissing { block_id });
            }
            _ => {}
        }
        self.enter_block_unchecked(block_id, code_width)
    }

    fn enter_block_unchecked(&mut self, block_id: u32, code_width: u8) -> Result<()> {
        self.emit_code(ENTER_SUBBLOCK)?;
        self.emit_vbr(block_id as u64, 8);
        self.emit_vbr(code_width as u64, 4);
        self.flush_to_word();

        let start_word = self.out.len() / 4;
        self.emit_bits(0, 32);

        self.scopes.push(BlockScope {
            block_id,
            prev_code_width: self.code_width,
            start_word,
            prev_abbrevs: std::mem::take(&mut self.abbrevs),
        });
        self.code_width = code_width;
        Ok(())
    }

    /// Close the innermost block and backpatch its length in words.
    pub fn exit_block(&mut self) -> Result<()> {
        let Some(scope) = self.scopes.pop() else {
            return Err(StreamError::UnbalancedExit);
        };

        self.emit_code(END_BLOCK)?;
        self.flush_to_word();

        let size_words = (self.out.len() / 4 - scope.start_word - 1) as u32;
        let at = scope.start_word * 4;
        self.out[at..at + 4].copy_from_slice(&size_words.to_le_bytes());

        self.code_width = scope.prev_code_width;
        self.abbrevs = scope.prev_abbrevs;
        if scope.block_id == BLOCKINFO_BLOCK_ID {
            self.block_info_written = true;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Abbreviations
    // ------------------------------------------------------------------

    /// Define an abbreviation in the current block, or return the existing
    /// handle if an identical one is already in scope.
    pub fn define_abbrev(&mut self, abbrev: Abbrev) -> Result<AbbrevId> {
        if let Some(pos) = self.abbrevs.iter().position(|a| *a == abbrev) {
            return Ok(AbbrevId(pos as u32 + FIRST_APPLICATION_ABBREV));
        }
        abbrev.validate()?;
        if self.scopes.is_empty() {
            return Err(StreamError::RecordOutsideBlock {
                code: DEFINE_ABBREV,
            });
        }

        let id = self.abbrevs.len() as u32 + FIRST_APPLICATION_ABBREV;
        if self.code_width < 32 && id >> self.code_width != 0 {
            return Err(StreamError::ValueTooWide {
                value: id as u64,
                width: self.code_width,
            });
        }

        self.emit_code(DEFINE_ABBREV)?;
        self.emit_vbr(abbrev.ops().len() as u64, 5);
        for op in abbrev.ops() {
            match *op {
                AbbrevOp::Literal(value) => {
                    self.emit_bits(1, 1);
                    self.emit_vbr(value, 8);
                }
                AbbrevOp::Fixed(width) | AbbrevOp::Vbr(width) => {
                    self.emit_bits(0, 1);
                    self.emit_bits(op.encoding().unwrap_or_default(), 3);
                    self.emit_vbr(width as u64, 5);
                }
                AbbrevOp::Array | AbbrevOp::Char6 | AbbrevOp::Blob => {
                    self.emit_bits(0, 1);
                    self.emit_bits(op.encoding().unwrap_or_default(), 3);
                }
            }
        }
        self.abbrevs.push(abbrev);
        Ok(AbbrevId(id))
    }

    fn abbrev(&self, id: AbbrevId) -> Result<Abbrev> {
        id.0.checked_sub(FIRST_APPLICATION_ABBREV)
            .and_then(|i| self.abbrevs.get(i as usize))
            .cloned()
            .ok_or(StreamError::UnknownAbbrev { abbrev: id.0 })
    }

    // ------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------

    fn ensure_in_block(&self, code: u32) -> Result<()> {
        if self.scopes.is_empty() {
            return Err(StreamError::RecordOutsideBlock { code });
        }
        Ok(())
    }

    /// Emit a record with every field as a 6-bit VBR.
    pub fn emit_record(&mut self, code: u32, fields: &[u64]) -> Result<()> {
        self.ensure_in_block(code)?;
        self.emit_code(UNABBREV_RECORD)?;
        self.emit_vbr(code as u64, 6);
        self.emit_vbr(fields.len() as u64, 6);
        for &field in fields {
            self.emit_vbr(field, 6);
        }
        Ok(())
    }

    /// Emit a record through an abbreviation without a blob operand.
    pub fn emit_record_with_abbrev(
        &mut self,
        abbrev: AbbrevId,
        code: u32,
        fields: &[u64],
    ) -> Result<()> {
        self.emit_abbreviated(abbrev, code, fields, None)
    }

    /// Emit a record through an abbreviation whose last operand is a blob.
    pub fn emit_record_with_blob(
        &mut self,
        abbrev: AbbrevId,
        code: u32,
        fields: &[u64],
        blob: &[u8],
    ) -> Result<()> {
        self.emit_abbreviated(abbrev, code, fields, Some(blob))
    }

    fn emit_abbreviated(
        &mut self,
        id: AbbrevId,
        code: u32,
        fields: &[u64],
        blob: Option<&[u8]>,
    ) -> Result<()> {
        self.ensure_in_block(code)?;
        let abbrev = self.abbrev(id)?;
        let ops = abbrev.ops();
        let values: Vec<u64> = std::iter::once(code as u64)
            .chain(fields.iter().copied())
            .collect();
        let expected = ops
            .iter()
            .filter(|op| !matches!(op, AbbrevOp::Array | AbbrevOp::Blob))
            .count();
        let operand_count = || StreamError::OperandCount {
            abbrev: id.0,
            expected,
            actual: values.len(),
        };
        let has_blob = ops.contains(&AbbrevOp::Blob);
        match (has_blob, blob.is_some()) {
            (true, false) => return Err(StreamError::MissingBlob { abbrev: id.0 }),
            (false, true) => return Err(StreamError::UnexpectedBlob { abbrev: id.0 }),
            _ => {}
        }

        self.emit_code(id.0)?;

        let mut next = 0;
        let mut i = 0;
        while i < ops.len() {
            match ops[i] {
                AbbrevOp::Literal(expected) => {
                    let actual = *values.get(next).ok_or_else(operand_count)?;
                    if actual != expected {
                        return Err(StreamError::LiteralMismatch {
                            abbrev: id.0,
                            expected,
                            actual,
                        });
                    }
                    next += 1;
                }
                AbbrevOp::Array => {
                    let element = ops[i + 1];
                    let rest = &values[next..];
                    self.emit_vbr(rest.len() as u64, 6);
                    for &value in rest {
                        self.emit_scalar(element, value)?;
                    }
                    next = values.len();
                    i += 1;
                }
                AbbrevOp::Blob => {
                    let bytes = blob.ok_or(StreamError::MissingBlob { abbrev: id.0 })?;
                    self.emit_blob(bytes);
                }
                scalar => {
                    let value = *values.get(next).ok_or_else(operand_count)?;
                    self.emit_scalar(scalar, value)?;
                    next += 1;
                }
            }
            i += 1;
        }

        if next != values.len() {
            return Err(operand_count());
        }
        Ok(())
    }

    fn emit_scalar(&mut self, op: AbbrevOp, value: u64) -> Result<()> {
        match op {
            AbbrevOp::Fixed(width) => self.emit_fixed(value, width),
            AbbrevOp::Vbr(width) => {
                self.emit_vbr(value, width);
                Ok(())
            }
            AbbrevOp::Char6 => {
                let encoded = u8::try_from(value)
                    .ok()
                    .and_then(encode_char6)
                    .ok_or(StreamError::NotChar6 { value })?;
                self.emit_bits(encoded, 6);
                Ok(())
            }
            AbbrevOp::Literal(_) | AbbrevOp::Array | AbbrevOp::Blob => {
                Err(StreamError::MalformedAbbrev("non-scalar array element"))
            }
        }
    }

    fn emit_blob(&mut self, bytes: &[u8]) {
        self.emit_vbr(bytes.len() as u64, 6);
        self.flush_to_word();
        self.out.extend_from_slice(bytes);
        while self.out.len() % 4 != 0 {
            self.out.push(0);
        }
    }

    /// Finish the stream and return its bytes. All blocks must be closed.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        if !self.scopes.is_empty() {
            return Err(StreamError::OpenBlocks {
                depth: self.scopes.len(),
            });
        }
        self.flush_to_word();
        Ok(self.out)
    }
}
