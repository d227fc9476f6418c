//! Errors raised while writing or reading the container.

/// Misuse of the writer: unbalanced blocks, records outside blocks, values
/// that do not fit their abbreviation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    #[error("exit_block with no open block")]
    UnbalancedExit,

    #[error("record {code} emitted outside any block")]
    RecordOutsideBlock { code: u32 },

    #[error("block {block_id} entered before the block-info block was written")]
    BlockInfoMissing { block_id: u32 },

    #[error("block-info block may only appear once, at top level")]
    MisplacedBlockInfo,

    #[error("block {block_id} entered inside the block-info block")]
    NestedInBlockInfo { block_id: u32 },

    #[error("stream finished with {depth} open block(s)")]
    OpenBlocks { depth: usize },

    #[error("unknown abbreviation {abbrev}")]
    UnknownAbbrev { abbrev: u32 },

    #[error("abbreviation {abbrev} expects literal {expected}, got {actual}")]
    LiteralMismatch {
        abbrev: u32,
        expected: u64,
        actual: u64,
    },

    #[error("abbreviation {abbrev} expects {expected} operand(s), got {actual}")]
    OperandCount {
        abbrev: u32,
        expected: usize,
        actual: usize,
    },

    #[error("abbreviation {abbrev} has a blob operand but no blob was given")]
    MissingBlob { abbrev: u32 },

    #[error("abbreviation {abbrev} has no blob operand but a blob was given")]
    UnexpectedBlob { abbrev: u32 },

    #[error("value {value} does not fit in {width} bits")]
    ValueTooWide { value: u64, width: u8 },

    #[error("value {value} is not a char6 character")]
    NotChar6 { value: u64 },

    #[error("malformed abbreviation: {0}")]
    MalformedAbbrev(&'static str),
}

/// A key or data length announced by a hash-table trait disagreed with the
/// bytes it actually wrote, or did not fit its length prefix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashTableError {
    #[error("hash table entry {entry}: announced key length {announced}, wrote {written}")]
    KeyLength {
        entry: usize,
        announced: usize,
        written: usize,
    },

    #[error("hash table entry {entry}: announced data length {announced}, wrote {written}")]
    DataLength {
        entry: usize,
        announced: usize,
        written: usize,
    },

    #[error("hash table length {length} does not fit in 16 bits")]
    LengthOverflow { length: usize },

    #[error("hash table offset {offset} exceeds 32 bits")]
    OffsetOverflow { offset: usize },
}

/// Malformed input encountered by the read-side cursor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("bad magic {0:?}")]
    BadMagic([u8; 4]),

    #[error("unexpected end of stream at bit {bit}")]
    UnexpectedEof { bit: u64 },

    #[error("abbreviation {abbrev} used at bit {bit} is not defined")]
    UnknownAbbrev { abbrev: u32, bit: u64 },

    #[error("malformed abbreviation at bit {bit}")]
    MalformedAbbrev { bit: u64 },

    #[error("END_BLOCK at bit {bit} with no open block")]
    UnbalancedEnd { bit: u64 },

    #[error("stream ended with {depth} open block(s)")]
    UnterminatedBlock { depth: usize },

    #[error("record at top level, bit {bit}")]
    TopLevelRecord { bit: u64 },

    #[error("hash table blob is truncated at byte {offset}")]
    TruncatedTable { offset: usize },
}
