//! Errors and warnings produced while writing an artifact.

use astpack_bitstream::{HashTableError, StreamError};
use astpack_core::{DeclHandle, IdentHandle, ProgramError, TypeHandle};

/// Entity categories that carry persistent IDs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Category {
    Type,
    Decl,
    Identifier,
    Selector,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Type => "type",
            Category::Decl => "declaration",
            Category::Identifier => "identifier",
            Category::Selector => "selector",
        };
        f.write_str(name)
    }
}

/// Fatal error. The partially written artifact is discarded.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("cannot serialize {kind} type {handle}")]
    UnsupportedType {
        handle: TypeHandle,
        kind: &'static str,
    },

    #[error(transparent)]
    Program(#[from] ProgramError),

    #[error("container: {0}")]
    Stream(#[from] StreamError),

    #[error("hash table: {0}")]
    HashTable(#[from] HashTableError),

    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} was referenced but never assigned an ID")]
    UnassignedDecl(DeclHandle),

    #[error("{0} was referenced but never assigned an ID")]
    UnassignedType(TypeHandle),

    #[error("{remaining} pending {category} entities after the fixed point")]
    QueueNotDrained { category: Category, remaining: usize },

    #[error("{category} offsets: {recorded} recorded, {assigned} IDs assigned")]
    OffsetCoverage {
        category: Category,
        recorded: usize,
        assigned: usize,
    },

    #[error("builtin type {0} reached the type queue")]
    BuiltinQueued(TypeHandle),

    #[error("source entry at offset {offset} is not followed by a larger offset")]
    InstantiationLength { offset: u32 },

    #[error("macro {0} has no recorded offset")]
    MissingMacroOffset(IdentHandle),

    #[error("identifier {0} is too long for the identifier table")]
    IdentifierTooLong(IdentHandle),
}

pub type Result<T> = std::result::Result<T, EmitError>;

/// Non-fatal condition reported alongside a finished artifact.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Warning {
    /// `__DATE__` or `__TIME__` was expanded; the artifact is not reproducible.
    DateTimeMacros,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::DateTimeMacros => write!(f, "precompiled header used __DATE__ or __TIME__"),
        }
    }
}
