//! Macro definitions and preprocessor state supplied by the lexer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::identifiers::TokenKind;
use crate::{IdentHandle, SourceLocation};

/// Token flag bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenFlags(pub u16);

impl TokenFlags {
    pub const START_OF_LINE: Self = Self(0x01);
    pub const LEADING_SPACE: Self = Self(0x02);
    pub const DISABLE_EXPAND: Self = Self(0x04);
    pub const NEEDS_CLEANING: Self = Self(0x08);
}

/// One replacement-list token of a macro.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Token {
    pub location: SourceLocation,
    pub length: u32,
    /// Identifier for identifier-like tokens.
    #[serde(default)]
    pub ident: Option<IdentHandle>,
    pub kind: TokenKind,
    #[serde(default)]
    pub flags: TokenFlags,
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MacroKind {
    #[default]
    ObjectLike,
    FunctionLike {
        #[serde(default)]
        is_c99_varargs: bool,
        #[serde(default)]
        is_gnu_varargs: bool,
        #[serde(default)]
        params: Vec<IdentHandle>,
    },
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct MacroInfo {
    pub definition_loc: SourceLocation,
    #[serde(default)]
    pub is_used: bool,
    /// Predefined by the compiler and not redefined by the user.
    #[serde(default)]
    pub is_builtin: bool,
    #[serde(default)]
    pub kind: MacroKind,
    #[serde(default)]
    pub tokens: Vec<Token>,
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct HeaderFileInfo {
    #[serde(default)]
    pub is_import: bool,
    /// Directory lookup kind as a raw value.
    #[serde(default)]
    pub dir_kind: u8,
    #[serde(default)]
    pub num_includes: u32,
    #[serde(default)]
    pub controlling_macro: Option<IdentHandle>,
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preprocessor {
    /// Live macro definitions keyed by identifier.
    pub macros: IndexMap<IdentHandle, MacroInfo>,
    /// Value of `__COUNTER__`.
    pub counter_value: u32,
    /// `__DATE__` or `__TIME__` was expanded.
    pub saw_date_or_time: bool,
    /// Per-header include bookkeeping, in file order.
    pub header_files: Vec<HeaderFileInfo>,
}

impl Preprocessor {
    pub fn macro_info(&self, ident: IdentHandle) -> Option<&MacroInfo> {
        self.macros.get(&ident)
    }

    pub fn has_macro_definition(&self, ident: IdentHandle) -> bool {
        self.macros.contains_key(&ident)
    }
}
