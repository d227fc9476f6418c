//! Identifier table and Objective-C selectors.
//!
//! Identifiers are interned by text: asking for the same name twice yields
//! the same [`IdentHandle`]. Each entry carries the lexer's classification
//! bits and the chain of declarations visible under that name at file scope.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{DeclHandle, IdentHandle};

/// Lexer token kind. Values are assigned by the external lexer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenKind(pub u16);

impl TokenKind {
    pub const UNKNOWN: Self = Self(0);
    pub const IDENTIFIER: Self = Self(1);
    pub const NUMERIC_CONSTANT: Self = Self(2);
    pub const CHAR_CONSTANT: Self = Self(3);
    pub const STRING_LITERAL: Self = Self(4);
    pub const L_PAREN: Self = Self(5);
    pub const R_PAREN: Self = Self(6);
    pub const COMMA: Self = Self(7);
    pub const PLUS: Self = Self(8);
    pub const MINUS: Self = Self(9);
    pub const STAR: Self = Self(10);
    pub const SLASH: Self = Self(11);
    pub const HASH: Self = Self(12);
    pub const HASHHASH: Self = Self(13);

    /// First keyword token kind. Everything at or above it is a keyword.
    pub const FIRST_KEYWORD: Self = Self(64);

    pub fn is_keyword(self) -> bool {
        self.0 >= Self::FIRST_KEYWORD.0
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct IdentifierInfo {
    pub name: String,
    /// Token kind the lexer produces for this spelling.
    #[serde(default = "identifier_token")]
    pub token_kind: TokenKind,
    /// Builtin function or Objective-C keyword ID, 0 if none. Fits in 10 bits.
    #[serde(default)]
    pub builtin_id: u16,
    #[serde(default)]
    pub is_extension: bool,
    #[serde(default)]
    pub is_poisoned: bool,
    #[serde(default)]
    pub is_cxx_operator_keyword: bool,
    /// File-scope declarations with this name, most recent last.
    #[serde(default)]
    pub decls: Vec<DeclHandle>,
}

fn identifier_token() -> TokenKind {
    TokenKind::IDENTIFIER
}

impl IdentifierInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token_kind: TokenKind::IDENTIFIER,
            ..Self::default()
        }
    }
}

/// Interning table of identifiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<IdentifierInfo>", into = "Vec<IdentifierInfo>")]
pub struct IdentifierTable {
    map: HashMap<String, IdentHandle>,
    infos: Vec<IdentifierInfo>,
}

impl IdentifierTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a name, returning its handle.
    /// If the name was already interned, returns the existing handle.
    pub fn intern(&mut self, name: &str) -> IdentHandle {
        if let Some(&handle) = self.map.get(name) {
            return handle;
        }

        let handle = IdentHandle(self.infos.len() as u32);
        self.infos.push(IdentifierInfo::new(name));
        self.map.insert(name.to_owned(), handle);
        handle
    }

    /// Look up a name without interning it.
    pub fn lookup(&self, name: &str) -> Option<IdentHandle> {
        self.map.get(name).copied()
    }

    pub fn get(&self, handle: IdentHandle) -> Option<&IdentifierInfo> {
        self.infos.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: IdentHandle) -> Option<&mut IdentifierInfo> {
        self.infos.get_mut(handle.index())
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Iterate over all entries in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (IdentHandle, &IdentifierInfo)> {
        self.infos
            .iter()
            .enumerate()
            .map(|(i, info)| (IdentHandle(i as u32), info))
    }
}

impl From<Vec<IdentifierInfo>> for IdentifierTable {
    /// Later duplicates of a name are kept as entries but lookups resolve to the first.
    fn from(infos: Vec<IdentifierInfo>) -> Self {
        let mut map = HashMap::with_capacity(infos.len());
        for (i, info) in infos.iter().enumerate() {
            map.entry(info.name.clone())
                .or_insert(IdentHandle(i as u32));
        }
        Self { map, infos }
    }
}

impl From<IdentifierTable> for Vec<IdentifierInfo> {
    fn from(table: IdentifierTable) -> Self {
        table.infos
    }
}

/// An Objective-C selector: a method name split into keyword slots.
///
/// Zero-argument selectors have one slot (the bare name). Keyword slots may be
/// empty, as in `foo::`.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Selector {
    pub num_args: u32,
    pub slots: Vec<Option<IdentHandle>>,
}

impl Selector {
    pub fn nullary(name: IdentHandle) -> Self {
        Self {
            num_args: 0,
            slots: vec![Some(name)],
        }
    }

    pub fn keyword(slots: Vec<Option<IdentHandle>>) -> Self {
        Self {
            num_args: slots.len() as u32,
            slots,
        }
    }

    /// Number of identifier slots: the argument count, but at least one.
    pub fn slot_count(&self) -> usize {
        (self.num_args as usize).max(1)
    }

    pub fn slot(&self, index: usize) -> Option<IdentHandle> {
        self.slots.get(index).copied().flatten()
    }
}
