#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Analyzed-program model handed to the precompiled header writer.
//!
//! The semantic analyzer produces a cyclic graph: types point at declarations,
//! declarations point at types, contexts own declarations. Here the graph is
//! flattened into arenas addressed by opaque `u32` handles, so the writer can
//! key its identity tables on handles instead of pointers.
//!
//! Two ways to build a [`Program`]:
//! - [`ProgramBuilder`] for analyzers and tests constructing programs in code
//! - [`Program::from_json`] for fixtures

mod builder;
mod decls;
mod identifiers;
mod invariants;
mod preprocessor;
mod source;
mod stmts;
mod types;

#[cfg(test)]
mod builder_tests;
#[cfg(test)]
mod stmts_tests;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use builder::ProgramBuilder;
pub use decls::{
    Attr, AttrKind, Decl, DeclContext, DeclKind, DeclName, LookupEntry, StorageClass, TagKind,
};
pub use identifiers::{IdentifierInfo, IdentifierTable, Selector, TokenKind};
pub use preprocessor::{HeaderFileInfo, MacroInfo, MacroKind, Preprocessor, Token, TokenFlags};
pub use source::{
    FileCharacteristic, LineEntry, LineTable, SLocEntry, SourceLocation, SourceManager,
};
pub use stmts::{BinaryOp, Stmt, UnaryOp};
pub use types::{
    ApInt, ApsInt, ArraySizeModifier, BuiltinKind, DependentKind, QualType, Qualifiers, Type,
};

// ============================================================================
// Handles
// ============================================================================

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

handle!(
    /// Index into [`Program::types`].
    TypeHandle
);
handle!(
    /// Index into [`Program::decls`].
    DeclHandle
);
handle!(
    /// Index into [`Program::stmts`].
    StmtHandle
);
handle!(
    /// Index into the program's [`IdentifierTable`].
    IdentHandle
);
handle!(
    /// Index into [`Program::selectors`].
    SelectorHandle
);

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("dangling type handle {0}")]
    DanglingType(TypeHandle),

    #[error("dangling declaration handle {0}")]
    DanglingDecl(DeclHandle),

    #[error("dangling statement handle {0}")]
    DanglingStmt(StmtHandle),

    #[error("dangling identifier handle {0}")]
    DanglingIdent(IdentHandle),

    #[error("dangling selector handle {0}")]
    DanglingSelector(SelectorHandle),

    #[error("invalid program JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProgramError>;

// ============================================================================
// Program
// ============================================================================

/// Language dialect switches recorded alongside the artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LangOptions {
    pub trigraphs: bool,
    pub bcpl_comment: bool,
    pub dollar_idents: bool,
    pub asm_preprocessor: bool,
    pub gnu_mode: bool,
    pub c99: bool,
    pub microsoft: bool,
    pub cplus_plus: bool,
    pub cplus_plus0x: bool,
    pub objc1: bool,
    pub objc2: bool,
    pub objc_non_fragile_abi: bool,
    pub pascal_strings: bool,
    pub writable_strings: bool,
    pub lax_vector_conversions: bool,
    pub exceptions: bool,
    pub no_builtin: bool,
    pub threadsafe_statics: bool,
    pub blocks: bool,
    pub emit_all_decls: bool,
    pub math_errno: bool,
    pub optimize: bool,
    pub optimize_size: bool,
    pub is_static: bool,
    pub pic_level: u32,
    pub gnu_inline: bool,
    pub no_inline: bool,
    pub char_is_signed: bool,
    pub gc_mode: u32,
    pub symbol_visibility: u32,
    pub instantiation_depth: u32,
}

impl LangOptions {
    /// Fields in their record order.
    pub fn to_fields(&self) -> Vec<u64> {
        let flags = [
            self.trigraphs,
            self.bcpl_comment,
            self.dollar_idents,
            self.asm_preprocessor,
            self.gnu_mode,
            self.c99,
            self.microsoft,
            self.cplus_plus,
            self.cplus_plus0x,
            self.objc1,
            self.objc2,
            self.objc_non_fragile_abi,
            self.pascal_strings,
            self.writable_strings,
            self.lax_vector_conversions,
            self.exceptions,
            self.no_builtin,
            self.threadsafe_statics,
            self.blocks,
            self.emit_all_decls,
            self.math_errno,
            self.optimize,
            self.optimize_size,
            self.is_static,
        ];
        let mut fields: Vec<u64> = flags.iter().map(|&b| b as u64).collect();
        fields.push(self.pic_level as u64);
        fields.push(self.gnu_inline as u64);
        fields.push(self.no_inline as u64);
        fields.push(self.char_is_signed as u64);
        fields.push(self.gc_mode as u64);
        fields.push(self.symbol_visibility as u64);
        fields.push(self.instantiation_depth as u64);
        fields
    }
}

/// Types the semantic analyzer synthesizes and the reader must recover by role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialTypes {
    pub builtin_va_list: Option<QualType>,
    pub objc_id: Option<QualType>,
    pub objc_selector: Option<QualType>,
    pub objc_protocol: Option<QualType>,
    pub objc_class: Option<QualType>,
    pub cf_constant_string: Option<QualType>,
    pub objc_fast_enumeration_state: Option<QualType>,
}

impl SpecialTypes {
    /// Slots in their record order.
    pub fn slots(&self) -> [Option<QualType>; 7] {
        [
            self.builtin_va_list,
            self.objc_id,
            self.objc_selector,
            self.objc_protocol,
            self.objc_class,
            self.cf_constant_string,
            self.objc_fast_enumeration_state,
        ]
    }
}

/// Semantic-analysis state that outlives individual declarations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SemaState {
    /// Instance methods per selector, in pool order.
    pub instance_methods: IndexMap<SelectorHandle, Vec<DeclHandle>>,
    /// Factory (class) methods per selector, in pool order.
    pub factory_methods: IndexMap<SelectorHandle, Vec<DeclHandle>>,
    pub tentative_definitions: Vec<DeclHandle>,
    pub locally_scoped_external_decls: Vec<DeclHandle>,
    pub special_types: SpecialTypes,
}

/// A fully analyzed translation unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub target_triple: String,
    #[serde(default)]
    pub lang_options: LangOptions,
    #[serde(default)]
    pub types: Vec<Type>,
    pub decls: Vec<Decl>,
    #[serde(default)]
    pub stmts: Vec<Stmt>,
    #[serde(default)]
    pub identifiers: IdentifierTable,
    #[serde(default)]
    pub selectors: Vec<Selector>,
    /// Root declaration context.
    pub translation_unit: DeclHandle,
    #[serde(default)]
    pub source_manager: SourceManager,
    #[serde(default)]
    pub preprocessor: Preprocessor,
    #[serde(default)]
    pub sema: SemaState,
    /// Identifiers the target registers as builtins; always present in the identifier table.
    #[serde(default)]
    pub builtin_names: Vec<IdentHandle>,
}

impl Program {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn ty(&self, handle: TypeHandle) -> Result<&Type> {
        self.types
            .get(handle.index())
            .ok_or(ProgramError::DanglingType(handle))
    }

    pub fn decl(&self, handle: DeclHandle) -> Result<&Decl> {
        self.decls
            .get(handle.index())
            .ok_or(ProgramError::DanglingDecl(handle))
    }

    pub fn stmt(&self, handle: StmtHandle) -> Result<&Stmt> {
        self.stmts
            .get(handle.index())
            .ok_or(ProgramError::DanglingStmt(handle))
    }

    pub fn ident(&self, handle: IdentHandle) -> Result<&IdentifierInfo> {
        self.identifiers
            .get(handle)
            .ok_or(ProgramError::DanglingIdent(handle))
    }

    pub fn selector(&self, handle: SelectorHandle) -> Result<&Selector> {
        self.selectors
            .get(handle.index())
            .ok_or(ProgramError::DanglingSelector(handle))
    }

    /// Identifier text, for diagnostics and ordering.
    pub fn ident_name(&self, handle: IdentHandle) -> Result<&str> {
        Ok(self.ident(handle)?.name.as_str())
    }
}
