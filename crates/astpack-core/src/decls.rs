//! Declarations and declaration contexts.

use serde::{Deserialize, Serialize};

use crate::types::{ApsInt, QualType};
use crate::{DeclHandle, IdentHandle, SelectorHandle, SourceLocation, StmtHandle};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum StorageClass {
    #[default]
    None,
    Extern,
    Static,
    PrivateExtern,
    Auto,
    Register,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum TagKind {
    #[default]
    Struct,
    Union,
    Class,
    Enum,
}

/// The name a declaration is looked up by.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum DeclName {
    /// Plain identifier; `None` for anonymous declarations.
    Identifier(Option<IdentHandle>),
    /// Objective-C selector. The zero/one/multi-argument distinction comes from the selector.
    Selector(SelectorHandle),
    CxxConstructor(QualType),
    CxxDestructor(QualType),
    CxxConversion(QualType),
    /// Overloaded operator kind.
    CxxOperator(u8),
    CxxUsingDirective,
}

impl Default for DeclName {
    fn default() -> Self {
        DeclName::Identifier(None)
    }
}

impl DeclName {
    pub fn identifier(&self) -> Option<IdentHandle> {
        match self {
            DeclName::Identifier(ident) => *ident,
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum AttrKind {
    Alias(String),
    Aligned(u32),
    AlwaysInline,
    Annotate(String),
    AsmLabel(String),
    Cleanup(DeclHandle),
    Const,
    Constructor(u32),
    Deprecated,
    Destructor(u32),
    Format {
        archetype: String,
        format_idx: u32,
        first_arg: u32,
    },
    NoReturn,
    NoThrow,
    NonNull(Vec<u32>),
    /// Maximum alignment in bits, 0 for the default.
    Packed(u32),
    Pure,
    Regparm(u32),
    Section(String),
    Unused,
    Used,
    /// Visibility level: 0 default, 1 hidden, 2 protected.
    Visibility(u8),
    WarnUnusedResult,
    Weak,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Attr {
    pub kind: AttrKind,
    #[serde(default)]
    pub inherited: bool,
}

impl From<AttrKind> for Attr {
    fn from(kind: AttrKind) -> Self {
        Self {
            kind,
            inherited: false,
        }
    }
}

/// A `name → declarations` entry of a context's visible lookup table.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct LookupEntry {
    pub name: DeclName,
    pub decls: Vec<DeclHandle>,
}

/// Children and lookup table of a declaration that is itself a context.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct DeclContext {
    /// Directly owned declarations, in lexical order.
    #[serde(default)]
    pub decls: Vec<DeclHandle>,
    /// Whether this is the primary context for its entity (as opposed to a redeclaration).
    #[serde(default = "default_true")]
    pub is_primary: bool,
    /// Names visible from this context.
    #[serde(default)]
    pub lookup: Vec<LookupEntry>,
}

fn default_true() -> bool {
    true
}

impl Default for DeclContext {
    fn default() -> Self {
        Self {
            decls: Vec::new(),
            is_primary: true,
            lookup: Vec::new(),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DeclKind {
    TranslationUnit,
    Typedef {
        underlying: QualType,
    },
    Enum {
        integer_type: Option<QualType>,
        #[serde(default)]
        is_definition: bool,
    },
    Record {
        #[serde(default)]
        tag_kind: TagKind,
        #[serde(default)]
        is_definition: bool,
        #[serde(default)]
        has_flexible_array_member: bool,
        #[serde(default)]
        is_anonymous: bool,
    },
    EnumConstant {
        ty: QualType,
        init: Option<StmtHandle>,
        value: ApsInt,
    },
    Function {
        ty: QualType,
        #[serde(default)]
        storage_class: StorageClass,
        #[serde(default)]
        is_inline: bool,
        #[serde(default)]
        is_variadic: bool,
        #[serde(default)]
        previous: Option<DeclHandle>,
        #[serde(default)]
        params: Vec<DeclHandle>,
        #[serde(default)]
        body: Option<StmtHandle>,
    },
    Field {
        ty: QualType,
        #[serde(default)]
        bit_width: Option<StmtHandle>,
        #[serde(default)]
        is_mutable: bool,
    },
    Var {
        ty: QualType,
        #[serde(default)]
        storage_class: StorageClass,
        #[serde(default)]
        is_thread_specified: bool,
        #[serde(default)]
        has_cxx_direct_init: bool,
        #[serde(default)]
        previous: Option<DeclHandle>,
        #[serde(default)]
        init: Option<StmtHandle>,
    },
    ParmVar {
        ty: QualType,
        #[serde(default)]
        storage_class: StorageClass,
        #[serde(default)]
        objc_decl_qualifier: u8,
        /// Type as written before decay, when it differs.
        #[serde(default)]
        original_type: Option<QualType>,
    },
    ObjCMethod {
        #[serde(default = "default_true")]
        is_instance: bool,
        result: QualType,
        #[serde(default)]
        is_variadic: bool,
        #[serde(default)]
        params: Vec<DeclHandle>,
        #[serde(default)]
        body: Option<StmtHandle>,
    },
    ObjCInterface {
        #[serde(default)]
        super_class: Option<DeclHandle>,
        #[serde(default)]
        protocols: Vec<DeclHandle>,
        #[serde(default)]
        ivars: Vec<DeclHandle>,
        #[serde(default)]
        is_forward: bool,
    },
    ObjCProtocol {
        #[serde(default)]
        protocols: Vec<DeclHandle>,
        #[serde(default)]
        is_forward: bool,
    },
    FileScopeAsm {
        asm_string: StmtHandle,
    },
}

impl DeclKind {
    pub fn is_decl_context(&self) -> bool {
        matches!(
            self,
            DeclKind::TranslationUnit
                | DeclKind::Enum { .. }
                | DeclKind::Record { .. }
                | DeclKind::Function { .. }
                | DeclKind::ObjCMethod { .. }
                | DeclKind::ObjCInterface { .. }
                | DeclKind::ObjCProtocol { .. }
        )
    }

    pub fn is_function_or_method(&self) -> bool {
        matches!(self, DeclKind::Function { .. } | DeclKind::ObjCMethod { .. })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            DeclKind::TranslationUnit => "translation-unit",
            DeclKind::Typedef { .. } => "typedef",
            DeclKind::Enum { .. } => "enum",
            DeclKind::Record { .. } => "record",
            DeclKind::EnumConstant { .. } => "enum-constant",
            DeclKind::Function { .. } => "function",
            DeclKind::Field { .. } => "field",
            DeclKind::Var { .. } => "var",
            DeclKind::ParmVar { .. } => "parm-var",
            DeclKind::ObjCMethod { .. } => "objc-method",
            DeclKind::ObjCInterface { .. } => "objc-interface",
            DeclKind::ObjCProtocol { .. } => "objc-protocol",
            DeclKind::FileScopeAsm { .. } => "file-scope-asm",
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Decl {
    #[serde(flatten)]
    pub kind: DeclKind,
    /// Semantic parent; `None` only for the translation unit.
    #[serde(default)]
    pub context: Option<DeclHandle>,
    #[serde(default)]
    pub lexical_context: Option<DeclHandle>,
    #[serde(default)]
    pub location: SourceLocation,
    #[serde(default)]
    pub name: DeclName,
    #[serde(default)]
    pub attrs: Vec<Attr>,
    #[serde(default)]
    pub is_invalid: bool,
    #[serde(default)]
    pub is_implicit: bool,
    #[serde(default)]
    pub is_used: bool,
    /// Present for declarations that own other declarations.
    #[serde(default)]
    pub decl_context: Option<DeclContext>,
}

impl Decl {
    pub fn new(kind: DeclKind) -> Self {
        let decl_context = kind.is_decl_context().then(DeclContext::default);
        Self {
            kind,
            context: None,
            lexical_context: None,
            location: SourceLocation::INVALID,
            name: DeclName::default(),
            attrs: Vec::new(),
            is_invalid: false,
            is_implicit: false,
            is_used: false,
            decl_context,
        }
    }

    pub fn named(mut self, ident: IdentHandle) -> Self {
        self.name = DeclName::Identifier(Some(ident));
        self
    }

    pub fn with_name(mut self, name: DeclName) -> Self {
        self.name = name;
        self
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    pub fn with_attr(mut self, attr: impl Into<Attr>) -> Self {
        self.attrs.push(attr.into());
        self
    }

    /// Declared type of value declarations.
    pub fn value_type(&self) -> Option<QualType> {
        match &self.kind {
            DeclKind::EnumConstant { ty, .. }
            | DeclKind::Function { ty, .. }
            | DeclKind::Field { ty, .. }
            | DeclKind::Var { ty, .. }
            | DeclKind::ParmVar { ty, .. } => Some(*ty),
            _ => None,
        }
    }
}
