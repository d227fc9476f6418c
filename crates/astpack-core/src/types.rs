//! The type graph.

use serde::{Deserialize, Serialize};

use crate::{DeclHandle, StmtHandle, TypeHandle};

/// CVR qualifier bits carried on a [`QualType`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Qualifiers(pub u8);

impl Qualifiers {
    pub const NONE: Self = Self(0);
    pub const CONST: Self = Self(0b001);
    pub const RESTRICT: Self = Self(0b010);
    pub const VOLATILE: Self = Self(0b100);

    /// Only the low three bits are meaningful.
    #[inline]
    pub fn cvr(self) -> u8 {
        self.0 & 0b111
    }

    #[inline]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// A type plus CVR qualifiers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct QualType {
    pub ty: TypeHandle,
    #[serde(default)]
    pub quals: Qualifiers,
}

impl QualType {
    pub fn new(ty: TypeHandle) -> Self {
        Self {
            ty,
            quals: Qualifiers::NONE,
        }
    }

    pub fn with_quals(ty: TypeHandle, quals: Qualifiers) -> Self {
        Self { ty, quals }
    }
}

impl From<TypeHandle> for QualType {
    fn from(ty: TypeHandle) -> Self {
        Self::new(ty)
    }
}

/// Scalar types with reserved IDs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum BuiltinKind {
    Void,
    Bool,
    /// `char` on targets where it is unsigned.
    CharU,
    UChar,
    UShort,
    UInt,
    ULong,
    ULongLong,
    /// `char` on targets where it is signed.
    CharS,
    SChar,
    WChar,
    Short,
    Int,
    Long,
    LongLong,
    Float,
    Double,
    LongDouble,
    Overload,
    Dependent,
}

/// Arbitrary-precision integer, little-endian 64-bit words.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ApInt {
    pub bit_width: u32,
    pub words: Vec<u64>,
}

impl ApInt {
    pub fn from_u64(bit_width: u32, value: u64) -> Self {
        Self {
            bit_width,
            words: vec![value],
        }
    }
}

/// [`ApInt`] with signedness.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ApsInt {
    pub value: ApInt,
    pub is_unsigned: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum ArraySizeModifier {
    #[default]
    Normal,
    Static,
    Star,
}

/// Kinds of dependent types. None of them can be serialized.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum DependentKind {
    TemplateTypeParm,
    DependentSizedArray,
    DependentSizedExtVector,
    Typename,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Type {
    Builtin {
        builtin: BuiltinKind,
    },
    /// Address-space or garbage-collection qualified wrapper.
    ExtQual {
        base: TypeHandle,
        gc_attr: u8,
        address_space: u32,
    },
    FixedWidthInt {
        width: u32,
        is_signed: bool,
    },
    Complex {
        element: QualType,
    },
    Pointer {
        pointee: QualType,
    },
    BlockPointer {
        pointee: QualType,
    },
    LValueReference {
        pointee: QualType,
    },
    RValueReference {
        pointee: QualType,
    },
    MemberPointer {
        pointee: QualType,
        class: TypeHandle,
    },
    ConstantArray {
        element: QualType,
        #[serde(default)]
        size_modifier: ArraySizeModifier,
        #[serde(default)]
        index_quals: Qualifiers,
        size: ApInt,
    },
    IncompleteArray {
        element: QualType,
        #[serde(default)]
        size_modifier: ArraySizeModifier,
        #[serde(default)]
        index_quals: Qualifiers,
    },
    VariableArray {
        element: QualType,
        #[serde(default)]
        size_modifier: ArraySizeModifier,
        #[serde(default)]
        index_quals: Qualifiers,
        size_expr: Option<StmtHandle>,
    },
    Vector {
        element: QualType,
        num_elements: u32,
    },
    ExtVector {
        element: QualType,
        num_elements: u32,
    },
    FunctionNoProto {
        result: QualType,
    },
    FunctionProto {
        result: QualType,
        #[serde(default)]
        params: Vec<QualType>,
        #[serde(default)]
        is_variadic: bool,
        #[serde(default)]
        type_quals: Qualifiers,
    },
    Typedef {
        decl: DeclHandle,
    },
    TypeOfExpr {
        expr: StmtHandle,
    },
    TypeOf {
        underlying: QualType,
    },
    Record {
        decl: DeclHandle,
    },
    Enum {
        decl: DeclHandle,
    },
    ObjCInterface {
        decl: DeclHandle,
    },
    ObjCQualifiedInterface {
        decl: DeclHandle,
        protocols: Vec<DeclHandle>,
    },
    ObjCQualifiedId {
        protocols: Vec<DeclHandle>,
    },
    TemplateSpecialization {
        template_name: String,
    },
    QualifiedName {
        qualifier: String,
        named: TypeHandle,
    },
    Dependent {
        dependent: DependentKind,
    },
}

impl Type {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Type::Builtin { .. } => "builtin",
            Type::ExtQual { .. } => "ext-qual",
            Type::FixedWidthInt { .. } => "fixed-width-int",
            Type::Complex { .. } => "complex",
            Type::Pointer { .. } => "pointer",
            Type::BlockPointer { .. } => "block-pointer",
            Type::LValueReference { .. } => "lvalue-reference",
            Type::RValueReference { .. } => "rvalue-reference",
            Type::MemberPointer { .. } => "member-pointer",
            Type::ConstantArray { .. } => "constant-array",
            Type::IncompleteArray { .. } => "incomplete-array",
            Type::VariableArray { .. } => "variable-array",
            Type::Vector { .. } => "vector",
            Type::ExtVector { .. } => "ext-vector",
            Type::FunctionNoProto { .. } => "function-no-proto",
            Type::FunctionProto { .. } => "function-proto",
            Type::Typedef { .. } => "typedef",
            Type::TypeOfExpr { .. } => "typeof-expr",
            Type::TypeOf { .. } => "typeof",
            Type::Record { .. } => "record",
            Type::Enum { .. } => "enum",
            Type::ObjCInterface { .. } => "objc-interface",
            Type::ObjCQualifiedInterface { .. } => "objc-qualified-interface",
            Type::ObjCQualifiedId { .. } => "objc-qualified-id",
            Type::TemplateSpecialization { .. } => "template-specialization",
            Type::QualifiedName { .. } => "qualified-name",
            Type::Dependent { .. } => "dependent",
        }
    }

    pub fn builtin_kind(&self) -> Option<BuiltinKind> {
        match self {
            Type::Builtin { builtin } => Some(*builtin),
            _ => None,
        }
    }
}
