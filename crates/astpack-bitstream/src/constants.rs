//! Format constants: magic, block IDs, record codes, predefined type IDs.
//!
//! Every value here is part of the on-disk contract. Renumbering anything
//! breaks existing readers.

/// File header bytes.
pub const MAGIC: [u8; 4] = *b"CPCH";

// ============================================================================
// Abbreviation IDs
// ============================================================================

pub const END_BLOCK: u32 = 0;
pub const ENTER_SUBBLOCK: u32 = 1;
pub const DEFINE_ABBREV: u32 = 2;
pub const UNABBREV_RECORD: u32 = 3;
/// First ID handed out to application-defined abbreviations.
pub const FIRST_APPLICATION_ABBREV: u32 = 4;

/// Abbreviation width in force outside any block.
pub const TOP_LEVEL_CODE_WIDTH: u8 = 2;

// ============================================================================
// Blocks
// ============================================================================

pub const BLOCKINFO_BLOCK_ID: u32 = 0;
pub const PCH_BLOCK_ID: u32 = 8;
pub const SOURCE_MANAGER_BLOCK_ID: u32 = 9;
pub const PREPROCESSOR_BLOCK_ID: u32 = 10;
pub const TYPES_BLOCK_ID: u32 = 11;
pub const DECLS_BLOCK_ID: u32 = 12;

/// Abbreviation widths per block.
pub const BLOCKINFO_CODE_WIDTH: u8 = 3;
pub const PCH_CODE_WIDTH: u8 = 4;
pub const SOURCE_MANAGER_CODE_WIDTH: u8 = 3;
pub const PREPROCESSOR_CODE_WIDTH: u8 = 2;
pub const TYPES_CODE_WIDTH: u8 = 2;
pub const DECLS_CODE_WIDTH: u8 = 3;

/// Records of the block-info block.
pub mod blockinfo {
    pub const SETBID: u32 = 1;
    pub const BLOCKNAME: u32 = 2;
    pub const SETRECORDNAME: u32 = 3;
}

/// Records of the top-level PCH block.
pub mod pch {
    pub const TYPE_OFFSET: u32 = 1;
    pub const DECL_OFFSET: u32 = 2;
    pub const LANGUAGE_OPTIONS: u32 = 3;
    pub const TARGET_TRIPLE: u32 = 4;
    pub const IDENTIFIER_OFFSET: u32 = 5;
    pub const IDENTIFIER_TABLE: u32 = 6;
    pub const EXTERNAL_DEFINITIONS: u32 = 7;
    pub const SPECIAL_TYPES: u32 = 8;
    pub const STATISTICS: u32 = 9;
    pub const TENTATIVE_DEFINITIONS: u32 = 10;
    pub const LOCALLY_SCOPED_EXTERNAL_DECLS: u32 = 11;
    pub const SELECTOR_OFFSETS: u32 = 12;
    pub const METHOD_POOL: u32 = 13;
    pub const PP_COUNTER_VALUE: u32 = 14;
}

pub mod source_manager {
    pub const SLOC_FILE_ENTRY: u32 = 1;
    pub const SLOC_BUFFER_ENTRY: u32 = 2;
    pub const SLOC_BUFFER_BLOB: u32 = 3;
    pub const SLOC_INSTANTIATION_ENTRY: u32 = 4;
    pub const LINE_TABLE: u32 = 5;
    pub const HEADER_FILE_INFO: u32 = 6;
}

pub mod preprocessor {
    pub const MACRO_OBJECT_LIKE: u32 = 1;
    pub const MACRO_FUNCTION_LIKE: u32 = 2;
    pub const TOKEN: u32 = 3;
}

pub mod types {
    pub const EXT_QUAL: u32 = 1;
    pub const FIXED_WIDTH_INT: u32 = 2;
    pub const COMPLEX: u32 = 3;
    pub const POINTER: u32 = 4;
    pub const BLOCK_POINTER: u32 = 5;
    pub const LVALUE_REFERENCE: u32 = 6;
    pub const RVALUE_REFERENCE: u32 = 7;
    pub const MEMBER_POINTER: u32 = 8;
    pub const CONSTANT_ARRAY: u32 = 9;
    pub const INCOMPLETE_ARRAY: u32 = 10;
    pub const VARIABLE_ARRAY: u32 = 11;
    pub const VECTOR: u32 = 12;
    pub const EXT_VECTOR: u32 = 13;
    pub const FUNCTION_PROTO: u32 = 14;
    pub const FUNCTION_NO_PROTO: u32 = 15;
    pub const TYPEDEF: u32 = 16;
    pub const TYPEOF_EXPR: u32 = 17;
    pub const TYPEOF: u32 = 18;
    pub const RECORD: u32 = 19;
    pub const ENUM: u32 = 20;
    pub const OBJC_INTERFACE: u32 = 21;
    pub const OBJC_QUALIFIED_INTERFACE: u32 = 22;
    pub const OBJC_QUALIFIED_ID: u32 = 23;
}

/// Records of the declarations block.
pub mod decls {
    pub const ATTR: u32 = 1;
    pub const TRANSLATION_UNIT: u32 = 2;
    pub const TYPEDEF: u32 = 3;
    pub const ENUM: u32 = 4;
    pub const RECORD: u32 = 5;
    pub const ENUM_CONSTANT: u32 = 6;
    pub const FUNCTION: u32 = 7;
    pub const OBJC_METHOD: u32 = 8;
    pub const OBJC_INTERFACE: u32 = 9;
    pub const OBJC_PROTOCOL: u32 = 10;
    pub const FIELD: u32 = 21;
    pub const VAR: u32 = 22;
    pub const PARM_VAR: u32 = 24;
    pub const ORIGINAL_PARM_VAR: u32 = 25;
    pub const FILE_SCOPE_ASM: u32 = 26;
    pub const CONTEXT_LEXICAL: u32 = 28;
    pub const CONTEXT_VISIBLE: u32 = 29;
}

/// Statement and expression records, written inline after the record that owns them.
pub mod stmts {
    pub const STOP: u32 = 100;
    pub const NULL_PTR: u32 = 101;
    pub const NULL: u32 = 102;
    pub const COMPOUND: u32 = 103;
    pub const IF: u32 = 104;
    pub const WHILE: u32 = 105;
    pub const RETURN: u32 = 106;
    pub const DECL: u32 = 107;
    pub const DECL_REF: u32 = 108;
    pub const INTEGER_LITERAL: u32 = 109;
    pub const FLOATING_LITERAL: u32 = 110;
    pub const STRING_LITERAL: u32 = 111;
    pub const CHARACTER_LITERAL: u32 = 112;
    pub const PAREN: u32 = 113;
    pub const UNARY_OPERATOR: u32 = 114;
    pub const BINARY_OPERATOR: u32 = 115;
    pub const CALL: u32 = 116;
    pub const IMPLICIT_CAST: u32 = 117;
    pub const CSTYLE_CAST: u32 = 118;
}

// ============================================================================
// Predefined type IDs
// ============================================================================

pub const PREDEF_TYPE_NULL_ID: u32 = 0;
pub const PREDEF_TYPE_VOID_ID: u32 = 1;
pub const PREDEF_TYPE_BOOL_ID: u32 = 2;
pub const PREDEF_TYPE_CHAR_U_ID: u32 = 3;
pub const PREDEF_TYPE_UCHAR_ID: u32 = 4;
pub const PREDEF_TYPE_USHORT_ID: u32 = 5;
pub const PREDEF_TYPE_UINT_ID: u32 = 6;
pub const PREDEF_TYPE_ULONG_ID: u32 = 7;
pub const PREDEF_TYPE_ULONGLONG_ID: u32 = 8;
pub const PREDEF_TYPE_CHAR_S_ID: u32 = 9;
pub const PREDEF_TYPE_SCHAR_ID: u32 = 10;
pub const PREDEF_TYPE_WCHAR_ID: u32 = 11;
pub const PREDEF_TYPE_SHORT_ID: u32 = 12;
pub const PREDEF_TYPE_INT_ID: u32 = 13;
pub const PREDEF_TYPE_LONG_ID: u32 = 14;
pub const PREDEF_TYPE_LONGLONG_ID: u32 = 15;
pub const PREDEF_TYPE_FLOAT_ID: u32 = 16;
pub const PREDEF_TYPE_DOUBLE_ID: u32 = 17;
pub const PREDEF_TYPE_LONGDOUBLE_ID: u32 = 18;
pub const PREDEF_TYPE_OVERLOAD_ID: u32 = 19;
pub const PREDEF_TYPE_DEPENDENT_ID: u32 = 20;

/// Number of reserved type IDs; the allocator starts here.
pub const NUM_PREDEF_TYPE_IDS: u32 = 100;

/// Type references carry CVR qualifiers in their low bits.
pub const TYPE_QUAL_BITS: u32 = 3;

// ============================================================================
// Names
// ============================================================================

/// Block and record names registered in the block-info block.
pub struct BlockSchema {
    pub block_id: u32,
    pub name: &'static str,
    pub records: &'static [(u32, &'static str)],
    /// Statements may follow records of this block.
    pub has_stmts: bool,
}

pub const STMT_RECORDS: &[(u32, &str)] = &[
    (stmts::STOP, "STMT_STOP"),
    (stmts::NULL_PTR, "STMT_NULL_PTR"),
    (stmts::NULL, "STMT_NULL"),
    (stmts::COMPOUND, "STMT_COMPOUND"),
    (stmts::IF, "STMT_IF"),
    (stmts::WHILE, "STMT_WHILE"),
    (stmts::RETURN, "STMT_RETURN"),
    (stmts::DECL, "STMT_DECL"),
    (stmts::DECL_REF, "EXPR_DECL_REF"),
    (stmts::INTEGER_LITERAL, "EXPR_INTEGER_LITERAL"),
    (stmts::FLOATING_LITERAL, "EXPR_FLOATING_LITERAL"),
    (stmts::STRING_LITERAL, "EXPR_STRING_LITERAL"),
    (stmts::CHARACTER_LITERAL, "EXPR_CHARACTER_LITERAL"),
    (stmts::PAREN, "EXPR_PAREN"),
    (stmts::UNARY_OPERATOR, "EXPR_UNARY_OPERATOR"),
    (stmts::BINARY_OPERATOR, "EXPR_BINARY_OPERATOR"),
    (stmts::CALL, "EXPR_CALL"),
    (stmts::IMPLICIT_CAST, "EXPR_IMPLICIT_CAST"),
    (stmts::CSTYLE_CAST, "EXPR_CSTYLE_CAST"),
];

pub const SCHEMA: &[BlockSchema] = &[
    BlockSchema {
        block_id: PCH_BLOCK_ID,
        name: "PCH_BLOCK",
        records: &[
            (pch::TYPE_OFFSET, "TYPE_OFFSET"),
            (pch::DECL_OFFSET, "DECL_OFFSET"),
            (pch::LANGUAGE_OPTIONS, "LANGUAGE_OPTIONS"),
            (pch::TARGET_TRIPLE, "TARGET_TRIPLE"),
            (pch::IDENTIFIER_OFFSET, "IDENTIFIER_OFFSET"),
            (pch::IDENTIFIER_TABLE, "IDENTIFIER_TABLE"),
            (pch::EXTERNAL_DEFINITIONS, "EXTERNAL_DEFINITIONS"),
            (pch::SPECIAL_TYPES, "SPECIAL_TYPES"),
            (pch::STATISTICS, "STATISTICS"),
            (pch::TENTATIVE_DEFINITIONS, "TENTATIVE_DEFINITIONS"),
            (pch::LOCALLY_SCOPED_EXTERNAL_DECLS, "LOCALLY_SCOPED_EXTERNAL_DECLS"),
            (pch::SELECTOR_OFFSETS, "SELECTOR_OFFSETS"),
            (pch::METHOD_POOL, "METHOD_POOL"),
            (pch::PP_COUNTER_VALUE, "PP_COUNTER_VALUE"),
        ],
        has_stmts: false,
    },
    BlockSchema {
        block_id: SOURCE_MANAGER_BLOCK_ID,
        name: "SOURCE_MANAGER_BLOCK",
        records: &[
            (source_manager::SLOC_FILE_ENTRY, "SLOC_FILE_ENTRY"),
            (source_manager::SLOC_BUFFER_ENTRY, "SLOC_BUFFER_ENTRY"),
            (source_manager::SLOC_BUFFER_BLOB, "SLOC_BUFFER_BLOB"),
            (source_manager::SLOC_INSTANTIATION_ENTRY, "SLOC_INSTANTIATION_ENTRY"),
            (source_manager::LINE_TABLE, "SOURCE_LINE_TABLE"),
            (source_manager::HEADER_FILE_INFO, "HEADER_FILE_INFO"),
        ],
        has_stmts: false,
    },
    BlockSchema {
        block_id: PREPROCESSOR_BLOCK_ID,
        name: "PREPROCESSOR_BLOCK",
        records: &[
            (preprocessor::MACRO_OBJECT_LIKE, "PP_MACRO_OBJECT_LIKE"),
            (preprocessor::MACRO_FUNCTION_LIKE, "PP_MACRO_FUNCTION_LIKE"),
            (preprocessor::TOKEN, "PP_TOKEN"),
        ],
        has_stmts: false,
    },
    BlockSchema {
        block_id: TYPES_BLOCK_ID,
        name: "TYPES_BLOCK",
        records: &[
            (types::EXT_QUAL, "TYPE_EXT_QUAL"),
            (types::FIXED_WIDTH_INT, "TYPE_FIXED_WIDTH_INT"),
            (types::COMPLEX, "TYPE_COMPLEX"),
            (types::POINTER, "TYPE_POINTER"),
            (types::BLOCK_POINTER, "TYPE_BLOCK_POINTER"),
            (types::LVALUE_REFERENCE, "TYPE_LVALUE_REFERENCE"),
            (types::RVALUE_REFERENCE, "TYPE_RVALUE_REFERENCE"),
            (types::MEMBER_POINTER, "TYPE_MEMBER_POINTER"),
            (types::CONSTANT_ARRAY, "TYPE_CONSTANT_ARRAY"),
            (types::INCOMPLETE_ARRAY, "TYPE_INCOMPLETE_ARRAY"),
            (types::VARIABLE_ARRAY, "TYPE_VARIABLE_ARRAY"),
            (types::VECTOR, "TYPE_VECTOR"),
            (types::EXT_VECTOR, "TYPE_EXT_VECTOR"),
            (types::FUNCTION_PROTO, "TYPE_FUNCTION_PROTO"),
            (types::FUNCTION_NO_PROTO, "TYPE_FUNCTION_NO_PROTO"),
            (types::TYPEDEF, "TYPE_TYPEDEF"),
            (types::TYPEOF_EXPR, "TYPE_TYPEOF_EXPR"),
            (types::TYPEOF, "TYPE_TYPEOF"),
            (types::RECORD, "TYPE_RECORD"),
            (types::ENUM, "TYPE_ENUM"),
            (types::OBJC_INTERFACE, "TYPE_OBJC_INTERFACE"),
            (types::OBJC_QUALIFIED_INTERFACE, "TYPE_OBJC_QUALIFIED_INTERFACE"),
            (types::OBJC_QUALIFIED_ID, "TYPE_OBJC_QUALIFIED_ID"),
        ],
        has_stmts: true,
    },
    BlockSchema {
        block_id: DECLS_BLOCK_ID,
        name: "DECLS_BLOCK",
        records: &[
            (decls::ATTR, "DECL_ATTR"),
            (decls::TRANSLATION_UNIT, "DECL_TRANSLATION_UNIT"),
            (decls::TYPEDEF, "DECL_TYPEDEF"),
            (decls::ENUM, "DECL_ENUM"),
            (decls::RECORD, "DECL_RECORD"),
            (decls::ENUM_CONSTANT, "DECL_ENUM_CONSTANT"),
            (decls::FUNCTION, "DECL_FUNCTION"),
            (decls::OBJC_METHOD, "DECL_OBJC_METHOD"),
            (decls::OBJC_INTERFACE, "DECL_OBJC_INTERFACE"),
            (decls::OBJC_PROTOCOL, "DECL_OBJC_PROTOCOL"),
            (decls::FIELD, "DECL_FIELD"),
            (decls::VAR, "DECL_VAR"),
            (decls::PARM_VAR, "DECL_PARM_VAR"),
            (decls::ORIGINAL_PARM_VAR, "DECL_ORIGINAL_PARM_VAR"),
            (decls::FILE_SCOPE_ASM, "DECL_FILE_SCOPE_ASM"),
            (decls::CONTEXT_LEXICAL, "DECL_CONTEXT_LEXICAL"),
            (decls::CONTEXT_VISIBLE, "DECL_CONTEXT_VISIBLE"),
        ],
        has_stmts: true,
    },
];
