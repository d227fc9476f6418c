use astpack_bitstream::constants::{decls, pch, stmts};
use astpack_core::{
    ApInt, ApsInt, ArraySizeModifier, BuiltinKind, Decl, DeclHandle, DeclKind, DeclName,
    ProgramBuilder, QualType, Qualifiers, Stmt, TagKind, Type,
};

use crate::test_utils::{Emitted, function, var};

const INT_REF: u64 = 13 << 3;
const CHAR_S_REF: u64 = 9 << 3;
/// First field after the common fields and a one-field-plus-reference name.
const FIRST_KIND_FIELD: usize = 9;

/// Bit offsets of a declaration context's lexical and visible records.
fn context_offsets(out: &Emitted, decl: DeclHandle) -> (u64, u64) {
    let fields = &out.decl_record(out.decl_id(decl)).fields;
    let n = fields.len();
    (fields[n - 2], fields[n - 1])
}

#[test]
fn enum_and_constants() {
    let mut b = ProgramBuilder::new();
    let tu = b.translation_unit();
    let int = b.builtin(BuiltinKind::Int);
    let color = b.ident("color");
    let red = b.ident("red");
    let enum_decl = b.declare(
        tu,
        Decl::new(DeclKind::Enum {
            integer_type: Some(QualType::new(int)),
            is_definition: true,
        })
        .named(color),
    );
    let enum_ty = b.add_type(Type::Enum { decl: enum_decl });
    let red_decl = b.declare(
        enum_decl,
        Decl::new(DeclKind::EnumConstant {
            ty: QualType::new(int),
            init: None,
            value: ApsInt {
                value: ApInt::from_u64(32, 1),
                is_unsigned: false,
            },
        })
        .named(red),
    );
    let program = b.finish();
    let out = Emitted::new(&program);

    let enum_id = out.decl_id(enum_decl);
    let record = out.decl_record(enum_id);
    assert_eq!(record.code, decls::ENUM);
    assert_eq!(record.fields.len(), 15);
    let enum_ref = (out.type_id(enum_ty) as u64) << 3;
    // type, enum tag, definition, integer type
    assert_eq!(record.fields[9..13], [enum_ref, 3, 1, INT_REF]);
    let type_record = out.type_record(out.type_id(enum_ty));
    assert_eq!(type_record.fields, vec![enum_id as u64]);

    let constant = out.decl_record(out.decl_id(red_decl));
    assert_eq!(constant.code, decls::ENUM_CONSTANT);
    assert_eq!(constant.fields[0], enum_id as u64);
    // type, no initializer, signed 32-bit value 1
    assert_eq!(constant.fields[9..], [INT_REF, 0, 0, 32, 1]);

    let (lexical, visible) = context_offsets(&out, enum_decl);
    let red_id = out.decl_id(red_decl) as u64;
    let red_ident = out.artifact.ids.identifiers.get(red).unwrap() as u64;
    assert_eq!(out.stream.record_at(lexical).unwrap().fields, vec![red_id]);
    assert_eq!(
        out.stream.record_at(visible).unwrap().fields,
        vec![0, red_ident, 1, red_id]
    );
}

#[test]
fn enum_constant_initializer_follows() {
    let mut b = ProgramBuilder::new();
    let tu = b.translation_unit();
    let int = b.builtin(BuiltinKind::Int);
    let name = b.ident("e");
    let big = b.ident("big");
    let enum_decl = b.declare(
        tu,
        Decl::new(DeclKind::Enum {
            integer_type: None,
            is_definition: true,
        })
        .named(name),
    );
    let init = b.add_stmt(Stmt::IntegerLiteral {
        ty: QualType::new(int),
        value: ApInt::from_u64(64, 5_000_000_000),
        loc: Default::default(),
    });
    let constant = b.declare(
        enum_decl,
        Decl::new(DeclKind::EnumConstant {
            ty: QualType::new(int),
            init: Some(init),
            value: ApsInt {
                value: ApInt::from_u64(64, 5_000_000_000),
                is_unsigned: true,
            },
        })
        .named(big),
    );
    let program = b.finish();
    let out = Emitted::new(&program);

    let bit = out.decl_record(out.decl_id(constant)).bit;
    let records: Vec<_> = out
        .stream
        .records()
        .skip_while(|r| r.bit != bit)
        .take(3)
        .collect();
    let codes: Vec<u32> = records.iter().map(|r| r.code).collect();
    assert_eq!(
        codes,
        vec![decls::ENUM_CONSTANT, stmts::INTEGER_LITERAL, stmts::STOP]
    );
    assert_eq!(records[0].fields[9..], [INT_REF, 1, 1, 64, 5_000_000_000]);
}

#[test]
fn protocols_list_what_they_adopt() {
    let mut b = ProgramBuilder::new();
    let tu = b.translation_unit();
    let base_name = b.ident("Base");
    let derived_name = b.ident("Derived");
    let base = b.declare(
        tu,
        Decl::new(DeclKind::ObjCProtocol {
            protocols: Vec::new(),
            is_forward: false,
        })
        .named(base_name),
    );
    let derived = b.declare(
        tu,
        Decl::new(DeclKind::ObjCProtocol {
            protocols: vec![base],
            is_forward: true,
        })
        .named(derived_name),
    );
    let program = b.finish();
    let out = Emitted::new(&program);

    let record = out.decl_record(out.decl_id(base));
    assert_eq!(record.code, decls::OBJC_PROTOCOL);
    // no protocols, not forward, then empty lexical and visible contexts
    assert_eq!(record.fields[FIRST_KIND_FIELD..], [0, 0, 0, 0]);

    let record = out.decl_record(out.decl_id(derived));
    assert_eq!(
        record.fields[FIRST_KIND_FIELD..],
        [1, out.decl_id(base) as u64, 1, 0, 0]
    );
}

#[test]
fn file_scope_asm_is_an_external_definition() {
    let mut b = ProgramBuilder::new();
    let tu = b.translation_unit();
    let char_s = b.builtin(BuiltinKind::CharS);
    let text = b.add_stmt(Stmt::StringLiteral {
        ty: QualType::new(char_s),
        bytes: "nop".to_string(),
        is_wide: false,
        token_locs: Vec::new(),
    });
    let asm = b.declare(tu, Decl::new(DeclKind::FileScopeAsm { asm_string: text }));
    let program = b.finish();
    let out = Emitted::new(&program);

    let asm_id = out.decl_id(asm);
    let bit = out.decl_record(asm_id).bit;
    let records: Vec<_> = out
        .stream
        .records()
        .skip_while(|r| r.bit != bit)
        .take(3)
        .collect();
    let codes: Vec<u32> = records.iter().map(|r| r.code).collect();
    assert_eq!(
        codes,
        vec![decls::FILE_SCOPE_ASM, stmts::STRING_LITERAL, stmts::STOP]
    );
    // common fields only, no name
    assert_eq!(records[0].fields.len(), 7);
    let mut literal = vec![CHAR_S_REF, 3, 0, 0];
    literal.extend(b"nop".iter().map(|&c| c as u64));
    assert_eq!(records[1].fields, literal);

    let external = out.pch_record(pch::EXTERNAL_DEFINITIONS);
    assert_eq!(external.fields, vec![asm_id as u64]);
}

#[test]
fn adjusted_parameter_keeps_its_original_type() {
    let mut b = ProgramBuilder::new();
    let tu = b.translation_unit();
    let int = b.builtin(BuiltinKind::Int);
    let int_ptr = b.pointer_to(int);
    let array = b.add_type(Type::IncompleteArray {
        element: QualType::new(int),
        size_modifier: ArraySizeModifier::Normal,
        index_quals: Qualifiers::NONE,
    });
    let f_type = b.function_proto(int, vec![QualType::new(int_ptr)]);
    let f_name = b.ident("f");
    let p_name = b.ident("p");
    let f = b.declare(tu, Decl::new(function(f_type, Vec::new())).named(f_name));
    let p = b.declare(
        f,
        Decl::new(DeclKind::ParmVar {
            ty: QualType::new(int_ptr),
            storage_class: Default::default(),
            objc_decl_qualifier: 0,
            original_type: Some(QualType::new(array)),
        })
        .named(p_name),
    );
    if let DeclKind::Function { params, .. } = &mut b.decl_mut(f).kind {
        params.push(p);
    }
    let program = b.finish();
    let out = Emitted::new(&program);

    let record = out.decl_record(out.decl_id(p));
    assert_eq!(record.code, decls::ORIGINAL_PARM_VAR);
    let ptr_ref = (out.type_id(int_ptr) as u64) << 3;
    let array_ref = (out.type_id(array) as u64) << 3;
    // type, storage, Objective-C qualifier, original type
    assert_eq!(record.fields[FIRST_KIND_FIELD..], [ptr_ref, 0, 0, array_ref]);
}

#[test]
fn special_member_names_in_class_lookup() {
    let mut b = ProgramBuilder::new();
    let tu = b.translation_unit();
    let int = b.builtin(BuiltinKind::Int);
    let method_type = b.function_proto(int, Vec::new());
    let widget = b.ident("Widget");
    let class = b.declare(
        tu,
        Decl::new(DeclKind::Record {
            tag_kind: TagKind::Class,
            is_definition: true,
            has_flexible_array_member: false,
            is_anonymous: false,
        })
        .named(widget),
    );
    let class_ty = b.add_type(Type::Record { decl: class });
    let names = [
        DeclName::CxxConstructor(QualType::new(class_ty)),
        DeclName::CxxDestructor(QualType::new(class_ty)),
        DeclName::CxxConversion(QualType::new(int)),
        DeclName::CxxOperator(5),
    ];
    let members: Vec<DeclHandle> = names
        .into_iter()
        .map(|name| {
            b.declare(
                class,
                Decl::new(function(method_type, Vec::new())).with_name(name),
            )
        })
        .collect();
    let using = b.declare(
        class,
        Decl::new(var(int)).with_name(DeclName::CxxUsingDirective),
    );
    let program = b.finish();
    let out = Emitted::new(&program);

    let class_ref = (out.type_id(class_ty) as u64) << 3;
    let ids: Vec<u64> = members.iter().map(|&m| out.decl_id(m) as u64).collect();
    let using_id = out.decl_id(using) as u64;

    let (_, visible) = context_offsets(&out, class);
    let record = out.stream.record_at(visible).unwrap();
    assert_eq!(record.code, decls::CONTEXT_VISIBLE);
    assert_eq!(
        record.fields,
        vec![
            4, class_ref, 1, ids[0],
            5, class_ref, 1, ids[1],
            6, INT_REF, 1, ids[2],
            7, 5, 1, ids[3],
            8, 1, using_id,
        ]
    );

    let ctor = out.decl_record(ids[0] as u32);
    assert_eq!(ctor.fields[7..9], [4, class_ref]);
    let op = out.decl_record(ids[3] as u32);
    assert_eq!(op.fields[7..9], [7, 5]);
    // the using-directive name has no payload, so the type comes right after it
    let record = out.decl_record(using_id as u32);
    assert_eq!(record.code, decls::VAR);
    assert_eq!(record.fields[7..9], [8, INT_REF]);
}
