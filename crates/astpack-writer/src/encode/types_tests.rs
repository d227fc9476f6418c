use astpack_bitstream::constants::{TYPES_BLOCK_ID, decls, stmts, types};
use astpack_bitstream::reader::Record;
use astpack_core::{
    ApInt, ArraySizeModifier, BuiltinKind, Decl, DeclKind, ProgramBuilder, QualType, Qualifiers,
    SourceLocation, Stmt, TagKind, Type, TypeHandle,
};
use insta::assert_snapshot;

use crate::test_utils::{Emitted, var};
use crate::{EmitError, emit};

const INT_REF: u64 = 13 << 3;

/// Give `ty` a file-scope variable so it reaches the type queue.
fn keep(b: &mut ProgramBuilder, ty: TypeHandle) {
    let tu = b.translation_unit();
    let name = b.ident(&format!("v{}", ty.0));
    b.declare(tu, Decl::new(var(ty)).named(name));
}

fn type_ref(out: &Emitted, ty: TypeHandle) -> u64 {
    (out.type_id(ty) as u64) << 3
}

fn record_of<'a>(out: &'a Emitted, ty: TypeHandle) -> &'a Record {
    out.type_record(out.type_id(ty))
}

/// The record written for `ty` and the `count - 1` records after it.
fn records_from<'a>(out: &'a Emitted, ty: TypeHandle, count: usize) -> Vec<&'a Record> {
    let bit = record_of(out, ty).bit;
    out.stream
        .records()
        .skip_while(|r| r.bit != bit)
        .take(count)
        .collect()
}

#[test]
fn wrapper_types_reference_what_they_wrap() {
    let mut b = ProgramBuilder::new();
    let int = b.builtin(BuiltinKind::Int);
    let ext = b.add_type(Type::ExtQual {
        base: int,
        gc_attr: 1,
        address_space: 3,
    });
    let fixed = b.add_type(Type::FixedWidthInt {
        width: 24,
        is_signed: true,
    });
    let complex = b.add_type(Type::Complex {
        element: QualType::with_quals(int, Qualifiers::CONST),
    });
    let block = b.add_type(Type::BlockPointer {
        pointee: QualType::new(int),
    });
    let lvalue = b.add_type(Type::LValueReference {
        pointee: QualType::new(int),
    });
    let rvalue = b.add_type(Type::RValueReference {
        pointee: QualType::new(int),
    });
    let no_proto = b.add_type(Type::FunctionNoProto {
        result: QualType::new(int),
    });
    let type_of = b.add_type(Type::TypeOf {
        underlying: QualType::new(int),
    });
    for ty in [ext, fixed, complex, block, lvalue, rvalue, no_proto, type_of] {
        keep(&mut b, ty);
    }
    let program = b.finish();
    let out = Emitted::new(&program);

    let expected = [
        (ext, types::EXT_QUAL, vec![INT_REF, 1, 3]),
        (fixed, types::FIXED_WIDTH_INT, vec![24, 1]),
        (complex, types::COMPLEX, vec![INT_REF | 1]),
        (block, types::BLOCK_POINTER, vec![INT_REF]),
        (lvalue, types::LVALUE_REFERENCE, vec![INT_REF]),
        (rvalue, types::RVALUE_REFERENCE, vec![INT_REF]),
        (no_proto, types::FUNCTION_NO_PROTO, vec![INT_REF]),
        (type_of, types::TYPEOF, vec![INT_REF]),
    ];
    for (ty, code, fields) in expected {
        let record = record_of(&out, ty);
        assert_eq!(record.code, code, "{ty}");
        assert_eq!(record.fields, fields, "{ty}");
    }
}

#[test]
fn member_pointer_names_its_class() {
    let mut b = ProgramBuilder::new();
    let tu = b.translation_unit();
    let int = b.builtin(BuiltinKind::Int);
    let s = b.ident("S");
    let class = b.declare(
        tu,
        Decl::new(DeclKind::Record {
            tag_kind: TagKind::Class,
            is_definition: false,
            has_flexible_array_member: false,
            is_anonymous: false,
        })
        .named(s),
    );
    let class_ty = b.add_type(Type::Record { decl: class });
    let member = b.add_type(Type::MemberPointer {
        pointee: QualType::new(int),
        class: class_ty,
    });
    keep(&mut b, member);
    let program = b.finish();
    let out = Emitted::new(&program);

    let record = record_of(&out, member);
    assert_eq!(record.code, types::MEMBER_POINTER);
    assert_eq!(record.fields, vec![INT_REF, type_ref(&out, class_ty)]);

    let class_record = record_of(&out, class_ty);
    assert_eq!(class_record.code, types::RECORD);
    assert_eq!(class_record.fields, vec![out.decl_id(class) as u64]);
}

#[test]
fn array_forms() {
    let mut b = ProgramBuilder::new();
    let int = b.builtin(BuiltinKind::Int);
    let constant = b.add_type(Type::ConstantArray {
        element: QualType::new(int),
        size_modifier: ArraySizeModifier::Static,
        index_quals: Qualifiers::CONST,
        size: ApInt::from_u64(32, 4),
    });
    // Missing high words are written as zero.
    let wide = b.add_type(Type::ConstantArray {
        element: QualType::new(int),
        size_modifier: ArraySizeModifier::Normal,
        index_quals: Qualifiers::NONE,
        size: ApInt::from_u64(128, 7),
    });
    let incomplete = b.add_type(Type::IncompleteArray {
        element: QualType::new(int),
        size_modifier: ArraySizeModifier::Normal,
        index_quals: Qualifiers::NONE,
    });
    let star = b.add_type(Type::VariableArray {
        element: QualType::new(int),
        size_modifier: ArraySizeModifier::Star,
        index_quals: Qualifiers::NONE,
        size_expr: None,
    });
    for ty in [constant, wide, incomplete, star] {
        keep(&mut b, ty);
    }
    let program = b.finish();
    let out = Emitted::new(&program);

    let record = record_of(&out, constant);
    assert_eq!(record.code, types::CONSTANT_ARRAY);
    assert_eq!(record.fields, vec![INT_REF, 1, 1, 32, 4]);

    assert_eq!(record_of(&out, wide).fields, vec![INT_REF, 0, 0, 128, 7, 0]);

    let record = record_of(&out, incomplete);
    assert_eq!(record.code, types::INCOMPLETE_ARRAY);
    assert_eq!(record.fields, vec![INT_REF, 0, 0]);

    // `int[*]` has no size expression, so a null statement stands in for it.
    let records = records_from(&out, star, 3);
    let codes: Vec<u32> = records.iter().map(|r| r.code).collect();
    assert_eq!(
        codes,
        vec![types::VARIABLE_ARRAY, stmts::NULL_PTR, stmts::STOP]
    );
    assert_eq!(records[0].fields, vec![INT_REF, 2, 0]);
}

#[test]
fn variable_array_size_follows_in_the_types_block() {
    let mut b = ProgramBuilder::new();
    let int = b.builtin(BuiltinKind::Int);
    let size = b.add_stmt(Stmt::IntegerLiteral {
        ty: QualType::new(int),
        value: ApInt::from_u64(32, 8),
        loc: SourceLocation(4),
    });
    let vla = b.add_type(Type::VariableArray {
        element: QualType::new(int),
        size_modifier: ArraySizeModifier::Normal,
        index_quals: Qualifiers::NONE,
        size_expr: Some(size),
    });
    keep(&mut b, vla);
    let program = b.finish();
    let out = Emitted::new(&program);

    let records = records_from(&out, vla, 3);
    let codes: Vec<u32> = records.iter().map(|r| r.code).collect();
    assert_eq!(
        codes,
        vec![types::VARIABLE_ARRAY, stmts::INTEGER_LITERAL, stmts::STOP]
    );
    assert_eq!(records[0].fields, vec![INT_REF, 0, 0]);
    assert_eq!(records[1].fields, vec![INT_REF, 4, 32, 8]);
    assert!(records.iter().all(|r| r.block_id == TYPES_BLOCK_ID));
}

#[test]
fn vectors_carry_their_length() {
    let mut b = ProgramBuilder::new();
    let int = b.builtin(BuiltinKind::Int);
    let vector = b.add_type(Type::Vector {
        element: QualType::new(int),
        num_elements: 4,
    });
    let ext = b.add_type(Type::ExtVector {
        element: QualType::new(int),
        num_elements: 3,
    });
    keep(&mut b, vector);
    keep(&mut b, ext);
    let program = b.finish();
    let out = Emitted::new(&program);

    let record = record_of(&out, vector);
    assert_eq!(record.code, types::VECTOR);
    assert_eq!(record.fields, vec![INT_REF, 4]);
    let record = record_of(&out, ext);
    assert_eq!(record.code, types::EXT_VECTOR);
    assert_eq!(record.fields, vec![INT_REF, 3]);
}

#[test]
fn typedef_and_its_declaration_point_at_each_other() {
    let mut b = ProgramBuilder::new();
    let tu = b.translation_unit();
    let int = b.builtin(BuiltinKind::Int);
    let name = b.ident("myint");
    let typedef = b.declare(
        tu,
        Decl::new(DeclKind::Typedef {
            underlying: QualType::new(int),
        })
        .named(name),
    );
    let typedef_ty = b.add_type(Type::Typedef { decl: typedef });
    keep(&mut b, typedef_ty);
    let program = b.finish();
    let out = Emitted::new(&program);

    let record = record_of(&out, typedef_ty);
    assert_eq!(record.code, types::TYPEDEF);
    assert_eq!(record.fields, vec![out.decl_id(typedef) as u64]);

    let decl = out.decl_record(out.decl_id(typedef));
    assert_eq!(decl.code, decls::TYPEDEF);
    assert_eq!(decl.fields.len(), 11);
    assert_eq!(decl.fields[9], type_ref(&out, typedef_ty));
    assert_eq!(decl.fields[10], INT_REF);
}

#[test]
fn typeof_expression_is_written_after_its_type() {
    let mut b = ProgramBuilder::new();
    let int = b.builtin(BuiltinKind::Int);
    let expr = b.add_stmt(Stmt::IntegerLiteral {
        ty: QualType::new(int),
        value: ApInt::from_u64(32, 42),
        loc: SourceLocation(2),
    });
    let type_of = b.add_type(Type::TypeOfExpr { expr });
    keep(&mut b, type_of);
    let program = b.finish();
    let out = Emitted::new(&program);

    let records = records_from(&out, type_of, 3);
    let codes: Vec<u32> = records.iter().map(|r| r.code).collect();
    assert_eq!(
        codes,
        vec![types::TYPEOF_EXPR, stmts::INTEGER_LITERAL, stmts::STOP]
    );
    assert!(records[0].fields.is_empty());
    assert_eq!(records[1].fields, vec![INT_REF, 2, 32, 42]);
    assert!(records.iter().all(|r| r.block_id == TYPES_BLOCK_ID));
}

#[test]
fn objc_types_reference_their_declarations() {
    let mut b = ProgramBuilder::new();
    let tu = b.translation_unit();
    let foo = b.ident("Foo");
    let copying = b.ident("Copying");
    let interface = b.declare(
        tu,
        Decl::new(DeclKind::ObjCInterface {
            super_class: None,
            protocols: Vec::new(),
            ivars: Vec::new(),
            is_forward: false,
        })
        .named(foo),
    );
    let protocol = b.declare(
        tu,
        Decl::new(DeclKind::ObjCProtocol {
            protocols: Vec::new(),
            is_forward: false,
        })
        .named(copying),
    );
    let interface_ty = b.add_type(Type::ObjCInterface { decl: interface });
    let qualified = b.add_type(Type::ObjCQualifiedInterface {
        decl: interface,
        protocols: vec![protocol],
    });
    let id = b.add_type(Type::ObjCQualifiedId {
        protocols: vec![protocol],
    });
    for ty in [interface_ty, qualified, id] {
        keep(&mut b, ty);
    }
    let program = b.finish();
    let out = Emitted::new(&program);

    let interface_id = out.decl_id(interface) as u64;
    let protocol_id = out.decl_id(protocol) as u64;
    let record = record_of(&out, interface_ty);
    assert_eq!(record.code, types::OBJC_INTERFACE);
    assert_eq!(record.fields, vec![interface_id]);
    let record = record_of(&out, qualified);
    assert_eq!(record.code, types::OBJC_QUALIFIED_INTERFACE);
    assert_eq!(record.fields, vec![interface_id, 1, protocol_id]);
    let record = record_of(&out, id);
    assert_eq!(record.code, types::OBJC_QUALIFIED_ID);
    assert_eq!(record.fields, vec![1, protocol_id]);
}

#[test]
fn template_specializations_are_rejected() {
    let mut b = ProgramBuilder::new();
    let specialization = b.add_type(Type::TemplateSpecialization {
        template_name: "vector".to_string(),
    });
    keep(&mut b, specialization);
    let program = b.finish();

    let err = emit(&program).unwrap_err();
    assert!(matches!(
        err,
        EmitError::UnsupportedType {
            kind: "template-specialization",
            ..
        }
    ));
    assert_snapshot!(err, @"cannot serialize template-specialization type TypeHandle#0");
}

#[test]
fn qualified_names_are_rejected() {
    let mut b = ProgramBuilder::new();
    let int = b.builtin(BuiltinKind::Int);
    let qualified = b.add_type(Type::QualifiedName {
        qualifier: "std".to_string(),
        named: int,
    });
    keep(&mut b, qualified);
    let program = b.finish();

    let err = emit(&program).unwrap_err();
    assert!(matches!(
        err,
        EmitError::UnsupportedType {
            handle,
            kind: "qualified-name",
        } if handle == qualified
    ));
    assert_snapshot!(err, @"cannot serialize qualified-name type TypeHandle#1");
}
