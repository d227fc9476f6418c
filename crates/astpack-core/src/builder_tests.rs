use crate::{
    AttrKind, BuiltinKind, Decl, DeclKind, DeclName, MacroInfo, ProgramBuilder, QualType,
    Selector, SourceLocation, TagKind,
};

fn int_var(b: &mut ProgramBuilder) -> DeclKind {
    let int = b.builtin(BuiltinKind::Int);
    DeclKind::Var {
        ty: QualType::new(int),
        storage_class: Default::default(),
        is_thread_specified: false,
        has_cxx_direct_init: false,
        previous: None,
        init: None,
    }
}

fn record_kind() -> DeclKind {
    DeclKind::Record {
        tag_kind: TagKind::Struct,
        is_definition: true,
        has_flexible_array_member: false,
        is_anonymous: false,
    }
}

#[test]
fn new_builder_has_translation_unit() {
    let b = ProgramBuilder::new();
    let tu = b.translation_unit();
    let program = b.finish();

    let decl = program.decl(tu).unwrap();
    assert!(matches!(decl.kind, DeclKind::TranslationUnit));
    assert!(decl.decl_context.is_some());
}

#[test]
fn builtin_types_are_shared() {
    let mut b = ProgramBuilder::new();
    let a = b.builtin(BuiltinKind::Int);
    let c = b.builtin(BuiltinKind::Int);
    let d = b.builtin(BuiltinKind::CharS);

    assert_eq!(a, c);
    assert_ne!(a, d);
    assert_eq!(b.finish().types.len(), 2);
}

#[test]
fn file_scope_declarations_join_identifier_chain() {
    let mut b = ProgramBuilder::new();
    let tu = b.translation_unit();
    let x = b.ident("x");
    let kind = int_var(&mut b);
    let first = b.declare(tu, Decl::new(kind.clone()).named(x));
    let second = b.declare(tu, Decl::new(kind).named(x));
    let program = b.finish();

    assert_eq!(program.ident(x).unwrap().decls, vec![first, second]);
    let tu_ctx = program.decl(tu).unwrap().decl_context.as_ref().unwrap();
    assert_eq!(tu_ctx.decls, vec![first, second]);
    assert!(tu_ctx.lookup.is_empty());
    assert_eq!(program.decl(first).unwrap().context, Some(tu));
    assert_eq!(program.decl(first).unwrap().lexical_context, Some(tu));
}

#[test]
fn record_members_enter_lookup_table() {
    let mut b = ProgramBuilder::new();
    let tu = b.translation_unit();
    let s = b.ident("S");
    let field_name = b.ident("a");
    let record = b.declare(tu, Decl::new(record_kind()).named(s));
    let int = b.builtin(BuiltinKind::Int);
    let field = b.declare(
        record,
        Decl::new(DeclKind::Field {
            ty: QualType::new(int),
            bit_width: None,
            is_mutable: false,
        })
        .named(field_name),
    );
    let program = b.finish();

    let ctx = program.decl(record).unwrap().decl_context.as_ref().unwrap();
    assert_eq!(ctx.decls, vec![field]);
    assert_eq!(ctx.lookup.len(), 1);
    assert_eq!(ctx.lookup[0].name, DeclName::Identifier(Some(field_name)));
    assert_eq!(ctx.lookup[0].decls, vec![field]);
    assert!(program.ident(field_name).unwrap().decls.is_empty());
}

#[test]
fn function_bodies_have_no_lookup_table() {
    let mut b = ProgramBuilder::new();
    let tu = b.translation_unit();
    let int = b.builtin(BuiltinKind::Int);
    let fn_ty = b.function_proto(int, vec![]);
    let f = b.ident("f");
    let function = b.declare(
        tu,
        Decl::new(DeclKind::Function {
            ty: QualType::new(fn_ty),
            storage_class: Default::default(),
            is_inline: false,
            is_variadic: false,
            previous: None,
            params: vec![],
            body: None,
        })
        .named(f),
    );
    let local = b.ident("local");
    let kind = int_var(&mut b);
    let var = b.declare(function, Decl::new(kind).named(local));
    let program = b.finish();

    let ctx = program.decl(function).unwrap().decl_context.as_ref().unwrap();
    assert_eq!(ctx.decls, vec![var]);
    assert!(ctx.lookup.is_empty());
}

#[test]
fn selectors_are_interned_structurally() {
    let mut b = ProgramBuilder::new();
    let init = b.ident("init");
    let a = b.selector(Selector::nullary(init));
    let c = b.selector(Selector::nullary(init));
    let d = b.selector(Selector::keyword(vec![Some(init)]));

    assert_eq!(a, c);
    assert_ne!(a, d);
    assert_eq!(b.finish().selectors.len(), 2);
}

#[test]
fn macros_and_builtin_names() {
    let mut b = ProgramBuilder::new();
    let foo = b.define_macro(
        "FOO",
        MacroInfo {
            definition_loc: SourceLocation(10),
            ..MacroInfo::default()
        },
    );
    let builtin = b.builtin_name("__builtin_expect");
    b.builtin_name("__builtin_expect");
    let program = b.finish();

    assert!(program.preprocessor.has_macro_definition(foo));
    assert_eq!(program.builtin_names, vec![builtin]);
}

#[test]
fn decl_builder_helpers() {
    let mut b = ProgramBuilder::new();
    let x = b.ident("x");
    let kind = int_var(&mut b);
    let decl = Decl::new(kind)
        .named(x)
        .at(SourceLocation(7))
        .with_attr(AttrKind::Unused);

    assert_eq!(decl.location, SourceLocation(7));
    assert_eq!(decl.attrs.len(), 1);
    assert!(!decl.attrs[0].inherited);
    assert!(decl.decl_context.is_none());
}

#[test]
#[should_panic(expected = "is not a declaration context")]
fn declaring_into_non_context_panics() {
    let mut b = ProgramBuilder::new();
    let tu = b.translation_unit();
    let kind = int_var(&mut b);
    let var = b.declare(tu, Decl::new(kind.clone()));
    b.declare(var, Decl::new(kind));
}
