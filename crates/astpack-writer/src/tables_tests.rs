use astpack_bitstream::constants::pch;
use astpack_bitstream::io::{read_u16, read_u32, read_u64};
use astpack_bitstream::{
    HashTableError, HashTableView, LengthLayout, bernstein_hash, bernstein_hash_partial,
};
use astpack_core::{
    BuiltinKind, Decl, DeclKind, DeclName, IdentHandle, MacroInfo, Program, ProgramBuilder,
    QualType, Selector,
};

use crate::test_utils::{Emitted, shared_int_program, var};
use crate::{EmitError, emit};

fn table_blob(out: &Emitted, code: u32) -> (&[u8], usize) {
    let record = out.pch_record(code);
    (record.blob.as_deref().unwrap(), record.fields[0] as usize)
}

fn identifier_id(out: &Emitted, ident: IdentHandle) -> u32 {
    out.artifact.ids.identifiers.get(ident).unwrap()
}

/// The name stored at an identifier's recorded offset.
fn name_at(blob: &[u8], offset: u32) -> &[u8] {
    let start = offset as usize;
    let end = start + blob[start..].iter().position(|&b| b == 0).unwrap();
    &blob[start..end]
}

#[test]
fn declared_identifiers_are_hashed() {
    let s = shared_int_program();
    let out = Emitted::new(&s.program);
    let (blob, bucket_offset) = table_blob(&out, pch::IDENTIFIER_TABLE);
    let view = HashTableView::new(blob, bucket_offset, LengthLayout::DataThenKey16).unwrap();

    assert_eq!(view.len(), 2);
    for name in ["f", "g"] {
        let key = format!("{name}\0");
        let entry = view
            .find(bernstein_hash(name.as_bytes()), |k| k == key.as_bytes())
            .unwrap()
            .unwrap();
        // bits, ID, one declaration
        assert_eq!(entry.data.len(), 12);
        let ident = s.program.identifiers.lookup(name).unwrap();
        assert_eq!(read_u32(entry.data, 4), Some(identifier_id(&out, ident)));
        let decl = s.program.ident(ident).unwrap().decls[0];
        assert_eq!(read_u32(entry.data, 8), Some(out.decl_id(decl)));
    }
}

#[test]
fn parameter_names_trail_the_table() {
    let s = shared_int_program();
    let out = Emitted::new(&s.program);
    let (blob, _) = table_blob(&out, pch::IDENTIFIER_TABLE);
    let offsets = out.key_offsets(pch::IDENTIFIER_OFFSET);
    assert_eq!(offsets.len(), 3);

    let x = s.program.identifiers.lookup("x").unwrap();
    let offset = offsets[(identifier_id(&out, x) - 1) as usize];
    assert_eq!(name_at(blob, offset), b"x");
    assert_eq!(read_u16(blob, offset as usize - 2), Some(2));
}

#[test]
fn uninteresting_identifiers_are_not_hashed() {
    let mut b = ProgramBuilder::new();
    let alpha = b.builtin_name("alpha");
    let beta = b.builtin_name("beta");
    let program = b.finish();
    let out = Emitted::new(&program);

    let (blob, bucket_offset) = table_blob(&out, pch::IDENTIFIER_TABLE);
    let view = HashTableView::new(blob, bucket_offset, LengthLayout::DataThenKey16).unwrap();
    assert!(view.is_empty());
    assert_eq!(view.entries().unwrap().len(), 0);

    let offsets = out.key_offsets(pch::IDENTIFIER_OFFSET);
    assert_eq!(offsets.len(), 2);
    let alpha_offset = offsets[(identifier_id(&out, alpha) - 1) as usize];
    let beta_offset = offsets[(identifier_id(&out, beta) - 1) as usize];
    assert_ne!(alpha_offset, beta_offset);
    assert_eq!(name_at(blob, alpha_offset), b"alpha");
    assert_eq!(name_at(blob, beta_offset), b"beta");
}

#[test]
fn builtin_names_come_first() {
    let mut b = ProgramBuilder::new();
    let later = b.ident("later");
    let memcpy = b.builtin_name("__builtin_memcpy");
    b.ident_mut(memcpy).builtin_id = 12;
    b.define_macro("later", MacroInfo::default());
    let program = b.finish();
    let out = Emitted::new(&program);

    assert_eq!(identifier_id(&out, memcpy), 1);
    assert_eq!(identifier_id(&out, later), 2);

    let (blob, bucket_offset) = table_blob(&out, pch::IDENTIFIER_TABLE);
    let view = HashTableView::new(blob, bucket_offset, LengthLayout::DataThenKey16).unwrap();
    let name = b"__builtin_memcpy";
    let entry = view
        .find(bernstein_hash(name), |k| k.starts_with(name))
        .unwrap()
        .unwrap();
    // identifier token, builtin 12, no macro or flags
    let bits = ((1u32 << 10) | 12) << 4;
    assert_eq!(read_u32(entry.data, 0), Some(bits));
}

#[test]
fn macro_identifiers_carry_their_offset() {
    let mut b = ProgramBuilder::new();
    let foo = b.define_macro("FOO", MacroInfo::default());
    let program = b.finish();
    let out = Emitted::new(&program);

    let (blob, bucket_offset) = table_blob(&out, pch::IDENTIFIER_TABLE);
    let view = HashTableView::new(blob, bucket_offset, LengthLayout::DataThenKey16).unwrap();
    let entry = view
        .find(bernstein_hash(b"FOO"), |k| k == b"FOO\0")
        .unwrap()
        .unwrap();

    assert_eq!(entry.data.len(), 16);
    // identifier token kind, has-macro flag
    assert_eq!(read_u32(entry.data, 0), Some(16392));
    assert_eq!(read_u32(entry.data, 4), Some(identifier_id(&out, foo)));

    let macro_bit = read_u64(entry.data, 8).unwrap();
    let record = out.stream.record_at(macro_bit).unwrap();
    assert_eq!(
        record.code,
        astpack_bitstream::constants::preprocessor::MACRO_OBJECT_LIKE
    );
    assert_eq!(
        out.key_offsets(pch::IDENTIFIER_OFFSET)[0] as usize,
        entry.key_offset
    );
}

#[test]
fn method_pool_and_selector_table() {
    let mut b = ProgramBuilder::new();
    let tu = b.translation_unit();
    let int = b.builtin(BuiltinKind::Int);
    let foo = b.ident("Foo");
    let bar = b.ident("bar");
    let baz = b.ident("baz");
    let bar_sel = b.selector(Selector::nullary(bar));
    let baz_sel = b.selector(Selector::keyword(vec![Some(baz)]));

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
    let method = |b: &mut ProgramBuilder, selector| {
        let kind = DeclKind::ObjCMethod {
            is_instance: true,
            result: QualType::new(int),
            is_variadic: false,
            params: Vec::new(),
            body: None,
        };
        b.declare(
            interface,
            Decl::new(kind).with_name(DeclName::Selector(selector)),
        )
    };
    let bar_method = method(&mut b, bar_sel);
    method(&mut b, baz_sel);
    b.sema_mut().instance_methods.insert(bar_sel, vec![bar_method]);
    let program = b.finish();
    let out = Emitted::new(&program);

    let ids = &out.artifact.ids;
    assert_eq!(ids.selectors.get(bar_sel), Some(1));
    assert_eq!(ids.selectors.get(baz_sel), Some(2));

    let pool = out.pch_record(pch::METHOD_POOL);
    assert_eq!(pool.fields[1], 1);
    let blob = pool.blob.as_deref().unwrap();
    let view =
        HashTableView::new(blob, pool.fields[0] as usize, LengthLayout::KeyThenData16).unwrap();
    let hash = bernstein_hash_partial(b"bar", 5381);
    let bar_id = ids.identifiers.get(bar).unwrap();
    let entry = view
        .find(hash, |k| read_u32(k, 2) == Some(bar_id))
        .unwrap()
        .unwrap();
    assert_eq!(read_u16(entry.key, 0), Some(0));
    assert_eq!(entry.key.len(), 6);
    assert_eq!(read_u16(entry.data, 0), Some(1));
    assert_eq!(read_u16(entry.data, 2), Some(0));
    assert_eq!(read_u32(entry.data, 4), Some(out.decl_id(bar_method)));

    // `baz:` is not pooled but still has a key after the table.
    let offsets = out.key_offsets(pch::SELECTOR_OFFSETS);
    assert_eq!(offsets.len(), 2);
    assert_eq!(offsets[0] as usize, entry.key_offset);
    let baz_key = offsets[1] as usize;
    assert_eq!(read_u16(blob, baz_key), Some(1));
    assert_eq!(read_u32(blob, baz_key + 2), ids.identifiers.get(baz));
}

#[test]
fn programs_without_selectors_have_no_method_pool() {
    let out = Emitted::new(&shared_int_program().program);
    assert!(
        out.stream
            .find(astpack_bitstream::constants::PCH_BLOCK_ID, pch::METHOD_POOL)
            .is_none()
    );
    assert!(
        out.stream
            .find(
                astpack_bitstream::constants::PCH_BLOCK_ID,
                pch::SELECTOR_OFFSETS
            )
            .is_none()
    );
}

/// `int x;` repeated at file scope `count` times.
fn redeclared(count: usize) -> Program {
    let mut b = ProgramBuilder::new();
    let tu = b.translation_unit();
    let int = b.builtin(BuiltinKind::Int);
    let x = b.ident("x");
    for _ in 0..count {
        b.declare(tu, Decl::new(var(int)).named(x));
    }
    b.finish()
}

#[test]
fn longest_declaration_chain_fits() {
    // 8 bytes of bits and ID plus 4 per declaration, just under 64 KiB.
    let out = Emitted::new(&redeclared(16_381));
    let (blob, bucket_offset) = table_blob(&out, pch::IDENTIFIER_TABLE);
    let view = HashTableView::new(blob, bucket_offset, LengthLayout::DataThenKey16).unwrap();
    let entry = view
        .find(bernstein_hash(b"x"), |k| k == b"x\0")
        .unwrap()
        .unwrap();
    assert_eq!(entry.data.len(), 65_532);
}

#[test]
fn oversized_identifier_entry_is_rejected() {
    let err = emit(&redeclared(16_382)).unwrap_err();
    assert!(matches!(
        err,
        EmitError::HashTable(HashTableError::LengthOverflow { length: 65_536 })
    ));
}
