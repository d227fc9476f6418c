use astpack_bitstream::constants::{PCH_BLOCK_ID, pch};
use astpack_bitstream::io::{read_u32, read_u64};
use astpack_bitstream::reader::{ParsedStream, Record, parse};
use astpack_core::{
    BuiltinKind, Decl, DeclHandle, DeclKind, Program, ProgramBuilder, QualType, StorageClass,
    TypeHandle,
};

use crate::{Artifact, emit};

/// An emitted artifact together with its parsed stream.
pub struct Emitted {
    pub artifact: Artifact,
    pub stream: ParsedStream,
}

impl Emitted {
    pub fn new(program: &Program) -> Self {
        let artifact = emit(program).unwrap();
        let stream = parse(&artifact.bytes).unwrap();
        Self { artifact, stream }
    }

    pub fn pch_record(&self, code: u32) -> &Record {
        self.stream
            .find(PCH_BLOCK_ID, code)
            .unwrap_or_else(|| panic!("no PCH record with code {code}"))
    }

    pub fn decl_offsets(&self) -> Vec<u64> {
        u64_words(self.pch_record(pch::DECL_OFFSET))
    }

    pub fn type_offsets(&self) -> Vec<u64> {
        u64_words(self.pch_record(pch::TYPE_OFFSET))
    }

    /// The record a declaration ID's offset points at.
    pub fn decl_record(&self, id: u32) -> &Record {
        let bit = self.decl_offsets()[(id - 1) as usize];
        self.stream.record_at(bit).unwrap()
    }

    pub fn type_record(&self, id: u32) -> &Record {
        let bit = self.type_offsets()[(id - 100) as usize];
        self.stream.record_at(bit).unwrap()
    }

    pub fn decl_id(&self, handle: DeclHandle) -> u32 {
        self.artifact.ids.decls.get(handle).unwrap()
    }

    pub fn type_id(&self, handle: TypeHandle) -> u32 {
        self.artifact.ids.types.get(handle).unwrap()
    }

    /// Byte offsets into a table blob, one per ID.
    pub fn key_offsets(&self, code: u32) -> Vec<u32> {
        let record = self.pch_record(code);
        let blob = record.blob.as_deref().unwrap();
        let count = record.fields[0] as usize;
        (0..count).map(|i| read_u32(blob, 4 * i).unwrap()).collect()
    }
}

fn u64_words(record: &Record) -> Vec<u64> {
    let blob = record.blob.as_deref().unwrap();
    let count = record.fields[0] as usize;
    assert_eq!(blob.len(), 8 * count);
    (0..count).map(|i| read_u64(blob, 8 * i).unwrap()).collect()
}

pub fn function(ty: TypeHandle, params: Vec<DeclHandle>) -> DeclKind {
    DeclKind::Function {
        ty: QualType::new(ty),
        storage_class: StorageClass::None,
        is_inline: false,
        is_variadic: false,
        previous: None,
        params,
        body: None,
    }
}

pub fn parm(ty: TypeHandle) -> DeclKind {
    DeclKind::ParmVar {
        ty: QualType::new(ty),
        storage_class: StorageClass::None,
        objc_decl_qualifier: 0,
        original_type: None,
    }
}

pub fn var(ty: TypeHandle) -> DeclKind {
    DeclKind::Var {
        ty: QualType::new(ty),
        storage_class: StorageClass::None,
        is_thread_specified: false,
        has_cxx_direct_init: false,
        previous: None,
        init: None,
    }
}

/// Handles of the two-function program.
pub struct SharedInt {
    pub program: Program,
    pub int: TypeHandle,
    pub f_type: TypeHandle,
    pub f: DeclHandle,
    pub g: DeclHandle,
    pub x: DeclHandle,
}

/// `int f(int x);` and `g`, declared with `f`'s function type.
pub fn shared_int_program() -> SharedInt {
    let mut b = ProgramBuilder::new();
    let tu = b.translation_unit();
    let int = b.builtin(BuiltinKind::Int);
    let f_type = b.function_proto(int, vec![QualType::new(int)]);

    let f_name = b.ident("f");
    let g_name = b.ident("g");
    let x_name = b.ident("x");

    let f = b.declare(tu, Decl::new(function(f_type, Vec::new())).named(f_name));
    let x = b.declare(f, Decl::new(parm(int)).named(x_name));
    if let DeclKind::Function { params, .. } = &mut b.decl_mut(f).kind {
        params.push(x);
    }
    let g = b.declare(tu, Decl::new(function(f_type, Vec::new())).named(g_name));

    SharedInt {
        program: b.finish(),
        int,
        f_type,
        f,
        g,
        x,
    }
}
