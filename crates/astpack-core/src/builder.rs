//! Incremental construction of a [`Program`].
//!
//! The builder keeps the cross-links consistent: declaring something in a
//! context appends it to the context's lexical list, records it in the
//! visible lookup table (or, at file scope, on the identifier's declaration
//! chain) and sets its parent links.

use std::collections::HashMap;

use crate::decls::{Decl, DeclName, LookupEntry};
use crate::identifiers::{IdentifierInfo, Selector};
use crate::preprocessor::MacroInfo;
use crate::source::SourceManager;
use crate::stmts::Stmt;
use crate::types::{BuiltinKind, QualType, Type};
use crate::{
    DeclHandle, DeclKind, IdentHandle, LangOptions, Program, SelectorHandle, SemaState,
    StmtHandle, TypeHandle,
};

#[derive(Debug)]
pub struct ProgramBuilder {
    program: Program,
    builtin_types: HashMap<BuiltinKind, TypeHandle>,
    selectors: HashMap<Selector, SelectorHandle>,
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramBuilder {
    /// Start a program containing only an empty translation unit.
    pub fn new() -> Self {
        let program = Program {
            target_triple: String::new(),
            lang_options: LangOptions::default(),
            types: Vec::new(),
            decls: vec![Decl::new(DeclKind::TranslationUnit)],
            stmts: Vec::new(),
            identifiers: Default::default(),
            selectors: Vec::new(),
            translation_unit: DeclHandle(0),
            source_manager: SourceManager::default(),
            preprocessor: Default::default(),
            sema: SemaState::default(),
            builtin_names: Vec::new(),
        };
        Self {
            program,
            builtin_types: HashMap::new(),
            selectors: HashMap::new(),
        }
    }

    pub fn translation_unit(&self) -> DeclHandle {
        self.program.translation_unit
    }

    pub fn target_triple(&mut self, triple: impl Into<String>) -> &mut Self {
        self.program.target_triple = triple.into();
        self
    }

    pub fn lang_options_mut(&mut self) -> &mut LangOptions {
        &mut self.program.lang_options
    }

    pub fn source_manager_mut(&mut self) -> &mut SourceManager {
        &mut self.program.source_manager
    }

    pub fn sema_mut(&mut self) -> &mut SemaState {
        &mut self.program.sema
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    /// The canonical node for a builtin scalar type. Repeated calls share one node.
    pub fn builtin(&mut self, kind: BuiltinKind) -> TypeHandle {
        if let Some(&handle) = self.builtin_types.get(&kind) {
            return handle;
        }
        let handle = self.add_type(Type::Builtin { builtin: kind });
        self.builtin_types.insert(kind, handle);
        handle
    }

    pub fn add_type(&mut self, ty: Type) -> TypeHandle {
        let handle = TypeHandle(self.program.types.len() as u32);
        self.program.types.push(ty);
        handle
    }

    pub fn pointer_to(&mut self, pointee: impl Into<QualType>) -> TypeHandle {
        self.add_type(Type::Pointer {
            pointee: pointee.into(),
        })
    }

    pub fn function_proto(&mut self, result: impl Into<QualType>, params: Vec<QualType>) -> TypeHandle {
        self.add_type(Type::FunctionProto {
            result: result.into(),
            params,
            is_variadic: false,
            type_quals: Default::default(),
        })
    }

    // ------------------------------------------------------------------
    // Declarations and statements
    // ------------------------------------------------------------------

    /// Add a declaration without linking it into any context.
    pub fn add_decl(&mut self, decl: Decl) -> DeclHandle {
        let handle = DeclHandle(self.program.decls.len() as u32);
        self.program.decls.push(decl);
        handle
    }

    /// Add a declaration owned by `context`.
    pub fn declare(&mut self, context: DeclHandle, mut decl: Decl) -> DeclHandle {
        decl.context = Some(context);
        decl.lexical_context = Some(context);
        let name = decl.name.clone();
        let handle = self.add_decl(decl);

        let is_tu = context == self.program.translation_unit;
        let is_function_body = self.program.ensure_decl_mut(context).kind.is_function_or_method();
        if is_tu && let Some(ident) = name.identifier() {
            self.program.ensure_ident_mut(ident).decls.push(handle);
        }

        let ctx = self.program.ensure_context_mut(context);
        ctx.decls.push(handle);

        // File-scope names resolve through identifier chains; function bodies have no lookup table.
        if is_tu || is_function_body || name == DeclName::Identifier(None) {
            return handle;
        }

        match ctx.lookup.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.decls.push(handle),
            None => ctx.lookup.push(LookupEntry {
                name,
                decls: vec![handle],
            }),
        }
        handle
    }

    pub fn decl_mut(&mut self, handle: DeclHandle) -> &mut Decl {
        self.program.ensure_decl_mut(handle)
    }

    pub fn add_stmt(&mut self, stmt: Stmt) -> StmtHandle {
        let handle = StmtHandle(self.program.stmts.len() as u32);
        self.program.stmts.push(stmt);
        handle
    }

    // ------------------------------------------------------------------
    // Identifiers, selectors and macros
    // ------------------------------------------------------------------

    pub fn ident(&mut self, name: &str) -> IdentHandle {
        self.program.identifiers.intern(name)
    }

    pub fn ident_mut(&mut self, handle: IdentHandle) -> &mut IdentifierInfo {
        self.program.ensure_ident_mut(handle)
    }

    /// Intern a selector. Structurally equal selectors share a handle.
    pub fn selector(&mut self, selector: Selector) -> SelectorHandle {
        if let Some(&handle) = self.selectors.get(&selector) {
            return handle;
        }
        let handle = SelectorHandle(self.program.selectors.len() as u32);
        self.program.selectors.push(selector.clone());
        self.selectors.insert(selector, handle);
        handle
    }

    pub fn define_macro(&mut self, name: &str, info: MacroInfo) -> IdentHandle {
        let ident = self.ident(name);
        self.program.preprocessor.macros.insert(ident, info);
        ident
    }

    pub fn builtin_name(&mut self, name: &str) -> IdentHandle {
        let ident = self.ident(name);
        if !self.program.builtin_names.contains(&ident) {
            self.program.builtin_names.push(ident);
        }
        ident
    }

    pub fn preprocessor_mut(&mut self) -> &mut crate::Preprocessor {
        &mut self.program.preprocessor
    }

    pub fn finish(self) -> Program {
        self.program
    }
}
