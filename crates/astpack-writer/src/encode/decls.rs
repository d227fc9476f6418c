//! Declarations, their contexts and attributes.
//!
//! A declaration that owns other declarations is preceded by up to two
//! context records: `DECL_CONTEXT_LEXICAL` lists the owned declarations in
//! source order, `DECL_CONTEXT_VISIBLE` lists name lookup results. The
//! declaration record stores the bit offsets of both (0 when absent).

use log::trace;

use astpack_bitstream::constants::decls;
use astpack_core::{
    Attr, AttrKind, Decl, DeclContext, DeclHandle, DeclKind, QualType, StorageClass, TagKind,
};

use crate::error::Result;
use crate::session::{Record, Session, add_aps_int, add_location, add_string};

impl Session<'_> {
    /// Write one queued declaration, then its attributes and statements.
    pub(crate) fn write_decl(&mut self, handle: DeclHandle) -> Result<()> {
        let program = self.program;
        let decl = program.decl(handle)?;
        let id = self.ensure_decl_id(handle)?;

        let (lexical, visible) = match &decl.decl_context {
            Some(context) => (
                self.write_lexical_context(context)?,
                self.write_visible_context(decl, context)?,
            ),
            None => (0, 0),
        };

        let mut record = Vec::new();
        let code = self.encode_decl(handle, decl, lexical, visible, &mut record)?;

        self.decl_offsets.record(id, self.stream.bit_position());
        self.stream.emit_record(code, &record)?;
        self.stats.decls += 1;
        trace!("decl {id}: {} ({handle})", decl.kind.kind_name());

        if !decl.attrs.is_empty() {
            self.write_attrs(&decl.attrs)?;
        }
        if self.is_external_definition(decl) {
            self.external_definitions.push(id as u64);
        }
        self.flush_stmts()
    }

    fn write_lexical_context(&mut self, context: &DeclContext) -> Result<u64> {
        if context.decls.is_empty() {
            return Ok(0);
        }
        let offset = self.stream.bit_position();
        let mut record = Vec::with_capacity(context.decls.len());
        for &child in &context.decls {
            self.add_decl_ref(&mut record, Some(child))?;
        }
        self.stream.emit_record(decls::CONTEXT_LEXICAL, &record)?;
        self.stats.lexical_contexts += 1;
        Ok(offset)
    }

    /// File scope is found through identifier chains and function bodies
    /// have no lookup, so neither gets a visible record.
    fn write_visible_context(&mut self, decl: &Decl, context: &DeclContext) -> Result<u64> {
        if !context.is_primary
            || decl.kind.is_function_or_method()
            || matches!(decl.kind, DeclKind::TranslationUnit)
            || context.lookup.is_empty()
        {
            return Ok(0);
        }
        let offset = self.stream.bit_position();
        let mut record = Vec::new();
        for entry in &context.lookup {
            self.add_decl_name(&mut record, &entry.name)?;
            record.push(entry.decls.len() as u64);
            for &visible in &entry.decls {
                self.add_decl_ref(&mut record, Some(visible))?;
            }
        }
        self.stream.emit_record(decls::CONTEXT_VISIBLE, &record)?;
        self.stats.visible_contexts += 1;
        Ok(offset)
    }

    fn encode_decl(
        &mut self,
        handle: DeclHandle,
        decl: &Decl,
        lexical: u64,
        visible: u64,
        record: &mut Record,
    ) -> Result<u32> {
        self.add_decl_common(decl, record)?;
        if !matches!(decl.kind, DeclKind::TranslationUnit | DeclKind::FileScopeAsm { .. }) {
            self.add_decl_name(record, &decl.name)?;
        }

        let code = match &decl.kind {
            DeclKind::TranslationUnit => decls::TRANSLATION_UNIT,
            DeclKind::Typedef { underlying } => {
                self.add_type_for_decl(handle, record)?;
                self.add_type_ref(record, Some(*underlying))?;
                decls::TYPEDEF
            }
            DeclKind::Enum {
                integer_type,
                is_definition,
            } => {
                self.add_type_for_decl(handle, record)?;
                record.push(tag_kind_code(TagKind::Enum));
                record.push(*is_definition as u64);
                self.add_type_ref(record, *integer_type)?;
                decls::ENUM
            }
            DeclKind::Record {
                tag_kind,
                is_definition,
                has_flexible_array_member,
                is_anonymous,
            } => {
                self.add_type_for_decl(handle, record)?;
                record.push(tag_kind_code(*tag_kind));
                record.push(*is_definition as u64);
                record.push(*has_flexible_array_member as u64);
                record.push(*is_anonymous as u64);
                decls::RECORD
            }
            DeclKind::EnumConstant { ty, init, value } => {
                self.add_type_ref(record, Some(*ty))?;
                record.push(init.is_some() as u64);
                if init.is_some() {
                    self.add_stmt(*init);
                }
                add_aps_int(record, value);
                decls::ENUM_CONSTANT
            }
            DeclKind::Function {
                ty,
                storage_class,
                is_inline,
                is_variadic,
                previous,
                params,
                body,
            } => {
                self.add_type_ref(record, Some(*ty))?;
                record.push(body.is_some() as u64);
                if body.is_some() {
                    self.add_stmt(*body);
                }
                self.add_decl_ref(record, *previous)?;
                record.push(storage_class_code(*storage_class));
                record.push(*is_inline as u64);
                record.push(*is_variadic as u64);
                record.push(params.len() as u64);
                for &param in params {
                    self.add_decl_ref(record, Some(param))?;
                }
                decls::FUNCTION
            }
            DeclKind::Field {
                ty,
                bit_width,
                is_mutable,
            } => {
                self.add_type_ref(record, Some(*ty))?;
                record.push(*is_mutable as u64);
                record.push(bit_width.is_some() as u64);
                if bit_width.is_some() {
                    self.add_stmt(*bit_width);
                }
                decls::FIELD
            }
            DeclKind::Var {
                ty,
                storage_class,
                is_thread_specified,
                has_cxx_direct_init,
                previous,
                init,
            } => {
                self.add_type_ref(record, Some(*ty))?;
                record.push(storage_class_code(*storage_class));
                record.push(*is_thread_specified as u64);
                record.push(*has_cxx_direct_init as u64);
                self.add_decl_ref(record, *previous)?;
                record.push(init.is_some() as u64);
                if init.is_some() {
                    self.add_stmt(*init);
                }
                decls::VAR
            }
            DeclKind::ParmVar {
                ty,
                storage_class,
                objc_decl_qualifier,
                original_type,
            } => {
                self.add_type_ref(record, Some(*ty))?;
                record.push(storage_class_code(*storage_class));
                record.push(*objc_decl_qualifier as u64);
                match original_type {
                    Some(original) => {
                        self.add_type_ref(record, Some(*original))?;
                        decls::ORIGINAL_PARM_VAR
                    }
                    None => decls::PARM_VAR,
                }
            }
            DeclKind::ObjCMethod {
                is_instance,
                result,
                is_variadic,
                params,
                body,
            } => {
                record.push(body.is_some() as u64);
                if body.is_some() {
                    self.add_stmt(*body);
                }
                record.push(*is_instance as u64);
                record.push(*is_variadic as u64);
                self.add_type_ref(record, Some(*result))?;
                record.push(params.len() as u64);
                for &param in params {
                    self.add_decl_ref(record, Some(param))?;
                }
                decls::OBJC_METHOD
            }
            DeclKind::ObjCInterface {
                super_class,
                protocols,
                ivars,
                is_forward,
            } => {
                self.add_type_for_decl(handle, record)?;
                self.add_decl_ref(record, *super_class)?;
                record.push(protocols.len() as u64);
                for &protocol in protocols {
                    self.add_decl_ref(record, Some(protocol))?;
                }
                record.push(ivars.len() as u64);
                for &ivar in ivars {
                    self.add_decl_ref(record, Some(ivar))?;
                }
                record.push(*is_forward as u64);
                decls::OBJC_INTERFACE
            }
            DeclKind::ObjCProtocol {
                protocols,
                is_forward,
            } => {
                record.push(protocols.len() as u64);
                for &protocol in protocols {
                    self.add_decl_ref(record, Some(protocol))?;
                }
                record.push(*is_forward as u64);
                decls::OBJC_PROTOCOL
            }
            DeclKind::FileScopeAsm { asm_string } => {
                self.add_stmt(Some(*asm_string));
                decls::FILE_SCOPE_ASM
            }
        };

        if decl.kind.is_decl_context() {
            record.push(lexical);
            record.push(visible);
        }
        Ok(code)
    }

    fn add_decl_common(&mut self, decl: &Decl, record: &mut Record) -> Result<()> {
        self.add_decl_ref(record, decl.context)?;
        self.add_decl_ref(record, decl.lexical_context)?;
        add_location(record, decl.location);
        record.push(decl.is_invalid as u64);
        record.push(!decl.attrs.is_empty() as u64);
        record.push(decl.is_implicit as u64);
        record.push(decl.is_used as u64);
        Ok(())
    }

    fn add_type_for_decl(&mut self, handle: DeclHandle, record: &mut Record) -> Result<()> {
        let ty = self.type_for_decl.get(&handle).map(|&ty| QualType::new(ty));
        self.add_type_ref(record, ty)
    }

    fn write_attrs(&mut self, attrs: &[Attr]) -> Result<()> {
        let mut record = Vec::new();
        for attr in attrs {
            record.push(attr_kind_code(&attr.kind));
            record.push(attr.inherited as u64);
            match &attr.kind {
                AttrKind::Alias(text)
                | AttrKind::Annotate(text)
                | AttrKind::AsmLabel(text)
                | AttrKind::Section(text) => add_string(&mut record, text),
                AttrKind::Aligned(value)
                | AttrKind::Constructor(value)
                | AttrKind::Destructor(value)
                | AttrKind::Packed(value)
                | AttrKind::Regparm(value) => record.push(*value as u64),
                AttrKind::Cleanup(function) => self.add_decl_ref(&mut record, Some(*function))?,
                AttrKind::Format {
                    archetype,
                    format_idx,
                    first_arg,
                } => {
                    add_string(&mut record, archetype);
                    record.push(*format_idx as u64);
                    record.push(*first_arg as u64);
                }
                AttrKind::NonNull(args) => {
                    record.push(args.len() as u64);
                    record.extend(args.iter().map(|&arg| arg as u64));
                }
                AttrKind::Visibility(level) => record.push(*level as u64),
                AttrKind::AlwaysInline
                | AttrKind::Const
                | AttrKind::Deprecated
                | AttrKind::NoReturn
                | AttrKind::NoThrow
                | AttrKind::Pure
                | AttrKind::Unused
                | AttrKind::Used
                | AttrKind::WarnUnusedResult
                | AttrKind::Weak => {}
            }
        }
        self.stream.emit_record(decls::ATTR, &record)?;
        Ok(())
    }

    /// Definitions the consumer must hand to code generation eagerly.
    fn is_external_definition(&self, decl: &Decl) -> bool {
        match &decl.kind {
            DeclKind::FileScopeAsm { .. } => true,
            DeclKind::Var {
                storage_class,
                init,
                ..
            } => {
                decl.context == Some(self.program.translation_unit)
                    && (init.is_some() || *storage_class == StorageClass::None)
            }
            DeclKind::Function {
                storage_class,
                is_inline,
                body,
                ..
            } => body.is_some() && *storage_class != StorageClass::Static && !is_inline,
            _ => false,
        }
    }
}

fn tag_kind_code(kind: TagKind) -> u64 {
    match kind {
        TagKind::Struct => 0,
        TagKind::Union => 1,
        TagKind::Class => 2,
        TagKind::Enum => 3,
    }
}

fn storage_class_code(storage: StorageClass) -> u64 {
    match storage {
        StorageClass::None => 0,
        StorageClass::Extern => 1,
        StorageClass::Static => 2,
        StorageClass::PrivateExtern => 3,
        StorageClass::Auto => 4,
        StorageClass::Register => 5,
    }
}

fn attr_kind_code(kind: &AttrKind) -> u64 {
    match kind {
        AttrKind::Alias(_) => 0,
        AttrKind::Aligned(_) => 1,
        AttrKind::AlwaysInline => 2,
        AttrKind::Annotate(_) => 3,
        AttrKind::AsmLabel(_) => 4,
        AttrKind::Cleanup(_) => 5,
        AttrKind::Const => 6,
        AttrKind::Constructor(_) => 7,
        AttrKind::Deprecated => 8,
        AttrKind::Destructor(_) => 9,
        AttrKind::Format { .. } => 10,
        AttrKind::NoReturn => 11,
        AttrKind::NoThrow => 12,
        AttrKind::NonNull(_) => 13,
        AttrKind::Packed(_) => 14,
        AttrKind::Pure => 15,
        AttrKind::Regparm(_) => 16,
        AttrKind::Section(_) => 17,
        AttrKind::Unused => 18,
        AttrKind::Used => 19,
        AttrKind::Visibility(_) => 20,
        AttrKind::WarnUnusedResult => 21,
        AttrKind::Weak => 22,
    }
}
