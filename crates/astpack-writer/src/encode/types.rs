use log::trace;

use astpack_bitstream::constants::types;
use astpack_core::{ArraySizeModifier, QualType, Qualifiers, Type, TypeHandle};

use crate::error::{EmitError, Result};
use crate::session::{Record, Session, add_ap_int};

impl Session<'_> {
    /// Write one queued type, followed by the statements it owns.
    pub(crate) fn write_type(&mut self, handle: TypeHandle) -> Result<()> {
        let program = self.program;
        let ty = program.ty(handle)?;
        let id = self.ensure_type_id(handle)?;

        let mut record = Vec::new();
        let code = self.encode_type(handle, ty, &mut record)?;

        self.type_offsets.record(id, self.stream.bit_position());
        self.stream.emit_record(code, &record)?;
        self.stats.types += 1;
        trace!("type {id}: {} ({handle})", ty.kind_name());

        self.flush_stmts()
    }

    fn encode_type(&mut self, handle: TypeHandle, ty: &Type, record: &mut Record) -> Result<u32> {
        let code = match ty {
            Type::Builtin { .. } => return Err(EmitError::BuiltinQueued(handle)),
            Type::ExtQual {
                base,
                gc_attr,
                address_space,
            } => {
                self.add_type_ref(record, Some(QualType::new(*base)))?;
                record.push(*gc_attr as u64);
                record.push(*address_space as u64);
                types::EXT_QUAL
            }
            Type::FixedWidthInt { width, is_signed } => {
                record.push(*width as u64);
                record.push(*is_signed as u64);
                types::FIXED_WIDTH_INT
            }
            Type::Complex { element } => {
                self.add_type_ref(record, Some(*element))?;
                types::COMPLEX
            }
            Type::Pointer { pointee } => {
                self.add_type_ref(record, Some(*pointee))?;
                types::POINTER
            }
            Type::BlockPointer { pointee } => {
                self.add_type_ref(record, Some(*pointee))?;
                types::BLOCK_POINTER
            }
            Type::LValueReference { pointee } => {
                self.add_type_ref(record, Some(*pointee))?;
                types::LVALUE_REFERENCE
            }
            Type::RValueReference { pointee } => {
                self.add_type_ref(record, Some(*pointee))?;
                types::RVALUE_REFERENCE
            }
            Type::MemberPointer { pointee, class } => {
                self.add_type_ref(record, Some(*pointee))?;
                self.add_type_ref(record, Some(QualType::new(*class)))?;
                types::MEMBER_POINTER
            }
            Type::ConstantArray {
                element,
                size_modifier,
                index_quals,
                size,
            } => {
                self.add_array_common(record, *element, *size_modifier, *index_quals)?;
                add_ap_int(record, size);
                types::CONSTANT_ARRAY
            }
            Type::IncompleteArray {
                element,
                size_modifier,
                index_quals,
            } => {
                self.add_array_common(record, *element, *size_modifier, *index_quals)?;
                types::INCOMPLETE_ARRAY
            }
            Type::VariableArray {
                element,
                size_modifier,
                index_quals,
                size_expr,
            } => {
                self.add_array_common(record, *element, *size_modifier, *index_quals)?;
                self.add_stmt(*size_expr);
                types::VARIABLE_ARRAY
            }
            Type::Vector {
                element,
                num_elements,
            } => {
                self.add_type_ref(record, Some(*element))?;
                record.push(*num_elements as u64);
                types::VECTOR
            }
            Type::ExtVector {
                element,
                num_elements,
            } => {
                self.add_type_ref(record, Some(*element))?;
                record.push(*num_elements as u64);
                types::EXT_VECTOR
            }
            Type::FunctionNoProto { result } => {
                self.add_type_ref(record, Some(*result))?;
                types::FUNCTION_NO_PROTO
            }
            Type::FunctionProto {
                result,
                params,
                is_variadic,
                type_quals,
            } => {
                self.add_type_ref(record, Some(*result))?;
                record.push(params.len() as u64);
                for param in params {
                    self.add_type_ref(record, Some(*param))?;
                }
                record.push(*is_variadic as u64);
                record.push(type_quals.cvr() as u64);
                types::FUNCTION_PROTO
            }
            Type::Typedef { decl } => {
                self.add_decl_ref(record, Some(*decl))?;
                types::TYPEDEF
            }
            Type::TypeOfExpr { expr } => {
                self.add_stmt(Some(*expr));
                types::TYPEOF_EXPR
            }
            Type::TypeOf { underlying } => {
                self.add_type_ref(record, Some(*underlying))?;
                types::TYPEOF
            }
            Type::Record { decl } => {
                self.add_decl_ref(record, Some(*decl))?;
                types::RECORD
            }
            Type::Enum { decl } => {
                self.add_decl_ref(record, Some(*decl))?;
                types::ENUM
            }
            Type::ObjCInterface { decl } => {
                self.add_decl_ref(record, Some(*decl))?;
                types::OBJC_INTERFACE
            }
            Type::ObjCQualifiedInterface { decl, protocols } => {
                self.add_decl_ref(record, Some(*decl))?;
                record.push(protocols.len() as u64);
                for protocol in protocols {
                    self.add_decl_ref(record, Some(*protocol))?;
                }
                types::OBJC_QUALIFIED_INTERFACE
            }
            Type::ObjCQualifiedId { protocols } => {
                record.push(protocols.len() as u64);
                for protocol in protocols {
                    self.add_decl_ref(record, Some(*protocol))?;
                }
                types::OBJC_QUALIFIED_ID
            }
            Type::TemplateSpecialization { .. }
            | Type::QualifiedName { .. }
            | Type::Dependent { .. } => {
                return Err(EmitError::UnsupportedType {
                    handle,
                    kind: ty.kind_name(),
                });
            }
        };
        Ok(code)
    }

    fn add_array_common(
        &mut self,
        record: &mut Record,
        element: QualType,
        size_modifier: ArraySizeModifier,
        index_quals: Qualifiers,
    ) -> Result<()> {
        self.add_type_ref(record, Some(element))?;
        record.push(match size_modifier {
            ArraySizeModifier::Normal => 0,
            ArraySizeModifier::Static => 1,
            ArraySizeModifier::Star => 2,
        });
        record.push(index_quals.cvr() as u64);
        Ok(())
    }
}
