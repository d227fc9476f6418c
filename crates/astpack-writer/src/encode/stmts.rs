//! Statements and expressions.
//!
//! Statement trees are written in post-order with an explicit stack: every
//! node's children come first, so a reader can rebuild the tree with a value
//! stack. Each tree handed to [`Session::add_stmt`] ends with `STMT_STOP`.

use astpack_bitstream::constants::stmts;
use astpack_core::{BinaryOp, Stmt, StmtHandle, UnaryOp};

use crate::error::Result;
use crate::session::{Record, Session, add_ap_int, add_location};

enum Step {
    Visit(Option<StmtHandle>),
    Emit(StmtHandle),
}

impl Session<'_> {
    /// Write every statement queued by the last record.
    pub(crate) fn flush_stmts(&mut self) -> Result<()> {
        let roots = std::mem::take(&mut self.pending_stmts);
        for root in roots {
            self.write_stmt_tree(root)?;
            self.stream.emit_record(stmts::STOP, &[])?;
        }
        Ok(())
    }

    fn write_stmt_tree(&mut self, root: Option<StmtHandle>) -> Result<()> {
        let program = self.program;
        let mut stack = vec![Step::Visit(root)];

        while let Some(step) = stack.pop() {
            match step {
                Step::Visit(None) => self.stream.emit_record(stmts::NULL_PTR, &[])?,
                Step::Visit(Some(handle)) => {
                    let stmt = program.stmt(handle)?;
                    stack.push(Step::Emit(handle));
                    stack.extend(stmt.children().into_iter().rev().map(Step::Visit));
                }
                Step::Emit(handle) => {
                    let stmt = program.stmt(handle)?;
                    let mut record = Vec::new();
                    let code = self.encode_stmt(stmt, &mut record)?;
                    self.stream.emit_record(code, &record)?;
                    self.stats.statements += 1;
                }
            }
        }
        Ok(())
    }

    /// Fields of one node. Child statements are not part of the record.
    fn encode_stmt(&mut self, stmt: &Stmt, record: &mut Record) -> Result<u32> {
        let code = match stmt {
            Stmt::Null { semi_loc } => {
                add_location(record, *semi_loc);
                stmts::NULL
            }
            Stmt::Compound {
                body,
                lbrace,
                rbrace,
            } => {
                record.push(body.len() as u64);
                add_location(record, *lbrace);
                add_location(record, *rbrace);
                stmts::COMPOUND
            }
            Stmt::Return { loc, .. } => {
                add_location(record, *loc);
                stmts::RETURN
            }
            Stmt::If {
                if_loc, else_loc, ..
            } => {
                add_location(record, *if_loc);
                add_location(record, *else_loc);
                stmts::IF
            }
            Stmt::While { loc, .. } => {
                add_location(record, *loc);
                stmts::WHILE
            }
            Stmt::Decl { decls, start, end } => {
                add_location(record, *start);
                add_location(record, *end);
                for decl in decls {
                    self.add_decl_ref(record, Some(*decl))?;
                }
                stmts::DECL
            }
            Stmt::DeclRef { ty, decl, loc } => {
                self.add_type_ref(record, Some(*ty))?;
                self.add_decl_ref(record, Some(*decl))?;
                add_location(record, *loc);
                stmts::DECL_REF
            }
            Stmt::IntegerLiteral { ty, value, loc } => {
                self.add_type_ref(record, Some(*ty))?;
                add_location(record, *loc);
                add_ap_int(record, value);
                stmts::INTEGER_LITERAL
            }
            Stmt::FloatingLiteral {
                ty,
                bits,
                is_exact,
                loc,
            } => {
                self.add_type_ref(record, Some(*ty))?;
                add_ap_int(record, bits);
                record.push(*is_exact as u64);
                add_location(record, *loc);
                stmts::FLOATING_LITERAL
            }
            Stmt::StringLiteral {
                ty,
                bytes,
                is_wide,
                token_locs,
            } => {
                self.add_type_ref(record, Some(*ty))?;
                record.push(bytes.len() as u64);
                record.push(*is_wide as u64);
                record.push(token_locs.len() as u64);
                for loc in token_locs {
                    add_location(record, *loc);
                }
                record.extend(bytes.bytes().map(u64::from));
                stmts::STRING_LITERAL
            }
            Stmt::CharacterLiteral {
                ty,
                value,
                is_wide,
                loc,
            } => {
                self.add_type_ref(record, Some(*ty))?;
                record.push(*value as u64);
                add_location(record, *loc);
                record.push(*is_wide as u64);
                stmts::CHARACTER_LITERAL
            }
            Stmt::Paren {
                ty, lparen, rparen, ..
            } => {
                self.add_type_ref(record, Some(*ty))?;
                add_location(record, *lparen);
                add_location(record, *rparen);
                stmts::PAREN
            }
            Stmt::UnaryOperator { ty, op, loc, .. } => {
                self.add_type_ref(record, Some(*ty))?;
                record.push(unary_opcode(*op));
                add_location(record, *loc);
                stmts::UNARY_OPERATOR
            }
            Stmt::BinaryOperator { ty, op, loc, .. } => {
                self.add_type_ref(record, Some(*ty))?;
                record.push(binary_opcode(*op));
                add_location(record, *loc);
                stmts::BINARY_OPERATOR
            }
            Stmt::Call {
                ty, args, rparen, ..
            } => {
                self.add_type_ref(record, Some(*ty))?;
                record.push(args.len() as u64);
                add_location(record, *rparen);
                stmts::CALL
            }
            Stmt::ImplicitCast { ty, is_lvalue, .. } => {
                self.add_type_ref(record, Some(*ty))?;
                record.push(*is_lvalue as u64);
                stmts::IMPLICIT_CAST
            }
            Stmt::CStyleCast {
                ty,
                written,
                lparen,
                rparen,
                ..
            } => {
                self.add_type_ref(record, Some(*ty))?;
                self.add_type_ref(record, Some(*written))?;
                add_location(record, *lparen);
                add_location(record, *rparen);
                stmts::CSTYLE_CAST
            }
        };
        Ok(code)
    }
}

fn unary_opcode(op: UnaryOp) -> u64 {
    match op {
        UnaryOp::PostInc => 0,
        UnaryOp::PostDec => 1,
        UnaryOp::PreInc => 2,
        UnaryOp::PreDec => 3,
        UnaryOp::AddrOf => 4,
        UnaryOp::Deref => 5,
        UnaryOp::Plus => 6,
        UnaryOp::Minus => 7,
        UnaryOp::Not => 8,
        UnaryOp::LNot => 9,
    }
}

fn binary_opcode(op: BinaryOp) -> u64 {
    match op {
        BinaryOp::Mul => 0,
        BinaryOp::Div => 1,
        BinaryOp::Rem => 2,
        BinaryOp::Add => 3,
        BinaryOp::Sub => 4,
        BinaryOp::Shl => 5,
        BinaryOp::Shr => 6,
        BinaryOp::Lt => 7,
        BinaryOp::Gt => 8,
        BinaryOp::Le => 9,
        BinaryOp::Ge => 10,
        BinaryOp::Eq => 11,
        BinaryOp::Ne => 12,
        BinaryOp::And => 13,
        BinaryOp::Xor => 14,
        BinaryOp::Or => 15,
        BinaryOp::LAnd => 16,
        BinaryOp::LOr => 17,
        BinaryOp::Assign => 18,
        BinaryOp::Comma => 19,
    }
}
