//! Statements and expressions.

use serde::{Deserialize, Serialize};

use crate::types::{ApInt, QualType};
use crate::{DeclHandle, SourceLocation, StmtHandle};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum UnaryOp {
    PostInc,
    PostDec,
    PreInc,
    PreDec,
    AddrOf,
    Deref,
    Plus,
    Minus,
    Not,
    LNot,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum BinaryOp {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Xor,
    Or,
    LAnd,
    LOr,
    Assign,
    Comma,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Stmt {
    Null {
        #[serde(default)]
        semi_loc: SourceLocation,
    },
    Compound {
        body: Vec<StmtHandle>,
        #[serde(default)]
        lbrace: SourceLocation,
        #[serde(default)]
        rbrace: SourceLocation,
    },
    Return {
        value: Option<StmtHandle>,
        #[serde(default)]
        loc: SourceLocation,
    },
    If {
        cond: StmtHandle,
        then: StmtHandle,
        #[serde(default)]
        otherwise: Option<StmtHandle>,
        #[serde(default)]
        if_loc: SourceLocation,
        #[serde(default)]
        else_loc: SourceLocation,
    },
    While {
        cond: StmtHandle,
        body: StmtHandle,
        #[serde(default)]
        loc: SourceLocation,
    },
    Decl {
        decls: Vec<DeclHandle>,
        #[serde(default)]
        start: SourceLocation,
        #[serde(default)]
        end: SourceLocation,
    },
    DeclRef {
        ty: QualType,
        decl: DeclHandle,
        #[serde(default)]
        loc: SourceLocation,
    },
    IntegerLiteral {
        ty: QualType,
        value: ApInt,
        #[serde(default)]
        loc: SourceLocation,
    },
    /// Value stored as its IEEE bit pattern.
    FloatingLiteral {
        ty: QualType,
        bits: ApInt,
        #[serde(default)]
        is_exact: bool,
        #[serde(default)]
        loc: SourceLocation,
    },
    StringLiteral {
        ty: QualType,
        bytes: String,
        #[serde(default)]
        is_wide: bool,
        #[serde(default)]
        token_locs: Vec<SourceLocation>,
    },
    CharacterLiteral {
        ty: QualType,
        value: u32,
        #[serde(default)]
        is_wide: bool,
        #[serde(default)]
        loc: SourceLocation,
    },
    Paren {
        ty: QualType,
        sub: StmtHandle,
        #[serde(default)]
        lparen: SourceLocation,
        #[serde(default)]
        rparen: SourceLocation,
    },
    UnaryOperator {
        ty: QualType,
        op: UnaryOp,
        sub: StmtHandle,
        #[serde(default)]
        loc: SourceLocation,
    },
    BinaryOperator {
        ty: QualType,
        op: BinaryOp,
        lhs: StmtHandle,
        rhs: StmtHandle,
        #[serde(default)]
        loc: SourceLocation,
    },
    Call {
        ty: QualType,
        callee: StmtHandle,
        #[serde(default)]
        args: Vec<StmtHandle>,
        #[serde(default)]
        rparen: SourceLocation,
    },
    ImplicitCast {
        ty: QualType,
        sub: StmtHandle,
        #[serde(default)]
        is_lvalue: bool,
    },
    CStyleCast {
        ty: QualType,
        sub: StmtHandle,
        written: QualType,
        #[serde(default)]
        lparen: SourceLocation,
        #[serde(default)]
        rparen: SourceLocation,
    },
}

impl Stmt {
    /// Child slots in serialization order. Optional children keep their slot as `None`.
    pub fn children(&self) -> Vec<Option<StmtHandle>> {
        match self {
            Stmt::Null { .. }
            | Stmt::Decl { .. }
            | Stmt::DeclRef { .. }
            | Stmt::IntegerLiteral { .. }
            | Stmt::FloatingLiteral { .. }
            | Stmt::StringLiteral { .. }
            | Stmt::CharacterLiteral { .. } => Vec::new(),
            Stmt::Compound { body, .. } => body.iter().copied().map(Some).collect(),
            Stmt::Return { value, .. } => vec![*value],
            Stmt::If {
                cond,
                then,
                otherwise,
                ..
            } => vec![Some(*cond), Some(*then), *otherwise],
            Stmt::While { cond, body, .. } => vec![Some(*cond), Some(*body)],
            Stmt::Paren { sub, .. }
            | Stmt::UnaryOperator { sub, .. }
            | Stmt::ImplicitCast { sub, .. }
            | Stmt::CStyleCast { sub, .. } => vec![Some(*sub)],
            Stmt::BinaryOperator { lhs, rhs, .. } => vec![Some(*lhs), Some(*rhs)],
            Stmt::Call { callee, args, .. } => std::iter::once(Some(*callee))
                .chain(args.iter().copied().map(Some))
                .collect(),
        }
    }

    /// Expression type; `None` for statements.
    pub fn expr_type(&self) -> Option<QualType> {
        match self {
            Stmt::DeclRef { ty, .. }
            | Stmt::IntegerLiteral { ty, .. }
            | Stmt::FloatingLiteral { ty, .. }
            | Stmt::StringLiteral { ty, .. }
            | Stmt::CharacterLiteral { ty, .. }
            | Stmt::Paren { ty, .. }
            | Stmt::UnaryOperator { ty, .. }
            | Stmt::BinaryOperator { ty, .. }
            | Stmt::Call { ty, .. }
            | Stmt::ImplicitCast { ty, .. }
            | Stmt::CStyleCast { ty, .. } => Some(*ty),
            Stmt::Null { .. }
            | Stmt::Compound { .. }
            | Stmt::Return { .. }
            | Stmt::If { .. }
            | Stmt::While { .. }
            | Stmt::Decl { .. } => None,
        }
    }
}
