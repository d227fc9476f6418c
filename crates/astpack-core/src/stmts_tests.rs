use crate::{
    ApInt, BinaryOp, DeclHandle, QualType, SourceLocation, Stmt, StmtHandle, TypeHandle,
};

fn int_ty() -> QualType {
    QualType::new(TypeHandle(0))
}

#[test]
fn leaves_have_no_children() {
    let lit = Stmt::IntegerLiteral {
        ty: int_ty(),
        value: ApInt::from_u64(32, 1),
        loc: SourceLocation::INVALID,
    };
    assert!(lit.children().is_empty());
    assert_eq!(lit.expr_type(), Some(int_ty()));

    let decl = Stmt::Decl {
        decls: vec![DeclHandle(1)],
        start: SourceLocation::INVALID,
        end: SourceLocation::INVALID,
    };
    assert!(decl.children().is_empty());
    assert_eq!(decl.expr_type(), None);
}

#[test]
fn if_without_else_keeps_empty_slot() {
    let stmt = Stmt::If {
        cond: StmtHandle(0),
        then: StmtHandle(1),
        otherwise: None,
        if_loc: SourceLocation::INVALID,
        else_loc: SourceLocation::INVALID,
    };
    assert_eq!(
        stmt.children(),
        vec![Some(StmtHandle(0)), Some(StmtHandle(1)), None]
    );
}

#[test]
fn call_children_start_with_callee() {
    let stmt = Stmt::Call {
        ty: int_ty(),
        callee: StmtHandle(4),
        args: vec![StmtHandle(5), StmtHandle(6)],
        rparen: SourceLocation::INVALID,
    };
    assert_eq!(
        stmt.children(),
        vec![Some(StmtHandle(4)), Some(StmtHandle(5)), Some(StmtHandle(6))]
    );
}

#[test]
fn binary_operator_children_in_order() {
    let stmt = Stmt::BinaryOperator {
        ty: int_ty(),
        op: BinaryOp::Add,
        lhs: StmtHandle(2),
        rhs: StmtHandle(3),
        loc: SourceLocation(9),
    };
    assert_eq!(stmt.children(), vec![Some(StmtHandle(2)), Some(StmtHandle(3))]);
}

#[test]
fn return_without_value() {
    let stmt = Stmt::Return {
        value: None,
        loc: SourceLocation::INVALID,
    };
    assert_eq!(stmt.children(), vec![None]);
}
