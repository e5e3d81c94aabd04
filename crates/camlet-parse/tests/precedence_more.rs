use camlet_ast::ast::{BinOp, Expr, LogicalOp, Stmt, UnOp};
use camlet_parse::parse_str;

fn val(m: &str) -> Expr {
    let p = parse_str("<mem>", &format!("let v = {m};;")).unwrap();
    let Stmt::Let(ld) = &p.body[0] else {
        panic!("expected Let declaration");
    };
    ld.value.clone()
}

#[test]
fn arithmetic_comparison_logical_layers() {
    // ((1 + 2*3) = 7 && 4 < 5) || 0 = 1
    let e = val("1 + 2*3 = 7 && 4 < 5 || 0 = 1");
    let Expr::Logical {
        op: LogicalOp::Or,
        lhs,
        rhs,
        ..
    } = e
    else {
        panic!("top should be Or");
    };
    assert!(matches!(*lhs, Expr::Logical { op: LogicalOp::And, .. }));
    assert!(matches!(*rhs, Expr::Binary { op: BinOp::Eq, .. }));
}

#[test]
fn comparison_is_left_associative() {
    let Expr::Binary {
        op: BinOp::Eq, lhs, rhs, ..
    } = val("1 = 1 = true")
    else {
        panic!("top should be Eq");
    };
    assert!(matches!(*lhs, Expr::Binary { op: BinOp::Eq, .. }));
    assert!(matches!(*rhs, Expr::Lit(_, _)));
}

#[test]
fn power_and_concat_are_right_associative() {
    let Expr::Binary { op: BinOp::Pow, rhs, .. } = val("2. ** 3. ** 2.") else {
        panic!("top should be Pow");
    };
    assert!(matches!(*rhs, Expr::Binary { op: BinOp::Pow, .. }));

    let Expr::Binary {
        op: BinOp::Concat, rhs, ..
    } = val(r#""a" ^ "b" ^ "c""#)
    else {
        panic!("top should be Concat");
    };
    assert!(matches!(*rhs, Expr::Binary { op: BinOp::Concat, .. }));
}

#[test]
fn mod_and_float_operators_share_multiplicative_level() {
    let Expr::Binary { op: BinOp::FAdd, rhs, .. } = val("1. +. 2. *. 3.") else {
        panic!("top should be FAdd");
    };
    assert!(matches!(*rhs, Expr::Binary { op: BinOp::FMul, .. }));

    let Expr::Binary { op: BinOp::Sub, rhs, .. } = val("10 - 7 mod 4") else {
        panic!("top should be Sub");
    };
    assert!(matches!(*rhs, Expr::Binary { op: BinOp::Mod, .. }));
}

#[test]
fn not_applies_before_logical_operators() {
    let Expr::Logical {
        op: LogicalOp::And,
        lhs,
        ..
    } = val("not a && b")
    else {
        panic!("top should be And");
    };
    assert!(matches!(*lhs, Expr::Unary { op: UnOp::Not, .. }));
}
