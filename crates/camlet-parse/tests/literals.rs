use camlet_ast::ast::{Expr, Lit, Stmt};
use camlet_parse::parse_str;

#[test]
fn ints_floats_bools_chars_string_escapes() {
    let p = parse_str(
        "<mem>",
        r#"let a = 42;; let b = 3.5;; let c = true;; let d = 'z';; let e = "hi\n\"there\"";; let f = 2.;;"#,
    )
    .unwrap();
    let take = |i: usize| -> &Expr {
        let Stmt::Let(ld) = &p.body[i] else {
            panic!("expected Let declaration");
        };
        &ld.value
    };

    assert!(matches!(take(0), Expr::Lit(Lit::Int(42), _)));
    assert!(matches!(take(1), Expr::Lit(Lit::Float(f), _) if (*f - 3.5).abs() < 1e-9));
    assert!(matches!(take(2), Expr::Lit(Lit::Bool(true), _)));
    assert!(matches!(take(3), Expr::Lit(Lit::Char('z'), _)));
    assert!(matches!(take(4), Expr::Lit(Lit::Str(s), _) if s == "hi\n\"there\""));
    assert!(matches!(take(5), Expr::Lit(Lit::Float(f), _) if (*f - 2.0).abs() < 1e-9));
}
