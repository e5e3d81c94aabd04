//! Global and local bindings, as seen through the host interface.

use camlet_cli::{Interpreter, Outcome, Value};
use camlet_types::Type;
use pretty_assertions::assert_eq;

fn finished(value: Value, ty: Type, name: Option<&str>) -> Outcome {
    Outcome::Finished {
        value,
        ty,
        name: name.map(String::from),
    }
}

fn run(src: &str) -> Outcome {
    Interpreter::new().run(src)
}

#[test]
fn unbound_name() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.run("x;;"), Outcome::Errored);
    assert_eq!(interp.errors().len(), 1);
    assert_eq!(interp.errors()[0].explain(), "Unbound value x");
}

#[test]
fn global_binding_expression() {
    assert_eq!(
        run("let x = 10;;"),
        finished(Value::Int(10), Type::int(), Some("x"))
    );
}

#[test]
fn bound_identifier() {
    assert_eq!(
        run("let x = 10;;\nx;;"),
        finished(Value::Int(10), Type::int(), None)
    );
}

#[test]
fn rebinding_identifier() {
    assert_eq!(
        run("let x = 10;;\nlet x = 20;;"),
        finished(Value::Int(20), Type::int(), Some("x"))
    );
    assert_eq!(
        run("let x = 10;;\nlet x = 20;;\nx;;"),
        finished(Value::Int(20), Type::int(), None)
    );
}

#[test]
fn local_binding_expression() {
    assert_eq!(
        run("let x = 10 in x;;"),
        finished(Value::Int(10), Type::int(), None)
    );
    assert_eq!(
        run("let x = 10 in x + 10;;"),
        finished(Value::Int(20), Type::int(), None)
    );
}

#[test]
fn local_binding_with_nesting() {
    let src = "
        let a = 1 in
          let b = a + 1 in
            let c = b + 1 in
              a + b + c;;
    ";
    assert_eq!(run(src), finished(Value::Int(6), Type::int(), None));
}

#[test]
fn local_binding_scopes_the_declaration() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.run("let a = 1 in a;;\na;;"), Outcome::Errored);
    assert_eq!(interp.errors().len(), 1);
    assert_eq!(interp.errors()[0].explain(), "Unbound value a");
}

#[test]
fn failed_statement_does_not_stop_the_program() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.run("let a = 1;; b;; let c = a + 1;;"), Outcome::Errored);
    assert_eq!(interp.errors().len(), 1);
    assert_eq!(interp.global().get("c"), Some(Value::Int(2)));
}

#[test]
fn bindings_persist_across_runs() {
    let mut interp = Interpreter::new();
    interp.run("let base = 40;;");
    assert_eq!(
        interp.run("base + 2;;"),
        finished(Value::Int(42), Type::int(), None)
    );
    // errors are per run
    interp.run("missing;;");
    assert_eq!(interp.errors().len(), 1);
    interp.run("base;;");
    assert!(interp.errors().is_empty());
}

#[test]
fn shadowing_in_local_scope_leaves_global_intact() {
    let mut interp = Interpreter::new();
    interp.run("let x = 1;;");
    assert_eq!(
        interp.run("let x = 2 in x * 10;;"),
        finished(Value::Int(20), Type::int(), None)
    );
    assert_eq!(
        interp.run("x;;"),
        finished(Value::Int(1), Type::int(), None)
    );
}

#[test]
fn empty_program_has_no_outcome() {
    assert_eq!(run(""), Outcome::Empty);
    assert_eq!(run("(* only a comment *)"), Outcome::Empty);
}

#[test]
fn literal_types() {
    assert_eq!(run("3.5;;"), finished(Value::Float(3.5), Type::float(), None));
    assert_eq!(run("'c';;"), finished(Value::Char('c'), Type::char(), None));
    assert_eq!(
        run("\"hi\";;"),
        finished(Value::from("hi"), Type::str_(), None)
    );
    assert_eq!(run("true;;"), finished(Value::Bool(true), Type::bool(), None));
}
