//! Contract enforcement and blame assignment.

use camlet_cli::{Error, Interpreter, Outcome, RuntimeError, Value};
use pretty_assertions::assert_eq;

/// Runs `src` and returns the single blamed party.
fn blamed(src: &str) -> String {
    let mut interp = Interpreter::new();
    assert_eq!(interp.run(src), Outcome::Errored, "expected a violation");
    let errors = interp.errors();
    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    match &errors[0] {
        Error::Runtime(RuntimeError::ContractViolation { party, .. }) => party.clone(),
        other => panic!("expected a contract violation, got {other:?}"),
    }
}

fn value_of(src: &str) -> Value {
    let mut interp = Interpreter::new();
    match interp.run(src) {
        Outcome::Finished { value, .. } => value,
        other => panic!("expected success, got {other:?} with {:?}", interp.errors()),
    }
}

#[test]
fn base_contract_violated_by_binding_blames_the_binding() {
    assert_eq!(blamed("contract f = positive;; let f = 0 - 5;;"), "f");
}

#[test]
fn base_contract_satisfied() {
    assert_eq!(value_of("contract f = positive;; let f = 5;; f + 1;;"), Value::Int(6));
}

#[test]
fn violation_message_names_the_party() {
    let mut interp = Interpreter::new();
    interp.run("contract f = negative;; let f = 3;;");
    assert_eq!(interp.errors()[0].explain(), "Contract violated by f");
    match &interp.errors()[0] {
        Error::Runtime(RuntimeError::ContractViolation {
            contract, value, ..
        }) => {
            assert_eq!(contract, "negative");
            assert_eq!(value, "3");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn violating_binding_is_not_defined() {
    let mut interp = Interpreter::new();
    interp.run("contract f = positive;; let f = 0 - 1;;");
    assert_eq!(interp.global().get("f"), None);
}

#[test]
fn range_violation_blames_the_function() {
    let src = "
        contract g = positive -> positive;;
        let g x = x - 10;;
        let h y = g y;;
        h 5;;
    ";
    assert_eq!(blamed(src), "g");
}

#[test]
fn domain_violation_blames_the_calling_scope() {
    let src = "
        contract g = positive -> positive;;
        let g x = x + 10;;
        let h y = g (y - 10);;
        h 5;;
    ";
    assert_eq!(blamed(src), "h");
}

#[test]
fn domain_violation_at_top_level() {
    let src = "
        contract g = positive -> positive;;
        let g x = x + 10;;
        g 0;;
    ";
    assert_eq!(blamed(src), "top-level");
}

#[test]
fn satisfied_function_contract_is_transparent() {
    let src = "
        contract g = positive -> positive;;
        let g x = x * 2;;
        let h y = g y + 1;;
        h 4;;
    ";
    assert_eq!(value_of(src), Value::Int(9));
}

#[test]
fn contracts_only_reach_later_occurrences() {
    let src = "
        let g x = x - 10;;
        let early y = g y;;
        contract g = positive -> positive;;
        early 1;;
    ";
    assert_eq!(value_of(src), Value::Int(-9));
}

#[test]
fn recursive_function_under_contract() {
    let src = "
        contract fact = positive -> positive;;
        let fact n = if n = 1 then 1 else n * fact (n - 1);;
        fact 5;;
    ";
    assert_eq!(value_of(src), Value::Int(120));
    let bad = "
        contract fact = positive -> positive;;
        let fact n = if n = 1 then 1 else n * fact (n - 1);;
        fact 0;;
    ";
    assert_eq!(blamed(bad), "top-level");
}

#[test]
fn lambda_predicates_work_as_contracts() {
    assert_eq!(blamed("contract big = fun x -> x > 2;; let big = 1;;"), "big");
    assert_eq!(
        value_of("contract big = (fun x -> x > 2);; let big = 3;; big;;"),
        Value::Int(3)
    );
}

#[test]
fn higher_order_contract_blames_the_supplier_of_a_bad_function() {
    let src = "
        contract apply = (positive -> positive) -> positive -> positive;;
        let apply f x = f x;;
        let bad = fun n -> 0 - n;;
        let use_it = apply bad 3;;
    ";
    assert_eq!(blamed(src), "use_it");
}

#[test]
fn function_contract_rejects_wrong_arity_implementation() {
    assert_eq!(
        blamed("contract k = positive -> positive;; let k x y = x;;"),
        "k"
    );
}

#[test]
fn function_contract_on_plain_value_is_ignored() {
    assert_eq!(
        value_of("contract n = positive -> positive;; let n = 0 - 3;; n;;"),
        Value::Int(-3)
    );
}

#[test]
fn wrapped_closures_still_raise_arity_errors() {
    let mut interp = Interpreter::new();
    interp.run("contract g = positive -> positive;; let g x = x;; g 1 2;;");
    assert!(matches!(
        interp.errors(),
        [Error::Runtime(RuntimeError::Arity {
            expected: 1,
            found: 2,
            ..
        })]
    ));
}

#[test]
fn unbound_predicate_fails_at_declaration() {
    let mut interp = Interpreter::new();
    interp.run("contract f = positiv;;");
    assert_eq!(interp.errors()[0].explain(), "Unbound value positiv");
}

#[test]
fn unresolvable_contract_is_not_declared() {
    let mut interp = Interpreter::new();
    let out = interp.run("contract f = nope;; let f = 5;; f;;");
    let errors: Vec<_> = interp.errors().iter().map(|e| e.explain()).collect();
    assert_eq!(errors, vec!["Unbound value nope".to_string()]);
    assert_eq!(out, Outcome::Errored);
    assert_eq!(interp.global().get("f"), Some(Value::Int(5)));
    assert!(matches!(
        interp.statement_results().last(),
        Some(camlet_cli::StatementResult::Evaluated {
            value: Value::Int(5),
            ..
        })
    ));
}

#[test]
fn contract_declared_after_binding_checks_each_reference() {
    assert_eq!(blamed("let f = 0 - 5;; contract f = positive;; f;;"), "f");
}

#[test]
fn predicates_are_looked_up_when_checked() {
    // Rebinding a predicate changes contracts declared before it.
    assert_eq!(
        value_of(
            "
            contract f = positive;;
            let positive x = true;;
            let f = 0 - 5;;
            f;;
        "
        ),
        Value::Int(-5)
    );
}

#[test]
fn contracts_can_be_switched_off() {
    let mut interp = Interpreter::with_options(camlet_cli::Options { contracts: false });
    let out = interp.run(
        "
        contract g = positive -> positive;;
        let g x = x - 10;;
        g 1;;
    ",
    );
    assert!(matches!(out, Outcome::Finished { value: Value::Int(-9), .. }));
}

#[test]
fn each_violation_is_reported_once_and_later_statements_run() {
    let mut interp = Interpreter::new();
    interp.run(
        "
        contract g = positive -> positive;;
        let g x = x;;
        g 0;;
        g 0;;
        let ok = g 7;;
    ",
    );
    assert_eq!(interp.errors().len(), 2);
    assert_eq!(interp.global().get("ok"), Some(Value::Int(7)));
}
