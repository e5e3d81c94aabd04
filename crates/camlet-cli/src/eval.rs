//! Evaluator for Camlet expressions
//!
//! A tree-walking interpreter over the monitored tree. Monitored nodes
//! evaluate their inner expression and then enforce the attached contract.

use std::cell::Cell;
use std::cmp::Ordering;
use std::rc::Rc;

use camlet_ast::ast::{BinOp, Expr, LogicalOp, UnOp};
use camlet_ast::span::Span;
use camlet_types::Type;

use crate::closure::{Closure, UserFn};
use crate::contract::{enforce, Contract};
use crate::env::Env;
use crate::error::{RuntimeError, TOP_LEVEL};
use crate::stack::ensure_sufficient_stack;
use crate::value::Value;

/// Maximum call depth to prevent stack overflow from deep recursion
pub const MAX_CALL_DEPTH: u32 = 1000;

thread_local! {
    /// Current call depth (thread-local for safety)
    static CALL_DEPTH: Cell<u32> = const { Cell::new(0) };
}

pub fn eval_expr(env: &Env, expr: &Expr) -> Result<Value, RuntimeError> {
    ensure_sufficient_stack(|| eval_node(env, expr))
}

fn eval_node(env: &Env, expr: &Expr) -> Result<Value, RuntimeError> {
    match expr {
        Expr::Lit(lit, _) => Ok(Value::from_lit(lit)),
        Expr::Var(id) => env.lookup(&id.text, id.span),
        Expr::Unary { op, expr, span } => {
            let v = eval_expr(env, expr)?;
            eval_unary(*op, v, *span)
        }
        Expr::Binary { lhs, op, rhs, span } => {
            let l = eval_expr(env, lhs)?;
            let r = eval_expr(env, rhs)?;
            eval_binary(*op, l, r, *span)
        }
        Expr::Logical { lhs, op, rhs, .. } => {
            let l = expect_bool(eval_expr(env, lhs)?, lhs.span())?;
            // short-circuit
            match (op, l) {
                (LogicalOp::And, false) => Ok(Value::Bool(false)),
                (LogicalOp::Or, true) => Ok(Value::Bool(true)),
                _ => Ok(Value::Bool(expect_bool(eval_expr(env, rhs)?, rhs.span())?)),
            }
        }
        Expr::If {
            cond, then_, else_, ..
        } => {
            if expect_bool(eval_expr(env, cond)?, cond.span())? {
                eval_expr(env, then_)
            } else {
                eval_expr(env, else_)
            }
        }
        Expr::Lambda { params, body, .. } => Ok(Value::Closure(Closure::User(Rc::new(UserFn {
            params: params.iter().map(|p| p.text.clone()).collect(),
            body: (**body).clone(),
            env: env.clone(),
        })))),
        Expr::Call { callee, args, span } => eval_call(env, callee, args, *span),
        Expr::Let {
            name, value, body, ..
        } => {
            let v = eval_expr(env, value)?;
            let frame = env.extend();
            frame.define(name.text.clone(), v);
            eval_expr(&frame, body)
        }
        Expr::Seq { exprs, span } => {
            let mut last = None;
            for e in exprs {
                last = Some(eval_expr(env, e)?);
            }
            // The parser never builds an empty sequence.
            last.ok_or_else(|| RuntimeError::mismatch(Type::Var(0), Type::Var(0), *span))
        }
        Expr::Monitored { expr, blame } => {
            let value = eval_expr(env, expr)?;
            let contract = Contract::resolve(&blame.contract, &env.root())?;
            let neg = blame.neg.as_deref().unwrap_or(TOP_LEVEL);
            enforce(value, &contract, &blame.pos, neg, expr.span())
        }
    }
}

/// Callee first, then arguments left to right, then application.
fn eval_call(env: &Env, callee: &Expr, args: &[Expr], span: Span) -> Result<Value, RuntimeError> {
    let f = eval_expr(env, callee)?;
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        values.push(eval_expr(env, arg)?);
    }
    match f {
        Value::Closure(closure) => closure.apply(values, span),
        other => Err(RuntimeError::NotCallable {
            ty: other.ty(),
            span: Some(callee.span()),
        }),
    }
}

/// Apply a user lambda: bind parameters in a child of the captured frame
/// and evaluate the body.
pub(crate) fn call_user(f: &UserFn, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let depth = CALL_DEPTH.with(|d| {
        let current = d.get();
        d.set(current + 1);
        current + 1
    });

    if depth > MAX_CALL_DEPTH {
        CALL_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
        return Err(RuntimeError::CallDepthExceeded {
            limit: MAX_CALL_DEPTH,
            span: None,
        });
    }

    let frame = f.env.extend();
    for (param, value) in f.params.iter().zip(args) {
        frame.define(param.clone(), value);
    }
    let result = eval_expr(&frame, &f.body);

    // Decrement even on error.
    CALL_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));

    result
}

fn expect_bool(v: Value, span: Span) -> Result<bool, RuntimeError> {
    match v {
        Value::Bool(b) => Ok(b),
        other => Err(RuntimeError::mismatch(Type::bool(), other.ty(), span)),
    }
}

fn eval_unary(op: UnOp, v: Value, span: Span) -> Result<Value, RuntimeError> {
    match (op, v) {
        (UnOp::Neg, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
        (UnOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
        (UnOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnOp::Neg, other) => Err(RuntimeError::mismatch(Type::int(), other.ty(), span)),
        (UnOp::Not, other) => Err(RuntimeError::mismatch(Type::bool(), other.ty(), span)),
    }
}

/// Operand type an arithmetic operator requires.
fn operand_type(op: BinOp) -> Option<Type> {
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => Some(Type::int()),
        BinOp::FAdd | BinOp::FSub | BinOp::FMul | BinOp::FDiv | BinOp::Pow => {
            Some(Type::float())
        }
        BinOp::Concat => Some(Type::str_()),
        _ => None,
    }
}

pub fn eval_binary(op: BinOp, l: Value, r: Value, span: Span) -> Result<Value, RuntimeError> {
    use Value::{Float, Int, Str};

    let v = match (op, &l, &r) {
        (BinOp::Add, Int(a), Int(b)) => Int(a.wrapping_add(*b)),
        (BinOp::Sub, Int(a), Int(b)) => Int(a.wrapping_sub(*b)),
        (BinOp::Mul, Int(a), Int(b)) => Int(a.wrapping_mul(*b)),
        (BinOp::Div | BinOp::Mod, Int(_), Int(0)) => {
            return Err(RuntimeError::DivisionByZero { span: Some(span) })
        }
        (BinOp::Div, Int(a), Int(b)) => Int(a.wrapping_div(*b)),
        (BinOp::Mod, Int(a), Int(b)) => Int(a.wrapping_rem(*b)),

        (BinOp::FAdd, Float(a), Float(b)) => Float(a + b),
        (BinOp::FSub, Float(a), Float(b)) => Float(a - b),
        (BinOp::FMul, Float(a), Float(b)) => Float(a * b),
        (BinOp::FDiv, Float(a), Float(b)) => Float(a / b),
        (BinOp::Pow, Float(a), Float(b)) => Float(a.powf(*b)),

        (BinOp::Concat, Str(a), Str(b)) => Str(format!("{a}{b}")),

        (BinOp::Lt, ..) => Value::Bool(compare(&l, &r, span)? == Some(Ordering::Less)),
        (BinOp::Le, ..) => Value::Bool(matches!(
            compare(&l, &r, span)?,
            Some(Ordering::Less | Ordering::Equal)
        )),
        (BinOp::Gt, ..) => Value::Bool(compare(&l, &r, span)? == Some(Ordering::Greater)),
        (BinOp::Ge, ..) => Value::Bool(matches!(
            compare(&l, &r, span)?,
            Some(Ordering::Greater | Ordering::Equal)
        )),
        (BinOp::Eq, ..) => Value::Bool(compare(&l, &r, span)? == Some(Ordering::Equal)),
        (BinOp::Ne, ..) => Value::Bool(compare(&l, &r, span)? != Some(Ordering::Equal)),
        (BinOp::PhysEq, ..) => Value::Bool(physical_eq(&l, &r, span)?),
        (BinOp::PhysNe, ..) => Value::Bool(!physical_eq(&l, &r, span)?),

        _ => {
            // Arithmetic on the wrong operand types: report the first offender.
            let expected = operand_type(op).unwrap_or_else(|| l.ty());
            let found = if expected.accepts(&l.ty()) { r.ty() } else { l.ty() };
            return Err(RuntimeError::mismatch(expected, found, span));
        }
    };
    Ok(v)
}

/// Structural ordering of two primitives of the same type.
/// `None` only for unordered floats (NaN).
fn compare(l: &Value, r: &Value, span: Span) -> Result<Option<Ordering>, RuntimeError> {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => Ok(Some(a.cmp(b))),
        (Value::Float(a), Value::Float(b)) => Ok(a.partial_cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Ok(Some(a.cmp(b))),
        (Value::Char(a), Value::Char(b)) => Ok(Some(a.cmp(b))),
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::Closure(_), Value::Closure(_)) => {
            Err(RuntimeError::FunctionalComparison { span: Some(span) })
        }
        _ => Err(RuntimeError::mismatch(l.ty(), r.ty(), span)),
    }
}

fn physical_eq(l: &Value, r: &Value, span: Span) -> Result<bool, RuntimeError> {
    let same_kind = std::mem::discriminant(l) == std::mem::discriminant(r);
    if !same_kind {
        return Err(RuntimeError::mismatch(l.ty(), r.ty(), span));
    }
    Ok(l == r)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin(op: BinOp, l: impl Into<Value>, r: impl Into<Value>) -> Result<Value, RuntimeError> {
        eval_binary(op, l.into(), r.into(), Span::default())
    }

    #[test]
    fn integer_division_by_zero() {
        assert!(matches!(
            bin(BinOp::Div, 1i64, 0i64),
            Err(RuntimeError::DivisionByZero { .. })
        ));
        assert!(matches!(
            bin(BinOp::Mod, 1i64, 0i64),
            Err(RuntimeError::DivisionByZero { .. })
        ));
        assert_eq!(bin(BinOp::Mod, -7i64, 2i64), Ok(Value::Int(-1)));
        assert_eq!(bin(BinOp::Div, -7i64, 2i64), Ok(Value::Int(-3)));
    }

    #[test]
    fn float_division_by_zero_is_infinite() {
        assert_eq!(
            bin(BinOp::FDiv, 1.0, 0.0),
            Ok(Value::Float(f64::INFINITY))
        );
    }

    #[test]
    fn mixing_int_and_float_is_a_type_error() {
        let err = bin(BinOp::Add, 1i64, 2.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "This expression has type float but an expression was expected of type int"
        );
        let err = bin(BinOp::FAdd, 1i64, 2.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "This expression has type int but an expression was expected of type float"
        );
    }

    #[test]
    fn comparisons_are_structural() {
        assert_eq!(bin(BinOp::Lt, "abc", "abd"), Ok(Value::Bool(true)));
        assert_eq!(bin(BinOp::Ge, 2i64, 2i64), Ok(Value::Bool(true)));
        assert_eq!(bin(BinOp::Eq, f64::NAN, f64::NAN), Ok(Value::Bool(false)));
        assert_eq!(bin(BinOp::Ne, true, false), Ok(Value::Bool(true)));
        assert!(bin(BinOp::Lt, 1i64, "x").is_err());
    }

    #[test]
    fn concat_joins_strings() {
        assert_eq!(bin(BinOp::Concat, "foo", "bar"), Ok(Value::from("foobar")));
    }

    #[test]
    fn unary_operators() {
        assert_eq!(eval_unary(UnOp::Neg, Value::Int(3), Span::default()), Ok(Value::Int(-3)));
        assert_eq!(
            eval_unary(UnOp::Not, Value::Bool(false), Span::default()),
            Ok(Value::Bool(true))
        );
        assert!(eval_unary(UnOp::Not, Value::Int(1), Span::default()).is_err());
    }
}
