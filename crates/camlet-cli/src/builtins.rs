//! Built-in functions registered in the global frame.

use std::rc::Rc;

use camlet_types::Type;
use thiserror::Error;

use crate::closure::{Closure, NativeFn, NativeImpl};
use crate::env::Env;
use crate::error::RuntimeError;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    #[error("builtin `{name}` declares arity {arity} but its signature `{signature}` takes {params} argument(s)")]
    SignatureMismatch {
        name: String,
        arity: usize,
        signature: Type,
        params: usize,
    },
}

/// A native function awaiting registration.
pub struct Builtin {
    pub name: String,
    pub arity: usize,
    pub ty: Type,
    pub func: NativeImpl,
}

impl Builtin {
    pub fn new(name: impl Into<String>, arity: usize, ty: Type, func: NativeImpl) -> Self {
        Self {
            name: name.into(),
            arity,
            ty,
            func,
        }
    }

    pub fn into_closure(self) -> Result<Closure, RegistrationError> {
        let params = self.ty.arity().unwrap_or(0);
        if params != self.arity || self.arity == 0 {
            return Err(RegistrationError::SignatureMismatch {
                name: self.name,
                arity: self.arity,
                signature: self.ty,
                params,
            });
        }
        Ok(Closure::Native(Rc::new(NativeFn {
            name: self.name,
            ty: self.ty,
            func: self.func,
        })))
    }
}

pub fn register(env: &Env, builtin: Builtin) -> Result<(), RegistrationError> {
    let name = builtin.name.clone();
    let closure = builtin.into_closure()?;
    env.define(name, Value::Closure(closure));
    Ok(())
}

/// Register the default table into `env`.
pub fn install(env: &Env) {
    for builtin in defaults() {
        let name = builtin.name.clone();
        if let Err(e) = register(env, builtin) {
            tracing::warn!(builtin = %name, error = %e, "skipping builtin");
        }
    }
}

pub fn defaults() -> Vec<Builtin> {
    let int_pred = || Type::fun(vec![Type::int()], Type::bool());
    let float_fn = || Type::fun(vec![Type::float()], Type::float());
    vec![
        Builtin::new("any", 1, Type::fun(vec![Type::Var(0)], Type::bool()), any),
        Builtin::new("positive", 1, int_pred(), positive),
        Builtin::new("negative", 1, int_pred(), negative),
        Builtin::new("zero", 1, int_pred(), zero),
        Builtin::new("length", 1, Type::fun(vec![Type::str_()], Type::int()), length),
        Builtin::new("to_int", 1, Type::fun(vec![Type::float()], Type::int()), to_int),
        Builtin::new("round", 1, Type::fun(vec![Type::float()], Type::int()), round),
        Builtin::new(
            "float_of_int",
            1,
            Type::fun(vec![Type::int()], Type::float()),
            float_of_int,
        ),
        Builtin::new("sqrt", 1, float_fn(), sqrt),
        Builtin::new("exp", 1, float_fn(), exp),
        Builtin::new("cos", 1, float_fn(), cos),
        Builtin::new("cosh", 1, float_fn(), cosh),
        Builtin::new(
            "hypot",
            2,
            Type::fun(vec![Type::float(), Type::float()], Type::float()),
            hypot,
        ),
    ]
}

fn int_arg(args: &[Value], i: usize) -> Result<i64, RuntimeError> {
    match args.get(i) {
        Some(Value::Int(n)) => Ok(*n),
        other => Err(arg_mismatch(Type::int(), other)),
    }
}

fn float_arg(args: &[Value], i: usize) -> Result<f64, RuntimeError> {
    match args.get(i) {
        Some(Value::Float(x)) => Ok(*x),
        other => Err(arg_mismatch(Type::float(), other)),
    }
}

fn arg_mismatch(expected: Type, found: Option<&Value>) -> RuntimeError {
    RuntimeError::TypeMismatch {
        expected,
        found: found.map_or(Type::Var(0), Value::ty),
        span: None,
    }
}

fn any(_: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(true))
}

fn positive(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(int_arg(args, 0)? > 0))
}

fn negative(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(int_arg(args, 0)? < 0))
}

fn zero(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(int_arg(args, 0)? == 0))
}

fn length(args: &[Value]) -> Result<Value, RuntimeError> {
    match args.first() {
        Some(Value::Str(s)) => Ok(Value::Int(s.chars().count() as i64)),
        other => Err(arg_mismatch(Type::str_(), other)),
    }
}

fn to_int(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Int(float_arg(args, 0)?.trunc() as i64))
}

fn round(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Int(float_arg(args, 0)?.round() as i64))
}

fn float_of_int(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Float(int_arg(args, 0)? as f64))
}

fn sqrt(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Float(float_arg(args, 0)?.sqrt()))
}

fn exp(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Float(float_arg(args, 0)?.exp()))
}

fn cos(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Float(float_arg(args, 0)?.cos()))
}

fn cosh(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Float(float_arg(args, 0)?.cosh()))
}

fn hypot(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Float(float_arg(args, 0)?.hypot(float_arg(args, 1)?)))
}
