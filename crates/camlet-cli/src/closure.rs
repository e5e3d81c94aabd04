//! Callable values: natives, user lambdas, and contract-wrapped closures.

use std::fmt;
use std::rc::Rc;

use camlet_ast::ast::Expr;
use camlet_ast::span::Span;
use camlet_types::Type;

use crate::contract::{self, Contract};
use crate::env::Env;
use crate::error::RuntimeError;
use crate::eval;
use crate::value::Value;

/// Body of a built-in function. Arguments have already been checked
/// against the declared signature.
pub type NativeImpl = fn(&[Value]) -> Result<Value, RuntimeError>;

pub struct NativeFn {
    pub name: String,
    pub ty: Type,
    pub func: NativeImpl,
}

pub struct UserFn {
    pub params: Vec<String>,
    pub body: Expr,
    pub env: Env,
}

/// A closure whose calls are checked against a function contract.
pub struct MonitoredFn {
    pub inner: Closure,
    pub domain: Vec<Contract>,
    pub range: Contract,
    pub pos: String,
    pub neg: String,
}

#[derive(Clone)]
pub enum Closure {
    Native(Rc<NativeFn>),
    User(Rc<UserFn>),
    Monitored(Rc<MonitoredFn>),
}

impl Closure {
    pub fn arity(&self) -> usize {
        match self {
            Closure::Native(n) => n.ty.arity().unwrap_or(0),
            Closure::User(u) => u.params.len(),
            Closure::Monitored(m) => m.inner.arity(),
        }
    }

    pub fn ty(&self) -> Type {
        match self {
            Closure::Native(n) => n.ty.clone(),
            Closure::User(u) => Type::poly_fun(u.params.len()),
            Closure::Monitored(m) => m.inner.ty(),
        }
    }

    /// Identity comparison, used by `==` and `!=`.
    pub fn ptr_eq(&self, other: &Closure) -> bool {
        match (self, other) {
            (Closure::Native(a), Closure::Native(b)) => Rc::ptr_eq(a, b),
            (Closure::User(a), Closure::User(b)) => Rc::ptr_eq(a, b),
            (Closure::Monitored(a), Closure::Monitored(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Apply to exactly `arity()` arguments; `span` locates the call site.
    pub fn apply(&self, args: Vec<Value>, span: Span) -> Result<Value, RuntimeError> {
        let expected = self.arity();
        if args.len() != expected {
            return Err(RuntimeError::Arity {
                expected,
                found: args.len(),
                span: Some(span),
            });
        }
        match self {
            Closure::Native(native) => native.call(&args, span),
            Closure::User(user) => eval::call_user(user, args).map_err(|e| e.or_span(span)),
            Closure::Monitored(monitored) => contract::apply_monitored(monitored, args, span),
        }
    }
}

impl NativeFn {
    fn call(&self, args: &[Value], span: Span) -> Result<Value, RuntimeError> {
        if let Type::Fun { params, .. } = &self.ty {
            for (param, arg) in params.iter().zip(args) {
                let found = arg.ty();
                if !param.accepts(&found) {
                    return Err(RuntimeError::mismatch(param.clone(), found, span));
                }
            }
        }
        tracing::trace!(native = %self.name, "calling builtin");
        (self.func)(args).map_err(|e| e.or_span(span))
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Closure::Native(n) => write!(f, "<native {} : {}>", n.name, n.ty),
            Closure::User(u) => write!(f, "<fun {}>", u.params.join(" ")),
            Closure::Monitored(m) => write!(f, "<monitored {:?} by {}>", m.inner, m.pos),
        }
    }
}
