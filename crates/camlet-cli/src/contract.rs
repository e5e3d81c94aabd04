//! Runtime contracts and their enforcement.
//!
//! The monitor attaches contracts to the tree in source form. They are
//! resolved here, at the monitored node, by evaluating each flat predicate
//! in the global environment.

use std::rc::Rc;

use camlet_ast::ast::ContractExpr;
use camlet_ast::span::Span;
use camlet_types::Type;

use crate::closure::{Closure, MonitoredFn};
use crate::env::Env;
use crate::error::RuntimeError;
use crate::eval::eval_expr;
use crate::value::Value;

#[derive(Debug, Clone)]
pub enum Contract {
    /// One-argument predicate returning `bool`.
    Base { predicate: Closure, label: String },
    /// Domain contracts per argument, plus a range contract for the result.
    Function {
        domain: Vec<Contract>,
        range: Box<Contract>,
        label: String,
    },
}

impl Contract {
    pub fn resolve(expr: &ContractExpr, env: &Env) -> Result<Self, RuntimeError> {
        match expr {
            ContractExpr::Flat(pred) => match eval_expr(env, pred)? {
                Value::Closure(predicate) if predicate.arity() == 1 => Ok(Contract::Base {
                    predicate,
                    label: pred.to_string(),
                }),
                other => Err(RuntimeError::mismatch(
                    Type::fun(vec![Type::Var(0)], Type::bool()),
                    other.ty(),
                    pred.span(),
                )),
            },
            ContractExpr::Arrow { domain, range, .. } => Ok(Contract::Function {
                domain: domain
                    .iter()
                    .map(|d| Contract::resolve(d, env))
                    .collect::<Result<_, _>>()?,
                range: Box::new(Contract::resolve(range, env)?),
                label: expr.to_string(),
            }),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Contract::Base { label, .. } | Contract::Function { label, .. } => label,
        }
    }
}

fn violation(contract: &Contract, party: &str, value: &Value, span: Span) -> RuntimeError {
    tracing::debug!(contract = contract.label(), party, %value, "contract violated");
    RuntimeError::ContractViolation {
        party: party.to_string(),
        contract: contract.label().to_string(),
        value: value.to_string(),
        span: Some(span),
    }
}

/// Check `value` against `contract`.
///
/// A failing predicate blames `pos`. A closure under a function contract
/// comes back wrapped so that each later call is checked; any other value
/// under a function contract passes through unchanged.
pub fn enforce(
    value: Value,
    contract: &Contract,
    pos: &str,
    neg: &str,
    span: Span,
) -> Result<Value, RuntimeError> {
    tracing::trace!(contract = contract.label(), pos, neg, "enforcing contract");
    match contract {
        Contract::Base { predicate, .. } => {
            match predicate.apply(vec![value.clone()], span)? {
                Value::Bool(true) => Ok(value),
                Value::Bool(false) => Err(violation(contract, pos, &value, span)),
                other => Err(RuntimeError::mismatch(Type::bool(), other.ty(), span)),
            }
        }
        Contract::Function { domain, range, .. } => match value {
            Value::Closure(inner) => {
                if inner.arity() != domain.len() {
                    return Err(violation(contract, pos, &Value::Closure(inner), span));
                }
                Ok(Value::Closure(Closure::Monitored(Rc::new(MonitoredFn {
                    inner,
                    domain: domain.clone(),
                    range: (**range).clone(),
                    pos: pos.to_string(),
                    neg: neg.to_string(),
                }))))
            }
            other => Ok(other),
        },
    }
}

/// Call a contract-wrapped closure. Arguments are checked with the blame
/// parties swapped, so a bad argument blames the consumer.
pub(crate) fn apply_monitored(
    m: &MonitoredFn,
    args: Vec<Value>,
    span: Span,
) -> Result<Value, RuntimeError> {
    let mut checked = Vec::with_capacity(args.len());
    for (arg, dom) in args.into_iter().zip(&m.domain) {
        checked.push(enforce(arg, dom, &m.neg, &m.pos, span)?);
    }
    let result = m.inner.apply(checked, span)?;
    enforce(result, &m.range, &m.pos, &m.neg, span)
}
