//! Runtime values.

use std::fmt;

use camlet_ast::ast::Lit;
use camlet_types::Type;
use serde::{Serialize, Serializer};

use crate::closure::Closure;

/// Runtime values in Camlet. Immutable once produced.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(String),
    Closure(Closure),
}

impl Value {
    pub fn from_lit(lit: &Lit) -> Self {
        match lit {
            Lit::Int(v) => Value::Int(*v),
            Lit::Float(v) => Value::Float(*v),
            Lit::Bool(b) => Value::Bool(*b),
            Lit::Char(c) => Value::Char(*c),
            Lit::Str(s) => Value::Str(s.clone()),
        }
    }

    /// Static type carried alongside the value.
    pub fn ty(&self) -> Type {
        match self {
            Value::Int(_) => Type::int(),
            Value::Float(_) => Type::float(),
            Value::Bool(_) => Type::bool(),
            Value::Char(_) => Type::char(),
            Value::Str(_) => Type::str_(),
            Value::Closure(c) => c.ty(),
        }
    }

    pub fn as_closure(&self) -> Option<&Closure> {
        match self {
            Value::Closure(c) => Some(c),
            _ => None,
        }
    }
}

/// Primitives compare by value, closures by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Closure(a), Value::Closure(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

/// Renders floats the way the toplevel does: `3.` for whole numbers.
pub(crate) fn fmt_float(v: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if v.is_nan() {
        write!(f, "nan")
    } else if v.is_infinite() {
        write!(f, "{}", if v > 0.0 { "infinity" } else { "neg_infinity" })
    } else if v.fract() == 0.0 {
        write!(f, "{v}.")
    } else {
        write!(f, "{v}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => fmt_float(*v, f),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "{c:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Closure(_) => write!(f, "<fun>"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Char(c) => serializer.serialize_char(*c),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Closure(_) => serializer.serialize_str("<fun>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toplevel_rendering() {
        assert_eq!(Value::Int(-4).to_string(), "-4");
        assert_eq!(Value::Float(3.0).to_string(), "3.");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Char('a').to_string(), "'a'");
        assert_eq!(Value::from("hi").to_string(), "\"hi\"");
        assert_eq!(Value::Float(f64::INFINITY).to_string(), "infinity");
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_string(&vec![
            Value::Int(10),
            Value::Bool(true),
            Value::Char('z'),
            Value::from("s"),
        ])
        .unwrap();
        assert_eq!(json, r#"[10,true,"z","s"]"#);
    }
}
