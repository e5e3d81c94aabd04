//! Core `Type` descriptors for Camlet.
//!
//! Types are attached to values, never inferred: every runtime value knows
//! its own `Type`, and native closures declare a signature that the
//! runtime checks arguments against.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimType {
    Int,
    Float,
    Bool,
    Char,
    Str,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Primitive types.
    Prim(PrimType),

    /// Unconstrained type variable (`'a`, `'b`, ...).
    Var(u32),

    /// Function type: `params -> ret`
    Fun { params: Vec<Type>, ret: Box<Type> },
}

impl Type {
    pub fn fun(params: Vec<Type>, ret: Type) -> Self {
        Type::Fun {
            params,
            ret: Box::new(ret),
        }
    }

    pub fn int() -> Self {
        Type::Prim(PrimType::Int)
    }
    pub fn float() -> Self {
        Type::Prim(PrimType::Float)
    }
    pub fn bool() -> Self {
        Type::Prim(PrimType::Bool)
    }
    pub fn char() -> Self {
        Type::Prim(PrimType::Char)
    }
    pub fn str_() -> Self {
        Type::Prim(PrimType::Str)
    }

    /// Fully polymorphic signature for a closure of `arity` parameters.
    pub fn poly_fun(arity: usize) -> Self {
        let params = (0..arity as u32).map(Type::Var).collect();
        Type::fun(params, Type::Var(arity as u32))
    }

    /// Number of parameters, if this is a function type.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Type::Fun { params, .. } => Some(params.len()),
            _ => None,
        }
    }

    /// Whether a value of type `actual` may be passed where `self` is expected.
    ///
    /// Type variables accept anything; function types match on arity only,
    /// since closure parameter types are not tracked.
    pub fn accepts(&self, actual: &Type) -> bool {
        match (self, actual) {
            (Type::Var(_), _) => true,
            (Type::Prim(a), Type::Prim(b)) => a == b,
            (Type::Fun { params: a, .. }, Type::Fun { params: b, .. }) => a.len() == b.len(),
            _ => false,
        }
    }
}

impl fmt::Display for PrimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrimType::Int => "int",
            PrimType::Float => "float",
            PrimType::Bool => "bool",
            PrimType::Char => "char",
            PrimType::Str => "string",
        })
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Prim(p) => write!(f, "{p}"),
            Type::Var(id) => {
                let letter = char::from(b'a' + (id % 26) as u8);
                if *id < 26 {
                    write!(f, "'{letter}")
                } else {
                    write!(f, "'{letter}{}", id / 26)
                }
            }
            Type::Fun { params, ret } => {
                for p in params {
                    match p {
                        Type::Fun { .. } => write!(f, "({p}) -> ")?,
                        _ => write!(f, "{p} -> ")?,
                    }
                }
                write!(f, "{ret}")
            }
        }
    }
}
