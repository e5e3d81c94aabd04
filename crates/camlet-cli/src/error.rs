//! Error types surfaced by the interpreter.
//!
//! Every failure is recovered at top-level-statement granularity: the
//! statement that raised it is reported as failed and the next statement
//! runs against the environment built so far.

use camlet_ast::span::Span;
use camlet_parse::ParseError;
use camlet_types::Type;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

/// Name reported for the consumer side of a contract used at top level.
pub const TOP_LEVEL: &str = "top-level";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Unbound value {name}")]
    UnboundName { name: String, span: Option<Span> },

    #[error("This function expects {expected} argument(s) but is applied to {found}")]
    Arity {
        expected: usize,
        found: usize,
        span: Option<Span>,
    },

    #[error("Contract violated by {party}")]
    ContractViolation {
        /// Blamed party: the exporting binding or the consuming scope.
        party: String,
        /// Source rendering of the violated contract.
        contract: String,
        /// Toplevel rendering of the offending value.
        value: String,
        span: Option<Span>,
    },

    #[error("This expression has type {found} but an expression was expected of type {expected}")]
    TypeMismatch {
        expected: Type,
        found: Type,
        span: Option<Span>,
    },

    #[error("Division_by_zero")]
    DivisionByZero { span: Option<Span> },

    #[error("This expression has type {ty}; it is not a function and cannot be applied")]
    NotCallable { ty: Type, span: Option<Span> },

    #[error("compare: functional value")]
    FunctionalComparison { span: Option<Span> },

    #[error("maximum call depth exceeded (limit: {limit} calls)")]
    CallDepthExceeded { limit: u32, span: Option<Span> },
}

impl RuntimeError {
    pub fn unbound(name: impl Into<String>, span: Span) -> Self {
        RuntimeError::UnboundName {
            name: name.into(),
            span: Some(span),
        }
    }

    pub fn mismatch(expected: Type, found: Type, span: Span) -> Self {
        RuntimeError::TypeMismatch {
            expected,
            found,
            span: Some(span),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            RuntimeError::UnboundName { span, .. }
            | RuntimeError::Arity { span, .. }
            | RuntimeError::ContractViolation { span, .. }
            | RuntimeError::TypeMismatch { span, .. }
            | RuntimeError::DivisionByZero { span }
            | RuntimeError::NotCallable { span, .. }
            | RuntimeError::FunctionalComparison { span }
            | RuntimeError::CallDepthExceeded { span, .. } => *span,
        }
    }

    /// Attach `at` unless the error already knows where it happened.
    pub fn or_span(mut self, at: Span) -> Self {
        match &mut self {
            RuntimeError::UnboundName { span, .. }
            | RuntimeError::Arity { span, .. }
            | RuntimeError::ContractViolation { span, .. }
            | RuntimeError::TypeMismatch { span, .. }
            | RuntimeError::DivisionByZero { span }
            | RuntimeError::NotCallable { span, .. }
            | RuntimeError::FunctionalComparison { span }
            | RuntimeError::CallDepthExceeded { span, .. } => {
                if span.is_none() {
                    *span = Some(at);
                }
            }
        }
        self
    }

    fn kind(&self) -> &'static str {
        match self {
            RuntimeError::UnboundName { .. } => "unbound_name",
            RuntimeError::Arity { .. } => "arity",
            RuntimeError::ContractViolation { .. } => "contract_violation",
            RuntimeError::TypeMismatch { .. } => "type_mismatch",
            RuntimeError::DivisionByZero { .. } => "division_by_zero",
            RuntimeError::NotCallable { .. } => "not_callable",
            RuntimeError::FunctionalComparison { .. } => "functional_comparison",
            RuntimeError::CallDepthExceeded { .. } => "call_depth_exceeded",
        }
    }
}

/// Any error recorded against a top-level statement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Syntax error: {0}")]
    Syntax(#[from] ParseError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    /// Human-readable message without location information.
    pub fn explain(&self) -> String {
        self.to_string()
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Error::Syntax(e) => Some(e.span),
            Error::Runtime(e) => e.span(),
        }
    }
}

impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = match self {
            Error::Syntax(_) => "syntax",
            Error::Runtime(e) => e.kind(),
        };
        let mut st = serializer.serialize_struct("Error", 3)?;
        st.serialize_field("kind", kind)?;
        st.serialize_field("message", &self.explain())?;
        st.serialize_field("span", &self.span())?;
        st.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explain_matches_toplevel_messages() {
        let err = Error::from(RuntimeError::unbound("x", Span::new(0, 1)));
        assert_eq!(err.explain(), "Unbound value x");

        let err = Error::from(RuntimeError::ContractViolation {
            party: "h".into(),
            contract: "positive".into(),
            value: "-1".into(),
            span: None,
        });
        assert_eq!(err.explain(), "Contract violated by h");

        let err = Error::from(RuntimeError::mismatch(
            Type::int(),
            Type::float(),
            Span::default(),
        ));
        assert_eq!(
            err.explain(),
            "This expression has type float but an expression was expected of type int"
        );
    }

    #[test]
    fn or_span_keeps_the_innermost_location() {
        let inner = RuntimeError::unbound("y", Span::new(4, 5));
        assert_eq!(inner.or_span(Span::new(0, 9)).span(), Some(Span::new(4, 5)));

        let bare = RuntimeError::DivisionByZero { span: None };
        assert_eq!(bare.or_span(Span::new(2, 7)).span(), Some(Span::new(2, 7)));
    }

    #[test]
    fn syntax_errors_carry_the_parser_span() {
        let err = Error::from(ParseError::new("expected `;;`", Span::new(3, 4)));
        assert_eq!(err.span(), Some(Span::new(3, 4)));
        assert_eq!(err.explain(), "Syntax error: expected `;;`");
    }
}
