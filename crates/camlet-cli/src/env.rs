//! Lexical environments.
//!
//! An [`Env`] is a shared handle on one frame of a parent-linked chain.
//! A child frame keeps its parent alive; closures keep their defining
//! frame alive. Frames are freed once nothing refers to them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use camlet_ast::span::Span;

use crate::error::RuntimeError;
use crate::value::Value;

#[derive(Clone)]
pub struct Env(Rc<Frame>);

struct Frame {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Env>,
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl Env {
    /// Create an empty global frame.
    pub fn new() -> Self {
        Env(Rc::new(Frame {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        }))
    }

    /// Child frame for a lambda application or a local `let`.
    pub fn extend(&self) -> Env {
        Env(Rc::new(Frame {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(self.clone()),
        }))
    }

    /// Insert or overwrite `name` in this frame.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Innermost binding of `name`, if any.
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut frame = Some(self);
        while let Some(env) = frame {
            if let Some(v) = env.0.bindings.borrow().get(name) {
                return Some(v.clone());
            }
            frame = env.0.parent.as_ref();
        }
        None
    }

    pub fn lookup(&self, name: &str, span: Span) -> Result<Value, RuntimeError> {
        self.get(name)
            .ok_or_else(|| RuntimeError::unbound(name, span))
    }

    /// The outermost (global) frame of this chain.
    pub fn root(&self) -> Env {
        let mut env = self;
        while let Some(parent) = env.0.parent.as_ref() {
            env = parent;
        }
        env.clone()
    }

    pub fn is_global(&self) -> bool {
        self.0.parent.is_none()
    }

    /// Number of frames between this one and the global frame.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut env = self;
        while let Some(parent) = env.0.parent.as_ref() {
            depth += 1;
            env = parent;
        }
        depth
    }

    /// Names bound directly in this frame, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.0.bindings.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Drop every binding of this frame. Global closures capture the global
    /// frame, so the interpreter clears it on shutdown to release them.
    pub(crate) fn clear(&self) {
        self.0.bindings.borrow_mut().clear();
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("names", &self.names())
            .field("depth", &self.depth())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_frames_shadow_outer_ones() {
        let global = Env::new();
        global.define("x", Value::Int(1));
        let inner = global.extend();
        inner.define("x", Value::Int(2));

        assert_eq!(inner.get("x"), Some(Value::Int(2)));
        assert_eq!(global.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn redefining_overwrites_in_place() {
        let global = Env::new();
        global.define("x", Value::Int(10));
        global.define("x", Value::Int(20));
        assert_eq!(global.get("x"), Some(Value::Int(20)));
        assert_eq!(global.names(), vec!["x".to_string()]);
    }

    #[test]
    fn child_bindings_do_not_leak_outward() {
        let global = Env::new();
        let child = global.extend();
        child.define("a", Value::Int(1));

        let err = global.lookup("a", Span::new(0, 1)).unwrap_err();
        assert_eq!(err.to_string(), "Unbound value a");
    }

    #[test]
    fn later_global_definitions_are_visible_to_children() {
        let global = Env::new();
        let child = global.extend();
        global.define("late", Value::Bool(true));
        assert_eq!(child.get("late"), Some(Value::Bool(true)));
    }

    #[test]
    fn root_and_depth() {
        let global = Env::new();
        let grandchild = global.extend().extend();
        assert_eq!(grandchild.depth(), 2);
        assert!(grandchild.root().is_global());
        assert!(!grandchild.is_global());
    }
}
