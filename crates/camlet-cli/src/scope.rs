//! Contract scope stack used by the monitor pass.
//!
//! One frame is pushed per global `let` being monitored, naming the binding
//! whose right-hand side is being visited. Declarations made outside any
//! frame land in the global table.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use camlet_ast::ast::ContractExpr;

#[derive(Debug, Clone)]
pub struct ContractScopeFrame {
    contracts: HashMap<String, ContractExpr>,
    current_scope: String,
}

#[derive(Debug, Default)]
pub struct ContractScopeStack {
    global: HashMap<String, ContractExpr>,
    frames: Vec<ContractScopeFrame>,
}

impl ContractScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, scope: impl Into<String>) {
        self.frames.push(ContractScopeFrame {
            contracts: HashMap::new(),
            current_scope: scope.into(),
        });
    }

    pub fn pop(&mut self) -> Option<ContractScopeFrame> {
        self.frames.pop()
    }

    /// Record `name`'s contract in the top frame, or globally at top level.
    pub fn declare(&mut self, name: impl Into<String>, contract: ContractExpr) {
        let table = match self.frames.last_mut() {
            Some(frame) => &mut frame.contracts,
            None => &mut self.global,
        };
        table.insert(name.into(), contract);
    }

    /// Most recent declaration for `name`, searching frames top to bottom
    /// and then the global table.
    pub fn lookup(&self, name: &str) -> Option<&ContractExpr> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.contracts.get(name))
            .or_else(|| self.global.get(name))
    }

    pub fn current_scope_name(&self) -> Option<&str> {
        self.frames.last().map(|f| f.current_scope.as_str())
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Push a frame that is popped when the returned guard drops.
    pub fn scoped(&mut self, scope: impl Into<String>) -> ScopedStack<'_> {
        self.push(scope);
        ScopedStack { stack: self }
    }

    /// Run `f` inside a frame named `scope`; the frame is popped on every
    /// exit path, including unwinding.
    pub fn with_scope<T>(
        &mut self,
        scope: impl Into<String>,
        f: impl FnOnce(&mut ContractScopeStack) -> T,
    ) -> T {
        let mut scoped = self.scoped(scope);
        f(&mut scoped)
    }
}

/// Guard returned by [`ContractScopeStack::scoped`].
pub struct ScopedStack<'a> {
    stack: &'a mut ContractScopeStack,
}

impl Drop for ScopedStack<'_> {
    fn drop(&mut self) {
        self.stack.pop();
    }
}

impl Deref for ScopedStack<'_> {
    type Target = ContractScopeStack;

    fn deref(&self) -> &Self::Target {
        self.stack
    }
}

impl DerefMut for ScopedStack<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.stack
    }
}
