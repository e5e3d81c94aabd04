//! Contract monitor: attaches contracts and blame labels to the tree.
//!
//! A single depth-first pass in source order. Contract declarations are
//! recorded as they are met, so a contract only reaches occurrences that
//! follow its declaration. Each identifier with a visible contract is
//! wrapped in [`Expr::Monitored`] carrying `pos` (the contracted name) and
//! `neg` (the global binding whose right-hand side contains it). The
//! input tree is never modified; a new one is built.

use camlet_ast::ast::{Blame, ContractExpr, Expr, LetDecl, Program, Stmt};

use crate::scope::ContractScopeStack;
use crate::stack::ensure_sufficient_stack;

#[derive(Debug, Default)]
pub struct ContractMonitor {
    stack: ContractScopeStack,
}

impl ContractMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stack(&self) -> &ContractScopeStack {
        &self.stack
    }

    pub fn monitor_program(&mut self, program: &Program) -> Program {
        Program {
            body: program.body.iter().map(|s| self.monitor_stmt(s)).collect(),
            span: program.span,
        }
    }

    pub fn monitor_stmt(&mut self, stmt: &Stmt) -> Stmt {
        match stmt {
            Stmt::Contract(decl) => {
                tracing::debug!(name = %decl.name.text, contract = %decl.contract, "contract declared");
                self.stack.declare(decl.name.text.clone(), decl.contract.clone());
                stmt.clone()
            }
            Stmt::Expr { expr, span } => Stmt::Expr {
                expr: monitor_expr(&mut self.stack, expr),
                span: *span,
            },
            Stmt::Let(decl) => Stmt::Let(monitor_global_let(&mut self.stack, decl)),
        }
    }
}

/// Monitor a whole program with a fresh contract scope stack.
pub fn monitor_program(program: &Program) -> Program {
    ContractMonitor::new().monitor_program(program)
}

fn monitor_global_let(stack: &mut ContractScopeStack, decl: &LetDecl) -> LetDecl {
    let name = &decl.name.text;
    // The binding itself is checked against its own contract, if any.
    let own = stack.lookup(name).cloned();
    let consumer = stack.current_scope_name().map(str::to_owned);
    let value = stack.with_scope(name.as_str(), |s| monitor_expr(s, &decl.value));
    let value = match own {
        Some(contract) => propagate_contract(contract, name.clone(), consumer, value),
        None => value,
    };
    LetDecl {
        name: decl.name.clone(),
        value,
        span: decl.span,
    }
}

/// Wrap `expr` so that its value is checked against `contract`.
pub fn propagate_contract(
    contract: ContractExpr,
    pos: impl Into<String>,
    neg: Option<String>,
    expr: Expr,
) -> Expr {
    Expr::Monitored {
        expr: Box::new(expr),
        blame: Box::new(Blame {
            contract,
            pos: pos.into(),
            neg,
        }),
    }
}

fn monitor_boxed(stack: &mut ContractScopeStack, expr: &Expr) -> Box<Expr> {
    Box::new(monitor_expr(stack, expr))
}

pub fn monitor_expr(stack: &mut ContractScopeStack, expr: &Expr) -> Expr {
    ensure_sufficient_stack(|| monitor_node(stack, expr))
}

fn monitor_node(stack: &mut ContractScopeStack, expr: &Expr) -> Expr {
    match expr {
        Expr::Lit(..) => expr.clone(),
        Expr::Var(id) => match stack.lookup(&id.text) {
            Some(contract) => {
                let neg = stack.current_scope_name().map(str::to_owned);
                tracing::debug!(
                    name = %id.text,
                    neg = neg.as_deref().unwrap_or("-"),
                    "attaching contract"
                );
                propagate_contract(contract.clone(), id.text.clone(), neg, expr.clone())
            }
            None => expr.clone(),
        },
        Expr::Unary { op, expr: inner, span } => Expr::Unary {
            op: *op,
            expr: monitor_boxed(stack, inner),
            span: *span,
        },
        Expr::Binary { lhs, op, rhs, span } => {
            let lhs = monitor_boxed(stack, lhs);
            let rhs = monitor_boxed(stack, rhs);
            Expr::Binary {
                lhs,
                op: *op,
                rhs,
                span: *span,
            }
        }
        Expr::Logical { lhs, op, rhs, span } => {
            let lhs = monitor_boxed(stack, lhs);
            let rhs = monitor_boxed(stack, rhs);
            Expr::Logical {
                lhs,
                op: *op,
                rhs,
                span: *span,
            }
        }
        Expr::If {
            cond,
            then_,
            else_,
            span,
        } => {
            let cond = monitor_boxed(stack, cond);
            let then_ = monitor_boxed(stack, then_);
            let else_ = monitor_boxed(stack, else_);
            Expr::If {
                cond,
                then_,
                else_,
                span: *span,
            }
        }
        Expr::Lambda { params, body, span } => Expr::Lambda {
            params: params.clone(),
            body: monitor_boxed(stack, body),
            span: *span,
        },
        Expr::Call { callee, args, span } => {
            let callee = monitor_boxed(stack, callee);
            let args = args.iter().map(|a| monitor_expr(stack, a)).collect();
            Expr::Call {
                callee,
                args,
                span: *span,
            }
        }
        // Only the bound expression is visited; the body is left as is.
        Expr::Let {
            name,
            value,
            body,
            span,
        } => Expr::Let {
            name: name.clone(),
            value: monitor_boxed(stack, value),
            body: body.clone(),
            span: *span,
        },
        Expr::Seq { exprs, span } => Expr::Seq {
            exprs: exprs.iter().map(|e| monitor_expr(stack, e)).collect(),
            span: *span,
        },
        Expr::Monitored { .. } => expr.clone(),
    }
}
