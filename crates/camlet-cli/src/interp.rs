//! Host-facing interpreter.
//!
//! Runs programs one top-level statement at a time. Each statement is
//! monitored, evaluated against the global frame, and recorded; a failing
//! statement is reported and the next one still runs.

use camlet_ast::ast::{ContractDecl, Program, Stmt};
use camlet_ast::span::Span;
use camlet_parse::{parse_recovering, ParseError};
use camlet_types::Type;
use serde::{Serialize, Serializer};

use crate::builtins::{self, Builtin, RegistrationError};
use crate::contract::Contract;
use crate::env::Env;
use crate::error::{Error, RuntimeError};
use crate::eval::eval_expr;
use crate::monitor::ContractMonitor;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Run the contract monitor before evaluation.
    pub contracts: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { contracts: true }
    }
}

fn serialize_type<S: Serializer>(ty: &Type, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(ty)
}

/// Result of a whole run, in the shape hosts consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Finished {
        value: Value,
        #[serde(rename = "type", serialize_with = "serialize_type")]
        ty: Type,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Errored,
    /// No statement produced a value.
    Empty,
}

/// What one top-level statement did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StatementResult {
    /// Global `let`.
    Bound {
        name: String,
        value: Value,
        #[serde(rename = "type", serialize_with = "serialize_type")]
        ty: Type,
    },
    /// Expression statement.
    Evaluated {
        value: Value,
        #[serde(rename = "type", serialize_with = "serialize_type")]
        ty: Type,
    },
    /// Contract declaration.
    Contract { name: String, contract: String },
    Failed { error: Error },
}

pub struct Interpreter {
    options: Options,
    global: Env,
    monitor: ContractMonitor,
    errors: Vec<Error>,
    results: Vec<StatementResult>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        let global = Env::new();
        builtins::install(&global);
        Self {
            options,
            global,
            monitor: ContractMonitor::new(),
            errors: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn global(&self) -> &Env {
        &self.global
    }

    /// Add a native function to the global frame.
    pub fn register_native(&mut self, builtin: Builtin) -> Result<(), RegistrationError> {
        builtins::register(&self.global, builtin)
    }

    /// Errors recorded by the last run, in source order.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Per-statement results of the last run, in source order.
    pub fn statement_results(&self) -> &[StatementResult] {
        &self.results
    }

    /// Parse and run `source`. Bindings and contract declarations persist
    /// across calls; errors and results are reset.
    pub fn run(&mut self, source: &str) -> Outcome {
        let (program, syntax_errors) = parse_recovering(source);
        self.run_with_syntax_errors(&program, syntax_errors)
    }

    pub fn run_program(&mut self, program: &Program) -> Outcome {
        self.run_with_syntax_errors(program, Vec::new())
    }

    fn run_with_syntax_errors(&mut self, program: &Program, syntax: Vec<ParseError>) -> Outcome {
        self.errors.clear();
        self.results.clear();

        // Interleave syntax errors with statements so results follow the source.
        let mut syntax = syntax.into_iter().peekable();
        for stmt in &program.body {
            while let Some(err) = syntax.next_if(|e| e.span.start < stmt.span().start) {
                self.record(Err(err.into()));
            }
            let result = self.execute(stmt).map_err(Error::from);
            self.record(result);
        }
        for err in syntax {
            self.record(Err(err.into()));
        }

        self.outcome()
    }

    fn record(&mut self, result: Result<StatementResult, Error>) {
        match result {
            Ok(r) => self.results.push(r),
            Err(error) => {
                tracing::debug!(error = %error, "statement failed");
                self.errors.push(error.clone());
                self.results.push(StatementResult::Failed { error });
            }
        }
    }

    fn outcome(&self) -> Outcome {
        if !self.errors.is_empty() {
            return Outcome::Errored;
        }
        self.results
            .iter()
            .rev()
            .find_map(|r| match r {
                StatementResult::Bound { name, value, ty } => Some(Outcome::Finished {
                    value: value.clone(),
                    ty: ty.clone(),
                    name: Some(name.clone()),
                }),
                StatementResult::Evaluated { value, ty } => Some(Outcome::Finished {
                    value: value.clone(),
                    ty: ty.clone(),
                    name: None,
                }),
                _ => None,
            })
            .unwrap_or(Outcome::Empty)
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<StatementResult, RuntimeError> {
        let stmt = match stmt {
            Stmt::Contract(decl) => return self.declare_contract(stmt, decl),
            _ if self.options.contracts => self.monitor.monitor_stmt(stmt),
            _ => stmt.clone(),
        };
        tracing::trace!(span = ?stmt.span(), "executing statement");

        match &stmt {
            Stmt::Expr { expr, .. } => {
                let value = eval_expr(&self.global, expr)?;
                Ok(StatementResult::Evaluated {
                    ty: value.ty(),
                    value,
                })
            }
            Stmt::Let(decl) => {
                let value = eval_expr(&self.global, &decl.value)?;
                let ty = value.ty();
                self.global.define(decl.name.text.clone(), value.clone());
                tracing::debug!(name = %decl.name.text, %ty, "bound global");
                Ok(StatementResult::Bound {
                    name: decl.name.text.clone(),
                    value,
                    ty,
                })
            }
            Stmt::Contract(decl) => Ok(contract_result(decl)),
        }
    }

    fn declare_contract(
        &mut self,
        stmt: &Stmt,
        decl: &ContractDecl,
    ) -> Result<StatementResult, RuntimeError> {
        if self.options.contracts {
            // A contract that does not resolve is never declared.
            Contract::resolve(&decl.contract, &self.global)?;
            self.monitor.monitor_stmt(stmt);
        }
        Ok(contract_result(decl))
    }
}

fn contract_result(decl: &ContractDecl) -> StatementResult {
    StatementResult::Contract {
        name: decl.name.text.clone(),
        contract: decl.contract.to_string(),
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        // Global closures capture the global frame; break the cycle.
        self.global.clear();
    }
}

/// 1-based line and column of a byte offset.
pub fn line_col(source: &str, span: Span) -> (usize, usize) {
    let offset = (span.start as usize).min(source.len());
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let col = before
        .rsplit('\n')
        .next()
        .map_or(0, |l| l.chars().count())
        + 1;
    (line, col)
}
