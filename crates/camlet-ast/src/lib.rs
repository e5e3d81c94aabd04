pub mod span {
    use serde::Serialize;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
    pub struct Span {
        pub start: u32,
        pub end: u32,
    }

    impl Span {
        pub fn new(start: u32, end: u32) -> Self {
            Self { start, end }
        }

        /// Smallest span covering both `self` and `other`.
        pub fn to(self, other: Span) -> Span {
            Span {
                start: self.start.min(other.start),
                end: self.end.max(other.end),
            }
        }
    }
}

pub mod ast {
    use super::span::Span;
    use serde::Serialize;
    use std::fmt;

    #[derive(Debug, Clone, Serialize)]
    pub struct Program {
        pub body: Vec<Stmt>,
        pub span: Span,
    }

    /// Top-level statement, terminated by `;;` in source.
    #[derive(Debug, Clone, Serialize)]
    pub enum Stmt {
        Expr { expr: Expr, span: Span },
        Contract(ContractDecl),
        Let(LetDecl),
    }

    impl Stmt {
        pub fn span(&self) -> Span {
            match self {
                Stmt::Expr { span, .. } => *span,
                Stmt::Contract(decl) => decl.span,
                Stmt::Let(decl) => decl.span,
            }
        }
    }

    /// `contract f = positive -> positive;;`
    #[derive(Debug, Clone, Serialize)]
    pub struct ContractDecl {
        pub name: Ident,
        pub contract: ContractExpr,
        pub span: Span,
    }

    /// Global `let name = value;;`
    #[derive(Debug, Clone, Serialize)]
    pub struct LetDecl {
        pub name: Ident,
        pub value: Expr,
        pub span: Span,
    }

    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct Ident {
        pub text: String,
        pub span: Span,
    }

    #[derive(Debug, Clone, Serialize)]
    pub enum ContractExpr {
        /// Predicate expression; must evaluate to a one-argument closure returning bool.
        Flat(Expr),
        /// `d1 -> d2 -> r`
        Arrow {
            domain: Vec<ContractExpr>,
            range: Box<ContractExpr>,
            span: Span,
        },
    }

    impl ContractExpr {
        pub fn span(&self) -> Span {
            match self {
                ContractExpr::Flat(e) => e.span(),
                ContractExpr::Arrow { span, .. } => *span,
            }
        }
    }

    /// Annotation attached by the contract monitor.
    #[derive(Debug, Clone, Serialize)]
    pub struct Blame {
        pub contract: ContractExpr,
        /// Binding that exports the contract.
        pub pos: String,
        /// Scope consuming the value; `None` at top level.
        pub neg: Option<String>,
    }

    #[derive(Debug, Clone, Serialize)]
    pub enum Expr {
        Lit(Lit, Span),
        Var(Ident),
        Unary {
            op: UnOp,
            expr: Box<Expr>,
            span: Span,
        },
        Binary {
            lhs: Box<Expr>,
            op: BinOp,
            rhs: Box<Expr>,
            span: Span,
        },
        Logical {
            lhs: Box<Expr>,
            op: LogicalOp,
            rhs: Box<Expr>,
            span: Span,
        },
        If {
            cond: Box<Expr>,
            then_: Box<Expr>,
            else_: Box<Expr>,
            span: Span,
        },
        Lambda {
            params: Vec<Ident>,
            body: Box<Expr>,
            span: Span,
        },
        Call {
            callee: Box<Expr>,
            args: Vec<Expr>,
            span: Span,
        },
        /// Local `let name = value in body`
        Let {
            name: Ident,
            value: Box<Expr>,
            body: Box<Expr>,
            span: Span,
        },
        Seq {
            exprs: Vec<Expr>,
            span: Span,
        },
        /// Never produced by the parser; only the monitor pass wraps nodes.
        Monitored { expr: Box<Expr>, blame: Box<Blame> },
    }

    impl Expr {
        pub fn span(&self) -> Span {
            match self {
                Expr::Lit(_, span) => *span,
                Expr::Var(id) => id.span,
                Expr::Unary { span, .. }
                | Expr::Binary { span, .. }
                | Expr::Logical { span, .. }
                | Expr::If { span, .. }
                | Expr::Lambda { span, .. }
                | Expr::Call { span, .. }
                | Expr::Let { span, .. }
                | Expr::Seq { span, .. } => *span,
                Expr::Monitored { expr, .. } => expr.span(),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub enum Lit {
        Int(i64),
        Float(f64),
        Bool(bool),
        Char(char),
        Str(String),
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub enum UnOp {
        Neg,
        Not,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub enum BinOp {
        // int arithmetic
        Add,
        Sub,
        Mul,
        Div,
        Mod,
        // float arithmetic
        FAdd,
        FSub,
        FMul,
        FDiv,
        Pow,
        // comparison
        Lt,
        Le,
        Gt,
        Ge,
        // structural / physical equality
        Eq,
        Ne,
        PhysEq,
        PhysNe,
        // strings
        Concat,
    }

    impl BinOp {
        pub fn symbol(self) -> &'static str {
            match self {
                BinOp::Add => "+",
                BinOp::Sub => "-",
                BinOp::Mul => "*",
                BinOp::Div => "/",
                BinOp::Mod => "mod",
                BinOp::FAdd => "+.",
                BinOp::FSub => "-.",
                BinOp::FMul => "*.",
                BinOp::FDiv => "/.",
                BinOp::Pow => "**",
                BinOp::Lt => "<",
                BinOp::Le => "<=",
                BinOp::Gt => ">",
                BinOp::Ge => ">=",
                BinOp::Eq => "=",
                BinOp::Ne => "<>",
                BinOp::PhysEq => "==",
                BinOp::PhysNe => "!=",
                BinOp::Concat => "^",
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub enum LogicalOp {
        And,
        Or,
    }

    // Compact source-like rendering, used for contract labels in diagnostics.

    impl fmt::Display for Lit {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Lit::Int(v) => write!(f, "{v}"),
                Lit::Float(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{v}."),
                Lit::Float(v) => write!(f, "{v}"),
                Lit::Bool(b) => write!(f, "{b}"),
                Lit::Char(c) => write!(f, "{c:?}"),
                Lit::Str(s) => write!(f, "{s:?}"),
            }
        }
    }

    impl fmt::Display for Expr {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Expr::Lit(lit, _) => write!(f, "{lit}"),
                Expr::Var(id) => write!(f, "{}", id.text),
                Expr::Unary { op: UnOp::Neg, expr, .. } => write!(f, "-{expr}"),
                Expr::Unary { op: UnOp::Not, expr, .. } => write!(f, "not {expr}"),
                Expr::Binary { lhs, op, rhs, .. } => {
                    write!(f, "({lhs} {} {rhs})", op.symbol())
                }
                Expr::Logical { lhs, op, rhs, .. } => {
                    let sym = match op {
                        LogicalOp::And => "&&",
                        LogicalOp::Or => "||",
                    };
                    write!(f, "({lhs} {sym} {rhs})")
                }
                Expr::If {
                    cond, then_, else_, ..
                } => write!(f, "if {cond} then {then_} else {else_}"),
                Expr::Lambda { params, body, .. } => {
                    write!(f, "(fun")?;
                    for p in params {
                        write!(f, " {}", p.text)?;
                    }
                    write!(f, " -> {body})")
                }
                Expr::Call { callee, args, .. } => {
                    write!(f, "({callee}")?;
                    for arg in args {
                        write!(f, " {arg}")?;
                    }
                    write!(f, ")")
                }
                Expr::Let {
                    name, value, body, ..
                } => write!(f, "let {} = {value} in {body}", name.text),
                Expr::Seq { exprs, .. } => {
                    write!(f, "(")?;
                    for (i, e) in exprs.iter().enumerate() {
                        if i > 0 {
                            write!(f, "; ")?;
                        }
                        write!(f, "{e}")?;
                    }
                    write!(f, ")")
                }
                Expr::Monitored { expr, .. } => write!(f, "{expr}"),
            }
        }
    }

    impl fmt::Display for ContractExpr {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                ContractExpr::Flat(e) => write!(f, "{e}"),
                ContractExpr::Arrow { domain, range, .. } => {
                    for d in domain {
                        match d {
                            ContractExpr::Arrow { .. } => write!(f, "({d}) -> ")?,
                            ContractExpr::Flat(_) => write!(f, "{d} -> ")?,
                        }
                    }
                    write!(f, "{range}")
                }
            }
        }
    }
}
