use crate::lexer::Lexer;
use crate::token::{Tok, TokKind};
use crate::ParseError;
use camlet_ast::ast::{
    BinOp, ContractDecl, ContractExpr, Expr, Ident, LetDecl, Lit, LogicalOp, Program, Stmt, UnOp,
};
use camlet_ast::span::Span;

type Result<T> = std::result::Result<T, ParseError>;

macro_rules! bail {
    ($span:expr, $($arg:tt)*) => {
        return Err(ParseError::new(format!($($arg)*), $span))
    };
}

/// Parse a whole program, stopping at the first syntax error.
pub fn parse_str(_file: &str, src: &str) -> Result<Program> {
    let mut p = Parser::new(src);
    let (program, errors) = p.parse_program(false);
    match errors.into_iter().next() {
        Some(err) => Err(err),
        None => Ok(program),
    }
}

/// Parse a whole program, skipping malformed statements.
///
/// Each malformed statement contributes one error and is dropped from the
/// returned program; parsing resumes after the next `;;`.
pub fn parse_recovering(src: &str) -> (Program, Vec<ParseError>) {
    let mut p = Parser::new(src);
    p.parse_program(true)
}

enum Op {
    Bin(BinOp),
    Logic(LogicalOp),
}

struct Parser<'a> {
    lex: Lexer<'a>,
    cur: Tok,
    /// End offset of the most recently consumed token.
    prev_end: u32,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        let mut lex = Lexer::new(src);
        let cur = lex.next_tok();
        Self {
            lex,
            cur,
            prev_end: 0,
        }
    }

    fn bump(&mut self) {
        self.prev_end = self.cur.span.end;
        self.cur = self.lex.next_tok();
    }

    fn at(&self, k: &TokKind) -> bool {
        std::mem::discriminant(&self.cur.kind) == std::mem::discriminant(k)
    }

    fn expect(&mut self, k: TokKind) -> Result<Tok> {
        if self.at(&k) {
            let t = self.cur.clone();
            self.bump();
            Ok(t)
        } else {
            self.unexpected(&format!("expected {k}"))
        }
    }

    fn unexpected<T>(&self, what: &str) -> Result<T> {
        if let TokKind::Error(msg) = &self.cur.kind {
            bail!(self.cur.span, "{msg}");
        }
        bail!(self.cur.span, "{what}, found {}", self.cur.kind)
    }

    fn span_from(&self, start: u32) -> Span {
        Span {
            start,
            end: self.prev_end,
        }
    }

    // ======= program / statements =======

    fn parse_program(&mut self, recover: bool) -> (Program, Vec<ParseError>) {
        let start = self.cur.span.start;
        let mut body = Vec::new();
        let mut errors = Vec::new();
        while !matches!(self.cur.kind, TokKind::Eof) {
            match self.parse_stmt() {
                Ok(stmt) => body.push(stmt),
                Err(err) => {
                    errors.push(err);
                    if !recover {
                        break;
                    }
                    self.synchronize();
                }
            }
        }
        let program = Program {
            body,
            span: Span {
                start,
                end: self.cur.span.end,
            },
        };
        (program, errors)
    }

    /// Skip to just past the next `;;` (or to end of input).
    fn synchronize(&mut self) {
        loop {
            match self.cur.kind {
                TokKind::Eof => return,
                TokKind::SemiSemi => {
                    self.bump();
                    return;
                }
                _ => self.bump(),
            }
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        let start = self.cur.span.start;
        let stmt = match self.cur.kind {
            TokKind::KwContract => self.parse_contract_decl()?,
            TokKind::KwLet => {
                let (name, value) = self.parse_let_head()?;
                if matches!(self.cur.kind, TokKind::KwIn) {
                    let expr = self.parse_let_body(start, name, value)?;
                    Stmt::Expr {
                        expr,
                        span: Span::default(),
                    }
                } else {
                    Stmt::Let(LetDecl {
                        name,
                        value,
                        span: Span::default(),
                    })
                }
            }
            _ => {
                let expr = self.parse_seq()?;
                Stmt::Expr {
                    expr,
                    span: Span::default(),
                }
            }
        };
        // the final statement may omit its terminator
        if !matches!(self.cur.kind, TokKind::Eof) {
            self.expect(TokKind::SemiSemi)?;
        }
        let span = self.span_from(start);
        Ok(match stmt {
            Stmt::Expr { expr, .. } => Stmt::Expr { expr, span },
            Stmt::Let(decl) => Stmt::Let(LetDecl { span, ..decl }),
            Stmt::Contract(decl) => Stmt::Contract(ContractDecl { span, ..decl }),
        })
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        match &self.cur.kind {
            TokKind::Ident(s) => {
                let id = Ident {
                    text: s.clone(),
                    span: self.cur.span,
                };
                self.bump();
                Ok(id)
            }
            _ => self.unexpected("expected identifier"),
        }
    }

    /// `contract name = c1 -> c2 -> r`
    fn parse_contract_decl(&mut self) -> Result<Stmt> {
        let start = self.cur.span.start;
        self.expect(TokKind::KwContract)?;
        let name = self.parse_ident()?;
        self.expect(TokKind::Eq)?;
        let contract = self.parse_contract()?;
        Ok(Stmt::Contract(ContractDecl {
            name,
            contract,
            span: self.span_from(start),
        }))
    }

    fn parse_contract(&mut self) -> Result<ContractExpr> {
        let start = self.cur.span.start;
        let mut terms = vec![self.parse_contract_term()?];
        while matches!(self.cur.kind, TokKind::Arrow) {
            self.bump();
            terms.push(self.parse_contract_term()?);
        }
        let Some(range) = terms.pop() else {
            bail!(self.cur.span, "expected contract");
        };
        if terms.is_empty() {
            return Ok(range);
        }
        Ok(ContractExpr::Arrow {
            domain: terms,
            range: Box::new(range),
            span: self.span_from(start),
        })
    }

    fn parse_contract_term(&mut self) -> Result<ContractExpr> {
        if matches!(self.cur.kind, TokKind::LParen) {
            self.bump();
            let inner = self.parse_contract()?;
            self.expect(TokKind::RParen)?;
            return Ok(inner);
        }
        Ok(ContractExpr::Flat(self.parse_expr_bp(0)?))
    }

    /// `let name p1 p2 = value`; parameters desugar to a lambda.
    fn parse_let_head(&mut self) -> Result<(Ident, Expr)> {
        self.expect(TokKind::KwLet)?;
        let name = self.parse_ident()?;
        let mut params = Vec::new();
        while matches!(self.cur.kind, TokKind::Ident(_)) {
            params.push(self.parse_ident()?);
        }
        self.expect(TokKind::Eq)?;
        let value_start = self.cur.span.start;
        let value = self.parse_seq()?;
        if params.is_empty() {
            return Ok((name, value));
        }
        let span = Span {
            start: params[0].span.start.min(value_start),
            end: self.prev_end,
        };
        Ok((
            name,
            Expr::Lambda {
                params,
                body: Box::new(value),
                span,
            },
        ))
    }

    fn parse_let_body(&mut self, start: u32, name: Ident, value: Expr) -> Result<Expr> {
        self.expect(TokKind::KwIn)?;
        let body = self.parse_seq()?;
        Ok(Expr::Let {
            name,
            value: Box::new(value),
            body: Box::new(body),
            span: self.span_from(start),
        })
    }

    // ======= expressions =======

    /// `e1; e2; ...`; a single expression when there is no `;`.
    fn parse_seq(&mut self) -> Result<Expr> {
        let start = self.cur.span.start;
        let first = self.parse_expr_bp(0)?;
        if !matches!(self.cur.kind, TokKind::Semi) {
            return Ok(first);
        }
        let mut exprs = vec![first];
        while matches!(self.cur.kind, TokKind::Semi) {
            self.bump();
            exprs.push(self.parse_expr_bp(0)?);
        }
        Ok(Expr::Seq {
            exprs,
            span: self.span_from(start),
        })
    }

    // Precedence (low -> high):
    //   1:  ||            (right)
    //   3:  &&            (right)
    //   5:  = <> == != < <= > >=
    //   7:  ^             (right)
    //   10: + - +. -.
    //   20: * / mod *. /.
    //   30: **            (right)
    // prefix `-` and `not` take their operand at 40; application binds tightest.

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let (op, lbp, rbp) = match self.cur.kind {
                TokKind::OrOr => (Op::Logic(LogicalOp::Or), 1, 1),
                TokKind::AndAnd => (Op::Logic(LogicalOp::And), 3, 3),
                TokKind::Eq => (Op::Bin(BinOp::Eq), 5, 6),
                TokKind::LtGt => (Op::Bin(BinOp::Ne), 5, 6),
                TokKind::EqEq => (Op::Bin(BinOp::PhysEq), 5, 6),
                TokKind::BangEq => (Op::Bin(BinOp::PhysNe), 5, 6),
                TokKind::Lt => (Op::Bin(BinOp::Lt), 5, 6),
                TokKind::Le => (Op::Bin(BinOp::Le), 5, 6),
                TokKind::Gt => (Op::Bin(BinOp::Gt), 5, 6),
                TokKind::Ge => (Op::Bin(BinOp::Ge), 5, 6),
                TokKind::Caret => (Op::Bin(BinOp::Concat), 7, 7),
                TokKind::Plus => (Op::Bin(BinOp::Add), 10, 11),
                TokKind::Minus => (Op::Bin(BinOp::Sub), 10, 11),
                TokKind::PlusDot => (Op::Bin(BinOp::FAdd), 10, 11),
                TokKind::MinusDot => (Op::Bin(BinOp::FSub), 10, 11),
                TokKind::Star => (Op::Bin(BinOp::Mul), 20, 21),
                TokKind::Slash => (Op::Bin(BinOp::Div), 20, 21),
                TokKind::KwMod => (Op::Bin(BinOp::Mod), 20, 21),
                TokKind::StarDot => (Op::Bin(BinOp::FMul), 20, 21),
                TokKind::SlashDot => (Op::Bin(BinOp::FDiv), 20, 21),
                TokKind::StarStar => (Op::Bin(BinOp::Pow), 30, 30),
                _ => break,
            };

            if lbp < min_bp {
                break;
            }
            self.bump(); // consume operator
            let rhs = self.parse_expr_bp(rbp)?;
            let span = lhs.span().to(rhs.span());
            lhs = match op {
                Op::Bin(op) => Expr::Binary {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                    span,
                },
                Op::Logic(op) => Expr::Logical {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                    span,
                },
            };
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr> {
        let start = self.cur.span.start;
        match self.cur.kind {
            TokKind::Minus | TokKind::KwNot => {
                let op = if matches!(self.cur.kind, TokKind::Minus) {
                    UnOp::Neg
                } else {
                    UnOp::Not
                };
                self.bump();
                let inner = self.parse_expr_bp(40)?;
                Ok(Expr::Unary {
                    op,
                    expr: Box::new(inner),
                    span: self.span_from(start),
                })
            }
            TokKind::KwLet => {
                let (name, value) = self.parse_let_head()?;
                self.parse_let_body(start, name, value)
            }
            TokKind::KwFun => self.parse_lambda(),
            TokKind::KwIf => self.parse_if(),
            _ => self.parse_application(),
        }
    }

    /// `fun x y -> body`
    fn parse_lambda(&mut self) -> Result<Expr> {
        let start = self.cur.span.start;
        self.expect(TokKind::KwFun)?;
        let mut params = vec![self.parse_ident()?];
        while matches!(self.cur.kind, TokKind::Ident(_)) {
            params.push(self.parse_ident()?);
        }
        self.expect(TokKind::Arrow)?;
        let body = self.parse_seq()?;
        Ok(Expr::Lambda {
            params,
            body: Box::new(body),
            span: self.span_from(start),
        })
    }

    fn parse_if(&mut self) -> Result<Expr> {
        let start = self.cur.span.start;
        self.expect(TokKind::KwIf)?;
        let cond = self.parse_expr_bp(0)?;
        self.expect(TokKind::KwThen)?;
        let then_ = self.parse_expr_bp(0)?;
        self.expect(TokKind::KwElse)?;
        let else_ = self.parse_expr_bp(0)?;
        Ok(Expr::If {
            cond: Box::new(cond),
            then_: Box::new(then_),
            else_: Box::new(else_),
            span: self.span_from(start),
        })
    }

    /// `f a b c`: juxtaposition collects every argument into one call.
    fn parse_application(&mut self) -> Result<Expr> {
        let callee = self.parse_atom()?;
        let mut args = Vec::new();
        while self.cur.kind.starts_atom() {
            args.push(self.parse_atom()?);
        }
        if args.is_empty() {
            return Ok(callee);
        }
        let span = Span {
            start: callee.span().start,
            end: self.prev_end,
        };
        Ok(Expr::Call {
            callee: Box::new(callee),
            args,
            span,
        })
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        let tok_kind = self.cur.kind.clone();
        let tok_span = self.cur.span;

        let lit = match tok_kind {
            TokKind::Int(v) => Lit::Int(v),
            TokKind::Float(v) => Lit::Float(v),
            TokKind::Char(c) => Lit::Char(c),
            TokKind::Str(s) => Lit::Str(s),
            TokKind::KwTrue => Lit::Bool(true),
            TokKind::KwFalse => Lit::Bool(false),
            TokKind::Ident(_) => return Ok(Expr::Var(self.parse_ident()?)),
            TokKind::LParen => {
                self.bump(); // '('
                let inner = self.parse_seq()?;
                self.expect(TokKind::RParen)?;
                return Ok(inner);
            }
            _ => return self.unexpected("expected expression"),
        };
        self.bump();
        Ok(Expr::Lit(lit, tok_span))
    }
}
