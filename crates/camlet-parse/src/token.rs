use camlet_ast::span::Span;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokKind {
    // trivia / eof / error
    Eof,
    /// Lexical error (bad character, unterminated literal, overflow)
    Error(String),
    // punctuation
    LParen,
    RParen,
    Semi,
    SemiSemi, // ;; terminates a top-level statement
    Arrow,    // -> in lambdas and contracts
    // comparison / equality
    Eq,
    LtGt,
    EqEq,
    BangEq,
    Lt,
    Le,
    Gt,
    Ge,
    // arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    PlusDot,
    MinusDot,
    StarDot,
    SlashDot,
    StarStar,
    // strings
    Caret,
    // logical
    AndAnd,
    OrOr,
    // idents / keywords
    Ident(String),
    KwLet,
    KwIn,
    KwFun,
    KwIf,
    KwThen,
    KwElse,
    KwContract,
    KwTrue,
    KwFalse,
    KwNot,
    KwMod,
    // literals
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
}

impl TokKind {
    /// True for tokens that can begin an application argument.
    pub fn starts_atom(&self) -> bool {
        matches!(
            self,
            TokKind::Int(_)
                | TokKind::Float(_)
                | TokKind::Char(_)
                | TokKind::Str(_)
                | TokKind::KwTrue
                | TokKind::KwFalse
                | TokKind::Ident(_)
                | TokKind::LParen
        )
    }
}

impl fmt::Display for TokKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokKind::Eof => return write!(f, "end of input"),
            TokKind::Error(msg) => return write!(f, "{msg}"),
            TokKind::Ident(s) => return write!(f, "identifier `{s}`"),
            TokKind::Int(v) => return write!(f, "`{v}`"),
            TokKind::Float(v) => return write!(f, "`{v}`"),
            TokKind::Char(c) => return write!(f, "`{c:?}`"),
            TokKind::Str(s) => return write!(f, "`{s:?}`"),
            TokKind::LParen => "(",
            TokKind::RParen => ")",
            TokKind::Semi => ";",
            TokKind::SemiSemi => ";;",
            TokKind::Arrow => "->",
            TokKind::Eq => "=",
            TokKind::LtGt => "<>",
            TokKind::EqEq => "==",
            TokKind::BangEq => "!=",
            TokKind::Lt => "<",
            TokKind::Le => "<=",
            TokKind::Gt => ">",
            TokKind::Ge => ">=",
            TokKind::Plus => "+",
            TokKind::Minus => "-",
            TokKind::Star => "*",
            TokKind::Slash => "/",
            TokKind::PlusDot => "+.",
            TokKind::MinusDot => "-.",
            TokKind::StarDot => "*.",
            TokKind::SlashDot => "/.",
            TokKind::StarStar => "**",
            TokKind::Caret => "^",
            TokKind::AndAnd => "&&",
            TokKind::OrOr => "||",
            TokKind::KwLet => "let",
            TokKind::KwIn => "in",
            TokKind::KwFun => "fun",
            TokKind::KwIf => "if",
            TokKind::KwThen => "then",
            TokKind::KwElse => "else",
            TokKind::KwContract => "contract",
            TokKind::KwTrue => "true",
            TokKind::KwFalse => "false",
            TokKind::KwNot => "not",
            TokKind::KwMod => "mod",
        };
        write!(f, "`{text}`")
    }
}

#[derive(Debug, Clone)]
pub struct Tok {
    pub kind: TokKind,
    pub span: Span,
}
