use crate::token::{Tok, TokKind};
use camlet_ast::span::Span;

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek2(&self) -> Option<char> {
        let mut it = self.src[self.pos..].chars();
        it.next();
        it.next()
    }

    fn span(&self, start: usize) -> Span {
        Span {
            start: start as u32,
            end: self.pos as u32,
        }
    }

    fn tok(&self, kind: TokKind, start: usize) -> Tok {
        Tok {
            kind,
            span: self.span(start),
        }
    }

    /// Skips whitespace and `(* ... *)` comments, which nest.
    /// Returns an error token for an unterminated comment.
    fn skip_ws_and_comments(&mut self) -> Option<Tok> {
        loop {
            while matches!(self.peek(), Some(c) if c.is_whitespace()) {
                self.bump();
            }
            if self.peek() == Some('(') && self.peek2() == Some('*') {
                let start = self.pos;
                self.bump();
                self.bump();
                let mut depth = 1usize;
                while depth > 0 {
                    match self.bump() {
                        None => {
                            return Some(
                                self.tok(TokKind::Error("unterminated comment".into()), start),
                            )
                        }
                        Some('(') if self.peek() == Some('*') => {
                            self.bump();
                            depth += 1;
                        }
                        Some('*') if self.peek() == Some(')') => {
                            self.bump();
                            depth -= 1;
                        }
                        Some(_) => {}
                    }
                }
                continue;
            }
            return None;
        }
    }

    fn escape(&mut self) -> Option<char> {
        let esc = self.bump()?;
        Some(match esc {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            other => other,
        })
    }

    pub fn next_tok(&mut self) -> Tok {
        if let Some(err) = self.skip_ws_and_comments() {
            return err;
        }
        let start = self.pos;
        let Some(c) = self.bump() else {
            return self.tok(TokKind::Eof, start);
        };

        // 2-char operators first
        let two = match (c, self.peek()) {
            (';', Some(';')) => Some(TokKind::SemiSemi),
            ('-', Some('>')) => Some(TokKind::Arrow),
            ('-', Some('.')) => Some(TokKind::MinusDot),
            ('+', Some('.')) => Some(TokKind::PlusDot),
            ('*', Some('.')) => Some(TokKind::StarDot),
            ('*', Some('*')) => Some(TokKind::StarStar),
            ('/', Some('.')) => Some(TokKind::SlashDot),
            ('<', Some('>')) => Some(TokKind::LtGt),
            ('<', Some('=')) => Some(TokKind::Le),
            ('>', Some('=')) => Some(TokKind::Ge),
            ('=', Some('=')) => Some(TokKind::EqEq),
            ('!', Some('=')) => Some(TokKind::BangEq),
            ('&', Some('&')) => Some(TokKind::AndAnd),
            ('|', Some('|')) => Some(TokKind::OrOr),
            _ => None,
        };
        if let Some(kind) = two {
            self.bump();
            return self.tok(kind, start);
        }

        // 1-char punctuation/operators
        let single = match c {
            '(' => Some(TokKind::LParen),
            ')' => Some(TokKind::RParen),
            ';' => Some(TokKind::Semi),
            '+' => Some(TokKind::Plus),
            '-' => Some(TokKind::Minus),
            '*' => Some(TokKind::Star),
            '/' => Some(TokKind::Slash),
            '^' => Some(TokKind::Caret),
            '=' => Some(TokKind::Eq),
            '<' => Some(TokKind::Lt),
            '>' => Some(TokKind::Gt),
            _ => None,
        };
        if let Some(k) = single {
            return self.tok(k, start);
        }

        // string
        if c == '"' {
            let mut s = String::new();
            loop {
                match self.bump() {
                    None => {
                        return self.tok(TokKind::Error("unterminated string literal".into()), start)
                    }
                    Some('"') => break,
                    Some('\\') => match self.escape() {
                        Some(real) => s.push(real),
                        None => {
                            return self
                                .tok(TokKind::Error("unterminated string literal".into()), start)
                        }
                    },
                    Some(ch) => s.push(ch),
                }
            }
            return self.tok(TokKind::Str(s), start);
        }

        // char
        if c == '\'' {
            let ch = match self.bump() {
                Some('\\') => self.escape(),
                other => other,
            };
            return match (ch, self.bump()) {
                (Some(ch), Some('\'')) => self.tok(TokKind::Char(ch), start),
                _ => self.tok(TokKind::Error("malformed character literal".into()), start),
            };
        }

        // number (int/float); `1.` is a float as in OCaml
        if c.is_ascii_digit() {
            let mut s = String::from(c);
            let mut dot = false;
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() || ch == '_' {
                    if ch != '_' {
                        s.push(ch);
                    }
                    self.bump();
                } else if ch == '.' && !dot {
                    dot = true;
                    s.push('.');
                    self.bump();
                } else {
                    break;
                }
            }
            let kind = if dot {
                match s.parse() {
                    Ok(v) => TokKind::Float(v),
                    Err(_) => TokKind::Error(format!("invalid float literal `{s}`")),
                }
            } else {
                match s.parse() {
                    Ok(v) => TokKind::Int(v),
                    Err(_) => TokKind::Error(format!("integer literal `{s}` exceeds the range of int")),
                }
            };
            return self.tok(kind, start);
        }

        // ident / keywords
        if c.is_ascii_alphabetic() || c == '_' {
            let mut s = String::from(c);
            while let Some(ch) = self.peek() {
                if ch.is_ascii_alphanumeric() || ch == '_' || ch == '\'' {
                    s.push(ch);
                    self.bump();
                } else {
                    break;
                }
            }
            let kind = match s.as_str() {
                "let" => TokKind::KwLet,
                "in" => TokKind::KwIn,
                "fun" => TokKind::KwFun,
                "if" => TokKind::KwIf,
                "then" => TokKind::KwThen,
                "else" => TokKind::KwElse,
                "contract" => TokKind::KwContract,
                "true" => TokKind::KwTrue,
                "false" => TokKind::KwFalse,
                "not" => TokKind::KwNot,
                "mod" => TokKind::KwMod,
                _ => TokKind::Ident(s),
            };
            return self.tok(kind, start);
        }

        self.tok(TokKind::Error(format!("unexpected character `{c}`")), start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokKind> {
        let mut lex = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let t = lex.next_tok();
            if t.kind == TokKind::Eof {
                break;
            }
            out.push(t.kind);
        }
        out
    }

    #[test]
    fn float_operators_are_single_tokens() {
        assert_eq!(
            kinds("1. +. 2.5 *. x ** y"),
            vec![
                TokKind::Float(1.0),
                TokKind::PlusDot,
                TokKind::Float(2.5),
                TokKind::StarDot,
                TokKind::Ident("x".into()),
                TokKind::StarStar,
                TokKind::Ident("y".into()),
            ]
        );
    }

    #[test]
    fn nested_comments_are_skipped() {
        assert_eq!(
            kinds("(* outer (* inner *) still *) 42;;"),
            vec![TokKind::Int(42), TokKind::SemiSemi]
        );
    }

    #[test]
    fn unterminated_comment_is_an_error_token() {
        assert!(matches!(kinds("(* open").as_slice(), [TokKind::Error(_)]));
    }

    #[test]
    fn char_literals_and_escapes() {
        assert_eq!(
            kinds(r"'a' '\n' 'x"),
            vec![
                TokKind::Char('a'),
                TokKind::Char('\n'),
                TokKind::Error("malformed character literal".into()),
            ]
        );
    }

    #[test]
    fn utf8_strings_keep_their_characters() {
        assert_eq!(kinds("\"héllo\""), vec![TokKind::Str("héllo".into())]);
    }
}
