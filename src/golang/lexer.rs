//! Go tokenizer with automatic semicolon insertion.
//!
//! Comments are kept as tokens so the parser can attach doc and line
//! comments. Every token borrows its text from the source and records its
//! byte span, which in-place tag rewriting relies on.

use super::SyntaxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Int,
    Float,
    Imag,
    Char,
    String,
    RawString,
    Comment,
    Op,
    /// Explicit `;` or one inserted at a newline / end of file
    Semi,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
    /// 1-based line of the first byte
    pub line: usize,
}

impl<'a> Token<'a> {
    /// Line of the last byte; differs from `line` for block comments and raw
    /// strings.
    pub fn end_line(&self) -> usize {
        self.line + self.text.matches('\n').count()
    }

    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Op && self.text == op
    }

    pub fn is_ident(&self, name: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == name
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Int
                | TokenKind::Float
                | TokenKind::Imag
                | TokenKind::Char
                | TokenKind::String
                | TokenKind::RawString
        )
    }
}

const OPERATORS: [&str; 47] = [
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "&^", "+", "-", "*", "/", "%", "&", "|",
    "^", "<", ">", "=", "!", "(", ")", "[", "]", "{", "}", ",", ".", ":", "~",
];

/// Tokenize a whole Go source file.
pub fn tokenize(src: &str) -> Result<Vec<Token<'_>>, SyntaxError> {
    Lexer::new(src).run()
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    tokens: Vec<Token<'a>>,
    /// A newline here must become a semicolon
    pending_semi: bool,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            tokens: Vec::new(),
            pending_semi: false,
        }
    }

    fn run(mut self) -> Result<Vec<Token<'a>>, SyntaxError> {
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            match b {
                b'\n' => {
                    self.insert_semi(self.pos, "\n");
                    self.pos += 1;
                    self.line += 1;
                }
                b' ' | b'\t' | b'\r' => self.pos += 1,
                b'/' if self.peek(1) == Some(b'/') => self.line_comment(),
                b'/' if self.peek(1) == Some(b'*') => self.block_comment()?,
                b'"' => self.interpreted_string()?,
                b'`' => self.raw_string()?,
                b'\'' => self.rune()?,
                b'0'..=b'9' => self.number(),
                b'.' if self.peek(1).is_some_and(|c| c.is_ascii_digit()) => self.number(),
                b';' => {
                    self.push(TokenKind::Semi, self.pos, self.pos + 1);
                    self.pending_semi = false;
                }
                _ if b == b'_' || b.is_ascii_alphabetic() || b >= 0x80 => self.ident()?,
                _ => self.operator()?,
            }
        }
        let end = self.bytes.len();
        self.insert_semi(end, "");
        self.tokens.push(Token {
            kind: TokenKind::Eof,
            text: "",
            start: end,
            end,
            line: self.line,
        });
        Ok(self.tokens)
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            line: self.line,
            message: message.into(),
        }
    }

    /// Record a token for `start..end` and advance past it.
    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        let text = &self.src[start..end];
        self.tokens.push(Token {
            kind,
            text,
            start,
            end,
            line: self.line,
        });
        self.line += text.matches('\n').count();
        self.pos = end;
    }

    fn insert_semi(&mut self, at: usize, text: &'a str) {
        if self.pending_semi {
            self.tokens.push(Token {
                kind: TokenKind::Semi,
                text,
                start: at,
                end: at,
                line: self.line,
            });
            self.pending_semi = false;
        }
    }

    fn line_comment(&mut self) {
        let start = self.pos;
        let end = self.src[start..]
            .find('\n')
            .map_or(self.bytes.len(), |idx| start + idx);
        self.push(TokenKind::Comment, start, end);
    }

    fn block_comment(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        let close = self.src[start + 2..]
            .find("*/")
            .ok_or_else(|| self.error("comment not terminated"))?;
        let end = start + 2 + close + 2;
        let spans_lines = self.src[start..end].contains('\n');
        self.push(TokenKind::Comment, start, end);
        // A multi-line general comment acts like a newline.
        if spans_lines {
            self.insert_semi(end, "");
        }
        Ok(())
    }

    fn interpreted_string(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        let mut i = start + 1;
        loop {
            match self.bytes.get(i) {
                None | Some(b'\n') => return Err(self.error("string literal not terminated")),
                Some(b'\\') => i += 2,
                Some(b'"') => break,
                Some(_) => i += 1,
            }
        }
        self.push(TokenKind::String, start, i + 1);
        self.pending_semi = true;
        Ok(())
    }

    fn raw_string(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        let close = self.src[start + 1..]
            .find('`')
            .ok_or_else(|| self.error("raw string literal not terminated"))?;
        self.push(TokenKind::RawString, start, start + 1 + close + 1);
        self.pending_semi = true;
        Ok(())
    }

    fn rune(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        let mut i = start + 1;
        loop {
            match self.bytes.get(i) {
                None | Some(b'\n') => return Err(self.error("rune literal not terminated")),
                Some(b'\\') => i += 2,
                Some(b'\'') => break,
                Some(_) => i += 1,
            }
        }
        if i == start + 1 {
            return Err(self.error("empty rune literal"));
        }
        self.push(TokenKind::Char, start, i + 1);
        self.pending_semi = true;
        Ok(())
    }

    fn number(&mut self) {
        let start = self.pos;
        let rest = &self.src[start..];
        let is_hex = rest.starts_with("0x") || rest.starts_with("0X");
        let exponent: &[u8] = if is_hex { b"pP" } else { b"eE" };
        let mut i = start;
        while let Some(&c) = self.bytes.get(i) {
            let sign_after_exponent = (c == b'+' || c == b'-')
                && i > start
                && exponent.contains(&self.bytes[i - 1]);
            if c.is_ascii_alphanumeric() || c == b'_' || c == b'.' || sign_after_exponent {
                i += 1;
            } else {
                break;
            }
        }
        let text = &self.src[start..i];
        let kind = if text.ends_with('i') {
            TokenKind::Imag
        } else if text.contains('.')
            || (!is_hex && text.contains(['e', 'E']))
            || (is_hex && text.contains(['p', 'P']))
        {
            TokenKind::Float
        } else {
            TokenKind::Int
        };
        self.push(kind, start, i);
        self.pending_semi = true;
    }

    fn ident(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        let end = self.src[start..]
            .char_indices()
            .find(|&(_, c)| !(c == '_' || c.is_alphanumeric()))
            .map_or(self.bytes.len(), |(idx, _)| start + idx);
        if end == start {
            return Err(self.error(format!(
                "invalid character {:?}",
                self.src[start..].chars().next().unwrap_or_default()
            )));
        }
        let text = &self.src[start..end];
        self.push(TokenKind::Ident, start, end);
        self.pending_semi = !is_keyword(text)
            || matches!(text, "break" | "continue" | "fallthrough" | "return");
        Ok(())
    }

    fn operator(&mut self) -> Result<(), SyntaxError> {
        let rest = &self.src[self.pos..];
        let op = OPERATORS
            .iter()
            .find(|op| rest.starts_with(**op))
            .ok_or_else(|| {
                self.error(format!(
                    "invalid character {:?}",
                    rest.chars().next().unwrap_or_default()
                ))
            })?;
        let start = self.pos;
        self.push(TokenKind::Op, start, start + op.len());
        self.pending_semi = matches!(*op, ")" | "]" | "}" | "++" | "--");
        Ok(())
    }
}

pub fn is_keyword(text: &str) -> bool {
    matches!(
        text,
        "break"
            | "case"
            | "chan"
            | "const"
            | "continue"
            | "default"
            | "defer"
            | "else"
            | "fallthrough"
            | "for"
            | "func"
            | "go"
            | "goto"
            | "if"
            | "import"
            | "interface"
            | "map"
            | "package"
            | "range"
            | "return"
            | "select"
            | "struct"
            | "switch"
            | "type"
            | "var"
    )
}
