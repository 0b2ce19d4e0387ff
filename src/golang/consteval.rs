//! Integer constant expressions: enough of Go's constant arithmetic to
//! evaluate enum declarations (`iota`, shifts, masks, conversions).

use std::collections::HashMap;

use super::lexer::{Token, TokenKind};

/// Parsed constant expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Int(i128),
    Ident(String),
    Unary(char, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    /// `T(x)`; the callee is kept so typed enum values can be recognized
    Conversion(String, Box<Expr>),
    /// Anything outside the supported subset, kept as source text
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    And,
    Or,
    Xor,
    AndNot,
}

impl BinOp {
    fn from_token(text: &str) -> Option<(BinOp, u8)> {
        let op = match text {
            "*" => (BinOp::Mul, 5),
            "/" => (BinOp::Div, 5),
            "%" => (BinOp::Rem, 5),
            "<<" => (BinOp::Shl, 5),
            ">>" => (BinOp::Shr, 5),
            "&" => (BinOp::And, 5),
            "&^" => (BinOp::AndNot, 5),
            "+" => (BinOp::Add, 4),
            "-" => (BinOp::Sub, 4),
            "|" => (BinOp::Or, 4),
            "^" => (BinOp::Xor, 4),
            _ => return None,
        };
        Some(op)
    }
}

impl Expr {
    /// Parse a token run; anything unsupported becomes [`Expr::Unsupported`].
    pub fn parse(tokens: &[Token<'_>]) -> Expr {
        let significant: Vec<Token<'_>> = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .copied()
            .collect();
        let mut parser = ExprParser {
            tokens: &significant,
            pos: 0,
        };
        match parser.binary(1) {
            Some(expr) if parser.pos == significant.len() => expr,
            _ => Expr::Unsupported(
                significant
                    .iter()
                    .map(|t| t.text)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        }
    }

    /// Type given to the expression by a conversion, e.g. `Color` in
    /// `Color(iota)` or `Color(1) << iota`.
    pub fn conversion_type(&self) -> Option<&str> {
        match self {
            Expr::Conversion(ty, _) => Some(ty),
            Expr::Unary(_, inner) => inner.conversion_type(),
            Expr::Binary(_, lhs, rhs) => lhs.conversion_type().or_else(|| rhs.conversion_type()),
            _ => None,
        }
    }

    /// Evaluate with `iota` bound and earlier constants visible in `env`.
    pub fn eval(&self, iota: i128, env: &HashMap<String, i128>) -> Result<i128, String> {
        match self {
            Expr::Int(v) => Ok(*v),
            Expr::Ident(name) if name == "iota" => Ok(iota),
            Expr::Ident(name) => env
                .get(name)
                .copied()
                .ok_or_else(|| format!("undefined or non-integer constant {name}")),
            Expr::Unary(op, inner) => {
                let v = inner.eval(iota, env)?;
                match op {
                    '-' => v.checked_neg().ok_or_else(overflow),
                    '^' => Ok(!v),
                    _ => Ok(v),
                }
            }
            Expr::Binary(op, lhs, rhs) => {
                let a = lhs.eval(iota, env)?;
                let b = rhs.eval(iota, env)?;
                apply(*op, a, b)
            }
            Expr::Conversion(_, inner) => inner.eval(iota, env),
            Expr::Unsupported(text) => Err(format!("unsupported constant expression {text:?}")),
        }
    }
}

fn overflow() -> String {
    "constant overflow".to_string()
}

fn apply(op: BinOp, a: i128, b: i128) -> Result<i128, String> {
    let shift = |b: i128| u32::try_from(b).ok().filter(|s| *s < 127);
    match op {
        BinOp::Add => a.checked_add(b).ok_or_else(overflow),
        BinOp::Sub => a.checked_sub(b).ok_or_else(overflow),
        BinOp::Mul => a.checked_mul(b).ok_or_else(overflow),
        BinOp::Div if b == 0 => Err("division by zero".to_string()),
        BinOp::Rem if b == 0 => Err("division by zero".to_string()),
        BinOp::Div => Ok(a / b),
        BinOp::Rem => Ok(a % b),
        BinOp::Shl => {
            let s = shift(b).ok_or_else(|| format!("invalid shift count {b}"))?;
            a.checked_mul(1i128 << s).ok_or_else(overflow)
        }
        BinOp::Shr => {
            let s = shift(b).ok_or_else(|| format!("invalid shift count {b}"))?;
            Ok(a >> s)
        }
        BinOp::And => Ok(a & b),
        BinOp::Or => Ok(a | b),
        BinOp::Xor => Ok(a ^ b),
        BinOp::AndNot => Ok(a & !b),
    }
}

struct ExprParser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
}

impl<'t, 'a> ExprParser<'t, 'a> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn binary(&mut self, min_prec: u8) -> Option<Expr> {
        let mut lhs = self.unary()?;
        while let Some((op, prec)) = self
            .peek()
            .filter(|t| t.kind == TokenKind::Op)
            .and_then(|t| BinOp::from_token(t.text))
        {
            if prec < min_prec {
                break;
            }
            self.pos += 1;
            let rhs = self.binary(prec + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Some(lhs)
    }

    fn unary(&mut self) -> Option<Expr> {
        let tok = *self.peek()?;
        if tok.kind == TokenKind::Op && matches!(tok.text, "-" | "+" | "^") {
            self.pos += 1;
            let op = tok.text.chars().next()?;
            return Some(Expr::Unary(op, Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Option<Expr> {
        let tok = *self.peek()?;
        self.pos += 1;
        match tok.kind {
            TokenKind::Int => parse_int(tok.text).map(Expr::Int),
            TokenKind::Char => parse_rune(tok.text).map(Expr::Int),
            TokenKind::Op if tok.text == "(" => {
                let inner = self.binary(1)?;
                self.expect(")")?;
                Some(inner)
            }
            TokenKind::Ident => {
                let mut name = tok.text.to_string();
                if self.peek().is_some_and(|t| t.is_op(".")) {
                    self.pos += 1;
                    let sel = self.peek().filter(|t| t.kind == TokenKind::Ident)?;
                    name = format!("{name}.{}", sel.text);
                    self.pos += 1;
                }
                if self.peek().is_some_and(|t| t.is_op("(")) {
                    self.pos += 1;
                    let arg = self.binary(1)?;
                    self.expect(")")?;
                    return Some(Expr::Conversion(name, Box::new(arg)));
                }
                Some(Expr::Ident(name))
            }
            _ => None,
        }
    }

    fn expect(&mut self, op: &str) -> Option<()> {
        if self.peek()?.is_op(op) {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }
}

/// Go integer literal in any base, with `_` separators.
pub fn parse_int(text: &str) -> Option<i128> {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };
    i128::from_str_radix(body, radix).ok()
}

fn parse_rune(text: &str) -> Option<i128> {
    let body = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let decoded = if body == "\"" {
        "\"".to_string()
    } else {
        crate::structtag::unquote(&format!("\"{body}\""))?
    };
    let mut chars = decoded.chars();
    let ch = chars.next()?;
    chars.next().is_none().then_some(ch as i128)
}
