//! Declaration-level Go front end.
//!
//! Only what the generators need is modelled: the package clause, imports,
//! type declarations (with struct bodies and type parameters) and constant
//! groups. Function bodies and variable declarations are skipped by
//! balanced-delimiter scanning.

pub mod consteval;
pub mod constraint;
pub mod lexer;
pub mod parser;

use serde::Serialize;
use thiserror::Error;

pub use consteval::Expr;
pub use constraint::BuildContext;
pub use parser::parse_file;

/// Lexing or parsing failure at a source line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

/// Byte range into the file source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// One parsed `.go` file.
#[derive(Debug, Clone, Default)]
pub struct File {
    pub package: String,
    pub imports: Vec<ImportSpec>,
    pub types: Vec<TypeDecl>,
    pub consts: Vec<ConstSpec>,
}

/// `import name "path"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Alias, `_` or `.`; `None` for a plain import
    pub name: Option<String>,
    pub path: String,
}

impl ImportSpec {
    /// The import as written in an import block: `json "encoding/json"`.
    pub fn to_go(&self) -> String {
        match &self.name {
            Some(name) => format!("{name} \"{}\"", self.path),
            None => format!("\"{}\"", self.path),
        }
    }
}

/// `type Name[Params] Type` or `type Name = Type`.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub alias: bool,
    pub ty: TypeExpr,
    pub doc: Option<String>,
    pub line: usize,
}

/// One group of a type parameter list: `K, V comparable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub names: Vec<String>,
    pub constraint: String,
}

#[derive(Debug, Clone)]
pub enum TypeExpr {
    Struct(Vec<Field>),
    /// Any other type, as normalized source text
    Other(String),
}

/// A struct field line: `A, B int \`tag\` // comment`.
#[derive(Debug, Clone)]
pub struct Field {
    /// Declared names; for embedded fields the type's base name
    pub names: Vec<String>,
    pub embedded: bool,
    pub ty: String,
    pub ty_span: Span,
    pub tag: Option<RawTag>,
    pub doc: Option<String>,
    pub line_comment: Option<String>,
    pub line: usize,
}

/// A struct tag literal and where it sits in the source.
#[derive(Debug, Clone)]
pub struct RawTag {
    /// Unquoted content
    pub value: String,
    pub span: Span,
}

/// One constant name with its (repeated) type and expression.
#[derive(Debug, Clone)]
pub struct ConstSpec {
    pub name: String,
    pub ty: Option<String>,
    pub value: Option<Expr>,
    pub iota: i128,
    pub line_comment: Option<String>,
    pub line: usize,
}

/// Strip comment markers from a comment token.
pub fn comment_text(raw: &str) -> String {
    if let Some(line) = raw.strip_prefix("//") {
        return line.strip_prefix(' ').unwrap_or(line).trim_end().to_string();
    }
    let body = raw
        .strip_prefix("/*")
        .and_then(|r| r.strip_suffix("*/"))
        .unwrap_or(raw);
    body.lines()
        .map(|l| l.trim())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
