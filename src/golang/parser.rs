//! Recursive-descent parser over [`lexer`](super::lexer) tokens.

use super::consteval::Expr;
use super::lexer::{self, Token, TokenKind};
use super::{
    comment_text, ConstSpec, Field, File, ImportSpec, RawTag, Span, SyntaxError, TypeDecl,
    TypeExpr, TypeParam,
};

/// Parse the declarations of one Go source file.
pub fn parse_file(src: &str) -> Result<File, SyntaxError> {
    let tokens = lexer::tokenize(src)?;
    Parser { tokens, pos: 0 }.file()
}

type PResult<T> = Result<T, SyntaxError>;

/// Where a type expression ends at nesting depth zero.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// Type declaration: `;` or the `)` closing a group
    Decl,
    /// Struct field: `;`, `}`, a tag or a comment
    Field,
    /// Constant spec: `=`, `;` or `)`
    Const,
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn tok(&self) -> Token<'a> {
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token<'a> {
        let tok = self.tok();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    /// The `n`th non-comment token from the cursor.
    fn peek(&self, n: usize) -> Token<'a> {
        self.tokens[self.pos..]
            .iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .nth(n)
            .copied()
            .unwrap_or_else(|| self.tokens[self.tokens.len() - 1])
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            line: self.tok().line,
            message: message.into(),
        }
    }

    /// Skip comments and return the doc comment attached to the next token:
    /// the last comment group, when it ends on the line just above.
    fn skip_comments(&mut self) -> Option<String> {
        let mut group: Vec<Token<'a>> = Vec::new();
        while self.tok().kind == TokenKind::Comment {
            let comment = self.advance();
            if group
                .last()
                .is_some_and(|prev| prev.end_line() + 1 < comment.line)
            {
                group.clear();
            }
            group.push(comment);
        }
        let next_line = self.tok().line;
        let last = group.last()?;
        if last.end_line() + 1 != next_line {
            return None;
        }
        let lines: Vec<String> = group.iter().map(|c| comment_text(c.text)).collect();
        Some(lines.join("\n"))
    }

    fn expect_op(&mut self, op: &str) -> PResult<Token<'a>> {
        self.skip_comments();
        if self.tok().is_op(op) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected {op:?}, found {:?}", self.tok().text)))
        }
    }

    fn expect_ident(&mut self) -> PResult<Token<'a>> {
        self.skip_comments();
        let tok = self.tok();
        if tok.kind == TokenKind::Ident && !lexer::is_keyword(tok.text) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected identifier, found {:?}", tok.text)))
        }
    }

    /// Consume a statement terminator; `)` and `}` close without one.
    fn expect_semi(&mut self) -> PResult<()> {
        self.skip_comments();
        let tok = self.tok();
        match tok.kind {
            TokenKind::Semi => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            TokenKind::Op if tok.text == ")" || tok.text == "}" => Ok(()),
            _ => Err(self.error(format!("expected ';', found {:?}", tok.text))),
        }
    }

    /// Comment on the same line as the token just consumed.
    fn line_comment(&mut self, line: usize) -> Option<String> {
        let tok = self.tok();
        if tok.kind == TokenKind::Comment && tok.line == line {
            self.advance();
            Some(comment_text(tok.text))
        } else {
            None
        }
    }

    fn file(mut self) -> PResult<File> {
        self.skip_comments();
        if !self.tok().is_ident("package") {
            return Err(self.error("expected package clause"));
        }
        self.advance();
        let package = self.expect_ident()?.text.to_string();
        self.expect_semi()?;

        let mut file = File {
            package,
            ..File::default()
        };

        loop {
            let doc = self.skip_comments();
            let tok = self.tok();
            match tok.kind {
                TokenKind::Eof => break,
                TokenKind::Semi => {
                    self.advance();
                }
                TokenKind::Ident if tok.text == "import" => {
                    self.advance();
                    self.group(doc, |p, _| {
                        let spec = p.import_spec()?;
                        file.imports.push(spec);
                        Ok(())
                    })?;
                }
                TokenKind::Ident if tok.text == "type" => {
                    self.advance();
                    self.group(doc, |p, doc| {
                        let decl = p.type_spec(doc)?;
                        file.types.push(decl);
                        Ok(())
                    })?;
                }
                TokenKind::Ident if tok.text == "const" => {
                    self.advance();
                    let mut group = ConstGroup::default();
                    self.group(doc, |p, _| p.const_spec(&mut group, &mut file.consts))?;
                }
                _ => self.skip_decl(),
            }
        }

        Ok(file)
    }

    /// Parse either one spec or a parenthesized group of specs.
    fn group(
        &mut self,
        doc: Option<String>,
        mut spec: impl FnMut(&mut Self, Option<String>) -> PResult<()>,
    ) -> PResult<()> {
        self.skip_comments();
        if !self.tok().is_op("(") {
            return spec(self, doc);
        }
        self.advance();
        loop {
            let doc = self.skip_comments();
            let tok = self.tok();
            if tok.is_op(")") {
                self.advance();
                break;
            }
            match tok.kind {
                TokenKind::Semi => {
                    self.advance();
                }
                TokenKind::Eof => return Err(self.error("unexpected end of file in group")),
                _ => spec(self, doc)?,
            }
        }
        self.expect_semi()
    }

    /// Skip a declaration we do not model, up to its terminating `;`.
    fn skip_decl(&mut self) {
        let mut depth = 0usize;
        loop {
            let tok = self.advance();
            match tok.kind {
                TokenKind::Eof => return,
                TokenKind::Semi if depth == 0 => return,
                TokenKind::Op if matches!(tok.text, "(" | "[" | "{") => depth += 1,
                TokenKind::Op if matches!(tok.text, ")" | "]" | "}") => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
        }
    }

    fn import_spec(&mut self) -> PResult<ImportSpec> {
        self.skip_comments();
        let tok = self.tok();
        let name = if tok.kind == TokenKind::Ident || tok.is_op(".") {
            self.advance();
            Some(tok.text.to_string())
        } else {
            None
        };
        self.skip_comments();
        let path_tok = self.tok();
        let path = string_value(&path_tok)
            .ok_or_else(|| self.error(format!("expected import path, found {:?}", path_tok.text)))?;
        self.advance();
        self.line_comment(path_tok.line);
        self.expect_semi()?;
        Ok(ImportSpec { name, path })
    }

    fn type_spec(&mut self, doc: Option<String>) -> PResult<TypeDecl> {
        let name_tok = self.expect_ident()?;
        self.skip_comments();

        let type_params = if self.tok().is_op("[") && self.looks_like_type_params() {
            self.type_params()?
        } else {
            Vec::new()
        };

        self.skip_comments();
        let alias = self.tok().is_op("=");
        if alias {
            self.advance();
        }

        self.skip_comments();
        let ty = if self.tok().is_ident("struct") && self.peek(1).is_op("{") {
            self.advance();
            TypeExpr::Struct(self.struct_body()?)
        } else {
            let (text, _, _) = self.type_text(Stop::Decl)?;
            TypeExpr::Other(text)
        };
        let end_line = self.tokens[self.pos.saturating_sub(1)].line;
        self.line_comment(end_line);
        self.expect_semi()?;

        Ok(TypeDecl {
            name: name_tok.text.to_string(),
            type_params,
            alias,
            ty,
            doc,
            line: name_tok.line,
        })
    }

    /// `[T any]` versus an array length such as `[4]` or `[N]`.
    fn looks_like_type_params(&self) -> bool {
        let first = self.peek(1);
        let second = self.peek(2);
        first.kind == TokenKind::Ident
            && (second.kind == TokenKind::Ident || second.is_op(",") || second.is_op("~"))
    }

    fn type_params(&mut self) -> PResult<Vec<TypeParam>> {
        self.expect_op("[")?;
        let mut groups = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        loop {
            self.skip_comments();
            if self.tok().is_op("]") {
                self.advance();
                break;
            }
            let name = self.expect_ident()?.text.to_string();
            pending.push(name);
            self.skip_comments();
            if self.tok().is_op(",") {
                self.advance();
                continue;
            }
            let constraint = self.constraint_text()?;
            groups.push(TypeParam {
                names: std::mem::take(&mut pending),
                constraint,
            });
            self.skip_comments();
            if self.tok().is_op(",") {
                self.advance();
            }
        }
        if !pending.is_empty() {
            return Err(self.error("type parameter without constraint"));
        }
        Ok(groups)
    }

    /// Constraint text up to the `,` or `]` ending it.
    fn constraint_text(&mut self) -> PResult<String> {
        let mut depth = 0usize;
        let mut taken = Vec::new();
        loop {
            let tok = self.tok();
            match tok.kind {
                TokenKind::Eof => return Err(self.error("unterminated type parameter list")),
                TokenKind::Comment => {
                    self.advance();
                    continue;
                }
                TokenKind::Op if depth == 0 && (tok.text == "," || tok.text == "]") => break,
                TokenKind::Op if matches!(tok.text, "(" | "[" | "{") => depth += 1,
                TokenKind::Op if matches!(tok.text, ")" | "]" | "}") => {
                    if depth == 0 {
                        let message = format!("unexpected {} in type parameter list", tok.text);
                        return Err(self.error(message));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            taken.push(self.advance());
        }
        if taken.is_empty() {
            return Err(self.error("missing type constraint"));
        }
        Ok(render_tokens(&taken))
    }

    fn struct_body(&mut self) -> PResult<Vec<Field>> {
        self.expect_op("{")?;
        let mut fields = Vec::new();
        loop {
            let doc = self.skip_comments();
            let tok = self.tok();
            if tok.is_op("}") {
                self.advance();
                break;
            }
            match tok.kind {
                TokenKind::Semi => {
                    self.advance();
                }
                TokenKind::Eof => return Err(self.error("unterminated struct")),
                _ => fields.push(self.field(doc)?),
            }
        }
        Ok(fields)
    }

    fn field(&mut self, doc: Option<String>) -> PResult<Field> {
        let first = self.tok();
        let line = first.line;
        let embedded = self.is_embedded_field()?;

        let mut names = Vec::new();
        if !embedded {
            names.push(self.expect_ident()?.text.to_string());
            while self.peek(0).is_op(",") {
                self.expect_op(",")?;
                names.push(self.expect_ident()?.text.to_string());
            }
        }

        let (ty, ty_span, mut last_line) = self.type_text(Stop::Field)?;
        if embedded {
            names.push(embedded_name(&ty).to_string());
        }

        let tag_tok = self.tok();
        let tag = match string_value(&tag_tok) {
            Some(value) => {
                self.advance();
                last_line = tag_tok.end_line();
                Some(RawTag {
                    value,
                    span: Span {
                        start: tag_tok.start,
                        end: tag_tok.end,
                    },
                })
            }
            None => None,
        };

        let line_comment = self.line_comment(last_line);
        self.expect_semi()?;

        Ok(Field {
            names,
            embedded,
            ty,
            ty_span,
            tag,
            doc,
            line_comment,
            line,
        })
    }

    fn is_embedded_field(&self) -> PResult<bool> {
        let first = self.peek(0);
        if first.is_op("*") {
            return Ok(true);
        }
        if first.kind != TokenKind::Ident {
            return Err(self.error(format!("unexpected {:?} in struct", first.text)));
        }
        let second = self.peek(1);
        if second.is_op(".") {
            return Ok(true);
        }
        if second.is_op("[") {
            // `T[int]` is embedded, `A [4]int` and `A []int` are named.
            let mut depth = 0usize;
            let mut n = 1;
            loop {
                let tok = self.peek(n);
                match tok.kind {
                    TokenKind::Eof => return Err(self.error("unterminated '['")),
                    TokenKind::Op if tok.text == "[" => depth += 1,
                    TokenKind::Op if tok.text == "]" => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                n += 1;
            }
            return Ok(ends_field(&self.tokens_after_sig(n + 1)));
        }
        Ok(ends_field(&second))
    }

    /// The `n`th token from the cursor counting comments only when they end
    /// the field.
    fn tokens_after_sig(&self, n: usize) -> Token<'a> {
        let mut seen = 0;
        for tok in &self.tokens[self.pos..] {
            if tok.kind == TokenKind::Comment {
                if seen == n {
                    return *tok;
                }
                continue;
            }
            if seen == n {
                return *tok;
            }
            seen += 1;
        }
        self.tokens[self.tokens.len() - 1]
    }

    /// Collect a type expression; returns its rendered text, span and the
    /// line of its last token.
    fn type_text(&mut self, stop: Stop) -> PResult<(String, Span, usize)> {
        self.skip_comments();
        let mut depth = 0usize;
        let mut taken: Vec<Token<'a>> = Vec::new();
        loop {
            let tok = self.tok();
            if depth == 0 {
                let ends = match tok.kind {
                    TokenKind::Semi | TokenKind::Eof => true,
                    TokenKind::Comment => stop == Stop::Field,
                    TokenKind::String | TokenKind::RawString => stop == Stop::Field,
                    TokenKind::Op => match tok.text {
                        ")" => stop != Stop::Field,
                        "}" => stop == Stop::Field,
                        "=" => stop == Stop::Const,
                        _ => false,
                    },
                    _ => false,
                };
                if ends {
                    break;
                }
            }
            match tok.kind {
                TokenKind::Eof => break,
                TokenKind::Comment => {
                    self.advance();
                    continue;
                }
                TokenKind::Op if matches!(tok.text, "(" | "[" | "{") => depth += 1,
                TokenKind::Op if matches!(tok.text, ")" | "]" | "}") => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            taken.push(self.advance());
        }

        let (first, last) = match (taken.first(), taken.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(self.error(format!("expected type, found {:?}", self.tok().text))),
        };
        Ok((
            render_tokens(&taken),
            Span {
                start: first.start,
                end: last.end,
            },
            last.end_line(),
        ))
    }

    fn const_spec(&mut self, group: &mut ConstGroup, out: &mut Vec<ConstSpec>) -> PResult<()> {
        let first = self.expect_ident()?;
        let mut names = vec![first.text.to_string()];
        while self.peek(0).is_op(",") {
            self.expect_op(",")?;
            names.push(self.expect_ident()?.text.to_string());
        }

        self.skip_comments();
        let tok = self.tok();
        let has_type = !(tok.is_op("=") || tok.is_op(")") || tok.kind == TokenKind::Semi);
        let ty = if has_type {
            Some(self.type_text(Stop::Const)?.0)
        } else {
            None
        };

        self.skip_comments();
        let mut last_line = self.tokens[self.pos.saturating_sub(1)].line;
        let (ty, values) = if self.tok().is_op("=") {
            self.advance();
            let (values, line) = self.expr_list()?;
            last_line = line;
            (ty, values)
        } else if ty.is_none() && !group.values.is_empty() {
            (group.ty.clone(), group.values.clone())
        } else {
            return Err(self.error(format!("missing value for constant {}", names[0])));
        };

        let line_comment = self.line_comment(last_line);
        self.expect_semi()?;

        for (idx, name) in names.into_iter().enumerate() {
            out.push(ConstSpec {
                name,
                ty: ty.clone(),
                value: values.get(idx).cloned(),
                iota: group.iota,
                line_comment: line_comment.clone(),
                line: first.line,
            });
        }
        group.ty = ty;
        group.values = values;
        group.iota += 1;
        Ok(())
    }

    /// Comma separated expressions up to the end of the spec.
    fn expr_list(&mut self) -> PResult<(Vec<Expr>, usize)> {
        let mut exprs = Vec::new();
        let mut current: Vec<Token<'a>> = Vec::new();
        let mut depth = 0usize;
        let mut last_line = self.tok().line;
        loop {
            let tok = self.tok();
            match tok.kind {
                TokenKind::Semi | TokenKind::Eof if depth == 0 => break,
                TokenKind::Comment if depth == 0 => break,
                TokenKind::Comment => {
                    self.advance();
                    continue;
                }
                TokenKind::Op if depth == 0 && tok.text == ")" => break,
                TokenKind::Op if depth == 0 && tok.text == "," => {
                    self.advance();
                    exprs.push(Expr::parse(&std::mem::take(&mut current)));
                    continue;
                }
                TokenKind::Op if matches!(tok.text, "(" | "[" | "{") => depth += 1,
                TokenKind::Op if matches!(tok.text, ")" | "]" | "}") => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            last_line = tok.end_line();
            current.push(self.advance());
        }
        if current.is_empty() {
            return Err(self.error("missing constant expression"));
        }
        exprs.push(Expr::parse(&current));
        Ok((exprs, last_line))
    }
}

/// Implicit repetition state of a `const (...)` group.
#[derive(Default)]
struct ConstGroup {
    ty: Option<String>,
    values: Vec<Expr>,
    iota: i128,
}

fn ends_field(tok: &Token<'_>) -> bool {
    matches!(
        tok.kind,
        TokenKind::Semi | TokenKind::Eof | TokenKind::String | TokenKind::RawString | TokenKind::Comment
    ) || tok.is_op("}")
}

/// `*pkg.Name[T]` -> `Name`
fn embedded_name(ty: &str) -> &str {
    let base = ty.trim_start_matches('*');
    let base = base.split('[').next().unwrap_or(base);
    base.rsplit('.').next().unwrap_or(base)
}

fn string_value(tok: &Token<'_>) -> Option<String> {
    match tok.kind {
        TokenKind::String => crate::structtag::unquote(tok.text),
        TokenKind::RawString => tok
            .text
            .strip_prefix('`')
            .and_then(|t| t.strip_suffix('`'))
            .map(|t| t.replace('\r', "")),
        _ => None,
    }
}

/// Join tokens, keeping a single space wherever the source had a gap.
fn render_tokens(tokens: &[Token<'_>]) -> String {
    let mut out = String::new();
    let mut prev_end = None;
    for tok in tokens {
        if tok.kind == TokenKind::Comment {
            continue;
        }
        if prev_end.is_some_and(|end| tok.start > end) {
            out.push(' ');
        }
        out.push_str(if tok.kind == TokenKind::Semi { ";" } else { tok.text });
        prev_end = Some(tok.end);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PILL: &str = r#"// Package painkiller is a fixture.
package painkiller

import (
	"time"
	json "encoding/json"
	_ "embed"
)

import "fmt"

// Pill is a tablet.
// It has two doc lines.
type Pill struct {
	// Name of the pill
	Name string `json:"name" db:"name"`
	A, B int // pair
	*Dose
	fmt.Stringer
	List[int]
	Grid   [4]int
	Tags   []string
	Nested struct {
		X int
	}
	Fn func(a, b int) (string, error) "plain"
	private bool
}

type (
	Alias = Pill

	Cache[K comparable, V any] struct {
		m map[K]V
	}
	Pair[A, B any] struct{ a A; b B }
)

type Meds sync.Map

func (p Pill) String() string {
	if p.Name == "" {
		return "{}"
	}
	return p.Name
}

var _ = json.Marshal

const (
	Placebo Kind = iota // nothing
	Aspirin
	Ibuprofen
	_
	Morphine = Kind(10) + iota
)

const Single = 7
"#;

    #[test]
    fn test_package_and_imports() {
        let file = parse_file(PILL).unwrap();
        assert_eq!(file.package, "painkiller");
        let imports: Vec<String> = file.imports.iter().map(ImportSpec::to_go).collect();
        assert_eq!(
            imports,
            vec![
                "\"time\"",
                "json \"encoding/json\"",
                "_ \"embed\"",
                "\"fmt\""
            ]
        );
    }

    #[test]
    fn test_struct_fields() {
        let file = parse_file(PILL).unwrap();
        let pill = &file.types[0];
        assert_eq!(pill.name, "Pill");
        assert_eq!(
            pill.doc.as_deref(),
            Some("Pill is a tablet.\nIt has two doc lines.")
        );
        let TypeExpr::Struct(fields) = &pill.ty else {
            panic!("Pill is a struct");
        };
        let summary: Vec<(Vec<String>, bool, String)> = fields
            .iter()
            .map(|f| (f.names.clone(), f.embedded, f.ty.clone()))
            .collect();
        let s = |v: &str| v.to_string();
        assert_eq!(
            summary,
            vec![
                (vec![s("Name")], false, s("string")),
                (vec![s("A"), s("B")], false, s("int")),
                (vec![s("Dose")], true, s("*Dose")),
                (vec![s("Stringer")], true, s("fmt.Stringer")),
                (vec![s("List")], true, s("List[int]")),
                (vec![s("Grid")], false, s("[4]int")),
                (vec![s("Tags")], false, s("[]string")),
                (vec![s("Nested")], false, s("struct { X int; }")),
                (vec![s("Fn")], false, s("func(a, b int) (string, error)")),
                (vec![s("private")], false, s("bool")),
            ]
        );
        assert_eq!(fields[0].doc.as_deref(), Some("Name of the pill"));
        assert_eq!(fields[0].tag.as_ref().unwrap().value, "json:\"name\" db:\"name\"");
        let tag_span = fields[0].tag.as_ref().unwrap().span;
        assert_eq!(&PILL[tag_span.start..tag_span.end], "`json:\"name\" db:\"name\"`");
        assert_eq!(&PILL[fields[0].ty_span.start..fields[0].ty_span.end], "string");
        assert_eq!(fields[1].line_comment.as_deref(), Some("pair"));
        assert_eq!(fields[8].tag.as_ref().unwrap().value, "plain");
    }

    #[test]
    fn test_grouped_types_and_params() {
        let file = parse_file(PILL).unwrap();
        let names: Vec<&str> = file.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Pill", "Alias", "Cache", "Pair", "Meds"]);

        assert!(file.types[1].alias);
        assert!(matches!(&file.types[1].ty, TypeExpr::Other(t) if t == "Pill"));

        assert_eq!(
            file.types[2].type_params,
            vec![
                TypeParam {
                    names: vec!["K".into()],
                    constraint: "comparable".into()
                },
                TypeParam {
                    names: vec!["V".into()],
                    constraint: "any".into()
                },
            ]
        );
        assert_eq!(
            file.types[3].type_params,
            vec![TypeParam {
                names: vec!["A".into(), "B".into()],
                constraint: "any".into()
            }]
        );
        let TypeExpr::Struct(pair) = &file.types[3].ty else {
            panic!("Pair is a struct");
        };
        assert_eq!(pair.len(), 2);
        assert!(matches!(&file.types[4].ty, TypeExpr::Other(t) if t == "sync.Map"));
    }

    #[test]
    fn test_const_groups_repeat_and_count_iota() {
        let file = parse_file(PILL).unwrap();
        let summary: Vec<(&str, Option<&str>, i128)> = file
            .consts
            .iter()
            .map(|c| (c.name.as_str(), c.ty.as_deref(), c.iota))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Placebo", Some("Kind"), 0),
                ("Aspirin", Some("Kind"), 1),
                ("Ibuprofen", Some("Kind"), 2),
                ("_", Some("Kind"), 3),
                ("Morphine", None, 4),
                ("Single", None, 0),
            ]
        );
        assert_eq!(file.consts[0].line_comment.as_deref(), Some("nothing"));
        assert_eq!(
            file.consts[4].value.as_ref().and_then(|v| v.eval(4, &Default::default()).ok()),
            Some(14)
        );
    }

    #[test]
    fn test_array_type_is_not_type_params() {
        let file = parse_file("package p\nconst N = 3\ntype Buf [N]byte\ntype Vec [4]int\n").unwrap();
        assert!(file.types.iter().all(|t| t.type_params.is_empty()));
        assert!(matches!(&file.types[0].ty, TypeExpr::Other(t) if t == "[N]byte"));
    }

    #[test]
    fn test_errors_carry_lines() {
        let err = parse_file("package p\n\ntype A struct {\n\tX int\n").unwrap_err();
        assert_eq!(err.line, 5);
        assert!(parse_file("type A int").is_err());
        let err = parse_file("package p\nconst (\n\tA = 1\n\tB\n\tC int\n)\n").unwrap_err();
        assert_eq!(err.line, 5);
    }

    #[test]
    fn test_unbalanced_type_params_are_errors() {
        let err = parse_file("package p\n\ntype A[T interface{ int }) struct{}\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("unexpected )"));
    }
}
