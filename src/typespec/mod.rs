//! # Type-Spec Locator
//!
//! Parses the `--type` flag into [`TypeSpec`]s.
//!
//! ```text
//! Pill                          -> Pill, no parameters
//! Pill<int,string>              -> Pill, [int, string]
//! NumMap<int, *[][]*[]time.Time> -> NumMap, [int, *([][]*[]) time.Time (import "time")]
//! a.b/c.Pill                    -> Pill, import "a.b/c"
//! ```
//!
//! Only `<`/`>` delimit generic parameters; `[]`, `()` and `{}` are opaque so
//! `map[K]V`, `func(a, b int)` and `interface{}` pass through untouched.

mod tokenizer;


use serde::Serialize;

use crate::error::Result;
use tokenizer::{matching_close, split_top_level, Segment, Source};

/// A single requested generation target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeSpec {
    /// Base type identifier, never empty
    pub name: String,
    /// Package import path when the entry was qualified
    pub import: String,
    /// Generic arguments; position determines the role
    pub template_params: Vec<TemplateParam>,
}

/// One generic argument of a [`TypeSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct TemplateParam {
    /// Bare type without pointer/slice decoration, e.g. `time.Time`
    pub ty: String,
    /// Import path derived from the qualified part of `ty`
    pub import: String,
    /// Imports found inside composite types (map keys, type arguments)
    pub extra_imports: Vec<String>,
    /// A leading `*` was present
    pub is_pointer: bool,
    /// Decoration between the leading `*` and the base type, verbatim
    pub type_prefix: String,
}

impl TypeSpec {
    /// Spec with no template parameters.
    pub fn named(name: impl Into<String>) -> Self {
        TypeSpec {
            name: name.into(),
            import: String::new(),
            template_params: Vec::new(),
        }
    }
}

impl TemplateParam {
    /// Parameter for a plain, undecorated type in the current package.
    pub fn plain(ty: impl Into<String>) -> Self {
        TemplateParam {
            ty: ty.into(),
            ..Default::default()
        }
    }

    /// Recompose the type exactly as written: `*` + prefix + type.
    pub fn full_type(&self) -> String {
        format!(
            "{}{}{}",
            if self.is_pointer { "*" } else { "" },
            self.type_prefix,
            self.ty
        )
    }

    /// Every import path this parameter needs.
    pub fn imports(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.import.as_str())
            .chain(self.extra_imports.iter().map(String::as_str))
            .filter(|import| !import.is_empty())
    }
}

/// Parse a comma separated type specification.
///
/// # Errors
///
/// Returns [`GenError::Syntax`](crate::error::GenError::Syntax) on unbalanced
/// delimiters, empty entries or parameters, invalid identifiers or trailing
/// text after a parameter list.
pub fn parse(input: &str) -> Result<Vec<TypeSpec>> {
    let src = Source { input };
    split_top_level(&src, Segment::new(input, 0))?
        .into_iter()
        .map(|segment| parse_entry(&src, segment.trim()))
        .collect()
}

fn parse_entry(src: &Source<'_>, segment: Segment<'_>) -> Result<TypeSpec> {
    if segment.text.is_empty() {
        return Err(src.error(segment.offset, "empty type entry"));
    }

    let (head, params) = match segment.text.find('<') {
        None => (segment, Vec::new()),
        Some(open) => {
            let close = matching_close(segment.text, open)
                .ok_or_else(|| src.error(segment.offset + open, "unclosed '<'"))?;
            if close != segment.text.len() - 1 {
                return Err(src.error(
                    segment.offset + close + 1,
                    "unexpected text after parameter list",
                ));
            }
            let inner = segment.slice(open + 1, close);
            if inner.text.trim().is_empty() {
                return Err(src.error(inner.offset, "empty parameter list"));
            }
            let params = split_top_level(src, inner)?
                .into_iter()
                .map(|param| parse_param(src, param.trim()))
                .collect::<Result<Vec<_>>>()?;
            (segment.slice(0, open).trim(), params)
        }
    };

    let (import, name) = split_qualified(head.text);
    if !is_identifier(name) {
        return Err(src.error(head.offset, format!("invalid type name {:?}", head.text)));
    }
    Ok(TypeSpec {
        name: name.to_string(),
        import: import.to_string(),
        template_params: params,
    })
}

fn parse_param(src: &Source<'_>, segment: Segment<'_>) -> Result<TemplateParam> {
    if segment.text.is_empty() {
        return Err(src.error(segment.offset, "empty template parameter"));
    }

    let mut rest = segment;
    let is_pointer = rest.text.starts_with('*');
    if is_pointer {
        rest = rest.tail(1).trim();
    }

    let mut prefix = String::new();
    loop {
        if rest.text.starts_with('*') {
            prefix.push('*');
            rest = rest.tail(1).trim();
        } else if rest.text.starts_with('[') {
            let close = matching_close(rest.text, 0)
                .ok_or_else(|| src.error(rest.offset, "unclosed '['"))?;
            let len = rest.text[1..close].trim();
            if !len.is_empty() && !is_array_length(len) {
                return Err(src.error(rest.offset + 1, format!("invalid array length {len:?}")));
            }
            prefix.push('[');
            prefix.push_str(len);
            prefix.push(']');
            rest = rest.tail(close + 1).trim();
        } else {
            break;
        }
    }

    if rest.text.is_empty() {
        return Err(src.error(rest.offset, "missing element type"));
    }

    let mut param = parse_base(src, rest)?;
    param.is_pointer = is_pointer;
    param.type_prefix = prefix;
    Ok(param)
}

/// Parse an undecorated type: `map[K]V`, `chan T`, `pkg.Name[Args]`, or an
/// opaque literal type such as `interface{}`.
fn parse_base(src: &Source<'_>, segment: Segment<'_>) -> Result<TemplateParam> {
    let text = segment.text;

    if let Some(after) = text.strip_prefix("map[") {
        let open = text.len() - after.len() - 1;
        let close = matching_close(text, open)
            .ok_or_else(|| src.error(segment.offset + open, "unclosed map key"))?;
        let key = parse_param(src, segment.slice(open + 1, close).trim())?;
        let value = parse_param(src, segment.tail(close + 1).trim())?;
        let mut extra_imports = value.extra_imports.clone();
        for import in key.imports() {
            push_unique(&mut extra_imports, import);
        }
        return Ok(TemplateParam {
            ty: format!("map[{}]{}", key.full_type(), value.full_type()),
            import: value.import,
            extra_imports,
            ..Default::default()
        });
    }

    for chan in ["<-chan ", "chan<- ", "chan "] {
        if text.starts_with(chan) {
            let elem = parse_param(src, segment.tail(chan.len()).trim())?;
            return Ok(TemplateParam {
                ty: format!("{chan}{}", elem.full_type()),
                import: elem.import,
                extra_imports: elem.extra_imports,
                ..Default::default()
            });
        }
    }

    if is_literal_type(text) {
        return Ok(TemplateParam::plain(text));
    }

    let (head, args) = match text.find('[') {
        Some(open) => {
            let close = matching_close(text, open)
                .ok_or_else(|| src.error(segment.offset + open, "unclosed '['"))?;
            if close != text.len() - 1 {
                return Err(src.error(segment.offset + close + 1, "unexpected text after type arguments"));
            }
            let args = split_top_level(src, segment.slice(open + 1, close))?
                .into_iter()
                .map(|arg| parse_param(src, arg.trim()))
                .collect::<Result<Vec<_>>>()?;
            (&text[..open], Some(args))
        }
        None => (text, None),
    };

    let (import, _) = split_qualified(head);
    let local = head.rsplit('/').next().unwrap_or(head);
    if !local.split('.').all(is_identifier) {
        return Err(src.error(segment.offset, format!("invalid type {text:?}")));
    }

    let mut param = TemplateParam {
        ty: local.to_string(),
        import: import.to_string(),
        ..Default::default()
    };
    if let Some(args) = args {
        let rendered = args.iter().map(TemplateParam::full_type).collect::<Vec<_>>();
        param.ty = format!("{}[{}]", local, rendered.join(", "));
        for arg in &args {
            for import in arg.imports() {
                if import != param.import {
                    push_unique(&mut param.extra_imports, import);
                }
            }
        }
    }
    Ok(param)
}

/// `interface{...}`, `struct{...}` and `func(...)` are passed through as is.
fn is_literal_type(text: &str) -> bool {
    ["interface", "struct"].iter().any(|keyword| {
        text.strip_prefix(keyword)
            .is_some_and(|rest| rest.trim_start().starts_with('{'))
    }) || text.starts_with("func(")
}

fn push_unique(imports: &mut Vec<String>, import: &str) {
    if !imports.iter().any(|known| known == import) {
        imports.push(import.to_string());
    }
}

/// Split `a.b/c.Name` into (`a.b/c`, `Name`); unqualified names give an
/// empty import.
fn split_qualified(text: &str) -> (&str, &str) {
    let last_segment_start = text.rfind('/').map_or(0, |idx| idx + 1);
    match text[last_segment_start..].rfind('.') {
        Some(dot) => {
            let dot = last_segment_start + dot;
            (&text[..dot], &text[dot + 1..])
        }
        None => ("", text),
    }
}

fn is_array_length(len: &str) -> bool {
    len == "..." || len.chars().all(|c| c.is_ascii_digit()) || len.split('.').all(is_identifier)
}

/// Go identifier: a letter or underscore followed by letters, digits and
/// underscores.
pub(crate) fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {
            chars.all(|c| c == '_' || c.is_alphanumeric())
        }
        _ => false,
    }
}
