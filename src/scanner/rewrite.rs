//! In-place struct tag rewriting: give every field of the requested structs
//! a `db` tag, splicing the new literals into the original source.

use std::path::PathBuf;

use tracing::{debug, warn};

use super::descriptor::is_exported;
use super::package::Package;
use crate::error::{GenError, Result};
use crate::golang::{Span, TypeExpr};
use crate::naming::to_snake_case;
use crate::structtag::{StructTag, Tag};

/// A source file whose content changed during scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRewrite {
    pub path: PathBuf,
    pub source: String,
}

struct Edit {
    span: Span,
    text: String,
}

/// Add `db:"<snake_name>"` to fields of `type_names` that lack a `db` key.
///
/// Changed files are re-parsed in `package` and returned for writing.
pub(crate) fn fill_db_tags(
    package: &mut Package,
    type_names: &[String],
    include_unexported: bool,
) -> Result<Vec<SourceRewrite>> {
    let mut rewrites = Vec::new();

    for index in 0..package.files.len() {
        let file = &package.files[index];
        let mut edits = Vec::new();

        for decl in file.ast.types.iter().filter(|d| type_names.contains(&d.name)) {
            let TypeExpr::Struct(fields) = &decl.ty else {
                continue;
            };
            for field in fields {
                if field.embedded {
                    continue;
                }
                let [name] = field.names.as_slice() else {
                    warn!(
                        type_name = %decl.name,
                        fields = %field.names.join(", "),
                        "cannot tag a multi-name field, skipping"
                    );
                    continue;
                };
                if !include_unexported && !is_exported(name) {
                    continue;
                }
                let mut tag = match &field.tag {
                    Some(raw) => StructTag::parse(&raw.value).map_err(|err| {
                        GenError::load(&file.path, field.line, format!("field {name}: {err}"))
                    })?,
                    None => StructTag::default(),
                };
                if tag.get("db").is_some() {
                    continue;
                }
                tag.set(Tag::new("db", to_snake_case(name), &[]));
                let edit = match &field.tag {
                    Some(raw) => Edit {
                        span: raw.span,
                        text: tag.to_go_literal(),
                    },
                    None => Edit {
                        span: Span {
                            start: field.ty_span.end,
                            end: field.ty_span.end,
                        },
                        text: format!(" {}", tag.to_go_literal()),
                    },
                };
                debug!(type_name = %decl.name, field = %name, tag = %tag, "filled db tag");
                edits.push(edit);
            }
        }

        if edits.is_empty() {
            continue;
        }
        let source = apply_edits(&file.source, edits);
        let path = file.path.clone();
        package.replace_source(index, source.clone())?;
        rewrites.push(SourceRewrite { path, source });
    }

    Ok(rewrites)
}

fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by(|a, b| b.span.start.cmp(&a.span.start));
    let mut out = source.to_string();
    for edit in edits {
        out.replace_range(edit.span.start..edit.span.end, &edit.text);
    }
    out
}
