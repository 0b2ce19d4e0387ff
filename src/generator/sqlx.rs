//! Column helpers and named statements for `sqlx`-style database access.

use serde::Serialize;
use tracing::warn;

use super::{collect_imports, unsupported, Generator, GeneratorKind, RenderContext, Rendered};
use crate::error::{GenError, Result};
use crate::naming::to_snake_case;
use crate::scanner::{FieldDescriptor, ScannedType};
use crate::structtag::quote;

/// Tag key read by this generator.
pub const TAG_KEY: &str = "db";

pub struct SqlxGenerator;

#[derive(Serialize)]
struct SqlxContext<'a> {
    header: &'a str,
    package: &'a str,
    imports: Vec<String>,
    #[serde(rename = "type")]
    type_name: &'a str,
    generic_params: &'a str,
    any: &'static str,
    table: String,
    columns: Vec<Column>,
    insert: String,
    update: String,
}

#[derive(Debug, Serialize)]
struct Column {
    field: String,
    /// Quoted column name
    column: String,
}

/// Column name for `field`, or `None` when the field is not mapped.
pub fn column_name(field: &FieldDescriptor) -> Option<String> {
    if field.is_ignored_by(TAG_KEY) {
        return None;
    }
    let tagged = field
        .tag
        .get(TAG_KEY)
        .map(|t| t.name.as_str())
        .filter(|name| !name.is_empty());
    Some(tagged.map_or_else(|| to_snake_case(&field.name), str::to_string))
}

impl Generator for SqlxGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Sqlx
    }

    fn render(&self, target: &ScannedType, ctx: &RenderContext<'_>) -> Result<Vec<Rendered>> {
        let desc = &target.descriptor;
        if !desc.is_struct() {
            return Err(unsupported(self.kind(), desc, "a struct type"));
        }

        let mut columns = Vec::new();
        for field in &desc.fields {
            if field.embedded {
                warn!(type_name = %desc.type_name, field = %field.name, "embedded fields are not mapped to columns");
                continue;
            }
            if let Some(column) = column_name(field) {
                columns.push((field.name.clone(), column));
            }
        }
        if columns.is_empty() {
            return Err(GenError::Usage(format!(
                "sqlx found no columns in {}",
                desc.type_name
            )));
        }

        let table = ctx
            .settings
            .table
            .clone()
            .unwrap_or_else(|| to_snake_case(&desc.type_name));
        let (insert, update) = statements(&table, columns.iter().map(|(_, c)| c.as_str()));

        let source = ctx.renderer.render(
            "sqlx.go.txt",
            SqlxContext {
                header: ctx.header,
                package: &desc.package_name,
                imports: collect_imports(target, []),
                type_name: &desc.type_name,
                generic_params: &desc.generic_params,
                any: ctx.any(),
                table: quote(&table),
                columns: columns
                    .into_iter()
                    .map(|(field, column)| Column {
                        field,
                        column: quote(&column),
                    })
                    .collect(),
                insert: quote(&insert),
                update: quote(&update),
            },
        )?;
        Ok(vec![Rendered::generated("sqlx", source)])
    }
}

/// Named INSERT and UPDATE statements over `columns`.
fn statements<'c>(table: &str, columns: impl Iterator<Item = &'c str> + Clone) -> (String, String) {
    let names = columns.clone().collect::<Vec<_>>().join(", ");
    let params = columns
        .clone()
        .map(|c| format!(":{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sets = columns
        .map(|c| format!("{c} = :{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    (
        format!("INSERT INTO {table} ({names}) VALUES ({params})"),
        format!("UPDATE {table} SET {sets}"),
    )
}
