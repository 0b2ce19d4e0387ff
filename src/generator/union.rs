//! Tagged-union helpers: `Union`, `Valid` and one `Is<Field>` per field.

use serde::Serialize;

use super::{collect_imports, Generator, GeneratorKind, RenderContext, Rendered};
use crate::error::Result;
use crate::naming::to_camel_case;
use crate::scanner::{FieldDescriptor, ScannedType};

/// Tag key read by this generator.
pub const TAG_KEY: &str = "union";

pub struct UnionGenerator;

#[derive(Serialize)]
struct UnionContext<'a> {
    header: &'a str,
    package: &'a str,
    imports: Vec<String>,
    #[serde(rename = "type")]
    type_name: &'a str,
    generic_params: &'a str,
    any: &'static str,
    is_struct: bool,
    fields: Vec<UnionField>,
}

#[derive(Debug, Serialize)]
struct UnionField {
    name: String,
    method: String,
    ty: String,
    /// `nil`, `zero` or `reflect`
    check: &'static str,
}

impl From<&FieldDescriptor> for UnionField {
    fn from(field: &FieldDescriptor) -> Self {
        let check = if field.can_compare_with_nil {
            "nil"
        } else if field.can_compare_with_zero {
            "zero"
        } else {
            "reflect"
        };
        UnionField {
            name: field.name.clone(),
            method: to_camel_case(&field.name),
            ty: field.ty.clone(),
            check,
        }
    }
}

impl Generator for UnionGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Union
    }

    fn render(&self, target: &ScannedType, ctx: &RenderContext<'_>) -> Result<Vec<Rendered>> {
        let desc = &target.descriptor;
        let fields = desc
            .fields
            .iter()
            .filter(|field| !field.is_ignored_by(TAG_KEY))
            .map(UnionField::from)
            .collect();

        let source = ctx.renderer.render(
            "union.go.txt",
            UnionContext {
                header: ctx.header,
                package: &desc.package_name,
                imports: collect_imports(target, ["reflect"]),
                type_name: &desc.type_name,
                generic_params: &desc.generic_params,
                any: ctx.any(),
                is_struct: desc.is_struct(),
                fields,
            },
        )?;
        Ok(vec![Rendered::generated("union", source)])
    }
}
