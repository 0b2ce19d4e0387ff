//! Functional options: `<Type>Option`, `ApplyOptions` and one `With...`
//! constructor per field.

use serde::Serialize;

use super::{collect_imports, unsupported, Generator, GeneratorKind, RenderContext, Rendered};
use crate::emitter::OverwritePolicy;
use crate::error::Result;
use crate::naming::to_camel_case;
use crate::scanner::{FieldDescriptor, ScannedType, TypeKind};

/// Tag key read by this generator.
pub const TAG_KEY: &str = "option";

pub struct OptionGenerator;

#[derive(Serialize)]
struct OptionContext<'a> {
    header: &'a str,
    package: &'a str,
    imports: Vec<String>,
    #[serde(rename = "type")]
    type_name: &'a str,
    option: String,
    func_name: String,
    generic_declaration: &'a str,
    generic_params: &'a str,
    funcs: Vec<OptionFunc>,
}

#[derive(Debug, Serialize)]
struct OptionFunc {
    name: String,
    summary: String,
    doc: Vec<String>,
    field: String,
    param: &'static str,
    param_type: String,
    /// `set`, `append` or `merge`
    kind: &'static str,
}

#[derive(Serialize)]
struct ScaffoldContext<'a> {
    package: &'a str,
    #[serde(rename = "type")]
    type_name: &'a str,
    option: String,
    generic_declaration: &'a str,
    generic_params: &'a str,
}

impl Generator for OptionGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Option
    }

    fn render(&self, target: &ScannedType, ctx: &RenderContext<'_>) -> Result<Vec<Rendered>> {
        let desc = &target.descriptor;
        if !desc.is_struct() {
            return Err(unsupported(self.kind(), desc, "a struct type"));
        }
        let type_name = desc.type_name.as_str();
        let option = format!("{type_name}Option");

        let funcs = desc
            .fields
            .iter()
            .filter(|field| !field.is_ignored_by(TAG_KEY))
            .flat_map(|field| option_funcs(type_name, field, ctx.settings.short))
            .collect();

        let source = ctx.renderer.render(
            "option.go.txt",
            OptionContext {
                header: ctx.header,
                package: &desc.package_name,
                imports: collect_imports(target, []),
                type_name,
                option: option.clone(),
                func_name: format!("{type_name}OptionFunc"),
                generic_declaration: &desc.generic_declaration,
                generic_params: &desc.generic_params,
                funcs,
            },
        )?;
        let mut outputs = vec![Rendered::generated("options", source)];

        if ctx.settings.scaffold {
            let scaffold = ctx.renderer.render(
                "option_config.go.txt",
                ScaffoldContext {
                    package: &desc.package_name,
                    type_name,
                    option,
                    generic_declaration: &desc.generic_declaration,
                    generic_params: &desc.generic_params,
                },
            )?;
            outputs.push(Rendered {
                suffix: "options.config".to_string(),
                source: scaffold,
                policy: OverwritePolicy::RefuseIfDifferent,
                scaffold: true,
            });
        }
        Ok(outputs)
    }
}

/// Constructors for one field: a setter, or append/merge plus `Replace`
/// variants for slices and maps.
fn option_funcs(type_name: &str, field: &FieldDescriptor, short: bool) -> Vec<OptionFunc> {
    let short = short || field.tag.get(TAG_KEY).is_some_and(|t| t.has_option("short"));
    let base = if short {
        format!("With{}", to_camel_case(&field.name))
    } else {
        format!("With{type_name}{}", to_camel_case(&field.name))
    };
    let doc: Vec<String> = field
        .doc_comment
        .iter()
        .chain(field.line_comment.iter())
        .flat_map(|text| text.lines())
        .map(str::to_string)
        .collect();

    let func = |name: String, verb: &str, param: &'static str, param_type: String, kind| OptionFunc {
        name,
        summary: format!("{verb} {} in {type_name}.", field.name),
        doc: doc.clone(),
        field: field.name.clone(),
        param,
        param_type,
        kind,
    };

    match (field.type_kind, field.slice_elem(), field.map_types()) {
        (TypeKind::Slice, Some(elem), _) => vec![
            func(base.clone(), "appends", "v", format!("...{elem}"), "append"),
            func(format!("{base}Replace"), "replaces", "v", format!("...{elem}"), "set"),
        ],
        (TypeKind::Map, _, Some(_)) => vec![
            func(base.clone(), "merges", "m", field.ty.clone(), "merge"),
            func(format!("{base}Replace"), "replaces", "v", field.ty.clone(), "set"),
        ],
        _ => vec![func(base, "sets", "v", field.ty.clone(), "set")],
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::scanner::TypeKind;
    use crate::structtag::StructTag;

    fn field(name: &str, ty: &str, tag: &str) -> FieldDescriptor {
        FieldDescriptor {
            name: name.into(),
            ty: ty.into(),
            tag: StructTag::parse(tag).unwrap(),
            doc_comment: None,
            line_comment: None,
            embedded: false,
            exported: true,
            can_compare_with_nil: false,
            can_compare_with_zero: true,
            type_kind: TypeKind::of(ty),
        }
    }

    #[test]
    fn test_setter_names() {
        let funcs = option_funcs("Config", &field("Age", "string", ""), false);
        assert_eq!(funcs.len(), 1);
        assert_eq!(funcs[0].name, "WithConfigAge");
        assert_eq!(funcs[0].param_type, "string");
        assert_eq!(funcs[0].kind, "set");

        let short = option_funcs("Config", &field("Age", "string", r#"option:",short""#), false);
        assert_eq!(short[0].name, "WithAge");

        let flag = option_funcs("Config", &field("Age", "string", ""), true);
        assert_eq!(flag[0].name, "WithAge");
    }

    #[test]
    fn test_slice_and_map_variants() {
        let slice = option_funcs("Config", &field("Tags", "[]string", ""), false);
        let names: Vec<(&str, &str, &str)> = slice
            .iter()
            .map(|f| (f.name.as_str(), f.param_type.as_str(), f.kind))
            .collect();
        assert_eq!(
            names,
            vec![
                ("WithConfigTags", "...string", "append"),
                ("WithConfigTagsReplace", "...string", "set"),
            ]
        );

        let map = option_funcs("Config", &field("Headers", "map[string]string", ""), false);
        assert_eq!(map[0].kind, "merge");
        assert_eq!(map[0].param, "m");
        assert_eq!(map[1].name, "WithConfigHeadersReplace");
    }

    #[test]
    fn test_unexported_field_constructor() {
        let mut f = field("maxRetries", "int", "");
        f.exported = false;
        let funcs = option_funcs("Client", &f, false);
        assert_eq!(funcs[0].name, "WithClientMaxRetries");
        assert_eq!(funcs[0].field, "maxRetries");
    }
}
