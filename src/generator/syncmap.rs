//! Typed wrappers over a named `sync.Map`.

use serde::Serialize;

use super::{collect_imports, unsupported, Generator, GeneratorKind, RenderContext, Rendered};
use crate::error::{GenError, Result};
use crate::scanner::ScannedType;

pub struct SyncMapGenerator;

#[derive(Serialize)]
struct SyncMapContext<'a> {
    header: &'a str,
    package: &'a str,
    imports: Vec<String>,
    #[serde(rename = "type")]
    type_name: &'a str,
    generic_params: &'a str,
    key: String,
    value: String,
    any: &'static str,
    /// Go 1.15 added `LoadAndDelete`
    load_and_delete: bool,
    /// Go 1.20 added `Swap`
    swap: bool,
}

impl Generator for SyncMapGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::SyncMap
    }

    fn arity(&self) -> usize {
        2
    }

    fn render(&self, target: &ScannedType, ctx: &RenderContext<'_>) -> Result<Vec<Rendered>> {
        let desc = &target.descriptor;
        if desc.underlying() != Some("sync.Map") {
            return Err(unsupported(self.kind(), desc, "a named sync.Map"));
        }
        let [key, value] = target.spec.template_params.as_slice() else {
            return Err(GenError::Usage(format!(
                "syncmap expects <Key, Value> for {}",
                desc.type_name
            )));
        };

        let source = ctx.renderer.render(
            "syncmap.go.txt",
            SyncMapContext {
                header: ctx.header,
                package: &desc.package_name,
                imports: collect_imports(target, ["sync"]),
                type_name: &desc.type_name,
                generic_params: &desc.generic_params,
                key: key.full_type(),
                value: value.full_type(),
                any: ctx.any(),
                load_and_delete: ctx.settings.go_minor >= 15,
                swap: ctx.settings.go_minor >= 20,
            },
        )?;
        Ok(vec![Rendered::generated("syncmap", source)])
    }
}
