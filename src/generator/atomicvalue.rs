//! Typed wrappers over a named `atomic.Value`.

use serde::Serialize;

use super::{collect_imports, unsupported, Generator, GeneratorKind, RenderContext, Rendered};
use crate::error::{GenError, Result};
use crate::scanner::ScannedType;

pub struct AtomicValueGenerator;

#[derive(Serialize)]
struct AtomicValueContext<'a> {
    header: &'a str,
    package: &'a str,
    imports: Vec<String>,
    #[serde(rename = "type")]
    type_name: &'a str,
    generic_params: &'a str,
    value: String,
    /// Go 1.17 added `Swap` and `CompareAndSwap`
    swap: bool,
}

impl Generator for AtomicValueGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::AtomicValue
    }

    fn arity(&self) -> usize {
        1
    }

    fn render(&self, target: &ScannedType, ctx: &RenderContext<'_>) -> Result<Vec<Rendered>> {
        let desc = &target.descriptor;
        if desc.underlying() != Some("atomic.Value") {
            return Err(unsupported(self.kind(), desc, "a named atomic.Value"));
        }
        let [value] = target.spec.template_params.as_slice() else {
            return Err(GenError::Usage(format!(
                "atomicvalue expects <Value> for {}",
                desc.type_name
            )));
        };

        let source = ctx.renderer.render(
            "atomicvalue.go.txt",
            AtomicValueContext {
                header: ctx.header,
                package: &desc.package_name,
                imports: collect_imports(target, ["sync/atomic"]),
                type_name: &desc.type_name,
                generic_params: &desc.generic_params,
                value: value.full_type(),
                swap: ctx.settings.go_minor >= 17,
            },
        )?;
        Ok(vec![Rendered::generated("atomicvalue", source)])
    }
}
