//! # Render Engine
//!
//! Every generator template is embedded at compile time and registered in a
//! single `minijinja` [`Environment`]. Generators hand over a fully
//! precomputed context; the templates only loop and print.

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::Serialize;

use crate::error::{GenError, Result};

/// Embedded templates as `(name, source)` pairs.
pub const TEMPLATES: &[(&str, &str)] = &[
    ("option.go.txt", include_str!("../../templates/option.go.txt")),
    (
        "option_config.go.txt",
        include_str!("../../templates/option_config.go.txt"),
    ),
    ("union.go.txt", include_str!("../../templates/union.go.txt")),
    ("syncmap.go.txt", include_str!("../../templates/syncmap.go.txt")),
    (
        "atomicvalue.go.txt",
        include_str!("../../templates/atomicvalue.go.txt"),
    ),
    ("enum.go.txt", include_str!("../../templates/enum.go.txt")),
    ("sqlx.go.txt", include_str!("../../templates/sqlx.go.txt")),
];

/// Template environment shared by all generators of a run.
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    /// Environment holding every embedded template.
    pub fn new() -> Result<Self> {
        Self::with_templates(TEMPLATES)
    }

    /// Environment holding only `templates`.
    pub fn with_templates(templates: &[(&'static str, &'static str)]) -> Result<Self> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        for (name, source) in templates {
            env.add_template(name, source)
                .map_err(|source| GenError::Template {
                    name: (*name).to_string(),
                    source,
                })?;
        }
        Ok(Renderer { env })
    }

    /// Render `name` with `ctx`.
    ///
    /// # Errors
    ///
    /// `Template` when the name is unknown or evaluation fails, including
    /// any reference to a value missing from `ctx`.
    pub fn render(&self, name: &str, ctx: impl Serialize) -> Result<String> {
        let template_error = |source| GenError::Template {
            name: name.to_string(),
            source,
        };
        let template = self.env.get_template(name).map_err(template_error)?;
        template.render(ctx).map_err(template_error)
    }
}
