//! # Generator Module
//!
//! One generation run: parse `--type`, scan the package, render every
//! requested type with the selected [`Generator`], then plan and write all
//! outputs through the [`Emitter`](crate::emitter::Emitter).
//!
//! ```text
//! --type -> typespec::parse -> scanner::scan -> Generator::render -> emitter
//! ```
//!
//! Nothing is written until every output rendered and passed the conflict
//! check, so a failing type leaves the tree untouched.
//!
//! ## Generators
//!
//! | kind          | output                       | template parameters |
//! |---------------|------------------------------|---------------------|
//! | `option`      | `<type>_options.go`          | none                |
//! | `union`       | `<type>_union.go`            | none                |
//! | `syncmap`     | `<type>_syncmap.go`          | key, value          |
//! | `atomicvalue` | `<type>_atomicvalue.go`      | value               |
//! | `enum`        | `<type>_enum.go`             | none                |
//! | `sqlx`        | `<type>_sqlx.go`             | none                |

pub mod atomicvalue;
pub mod enumeration;
pub mod option;
pub mod sqlx;
pub mod syncmap;
pub mod union;


use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::emitter::{self, canonical, EmitOutcome, Emitter, Formatter, OverwritePolicy, PlannedFile};
use crate::error::{GenError, Result};
use crate::render::Renderer;
use crate::scanner::{self, ScanOptions, ScannedType, StructDescriptor};
use crate::typespec::{self, TypeSpec};

/// The generators this crate ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    Option,
    Union,
    SyncMap,
    AtomicValue,
    Enum,
    Sqlx,
}

impl GeneratorKind {
    pub const ALL: [GeneratorKind; 6] = [
        GeneratorKind::Option,
        GeneratorKind::Union,
        GeneratorKind::SyncMap,
        GeneratorKind::AtomicValue,
        GeneratorKind::Enum,
        GeneratorKind::Sqlx,
    ];

    /// Subcommand name, also used in logs.
    pub fn name(self) -> &'static str {
        match self {
            GeneratorKind::Option => "option",
            GeneratorKind::Union => "union",
            GeneratorKind::SyncMap => "syncmap",
            GeneratorKind::AtomicValue => "atomicvalue",
            GeneratorKind::Enum => "enum",
            GeneratorKind::Sqlx => "sqlx",
        }
    }

    pub fn generator(self) -> Box<dyn Generator> {
        match self {
            GeneratorKind::Option => Box::new(option::OptionGenerator),
            GeneratorKind::Union => Box::new(union::UnionGenerator),
            GeneratorKind::SyncMap => Box::new(syncmap::SyncMapGenerator),
            GeneratorKind::AtomicValue => Box::new(atomicvalue::AtomicValueGenerator),
            GeneratorKind::Enum => Box::new(enumeration::EnumGenerator),
            GeneratorKind::Sqlx => Box::new(sqlx::SqlxGenerator),
        }
    }
}

/// A code generator for one kind of helper.
pub trait Generator {
    fn kind(&self) -> GeneratorKind;

    /// Number of template parameters each `--type` entry must carry.
    fn arity(&self) -> usize {
        0
    }

    /// Render every output for one scanned type.
    fn render(&self, target: &ScannedType, ctx: &RenderContext<'_>) -> Result<Vec<Rendered>>;
}

/// Run-wide inputs handed to [`Generator::render`].
pub struct RenderContext<'a> {
    pub renderer: &'a Renderer,
    pub settings: &'a Settings,
    /// `// Code generated by ...; DO NOT EDIT.`
    pub header: &'a str,
}

impl RenderContext<'_> {
    /// `any`, or `interface{}` before Go 1.18.
    pub fn any(&self) -> &'static str {
        if self.settings.go_minor >= 18 {
            "any"
        } else {
            "interface{}"
        }
    }
}

/// One rendered output, before canonicalization.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// File name suffix after `<type>_`, without `.go`
    pub suffix: String,
    pub source: String,
    pub policy: OverwritePolicy,
    /// Hand-editable companion file rather than the generated file
    pub scaffold: bool,
}

impl Rendered {
    pub fn generated(suffix: &str, source: String) -> Self {
        Rendered {
            suffix: suffix.to_string(),
            source,
            policy: OverwritePolicy::Always,
            scaffold: false,
        }
    }
}

/// Generator settings taken from flags and `gogen.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Prefix removed from enum constant names
    pub trim_prefix: Option<String>,
    /// Use the line comment of an enum constant as its name
    pub line_comment: bool,
    /// Drop the type name from option constructors
    pub short: bool,
    /// Also write the `<type>_options.config.go` scaffold
    pub scaffold: bool,
    /// Table name for sqlx helpers
    pub table: Option<String>,
    /// Minor version of the target Go release
    pub go_minor: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            trim_prefix: None,
            line_comment: false,
            short: false,
            scaffold: false,
            table: None,
            go_minor: 18,
        }
    }
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub kind: GeneratorKind,
    /// Raw `--type` value
    pub type_spec: String,
    pub patterns: Vec<String>,
    /// `--output`: a `.go` file (single type only) or a directory
    pub output: Option<PathBuf>,
    pub settings: Settings,
    pub scan: ScanOptions,
    /// Overwrite scaffolds that differ
    pub force: bool,
    /// Render and check, write nothing
    pub dry_run: bool,
    pub formatter: Option<Formatter>,
    /// Command line arguments recorded in the header
    pub args: Vec<String>,
}

impl GenerationRequest {
    pub fn new(kind: GeneratorKind, type_spec: impl Into<String>, patterns: Vec<String>) -> Self {
        GenerationRequest {
            kind,
            type_spec: type_spec.into(),
            patterns,
            output: None,
            settings: Settings::default(),
            scan: ScanOptions::default(),
            force: false,
            dry_run: false,
            formatter: None,
            args: Vec::new(),
        }
    }
}

/// One file the run wrote, left alone, or would write.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedFile {
    pub path: PathBuf,
    /// Requested type, `None` for rewritten input sources
    pub type_name: Option<String>,
    pub outcome: EmitOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub files: Vec<GeneratedFile>,
    /// Outcomes are predictions; nothing was written
    pub dry_run: bool,
}

/// Header line of every generated (non-scaffold) file.
pub fn header(args: &[String]) -> String {
    format!(
        "// Code generated by \"gogen {}\"; DO NOT EDIT.",
        args.join(" ")
    )
}

/// Where `--output` points.
enum OutputTarget {
    NextToSource,
    Dir(PathBuf),
    File(PathBuf),
}

impl OutputTarget {
    fn from_flag(output: Option<&Path>, type_count: usize) -> Result<Self> {
        let Some(path) = output else {
            return Ok(OutputTarget::NextToSource);
        };
        if !path.is_dir() && path.extension().is_some_and(|ext| ext == "go") {
            if type_count > 1 {
                return Err(GenError::Usage(format!(
                    "--output {} names a file but {type_count} types were requested",
                    path.display()
                )));
            }
            return Ok(OutputTarget::File(path.to_path_buf()));
        }
        Ok(OutputTarget::Dir(path.to_path_buf()))
    }

    fn path_for(&self, descriptor: &StructDescriptor, rendered: &Rendered) -> PathBuf {
        let name = emitter::output_file_name(&descriptor.type_name, &rendered.suffix);
        match self {
            OutputTarget::File(file) if !rendered.scaffold => file.clone(),
            OutputTarget::File(file) => file
                .parent()
                .map_or_else(|| PathBuf::from(&name), |dir| dir.join(&name)),
            OutputTarget::Dir(dir) => dir.join(name),
            OutputTarget::NextToSource => descriptor
                .source_file
                .parent()
                .map_or_else(|| PathBuf::from(&name), |dir| dir.join(&name)),
        }
    }
}

/// Check arity and parse `--type`.
pub fn parse_types(type_spec: &str, generator: &dyn Generator) -> Result<Vec<TypeSpec>> {
    if type_spec.trim().is_empty() {
        return Err(GenError::NoTypes);
    }
    let specs = typespec::parse(type_spec)?;
    let expected = generator.arity();
    for spec in &specs {
        if spec.template_params.len() != expected {
            return Err(GenError::Usage(format!(
                "{} expects {expected} type parameter(s) for {}, got {}",
                generator.kind().name(),
                spec.name,
                spec.template_params.len()
            )));
        }
    }
    Ok(specs)
}

/// Run one generation request end to end.
///
/// # Errors
///
/// Any [`GenError`]; on error no file has been written.
pub fn generate(request: &GenerationRequest) -> Result<GenerationReport> {
    let generator = request.kind.generator();
    let specs = parse_types(&request.type_spec, generator.as_ref())?;
    let target = OutputTarget::from_flag(request.output.as_deref(), specs.len())?;

    let scanned = scanner::scan(&request.patterns, &specs, &request.scan)?;

    let renderer = Renderer::new()?;
    let header = header(&request.args);
    let ctx = RenderContext {
        renderer: &renderer,
        settings: &request.settings,
        header: &header,
    };
    let emitter = Emitter::new(request.formatter.clone());

    let mut planned: Vec<(Option<String>, PlannedFile)> = Vec::new();
    let mut seen = HashSet::new();
    for target_type in &scanned.types {
        for rendered in generator.render(target_type, &ctx)? {
            let path = target.path_for(&target_type.descriptor, &rendered);
            if !seen.insert(path.clone()) {
                return Err(GenError::Usage(format!(
                    "more than one output maps to {}",
                    path.display()
                )));
            }
            let policy = rendered.policy.forced(request.force);
            let plan = emitter.plan(&rendered.source, &path, policy)?;
            debug!(
                generator = request.kind.name(),
                type_name = %target_type.spec.name,
                path = %path.display(),
                outcome = ?plan.outcome,
                "planned output"
            );
            planned.push((Some(target_type.spec.name.clone()), plan));
        }
    }
    for rewrite in &scanned.rewrites {
        let plan = emitter::plan_verbatim(rewrite.source.clone(), &rewrite.path, OverwritePolicy::Always)?;
        planned.push((None, plan));
    }

    let mut files = Vec::with_capacity(planned.len());
    for (type_name, plan) in planned {
        let outcome = if request.dry_run {
            plan.outcome
        } else {
            plan.commit()?
        };
        files.push(GeneratedFile {
            path: plan.path,
            type_name,
            outcome,
        });
    }

    info!(
        generator = request.kind.name(),
        files = files.len(),
        dry_run = request.dry_run,
        "generation finished"
    );
    Ok(GenerationReport {
        files,
        dry_run: request.dry_run,
    })
}

/// Import lines for a generated file: the declaring file's named imports,
/// the template parameter imports and `extra` standard packages.
///
/// An added path whose package name the file already binds is left out;
/// the body then refers to the file's package. Unused entries are pruned by
/// the emitter.
pub(crate) fn collect_imports<'a>(
    target: &'a ScannedType,
    extra: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let mut imports: BTreeSet<String> = target
        .descriptor
        .file_imports
        .iter()
        .filter(|line| !line.starts_with("_ ") && !line.starts_with(". "))
        .cloned()
        .collect();
    let mut bound: HashSet<String> = imports
        .iter()
        .filter_map(|line| canonical::import_local_name(line))
        .collect();
    let params = target.spec.template_params.iter().flat_map(|p| p.imports());
    for path in params.chain(extra) {
        let line = format!("\"{path}\"");
        if imports.contains(&line) {
            continue;
        }
        if !bound.insert(canonical::default_name(path)) {
            debug!(
                type_name = %target.descriptor.type_name,
                import = path,
                "package name already bound by the source file, not importing"
            );
            continue;
        }
        imports.insert(line);
    }
    imports.into_iter().collect()
}

/// `Usage` error for a declaration the generator cannot handle.
pub(crate) fn unsupported(kind: GeneratorKind, descriptor: &StructDescriptor, need: &str) -> GenError {
    let found = descriptor.underlying().unwrap_or("struct");
    GenError::Usage(format!(
        "{} requires {need}; {} is {found}",
        kind.name(),
        descriptor.type_name
    ))
}
