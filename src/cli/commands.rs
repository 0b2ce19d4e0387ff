use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::config::{self, GogenConfig};
use crate::emitter::{EmitOutcome, Formatter};
use crate::error::GenError;
use crate::generator::{self, GenerationReport, GenerationRequest, GeneratorKind};
use crate::scanner::{self, ScanOptions};
use crate::typespec;

/// Command-line interface for gogen
///
/// One subcommand per generator plus `inspect` for looking at what the
/// scanner sees.
#[derive(Parser, Debug)]
#[command(name = "gogen")]
#[command(version, about = "Template-driven Go code generators", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// `--verbose` on whichever subcommand was given.
    pub fn verbose(&self) -> bool {
        self.command.scan_args().verbose
    }
}

/// Available gogen commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Functional options for a struct: `With<Type><Field>` constructors
    Option {
        #[command(flatten)]
        generate: GenerateArgs,

        /// Name constructors `With<Field>` instead of `With<Type><Field>`
        #[arg(long, default_value_t = false)]
        short: bool,

        /// Also write the hand-editable `<type>_options.config.go`
        #[arg(long, default_value_t = false)]
        scaffold: bool,
    },
    /// `Is<Field>` predicates and a validity check for tagged unions
    Union {
        #[command(flatten)]
        generate: GenerateArgs,
    },
    /// Typed wrapper around `sync.Map`: `--type 'Name<K, V>'`
    #[command(name = "syncmap")]
    SyncMap {
        #[command(flatten)]
        generate: GenerateArgs,
    },
    /// Typed wrapper around `atomic.Value`: `--type 'Name<V>'`
    #[command(name = "atomicvalue")]
    AtomicValue {
        #[command(flatten)]
        generate: GenerateArgs,
    },
    /// String, parse and codec methods for integer enums
    Enum {
        #[command(flatten)]
        generate: GenerateArgs,

        /// Prefix removed from constant names
        #[arg(long)]
        trimprefix: Option<String>,

        /// Use the trailing line comment of a constant as its name
        #[arg(long, default_value_t = false)]
        linecomment: bool,
    },
    /// Column lists and named statements for database structs
    Sqlx {
        #[command(flatten)]
        generate: GenerateArgs,

        /// Table name (default: snake_case of the type)
        #[arg(long)]
        table: Option<String>,

        /// Rewrite the source so every mapped field carries a `db` tag
        #[arg(long, default_value_t = false)]
        fill_tags: bool,
    },
    /// Print the scanned descriptors as JSON
    Inspect {
        #[command(flatten)]
        scan: ScanArgs,
    },
}

impl Commands {
    fn scan_args(&self) -> &ScanArgs {
        match self {
            Commands::Option { generate, .. }
            | Commands::Union { generate }
            | Commands::SyncMap { generate }
            | Commands::AtomicValue { generate }
            | Commands::Enum { generate, .. }
            | Commands::Sqlx { generate, .. } => &generate.scan,
            Commands::Inspect { scan } => scan,
        }
    }

    /// Command line recorded in the generated header.
    ///
    /// Only flags that change what gets generated are kept, so runs with
    /// `--verbose`, `--force`, `--dry-run`, `--gofmt`, `--output` or
    /// `--config` produce the same bytes.
    pub fn header_args(&self) -> Vec<String> {
        let (name, scan) = match self {
            Commands::Option { generate, .. } => ("option", &generate.scan),
            Commands::Union { generate } => ("union", &generate.scan),
            Commands::SyncMap { generate } => ("syncmap", &generate.scan),
            Commands::AtomicValue { generate } => ("atomicvalue", &generate.scan),
            Commands::Enum { generate, .. } => ("enum", &generate.scan),
            Commands::Sqlx { generate, .. } => ("sqlx", &generate.scan),
            Commands::Inspect { scan } => ("inspect", scan),
        };
        let mut args = vec![name.to_string(), "--type".to_string(), scan.type_spec.clone()];
        if !scan.tags.is_empty() {
            args.push("--tags".to_string());
            args.push(scan.tags.join(","));
        }
        if scan.unexported {
            args.push("--unexported".to_string());
        }
        match self {
            Commands::Option {
                short, scaffold, ..
            } => {
                if *short {
                    args.push("--short".to_string());
                }
                if *scaffold {
                    args.push("--scaffold".to_string());
                }
            }
            Commands::Enum {
                trimprefix,
                linecomment,
                ..
            } => {
                if let Some(prefix) = trimprefix {
                    args.push("--trimprefix".to_string());
                    args.push(prefix.clone());
                }
                if *linecomment {
                    args.push("--linecomment".to_string());
                }
            }
            Commands::Sqlx {
                table, fill_tags, ..
            } => {
                if let Some(table) = table {
                    args.push("--table".to_string());
                    args.push(table.clone());
                }
                if *fill_tags {
                    args.push("--fill-tags".to_string());
                }
            }
            _ => {}
        }
        args.extend(scan.patterns.iter().cloned());
        args
    }
}

/// Flags shared by every command that scans a package
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Types to generate for, e.g. `Pill` or `NumMap<int, time.Time>`
    #[arg(short = 't', long = "type", value_name = "SPEC")]
    pub type_spec: String,

    /// Extra build tags
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Include unexported fields
    #[arg(long, default_value_t = false)]
    pub unexported: bool,

    /// Path to gogen.toml (default: next to the package)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Package directory, Go files or glob patterns (default: `.`)
    pub patterns: Vec<String>,
}

/// Flags shared by every generator
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Output `.go` file (single type) or directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pipe generated files through gofmt
    #[arg(long, default_value_t = false)]
    pub gofmt: bool,

    /// Overwrite hand-edited scaffolds
    #[arg(short, long, default_value_t = false)]
    pub force: bool,

    /// Render and check everything, write nothing
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

/// Configuration file plus the resolved Go minor version.
struct Resolved {
    config: GogenConfig,
    go_minor: u32,
}

impl Resolved {
    fn load(scan: &ScanArgs) -> anyhow::Result<Self> {
        let dir = config::package_dir(&scan.patterns);
        let config = match config::resolve_config_path(scan.config.as_deref(), &dir)? {
            Some(path) => config::load_config(&path)?.unwrap_or_default(),
            None => GogenConfig::default(),
        };
        let version = match &config.go_version {
            Some(version) => version.clone(),
            None => config::detect_go_version(&dir)?
                .unwrap_or_else(|| config::DEFAULT_GO_VERSION.to_string()),
        };
        let go_minor = config::go_minor(&version).ok_or_else(|| {
            GenError::Usage(format!("unsupported Go version {version:?}"))
        })?;
        Ok(Resolved { config, go_minor })
    }

    fn scan_options(&self, scan: &ScanArgs) -> ScanOptions {
        let mut build_tags = self.config.tags.clone();
        build_tags.extend(scan.tags.iter().cloned());
        ScanOptions {
            build_tags,
            go_minor: self.go_minor,
            include_unexported: scan.unexported,
            fill_db_tags: false,
        }
    }

    fn request(&self, kind: GeneratorKind, args: &GenerateArgs) -> GenerationRequest {
        let mut request = GenerationRequest::new(
            kind,
            args.scan.type_spec.clone(),
            args.scan.patterns.clone(),
        );
        request.output = args.output.clone();
        request.scan = self.scan_options(&args.scan);
        request.settings.go_minor = self.go_minor;
        request.settings.short = self.config.option.short;
        request.settings.scaffold = self.config.option.scaffold;
        request.force = args.force;
        request.dry_run = args.dry_run;
        if args.gofmt || self.config.format.enabled {
            request.formatter = Some(Formatter::resolve(
                self.config.format.command.as_deref(),
                &self.config.format.args,
            ));
        }
        request
    }
}

/// Execute the CLI command provided by the user
///
/// # Errors
///
/// Configuration problems come back as plain `anyhow` errors; everything
/// the pipeline reports carries a [`GenError`] that the binary maps to an
/// exit code.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let resolved = Resolved::load(cli.command.scan_args())?;
    let (kind, mut request) = match &cli.command {
        Commands::Option {
            generate,
            short,
            scaffold,
        } => {
            let mut request = resolved.request(GeneratorKind::Option, generate);
            request.settings.short |= *short;
            request.settings.scaffold |= *scaffold;
            (GeneratorKind::Option, request)
        }
        Commands::Union { generate } => (
            GeneratorKind::Union,
            resolved.request(GeneratorKind::Union, generate),
        ),
        Commands::SyncMap { generate } => (
            GeneratorKind::SyncMap,
            resolved.request(GeneratorKind::SyncMap, generate),
        ),
        Commands::AtomicValue { generate } => (
            GeneratorKind::AtomicValue,
            resolved.request(GeneratorKind::AtomicValue, generate),
        ),
        Commands::Enum {
            generate,
            trimprefix,
            linecomment,
        } => {
            let mut request = resolved.request(GeneratorKind::Enum, generate);
            request.settings.trim_prefix = trimprefix.clone();
            request.settings.line_comment = *linecomment;
            (GeneratorKind::Enum, request)
        }
        Commands::Sqlx {
            generate,
            table,
            fill_tags,
        } => {
            let mut request = resolved.request(GeneratorKind::Sqlx, generate);
            request.settings.table = table.clone();
            request.scan.fill_db_tags = *fill_tags || resolved.config.sqlx.fill_tags;
            (GeneratorKind::Sqlx, request)
        }
        Commands::Inspect { scan } => return inspect(scan, &resolved),
    };
    request.args = cli.command.header_args();

    let report = generator::generate(&request)
        .with_context(|| format!("gogen {} failed", kind.name()))?;
    print_report(&report);
    Ok(())
}

fn inspect(scan: &ScanArgs, resolved: &Resolved) -> anyhow::Result<()> {
    if scan.type_spec.trim().is_empty() {
        return Err(GenError::NoTypes.into());
    }
    let specs = typespec::parse(&scan.type_spec)?;
    let result = scanner::scan(&scan.patterns, &specs, &resolved.scan_options(scan))?;
    let json = serde_json::to_string_pretty(&result).context("Failed to serialize scan result")?;
    println!("{json}");
    Ok(())
}

fn print_report(report: &GenerationReport) {
    for file in &report.files {
        let path = file.path.display();
        match (report.dry_run, file.outcome) {
            (true, EmitOutcome::Written) => println!("📄 Would write {path}"),
            (false, EmitOutcome::Written) => println!("✅ Wrote {path}"),
            (_, EmitOutcome::Unchanged) => println!("ℹ️  Unchanged {path}"),
        }
    }
}
