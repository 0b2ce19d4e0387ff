//! # gogen
//!
//! **gogen** generates Go helper code from declarations in a Go package:
//! functional options, union predicates, typed `sync.Map` and
//! `atomic.Value` wrappers, enum string/codec methods and `sqlx` column
//! helpers.
//!
//! ## Architecture
//!
//! A run is a straight pipeline; every stage returns
//! [`error::GenError`] and nothing touches the disk until the last step.
//!
//! - **[`typespec`]** - parses `--type` values such as `NumMap<int, *time.Time>`
//! - **[`golang`]** - Go lexer, declaration parser, build constraints and
//!   constant evaluation
//! - **[`scanner`]** - loads one package and describes the requested types
//! - **[`render`]** - embedded `minijinja` templates for every generator
//! - **[`generator`]** - per-generator template data and the run driver
//! - **[`emitter`]** - import canonicalization, optional gofmt, overwrite
//!   policy and writing
//!
//! Around it sit [`config`] (`gogen.toml`), [`logging`] (`tracing`
//! subscriber setup) and [`cli`] (the `gogen` binary).
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI as CLI<br/>(gogen)
//!     participant TS as typespec::parse
//!     participant Scan as scanner::scan
//!     participant Gen as Generator::render
//!     participant Emit as emitter
//!     participant FS as File System
//!
//!     CLI->>TS: --type "Pill<int>"
//!     TS-->>CLI: Vec<TypeSpec>
//!     CLI->>Scan: patterns, specs
//!     Scan->>FS: read *.go (build constraints applied)
//!     Scan-->>CLI: Vec<ScannedType>
//!     CLI->>Gen: render each type
//!     Gen-->>CLI: Vec<Rendered>
//!     CLI->>Emit: plan every output
//!     Emit->>Emit: canonicalize imports, gofmt, conflict check
//!     Emit->>FS: commit (unless --dry-run)
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use gogen::generator::{generate, GenerationRequest, GeneratorKind};
//!
//! let request = GenerationRequest::new(GeneratorKind::Option, "Config", vec!["./pkg".into()]);
//! let report = generate(&request)?;
//! for file in report.files {
//!     println!("{} {:?}", file.path.display(), file.outcome);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod emitter;
pub mod error;
pub mod generator;
pub mod golang;
pub mod logging;
pub mod naming;
pub mod render;
pub mod scanner;
pub mod structtag;
pub mod typespec;

pub use error::{GenError, Result};
pub use generator::{generate, GenerationReport, GenerationRequest, GeneratorKind};
pub use scanner::{scan, ScanOptions, ScanResult};
pub use typespec::TypeSpec;
