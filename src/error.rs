//! Error taxonomy shared by every pipeline stage.
//!
//! Library functions return [`GenError`]; the `gogen` binary wraps it in
//! `anyhow` for context and maps each variant to an exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T, E = GenError> = std::result::Result<T, E>;

/// Every fatal condition a generation run can hit.
#[derive(Debug, Error)]
pub enum GenError {
    /// Bad or inconsistent command line flags.
    #[error("usage: {0}")]
    Usage(String),

    /// `--type` was given but names no type.
    #[error("no types parsed from --type")]
    NoTypes,

    /// Malformed `--type` specification.
    #[error("syntax error in type spec {input:?} at column {column}: {message}")]
    Syntax {
        /// The full spec string being parsed
        input: String,
        /// 1-based column of the offending character
        column: usize,
        /// What went wrong
        message: String,
    },

    /// A package file could not be read, parsed or evaluated.
    #[error("failed to load {}:{line}: {message}", path.display())]
    Load {
        /// Offending file (or directory when no file applies)
        path: PathBuf,
        /// 1-based line, 0 when unknown
        line: usize,
        /// What went wrong
        message: String,
    },

    /// The patterns resolved to more than one package.
    #[error("patterns resolve to more than one package: {}", packages.join(", "))]
    AmbiguousPackage {
        /// Directory or package names found
        packages: Vec<String>,
    },

    /// A requested type has no declaration in the scanned package.
    #[error("type {type_name} not found in package {package}")]
    NotFound {
        /// Requested type name
        type_name: String,
        /// Package that was scanned
        package: String,
    },

    /// An embedded template failed to compile or render.
    #[error("template {name} failed: {source}")]
    Template {
        /// Template name
        name: String,
        /// Underlying template engine error
        #[source]
        source: minijinja::Error,
    },

    /// The external formatter rejected generated source.
    #[error("formatting {} failed: {message}", path.display())]
    Format {
        /// Output the source was meant for
        path: PathBuf,
        /// Formatter diagnostics
        message: String,
    },

    /// The output exists with different content and may not be overwritten.
    #[error("{} already exists and differs from the generated content; delete or merge it, or pass --force", path.display())]
    Conflict {
        /// The conflicting output path
        path: PathBuf,
    },

    /// File system failure.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl GenError {
    pub(crate) fn load(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        GenError::Load {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error.
    ///
    /// `2` for flag errors, `3` when `--type` names nothing, `1` otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            GenError::Usage(_) => 2,
            GenError::NoTypes => 3,
            _ => 1,
        }
    }
}
