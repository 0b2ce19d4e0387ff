//! # Emitter
//!
//! Canonicalizes generated source, optionally pipes it through an external
//! formatter and writes it under an [`OverwritePolicy`].
//!
//! Writing is split in two steps so a run can check every output for
//! conflicts before touching the disk: [`Emitter::plan`] reads the existing
//! file and decides the outcome, [`PlannedFile::commit`] performs the write.

pub mod canonical;
pub mod format;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{GenError, Result};

pub use canonical::canonicalize;
pub use format::Formatter;

/// What to do when the output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwritePolicy {
    /// Replace whatever is there.
    Always,
    /// Only write when the file is missing or already identical.
    RefuseIfDifferent,
}

impl OverwritePolicy {
    /// `--force` downgrades every policy to [`OverwritePolicy::Always`].
    pub fn forced(self, force: bool) -> Self {
        if force {
            OverwritePolicy::Always
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitOutcome {
    Written,
    /// Existing bytes already match; the file was left alone.
    Unchanged,
}

/// A checked, ready-to-write output.
#[derive(Debug, Clone)]
pub struct PlannedFile {
    pub path: PathBuf,
    pub content: String,
    pub outcome: EmitOutcome,
}

impl PlannedFile {
    /// Write the file when the plan says so.
    pub fn commit(&self) -> Result<EmitOutcome> {
        if self.outcome == EmitOutcome::Unchanged {
            warn!(path = %self.path.display(), "output unchanged, skipping write");
            return Ok(EmitOutcome::Unchanged);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| GenError::io(parent, e))?;
        }
        fs::write(&self.path, &self.content).map_err(|e| GenError::io(&self.path, e))?;
        info!(path = %self.path.display(), bytes = self.content.len(), "wrote file");
        Ok(EmitOutcome::Written)
    }
}

/// Canonicalization plus the optional external formatter.
#[derive(Debug, Clone, Default)]
pub struct Emitter {
    formatter: Option<Formatter>,
}

impl Emitter {
    pub fn new(formatter: Option<Formatter>) -> Self {
        Emitter { formatter }
    }

    /// Canonical (and formatted, when enabled) form of generated `source`.
    pub fn finish(&self, source: &str, path: &Path) -> Result<String> {
        let canonical = canonicalize(source);
        match &self.formatter {
            Some(formatter) => formatter.format(&canonical, path),
            None => Ok(canonical),
        }
    }

    /// Finish generated `source` and check it against the file at `path`.
    pub fn plan(&self, source: &str, path: &Path, policy: OverwritePolicy) -> Result<PlannedFile> {
        let content = self.finish(source, path)?;
        plan_verbatim(content, path, policy)
    }

    /// Finish, check and write in one step.
    pub fn emit(&self, source: &str, path: &Path, policy: OverwritePolicy) -> Result<EmitOutcome> {
        self.plan(source, path, policy)?.commit()
    }
}

/// Check `content` against the file at `path` without touching the text.
///
/// Used for rewritten input sources, which keep their own formatting.
pub fn plan_verbatim(content: String, path: &Path, policy: OverwritePolicy) -> Result<PlannedFile> {
    let existing = match fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(GenError::io(path, e)),
    };
    let outcome = match existing {
        Some(bytes) if bytes == content.as_bytes() => EmitOutcome::Unchanged,
        Some(_) if policy == OverwritePolicy::RefuseIfDifferent => {
            return Err(GenError::Conflict {
                path: path.to_path_buf(),
            })
        }
        _ => EmitOutcome::Written,
    };
    Ok(PlannedFile {
        path: path.to_path_buf(),
        content,
        outcome,
    })
}

/// `<lower(type)>_<suffix>.go`, e.g. `config_options.go`.
pub fn output_file_name(type_name: &str, suffix: &str) -> String {
    format!("{}_{}.go", type_name.to_lowercase(), suffix)
}
