use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{GenError, Result};

/// Environment variable overriding the formatter binary.
pub const GOFMT_BIN_ENV: &str = "GOGEN_GOFMT_BIN";

/// An external Go formatter fed through stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    pub command: String,
    pub args: Vec<String>,
}

impl Default for Formatter {
    fn default() -> Self {
        Formatter {
            command: "gofmt".to_string(),
            args: Vec::new(),
        }
    }
}

impl Formatter {
    /// `command` (or `gofmt`), unless `GOGEN_GOFMT_BIN` names another binary.
    pub fn resolve(command: Option<&str>, args: &[String]) -> Self {
        // Allow tests to override the formatter path without mutating PATH
        let command = std::env::var(GOFMT_BIN_ENV)
            .ok()
            .or_else(|| command.map(str::to_string))
            .unwrap_or_else(|| "gofmt".to_string());
        Formatter {
            command,
            args: args.to_vec(),
        }
    }

    /// Pipe `source` through the formatter and return its stdout.
    ///
    /// `path` only labels errors; the file is never touched.
    pub fn format(&self, source: &str, path: &Path) -> Result<String> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GenError::io(&self.command, e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| GenError::io(&self.command, std::io::Error::other("stdin not captured")))?;
        let input = source.as_bytes().to_vec();
        // Feed stdin from a thread so a full stdout pipe cannot deadlock us.
        let writer = std::thread::spawn(move || stdin.write_all(&input));

        let output = child
            .wait_with_output()
            .map_err(|e| GenError::io(&self.command, e))?;
        let written = writer
            .join()
            .map_err(|_| GenError::io(&self.command, std::io::Error::other("stdin writer panicked")))?;

        if !output.status.success() {
            return Err(GenError::Format {
                path: path.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written.map_err(|e| GenError::io(&self.command, e))?;

        debug!(command = %self.command, path = %path.display(), "formatted output");
        String::from_utf8(output.stdout).map_err(|e| GenError::Format {
            path: path.to_path_buf(),
            message: format!("formatter produced invalid UTF-8: {e}"),
        })
    }
}
