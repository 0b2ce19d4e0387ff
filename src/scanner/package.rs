//! Pattern resolution and package loading.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{GenError, Result};
use crate::golang::{self, BuildContext};

/// A `.go` file that passed build constraints, with its parsed declarations.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub source: String,
    pub ast: golang::File,
}

/// All files of one Go package.
#[derive(Debug, Clone)]
pub struct Package {
    pub dir: PathBuf,
    pub name: String,
    pub files: Vec<LoadedFile>,
}

impl Package {
    /// Stable identifier used as the type shape cache namespace.
    pub fn id(&self) -> String {
        let dir = fs::canonicalize(&self.dir).unwrap_or_else(|_| self.dir.clone());
        format!("{}#{}", dir.display(), self.name)
    }

    /// Re-parse `source` as the new content of the file at `index`.
    pub(crate) fn replace_source(&mut self, index: usize, source: String) -> Result<()> {
        let file = &mut self.files[index];
        file.ast = golang::parse_file(&source)
            .map_err(|err| GenError::load(&file.path, err.line, err.message))?;
        file.source = source;
        Ok(())
    }
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

fn is_go_source(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".go") && !n.ends_with("_test.go"))
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Expand patterns into the package directory and its candidate files.
///
/// An empty list means the current directory. A single directory lists its
/// `.go` files; otherwise every pattern is a file or a glob and all matches
/// must share one directory.
pub fn resolve(patterns: &[String]) -> Result<(PathBuf, Vec<PathBuf>)> {
    let patterns: Vec<String> = if patterns.is_empty() {
        vec![".".to_string()]
    } else {
        patterns.to_vec()
    };

    if let [single] = patterns.as_slice() {
        let dir = Path::new(single);
        if dir.is_dir() {
            let entries = fs::read_dir(dir).map_err(|e| GenError::io(dir, e))?;
            let mut files = Vec::new();
            for entry in entries {
                let path = entry.map_err(|e| GenError::io(dir, e))?.path();
                if path.is_file() && is_go_source(&path) {
                    files.push(path);
                }
            }
            files.sort();
            if files.is_empty() {
                return Err(GenError::load(dir, 0, "no Go files in directory"));
            }
            return Ok((dir.to_path_buf(), files));
        }
    }

    let mut files = BTreeSet::new();
    for pattern in &patterns {
        if is_glob(pattern) {
            let matches = glob::glob(pattern)
                .map_err(|e| GenError::Usage(format!("invalid pattern {pattern:?}: {e}")))?;
            for entry in matches {
                let path = entry.map_err(|e| GenError::io(e.path().to_path_buf(), e.into_error()))?;
                if is_go_source(&path) {
                    files.insert(path);
                }
            }
            continue;
        }
        let path = PathBuf::from(pattern);
        if path.is_dir() {
            return Err(GenError::Usage(format!(
                "directory {pattern:?} cannot be combined with other patterns"
            )));
        }
        if !path.exists() {
            return Err(GenError::load(&path, 0, "no such file"));
        }
        if !pattern.ends_with(".go") {
            return Err(GenError::load(&path, 0, "not a Go source file"));
        }
        files.insert(path);
    }

    let dirs: BTreeSet<PathBuf> = files.iter().map(|f| parent_dir(f)).collect();
    if dirs.len() > 1 {
        return Err(GenError::AmbiguousPackage {
            packages: dirs.iter().map(|d| d.display().to_string()).collect(),
        });
    }
    match dirs.into_iter().next() {
        Some(dir) => Ok((dir, files.into_iter().collect())),
        None => Err(GenError::load(
            patterns.join(" "),
            0,
            "patterns matched no Go files",
        )),
    }
}

/// Resolve, filter and parse the package named by `patterns`.
pub fn load(patterns: &[String], ctx: &BuildContext) -> Result<Package> {
    let (dir, candidates) = resolve(patterns)?;
    let mut files = Vec::new();

    for path in candidates {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        if !ctx.matches_file_name(&file_name) {
            debug!(file = %path.display(), "excluded by file name suffix");
            continue;
        }
        let source = fs::read_to_string(&path).map_err(|e| GenError::io(&path, e))?;
        let included = ctx
            .matches_source(&source)
            .map_err(|message| GenError::load(&path, 1, message))?;
        if !included {
            debug!(file = %path.display(), "excluded by build constraint");
            continue;
        }
        let ast = golang::parse_file(&source)
            .map_err(|err| GenError::load(&path, err.line, err.message))?;
        debug!(file = %path.display(), package = %ast.package, types = ast.types.len(), "parsed file");
        files.push(LoadedFile { path, source, ast });
    }

    if files.is_empty() {
        return Err(GenError::load(&dir, 0, "build constraints exclude all Go files"));
    }

    let names: BTreeSet<&str> = files.iter().map(|f| f.ast.package.as_str()).collect();
    if names.len() > 1 {
        return Err(GenError::AmbiguousPackage {
            packages: names.into_iter().map(str::to_string).collect(),
        });
    }
    let name = files[0].ast.package.clone();

    Ok(Package { dir, name, files })
}
