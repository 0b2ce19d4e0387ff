//! Optional `gogen.toml` configuration
//!
//! Sits next to the scanned Go package and provides defaults that command
//! line flags override:
//!
//! ```toml
//! go_version = "1.21"
//! tags = ["integration"]
//!
//! [format]
//! enabled = true
//! command = "gofmt"
//! args = ["-s"]
//!
//! [option]
//! short = false
//! scaffold = false
//!
//! [sqlx]
//! fill_tags = false
//! ```

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up next to the package.
pub const CONFIG_FILE_NAME: &str = "gogen.toml";

/// Go release assumed when neither the config nor a `go.mod` names one.
pub const DEFAULT_GO_VERSION: &str = "1.18";

static GO_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^go\s+(\d+\.\d+(?:\.\d+)?)\s*(?://.*)?$")
        .expect("go directive regex should be valid")
});

/// Configuration loaded from `gogen.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GogenConfig {
    /// Target Go release, e.g. "1.21"
    #[serde(default)]
    pub go_version: Option<String>,

    /// Build tags applied to every scan
    #[serde(default)]
    pub tags: Vec<String>,

    /// External formatter settings
    #[serde(default)]
    pub format: FormatConfig,

    /// Defaults for the option generator
    #[serde(default)]
    pub option: OptionConfig,

    /// Defaults for the sqlx generator
    #[serde(default)]
    pub sqlx: SqlxConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FormatConfig {
    /// Pipe generated files through the formatter
    #[serde(default)]
    pub enabled: bool,
    /// Formatter binary, `gofmt` when unset
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct OptionConfig {
    #[serde(default)]
    pub short: bool,
    #[serde(default)]
    pub scaffold: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SqlxConfig {
    #[serde(default)]
    pub fill_tags: bool,
}

/// Load configuration from a TOML file
///
/// Returns `Ok(Some(config))` if the file exists and parses,
/// `Ok(None)` if it doesn't exist (not an error),
/// `Err` if it exists but fails to read or parse.
pub fn load_config(config_path: &Path) -> anyhow::Result<Option<GogenConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read gogen config: {}", config_path.display()))?;

    let config: GogenConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse gogen config: {}", config_path.display()))?;

    Ok(Some(config))
}

/// Directory of the package named by `patterns`, without touching the disk
/// beyond `is_dir`.
pub fn package_dir(patterns: &[String]) -> PathBuf {
    let Some(first) = patterns.first() else {
        return PathBuf::from(".");
    };
    let path = Path::new(first);
    if path.is_dir() {
        return path.to_path_buf();
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Resolve the config path
///
/// Priority:
/// 1. Explicitly provided path (via `--config`), which must exist
/// 2. `gogen.toml` in the package directory
/// 3. None (no config)
pub fn resolve_config_path(
    explicit_path: Option<&Path>,
    package_dir: &Path,
) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = explicit_path {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }
    let auto = package_dir.join(CONFIG_FILE_NAME);
    Ok(auto.exists().then_some(auto))
}

/// Go version from the `go` directive of the nearest `go.mod` at or above
/// `dir`.
pub fn detect_go_version(dir: &Path) -> anyhow::Result<Option<String>> {
    let start = std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    for ancestor in start.ancestors() {
        let go_mod = ancestor.join("go.mod");
        if !go_mod.is_file() {
            continue;
        }
        let contents = std::fs::read_to_string(&go_mod)
            .with_context(|| format!("Failed to read {}", go_mod.display()))?;
        return Ok(GO_DIRECTIVE
            .captures(&contents)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()));
    }
    Ok(None)
}

/// Minor release number of a Go version: `1.21.3` and `go1.21` give 21.
pub fn go_minor(version: &str) -> Option<u32> {
    let version = version.trim();
    let version = version.strip_prefix("go").unwrap_or(version);
    let mut parts = version.split('.');
    if parts.next()? != "1" {
        return None;
    }
    parts.next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::fs;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join(CONFIG_FILE_NAME)).unwrap().is_none());
        assert!(resolve_config_path(None, dir.path()).unwrap().is_none());
        assert!(resolve_config_path(Some(&dir.path().join("nope.toml")), dir.path()).is_err());
    }

    #[test]
    fn test_load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            "go_version = \"1.21\"\ntags = [\"integration\"]\n\n[format]\nenabled = true\nargs = [\"-s\"]\n\n[option]\nshort = true\n\n[sqlx]\nfill_tags = true\n",
        )
        .unwrap();

        assert_eq!(
            resolve_config_path(None, dir.path()).unwrap(),
            Some(path.clone())
        );
        let config = load_config(&path).unwrap().unwrap();
        assert_eq!(config.go_version.as_deref(), Some("1.21"));
        assert_eq!(config.tags, vec!["integration".to_string()]);
        assert!(config.format.enabled);
        assert_eq!(config.format.command, None);
        assert_eq!(config.format.args, vec!["-s".to_string()]);
        assert!(config.option.short);
        assert!(!config.option.scaffold);
        assert!(config.sqlx.fill_tags);
    }

    #[test]
    fn test_invalid_config_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "go_version = [\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse gogen config"));
    }

    #[test]
    fn test_go_version_from_parent_go_mod() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("go.mod"),
            "module example.com/pill\n\ngo 1.21.3 // toolchain\n\nrequire golang.org/x/tools v0.20.0\n",
        )
        .unwrap();
        let pkg = dir.path().join("internal/pill");
        fs::create_dir_all(&pkg).unwrap();
        assert_eq!(detect_go_version(&pkg).unwrap().as_deref(), Some("1.21.3"));
    }

    #[test]
    fn test_go_minor() {
        assert_eq!(go_minor("1.21.3"), Some(21));
        assert_eq!(go_minor("go1.18"), Some(18));
        assert_eq!(go_minor(DEFAULT_GO_VERSION), Some(18));
        assert_eq!(go_minor("2.0"), None);
        assert_eq!(go_minor("1"), None);
    }

    #[test]
    fn test_package_dir() {
        let dir = tempfile::tempdir().unwrap();
        let dir_pattern = dir.path().display().to_string();
        assert_eq!(package_dir(&[dir_pattern]), dir.path());
        assert_eq!(
            package_dir(&["pkg/a.go".to_string()]),
            PathBuf::from("pkg")
        );
        assert_eq!(package_dir(&["*.go".to_string()]), PathBuf::from("."));
        assert_eq!(package_dir(&[]), PathBuf::from("."));
    }
}
