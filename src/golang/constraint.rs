//! Build constraints: `//go:build` lines, legacy `// +build` lines and
//! `_GOOS_GOARCH` file name suffixes.

use std::collections::BTreeSet;

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

/// Target a package is loaded for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub goos: String,
    pub goarch: String,
    /// Extra tags from `--tags`
    pub tags: BTreeSet<String>,
    /// Minor Go version; every `go1.N` tag with `N <= go_minor` is satisfied
    pub go_minor: u32,
}

impl BuildContext {
    /// Context for the machine running the generator.
    pub fn host(tags: impl IntoIterator<Item = String>, go_minor: u32) -> Self {
        let goos = match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        };
        let goarch = match std::env::consts::ARCH {
            "x86_64" => "amd64",
            "x86" => "386",
            "aarch64" => "arm64",
            "powerpc64" => "ppc64",
            "loongarch64" => "loong64",
            other => other,
        };
        BuildContext {
            goos: goos.to_string(),
            goarch: goarch.to_string(),
            tags: tags.into_iter().collect(),
            go_minor,
        }
    }

    /// Whether a single build tag is satisfied.
    pub fn matches_tag(&self, tag: &str) -> bool {
        if self.tags.contains(tag) || tag == self.goos || tag == self.goarch || tag == "gc" {
            return true;
        }
        match tag {
            "unix" => UNIX_OS.contains(&self.goos.as_str()),
            "linux" => self.goos == "android",
            "darwin" => self.goos == "ios",
            "solaris" => self.goos == "illumos",
            _ => tag
                .strip_prefix("go1.")
                .and_then(|minor| minor.parse::<u32>().ok())
                .is_some_and(|minor| minor <= self.go_minor),
        }
    }

    /// Whether `file_name` passes its `_GOOS`/`_GOARCH` suffix.
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        let stem = file_name.strip_suffix(".go").unwrap_or(file_name);
        let parts: Vec<&str> = stem.split('_').collect();
        // The first element is never a constraint: `linux.go` applies everywhere.
        let parts = match parts.split_first() {
            Some((_, rest)) => rest,
            None => return true,
        };
        let n = parts.len();
        if n >= 2 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1]) {
            return self.matches_tag(parts[n - 2]) && self.matches_tag(parts[n - 1]);
        }
        match parts.last() {
            Some(last) if KNOWN_OS.contains(last) || KNOWN_ARCH.contains(last) => {
                self.matches_tag(last)
            }
            _ => true,
        }
    }

    /// Whether a file's header constraints accept it.
    ///
    /// `//go:build` wins over `// +build` lines when both are present.
    pub fn matches_source(&self, src: &str) -> Result<bool, String> {
        let mut go_build = None;
        let mut plus_build = Vec::new();
        let mut in_block_comment = false;

        for line in src.lines() {
            let line = line.trim();
            if in_block_comment {
                if line.contains("*/") {
                    in_block_comment = false;
                }
                continue;
            }
            if line.is_empty() {
                continue;
            }
            if line.starts_with("/*") {
                in_block_comment = !line.contains("*/");
                continue;
            }
            let Some(comment) = line.strip_prefix("//") else {
                break;
            };
            if let Some(expr) = comment.strip_prefix("go:build") {
                if go_build.is_some() {
                    return Err("multiple //go:build lines".to_string());
                }
                go_build = Some(expr.trim().to_string());
            } else if let Some(expr) = comment.trim_start().strip_prefix("+build") {
                plus_build.push(expr.trim().to_string());
            }
        }

        if let Some(expr) = go_build {
            return self.eval_expr(&expr);
        }
        Ok(plus_build.iter().all(|line| self.eval_plus_build(line)))
    }

    /// `// +build a,b c` means `(a && b) || c`; `!` negates a term.
    fn eval_plus_build(&self, line: &str) -> bool {
        line.split_whitespace().any(|alternative| {
            alternative.split(',').all(|term| match term.strip_prefix('!') {
                Some(tag) => !self.matches_tag(tag),
                None => self.matches_tag(term),
            })
        })
    }

    /// Evaluate a `//go:build` boolean expression.
    pub fn eval_expr(&self, expr: &str) -> Result<bool, String> {
        let tokens = expr_tokens(expr)?;
        let mut parser = ConstraintParser {
            ctx: self,
            tokens: &tokens,
            pos: 0,
        };
        let value = parser.or()?;
        if parser.pos != tokens.len() {
            return Err(format!("unexpected {:?} in build constraint", tokens[parser.pos]));
        }
        Ok(value)
    }
}

fn expr_tokens(expr: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '(' | ')' | '!' => {
                tokens.push(c.to_string());
                chars.next();
            }
            '&' | '|' => {
                chars.next();
                if chars.next() != Some(c) {
                    return Err(format!("invalid operator {c:?} in build constraint"));
                }
                tokens.push(format!("{c}{c}"));
            }
            c if c.is_alphanumeric() || c == '_' || c == '.' => {
                let mut tag = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '.' {
                        tag.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(tag);
            }
            other => return Err(format!("invalid character {other:?} in build constraint")),
        }
    }
    Ok(tokens)
}

struct ConstraintParser<'c> {
    ctx: &'c BuildContext,
    tokens: &'c [String],
    pos: usize,
}

impl<'c> ConstraintParser<'c> {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn or(&mut self) -> Result<bool, String> {
        let mut value = self.and()?;
        while self.peek() == Some("||") {
            self.pos += 1;
            let rhs = self.and()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn and(&mut self) -> Result<bool, String> {
        let mut value = self.not()?;
        while self.peek() == Some("&&") {
            self.pos += 1;
            let rhs = self.not()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn not(&mut self) -> Result<bool, String> {
        match self.peek() {
            Some("!") => {
                self.pos += 1;
                Ok(!self.not()?)
            }
            Some("(") => {
                self.pos += 1;
                let value = self.or()?;
                if self.peek() != Some(")") {
                    return Err("missing ')' in build constraint".to_string());
                }
                self.pos += 1;
                Ok(value)
            }
            Some(tag) if !matches!(tag, ")" | "&&" | "||") => {
                let value = self.ctx.matches_tag(tag);
                self.pos += 1;
                Ok(value)
            }
            _ => Err("unexpected end of build constraint".to_string()),
        }
    }
}
