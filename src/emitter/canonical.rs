//! Text-level canonicalization of generated Go source.
//!
//! Templates may list every import a generator could need; this pass merges
//! all import declarations into one sorted block, drops the imports the
//! body never references and normalizes whitespace the way `gofmt` would
//! for the shapes the templates produce.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static IMPORT_SPEC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:([\p{L}_][\p{L}\p{N}_]*|\.)\s+)?("[^"]*"|`[^`]*`)\s*(?://.*)?$"#)
        .expect("import spec regex should be valid")
});

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ImportSpec {
    /// Third-party imports sort after the standard library
    third_party: bool,
    path: String,
    name: Option<String>,
}

impl ImportSpec {
    fn parse(line: &str) -> Option<Self> {
        let caps = IMPORT_SPEC.captures(line.trim())?;
        let quoted = caps.get(2)?.as_str();
        let path = quoted[1..quoted.len() - 1].to_string();
        let name = caps
            .get(1)
            .map(|m| m.as_str().to_string())
            .filter(|name| *name != default_name(&path));
        Some(ImportSpec {
            third_party: path.split('/').next().is_some_and(|first| first.contains('.')),
            path,
            name,
        })
    }

    /// Identifier the import binds in the file.
    fn local_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| default_name(&self.path))
    }

    fn is_used_in(&self, scrubbed_body: &str) -> bool {
        let name = self.local_name();
        if name == "_" || name == "." {
            return true;
        }
        let pattern = format!(r"(?:^|[^\p{{L}}\p{{N}}_.]){}\.", regex::escape(&name));
        Regex::new(&pattern).map_or(true, |re| re.is_match(scrubbed_body))
    }

    fn render(&self) -> String {
        match &self.name {
            Some(name) => format!("\t{name} \"{}\"", self.path),
            None => format!("\t\"{}\"", self.path),
        }
    }
}

/// Package name assumed for an import path: the last element, skipping a
/// `/vN` major version, without a `go-` prefix, cut at the first character
/// that cannot appear in an identifier.
pub fn default_name(path: &str) -> String {
    let mut segments = path.rsplit('/');
    let mut base = segments.next().unwrap_or(path);
    let is_major = base
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
    if is_major {
        if let Some(dir) = segments.next() {
            base = dir;
        }
    }
    let base = base.strip_prefix("go-").unwrap_or(base);
    base.chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Identifier an import line such as `json "encoding/json"` binds.
pub fn import_local_name(line: &str) -> Option<String> {
    ImportSpec::parse(line).map(|spec| spec.local_name())
}

/// Canonical form of `source`; see the module docs.
pub fn canonicalize(source: &str) -> String {
    let source = source.replace("\r\n", "\n");
    let (mut lines, imports, insert_at) = split_imports(&source);

    let body = lines.join("\n");
    let scrubbed = scrub(&body);
    let kept: BTreeSet<ImportSpec> = imports
        .into_iter()
        .filter(|spec| {
            let used = spec.is_used_in(&scrubbed);
            if !used {
                debug!(path = %spec.path, "pruned unused import");
            }
            used
        })
        .collect();

    if let Some(at) = insert_at.filter(|_| !kept.is_empty()) {
        let mut block = vec!["import (".to_string()];
        let mut previous_group = None;
        for spec in &kept {
            if previous_group.is_some_and(|third_party| third_party != spec.third_party) {
                block.push(String::new());
            }
            previous_group = Some(spec.third_party);
            block.push(spec.render());
        }
        block.push(")".to_string());
        lines.splice(at..at, block);
    }

    normalize_whitespace(&lines)
}

/// Remove every top-level import declaration.
///
/// Returns the remaining lines, the specs found and the line index where
/// the first declaration stood.
fn split_imports(source: &str) -> (Vec<String>, Vec<ImportSpec>, Option<usize>) {
    let mut lines = Vec::new();
    let mut specs = Vec::new();
    let mut insert_at = None;
    let mut in_group = false;

    for line in source.lines() {
        if in_group {
            let trimmed = line.trim();
            if trimmed == ")" {
                in_group = false;
            } else if !trimmed.is_empty() && !trimmed.starts_with("//") {
                specs.extend(ImportSpec::parse(trimmed));
            }
            continue;
        }
        let Some(rest) = line.strip_prefix("import") else {
            lines.push(line.to_string());
            continue;
        };
        if !rest.starts_with([' ', '\t', '(', '"', '`']) {
            lines.push(line.to_string());
            continue;
        }
        let rest = rest.trim();
        insert_at.get_or_insert(lines.len());
        match rest.strip_prefix('(') {
            Some(inner) => {
                let inner = inner.trim();
                if let Some(single) = inner.strip_suffix(')') {
                    specs.extend(ImportSpec::parse(single));
                } else {
                    in_group = true;
                    if !inner.is_empty() {
                        specs.extend(ImportSpec::parse(inner));
                    }
                }
            }
            None => specs.extend(ImportSpec::parse(rest)),
        }
    }

    (lines, specs, insert_at)
}

/// Blank out comments and literal contents, keeping line structure.
fn scrub(body: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        LineComment,
        BlockComment,
        Str,
        RawStr,
        Rune,
    }

    let mut out = String::with_capacity(body.len());
    let mut state = State::Code;
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = State::LineComment;
                    out.push_str("  ");
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                    out.push_str("  ");
                }
                '"' => {
                    state = State::Str;
                    out.push(c);
                }
                '`' => {
                    state = State::RawStr;
                    out.push(c);
                }
                '\'' => {
                    state = State::Rune;
                    out.push(c);
                }
                _ => out.push(c),
            },
            State::LineComment => {
                if c == '\n' {
                    state = State::Code;
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                    out.push_str("  ");
                } else {
                    out.push(if c == '\n' { '\n' } else { ' ' });
                }
            }
            State::Str | State::Rune => {
                let close = if state == State::Str { '"' } else { '\'' };
                if c == '\\' {
                    chars.next();
                    out.push_str("  ");
                } else if c == close || c == '\n' {
                    state = State::Code;
                    out.push(c);
                } else {
                    out.push(' ');
                }
            }
            State::RawStr => {
                if c == '`' {
                    state = State::Code;
                    out.push(c);
                } else {
                    out.push(if c == '\n' { '\n' } else { ' ' });
                }
            }
        }
    }
    out
}

/// Tabs for leading 4-space groups, no trailing blanks, single blank
/// lines, no leading blank lines and exactly one trailing newline.
fn normalize_whitespace(lines: &[String]) -> String {
    let mut out = String::new();
    let mut previous_blank = true;
    for line in lines {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            if !previous_blank {
                out.push('\n');
            }
            previous_blank = true;
            continue;
        }
        let content = trimmed.trim_start_matches([' ', '\t']);
        let indent = &trimmed[..trimmed.len() - content.len()];
        out.push_str(&indent.replace("    ", "\t"));
        out.push_str(content);
        out.push('\n');
        previous_blank = false;
    }
    while out.ends_with("\n\n") {
        out.pop();
    }
    if out.is_empty() {
        out.push('\n');
    }
    out
}
