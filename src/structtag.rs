//! Parsed form of a Go struct tag: `json:"foo,omitempty" db:"foo"`.
//!
//! Keys keep their source order; [`StructTag::sort`] normalizes it. Printing
//! a parsed tag and parsing it again yields an equal value.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Reasons a raw tag string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    /// Missing, empty or malformed key
    #[error("bad syntax for struct tag key at byte {0}")]
    KeySyntax(usize),
    /// Missing quote, unterminated or malformed value
    #[error("bad syntax for struct tag value of key {0:?}")]
    ValueSyntax(String),
    /// The same key appears twice
    #[error("duplicate struct tag key {0:?}")]
    DuplicateKey(String),
    /// `json`/`xml` values may not contain spaces
    #[error("struct tag value of key {0:?} must not contain spaces")]
    EmbeddedSpace(String),
}

/// One `key:"name,opt1,opt2"` entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Tag {
    /// Tag key, e.g. `json`
    pub key: String,
    /// First comma separated element of the value
    pub name: String,
    /// Remaining comma separated elements, in order
    pub options: Vec<String>,
}

impl Tag {
    /// Build a tag from its parts.
    pub fn new(key: impl Into<String>, name: impl Into<String>, options: &[&str]) -> Self {
        Tag {
            key: key.into(),
            name: name.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    /// The unquoted value: name and options joined with commas.
    pub fn value(&self) -> String {
        std::iter::once(self.name.as_str())
            .chain(self.options.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// `true` when `option` is one of the options.
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    /// `true` for the conventional "skip this field" marker.
    pub fn is_ignored(&self) -> bool {
        self.name == "-" && self.options.is_empty()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, quote(&self.value()))
    }
}

/// Ordered collection of [`Tag`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StructTag {
    tags: Vec<Tag>,
}

impl StructTag {
    /// Parse the unquoted content of a struct tag literal.
    ///
    /// # Errors
    ///
    /// Returns a [`TagError`] on malformed keys or values, duplicate keys, or
    /// spaces inside `json`/`xml` values.
    pub fn parse(raw: &str) -> Result<Self, TagError> {
        let bytes = raw.as_bytes();
        let mut tags = StructTag::default();
        let mut i = 0;

        loop {
            while i < bytes.len() && bytes[i] == b' ' {
                i += 1;
            }
            if i >= bytes.len() {
                break;
            }

            let key_start = i;
            while i < bytes.len()
                && bytes[i] > b' '
                && bytes[i] != b':'
                && bytes[i] != b'"'
                && bytes[i] != 0x7f
            {
                i += 1;
            }
            if i == key_start || i + 1 >= bytes.len() || bytes[i] != b':' {
                return Err(TagError::KeySyntax(key_start));
            }
            let key = &raw[key_start..i];
            i += 1;
            if bytes[i] != b'"' {
                return Err(TagError::ValueSyntax(key.to_string()));
            }

            let value_start = i;
            i += 1;
            while i < bytes.len() && bytes[i] != b'"' {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            if i >= bytes.len() {
                return Err(TagError::ValueSyntax(key.to_string()));
            }
            let quoted = &raw[value_start..=i];
            i += 1;

            let value = unquote(quoted).ok_or_else(|| TagError::ValueSyntax(key.to_string()))?;
            if matches!(key, "json" | "xml") && value.contains(' ') {
                return Err(TagError::EmbeddedSpace(key.to_string()));
            }
            if tags.get(key).is_some() {
                return Err(TagError::DuplicateKey(key.to_string()));
            }

            let mut parts = value.split(',');
            let name = parts.next().unwrap_or_default().to_string();
            tags.tags.push(Tag {
                key: key.to_string(),
                name,
                options: parts.map(str::to_string).collect(),
            });
        }

        Ok(tags)
    }

    /// Tag for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.key == key)
    }

    /// Insert `tag`, replacing an existing entry with the same key in place.
    pub fn set(&mut self, tag: Tag) {
        match self.tags.iter_mut().find(|t| t.key == tag.key) {
            Some(existing) => *existing = tag,
            None => self.tags.push(tag),
        }
    }

    /// Remove the entries for `keys`.
    pub fn delete(&mut self, keys: &[&str]) {
        self.tags.retain(|t| !keys.contains(&t.key.as_str()));
    }

    /// Keys in their current order.
    pub fn keys(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.key.as_str()).collect()
    }

    /// All entries in their current order.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Normalize key order alphabetically.
    pub fn sort(&mut self) {
        self.tags.sort_by(|a, b| a.key.cmp(&b.key));
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// `true` when the tag has no entries.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// The tag as a Go source literal, preferring a raw string.
    pub fn to_go_literal(&self) -> String {
        let content = self.to_string();
        if content.contains('`') {
            quote(&content)
        } else {
            format!("`{content}`")
        }
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, tag) in self.tags.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{tag}")?;
        }
        Ok(())
    }
}

/// Go `strconv.Quote` for the characters a tag value can carry.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Go `strconv.Unquote` for interpreted (double quoted) string literals.
pub fn unquote(quoted: &str) -> Option<String> {
    let inner = quoted.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' | '\n' => return None,
            '\\' => {
                let escaped = chars.next()?;
                let decoded = match escaped {
                    'a' => '\x07',
                    'b' => '\x08',
                    'f' => '\x0c',
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    'v' => '\x0b',
                    '\\' => '\\',
                    '"' => '"',
                    '\'' => '\'',
                    'x' => hex_char(&mut chars, 2)?,
                    'u' => hex_char(&mut chars, 4)?,
                    'U' => hex_char(&mut chars, 8)?,
                    d @ '0'..='7' => {
                        let mut code = d.to_digit(8)?;
                        for _ in 0..2 {
                            code = code * 8 + chars.next()?.to_digit(8)?;
                        }
                        char::from_u32(code)?
                    }
                    _ => return None,
                };
                out.push(decoded);
            }
            c => out.push(c),
        }
    }
    Some(out)
}

fn hex_char(chars: &mut impl Iterator<Item = char>, digits: usize) -> Option<char> {
    let mut code = 0u32;
    for _ in 0..digits {
        code = code * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(code)
}
