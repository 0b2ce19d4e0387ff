//! Character scanner that splits a spec string on top-level commas.
//!
//! `<`/`>` delimit generic parameter lists. `[]`, `()` and `{}` only nest so
//! that commas inside `map[K]V`, `func(a, b int)` or `interface{}` never
//! split an entry. Channel arrows (`<-chan T`, `chan<- T`) are not openers.

use crate::error::{GenError, Result};

/// A slice of the original input together with its byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment<'a> {
    pub text: &'a str,
    pub offset: usize,
}

impl<'a> Segment<'a> {
    pub(crate) fn new(text: &'a str, offset: usize) -> Self {
        Segment { text, offset }
    }

    /// Strip surrounding whitespace, keeping the offset aligned.
    pub(crate) fn trim(self) -> Self {
        let leading = self.text.len() - self.text.trim_start().len();
        Segment {
            text: self.text.trim(),
            offset: self.offset + leading,
        }
    }

    pub(crate) fn slice(self, start: usize, end: usize) -> Self {
        Segment {
            text: &self.text[start..end],
            offset: self.offset + start,
        }
    }

    pub(crate) fn tail(self, start: usize) -> Self {
        self.slice(start, self.text.len())
    }
}

/// Error reporting context: the complete input string.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Source<'a> {
    pub input: &'a str,
}

impl<'a> Source<'a> {
    pub(crate) fn error(&self, offset: usize, message: impl Into<String>) -> GenError {
        let offset = offset.min(self.input.len());
        GenError::Syntax {
            input: self.input.to_string(),
            column: self.input[..offset].chars().count() + 1,
            message: message.into(),
        }
    }
}

fn closer_for(open: char) -> char {
    match open {
        '<' => '>',
        '[' => ']',
        '(' => ')',
        _ => '}',
    }
}

fn is_arrow(text: &str, idx: usize) -> bool {
    text[idx..].starts_with("<-")
}

/// Split `segment` on commas at nesting depth zero.
///
/// Fails on unbalanced or mismatched delimiters. Segments are returned
/// untrimmed; empty ones are reported by the caller, which knows whether the
/// list is a type list or a parameter list.
pub(crate) fn split_top_level<'a>(
    src: &Source<'_>,
    segment: Segment<'a>,
) -> Result<Vec<Segment<'a>>> {
    let text = segment.text;
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut parts = Vec::new();
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        match ch {
            '<' if is_arrow(text, idx) => {}
            '<' | '[' | '(' | '{' => stack.push((closer_for(ch), idx)),
            '>' | ']' | ')' | '}' => match stack.pop() {
                Some((expected, _)) if expected == ch => {}
                Some((expected, open_at)) => {
                    return Err(src.error(
                        segment.offset + idx,
                        format!(
                            "found {ch:?} but {expected:?} is required to close {:?} at column {}",
                            &text[open_at..open_at + 1],
                            src.input[..segment.offset + open_at].chars().count() + 1
                        ),
                    ));
                }
                None => {
                    return Err(src.error(segment.offset + idx, format!("unmatched {ch:?}")));
                }
            },
            ',' if stack.is_empty() => {
                parts.push(segment.slice(start, idx));
                start = idx + 1;
            }
            _ => {}
        }
    }

    if let Some((expected, open_at)) = stack.pop() {
        return Err(src.error(
            segment.offset + open_at,
            format!(
                "{:?} is never closed, expected {expected:?}",
                &text[open_at..open_at + 1]
            ),
        ));
    }

    parts.push(segment.tail(start));
    Ok(parts)
}

/// Byte index of the delimiter closing the opener at `open`.
///
/// Assumes the text was already validated by [`split_top_level`].
pub(crate) fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, ch) in text[open..].char_indices() {
        let at = open + idx;
        match ch {
            '<' if is_arrow(text, at) => {}
            '<' | '[' | '(' | '{' => depth += 1,
            '>' | ']' | ')' | '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(at);
                }
            }
            _ => {}
        }
    }
    None
}
