//! Enum helpers for integer types: `String`, parsing, value lists and the
//! JSON, text, binary, YAML and SQL codecs.
//!
//! The `String` body depends on how the distinct values cluster. Sorted
//! values are cut into runs of consecutive integers:
//!
//! ```text
//! 1 run       -> one name string plus one index table
//! 2..=10 runs -> switch over per-run tables
//! > 10 runs   -> map literal
//! ```

use std::collections::HashSet;

use serde::Serialize;

use super::{collect_imports, unsupported, Generator, GeneratorKind, RenderContext, Rendered, Settings};
use crate::error::{GenError, Result};
use crate::scanner::{EnumConstant, ScannedType};
use crate::structtag::quote;

const SIGNED: &[&str] = &["int", "int8", "int16", "int32", "int64", "rune"];
const UNSIGNED: &[&str] = &["uint", "uint8", "uint16", "uint32", "uint64", "uintptr", "byte"];

/// Runs above this count switch the `String` body to a map.
const MAX_SWITCH_RUNS: usize = 10;

pub struct EnumGenerator;

#[derive(Serialize)]
struct EnumContext<'a> {
    header: &'a str,
    package: &'a str,
    imports: Vec<String>,
    #[serde(rename = "type")]
    type_name: &'a str,
    #[serde(flatten)]
    table: StringTable,
    values: Vec<ValueEntry>,
    lookup: Vec<LookupEntry>,
}

#[derive(Debug, Serialize)]
struct ValueEntry {
    name: String,
    value: String,
    /// Quoted display name
    display: String,
}

#[derive(Debug, Serialize)]
struct LookupEntry {
    key: String,
    name: String,
}

/// Precomputed pieces of the `String` method.
#[derive(Debug, Serialize)]
struct StringTable {
    /// `table`, `switch` or `map`
    layout: &'static str,
    runs: Vec<Run>,
    has_indexes: bool,
    index_type: &'static str,
    table_guard: String,
    invalid: String,
}

#[derive(Debug, Serialize)]
struct Run {
    id: usize,
    /// Quoted concatenation of the run's names
    names: String,
    /// `{0, 3, 8}`, empty for single-value runs
    index: String,
    /// Statement rebasing `i` to the run start, empty when it starts at 0
    shift: String,
    condition: String,
}

/// A distinct enum value with its display name.
#[derive(Debug, Clone)]
struct Member {
    name: String,
    value: i128,
    display: String,
}

impl Generator for EnumGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Enum
    }

    fn render(&self, target: &ScannedType, ctx: &RenderContext<'_>) -> Result<Vec<Rendered>> {
        let desc = &target.descriptor;
        let unsigned = match desc.underlying() {
            Some(ty) if SIGNED.contains(&ty) => false,
            Some(ty) if UNSIGNED.contains(&ty) => true,
            _ => return Err(unsupported(self.kind(), desc, "an integer type")),
        };
        if desc.constants.is_empty() {
            return Err(GenError::Usage(format!(
                "enum found no constants of type {} in package {}",
                desc.type_name, desc.package_name
            )));
        }

        let members = members(&desc.constants, ctx.settings);
        let table = string_table(&desc.type_name, &members, unsigned);
        let values = members
            .iter()
            .map(|m| ValueEntry {
                name: m.name.clone(),
                value: m.value.to_string(),
                display: quote(&m.display),
            })
            .collect();

        let source = ctx.renderer.render(
            "enum.go.txt",
            EnumContext {
                header: ctx.header,
                package: &desc.package_name,
                imports: collect_imports(
                    target,
                    ["database/sql/driver", "encoding/json", "fmt", "strconv", "strings"],
                ),
                type_name: &desc.type_name,
                table,
                values,
                lookup: lookup(&members),
            },
        )?;
        Ok(vec![Rendered::generated("enum", source)])
    }
}

/// Distinct values in declaration order; the first name of a value wins.
fn members(constants: &[EnumConstant], settings: &Settings) -> Vec<Member> {
    let mut seen = HashSet::new();
    constants
        .iter()
        .filter(|c| seen.insert(c.value))
        .map(|c| Member {
            name: c.name.clone(),
            value: c.value,
            display: display_name(c, settings),
        })
        .collect()
}

fn display_name(constant: &EnumConstant, settings: &Settings) -> String {
    if settings.line_comment {
        if let Some(comment) = constant
            .line_comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            return comment.to_string();
        }
    }
    settings
        .trim_prefix
        .as_deref()
        .and_then(|prefix| constant.name.strip_prefix(prefix))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(&constant.name)
        .to_string()
}

/// Sorted members cut into runs of consecutive values.
fn split_runs(members: &[Member]) -> Vec<Vec<Member>> {
    let mut sorted = members.to_vec();
    sorted.sort_by_key(|m| m.value);
    let mut runs: Vec<Vec<Member>> = Vec::new();
    for member in sorted {
        match runs.last_mut() {
            Some(run) if run.last().is_some_and(|last| last.value + 1 == member.value) => {
                run.push(member)
            }
            _ => runs.push(vec![member]),
        }
    }
    runs
}

fn string_table(type_name: &str, members: &[Member], unsigned: bool) -> StringTable {
    let runs = split_runs(members);
    let layout = match runs.len() {
        1 => "table",
        n if n <= MAX_SWITCH_RUNS => "switch",
        _ => "map",
    };

    let longest = runs
        .iter()
        .map(|run| run.iter().map(|m| m.display.len()).sum::<usize>())
        .max()
        .unwrap_or(0);
    let index_type = if longest < 1 << 8 {
        "uint8"
    } else if longest < 1 << 16 {
        "uint16"
    } else {
        "uint32"
    };

    let single = layout == "table";
    let first_low = runs.first().and_then(|r| r.first()).map_or(0, |m| m.value);
    let rendered_runs: Vec<Run> = runs
        .iter()
        .enumerate()
        .map(|(id, run)| render_run(id, run, unsigned, single))
        .collect();

    let table_guard = if unsigned {
        format!("i >= {type_name}(len(_{type_name}_index)-1)")
    } else {
        format!("i < 0 || i >= {type_name}(len(_{type_name}_index)-1)")
    };
    let invalid = invalid_expr(type_name, unsigned, if single { first_low } else { 0 });

    StringTable {
        layout,
        has_indexes: rendered_runs.iter().any(|r| !r.index.is_empty()),
        runs: rendered_runs,
        index_type,
        table_guard,
        invalid,
    }
}

fn render_run(id: usize, run: &[Member], unsigned: bool, single_table: bool) -> Run {
    let names: String = run.iter().map(|m| m.display.as_str()).collect();
    let low = run.first().map_or(0, |m| m.value);
    let high = run.last().map_or(0, |m| m.value);

    let mut offsets = vec![0usize];
    for member in run {
        let last = offsets.last().copied().unwrap_or(0);
        offsets.push(last + member.display.len());
    }
    let index = if run.len() > 1 || single_table {
        format!(
            "{{{}}}",
            offsets
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        )
    } else {
        String::new()
    };

    let condition = if low == high {
        format!("i == {low}")
    } else if unsigned && low == 0 {
        format!("i <= {high}")
    } else {
        format!("{low} <= i && i <= {high}")
    };

    Run {
        id,
        names: quote(&names),
        index,
        shift: shift_stmt(low),
        condition,
    }
}

/// `i -= low`; the negated constant may not fit the type (`int8` and -128).
fn shift_stmt(low: i128) -> String {
    match low {
        0 => String::new(),
        low => format!("i -= {low}"),
    }
}

/// `"T(" + strconv.FormatInt(int64(i), 10) + ")"`, undoing `offset`.
fn invalid_expr(type_name: &str, unsigned: bool, offset: i128) -> String {
    let i = match offset {
        0 => "i".to_string(),
        o if o > 0 => format!("i+{o}"),
        o => format!("i+({o})"),
    };
    if unsigned {
        format!("\"{type_name}(\" + strconv.FormatUint(uint64({i}), 10) + \")\"")
    } else {
        format!("\"{type_name}(\" + strconv.FormatInt(int64({i}), 10) + \")\"")
    }
}

/// Name lookup keys: every display name, then the lower-case forms that
/// do not shadow one.
fn lookup(members: &[Member]) -> Vec<LookupEntry> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let exact = members.iter().map(|m| (m.display.clone(), m));
    let lower = members.iter().map(|m| (m.display.to_lowercase(), m));
    for (key, member) in exact.chain(lower) {
        if seen.insert(key.clone()) {
            out.push(LookupEntry {
                key: quote(&key),
                name: member.name.clone(),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn constants(values: &[(&str, i128)]) -> Vec<EnumConstant> {
        values
            .iter()
            .map(|(name, value)| EnumConstant {
                name: (*name).into(),
                value: *value,
                line_comment: None,
            })
            .collect()
    }

    fn table(values: &[(&str, i128)], unsigned: bool) -> StringTable {
        let members = members(&constants(values), &Settings::default());
        string_table("Color", &members, unsigned)
    }

    #[test]
    fn test_single_run_uses_table() {
        let t = table(&[("Red", 0), ("Green", 1), ("Blue", 2)], false);
        assert_eq!(t.layout, "table");
        assert_eq!(t.runs[0].names, "\"RedGreenBlue\"");
        assert_eq!(t.runs[0].index, "{0, 3, 8, 12}");
        assert_eq!(t.runs[0].shift, "");
        assert_eq!(t.index_type, "uint8");
        assert_eq!(t.table_guard, "i < 0 || i >= Color(len(_Color_index)-1)");
        assert_eq!(
            t.invalid,
            "\"Color(\" + strconv.FormatInt(int64(i), 10) + \")\""
        );
    }

    #[test]
    fn test_shifted_table_restores_value_in_fallback() {
        let t = table(&[("One", 1), ("Two", 2)], true);
        assert_eq!(t.runs[0].shift, "i -= 1");
        assert_eq!(t.table_guard, "i >= Color(len(_Color_index)-1)");
        assert_eq!(
            t.invalid,
            "\"Color(\" + strconv.FormatUint(uint64(i+1), 10) + \")\""
        );

        let negative = table(&[("Low", -2), ("Mid", -1)], false);
        assert_eq!(negative.runs[0].shift, "i -= -2");
        assert!(negative.invalid.contains("int64(i+(-2))"));
    }

    #[test]
    fn test_int8_minimum_shift_stays_in_range() {
        let t = table(&[("Min", -128), ("Next", -127)], false);
        assert_eq!(t.runs[0].shift, "i -= -128");
        assert!(!t.runs[0].shift.contains("+="));
        assert!(t.invalid.contains("int64(i+(-128))"));
    }

    #[test]
    fn test_few_runs_use_switch() {
        let t = table(&[("A", 0), ("B", 1), ("C", 10), ("D", 20), ("E", 21)], true);
        assert_eq!(t.layout, "switch");
        let conditions: Vec<&str> = t.runs.iter().map(|r| r.condition.as_str()).collect();
        assert_eq!(conditions, vec!["i <= 1", "i == 10", "20 <= i && i <= 21"]);
        assert_eq!(t.runs[1].index, "");
        assert_eq!(t.runs[2].shift, "i -= 20");
        assert!(t.has_indexes);
    }

    #[test]
    fn test_many_runs_use_map() {
        let values: Vec<(String, i128)> = (0..11).map(|n| (format!("V{n}"), n * 10)).collect();
        let refs: Vec<(&str, i128)> = values.iter().map(|(n, v)| (n.as_str(), *v)).collect();
        assert_eq!(table(&refs, false).layout, "map");
    }

    #[test]
    fn test_duplicate_values_keep_first_name() {
        let members = members(
            &constants(&[("Red", 0), ("Crimson", 0), ("Blue", 1)]),
            &Settings::default(),
        );
        let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Red", "Blue"]);
    }

    #[test]
    fn test_trimprefix_and_linecomment() {
        let mut consts = constants(&[("ColorRed", 0), ("ColorBlue", 1), ("Color", 2)]);
        consts[1].line_comment = Some("deep blue".into());
        let settings = Settings {
            trim_prefix: Some("Color".into()),
            ..Settings::default()
        };
        let displays: Vec<String> = members(&consts, &settings)
            .into_iter()
            .map(|m| m.display)
            .collect();
        assert_eq!(displays, vec!["Red", "Blue", "Color"]);

        let settings = Settings {
            line_comment: true,
            ..settings
        };
        let displays: Vec<String> = members(&consts, &settings)
            .into_iter()
            .map(|m| m.display)
            .collect();
        assert_eq!(displays, vec!["Red", "deep blue", "Color"]);
    }

    #[test]
    fn test_lookup_prefers_exact_names() {
        let members = members(
            &constants(&[("Red", 0), ("red", 1), ("Blue", 2)]),
            &Settings::default(),
        );
        let entries = lookup(&members);
        let keys: Vec<(&str, &str)> = entries
            .iter()
            .map(|e| (e.key.as_str(), e.name.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("\"Red\"", "Red"),
                ("\"red\"", "red"),
                ("\"Blue\"", "Blue"),
                ("\"blue\"", "Blue"),
            ]
        );
    }

    #[test]
    fn test_wide_names_widen_index() {
        let long = "X".repeat(300);
        let members = vec![
            Member {
                name: "A".into(),
                value: 0,
                display: long,
            },
            Member {
                name: "B".into(),
                value: 1,
                display: "B".into(),
            },
        ];
        assert_eq!(string_table("Color", &members, false).index_type, "uint16");
    }
}
