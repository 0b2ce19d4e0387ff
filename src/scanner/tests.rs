#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use super::*;
use crate::typespec;

fn package(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, src) in files {
        fs::write(dir.path().join(name), src).unwrap();
    }
    dir
}

fn pattern(dir: &Path) -> Vec<String> {
    vec![dir.display().to_string()]
}

fn options() -> ScanOptions {
    ScanOptions {
        go_minor: 21,
        ..ScanOptions::default()
    }
}

const CONFIG: &str = r#"package config

import (
	"time"
	"net/http"
)

// Config holds client settings.
type Config struct {
	// Age in years
	Age     int               `option:",short"`
	Name    string            `json:"name" option:"-"`
	Tags    []string
	Headers map[string]string // request headers
	Timeout *time.Duration
	Client  http.Client
	secret  string
}
"#;

#[test]
fn test_scan_struct_fields() {
    let dir = package(&[("config.go", CONFIG)]);
    let wanted = typespec::parse("Config").unwrap();
    let result = scan(&pattern(dir.path()), &wanted, &options()).unwrap();

    assert_eq!(result.package_name, "config");
    assert!(!result.file_changed());
    let desc = result.get("Config").unwrap();
    assert_eq!(desc.kind, DeclKind::Struct);
    assert_eq!(desc.doc.as_deref(), Some("Config holds client settings."));
    assert_eq!(desc.source_file, dir.path().join("config.go"));
    assert!(desc.file_imports.contains("\"time\""));
    assert!(desc.file_imports.contains("\"net/http\""));

    let names: Vec<&str> = desc.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Age", "Name", "Tags", "Headers", "Timeout", "Client"]);

    let age = &desc.fields[0];
    assert_eq!(age.doc_comment.as_deref(), Some("Age in years"));
    assert!(age.tag.get("option").unwrap().has_option("short"));
    assert!(!age.can_compare_with_nil);
    assert!(age.can_compare_with_zero);

    assert!(desc.fields[1].is_ignored_by("option"));
    assert_eq!(desc.fields[2].type_kind, TypeKind::Slice);
    assert!(desc.fields[2].can_compare_with_nil);
    assert!(!desc.fields[2].can_compare_with_zero);
    assert_eq!(desc.fields[3].type_kind, TypeKind::Map);
    assert_eq!(desc.fields[3].line_comment.as_deref(), Some("request headers"));
    assert_eq!(desc.fields[4].type_kind, TypeKind::Pointer);
}

#[test]
fn test_unexported_fields_on_request() {
    let dir = package(&[("config.go", CONFIG)]);
    let wanted = typespec::parse("Config").unwrap();
    let opts = ScanOptions {
        include_unexported: true,
        ..options()
    };
    let result = scan(&pattern(dir.path()), &wanted, &opts).unwrap();
    let desc = result.get("Config").unwrap();
    let secret = desc.fields.last().unwrap();
    assert_eq!(secret.name, "secret");
    assert!(!secret.exported);
}

#[test]
fn test_missing_type_is_not_found() {
    let dir = package(&[("config.go", CONFIG)]);
    let wanted = typespec::parse("Config,Missing").unwrap();
    match scan(&pattern(dir.path()), &wanted, &options()) {
        Err(GenError::NotFound { type_name, package }) => {
            assert_eq!(type_name, "Missing");
            assert_eq!(package, "config");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn test_generics_and_aliases() {
    let dir = package(&[(
        "types.go",
        "package box\n\ntype Box[K comparable, V any] struct {\n\tKey K\n\tVal V\n}\n\ntype Crate = Base\ntype Pallet Base\n\ntype Base struct {\n\tWeight int\n}\n\ntype Store sync.Map\n",
    )]);
    let wanted = typespec::parse("Box,Crate,Pallet,Store").unwrap();
    let result = scan(&pattern(dir.path()), &wanted, &options()).unwrap();

    let boxed = result.get("Box").unwrap();
    assert_eq!(boxed.generic_declaration, "[K comparable, V any]");
    assert_eq!(boxed.generic_params, "[K, V]");
    assert!(!boxed.fields[0].can_compare_with_zero);

    for alias in ["Crate", "Pallet"] {
        let desc = result.get(alias).unwrap();
        assert_eq!(
            desc.kind,
            DeclKind::Alias {
                target: "Base".into()
            }
        );
        assert_eq!(desc.fields[0].name, "Weight");
    }

    let store = result.get("Store").unwrap();
    assert_eq!(store.underlying(), Some("sync.Map"));
    assert!(store.fields.is_empty());
}

#[test]
fn test_enum_constants_across_files() {
    let dir = package(&[
        ("color.go", "package paint\n\ntype Color int\n"),
        (
            "values.go",
            "package paint\n\nconst (\n\tRed Color = iota // red\n\tGreen\n\t_\n\tBlue\n)\n\nconst Offset = 100\n\nconst (\n\tUltra = Color(Offset) + iota\n\tInfra\n)\n\nconst Name = \"paint\"\n",
        ),
    ]);
    let wanted = typespec::parse("Color").unwrap();
    let result = scan(&pattern(dir.path()), &wanted, &options()).unwrap();
    let consts: Vec<(&str, i128)> = result
        .get("Color")
        .unwrap()
        .constants
        .iter()
        .map(|c| (c.name.as_str(), c.value))
        .collect();
    assert_eq!(
        consts,
        vec![("Red", 0), ("Green", 1), ("Blue", 3), ("Ultra", 100), ("Infra", 101)]
    );
    assert_eq!(
        result.get("Color").unwrap().constants[0].line_comment.as_deref(),
        Some("red")
    );
}

#[test]
fn test_constants_may_refer_forward() {
    let dir = package(&[
        (
            "a_color.go",
            "package paint\n\ntype Color int\n\nconst (\n\tRed Color = Base + iota\n\tGreen\n)\n\nconst Twice = Base * 2\n",
        ),
        ("b_base.go", "package paint\n\nconst Base = Start + 1\n\nconst Start = 0\n\nconst Magenta Color = Twice\n"),
    ]);
    let wanted = typespec::parse("Color").unwrap();
    let result = scan(&pattern(dir.path()), &wanted, &options()).unwrap();
    let consts: Vec<(&str, i128)> = result
        .get("Color")
        .unwrap()
        .constants
        .iter()
        .map(|c| (c.name.as_str(), c.value))
        .collect();
    assert_eq!(consts, vec![("Red", 1), ("Green", 2), ("Magenta", 2)]);
}

#[test]
fn test_undefined_enum_constant_is_a_load_error() {
    let dir = package(&[(
        "color.go",
        "package paint\n\ntype Color int\n\nconst Red Color = Missing + 1\n",
    )]);
    let wanted = typespec::parse("Color").unwrap();
    let err = scan(&pattern(dir.path()), &wanted, &options()).unwrap_err();
    assert!(matches!(err, GenError::Load { ref message, .. } if message.contains("constant Red")));
}

#[test]
fn test_alias_carries_target_file_imports() {
    let dir = package(&[
        ("a_alias.go", "package cfg\n\nimport \"fmt\"\n\ntype Settings = Config\n"),
        (
            "b_config.go",
            "package cfg\n\nimport \"time\"\n\ntype Config struct {\n\tTimeout time.Duration\n}\n",
        ),
    ]);
    let wanted = typespec::parse("Settings").unwrap();
    let result = scan(&pattern(dir.path()), &wanted, &options()).unwrap();
    let desc = result.get("Settings").unwrap();
    assert_eq!(desc.fields[0].ty, "time.Duration");
    assert!(desc.file_imports.contains("\"time\""));
    assert!(desc.file_imports.contains("\"fmt\""));
    assert!(desc.source_file.ends_with("a_alias.go"));
}

#[test]
fn test_build_constraints_and_test_files() {
    let dir = package(&[
        ("a.go", "package p\n\ntype A struct{}\n"),
        ("a_test.go", "package p_test\n\ntype T struct{}\n"),
        ("ignored.go", "//go:build ignore\n\npackage other\n\ntype A struct{}\n"),
        ("tagged.go", "//go:build special\n\npackage p\n\ntype Special struct{}\n"),
    ]);
    let wanted = typespec::parse("A").unwrap();
    assert!(scan(&pattern(dir.path()), &wanted, &options()).is_ok());

    let special = typespec::parse("Special").unwrap();
    assert!(matches!(
        scan(&pattern(dir.path()), &special, &options()),
        Err(GenError::NotFound { .. })
    ));
    let tagged = ScanOptions {
        build_tags: vec!["special".into()],
        ..options()
    };
    assert!(scan(&pattern(dir.path()), &special, &tagged).is_ok());
}

#[test]
fn test_ambiguous_packages() {
    let dir = package(&[
        ("a.go", "package one\n\ntype A struct{}\n"),
        ("b.go", "package two\n\ntype B struct{}\n"),
    ]);
    let wanted = typespec::parse("A").unwrap();
    assert!(matches!(
        scan(&pattern(dir.path()), &wanted, &options()),
        Err(GenError::AmbiguousPackage { .. })
    ));

    let other = package(&[("c.go", "package one\n")]);
    let patterns = vec![
        dir.path().join("a.go").display().to_string(),
        other.path().join("c.go").display().to_string(),
    ];
    assert!(matches!(
        scan(&patterns, &wanted, &options()),
        Err(GenError::AmbiguousPackage { .. })
    ));
}

#[test]
fn test_file_and_glob_patterns() {
    let dir = package(&[
        ("a.go", "package one\n\ntype A struct{}\n"),
        ("b.go", "package two\n\ntype B struct{}\n"),
    ]);
    let wanted = typespec::parse("A").unwrap();
    let single = vec![dir.path().join("a.go").display().to_string()];
    assert!(scan(&single, &wanted, &options()).is_ok());

    let glob = vec![dir.path().join("a*.go").display().to_string()];
    assert!(scan(&glob, &wanted, &options()).is_ok());

    let none = vec![dir.path().join("z*.go").display().to_string()];
    assert!(matches!(
        scan(&none, &wanted, &options()),
        Err(GenError::Load { .. })
    ));
}

#[test]
fn test_load_errors_name_the_file() {
    let dir = package(&[("bad.go", "package p\n\ntype A struct {\n\tX int `json:\"a b\"`\n}\n")]);
    let wanted = typespec::parse("A").unwrap();
    match scan(&pattern(dir.path()), &wanted, &options()) {
        Err(GenError::Load { path, line, .. }) => {
            assert!(path.ends_with("bad.go"));
            assert_eq!(line, 4);
        }
        other => panic!("expected Load, got {other:?}"),
    }

    let dir = package(&[("broken.go", "package p\n\ntype A struct {\n")]);
    assert!(matches!(
        scan(&pattern(dir.path()), &wanted, &options()),
        Err(GenError::Load { .. })
    ));
}

#[test]
fn test_fill_db_tags_rewrites_source() {
    let src = "package model\n\ntype User struct {\n\tID        int64\n\tFirstName string `json:\"first_name\"`\n\tEmail     string `db:\"mail\"`\n\tA, B      int\n}\n";
    let dir = package(&[("user.go", src)]);
    let wanted = typespec::parse("User").unwrap();

    let untouched = scan(&pattern(dir.path()), &wanted, &options()).unwrap();
    assert!(!untouched.file_changed());

    let opts = ScanOptions {
        fill_db_tags: true,
        ..options()
    };
    let result = scan(&pattern(dir.path()), &wanted, &opts).unwrap();
    assert!(result.file_changed());
    assert_eq!(
        result.rewrites[0].source,
        "package model\n\ntype User struct {\n\tID        int64 `db:\"id\"`\n\tFirstName string `json:\"first_name\" db:\"first_name\"`\n\tEmail     string `db:\"mail\"`\n\tA, B      int\n}\n"
    );
    let user = result.get("User").unwrap();
    assert_eq!(user.fields[0].tag.get("db").unwrap().name, "id");
    assert_eq!(user.fields[1].tag.get("db").unwrap().name, "first_name");

    // The scanner never writes; the file on disk is unchanged.
    assert_eq!(fs::read_to_string(dir.path().join("user.go")).unwrap(), src);
}
