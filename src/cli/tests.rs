//! Unit tests for CLI commands
#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::cli::{run_cli, Cli, Commands};
use clap::Parser;
use std::fs;

#[test]
fn test_option_command_with_flags() {
    let cli = Cli::try_parse_from([
        "gogen", "option", "--type", "Config", "--short", "--force", "-o", "out", "./pkg",
    ])
    .unwrap();

    match cli.command {
        Commands::Option {
            generate,
            short,
            scaffold,
        } => {
            assert_eq!(generate.scan.type_spec, "Config");
            assert_eq!(generate.scan.patterns, vec!["./pkg".to_string()]);
            assert_eq!(generate.output.unwrap().to_string_lossy(), "out");
            assert!(generate.force);
            assert!(short);
            assert!(!scaffold);
        }
        other => panic!("Expected Option command, got {other:?}"),
    }
}

#[test]
fn test_generic_type_and_tags() {
    let cli = Cli::try_parse_from([
        "gogen",
        "syncmap",
        "-t",
        "UserMap<string, *User>",
        "--tags",
        "integration,linux",
        "-v",
    ])
    .unwrap();
    assert!(cli.verbose());

    match cli.command {
        Commands::SyncMap { generate } => {
            assert_eq!(generate.scan.type_spec, "UserMap<string, *User>");
            assert_eq!(generate.scan.tags, vec!["integration", "linux"]);
            assert!(generate.scan.patterns.is_empty());
        }
        other => panic!("Expected SyncMap command, got {other:?}"),
    }
}

#[test]
fn test_missing_type_is_a_usage_error() {
    let err = Cli::try_parse_from(["gogen", "enum", "./pkg"]).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_all_commands_parse() {
    let commands = vec![
        vec!["gogen", "option", "-t", "A", "--scaffold"],
        vec!["gogen", "union", "-t", "A"],
        vec!["gogen", "syncmap", "-t", "A<int, string>"],
        vec!["gogen", "atomicvalue", "-t", "A<int>"],
        vec!["gogen", "enum", "-t", "A", "--trimprefix", "A", "--linecomment"],
        vec!["gogen", "sqlx", "-t", "A", "--table", "a", "--fill-tags"],
        vec!["gogen", "inspect", "-t", "A"],
    ];

    for args in commands {
        let cli = Cli::try_parse_from(&args);
        assert!(cli.is_ok(), "Failed to parse command: {:?}", args);
    }
}

#[test]
fn test_run_cli_merges_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("user.go"),
        "package store\n\ntype User struct {\n\tID   int\n\tName string `db:\"user_name\"`\n}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("gogen.toml"),
        "go_version = \"1.17\"\n\n[format]\nenabled = false\n",
    )
    .unwrap();

    let pkg = dir.path().display().to_string();
    let cli = Cli::try_parse_from(["gogen", "sqlx", "-t", "User", pkg.as_str()]).unwrap();
    run_cli(cli).unwrap();

    let generated = fs::read_to_string(dir.path().join("user_sqlx.go")).unwrap();
    assert!(generated.contains("\"user_name\""));
    // go 1.17 has no `any`
    assert!(generated.contains("[]interface{}"));
}

#[test]
fn test_run_cli_reports_missing_explicit_config() {
    let dir = tempfile::tempdir().unwrap();
    let pkg = dir.path().display().to_string();
    let missing = dir.path().join("nope.toml").display().to_string();
    let cli = Cli::try_parse_from([
        "gogen",
        "union",
        "-t",
        "U",
        "--config",
        missing.as_str(),
        pkg.as_str(),
    ])
    .unwrap();
    let err = run_cli(cli).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}

#[test]
fn test_header_records_only_output_flags() {
    let cli = Cli::try_parse_from([
        "gogen",
        "enum",
        "-v",
        "--force",
        "--dry-run",
        "--gofmt",
        "-t",
        "Color",
        "--trimprefix",
        "Color",
        "./paint",
    ])
    .unwrap();
    assert_eq!(
        cli.command.header_args(),
        vec!["enum", "--type", "Color", "--trimprefix", "Color", "./paint"]
    );
}

#[test]
fn test_run_cli_output_ignores_verbosity_and_force() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("shape.go"),
        "package geo\n\ntype Shape struct {\n\tCircle *float64\n\tSquare *int\n}\n",
    )
    .unwrap();
    let pkg = dir.path().display().to_string();
    let out = dir.path().join("shape_union.go");

    run_cli(Cli::try_parse_from(["gogen", "union", "-t", "Shape", pkg.as_str()]).unwrap()).unwrap();
    let quiet = fs::read_to_string(&out).unwrap();
    assert!(quiet.starts_with(&format!(
        "// Code generated by \"gogen union --type Shape {pkg}\"; DO NOT EDIT.\n"
    )));

    fs::remove_file(&out).unwrap();
    let cli = Cli::try_parse_from(["gogen", "union", "-v", "--force", "-t", "Shape", pkg.as_str()]);
    run_cli(cli.unwrap()).unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap(), quiet);
}
