#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{Fixture, CLINIC, SYNC};
use gogen::emitter::EmitOutcome;
use gogen::generator::{generate, GeneratorKind};
use gogen::structtag::StructTag;
use gogen::typespec::{self, TemplateParam};
use gogen::{GenError, TypeSpec};

#[test]
fn test_typespec_scenarios() {
    assert_eq!(
        typespec::parse("Pill<int>").unwrap(),
        vec![TypeSpec {
            name: "Pill".to_string(),
            import: String::new(),
            template_params: vec![TemplateParam::plain("int")],
        }]
    );

    let specs = typespec::parse("NumMap<int, *[][]*[]time.Time>").unwrap();
    assert_eq!(specs.len(), 1);
    let params = &specs[0].template_params;
    assert_eq!(params[0], TemplateParam::plain("int"));
    assert_eq!(params[1].ty, "time.Time");
    assert_eq!(params[1].import, "time");
    assert!(params[1].is_pointer);
    assert_eq!(params[1].type_prefix, "[][]*[]");

    assert_eq!(typespec::parse("A, B<int>, C").unwrap().len(), 3);
    for bad in ["Pill<int", "Pill<>", "A,,B", "Pill<int>x"] {
        assert!(
            matches!(typespec::parse(bad), Err(GenError::Syntax { .. })),
            "{bad} should be a syntax error"
        );
    }
}

#[test]
fn test_struct_tag_scenario() {
    let mut tag = StructTag::parse(r#"json:"foo,omitempty" yaml:"bar,omitempty""#).unwrap();
    let json = tag.get("json").unwrap();
    assert_eq!(json.name, "foo");
    assert_eq!(json.options, vec!["omitempty".to_string()]);

    tag.delete(&["yaml"]);
    assert_eq!(tag.to_string(), r#"json:"foo,omitempty""#);
}

#[test]
fn test_every_generator_is_idempotent() {
    let fixture = Fixture::new(&[("clinic.go", CLINIC), ("sync.go", SYNC)]);
    let runs = [
        (GeneratorKind::Option, "Patient", "patient_options.go"),
        (GeneratorKind::Union, "Ward", "ward_union.go"),
        (GeneratorKind::SyncMap, "Beds<int, *Patient>", "beds_syncmap.go"),
        (GeneratorKind::AtomicValue, "Roster<[]string>", "roster_atomicvalue.go"),
        (GeneratorKind::Enum, "Color", "color_enum.go"),
        (GeneratorKind::Sqlx, "Patient", "patient_sqlx.go"),
    ];

    for (kind, types, file) in runs {
        let req = fixture.request(kind, types);
        let first = generate(&req).unwrap();
        assert_eq!(first.files.len(), 1, "{}", kind.name());
        assert_eq!(first.files[0].outcome, EmitOutcome::Written);
        assert_eq!(first.files[0].path, fixture.file(file));
        let bytes = fixture.read(file);

        let second = generate(&req).unwrap();
        assert_eq!(second.files[0].outcome, EmitOutcome::Unchanged, "{}", kind.name());
        assert_eq!(fixture.read(file), bytes, "{}", kind.name());
    }
}

#[test]
fn test_excluded_fields_never_appear() {
    let fixture = Fixture::new(&[("clinic.go", CLINIC)]);

    generate(&fixture.request(GeneratorKind::Option, "Patient")).unwrap();
    let options = fixture.read("patient_options.go");
    assert!(options.contains("func WithPatientFullName(v string) PatientOption {"));
    assert!(!options.contains("Notes"));

    generate(&fixture.request(GeneratorKind::Union, "Ward")).unwrap();
    let union = fixture.read("ward_union.go");
    assert!(union.contains("func (u Ward) IsNurse() bool {"));
    assert!(!union.contains("Secret"));

    generate(&fixture.request(GeneratorKind::Sqlx, "Patient")).unwrap();
    let sqlx = fixture.read("patient_sqlx.go");
    assert!(sqlx.contains("\"full_name\","));
    assert!(!sqlx.contains("Notes"));
    assert!(!sqlx.contains("notes"));
}

#[test]
fn test_generated_header_and_imports() {
    let fixture = Fixture::new(&[("clinic.go", CLINIC)]);
    generate(&fixture.request(GeneratorKind::Option, "Patient")).unwrap();
    let out = fixture.read("patient_options.go");
    assert!(out.starts_with(
        "// Code generated by \"gogen option -t Patient\"; DO NOT EDIT.\n\npackage clinic\n"
    ));
    // sql is only used by the excluded field
    assert!(out.contains("import (\n\t\"time\"\n)"));
    assert!(!out.contains("database/sql"));
}

#[test]
fn test_failed_type_writes_nothing() {
    let fixture = Fixture::new(&[("clinic.go", CLINIC)]);
    let err = generate(&fixture.request(GeneratorKind::Option, "Patient, Missing")).unwrap_err();
    assert!(matches!(err, GenError::NotFound { ref type_name, .. } if type_name == "Missing"));
    assert!(!fixture.file("patient_options.go").exists());
}

#[test]
fn test_dry_run_predicts_without_writing() {
    let fixture = Fixture::new(&[("clinic.go", CLINIC)]);
    let mut req = fixture.request(GeneratorKind::Enum, "Color");
    req.dry_run = true;
    let report = generate(&req).unwrap();
    assert!(report.dry_run);
    assert_eq!(report.files[0].outcome, EmitOutcome::Written);
    assert!(!fixture.file("color_enum.go").exists());
}

#[test]
fn test_fill_tags_rewrites_source() {
    let fixture = Fixture::new(&[(
        "row.go",
        "package store\n\ntype Row struct {\n\tID    int\n\tTitle string `json:\"title\"`\n}\n",
    )]);
    let mut req = fixture.request(GeneratorKind::Sqlx, "Row");
    req.scan.fill_db_tags = true;
    let report = generate(&req).unwrap();
    assert_eq!(report.files.len(), 2);
    assert!(report.files.iter().any(|f| f.type_name.is_none()));

    let source = fixture.read("row.go");
    assert!(source.contains("\tID    int `db:\"id\"`\n"));
    assert!(source.contains("`json:\"title\" db:\"title\"`"));

    // Tags are in place now; the second run leaves the source alone.
    let again = generate(&req).unwrap();
    assert!(again
        .files
        .iter()
        .all(|f| f.outcome == EmitOutcome::Unchanged));
}
