use std::fs;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use gogen::scanner::{scan, ScanOptions};
use gogen::typespec;

const TYPE_SPECS: &str =
    "Pill, NumMap<int, *[][]*[]time.Time>, Cache<string, map[string][]*net.IP>, Snapshot<*state.View>";

fn package_source(structs: usize) -> String {
    let mut src = String::from("package bench\n\nimport \"time\"\n\n");
    for i in 0..structs {
        src.push_str(&format!(
            "// Row{i} is a benchmark row.\ntype Row{i} struct {{\n\tID      int64  `db:\"id\" json:\"id\"`\n\tName    string `json:\"name,omitempty\"`\n\tTags    []string\n\tCreated time.Time // creation time\n\tLinks   map[string]*Row{i}\n}}\n\n"
        ));
    }
    src
}

fn bench_typespec(c: &mut Criterion) {
    c.bench_function("typespec_parse", |b| {
        b.iter(|| typespec::parse(black_box(TYPE_SPECS)))
    });
}

fn bench_scan(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("rows.go"), package_source(200)).expect("write fixture");
    let patterns = vec![dir.path().display().to_string()];
    let wanted = typespec::parse("Row0, Row99, Row199").expect("type spec");
    let options = ScanOptions {
        go_minor: 21,
        ..ScanOptions::default()
    };

    c.bench_function("scan_package", |b| {
        b.iter(|| scan(black_box(&patterns), black_box(&wanted), &options))
    });
}

criterion_group!(benches, bench_typespec, bench_scan);
criterion_main!(benches);
