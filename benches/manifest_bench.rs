use chrono::Utc;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use treesnap::manifest::assembler::assemble_at;
use treesnap::manifest::{
    DependencyMap, FileRecord, SnapshotInput, SnapshotManifest, StructureSummary,
};
use treesnap::scanner::{FileKind, Framework};

fn create_input(files: usize) -> SnapshotInput {
    let kinds = [
        ("tsx", FileKind::ReactTypescript),
        ("ts", FileKind::Typescript),
        ("css", FileKind::Stylesheet),
        ("md", FileKind::Markdown),
    ];
    let records = (0..files)
        .map(|i| {
            let (ext, kind) = kinds[i % kinds.len()];
            let content = format!("// file {i}\n").repeat(40);
            FileRecord {
                path: format!("src/dir_{}/file_{i}.{ext}", i % 16),
                kind,
                size: content.len() as u64,
                content,
            }
        })
        .collect();

    SnapshotInput {
        name: "bench".to_string(),
        version_tag: "1.0.0".to_string(),
        structure: StructureSummary {
            framework: Framework::Next,
            has_type_check_config: true,
            has_source_dir: true,
        },
        files: records,
        dependencies: DependencyMap::from([("next".to_string(), "14.1.0".to_string())]),
        dev_dependencies: DependencyMap::new(),
        git: None,
    }
}

fn benchmark_assemble(c: &mut Criterion) {
    let input = create_input(1000);
    let now = Utc::now();

    c.bench_function("assemble_1000_files", |b| {
        b.iter(|| assemble_at(black_box(input.clone()), now))
    });
}

fn benchmark_serialization(c: &mut Criterion) {
    let manifest = assemble_at(create_input(1000), Utc::now());
    let json = manifest.to_json_pretty().unwrap();

    let mut group = c.benchmark_group("manifest_json");

    group.bench_function("to_json_pretty", |b| {
        b.iter(|| black_box(&manifest).to_json_pretty())
    });

    group.bench_function("from_json", |b| {
        b.iter(|| SnapshotManifest::from_json(black_box(&json)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_assemble, benchmark_serialization);
criterion_main!(benches);
