use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::fs;
use std::hint::black_box;
use std::path::Path;
use tempfile::tempdir;
use treesnap::config::ScanConfig;
use treesnap::scanner::{self, IgnoreMatcher};

fn create_test_tree(root: &Path, modules: usize) {
    fs::write(root.join(".gitignore"), "*.log\ngenerated/\n").unwrap();
    fs::write(
        root.join("package.json"),
        r#"{"dependencies":{"react":"^18.2.0"}}"#,
    )
    .unwrap();

    for i in 0..modules {
        let dir = root.join(format!("src/module_{i}"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("index.tsx"), "export default function View() {}\n".repeat(20)).unwrap();
        fs::write(dir.join("styles.css"), ".view { display: flex; }\n".repeat(10)).unwrap();
        fs::write(dir.join("debug.log"), "ignored\n").unwrap();
    }

    // Pruned subtrees
    let deps = root.join("node_modules/pkg");
    fs::create_dir_all(&deps).unwrap();
    for i in 0..modules {
        fs::write(deps.join(format!("file_{i}.js")), "module.exports = 1;\n").unwrap();
    }
    let generated = root.join("generated");
    fs::create_dir_all(&generated).unwrap();
    fs::write(generated.join("api.ts"), "export {};\n").unwrap();
}

fn benchmark_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    for modules in [10, 100, 500] {
        let dir = tempdir().unwrap();
        create_test_tree(dir.path(), modules);
        let config = ScanConfig::default();
        let matcher = IgnoreMatcher::compile(dir.path(), &config).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(modules), &modules, |b, _| {
            b.iter(|| scanner::scan(black_box(dir.path()), &matcher, &config))
        });
    }

    group.finish();
}

fn benchmark_ignore_matching(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let patterns: String = (0..200).map(|i| format!("pattern_{i}/\n*.ext{i}\n")).collect();
    fs::write(dir.path().join(".gitignore"), patterns).unwrap();
    let matcher = IgnoreMatcher::compile(dir.path(), &ScanConfig::default()).unwrap();

    let mut group = c.benchmark_group("ignore_matching");

    group.bench_function("kept_path", |b| {
        b.iter(|| matcher.ignores(black_box(Path::new("src/components/Button.tsx")), false))
    });

    group.bench_function("ignored_path", |b| {
        b.iter(|| matcher.ignores(black_box(Path::new("pattern_150/deep/file.ts")), false))
    });

    group.bench_function("builtin_dir", |b| {
        b.iter(|| matcher.ignores(black_box(Path::new("app/node_modules")), true))
    });

    group.finish();
}

criterion_group!(benches, benchmark_scan, benchmark_ignore_matching);
criterion_main!(benches);
