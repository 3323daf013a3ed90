use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use ember_init::path::{InstallLayout, OsProbe, PathResolver};
use ember_init::{Config, Snapshot};

fn bench_home_override(c: &mut Criterion) {
    let mut group = c.benchmark_group("home_override");
    let layout = InstallLayout::posix();
    let resolver = PathResolver::new(&layout, &OsProbe);

    // Search path assembly with increasing EMBER_PATH lengths
    for entries in [0usize, 8, 64] {
        let path_env = (0..entries)
            .map(|i| format!("/srv/site{}", i % (entries / 2).max(1)))
            .collect::<Vec<_>>()
            .join(":");
        let config = Config {
            home: Some("/opt/ember".to_string()),
            path_env: Some(path_env),
            ..Config::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(entries), &config, |b, config| {
            b.iter(|| resolver.discover(black_box(config), &Snapshot::empty()));
        });
    }

    group.finish();
}

fn bench_landmark_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("landmark_search");
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fs::create_dir_all(root.join("bin")).unwrap();
    fs::write(root.join("bin/ember"), "").unwrap();

    let layout = InstallLayout::posix();
    let resolver = PathResolver::new(&layout, &OsProbe);
    let snapshot = Snapshot::empty().with_executable(root.join("bin/ember"));

    // Nothing found: every candidate is probed
    group.bench_function("missing_landmarks", |b| {
        b.iter(|| resolver.discover(black_box(&Config::default()), &snapshot));
    });

    fs::create_dir_all(root.join("lib/ember1.0/lib-dynload")).unwrap();
    fs::write(root.join("lib/ember1.0/os.em"), "").unwrap();

    // Landmarks one level above the executable
    group.bench_function("found_in_parent", |b| {
        b.iter(|| resolver.discover(black_box(&Config::default()), &snapshot));
    });

    group.finish();
}

criterion_group!(benches, bench_home_override, bench_landmark_search);
criterion_main!(benches);
