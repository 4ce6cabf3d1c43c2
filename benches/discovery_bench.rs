use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pfadfinder::discovery::{
    discover, transform, CatalogLoader, DiscoveryOptions, MemoryReporter, ModuleCatalog, RouteContext, WalkOptions,
};
use std::fs;
use std::hint::black_box;
use std::path::Path;
use tempfile::TempDir;

fn handler(ctx: &mut RouteContext<()>) -> anyhow::Result<()> {
    ctx.get(|| async { "ok" }).post(|| async { "created" });
    Ok(())
}

/// `versions` version dirs, each with `resources` resources of an index, a `[id]` and a nested file.
fn create_route_tree(versions: usize, resources: usize) -> (TempDir, ModuleCatalog<()>) {
    let temp_dir = TempDir::new().unwrap();
    let mut catalog = ModuleCatalog::new();

    for v in 1..=versions {
        for r in 0..resources {
            for rel in [
                format!("v{}/res_{}/index.rs", v, r),
                format!("v{}/res_{}/[id].rs", v, r),
                format!("v{}/res_{}/[id]/items.rs", v, r),
            ] {
                let path = temp_dir.path().join(&rel);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(&path, "pub fn register() {}").unwrap();
                catalog = catalog.module(rel, handler);
            }
        }
    }
    (temp_dir, catalog)
}

fn run(root: &Path, catalog: &ModuleCatalog<()>, walk: WalkOptions) -> usize {
    let options = DiscoveryOptions::new(root).with_api_base("/api").with_walk(walk);
    let output = discover(&options, &CatalogLoader::new(catalog), &mut MemoryReporter::new()).unwrap();
    output.registry.len()
}

fn benchmark_transform(c: &mut Criterion) {
    let paths: Vec<Vec<&str>> = vec![
        vec!["v1", "index.rs"],
        vec!["v1", "users", "[id].rs"],
        vec!["v1", "orgs", "[org]", "teams", "[team]", "members", "index.rs"],
    ];

    c.bench_function("transform_paths", |b| {
        b.iter(|| {
            for p in &paths {
                black_box(transform(black_box(p)).unwrap());
            }
        })
    });
}

fn benchmark_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("discovery");

    for resources in [10, 50, 200] {
        let (tree, catalog) = create_route_tree(2, resources);
        group.bench_with_input(BenchmarkId::from_parameter(resources), &resources, |b, _| {
            b.iter(|| black_box(run(tree.path(), &catalog, WalkOptions::default())))
        });
    }
    group.finish();
}

fn benchmark_exclude_patterns(c: &mut Criterion) {
    let (tree, catalog) = create_route_tree(2, 50);
    let mut group = c.benchmark_group("exclude_patterns");

    group.bench_function("no_excludes", |b| {
        b.iter(|| black_box(run(tree.path(), &catalog, WalkOptions::default())))
    });

    group.bench_function("with_excludes", |b| {
        let walk = WalkOptions {
            excludes: vec!["**/res_1*".to_string(), "**/items.rs".to_string()],
            ..WalkOptions::default()
        };
        b.iter(|| black_box(run(tree.path(), &catalog, walk.clone())))
    });
    group.finish();
}

criterion_group!(benches, benchmark_transform, benchmark_discovery, benchmark_exclude_patterns);
criterion_main!(benches);
