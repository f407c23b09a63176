use criterion::{Criterion, criterion_group, criterion_main};
use filecoll::reconcile::{self, RecordingCallback};
use filecoll::tree::Collection;
use std::fs;
use std::hint::black_box;
use std::path::Path;
use tempfile::tempdir;

/// `dirs` directories with `files` small files each.
fn populate(root: &Path, dirs: usize, files: usize) {
    for d in 0..dirs {
        let dir = root.join(format!("dir_{d:03}"));
        fs::create_dir_all(&dir).unwrap();
        for f in 0..files {
            fs::write(dir.join(format!("file_{f:03}.txt")), format!("{d}:{f}")).unwrap();
        }
    }
}

fn benchmark_scans(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    populate(dir.path(), 20, 50);

    let path = dir.path().join("collection.toml");
    let mut collection = Collection::new(&path).unwrap();
    let root = collection.root();
    reconcile::add_new_items(&mut collection, root, &mut RecordingCallback::new()).unwrap();

    c.bench_function("find_new_items_1000", |b| {
        b.iter(|| {
            let mut sink = RecordingCallback::new();
            reconcile::find_new_items(&mut collection, root, &mut sink, false).unwrap();
            black_box(sink.entries().len())
        });
    });

    c.bench_function("find_wrong_sizes_1000", |b| {
        b.iter(|| {
            let mut sink = RecordingCallback::new();
            reconcile::find_wrong_sizes(&collection, root, &mut sink).unwrap();
            black_box(sink.entries().len())
        });
    });

    c.bench_function("document_round_trip_1000", |b| {
        b.iter(|| {
            let text = collection.to_document_string().unwrap();
            Collection::parse(&path, black_box(&text)).unwrap()
        });
    });
}

fn benchmark_tree_queries(c: &mut Criterion) {
    let mut collection = Collection::new(Path::new("/bench/collection.toml")).unwrap();
    let root = collection.root();
    for d in 0..50 {
        let dir = collection.new_directory(&format!("dir_{d:03}")).unwrap();
        collection.add_child(root, dir).unwrap();
        for f in 0..40 {
            let file = collection.new_file(&format!("file_{f:03}")).unwrap();
            collection.add_child(dir, file).unwrap();
        }
    }

    c.bench_function("children_recursive_2000", |b| {
        b.iter(|| black_box(collection.children(root, true).len()));
    });

    c.bench_function("find_by_full_name", |b| {
        b.iter(|| black_box(collection.find(black_box("/dir_025/file_020"))));
    });
}

criterion_group!(benches, benchmark_scans, benchmark_tree_queries);
criterion_main!(benches);
