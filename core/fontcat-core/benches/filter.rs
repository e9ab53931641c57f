//! Criterion benchmarks for canonical saving and reality filtering.

use std::fs;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fontcat_core::filter::filter;
use fontcat_core::order::canonical_sort;
use fontcat_core::paths::PathExpr;
use fontcat_core::table::FontTable;
use fontcat_core::value::{FontKey, Location};
use tempfile::tempdir;

fn sample_table(files: usize) -> FontTable {
    let mut fonts = FontTable::new();
    for i in 0..files {
        for style in ["Regular", "Bold", "Italic"] {
            fonts.insert_unique(
                FontKey::new(format!("Family{}", i % 97), format!("{style}{i}")),
                Location::new(format!("font{i}.ttf"), 0, 64),
            );
        }
    }
    fonts
}

fn bench_canonical_sort(c: &mut Criterion) {
    let records = sample_table(2_000).to_pairs();

    c.bench_function("canonical_sort 6k records", |b| {
        b.iter(|| {
            let mut records = records.clone();
            canonical_sort(black_box(&mut records));
            records
        })
    });
}

fn bench_filter(c: &mut Criterion) {
    let tmp = tempdir().expect("tempdir");
    for i in 0..500 {
        // Every other file changed size since it was cataloged.
        let size = if i % 2 == 0 { 64 } else { 80 };
        fs::write(tmp.path().join(format!("font{i}.ttf")), vec![0u8; size]).expect("write");
    }
    let fonts = sample_table(1_000);
    let exprs = [PathExpr::Directory(tmp.path().to_path_buf())];

    c.bench_function("filter 1k files against 500 on disk", |b| {
        b.iter(|| filter(black_box(&fonts), black_box(&exprs)))
    });
}

criterion_group!(benches, bench_canonical_sort, bench_filter);
criterion_main!(benches);
