use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::*;

use offset_tree::OffsetTree;

// A plausible source file: 10k lines of varying width.
fn synthetic_doc() -> String {
    let mut rng = SmallRng::seed_from_u64(1234);
    let mut s = String::new();
    for _ in 0..10_000 {
        let len = rng.gen_range(0..80);
        for _ in 0..len {
            s.push(rng.gen_range('a'..='z'));
        }
        s.push('\n');
    }
    s
}

pub fn edit_benchmarks(c: &mut Criterion) {
    let doc = synthetic_doc();

    c.bench_function("build 10k lines", |b| {
        b.iter(|| {
            let tree = OffsetTree::new(doc.as_bytes()).unwrap();
            black_box(tree.len());
        })
    });

    c.bench_function("random point edits", |b| {
        let tree = OffsetTree::new(doc.as_bytes()).unwrap();
        b.iter(|| {
            let mut tree = tree.clone();
            let mut rng = SmallRng::seed_from_u64(321);
            for _ in 0..1000 {
                let lnum = rng.gen_range(1..tree.len());
                tree.incr(lnum, rng.gen_range(1..10)).unwrap();
            }
            black_box(tree.get(tree.len() - 1).unwrap());
        })
    });

    c.bench_function("insert/remove churn", |b| {
        let tree = OffsetTree::new(doc.as_bytes()).unwrap();
        b.iter(|| {
            let mut tree = tree.clone();
            let mut rng = SmallRng::seed_from_u64(555);
            for _ in 0..1000 {
                let lnum = rng.gen_range(0..tree.len());
                tree.insert_after(lnum).unwrap();
                tree.remove(lnum + 1).unwrap();
            }
            black_box(tree.len());
        })
    });

    c.bench_function("get sweep", |b| {
        let tree = OffsetTree::new(doc.as_bytes()).unwrap();
        b.iter(|| {
            let mut sum = 0u64;
            for k in 0..tree.len() {
                sum += tree.get(k).unwrap();
            }
            black_box(sum);
        })
    });
}

criterion_group!(benches, edit_benchmarks);
criterion_main!(benches);
