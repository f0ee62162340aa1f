//! Rope benchmark: structural operations at editor-buffer scale.
//!
//! Target: O(log n) indexed access and splicing on megabyte ropes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use strand::{repeat, Rope, TextView};

/// A rope of `words` distinct small leaves.
fn build_rope(words: usize) -> Rope {
    let mut rope = Rope::new();
    for i in 0..words {
        let at = rope.len();
        rope.insert(at, &format!("word{i:06} ")).unwrap();
    }
    rope
}

fn rope_append_str(c: &mut Criterion) {
    c.bench_function("rope_append_str", |b| {
        let mut rope = Rope::new();
        b.iter(|| {
            let at = rope.len();
            rope.insert(at, black_box("streamed token ")).unwrap();
        });
    });
}

fn rope_insert_middle(c: &mut Criterion) {
    c.bench_function("rope_insert_middle_10k_leaves", |b| {
        let base = build_rope(10_000);
        b.iter(|| {
            let mut rope = base.clone();
            rope.insert(black_box(rope.len() / 2), "spliced").unwrap();
            black_box(rope.len())
        });
    });
}

fn rope_index(c: &mut Criterion) {
    let rope = build_rope(10_000);
    let mid = rope.len() / 2;
    c.bench_function("rope_get_10k_leaves", |b| {
        b.iter(|| rope.get(black_box(mid)));
    });
}

fn rope_substr(c: &mut Criterion) {
    let rope = build_rope(10_000);
    let quarter = rope.len() / 4;
    c.bench_function("rope_substr_half", |b| {
        b.iter(|| {
            let sub = rope.substr(black_box(quarter), quarter * 3).unwrap();
            black_box(sub.len())
        });
    });
}

fn rope_erase_middle(c: &mut Criterion) {
    c.bench_function("rope_erase_middle_10k_leaves", |b| {
        let base = build_rope(10_000);
        let lo = base.len() / 2;
        b.iter(|| {
            let mut rope = base.clone();
            rope.erase(black_box(lo)..lo + 64).unwrap();
            black_box(rope.len())
        });
    });
}

fn rope_clone_and_diverge(c: &mut Criterion) {
    c.bench_function("rope_clone_then_one_edit", |b| {
        let base = build_rope(10_000);
        b.iter(|| {
            let mut copy = base.clone();
            copy.insert(0, "divergent ").unwrap();
            black_box(copy.len())
        });
    });
}

fn rope_iterate_bytes(c: &mut Criterion) {
    let rope = build_rope(2_000);
    c.bench_function("rope_sum_bytes_2k_leaves", |b| {
        b.iter(|| {
            let sum: u64 = rope.bytes().map(u64::from).sum();
            black_box(sum)
        });
    });
}

fn rope_repeated_insert(c: &mut Criterion) {
    c.bench_function("rope_insert_repeated_lazy", |b| {
        let rv = repeat(TextView::new("tile "), 100_000);
        b.iter(|| {
            let mut rope = Rope::from("seed");
            rope.insert_repeated(2, rv).unwrap();
            black_box(rope.len())
        });
    });
}

fn rope_scale_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("rope_scale");

    for leaf_count in [1_000, 10_000, 100_000] {
        group.bench_with_input(
            BenchmarkId::new("build_by_append", leaf_count),
            &leaf_count,
            |b, &count| {
                b.iter(|| {
                    let rope = build_rope(count);
                    black_box(rope.len())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    rope_append_str,
    rope_insert_middle,
    rope_index,
    rope_substr,
    rope_erase_middle,
    rope_clone_and_diverge,
    rope_iterate_bytes,
    rope_repeated_insert,
    rope_scale_comparison,
);
criterion_main!(benches);
