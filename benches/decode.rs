//! Decode throughput benchmarks.
//!
//! ```bash
//! cargo bench --bench decode
//! ```
//!
//! The reconstruction target is <50 ms at typical pharmaceutical input
//! lengths (~40 characters); the fast path should sit orders of magnitude
//! below that.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gs1_decode::{decode, AiDictionary, DecodeOptions};

const SEPARATED: &str = "01062867400002491728043010GB2C\u{1d}21ABCDEFGH";
const STRIPPED: &str = "01062867400002491728043010GB2C2171490437969853";

fn bench_fast_path(c: &mut Criterion) {
    let options = DecodeOptions::default();
    c.bench_function("decode/fast_path", |b| {
        b.iter(|| decode(black_box(SEPARATED), &options));
    });
}

fn bench_reconstruction(c: &mut Criterion) {
    let options = DecodeOptions::default();
    c.bench_function("decode/reconstruction", |b| {
        b.iter(|| decode(black_box(STRIPPED), &options));
    });
}

fn bench_dictionary_lookup(c: &mut Criterion) {
    let dict = AiDictionary::builtin();
    c.bench_function("dictionary/longest_match", |b| {
        b.iter(|| dict.longest_match(black_box(STRIPPED), 0));
    });
}

criterion_group!(
    benches,
    bench_fast_path,
    bench_reconstruction,
    bench_dictionary_lookup
);
criterion_main!(benches);
