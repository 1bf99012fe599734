//! Benchmarks for alignment and the full per-artifact pipeline.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use diffdoc_core::{align_with, AlignOptions, Algorithm, ArtifactPair, DiffEngine, EngineConfig};

/// A Rust-looking source file with every `stride`-th line edited.
fn source_pair(lines: usize, stride: usize) -> (Vec<String>, Vec<String>) {
    let old: Vec<String> = (0..lines)
        .map(|n| match n % 4 {
            0 => format!("fn item_{}() -> usize {{", n),
            1 => format!("    let value = {};", n),
            2 => "    value".to_string(),
            _ => "}".to_string(),
        })
        .collect();
    let new = old
        .iter()
        .enumerate()
        .map(|(n, line)| {
            if n % stride == 0 {
                format!("{} // edited", line)
            } else {
                line.clone()
            }
        })
        .collect();
    (old, new)
}

fn bench_align(c: &mut Criterion) {
    let mut group = c.benchmark_group("align");
    for size in [200usize, 2_000] {
        let (old, new) = source_pair(size, 17);
        for algorithm in [Algorithm::Heuristic, Algorithm::Myers, Algorithm::Patience] {
            let options = AlignOptions {
                algorithm,
                autojunk: true,
            };
            group.bench_with_input(
                BenchmarkId::new(algorithm.as_str(), size),
                &(&old, &new),
                |b, (old, new)| b.iter(|| black_box(align_with(old, new, options))),
            );
        }
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let (old, new) = source_pair(1_000, 23);
    let old = old.join("\n").into_bytes();
    let new = new.join("\n").into_bytes();
    let engine = DiffEngine::new(EngineConfig::default().with_context(Some(3)));

    c.bench_function("diff_rust_file_1000_lines", |b| {
        b.iter(|| {
            black_box(engine.diff(ArtifactPair::new("bench.rs", old.clone(), new.clone())))
        })
    });
}

criterion_group!(benches, bench_align, bench_pipeline);
criterion_main!(benches);
