/// Benchmarks for extraction and the force-directed layout.
///
/// Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pycallmap::domain::{CallEdgeDescriptor, FunctionDescriptor, LayoutParams};
use pycallmap::infrastructure::extract_source;
use pycallmap::{ExtractOptions, Graph};

// ═══════════════════════════════════════════════════════════════════════════
// Synthetic Data Generators
// ═══════════════════════════════════════════════════════════════════════════

/// Python module with `count` functions, each calling the next two.
fn synthetic_module(count: usize) -> String {
    let mut source = String::new();
    for i in 0..count {
        source.push_str(&format!("def func_{}(a, b=None):\n", i));
        for j in 1..=2 {
            if i + j < count {
                source.push_str(&format!("    func_{}(a)\n", i + j));
            }
        }
        source.push_str("    return a\n\n");
    }
    source
}

/// Descriptors for a ring of `count` functions.
fn synthetic_ring(count: usize) -> (Vec<FunctionDescriptor>, Vec<CallEdgeDescriptor>) {
    let functions = (0..count)
        .map(|i| FunctionDescriptor::new(format!("f{}", i), vec!["x".into()], vec![]))
        .collect();
    let edges = (0..count)
        .map(|i| CallEdgeDescriptor::new(format!("f{}", i), format!("f{}", (i + 1) % count)))
        .collect();
    (functions, edges)
}

// ═══════════════════════════════════════════════════════════════════════════
// Benchmarks
// ═══════════════════════════════════════════════════════════════════════════

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract/python");

    for count in [50, 200, 1000] {
        let source = synthetic_module(count);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("functions", count), &source, |b, source| {
            b.iter(|| extract_source(black_box(source), ExtractOptions::default()))
        });
    }

    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/force_directed");
    group.sample_size(20);
    let params = LayoutParams::default();

    for count in [10, 50, 150] {
        let (functions, edges) = synthetic_ring(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("nodes", count), &count, |b, _| {
            b.iter(|| Graph::build_from_parts(black_box(&functions), &edges, &[], &params))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_extraction, bench_layout);
criterion_main!(benches);
