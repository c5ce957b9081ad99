//! Benchmark suite for cROM identification
//!
//! Measures the scan over tables of growing size, both for rows that sit right after the
//! previous hit and for frames that match nothing and force a full wrap.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml --bench crom

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dmdcolor_benches::{generate_crom_store, sizes};
use std::hint::black_box;

/// Benchmark identification of stored frames in sequence
fn bench_identify_sequence(c: &mut Criterion) {
	let mut group = c.benchmark_group("crom_identify");

	for rows in [64usize, 512, 2_048] {
		let (store, sources) = generate_crom_store(rows, sizes::STANDARD);
		group.throughput(Throughput::Elements(sources.len() as u64));
		group.bench_with_input(BenchmarkId::new("sequence", rows), &sources, |b, sources| {
			let mut store = store.clone();
			b.iter(|| {
				let hits = sources.iter().filter(|s| store.identify(black_box(s)).is_some()).count();
				black_box(hits)
			});
		});
	}

	group.finish();
}

/// Benchmark a miss, which scans every row group once
fn bench_identify_miss(c: &mut Criterion) {
	let mut group = c.benchmark_group("crom_miss");

	let unknown = vec![3u8; sizes::STANDARD.surface()];
	for rows in [64usize, 2_048] {
		let (mut store, _) = generate_crom_store(rows, sizes::STANDARD);
		group.bench_function(BenchmarkId::new("full_scan", rows), |b| {
			b.iter(|| black_box(store.identify(black_box(&unknown))));
		});
	}

	group.finish();
}

/// Benchmark identify plus colorize
fn bench_colorize(c: &mut Criterion) {
	let mut group = c.benchmark_group("crom_colorize");

	let (mut store, sources) = generate_crom_store(256, sizes::STANDARD);
	group.throughput(Throughput::Elements(sizes::STANDARD.surface() as u64));
	group.bench_function("colorize_frame", |b| {
		b.iter(|| black_box(store.colorize_frame(black_box(&sources[100]))));
	});

	group.finish();
}

criterion_group!(benches, bench_identify_sequence, bench_identify_miss, bench_colorize);

criterion_main!(benches);
