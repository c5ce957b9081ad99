//! Benchmark suite for frame checksums
//!
//! Covers the plain table CRC32 over pixels and planes, the masked variants and shape mode,
//! at the display sizes seen in practice.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml --bench checksum

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dmdcolor_benches::{generate_gray_frame, sizes};
use dmdcolor_types::{checksum, frame::planes};
use std::hint::black_box;

/// Benchmark pixel checksums in every matching mode
fn bench_pixels(c: &mut Criterion) {
	let mut group = c.benchmark_group("checksum_pixels");

	for dim in [sizes::STANDARD, sizes::WIDE, sizes::DOUBLED] {
		let frame = generate_gray_frame(dim, 4, 0);
		let mask: Vec<u8> = (0..dim.surface()).map(|i| u8::from(i % dim.width < 16)).collect();
		group.throughput(Throughput::Elements(dim.surface() as u64));

		group.bench_with_input(BenchmarkId::new("plain", dim), &frame, |b, frame| {
			b.iter(|| black_box(checksum::pixels(black_box(frame), false)));
		});
		group.bench_with_input(BenchmarkId::new("shape", dim), &frame, |b, frame| {
			b.iter(|| black_box(checksum::pixels(black_box(frame), true)));
		});
		group.bench_with_input(BenchmarkId::new("masked", dim), &frame, |b, frame| {
			b.iter(|| black_box(checksum::pixels_masked(black_box(frame), &mask, false)));
		});
	}

	group.finish();
}

/// Benchmark per-plane checksums as the colorizer computes them
fn bench_planes(c: &mut Criterion) {
	let mut group = c.benchmark_group("checksum_planes");

	for dim in [sizes::STANDARD, sizes::DOUBLED] {
		let frame = generate_gray_frame(dim, 4, 1);
		let split = planes::split(dim, 4, &frame);
		let mask = vec![0xF0u8; dim.plane_size()];
		group.throughput(Throughput::Bytes((dim.plane_size() * split.len()) as u64));

		group.bench_with_input(BenchmarkId::new("split_and_hash", dim), &frame, |b, frame| {
			b.iter(|| {
				let split = planes::split(dim, 4, black_box(frame));
				black_box(split.iter().map(|p| checksum::plane(p)).fold(0u32, |acc, crc| acc ^ crc))
			});
		});
		group.bench_with_input(BenchmarkId::new("masked", dim), &split, |b, split| {
			b.iter(|| {
				black_box(split.iter().map(|p| checksum::plane_masked(p, &mask)).fold(0u32, |acc, crc| acc ^ crc))
			});
		});
	}

	group.finish();
}

criterion_group!(benches, bench_pixels, bench_planes);

criterion_main!(benches);
