//! Benchmark suite for the HeatShrink codec
//!
//! Measures one-shot compression and decompression at the VPIN parameters and a few other
//! window/lookahead pairs, plus streaming decompression through small output buffers.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml --bench codec

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dmdcolor_benches::generate_payload;
use dmdcolor_types::heatshrink::{self, PollStatus, decoder::Decoder};
use std::hint::black_box;

const PARAMETERS: [(u8, u8); 3] = [(10, 0), (8, 4), (12, 5)];

/// Benchmark one-shot compression
fn bench_compress(c: &mut Criterion) {
	let mut group = c.benchmark_group("heatshrink_compress");

	for len in [2_048usize, 16_384] {
		let data = generate_payload(len, 1);
		group.throughput(Throughput::Bytes(len as u64));
		for (window, lookahead) in PARAMETERS {
			group.bench_with_input(BenchmarkId::new(format!("w{window}_l{lookahead}"), len), &data, |b, data| {
				b.iter(|| black_box(heatshrink::compress(black_box(data), window, lookahead)));
			});
		}
	}

	group.finish();
}

/// Benchmark one-shot decompression
fn bench_decompress(c: &mut Criterion) {
	let mut group = c.benchmark_group("heatshrink_decompress");

	for len in [2_048usize, 16_384] {
		let data = generate_payload(len, 2);
		group.throughput(Throughput::Bytes(len as u64));
		for (window, lookahead) in PARAMETERS {
			let Ok(packed) = heatshrink::compress(&data, window, lookahead) else {
				eprintln!("Warning: could not compress payload for w{window} l{lookahead}");
				continue;
			};
			group.bench_with_input(BenchmarkId::new(format!("w{window}_l{lookahead}"), len), &packed, |b, packed| {
				b.iter(|| black_box(heatshrink::decompress(black_box(packed), window, lookahead)));
			});
		}
	}

	group.finish();
}

/// Benchmark streaming decompression through a small output buffer
fn bench_streaming(c: &mut Criterion) {
	let mut group = c.benchmark_group("heatshrink_streaming");

	let data = generate_payload(16_384, 3);
	let packed = heatshrink::compress(&data, 10, 0).unwrap();
	group.throughput(Throughput::Bytes(data.len() as u64));

	for chunk in [16usize, 256] {
		group.bench_with_input(BenchmarkId::new("poll_chunk", chunk), &packed, |b, packed| {
			b.iter(|| {
				let mut decoder = Decoder::new(10, 0, 1024).unwrap();
				let mut out = vec![0u8; chunk];
				let mut total = 0usize;
				let mut input = packed.as_slice();
				while !input.is_empty() {
					let accepted = decoder.sink(input).accepted();
					input = &input[accepted..];
					loop {
						let status = decoder.poll(&mut out);
						total += status.written();
						if matches!(status, PollStatus::Empty(_)) {
							break;
						}
					}
				}
				black_box(total)
			});
		});
	}

	group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress, bench_streaming);

criterion_main!(benches);
