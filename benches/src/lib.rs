//! Benchmark helper utilities for dmdcolor-rs
//!
//! This module provides generators for synthetic frames, codec payloads and cROM tables.
//! Everything is derived from a seed so runs stay comparable.

use dmdcolor_types::{
	file::{CromFile, CromFrame},
	frame::{Color, Dimensions},
};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Generates a gray frame with bands of the given depth
///
/// The pattern mixes flat runs with diagonal stripes, close to what a DMD shows for text
/// over an animated background.
pub fn generate_gray_frame(dim: Dimensions, bit_length: usize, seed: u8) -> Vec<u8> {
	let max = (1u16 << bit_length) - 1;
	(0..dim.surface())
		.map(|i| {
			let x = i % dim.width;
			let y = i / dim.width;
			if (y / 4) % 2 == 0 {
				(((x + y) / 3 + usize::from(seed)) as u16 % (max + 1)) as u8
			} else {
				0
			}
		})
		.collect()
}

/// Generates a codec payload of `len` bytes
///
/// Runs of repeated frame-like rows alternate with noise, so both literals and back-references
/// are exercised.
pub fn generate_payload(len: usize, seed: u64) -> Vec<u8> {
	let mut rng = SmallRng::seed_from_u64(seed);
	let mut data = Vec::with_capacity(len);
	while data.len() < len {
		if rng.random_bool(1.0 / 3.0) {
			let run = rng.random_range(4..52);
			let byte: u8 = rng.random();
			data.extend(std::iter::repeat_n(byte, run));
		} else {
			let mut noise = [0u8; 4];
			rng.fill(&mut noise);
			data.extend_from_slice(&noise);
		}
	}
	data.truncate(len);
	data
}

/// Builds a cROM table with `rows` static frames and returns it with the gray source frames
pub fn generate_crom_store(rows: usize, dim: Dimensions) -> (CromFile, Vec<Vec<u8>>) {
	let palette: Vec<Color> = (0..64).map(|i| Color::new(i * 4, 255 - i * 4, 128)).collect();
	let mut store = CromFile::new("bench", dim, 64);
	let mut sources = Vec::with_capacity(rows);

	for row in 0..rows {
		let source = generate_gray_frame(dim, 2, row as u8);
		let colored = source.iter().map(|&v| v * 16).collect();
		let frame = CromFrame::matching(&source, row % 4 == 0, palette.clone(), colored);
		if store.add_frame(&frame).is_ok() {
			sources.push(source);
		}
	}
	(store, sources)
}

/// Common benchmark sizes for synthetic test data
pub mod sizes {
	use dmdcolor_types::frame::Dimensions;

	/// Classic display: 128x32
	pub const STANDARD: Dimensions = Dimensions::new(128, 32);
	/// Narrow display: 192x64
	pub const WIDE: Dimensions = Dimensions::new(192, 64);
	/// Upscaled display: 256x64
	pub const DOUBLED: Dimensions = Dimensions::new(256, 64);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_generate_gray_frame() {
		let frame = generate_gray_frame(sizes::STANDARD, 2, 0);
		assert_eq!(frame.len(), 4096);
		assert!(frame.iter().all(|&v| v < 4));
		assert!(frame.iter().any(|&v| v > 0));
		assert_ne!(frame, generate_gray_frame(sizes::STANDARD, 2, 1));
	}

	#[test]
	fn test_generate_payload() {
		let data = generate_payload(10_000, 7);
		assert_eq!(data.len(), 10_000);
		assert_eq!(data, generate_payload(10_000, 7));
		assert_ne!(data, generate_payload(10_000, 8));
	}

	#[test]
	fn test_generate_crom_store() {
		let (mut store, sources) = generate_crom_store(8, sizes::STANDARD);
		assert_eq!(store.len(), sources.len());
		assert!(store.identify(&sources[5]).is_some());
	}

	#[test]
	fn test_sizes_constants() {
		assert_eq!(sizes::STANDARD.surface(), 4096);
		assert_eq!(sizes::DOUBLED, sizes::STANDARD.doubled());
	}
}
