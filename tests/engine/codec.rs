//! HeatShrink at file level

use dmdcolor_rs::heatshrink::{self, Decoder, Encoder};
use dmdcolor_rs::prelude::*;

/// Marker-prefixed plane data as it sits in a VPIN frame block
fn vpin_block() -> Vec<u8> {
	let mut raw = Vec::new();
	for marker in 0..4u8 {
		raw.push(marker);
		raw.extend((0..512).map(|i| if (i / 16) % 3 == 0 { 0 } else { (i % 7) as u8 * marker }));
	}
	raw
}

#[test]
fn test_vpin_parameters_roundtrip() {
	crate::init_logger();
	let raw = vpin_block();
	let packed = compress(&raw, 10, 0).unwrap();
	assert_eq!(decompress(&packed, 10, 0).unwrap(), raw);
	assert_eq!(heatshrink::decompress_exact(&packed, 10, 0, raw.len()).unwrap(), raw);
}

#[test]
fn test_lookahead_compresses_runs() {
	let raw = vpin_block();
	let packed = compress(&raw, 8, 4).unwrap();
	assert!(packed.len() < raw.len());
	assert_eq!(decompress(&packed, 8, 4).unwrap(), raw);
}

#[test]
fn test_streaming_codecs_match_one_shot() {
	let raw = vpin_block();
	for (window, lookahead) in [(10, 0), (8, 4), (5, 3)] {
		let mut encoder = Encoder::new(window, lookahead).unwrap();
		let packed = heatshrink::run(&mut encoder, &raw).unwrap();
		assert_eq!(packed, compress(&raw, window, lookahead).unwrap());

		let mut decoder = Decoder::new(window, lookahead, 64).unwrap();
		assert_eq!(heatshrink::run(&mut decoder, &packed).unwrap(), raw);
	}
}

#[test]
fn test_short_block_is_reported() {
	let raw = vpin_block();
	let packed = compress(&raw, 10, 0).unwrap();
	let err = heatshrink::decompress_exact(&packed, 10, 0, raw.len() + 1).unwrap_err();
	assert!(matches!(err, CodecError::Truncated { .. }));
}

#[test]
fn test_invalid_parameters() {
	assert!(matches!(compress(b"abc", 3, 2), Err(CodecError::InvalidParameters { .. })));
	assert!(matches!(decompress(b"abc", 8, 8), Err(CodecError::InvalidParameters { .. })));
}
