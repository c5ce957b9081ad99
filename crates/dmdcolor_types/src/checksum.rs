//! CRC32 checksums used for frame recognition.
//!
//! All hashes are the standard reflected CRC32 (polynomial `0xEDB88320`, initial value
//! `0xFFFFFFFF`, final complement). On top of the plain checksum there are two ways of
//! restricting what takes part in the hash:
//!
//! | Function | Input | Mask convention |
//! |----------|-------|-----------------|
//! | [`pixels`] | one byte per pixel | none |
//! | [`pixels_masked`] | one byte per pixel | pixel counts when `mask[i] == 0` |
//! | [`plane`] | packed bit-plane | none |
//! | [`plane_masked`] | packed bit-plane | hashes `plane[i] & mask[i]` |
//!
//! The pixel variants additionally take a `shape` flag: in shape mode every pixel value
//! above 1 is hashed as 1, so a frame is recognized by its silhouette only.
//!
//! # Examples
//!
//! ```
//! use dmdcolor_types::checksum;
//!
//! assert_eq!(checksum::checksum(b"123456789"), 0xCBF4_3926);
//!
//! // Shape mode collapses every lit pixel to 1
//! let dim = [0u8, 1, 2, 3];
//! let bright = [0u8, 1, 3, 3];
//! assert_eq!(checksum::pixels(&dim, true), checksum::pixels(&bright, true));
//! ```

/// Reflected CRC32 polynomial
pub const POLYNOMIAL: u32 = 0xEDB8_8320;

/// Lookup table, evaluated at compile time.
pub static TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
	let mut table = [0u32; 256];
	let mut i = 0;
	while i < 256 {
		let mut crc = i as u32;
		let mut bit = 0;
		while bit < 8 {
			crc = if crc & 1 != 0 {
				(crc >> 1) ^ POLYNOMIAL
			} else {
				crc >> 1
			};
			bit += 1;
		}
		table[i] = crc;
		i += 1;
	}
	table
}

/// Incremental CRC32 state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc32 {
	state: u32,
}

impl Crc32 {
	/// Starts a new checksum.
	pub const fn new() -> Self {
		Self {
			state: 0xFFFF_FFFF,
		}
	}

	/// Feeds a single byte.
	#[inline]
	pub fn push(&mut self, byte: u8) {
		self.state = (self.state >> 8) ^ TABLE[((self.state ^ u32::from(byte)) & 0xFF) as usize];
	}

	/// Feeds a run of bytes.
	pub fn update(&mut self, bytes: &[u8]) {
		for &byte in bytes {
			self.push(byte);
		}
	}

	/// Returns the final checksum value.
	pub const fn finalize(self) -> u32 {
		!self.state
	}
}

impl Default for Crc32 {
	fn default() -> Self {
		Self::new()
	}
}

/// Plain CRC32 over a byte buffer.
pub fn checksum(data: &[u8]) -> u32 {
	let mut crc = Crc32::new();
	crc.update(data);
	crc.finalize()
}

#[inline]
fn shaped(value: u8, shape: bool) -> u8 {
	if shape && value > 1 {
		1
	} else {
		value
	}
}

/// CRC32 over a one-byte-per-pixel frame.
///
/// With `shape` set, pixel values above 1 are hashed as 1.
pub fn pixels(frame: &[u8], shape: bool) -> u32 {
	let mut crc = Crc32::new();
	for &value in frame {
		crc.push(shaped(value, shape));
	}
	crc.finalize()
}

/// CRC32 over the unmasked pixels of a one-byte-per-pixel frame.
///
/// A pixel takes part in the hash only when its mask byte is zero. Pixels beyond the end of
/// the shorter buffer are ignored.
pub fn pixels_masked(frame: &[u8], mask: &[u8], shape: bool) -> u32 {
	let mut crc = Crc32::new();
	for (&value, _) in frame.iter().zip(mask).filter(|(_, m)| **m == 0) {
		crc.push(shaped(value, shape));
	}
	crc.finalize()
}

/// CRC32 over a packed bit-plane.
pub fn plane(plane: &[u8]) -> u32 {
	checksum(plane)
}

/// CRC32 over a packed bit-plane after AND-ing it with a plane mask.
///
/// Bits cleared in the mask are hashed as zero, so changes underneath the cleared area do not
/// affect the result.
pub fn plane_masked(plane: &[u8], mask: &[u8]) -> u32 {
	let mut crc = Crc32::new();
	for (&byte, &keep) in plane.iter().zip(mask) {
		crc.push(byte & keep);
	}
	crc.finalize()
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_table_matches_reference_entries() {
		assert_eq!(TABLE[0], 0x0000_0000);
		assert_eq!(TABLE[1], 0x7707_3096);
		assert_eq!(TABLE[255], 0x2D02_EF8D);
	}

	#[test]
	fn test_known_vectors() {
		assert_eq!(checksum(b""), 0);
		assert_eq!(checksum(b"123456789"), 0xCBF4_3926);
		assert_eq!(checksum(b"The quick brown fox jumps over the lazy dog"), 0x414F_A339);
	}

	#[test]
	fn test_incremental_matches_one_shot() {
		let data = b"dot matrix display";
		let mut crc = Crc32::new();
		crc.update(&data[..5]);
		crc.update(&data[5..]);
		assert_eq!(crc.finalize(), checksum(data));
	}

	#[test]
	fn test_pixels_without_shape_is_plain_crc() {
		let frame = [0u8, 1, 2, 3, 2, 1, 0];
		assert_eq!(pixels(&frame, false), checksum(&frame));
	}

	#[test]
	fn test_masked_with_empty_mask_covers_everything() {
		let frame = [3u8, 0, 2, 1];
		let mask = [0u8; 4];
		assert_eq!(pixels_masked(&frame, &mask, false), checksum(&frame));
	}

	#[test]
	fn test_masked_skips_masked_pixels() {
		let frame = [3u8, 9, 2, 1];
		let mask = [0u8, 1, 0, 0];
		assert_eq!(pixels_masked(&frame, &mask, false), checksum(&[3, 2, 1]));
	}

	#[test]
	fn test_plane_masked_with_full_mask_is_plain_crc() {
		let plane_data = [0xA5u8, 0x5A, 0xFF, 0x00];
		assert_eq!(plane_masked(&plane_data, &[0xFF; 4]), plane(&plane_data));
	}

	proptest! {
		#[test]
		fn prop_checksum_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..512)) {
			prop_assert_eq!(checksum(&data), checksum(&data));
		}

		#[test]
		fn prop_masked_ignores_changes_under_mask(
			pairs in proptest::collection::vec((0u8..4, any::<bool>(), 0u8..4), 1..256),
		) {
			let frame: Vec<u8> = pairs.iter().map(|(v, _, _)| *v).collect();
			let mask: Vec<u8> = pairs.iter().map(|(_, m, _)| u8::from(*m)).collect();
			let altered: Vec<u8> = pairs
				.iter()
				.map(|(v, m, other)| if *m { *other } else { *v })
				.collect();
			prop_assert_eq!(pixels_masked(&frame, &mask, false), pixels_masked(&altered, &mask, false));
		}

		#[test]
		fn prop_plane_mask_ignores_cleared_bits(
			bytes in proptest::collection::vec((any::<u8>(), any::<u8>(), any::<u8>()), 1..128),
		) {
			let plane_data: Vec<u8> = bytes.iter().map(|(p, _, _)| *p).collect();
			let mask: Vec<u8> = bytes.iter().map(|(_, m, _)| *m).collect();
			let altered: Vec<u8> = bytes.iter().map(|(p, m, noise)| (p & m) | (noise & !m)).collect();
			prop_assert_eq!(plane_masked(&plane_data, &mask), plane_masked(&altered, &mask));
		}

		#[test]
		fn prop_shape_collapses_values_above_one(
			pixels_in in proptest::collection::vec((0u8..4, 2u8..=255), 1..256),
		) {
			let frame: Vec<u8> = pixels_in.iter().map(|(v, _)| *v).collect();
			let other: Vec<u8> = pixels_in.iter().map(|(v, r)| if *v > 1 { *r } else { *v }).collect();
			prop_assert_eq!(pixels(&frame, true), pixels(&other, true));
		}
	}
}
