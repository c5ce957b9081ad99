//! Bit-plane packing and plane arithmetic.
//!
//! A frame of bit depth *n* is stored as *n* planes. Plane *k* holds bit *k* of every
//! pixel, row-major, eight pixels per byte. Within a byte the first pixel sits in bit 0:
//!
//! ```text
//! pixels:  p0 p1 p2 p3 p4 p5 p6 p7
//! byte:    b0 b1 b2 b3 b4 b5 b6 b7   (b0 = least significant bit)
//! ```
//!
//! Bundles on disk store every plane byte with the opposite bit order, see [`reverse_plane`].

use super::Dimensions;

/// Splits a one-byte-per-pixel frame into `bit_length` planes.
///
/// Each plane is [`Dimensions::plane_size`] bytes; a trailing partial byte is zero-padded.
pub fn split(dim: Dimensions, bit_length: usize, pixels: &[u8]) -> Vec<Vec<u8>> {
	let mut planes = vec![vec![0u8; dim.plane_size()]; bit_length];
	for (index, &pixel) in pixels.iter().take(dim.surface()).enumerate() {
		let byte = index / 8;
		let bit = 1u8 << (index % 8);
		for (k, plane) in planes.iter_mut().enumerate() {
			if pixel & (1 << k) != 0 {
				plane[byte] |= bit;
			}
		}
	}
	planes
}

/// Joins planes back into a one-byte-per-pixel frame.
pub fn join(dim: Dimensions, planes: &[Vec<u8>]) -> Vec<u8> {
	let mut pixels = vec![0u8; dim.surface()];
	for (k, plane) in planes.iter().enumerate() {
		for (index, pixel) in pixels.iter_mut().enumerate() {
			let Some(&byte) = plane.get(index / 8) else {
				break;
			};
			if byte & (1 << (index % 8)) != 0 {
				*pixel |= 1 << k;
			}
		}
	}
	pixels
}

/// Reverses the bit order of every byte in a plane, in place.
pub fn reverse_plane(plane: &mut [u8]) {
	for byte in plane {
		*byte = byte.reverse_bits();
	}
}

/// Returns a bit-reversed copy of a plane.
pub fn reversed(plane: &[u8]) -> Vec<u8> {
	plane.iter().map(|b| b.reverse_bits()).collect()
}

/// ORs `src` into `dst`.
pub fn or_plane(src: &[u8], dst: &mut [u8]) {
	for (d, s) in dst.iter_mut().zip(src) {
		*d |= s;
	}
}

/// Zeroes a plane.
pub fn clear_plane(plane: &mut [u8]) {
	plane.fill(0);
}

/// Takes `masked` where the mask bit is set and `unmasked` everywhere else.
pub fn combine_with_mask(masked: &[u8], unmasked: &[u8], mask: &[u8]) -> Vec<u8> {
	masked
		.iter()
		.zip(unmasked)
		.zip(mask)
		.map(|((m, u), k)| (m & k) | (u & !k))
		.collect()
}
