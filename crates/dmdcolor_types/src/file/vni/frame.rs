//! Frames of a VPIN animation.

use std::io::{Cursor, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::constants::{COMPRESSION_LOOKAHEAD, COMPRESSION_WINDOW, MASK_MARKER};
use crate::{file::FormatError, frame::planes, heatshrink};

/// One stored frame: bit-planes, an optional mask and timing.
///
/// Planes are kept in memory order, the on-disk bit reversal is undone on load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationFrame {
	/// Milliseconds the frame stays on screen
	pub delay: u32,
	/// Checksum of the frame as authored, 0 before version 4
	pub hash: u32,
	/// Bit-planes, least significant first
	pub planes: Vec<Vec<u8>>,
	/// Mask plane restricting where the frame applies
	pub mask: Option<Vec<u8>>,
	/// Start time of the frame relative to the animation start
	pub time_offset: u32,
}

impl AnimationFrame {
	/// Creates a frame without mask.
	pub fn new(delay: u32, hash: u32, planes: Vec<Vec<u8>>) -> Self {
		Self {
			delay,
			hash,
			planes,
			mask: None,
			time_offset: 0,
		}
	}

	/// Builder-style setter for the mask plane.
	pub fn with_mask(mut self, mask: Vec<u8>) -> Self {
		self.mask = Some(mask);
		self
	}

	/// Number of bit-planes, the mask not included.
	pub fn bit_length(&self) -> usize {
		self.planes.len()
	}

	/// Size of one plane in bytes.
	pub fn plane_size(&self) -> usize {
		self.planes.first().or(self.mask.as_ref()).map_or(0, Vec::len)
	}

	/// Reads a frame record.
	pub(crate) fn read<R: Read>(reader: &mut R, version: i16, time_offset: u32) -> Result<Self, FormatError> {
		let plane_size = non_negative(reader.read_i16::<BigEndian>()?, "plane size")?;
		let delay = u32::from(reader.read_u16::<BigEndian>()?);
		let hash = if version >= 4 {
			reader.read_u32::<BigEndian>()?
		} else {
			0
		};
		let bit_length = usize::from(reader.read_u8()?);
		let compressed = version >= 3 && reader.read_u8()? != 0;

		let (planes, mask) = if compressed {
			let compressed_size = reader.read_i32::<BigEndian>()?;
			let compressed_size = usize::try_from(compressed_size).map_err(|_| FormatError::InvalidValue {
				field: "compressed size",
				value: i64::from(compressed_size),
			})?;
			let mut block = vec![0u8; compressed_size];
			reader.read_exact(&mut block)?;

			let expected = bit_length * (plane_size + 1);
			let data =
				heatshrink::decompress_exact(&block, COMPRESSION_WINDOW, COMPRESSION_LOOKAHEAD, expected)?;
			read_planes(&mut Cursor::new(data), bit_length, plane_size)?
		} else {
			read_planes(reader, bit_length, plane_size)?
		};

		Ok(Self {
			delay,
			hash,
			planes,
			mask,
			time_offset,
		})
	}

	/// Writes the frame record. Version 3 and later store the planes compressed.
	pub(crate) fn write<W: Write>(&self, writer: &mut W, version: i16) -> Result<(), FormatError> {
		let plane_size = self.plane_size();
		let bit_length = self.planes.len() + usize::from(self.mask.is_some());
		writer.write_i16::<BigEndian>(to_i16(plane_size, "plane size")?)?;
		writer.write_u16::<BigEndian>(u16::try_from(self.delay).map_err(|_| FormatError::InvalidValue {
			field: "frame delay",
			value: i64::from(self.delay),
		})?)?;
		if version >= 4 {
			writer.write_u32::<BigEndian>(self.hash)?;
		}
		writer.write_u8(u8::try_from(bit_length).map_err(|_| FormatError::InvalidValue {
			field: "bit length",
			value: bit_length as i64,
		})?)?;

		let mut raw = Vec::with_capacity(bit_length * (plane_size + 1));
		for (i, plane) in self.planes.iter().enumerate() {
			// any byte but the mask marker introduces a plane
			raw.push(if i as u8 == MASK_MARKER { 0 } else { i as u8 });
			raw.extend(plane.iter().map(|b| b.reverse_bits()));
		}
		if let Some(mask) = &self.mask {
			raw.push(MASK_MARKER);
			raw.extend(mask.iter().map(|b| b.reverse_bits()));
		}

		if version >= 3 {
			writer.write_u8(1)?;
			let block = heatshrink::compress(&raw, COMPRESSION_WINDOW, COMPRESSION_LOOKAHEAD)?;
			writer.write_i32::<BigEndian>(i32::try_from(block.len()).map_err(|_| FormatError::InvalidValue {
				field: "compressed size",
				value: block.len() as i64,
			})?)?;
			writer.write_all(&block)?;
		} else {
			writer.write_all(&raw)?;
		}
		Ok(())
	}
}

/// Reads `count` marker-prefixed planes, splitting off the mask plane.
fn read_planes<R: Read>(
	reader: &mut R,
	count: usize,
	plane_size: usize,
) -> Result<(Vec<Vec<u8>>, Option<Vec<u8>>), FormatError> {
	let mut planes = Vec::with_capacity(count);
	let mut mask = None;
	for _ in 0..count {
		let marker = reader.read_u8()?;
		let mut plane = vec![0u8; plane_size];
		reader.read_exact(&mut plane)?;
		planes::reverse_plane(&mut plane);
		if marker == MASK_MARKER {
			mask = Some(plane);
		} else {
			planes.push(plane);
		}
	}
	Ok((planes, mask))
}

pub(crate) fn non_negative(value: i16, field: &'static str) -> Result<usize, FormatError> {
	usize::try_from(value).map_err(|_| FormatError::InvalidValue {
		field,
		value: i64::from(value),
	})
}

pub(crate) fn to_i16(value: usize, field: &'static str) -> Result<i16, FormatError> {
	i16::try_from(value).map_err(|_| FormatError::InvalidValue {
		field,
		value: value as i64,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_frame() -> AnimationFrame {
		AnimationFrame::new(40, 0xCAFE_BABE, vec![vec![0x01, 0x80], vec![0xF0, 0x0F]]).with_mask(vec![0xFF, 0x00])
	}

	#[test]
	fn test_raw_planes_are_bit_reversed() {
		// version 2: no hash, no compression flag
		let data = [0x00, 0x01, 0x00, 0x10, 0x01, 0x00, 0b0000_0001];
		let frame = AnimationFrame::read(&mut Cursor::new(&data[..]), 2, 0).unwrap();
		assert_eq!(frame.delay, 16);
		assert_eq!(frame.planes, vec![vec![0b1000_0000]]);
		assert!(frame.mask.is_none());
	}

	#[test]
	fn test_mask_marker() {
		let data = [0x00, 0x01, 0x00, 0x10, 0x02, 0x00, 0x01, MASK_MARKER, 0x03];
		let frame = AnimationFrame::read(&mut Cursor::new(&data[..]), 2, 0).unwrap();
		assert_eq!(frame.bit_length(), 1);
		assert_eq!(frame.mask, Some(vec![0xC0]));
	}

	#[test]
	fn test_compressed_roundtrip() {
		let frame = sample_frame();
		let mut out = Vec::new();
		frame.write(&mut out, 6).unwrap();
		let parsed = AnimationFrame::read(&mut Cursor::new(&out[..]), 6, 0).unwrap();
		assert_eq!(parsed, frame);
	}

	#[test]
	fn test_uncompressed_v3_frame() {
		let mut data = vec![0x00, 0x01, 0x00, 0x05, 0x01, 0x00];
		data.extend_from_slice(&[0x00, 0xAA]);
		let frame = AnimationFrame::read(&mut Cursor::new(&data[..]), 3, 100).unwrap();
		assert_eq!(frame.planes, vec![vec![0x55]]);
		assert_eq!(frame.time_offset, 100);
	}

	#[test]
	fn test_truncated_compressed_block() {
		let frame = sample_frame();
		let mut out = Vec::new();
		frame.write(&mut out, 6).unwrap();
		out.truncate(out.len() - 1);
		assert!(AnimationFrame::read(&mut Cursor::new(&out[..]), 6, 0).is_err());
	}

	#[test]
	fn test_negative_plane_size() {
		let data = [0xFF, 0xFF, 0x00, 0x10, 0x01];
		let err = AnimationFrame::read(&mut Cursor::new(&data[..]), 2, 0).unwrap_err();
		assert!(matches!(err, FormatError::InvalidValue { field: "plane size", .. }));
	}
}
