//! cROM header.

use std::{
	fmt,
	io::{Read, Write},
};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

use crate::{file::FormatError, frame::Dimensions};

/// Size of the zero-padded name field
pub const NAME_SIZE: usize = 64;

/// Size of the header in bytes
pub const HEADER_SIZE: usize = NAME_SIZE + 7 * 4;

/// Fixed-size header of a cROM table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Header {
	/// ROM name
	pub name: String,
	/// Frame width in pixels
	pub width: u32,
	/// Frame height in pixels
	pub height: u32,
	/// Number of stored frames
	pub frames: u32,
	/// Colors per frame palette
	pub colors: u32,
	/// Number of comparison masks
	pub comparison_masks: u32,
	/// Number of moving comparison rectangles
	pub moving_rects: u32,
}

impl Header {
	/// Frame size.
	pub fn dimensions(&self) -> Dimensions {
		Dimensions::new(self.width as usize, self.height as usize)
	}

	/// Pixels per frame.
	pub fn surface(&self) -> usize {
		self.dimensions().surface()
	}

	/// Reads the header.
	pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, FormatError> {
		let mut name = [0u8; NAME_SIZE];
		reader.read_exact(&mut name)?;
		let end = name.iter().position(|&b| b == 0).unwrap_or(NAME_SIZE);
		let name = String::from_utf8_lossy(&name[..end]).into_owned();

		let width = reader.read_u32::<LittleEndian>()?;
		let height = reader.read_u32::<LittleEndian>()?;
		let frames = reader.read_u32::<LittleEndian>()?;
		// unused
		reader.read_u32::<LittleEndian>()?;
		let colors = reader.read_u32::<LittleEndian>()?;
		let comparison_masks = reader.read_u32::<LittleEndian>()?;
		let moving_rects = reader.read_u32::<LittleEndian>()?;

		Ok(Self {
			name,
			width,
			height,
			frames,
			colors,
			comparison_masks,
			moving_rects,
		})
	}

	/// Writes the header. Names longer than the field are cut.
	pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
		let mut name = [0u8; NAME_SIZE];
		let bytes = self.name.as_bytes();
		let len = bytes.len().min(NAME_SIZE - 1);
		name[..len].copy_from_slice(&bytes[..len]);
		writer.write_all(&name)?;

		writer.write_u32::<LittleEndian>(self.width)?;
		writer.write_u32::<LittleEndian>(self.height)?;
		writer.write_u32::<LittleEndian>(self.frames)?;
		writer.write_u32::<LittleEndian>(0)?;
		writer.write_u32::<LittleEndian>(self.colors)?;
		writer.write_u32::<LittleEndian>(self.comparison_masks)?;
		writer.write_u32::<LittleEndian>(self.moving_rects)?;
		Ok(())
	}
}

impl fmt::Display for Header {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"cROM \"{}\": {}x{}, {} frame(s), {} color(s), {} mask(s)",
			self.name, self.width, self.height, self.frames, self.colors, self.comparison_masks
		)
	}
}
