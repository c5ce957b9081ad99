//! Palette records of a coloring bundle.

use std::{
	fmt,
	io::{Read, Write},
};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

use crate::{
	file::FormatError,
	frame::{Color, resize_palette},
};

/// Role of a palette inside its bundle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum PaletteType {
	/// Selected only by mappings
	#[default]
	Normal,
	/// Default palette, replaced when a mapping switches palettes
	Default,
	/// Default palette that survives embedded palette switches
	DefaultPersistent,
}

impl PaletteType {
	/// Converts the on-disk type byte. Unknown values are treated as normal palettes.
	pub fn from_u8(value: u8) -> Self {
		match value {
			1 => Self::DefaultPersistent,
			2 => Self::Default,
			_ => Self::Normal,
		}
	}

	/// Converts back to the on-disk type byte.
	pub fn to_u8(self) -> u8 {
		match self {
			Self::Normal => 0,
			Self::DefaultPersistent => 1,
			Self::Default => 2,
		}
	}
}

/// A list of colors with an index and a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
	/// Index referenced by mappings
	pub index: u16,
	/// Palette role
	pub palette_type: PaletteType,
	/// Colors in index order
	pub colors: Vec<Color>,
}

impl Palette {
	/// Creates a normal palette.
	pub fn new(index: u16, colors: Vec<Color>) -> Self {
		Self {
			index,
			palette_type: PaletteType::Normal,
			colors,
		}
	}

	/// Builder-style setter for the palette type.
	pub fn with_type(mut self, palette_type: PaletteType) -> Self {
		self.palette_type = palette_type;
		self
	}

	/// Returns `true` for both default types.
	pub fn is_default(&self) -> bool {
		matches!(self.palette_type, PaletteType::Default | PaletteType::DefaultPersistent)
	}

	/// Returns `true` if the palette is the persistent default.
	pub fn is_persistent(&self) -> bool {
		self.palette_type == PaletteType::DefaultPersistent
	}

	/// Colors resized to `2^bit_length` entries.
	pub fn colors_for(&self, bit_length: usize) -> Vec<Color> {
		resize_palette(&self.colors, 1 << bit_length)
	}

	/// Reads one palette record.
	pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, FormatError> {
		let index = reader.read_u16::<BigEndian>()?;
		let num_colors = reader.read_u16::<BigEndian>()?;
		let palette_type = PaletteType::from_u8(reader.read_u8()?);

		let mut rgb = vec![0u8; usize::from(num_colors) * 3];
		reader.read_exact(&mut rgb)?;
		let colors = rgb.chunks_exact(3).map(|c| Color::new(c[0], c[1], c[2])).collect();

		Ok(Self {
			index,
			palette_type,
			colors,
		})
	}

	/// Writes the palette record.
	pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
		let num_colors = u16::try_from(self.colors.len()).map_err(|_| FormatError::InvalidValue {
			field: "palette color count",
			value: self.colors.len() as i64,
		})?;
		writer.write_u16::<BigEndian>(self.index)?;
		writer.write_u16::<BigEndian>(num_colors)?;
		writer.write_u8(self.palette_type.to_u8())?;
		for color in &self.colors {
			writer.write_all(&[color.r, color.g, color.b])?;
		}
		Ok(())
	}
}

impl fmt::Display for Palette {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Palette #{} ({} colors, {:?})", self.index, self.colors.len(), self.palette_type)
	}
}
