//! Checksum mappings of a coloring bundle.

use std::{
	fmt,
	io::{Read, Write},
};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

use crate::file::FormatError;

/// Size of one mapping record in bytes
pub const MAPPING_SIZE: usize = 11;

/// What a mapping hit does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum SwitchMode {
	/// Switch palettes only
	#[default]
	Palette = 0,
	/// Play the stored frames instead of the live ones
	Replace = 1,
	/// Add the stored high planes on top of the live frame
	ColorMask = 2,
	/// Reserved for external triggers, ignored by the engine
	Event = 3,
	/// Color mask with the stored frame chosen by frame detection
	Follow = 4,
	/// Color mask layered from every matching stored frame
	LayeredColorMask = 5,
	/// Replace with the stored frame chosen by frame detection
	FollowReplace = 6,
	/// Layered replace restricted to the stored frame masks
	MaskedReplace = 7,
}

impl SwitchMode {
	/// Converts the on-disk mode byte.
	pub fn from_u8(value: u8) -> Result<Self, FormatError> {
		match value {
			0 => Ok(Self::Palette),
			1 => Ok(Self::Replace),
			2 => Ok(Self::ColorMask),
			3 => Ok(Self::Event),
			4 => Ok(Self::Follow),
			5 => Ok(Self::LayeredColorMask),
			6 => Ok(Self::FollowReplace),
			7 => Ok(Self::MaskedReplace),
			_ => Err(FormatError::InvalidValue {
				field: "switch mode",
				value: i64::from(value),
			}),
		}
	}

	/// Converts back to the on-disk mode byte.
	pub fn to_u8(self) -> u8 {
		self as u8
	}

	/// Returns `true` if the mode plays an animation.
	pub fn is_animation(self) -> bool {
		!matches!(self, Self::Palette | Self::Event)
	}

	/// Returns `true` for the modes that accumulate layers across matches.
	pub fn is_layered(self) -> bool {
		matches!(self, Self::LayeredColorMask | Self::MaskedReplace)
	}

	/// Returns `true` for the modes driven by frame detection.
	pub fn is_follow(self) -> bool {
		matches!(self, Self::Follow | Self::FollowReplace)
	}
}

impl fmt::Display for SwitchMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Palette => "Palette",
			Self::Replace => "Replace",
			Self::ColorMask => "ColorMask",
			Self::Event => "Event",
			Self::Follow => "Follow",
			Self::LayeredColorMask => "LayeredColorMask",
			Self::FollowReplace => "FollowReplace",
			Self::MaskedReplace => "MaskedReplace",
		};
		write!(f, "{name}")
	}
}

/// A checksum that triggers a palette switch or an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mapping {
	/// Plane checksum that triggers the mapping
	pub checksum: u32,
	/// What the mapping does
	pub mode: SwitchMode,
	/// Palette to switch to
	pub palette_index: u16,
	/// Palette mappings: milliseconds until the default palette returns, 0 for never.
	/// Animation mappings: byte offset of the animation in the VPIN bundle.
	pub duration: u32,
}

impl Mapping {
	/// Creates a mapping.
	pub fn new(checksum: u32, mode: SwitchMode, palette_index: u16, duration: u32) -> Self {
		Self {
			checksum,
			mode,
			palette_index,
			duration,
		}
	}

	/// Returns `true` if the mapping starts an animation.
	pub fn is_animation(&self) -> bool {
		self.mode.is_animation()
	}

	/// Byte offset of the animation to start, `None` for palette and event mappings.
	pub fn animation_offset(&self) -> Option<u64> {
		self.is_animation().then_some(u64::from(self.duration))
	}

	/// Reads one mapping record.
	pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, FormatError> {
		let checksum = reader.read_u32::<BigEndian>()?;
		let mode = SwitchMode::from_u8(reader.read_u8()?)?;
		let palette_index = reader.read_u16::<BigEndian>()?;
		let duration = reader.read_u32::<BigEndian>()?;
		Ok(Self {
			checksum,
			mode,
			palette_index,
			duration,
		})
	}

	/// Writes the mapping record.
	pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
		writer.write_u32::<BigEndian>(self.checksum)?;
		writer.write_u8(self.mode.to_u8())?;
		writer.write_u16::<BigEndian>(self.palette_index)?;
		writer.write_u32::<BigEndian>(self.duration)?;
		Ok(())
	}
}

impl fmt::Display for Mapping {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{:08X} -> {} (palette {}, duration {})",
			self.checksum, self.mode, self.palette_index, self.duration
		)
	}
}
