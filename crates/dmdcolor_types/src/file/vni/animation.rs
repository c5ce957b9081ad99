//! Animation records of a VPIN bundle.

use std::{
	fmt,
	io::{Cursor, Read, Write},
};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use serde::Serialize;

use super::{
	constants::{LEGACY_DIMENSIONS, UNDEFINED_NAME},
	frame::{AnimationFrame, non_negative, to_i16},
};
use crate::{
	file::FormatError,
	frame::{Color, Dimensions},
};

/// How the authoring tool edited an animation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum EditMode {
	/// Frames replace the live content
	#[default]
	Replace,
	/// Frames add planes on top of the live content
	Mask,
	/// Frames are fixed
	Fixed,
}

impl EditMode {
	/// Converts the on-disk byte, unknown values fall back to `Replace`.
	pub fn from_u8(value: u8) -> Self {
		match value {
			1 => Self::Mask,
			2 => Self::Fixed,
			_ => Self::Replace,
		}
	}

	/// Converts back to the on-disk byte.
	pub fn to_u8(self) -> u8 {
		match self {
			Self::Replace => 0,
			Self::Mask => 1,
			Self::Fixed => 2,
		}
	}
}

/// A detection mask stored with an animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationMask {
	/// Locked in the authoring tool
	pub locked: bool,
	/// Mask plane, in memory bit order
	pub data: Vec<u8>,
}

/// Reference to another animation (version 6).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkedAnimation {
	/// Link type byte
	pub link_type: u8,
	/// Name of the linked animation
	pub name: String,
	/// Frame to start the linked animation at
	pub start_frame: u32,
}

/// Clock overlay settings of an animation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClockSettings {
	/// Frame the clock appears from
	pub from: i16,
	/// Small clock font
	pub small: bool,
	/// Clock drawn in front of the animation
	pub in_front: bool,
	/// Horizontal offset
	pub offset_x: i16,
	/// Vertical offset
	pub offset_y: i16,
}

/// One named, timed sequence of stored frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
	/// Display name
	pub name: String,
	/// Byte offset of the record inside the bundle, referenced by mappings
	pub offset: u64,
	/// Number of play cycles
	pub cycles: i16,
	/// Number of cycles to hold the last frame
	pub hold_cycles: i16,
	/// Clock overlay
	pub clock: ClockSettings,
	/// Refresh delay in milliseconds
	pub refresh_delay: i16,
	/// Animation type byte
	pub animation_type: u8,
	/// Age rating byte
	pub fsk: u8,
	/// Palette the animation was authored with (version 2)
	pub palette_index: i16,
	/// Embedded colors (version 2)
	pub colors: Vec<Color>,
	/// Edit mode (version 3)
	pub edit_mode: EditMode,
	/// Frame size (version 4)
	pub dimensions: Dimensions,
	/// Detection masks (version 5)
	pub masks: Vec<AnimationMask>,
	/// Linked animation (version 6)
	pub linked: Option<LinkedAnimation>,
	/// Stored frames
	pub frames: Vec<AnimationFrame>,
}

/// Serializable summary of an animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimationInfo {
	/// Display name
	pub name: String,
	/// Byte offset inside the bundle
	pub offset: u64,
	/// Number of frames
	pub frames: usize,
	/// Bit depth of the first frame
	pub bit_length: usize,
	/// Total duration in milliseconds
	pub duration: u32,
	/// Frame size
	pub dimensions: Dimensions,
	/// Edit mode
	pub edit_mode: EditMode,
	/// Number of detection masks
	pub masks: usize,
	/// Index of the first frame carrying a mask
	pub transition_from: Option<usize>,
	/// Linked animation
	pub linked: Option<LinkedAnimation>,
}

impl Animation {
	/// Creates an animation with default metadata.
	pub fn new(name: impl Into<String>, dimensions: Dimensions, frames: Vec<AnimationFrame>) -> Self {
		let mut animation = Self {
			name: name.into(),
			offset: 0,
			cycles: 0,
			hold_cycles: 0,
			clock: ClockSettings::default(),
			refresh_delay: 0,
			animation_type: 0,
			fsk: 0,
			palette_index: 0,
			colors: Vec::new(),
			edit_mode: EditMode::default(),
			dimensions,
			masks: Vec::new(),
			linked: None,
			frames,
		};
		animation.update_time_offsets();
		animation
	}

	/// Number of frames.
	pub fn num_frames(&self) -> usize {
		self.frames.len()
	}

	/// Bit depth, taken from the first frame.
	pub fn bit_length(&self) -> usize {
		self.frames.first().map_or(0, AnimationFrame::bit_length)
	}

	/// Sum of all frame delays in milliseconds.
	pub fn duration(&self) -> u32 {
		self.frames.iter().map(|f| f.delay).sum()
	}

	/// Index of the first frame that carries a mask.
	pub fn transition_from(&self) -> Option<usize> {
		self.frames.iter().position(|f| f.mask.is_some())
	}

	/// Serializable summary.
	pub fn info(&self) -> AnimationInfo {
		AnimationInfo {
			name: self.name.clone(),
			offset: self.offset,
			frames: self.frames.len(),
			bit_length: self.bit_length(),
			duration: self.duration(),
			dimensions: self.dimensions,
			edit_mode: self.edit_mode,
			masks: self.masks.len(),
			transition_from: self.transition_from(),
			linked: self.linked.clone(),
		}
	}

	fn update_time_offsets(&mut self) {
		let mut time = 0;
		for frame in &mut self.frames {
			frame.time_offset = time;
			time += frame.delay;
		}
	}

	/// Reads an animation record at the current cursor position.
	pub(crate) fn read(cursor: &mut Cursor<&[u8]>, version: i16) -> Result<Self, FormatError> {
		let offset = cursor.position();

		let name_length = cursor.read_i16::<BigEndian>()?;
		let name = if name_length > 0 {
			read_string(cursor, usize::from(name_length.unsigned_abs()))?
		} else {
			UNDEFINED_NAME.to_string()
		};

		let cycles = cursor.read_i16::<BigEndian>()?;
		let hold_cycles = cursor.read_i16::<BigEndian>()?;
		let clock = ClockSettings {
			from: cursor.read_i16::<BigEndian>()?,
			small: cursor.read_u8()? != 0,
			in_front: cursor.read_u8()? != 0,
			offset_x: cursor.read_i16::<BigEndian>()?,
			offset_y: cursor.read_i16::<BigEndian>()?,
		};
		let refresh_delay = cursor.read_i16::<BigEndian>()?;
		let animation_type = cursor.read_u8()?;
		let fsk = cursor.read_u8()?;

		// counts above i16::MAX are stored wrapped
		let num_frames = usize::from(cursor.read_u16::<BigEndian>()?);

		let mut palette_index = 0;
		let mut colors = Vec::new();
		if version >= 2 {
			palette_index = cursor.read_i16::<BigEndian>()?;
			let num_colors = cursor.read_i16::<BigEndian>()?;
			for _ in 0..num_colors.max(0) {
				let mut rgb = [0u8; 3];
				cursor.read_exact(&mut rgb)?;
				colors.push(Color::new(rgb[0], rgb[1], rgb[2]));
			}
		}

		let edit_mode = if version >= 3 {
			EditMode::from_u8(cursor.read_u8()?)
		} else {
			EditMode::default()
		};

		let dimensions = if version >= 4 {
			let width = non_negative(cursor.read_i16::<BigEndian>()?, "width")?;
			let height = non_negative(cursor.read_i16::<BigEndian>()?, "height")?;
			Dimensions::new(width, height)
		} else {
			LEGACY_DIMENSIONS
		};

		let mut masks = Vec::new();
		if version >= 5 {
			let num_masks = non_negative(cursor.read_i16::<BigEndian>()?, "mask count")?;
			for _ in 0..num_masks {
				let locked = cursor.read_u8()? != 0;
				let size = non_negative(cursor.read_i16::<BigEndian>()?, "mask size")?;
				let mut data = vec![0u8; size];
				cursor.read_exact(&mut data)?;
				crate::frame::planes::reverse_plane(&mut data);
				masks.push(AnimationMask {
					locked,
					data,
				});
			}
		}

		let linked = if version >= 6 {
			let link_type = cursor.read_u8()?;
			let size = cursor.read_i16::<BigEndian>()?;
			let name = if size > 0 {
				read_string(cursor, usize::from(size.unsigned_abs()))?
			} else {
				UNDEFINED_NAME.to_string()
			};
			let start_frame = cursor.read_u32::<BigEndian>()?;
			Some(LinkedAnimation {
				link_type,
				name,
				start_frame,
			})
		} else {
			None
		};

		debug!("reading {num_frames} frame(s) of animation \"{name}\" at offset {offset}");
		let mut frames = Vec::with_capacity(num_frames);
		let mut time_offset = 0;
		for _ in 0..num_frames {
			let frame = AnimationFrame::read(cursor, version, time_offset)?;
			time_offset += frame.delay;
			frames.push(frame);
		}

		Ok(Self {
			name,
			offset,
			cycles,
			hold_cycles,
			clock,
			refresh_delay,
			animation_type,
			fsk,
			palette_index,
			colors,
			edit_mode,
			dimensions,
			masks,
			linked,
			frames,
		})
	}

	/// Writes the animation record.
	pub(crate) fn write<W: Write>(&self, writer: &mut W, version: i16) -> Result<(), FormatError> {
		let name = if self.name == UNDEFINED_NAME {
			""
		} else {
			self.name.as_str()
		};
		writer.write_i16::<BigEndian>(to_i16(name.len(), "name length")?)?;
		writer.write_all(name.as_bytes())?;

		writer.write_i16::<BigEndian>(self.cycles)?;
		writer.write_i16::<BigEndian>(self.hold_cycles)?;
		writer.write_i16::<BigEndian>(self.clock.from)?;
		writer.write_u8(u8::from(self.clock.small))?;
		writer.write_u8(u8::from(self.clock.in_front))?;
		writer.write_i16::<BigEndian>(self.clock.offset_x)?;
		writer.write_i16::<BigEndian>(self.clock.offset_y)?;
		writer.write_i16::<BigEndian>(self.refresh_delay)?;
		writer.write_u8(self.animation_type)?;
		writer.write_u8(self.fsk)?;

		let num_frames = u16::try_from(self.frames.len()).map_err(|_| FormatError::InvalidValue {
			field: "frame count",
			value: self.frames.len() as i64,
		})?;
		writer.write_u16::<BigEndian>(num_frames)?;

		if version >= 2 {
			writer.write_i16::<BigEndian>(self.palette_index)?;
			writer.write_i16::<BigEndian>(to_i16(self.colors.len(), "color count")?)?;
			for color in &self.colors {
				writer.write_all(&[color.r, color.g, color.b])?;
			}
		}
		if version >= 3 {
			writer.write_u8(self.edit_mode.to_u8())?;
		}
		if version >= 4 {
			writer.write_i16::<BigEndian>(to_i16(self.dimensions.width, "width")?)?;
			writer.write_i16::<BigEndian>(to_i16(self.dimensions.height, "height")?)?;
		}
		if version >= 5 {
			writer.write_i16::<BigEndian>(to_i16(self.masks.len(), "mask count")?)?;
			for mask in &self.masks {
				writer.write_u8(u8::from(mask.locked))?;
				writer.write_i16::<BigEndian>(to_i16(mask.data.len(), "mask size")?)?;
				writer.write_all(&crate::frame::planes::reversed(&mask.data))?;
			}
		}
		if version >= 6 {
			let linked = self.linked.clone().unwrap_or_default();
			writer.write_u8(linked.link_type)?;
			writer.write_i16::<BigEndian>(to_i16(linked.name.len(), "linked name length")?)?;
			writer.write_all(linked.name.as_bytes())?;
			writer.write_u32::<BigEndian>(linked.start_frame)?;
		}

		for frame in &self.frames {
			frame.write(writer, version)?;
		}
		Ok(())
	}
}

fn read_string<R: Read>(reader: &mut R, len: usize) -> Result<String, FormatError> {
	let mut bytes = vec![0u8; len];
	reader.read_exact(&mut bytes)?;
	Ok(String::from_utf8_lossy(&bytes).into_owned())
}

impl fmt::Display for Animation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} @{}: {} frame(s), {} bit, {} ms, {}",
			self.name,
			self.offset,
			self.frames.len(),
			self.bit_length(),
			self.duration(),
			self.dimensions
		)
	}
}
