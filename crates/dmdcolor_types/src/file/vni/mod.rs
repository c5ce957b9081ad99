//! VPIN animation bundle (`.vni`) support.
//!
//! A VPIN bundle stores the animations that color mappings start. Mappings reference an
//! animation by the byte offset of its record, so every parsed [`Animation`] remembers where
//! it was read from.
//!
//! # File Structure
//!
//! All multi-byte integers are big-endian.
//!
//! | Section | Layout | Since |
//! |---------|--------|-------|
//! | Header | `"VPIN"`, `i16 version`, `i16 numAnimations` | 1 |
//! | Index | `u32` record offset per animation | 2 |
//! | Animation | name, playback and clock metadata, `i16 numFrames` | 1 |
//! | | `i16 paletteIndex`, `i16 numColors`, RGB colors | 2 |
//! | | `u8 editMode` | 3 |
//! | | `i16 width`, `i16 height` | 4 |
//! | | `i16 numMasks`, then `u8 locked`, `i16 size`, mask bytes | 5 |
//! | | `u8 linkType`, `i16 nameLength`, name, `u32 startFrame` | 6 |
//! | Frame | `i16 planeSize`, `i16 delay` | 1 |
//! | | `u32 hash` | 4 |
//! | | `u8 bitLength` | 1 |
//! | | `u8 compressed`, then `i32 size` and a HeatShrink block when set | 3 |
//! | | `bitLength` x (`u8 marker`, `planeSize` bytes) | 1 |
//!
//! Plane and mask bytes are stored with their bit order reversed. Compressed blocks use a
//! window of 10 bits and a lookahead of 0 bits and expand to the raw marker/plane layout.
//!
//! # Examples
//!
//! ```
//! use dmdcolor_types::file::vni::{Animation, AnimationFrame, File};
//! use dmdcolor_types::frame::Dimensions;
//!
//! let frames = vec![AnimationFrame::new(50, 0, vec![vec![0xFF; 2]; 2])];
//! let mut bundle = File::new(6);
//! bundle.add_animation(Animation::new("intro", Dimensions::new(8, 2), frames));
//!
//! let parsed = File::from_bytes(&bundle.to_bytes().unwrap()).unwrap();
//! let offset = parsed.animations()[0].offset;
//! assert_eq!(parsed.find(offset).map(|a| a.name.as_str()), Some("intro"));
//! ```

use std::{
	collections::HashMap,
	fmt,
	io::{Cursor, Read},
	path::Path,
};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, warn};

use crate::file::{FormatError, ParseConfig};

pub mod animation;
pub mod constants;
pub mod frame;

pub use animation::{Animation, AnimationInfo, AnimationMask, ClockSettings, EditMode, LinkedAnimation};
pub use frame::AnimationFrame;

/// A parsed VPIN animation bundle.
#[derive(Debug, Clone, Default)]
pub struct File {
	version: i16,
	animations: Vec<Animation>,
	/// Record offset to position in `animations`
	by_offset: HashMap<u64, usize>,
}

impl File {
	/// Creates an empty bundle.
	pub fn new(version: i16) -> Self {
		Self {
			version,
			..Self::default()
		}
	}

	/// Opens a VPIN bundle from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, FormatError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Reads a whole VPIN bundle from any reader.
	pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, FormatError> {
		let mut data = Vec::new();
		reader.read_to_end(&mut data)?;
		Self::from_bytes(&data)
	}

	/// Parses a VPIN bundle with the default configuration.
	pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
		Self::from_bytes_with_config(data, &ParseConfig::default())
	}

	/// Parses a VPIN bundle.
	///
	/// # Errors
	///
	/// Returns an error if:
	/// - the magic is not `VPIN`
	/// - any record is truncated or a compressed block fails to expand
	/// - bytes remain after the last animation and `config.strict_trailing_bytes` is set
	pub fn from_bytes_with_config(data: &[u8], config: &ParseConfig) -> Result<Self, FormatError> {
		if data.len() < constants::MAGIC.len() {
			return Err(FormatError::InsufficientData {
				expected: constants::MAGIC.len(),
				actual: data.len(),
			});
		}
		let mut magic = [0u8; 4];
		magic.copy_from_slice(&data[..4]);
		if magic != constants::MAGIC {
			return Err(FormatError::InvalidMagic(magic));
		}

		let mut cursor = Cursor::new(data);
		cursor.set_position(4);
		let version = cursor.read_i16::<BigEndian>()?;
		if version > constants::LATEST_VERSION {
			warn!("VPIN version {version} is newer than {}, reading it as such", constants::LATEST_VERSION);
		}
		let num_animations = frame::non_negative(cursor.read_i16::<BigEndian>()?, "animation count")?;

		if version >= 2 {
			// the offset index is rebuilt from the records themselves
			for _ in 0..num_animations {
				cursor.read_u32::<BigEndian>()?;
			}
		}

		debug!("reading {num_animations} animation(s) from VPIN v{version}");
		let mut bundle = Self::new(version);
		for _ in 0..num_animations {
			let animation = Animation::read(&mut cursor, version)?;
			bundle.push(animation);
		}

		let left = data.len() - cursor.position() as usize;
		if left > 0 {
			if config.strict_trailing_bytes {
				return Err(FormatError::TrailingData {
					remaining: left,
				});
			}
			warn!("ignoring {left} trailing bytes in VPIN bundle");
		}

		debug!("{bundle}");
		Ok(bundle)
	}

	/// Serializes the bundle.
	///
	/// Animation offsets are assigned by layout, so the offsets of the parsed result may differ
	/// from the ones held by this instance.
	pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
		let mut out = Vec::new();
		out.extend_from_slice(&constants::MAGIC);
		out.write_i16::<BigEndian>(self.version)?;
		out.write_i16::<BigEndian>(frame::to_i16(self.animations.len(), "animation count")?)?;

		let index_start = out.len();
		if self.version >= 2 {
			out.resize(index_start + self.animations.len() * 4, 0);
		}

		for (i, animation) in self.animations.iter().enumerate() {
			let offset = u32::try_from(out.len()).map_err(|_| FormatError::InvalidValue {
				field: "animation offset",
				value: out.len() as i64,
			})?;
			if self.version >= 2 {
				let slot = index_start + i * 4;
				out[slot..slot + 4].copy_from_slice(&offset.to_be_bytes());
			}
			animation.write(&mut out, self.version)?;
		}
		Ok(out)
	}

	/// Format version.
	pub fn version(&self) -> i16 {
		self.version
	}

	/// All animations in file order.
	pub fn animations(&self) -> &[Animation] {
		&self.animations
	}

	/// Animation at position `index`.
	pub fn get(&self, index: usize) -> Option<&Animation> {
		self.animations.get(index)
	}

	/// Position of the animation whose record starts at `offset`.
	pub fn index_of(&self, offset: u64) -> Option<usize> {
		self.by_offset.get(&offset).copied()
	}

	/// Animation whose record starts at `offset`.
	pub fn find(&self, offset: u64) -> Option<&Animation> {
		self.index_of(offset).map(|i| &self.animations[i])
	}

	/// Widest animation.
	pub fn max_width(&self) -> usize {
		self.animations.iter().map(|a| a.dimensions.width).max().unwrap_or(0)
	}

	/// Tallest animation.
	pub fn max_height(&self) -> usize {
		self.animations.iter().map(|a| a.dimensions.height).max().unwrap_or(0)
	}

	/// Appends an animation. Its offset is assigned when the bundle is written and parsed.
	pub fn add_animation(&mut self, animation: Animation) {
		self.push(animation);
	}

	fn push(&mut self, animation: Animation) {
		self.by_offset.entry(animation.offset).or_insert(self.animations.len());
		self.animations.push(animation);
	}
}

impl fmt::Display for File {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "VPIN v{}, {} animation(s)", self.version, self.animations.len())
	}
}
