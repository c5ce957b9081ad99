//! Coloring bundle (`.pal`) support.
//!
//! A coloring bundle holds the palettes of a game, the checksum mappings that switch between
//! them or start animations, and the plane masks used to compute masked checksums.
//!
//! # File Structure
//!
//! All multi-byte integers are big-endian.
//!
//! | Section | Layout | Notes |
//! |---------|--------|-------|
//! | Header | `u8 version`, `u16 numPalettes` | mandatory |
//! | Palettes | `u16 index`, `u16 numColors`, `u8 type`, `numColors` x RGB | mandatory |
//! | Mappings | `u16 numMappings`, then 11-byte records | optional, absent at EOF |
//! | Masks | `u8 numMasks`, then equal-sized masks | optional, absent at EOF or with no mappings |
//!
//! The mask size is not stored. It is the remaining byte count divided by `numMasks`.
//!
//! # Examples
//!
//! ```
//! use dmdcolor_types::file::pal::{File, Mapping, Palette, SwitchMode};
//! use dmdcolor_types::frame::Color;
//!
//! let mut bundle = File::new(1);
//! bundle.add_palette(Palette::new(0, vec![Color::BLACK; 4]));
//! bundle.add_palette(Palette::new(1, vec![Color::new(255, 0, 0); 4]));
//! bundle.add_mapping(Mapping::new(0x1234_5678, SwitchMode::Palette, 1, 0));
//!
//! let bytes = bundle.to_bytes().unwrap();
//! let parsed = File::from_bytes(&bytes).unwrap();
//! assert_eq!(parsed.find_palette(0x1234_5678).map(|p| p.index), Some(1));
//! ```

use std::{
	collections::HashMap,
	fmt,
	io::{Cursor, Read, Write},
	path::Path,
};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, warn};

use crate::file::{FormatError, ParseConfig};

pub mod mapping;
pub mod palette;

pub use mapping::{MAPPING_SIZE, Mapping, SwitchMode};
pub use palette::{Palette, PaletteType};

/// A parsed coloring bundle.
#[derive(Debug, Clone, Default)]
pub struct File {
	version: u8,
	palettes: Vec<Palette>,
	mappings: Vec<Mapping>,
	/// Checksum to position in `mappings`, first record wins
	lookup: HashMap<u32, usize>,
	masks: Vec<Vec<u8>>,
}

impl File {
	/// Creates an empty bundle.
	pub fn new(version: u8) -> Self {
		Self {
			version,
			..Self::default()
		}
	}

	/// Opens a coloring bundle from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, FormatError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Reads a whole coloring bundle from any reader.
	pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, FormatError> {
		let mut data = Vec::new();
		reader.read_to_end(&mut data)?;
		Self::from_bytes(&data)
	}

	/// Parses a coloring bundle with the default configuration.
	pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
		Self::from_bytes_with_config(data, &ParseConfig::default())
	}

	/// Parses a coloring bundle.
	///
	/// # Errors
	///
	/// Returns an error if:
	/// - the header or a palette is truncated
	/// - a mapping holds an unknown switch mode
	/// - bytes remain after the masks and `config.strict_trailing_bytes` is set
	pub fn from_bytes_with_config(data: &[u8], config: &ParseConfig) -> Result<Self, FormatError> {
		let mut cursor = Cursor::new(data);
		let remaining = |cursor: &Cursor<&[u8]>| data.len() - cursor.position() as usize;

		let version = cursor.read_u8()?;
		let num_palettes = cursor.read_u16::<BigEndian>()?;
		let mut bundle = Self::new(version);
		for _ in 0..num_palettes {
			bundle.palettes.push(Palette::from_reader(&mut cursor)?);
		}

		if remaining(&cursor) == 0 {
			debug!("coloring bundle v{version}: {num_palettes} palettes, no mappings");
			return Ok(bundle);
		}
		if remaining(&cursor) < 2 {
			warn!("coloring bundle ends inside the mapping count, ignoring mappings");
			return Ok(bundle);
		}

		let num_mappings = usize::from(cursor.read_u16::<BigEndian>()?);
		if remaining(&cursor) < num_mappings * MAPPING_SIZE {
			warn!(
				"coloring bundle declares {num_mappings} mappings but only {} bytes follow, ignoring mappings",
				remaining(&cursor)
			);
			return Ok(bundle);
		}
		for _ in 0..num_mappings {
			bundle.add_mapping(Mapping::from_reader(&mut cursor)?);
		}

		if num_mappings == 0 || remaining(&cursor) == 0 {
			if remaining(&cursor) > 0 {
				warn!("no mappings found but {} bytes are left in the bundle", remaining(&cursor));
			}
			return Ok(bundle);
		}

		let num_masks = usize::from(cursor.read_u8()?);
		if num_masks > 0 {
			let mask_size = remaining(&cursor) / num_masks;
			if config.accepts_mask_size(mask_size) {
				for _ in 0..num_masks {
					let mut mask = vec![0u8; mask_size];
					cursor.read_exact(&mut mask)?;
					bundle.masks.push(mask);
				}
			} else {
				warn!("ignoring {num_masks} masks of unsupported size {mask_size}");
				cursor.set_position(data.len() as u64);
			}
		}

		let left = remaining(&cursor);
		if left > 0 {
			if config.strict_trailing_bytes {
				return Err(FormatError::TrailingData {
					remaining: left,
				});
			}
			warn!("ignoring {left} trailing bytes in coloring bundle");
		}

		debug!("{bundle}");
		Ok(bundle)
	}

	/// Serializes the bundle.
	///
	/// Mappings are written only when present and masks only when there are mappings, so a
	/// bundle without mappings round-trips to the short form.
	pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
		let mut out = Vec::new();
		self.write_to(&mut out)?;
		Ok(out)
	}

	/// Writes the bundle to a writer.
	pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
		writer.write_u8(self.version)?;
		writer.write_u16::<BigEndian>(count_u16(self.palettes.len(), "palette count")?)?;
		for palette in &self.palettes {
			palette.write_to(writer)?;
		}

		if self.mappings.is_empty() {
			return Ok(());
		}
		writer.write_u16::<BigEndian>(count_u16(self.mappings.len(), "mapping count")?)?;
		for mapping in &self.mappings {
			mapping.write_to(writer)?;
		}

		if self.masks.is_empty() {
			return Ok(());
		}
		let num_masks = u8::try_from(self.masks.len()).map_err(|_| FormatError::InvalidValue {
			field: "mask count",
			value: self.masks.len() as i64,
		})?;
		writer.write_u8(num_masks)?;
		for mask in &self.masks {
			writer.write_all(mask)?;
		}
		Ok(())
	}

	/// Format version byte.
	pub fn version(&self) -> u8 {
		self.version
	}

	/// All palettes in file order.
	pub fn palettes(&self) -> &[Palette] {
		&self.palettes
	}

	/// All mappings in file order.
	pub fn mappings(&self) -> &[Mapping] {
		&self.mappings
	}

	/// Plane masks used for masked checksums.
	pub fn masks(&self) -> &[Vec<u8>] {
		&self.masks
	}

	/// The first palette flagged as default, or the first palette.
	pub fn default_palette(&self) -> Option<&Palette> {
		self.palettes.iter().find(|p| p.is_default()).or_else(|| self.palettes.first())
	}

	/// Looks a palette up by its stored index.
	pub fn get_palette(&self, index: u16) -> Option<&Palette> {
		self.palettes.iter().find(|p| p.index == index)
	}

	/// Looks a mapping up by checksum.
	pub fn find_mapping(&self, checksum: u32) -> Option<&Mapping> {
		self.lookup.get(&checksum).map(|&i| &self.mappings[i])
	}

	/// Palette selected by the mapping for `checksum`.
	pub fn find_palette(&self, checksum: u32) -> Option<&Palette> {
		self.find_mapping(checksum).and_then(|m| self.get_palette(m.palette_index))
	}

	/// Appends a palette.
	pub fn add_palette(&mut self, palette: Palette) {
		self.palettes.push(palette);
	}

	/// Appends a mapping. A checksum that is already mapped keeps its first mapping.
	pub fn add_mapping(&mut self, mapping: Mapping) {
		self.lookup.entry(mapping.checksum).or_insert(self.mappings.len());
		self.mappings.push(mapping);
	}

	/// Appends a plane mask.
	pub fn add_mask(&mut self, mask: Vec<u8>) {
		self.masks.push(mask);
	}
}

fn count_u16(count: usize, field: &'static str) -> Result<u16, FormatError> {
	u16::try_from(count).map_err(|_| FormatError::InvalidValue {
		field,
		value: count as i64,
	})
}

impl fmt::Display for File {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"coloring bundle v{}: {} palette(s), {} mapping(s), {} mask(s)",
			self.version,
			self.palettes.len(),
			self.mappings.len(),
			self.masks.len()
		)
	}
}
