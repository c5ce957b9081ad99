//! Content-addressed colorized frame store (`.cRom`).
//!
//! A cROM table maps the checksum of an incoming gray frame straight to a stored colorized
//! frame. There is no timeline: every frame is looked up on its own.
//!
//! # File Structure
//!
//! All integers are little-endian. `W`, `H`, `F`, `C`, `M` and `R` are the width, height,
//! frame count, colors per frame, comparison mask count and moving rectangle count.
//!
//! | Section | Size | Contents |
//! |---------|------|----------|
//! | Header | 92 | name, `W`, `H`, `F`, reserved, `C`, `M`, `R` |
//! | Hashes | `F` x 4 | checksum of each stored frame |
//! | Shape flags | `F` | 1 when the frame is compared in shape mode |
//! | Mask ids | `F` | comparison mask per frame, 255 for none |
//! | Moving rect ids | `F` | moving rectangle per frame, 255 for none |
//! | Comparison masks | `M` x `W` x `H` | one byte per pixel, 0 = compared |
//! | Moving rects | `R` x `W` x `H` | kept for completeness |
//! | Palettes | `F` x `C` x 3 | RGB palette per frame |
//! | Frames | `F` x `W` x `H` | colorized pixels |
//! | Dynamic masks | `F` x `W` x `H` | dynamic color set per pixel, 255 = static |
//! | Dynamic colors | `F` x 8 x 4 | four palette indices per dynamic set |
//!
//! # Identification
//!
//! Rows sharing the same `(mask id, shape flag)` pair are checked with a single checksum of
//! the incoming frame. The scan starts at the last matched row, since consecutive frames tend
//! to hit neighbouring rows, and visits every row at most once.

use std::{
	fmt,
	io::{Cursor, Read},
	path::Path,
};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, warn};

use crate::{
	checksum,
	file::{FormatError, ParseConfig},
	frame::{Color, ColoredFrame, Dimensions, planes},
};

pub mod header;

pub use header::{HEADER_SIZE, Header};

/// Dynamic color sets per frame
pub const MAX_DYNA_SETS_PER_FRAME: usize = 8;

/// Colors per dynamic color set
pub const DYNA_SET_SIZE: usize = 4;

/// Mask id and dynamic set id meaning "none"
pub const NONE_ID: u8 = 255;

/// Bit depth of colorized output
pub const OUTPUT_BIT_LENGTH: usize = 6;

/// Palette entries of colorized output
pub const OUTPUT_PALETTE_SIZE: usize = 1 << OUTPUT_BIT_LENGTH;

/// One stored frame, used to author tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CromFrame {
	/// Checksum of the gray frame this row matches
	pub hash: u32,
	/// Compare in shape mode
	pub shape: bool,
	/// Comparison mask, [`NONE_ID`] for none
	pub mask_id: u8,
	/// Moving rectangle, [`NONE_ID`] for none
	pub moving_rect_id: u8,
	/// Frame palette, `colors` entries
	pub palette: Vec<Color>,
	/// Colorized pixels, one palette index per pixel
	pub pixels: Vec<u8>,
	/// Dynamic set per pixel, [`NONE_ID`] for static pixels
	pub dyna_mask: Vec<u8>,
	/// Palette indices of the dynamic sets, `MAX_DYNA_SETS_PER_FRAME * DYNA_SET_SIZE` entries
	pub dyna_colors: Vec<u8>,
}

impl CromFrame {
	/// Creates a static row matching the gray frame `source` without mask.
	pub fn matching(source: &[u8], shape: bool, palette: Vec<Color>, pixels: Vec<u8>) -> Self {
		let len = pixels.len();
		Self {
			hash: checksum::pixels(source, shape),
			shape,
			mask_id: NONE_ID,
			moving_rect_id: NONE_ID,
			palette,
			pixels,
			dyna_mask: vec![NONE_ID; len],
			dyna_colors: vec![0; MAX_DYNA_SETS_PER_FRAME * DYNA_SET_SIZE],
		}
	}
}

/// A loaded cROM table.
#[derive(Debug, Clone, Default)]
pub struct File {
	header: Header,
	hashes: Vec<u32>,
	shapes: Vec<u8>,
	mask_ids: Vec<u8>,
	moving_rect_ids: Vec<u8>,
	comparison_masks: Vec<u8>,
	moving_rects: Vec<u8>,
	palettes: Vec<u8>,
	frames: Vec<u8>,
	dyna_masks: Vec<u8>,
	dyna_colors: Vec<u8>,
	/// Row of the last successful identification
	last_found: usize,
}

impl File {
	/// Creates an empty table.
	pub fn new(name: impl Into<String>, dimensions: Dimensions, colors: u32) -> Self {
		Self {
			header: Header {
				name: name.into(),
				width: dimensions.width as u32,
				height: dimensions.height as u32,
				colors,
				..Header::default()
			},
			..Self::default()
		}
	}

	/// Opens a cROM table from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, FormatError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Reads a whole cROM table from any reader.
	pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, FormatError> {
		let mut data = Vec::new();
		reader.read_to_end(&mut data)?;
		Self::from_bytes(&data)
	}

	/// Parses a cROM table with the default configuration.
	pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
		Self::from_bytes_with_config(data, &ParseConfig::default())
	}

	/// Parses a cROM table.
	///
	/// # Errors
	///
	/// Returns an error if:
	/// - the data is shorter than the sizes declared in the header
	/// - a shape flag is neither 0 nor 1
	/// - a row references a comparison mask or dynamic set that does not exist
	/// - bytes remain after the last section and `config.strict_trailing_bytes` is set
	pub fn from_bytes_with_config(data: &[u8], config: &ParseConfig) -> Result<Self, FormatError> {
		if data.len() < HEADER_SIZE {
			return Err(FormatError::InsufficientData {
				expected: HEADER_SIZE,
				actual: data.len(),
			});
		}
		let mut cursor = Cursor::new(data);
		let header = Header::from_reader(&mut cursor)?;

		let frames = header.frames as usize;
		let surface = header.surface();
		let section = |count: u32, unit: usize, field: &'static str| {
			(count as usize).checked_mul(unit).ok_or(FormatError::InvalidValue {
				field,
				value: i64::from(count),
			})
		};

		let expected = [
			section(header.frames, 4 + 3, "frame count")?,
			section(header.comparison_masks, surface, "comparison mask count")?,
			section(header.moving_rects, surface, "moving rect count")?,
			section(header.frames, 3 * header.colors as usize, "frame count")?,
			section(header.frames, 2 * surface, "frame count")?,
			section(header.frames, MAX_DYNA_SETS_PER_FRAME * DYNA_SET_SIZE, "frame count")?,
		]
		.iter()
		.try_fold(HEADER_SIZE, |acc, &n| acc.checked_add(n))
		.ok_or(FormatError::InvalidValue {
			field: "table size",
			value: i64::from(header.frames),
		})?;
		if data.len() < expected {
			return Err(FormatError::InsufficientData {
				expected,
				actual: data.len(),
			});
		}

		let mut hashes = Vec::with_capacity(frames);
		for _ in 0..frames {
			hashes.push(cursor.read_u32::<LittleEndian>()?);
		}
		let shapes = read_vec(&mut cursor, frames)?;
		let mask_ids = read_vec(&mut cursor, frames)?;
		let moving_rect_ids = read_vec(&mut cursor, frames)?;
		let comparison_masks = read_vec(&mut cursor, header.comparison_masks as usize * surface)?;
		let moving_rects = read_vec(&mut cursor, header.moving_rects as usize * surface)?;
		let palettes = read_vec(&mut cursor, frames * 3 * header.colors as usize)?;
		let frame_data = read_vec(&mut cursor, frames * surface)?;
		let dyna_masks = read_vec(&mut cursor, frames * surface)?;
		let dyna_colors = read_vec(&mut cursor, frames * MAX_DYNA_SETS_PER_FRAME * DYNA_SET_SIZE)?;

		if let Some(&flag) = shapes.iter().find(|&&flag| flag > 1) {
			return Err(FormatError::InvalidValue {
				field: "shape flag",
				value: i64::from(flag),
			});
		}
		if let Some(&id) = mask_ids.iter().find(|&&id| id != NONE_ID && u32::from(id) >= header.comparison_masks) {
			return Err(FormatError::InvalidValue {
				field: "comparison mask id",
				value: i64::from(id),
			});
		}
		if let Some(&id) = dyna_masks.iter().find(|&&id| id != NONE_ID && usize::from(id) >= MAX_DYNA_SETS_PER_FRAME) {
			return Err(FormatError::InvalidValue {
				field: "dynamic set id",
				value: i64::from(id),
			});
		}

		let left = data.len() - cursor.position() as usize;
		if left > 0 {
			if config.strict_trailing_bytes {
				return Err(FormatError::TrailingData {
					remaining: left,
				});
			}
			warn!("ignoring {left} trailing bytes in cROM table");
		}

		debug!("{header}");
		Ok(Self {
			header,
			hashes,
			shapes,
			mask_ids,
			moving_rect_ids,
			comparison_masks,
			moving_rects,
			palettes,
			frames: frame_data,
			dyna_masks,
			dyna_colors,
			last_found: 0,
		})
	}

	/// Serializes the table.
	pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
		let mut out = Vec::with_capacity(HEADER_SIZE + self.frames.len() * 3);
		self.header.write_to(&mut out)?;
		for &hash in &self.hashes {
			out.write_u32::<LittleEndian>(hash)?;
		}
		for section in [
			&self.shapes,
			&self.mask_ids,
			&self.moving_rect_ids,
			&self.comparison_masks,
			&self.moving_rects,
			&self.palettes,
			&self.frames,
			&self.dyna_masks,
			&self.dyna_colors,
		] {
			out.extend_from_slice(section);
		}
		Ok(out)
	}

	/// Table header.
	pub fn header(&self) -> &Header {
		&self.header
	}

	/// Frame size of every row.
	pub fn dimensions(&self) -> Dimensions {
		self.header.dimensions()
	}

	/// Number of stored frames.
	pub fn len(&self) -> usize {
		self.hashes.len()
	}

	/// Returns `true` if the table holds no frames.
	pub fn is_empty(&self) -> bool {
		self.hashes.is_empty()
	}

	/// Row of the last successful identification.
	pub fn last_found(&self) -> usize {
		self.last_found
	}

	/// Appends a comparison mask, one byte per pixel, and returns its id.
	pub fn add_comparison_mask(&mut self, mask: &[u8]) -> Result<u8, FormatError> {
		let surface = self.header.surface();
		if mask.len() != surface {
			return Err(FormatError::InsufficientData {
				expected: surface,
				actual: mask.len(),
			});
		}
		let id = self.header.comparison_masks;
		if id >= u32::from(NONE_ID) {
			return Err(FormatError::InvalidValue {
				field: "comparison mask count",
				value: i64::from(id) + 1,
			});
		}
		self.comparison_masks.extend_from_slice(mask);
		self.header.comparison_masks += 1;
		Ok(id as u8)
	}

	/// Appends a stored frame.
	pub fn add_frame(&mut self, frame: &CromFrame) -> Result<(), FormatError> {
		let surface = self.header.surface();
		for (len, expected) in [
			(frame.pixels.len(), surface),
			(frame.dyna_mask.len(), surface),
			(frame.dyna_colors.len(), MAX_DYNA_SETS_PER_FRAME * DYNA_SET_SIZE),
		] {
			if len != expected {
				return Err(FormatError::InsufficientData {
					expected,
					actual: len,
				});
			}
		}
		if frame.mask_id != NONE_ID && u32::from(frame.mask_id) >= self.header.comparison_masks {
			return Err(FormatError::InvalidValue {
				field: "comparison mask id",
				value: i64::from(frame.mask_id),
			});
		}

		self.hashes.push(frame.hash);
		self.shapes.push(u8::from(frame.shape));
		self.mask_ids.push(frame.mask_id);
		self.moving_rect_ids.push(frame.moving_rect_id);
		for i in 0..self.header.colors as usize {
			let c = frame.palette.get(i).copied().unwrap_or(Color::BLACK);
			self.palettes.extend_from_slice(&[c.r, c.g, c.b]);
		}
		self.frames.extend_from_slice(&frame.pixels);
		self.dyna_masks.extend_from_slice(&frame.dyna_mask);
		self.dyna_colors.extend_from_slice(&frame.dyna_colors);
		self.header.frames += 1;
		Ok(())
	}

	/// Finds the stored row matching `frame`, one byte per pixel.
	///
	/// On a hit the row becomes the starting point of the next scan.
	pub fn identify(&mut self, frame: &[u8]) -> Option<usize> {
		let count = self.hashes.len();
		let surface = self.header.surface();
		if count == 0 || frame.len() != surface {
			return None;
		}

		let mut checked = vec![false; count];
		let mut tj = self.last_found.min(count - 1);
		loop {
			let mask_id = self.mask_ids[tj];
			let shape = self.shapes[tj];
			let hash = if mask_id == NONE_ID {
				checksum::pixels(frame, shape == 1)
			} else {
				let start = usize::from(mask_id) * surface;
				checksum::pixels_masked(frame, &self.comparison_masks[start..start + surface], shape == 1)
			};

			for ti in (tj..count).chain(0..tj) {
				if checked[ti] || self.mask_ids[ti] != mask_id || self.shapes[ti] != shape {
					continue;
				}
				if self.hashes[ti] == hash {
					self.last_found = ti;
					return Some(ti);
				}
				checked[ti] = true;
			}

			tj = (1..count).map(|k| (tj + k) % count).find(|&i| !checked[i])?;
		}
	}

	/// Renders row `row` with the live pixels of `frame` filling its dynamic areas.
	///
	/// Returns `None` if the row does not exist or `frame` has the wrong size.
	pub fn colorize(&self, frame: &[u8], row: usize) -> Option<ColoredFrame> {
		let surface = self.header.surface();
		if row >= self.hashes.len() || frame.len() != surface {
			return None;
		}

		let base = row * surface;
		let dyna_base = row * MAX_DYNA_SETS_PER_FRAME * DYNA_SET_SIZE;
		let pixels: Vec<u8> = (0..surface)
			.map(|i| match self.dyna_masks[base + i] {
				NONE_ID => self.frames[base + i],
				set => {
					let live = usize::from(frame[i]).min(DYNA_SET_SIZE - 1);
					self.dyna_colors[dyna_base + usize::from(set) * DYNA_SET_SIZE + live]
				}
			})
			.collect();

		let dim = self.dimensions();
		let planes = planes::split(dim, OUTPUT_BIT_LENGTH, &pixels);
		Some(ColoredFrame::new(dim, planes, self.row_palette(row)))
	}

	/// Identifies and colorizes in one step. Returns `None` on a miss.
	pub fn colorize_frame(&mut self, frame: &[u8]) -> Option<ColoredFrame> {
		let row = self.identify(frame)?;
		debug!("cROM hit: row {row}");
		self.colorize(frame, row)
	}

	/// First 64 colors of the row palette, padded with black.
	fn row_palette(&self, row: usize) -> Vec<Color> {
		let colors = self.header.colors as usize;
		let start = row * colors * 3;
		let mut palette: Vec<Color> = self.palettes[start..start + colors * 3]
			.chunks_exact(3)
			.take(OUTPUT_PALETTE_SIZE)
			.map(|c| Color::new(c[0], c[1], c[2]))
			.collect();
		palette.resize(OUTPUT_PALETTE_SIZE, Color::BLACK);
		palette
	}
}

fn read_vec<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>, FormatError> {
	let mut buf = vec![0u8; len];
	reader.read_exact(&mut buf)?;
	Ok(buf)
}

impl fmt::Display for File {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.header)
	}
}
