//! Frame model shared by every stage of the colorization pipeline.
//!
//! Incoming frames arrive as a [`DmdFrame`], a tagged union over the formats a frame
//! source can produce. The engine dispatches on the tag: gray frames are split into
//! bit-planes and looked up, everything else passes through untouched.
//!
//! | Variant | Payload | Engine behaviour |
//! |---------|---------|------------------|
//! | `Gray2` | 1 byte/pixel, values 0-3 | colorized |
//! | `Gray4` | 1 byte/pixel, values 0-15 | colorized |
//! | `Gray6` | 1 byte/pixel, values 0-63 | colorized |
//! | `Rgb24` | 3 bytes/pixel | pass-through |
//! | `ColoredGray` | planes + palette | pass-through |
//!
//! Colorized output is a [`ColoredFrame`]: indexed bit-planes plus the palette they index.

use std::fmt;

use serde::Serialize;

pub mod color;
pub mod planes;
pub mod scale;

pub use color::{Color, resize_palette};
pub use scale::ScalerMode;

/// Width and height of a frame in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Dimensions {
	/// Width in pixels
	pub width: usize,
	/// Height in pixels
	pub height: usize,
}

impl Dimensions {
	/// Creates new dimensions.
	pub const fn new(width: usize, height: usize) -> Self {
		Self {
			width,
			height,
		}
	}

	/// Number of pixels.
	pub const fn surface(&self) -> usize {
		self.width * self.height
	}

	/// Size of one packed bit-plane in bytes.
	pub const fn plane_size(&self) -> usize {
		self.surface().div_ceil(8)
	}

	/// Both sides multiplied by two.
	pub const fn doubled(&self) -> Self {
		Self::new(self.width * 2, self.height * 2)
	}

	/// Both sides divided by two.
	pub const fn halved(&self) -> Self {
		Self::new(self.width / 2, self.height / 2)
	}
}

impl fmt::Display for Dimensions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}x{}", self.width, self.height)
	}
}

/// Live palette cycling entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorRotation {
	/// First palette index of the rotated range
	pub first: u8,
	/// Number of entries in the range
	pub count: u8,
	/// Milliseconds between steps
	pub interval_ms: u32,
}

impl ColorRotation {
	/// Rotates the range by `steps` positions towards higher indices.
	pub fn apply(&self, palette: &mut [Color], steps: usize) {
		let start = usize::from(self.first);
		let end = (start + usize::from(self.count)).min(palette.len());
		if start >= end {
			return;
		}
		let range = &mut palette[start..end];
		let len = range.len();
		range.rotate_right(steps % len);
	}
}

/// A colorized frame: indexed bit-planes plus the palette they index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColoredFrame {
	/// Frame size
	pub dimensions: Dimensions,
	/// One plane per bit of color depth, plane 0 is the least significant bit
	pub planes: Vec<Vec<u8>>,
	/// Palette indexed by the composite plane value
	pub palette: Vec<Color>,
	/// Palette cycling entries, empty when the source format has none
	pub rotations: Vec<ColorRotation>,
}

impl ColoredFrame {
	/// Creates a colored frame without rotations.
	pub fn new(dimensions: Dimensions, planes: Vec<Vec<u8>>, palette: Vec<Color>) -> Self {
		Self {
			dimensions,
			planes,
			palette,
			rotations: Vec::new(),
		}
	}

	/// Color depth in bits.
	pub fn bit_length(&self) -> usize {
		self.planes.len()
	}

	/// Joins the planes into one palette index per pixel.
	pub fn to_indices(&self) -> Vec<u8> {
		planes::join(self.dimensions, &self.planes)
	}

	/// Resolves every pixel through the palette into packed RGB24.
	///
	/// Indices without a palette entry render black.
	pub fn to_rgb24(&self) -> Vec<u8> {
		self.to_indices()
			.into_iter()
			.flat_map(|index| {
				let c = self.palette.get(usize::from(index)).copied().unwrap_or(Color::BLACK);
				[c.r, c.g, c.b]
			})
			.collect()
	}
}

/// An incoming frame, tagged by format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DmdFrame {
	/// 2-bit grayscale, one byte per pixel
	Gray2 {
		/// Frame size
		dimensions: Dimensions,
		/// Pixel values 0-3
		pixels: Vec<u8>,
	},
	/// 4-bit grayscale, one byte per pixel
	Gray4 {
		/// Frame size
		dimensions: Dimensions,
		/// Pixel values 0-15
		pixels: Vec<u8>,
	},
	/// 6-bit grayscale, one byte per pixel
	Gray6 {
		/// Frame size
		dimensions: Dimensions,
		/// Pixel values 0-63
		pixels: Vec<u8>,
	},
	/// True color, three bytes per pixel
	Rgb24 {
		/// Frame size
		dimensions: Dimensions,
		/// Packed RGB data
		data: Vec<u8>,
	},
	/// Already colorized
	ColoredGray(ColoredFrame),
}

impl DmdFrame {
	/// Wraps a one-byte-per-pixel gray frame of the given depth.
	///
	/// Returns `None` for depths other than 2, 4 or 6.
	pub fn gray(dimensions: Dimensions, bit_length: usize, pixels: Vec<u8>) -> Option<Self> {
		match bit_length {
			2 => Some(Self::Gray2 {
				dimensions,
				pixels,
			}),
			4 => Some(Self::Gray4 {
				dimensions,
				pixels,
			}),
			6 => Some(Self::Gray6 {
				dimensions,
				pixels,
			}),
			_ => None,
		}
	}

	/// Frame size.
	pub fn dimensions(&self) -> Dimensions {
		match self {
			Self::Gray2 { dimensions, .. }
			| Self::Gray4 { dimensions, .. }
			| Self::Gray6 { dimensions, .. }
			| Self::Rgb24 { dimensions, .. } => *dimensions,
			Self::ColoredGray(frame) => frame.dimensions,
		}
	}

	/// Gray depth in bits, `None` for color variants.
	pub fn bit_length(&self) -> Option<usize> {
		match self {
			Self::Gray2 { .. } => Some(2),
			Self::Gray4 { .. } => Some(4),
			Self::Gray6 { .. } => Some(6),
			Self::Rgb24 { .. }
			| Self::ColoredGray(_) => None,
		}
	}

	/// Pixel data of gray variants.
	pub fn gray_pixels(&self) -> Option<&[u8]> {
		match self {
			Self::Gray2 { pixels, .. }
			| Self::Gray4 { pixels, .. }
			| Self::Gray6 { pixels, .. } => Some(pixels),
			Self::Rgb24 { .. }
			| Self::ColoredGray(_) => None,
		}
	}

	/// Splits a gray frame into bit-planes.
	pub fn to_planes(&self) -> Option<Vec<Vec<u8>>> {
		let bit_length = self.bit_length()?;
		let pixels = self.gray_pixels()?;
		Some(planes::split(self.dimensions(), bit_length, pixels))
	}
}
