//! RGB colors and palette resizing.

use std::fmt;

use serde::Serialize;

/// RGB color representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
	/// Red component (0-255)
	pub r: u8,
	/// Green component (0-255)
	pub g: u8,
	/// Blue component (0-255)
	pub b: u8,
}

impl Color {
	/// Black
	pub const BLACK: Self = Self::new(0, 0, 0);

	/// Creates a new RGB color.
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self {
			r,
			g,
			b,
		}
	}

	/// Creates a new grayscale color.
	pub const fn gray(value: u8) -> Self {
		Self::new(value, value, value)
	}

	/// Returns the color as a 24-bit `0xRRGGBB` value.
	pub const fn to_rgb24(&self) -> u32 {
		((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
	}

	/// Linear mix between two colors, `t` in `0.0..=1.0`.
	pub fn mix(self, other: Self, t: f64) -> Self {
		let channel = |a: u8, b: u8| -> u8 {
			(f64::from(a) * (1.0 - t) + f64::from(b) * t).round().clamp(0.0, 255.0) as u8
		};
		Self::new(channel(self.r, other.r), channel(self.g, other.g), channel(self.b, other.b))
	}
}

impl fmt::Display for Color {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
	}
}

/// Fits a palette to exactly `count` colors.
///
/// Well-known layouts are subset directly (16 or 64 colors down to 4 takes indices
/// 0, 1, 4 and 15; 64 down to 16 takes the first sixteen). Anything else is linearly
/// interpolated between neighbouring entries.
pub fn resize_palette(colors: &[Color], count: usize) -> Vec<Color> {
	match (colors.len(), count) {
		(0, _) | (_, 0) => Vec::new(),
		(len, _) if len == count => colors.to_vec(),
		(1, _) => vec![colors[0]; count],
		(_, 1) => vec![colors[0]],
		(16 | 64, 4) => vec![colors[0], colors[1], colors[4], colors[15]],
		(64, 16) => colors[..16].to_vec(),
		(len, _) => interpolate(colors, len, count),
	}
}

fn interpolate(colors: &[Color], len: usize, count: usize) -> Vec<Color> {
	let to_step = 1.0 / (count - 1) as f64;
	let from_step = 1.0 / (len - 1) as f64;
	let mut from = 0usize;
	let mut out = Vec::with_capacity(count);

	for to in 0..count {
		let from_idx = from.min(len - 2);
		let relative = (to as f64 * to_step - from_idx as f64 * from_step) / from_step;
		out.push(colors[from_idx].mix(colors[from_idx + 1], relative.clamp(0.0, 1.0)));

		while from_step * ((from + 1) as f64) < to_step * (to + 1) as f64 {
			from += 1;
		}
	}
	out
}
