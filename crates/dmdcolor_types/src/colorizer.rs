//! Palette and animation colorizer for gray DMD frames.
//!
//! [`VniColorizer`] combines a coloring bundle with an optional VPIN animation bundle. Every
//! gray frame is split into bit-planes and each plane is hashed, first as is and then through
//! every mask of the coloring bundle. A hash that hits a mapping switches the palette and,
//! for animation mappings, starts the animation at the mapped offset. While an animation
//! runs it produces the output; otherwise the live planes are colored with the current
//! palette.
//!
//! Frame timing is supplied by the caller as the milliseconds elapsed since the previous
//! frame. It drives animation delays and timed palette resets.
//!
//! # Examples
//!
//! ```
//! use dmdcolor_types::checksum;
//! use dmdcolor_types::colorizer::{ColorizeOutcome, VniColorizer};
//! use dmdcolor_types::file::{Mapping, PalFile, Palette, SwitchMode};
//! use dmdcolor_types::frame::{Color, Dimensions, DmdFrame};
//!
//! let dim = Dimensions::new(128, 32);
//! let mut coloring = PalFile::new(1);
//! coloring.add_palette(Palette::new(0, vec![Color::gray(0), Color::gray(255)]));
//! coloring.add_palette(Palette::new(1, vec![Color::BLACK, Color::new(255, 0, 0)]));
//! let blank_plane = vec![0u8; dim.plane_size()];
//! coloring.add_mapping(Mapping::new(checksum::plane(&blank_plane), SwitchMode::Palette, 1, 0));
//!
//! let mut colorizer = VniColorizer::new(coloring, None);
//! let frame = DmdFrame::gray(dim, 2, vec![0; dim.surface()]).unwrap();
//! match colorizer.colorize(&frame, 16) {
//! 	ColorizeOutcome::Colored(colored) => assert_eq!(colored.palette[3], Color::new(255, 0, 0)),
//! 	ColorizeOutcome::PassThrough => unreachable!(),
//! }
//! ```

use log::{debug, warn};

use crate::{
	checksum,
	file::{Animation, Mapping, PalFile, Palette, SwitchMode, VniFile},
	frame::{ColoredFrame, Dimensions, DmdFrame, ScalerMode, planes, scale},
	player::{AnimationPlayer, RenderSink},
};

/// Marker in the first four pixels of a 4-bit frame that carries a palette switch.
pub const EMBEDDED_PALETTE_MARKER: [u8; 4] = [0x08, 0x09, 0x0A, 0x0B];

/// Pixels cleared from a frame that carries an embedded palette switch.
pub const EMBEDDED_PALETTE_PIXELS: usize = 6;

/// Runtime options of a [`VniColorizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorizerConfig {
	/// Algorithm used when frames are upscaled 2x
	pub scaler_mode: ScalerMode,
	/// Honor palette switches embedded in 4-bit frames
	pub embedded_palettes: bool,
}

impl Default for ColorizerConfig {
	fn default() -> Self {
		Self {
			scaler_mode: ScalerMode::Doubler,
			embedded_palettes: true,
		}
	}
}

impl ColorizerConfig {
	/// Creates a configuration.
	pub fn new(scaler_mode: ScalerMode, embedded_palettes: bool) -> Self {
		Self {
			scaler_mode,
			embedded_palettes,
		}
	}

	/// Nearest neighbour upscaling.
	pub fn doubler() -> Self {
		Self::default()
	}

	/// Scale2x upscaling.
	pub fn scale2x() -> Self {
		Self {
			scaler_mode: ScalerMode::Scale2x,
			..Self::default()
		}
	}
}

/// Result of colorizing one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorizeOutcome {
	/// The frame is not handled and should be shown unchanged
	PassThrough,
	/// The colorized frame
	Colored(ColoredFrame),
}

impl ColorizeOutcome {
	/// The colorized frame, if any.
	pub fn colored(&self) -> Option<&ColoredFrame> {
		match self {
			Self::Colored(frame) => Some(frame),
			Self::PassThrough => None,
		}
	}

	/// Returns `true` if the frame passes through unchanged.
	pub fn is_pass_through(&self) -> bool {
		matches!(self, Self::PassThrough)
	}
}

/// Collects what the player emits during one tick.
#[derive(Default)]
struct FrameCapture {
	output: Option<(Dimensions, Vec<Vec<u8>>)>,
	completed: bool,
}

impl RenderSink for FrameCapture {
	fn render(&mut self, dimensions: Dimensions, planes: Vec<Vec<u8>>) {
		self.output = Some((dimensions, planes));
	}

	fn completed(&mut self) {
		self.completed = true;
	}
}

/// Colorizer driven by a coloring bundle and an optional animation bundle.
#[derive(Debug, Clone)]
pub struct VniColorizer {
	coloring: PalFile,
	animations: Option<VniFile>,
	config: ColorizerConfig,
	palette: Option<Palette>,
	default_palette: Option<Palette>,
	/// Milliseconds until a timed palette switch reverts
	palette_reset: Option<u32>,
	/// Position of the running animation in `animations`
	active: Option<usize>,
	player: AnimationPlayer,
	last_embedded: Option<u32>,
	reset_embedded: bool,
}

impl VniColorizer {
	/// Creates a colorizer with the default configuration.
	pub fn new(coloring: PalFile, animations: Option<VniFile>) -> Self {
		Self::with_config(coloring, animations, ColorizerConfig::default())
	}

	/// Creates a colorizer.
	///
	/// # Arguments
	///
	/// * `coloring` - Palettes, mappings and masks
	/// * `animations` - Animations started by animation mappings
	/// * `config` - Runtime options
	pub fn with_config(coloring: PalFile, animations: Option<VniFile>, config: ColorizerConfig) -> Self {
		let default_palette = coloring.default_palette().cloned();
		if default_palette.is_none() {
			warn!("coloring bundle has no palettes, frames will pass through");
		}
		Self {
			coloring,
			animations,
			config,
			palette: default_palette.clone(),
			default_palette,
			palette_reset: None,
			active: None,
			player: AnimationPlayer::new(config.scaler_mode),
			last_embedded: None,
			reset_embedded: false,
		}
	}

	/// Runtime options.
	pub fn config(&self) -> &ColorizerConfig {
		&self.config
	}

	/// Palette applied to the next rendered frame.
	pub fn palette(&self) -> Option<&Palette> {
		self.palette.as_ref()
	}

	/// The running animation.
	pub fn active_animation(&self) -> Option<&Animation> {
		let index = self.active?;
		self.animations.as_ref()?.get(index)
	}

	/// Playback state of the running animation.
	pub fn player(&self) -> &AnimationPlayer {
		&self.player
	}

	/// Colorizes one frame.
	///
	/// Gray frames are looked up and colored. Other formats and colorizers without palettes
	/// return [`ColorizeOutcome::PassThrough`].
	///
	/// # Arguments
	///
	/// * `frame` - The incoming frame
	/// * `elapsed_ms` - Milliseconds since the previous frame
	pub fn colorize(&mut self, frame: &DmdFrame, elapsed_ms: u32) -> ColorizeOutcome {
		let (Some(bit_length), Some(pixels)) = (frame.bit_length(), frame.gray_pixels()) else {
			return ColorizeOutcome::PassThrough;
		};
		let dim = frame.dimensions();
		self.tick_palette_reset(elapsed_ms);

		let mut pixels = pixels.to_vec();
		if self.config.embedded_palettes
			&& bit_length == 4
			&& self.coloring.palettes().len() > 1
			&& self.animations.is_none()
		{
			self.switch_embedded_palette(&mut pixels);
		}

		let planes = planes::split(dim, bit_length, &pixels);
		if !self.coloring.mappings().is_empty() {
			self.trigger(&planes);
		}

		let Some(index) = self.active else {
			return self.render(dim, planes);
		};

		let mut capture = FrameCapture::default();
		if let Some(animation) = self.animations.as_ref().and_then(|set| set.get(index)) {
			self.player.set_scaler_mode(self.config.scaler_mode);
			self.player.next_frame(animation, dim, &planes, elapsed_ms, &mut capture);
		}
		if capture.completed {
			self.animation_finished();
		}
		match capture.output {
			Some((dim, planes)) => self.render(dim, planes),
			None => ColorizeOutcome::PassThrough,
		}
	}

	/// Applies a mapping: switches the palette and starts its animation.
	///
	/// Event mappings are ignored, as is a mapping that would restart the layered scene that
	/// is already running.
	pub fn activate_mapping(&mut self, mapping: &Mapping) {
		if mapping.mode == SwitchMode::Event {
			return;
		}
		if mapping.mode.is_layered()
			&& self.player.is_running()
			&& self.player.mode() == mapping.mode
			&& self.active_animation().map(|a| a.offset) == mapping.animation_offset()
		{
			return;
		}

		self.stop_animation();

		let Some(palette) = self.coloring.get_palette(mapping.palette_index).cloned() else {
			warn!("no palette at index {}", mapping.palette_index);
			return;
		};
		self.palette_reset = None;
		self.set_palette(palette);

		let Some(offset) = mapping.animation_offset() else {
			if mapping.duration > 0 {
				self.palette_reset = Some(mapping.duration);
			}
			return;
		};

		let Some(set) = &self.animations else {
			warn!("mapping {:08X} starts an animation but no animation bundle is loaded", mapping.checksum);
			return;
		};
		let Some(index) = set.index_of(offset) else {
			warn!("no animation at offset {offset}");
			return;
		};
		if let Some(animation) = set.get(index) {
			self.player.start(animation, mapping.mode);
			self.active = Some(index);
		}
	}

	/// Switches to the palette stored with `index`.
	pub fn load_palette(&mut self, index: u32) {
		match u16::try_from(index).ok().and_then(|i| self.coloring.get_palette(i)).cloned() {
			Some(palette) => self.set_palette(palette),
			None => warn!("no palette for change to {index}"),
		}
	}

	fn set_palette(&mut self, palette: Palette) {
		debug!("palette {} with {} color(s)", palette.index, palette.colors.len());
		self.palette = Some(palette);
	}

	fn tick_palette_reset(&mut self, elapsed_ms: u32) {
		let Some(left) = self.palette_reset else {
			return;
		};
		if elapsed_ms < left {
			self.palette_reset = Some(left - elapsed_ms);
			return;
		}
		self.palette_reset = None;
		if let Some(palette) = self.default_palette.clone() {
			debug!("timed palette switch expired, back to default");
			self.set_palette(palette);
		}
	}

	fn switch_embedded_palette(&mut self, pixels: &mut [u8]) {
		if pixels.len() < EMBEDDED_PALETTE_PIXELS {
			return;
		}
		if pixels[..4] == EMBEDDED_PALETTE_MARKER {
			let index = u32::from(pixels[5]) * 8 + u32::from(pixels[4]);
			pixels[..EMBEDDED_PALETTE_PIXELS].fill(0);

			if self.last_embedded != Some(index) {
				self.load_palette(index);
				if !self.coloring.default_palette().is_some_and(Palette::is_persistent) {
					self.reset_embedded = true;
				}
				self.last_embedded = Some(index);
			}
		} else if self.reset_embedded {
			self.last_embedded = self.default_palette.as_ref().map(|p| u32::from(p.index));
			if let Some(palette) = self.default_palette.clone() {
				self.set_palette(palette);
			}
			self.reset_embedded = false;
		}
	}

	/// Looks every plane up and feeds the running animation's detection.
	fn trigger(&mut self, planes: &[Vec<u8>]) {
		let mut clear = true;
		for plane in planes {
			let crc = checksum::plane(plane);
			if let Some(mapping) = self.find_mapping(plane, crc) {
				debug!("hash {:08X} hit a {} mapping", mapping.checksum, mapping.mode);
				self.activate_mapping(&mapping);
				if self.active.is_some() && !self.player.mode().is_layered() {
					return;
				}
			}

			let Some(animation) = self.active.and_then(|i| self.animations.as_ref()?.get(i)) else {
				continue;
			};
			let mode = self.player.mode();
			if mode.is_layered() {
				clear = self.player.detect_lcm(animation, plane, crc, clear);
			} else if mode.is_follow() {
				self.player.detect_follow(animation, plane, crc, self.coloring.masks());
			}
		}
	}

	fn find_mapping(&self, plane: &[u8], crc: u32) -> Option<Mapping> {
		self.coloring
			.find_mapping(crc)
			.or_else(|| {
				self.coloring
					.masks()
					.iter()
					.find_map(|mask| self.coloring.find_mapping(checksum::plane_masked(plane, mask)))
			})
			.copied()
	}

	fn render(&self, dim: Dimensions, planes: Vec<Vec<u8>>) -> ColorizeOutcome {
		let (Some(palette), Some(first)) = (&self.palette, planes.first()) else {
			return ColorizeOutcome::PassThrough;
		};

		let planes = if first.len() != dim.plane_size() && first.len() == dim.halved().plane_size() {
			scale::scale_planes(self.config.scaler_mode, dim.halved(), &planes)
		} else {
			planes
		};
		let colors = palette.colors_for(planes.len());
		ColorizeOutcome::Colored(ColoredFrame::new(dim, planes, colors))
	}

	fn stop_animation(&mut self) {
		if self.active.take().is_some() {
			self.player.stop();
		}
	}

	fn animation_finished(&mut self) {
		self.palette = self.default_palette.clone();
		self.active = None;
	}
}
