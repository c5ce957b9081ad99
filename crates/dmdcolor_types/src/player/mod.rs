//! Playback of VPIN animations against a live frame stream.
//!
//! An [`AnimationPlayer`] holds the playback cursor of one running animation. It does not own
//! the animation: every call borrows it from the bundle. Output goes to a [`RenderSink`] that
//! the caller passes with each tick, together with the milliseconds elapsed since the
//! previous one.
//!
//! | Mode | Output per tick | Advances |
//! |------|-----------------|----------|
//! | `Replace` | stored planes | by frame delay |
//! | `FollowReplace` | stored planes | by detection |
//! | `ColorMask` | live planes + stored upper planes | by frame delay |
//! | `Follow` | live planes + stored upper planes | by detection |
//! | `LayeredColorMask` | live planes + accumulated upper planes | never |
//! | `MaskedReplace` | accumulated planes where the replace mask is set, live elsewhere | never |
//!
//! Timed modes complete once the accumulated delays have elapsed: the sink is notified,
//! the live frame is emitted one last time and the player stops.

use log::{debug, warn};

use crate::{
	checksum,
	file::{Animation, SwitchMode},
	frame::{Dimensions, ScalerMode, planes, scale},
};


/// Receiver of the frames a player produces.
pub trait RenderSink {
	/// Called with the planes to display and their size.
	fn render(&mut self, dimensions: Dimensions, planes: Vec<Vec<u8>>);

	/// Called once when a timed animation has run out of frames.
	fn completed(&mut self) {}
}

/// Playback state of one animation.
#[derive(Debug, Clone, Default)]
pub struct AnimationPlayer {
	mode: SwitchMode,
	running: bool,
	frame_index: usize,
	/// Milliseconds left on the current frame
	timer: i64,
	scaler_mode: ScalerMode,
	/// Accumulated planes in layered modes
	layers: Vec<Vec<u8>>,
	/// Accumulated frame masks in `MaskedReplace`
	replace_mask: Vec<u8>,
}

impl AnimationPlayer {
	/// Creates an idle player.
	pub fn new(scaler_mode: ScalerMode) -> Self {
		Self {
			scaler_mode,
			..Self::default()
		}
	}

	/// Active switch mode, `Palette` once playback has completed.
	pub fn mode(&self) -> SwitchMode {
		self.mode
	}

	/// Whether an animation is playing.
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Index of the frame on display.
	pub fn frame_index(&self) -> usize {
		self.frame_index
	}

	/// Accumulated replace mask, empty outside `MaskedReplace`.
	pub fn replace_mask(&self) -> &[u8] {
		&self.replace_mask
	}

	/// Upscaling algorithm used when live planes are smaller than the stored ones.
	pub fn scaler_mode(&self) -> ScalerMode {
		self.scaler_mode
	}

	/// Changes the upscaling algorithm.
	pub fn set_scaler_mode(&mut self, scaler_mode: ScalerMode) {
		self.scaler_mode = scaler_mode;
	}

	/// Starts playing `animation` in `mode` from its first frame.
	pub fn start(&mut self, animation: &Animation, mode: SwitchMode) {
		self.running = true;
		self.mode = mode;
		self.frame_index = 0;
		self.timer = 0;
		self.layers.clear();
		self.replace_mask.clear();

		if mode.is_layered() {
			let plane_size = animation.dimensions.plane_size();
			let depth = animation.bit_length();
			self.layers = vec![vec![0u8; plane_size]; depth];
			if mode == SwitchMode::MaskedReplace {
				self.replace_mask = vec![0u8; plane_size];
			}
			debug!("started layered playback of \"{}\" in {mode} mode", animation.name);
		} else {
			debug!(
				"started \"{}\" in {mode} mode, {} frame(s) over {} ms",
				animation.name,
				animation.num_frames(),
				animation.duration()
			);
		}
	}

	/// Drops the playback state.
	pub fn stop(&mut self) {
		self.running = false;
		self.frame_index = 0;
	}

	/// Advances playback by one live frame.
	///
	/// # Arguments
	///
	/// * `animation` - The animation this player was started with
	/// * `dim` - Size of the live frame
	/// * `live` - Bit-planes of the live frame
	/// * `elapsed_ms` - Milliseconds since the previous tick
	/// * `sink` - Receiver of the produced frame
	pub fn next_frame<S: RenderSink>(
		&mut self,
		animation: &Animation,
		dim: Dimensions,
		live: &[Vec<u8>],
		elapsed_ms: u32,
		sink: &mut S,
	) {
		if !self.running {
			return;
		}

		if matches!(self.mode, SwitchMode::ColorMask | SwitchMode::Replace) {
			self.timer -= i64::from(elapsed_ms);
			if self.timer > 0 {
				// current frame is still due
				if let Some(index) = self.frame_index.checked_sub(1) {
					self.output(animation, index, dim, live, sink);
				}
				return;
			}
		}

		if self.frame_index < animation.num_frames() {
			let index = self.frame_index;
			if !(self.mode.is_layered() || self.mode.is_follow()) {
				self.timer += i64::from(animation.frames[index].delay);
				self.frame_index += 1;
			}
			self.output(animation, index, dim, live, sink);
			return;
		}

		debug!("\"{}\" finished", animation.name);
		sink.completed();
		self.mode = SwitchMode::Palette;
		self.output(animation, 0, dim, live, sink);
		self.stop();
	}

	/// Jumps to the first frame whose hash matches the live plane, unmasked or through one of
	/// `masks`. Returns whether a frame matched.
	pub fn detect_follow(&mut self, animation: &Animation, plane: &[u8], plane_crc: u32, masks: &[Vec<u8>]) -> bool {
		let masked: Vec<u32> = masks.iter().map(|mask| checksum::plane_masked(plane, mask)).collect();
		let found = animation
			.frames
			.iter()
			.position(|frame| frame.hash == plane_crc || masked.contains(&frame.hash));

		if let Some(index) = found {
			self.frame_index = index;
		}
		found.is_some()
	}

	/// Merges every frame matching the live plane into the layer buffer.
	///
	/// The plane is hashed unmasked and through each animation mask. `clear` empties the
	/// buffer before the first merge; the returned flag is the value to pass for the next
	/// plane of the same live frame, so one live frame clears the buffer at most once.
	pub fn detect_lcm(&mut self, animation: &Animation, plane: &[u8], plane_crc: u32, clear: bool) -> bool {
		let mut clear = clear;
		let checksums = std::iter::once(plane_crc)
			.chain(animation.masks.iter().map(|mask| checksum::plane_masked(plane, &mask.data)));

		for crc in checksums {
			for frame in animation.frames.iter().filter(|f| f.hash == crc) {
				if clear {
					self.layers.iter_mut().for_each(|layer| planes::clear_plane(layer));
					planes::clear_plane(&mut self.replace_mask);
					clear = false;
				}
				for (layer, stored) in self.layers.iter_mut().zip(&frame.planes) {
					planes::or_plane(stored, layer);
				}
				if self.mode == SwitchMode::MaskedReplace {
					if let Some(mask) = &frame.mask {
						planes::or_plane(mask, &mut self.replace_mask);
					}
				}
			}
		}
		clear
	}

	fn output<S: RenderSink>(&self, animation: &Animation, index: usize, dim: Dimensions, live: &[Vec<u8>], sink: &mut S) {
		let planes = match self.mode {
			SwitchMode::ColorMask | SwitchMode::Follow => match animation.frames.get(index) {
				Some(frame) => color_mask(&frame.planes, live),
				None => live.to_vec(),
			},
			SwitchMode::Replace | SwitchMode::FollowReplace => match animation.frames.get(index) {
				Some(frame) => frame.planes.clone(),
				None => live.to_vec(),
			},
			SwitchMode::LayeredColorMask | SwitchMode::MaskedReplace => self.layered(dim, live),
			SwitchMode::Palette | SwitchMode::Event => live.to_vec(),
		};

		let dim = if planes.first().is_some_and(|p| p.len() == dim.surface() / 2) {
			dim.doubled()
		} else {
			dim
		};
		sink.render(dim, planes);
	}

	fn layered(&self, dim: Dimensions, live: &[Vec<u8>]) -> Vec<Vec<u8>> {
		if self.mode == SwitchMode::LayeredColorMask {
			return self
				.layers
				.iter()
				.enumerate()
				.map(|(i, layer)| live.get(i).unwrap_or(layer).clone())
				.collect();
		}

		let scaled;
		let live = match (self.layers.first(), live.first()) {
			(Some(layer), Some(plane)) if layer.len() == plane.len() * 4 => {
				scaled = scale::scale_planes(self.scaler_mode, dim, live);
				&scaled
			}
			_ => live,
		};
		self.layers
			.iter()
			.enumerate()
			.map(|(i, layer)| match live.get(i) {
				Some(plane) => planes::combine_with_mask(layer, plane, &self.replace_mask),
				None => layer.clone(),
			})
			.collect()
	}
}

/// Puts the live planes below the stored frame's upper planes.
///
/// With as many live planes as stored ones, the two topmost stored planes replace the live
/// ones. Stored frames need at least four planes, shallower ones leave the live frame as is.
fn color_mask(stored: &[Vec<u8>], live: &[Vec<u8>]) -> Vec<Vec<u8>> {
	if stored.len() < 4 {
		warn!("cannot enhance a frame with only {} stored plane(s)", stored.len());
		return live.to_vec();
	}

	let keep = if live.len() == stored.len() {
		live.len() - 2
	} else {
		live.len().min(stored.len())
	};
	live[..keep].iter().chain(&stored[keep..]).cloned().collect()
}
