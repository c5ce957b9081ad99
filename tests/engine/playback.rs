//! Animations from a VPIN bundle driven by live frames

use dmdcolor_rs::checksum;
use dmdcolor_rs::frame::planes;
use dmdcolor_rs::prelude::*;

const DIM: Dimensions = Dimensions::new(128, 32);

/// Live 2-bit frame whose first 64 pixels are lit in plane 0 only
fn trigger_pixels() -> Vec<u8> {
	let mut pixels = vec![0u8; DIM.surface()];
	pixels[..64].fill(1);
	pixels
}

fn stored_frame(marker: u8, delay: u32, hash: u32) -> AnimationFrame {
	let planes = (0..4).map(|_| vec![marker; DIM.plane_size()]).collect();
	AnimationFrame::new(delay, hash, planes)
}

/// Writes `animation` into a v6 bundle and parses it back.
fn vpin_with(animation: Animation) -> VniFile {
	let mut bundle = VniFile::new(6);
	bundle.add_animation(animation);
	VniFile::from_bytes(&bundle.to_bytes().unwrap()).unwrap()
}

/// Coloring bundle with a 16 color palette and one mapping on the trigger frame.
fn coloring_for(vpin: &VniFile, mode: SwitchMode) -> PalFile {
	let trigger = planes::split(DIM, 2, &trigger_pixels());
	let offset = vpin.animations()[0].offset;
	let mut bundle = PalFile::new(1);
	bundle.add_palette(Palette::new(0, (0..16).map(|i| Color::gray(i * 16)).collect()));
	bundle.add_mapping(Mapping::new(checksum::plane(&trigger[0]), mode, 0, offset as u32));
	PalFile::from_bytes(&bundle.to_bytes().unwrap()).unwrap()
}

fn gray2(pixels: Vec<u8>) -> DmdFrame {
	DmdFrame::gray(DIM, 2, pixels).unwrap()
}

fn marker(outcome: &ColorizeOutcome) -> u8 {
	outcome.colored().expect("colored frame").planes[0][0]
}

#[test]
fn test_replace_animation_plays_out() {
	crate::init_logger();
	let vpin = vpin_with(Animation::new(
		"attract",
		DIM,
		vec![stored_frame(1, 100, 0), stored_frame(2, 100, 0), stored_frame(3, 100, 0)],
	));
	let mut colorizer = VniColorizer::new(coloring_for(&vpin, SwitchMode::Replace), Some(vpin));
	let blank = || gray2(vec![0; DIM.surface()]);

	let first = colorizer.colorize(&gray2(trigger_pixels()), 16);
	assert_eq!(marker(&first), 1);
	assert_eq!(first.colored().unwrap().planes.len(), 4);
	assert_eq!(first.colored().unwrap().palette.len(), 16);
	assert_eq!(colorizer.active_animation().map(|a| a.name.as_str()), Some("attract"));

	assert_eq!(marker(&colorizer.colorize(&blank(), 50)), 1);
	assert_eq!(marker(&colorizer.colorize(&blank(), 50)), 2);
	assert_eq!(marker(&colorizer.colorize(&blank(), 100)), 3);

	// exhausted: the live frame comes back and playback ends
	let after = colorizer.colorize(&blank(), 100);
	let colored = after.colored().unwrap();
	assert_eq!(colored.planes.len(), 2);
	assert!(colored.planes.iter().all(|p| p.iter().all(|&b| b == 0)));
	assert!(colorizer.active_animation().is_none());
	assert!(!colorizer.player().is_running());
}

#[test]
fn test_color_mask_keeps_live_lower_planes() {
	let vpin = vpin_with(Animation::new("enhance", DIM, vec![stored_frame(0xAA, 500, 0)]));
	let mut colorizer = VniColorizer::new(coloring_for(&vpin, SwitchMode::ColorMask), Some(vpin));

	let outcome = colorizer.colorize(&gray2(trigger_pixels()), 16);
	let colored = outcome.colored().unwrap();
	assert_eq!(colored.planes.len(), 4);
	assert_eq!(colored.planes[0][..8], [0xFF; 8]);
	assert_eq!(colored.planes[0][8], 0);
	assert!(colored.planes[1].iter().all(|&b| b == 0));
	assert!(colored.planes[2].iter().all(|&b| b == 0xAA));
	assert!(colored.planes[3].iter().all(|&b| b == 0xAA));
}

#[test]
fn test_layered_scene_accumulates_until_next_match() {
	crate::init_logger();
	// a second live frame with its own stored layer
	let mut second = vec![0u8; DIM.surface()];
	second[DIM.surface() - 8..].fill(2);
	let second_planes = planes::split(DIM, 2, &second);
	let trigger_planes = planes::split(DIM, 2, &trigger_pixels());

	let vpin = vpin_with(Animation::new(
		"scene",
		DIM,
		vec![
			stored_frame(0x0F, 0, checksum::plane(&trigger_planes[0])),
			stored_frame(0xF0, 0, checksum::plane(&second_planes[1])),
		],
	));
	let mut colorizer = VniColorizer::new(coloring_for(&vpin, SwitchMode::LayeredColorMask), Some(vpin));

	let first = colorizer.colorize(&gray2(trigger_pixels()), 16);
	let colored = first.colored().unwrap();
	assert_eq!(colored.planes.len(), 4);
	assert!(colored.planes[2].iter().all(|&b| b == 0x0F));

	// unmatched frames keep the accumulated layers
	let idle = colorizer.colorize(&gray2(vec![0; DIM.surface()]), 16);
	assert!(idle.colored().unwrap().planes[3].iter().all(|&b| b == 0x0F));

	// a new match clears the buffer first
	let next = colorizer.colorize(&gray2(second), 16);
	let colored = next.colored().unwrap();
	assert!(colored.planes[2].iter().all(|&b| b == 0xF0));
	assert_eq!(colored.planes[1], second_planes[1]);
	assert!(colorizer.player().is_running());
}

#[test]
fn test_player_alone_against_parsed_bundle() {
	struct Frames(Vec<(Dimensions, Vec<Vec<u8>>)>);
	impl RenderSink for Frames {
		fn render(&mut self, dimensions: Dimensions, planes: Vec<Vec<u8>>) {
			self.0.push((dimensions, planes));
		}
	}

	let vpin = vpin_with(Animation::new("pair", DIM, vec![stored_frame(7, 40, 0), stored_frame(8, 40, 0)]));
	let animation = &vpin.animations()[0];
	let live = planes::split(DIM, 2, &trigger_pixels());
	let mut player = AnimationPlayer::new(ScalerMode::Doubler);
	let mut sink = Frames(Vec::new());

	player.start(animation, SwitchMode::Replace);
	for _ in 0..4 {
		player.next_frame(animation, DIM, &live, 40, &mut sink);
	}
	let markers: Vec<u8> = sink.0.iter().map(|(_, planes)| planes[0][0]).collect();
	assert_eq!(markers, [7, 8, 0xFF]);
	assert!(sink.0.iter().all(|(dim, _)| *dim == DIM));
	assert!(!player.is_running());
}

#[test]
fn test_mapping_to_unknown_offset_only_switches_palette() {
	let vpin = vpin_with(Animation::new("lonely", DIM, vec![stored_frame(1, 100, 0)]));
	let mut coloring = PalFile::new(1);
	coloring.add_palette(Palette::new(0, vec![Color::BLACK; 4]));
	coloring.add_palette(Palette::new(1, vec![Color::new(0, 0, 255); 4]));
	let trigger = planes::split(DIM, 2, &trigger_pixels());
	coloring.add_mapping(Mapping::new(checksum::plane(&trigger[0]), SwitchMode::Replace, 1, 3));
	let mut colorizer = VniColorizer::new(coloring, Some(vpin));

	let outcome = colorizer.colorize(&gray2(trigger_pixels()), 16);
	assert_eq!(outcome.colored().unwrap().palette[0], Color::new(0, 0, 255));
	assert!(colorizer.active_animation().is_none());
}
