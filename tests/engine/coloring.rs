//! Palette switching through coloring bundles

use dmdcolor_rs::checksum;
use dmdcolor_rs::file::pal::PaletteType;
use dmdcolor_rs::prelude::*;

const DIM: Dimensions = Dimensions::new(128, 32);

fn palette(index: u16, red: u8) -> Palette {
	Palette::new(index, (0..4).map(|i| Color::new(red, i * 80, 0)).collect())
}

fn gray2(pixels: Vec<u8>) -> DmdFrame {
	DmdFrame::gray(DIM, 2, pixels).unwrap()
}

fn red_of(outcome: &ColorizeOutcome) -> u8 {
	outcome.colored().expect("colored frame").palette[0].r
}

#[test]
fn test_zero_frame_resolves_to_mapped_palette() {
	crate::init_logger();
	let zero_frame = vec![0u8; DIM.surface()];
	let mut bundle = PalFile::new(1);
	bundle.add_palette(palette(0, 10));
	bundle.add_palette(palette(1, 20));
	bundle.add_mapping(Mapping::new(checksum::checksum(&zero_frame), SwitchMode::Palette, 1, 0));

	let parsed = PalFile::from_bytes(&bundle.to_bytes().unwrap()).unwrap();
	assert_eq!(parsed.palettes().len(), 2);
	assert_eq!(parsed.default_palette().map(|p| p.index), Some(0));
	assert_eq!(parsed.find_palette(checksum::pixels(&zero_frame, false)).map(|p| p.index), Some(1));
	assert!(parsed.find_palette(checksum::pixels(&[1u8; 4096], false)).is_none());
}

#[test]
fn test_colorizer_switches_on_plane_checksum() {
	crate::init_logger();
	let mut bundle = PalFile::new(1);
	bundle.add_palette(palette(0, 10));
	bundle.add_palette(palette(1, 20).with_type(PaletteType::Normal));
	let blank_plane = vec![0u8; DIM.plane_size()];
	bundle.add_mapping(Mapping::new(checksum::plane(&blank_plane), SwitchMode::Palette, 1, 250));
	let parsed = PalFile::from_bytes(&bundle.to_bytes().unwrap()).unwrap();

	let mut colorizer = VniColorizer::new(parsed, None);
	let mut busy = vec![0u8; DIM.surface()];
	busy[2000] = 3;

	assert_eq!(red_of(&colorizer.colorize(&gray2(busy.clone()), 16)), 10);
	assert_eq!(red_of(&colorizer.colorize(&gray2(vec![0; DIM.surface()]), 16)), 20);
	assert_eq!(red_of(&colorizer.colorize(&gray2(busy.clone()), 200)), 20);
	assert_eq!(red_of(&colorizer.colorize(&gray2(busy), 100)), 10);
}

#[test]
fn test_masked_lookup_through_parsed_masks() {
	let mut bundle = PalFile::new(1);
	bundle.add_palette(palette(0, 10));
	bundle.add_palette(palette(1, 20));
	// ignore the bottom half of the display
	let mut mask = vec![0xFFu8; DIM.plane_size()];
	mask[256..].fill(0);
	bundle.add_mask(mask.clone());
	let mut reference = vec![0u8; DIM.plane_size()];
	reference[3] = 0x18;
	bundle.add_mapping(Mapping::new(checksum::plane_masked(&reference, &mask), SwitchMode::Palette, 1, 0));
	let parsed = PalFile::from_bytes(&bundle.to_bytes().unwrap()).unwrap();
	assert_eq!(parsed.masks(), &[mask][..]);

	let mut pixels = vec![0u8; DIM.surface()];
	// pixels 27 and 28 give byte 3 = 0x18 in plane 0
	pixels[27] = 1;
	pixels[28] = 1;
	// noise in the masked half
	pixels[3000] = 3;

	let mut colorizer = VniColorizer::new(parsed, None);
	assert_eq!(red_of(&colorizer.colorize(&gray2(pixels), 16)), 20);
}

#[test]
fn test_truncated_mapping_section_degrades() {
	let mut bundle = PalFile::new(1);
	bundle.add_palette(palette(0, 10));
	bundle.add_mapping(Mapping::new(1, SwitchMode::Palette, 0, 0));
	let mut bytes = bundle.to_bytes().unwrap();
	bytes.truncate(bytes.len() - 4);

	let parsed = PalFile::from_bytes(&bytes).unwrap();
	assert!(parsed.mappings().is_empty());
	assert_eq!(parsed.palettes().len(), 1);
}

#[test]
fn test_bad_bundles_fail_to_load() {
	assert!(PalFile::from_bytes(&[1, 0, 2, 0, 0]).is_err());
	assert!(PalFile::open("/nonexistent/coloring.pal").is_err());
}
