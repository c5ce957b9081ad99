//! Frame lookup through cROM tables

use dmdcolor_rs::checksum;
use dmdcolor_rs::file::crom::{DYNA_SET_SIZE, NONE_ID};
use dmdcolor_rs::prelude::*;

const DIM: Dimensions = Dimensions::new(128, 32);

fn gray(seed: u32) -> Vec<u8> {
	(0..DIM.surface() as u32).map(|i| ((i.wrapping_mul(seed) >> 4) & 3) as u8).collect()
}

fn palette(base: u8) -> Vec<Color> {
	(0..64).map(|i| Color::new(base, i * 4, 0)).collect()
}

fn write_and_load(table: &CromFile) -> CromFile {
	CromFile::from_bytes(&table.to_bytes().unwrap()).unwrap()
}

#[test]
fn test_store_identifies_and_colorizes() {
	crate::init_logger();
	let mut table = CromFile::new("test_rom", DIM, 64);
	for seed in 1..=6 {
		let colored = vec![seed as u8 * 10; DIM.surface()];
		table.add_frame(&CromFrame::matching(&gray(seed * 7), false, palette(seed as u8), colored)).unwrap();
	}
	let mut table = write_and_load(&table);
	assert_eq!(table.header().name, "test_rom");
	assert_eq!(table.len(), 6);

	for seed in [4u32, 2, 6, 1] {
		let frame = table.colorize_frame(&gray(seed * 7)).expect("stored frame");
		assert_eq!(table.last_found(), seed as usize - 1);
		assert!(frame.to_indices().iter().all(|&v| v == seed as u8 * 10));
		assert_eq!(frame.palette[0].r, seed as u8);
		assert_eq!(frame.to_rgb24().len(), DIM.surface() * 3);
	}
	assert!(table.colorize_frame(&gray(999)).is_none());
}

#[test]
fn test_masked_and_dynamic_row() {
	let source = gray(13);
	let mut mask = vec![0u8; DIM.surface()];
	// the score area in the last row is not compared
	mask[DIM.surface() - DIM.width..].fill(1);

	let mut table = CromFile::new("dyna", DIM, 64);
	let mask_id = table.add_comparison_mask(&mask).unwrap();
	let mut row = CromFrame::matching(&source, false, palette(1), vec![3; DIM.surface()]);
	row.mask_id = mask_id;
	row.hash = checksum::pixels_masked(&source, &mask, false);
	row.dyna_mask[DIM.surface() - DIM.width..].fill(0);
	row.dyna_colors[..DYNA_SET_SIZE].copy_from_slice(&[40, 41, 42, 43]);
	table.add_frame(&row).unwrap();
	let mut table = write_and_load(&table);

	let mut live = source.clone();
	live[DIM.surface() - 1] = 3;
	live[DIM.surface() - 2] = 0;
	let colored = table.colorize_frame(&live).expect("masked match");
	let indices = colored.to_indices();
	assert_eq!(indices[0], 3);
	assert_eq!(indices[DIM.surface() - 1], 43);
	assert_eq!(indices[DIM.surface() - 2], 40);

	live[0] ^= 1;
	assert!(table.identify(&live).is_none());
}

#[test]
fn test_shape_rows_match_any_brightness() {
	let source = gray(5);
	let mut table = CromFile::new("shape", DIM, 64);
	table.add_frame(&CromFrame::matching(&source, true, palette(2), vec![9; DIM.surface()])).unwrap();
	let mut table = write_and_load(&table);

	let brighter: Vec<u8> = source.iter().map(|&v| if v > 0 { 3 } else { 0 }).collect();
	assert_eq!(table.identify(&brighter), Some(0));
	let shifted: Vec<u8> = source.iter().map(|&v| if v > 0 { 0 } else { 1 }).collect();
	assert_eq!(table.identify(&shifted), None);
}

#[test]
fn test_corrupt_tables_are_rejected() {
	let mut table = CromFile::new("bad", DIM, 64);
	let mut row = CromFrame::matching(&gray(3), false, palette(0), vec![0; DIM.surface()]);
	row.dyna_mask[0] = 9;
	table.add_frame(&row).unwrap();
	assert!(matches!(CromFile::from_bytes(&table.to_bytes().unwrap()), Err(FormatError::InvalidValue { .. })));

	assert!(CromFile::from_bytes(&[0; 10]).is_err());
	assert_eq!(NONE_ID, 255);
}
