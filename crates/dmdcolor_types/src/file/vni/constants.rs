//! Constants of the VPIN animation bundle format.

use crate::frame::Dimensions;

/// File magic
pub const MAGIC: [u8; 4] = *b"VPIN";

/// Newest format version the reader understands
pub const LATEST_VERSION: i16 = 6;

/// Plane marker byte that introduces a frame mask instead of a bit-plane
pub const MASK_MARKER: u8 = 0x6d;

/// HeatShrink window size of compressed plane blocks
pub const COMPRESSION_WINDOW: u8 = 10;

/// HeatShrink lookahead size of compressed plane blocks
pub const COMPRESSION_LOOKAHEAD: u8 = 0;

/// Name reported for animations stored without one
pub const UNDEFINED_NAME: &str = "<undefined>";

/// Frame size assumed for files older than version 4, which carry no dimensions
pub const LEGACY_DIMENSIONS: Dimensions = Dimensions::new(128, 32);
