//! This crate provides the colorization engine and file format support for the `dmdcolor-rs`
//! project.
//!
//! # Components
//!
//! - **Checksums**: table-driven CRC32 with masked and shape variants, see [`checksum`]
//! - **HeatShrink**: the resumable LZSS codec used inside VPIN bundles, see [`heatshrink`]
//! - **Frames**: the tagged [`frame::DmdFrame`] input, bit-planes, palettes and 2x scalers
//! - **File formats**: coloring bundles (`.pal`), VPIN animation bundles (`.vni`) and cROM
//!   frame stores, see [`file`]
//! - **Playback**: [`player::AnimationPlayer`] runs one animation against the live frames
//! - **Colorizer**: [`colorizer::VniColorizer`] ties palettes, mappings and animations
//!   together per incoming frame
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```no_run
//! use dmdcolor_types::prelude::*;
//!
//! let coloring = PalFile::open("afm_113b.pal").unwrap();
//! let animations = VniFile::open("afm_113b.vni").ok();
//! let mut colorizer = VniColorizer::new(coloring, animations);
//!
//! let dim = Dimensions::new(128, 32);
//! let frame = DmdFrame::gray(dim, 2, vec![0; dim.surface()]).unwrap();
//! if let ColorizeOutcome::Colored(colored) = colorizer.colorize(&frame, 16) {
//! 	println!("{} planes, {} colors", colored.bit_length(), colored.palette.len());
//! }
//! ```
//!
//! Or use explicit paths:
//!
//! ```no_run
//! use dmdcolor_types::file::CromFile;
//!
//! let mut store = CromFile::open("afm_113b.cRom").unwrap();
//! println!("{}", store.header());
//! ```

pub mod checksum;
pub mod colorizer;
pub mod file;
pub mod frame;
pub mod heatshrink;
pub mod player;

/// `use dmdcolor_types::prelude::*;` to import commonly used items.
pub mod prelude;
