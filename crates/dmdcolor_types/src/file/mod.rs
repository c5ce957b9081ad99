//! Bundle formats read by the colorization engine.
//!
//! | Module | Extension | Byte order | Contents |
//! |--------|-----------|------------|----------|
//! | [`pal`] | `.pal` | big-endian | palettes, checksum mappings, masks |
//! | [`vni`] | `.vni` | big-endian | VPIN animation bundle |
//! | [`crom`] | `.cRom` | little-endian | content-addressed colorized frames |

mod error;
mod parse_config;

pub mod crom;
pub mod pal;
pub mod vni;

// Re-export unified error types
pub use error::{CodecError, FormatError};
pub use parse_config::{DEFAULT_MASK_SIZES, ParseConfig};

// Re-export main file types
pub use crom::{CromFrame, File as CromFile, Header as CromHeader};
pub use pal::{File as PalFile, Mapping, Palette, SwitchMode};
pub use vni::{Animation, AnimationFrame, File as VniFile};
