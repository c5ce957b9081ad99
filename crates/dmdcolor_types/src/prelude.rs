//! Prelude module for `dmdcolor_types`.
//!
//! This module provides a convenient way to import commonly used types, traits, and constants.
//!
//! # Examples
//!
//! ```
//! use dmdcolor_types::prelude::*;
//!
//! // Now you can use all common types directly
//! let dim = Dimensions::new(128, 32);
//! let coloring = PalFile::new(1);
//! let store = CromFile::new("blank", dim, 64);
//! assert!(store.is_empty());
//! ```

// File module types
#[doc(inline)]
pub use crate::file::{
	// Animation types
	Animation,
	AnimationFrame,

	// Errors
	CodecError,

	// cROM types
	CromFile,
	CromFrame,
	CromHeader,
	FormatError,

	// Coloring types
	Mapping,
	PalFile,
	Palette,

	// Parsing
	ParseConfig,
	SwitchMode,

	VniFile,
};

// Frame types
#[doc(inline)]
pub use crate::frame::{Color, ColoredFrame, Dimensions, DmdFrame, ScalerMode};

// Engine
#[doc(inline)]
pub use crate::colorizer::{ColorizeOutcome, ColorizerConfig, VniColorizer};

#[doc(inline)]
pub use crate::player::{AnimationPlayer, RenderSink};

#[doc(inline)]
pub use crate::heatshrink::{StreamCodec, compress, decompress};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
