//! This module is separated into its own crate so the engine can be re-exported by the root
//! package, and should not be used directly.

/// `use dmdcolor::prelude::*;` to import commonly used items.
pub mod prelude;

// Re-export dmdcolor_types for convenience
pub use dmdcolor_types;

// Re-export the engine modules at crate root
pub use dmdcolor_types::{checksum, colorizer, file, frame, heatshrink, player};
