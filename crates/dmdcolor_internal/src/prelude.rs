//! Prelude module for `dmdcolor_internal`.
//!
//! This module provides a convenient way to import commonly used types and traits.
//!
//! # Examples
//!
//! ```rust
//! use dmdcolor_internal::prelude::*;
//!
//! // Now you can use all common types directly
//! let packed = compress(b"aaaaaaaaaaaaaaaa", 8, 4).unwrap();
//! assert_eq!(decompress(&packed, 8, 4).unwrap(), b"aaaaaaaaaaaaaaaa");
//!
//! let frame = DmdFrame::gray(Dimensions::new(8, 1), 2, vec![0, 1, 2, 3, 0, 1, 2, 3]).unwrap();
//! assert_eq!(frame.to_planes().unwrap().len(), 2);
//! ```

// Re-export everything from dmdcolor_types::prelude
#[doc(inline)]
pub use dmdcolor_types::prelude::*;

// Re-export the entire dmdcolor_types module for advanced usage
#[doc(inline)]
pub use dmdcolor_types;
