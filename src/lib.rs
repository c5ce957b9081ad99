#![allow(clippy::single_component_path_imports)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `dmdcolor-rs` colorizes the frames of pinball dot-matrix displays.
//!
//! Gray frames are matched by checksum against coloring bundles, VPIN animation bundles and
//! cROM frame stores, and come out as indexed bit-planes with a palette.
//!
pub use dmdcolor_internal::*;
