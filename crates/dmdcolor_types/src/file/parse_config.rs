//! Parse configuration shared by the bundle readers.

/// Mask sizes the coloring bundle reader accepts by default: 128x16, 128x32 and 192x64
/// single-bit planes.
pub const DEFAULT_MASK_SIZES: [usize; 3] = [256, 512, 1536];

/// Configuration for parsing coloring and animation bundles.
///
/// # Presets
///
/// - `default()`: trailing bytes are fatal, masks must have one of the standard sizes
/// - `lenient()`: trailing bytes are logged and ignored, any mask size is accepted
///
/// # Examples
///
/// ```
/// use dmdcolor_types::file::ParseConfig;
///
/// let config = ParseConfig::default();
/// assert!(config.strict_trailing_bytes);
///
/// let config = ParseConfig::lenient();
/// assert!(config.accepts_mask_size(77));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConfig {
	/// Whether bytes after the last section are a fatal error
	pub strict_trailing_bytes: bool,
	/// Accepted mask sizes in bytes, `None` accepts every size
	pub accept_mask_sizes: Option<Vec<usize>>,
}

impl Default for ParseConfig {
	fn default() -> Self {
		Self {
			strict_trailing_bytes: true,
			accept_mask_sizes: Some(DEFAULT_MASK_SIZES.to_vec()),
		}
	}
}

impl ParseConfig {
	/// Create a new parse configuration.
	///
	/// # Arguments
	/// * `strict_trailing_bytes` - Fail on unread bytes
	/// * `accept_mask_sizes` - Allowed mask sizes, `None` for any
	pub fn new(strict_trailing_bytes: bool, accept_mask_sizes: Option<Vec<usize>>) -> Self {
		Self {
			strict_trailing_bytes,
			accept_mask_sizes,
		}
	}

	/// Create a lenient configuration for hand-edited or damaged files.
	pub fn lenient() -> Self {
		Self {
			strict_trailing_bytes: false,
			accept_mask_sizes: None,
		}
	}

	/// Returns `true` if masks of `size` bytes are accepted.
	pub fn accepts_mask_size(&self, size: usize) -> bool {
		match &self.accept_mask_sizes {
			Some(sizes) => sizes.contains(&size),
			None => size > 0,
		}
	}
}
