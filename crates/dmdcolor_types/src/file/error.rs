//! Error types for bundle parsing and the compression codec.

use thiserror::Error;

/// Errors that can occur in the HeatShrink codec
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
	/// Window or lookahead size outside the supported range
	#[error(
		"Invalid codec parameters: window {window} bits, lookahead {lookahead} bits (window must be 4-15, lookahead below window, 1 + window + lookahead at least 8)"
	)]
	InvalidParameters {
		/// Window size in bits
		window: u8,
		/// Lookahead size in bits
		lookahead: u8,
	},

	/// API called in a state that does not allow it
	#[error("Codec misuse: {0}")]
	Misuse(&'static str),

	/// Decoded stream is shorter than the caller required
	#[error("Truncated stream: expected {expected} bytes, got {actual} bytes")]
	Truncated {
		/// Expected number of bytes
		expected: usize,
		/// Actual number of bytes
		actual: usize,
	},
}

/// Errors that can occur when parsing a coloring, animation or cROM bundle
#[derive(Debug, Error)]
pub enum FormatError {
	/// Not enough data to parse a mandatory field
	#[error("Insufficient data: expected {expected} bytes, got {actual} bytes")]
	InsufficientData {
		/// Expected number of bytes
		expected: usize,
		/// Actual number of bytes
		actual: usize,
	},

	/// Invalid magic header
	#[error("Invalid magic number: {0:02X?}")]
	InvalidMagic([u8; 4]),

	/// Bytes left over after a structurally complete parse
	#[error("Trailing data: {remaining} bytes left after the last section")]
	TrailingData {
		/// Number of unread bytes
		remaining: usize,
	},

	/// A field holds a value the format does not define
	#[error("Invalid value for {field}: {value}")]
	InvalidValue {
		/// Field name
		field: &'static str,
		/// Offending value
		value: i64,
	},

	/// Compressed block failed to decode
	#[error(transparent)]
	Codec(#[from] CodecError),

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}

impl FormatError {
	/// Returns `true` if the error is a premature end of stream.
	pub fn is_eof(&self) -> bool {
		match self {
			Self::InsufficientData { .. } => true,
			Self::IOError(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
			_ => false,
		}
	}
}
