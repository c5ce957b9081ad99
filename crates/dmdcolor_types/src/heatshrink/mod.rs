//! HeatShrink streaming compression.
//!
//! ## Overview
//!
//! HeatShrink is a small LZSS variant designed for embedded targets. Its bitstream is a
//! sequence of tagged tokens, most significant bit first:
//!
//! | Tag | Payload | Meaning |
//! |-----|---------|---------|
//! | `1` | 8 bits | literal byte |
//! | `0` | `window` bits (distance - 1), then `lookahead` bits (length - 1) | back-reference |
//!
//! Two parameters shape a stream and must match on both ends:
//!
//! - **window** (`w`, 4-15): the sliding window holds the last `2^w` bytes
//! - **lookahead** (`l`, below `w`): a back-reference copies at most `2^l` bytes
//!
//! A back-reference token must not fit in the zero padding of the final byte, or the decoder
//! would read the padding as one. Pairs with `1 + w + l < 8` are rejected for that reason.
//!
//! A lookahead of 0 is allowed. It makes every back-reference a single byte, so the encoder
//! never finds one worth emitting and the stream degenerates to tagged literals. The VPIN
//! animation format uses exactly this configuration.
//!
//! ## Streaming protocol
//!
//! [`Encoder`] and [`Decoder`] share the same resumable interface, captured by
//! [`StreamCodec`]:
//!
//! 1. `sink(input)` copies as much input as fits into the internal buffer
//!    ([`SinkStatus::Accepted`] or [`SinkStatus::Full`]).
//! 2. `poll(output)` produces as much output as fits. [`PollStatus::More`] means the output
//!    slice filled up and there is more to fetch; [`PollStatus::Empty`] means the codec needs
//!    more input.
//! 3. `finish()` declares end of input. It returns [`FinishStatus::More`] until every byte has
//!    been polled out, then [`FinishStatus::Done`].
//!
//! Either side can suspend in the middle of a token when it runs out of input or output
//! space and picks up at the exact same bit on the next call.
//!
//! ## Examples
//!
//! ```
//! use dmdcolor_types::heatshrink;
//!
//! let data = b"abcabcabcabcabcabcabcabc";
//! let packed = heatshrink::compress(data, 8, 4).unwrap();
//! assert!(packed.len() < data.len());
//! assert_eq!(heatshrink::decompress(&packed, 8, 4).unwrap(), data);
//! ```

pub mod decoder;
pub mod encoder;


pub use decoder::Decoder;
pub use encoder::Encoder;

use crate::file::CodecError;

/// Smallest supported window size in bits
pub const MIN_WINDOW_BITS: u8 = 4;

/// Largest supported window size in bits
pub const MAX_WINDOW_BITS: u8 = 15;

/// Shortest back-reference token, tag bit included, that cannot hide in trailing padding
pub const MIN_BACKREF_TOKEN_BITS: usize = 8;

/// Size of the scratch buffer the one-shot helpers poll into
const POLL_CHUNK_SIZE: usize = 4096;

/// Outcome of a `sink` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkStatus {
	/// Bytes were accepted and the buffer still has room
	Accepted(usize),
	/// Bytes were accepted and the buffer is now full, poll before sinking more
	Full(usize),
}

impl SinkStatus {
	/// Number of input bytes consumed.
	pub const fn accepted(self) -> usize {
		match self {
			Self::Accepted(n) | Self::Full(n) => n,
		}
	}
}

/// Outcome of a `poll` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
	/// The output slice is full and more output is pending
	More(usize),
	/// No more output can be produced without more input
	Empty(usize),
}

impl PollStatus {
	/// Number of bytes written into the output slice.
	pub const fn written(self) -> usize {
		match self {
			Self::More(n) | Self::Empty(n) => n,
		}
	}
}

/// Outcome of a `finish` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishStatus {
	/// Output is still pending, keep polling
	More,
	/// Every byte has been produced
	Done,
}

/// Common streaming interface of [`Encoder`] and [`Decoder`].
pub trait StreamCodec {
	/// Feeds input bytes.
	fn sink(&mut self, input: &[u8]) -> Result<SinkStatus, CodecError>;

	/// Writes pending output into `output`.
	fn poll(&mut self, output: &mut [u8]) -> PollStatus;

	/// Declares the end of input.
	fn finish(&mut self) -> FinishStatus;
}

/// Checks a window/lookahead pair.
///
/// # Errors
///
/// Returns [`CodecError::InvalidParameters`] if:
/// - `window` is outside `MIN_WINDOW_BITS..=MAX_WINDOW_BITS`
/// - `lookahead` is not below `window`
/// - a back-reference token is shorter than [`MIN_BACKREF_TOKEN_BITS`]
pub fn validate_parameters(window: u8, lookahead: u8) -> Result<(), CodecError> {
	if !(MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&window)
		|| lookahead >= window
		|| 1 + usize::from(window) + usize::from(lookahead) < MIN_BACKREF_TOKEN_BITS
	{
		return Err(CodecError::InvalidParameters {
			window,
			lookahead,
		});
	}
	Ok(())
}

/// Output cursor shared by both state machines.
pub(crate) struct OutputCursor<'a> {
	buf: &'a mut [u8],
	written: usize,
}

impl<'a> OutputCursor<'a> {
	pub(crate) fn new(buf: &'a mut [u8]) -> Self {
		Self {
			buf,
			written: 0,
		}
	}

	#[inline]
	pub(crate) fn remaining(&self) -> usize {
		self.buf.len() - self.written
	}

	#[inline]
	pub(crate) fn has_room(&self) -> bool {
		self.written < self.buf.len()
	}

	#[inline]
	pub(crate) fn push(&mut self, byte: u8) {
		self.buf[self.written] = byte;
		self.written += 1;
	}

	pub(crate) fn written(&self) -> usize {
		self.written
	}
}

/// Polls until the codec reports [`PollStatus::Empty`], appending everything to `output`.
fn drain<C: StreamCodec>(codec: &mut C, scratch: &mut [u8], output: &mut Vec<u8>) {
	loop {
		let status = codec.poll(scratch);
		output.extend_from_slice(&scratch[..status.written()]);
		if let PollStatus::Empty(_) = status {
			break;
		}
	}
}

/// Pushes a whole buffer through a codec and collects the result.
pub fn run<C: StreamCodec>(codec: &mut C, input: &[u8]) -> Result<Vec<u8>, CodecError> {
	let mut output = Vec::with_capacity(input.len());
	let mut scratch = vec![0u8; POLL_CHUNK_SIZE];
	let mut rest = input;

	while !rest.is_empty() {
		let accepted = codec.sink(rest)?.accepted();
		rest = &rest[accepted..];
		drain(codec, &mut scratch, &mut output);
	}

	while codec.finish() == FinishStatus::More {
		drain(codec, &mut scratch, &mut output);
	}

	Ok(output)
}

/// Compresses a buffer in one call.
pub fn compress(data: &[u8], window: u8, lookahead: u8) -> Result<Vec<u8>, CodecError> {
	let mut encoder = Encoder::new(window, lookahead)?;
	run(&mut encoder, data)
}

/// Decompresses a buffer in one call.
///
/// The decoder input buffer is sized to the window, `2^window` bytes.
pub fn decompress(data: &[u8], window: u8, lookahead: u8) -> Result<Vec<u8>, CodecError> {
	let mut decoder = Decoder::new(window, lookahead, 1 << window)?;
	run(&mut decoder, data)
}

/// Decompresses a buffer that must expand to at least `expected` bytes.
///
/// Output beyond `expected` is cut off.
pub fn decompress_exact(
	data: &[u8],
	window: u8,
	lookahead: u8,
	expected: usize,
) -> Result<Vec<u8>, CodecError> {
	let mut output = decompress(data, window, lookahead)?;
	if output.len() < expected {
		return Err(CodecError::Truncated {
			expected,
			actual: output.len(),
		});
	}
	output.truncate(expected);
	Ok(output)
}
