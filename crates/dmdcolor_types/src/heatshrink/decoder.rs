//! HeatShrink decoder state machine.

use log::debug;

use super::{FinishStatus, OutputCursor, PollStatus, SinkStatus, StreamCodec, validate_parameters};
use crate::file::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	/// Waiting for the tag bit
	TagBit,
	/// Ready to yield a literal byte
	YieldLiteral,
	/// High bits of a back-reference distance
	BackrefIndexMsb,
	/// Low bits of a back-reference distance
	BackrefIndexLsb,
	/// High bits of a back-reference length
	BackrefCountMsb,
	/// Low bits of a back-reference length
	BackrefCountLsb,
	/// Copying a back-reference out of the window
	YieldBackref,
}

/// Streaming HeatShrink decoder.
///
/// Layout of the internal buffer: `input_buffer_size` bytes of pending input followed by the
/// `2^window` byte expansion window.
#[derive(Debug, Clone)]
pub struct Decoder {
	window: u8,
	lookahead: u8,
	input_buffer_size: usize,
	/// Bytes currently held in the input buffer
	input_size: usize,
	/// Offset of the next unread input byte
	input_index: usize,
	/// Remaining bytes of the current back-reference
	output_count: usize,
	/// Distance of the current back-reference
	output_index: usize,
	/// Write head of the window, wraps through the mask
	head_index: usize,
	state: State,
	current_byte: u8,
	/// Mask of the next bit to read from `current_byte`, 0 when a new byte is needed
	bit_index: u8,
	buffer: Vec<u8>,
}

impl Decoder {
	/// Creates a decoder.
	///
	/// # Arguments
	///
	/// * `window` - Window size in bits (4-15)
	/// * `lookahead` - Lookahead size in bits (below `window`, with `1 + window + lookahead >= 8`)
	/// * `input_buffer_size` - How many input bytes one `sink` call can buffer
	pub fn new(window: u8, lookahead: u8, input_buffer_size: usize) -> Result<Self, CodecError> {
		validate_parameters(window, lookahead)?;
		if input_buffer_size == 0 {
			return Err(CodecError::Misuse("decoder input buffer must not be empty"));
		}
		debug!(
			"heatshrink decoder: window {window} bits, lookahead {lookahead} bits, input buffer {input_buffer_size} bytes"
		);

		Ok(Self {
			window,
			lookahead,
			input_buffer_size,
			input_size: 0,
			input_index: 0,
			output_count: 0,
			output_index: 0,
			head_index: 0,
			state: State::TagBit,
			current_byte: 0,
			bit_index: 0,
			buffer: vec![0; input_buffer_size + (1 << window)],
		})
	}

	/// Returns the decoder to its initial state, clearing the window.
	pub fn reset(&mut self) {
		self.buffer.fill(0);
		self.state = State::TagBit;
		self.input_size = 0;
		self.input_index = 0;
		self.bit_index = 0;
		self.current_byte = 0;
		self.output_count = 0;
		self.output_index = 0;
		self.head_index = 0;
	}

	/// Copies as much of `input` as fits into the input buffer.
	pub fn sink(&mut self, input: &[u8]) -> SinkStatus {
		let room = self.input_buffer_size - self.input_size;
		if room == 0 {
			return SinkStatus::Full(0);
		}

		let size = room.min(input.len());
		self.buffer[self.input_size..self.input_size + size].copy_from_slice(&input[..size]);
		self.input_size += size;

		if size == room {
			SinkStatus::Full(size)
		} else {
			SinkStatus::Accepted(size)
		}
	}

	/// Decodes into `output` until it is full or the input runs dry.
	pub fn poll(&mut self, output: &mut [u8]) -> PollStatus {
		let mut out = OutputCursor::new(output);

		loop {
			let in_state = self.state;
			self.state = match in_state {
				State::TagBit => self.tag_bit(),
				State::YieldLiteral => self.yield_literal(&mut out),
				State::BackrefIndexMsb => self.backref_index_msb(),
				State::BackrefIndexLsb => self.backref_index_lsb(),
				State::BackrefCountMsb => self.backref_count_msb(),
				State::BackrefCountLsb => self.backref_count_lsb(),
				State::YieldBackref => self.yield_backref(&mut out),
			};

			// No progress: either the input or the output is exhausted
			if self.state == in_state {
				return if out.has_room() {
					PollStatus::Empty(out.written())
				} else {
					PollStatus::More(out.written())
				};
			}
		}
	}

	/// Reports whether all buffered input has been decoded.
	///
	/// Trailing zero padding in the last byte looks like the start of a back-reference, so the
	/// mid-token states also count as finished once the input buffer is empty.
	pub fn finish(&self) -> FinishStatus {
		match self.state {
			State::TagBit
			| State::BackrefIndexMsb
			| State::BackrefIndexLsb
			| State::BackrefCountMsb
			| State::BackrefCountLsb
			| State::YieldLiteral => {
				if self.input_size == 0 {
					FinishStatus::Done
				} else {
					FinishStatus::More
				}
			}
			State::YieldBackref => FinishStatus::More,
		}
	}

	/// Reads the next `count` bits, MSB first.
	///
	/// Returns `None` without consuming anything when fewer than `count` bits are buffered,
	/// since partial progress is not tracked across suspensions.
	fn get_bits(&mut self, count: u8) -> Option<u16> {
		if count > 15 {
			return None;
		}
		if count == 0 {
			return Some(0);
		}
		if self.input_size == 0 && u16::from(self.bit_index) < (1u16 << (count - 1)) {
			return None;
		}

		let mut accumulator = 0u16;
		for _ in 0..count {
			if self.bit_index == 0 {
				if self.input_size == 0 {
					return None;
				}
				self.current_byte = self.buffer[self.input_index];
				self.input_index += 1;
				if self.input_index == self.input_size {
					self.input_index = 0;
					self.input_size = 0;
				}
				self.bit_index = 0x80;
			}
			accumulator <<= 1;
			if self.current_byte & self.bit_index != 0 {
				accumulator |= 1;
			}
			self.bit_index >>= 1;
		}
		Some(accumulator)
	}

	fn tag_bit(&mut self) -> State {
		match self.get_bits(1) {
			None => State::TagBit,
			Some(0) if self.window > 8 => State::BackrefIndexMsb,
			Some(0) => {
				self.output_index = 0;
				State::BackrefIndexLsb
			}
			Some(_) => State::YieldLiteral,
		}
	}

	fn yield_literal(&mut self, out: &mut OutputCursor<'_>) -> State {
		if !out.has_room() {
			return State::YieldLiteral;
		}
		let Some(bits) = self.get_bits(8) else {
			return State::YieldLiteral;
		};

		let mask = (1usize << self.window) - 1;
		let byte = bits as u8;
		self.buffer[self.input_buffer_size + (self.head_index & mask)] = byte;
		self.head_index = self.head_index.wrapping_add(1);
		out.push(byte);
		State::TagBit
	}

	fn backref_index_msb(&mut self) -> State {
		match self.get_bits(self.window - 8) {
			None => State::BackrefIndexMsb,
			Some(bits) => {
				self.output_index = usize::from(bits) << 8;
				State::BackrefIndexLsb
			}
		}
	}

	fn backref_index_lsb(&mut self) -> State {
		let Some(bits) = self.get_bits(self.window.min(8)) else {
			return State::BackrefIndexLsb;
		};
		self.output_index |= usize::from(bits);
		self.output_index += 1;
		self.output_count = 0;
		if self.lookahead > 8 {
			State::BackrefCountMsb
		} else {
			State::BackrefCountLsb
		}
	}

	fn backref_count_msb(&mut self) -> State {
		match self.get_bits(self.lookahead - 8) {
			None => State::BackrefCountMsb,
			Some(bits) => {
				self.output_count = usize::from(bits) << 8;
				State::BackrefCountLsb
			}
		}
	}

	fn backref_count_lsb(&mut self) -> State {
		let Some(bits) = self.get_bits(self.lookahead.min(8)) else {
			return State::BackrefCountLsb;
		};
		self.output_count |= usize::from(bits);
		self.output_count += 1;
		State::YieldBackref
	}

	fn yield_backref(&mut self, out: &mut OutputCursor<'_>) -> State {
		let count = out.remaining().min(self.output_count);
		if count == 0 {
			return State::YieldBackref;
		}

		let mask = (1usize << self.window) - 1;
		let base = self.input_buffer_size;
		for _ in 0..count {
			let byte = self.buffer[base + (self.head_index.wrapping_sub(self.output_index) & mask)];
			out.push(byte);
			self.buffer[base + (self.head_index & mask)] = byte;
			self.head_index = self.head_index.wrapping_add(1);
		}

		self.output_count -= count;
		if self.output_count == 0 {
			State::TagBit
		} else {
			State::YieldBackref
		}
	}
}

impl StreamCodec for Decoder {
	fn sink(&mut self, input: &[u8]) -> Result<SinkStatus, CodecError> {
		Ok(Decoder::sink(self, input))
	}

	fn poll(&mut self, output: &mut [u8]) -> PollStatus {
		Decoder::poll(self, output)
	}

	fn finish(&mut self) -> FinishStatus {
		Decoder::finish(self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_rejects_bad_parameters() {
		assert!(Decoder::new(3, 2, 64).is_err());
		assert!(Decoder::new(16, 4, 64).is_err());
		assert!(Decoder::new(8, 8, 64).is_err());
		assert!(Decoder::new(8, 4, 0).is_err());
		assert!(Decoder::new(4, 0, 64).is_err());
		assert!(Decoder::new(10, 0, 1024).is_ok());
	}

	#[test]
	fn test_decodes_literals() {
		// tag 1 + 'A' (0x41), tag 1 + 'B' (0x42), padded with zeros
		// 1 0100_0001 1 0100_0010 000000
		let stream = [0b1010_0000, 0b1101_0000, 0b1000_0000];
		let mut decoder = Decoder::new(8, 4, 16).unwrap();
		assert_eq!(decoder.sink(&stream), SinkStatus::Accepted(3));

		let mut out = [0u8; 8];
		let status = decoder.poll(&mut out);
		assert_eq!(status, PollStatus::Empty(2));
		assert_eq!(&out[..2], b"AB");
		assert_eq!(decoder.finish(), FinishStatus::Done);
	}

	#[test]
	fn test_decodes_backref() {
		// literal 'x', then backref distance 1 (index bits 0), length 3 (count bits 2)
		// 1 0111_1000 | 0 0000_0000 0010 | padding
		let stream = [0b1011_1100, 0b0000_0000, 0b0000_1000];
		let mut decoder = Decoder::new(8, 4, 16).unwrap();
		decoder.sink(&stream);

		let mut out = [0u8; 8];
		let status = decoder.poll(&mut out);
		assert_eq!(&out[..status.written()], b"xxxx");
		assert_eq!(decoder.finish(), FinishStatus::Done);
	}

	#[test]
	fn test_small_output_buffer_suspends_and_resumes() {
		let stream = [0b1011_1100, 0b0000_0000, 0b0000_1000];
		let mut decoder = Decoder::new(8, 4, 16).unwrap();
		decoder.sink(&stream);

		let mut collected = Vec::new();
		let mut out = [0u8; 1];
		loop {
			let status = decoder.poll(&mut out);
			collected.extend_from_slice(&out[..status.written()]);
			if let PollStatus::Empty(_) = status {
				break;
			}
		}
		assert_eq!(collected, b"xxxx");
	}

	#[test]
	fn test_full_input_buffer() {
		let mut decoder = Decoder::new(8, 4, 2).unwrap();
		assert_eq!(decoder.sink(&[1, 2, 3]), SinkStatus::Full(2));
		assert_eq!(decoder.sink(&[3]), SinkStatus::Full(0));
		assert_eq!(decoder.finish(), FinishStatus::More);
	}

	#[test]
	fn test_reset_clears_state() {
		let mut decoder = Decoder::new(8, 4, 16).unwrap();
		decoder.sink(&[0b1010_0000]);
		decoder.reset();
		assert_eq!(decoder.finish(), FinishStatus::Done);
		let mut out = [0u8; 4];
		assert_eq!(decoder.poll(&mut out), PollStatus::Empty(0));
	}
}
