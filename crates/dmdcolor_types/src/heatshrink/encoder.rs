//! HeatShrink encoder state machine.
//!
//! The internal buffer is twice the window size. The lower half keeps already encoded
//! bytes as back-reference history, the upper half receives new input. Once the upper half
//! has been scanned, it slides down and becomes history for the next batch.

use log::debug;

use super::{FinishStatus, OutputCursor, PollStatus, SinkStatus, StreamCodec, validate_parameters};
use crate::file::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	/// Input buffer still has room
	NotFull,
	/// Input buffer full or finishing, needs indexing
	Filled,
	/// Looking for the next match
	Search,
	/// Emitting the tag bit of the pending token
	YieldTagBit,
	/// Emitting a literal byte
	YieldLiteral,
	/// Emitting a back-reference distance
	YieldBrIndex,
	/// Emitting a back-reference length
	YieldBrLength,
	/// Sliding scanned input down into the history half
	SaveBacklog,
	/// Emitting the last partial byte
	FlushBits,
	/// Everything has been emitted
	Done,
}

/// Streaming HeatShrink encoder.
#[derive(Debug, Clone)]
pub struct Encoder {
	window: u8,
	lookahead: u8,
	/// Bytes held in the input half
	input_size: usize,
	/// Offset of the next unscanned byte, relative to the input half
	match_scan_index: usize,
	/// Length of the pending match, 0 for a literal
	match_length: usize,
	/// Distance of the pending match
	match_pos: usize,
	/// Bits left to emit from `outgoing_bits`
	outgoing_bits: u16,
	outgoing_bits_count: u8,
	finishing: bool,
	state: State,
	current_byte: u8,
	/// Mask of the next bit to write in `current_byte`
	bit_index: u8,
	/// For every buffer position, the previous position holding the same byte
	index: Vec<Option<usize>>,
	buffer: Vec<u8>,
}

impl Encoder {
	/// Creates an encoder.
	///
	/// # Arguments
	///
	/// * `window` - Window size in bits (4-15)
	/// * `lookahead` - Lookahead size in bits (below `window`, with `1 + window + lookahead >= 8`)
	pub fn new(window: u8, lookahead: u8) -> Result<Self, CodecError> {
		validate_parameters(window, lookahead)?;
		debug!("heatshrink encoder: window {window} bits, lookahead {lookahead} bits");

		let buffer_size = 2usize << window;
		Ok(Self {
			window,
			lookahead,
			input_size: 0,
			match_scan_index: 0,
			match_length: 0,
			match_pos: 0,
			outgoing_bits: 0,
			outgoing_bits_count: 0,
			finishing: false,
			state: State::NotFull,
			current_byte: 0,
			bit_index: 0x80,
			index: vec![None; buffer_size],
			buffer: vec![0; buffer_size],
		})
	}

	/// Returns the encoder to its initial state, clearing all history.
	pub fn reset(&mut self) {
		self.buffer.fill(0);
		self.index.fill(None);
		self.input_size = 0;
		self.state = State::NotFull;
		self.match_scan_index = 0;
		self.match_length = 0;
		self.match_pos = 0;
		self.outgoing_bits = 0;
		self.outgoing_bits_count = 0;
		self.finishing = false;
		self.current_byte = 0;
		self.bit_index = 0x80;
	}

	#[inline]
	fn input_buffer_size(&self) -> usize {
		1 << self.window
	}

	#[inline]
	fn lookahead_size(&self) -> usize {
		1 << self.lookahead
	}

	/// Copies as much of `input` as fits into the input half.
	///
	/// Fails once `finish` has been called or while buffered input still awaits polling.
	pub fn sink(&mut self, input: &[u8]) -> Result<SinkStatus, CodecError> {
		if self.finishing {
			return Err(CodecError::Misuse("sink called after finish"));
		}
		if self.state != State::NotFull {
			return Err(CodecError::Misuse("sink called before the pending input was polled"));
		}

		let write_offset = self.input_buffer_size() + self.input_size;
		let remaining = self.input_buffer_size() - self.input_size;
		let copy = remaining.min(input.len());
		self.buffer[write_offset..write_offset + copy].copy_from_slice(&input[..copy]);
		self.input_size += copy;

		if copy == remaining {
			self.state = State::Filled;
			Ok(SinkStatus::Full(copy))
		} else {
			Ok(SinkStatus::Accepted(copy))
		}
	}

	/// Encodes buffered input into `output`.
	pub fn poll(&mut self, output: &mut [u8]) -> PollStatus {
		let mut out = OutputCursor::new(output);

		loop {
			let in_state = self.state;
			self.state = match in_state {
				State::NotFull | State::Done => return PollStatus::Empty(out.written()),
				State::Filled => {
					self.do_indexing();
					State::Search
				}
				State::Search => self.step_search(),
				State::YieldTagBit => self.yield_tag_bit(&mut out),
				State::YieldLiteral => self.yield_literal(&mut out),
				State::YieldBrIndex => self.yield_br_index(&mut out),
				State::YieldBrLength => self.yield_br_length(&mut out),
				State::SaveBacklog => self.save_backlog(),
				State::FlushBits => self.flush_bit_buffer(&mut out),
			};

			// No progress means the output filled up mid-token
			if self.state == in_state && !out.has_room() {
				return PollStatus::More(out.written());
			}
		}
	}

	/// Declares the end of input.
	///
	/// Returns [`FinishStatus::Done`] once the final partial byte has been polled out.
	pub fn finish(&mut self) -> FinishStatus {
		self.finishing = true;
		if self.state == State::NotFull {
			self.state = State::Filled;
		}
		if self.state == State::Done {
			FinishStatus::Done
		} else {
			FinishStatus::More
		}
	}

	/// Chains every buffered position to the previous position holding the same byte.
	fn do_indexing(&mut self) {
		let mut last: [Option<usize>; 256] = [None; 256];
		let end = self.input_buffer_size() + self.input_size;
		for i in 0..end {
			let byte = usize::from(self.buffer[i]);
			self.index[i] = last[byte];
			last[byte] = Some(i);
		}
	}

	fn step_search(&mut self) -> State {
		let window_length = self.input_buffer_size();
		let lookahead_size = self.lookahead_size();
		let msi = self.match_scan_index;
		let reserve = if self.finishing { 1 } else { lookahead_size };

		if msi + reserve > self.input_size {
			return if self.finishing {
				State::FlushBits
			} else {
				State::SaveBacklog
			};
		}

		let end = window_length + msi;
		let start = end - window_length;
		let max_possible = lookahead_size.min(self.input_size - msi);

		// A match must save more bits than the token costs
		let break_even = (1 + usize::from(self.window) + usize::from(self.lookahead)) / 8;
		match self.find_longest_match(start, end, max_possible) {
			Some((pos, len)) if len > break_even => {
				self.match_pos = pos;
				self.match_length = len;
			}
			_ => {
				self.match_scan_index += 1;
				self.match_length = 0;
			}
		}
		State::YieldTagBit
	}

	/// Returns `(distance, length)` of the longest earlier match for the bytes at `end`.
	fn find_longest_match(&self, start: usize, end: usize, maxlen: usize) -> Option<(usize, usize)> {
		let buf = &self.buffer;
		let mut match_maxlen = 0;
		let mut match_index = None;
		let mut pos = self.index[end];

		while let Some(candidate) = pos {
			if candidate < start {
				break;
			}
			if buf[candidate + match_maxlen] != buf[end + match_maxlen] {
				pos = self.index[candidate];
				continue;
			}

			let mut len = 1;
			while len < maxlen && buf[candidate + len] == buf[end + len] {
				len += 1;
			}
			if len > match_maxlen {
				match_maxlen = len;
				match_index = Some(candidate);
				if len == maxlen {
					break;
				}
			}
			pos = self.index[candidate];
		}

		match_index.map(|index| (end - index, match_maxlen))
	}

	fn yield_tag_bit(&mut self, out: &mut OutputCursor<'_>) -> State {
		if !out.has_room() {
			return State::YieldTagBit;
		}
		if self.match_length == 0 {
			self.push_bits(1, 1, out);
			State::YieldLiteral
		} else {
			self.push_bits(1, 0, out);
			self.outgoing_bits = (self.match_pos - 1) as u16;
			self.outgoing_bits_count = self.window;
			State::YieldBrIndex
		}
	}

	fn yield_literal(&mut self, out: &mut OutputCursor<'_>) -> State {
		if !out.has_room() {
			return State::YieldLiteral;
		}
		let byte = self.buffer[self.input_buffer_size() + self.match_scan_index - 1];
		self.push_bits(8, byte, out);
		State::Search
	}

	fn yield_br_index(&mut self, out: &mut OutputCursor<'_>) -> State {
		if !out.has_room() {
			return State::YieldBrIndex;
		}
		if self.push_outgoing_bits(out) > 0 {
			return State::YieldBrIndex;
		}
		self.outgoing_bits = (self.match_length - 1) as u16;
		self.outgoing_bits_count = self.lookahead;
		State::YieldBrLength
	}

	fn yield_br_length(&mut self, out: &mut OutputCursor<'_>) -> State {
		if !out.has_room() {
			return State::YieldBrLength;
		}
		if self.push_outgoing_bits(out) > 0 {
			return State::YieldBrLength;
		}
		self.match_scan_index += self.match_length;
		self.match_length = 0;
		State::Search
	}

	fn save_backlog(&mut self) -> State {
		let msi = self.match_scan_index;
		let rem = 2 * self.input_buffer_size() - msi;
		self.buffer.copy_within(msi..msi + rem, 0);
		self.match_scan_index = 0;
		self.input_size -= msi;
		State::NotFull
	}

	fn flush_bit_buffer(&mut self, out: &mut OutputCursor<'_>) -> State {
		if self.bit_index == 0x80 {
			return State::Done;
		}
		if out.has_room() {
			out.push(self.current_byte);
			return State::Done;
		}
		State::FlushBits
	}

	/// Emits up to 8 pending bits of `outgoing_bits`, returns how many were pushed.
	fn push_outgoing_bits(&mut self, out: &mut OutputCursor<'_>) -> u8 {
		let (count, bits) = if self.outgoing_bits_count > 8 {
			let count = 8;
			let bits = (self.outgoing_bits >> (self.outgoing_bits_count - 8)) as u8;
			(count, bits)
		} else {
			(self.outgoing_bits_count, self.outgoing_bits as u8)
		};

		if count > 0 {
			self.push_bits(count, bits, out);
			self.outgoing_bits_count -= count;
		}
		count
	}

	/// Pushes the low `count` bits of `bits`, MSB first.
	fn push_bits(&mut self, count: u8, bits: u8, out: &mut OutputCursor<'_>) {
		if count == 8 && self.bit_index == 0x80 {
			out.push(bits);
			return;
		}

		for i in (0..count).rev() {
			if bits & (1 << i) != 0 {
				self.current_byte |= self.bit_index;
			}
			self.bit_index >>= 1;
			if self.bit_index == 0 {
				self.bit_index = 0x80;
				out.push(self.current_byte);
				self.current_byte = 0;
			}
		}
	}
}

impl StreamCodec for Encoder {
	fn sink(&mut self, input: &[u8]) -> Result<SinkStatus, CodecError> {
		Encoder::sink(self, input)
	}

	fn poll(&mut self, output: &mut [u8]) -> PollStatus {
		Encoder::poll(self, output)
	}

	fn finish(&mut self) -> FinishStatus {
		Encoder::finish(self)
	}
}
