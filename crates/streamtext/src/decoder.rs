//! The stateful-decoder seam and its `encoding_rs` implementation.
//!
//! The reader never talks to an encoding directly: it offers the live byte
//! window and the unused char tail to a [`Decode`] implementation and moves
//! both windows by whatever the decoder reports. Carry-over state (a partial
//! multi-byte sequence at a fill boundary, or decoded characters that did not
//! fit the destination) belongs to the decoder, not the reader.

use std::collections::VecDeque;

use encoding_rs::{CoderResult, Decoder, DecoderResult, Encoding};

use crate::buffer::Buffer;
use crate::error::BufferError;
use crate::options::MalformedHandling;

/// What a single [`Decode::decode`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStep {
    /// Bytes consumed from the front of the input. A trailing partial
    /// sequence is held in decoder state, so this may be less than the input
    /// length even when the status is [`DecodeStatus::InputExhausted`].
    pub bytes_consumed: usize,
    /// Characters written to the front of the output.
    pub chars_produced: usize,
    /// Why the call stopped.
    pub status: DecodeStatus,
}

/// Why a decode call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// Every input byte was consumed (possibly into carry state).
    InputExhausted,
    /// The output ran out of room before the input was consumed, or decoded
    /// characters are still pending inside the decoder.
    OutputFull,
    /// The input contains a sequence the encoding rejects. Bytes up to and
    /// including the sequence are consumed; decoding may continue past it.
    Malformed {
        /// Length of the rejected sequence in bytes.
        length: usize,
    },
}

/// A stateful character decoder.
///
/// Implementations must accept input and output ranges that do not start at
/// the front of their backing arrays (both are windows), must hold any
/// partial multi-byte sequence across calls, and must flush it when `last`
/// is true. After a call with `last = true` has reported
/// [`DecodeStatus::InputExhausted`], the decoder is finished and further
/// calls must report an exhausted input without producing anything.
pub trait Decode {
    /// Decodes from `src` into `dst`, returning what moved.
    fn decode(&mut self, src: &[u8], dst: &mut [char], last: bool) -> DecodeStep;
}

/// Runs one decode pass between two staging buffers: the byte window is
/// offered as input, the char tail as output, and afterwards the byte window
/// shrinks from the front by the bytes consumed while the char window grows
/// at the back by the characters produced.
///
/// # Errors
///
/// Fails with [`BufferError::NoTailCapacity`] if the char buffer has no tail
/// capacity; callers must compact or resize it first.
pub fn decode_step(
    decoder: &mut dyn Decode,
    bytes: &mut Buffer<u8>,
    chars: &mut Buffer<char>,
    last: bool,
) -> Result<DecodeStep, BufferError> {
    let step = {
        let dst = chars.tail_mut()?;
        decoder.decode(bytes.window(), dst, last)
    };
    bytes.set_start_offset(bytes.start_offset() + step.bytes_consumed)?;
    chars.set_count(chars.count() + step.chars_produced)?;
    Ok(step)
}

/// [`Decode`] implementation backed by an [`encoding_rs::Decoder`].
///
/// Decoded characters that do not fit the destination window are queued and
/// served first on the next call, so no output is ever lost to a small
/// destination.
pub struct EncodingDecoder {
    inner: Decoder,
    pending: VecDeque<char>,
    /// A malformed report held back until `pending` drains, so characters
    /// decoded before the offending sequence are always delivered first.
    held_malformed: Option<usize>,
    scratch: String,
    malformed: MalformedHandling,
    ended: bool,
}

impl EncodingDecoder {
    /// Creates a decoder for `encoding`. Preamble handling is left to the
    /// caller; the inner decoder never strips a byte-order mark itself.
    #[must_use]
    pub fn new(encoding: &'static Encoding, malformed: MalformedHandling) -> Self {
        Self {
            inner: encoding.new_decoder_without_bom_handling(),
            pending: VecDeque::new(),
            held_malformed: None,
            scratch: String::new(),
            malformed,
            ended: false,
        }
    }
}

impl Decode for EncodingDecoder {
    fn decode(&mut self, src: &[u8], dst: &mut [char], last: bool) -> DecodeStep {
        let mut produced = 0;
        while produced < dst.len() {
            match self.pending.pop_front() {
                Some(c) => {
                    dst[produced] = c;
                    produced += 1;
                }
                None => break,
            }
        }
        if !self.pending.is_empty() {
            return DecodeStep {
                bytes_consumed: 0,
                chars_produced: produced,
                status: DecodeStatus::OutputFull,
            };
        }
        if let Some(length) = self.held_malformed.take() {
            return DecodeStep {
                bytes_consumed: 0,
                chars_produced: produced,
                status: DecodeStatus::Malformed { length },
            };
        }
        if self.ended {
            return DecodeStep {
                bytes_consumed: 0,
                chars_produced: produced,
                status: DecodeStatus::InputExhausted,
            };
        }
        if produced == dst.len() {
            let status = if src.is_empty() && !last {
                DecodeStatus::InputExhausted
            } else {
                DecodeStatus::OutputFull
            };
            return DecodeStep {
                bytes_consumed: 0,
                chars_produced: produced,
                status,
            };
        }

        // At least 4 bytes of scratch so one character of any width fits.
        let room = dst.len() - produced;
        self.scratch.clear();
        self.scratch.reserve((room * 4).max(4));

        let (bytes_consumed, mut status) = match self.malformed {
            MalformedHandling::Fail => {
                let (result, read) =
                    self.inner
                        .decode_to_string_without_replacement(src, &mut self.scratch, last);
                let status = match result {
                    DecoderResult::InputEmpty => DecodeStatus::InputExhausted,
                    DecoderResult::OutputFull => DecodeStatus::OutputFull,
                    DecoderResult::Malformed(length, _) => DecodeStatus::Malformed {
                        length: length as usize,
                    },
                };
                (read, status)
            }
            MalformedHandling::Replace => {
                let (result, read, _) = self.inner.decode_to_string(src, &mut self.scratch, last);
                let status = match result {
                    CoderResult::InputEmpty => DecodeStatus::InputExhausted,
                    CoderResult::OutputFull => DecodeStatus::OutputFull,
                };
                (read, status)
            }
        };
        if last && status == DecodeStatus::InputExhausted {
            self.ended = true;
        }
        for c in self.scratch.chars() {
            if produced < dst.len() {
                dst[produced] = c;
                produced += 1;
            } else {
                self.pending.push_back(c);
            }
        }
        if !self.pending.is_empty() {
            if let DecodeStatus::Malformed { length } = status {
                self.held_malformed = Some(length);
            }
            status = DecodeStatus::OutputFull;
        }
        DecodeStep {
            bytes_consumed,
            chars_produced: produced,
            status,
        }
    }
}
