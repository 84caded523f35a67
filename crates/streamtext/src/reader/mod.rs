//! The encoding-aware text reader: fill/decode orchestration over two
//! staging buffers.
//!
//! Data flows source → byte buffer → decoder → char buffer → caller, and
//! control is entirely pull-based: every public read either serves buffered
//! characters or performs blocking source reads until some are available.
//! The byte window always holds bytes read but not yet consumed by the
//! decoder or the preamble check; the char window always holds characters
//! decoded but not yet returned.

use std::io::Read;

use encoding_rs::{Encoding, UTF_8};

use crate::buffer::Buffer;
use crate::decoder::{Decode, DecodeStatus, EncodingDecoder, decode_step};
use crate::error::{Error, Result};
use crate::options::ReaderOptions;
use crate::preamble::{self, PreambleScan, Signature};

/// A buffered reader that decodes characters from a byte source in a
/// particular encoding, tracking absolute byte and character positions and
/// stripping a leading preamble (byte-order mark) when one is present.
///
/// The source is any [`Read`]; partial reads are normal and a read of 0
/// bytes means end of stream. End of stream is reported as `Ok(None)`, never
/// as an error. The reader owns the source; [`into_inner`](Self::into_inner)
/// hands it back without reading further.
pub struct TextReader<R> {
    source: R,
    bytes: Buffer<u8>,
    chars: Buffer<char>,
    decoder: Box<dyn Decode>,
    encoding: &'static Encoding,
    options: ReaderOptions,
    /// Gates the one-time preamble check at the start of the stream.
    begin_of_stream: bool,
    detect_encoding: bool,
    source_eof: bool,
    decoder_fed: bool,
    decoder_flushed: bool,
    pending_error: Option<Error>,
    byte_position: u64,
    char_position: u64,
}

impl<R: Read> TextReader<R> {
    /// Opens a reader over `source` with default options: encoding detected
    /// from a byte-order mark, falling back to UTF-8.
    ///
    /// # Errors
    ///
    /// Fails only on invalid configuration; no I/O happens until the first
    /// read.
    pub fn new(source: R) -> Result<Self> {
        Self::with_options(source, ReaderOptions::default())
    }

    /// Opens a reader over `source` with explicit options.
    ///
    /// # Errors
    ///
    /// Fails if `options.byte_buffer_size` is zero.
    pub fn with_options(source: R, options: ReaderOptions) -> Result<Self> {
        let mut bytes = Buffer::new();
        bytes.set_capacity(options.byte_buffer_size, false)?;
        let mut chars = Buffer::new();
        chars.set_capacity(options.byte_buffer_size, false)?;

        let encoding = options.encoding.unwrap_or(UTF_8);
        // With an explicit encoding that has no preamble there is nothing to
        // look for at the start of the stream.
        let begin_of_stream = match options.encoding {
            Some(explicit) => !preamble::preamble_of(explicit).is_empty(),
            None => true,
        };

        Ok(Self {
            source,
            bytes,
            chars,
            decoder: Box::new(EncodingDecoder::new(encoding, options.malformed)),
            encoding,
            options,
            begin_of_stream,
            detect_encoding: options.encoding.is_none(),
            source_eof: false,
            decoder_fed: false,
            decoder_flushed: false,
            pending_error: None,
            byte_position: 0,
            char_position: 0,
        })
    }

    /// The encoding currently in effect. Before the first read with no
    /// explicit encoding configured, this is the UTF-8 fallback; it changes
    /// if the first bytes carry a recognized byte-order mark.
    #[must_use]
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Absolute count of source bytes consumed so far, by decoding or by
    /// preamble skipping.
    #[must_use]
    pub fn byte_position(&self) -> u64 {
        self.byte_position
    }

    /// Absolute count of characters returned to the caller so far.
    #[must_use]
    pub fn char_position(&self) -> u64 {
        self.char_position
    }

    /// Consumes the reader and hands the source back without reading from it
    /// again. Bytes already pulled into the staging buffers are discarded.
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Returns the next character, or `Ok(None)` at end of stream.
    ///
    /// # Errors
    ///
    /// Propagates source I/O errors and malformed-input errors.
    pub fn read(&mut self) -> Result<Option<char>> {
        if !self.ensure_chars()? {
            return Ok(None);
        }
        let c = *self.chars.get(0)?;
        let start = self.chars.start_offset();
        self.chars.set_start_offset(start + 1)?;
        self.char_position += 1;
        Ok(Some(c))
    }

    /// Returns the next character without consuming it, or `Ok(None)` at end
    /// of stream. Performs the same fills as [`read`](Self::read).
    ///
    /// # Errors
    ///
    /// Propagates source I/O errors and malformed-input errors.
    pub fn peek(&mut self) -> Result<Option<char>> {
        if !self.ensure_chars()? {
            return Ok(None);
        }
        Ok(Some(*self.chars.get(0)?))
    }

    /// Fills `dst` with decoded characters, stopping early only at end of
    /// stream. Returns the number of characters written.
    ///
    /// # Errors
    ///
    /// Propagates source I/O errors and malformed-input errors.
    pub fn read_chars(&mut self, dst: &mut [char]) -> Result<usize> {
        let mut filled = 0;
        while filled < dst.len() {
            if !self.ensure_chars()? {
                break;
            }
            let available = self.chars.count().min(dst.len() - filled);
            dst[filled..filled + available].copy_from_slice(&self.chars.window()[..available]);
            let start = self.chars.start_offset();
            self.chars.set_start_offset(start + available)?;
            self.char_position += available as u64;
            filled += available;
        }
        Ok(filled)
    }

    /// Reads up to the next line terminator (`\n`, `\r`, or `\r\n`),
    /// consuming it but excluding it from the returned line. Returns
    /// `Ok(None)` when the stream ends before any character of a line is
    /// seen; a terminator with no preceding content yields an empty line.
    ///
    /// # Errors
    ///
    /// Propagates source I/O errors and malformed-input errors.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let mut read_any = false;
        loop {
            match self.read()? {
                None => return Ok(read_any.then_some(line)),
                Some('\n') => return Ok(Some(line)),
                Some('\r') => {
                    if self.peek()? == Some('\n') {
                        self.read()?;
                    }
                    return Ok(Some(line));
                }
                Some(c) => {
                    read_any = true;
                    line.push(c);
                }
            }
        }
    }

    /// Reads every remaining character into one string.
    ///
    /// # Errors
    ///
    /// Propagates source I/O errors and malformed-input errors.
    pub fn read_to_end(&mut self) -> Result<String> {
        let mut out = String::new();
        while self.ensure_chars()? {
            out.extend(&self.chars);
            let count = self.chars.count();
            let start = self.chars.start_offset();
            self.chars.set_start_offset(start + count)?;
            self.char_position += count as u64;
        }
        Ok(out)
    }

    /// Drives fills and decode passes until the char window is non-empty.
    /// Returns `false` once the source is exhausted, the decoder flushed,
    /// and every buffered character consumed.
    fn ensure_chars(&mut self) -> Result<bool> {
        loop {
            if self.chars.count() > 0 {
                return Ok(true);
            }
            if let Some(err) = self.pending_error.take() {
                return Err(err);
            }
            if self.source_eof && self.bytes.is_empty() {
                if self.decoder_flushed {
                    return Ok(false);
                }
                // A decoder that was never fed has nothing to flush.
                if !self.decoder_fed {
                    self.decoder_flushed = true;
                    continue;
                }
            }

            if self.bytes.is_empty() && !self.source_eof {
                self.bytes.clear();
                if self.fill_bytes()? == 0 {
                    continue;
                }
            }

            if self.begin_of_stream && !self.resolve_preamble()? {
                // Not enough bytes to decide; a fill already happened.
                continue;
            }

            // The char window is empty here, so resetting its offsets frees
            // the whole capacity as tail.
            self.chars.clear();
            let last = self.source_eof;
            if !self.bytes.is_empty() {
                self.decoder_fed = true;
            }
            let step = decode_step(self.decoder.as_mut(), &mut self.bytes, &mut self.chars, last)?;
            self.byte_position += step.bytes_consumed as u64;

            match step.status {
                DecodeStatus::Malformed { length } => {
                    // Served only after already-decoded characters drain.
                    self.pending_error = Some(Error::Malformed {
                        position: self.byte_position,
                        length,
                    });
                }
                DecodeStatus::InputExhausted if last && self.bytes.is_empty() => {
                    self.decoder_flushed = true;
                }
                DecodeStatus::InputExhausted | DecodeStatus::OutputFull => {}
            }

            if step.bytes_consumed == 0
                && step.chars_produced == 0
                && !matches!(step.status, DecodeStatus::Malformed { .. })
                && !self.source_eof
            {
                // Buffer pressure: the byte window is too small for one full
                // character. Reclaim tail capacity and refill before the
                // next decode pass.
                self.reclaim_byte_tail()?;
                self.fill_bytes()?;
            }
        }
    }

    /// One fill attempt against the unused byte tail. A read of 0 bytes
    /// marks the source as exhausted.
    fn fill_bytes(&mut self) -> Result<usize> {
        let tail = self.bytes.tail_mut()?;
        let read = self.source.read(tail)?;
        if read == 0 {
            self.source_eof = true;
        } else {
            let count = self.bytes.count();
            self.bytes.set_count(count + read)?;
        }
        Ok(read)
    }

    /// Runs the one-time preamble check. Returns `true` once the question is
    /// settled (preamble consumed, or provably absent); `false` after
    /// pulling more bytes for a still-inconclusive prefix.
    fn resolve_preamble(&mut self) -> Result<bool> {
        let explicit: [Signature; 1];
        let candidates: &[Signature] = if self.detect_encoding {
            preamble::SIGNATURES
        } else {
            explicit = [(preamble::preamble_of(self.encoding), self.encoding)];
            &explicit
        };

        match preamble::scan(candidates, self.bytes.window()) {
            PreambleScan::Match { encoding, length } => {
                let start = self.bytes.start_offset();
                self.bytes.set_start_offset(start + length)?;
                self.byte_position += length as u64;
                if self.detect_encoding && encoding != self.encoding {
                    self.encoding = encoding;
                    self.decoder = Box::new(EncodingDecoder::new(encoding, self.options.malformed));
                }
                self.begin_of_stream = false;
                Ok(true)
            }
            PreambleScan::Absent => {
                self.begin_of_stream = false;
                Ok(true)
            }
            PreambleScan::Inconclusive => {
                if self.source_eof {
                    // The stream ended inside a candidate prefix; what is
                    // buffered is content, not a preamble.
                    self.begin_of_stream = false;
                    return Ok(true);
                }
                if self.bytes.tail_capacity() == 0 {
                    let needed = preamble::longest(candidates);
                    if self.bytes.capacity()? < needed {
                        self.bytes.set_capacity(needed, false)?;
                    } else {
                        self.bytes.compact()?;
                    }
                }
                self.fill_bytes()?;
                Ok(false)
            }
        }
    }

    /// Makes room at the byte tail: compacts the window off the front, or
    /// doubles the capacity when the window already spans the whole store.
    fn reclaim_byte_tail(&mut self) -> Result<()> {
        if self.bytes.start_offset() > 0 {
            self.bytes.compact()?;
        }
        if self.bytes.tail_capacity() == 0 {
            let capacity = self.bytes.capacity()?;
            self.bytes.set_capacity(capacity * 2, false)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
