//! Buffered, encoding-aware text reading over arbitrary byte streams.
//!
//! [`TextReader`] turns any [`std::io::Read`] into a sequence of decoded
//! characters: it stages raw bytes and decoded characters in two sliding
//! [`Buffer`] windows, refills them lazily from the source, strips a leading
//! byte-order mark (detecting the encoding from it when none was supplied),
//! and tracks absolute byte and character positions. No assumption is made
//! about the chunk sizes the source delivers; partial reads and multi-byte
//! sequences split across fills are handled by decoder carry state.
//!
//! ```rust
//! use std::io::Cursor;
//! use streamtext::TextReader;
//!
//! let source = Cursor::new(&b"\xEF\xBB\xBFhello\nworld"[..]);
//! let mut reader = TextReader::new(source)?;
//! assert_eq!(reader.read_line()?, Some("hello".to_string()));
//! assert_eq!(reader.read_to_end()?, "world");
//! # Ok::<(), streamtext::Error>(())
//! ```

mod buffer;
mod decoder;
mod error;
mod options;
mod preamble;
mod reader;

pub use buffer::Buffer;
pub use decoder::{Decode, DecodeStatus, DecodeStep, EncodingDecoder, decode_step};
pub use error::{BufferError, Error, Result};
pub use options::{MalformedHandling, ReaderOptions};
pub use reader::TextReader;

// Re-exported so callers can name encodings without a separate dependency.
pub use encoding_rs;
