use encoding_rs::Encoding;

/// How the reader treats byte sequences the decoder rejects.
///
/// # Default
///
/// [`MalformedHandling::Fail`]: malformed input is surfaced as an error, not
/// silently substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedHandling {
    /// Surface malformed sequences as [`Error::Malformed`](crate::Error).
    ///
    /// Characters decoded before the offending sequence are still delivered;
    /// the error is returned once they have been consumed.
    #[default]
    Fail,

    /// Substitute each malformed sequence with U+FFFD REPLACEMENT CHARACTER
    /// and continue decoding.
    Replace,
}

/// Configuration for [`TextReader`](crate::TextReader).
///
/// # Examples
///
/// ```rust
/// use streamtext::{MalformedHandling, ReaderOptions};
///
/// let options = ReaderOptions {
///     encoding: Some(streamtext::encoding_rs::UTF_8),
///     malformed: MalformedHandling::Replace,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ReaderOptions {
    /// The encoding to decode with.
    ///
    /// When set, only that encoding's own preamble is looked for at the start
    /// of the stream (and stripped if present). When `None`, the stream's
    /// leading bytes are matched against the known byte-order marks (UTF-8,
    /// UTF-16LE, UTF-16BE); if none matches, decoding falls back to UTF-8.
    ///
    /// # Default
    ///
    /// `None`
    pub encoding: Option<&'static Encoding>,

    /// Capacity of the byte staging buffer in bytes.
    ///
    /// Any size of at least 1 decodes correctly; sizes smaller than one
    /// multi-byte sequence simply cause more fills. The buffer may be grown
    /// temporarily while a preamble longer than it is being checked.
    ///
    /// # Default
    ///
    /// `1024`
    pub byte_buffer_size: usize,

    /// Treatment of malformed byte sequences.
    ///
    /// # Default
    ///
    /// [`MalformedHandling::Fail`]
    pub malformed: MalformedHandling,
}

pub(crate) const DEFAULT_BYTE_BUFFER_SIZE: usize = 1024;

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            encoding: None,
            byte_buffer_size: DEFAULT_BYTE_BUFFER_SIZE,
            malformed: MalformedHandling::Fail,
        }
    }
}
