use thiserror::Error;

/// Alias for results produced by reader operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced by [`TextReader`](crate::TextReader) operations.
///
/// End of stream is not represented here; reads report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum Error {
    /// A buffer contract violation (invalid capacity, offsets, or index).
    #[error(transparent)]
    Buffer(#[from] BufferError),

    /// The byte source failed.
    #[error("source I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The decoder rejected a byte sequence.
    #[error("malformed byte sequence of length {length} at byte {position}")]
    Malformed {
        /// Absolute byte position just past the offending sequence.
        position: u64,
        /// Length of the offending sequence in bytes.
        length: usize,
    },
}

/// Contract violations of [`Buffer`](crate::Buffer) operations.
///
/// These are programmer errors: they are surfaced immediately and never
/// retried.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// The backing store was accessed before a capacity was set.
    #[error("buffer capacity is not set")]
    CapacityNotSet,

    /// A capacity below 1 was requested.
    #[error("capacity must be at least 1, got {requested}")]
    CapacityTooSmall {
        /// The rejected capacity.
        requested: usize,
    },

    /// A capacity smaller than the current window length was requested.
    #[error("capacity {requested} is less than the current window length {count}")]
    CapacityBelowCount {
        /// The rejected capacity.
        requested: usize,
        /// The current window length.
        count: usize,
    },

    /// Offsets violating `start <= end < capacity` were requested.
    #[error("offsets must satisfy start <= end < capacity, got [{start}, {end}) with capacity {capacity}")]
    OffsetOutOfRange {
        /// Requested start offset.
        start: usize,
        /// Requested end offset.
        end: usize,
        /// Capacity at the time of the request.
        capacity: usize,
    },

    /// A window length that does not fit between the start offset and the
    /// capacity was requested.
    #[error("window length {requested} does not fit: start offset {start}, capacity {capacity}")]
    CountOutOfRange {
        /// Requested window length.
        requested: usize,
        /// Start offset at the time of the request.
        start: usize,
        /// Capacity at the time of the request.
        capacity: usize,
    },

    /// An element index outside the live window was used.
    #[error("index {index} out of range for window of length {count}")]
    IndexOutOfRange {
        /// The rejected index.
        index: usize,
        /// Window length at the time of the request.
        count: usize,
    },

    /// The unused tail of the buffer is empty; the caller must compact or
    /// resize before producing more elements.
    #[error("no unused tail capacity in buffer of capacity {capacity}")]
    NoTailCapacity {
        /// Capacity of the full buffer.
        capacity: usize,
    },
}
