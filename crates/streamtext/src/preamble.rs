//! Preamble (byte-order mark) detection over a read-only signature table.

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};

/// A signature table entry: preamble bytes and the encoding they identify.
pub(crate) type Signature = (&'static [u8], &'static Encoding);

/// The known byte-order marks, longest first.
pub(crate) const SIGNATURES: &[Signature] = &[
    (&[0xEF, 0xBB, 0xBF], UTF_8),
    (&[0xFF, 0xFE], UTF_16LE),
    (&[0xFE, 0xFF], UTF_16BE),
];

/// Outcome of scanning the front of a byte window for a preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PreambleScan {
    /// The window starts with a full preamble.
    Match {
        encoding: &'static Encoding,
        length: usize,
    },
    /// No candidate can match, no matter what arrives later.
    Absent,
    /// The buffered bytes are a proper prefix of some candidate; more data is
    /// needed before concluding either way. Callers must not treat this as
    /// "absent" when the source may still deliver the rest of a preamble.
    Inconclusive,
}

/// Compares the front of `bytes` against every candidate in `table`.
///
/// Detection is a pure function of its inputs, so the candidate table is an
/// argument rather than hidden state. Empty signatures are skipped.
pub(crate) fn scan(table: &[Signature], bytes: &[u8]) -> PreambleScan {
    let mut inconclusive = false;
    for &(signature, encoding) in table {
        if signature.is_empty() {
            continue;
        }
        if bytes.len() >= signature.len() {
            if bytes[..signature.len()] == *signature {
                return PreambleScan::Match {
                    encoding,
                    length: signature.len(),
                };
            }
        } else if signature.starts_with(bytes) {
            inconclusive = true;
        }
    }
    if inconclusive {
        PreambleScan::Inconclusive
    } else {
        PreambleScan::Absent
    }
}

/// The preamble of `encoding`, or an empty slice if it has none.
pub(crate) fn preamble_of(encoding: &'static Encoding) -> &'static [u8] {
    SIGNATURES
        .iter()
        .find(|(_, candidate)| *candidate == encoding)
        .map_or(&[], |(signature, _)| signature)
}

/// Length of the longest candidate in `table`.
pub(crate) fn longest(table: &[Signature]) -> usize {
    table
        .iter()
        .map(|(signature, _)| signature.len())
        .max()
        .unwrap_or(0)
}
