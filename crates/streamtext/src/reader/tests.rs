use std::io::{self, Read};

use encoding_rs::{UTF_8, UTF_16BE, UTF_16LE, WINDOWS_1252};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use rstest::rstest;

use crate::{Error, MalformedHandling, ReaderOptions, TextReader};

/// A source that delivers at most `chunk` bytes per read and records the
/// size of every read it serves, including the final zero-length one.
struct ScriptedSource {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
    reads: Vec<usize>,
}

impl ScriptedSource {
    fn new(data: impl Into<Vec<u8>>, chunk: usize) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            chunk,
            reads: Vec::new(),
        }
    }
}

impl Read for ScriptedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = (self.data.len() - self.pos).min(buf.len()).min(self.chunk);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        self.reads.push(n);
        Ok(n)
    }
}

fn utf8_options(byte_buffer_size: usize) -> ReaderOptions {
    ReaderOptions {
        encoding: Some(UTF_8),
        byte_buffer_size,
        ..Default::default()
    }
}

#[test]
fn empty_source_reports_end_immediately() {
    let mut reader = TextReader::new(ScriptedSource::new(vec![], 16)).unwrap();
    assert_eq!(reader.read().unwrap(), None);
    assert_eq!(reader.peek().unwrap(), None);
    assert_eq!(reader.char_position(), 0);
    // Exactly one source read happened, and it reported end of stream.
    assert_eq!(reader.into_inner().reads, vec![0]);
}

#[test]
fn ascii_hello_with_two_byte_buffer_takes_three_fills() {
    let source = ScriptedSource::new(*b"Hello", 16);
    let mut reader = TextReader::with_options(source, utf8_options(2)).unwrap();
    assert_eq!(reader.read_to_end().unwrap(), "Hello");
    assert_eq!(reader.char_position(), 5);
    assert_eq!(reader.byte_position(), 5);
    assert_eq!(reader.into_inner().reads, vec![2, 2, 1, 0]);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(4)]
#[case(7)]
#[case(64)]
fn round_trips_any_buffer_size(#[case] size: usize) {
    let text = "héllo wörld \u{2713} \u{1F44D} end";
    let source = ScriptedSource::new(text.as_bytes().to_vec(), 3);
    let mut reader = TextReader::with_options(source, utf8_options(size)).unwrap();
    assert_eq!(reader.read_to_end().unwrap(), text);
    assert_eq!(reader.char_position(), text.chars().count() as u64);
    assert_eq!(reader.byte_position(), text.len() as u64);
}

#[test]
fn buffer_smaller_than_one_sequence_still_decodes() {
    // Four-byte scalar through a one-byte staging buffer.
    let source = ScriptedSource::new("\u{1F44D}".as_bytes().to_vec(), 16);
    let mut reader = TextReader::with_options(source, utf8_options(1)).unwrap();
    assert_eq!(reader.read_to_end().unwrap(), "\u{1F44D}");
}

#[test]
fn explicit_encoding_preamble_is_stripped() {
    let mut data = vec![0xEF, 0xBB, 0xBF];
    data.extend_from_slice(b"hi");
    let source = ScriptedSource::new(data, 16);
    let mut reader = TextReader::with_options(source, utf8_options(1024)).unwrap();
    assert_eq!(reader.read_to_end().unwrap(), "hi");
    assert_eq!(reader.byte_position(), 5);
    assert_eq!(reader.char_position(), 2);
}

#[test]
fn stream_without_preamble_is_decoded_unchanged() {
    let source = ScriptedSource::new(*b"hi", 16);
    let mut reader = TextReader::with_options(source, utf8_options(1024)).unwrap();
    assert_eq!(reader.read_to_end().unwrap(), "hi");
    assert_eq!(reader.byte_position(), 2);
}

#[test]
fn bom_selects_utf16le() {
    let source = ScriptedSource::new(vec![0xFF, 0xFE, 0x68, 0x00, 0x69, 0x00], 16);
    let mut reader = TextReader::new(source).unwrap();
    assert_eq!(reader.read_to_end().unwrap(), "hi");
    assert_eq!(reader.encoding(), UTF_16LE);
    assert_eq!(reader.byte_position(), 6);
}

#[test]
fn bom_selects_utf16be() {
    let source = ScriptedSource::new(vec![0xFE, 0xFF, 0x00, 0x68], 16);
    let mut reader = TextReader::new(source).unwrap();
    assert_eq!(reader.read_to_end().unwrap(), "h");
    assert_eq!(reader.encoding(), UTF_16BE);
}

#[test]
fn no_bom_falls_back_to_utf8() {
    let source = ScriptedSource::new(*b"plain", 16);
    let mut reader = TextReader::new(source).unwrap();
    assert_eq!(reader.read_to_end().unwrap(), "plain");
    assert_eq!(reader.encoding(), UTF_8);
}

#[test]
fn bom_split_across_fills_is_still_detected() {
    // One byte per source read and a one-byte staging buffer: the mark can
    // only ever arrive piecemeal, and the buffer must grow to hold it.
    let source = ScriptedSource::new(vec![0xFF, 0xFE, 0x68, 0x00], 1);
    let options = ReaderOptions {
        byte_buffer_size: 1,
        ..Default::default()
    };
    let mut reader = TextReader::with_options(source, options).unwrap();
    assert_eq!(reader.read_to_end().unwrap(), "h");
    assert_eq!(reader.encoding(), UTF_16LE);
    assert_eq!(reader.byte_position(), 4);
}

#[test]
fn truncated_preamble_prefix_is_content() {
    // A lone 0xEF is a preamble prefix right up until the stream ends; it
    // must then be decoded (and rejected) as content, not swallowed.
    let source = ScriptedSource::new(vec![0xEF], 16);
    let mut reader = TextReader::new(source).unwrap();
    assert!(matches!(
        reader.read(),
        Err(Error::Malformed { .. })
    ));
}

#[test]
fn read_line_splits_on_all_three_terminators() {
    let source = ScriptedSource::new(*b"one\ntwo\rthree\r\nfour", 16);
    let mut reader = TextReader::with_options(source, utf8_options(1024)).unwrap();
    assert_eq!(reader.read_line().unwrap().as_deref(), Some("one"));
    assert_eq!(reader.read_line().unwrap().as_deref(), Some("two"));
    assert_eq!(reader.read_line().unwrap().as_deref(), Some("three"));
    assert_eq!(reader.read_line().unwrap().as_deref(), Some("four"));
    assert_eq!(reader.read_line().unwrap(), None);
}

#[test]
fn read_line_yields_empty_lines_for_bare_terminators() {
    let source = ScriptedSource::new(*b"\n\r\n", 16);
    let mut reader = TextReader::with_options(source, utf8_options(1024)).unwrap();
    assert_eq!(reader.read_line().unwrap().as_deref(), Some(""));
    assert_eq!(reader.read_line().unwrap().as_deref(), Some(""));
    assert_eq!(reader.read_line().unwrap(), None);
}

#[test]
fn crlf_straddling_two_fills_is_one_terminator() {
    let source = ScriptedSource::new(*b"a\r\nb", 1);
    let mut reader = TextReader::with_options(source, utf8_options(1)).unwrap();
    assert_eq!(reader.read_line().unwrap().as_deref(), Some("a"));
    assert_eq!(reader.read_line().unwrap().as_deref(), Some("b"));
    assert_eq!(reader.read_line().unwrap(), None);
}

#[test]
fn malformed_input_fails_after_valid_prefix() {
    let source = ScriptedSource::new(b"ab\xFFcd".to_vec(), 16);
    let mut reader = TextReader::with_options(source, utf8_options(1024)).unwrap();
    assert_eq!(reader.read().unwrap(), Some('a'));
    assert_eq!(reader.read().unwrap(), Some('b'));
    match reader.read() {
        Err(Error::Malformed { position, length }) => {
            assert_eq!(position, 3);
            assert_eq!(length, 1);
        }
        other => panic!("expected malformed error, got {other:?}"),
    }
    // Decoding continues past the rejected sequence.
    assert_eq!(reader.read().unwrap(), Some('c'));
    assert_eq!(reader.read().unwrap(), Some('d'));
    assert_eq!(reader.read().unwrap(), None);
}

#[test]
fn malformed_input_is_replaced_when_configured() {
    let options = ReaderOptions {
        encoding: Some(UTF_8),
        malformed: MalformedHandling::Replace,
        ..Default::default()
    };
    let source = ScriptedSource::new(b"ab\xFFcd".to_vec(), 16);
    let mut reader = TextReader::with_options(source, options).unwrap();
    assert_eq!(reader.read_to_end().unwrap(), "ab\u{FFFD}cd");
}

#[test]
fn truncated_sequence_fails_at_end_of_stream() {
    let source = ScriptedSource::new(b"a\xC3".to_vec(), 16);
    let mut reader = TextReader::with_options(source, utf8_options(1024)).unwrap();
    assert_eq!(reader.read().unwrap(), Some('a'));
    assert!(matches!(reader.read(), Err(Error::Malformed { .. })));
    assert_eq!(reader.read().unwrap(), None);
}

#[test]
fn truncated_sequence_is_replaced_when_configured() {
    let options = ReaderOptions {
        encoding: Some(UTF_8),
        malformed: MalformedHandling::Replace,
        ..Default::default()
    };
    let source = ScriptedSource::new(b"a\xC3".to_vec(), 16);
    let mut reader = TextReader::with_options(source, options).unwrap();
    assert_eq!(reader.read_to_end().unwrap(), "a\u{FFFD}");
}

#[test]
fn peek_does_not_advance() {
    let source = ScriptedSource::new(*b"xy", 16);
    let mut reader = TextReader::with_options(source, utf8_options(1024)).unwrap();
    assert_eq!(reader.peek().unwrap(), Some('x'));
    assert_eq!(reader.peek().unwrap(), Some('x'));
    assert_eq!(reader.char_position(), 0);
    assert_eq!(reader.read().unwrap(), Some('x'));
    assert_eq!(reader.peek().unwrap(), Some('y'));
    assert_eq!(reader.char_position(), 1);
}

#[test]
fn read_chars_fills_the_destination() {
    let source = ScriptedSource::new(*b"hello world", 16);
    let mut reader = TextReader::with_options(source, utf8_options(4)).unwrap();
    let mut dst = ['\0'; 5];
    assert_eq!(reader.read_chars(&mut dst).unwrap(), 5);
    assert_eq!(dst.iter().collect::<String>(), "hello");

    let mut rest = ['\0'; 16];
    assert_eq!(reader.read_chars(&mut rest).unwrap(), 6);
    assert_eq!(rest[..6].iter().collect::<String>(), " world");
    assert_eq!(reader.char_position(), 11);
}

#[test]
fn single_byte_encoding_decodes_high_bytes() {
    let options = ReaderOptions {
        encoding: Some(WINDOWS_1252),
        ..Default::default()
    };
    let source = ScriptedSource::new(vec![0x48, 0xE9, 0x6C], 16);
    let mut reader = TextReader::with_options(source, options).unwrap();
    assert_eq!(reader.read_to_end().unwrap(), "Hél");
    assert_eq!(reader.byte_position(), 3);
}

#[test]
fn into_inner_returns_the_source_untouched() {
    let reader = TextReader::new(ScriptedSource::new(*b"data", 16)).unwrap();
    let source = reader.into_inner();
    assert!(source.reads.is_empty());
    assert_eq!(source.pos, 0);
}

#[test]
fn zero_byte_buffer_size_is_rejected() {
    let result = TextReader::with_options(ScriptedSource::new(vec![], 16), utf8_options(0));
    assert!(matches!(result, Err(Error::Buffer(_))));
}

#[quickcheck]
fn round_trips_arbitrary_chunkings(text: String, chunk: u8, size: u8) -> TestResult {
    // A leading U+FEFF would legitimately be stripped as a byte-order mark.
    if text.starts_with('\u{FEFF}') {
        return TestResult::discard();
    }
    let chunk = usize::from(chunk % 7) + 1;
    let size = usize::from(size % 9) + 1;
    let source = ScriptedSource::new(text.as_bytes().to_vec(), chunk);
    let mut reader = match TextReader::with_options(source, utf8_options(size)) {
        Ok(reader) => reader,
        Err(_) => return TestResult::failed(),
    };
    match reader.read_to_end() {
        Ok(out) => TestResult::from_bool(out == text),
        Err(_) => TestResult::failed(),
    }
}
