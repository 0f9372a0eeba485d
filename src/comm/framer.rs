//! Command framer
//!
//! Turns a raw byte stream into brace-balanced records. Bytes accumulate in
//! a bounded buffer; a completion pass runs on a line ending, on a closing
//! brace once an opening brace has been seen, or when the buffer fills up.
//! Every record the pass extracts goes through the [`DedupWindow`] before it
//! is handed out.
//!
//! The framer is chunk-insensitive: feeding a byte sequence in any split
//! yields the same records as feeding it whole.

use crate::comm::assembly::{Utf8Assembly, Utf8Step};
use crate::comm::dedup::{Admission, DedupWindow};
use crate::comm::types::Record;
use crate::time::Millis;

/// Default RawBuffer bound in bytes
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 4096;
/// Default duplicate cooldown
pub const DEFAULT_DEDUP_COOLDOWN_MS: Millis = 3000;

/// Size and timing bounds for a [`Framer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramerLimits {
    pub max_buffer_size: usize,
    pub dedup_cooldown_ms: Millis,
}

impl Default for FramerLimits {
    fn default() -> Self {
        Self {
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            dedup_cooldown_ms: DEFAULT_DEDUP_COOLDOWN_MS,
        }
    }
}

/// Receive counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub bytes_received: u64,
    pub records_extracted: u64,
    pub duplicates_dropped: u64,
    pub bytes_discarded: u64,
    pub invalid_sequences: u64,
    pub forced_flushes: u64,
}

/// What started a completion pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    LineEnding,
    ClosingBrace,
    Overflow,
}

/// What a completion pass did with the bytes left after the last record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completion {
    /// Every byte went into records
    Drained,
    /// No opening brace in what was left; those bytes are gone
    Discarded { bytes: usize },
    /// An unfinished record stays buffered, waiting for more bytes
    Retained { bytes: usize },
    /// An unfinished record was forced out as a truncated record
    Flushed { bytes: usize },
}

/// Where the record starting at `buf[0] == b'{'` ends.
///
/// Braces are counted without regard to quoting, so a brace inside a string
/// value counts too.
fn matching_brace(buf: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &b) in buf.iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[inline]
fn is_line_ending(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

/// Streaming record extractor
#[derive(Debug, Clone)]
pub struct Framer {
    limits: FramerLimits,
    buffer: Vec<u8>,
    assembly: Utf8Assembly,
    last_line_ending: Option<u8>,
    dedup: DedupWindow,
    stats: FrameStats,
}

impl Default for Framer {
    fn default() -> Self {
        Self::new(FramerLimits::default())
    }
}

impl Framer {
    pub fn new(limits: FramerLimits) -> Self {
        Self {
            limits,
            buffer: Vec::with_capacity(limits.max_buffer_size),
            assembly: Utf8Assembly::new(),
            last_line_ending: None,
            dedup: DedupWindow::new(limits.dedup_cooldown_ms),
            stats: FrameStats::default(),
        }
    }

    pub fn limits(&self) -> FramerLimits {
        self.limits
    }

    /// Bytes waiting in the RawBuffer
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Feed a chunk and collect every record it completes
    pub fn feed(&mut self, bytes: &[u8], now: Millis) -> Vec<Record> {
        let mut records = Vec::new();
        for &byte in bytes {
            self.push_byte(byte, now, &mut records);
        }
        records
    }

    /// Feed a single byte
    pub fn push_byte(&mut self, byte: u8, now: Millis, out: &mut Vec<Record>) {
        self.stats.bytes_received += 1;

        if is_line_ending(byte) {
            self.on_line_ending(byte, now, out);
        } else if byte < 0x80 {
            self.last_line_ending = None;
            // The partial sequence cannot finish now; drop it, keep the ASCII byte
            if self.assembly.is_in_progress() {
                let dropped = self.assembly.take_partial().len();
                log::warn!("ASCII byte 0x{:02X} inside a UTF-8 sequence, dropped {} bytes", byte, dropped);
                self.stats.invalid_sequences += 1;
                self.stats.bytes_discarded += dropped as u64;
            }
            self.append_bounded(&[byte], now, out);
            if byte == b'}' && self.buffer.contains(&b'{') {
                self.complete(Trigger::ClosingBrace, now, out);
            }
            self.enforce_limit(now, out);
        } else {
            self.last_line_ending = None;
            self.on_high_byte(byte, now, out);
        }
    }

    fn on_line_ending(&mut self, byte: u8, now: Millis, out: &mut Vec<Record>) {
        // Second half of CRLF or LFCR
        if matches!(self.last_line_ending, Some(prev) if prev != byte) {
            self.last_line_ending = None;
            return;
        }
        self.last_line_ending = Some(byte);

        if self.assembly.is_in_progress() {
            let partial = self.assembly.take_partial();
            log::debug!("line ending cut a UTF-8 sequence, keeping {} bytes", partial.len());
            self.append_bounded(&partial, now, out);
        }
        if !self.buffer.is_empty() {
            self.complete(Trigger::LineEnding, now, out);
        }
        // A retained record may already fill the buffer
        self.enforce_limit(now, out);
    }

    fn on_high_byte(&mut self, byte: u8, now: Millis, out: &mut Vec<Record>) {
        match self.assembly.push(byte) {
            Utf8Step::Complete(cp) => {
                self.append_bounded(cp.as_bytes(), now, out);
                self.enforce_limit(now, out);
            }
            Utf8Step::Pending => {}
            Utf8Step::Invalid { discarded } => {
                log::warn!("invalid UTF-8 continuation byte 0x{:02X}, dropped {} bytes", byte, discarded);
                self.stats.invalid_sequences += 1;
                self.stats.bytes_discarded += discarded as u64;
            }
            Utf8Step::Ignored => {
                log::debug!("stray byte 0x{:02X} ignored", byte);
                self.stats.bytes_discarded += 1;
            }
        }
    }

    /// Append a character without letting the buffer pass its bound
    fn append_bounded(&mut self, bytes: &[u8], now: Millis, out: &mut Vec<Record>) {
        if self.buffer.len() + bytes.len() > self.limits.max_buffer_size {
            self.complete(Trigger::Overflow, now, out);
        }
        self.buffer.extend_from_slice(bytes);
    }

    fn enforce_limit(&mut self, now: Millis, out: &mut Vec<Record>) {
        if self.buffer.len() >= self.limits.max_buffer_size {
            log::warn!("receive buffer full ({} bytes), forcing completion", self.buffer.len());
            self.complete(Trigger::Overflow, now, out);
        }
    }

    /// Extract every balanced record from the buffer.
    fn complete(&mut self, trigger: Trigger, now: Millis, out: &mut Vec<Record>) {
        if trigger == Trigger::Overflow {
            self.stats.forced_flushes += 1;
        }

        let pending = std::mem::take(&mut self.buffer);
        let mut rest: &[u8] = &pending;

        let outcome = loop {
            if rest.is_empty() {
                break Completion::Drained;
            }
            let Some(start) = rest.iter().position(|&b| b == b'{') else {
                break Completion::Discarded { bytes: rest.len() };
            };
            if start > 0 {
                self.stats.bytes_discarded += start as u64;
            }
            let candidate = &rest[start..];
            match matching_brace(candidate) {
                Some(end) => {
                    self.admit(Record::new(candidate[..=end].to_vec()), now, out);
                    rest = &candidate[end + 1..];
                }
                None if trigger == Trigger::Overflow => {
                    self.admit(Record::truncated(candidate.to_vec()), now, out);
                    break Completion::Flushed {
                        bytes: candidate.len(),
                    };
                }
                None => {
                    self.buffer.extend_from_slice(candidate);
                    break Completion::Retained {
                        bytes: candidate.len(),
                    };
                }
            }
        };

        match outcome {
            Completion::Discarded { bytes } => {
                self.stats.bytes_discarded += bytes as u64;
                log::debug!("{:?}: no record found, discarded {} bytes", trigger, bytes);
            }
            Completion::Retained { bytes } => {
                log::debug!("{:?}: incomplete record, keeping {} bytes", trigger, bytes);
            }
            Completion::Flushed { bytes } => {
                log::warn!("{:?}: flushed {} bytes of an unterminated record", trigger, bytes);
            }
            Completion::Drained => {}
        }
    }

    fn admit(&mut self, record: Record, now: Millis, out: &mut Vec<Record>) {
        match self.dedup.admit(&record.bytes, now) {
            Admission::Accepted => {
                self.stats.records_extracted += 1;
                out.push(record);
            }
            Admission::Duplicate { remaining_ms } => {
                self.stats.duplicates_dropped += 1;
                log::debug!("duplicate record ignored (cooldown: {} ms remaining)", remaining_ms);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(records: &[Record]) -> Vec<String> {
        records.iter().map(Record::to_text).collect()
    }

    #[test]
    fn test_single_record_closes_on_brace() {
        let mut framer = Framer::default();
        let records = framer.feed(br#"{"command":"debug_on"}"#, 0);
        assert_eq!(texts(&records), vec![r#"{"command":"debug_on"}"#]);
        assert!(framer.buffered().is_empty());
    }

    #[test]
    fn test_nested_braces_wait_for_outer_close() {
        let mut framer = Framer::default();
        assert!(framer.feed(br#"{"a":{"b":1}"#, 0).is_empty());
        assert_eq!(framer.buffered(), br#"{"a":{"b":1}"#);
        let records = framer.feed(b"}", 0);
        assert_eq!(texts(&records), vec![r#"{"a":{"b":1}}"#]);
    }

    #[test]
    fn test_concatenated_records() {
        let mut framer = Framer::default();
        let input = r#"{"message":["A","a"]}{"message":["B","b"]}{"message":["C","c"]}"#;
        let records = framer.feed(input.as_bytes(), 0);
        assert_eq!(records.len(), 3);
        assert_eq!(framer.stats().records_extracted, 3);
    }

    #[test]
    fn test_garbage_before_record_dropped() {
        let mut framer = Framer::default();
        let records = framer.feed(b"noise{\"x\":1}", 0);
        assert_eq!(texts(&records), vec!["{\"x\":1}"]);
        assert_eq!(framer.stats().bytes_discarded, 5);
    }

    #[test]
    fn test_line_without_braces_discarded() {
        let mut framer = Framer::default();
        assert!(framer.feed(b"hello\n", 0).is_empty());
        assert!(framer.buffered().is_empty());
        assert_eq!(framer.stats().bytes_discarded, 5);
    }

    #[test]
    fn test_incomplete_record_retained_over_line_ending() {
        let mut framer = Framer::default();
        assert!(framer.feed(b"{\"message\":\n", 0).is_empty());
        assert_eq!(framer.buffered(), b"{\"message\":");
        let records = framer.feed(b"[\"Hi\"]}", 0);
        assert_eq!(texts(&records), vec!["{\"message\":[\"Hi\"]}"]);
    }

    #[test]
    fn test_crlf_counts_as_one_line_ending() {
        let mut framer = Framer::default();
        framer.feed(b"{\r\n", 0);
        // The LF was skipped, so the next CR is a fresh line ending
        assert_eq!(framer.buffered(), b"{");
        framer.feed(b"x\n\r", 0);
        assert_eq!(framer.buffered(), b"{x");
    }

    #[test]
    fn test_multibyte_text_inside_record() {
        let mut framer = Framer::default();
        let input = r#"{"message":["こんにちは","こんにちは"]}"#;
        let records = framer.feed(input.as_bytes(), 0);
        assert_eq!(texts(&records), vec![input]);
    }

    #[test]
    fn test_invalid_continuation_drops_character() {
        let mut framer = Framer::default();
        // "あ" is E3 81 82; a new lead byte replaces the last one
        let mut input = b"{\"".to_vec();
        input.extend_from_slice(&[0xE3, 0x81, 0xE3]);
        input.extend_from_slice(b"\"}");
        let records = framer.feed(&input, 0);
        assert_eq!(texts(&records), vec!["{\"\"}"]);
        assert_eq!(framer.stats().invalid_sequences, 1);
        assert_eq!(framer.stats().bytes_discarded, 3);
    }

    #[test]
    fn test_ascii_inside_sequence_keeps_ascii() {
        let mut framer = Framer::default();
        let mut input = b"{\"".to_vec();
        input.extend_from_slice(&[0xE3, 0x81]);
        input.extend_from_slice(b"A\"}");
        let records = framer.feed(&input, 0);
        assert_eq!(texts(&records), vec!["{\"A\"}"]);
        assert_eq!(framer.stats().invalid_sequences, 1);
    }

    #[test]
    fn test_line_ending_flushes_partial_sequence() {
        let mut framer = Framer::default();
        framer.feed(b"{", 0);
        framer.feed(&[0xE3, 0x81], 0);
        framer.feed(b"\n", 0);
        assert_eq!(framer.buffered(), &[b'{', 0xE3, 0x81]);
    }

    #[test]
    fn test_filler_without_brace_forces_discard() {
        let mut framer = Framer::default();
        let filler = vec![b'x'; 5000];
        assert!(framer.feed(&filler, 0).is_empty());
        assert_eq!(framer.stats().forced_flushes, 1);
        assert_eq!(framer.buffered().len(), 5000 - DEFAULT_MAX_BUFFER_SIZE);

        // Resumes cleanly
        let records = framer.feed(b"\n{\"a\":1}", 0);
        assert_eq!(texts(&records), vec!["{\"a\":1}"]);
    }

    #[test]
    fn test_overflow_flushes_truncated_record() {
        let mut framer = Framer::new(FramerLimits {
            max_buffer_size: 16,
            dedup_cooldown_ms: 3000,
        });
        let records = framer.feed(b"{\"message\":\"abcdefghij", 0);
        assert_eq!(records.len(), 1);
        assert!(records[0].truncated);
        assert_eq!(records[0].bytes.len(), 16);
        assert_eq!(framer.buffered(), b"efghij");
    }

    #[test]
    fn test_buffer_never_exceeds_limit_with_multibyte() {
        let mut framer = Framer::new(FramerLimits {
            max_buffer_size: 16,
            dedup_cooldown_ms: 3000,
        });
        for ch in "あいうえおかきくけこさしすせそ".chars() {
            let mut buf = [0u8; 4];
            framer.feed(ch.encode_utf8(&mut buf).as_bytes(), 0);
            assert!(framer.buffered().len() <= 16);
        }
    }

    #[test]
    fn test_retained_record_at_limit_is_flushed() {
        let mut framer = Framer::new(FramerLimits {
            max_buffer_size: 16,
            dedup_cooldown_ms: 3000,
        });
        // 14 ASCII bytes plus a cut two-byte prefix fill the buffer exactly
        assert!(framer.feed(b"{abcdefghijklm", 0).is_empty());
        assert!(framer.feed(&[0xE3, 0x81], 0).is_empty());
        let records = framer.feed(b"\n", 0);
        assert_eq!(records.len(), 1);
        assert!(records[0].truncated);
        assert_eq!(records[0].bytes.len(), 16);
        assert!(framer.buffered().is_empty());

        assert!(framer.feed(b"z", 0).is_empty());
        assert_eq!(framer.buffered(), b"z");
    }

    #[test]
    fn test_ascii_never_pushes_past_limit() {
        let mut framer = Framer::new(FramerLimits {
            max_buffer_size: 16,
            dedup_cooldown_ms: 0,
        });
        let mut records = Vec::new();
        let chunks: [&[u8]; 4] = [b"{abcdefghijklm", &[0xE3, 0x81], b"\n", b"zzzzzzzzzzzzzzzzzzzz"];
        for chunk in chunks {
            records.extend(framer.feed(chunk, 0));
            assert!(framer.buffered().len() < 16);
        }
        assert!(records.iter().all(|r| r.bytes.len() <= 16));
    }

    #[test]
    fn test_duplicate_records_suppressed() {
        let mut framer = Framer::default();
        let record = br#"{"message":["A","A"]}"#;
        assert_eq!(framer.feed(record, 0).len(), 1);
        assert_eq!(framer.feed(record, 1000).len(), 0);
        assert_eq!(framer.feed(record, 3500).len(), 1);
        assert_eq!(framer.stats().duplicates_dropped, 1);
    }

    #[test]
    fn test_bytes_received_counted() {
        let mut framer = Framer::default();
        framer.feed(b"abc\r\n", 0);
        assert_eq!(framer.stats().bytes_received, 5);
    }

    #[test]
    fn test_matching_brace() {
        assert_eq!(matching_brace(b"{}"), Some(1));
        assert_eq!(matching_brace(b"{{}}x"), Some(3));
        assert_eq!(matching_brace(b"{{}"), None);
        assert_eq!(matching_brace(b"{\"}\"}"), Some(2));
    }
}
