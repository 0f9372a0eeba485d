//! UTF-8 codepoint reader
//!
//! Indexes already-buffered text by character instead of by byte. The
//! length of each character comes from its lead byte alone; continuation
//! bytes are not checked here. The streaming path in
//! [`crate::comm::assembly`] is the one that validates, because only a live
//! link can deliver a sequence that breaks off half way.

use std::fmt;

/// Byte length of the character introduced by `lead`.
///
/// Anything below `0xC0` (ASCII and stray continuation bytes) counts as a
/// single byte, `0xF0` and above as four.
#[inline]
pub fn sequence_len(lead: u8) -> usize {
    match lead {
        0x00..=0xBF => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    }
}

/// One character held as its UTF-8 bytes
///
/// Comparison and hashing work on the whole byte span, never on a single
/// byte of it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Codepoint {
    bytes: [u8; 4],
    len: u8,
}

impl Codepoint {
    /// Build from a span of 1 to 4 bytes
    pub fn from_bytes(span: &[u8]) -> Option<Self> {
        if span.is_empty() || span.len() > 4 {
            return None;
        }
        let mut bytes = [0u8; 4];
        bytes[..span.len()].copy_from_slice(span);
        Some(Self {
            bytes,
            len: span.len() as u8,
        })
    }

    /// Encode a `char`
    pub fn from_char(c: char) -> Self {
        let mut bytes = [0u8; 4];
        let len = c.encode_utf8(&mut bytes).len() as u8;
        Self { bytes, len }
    }

    /// The raw byte span
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// The span as text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }

    /// Byte length (1-4)
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// A default-constructed codepoint holds no bytes
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for Codepoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => write!(f, "Codepoint({:?})", s),
            None => write!(f, "Codepoint({:02X?})", self.as_bytes()),
        }
    }
}

impl fmt::Display for Codepoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.as_bytes()))
    }
}

/// Iterator over the character spans of a byte string
#[derive(Debug, Clone)]
pub struct Codepoints<'a> {
    text: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for Codepoints<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.text.len() {
            return None;
        }
        let start = self.pos;
        // A lead byte near the end may promise more bytes than remain
        let end = (start + sequence_len(self.text[start])).min(self.text.len());
        self.pos = end;
        Some(&self.text[start..end])
    }
}

/// Iterate `text` one character span at a time
pub fn codepoints(text: &[u8]) -> Codepoints<'_> {
    Codepoints { text, pos: 0 }
}

/// Number of characters in `text`
pub fn char_count(text: &[u8]) -> usize {
    codepoints(text).count()
}

/// Byte span of the `index`-th character, or `None` past the end
pub fn char_at(text: &[u8], index: usize) -> Option<&[u8]> {
    codepoints(text).nth(index)
}

/// Byte offset where character `index` starts (`text.len()` past the end)
fn byte_offset(text: &[u8], index: usize) -> usize {
    let mut pos = 0;
    for _ in 0..index {
        if pos >= text.len() {
            return text.len();
        }
        pos = (pos + sequence_len(text[pos])).min(text.len());
    }
    pos
}

/// Contiguous bytes of characters `start..end` (character indices)
///
/// Out-of-range bounds are clamped, so the result is never longer than the
/// text and never splits a character.
pub fn span(text: &[u8], start: usize, end: usize) -> &[u8] {
    if start >= end {
        return &[];
    }
    let from = byte_offset(text, start);
    let to = byte_offset(text, end);
    &text[from..to]
}
