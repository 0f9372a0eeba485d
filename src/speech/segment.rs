//! Splitting utterances into segments
//!
//! Display and phonetic texts are split on line breaks independently and
//! paired by index. Empty segments are dropped before pairing, so leading,
//! trailing or doubled breaks never produce a silent segment.

use crate::codepoint::char_count;

/// One display segment and the phonetic segment spoken with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPair {
    pub display: String,
    pub phonetic: String,
    /// Character counts, cached
    pub display_len: usize,
    pub phonetic_len: usize,
}

impl SegmentPair {
    pub fn new(display: &str, phonetic: &str) -> Self {
        Self {
            display: display.to_string(),
            phonetic: phonetic.to_string(),
            display_len: char_count(display.as_bytes()),
            phonetic_len: char_count(phonetic.as_bytes()),
        }
    }

    /// Characters to step through before the segment is done
    pub fn reveal_len(&self) -> usize {
        self.display_len.max(self.phonetic_len)
    }
}

/// Non-empty lines of `text`, at most `limit` of them.
///
/// A carriage return left before a line feed is not part of the segment.
pub fn split_segments(text: &str, limit: usize) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .take(limit)
        .collect()
}

/// Pair display and phonetic segments.
///
/// An empty phonetic text speaks the display text. When the two texts split
/// into different numbers of segments, pairing stops at the shorter list.
pub fn pair_segments(display: &str, phonetic: &str, limit: usize) -> Vec<SegmentPair> {
    let phonetic = if phonetic.is_empty() { display } else { phonetic };
    let shown = split_segments(display, limit);
    let spoken = split_segments(phonetic, limit);

    if shown.len() != spoken.len() {
        log::warn!(
            "segment count mismatch: display {}, phonetic {}; using {}",
            shown.len(),
            spoken.len(),
            shown.len().min(spoken.len())
        );
    }

    shown
        .iter()
        .zip(spoken.iter())
        .map(|(d, p)| SegmentPair::new(d, p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_drops_empty_segments() {
        assert_eq!(split_segments("a\n\nb\n", 20), vec!["a", "b"]);
        assert_eq!(split_segments("\nonly", 20), vec!["only"]);
        assert!(split_segments("", 20).is_empty());
        assert!(split_segments("\n\n", 20).is_empty());
    }

    #[test]
    fn test_split_strips_carriage_return() {
        assert_eq!(split_segments("Hi\r\nBye", 20), vec!["Hi", "Bye"]);
    }

    #[test]
    fn test_split_limit() {
        let text = (0..30).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        assert_eq!(split_segments(&text, 20).len(), 20);
    }

    #[test]
    fn test_pair_haiku() {
        let pairs = pair_segments("古池や\n蛙飛びこむ\n水の音", "ふるいけや\nかわずとびこむ\nみずのおと", 20);
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[1].display, "蛙飛びこむ");
        assert_eq!(pairs[1].phonetic, "かわずとびこむ");
        assert_eq!(pairs[1].display_len, 5);
        assert_eq!(pairs[1].phonetic_len, 7);
        assert_eq!(pairs[1].reveal_len(), 7);
    }

    #[test]
    fn test_pair_empty_phonetic_uses_display() {
        let pairs = pair_segments("Hi\nBye", "", 20);
        assert_eq!(pairs[0], SegmentPair::new("Hi", "Hi"));
        assert_eq!(pairs[1], SegmentPair::new("Bye", "Bye"));
    }

    #[test]
    fn test_pair_stops_at_shorter_list() {
        let pairs = pair_segments("A\nB\nC", "a\nb", 20);
        assert_eq!(pairs.len(), 2);
        let pairs = pair_segments("A", "a\nb\nc", 20);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].phonetic, "a");
    }
}
