//! Mouth aperture lookup for spoken characters

use crate::codepoint::{codepoints, Codepoint};

/// Aperture for characters with no table entry
pub const DEFAULT_APERTURE: f32 = 0.5;

/// Closed mouth
pub const CLOSED: f32 = 0.0;

/// Kana grouped by vowel shape
const APERTURE_TABLE: &[(&str, f32)] = &[
    ("あはかがなま", 1.0),
    ("いきぎにみ", 0.3),
    ("うくぐすずむ", 0.8),
    ("えけげせぜねめ", 0.5),
    ("おこごそぞのも", 0.8),
    ("ん", 0.1),
    ("っッ", 0.2),
];

/// Aperture ratio (0.0-1.0) for one character span.
///
/// The span is compared as a whole character, so an empty or partial span
/// gets [`DEFAULT_APERTURE`].
pub fn aperture_for(span: &[u8]) -> f32 {
    let Some(target) = Codepoint::from_bytes(span) else {
        return DEFAULT_APERTURE;
    };
    for (group, ratio) in APERTURE_TABLE {
        if codepoints(group.as_bytes()).any(|cp| cp == target.as_bytes()) {
            return *ratio;
        }
    }
    DEFAULT_APERTURE
}
