//! Core types for the command link

use std::fmt;

/// One brace-delimited record pulled out of the byte stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub bytes: Vec<u8>,
    /// Forced out by buffer overflow before its closing brace arrived
    pub truncated: bool,
}

impl Record {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            truncated: false,
        }
    }

    pub fn truncated(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            truncated: true,
        }
    }

    /// Record text, with any invalid bytes replaced
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.bytes))
    }
}

/// Which form a speech record was recognized as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// `{"message":[...],"expression":...,"motion":...}`
    Structured,
    /// `"display","phonetic"`
    Legacy,
    /// Nothing recognizable; the whole record is the display text
    RawText,
}

/// Text and gestures for one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechCommand {
    pub display: String,
    pub phonetic: String,
    pub expression: Option<String>,
    pub motion: Option<String>,
    pub shape: RecordShape,
}

impl SpeechCommand {
    /// Plain text with no gestures
    pub fn text(display: impl Into<String>, phonetic: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            phonetic: phonetic.into(),
            expression: None,
            motion: None,
            shape: RecordShape::Structured,
        }
    }

    /// Phonetic text, or the display text when none was given
    pub fn phonetic_or_display(&self) -> &str {
        if self.phonetic.is_empty() {
            &self.display
        } else {
            &self.phonetic
        }
    }
}

/// A parsed record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `debug_on` / `debug_off`
    DebugToggle(bool),
    /// A `command` key with a value that is not recognized
    UnknownCommand(String),
    Speech(SpeechCommand),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::DebugToggle(_) => "debug",
            Command::UnknownCommand(_) => "unknown",
            Command::Speech(_) => "speech",
        }
    }
}
