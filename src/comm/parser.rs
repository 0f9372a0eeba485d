//! Command interpreter
//!
//! A small recursive-descent reader for the record shapes the link carries.
//! Only four top-level keys mean anything (`command`, `message`,
//! `expression`, `motion`); every other value is skipped without being
//! interpreted. A record that names `command` or `message` is classified by
//! that key even when some other part of it is malformed. A record that
//! fits neither the keyed form nor the legacy `"display","phonetic"` pair
//! is not an error: it becomes [`RecordShape::RawText`] and the whole
//! record is spoken as-is.

use thiserror::Error;

use crate::comm::escape::unescape;
use crate::comm::types::{Command, Record, RecordShape, SpeechCommand};

/// Why a record did not parse as a keyed object or legacy pair
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected end of record")]
    UnexpectedEnd,
    #[error("expected {expected} at byte {at}")]
    Expected { expected: &'static str, at: usize },
    #[error("unterminated string starting at byte {at}")]
    UnterminatedString { at: usize },
    #[error("trailing data at byte {at}")]
    TrailingData { at: usize },
}

type ParseResult<T> = Result<T, ParseError>;

/// A `command` value, still escaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandValue<'a> {
    Name(&'a str),
    /// Not a string; the raw value text, possibly empty
    Other(&'a str),
}

/// Values collected from a keyed object, still escaped. `command` and
/// `message` are `Some` as soon as their key is seen, even when the value
/// turns out to be unusable.
#[derive(Debug, Default, PartialEq, Eq)]
struct Fields<'a> {
    command: Option<CommandValue<'a>>,
    message: Option<Vec<&'a str>>,
    expression: Option<&'a str>,
    motion: Option<&'a str>,
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        self.skip_ws();
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> ParseResult<()> {
        if self.eat(byte) {
            return Ok(());
        }
        match self.peek() {
            None => Err(ParseError::UnexpectedEnd),
            Some(_) => Err(ParseError::Expected {
                expected,
                at: self.pos,
            }),
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.pos >= self.text.len()
    }

    /// A quoted string, returned without its quotes and with escapes intact
    fn string(&mut self) -> ParseResult<&'a str> {
        self.expect(b'"', "'\"'")?;
        let start = self.pos;
        let bytes = self.text.as_bytes();
        let mut i = start;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b'"' => {
                    self.pos = i + 1;
                    return Ok(&self.text[start..i]);
                }
                _ => i += 1,
            }
        }
        Err(ParseError::UnterminatedString { at: start - 1 })
    }

    /// `[ "a", "b", ... ]`. Non-string elements are skipped.
    fn string_list(&mut self) -> ParseResult<Vec<&'a str>> {
        self.expect(b'[', "'['")?;
        let mut items = Vec::new();
        if self.eat(b']') {
            return Ok(items);
        }
        loop {
            self.skip_ws();
            if self.peek() == Some(b'"') {
                items.push(self.string()?);
            } else {
                self.skip_value()?;
            }
            if self.eat(b',') {
                // Tolerate a trailing comma
                if self.eat(b']') {
                    return Ok(items);
                }
                continue;
            }
            self.expect(b']', "',' or ']'")?;
            return Ok(items);
        }
    }

    /// Skip one value of any kind
    fn skip_value(&mut self) -> ParseResult<()> {
        self.skip_ws();
        match self.peek() {
            None => Err(ParseError::UnexpectedEnd),
            Some(b'"') => self.string().map(|_| ()),
            Some(b'{') => self.object(|s, _| s.skip_value()),
            Some(b'[') => {
                self.pos += 1;
                if self.eat(b']') {
                    return Ok(());
                }
                loop {
                    self.skip_value()?;
                    if self.eat(b',') {
                        if self.eat(b']') {
                            return Ok(());
                        }
                        continue;
                    }
                    return self.expect(b']', "',' or ']'");
                }
            }
            Some(_) => {
                let start = self.pos;
                while let Some(b) = self.peek() {
                    if matches!(b, b',' | b'}' | b']' | b' ' | b'\t' | b'\r' | b'\n') {
                        break;
                    }
                    self.pos += 1;
                }
                if self.pos == start {
                    Err(ParseError::Expected {
                        expected: "a value",
                        at: start,
                    })
                } else {
                    Ok(())
                }
            }
        }
    }

    /// `{ "key": value, ... }`, calling `on_key` with the scanner positioned
    /// at each value. The callback must consume the value.
    fn object<F>(&mut self, mut on_key: F) -> ParseResult<()>
    where
        F: FnMut(&mut Self, &'a str) -> ParseResult<()>,
    {
        self.expect(b'{', "'{'")?;
        if self.eat(b'}') {
            return Ok(());
        }
        loop {
            let key = self.string()?;
            self.expect(b':', "':'")?;
            on_key(self, key)?;
            if self.eat(b',') {
                if self.eat(b'}') {
                    return Ok(());
                }
                continue;
            }
            return self.expect(b'}', "',' or '}'");
        }
    }

    /// A string value, or `None` after skipping a value of another kind
    fn optional_string(&mut self) -> ParseResult<Option<&'a str>> {
        self.skip_ws();
        if self.peek() == Some(b'"') {
            self.string().map(Some)
        } else {
            self.skip_value().map(|_| None)
        }
    }
}

/// Read the value of one top-level key into `fields`
fn read_field<'a>(s: &mut Scanner<'a>, key: &str, fields: &mut Fields<'a>) -> ParseResult<()> {
    match key {
        "command" => {
            fields.command = Some(CommandValue::Other(""));
            s.skip_ws();
            let start = s.pos;
            let text = s.text;
            fields.command = Some(match s.optional_string()? {
                Some(name) => CommandValue::Name(name),
                None => CommandValue::Other(text[start..s.pos].trim()),
            });
        }
        "message" => {
            fields.message = Some(Vec::new());
            s.skip_ws();
            fields.message = Some(match s.peek() {
                Some(b'[') => s.string_list()?,
                Some(b'"') => vec![s.string()?],
                _ => {
                    s.skip_value()?;
                    Vec::new()
                }
            });
        }
        "expression" => fields.expression = s.optional_string()?,
        "motion" => fields.motion = s.optional_string()?,
        _ => s.skip_value()?,
    }
    Ok(())
}

/// Parse a keyed object. Fields read before an error stay in `fields`.
fn parse_fields<'a>(text: &'a str, fields: &mut Fields<'a>) -> ParseResult<()> {
    let mut scanner = Scanner::new(text);
    scanner.object(|s, key| read_field(s, key, fields))?;
    if !scanner.at_end() {
        return Err(ParseError::TrailingData { at: scanner.pos });
    }
    Ok(())
}

/// Scanner positioned at the value of the first `"key":` in `text`
fn value_after_key<'a>(text: &'a str, key: &str) -> Option<Scanner<'a>> {
    let needle = format!("\"{}\"", key);
    let mut from = 0;
    while let Some(found) = text[from..].find(&needle) {
        from += found + needle.len();
        let mut scanner = Scanner::new(text);
        scanner.pos = from;
        if scanner.eat(b':') {
            return Some(scanner);
        }
    }
    None
}

/// Look for the known keys anywhere in a record that failed to parse as a
/// whole
fn scan_fields(text: &str) -> Fields<'_> {
    let mut fields = Fields::default();
    for key in ["command", "message", "expression", "motion"] {
        if let Some(mut scanner) = value_after_key(text, key) {
            if let Err(e) = read_field(&mut scanner, key, &mut fields) {
                log::debug!("unreadable {} value: {}", key, e);
            }
        }
    }
    fields
}

fn keyed_fields(text: &str) -> Fields<'_> {
    let mut fields = Fields::default();
    if let Err(e) = parse_fields(text, &mut fields) {
        log::debug!("not a well-formed keyed record: {}", e);
        let scanned = scan_fields(text);
        fields.command = fields.command.or(scanned.command);
        fields.message = fields.message.or(scanned.message);
        fields.expression = fields.expression.or(scanned.expression);
        fields.motion = fields.motion.or(scanned.motion);
    }
    fields
}

/// `"display","phonetic"`, optionally wrapped in braces
fn parse_legacy(text: &str) -> ParseResult<(&str, &str)> {
    let mut scanner = Scanner::new(text);
    let braced = scanner.eat(b'{');
    let display = scanner.string()?;
    scanner.expect(b',', "','")?;
    let phonetic = scanner.string()?;
    if braced {
        scanner.expect(b'}', "'}'")?;
    }
    if !scanner.at_end() {
        return Err(ParseError::TrailingData { at: scanner.pos });
    }
    Ok((display, phonetic))
}

fn name(raw: Option<&str>) -> Option<String> {
    raw.map(unescape).filter(|s| !s.is_empty())
}

/// Interpret one extracted record. A record forced out before its
/// closing brace is never treated as keyed.
pub fn interpret(record: &Record) -> Command {
    classify(&record.to_text(), !record.truncated)
}

/// Interpret complete record text
pub fn interpret_text(text: &str) -> Command {
    classify(text, true)
}

fn classify(text: &str, complete: bool) -> Command {
    // Keys only count in a record that closes like an object
    if complete && text.trim_end().ends_with('}') {
        let fields = keyed_fields(text);
        match fields.command {
            Some(CommandValue::Name(command)) => {
                return match unescape(command).as_str() {
                    "debug_on" => Command::DebugToggle(true),
                    "debug_off" => Command::DebugToggle(false),
                    other => Command::UnknownCommand(other.to_string()),
                };
            }
            Some(CommandValue::Other(raw)) => return Command::UnknownCommand(raw.to_string()),
            None => {}
        }
        if let Some(message) = fields.message {
            let mut parts = message.into_iter();
            return Command::Speech(SpeechCommand {
                display: parts.next().map(unescape).unwrap_or_default(),
                phonetic: parts.next().map(unescape).unwrap_or_default(),
                expression: name(fields.expression),
                motion: name(fields.motion),
                shape: RecordShape::Structured,
            });
        }
        log::debug!("record has no command or message key");
    }

    match parse_legacy(text) {
        Ok((display, phonetic)) => Command::Speech(SpeechCommand {
            display: unescape(display),
            phonetic: unescape(phonetic),
            expression: None,
            motion: None,
            shape: RecordShape::Legacy,
        }),
        Err(_) => {
            log::debug!("using raw record text");
            Command::Speech(SpeechCommand {
                display: unescape(text),
                phonetic: String::new(),
                expression: None,
                motion: None,
                shape: RecordShape::RawText,
            })
        }
    }
}
