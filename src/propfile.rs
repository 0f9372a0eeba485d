//! `key = value` property files
//!
//! One property per line. `#` starts a comment that runs to the end of the
//! line, surrounding whitespace is trimmed, and key case is preserved. A
//! line without `=` is reported and skipped.

use std::fs;
use std::path::Path;

/// One `key = value` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub key: String,
    pub value: String,
    /// 1-based source line
    pub line: usize,
}

/// Parse property text, calling `handler` with `(key, value, line)` for
/// each entry in file order.
pub fn parse_properties(data: &str, handler: &mut dyn FnMut(&str, &str, usize)) {
    for (index, raw) in data.lines().enumerate() {
        let line_no = index + 1;
        let content = match raw.find('#') {
            Some(hash) => &raw[..hash],
            None => raw,
        };
        let content = content.trim();
        if content.is_empty() {
            continue;
        }

        let Some((key, value)) = content.split_once('=') else {
            log::warn!("line {}: key without value: {}", line_no, content);
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            log::warn!("line {}: value without key", line_no);
            continue;
        }
        handler(key, value.trim(), line_no);
    }
}

/// Collect every entry of `data`
pub fn properties(data: &str) -> Vec<Property> {
    let mut out = Vec::new();
    parse_properties(data, &mut |key, value, line| {
        out.push(Property {
            key: key.to_string(),
            value: value.to_string(),
            line,
        })
    });
    out
}

/// Read and parse a property file
pub fn load_properties<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<Property>> {
    let data = fs::read_to_string(path)?;
    Ok(properties(&data))
}
