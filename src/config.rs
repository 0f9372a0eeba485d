use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::comm::FramerLimits;
use crate::logging::LogLevel;
use crate::propfile::load_properties;
use crate::speech::Timing;
use crate::time::Millis;

/// Smallest RawBuffer that still holds a short record
pub const MIN_BUFFER_SIZE: usize = 16;

/// Invalid configuration values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key}: invalid value {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("{key} must be at least {min}")]
    TooSmall { key: &'static str, min: u64 },
    #[error("volume {0} out of range (0-100)")]
    VolumeOutOfRange(i64),
}

/// Application options that can be set via CLI or config file
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    // Commandline-only options
    pub log_file: Option<PathBuf>,
    pub log_level: LogLevel,
    pub input: Option<PathBuf>,

    // Commandline and config file options
    pub char_interval_ms: Millis,
    pub segment_pause_ms: Millis,
    pub mouth_close_delay_ms: Millis,
    pub clear_delay_ms: Millis,
    pub beep_duration_ms: Millis,
    pub beep_frequency: u32,
    pub beep_volume: u8,
    pub max_display_chars: usize,
    pub max_segments: usize,
    pub max_buffer_size: usize,
    pub dedup_cooldown_ms: Millis,
    pub debug: bool,
    pub tick_ms: Millis,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            log_file: None,
            log_level: LogLevel::Info,
            input: None,
            char_interval_ms: 100,
            segment_pause_ms: 500,
            mouth_close_delay_ms: 100,
            clear_delay_ms: 2000,
            beep_duration_ms: 50,
            beep_frequency: 1000,
            beep_volume: 5,
            max_display_chars: 9,
            max_segments: 20,
            max_buffer_size: 4096,
            dedup_cooldown_ms: 3000,
            debug: true,
            tick_ms: 20,
        }
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Parse a boolean the way config files tend to spell them
pub fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Parse a volume value (0-100)
pub fn parse_volume(value: &str) -> Result<u8, ConfigError> {
    let vol: i64 = parse_num("beep_volume", value)?;
    if !(0..=100).contains(&vol) {
        return Err(ConfigError::VolumeOutOfRange(vol));
    }
    Ok(vol as u8)
}

impl Options {
    /// Set one option from its config-file key. Unknown keys are reported
    /// and ignored; returns whether the key was recognized.
    pub fn apply_property(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "char_interval_ms" => self.char_interval_ms = parse_num(key, value)?,
            "segment_pause_ms" => self.segment_pause_ms = parse_num(key, value)?,
            "mouth_close_delay_ms" => self.mouth_close_delay_ms = parse_num(key, value)?,
            "clear_delay_ms" => self.clear_delay_ms = parse_num(key, value)?,
            "beep_duration_ms" => self.beep_duration_ms = parse_num(key, value)?,
            "beep_frequency" => self.beep_frequency = parse_num(key, value)?,
            "beep_volume" => self.beep_volume = parse_volume(value)?,
            "max_display_chars" => self.max_display_chars = parse_num(key, value)?,
            "max_segments" => self.max_segments = parse_num(key, value)?,
            "max_buffer_size" => self.max_buffer_size = parse_num(key, value)?,
            "dedup_cooldown_ms" => self.dedup_cooldown_ms = parse_num(key, value)?,
            "debug" => self.debug = parse_bool(key, value)?,
            "tick_ms" => self.tick_ms = parse_num(key, value)?,
            _ => {
                log::warn!("unknown config key ignored: {}", key);
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let nonzero: [(&'static str, u64); 8] = [
            ("char_interval_ms", self.char_interval_ms),
            ("segment_pause_ms", self.segment_pause_ms),
            ("mouth_close_delay_ms", self.mouth_close_delay_ms),
            ("clear_delay_ms", self.clear_delay_ms),
            ("beep_duration_ms", self.beep_duration_ms),
            ("max_display_chars", self.max_display_chars as u64),
            ("max_segments", self.max_segments as u64),
            ("tick_ms", self.tick_ms),
        ];
        for (key, value) in nonzero {
            if value == 0 {
                return Err(ConfigError::TooSmall { key, min: 1 });
            }
        }
        if self.max_buffer_size < MIN_BUFFER_SIZE {
            return Err(ConfigError::TooSmall {
                key: "max_buffer_size",
                min: MIN_BUFFER_SIZE as u64,
            });
        }
        if self.beep_volume > 100 {
            return Err(ConfigError::VolumeOutOfRange(i64::from(self.beep_volume)));
        }
        Ok(())
    }

    pub fn timing(&self) -> Timing {
        Timing {
            char_interval_ms: self.char_interval_ms,
            segment_pause_ms: self.segment_pause_ms,
            mouth_close_delay_ms: self.mouth_close_delay_ms,
            clear_delay_ms: self.clear_delay_ms,
            beep_duration_ms: self.beep_duration_ms,
            beep_frequency: self.beep_frequency,
            max_display_chars: self.max_display_chars,
            max_segments: self.max_segments,
        }
    }

    pub fn framer_limits(&self) -> FramerLimits {
        FramerLimits {
            max_buffer_size: self.max_buffer_size,
            dedup_cooldown_ms: self.dedup_cooldown_ms,
        }
    }
}

/// Load options from a config file, or defaults when there is none
pub fn load_config(path: Option<&Path>) -> Result<Options> {
    let mut opts = Options::default();
    let Some(path) = path else {
        return Ok(opts);
    };

    let props = load_properties(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    for prop in props {
        opts.apply_property(&prop.key, &prop.value)
            .with_context(|| format!("{}:{}", path.display(), prop.line))?;
    }
    opts.validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    Ok(opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn test_options_default() {
        let opts = Options::default();
        assert_eq!(opts.timing(), Timing::default());
        assert_eq!(opts.framer_limits(), FramerLimits::default());
        assert!(opts.debug);
        assert_eq!(opts.beep_volume, 5);
        assert!(opts.validate().is_ok());
    }

    #[rstest]
    #[case("char_interval_ms", "80")]
    #[case("segment_pause_ms", "250")]
    #[case("beep_frequency", "1200")]
    #[case("beep_volume", "40")]
    #[case("max_display_chars", "12")]
    #[case("debug", "off")]
    fn test_apply_known_keys(#[case] key: &str, #[case] value: &str) {
        let mut opts = Options::default();
        assert_eq!(opts.apply_property(key, value), Ok(true));
        assert_ne!(opts, Options::default());
    }

    #[test]
    fn test_apply_unknown_key() {
        let mut opts = Options::default();
        assert_eq!(opts.apply_property("resolution", "640x480"), Ok(false));
        assert_eq!(opts, Options::default());
    }

    #[test]
    fn test_apply_bad_value() {
        let mut opts = Options::default();
        assert_eq!(
            opts.apply_property("char_interval_ms", "fast"),
            Err(ConfigError::InvalidValue {
                key: "char_interval_ms".to_string(),
                value: "fast".to_string()
            })
        );
    }

    #[test]
    fn test_parse_volume() {
        assert_eq!(parse_volume("0"), Ok(0));
        assert_eq!(parse_volume("100"), Ok(100));
        assert_eq!(parse_volume("150"), Err(ConfigError::VolumeOutOfRange(150)));
        assert_eq!(parse_volume("-10"), Err(ConfigError::VolumeOutOfRange(-10)));
        assert!(parse_volume("loud").is_err());
    }

    #[test]
    fn test_validate() {
        let opts = Options {
            char_interval_ms: 0,
            ..Options::default()
        };
        assert_eq!(
            opts.validate(),
            Err(ConfigError::TooSmall {
                key: "char_interval_ms",
                min: 1
            })
        );

        let opts = Options {
            max_buffer_size: 8,
            ..Options::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_load_config_defaults_without_path() {
        assert_eq!(load_config(None).unwrap(), Options::default());
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# avatar settings").unwrap();
        writeln!(file, "char_interval_ms = 80").unwrap();
        writeln!(file, "debug = false").unwrap();
        writeln!(file, "unknown_key = 1").unwrap();
        let opts = load_config(Some(file.path())).unwrap();
        assert_eq!(opts.char_interval_ms, 80);
        assert!(!opts.debug);
    }

    #[test]
    fn test_load_config_rejects_bad_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tick_ms = 0").unwrap();
        assert!(load_config(Some(file.path())).is_err());

        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("missing.cfg"))).is_err());
    }
}
