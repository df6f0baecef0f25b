// ---------------------------------------------------------------------------
// ConfigError: typed errors for loading and validating ExperienceConfig
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors that can occur while loading or validating the experience
/// configuration.
///
/// None of these are fatal to the binary: callers log the error and fall
/// back to [`ExperienceConfig::default`](crate::config::ExperienceConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading the config file.
    Io(std::io::Error),
    /// The file is not valid JSON for the config schema.
    Parse(String),
    /// The deadline names a timezone the tz database does not know.
    UnknownTimezone(String),
    /// The deadline date/time does not exist (out of range, or skipped by a
    /// daylight-saving jump in the named zone).
    InvalidDeadline(String),
    /// A numeric field is out of its allowed range.
    InvalidValue { field: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {e}"),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {msg}"),
            ConfigError::UnknownTimezone(name) => write!(f, "Unknown timezone: {name}"),
            ConfigError::InvalidDeadline(msg) => write!(f, "Invalid deadline: {msg}"),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display_io() {
        let err = ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        let msg = format!("{err}");
        assert!(msg.contains("I/O error"), "got: {msg}");
        assert!(msg.contains("file not found"), "got: {msg}");
    }

    #[test]
    fn test_config_error_display_timezone() {
        let err = ConfigError::UnknownTimezone("Mars/Olympus".to_string());
        let msg = format!("{err}");
        assert!(msg.contains("Mars/Olympus"), "got: {msg}");
    }

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "retract_at_secs",
            reason: "must be positive".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("retract_at_secs"), "got: {msg}");
        assert!(msg.contains("must be positive"), "got: {msg}");
    }

    #[test]
    fn test_config_error_from_serde_json() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: ConfigError = json_err.into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_config_error_source_only_for_io() {
        let io = ConfigError::Io(std::io::Error::new(std::io::ErrorKind::Other, "x"));
        assert!(std::error::Error::source(&io).is_some());
        let parse = ConfigError::Parse("bad".to_string());
        assert!(std::error::Error::source(&parse).is_none());
    }
}
