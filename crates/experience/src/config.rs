//! Data-driven experience parameters.
//!
//! Every timing constant the state machine, watcher and celebration rely on
//! lives in [`ExperienceConfig`]. The binary loads it from JSON at startup;
//! tests build it in code. Missing fields fall back to the defaults below.

use std::path::Path;
use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::deadline::Deadline;
use crate::error::ConfigError;

/// Local date/time plus IANA timezone name of the unlock instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadlineConfig {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub timezone: String,
}

impl Default for DeadlineConfig {
    fn default() -> Self {
        Self {
            year: 2026,
            month: 2,
            day: 14,
            hour: 0,
            minute: 0,
            second: 0,
            timezone: "Australia/Sydney".to_string(),
        }
    }
}

impl DeadlineConfig {
    pub fn resolve(&self) -> Result<Deadline, ConfigError> {
        Deadline::in_timezone(
            &self.timezone,
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        )
    }
}

/// Tunables for the whole experience.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceConfig {
    pub deadline: DeadlineConfig,
    /// Countdown polling cadence while locked.
    pub poll_interval_ms: u64,
    /// Playback position (seconds) at which the letter retracts.
    pub retract_at_secs: f64,
    /// Keep the montage running for its audio after retraction.
    pub keep_audio_playing: bool,
    pub media_timeout_ms: u64,
    pub media_source: String,
    pub popup_hide_ms: u64,
    pub envelope_fade_delay_ms: u64,
    pub final_commit_delay_ms: u64,
    pub audio_fade_ms: u64,
    /// Explicit reduced-motion override. `None` defers to the platform.
    pub reduced_motion: Option<bool>,
    /// Particle RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        Self {
            deadline: DeadlineConfig::default(),
            poll_interval_ms: 1000,
            retract_at_secs: 85.0,
            keep_audio_playing: true,
            media_timeout_ms: 10_000,
            media_source: "video/montage.ogg".to_string(),
            popup_hide_ms: 2000,
            envelope_fade_delay_ms: 500,
            final_commit_delay_ms: 800,
            audio_fade_ms: 250,
            reduced_motion: None,
            seed: None,
        }
    }
}

impl ExperienceConfig {
    /// Read and validate a JSON config file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges and resolve the deadline once so bad configs fail early.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.deadline.resolve()?;
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        let threshold = self.retract_at_secs;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "retract_at_secs",
                reason: format!("must be a non-negative number, got {threshold}"),
            });
        }
        if self.media_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "media_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.media_source.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "media_source",
                reason: "must name an asset".to_string(),
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn media_timeout(&self) -> Duration {
        Duration::from_millis(self.media_timeout_ms)
    }

    pub fn popup_hide(&self) -> Duration {
        Duration::from_millis(self.popup_hide_ms)
    }

    pub fn envelope_fade_delay(&self) -> Duration {
        Duration::from_millis(self.envelope_fade_delay_ms)
    }

    pub fn final_commit_delay(&self) -> Duration {
        Duration::from_millis(self.final_commit_delay_ms)
    }

    pub fn audio_fade(&self) -> Duration {
        Duration::from_millis(self.audio_fade_ms)
    }

    /// Combine the config override with the platform preference.
    pub fn motion(&self, platform_prefers_reduced: bool) -> MotionPreference {
        if self.reduced_motion.unwrap_or(platform_prefers_reduced) {
            MotionPreference::Reduced
        } else {
            MotionPreference::Full
        }
    }
}

/// Platform-reported animation preference, read once at startup.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionPreference {
    #[default]
    Full,
    Reduced,
}

impl MotionPreference {
    pub fn is_reduced(self) -> bool {
        self == MotionPreference::Reduced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExperienceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.media_timeout(), Duration::from_secs(10));
        assert_eq!(config.retract_at_secs, 85.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ExperienceConfig::from_json(r#"{ "retract_at_secs": 12.5 }"#)
            .expect("partial config should parse");
        assert_eq!(config.retract_at_secs, 12.5);
        assert_eq!(config.popup_hide_ms, 2000);
        assert_eq!(config.deadline.timezone, "Australia/Sydney");
    }

    #[test]
    fn test_unknown_timezone_fails_validation() {
        let err = ExperienceConfig::from_json(r#"{ "deadline": { "timezone": "Nowhere/Land" } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTimezone(_)), "got: {err}");
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let err = ExperienceConfig::from_json(r#"{ "retract_at_secs": -1.0 }"#).unwrap_err();
        let ConfigError::InvalidValue { field, .. } = &err else {
            panic!("got: {err}");
        };
        assert_eq!(*field, "retract_at_secs");
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = ExperienceConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ExperienceConfig::load_from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_motion_override_beats_platform() {
        let mut config = ExperienceConfig::default();
        assert_eq!(config.motion(true), MotionPreference::Reduced);
        assert_eq!(config.motion(false), MotionPreference::Full);
        config.reduced_motion = Some(false);
        assert_eq!(config.motion(true), MotionPreference::Full);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let shipped = ExperienceConfig::from_json(include_str!("../../../assets/greeting.json"))
            .expect("assets/greeting.json should parse");
        assert_eq!(shipped, ExperienceConfig::default());
    }
}
