//! Clock/Deadline Gate.
//!
//! A [`Deadline`] is a fixed instant built from a local date/time in a named
//! timezone. It is normalised to UTC at construction so every comparison is
//! independent of the viewer's device locale. [`Deadline::remaining`] and
//! [`Deadline::has_reached`] are pure; polling cadence and the one-shot
//! unlock are the caller's business (see [`crate::machine`]).

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::ConfigError;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

// ---------------------------------------------------------------------------
// CountdownSnapshot
// ---------------------------------------------------------------------------

/// Remaining time until the deadline, decomposed largest unit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountdownSnapshot {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub reached: bool,
}

impl CountdownSnapshot {
    /// Snapshot shown once the deadline has passed: all zeros.
    pub const REACHED: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
        reached: true,
    };

    /// Decompose a whole number of seconds by successive floor division.
    pub fn from_total_seconds(total: u64) -> Self {
        Self {
            days: total / SECS_PER_DAY,
            hours: (total % SECS_PER_DAY) / SECS_PER_HOUR,
            minutes: (total % SECS_PER_HOUR) / SECS_PER_MINUTE,
            seconds: total % SECS_PER_MINUTE,
            reached: false,
        }
    }

    /// Short human-readable form, e.g. `"1d 1h 1m 1s"`.
    pub fn label(&self) -> String {
        if self.reached {
            return "Unlocked!".to_string();
        }
        format!(
            "{}d {}h {}m {}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }

    /// Zero-padded two-digit fields for the countdown display.
    pub fn padded(&self) -> [String; 4] {
        [self.days, self.hours, self.minutes, self.seconds].map(|v| format!("{v:02}"))
    }
}

// ---------------------------------------------------------------------------
// Deadline
// ---------------------------------------------------------------------------

/// Fixed target instant, immutable after construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deadline {
    target: DateTime<Utc>,
    timezone: Tz,
}

impl Deadline {
    /// Resolve a local wall-clock time in `timezone` to a fixed instant.
    ///
    /// An ambiguous local time (clocks falling back) resolves to the earlier
    /// of the two instants. A non-existent one (clocks springing forward) is
    /// rejected.
    #[allow(clippy::too_many_arguments)]
    pub fn in_timezone(
        timezone: &str,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self, ConfigError> {
        let tz: Tz = timezone
            .parse()
            .map_err(|_| ConfigError::UnknownTimezone(timezone.to_string()))?;
        let local = tz
            .with_ymd_and_hms(year, month, day, hour, minute, second)
            .earliest()
            .ok_or_else(|| {
                ConfigError::InvalidDeadline(format!(
                    "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02} does not exist in {timezone}"
                ))
            })?;
        Ok(Self {
            target: local.with_timezone(&Utc),
            timezone: tz,
        })
    }

    /// Build a deadline directly from a UTC instant.
    pub fn at_utc(target: DateTime<Utc>, timezone: Tz) -> Self {
        Self { target, timezone }
    }

    pub fn target_utc(&self) -> DateTime<Utc> {
        self.target
    }

    /// The target instant expressed in the deadline's own timezone.
    pub fn target_local(&self) -> DateTime<Tz> {
        self.target.with_timezone(&self.timezone)
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// True once `now` is at or past the target instant.
    pub fn has_reached(&self, now: DateTime<Utc>) -> bool {
        now >= self.target
    }

    /// Remaining time, clamped to zero once reached.
    pub fn remaining(&self, now: DateTime<Utc>) -> CountdownSnapshot {
        if self.has_reached(now) {
            return CountdownSnapshot::REACHED;
        }
        // Positive here, so truncation is a floor.
        let total = (self.target - now).num_seconds().max(0) as u64;
        CountdownSnapshot::from_total_seconds(total)
    }
}
