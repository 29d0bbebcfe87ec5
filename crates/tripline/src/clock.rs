//! Wall-clock primitives.
//!
//! [`TimeOfDay`] is the parsed form of an itinerary `HH:MM` string, stored as
//! minutes since midnight. [`Clock`] abstracts "now" so the watcher can be
//! driven by a fixed instant in tests.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Number of minutes in a day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A time of day with minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

/// Why a `HH:MM` string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeParseError {
    /// No `:` separator, or more than one.
    #[error("expected HH:MM")]
    Format,
    /// The hour part is not a number in `0..=23`.
    #[error("hour out of range")]
    Hour,
    /// The minute part is not a two-digit number in `00..=59`.
    #[error("minute out of range")]
    Minute,
}

impl TimeOfDay {
    /// Minutes since midnight.
    #[must_use]
    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Hour component.
    #[must_use]
    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    /// Minute component.
    #[must_use]
    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl From<NaiveTime> for TimeOfDay {
    // Seconds are dropped; the itinerary is minute-grained.
    #[allow(clippy::cast_possible_truncation)]
    fn from(time: NaiveTime) -> Self {
        Self((time.hour() * 60 + time.minute()) as u16)
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = s.split_once(':').ok_or(TimeParseError::Format)?;
        if minute.contains(':') {
            return Err(TimeParseError::Format);
        }

        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

        if !all_digits(hour) || hour.len() > 2 {
            return Err(TimeParseError::Hour);
        }
        if !all_digits(minute) || minute.len() != 2 {
            return Err(TimeParseError::Minute);
        }

        let hour: u16 = hour.parse().map_err(|_| TimeParseError::Hour)?;
        let minute: u16 = minute.parse().map_err(|_| TimeParseError::Minute)?;
        if hour >= 24 {
            return Err(TimeParseError::Hour);
        }
        if minute >= 60 {
            return Err(TimeParseError::Minute);
        }
        Ok(Self(hour * 60 + minute))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Source of the current wall-clock instant.
pub trait Clock: Send + Sync {
    /// The current local date and time.
    fn now(&self) -> NaiveDateTime;
}

/// The host's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Parse a user-supplied instant (`YYYY-MM-DD HH:MM`, seconds optional,
/// `T` accepted as separator).
///
/// # Errors
///
/// Returns [`crate::Error::InvalidInstant`] if no supported format matches.
pub fn parse_instant(value: &str) -> crate::Result<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
    ];
    let trimmed = value.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| crate::Error::InvalidInstant {
            value: value.to_string(),
        })
}
