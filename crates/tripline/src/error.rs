//! Error types for tripline.
//!
//! This module defines all error types used throughout the tripline crate.
//! Itinerary errors are raised once, while a calendar is being loaded; the
//! resolver itself never fails.

use std::path::PathBuf;
use thiserror::Error;

use crate::itinerary::DayKey;

/// The main error type for tripline operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Itinerary Errors ===
    /// Failed to read an itinerary file.
    #[error("failed to read itinerary at {path}: {source}")]
    ItineraryRead {
        /// Path to the itinerary file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The itinerary document is not valid JSON or has the wrong shape.
    #[error("failed to parse itinerary: {0}")]
    ItineraryParse(#[source] serde_json::Error),

    /// An event time is not a valid `HH:MM` value.
    #[error("invalid time '{value}' for event #{position} of {day}: {reason}")]
    InvalidTime {
        /// Day the event belongs to.
        day: DayKey,
        /// Position of the event in the document (1-based).
        position: usize,
        /// The offending text.
        value: String,
        /// Why the text was rejected.
        reason: String,
    },

    /// The same day key appears more than once.
    #[error("day {0} is defined more than once")]
    DuplicateDay(DayKey),

    /// A required day key is missing.
    #[error("day {0} is missing from the itinerary")]
    MissingDay(DayKey),

    /// Two days share the same calendar date.
    #[error("{first} and {second} share the date {date}")]
    DuplicateDate {
        /// The first day using the date.
        first: DayKey,
        /// The second day using the date.
        second: DayKey,
        /// The shared date.
        date: chrono::NaiveDate,
    },

    /// A day has an empty display label.
    #[error("day {0} has an empty label")]
    EmptyLabel(DayKey),

    /// A user-supplied instant could not be parsed.
    #[error("invalid instant '{value}': expected YYYY-MM-DD HH:MM")]
    InvalidInstant {
        /// The offending text.
        value: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },
}

/// A specialized Result type for tripline operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }
}
