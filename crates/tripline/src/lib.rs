//! `tripline` - current and next activity for a four-day trip itinerary
//!
//! This library loads a validated [`TripCalendar`], resolves the active trip
//! day and the current or upcoming event for any wall-clock instant, and
//! renders the result for the terminal. A [`watch::Watcher`] re-runs the
//! resolution on a timer.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod itinerary;
pub mod logging;
pub mod render;
pub mod resolver;
pub mod watch;

pub use clock::{Clock, FixedClock, SystemClock, TimeOfDay};
pub use config::Config;
pub use error::{Error, Result};
pub use itinerary::{DayKey, EventId, TripCalendar, TripDay, TripEvent};
pub use logging::init_logging;
pub use resolver::{
    format_countdown, resolve_activity, resolve_day, Relation, Resolution, ResolvedActivity,
    Resolver, ResolverPolicy,
};
pub use watch::{WatchHandle, Watcher};
