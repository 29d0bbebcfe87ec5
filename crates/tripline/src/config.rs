//! Configuration management for tripline.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::clock::MINUTES_PER_DAY;
use crate::error::{Error, Result};
use crate::itinerary::TripCalendar;
use crate::resolver::{ResolverPolicy, DEFAULT_IMMINENT_WINDOW_MINUTES};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration directory name.
const CONFIG_DIR_NAME: &str = "tripline";

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "TRIPLINE_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `TRIPLINE_`, sections split on `__`)
/// 2. TOML config file at `~/.config/tripline/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Itinerary source.
    pub itinerary: ItineraryConfig,
    /// Resolver tunables.
    pub resolver: ResolverConfig,
    /// Watch loop settings.
    pub watch: WatchConfig,
}

/// Where the itinerary comes from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItineraryConfig {
    /// Path to an itinerary JSON file.
    /// Defaults to the itinerary compiled into the binary.
    pub path: Option<PathBuf>,
}

/// Resolver-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// An upcoming event this close (in minutes) outranks the current one.
    pub imminent_window_minutes: i64,
}

/// Watch loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Seconds between re-resolutions.
    pub refresh_interval_secs: u64,
    /// Capacity of the channel carrying changed resolutions.
    pub channel_capacity: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            imminent_window_minutes: DEFAULT_IMMINENT_WINDOW_MINUTES,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 60,
            channel_capacity: 16,
        }
    }
}

impl WatchConfig {
    /// Get the refresh interval as a Duration.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let window = self.resolver.imminent_window_minutes;
        if !(0..i64::from(MINUTES_PER_DAY)).contains(&window) {
            return Err(Error::config_validation(format!(
                "imminent_window_minutes ({window}) must be between 0 and {}",
                MINUTES_PER_DAY - 1
            )));
        }

        if self.watch.refresh_interval_secs == 0 {
            return Err(Error::config_validation(
                "refresh_interval_secs must be greater than 0",
            ));
        }

        if self.watch.channel_capacity == 0 {
            return Err(Error::config_validation(
                "channel_capacity must be greater than 0",
            ));
        }

        Ok(())
    }

    /// The resolver policy described by this configuration.
    #[must_use]
    pub fn resolver_policy(&self) -> ResolverPolicy {
        ResolverPolicy {
            imminent_window_minutes: self.resolver.imminent_window_minutes,
        }
    }

    /// Load the configured itinerary, or the builtin one when no path is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the itinerary cannot be read or fails validation.
    pub fn load_calendar(&self) -> Result<TripCalendar> {
        match &self.itinerary.path {
            Some(path) => TripCalendar::from_file(path),
            None => TripCalendar::builtin(),
        }
    }
}
