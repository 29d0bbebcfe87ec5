//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::itinerary::DayKey;

/// `now` command arguments.
#[derive(Debug, Args)]
pub struct NowCommand {
    /// Resolve at this instant instead of the system clock ("YYYY-MM-DD HH:MM")
    #[arg(long, value_name = "INSTANT")]
    pub at: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// `day` command arguments.
#[derive(Debug, Args)]
pub struct DayCommand {
    /// Day to print (defaults to the active day)
    #[arg(value_enum)]
    pub day: Option<DayKey>,

    /// Highlight the activity for this instant ("YYYY-MM-DD HH:MM")
    #[arg(long, value_name = "INSTANT")]
    pub at: Option<String>,
}

/// `watch` command arguments.
#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Seconds between refreshes (overrides configuration)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: Option<u64>,
}

/// `validate` command arguments.
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Itinerary file to check (defaults to the configured one)
    pub file: Option<PathBuf>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
