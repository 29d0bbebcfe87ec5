//! Command-line interface for tripline.
//!
//! This module provides the CLI structure for the `tripline` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, DayCommand, NowCommand, ValidateCommand, WatchCommand};

use crate::logging::Verbosity;

/// tripline - what's happening on the trip right now
///
/// Shows the current or next activity of a four-day itinerary, prints a
/// day's schedule, and can keep the banner up to date every minute.
#[derive(Debug, Parser)]
#[command(name = "tripline")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Itinerary JSON file (overrides configuration)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub itinerary: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the current or next activity
    Now(NowCommand),

    /// Print a day's schedule with the active event highlighted
    Day(DayCommand),

    /// Keep the activity banner up to date
    Watch(WatchCommand),

    /// Check an itinerary file
    Validate(ValidateCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
