//! `tripline` - CLI for the trip itinerary
//!
//! Prints the current or next activity, day schedules, and a live banner.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDateTime;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info};

use tripline::cli::{
    Cli, Command, ConfigCommand, DayCommand, NowCommand, ValidateCommand, WatchCommand,
};
use tripline::clock::parse_instant;
use tripline::{
    init_logging, render, Clock, Config, DayKey, Resolution, Resolver, SystemClock, TripCalendar,
    Watcher,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let mut config = Config::load_from(cli.config.clone())?;
    if let Some(path) = cli.itinerary {
        config.itinerary.path = Some(path);
    }

    match cli.command {
        Command::Now(cmd) => handle_now(&config, &cmd),
        Command::Day(cmd) => handle_day(&config, &cmd),
        Command::Watch(cmd) => handle_watch(&config, &cmd),
        Command::Validate(cmd) => handle_validate(&config, cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn load_calendar(config: &Config) -> anyhow::Result<TripCalendar> {
    let source = config
        .itinerary
        .path
        .as_ref()
        .map_or_else(|| "builtin itinerary".to_string(), |p| p.display().to_string());
    debug!(%source, "Loading itinerary");
    config
        .load_calendar()
        .with_context(|| format!("failed to load {source}"))
}

fn instant(at: Option<&str>) -> anyhow::Result<NaiveDateTime> {
    match at {
        Some(value) => Ok(parse_instant(value)?),
        None => Ok(SystemClock.now()),
    }
}

fn handle_now(config: &Config, cmd: &NowCommand) -> anyhow::Result<()> {
    let calendar = load_calendar(config)?;
    let now = instant(cmd.at.as_deref())?;
    let resolution = Resolver::new(config.resolver_policy()).resolve(now, &calendar);

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        println!("{}", render::banner(&resolution, now));
    }
    Ok(())
}

fn handle_day(config: &Config, cmd: &DayCommand) -> anyhow::Result<()> {
    let calendar = load_calendar(config)?;
    let now = instant(cmd.at.as_deref())?;
    let resolution = Resolver::new(config.resolver_policy()).resolve(now, &calendar);

    println!("{}", day_view(&calendar, &resolution, cmd.day));
    Ok(())
}

fn day_view(calendar: &TripCalendar, resolution: &Resolution, day: Option<DayKey>) -> String {
    // After a rollover the resolved event lives on a later day.
    let key = day.unwrap_or_else(|| resolution.day());
    render::day_schedule(calendar.day(key), resolution.active_event())
}

fn handle_watch(config: &Config, cmd: &WatchCommand) -> anyhow::Result<()> {
    let calendar = Arc::new(load_calendar(config)?);
    let period = cmd
        .interval_secs
        .map_or_else(|| config.watch.refresh_interval(), Duration::from_secs);
    let resolver = Resolver::new(config.resolver_policy());
    let capacity = config.watch.channel_capacity;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(async move {
        let watcher = Arc::new(Watcher::new(calendar, SystemClock, resolver, period));
        let handle = watcher.stop_handle();
        let (tx, mut rx) = mpsc::channel(capacity);

        let runner = Arc::clone(&watcher);
        let task = tokio::spawn(async move { runner.run(tx).await });

        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Some(resolution) => println!("{}\n", render::banner(&resolution, SystemClock.now())),
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted");
                    break;
                }
            }
        }

        // The loop only notices the flag on its next tick.
        handle.stop();
        task.abort();
        let _ = task.await;
        Ok(())
    })
}

fn handle_validate(config: &Config, cmd: ValidateCommand) -> anyhow::Result<()> {
    let calendar = match cmd.file {
        Some(path) => TripCalendar::from_file(&path)
            .with_context(|| format!("invalid itinerary {}", path.display()))?,
        None => load_calendar(config)?,
    };

    let events: usize = calendar.days().iter().map(|day| day.events().len()).sum();
    println!("Itinerary is valid.");
    if let Some(title) = calendar.title() {
        println!("  Title:   {title}");
    }
    println!("  Events:  {events}");
    for day in calendar.days() {
        println!(
            "  {}:    {} ({}, {} events)",
            day.key(),
            day.label(),
            day.date(),
            day.events().len()
        );
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Itinerary]");
                match &config.itinerary.path {
                    Some(path) => println!("  Path:               {}", path.display()),
                    None => println!("  Path:               (builtin)"),
                }
                println!();
                println!("[Resolver]");
                println!(
                    "  Imminent window:    {} min",
                    config.resolver.imminent_window_minutes
                );
                println!();
                println!("[Watch]");
                println!(
                    "  Refresh interval:   {} s",
                    config.watch.refresh_interval_secs
                );
                println!("  Channel capacity:   {}", config.watch.channel_capacity);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            if let Err(e) = Config::load_from(Some(path)) {
                anyhow::bail!("configuration error: {e}");
            }
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
