//! Periodic re-resolution.
//!
//! The resolver is pure; something has to call it again as the clock moves.
//! [`Watcher`] does that on a fixed interval and publishes a [`Resolution`]
//! whenever it differs from the last one sent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::itinerary::TripCalendar;
use crate::resolver::{Resolution, Resolver};

/// Re-resolves the calendar on every tick of an interval.
pub struct Watcher<C> {
    calendar: Arc<TripCalendar>,
    clock: C,
    resolver: Resolver,
    period: Duration,
    running: Arc<AtomicBool>,
}

impl<C> std::fmt::Debug for Watcher<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("resolver", &self.resolver)
            .field("period", &self.period)
            .field("running", &self.running.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<C: Clock> Watcher<C> {
    /// Create a watcher ticking every `period`.
    #[must_use]
    pub fn new(calendar: Arc<TripCalendar>, clock: C, resolver: Resolver, period: Duration) -> Self {
        Self {
            calendar,
            clock,
            resolver,
            period,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether the loop is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Resolve once against the current clock.
    #[must_use]
    pub fn resolve_now(&self) -> Resolution {
        self.resolver.resolve(self.clock.now(), &self.calendar)
    }

    /// Run the watch loop.
    ///
    /// The first tick fires immediately and always publishes. Later ticks
    /// publish only on change. Returns when [`WatchHandle::stop`] is called
    /// or the receiver is dropped. Calling `run` on a watcher that is
    /// already running returns at once.
    pub async fn run(&self, tx: mpsc::Sender<Resolution>) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Watcher already running");
            return;
        }

        info!(period_secs = self.period.as_secs(), "Watching itinerary");

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last: Option<Resolution> = None;

        while self.running.load(Ordering::SeqCst) {
            ticker.tick().await;
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            let resolution = self.resolve_now();
            if last.as_ref() == Some(&resolution) {
                continue;
            }

            debug!(
                day = %resolution.day(),
                countdown = %resolution.countdown(),
                "Activity changed"
            );
            if tx.send(resolution.clone()).await.is_err() {
                debug!("Resolution channel closed, stopping watcher");
                break;
            }
            last = Some(resolution);
        }

        self.running.store(false, Ordering::SeqCst);
        debug!("Watcher stopped");
    }

    /// A handle that stops the loop from another task.
    #[must_use]
    pub fn stop_handle(&self) -> WatchHandle {
        WatchHandle {
            running: Arc::clone(&self.running),
        }
    }
}

/// Stops a running [`Watcher`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct WatchHandle {
    running: Arc<AtomicBool>,
}

impl WatchHandle {
    /// Ask the watcher to stop after its current tick.
    pub fn stop(&self) {
        debug!("Stopping watcher");
        self.running.store(false, Ordering::SeqCst);
    }

    /// Whether the watcher is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
