//! Plain-text rendering for the terminal.

use chrono::NaiveDateTime;

use crate::clock::TimeOfDay;
use crate::itinerary::{EventId, TripDay, TripEvent};
use crate::resolver::{Relation, Resolution};

/// Marker shown on the sentinel banner.
const FINISH_FLAG: &str = "🏁";

/// Render the "current / next activity" banner.
#[must_use]
pub fn banner(resolution: &Resolution, now: NaiveDateTime) -> String {
    let mut heading = resolution.day_label().to_string();
    if resolution.is_simulated() {
        heading.push_str(" (simulated)");
    }

    let clock = TimeOfDay::from(now.time());
    let (tag, body) = match resolution {
        Resolution::Activity(activity) => {
            let tag = match activity.relation {
                Relation::Current => "NOW",
                Relation::Next => "NEXT",
            };
            (tag, event_line(&activity.event))
        }
        Resolution::TripComplete { .. } => {
            ("DONE", format!("{FINISH_FLAG} {}", resolution.description()))
        }
    };

    [
        format!("{heading}  [{clock}]"),
        format!("{tag} · {}", resolution.countdown()),
        body,
    ]
    .join("\n")
}

/// Render a day's schedule, marking the active event with `>`.
#[must_use]
pub fn day_schedule(day: &TripDay, active: Option<EventId>) -> String {
    let mut header = format!("{} · {} ({})", day.key(), day.label(), day.date());
    if let Some(title) = day.title() {
        header.push_str(" - ");
        header.push_str(title);
    }

    let mut lines = vec![header];
    if day.is_empty() {
        lines.push("  (no events)".to_string());
    }
    for (id, event) in day.iter() {
        let marker = if active == Some(id) { '>' } else { ' ' };
        let mut line = format!("{marker} {}", event_line(event));
        if let Some(voucher) = &event.voucher {
            line.push_str(&format!("  [voucher: {}]", voucher.text));
        }
        if let Some(transport) = &event.transportation {
            line.push_str(&format!("  [{}: {}]", transport.kind, transport.duration));
        }
        lines.push(line);
    }
    lines.join("\n")
}

fn event_line(event: &TripEvent) -> String {
    if event.emoji.is_empty() {
        format!("{} - {}", event.time, event.description)
    } else {
        format!("{} {} - {}", event.time, event.emoji, event.description)
    }
}
