//! Activity timeline resolution.
//!
//! Given an immutable [`TripCalendar`] and a wall-clock instant, decide which
//! trip day is active and which event of that day is current or next. Every
//! call is a fresh, pure computation; callers re-run it on a timer.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::clock::{TimeOfDay, MINUTES_PER_DAY};
use crate::itinerary::{DayKey, EventId, TripCalendar, TripEvent};

/// Default window within which an upcoming event outranks the current one.
pub const DEFAULT_IMMINENT_WINDOW_MINUTES: i64 = 30;

/// Description carried by the end-of-trip sentinel.
pub const TRIP_COMPLETE_DESCRIPTION: &str = "All trip activities are complete";

/// The day selected for an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveDay {
    /// The selected day.
    pub key: DayKey,
    /// `true` when the date is outside the trip and the day was picked by
    /// the day-of-month fallback.
    pub is_simulated: bool,
}

/// Whether the resolved event has started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Already started.
    Current,
    /// Upcoming.
    Next,
}

/// The event selected for an instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedActivity {
    /// Day the event belongs to (the following day after a rollover).
    pub day: DayKey,
    /// Label of that day.
    pub day_label: String,
    /// Identity of the event, for highlighting.
    pub event_id: EventId,
    /// The event itself.
    pub event: TripEvent,
    /// Started or upcoming.
    pub relation: Relation,
    /// Minutes until the event starts; zero or negative once started.
    pub minutes_until: i64,
    /// Whether the active day came from the fallback rule.
    pub is_simulated: bool,
}

impl ResolvedActivity {
    /// Human-readable countdown.
    #[must_use]
    pub fn countdown(&self) -> String {
        match self.relation {
            Relation::Current => "already started".to_string(),
            Relation::Next => format_countdown(self.minutes_until),
        }
    }
}

/// Result of resolving an instant against the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    /// A current or upcoming event.
    Activity(ResolvedActivity),
    /// Every event of the trip is behind us.
    TripComplete {
        /// The active day when the trip ran out of events.
        day: DayKey,
        /// Its label.
        day_label: String,
        /// Whether the active day came from the fallback rule.
        is_simulated: bool,
        /// Always [`TRIP_COMPLETE_DESCRIPTION`].
        description: &'static str,
    },
}

impl Resolution {
    /// The resolved activity, if any.
    #[must_use]
    pub fn activity(&self) -> Option<&ResolvedActivity> {
        match self {
            Self::Activity(activity) => Some(activity),
            Self::TripComplete { .. } => None,
        }
    }

    /// Whether this is the end-of-trip sentinel.
    #[must_use]
    pub fn is_trip_complete(&self) -> bool {
        matches!(self, Self::TripComplete { .. })
    }

    /// Identity of the event to highlight.
    #[must_use]
    pub fn active_event(&self) -> Option<EventId> {
        self.activity().map(|activity| activity.event_id)
    }

    /// Whether `id` is the resolved event.
    #[must_use]
    pub fn is_active(&self, id: EventId) -> bool {
        self.active_event() == Some(id)
    }

    /// The day the banner should show.
    #[must_use]
    pub fn day(&self) -> DayKey {
        match self {
            Self::Activity(activity) => activity.day,
            Self::TripComplete { day, .. } => *day,
        }
    }

    /// Label of [`Resolution::day`].
    #[must_use]
    pub fn day_label(&self) -> &str {
        match self {
            Self::Activity(activity) => &activity.day_label,
            Self::TripComplete { day_label, .. } => day_label,
        }
    }

    /// Whether the active day came from the fallback rule.
    #[must_use]
    pub fn is_simulated(&self) -> bool {
        match self {
            Self::Activity(activity) => activity.is_simulated,
            Self::TripComplete { is_simulated, .. } => *is_simulated,
        }
    }

    /// Description of the resolved event, or the fixed sentinel text.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Activity(activity) => &activity.event.description,
            Self::TripComplete { description, .. } => description,
        }
    }

    /// Human-readable countdown.
    #[must_use]
    pub fn countdown(&self) -> String {
        match self {
            Self::Activity(activity) => activity.countdown(),
            Self::TripComplete { .. } => "trip complete".to_string(),
        }
    }
}

/// Tunables for resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverPolicy {
    /// An upcoming event within this many minutes outranks the current one.
    pub imminent_window_minutes: i64,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self {
            imminent_window_minutes: DEFAULT_IMMINENT_WINDOW_MINUTES,
        }
    }
}

/// Resolves instants against a calendar under a [`ResolverPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    policy: ResolverPolicy,
}

impl Resolver {
    /// Create a resolver with the given policy.
    #[must_use]
    pub fn new(policy: ResolverPolicy) -> Self {
        Self { policy }
    }

    /// The policy in use.
    #[must_use]
    pub fn policy(&self) -> ResolverPolicy {
        self.policy
    }

    /// Resolve the current or next activity for `now`.
    ///
    /// Priority, for the active day:
    /// 1. an upcoming event within the imminent window is reported as `Next`;
    /// 2. the day's last event is `Current` during the minute it starts;
    /// 3. once past the day's last event, roll over to the first event of the
    ///    following day, or return [`Resolution::TripComplete`] on the last
    ///    day;
    /// 4. otherwise the most recently started event is reported as `Current`;
    /// 5. otherwise (before the first event) the upcoming event is `Next`.
    #[must_use]
    pub fn resolve(&self, now: NaiveDateTime, calendar: &TripCalendar) -> Resolution {
        let active = resolve_day(now, calendar);
        let day = calendar.day(active.key);
        let now_time = TimeOfDay::from(now.time());
        let now_minutes = i64::from(now_time.minutes());

        let current = day.iter().rev().find(|(_, event)| event.time <= now_time);
        let next = day.iter().find(|(_, event)| event.time > now_time);

        let activity = |(id, event): (EventId, &TripEvent), relation, minutes_until| {
            Resolution::Activity(ResolvedActivity {
                day: id.day,
                day_label: calendar.day(id.day).label().to_string(),
                event_id: id,
                event: event.clone(),
                relation,
                minutes_until,
                is_simulated: active.is_simulated,
            })
        };

        let window = self.policy.imminent_window_minutes;

        match (current, next) {
            (_, Some(next)) if minutes_between(now_minutes, next.1) <= window => {
                trace!(day = %active.key, event = %next.0, "Imminent next event");
                let gap = minutes_between(now_minutes, next.1);
                activity(next, Relation::Next, gap)
            }
            (Some(current), None) if current.1.time == now_time => {
                trace!(day = %active.key, event = %current.0, "Last event starting now");
                activity(current, Relation::Current, 0)
            }
            (_, None) => roll_over(active.key, now_minutes, calendar).map_or_else(
                || {
                    trace!(day = %active.key, "No events left in the trip");
                    Resolution::TripComplete {
                        day: active.key,
                        day_label: day.label().to_string(),
                        is_simulated: active.is_simulated,
                        description: TRIP_COMPLETE_DESCRIPTION,
                    }
                },
                |(first, minutes_until)| {
                    trace!(event = %first.0, minutes_until, "Rolled over to a later day");
                    activity(first, Relation::Next, minutes_until)
                },
            ),
            (Some(current), Some(_)) => {
                trace!(day = %active.key, event = %current.0, "Current event");
                let elapsed = minutes_between(now_minutes, current.1);
                activity(current, Relation::Current, elapsed)
            }
            (None, Some(next)) => {
                trace!(day = %active.key, event = %next.0, "Before the first event");
                let gap = minutes_between(now_minutes, next.1);
                activity(next, Relation::Next, gap)
            }
        }
    }
}

/// First event after `from`, with the minutes until it starts. Empty days
/// are skipped, each adding a full day to the countdown.
fn roll_over(
    from: DayKey,
    now_minutes: i64,
    calendar: &TripCalendar,
) -> Option<((EventId, &TripEvent), i64)> {
    let mut remaining = i64::from(MINUTES_PER_DAY) - now_minutes;
    let mut key = from.next()?;
    loop {
        if let Some((id, event)) = calendar.day(key).first_event() {
            return Some(((id, event), remaining + i64::from(event.time.minutes())));
        }
        remaining += i64::from(MINUTES_PER_DAY);
        key = key.next()?;
    }
}

fn minutes_between(now_minutes: i64, event: &TripEvent) -> i64 {
    i64::from(event.time.minutes()) - now_minutes
}

/// Pick the active trip day for `now`.
///
/// A date matching one of the trip dates selects that day. Any other date
/// falls back to `day_of_month mod 4` and is flagged as simulated, which
/// keeps the itinerary demonstrable outside the trip window.
#[must_use]
pub fn resolve_day(now: NaiveDateTime, calendar: &TripCalendar) -> ActiveDay {
    match calendar.day_for_date(now.date()) {
        Some(key) => ActiveDay {
            key,
            is_simulated: false,
        },
        None => ActiveDay {
            key: DayKey::from_day_of_month(now.day()),
            is_simulated: true,
        },
    }
}

/// Resolve with the default policy (30-minute imminent window).
#[must_use]
pub fn resolve_activity(now: NaiveDateTime, calendar: &TripCalendar) -> Resolution {
    Resolver::default().resolve(now, calendar)
}

/// Format a signed minute count as a countdown.
///
/// Negative values read "already started"; under an hour "in N minutes";
/// otherwise "in H hours", followed by "and M minutes" when `M > 0`.
#[must_use]
pub fn format_countdown(minutes: i64) -> String {
    fn plural(n: i64, unit: &str) -> String {
        if n == 1 {
            format!("{n} {unit}")
        } else {
            format!("{n} {unit}s")
        }
    }

    if minutes < 0 {
        return "already started".to_string();
    }
    if minutes < 60 {
        return format!("in {}", plural(minutes, "minute"));
    }
    let (hours, rest) = (minutes / 60, minutes % 60);
    if rest == 0 {
        format!("in {}", plural(hours, "hour"))
    } else {
        format!("in {} and {}", plural(hours, "hour"), plural(rest, "minute"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itinerary::tests::calendar;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn activity(resolution: &Resolution) -> &ResolvedActivity {
        resolution.activity().expect("expected an activity")
    }

    fn sample() -> TripCalendar {
        calendar([
            &["09:40", "12:30"],
            &["08:30", "11:00"],
            &["09:30", "19:00"],
            &["09:00", "19:30"],
        ])
    }

    #[test]
    fn test_resolve_day_real_dates() {
        let calendar = sample();
        for (offset, key) in DayKey::ALL.into_iter().enumerate() {
            let day = 21 + u32::try_from(offset).unwrap();
            let active = resolve_day(at(day, 10, 0), &calendar);
            assert_eq!(active.key, key);
            assert!(!active.is_simulated);
        }
    }

    #[test]
    fn test_resolve_day_simulated_fallback() {
        let calendar = sample();
        let cases = [(4, DayKey::Day1), (5, DayKey::Day2), (6, DayKey::Day3), (7, DayKey::Day4)];
        for (day, key) in cases {
            let now = NaiveDate::from_ymd_opt(2026, 10, day)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap();
            let active = resolve_day(now, &calendar);
            assert_eq!(active.key, key, "day of month {day}");
            assert!(active.is_simulated);
        }
    }

    #[test]
    fn test_current_when_next_is_far() {
        let resolution = resolve_activity(at(21, 10, 0), &sample());
        let resolved = activity(&resolution);
        assert_eq!(resolved.relation, Relation::Current);
        assert_eq!(resolved.event.time.to_string(), "09:40");
        assert_eq!(resolved.minutes_until, -20);
        assert_eq!(resolved.countdown(), "already started");
        assert!(!resolved.is_simulated);
    }

    #[test]
    fn test_imminent_next_outranks_current() {
        let resolution = resolve_activity(at(21, 12, 5), &sample());
        let resolved = activity(&resolution);
        assert_eq!(resolved.relation, Relation::Next);
        assert_eq!(resolved.event.time.to_string(), "12:30");
        assert_eq!(resolved.minutes_until, 25);
        assert_eq!(resolved.countdown(), "in 25 minutes");
    }

    #[test]
    fn test_next_exactly_at_window_edge() {
        let resolution = resolve_activity(at(21, 12, 0), &sample());
        assert_eq!(activity(&resolution).relation, Relation::Next);
        assert_eq!(activity(&resolution).minutes_until, 30);

        let resolution = resolve_activity(at(21, 11, 59), &sample());
        assert_eq!(activity(&resolution).relation, Relation::Current);
        assert_eq!(activity(&resolution).minutes_until, -139);
    }

    #[test]
    fn test_boundary_counts_as_current() {
        let resolution = resolve_activity(at(21, 12, 30), &sample());
        let resolved = activity(&resolution);
        assert_eq!(resolved.relation, Relation::Current);
        assert_eq!(resolved.event.time.to_string(), "12:30");
        assert_eq!(resolved.minutes_until, 0);
        assert_eq!(resolved.countdown(), "already started");
    }

    #[test]
    fn test_first_event_start_counts_as_current() {
        let resolution = resolve_activity(at(21, 9, 40), &sample());
        let resolved = activity(&resolution);
        assert_eq!(resolved.relation, Relation::Current);
        assert_eq!(resolved.event.time.to_string(), "09:40");
        assert_eq!(resolved.minutes_until, 0);
    }

    #[test]
    fn test_last_event_of_trip_is_current_when_it_starts() {
        let resolution = resolve_activity(at(24, 19, 30), &sample());
        let resolved = activity(&resolution);
        assert_eq!(resolved.day, DayKey::Day4);
        assert_eq!(resolved.relation, Relation::Current);
        assert_eq!(resolved.event.time.to_string(), "19:30");
        assert_eq!(resolved.minutes_until, 0);

        assert!(resolve_activity(at(24, 19, 31), &sample()).is_trip_complete());
    }

    #[test]
    fn test_before_first_event_reports_full_gap() {
        let resolution = resolve_activity(at(21, 6, 0), &sample());
        let resolved = activity(&resolution);
        assert_eq!(resolved.relation, Relation::Next);
        assert_eq!(resolved.event.time.to_string(), "09:40");
        assert_eq!(resolved.minutes_until, 220);
        assert_eq!(resolved.countdown(), "in 3 hours and 40 minutes");
    }

    #[test]
    fn test_rollover_to_following_day() {
        let resolution = resolve_activity(at(23, 23, 50), &sample());
        let resolved = activity(&resolution);
        assert_eq!(resolved.day, DayKey::Day4);
        assert_eq!(resolved.day_label, "Label day4");
        assert_eq!(resolved.relation, Relation::Next);
        assert_eq!(resolved.event.time.to_string(), "09:00");
        assert_eq!(resolved.minutes_until, (1440 - 1430) + 540);
        assert_eq!(
            resolved.event_id,
            EventId {
                day: DayKey::Day4,
                index: 0
            }
        );
    }

    #[test]
    fn test_rollover_right_after_last_event() {
        let resolution = resolve_activity(at(21, 12, 31), &sample());
        let resolved = activity(&resolution);
        assert_eq!(resolved.day, DayKey::Day2);
        assert_eq!(resolved.relation, Relation::Next);
        assert_eq!(resolved.event.time.to_string(), "08:30");
        assert_eq!(resolved.minutes_until, (1440 - 751) + 510);
    }

    #[test]
    fn test_trip_complete_after_last_day() {
        let resolution = resolve_activity(at(24, 20, 0), &sample());
        assert!(resolution.is_trip_complete());
        assert_eq!(resolution.description(), TRIP_COMPLETE_DESCRIPTION);
        assert_eq!(resolution.day(), DayKey::Day4);
        assert_eq!(resolution.countdown(), "trip complete");
        assert_eq!(resolution.active_event(), None);
    }

    #[test]
    fn test_empty_day_rolls_over() {
        let calendar = calendar([&["09:00"], &[], &["10:00"], &["11:00"]]);
        let resolution = resolve_activity(at(22, 8, 0), &calendar);
        let resolved = activity(&resolution);
        assert_eq!(resolved.day, DayKey::Day3);
        assert_eq!(resolved.minutes_until, (1440 - 480) + 600);
    }

    #[test]
    fn test_rollover_skips_empty_days() {
        let calendar = calendar([&["09:00"], &[], &[], &["11:00"]]);
        let resolution = resolve_activity(at(21, 22, 0), &calendar);
        let resolved = activity(&resolution);
        assert_eq!(resolved.day, DayKey::Day4);
        assert_eq!(resolved.minutes_until, (1440 - 1320) + 1440 + 1440 + 660);
    }

    #[test]
    fn test_empty_last_day_is_trip_complete() {
        let calendar = calendar([&["09:00"], &["09:00"], &["09:00"], &[]]);
        let resolution = resolve_activity(at(24, 8, 0), &calendar);
        assert!(resolution.is_trip_complete());
    }

    #[test]
    fn test_rollover_into_empty_tail_is_trip_complete() {
        let calendar = calendar([&["09:00"], &["09:00"], &["09:00"], &[]]);
        let resolution = resolve_activity(at(23, 10, 0), &calendar);
        assert!(resolution.is_trip_complete());
        assert_eq!(resolution.day(), DayKey::Day3);
    }

    #[test]
    fn test_simulated_flag_carried_through_rollover() {
        // 6 mod 4 = 2 selects day3, whose last event is at 19:00.
        let now = NaiveDate::from_ymd_opt(2026, 10, 6)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        let resolution = resolve_activity(now, &sample());
        let resolved = activity(&resolution);
        assert_eq!(resolved.day, DayKey::Day4);
        assert!(resolved.is_simulated);
    }

    #[test]
    fn test_idempotent() {
        let calendar = sample();
        let now = at(22, 10, 45);
        assert_eq!(resolve_activity(now, &calendar), resolve_activity(now, &calendar));
    }

    #[test]
    fn test_never_empty_across_the_trip() {
        let calendar = sample();
        for day in 18..=27 {
            for minute in (0..1440).step_by(7) {
                let now = at(day, minute / 60, minute % 60);
                let resolution = resolve_activity(now, &calendar);
                if let Some(resolved) = resolution.activity() {
                    assert!(calendar.event(resolved.event_id).is_some());
                    if resolved.relation == Relation::Next {
                        assert!(resolved.minutes_until > 0);
                    } else {
                        assert!(resolved.minutes_until <= 0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_relation_never_regresses_within_a_day() {
        let calendar = calendar([&["09:40", "12:30", "15:00"], &["08:00"], &[], &[]]);
        let mut seen_current: Vec<EventId> = Vec::new();
        for minute in 0..1440 {
            let resolution = resolve_activity(at(21, minute / 60, minute % 60), &calendar);
            let Some(resolved) = resolution.activity() else {
                continue;
            };
            match resolved.relation {
                Relation::Current => {
                    if !seen_current.contains(&resolved.event_id) {
                        seen_current.push(resolved.event_id);
                    }
                }
                Relation::Next => assert!(
                    !seen_current.contains(&resolved.event_id),
                    "{} went back to NEXT",
                    resolved.event_id
                ),
            }
        }
        assert_eq!(seen_current.len(), 3);
    }

    #[test]
    fn test_custom_window() {
        let resolver = Resolver::new(ResolverPolicy {
            imminent_window_minutes: 0,
        });
        let resolution = resolver.resolve(at(21, 12, 5), &sample());
        assert_eq!(activity(&resolution).relation, Relation::Current);
        assert_eq!(resolver.policy().imminent_window_minutes, 0);
    }

    #[test]
    fn test_highlight_by_identity() {
        let json = r#"{"days": [
            {"key": "day1", "date": "2025-05-21", "label": "a", "events": [
                {"time": "09:00", "description": "Colazione in hotel"},
                {"time": "20:00", "description": "Colazione in hotel"}
            ]},
            {"key": "day2", "date": "2025-05-22", "label": "b"},
            {"key": "day3", "date": "2025-05-23", "label": "c"},
            {"key": "day4", "date": "2025-05-24", "label": "d"}
        ]}"#;
        let calendar = TripCalendar::from_json_str(json).unwrap();
        let resolution = resolve_activity(at(21, 10, 0), &calendar);
        let highlighted: Vec<EventId> = calendar
            .day(DayKey::Day1)
            .iter()
            .map(|(id, _)| id)
            .filter(|id| resolution.is_active(*id))
            .collect();
        assert_eq!(
            highlighted,
            [EventId {
                day: DayKey::Day1,
                index: 0
            }]
        );
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(-5), "already started");
        assert_eq!(format_countdown(0), "in 0 minutes");
        assert_eq!(format_countdown(1), "in 1 minute");
        assert_eq!(format_countdown(25), "in 25 minutes");
        assert_eq!(format_countdown(60), "in 1 hour");
        assert_eq!(format_countdown(120), "in 2 hours");
        assert_eq!(format_countdown(61), "in 1 hour and 1 minute");
        assert_eq!(format_countdown(150), "in 2 hours and 30 minutes");
    }

    #[test]
    fn test_resolution_serializes_with_status_tag() {
        let resolution = resolve_activity(at(21, 12, 5), &sample());
        let json = serde_json::to_value(&resolution).unwrap();
        assert_eq!(json["status"], "activity");
        assert_eq!(json["relation"], "next");
        assert_eq!(json["event"]["time"], "12:30");
        assert_eq!(json["minutes_until"], 25);

        let done = resolve_activity(at(24, 23, 0), &sample());
        let json = serde_json::to_value(&done).unwrap();
        assert_eq!(json["status"], "trip_complete");
        assert_eq!(json["day"], "day4");
        assert_eq!(json["description"], TRIP_COMPLETE_DESCRIPTION);
    }

    #[test]
    fn test_builtin_scenarios() {
        let calendar = TripCalendar::builtin().unwrap();
        // Departure flight boards at 09:40 on day 1.
        let resolution = resolve_activity(at(21, 9, 15), &calendar);
        assert_eq!(activity(&resolution).minutes_until, 25);
        assert_eq!(activity(&resolution).day_label, "Mercoledì 21 Maggio");
        // Evening flight home is the last event of the trip.
        let resolution = resolve_activity(at(24, 19, 30), &calendar);
        assert_eq!(activity(&resolution).relation, Relation::Current);
        let resolution = resolve_activity(at(24, 21, 0), &calendar);
        assert!(resolution.is_trip_complete());
    }
}
