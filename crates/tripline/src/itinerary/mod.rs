//! Itinerary data model.
//!
//! A [`TripCalendar`] holds exactly four [`TripDay`]s, each tied to a real
//! calendar date and carrying its events sorted by start time. Calendars are
//! built once from a JSON document and validated as a whole: any malformed
//! entry rejects the entire itinerary.

pub mod builtin;

use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::TimeOfDay;
use crate::error::{Error, Result};

/// One of the four fixed trip days.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DayKey {
    /// First day.
    Day1,
    /// Second day.
    Day2,
    /// Third day.
    Day3,
    /// Fourth and last day.
    Day4,
}

impl DayKey {
    /// All day keys in trip order.
    pub const ALL: [Self; 4] = [Self::Day1, Self::Day2, Self::Day3, Self::Day4];

    /// Zero-based position in the trip.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Day1 => 0,
            Self::Day2 => 1,
            Self::Day3 => 2,
            Self::Day4 => 3,
        }
    }

    /// The following day, or `None` for the last one.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Day1 => Some(Self::Day2),
            Self::Day2 => Some(Self::Day3),
            Self::Day3 => Some(Self::Day4),
            Self::Day4 => None,
        }
    }

    /// Whether this is the final day of the trip.
    #[must_use]
    pub fn is_last(self) -> bool {
        self.next().is_none()
    }

    /// Pick a day from a day of the month (`d mod 4`).
    ///
    /// Used when "today" is outside the trip so the itinerary can still be
    /// shown: `0 → day1`, `1 → day2`, `2 → day3`, anything else `→ day4`.
    #[must_use]
    pub fn from_day_of_month(day: u32) -> Self {
        match day % 4 {
            0 => Self::Day1,
            1 => Self::Day2,
            2 => Self::Day3,
            _ => Self::Day4,
        }
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day{}", self.index() + 1)
    }
}

/// Stable identity of an event: its day and its position in that day's
/// time-sorted event list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    /// Day the event belongs to.
    pub day: DayKey,
    /// Index in the day's sorted events.
    pub index: usize,
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.day, self.index)
    }
}

/// Voucher attached to an event. Display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    /// Button text.
    pub text: String,
    /// Link to the voucher document.
    pub url: String,
    /// Optional scanned image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Heading shown above the voucher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Free-form booking details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Where to meet the guide or operator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_point: Option<String>,
    /// Recommended arrival, free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
}

/// How a transfer is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Underground.
    Metro,
    /// On foot.
    Walk,
    /// City bus.
    Bus,
    /// Airport or hotel shuttle.
    Shuttle,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metro => write!(f, "metro"),
            Self::Walk => write!(f, "walk"),
            Self::Bus => write!(f, "bus"),
            Self::Shuttle => write!(f, "shuttle"),
        }
    }
}

/// Transfer instructions attached to an event. Display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transportation {
    /// Mode of transport.
    #[serde(rename = "type")]
    pub kind: TransportKind,
    /// Route description.
    pub details: String,
    /// Expected duration, free text.
    pub duration: String,
    /// Where the transfer ends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

/// A scheduled itinerary item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripEvent {
    /// Start time.
    pub time: TimeOfDay,
    /// Icon shown next to the event.
    pub emoji: String,
    /// What happens.
    pub description: String,
    /// Booking voucher, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher: Option<Voucher>,
    /// Transfer instructions, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transportation: Option<Transportation>,
}

/// One day of the trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripDay {
    key: DayKey,
    date: NaiveDate,
    label: String,
    title: Option<String>,
    events: Vec<TripEvent>,
}

impl TripDay {
    /// The day key.
    #[must_use]
    pub fn key(&self) -> DayKey {
        self.key
    }

    /// The real calendar date of this day.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Display label, e.g. "Mercoledì 21 Maggio".
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Optional headline for the day.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Events sorted by start time.
    #[must_use]
    pub fn events(&self) -> &[TripEvent] {
        &self.events
    }

    /// Whether the day has no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The first event of the day with its identity.
    #[must_use]
    pub fn first_event(&self) -> Option<(EventId, &TripEvent)> {
        self.events.first().map(|event| (self.event_id(0), event))
    }

    /// Events paired with their identities, in time order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (EventId, &TripEvent)> + '_ {
        self.events
            .iter()
            .enumerate()
            .map(|(index, event)| (self.event_id(index), event))
    }

    fn event_id(&self, index: usize) -> EventId {
        EventId {
            day: self.key,
            index,
        }
    }
}

/// The complete, validated trip itinerary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripCalendar {
    title: Option<String>,
    days: [TripDay; 4],
}

impl TripCalendar {
    /// Load the itinerary compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded document fails validation.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(builtin::DOCUMENT)
    }

    /// Load and validate an itinerary file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading itinerary from {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|source| Error::ItineraryRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Parse and validate an itinerary document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed, an event time is not
    /// `HH:MM`, a day key is duplicated or missing, two days share a date,
    /// or a label is empty.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: ItineraryDocument =
            serde_json::from_str(json).map_err(Error::ItineraryParse)?;
        Self::from_document(document)
    }

    fn from_document(document: ItineraryDocument) -> Result<Self> {
        let mut slots: [Option<TripDay>; 4] = Default::default();

        for record in document.days {
            let key = record.key;
            if slots[key.index()].is_some() {
                return Err(Error::DuplicateDay(key));
            }
            if record.label.trim().is_empty() {
                return Err(Error::EmptyLabel(key));
            }

            let mut events = record
                .events
                .into_iter()
                .enumerate()
                .map(|(position, event)| event.into_event(key, position + 1))
                .collect::<Result<Vec<_>>>()?;
            // Stable: equal times keep document order.
            events.sort_by_key(|event| event.time);

            slots[key.index()] = Some(TripDay {
                key,
                date: record.date,
                label: record.label,
                title: record.title,
                events,
            });
        }

        let [day1, day2, day3, day4] = slots;
        let days = [
            day1.ok_or(Error::MissingDay(DayKey::Day1))?,
            day2.ok_or(Error::MissingDay(DayKey::Day2))?,
            day3.ok_or(Error::MissingDay(DayKey::Day3))?,
            day4.ok_or(Error::MissingDay(DayKey::Day4))?,
        ];

        for (i, first) in days.iter().enumerate() {
            if let Some(second) = days[i + 1..].iter().find(|d| d.date == first.date) {
                return Err(Error::DuplicateDate {
                    first: first.key,
                    second: second.key,
                    date: first.date,
                });
            }
        }

        debug!(
            events = days.iter().map(|d| d.events.len()).sum::<usize>(),
            first_date = %days[0].date,
            "Itinerary loaded"
        );

        Ok(Self {
            title: document.title,
            days,
        })
    }

    /// Optional trip title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The day for a key.
    #[must_use]
    pub fn day(&self, key: DayKey) -> &TripDay {
        &self.days[key.index()]
    }

    /// All days in trip order.
    #[must_use]
    pub fn days(&self) -> &[TripDay] {
        &self.days
    }

    /// The trip day falling on `date`, if any.
    #[must_use]
    pub fn day_for_date(&self, date: NaiveDate) -> Option<DayKey> {
        self.days.iter().find(|day| day.date == date).map(TripDay::key)
    }

    /// Look up an event by identity.
    #[must_use]
    pub fn event(&self, id: EventId) -> Option<&TripEvent> {
        self.day(id.day).events.get(id.index)
    }
}

#[derive(Debug, Deserialize)]
struct ItineraryDocument {
    #[serde(default)]
    title: Option<String>,
    days: Vec<DayRecord>,
}

#[derive(Debug, Deserialize)]
struct DayRecord {
    key: DayKey,
    date: NaiveDate,
    label: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    events: Vec<EventRecord>,
}

#[derive(Debug, Deserialize)]
struct EventRecord {
    time: String,
    #[serde(default)]
    emoji: String,
    description: String,
    #[serde(default)]
    voucher: Option<Voucher>,
    #[serde(default)]
    transportation: Option<Transportation>,
}

impl EventRecord {
    fn into_event(self, day: DayKey, position: usize) -> Result<TripEvent> {
        let time = self
            .time
            .parse::<TimeOfDay>()
            .map_err(|err| Error::InvalidTime {
                day,
                position,
                value: self.time.clone(),
                reason: err.to_string(),
            })?;
        Ok(TripEvent {
            time,
            emoji: self.emoji,
            description: self.description,
            voucher: self.voucher,
            transportation: self.transportation,
        })
    }
}
