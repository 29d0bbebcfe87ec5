//! The itinerary compiled into the binary: Paris, 21-24 May 2025.

/// Raw JSON of the embedded itinerary.
pub const DOCUMENT: &str = include_str!("../../data/paris-2025.json");
