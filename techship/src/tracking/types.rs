//! Tracking lookup result types and response decoding.
//!
//! The TechTrack API returns loosely-shaped JSON; this module is the one
//! place where that shape is decoded. Missing fields get named defaults and
//! every extracted string is trimmed, so the rest of the crate only ever
//! sees fully-populated values.

use serde::Deserialize;

/// Retention note attached to successful lookups.
pub const RETENTION_AVAILABLE: &str = "Data available (within carrier retention period)";

/// Retention note attached to lookups that found no events.
pub const RETENTION_PURGED: &str =
    "Carriers typically purge tracking data after 90-180 days. This number may be too old.";

const DEFAULT_EVENT_NAME: &str = "Unknown";
const DEFAULT_DESCRIPTION: &str = "No details";
const DEFAULT_CATEGORY: &str = "Generic";
const DEFAULT_ACCESS_LEVEL: &str = "Public";
const DEFAULT_TIMESTAMP: &str = "N/A";

/// Normalize a raw tracking number: strip everything outside `[A-Za-z0-9]`
/// and fold to uppercase. Returns an empty string for inputs with no
/// alphanumeric content.
pub fn normalize_tracking_number(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// A single normalized carrier event.
///
/// Timestamps are opaque strings straight from the API; no parsing or
/// validation is applied to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingEvent {
    pub name: String,
    pub description: String,
    pub category: String,
    pub access_level: String,
    pub time_local: String,
    pub time_utc: String,
    pub location_city: String,
    pub location_state: String,
}

/// Outcome of one tracking lookup.
///
/// Exactly one of these is produced per query. `original_input` always
/// carries the caller's raw string; `tracking_number` is the normalized
/// form, or empty when normalization itself failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingResult {
    Success {
        tracking_number: String,
        original_input: String,
        event: TrackingEvent,
        retention_note: String,
    },
    Failure {
        tracking_number: String,
        original_input: String,
        error: String,
        retention_note: Option<String>,
    },
}

impl TrackingResult {
    /// The caller's raw input string, preserved verbatim.
    pub fn original_input(&self) -> &str {
        match self {
            TrackingResult::Success { original_input, .. } => original_input,
            TrackingResult::Failure { original_input, .. } => original_input,
        }
    }

    /// The normalized tracking number (empty if normalization failed).
    pub fn tracking_number(&self) -> &str {
        match self {
            TrackingResult::Success {
                tracking_number, ..
            } => tracking_number,
            TrackingResult::Failure {
                tracking_number, ..
            } => tracking_number,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TrackingResult::Success { .. })
    }

    /// Copy of this result with a different `original_input`.
    ///
    /// Cache entries are keyed by normalized number, so a hit may have been
    /// stored under a differently-formatted raw string; the returned result
    /// is re-stamped with the current caller's input.
    pub(crate) fn for_input(&self, raw: &str) -> TrackingResult {
        let mut result = self.clone();
        match &mut result {
            TrackingResult::Success { original_input, .. } => *original_input = raw.to_string(),
            TrackingResult::Failure { original_input, .. } => *original_input = raw.to_string(),
        }
        result
    }
}

// ============================================================================
// Wire format
// ============================================================================

/// Top-level response body. Anything that is not an object with an `events`
/// array decodes to the default (no events).
#[derive(Debug, Default, Deserialize)]
pub(crate) struct EventsResponse {
    #[serde(default)]
    pub events: Vec<WireEvent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireEvent {
    name: Option<String>,
    description: Option<String>,
    category: Option<String>,
    #[serde(rename = "accessLevel")]
    access_level: Option<String>,
    #[serde(rename = "dateTime")]
    date_time: Option<WireDateTime>,
    location: Option<WireLocation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireDateTime {
    local: Option<String>,
    utc: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireLocation {
    city: Option<String>,
    state: Option<String>,
}

fn field(value: Option<String>, default: &str) -> String {
    match value {
        Some(s) => s.trim().to_string(),
        None => default.to_string(),
    }
}

impl From<WireEvent> for TrackingEvent {
    fn from(wire: WireEvent) -> Self {
        let date_time = wire.date_time.unwrap_or_default();
        let location = wire.location.unwrap_or_default();
        TrackingEvent {
            name: field(wire.name, DEFAULT_EVENT_NAME),
            description: field(wire.description, DEFAULT_DESCRIPTION),
            category: field(wire.category, DEFAULT_CATEGORY),
            access_level: field(wire.access_level, DEFAULT_ACCESS_LEVEL),
            time_local: field(date_time.local, DEFAULT_TIMESTAMP),
            time_utc: field(date_time.utc, DEFAULT_TIMESTAMP),
            location_city: field(location.city, ""),
            location_state: field(location.state, ""),
        }
    }
}
