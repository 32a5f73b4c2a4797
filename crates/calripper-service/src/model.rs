//! Calendar data shared by the recurrence pipeline, the aggregator and the
//! feed renderer.

use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;
use serde::Deserialize;

use calripper_rfc::rfc::ical::core::RRule;

/// ## Summary
/// A named recurring event as declared in the recurring-events file.
///
/// `schedule` uses the phrase grammar of
/// [`parse_schedule`](crate::recurrence::parse_schedule). When both
/// `months` and `seasonal` are given, `months` wins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecurringEventDefinition {
    /// Stable identifier; also the seed of the generated event id.
    pub name: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Recurrence phrase, e.g. `"1st and 3rd Tuesday"`.
    pub schedule: String,
    /// IANA timezone name.
    pub timezone: String,
    /// RFC 5545 duration, e.g. `PT2H`.
    pub duration: String,
    /// Local start time, `HH:MM`.
    pub start_time: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub seasonal: Option<String>,
    #[serde(default)]
    pub months: Option<Vec<u8>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RecurringEventDefinition {
    /// Name shown to people: the friendly name when set, else the identifier.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.friendly_name.as_deref().unwrap_or(&self.name)
    }
}

/// ## Summary
/// A single calendar event, either recurring (with `rrule`) or a one-off
/// occurrence handed over by a source adapter.
///
/// Events are compared and hashed by `id` alone; two records with the same
/// id are the same event for deduplication purposes.
#[derive(Debug, Clone)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub location: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    /// Zoned start instant.
    pub date: DateTime<Tz>,
    pub duration: TimeDelta,
    /// Present only for recurring-origin events.
    pub rrule: Option<RRule>,
    pub tags: Vec<String>,
}

impl PartialEq for CalendarEvent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CalendarEvent {}

impl std::hash::Hash for CalendarEvent {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// One calendar produced by a source adapter.
#[derive(Debug, Clone, Default)]
pub struct RippedCalendar {
    pub name: String,
    pub friendly_name: String,
    pub tags: Vec<String>,
    pub events: Vec<CalendarEvent>,
    /// Extraction problems reported by the adapter, kept for display.
    pub errors: Vec<String>,
}

/// A scraped source and the calendars it produced.
#[derive(Debug, Clone, Default)]
pub struct RippedSource {
    pub name: String,
    pub friendly_name: String,
    /// Tags inherited by every calendar of this source.
    pub tags: Vec<String>,
    pub calendars: Vec<RippedCalendar>,
}

/// ## Summary
/// A statically declared calendar feed registered by URL.
///
/// Its `events` are whatever the caller already obtained for the feed; they
/// are passed through untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalCalendar {
    pub name: String,
    pub friendly_name: String,
    /// Feed URL.
    pub url: String,
    #[serde(default)]
    pub info_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip)]
    pub events: Vec<CalendarEvent>,
}
