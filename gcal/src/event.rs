//! Calendar event wire type

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single calendar event, expressed as local wall-clock times in a named
/// IANA timezone. The timezone is carried as a label and passed through to
/// the calendar API untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Caller-supplied event id for idempotent inserts, if any
    pub id: Option<String>,

    /// Event title
    pub summary: String,

    /// Local start time
    pub start: NaiveDateTime,

    /// Local end time
    pub end: NaiveDateTime,

    /// IANA timezone label, e.g. "Asia/Kolkata"
    pub timezone: String,
}

impl CalendarEvent {
    /// Create an event with an explicit end time
    pub fn new(
        summary: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            summary: summary.into(),
            start,
            end,
            timezone: timezone.into(),
        }
    }

    /// Create an event lasting `minutes` from `start`
    pub fn with_duration(
        summary: impl Into<String>,
        start: NaiveDateTime,
        minutes: i64,
        timezone: impl Into<String>,
    ) -> Self {
        Self::new(summary, start, start + Duration::minutes(minutes), timezone)
    }

    /// Attach a deterministic event id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}
