//! CalendarService trait definition

use async_trait::async_trait;

use crate::error::CalendarError;
use crate::event::CalendarEvent;

/// Result of an insert against a calendar backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Event was created; carries the backend-assigned (or echoed) event id
    Created(String),

    /// An event with the same id already exists - treated as success so
    /// re-running a materialization does not duplicate events
    AlreadyExists,
}

/// A calendar backend that can accept event insertions
///
/// One call per event, sequentially. Implementations own their credential
/// state; callers never see tokens.
#[async_trait]
pub trait CalendarService: Send + Sync {
    /// Insert a single event into the named calendar
    async fn insert_event(&self, calendar_id: &str, event: &CalendarEvent) -> Result<InsertOutcome, CalendarError>;
}
