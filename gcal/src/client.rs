//! Google Calendar v3 REST client

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::auth::Authenticator;
use crate::error::CalendarError;
use crate::event::CalendarEvent;
use crate::service::{CalendarService, InsertOutcome};

const BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Client for the Google Calendar events API
///
/// Inserts are synchronous one-at-a-time calls; the access token is
/// resolved (and refreshed if needed) per request through the
/// [`Authenticator`].
pub struct GoogleCalendarClient {
    http: reqwest::Client,
    auth: Authenticator,
    base_url: String,
}

impl GoogleCalendarClient {
    /// Create a client using the given authenticator
    pub fn new(auth: Authenticator) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Build the events.insert request body
    fn event_body(event: &CalendarEvent) -> serde_json::Value {
        let mut body = serde_json::json!({
            "summary": event.summary,
            "start": {
                "dateTime": event.start.format("%Y-%m-%dT%H:%M:%S").to_string(),
                "timeZone": event.timezone,
            },
            "end": {
                "dateTime": event.end.format("%Y-%m-%dT%H:%M:%S").to_string(),
                "timeZone": event.timezone,
            },
        });

        if let Some(ref id) = event.id {
            body["id"] = serde_json::json!(id);
        }

        body
    }
}

#[async_trait]
impl CalendarService for GoogleCalendarClient {
    async fn insert_event(&self, calendar_id: &str, event: &CalendarEvent) -> Result<InsertOutcome, CalendarError> {
        debug!(%calendar_id, summary = %event.summary, "insert_event: called");
        let token = self.auth.ensure_access_token().await?;

        let url = format!("{}/calendars/{}/events", self.base_url, calendar_id);
        let body = Self::event_body(event);

        let response = self.http.post(&url).bearer_auth(token).json(&body).send().await?;

        let status = response.status().as_u16();

        // A duplicate deterministic id comes back as 409; the event is
        // already on the calendar, which is what the caller wanted
        if status == 409 && event.id.is_some() {
            debug!(id = ?event.id, "insert_event: event already exists");
            return Ok(InsertOutcome::AlreadyExists);
        }

        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CalendarError::Api { status, message });
        }

        let created: InsertedEvent = response.json().await?;
        info!(id = %created.id, summary = %event.summary, "Inserted calendar event");
        Ok(InsertOutcome::Created(created.id))
    }
}

/// events.insert response - only the id is of interest
#[derive(Deserialize)]
struct InsertedEvent {
    id: String,
}
