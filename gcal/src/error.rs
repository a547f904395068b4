//! Calendar error types

use thiserror::Error;

/// Errors that can occur during calendar operations
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Not authorized: {0}")]
    Auth(String),

    #[error("Token store error: {0}")]
    TokenStore(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CalendarError {
    /// Check if this error means the user needs to (re-)authorize
    pub fn is_auth(&self) -> bool {
        matches!(self, CalendarError::Auth(_)) || matches!(self, CalendarError::Api { status: 401, .. })
    }
}
