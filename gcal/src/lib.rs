//! gcal - Google Calendar client for habitcoach
//!
//! A small client for the Google Calendar v3 REST API with on-disk OAuth2
//! token storage. The rest of the workspace depends only on the
//! [`CalendarService`] trait, so tests and alternative backends can swap in
//! their own implementation.
//!
//! # Modules
//!
//! - [`auth`] - OAuth2 token store, refresh, and interactive authorization
//! - [`client`] - `GoogleCalendarClient` implementing [`CalendarService`]
//! - [`event`] - The `CalendarEvent` wire type
//! - [`service`] - The `CalendarService` trait

pub mod auth;
pub mod client;
pub mod error;
pub mod event;
pub mod service;

pub use auth::{Authenticator, OAuthConfig, StoredCredentials, TokenStore};
pub use client::GoogleCalendarClient;
pub use error::CalendarError;
pub use event::CalendarEvent;
pub use service::{CalendarService, InsertOutcome};
