//! OAuth2 token storage, refresh, and interactive authorization
//!
//! Credentials live in a single JSON file under the user config dir. The
//! file is read at process start, refreshed through the OAuth2 token
//! endpoint when expired, and rewritten after every token change. One
//! active session is assumed - there is no locking on the token file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CalendarError;

const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const SCOPE: &str = "https://www.googleapis.com/auth/calendar.events";
const DEFAULT_REDIRECT_URI: &str = "http://localhost:8085/";

/// Refresh slightly before the token actually lapses
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Serialized credential blob persisted on disk
///
/// No Debug derive - keeps tokens out of logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expiry: Option<DateTime<Utc>>,
    pub client_id: String,
    pub client_secret: String,
    pub token_uri: String,
}

impl StoredCredentials {
    /// Check whether the access token is at or past its expiry margin
    pub fn is_expired(&self) -> bool {
        match self.expiry {
            Some(expiry) => Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) >= expiry,
            None => false,
        }
    }
}

/// On-disk credential store
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Create a store backed by the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default token location: `~/.config/habitcoach/token.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("habitcoach")
            .join("token.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load credentials, returning None when no token file exists yet
    pub fn load(&self) -> Result<Option<StoredCredentials>, CalendarError> {
        debug!(path = %self.path.display(), "TokenStore::load: called");
        if !self.path.exists() {
            debug!("TokenStore::load: no token file");
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| CalendarError::TokenStore(format!("Failed to read {}: {}", self.path.display(), e)))?;

        let creds: StoredCredentials = serde_json::from_str(&content)
            .map_err(|e| CalendarError::TokenStore(format!("Corrupt token file {}: {}", self.path.display(), e)))?;

        Ok(Some(creds))
    }

    /// Persist credentials, creating parent directories as needed
    pub fn save(&self, creds: &StoredCredentials) -> Result<(), CalendarError> {
        debug!(path = %self.path.display(), "TokenStore::save: called");
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CalendarError::TokenStore(format!("Failed to create {}: {}", parent.display(), e)))?;
        }

        let json = serde_json::to_string_pretty(creds)?;
        fs::write(&self.path, json)
            .map_err(|e| CalendarError::TokenStore(format!("Failed to write {}: {}", self.path.display(), e)))?;

        info!(path = %self.path.display(), "Saved calendar credentials");
        Ok(())
    }
}

/// OAuth2 application settings for the interactive authorization step
#[derive(Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl OAuthConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
        }
    }
}

/// Manages the stored credentials lifecycle
pub struct Authenticator {
    http: reqwest::Client,
    oauth: Option<OAuthConfig>,
    store: TokenStore,
}

impl Authenticator {
    /// Create an authenticator that can only use and refresh stored tokens
    pub fn new(store: TokenStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            oauth: None,
            store,
        }
    }

    /// Create an authenticator that can also run the interactive flow
    pub fn with_oauth(store: TokenStore, oauth: OAuthConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            oauth: Some(oauth),
            store,
        }
    }

    /// Build the consent URL the user opens in a browser
    ///
    /// After granting access the browser is redirected to the configured
    /// redirect URI; the user pastes the `code` query parameter back into
    /// the shell.
    pub fn auth_url(&self) -> Result<String, CalendarError> {
        let oauth = self
            .oauth
            .as_ref()
            .ok_or_else(|| CalendarError::Auth("OAuth client settings not configured".to_string()))?;

        let url = reqwest::Url::parse_with_params(
            AUTH_URI,
            &[
                ("client_id", oauth.client_id.as_str()),
                ("redirect_uri", oauth.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| CalendarError::Auth(format!("Failed to build auth URL: {}", e)))?;

        Ok(url.to_string())
    }

    /// Exchange a pasted authorization code for tokens and persist them
    pub async fn exchange_code(&self, code: &str) -> Result<StoredCredentials, CalendarError> {
        debug!("exchange_code: called");
        let oauth = self
            .oauth
            .as_ref()
            .ok_or_else(|| CalendarError::Auth("OAuth client settings not configured".to_string()))?;

        let response = self
            .http
            .post(TOKEN_URI)
            .form(&[
                ("code", code),
                ("client_id", oauth.client_id.as_str()),
                ("client_secret", oauth.client_secret.as_str()),
                ("redirect_uri", oauth.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        let token = Self::parse_token_response(response).await?;

        let creds = StoredCredentials {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expiry: token.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
            client_id: oauth.client_id.clone(),
            client_secret: oauth.client_secret.clone(),
            token_uri: TOKEN_URI.to_string(),
        };

        self.store.save(&creds)?;
        info!("Authorization complete");
        Ok(creds)
    }

    /// Return a usable access token, refreshing and re-persisting if needed
    pub async fn ensure_access_token(&self) -> Result<String, CalendarError> {
        debug!("ensure_access_token: called");
        let creds = self.store.load()?.ok_or_else(|| {
            CalendarError::Auth(format!(
                "No stored credentials at {} - run `hc auth` first",
                self.store.path().display()
            ))
        })?;

        if !creds.is_expired() {
            debug!("ensure_access_token: stored token still valid");
            return Ok(creds.access_token);
        }

        if creds.refresh_token.is_none() {
            return Err(CalendarError::Auth(
                "Access token expired and no refresh token available - run `hc auth` again".to_string(),
            ));
        }

        debug!("ensure_access_token: token expired, refreshing");
        let refreshed = self.refresh(&creds).await?;
        self.store.save(&refreshed)?;
        Ok(refreshed.access_token)
    }

    /// Refresh the access token using the stored refresh token
    async fn refresh(&self, creds: &StoredCredentials) -> Result<StoredCredentials, CalendarError> {
        let refresh_token = creds
            .refresh_token
            .as_deref()
            .ok_or_else(|| CalendarError::Auth("No refresh token".to_string()))?;

        let response = self
            .http
            .post(&creds.token_uri)
            .form(&[
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        let token = Self::parse_token_response(response).await?;

        Ok(StoredCredentials {
            access_token: token.access_token,
            // Google omits the refresh token on refresh responses; keep the old one
            refresh_token: token.refresh_token.or_else(|| creds.refresh_token.clone()),
            expiry: token.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
            client_id: creds.client_id.clone(),
            client_secret: creds.client_secret.clone(),
            token_uri: creds.token_uri.clone(),
        })
    }

    async fn parse_token_response(response: reqwest::Response) -> Result<TokenResponse, CalendarError> {
        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CalendarError::Api { status, message });
        }
        Ok(response.json::<TokenResponse>().await?)
    }
}

/// OAuth2 token endpoint response
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_creds(expiry: Option<DateTime<Utc>>) -> StoredCredentials {
        StoredCredentials {
            access_token: "access-123".to_string(),
            refresh_token: Some("refresh-456".to_string()),
            expiry,
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            token_uri: TOKEN_URI.to_string(),
        }
    }

    #[test]
    fn test_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("nested").join("token.json"));

        assert!(store.load().unwrap().is_none());

        let creds = sample_creds(Some(Utc::now() + Duration::hours(1)));
        store.save(&creds).unwrap();

        let loaded = store.load().unwrap().expect("credentials should exist");
        assert_eq!(loaded.access_token, "access-123");
        assert_eq!(loaded.refresh_token.as_deref(), Some("refresh-456"));
        assert_eq!(loaded.client_id, "client-id");
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "not json").unwrap();

        let store = TokenStore::new(path);
        let result = store.load();
        assert!(matches!(result, Err(CalendarError::TokenStore(_))));
    }

    #[test]
    fn test_is_expired() {
        assert!(sample_creds(Some(Utc::now() - Duration::hours(1))).is_expired());
        assert!(sample_creds(Some(Utc::now() + Duration::seconds(10))).is_expired());
        assert!(!sample_creds(Some(Utc::now() + Duration::hours(1))).is_expired());
        assert!(!sample_creds(None).is_expired());
    }

    #[test]
    fn test_auth_url_contains_client_settings() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        let auth = Authenticator::with_oauth(store, OAuthConfig::new("my-client", "my-secret"));

        let url = auth.auth_url().unwrap();
        assert!(url.starts_with(AUTH_URI));
        assert!(url.contains("client_id=my-client"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("access_type=offline"));
    }

    #[test]
    fn test_auth_url_requires_oauth_config() {
        let dir = TempDir::new().unwrap();
        let auth = Authenticator::new(TokenStore::new(dir.path().join("token.json")));
        assert!(auth.auth_url().is_err());
    }
}
