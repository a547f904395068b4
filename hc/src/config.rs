//! habitcoach configuration types and loading

use chrono::{Datelike, Duration, NaiveDate};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use gcal::{OAuthConfig, TokenStore};

/// Main habitcoach configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Calendar service configuration
    pub calendar: CalendarConfig,

    /// Scheduling defaults
    pub schedule: ScheduleConfig,

    /// Storage configuration
    pub storage: StorageConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        if self.schedule.days_per_week == 0 || self.schedule.days_per_week > 7 {
            return Err(eyre::eyre!(
                "schedule.days-per-week must be between 1 and 7, got {}",
                self.schedule.days_per_week
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .habitcoach.yml
        let local_config = PathBuf::from(".habitcoach.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/habitcoach/habitcoach.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("habitcoach").join("habitcoach.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("anthropic" or "openai")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).context(format!("Environment variable {} is not set", self.api_key_env))
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 4096,
            timeout_ms: 120_000,
        }
    }
}

/// Calendar service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Target calendar
    #[serde(rename = "calendar-id")]
    pub calendar_id: String,

    /// IANA timezone label stamped on every event
    pub timezone: String,

    /// Token file location; defaults to ~/.config/habitcoach/token.json
    #[serde(rename = "token-file")]
    pub token_file: Option<PathBuf>,

    /// Environment variable holding the OAuth client id
    #[serde(rename = "client-id-env")]
    pub client_id_env: String,

    /// Environment variable holding the OAuth client secret
    #[serde(rename = "client-secret-env")]
    pub client_secret_env: String,

    /// Submit deterministic event ids so re-runs do not duplicate events
    pub dedup: bool,
}

impl CalendarConfig {
    /// Resolve the token file path
    pub fn token_path(&self) -> PathBuf {
        self.token_file.clone().unwrap_or_else(TokenStore::default_path)
    }

    /// Build OAuth settings from the configured environment variables
    pub fn oauth_config(&self) -> Result<OAuthConfig> {
        let client_id =
            std::env::var(&self.client_id_env).context(format!("Environment variable {} is not set", self.client_id_env))?;
        let client_secret = std::env::var(&self.client_secret_env)
            .context(format!("Environment variable {} is not set", self.client_secret_env))?;
        Ok(OAuthConfig::new(client_id, client_secret))
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: "primary".to_string(),
            timezone: "Asia/Kolkata".to_string(),
            token_file: None,
            client_id_env: "GOOGLE_CLIENT_ID".to_string(),
            client_secret_env: "GOOGLE_CLIENT_SECRET".to_string(),
            dedup: true,
        }
    }
}

/// Scheduling defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Days scheduled per plan week; 5 means Monday-Friday off a Monday
    /// start, 7 covers weekends too
    #[serde(rename = "days-per-week")]
    pub days_per_week: u32,

    /// Default first day of week 1 when no start date is given
    pub start: StartPolicy,
}

impl ScheduleConfig {
    /// Resolve the default start date relative to `today`
    pub fn default_start_date(&self, today: NaiveDate) -> NaiveDate {
        match self.start {
            StartPolicy::Today => today,
            StartPolicy::NextMonday => {
                // The coming Monday; today when already a Monday
                let days_ahead = (7 - today.weekday().num_days_from_monday()) % 7;
                today + Duration::days(days_ahead as i64)
            }
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            days_per_week: 5,
            start: StartPolicy::Today,
        }
    }
}

/// How to pick the first day of week 1 when the user does not say
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartPolicy {
    Today,
    NextMonday,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory plan files are written to
    #[serde(rename = "plans-dir")]
    pub plans_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            plans_dir: PathBuf::from("."),
        }
    }
}
