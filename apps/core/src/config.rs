//! Runtime configuration, read from the environment.
//!
//! `main` loads a `.env` file first (via `dotenv`), so every setting can live
//! there instead of the real environment.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use validator::{Validate, ValidationError};

use crate::error::AppError;

pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" | "bunyan" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Settings for the external extraction service (OpenAI-compatible API).
#[derive(Clone, Validate)]
pub struct DelegateConfig {
    #[validate(length(min = 1))]
    pub api_key: String,
    #[validate(length(min = 1))]
    pub base_url: String,
    #[validate(length(min = 1))]
    pub model: String,
    #[validate(range(min = 1))]
    pub requests_per_minute: usize,
}

impl fmt::Debug for DelegateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("requests_per_minute", &self.requests_per_minute)
            .finish()
    }
}

#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_delay_bounds"))]
pub struct AppConfig {
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    pub thinking_delay_min_ms: u64,
    pub thinking_delay_max_ms: u64,
    #[validate(range(min = 1, max = 200))]
    pub max_history: usize,
    #[validate(range(min = 1, max = 600))]
    pub turn_timeout_secs: u64,
    #[validate(range(min = 1))]
    pub max_sessions: usize,
    pub log_format: LogFormat,
    /// `None` keeps extraction purely rule-based.
    pub delegate: Option<DelegateConfig>,
}

fn validate_delay_bounds(config: &AppConfig) -> Result<(), ValidationError> {
    if config.thinking_delay_min_ms > config.thinking_delay_max_ms {
        return Err(ValidationError::new("thinking_delay_min_exceeds_max"));
    }
    Ok(())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            thinking_delay_min_ms: 300,
            thinking_delay_max_ms: 900,
            max_history: 10,
            turn_timeout_secs: 30,
            max_sessions: 1000,
            log_format: LogFormat::Pretty,
            delegate: None,
        }
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{}: {}", key, e))),
        _ => Ok(default),
    }
}

impl AppConfig {
    /// Reads and validates the configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let delegate = match env::var("GROQ_API_KEY") {
            Ok(api_key) if !api_key.trim().is_empty() => {
                let delegate = DelegateConfig {
                    api_key: api_key.trim().to_string(),
                    base_url: env_or("GROQ_BASE_URL", DEFAULT_GROQ_BASE_URL.to_string())?,
                    model: env_or("GROQ_MODEL", DEFAULT_GROQ_MODEL.to_string())?,
                    requests_per_minute: env_or("PATHWAY_DELEGATE_REQUESTS_PER_MINUTE", 25)?,
                };
                delegate.validate()?;
                Some(delegate)
            }
            _ => None,
        };

        let config = Self {
            host: env_or("PATHWAY_HOST", defaults.host)?,
            port: env_or("PATHWAY_PORT", defaults.port)?,
            thinking_delay_min_ms: env_or(
                "PATHWAY_THINKING_DELAY_MIN_MS",
                defaults.thinking_delay_min_ms,
            )?,
            thinking_delay_max_ms: env_or(
                "PATHWAY_THINKING_DELAY_MAX_MS",
                defaults.thinking_delay_max_ms,
            )?,
            max_history: env_or("PATHWAY_MAX_HISTORY", defaults.max_history)?,
            turn_timeout_secs: env_or("PATHWAY_TURN_TIMEOUT_SECS", defaults.turn_timeout_secs)?,
            max_sessions: env_or("PATHWAY_MAX_SESSIONS", defaults.max_sessions)?,
            log_format: env_or("PATHWAY_LOG_FORMAT", defaults.log_format)?,
            delegate,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(self.turn_timeout_secs)
    }
}
