// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;
use url::Url;

/// Number of questions a quiz aims for.
pub const DEFAULT_QUESTION_COUNT: usize = 20;

/// Generator calls spent on a single slot before it is skipped.
pub const DEFAULT_MAX_ATTEMPTS_PER_SLOT: usize = 3;

/// Longest session lifetime accepted from `SESSION_TTL_SECS` (30 days).
pub const MAX_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Insecure signing key used when `SESSION_SECRET` is missing.
pub const FALLBACK_SESSION_SECRET: &str = "fallback-secret";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is not a valid number: {value}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("OPENAI_BASE_URL is not a valid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: Url,
    pub openai_model: String,
    pub openai_max_tokens: u32,
    pub openai_timeout_secs: u64,
    pub exam_name: String,
    pub question_count: usize,
    pub max_attempts_per_slot: usize,
    pub session_secret: String,
    pub session_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let openai_api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;

        let openai_base_url = parse_base_url(
            &env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1/".to_string()),
        )?;

        let openai_model = env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let session_secret =
            env::var("SESSION_SECRET").unwrap_or_else(|_| FALLBACK_SESSION_SECRET.to_string());

        let exam_name = env::var("EXAM_NAME").unwrap_or_else(|_| "PCEP".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            openai_api_key,
            openai_base_url,
            openai_model,
            openai_max_tokens: number_var("OPENAI_MAX_TOKENS", 1500)?,
            openai_timeout_secs: number_var("OPENAI_TIMEOUT_SECS", 60)?,
            exam_name,
            question_count: number_var("QUIZ_QUESTION_COUNT", DEFAULT_QUESTION_COUNT)?,
            max_attempts_per_slot: number_var("QUIZ_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS_PER_SLOT)?,
            session_secret,
            session_ttl_secs: check_session_ttl(number_var("SESSION_TTL_SECS", 86_400)?)?,
            port: number_var("PORT", 5000)?,
            rust_log,
        })
    }

    pub fn uses_fallback_secret(&self) -> bool {
        self.session_secret == FALLBACK_SESSION_SECRET
    }
}

/// Parses the provider base url, forcing a trailing slash so that
/// `Url::join("chat/completions")` keeps the last path segment.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{}/", raw))?)
    }
}

/// Keeps the session lifetime inside what cookies and chrono can represent.
pub fn check_session_ttl(secs: u64) -> Result<u64, ConfigError> {
    if (1..=MAX_SESSION_TTL_SECS).contains(&secs) {
        Ok(secs)
    } else {
        Err(ConfigError::OutOfRange {
            name: "SESSION_TTL_SECS",
            value: secs,
            min: 1,
            max: MAX_SESSION_TTL_SECS,
        })
    }
}

fn number_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        Err(_) => Ok(default),
    }
}
