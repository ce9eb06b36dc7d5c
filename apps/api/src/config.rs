use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote scoring service; submissions POST to `<base>/match`.
    pub scoring_api_url: String,
    /// When unset the in-memory document store is used.
    pub database_url: Option<String>,
    pub scoring_timeout_secs: u64,
    pub max_upload_bytes: usize,
    /// Sessions unused for this long are closed.
    pub session_idle_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            scoring_api_url: require_env("SCORING_API_URL")?
                .trim_end_matches('/')
                .to_string(),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            scoring_timeout_secs: parse_env("SCORING_TIMEOUT_SECS", 120)?,
            max_upload_bytes: parse_env::<usize>("MAX_UPLOAD_MB", 25)? * 1024 * 1024,
            session_idle_secs: parse_env::<u64>("SESSION_IDLE_MINS", 60)? * 60,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
