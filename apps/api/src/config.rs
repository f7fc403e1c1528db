use anyhow::{Context, Result};

use crate::analysis::session::{DEFAULT_IDLE_MINUTES, DEFAULT_MAX_SESSIONS};

/// Application configuration loaded from environment variables.
/// Startup fails if the Gemini API key is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Largest accepted request body; a comparison carries up to ten resumes.
    pub max_upload_bytes: usize,
    /// Sessions unused for this long are dropped with their cache and reports.
    pub session_idle_minutes: i64,
    pub max_sessions: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_api_key: require_env("GOOGLE_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: std::env::var("MAX_UPLOAD_MB")
                .unwrap_or_else(|_| "25".to_string())
                .parse::<usize>()
                .context("MAX_UPLOAD_MB must be a whole number of megabytes")?
                * 1024
                * 1024,
            session_idle_minutes: std::env::var("SESSION_IDLE_MINUTES")
                .unwrap_or_else(|_| DEFAULT_IDLE_MINUTES.to_string())
                .parse::<i64>()
                .context("SESSION_IDLE_MINUTES must be a whole number of minutes")?,
            max_sessions: std::env::var("MAX_SESSIONS")
                .unwrap_or_else(|_| DEFAULT_MAX_SESSIONS.to_string())
                .parse::<usize>()
                .context("MAX_SESSIONS must be a positive whole number")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    let value =
        std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}
