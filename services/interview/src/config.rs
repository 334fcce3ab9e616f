//! Application Configuration Module
//!
//! Loads the client's settings from environment variables (optionally seeded
//! from a `.env` file) into one struct handed to the rest of the binary.

use std::str::FromStr;
use std::time::Duration;

use interview_core::SessionSettings;
use tracing::Level;

/// Holds all configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub session_url: String,
    pub session_token: Option<String>,
    pub python_bin: String,
    pub run_time_limit: Duration,
    pub session: SessionSettings,
    pub log_level: Level,
}

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid log level provided for RUST_LOG: {0}")]
    InvalidLogLevel(String),
    #[error("Invalid value for {var}: {value}")]
    InvalidNumber { var: String, value: String },
    #[error("{0} must be greater than zero")]
    ZeroDuration(String),
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    // *   `SESSION_URL`: WebSocket endpoint of the interview backend. Defaults to "ws://127.0.0.1:5000/ws".
    // *   `SESSION_TOKEN`: (Optional) Bearer token for the backend handshake.
    // *   `PYTHON_BIN`: Interpreter used for code runs. Defaults to "python3".
    // *   `RUN_TIME_LIMIT_SECS`: Wall-clock limit per run. Defaults to 10.
    // *   `SILENCE_THRESHOLD_SECS`, `VAD_THRESHOLD_DB`, `UTTERANCE_QUIET_MS`,
    //     `TYPING_INTERVAL_MS`, `FRAME_INTERVAL_MS`: session timing overrides.
    // *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file. This is useful for local development and is ignored if not present.
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SessionSettings::default();

        let session_url =
            lookup("SESSION_URL").unwrap_or_else(|| session_client::DEFAULT_URL.to_string());
        let session_token = lookup("SESSION_TOKEN").filter(|token| !token.trim().is_empty());
        let python_bin = lookup("PYTHON_BIN").unwrap_or_else(|| "python3".to_string());

        let run_time_limit = Duration::from_secs(nonzero(
            "RUN_TIME_LIMIT_SECS",
            parse_or(&lookup, "RUN_TIME_LIMIT_SECS", 10)?,
        )?);
        let session = SessionSettings {
            silence_threshold: Duration::from_secs(parse_or(
                &lookup,
                "SILENCE_THRESHOLD_SECS",
                defaults.silence_threshold.as_secs(),
            )?),
            vad_threshold_db: parse_or(&lookup, "VAD_THRESHOLD_DB", defaults.vad_threshold_db)?,
            utterance_quiet: Duration::from_millis(nonzero(
                "UTTERANCE_QUIET_MS",
                parse_or(
                    &lookup,
                    "UTTERANCE_QUIET_MS",
                    defaults.utterance_quiet.as_millis() as u64,
                )?,
            )?),
            typing_interval: Duration::from_millis(parse_or(
                &lookup,
                "TYPING_INTERVAL_MS",
                defaults.typing_interval.as_millis() as u64,
            )?),
            frame_interval: Duration::from_millis(nonzero(
                "FRAME_INTERVAL_MS",
                parse_or(
                    &lookup,
                    "FRAME_INTERVAL_MS",
                    defaults.frame_interval.as_millis() as u64,
                )?,
            )?),
            ..defaults
        };

        // Configure logging level from RUST_LOG, with a sensible default.
        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(log_level_str))?;

        Ok(Self {
            session_url,
            session_token,
            python_bin,
            run_time_limit,
            session,
            log_level,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            var: var.to_string(),
            value,
        }),
    }
}

/// Periods and limits where zero has no meaning. `TYPING_INTERVAL_MS=0`
/// (no rate limit) and `SILENCE_THRESHOLD_SECS=0` (report every tick) stay valid.
fn nonzero(var: &str, value: u64) -> Result<u64, ConfigError> {
    if value == 0 {
        return Err(ConfigError::ZeroDuration(var.to_string()));
    }
    Ok(value)
}
