//! Environment-backed runtime settings
//!
//! Settings are loaded from the process environment, with a `.env` file in
//! the working directory (or a parent) applied first. Real environment
//! variables take precedence over `.env` values.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CollectorError, CollectorResult};

#[derive(Debug, Clone)]
pub struct Settings {
    /// Groq API key used by both the search provider and query generator.
    pub groq_api_key: String,
    /// Interval between scheduled collection runs.
    pub schedule_interval: Duration,
    /// Maximum venues requested per run.
    pub results_per_run: usize,
    /// Directory holding venues.json, progress.json and the rotation files.
    pub data_dir: PathBuf,
    /// HTTP API bind address.
    pub bind_addr: SocketAddr,
    /// Deadline applied to each search provider call.
    pub search_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> CollectorResult<Self> {
        // Silently ignored when no .env file exists.
        let _ = dotenvy::dotenv();

        let groq_api_key =
            std::env::var("GROQ_API_KEY").map_err(|_| CollectorError::config("GROQ_API_KEY"))?;

        let interval_minutes: u64 = parse_var("SCHEDULE_INTERVAL_MINUTES", 30)?;
        let results_per_run: usize = parse_var("RESULTS_PER_RUN", 30)?;
        let timeout_secs: u64 = parse_var("SEARCH_TIMEOUT_SECS", 120)?;

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let bind_addr: SocketAddr = parse_var_with("BIND_ADDR", "0.0.0.0:8000")?;

        Ok(Self {
            groq_api_key,
            schedule_interval: Duration::from_secs(interval_minutes * 60),
            results_per_run,
            data_dir,
            bind_addr,
            search_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Parse an optional environment variable, falling back to `default`.
/// A present-but-unparseable value is a configuration error, not a default.
fn parse_var<T: FromStr>(name: &str, default: T) -> CollectorResult<T> {
    match std::env::var(name) {
        Ok(value) => value.parse().map_err(|_| CollectorError::config(name)),
        Err(_) => Ok(default),
    }
}

fn parse_var_with<T: FromStr>(name: &str, default: &str) -> CollectorResult<T> {
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse().map_err(|_| CollectorError::config(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_default_and_override() {
        std::env::remove_var("VOLLEYHUNT_TEST_INTERVAL");
        let value: u64 = parse_var("VOLLEYHUNT_TEST_INTERVAL", 30).unwrap();
        assert_eq!(value, 30);

        std::env::set_var("VOLLEYHUNT_TEST_INTERVAL", "5");
        let value: u64 = parse_var("VOLLEYHUNT_TEST_INTERVAL", 30).unwrap();
        assert_eq!(value, 5);

        std::env::set_var("VOLLEYHUNT_TEST_INTERVAL", "not-a-number");
        assert!(parse_var::<u64>("VOLLEYHUNT_TEST_INTERVAL", 30).is_err());
        std::env::remove_var("VOLLEYHUNT_TEST_INTERVAL");
    }
}
