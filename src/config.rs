use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a whole number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

const DEFAULT_ANALYSIS_DELAY_MS: u64 = 2000;
const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub questions_path: Option<PathBuf>,
    pub video_root: PathBuf,
    pub analysis_delay: Duration,
    pub analysis_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            questions_path: None,
            video_root: PathBuf::from("."),
            analysis_delay: Duration::from_millis(DEFAULT_ANALYSIS_DELAY_MS),
            analysis_timeout: Duration::from_secs(DEFAULT_ANALYSIS_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Reads the process environment. Call `dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let analysis_delay = match non_empty("ANALYSIS_DELAY_MS") {
            Some(value) => Duration::from_millis(parse_number("ANALYSIS_DELAY_MS", value)?),
            None => defaults.analysis_delay,
        };
        let analysis_timeout = match non_empty("ANALYSIS_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse_number("ANALYSIS_TIMEOUT_SECS", value)?),
            None => defaults.analysis_timeout,
        };

        Ok(Self {
            questions_path: non_empty("QUESTIONS_PATH").map(PathBuf::from),
            video_root: non_empty("VIDEO_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.video_root),
            analysis_delay,
            analysis_timeout,
        })
    }
}

fn parse_number(name: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidNumber { name, value })
}
