//! Runtime configuration for hosts embedding the archive engine.
//!
//! # Responsibility
//! - Collect log level, log directory, snapshot directory and the narrative
//!   duration ceiling from the environment.
//! - Fall back to build-mode defaults when a key is absent.
//!
//! # Invariants
//! - Parsing never panics; malformed values surface as `ConfigError`.
//! - The engine itself never reads configuration; hosts pass the values in.

use crate::logging::{default_log_level, normalize_level};
use crate::store::narrative_store::DEFAULT_NARRATIVE_CEILING;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_LOG_LEVEL: &str = "LIFELOG_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "LIFELOG_LOG_DIR";
pub const ENV_SNAPSHOT_DIR: &str = "LIFELOG_SNAPSHOT_DIR";
pub const ENV_NARRATIVE_CEILING: &str = "LIFELOG_NARRATIVE_CEILING";

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+)\s*(ms|s|m|h)\s*$").expect("valid duration regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    InvalidDuration { key: &'static str, value: String },
    /// Ceiling of zero would reject every narrative.
    ZeroCeiling,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::InvalidDuration { key, value } => write!(
                f,
                "`{key}` must look like `500ms`, `30s`, `90m` or `10h`, got `{value}`"
            ),
            Self::ZeroCeiling => write!(f, "narrative ceiling must be greater than zero"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub log_level: &'static str,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    /// Directory of timestamped snapshot files.
    pub snapshot_dir: Option<PathBuf>,
    pub narrative_ceiling: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: None,
            snapshot_dir: None,
            narrative_ceiling: DEFAULT_NARRATIVE_CEILING,
        }
    }
}

impl EngineConfig {
    /// Reads `LIFELOG_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; blank values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&level).map_err(ConfigError::InvalidLogLevel)?;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        config.snapshot_dir = read(ENV_SNAPSHOT_DIR).map(PathBuf::from);
        if let Some(value) = read(ENV_NARRATIVE_CEILING) {
            let ceiling = parse_duration(&value).ok_or_else(|| ConfigError::InvalidDuration {
                key: ENV_NARRATIVE_CEILING,
                value: value.clone(),
            })?;
            if ceiling.is_zero() {
                return Err(ConfigError::ZeroCeiling);
            }
            config.narrative_ceiling = ceiling;
        }
        Ok(config)
    }
}

/// Parses `<digits><unit>` where unit is `ms`, `s`, `m` or `h`.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let caps = DURATION_RE.captures(value)?;
    let amount: u64 = caps.get(1)?.as_str().parse().ok()?;
    let seconds_per_unit = match caps.get(2)?.as_str() {
        "ms" => return Some(Duration::from_millis(amount)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => return None,
    };
    amount.checked_mul(seconds_per_unit).map(Duration::from_secs)
}
