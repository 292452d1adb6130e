//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Collect database, logging, refresh and report settings in one place.
//! - Apply build-mode defaults when a variable is unset or blank.
//!
//! # Invariants
//! - Numeric settings are validated; zero or unparsable values are rejected.
//! - Resolution never panics; errors are human-readable strings.

use crate::logging::default_log_level;
use crate::service::pedigree_service::DEFAULT_PEDIGREE_DEPTH;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "ZOO_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "ZOO_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ZOO_LOG_DIR";
pub const ENV_REFRESH_SECS: &str = "ZOO_REFRESH_SECS";
pub const ENV_PEDIGREE_MAX_DEPTH: &str = "ZOO_PEDIGREE_MAX_DEPTH";
pub const ENV_REPORT_LINES_PER_PAGE: &str = "ZOO_REPORT_LINES_PER_PAGE";

const DEFAULT_DB_FILE_NAME: &str = "zoo.sqlite3";
const DEFAULT_REFRESH_SECS: u64 = 5;
pub const DEFAULT_REPORT_LINES_PER_PAGE: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZooConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging is disabled when unset.
    pub log_dir: Option<PathBuf>,
    pub refresh_interval: Duration,
    /// Pedigree depth limit. Zero is allowed and yields the root only.
    pub pedigree_max_depth: usize,
    pub report_lines_per_page: usize,
}

impl Default for ZooConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            pedigree_max_depth: DEFAULT_PEDIGREE_DEPTH,
            report_lines_per_page: DEFAULT_REPORT_LINES_PER_PAGE,
        }
    }
}

impl ZooConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let defaults = Self::default();
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let refresh_secs = match value(ENV_REFRESH_SECS) {
            Some(raw) => parse_positive(ENV_REFRESH_SECS, &raw)?,
            None => DEFAULT_REFRESH_SECS as usize,
        };
        let pedigree_max_depth = match value(ENV_PEDIGREE_MAX_DEPTH) {
            Some(raw) => raw.parse::<usize>().map_err(|err| {
                format!("{ENV_PEDIGREE_MAX_DEPTH} must be a non-negative integer, got `{raw}`: {err}")
            })?,
            None => defaults.pedigree_max_depth,
        };
        let report_lines_per_page = match value(ENV_REPORT_LINES_PER_PAGE) {
            Some(raw) => parse_positive(ENV_REPORT_LINES_PER_PAGE, &raw)?,
            None => defaults.report_lines_per_page,
        };

        Ok(Self {
            db_path: value(ENV_DB_PATH).map_or(defaults.db_path, PathBuf::from),
            log_level: value(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: value(ENV_LOG_DIR).map(PathBuf::from),
            refresh_interval: Duration::from_secs(refresh_secs as u64),
            pedigree_max_depth,
            report_lines_per_page,
        })
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err(format!("{key} must be greater than zero")),
        Ok(value) => Ok(value),
        Err(err) => Err(format!("{key} must be a positive integer, got `{raw}`: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::{ZooConfig, ENV_DB_PATH, ENV_PEDIGREE_MAX_DEPTH, ENV_REFRESH_SECS};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = ZooConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ZooConfig::default());
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
        assert_eq!(config.pedigree_max_depth, 5);
    }

    #[test]
    fn overrides_are_trimmed_and_parsed() {
        let config = ZooConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, " /var/lib/zoo/zoo.db "),
            (ENV_REFRESH_SECS, "30"),
            (ENV_PEDIGREE_MAX_DEPTH, "0"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/zoo/zoo.db"));
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.pedigree_max_depth, 0);
    }

    #[test]
    fn zero_refresh_interval_is_rejected() {
        let err = ZooConfig::from_lookup(lookup(&[(ENV_REFRESH_SECS, "0")])).unwrap_err();
        assert!(err.contains(ENV_REFRESH_SECS));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = ZooConfig::from_lookup(lookup(&[(ENV_DB_PATH, "   ")])).unwrap();
        assert_eq!(config.db_path, ZooConfig::default().db_path);
    }
}
