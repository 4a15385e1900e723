//! Configuration management for the console
//!
//! Layered: built-in defaults, then an optional TOML file, then `FDS_*`
//! environment variables. Command-line flags are applied last by the binary.

use crate::dispatcher::MutationPolicy;
use crate::error::{ConsoleError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Defaults
// ============================================================================

/// Default ingestion server URL.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Status poll period.
pub const DEFAULT_STATUS_INTERVAL_MS: u64 = 3000;

/// Log tail poll period.
pub const DEFAULT_LOGS_INTERVAL_MS: u64 = 5000;

/// Number of log lines fetched per tick.
pub const DEFAULT_LOG_LIMIT: u32 = 50;

/// Caller-side timeout applied to every request.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Console configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub status_interval_ms: u64,
    pub logs_interval_ms: u64,
    pub log_limit: u32,
    pub request_timeout_secs: u64,
    pub mutation_policy: MutationPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            status_interval_ms: DEFAULT_STATUS_INTERVAL_MS,
            logs_interval_ms: DEFAULT_LOGS_INTERVAL_MS,
            log_limit: DEFAULT_LOG_LIMIT,
            request_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            mutation_policy: MutationPolicy::default(),
        }
    }
}

impl Config {
    /// Load defaults, the config file (if any) and the environment.
    ///
    /// Not validated: command-line overrides come later, then [`Config::validate`].
    pub fn load() -> Result<Self> {
        let config = match Self::config_file_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.merge_env()
    }

    /// Load defaults overridden by the environment only.
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// Parse a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| {
            ConsoleError::config(format!("invalid config file '{}': {}", path.display(), e))
        })
    }

    /// `$FDS_CONFIG`, else `<config dir>/fds/config.toml`.
    pub fn config_file_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("FDS_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("fds").join("config.toml"))
    }

    fn merge_env(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var("FDS_SERVER_URL") {
            self.server_url = url;
        }
        if let Some(ms) = env_number("FDS_STATUS_INTERVAL_MS")? {
            self.status_interval_ms = ms;
        }
        if let Some(ms) = env_number("FDS_LOGS_INTERVAL_MS")? {
            self.logs_interval_ms = ms;
        }
        if let Some(limit) = env_number("FDS_LOG_LIMIT")? {
            self.log_limit = limit;
        }
        if let Some(secs) = env_number("FDS_API_TIMEOUT_SECS")? {
            self.request_timeout_secs = secs;
        }
        if let Ok(policy) = std::env::var("FDS_MUTATION_POLICY") {
            self.mutation_policy = policy.parse()?;
        }
        Ok(self)
    }

    /// Reject values the poller and client cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.server_url.trim().is_empty() {
            return Err(ConsoleError::config("server_url must not be empty"));
        }
        if self.status_interval_ms == 0 || self.logs_interval_ms == 0 {
            return Err(ConsoleError::config("poll intervals must be greater than zero"));
        }
        if self.log_limit == 0 {
            return Err(ConsoleError::config("log_limit must be greater than zero"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConsoleError::config(
                "request_timeout_secs must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn set_server_url(&mut self, url: String) {
        self.server_url = url;
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }

    pub fn logs_interval(&self) -> Duration {
        Duration::from_millis(self.logs_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConsoleError::config(format!("{} must be a number, got '{}'", key, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server_url(), DEFAULT_SERVER_URL);
        assert_eq!(config.status_interval(), Duration::from_millis(3000));
        assert_eq!(config.logs_interval(), Duration::from_millis(5000));
        assert_eq!(config.log_limit, 50);
        assert_eq!(config.mutation_policy, MutationPolicy::Independent);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        std::env::set_var("FDS_SERVER_URL", "http://ingest.internal:5000");
        std::env::set_var("FDS_STATUS_INTERVAL_MS", "1000");
        std::env::set_var("FDS_MUTATION_POLICY", "exclusive");

        let config = Config::from_env().unwrap();
        assert_eq!(config.server_url(), "http://ingest.internal:5000");
        assert_eq!(config.status_interval_ms, 1000);
        assert_eq!(config.logs_interval_ms, DEFAULT_LOGS_INTERVAL_MS);
        assert_eq!(config.mutation_policy, MutationPolicy::Exclusive);

        std::env::remove_var("FDS_SERVER_URL");
        std::env::remove_var("FDS_STATUS_INTERVAL_MS");
        std::env::remove_var("FDS_MUTATION_POLICY");
    }

    #[test]
    #[serial]
    fn test_bad_env_number() {
        std::env::set_var("FDS_LOG_LIMIT", "fifty");
        let result = Config::from_env();
        std::env::remove_var("FDS_LOG_LIMIT");

        assert!(matches!(result, Err(ConsoleError::Config(_))));
    }

    #[test]
    fn test_from_file_keeps_missing_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server_url = \"http://10.0.0.5:5000\"").unwrap();
        writeln!(file, "log_limit = 100").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server_url(), "http://10.0.0.5:5000");
        assert_eq!(config.log_limit, 100);
        assert_eq!(config.status_interval_ms, DEFAULT_STATUS_INTERVAL_MS);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConsoleError::Config(_))));
    }

    #[test]
    #[serial]
    fn test_empty_file_url_fixed_by_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server_url = \"\"").unwrap();
        std::env::set_var("FDS_CONFIG", file.path());
        std::env::remove_var("FDS_SERVER_URL");

        let loaded = Config::load();
        std::env::remove_var("FDS_CONFIG");

        let mut config = loaded.unwrap();
        assert!(config.validate().is_err());
        config.set_server_url("http://10.0.0.5:5000".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = Config {
            status_interval_ms: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
