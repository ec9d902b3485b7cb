//! Configuration for the aiq CLI
//!
//! Values are layered, lowest precedence first:
//!
//! 1. Hardcoded defaults
//! 2. `config.toml` in the auth directory
//! 3. Environment variables (`AIQ_*` prefix)
//! 4. Command-line flags, applied by the CLI router

use crate::error::{Error, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.activeiq.netapp.com";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default auth directory: `$HOME/activeiq`.
pub fn default_auth_dir() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join("activeiq"))
        .unwrap_or_else(|| PathBuf::from("activeiq"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiqConfig {
    /// Root URL of the Active IQ API.
    pub api_base_url: String,
    /// Directory holding the refresh and access token files.
    pub auth_dir: PathBuf,
    /// Minimum percent capacity for the over-threshold capacity report.
    pub disk_threshold: f64,
    /// Minimum busy percentage for the utilization report.
    pub perf_threshold: f64,
    /// Upper bound on simultaneous per-node efficiency fetches.
    pub max_concurrent_fetches: usize,
    /// Per-fetch timeout in seconds. Unset means wait indefinitely.
    pub request_timeout_secs: Option<u64>,
    pub accept_invalid_certs: bool,
}

impl Default for AiqConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            auth_dir: default_auth_dir(),
            disk_threshold: 70.0,
            perf_threshold: 50.0,
            max_concurrent_fetches: 8,
            request_timeout_secs: None,
            accept_invalid_certs: true,
        }
    }
}

impl AiqConfig {
    /// Load `config.toml` from `auth_dir` (or `AIQ_AUTH_DIR`, or the
    /// default) if present, then apply `AIQ_*` environment variables.
    pub fn load(auth_dir: Option<&Path>) -> Result<Self> {
        let dir = auth_dir
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("AIQ_AUTH_DIR").ok().map(PathBuf::from))
            .unwrap_or_else(default_auth_dir);

        let mut config = Self::from_file(&dir.join(CONFIG_FILE_NAME))?;
        config.merge_env_with(|key| std::env::var(key).ok())?;
        // The directory the file was read from stays authoritative.
        config.auth_dir = dir;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file, falling back to defaults when it does not exist.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn merge_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("AIQ_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(dir) = lookup("AIQ_AUTH_DIR") {
            self.auth_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup("AIQ_DISK_THRESHOLD") {
            self.disk_threshold = parse_env("AIQ_DISK_THRESHOLD", &value)?;
        }
        if let Some(value) = lookup("AIQ_PERF_THRESHOLD") {
            self.perf_threshold = parse_env("AIQ_PERF_THRESHOLD", &value)?;
        }
        if let Some(value) = lookup("AIQ_CONCURRENCY") {
            self.max_concurrent_fetches = parse_env("AIQ_CONCURRENCY", &value)?;
        }
        if let Some(value) = lookup("AIQ_TIMEOUT_SECS") {
            self.request_timeout_secs = Some(parse_env("AIQ_TIMEOUT_SECS", &value)?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_fetches == 0 {
            return Err(Error::Config(
                "max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(Error::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        self.base_url()?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.api_base_url)
            .map_err(|e| Error::Config(format!("Invalid api_base_url '{}': {}", self.api_base_url, e)))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn refresh_token_path(&self) -> PathBuf {
        self.auth_dir.join("RefreshToken.txt")
    }

    pub fn access_token_path(&self) -> PathBuf {
        self.auth_dir.join("AccessToken.txt")
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {key}: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_original_thresholds() {
        let config = AiqConfig::default();
        assert_eq!(config.disk_threshold, 70.0);
        assert_eq!(config.perf_threshold, 50.0);
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);
        assert!(config.request_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "disk_threshold = 85\nmax_concurrent_fetches = 2\nrequest_timeout_secs = 30\n",
        )
        .unwrap();

        let config = AiqConfig::from_file(&temp_dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config.disk_threshold, 85.0);
        assert_eq!(config.max_concurrent_fetches, 2);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.perf_threshold, 50.0);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = AiqConfig::from_file(&temp_dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.max_concurrent_fetches, 8);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("AIQ_BASE_URL", "http://localhost:9000"),
            ("AIQ_PERF_THRESHOLD", "65"),
            ("AIQ_CONCURRENCY", "3"),
        ]
        .into_iter()
        .collect();

        let mut config = AiqConfig::default();
        config
            .merge_env_with(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.api_base_url, "http://localhost:9000");
        assert_eq!(config.perf_threshold, 65.0);
        assert_eq!(config.max_concurrent_fetches, 3);
    }

    #[test]
    fn test_invalid_env_value_is_rejected() {
        let mut config = AiqConfig::default();
        let result = config.merge_env_with(|key| {
            (key == "AIQ_DISK_THRESHOLD").then(|| "seventy".to_string())
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = AiqConfig {
            max_concurrent_fetches: 0,
            ..AiqConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_paths() {
        let config = AiqConfig {
            auth_dir: PathBuf::from("/tmp/aiq"),
            ..AiqConfig::default()
        };
        assert_eq!(config.refresh_token_path(), PathBuf::from("/tmp/aiq/RefreshToken.txt"));
        assert_eq!(config.access_token_path(), PathBuf::from("/tmp/aiq/AccessToken.txt"));
    }
}
