//! Backend configuration.
//!
//! Configuration can be built in code or loaded from a YAML file:
//!
//! ```yaml
//! url: redis://127.0.0.1:6379/
//! prefix: _KV_
//! scan_page_size: 10000
//! connect_timeout: 5
//! io_timeout: 0
//! ```
//!
//! A prefix ending in `:` (the usual Redis convention) must be quoted in
//! YAML, as in `prefix: "app:"`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default Redis URL.
pub const DEFAULT_URL: &str = "redis://127.0.0.1:6379/";
/// Default namespace prefix for managed keys.
pub const DEFAULT_PREFIX: &str = "_KV_";
/// Default COUNT hint for each bootstrap SCAN page.
pub const DEFAULT_SCAN_PAGE_SIZE: usize = 10000;
/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 5;

/// Backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Redis connection URL.
    pub url: String,

    /// Literal prefix prepended to every key sent to the store.
    pub prefix: String,

    /// COUNT hint for each SCAN page during bootstrap.
    pub scan_page_size: usize,

    /// Connect timeout in seconds (0 disables the timeout).
    pub connect_timeout: u64,

    /// Per-command read/write timeout in seconds (0 blocks forever).
    pub io_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            scan_page_size: DEFAULT_SCAN_PAGE_SIZE,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            io_timeout: 0,
        }
    }
}

impl Config {
    /// Create a config for the given URL with default settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the namespace prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the SCAN page size.
    pub fn with_scan_page_size(mut self, size: usize) -> Self {
        self.scan_page_size = size;
        self
    }

    /// Set the connect timeout in seconds.
    pub fn with_connect_timeout(mut self, seconds: u64) -> Self {
        self.connect_timeout = seconds;
        self
    }

    /// Set the per-command timeout in seconds.
    pub fn with_io_timeout(mut self, seconds: u64) -> Self {
        self.io_timeout = seconds;
        self
    }

    /// Parse a config from YAML text. Missing fields take their defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Load a config from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    /// Check the config before any connection is made.
    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() {
            return Err(Error::InvalidConfig("prefix must not be empty".into()));
        }
        if let Some(c) = self.prefix.chars().find(|c| matches!(c, '*' | '?' | '[' | ']' | '\\')) {
            return Err(Error::InvalidConfig(format!(
                "prefix {:?} contains glob character {:?}",
                self.prefix, c
            )));
        }
        if self.scan_page_size == 0 {
            return Err(Error::InvalidConfig("scan_page_size must be positive".into()));
        }
        Ok(())
    }

    /// The SCAN MATCH pattern selecting managed keys.
    pub fn match_pattern(&self) -> String {
        format!("{}*", self.prefix)
    }

    pub(crate) fn connect_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.connect_timeout)
    }

    pub(crate) fn io_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.io_timeout)
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.prefix, "_KV_");
        assert_eq!(cfg.scan_page_size, 10000);
        assert_eq!(cfg.match_pattern(), "_KV_*");
        assert_eq!(cfg.connect_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(cfg.io_timeout(), None);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_partial_yaml() {
        let cfg = Config::from_yaml_str("url: redis://db:6380/2\nprefix: \"app:\"\n").unwrap();
        assert_eq!(cfg.url, "redis://db:6380/2");
        assert_eq!(cfg.prefix, "app:");
        assert_eq!(cfg.scan_page_size, DEFAULT_SCAN_PAGE_SIZE);

        // Unquoted, the trailing colon starts a nested mapping.
        let err = Config::from_yaml_str("prefix: app:\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_yaml_round_trip_keeps_colon_prefix() {
        let cfg = Config::default().with_prefix("app:");
        let text = serde_yaml::to_string(&cfg).unwrap();
        assert_eq!(Config::from_yaml_str(&text).unwrap(), cfg);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "scan_page_size: 50\nio_timeout: 2").unwrap();

        let cfg = Config::from_file(file.path()).unwrap();
        assert_eq!(cfg.scan_page_size, 50);
        assert_eq!(cfg.io_timeout(), Some(Duration::from_secs(2)));
        assert_eq!(cfg.url, DEFAULT_URL);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().with_prefix("").validate().is_err());
        assert!(Config::default().with_prefix("a*").validate().is_err());
        assert!(Config::default().with_prefix("k[1]").validate().is_err());
        assert!(Config::default().with_scan_page_size(0).validate().is_err());
        Config::new("redis://localhost/")
            .with_prefix("users:")
            .with_scan_page_size(1)
            .validate()
            .unwrap();
    }
}
