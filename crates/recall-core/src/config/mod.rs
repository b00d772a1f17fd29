//! Engine configuration.
//!
//! Everything the engine needs is carried in an explicitly constructed
//! [`EngineConfig`] that is passed in by the host. Nothing here reads or
//! mutates process-wide state except [`EngineConfig::from_env`], which only
//! reads.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::{is_http_url, normalize_text_option};
use crate::{Error, Result};

const ENV_API_URL: &str = "RECALL_API_URL";
const ENV_API_TIMEOUT_SECS: &str = "RECALL_API_TIMEOUT_SECS";
const ENV_RETRY_ATTEMPTS: &str = "RECALL_RETRY_ATTEMPTS";
const ENV_RETRY_DELAY_MS: &str = "RECALL_RETRY_DELAY_MS";
const ENV_DUPLICATE_THRESHOLD: &str = "RECALL_DUPLICATE_THRESHOLD";
const ENV_LOG: &str = "RECALL_LOG";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOG_FILTER: &str = "recall=info";

/// Connection settings for the authoritative remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL; collections live under `{base_url}/api/<kind>`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl RemoteConfig {
    /// Create a remote configuration, validating and normalizing the URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url.into())?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Override the request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Bounded fixed-delay retry for remote writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Pause between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Single attempt, no waiting
    #[must_use]
    pub const fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

/// Duplicate detection tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuplicateConfig {
    /// Minimum 0-100 score for a fuzzy match
    pub threshold: f64,
    /// Maximum number of matches reported
    pub max_results: usize,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            threshold: crate::search::DEFAULT_THRESHOLD,
            max_results: crate::search::MAX_RESULTS,
        }
    }
}

/// Everything the sync engine and its collaborators are configured with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Remote store; `None` runs in standalone (local-only) mode
    pub remote: Option<RemoteConfig>,
    pub retry: RetryPolicy,
    pub duplicates: DuplicateConfig,
    /// `tracing` filter directive the host should install
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            remote: None,
            retry: RetryPolicy::default(),
            duplicates: DuplicateConfig::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl EngineConfig {
    /// Standalone configuration with default tuning
    #[must_use]
    pub fn standalone() -> Self {
        Self::default()
    }

    /// Configuration pointing at a remote store with default tuning
    #[must_use]
    pub fn with_remote(remote: RemoteConfig) -> Self {
        Self {
            remote: Some(remote),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Whether a remote store is configured
    pub const fn is_remote_configured(&self) -> bool {
        self.remote.is_some()
    }

    /// Load configuration from `RECALL_*` environment variables.
    ///
    /// A missing `RECALL_API_URL` selects standalone mode. Malformed values are
    /// reported instead of silently replaced with defaults.
    pub fn from_env() -> Result<Self> {
        parse_config(|key| env::var(key).ok())
    }
}

fn parse_config(lookup: impl Fn(&str) -> Option<String>) -> Result<EngineConfig> {
    let mut config = EngineConfig::default();

    if let Some(url) = normalize_text_option(lookup(ENV_API_URL)) {
        let mut remote = RemoteConfig::new(url)?;
        if let Some(secs) = parse_number::<u64>(&lookup, ENV_API_TIMEOUT_SECS)? {
            if secs == 0 {
                return Err(Error::Config(format!("{ENV_API_TIMEOUT_SECS} must be positive")));
            }
            remote = remote.with_timeout(Duration::from_secs(secs));
        }
        config.remote = Some(remote);
    }

    if let Some(attempts) = parse_number::<u32>(&lookup, ENV_RETRY_ATTEMPTS)? {
        if attempts == 0 {
            return Err(Error::Config(format!("{ENV_RETRY_ATTEMPTS} must be at least 1")));
        }
        config.retry.max_attempts = attempts;
    }
    if let Some(delay_ms) = parse_number::<u64>(&lookup, ENV_RETRY_DELAY_MS)? {
        config.retry.delay = Duration::from_millis(delay_ms);
    }

    if let Some(threshold) = parse_number::<f64>(&lookup, ENV_DUPLICATE_THRESHOLD)? {
        if !(0.0..=100.0).contains(&threshold) {
            return Err(Error::Config(format!(
                "{ENV_DUPLICATE_THRESHOLD} must be between 0 and 100"
            )));
        }
        config.duplicates.threshold = threshold;
    }

    if let Some(filter) = normalize_text_option(lookup(ENV_LOG)) {
        config.log_filter = filter;
    }

    Ok(config)
}

fn parse_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    let Some(raw) = normalize_text_option(lookup(key)) else {
        return Ok(None);
    };
    raw.parse()
        .map(Some)
        .map_err(|_| Error::Config(format!("{key} has an invalid value '{raw}'")))
}

fn normalize_base_url(raw: String) -> Result<String> {
    let url = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::Config("remote base URL must not be empty".to_string()))?;
    if is_http_url(&url) {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(Error::Config(
            "remote base URL must include http:// or https://".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse_from_map(map: &HashMap<&str, &str>) -> Result<EngineConfig> {
        parse_config(|key| map.get(key).map(|value| (*value).to_string()))
    }

    #[test]
    fn empty_environment_is_standalone_with_defaults() {
        let config = parse_from_map(&HashMap::new()).unwrap();
        assert!(!config.is_remote_configured());
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay, Duration::from_millis(1000));
        assert!((config.duplicates.threshold - 70.0).abs() < f64::EPSILON);
        assert_eq!(config.duplicates.max_results, 3);
        assert_eq!(config.log_filter, "recall=info");
    }

    #[test]
    fn remote_url_is_normalized() {
        let mut map = HashMap::new();
        map.insert(ENV_API_URL, " https://api.example.com/ ");
        map.insert(ENV_API_TIMEOUT_SECS, "3");
        let config = parse_from_map(&map).unwrap();
        let remote = config.remote.unwrap();
        assert_eq!(remote.base_url, "https://api.example.com");
        assert_eq!(remote.timeout, Duration::from_secs(3));
    }

    #[test]
    fn remote_url_requires_scheme() {
        let mut map = HashMap::new();
        map.insert(ENV_API_URL, "api.example.com");
        assert!(matches!(parse_from_map(&map), Err(Error::Config(_))));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let mut map = HashMap::new();
        map.insert(ENV_RETRY_ATTEMPTS, "three");
        let error = parse_from_map(&map).unwrap_err();
        assert!(error.to_string().contains(ENV_RETRY_ATTEMPTS));

        let mut map = HashMap::new();
        map.insert(ENV_RETRY_ATTEMPTS, "0");
        assert!(parse_from_map(&map).is_err());

        let mut map = HashMap::new();
        map.insert(ENV_DUPLICATE_THRESHOLD, "140");
        assert!(parse_from_map(&map).is_err());
    }

    #[test]
    fn retry_and_threshold_overrides_apply() {
        let mut map = HashMap::new();
        map.insert(ENV_RETRY_ATTEMPTS, "5");
        map.insert(ENV_RETRY_DELAY_MS, "250");
        map.insert(ENV_DUPLICATE_THRESHOLD, "82.5");
        map.insert(ENV_LOG, "recall=debug");
        let config = parse_from_map(&map).unwrap();
        assert_eq!(config.retry, RetryPolicy::new(5, Duration::from_millis(250)));
        assert!((config.duplicates.threshold - 82.5).abs() < f64::EPSILON);
        assert_eq!(config.log_filter, "recall=debug");
    }
}
