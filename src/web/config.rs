use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::collector::{CollectorSettings, MIN_INTERVAL};
use crate::feed::DEFAULT_FEED_URL;
use crate::store::{is_valid_identifier, StoreConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,
    #[serde(default = "default_feed_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            timeout: default_feed_timeout(),
        }
    }
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_feed_timeout() -> Duration {
    Duration::from_secs(10)
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    #[serde(default = "default_interval", deserialize_with = "deserialize_duration")]
    pub interval: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
        }
    }
}

fn default_interval() -> Duration {
    MIN_INTERVAL
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_top_jumps")]
    pub top_jumps: usize,
    #[serde(default = "default_recent_days")]
    pub recent_days: u32,
    /// Per-day cap for the recent window; `null` returns every sample.
    #[serde(default = "default_per_day_cap")]
    pub per_day_cap: Option<usize>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_jumps: default_top_jumps(),
            recent_days: default_recent_days(),
            per_day_cap: default_per_day_cap(),
        }
    }
}

fn default_top_jumps() -> usize {
    5
}

fn default_recent_days() -> u32 {
    3
}

fn default_per_day_cap() -> Option<usize> {
    Some(500)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_identifier(&self.store.table) {
            return Err(ConfigError::Invalid(format!(
                "store.table must be a plain SQL identifier, got {:?}",
                self.store.table
            )));
        }
        if self.collector.interval < MIN_INTERVAL {
            return Err(ConfigError::Invalid(format!(
                "collector.interval must be at least {:?}, got {:?}",
                MIN_INTERVAL, self.collector.interval
            )));
        }
        if self.feed.timeout.is_zero() {
            return Err(ConfigError::Invalid("feed.timeout must be positive".into()));
        }
        if self.analytics.top_jumps == 0 {
            return Err(ConfigError::Invalid("analytics.top_jumps must be positive".into()));
        }
        if self.analytics.recent_days == 0 {
            return Err(ConfigError::Invalid(
                "analytics.recent_days must be positive".into(),
            ));
        }
        if self.analytics.per_day_cap == Some(0) {
            return Err(ConfigError::Invalid(
                "analytics.per_day_cap must be positive or null".into(),
            ));
        }
        Ok(())
    }

    pub fn collector_settings(&self) -> CollectorSettings {
        CollectorSettings {
            interval: self.collector.interval,
            fetch_timeout: self.feed.timeout,
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}
