//! Lock configuration.
//!
//! Durations are written in integer milliseconds, e.g.
//!
//! ```json
//! { "collection": "mutex", "defaults": { "expires_in_ms": 30000, "retry_interval_ms": 250 } }
//! ```

use crate::Result;
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

pub const DEFAULT_COLLECTION: &str = "mutex";
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(1000);
/// Shorter retry intervals are raised to this.
pub const MIN_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Per-call lock options. Unset fields fall back to [`LockConfig::defaults`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockOptions {
    #[serde(rename = "expires_in_ms", with = "millis", skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<Duration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<bool>,

    #[serde(rename = "retry_interval_ms", with = "millis", skip_serializing_if = "Option::is_none")]
    pub retry_interval: Option<Duration>,
}

impl LockOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expires_in(mut self, ttl: Duration) -> Self {
        self.expires_in = Some(ttl);
        self
    }

    pub fn retry(mut self, retry: bool) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = Some(interval);
        self
    }

    /// Fields set on `self` win over `defaults`.
    ///
    /// A zero expiry means no expiry, and the retry interval never drops
    /// below [`MIN_RETRY_INTERVAL`].
    pub fn merged_over(&self, defaults: &LockOptions) -> ResolvedOptions {
        ResolvedOptions {
            expires_in: self
                .expires_in
                .or(defaults.expires_in)
                .filter(|ttl| !ttl.is_zero()),
            retry: self.retry.or(defaults.retry).unwrap_or(true),
            retry_interval: self
                .retry_interval
                .or(defaults.retry_interval)
                .unwrap_or(DEFAULT_RETRY_INTERVAL)
                .max(MIN_RETRY_INTERVAL),
        }
    }
}

/// Options with every fallback applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub expires_in: Option<Duration>,
    pub retry: bool,
    pub retry_interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Collection holding the lease documents.
    pub collection: String,
    pub defaults: LockOptions,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            defaults: LockOptions::default(),
        }
    }
}

impl LockConfig {
    pub fn new(collection: impl Into<String>) -> Result<Self> {
        let config = Self {
            collection: collection.into(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_defaults(mut self, defaults: LockOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.collection.is_empty() {
            return Err(crate::Error::Config("collection name must not be empty".into()));
        }
        Ok(())
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
