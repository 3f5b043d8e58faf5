//! Configuration types for iconpack-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Transfer engine behavior (sub-batch size, timeouts, HTTP identity)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Number of fetches dispatched together in one sub-batch (default: 50)
    ///
    /// This is the only backpressure the engine applies. It bounds how many
    /// requests are in flight at once against the remote CDN.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Per-request timeout (default: 30 seconds, serialized as seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// User-Agent header sent with every fetch
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Capacity of the event broadcast channel (default: 1000)
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            event_buffer: default_event_buffer(),
        }
    }
}

/// Where icon URLs are derived from
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the achievement image CDN; `{cdn_base}/{app_id}/{icon}`
    #[serde(default = "default_cdn_base")]
    pub cdn_base: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            cdn_base: default_cdn_base(),
        }
    }
}

/// Compression applied to archive entries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// No compression (icons are already compressed images)
    #[default]
    Stored,
    /// Deflate compression
    Deflated,
}

impl From<Compression> for zip::CompressionMethod {
    fn from(compression: Compression) -> Self {
        match compression {
            Compression::Stored => zip::CompressionMethod::Stored,
            Compression::Deflated => zip::CompressionMethod::Deflated,
        }
    }
}

/// Archive output settings
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Compression for every entry (default: stored)
    #[serde(default)]
    pub compression: Compression,
}

/// Main configuration
///
/// Every field has a default, so `Config::default()` and an empty JSON
/// object both produce a working configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Transfer engine settings
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Icon source settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Archive settings
    #[serde(default)]
    pub archive: ArchiveConfig,
}

impl Config {
    /// Check the configuration for values the engine cannot work with
    ///
    /// Returns [`Error::Config`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        validate_batch_size(self.transfer.batch_size)?;
        if self.transfer.request_timeout.is_zero() {
            return Err(Error::config(
                "request_timeout",
                "request timeout must be greater than zero",
            ));
        }
        if self.transfer.event_buffer == 0 {
            return Err(Error::config(
                "event_buffer",
                "event buffer must hold at least one event",
            ));
        }
        if self.source.cdn_base.trim().is_empty() {
            return Err(Error::config("cdn_base", "CDN base URL must not be empty"));
        }
        Ok(())
    }
}

/// Reject a sub-batch size of zero
pub(crate) fn validate_batch_size(batch_size: usize) -> Result<()> {
    if batch_size == 0 {
        return Err(Error::config("batch_size", "batch size must be at least 1"));
    }
    Ok(())
}

fn default_batch_size() -> usize {
    50
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("iconpack-dl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_event_buffer() -> usize {
    1000
}

fn default_cdn_base() -> String {
    "https://cdn.cloudflare.steamstatic.com/steamcommunity/public/images/apps".to_string()
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
