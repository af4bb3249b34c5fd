//! Configuration for the explorer data core.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Largest page size the telemetry API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Explorer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct XplorerConfig {
    /// Base URL of the telemetry API.
    pub api_base_url: String,

    /// Base URL of the IP geolocation provider.
    pub geo_base_url: String,

    /// Nodes requested per page (1..=100).
    pub page_size: u32,

    /// Per-request timeout for both HTTP clients.
    #[serde(with = "duration_str")]
    pub request_timeout: Duration,

    pub user_agent: String,

    /// Durable geo cache file. In-memory cache when unset.
    pub geo_cache_path: Option<PathBuf>,

    pub enrichment: EnrichmentConfig,
}

impl Default for XplorerConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://xandeum-api.onrender.com".to_owned(),
            geo_base_url: "http://ip-api.com".to_owned(),
            page_size: 50,
            request_timeout: Duration::from_secs(30),
            user_agent: format!("xplorer/{}", env!("CARGO_PKG_VERSION")),
            geo_cache_path: None,
            enrichment: EnrichmentConfig::default(),
        }
    }
}

impl XplorerConfig {
    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidConfig` naming the offending field.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(DomainError::invalid_config(
                "page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}, got {}", self.page_size),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(DomainError::invalid_config(
                "request_timeout",
                "must be greater than zero",
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(DomainError::invalid_config("user_agent", "must not be empty"));
        }
        Ok(())
    }
}

/// Pacing of the geo-enrichment worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnrichmentConfig {
    /// Pause after an address served from the cache.
    #[serde(with = "duration_str")]
    pub cache_hit_delay: Duration,

    /// Pause after a provider lookup, successful or not.
    #[serde(with = "duration_str")]
    pub lookup_delay: Duration,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            cache_hit_delay: Duration::from_millis(10),
            lookup_delay: Duration::from_millis(1200),
        }
    }
}

/// Durations as humantime strings (`"1200ms"`, `"30s"`).
mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw)
            .map_err(|e| de::Error::custom(format!("invalid duration '{raw}': {e}")))
    }
}
