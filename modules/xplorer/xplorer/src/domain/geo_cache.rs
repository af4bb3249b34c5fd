//! Key-value cache for resolved node locations.
//!
//! Entries are keyed by base address and stored as small JSON documents so a
//! durable backend can persist them as-is. Entries never expire.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use xplorer_sdk::{GeoLocation, XplorerError};

/// String key-value store behind the enrichment queue.
pub trait GeoCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: String);
}

/// Cache key for a base address.
#[must_use]
pub fn cache_key(base_address: &str) -> String {
    format!("geo-cache-{base_address}")
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedGeo {
    lat: f64,
    lon: f64,
    #[serde(default)]
    city: String,
    #[serde(rename = "countryCode", default)]
    country_code: String,
}

/// Read the entry for `base_address`.
///
/// # Errors
/// Returns `XplorerError::CacheRead` if a stored value does not decode. The
/// entry is left in place.
pub fn read_entry(
    cache: &dyn GeoCache,
    base_address: &str,
) -> Result<Option<GeoLocation>, XplorerError> {
    let key = cache_key(base_address);
    let Some(raw) = cache.get(&key) else {
        return Ok(None);
    };

    let entry: CachedGeo =
        serde_json::from_str(&raw).map_err(|e| XplorerError::cache_read(&key, e.to_string()))?;

    Ok(Some(GeoLocation {
        lat: entry.lat,
        lon: entry.lon,
        city: entry.city,
        country_code: entry.country_code,
    }))
}

/// Store `geo` under the key for `base_address`.
pub fn write_entry(cache: &dyn GeoCache, base_address: &str, geo: &GeoLocation) {
    let entry = CachedGeo {
        lat: geo.lat,
        lon: geo.lon,
        city: geo.city.clone(),
        country_code: geo.country_code.clone(),
    };
    match serde_json::to_string(&entry) {
        Ok(value) => cache.set(&cache_key(base_address), value),
        Err(e) => tracing::warn!(base_address, error = %e, "failed to encode geo cache entry"),
    }
}

/// Process-local cache; contents are lost on exit.
#[derive(Debug, Default)]
pub struct InMemoryGeoCache {
    entries: DashMap<String, String>,
}

impl InMemoryGeoCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl GeoCache for InMemoryGeoCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: String) {
        self.entries.insert(key.to_owned(), value);
    }
}
