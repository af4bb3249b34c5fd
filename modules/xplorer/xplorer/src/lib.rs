//! XPLORER data core
//!
//! The public models and client contract are defined in `xplorer-sdk` and
//! re-exported here. This crate adds the HTTP-backed client, the geo caches,
//! the enrichment queue, the aggregator and the display formatters.

pub use xplorer_sdk::{
    GeoLocation, GeoPoint, HistorySnapshot, NetworkApiClient, NetworkStats, NodeMetrics,
    NodeRecord, NodeStatus, PENDING_LOCATION, RemoteNode, RemoteStats, XplorerError,
};

pub mod config;
pub mod domain;
pub mod infra;

pub use config::{EnrichmentConfig, XplorerConfig};
pub use domain::aggregator::{AggregatorConfig, GlobalOutcome, NetworkDataAggregator, PageOutcome};
pub use domain::collection::GeoCoverage;
pub use domain::enrichment::{EnrichmentOutcome, EnrichmentQueue, WorkerState};
pub use domain::error::DomainError;
pub use domain::formatters;
pub use domain::geo_cache::{GeoCache, InMemoryGeoCache};
pub use infra::{FileGeoCache, HttpNetworkApi};

use std::sync::Arc;

/// Wire an aggregator to the HTTP API and the configured geo cache.
///
/// # Errors
/// Returns `DomainError` if the configuration is invalid, a client cannot be
/// built or the cache file is unusable.
pub fn build_aggregator(config: &XplorerConfig) -> Result<NetworkDataAggregator, DomainError> {
    config.validate()?;

    let api: Arc<dyn NetworkApiClient> = Arc::new(HttpNetworkApi::new(config)?);
    let cache: Arc<dyn GeoCache> = match &config.geo_cache_path {
        Some(path) => Arc::new(FileGeoCache::open(path)?),
        None => Arc::new(InMemoryGeoCache::new()),
    };

    Ok(NetworkDataAggregator::new(
        api,
        cache,
        AggregatorConfig::from(config),
    ))
}
