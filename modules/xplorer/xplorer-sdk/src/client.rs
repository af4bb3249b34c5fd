//! Object-safe client boundary for the remote telemetry API.
//!
//! Registered as `Arc<dyn NetworkApiClient>`; the HTTP implementation lives
//! in the `xplorer` crate and tests substitute in-memory fakes.

use async_trait::async_trait;

use crate::errors::XplorerError;
use crate::models::{GeoLocation, HistorySnapshot, RemoteNode, RemoteStats};

/// Read-only access to the telemetry API and the geolocation provider.
///
/// Implementations never retry; a failed call is reported once and the
/// caller decides what to do with it.
#[async_trait]
pub trait NetworkApiClient: Send + Sync {
    /// Fetch one page of node records.
    ///
    /// An empty vector means there are no more pages.
    async fn fetch_nodes(&self, page: u32, limit: u32) -> Result<Vec<RemoteNode>, XplorerError>;

    /// Fetch network-wide aggregate counters.
    async fn fetch_stats(&self) -> Result<RemoteStats, XplorerError>;

    /// Fetch the chronological series of network snapshots.
    async fn fetch_history(&self) -> Result<Vec<HistorySnapshot>, XplorerError>;

    /// Resolve the location of a single IP address.
    async fn lookup_geo(&self, ip: &str) -> Result<GeoLocation, XplorerError>;
}
