//! Public models for the `xplorer` module.
//!
//! Transport-agnostic data structures shared between the data core and its
//! consumers. Wire formats live in the implementation crate.

use std::fmt;

use time::OffsetDateTime;

/// Display location shown while a node's coordinates are being resolved.
pub const PENDING_LOCATION: &str = "Resolving...";

/// Reported liveness of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeStatus {
    Online,
    #[default]
    Offline,
}

impl NodeStatus {
    /// Map the status string served by the API.
    ///
    /// Only the exact value `ONLINE` counts as online; every other value,
    /// including ones the API may add later, is `Offline`. The verbatim
    /// string stays available as [`NodeRecord::source_status`].
    #[must_use]
    pub fn from_source(value: &str) -> Self {
        if value == "ONLINE" {
            Self::Online
        } else {
            Self::Offline
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "ONLINE",
            Self::Offline => "OFFLINE",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A node record as served by the telemetry API, before normalization.
///
/// Numeric fields the API omits are zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RemoteNode {
    pub id: Option<String>,
    pub ip_address: String,
    pub version: String,
    pub status: String,
    pub node_type: Option<String>,
    pub storage_committed_bytes: u64,
    pub storage_used_bytes: u64,
    pub last_seen: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub cpu_percent: f64,
    pub ram_used_bytes: u64,
    pub ram_total_bytes: u64,
    pub rpc_port: Option<u16>,
    pub packets_sent: u64,
    pub packets_received: u64,
    pub uptime_seconds: i64,
}

/// Raw network-wide counters as served by the telemetry API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemoteStats {
    pub total_nodes: u64,
    pub online_nodes: u64,
    pub total_storage_bytes: u64,
}

/// Network-wide counters prepared for display.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkStats {
    pub total_nodes: u64,
    pub online_nodes: u64,
    /// Human-readable total committed storage, e.g. `"1.5 TB"`.
    pub total_storage: String,
    /// `online / total * 100`, or `0` for an empty network.
    pub network_health: f64,
}

impl Default for NetworkStats {
    fn default() -> Self {
        Self {
            total_nodes: 0,
            online_nodes: 0,
            total_storage: "0 B".to_owned(),
            network_health: 0.0,
        }
    }
}

/// One point of the network history series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySnapshot {
    /// Timestamp exactly as the API reported it.
    pub timestamp: String,
    pub total_nodes: u64,
    /// Online count; older snapshots do not carry it.
    pub online_nodes: Option<u64>,
    pub total_storage_committed: u64,
}

/// Map coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A successful answer from the geolocation provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
    pub city: String,
    pub country_code: String,
}

impl GeoLocation {
    #[must_use]
    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lng: self.lon,
        }
    }

    /// `"City, CC"` label used as a node's display location.
    #[must_use]
    pub fn location_label(&self) -> String {
        format!("{}, {}", self.city, self.country_code)
    }
}

/// Host and traffic details shown on the node detail view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeMetrics {
    /// `"Public Node"` or `"Private Node"`.
    pub node_type: String,
    pub storage_used_bytes: u64,
    pub cpu_percent: f64,
    pub ram_used_bytes: u64,
    pub ram_total_bytes: u64,
    pub rpc_port: Option<u16>,
    pub packets_sent: u64,
    pub packets_received: u64,
    pub uptime_seconds: i64,
}

/// A normalized node as held in the explorer's collection.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    /// Unique within a loading session.
    pub id: String,
    /// Address including port, e.g. `"1.2.3.4:6000"`.
    pub full_address: String,
    /// Address without port; the geo cache key.
    pub base_address: String,
    pub version: String,
    pub status: NodeStatus,
    /// Status exactly as served by the API.
    pub source_status: String,
    pub storage_committed_bytes: u64,
    pub formatted_storage: String,
    pub last_seen: Option<OffsetDateTime>,
    pub geo: Option<GeoPoint>,
    /// `"City, CC"` once known, [`PENDING_LOCATION`] while unresolved.
    pub location: String,
    pub metrics: NodeMetrics,
}

impl NodeRecord {
    /// True once coordinates are known.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.geo.is_some()
    }

    /// True while the display location is the pending sentinel.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.location == PENDING_LOCATION
    }
}
