//! XPLORER SDK
//!
//! Public surface of the `xplorer` module:
//! - `NetworkApiClient` trait (remote telemetry + geolocation reads)
//! - Model types for nodes, stats, history and geolocation
//! - Error type (`XplorerError`)
//!
//! ## Usage
//!
//! ```ignore
//! use xplorer_sdk::NetworkApiClient;
//!
//! let page = client.fetch_nodes(1, 50).await?;
//! let stats = client.fetch_stats().await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod client;
pub mod errors;
pub mod models;

pub use client::NetworkApiClient;
pub use errors::XplorerError;
pub use models::{
    GeoLocation, GeoPoint, HistorySnapshot, NetworkStats, NodeMetrics, NodeRecord, NodeStatus,
    PENDING_LOCATION, RemoteNode, RemoteStats,
};
