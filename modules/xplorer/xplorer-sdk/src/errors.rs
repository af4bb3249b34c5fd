//! Public error types for the `xplorer` module.
//!
//! Every variant is recoverable: consumers log it and keep showing whatever
//! data they already have.

use thiserror::Error;

/// Errors that can be returned by a [`crate::NetworkApiClient`] or by the
/// enrichment pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XplorerError {
    /// A telemetry endpoint (`/nodes`, `/stats`, `/history`) did not answer
    /// with a usable success response.
    #[error("Request to {endpoint} failed: {message}")]
    RequestFailed {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    /// The geolocation provider could not resolve an address, either because
    /// the transport failed or because it answered with a `fail` status.
    #[error("Geo lookup for {ip} failed: {reason}")]
    GeoLookupFailed { ip: String, reason: String },

    /// A persisted geo cache entry could not be decoded.
    #[error("Cache entry '{key}' is unreadable: {message}")]
    CacheRead { key: String, message: String },
}

impl XplorerError {
    /// Create a `RequestFailed` error.
    pub fn request_failed(
        endpoint: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::RequestFailed {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a `GeoLookupFailed` error.
    pub fn geo_lookup_failed(ip: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::GeoLookupFailed {
            ip: ip.into(),
            reason: reason.into(),
        }
    }

    /// Create a `CacheRead` error.
    pub fn cache_read(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CacheRead {
            key: key.into(),
            message: message.into(),
        }
    }
}
