//! HTTP implementation of [`NetworkApiClient`].

use async_trait::async_trait;
use serde_json::Value;
use url::Url;
use xplorer_http::{HttpClient, HttpError};
use xplorer_sdk::{
    GeoLocation, HistorySnapshot, NetworkApiClient, RemoteNode, RemoteStats, XplorerError,
};

use super::dto::{GeoDto, HistoryDto, StatsDto, decode_nodes};
use crate::config::XplorerConfig;
use crate::domain::error::DomainError;

/// Talks to the telemetry API and the geolocation provider.
///
/// Stateless apart from its connection pools; never retries.
#[derive(Debug, Clone)]
pub struct HttpNetworkApi {
    api: HttpClient,
    geo: HttpClient,
    api_base: Url,
    geo_base: Url,
}

impl HttpNetworkApi {
    /// Build both HTTP clients from configuration.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidBaseUrl` for unusable base URLs and
    /// `DomainError::HttpClient` if a client cannot be built.
    pub fn new(config: &XplorerConfig) -> Result<Self, DomainError> {
        let api_base = parse_base(&config.api_base_url)?;
        let geo_base = parse_base(&config.geo_base_url)?;

        let mut api = HttpClient::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone());
        if api_base.scheme() == "http" {
            tracing::warn!(url = %api_base, "telemetry API configured over plain HTTP");
            api = api.allow_insecure_http();
        }

        // The free geolocation tier is only served over plain HTTP.
        let geo = HttpClient::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .allow_insecure_http();

        Ok(Self {
            api: api.build()?,
            geo: geo.build()?,
            api_base,
            geo_base,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        join(&self.api_base, segments)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: &Url,
    ) -> Result<T, XplorerError> {
        tracing::debug!(%url, "GET");
        let response = self
            .api
            .get(url.as_str())
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| request_failed(endpoint, &e))?;
        response
            .json::<T>()
            .await
            .map_err(|e| request_failed(endpoint, &e))
    }
}

#[async_trait]
impl NetworkApiClient for HttpNetworkApi {
    async fn fetch_nodes(&self, page: u32, limit: u32) -> Result<Vec<RemoteNode>, XplorerError> {
        let mut url = self.endpoint(&["nodes"]);
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());

        let body: Value = self.get_json("/nodes", &url).await?;
        Ok(decode_nodes(body))
    }

    async fn fetch_stats(&self) -> Result<RemoteStats, XplorerError> {
        let url = self.endpoint(&["stats"]);
        let dto: StatsDto = self.get_json("/stats", &url).await?;
        Ok(dto.into())
    }

    async fn fetch_history(&self) -> Result<Vec<HistorySnapshot>, XplorerError> {
        let url = self.endpoint(&["history"]);
        let dtos: Vec<HistoryDto> = self.get_json("/history", &url).await?;
        Ok(dtos.into_iter().map(HistorySnapshot::from).collect())
    }

    async fn lookup_geo(&self, ip: &str) -> Result<GeoLocation, XplorerError> {
        let url = join(&self.geo_base, &["json", ip]);
        let dto: GeoDto = self
            .geo
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| XplorerError::geo_lookup_failed(ip, e.to_string()))?
            .json()
            .await
            .map_err(|e| XplorerError::geo_lookup_failed(ip, e.to_string()))?;

        dto.into_location()
            .map_err(|reason| XplorerError::geo_lookup_failed(ip, reason))
    }
}

fn parse_base(raw: &str) -> Result<Url, DomainError> {
    let url = Url::parse(raw).map_err(|e| DomainError::invalid_base_url(raw, e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(DomainError::invalid_base_url(
            raw,
            "expected an http:// or https:// URL",
        ));
    }
    Ok(url)
}

/// Append path segments to `base`, tolerating a trailing slash.
fn join(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    // `parse_base` rejects cannot-be-a-base URLs.
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

fn request_failed(endpoint: &str, err: &HttpError) -> XplorerError {
    XplorerError::request_failed(
        endpoint,
        err.status().map(|s| s.as_u16()),
        err.to_string(),
    )
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn client(server: &MockServer) -> HttpNetworkApi {
        HttpNetworkApi::new(&XplorerConfig {
            api_base_url: server.base_url(),
            geo_base_url: server.base_url(),
            request_timeout: Duration::from_secs(5),
            ..XplorerConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_join_tolerates_trailing_slash() {
        let plain = parse_base("https://api.example.com").unwrap();
        let slashed = parse_base("https://api.example.com/v1/").unwrap();

        assert_eq!(join(&plain, &["stats"]).as_str(), "https://api.example.com/stats");
        assert_eq!(
            join(&slashed, &["json", "1.2.3.4"]).as_str(),
            "https://api.example.com/v1/json/1.2.3.4"
        );
    }

    #[test]
    fn test_rejects_non_http_base() {
        let cfg = XplorerConfig {
            api_base_url: "ftp://example.com".to_owned(),
            ..XplorerConfig::default()
        };
        assert!(matches!(
            HttpNetworkApi::new(&cfg),
            Err(DomainError::InvalidBaseUrl { .. })
        ));
        assert!(parse_base("not a url").is_err());
    }

    #[tokio::test]
    async fn test_fetch_nodes_sends_page_and_limit() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/nodes")
                .query_param("page", "2")
                .query_param("limit", "50");
            then.status(200).json_body(json!([
                { "ip_address": "1.2.3.4:6000", "status": "ONLINE", "version": "0.7.1" }
            ]));
        });

        let nodes = client(&server).fetch_nodes(2, 50).await.unwrap();

        mock.assert();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].ip_address, "1.2.3.4:6000");
    }

    #[tokio::test]
    async fn test_fetch_nodes_object_body_is_empty_page() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/nodes");
            then.status(200).json_body(json!({ "error": "db down" }));
        });

        assert!(client(&server).fetch_nodes(1, 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_request_failed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/stats");
            then.status(503).body("unavailable");
        });

        let err = client(&server).fetch_stats().await.unwrap_err();

        match err {
            XplorerError::RequestFailed {
                endpoint, status, ..
            } => {
                assert_eq!(endpoint, "/stats");
                assert_eq!(status, Some(503));
            }
            other => panic!("expected RequestFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_stats_and_history() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/stats");
            then.status(200).json_body(json!({
                "total_nodes": 10, "online_nodes": 8, "total_storage_bytes": 4096
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/history");
            then.status(200).json_body(json!([
                { "timestamp": "2025-01-01T00:00:00", "total_nodes": 9, "total_storage_committed": 1 },
                { "timestamp": "2025-01-02T00:00:00", "total_nodes": 10, "total_storage_committed": 2 }
            ]));
        });
        let api = client(&server);

        let stats = api.fetch_stats().await.unwrap();
        let history = api.fetch_history().await.unwrap();

        assert_eq!(stats.online_nodes, 8);
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].total_nodes, 10);
    }

    #[tokio::test]
    async fn test_lookup_geo_success() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/json/8.8.8.8");
            then.status(200).json_body(json!({
                "status": "success", "lat": 37.4, "lon": -122.1,
                "city": "Mountain View", "countryCode": "US"
            }));
        });

        let geo = client(&server).lookup_geo("8.8.8.8").await.unwrap();
        assert_eq!(geo.location_label(), "Mountain View, US");
    }

    #[tokio::test]
    async fn test_lookup_geo_fail_status_is_error_despite_200() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/json/10.0.0.1");
            then.status(200)
                .json_body(json!({ "status": "fail", "message": "private range" }));
        });

        let err = client(&server).lookup_geo("10.0.0.1").await.unwrap_err();
        assert_eq!(
            err,
            XplorerError::geo_lookup_failed("10.0.0.1", "private range")
        );
    }

    #[tokio::test]
    async fn test_lookup_geo_transport_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/json/1.1.1.1");
            then.status(429).body("slow down");
        });

        let err = client(&server).lookup_geo("1.1.1.1").await.unwrap_err();
        assert!(matches!(err, XplorerError::GeoLookupFailed { .. }));
    }
}
