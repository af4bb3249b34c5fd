use crate::builder::HttpClientBuilder;
use crate::config::TransportSecurity;
use crate::error::HttpError;
use crate::request::RequestBuilder;
use crate::response::ResponseBody;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Full;
use std::future::Future;
use std::pin::Pin;
use tower::buffer::Buffer;

/// Future type of the inner boxed service
pub type ServiceFuture =
    Pin<Box<dyn Future<Output = Result<Response<ResponseBody>, HttpError>> + Send>>;

/// Buffered service shared by all clones of a client
pub type BufferedService = Buffer<Request<Full<Bytes>>, ServiceFuture>;

/// HTTP client over a tower service stack
///
/// `HttpClient` is `Clone + Send + Sync`; cloning only clones the buffer
/// channel, so store it directly without a `Mutex`.
///
/// ```ignore
/// struct TelemetryApi {
///     http: HttpClient,
/// }
///
/// impl TelemetryApi {
///     async fn stats(&self) -> Result<Stats, HttpError> {
///         self.http.get("https://api.example.com/stats").send().await?.json().await
///     }
/// }
/// ```
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) service: BufferedService,
    pub(crate) max_body_size: usize,
    pub(crate) transport_security: TransportSecurity,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    ///
    /// # Errors
    /// Returns an error if TLS initialization fails
    pub fn new() -> Result<Self, HttpError> {
        HttpClientBuilder::new().build()
    }

    /// Create a builder for configuring the HTTP client
    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Create a GET request builder
    ///
    /// The URL must be absolute. Query parameters are encoded by the caller.
    pub fn get(&self, url: &str) -> RequestBuilder {
        RequestBuilder::new(
            self.service.clone(),
            self.max_body_size,
            http::Method::GET,
            url.to_owned(),
            self.transport_security,
        )
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("max_body_size", &self.max_body_size)
            .field("transport_security", &self.transport_security)
            .finish_non_exhaustive()
    }
}

/// Map buffer errors to `HttpError`
///
/// The buffer either forwards the inner service error or reports that its
/// worker has shut down.
pub fn map_buffer_error(err: tower::BoxError) -> HttpError {
    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(err) => {
            tracing::error!(error = %err, "buffer worker closed unexpectedly");
            HttpError::ServiceClosed
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::error::HttpError;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn test_client() -> HttpClient {
        HttpClientBuilder::new().allow_insecure_http().build().unwrap()
    }

    #[tokio::test]
    async fn test_http_client_get() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/stats");
            then.status(200).json_body(json!({"total_nodes": 3}));
        });

        let client = test_client();
        let url = format!("{}/stats", server.base_url());
        let resp = client.get(&url).send().await.unwrap();

        assert_eq!(resp.status(), http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_json_body_parsing() {
        #[derive(serde::Deserialize)]
        struct Stats {
            total_nodes: u64,
            online_nodes: u64,
        }

        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/stats");
            then.status(200)
                .json_body(json!({"total_nodes": 10, "online_nodes": 7}));
        });

        let client = test_client();
        let url = format!("{}/stats", server.base_url());
        let stats: Stats = client.get(&url).send().await.unwrap().json().await.unwrap();

        assert_eq!(stats.total_nodes, 10);
        assert_eq!(stats.online_nodes, 7);
    }

    #[tokio::test]
    async fn test_json_reports_non_success_status() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/history");
            then.status(503).body("maintenance");
        });

        let client = test_client();
        let url = format!("{}/history", server.base_url());
        let result = client
            .get(&url)
            .send()
            .await
            .unwrap()
            .json::<serde_json::Value>()
            .await;

        match result {
            Err(HttpError::HttpStatus {
                status,
                body_preview,
            }) => {
                assert_eq!(status, http::StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body_preview, "maintenance");
            }
            other => panic!("expected HttpStatus error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_body_size_limit() {
        let server = MockServer::start();
        let large_body = "x".repeat(64 * 1024);
        let _m = server.mock(|when, then| {
            when.method(GET).path("/nodes");
            then.status(200).body(&large_body);
        });

        let client = HttpClientBuilder::new()
            .allow_insecure_http()
            .max_body_size(1024)
            .build()
            .unwrap();

        let url = format!("{}/nodes", server.base_url());
        let result = client.get(&url).send().await.unwrap().bytes().await;

        assert!(matches!(result, Err(HttpError::BodyTooLarge { .. })));
    }

    #[tokio::test]
    async fn test_custom_user_agent() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/json/1.2.3.4")
                .header("user-agent", "xplorer-test/9.9");
            then.status(200).json_body(json!({"status": "success"}));
        });

        let client = HttpClientBuilder::new()
            .allow_insecure_http()
            .user_agent("xplorer-test/9.9")
            .build()
            .unwrap();

        let url = format!("{}/json/1.2.3.4", server.base_url());
        let resp = client.get(&url).send().await.unwrap();

        assert_eq!(resp.status(), http::StatusCode::OK);
        m.assert();
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).delay(Duration::from_millis(500));
        });

        let client = HttpClientBuilder::new()
            .allow_insecure_http()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();

        let url = format!("{}/slow", server.base_url());
        let result = client.get(&url).send().await;

        assert!(matches!(result, Err(HttpError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_plain_http_rejected_when_tls_only() {
        let client = HttpClient::new().unwrap();
        let result = client.get("http://ip-api.com/json/1.2.3.4").send().await;

        assert!(matches!(result, Err(HttpError::InvalidScheme { .. })));
    }
}
