use std::time::Duration;

/// Default User-Agent string for HTTP requests
pub const DEFAULT_USER_AGENT: &str = concat!("xplorer-http/", env!("CARGO_PKG_VERSION"));

/// Default maximum response body size (10 MB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Maximum body preview size kept in `HttpError::HttpStatus` (8 KB)
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;

/// Which URL schemes the client accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportSecurity {
    /// Only `https://` URLs are accepted
    #[default]
    TlsOnly,
    /// Both `http://` and `https://` URLs are accepted
    ///
    /// Needed for plain-HTTP services such as the free ip-api.com tier
    /// and for local mock servers in tests.
    AllowInsecureHttp,
}

/// Client configuration consumed by [`crate::HttpClientBuilder`]
///
/// TLS always verifies against the bundled Mozilla roots.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout (default: 30 seconds)
    pub request_timeout: Duration,

    /// Maximum response body size in bytes (default: 10 MB)
    pub max_body_size: usize,

    /// User-Agent header value
    pub user_agent: String,

    /// Transport security mode (default: `TlsOnly`)
    pub transport: TransportSecurity,

    /// Buffer capacity for concurrent request handling (default: 256)
    pub buffer_capacity: usize,

    /// Idle pooled connections are closed after this long (default: 90 seconds)
    pub pool_idle_timeout: Option<Duration>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: TransportSecurity::TlsOnly,
            buffer_capacity: 256,
            pool_idle_timeout: Some(Duration::from_secs(90)),
        }
    }
}
