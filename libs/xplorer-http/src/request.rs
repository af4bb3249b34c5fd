use crate::client::{BufferedService, map_buffer_error};
use crate::config::TransportSecurity;
use crate::error::{HttpError, InvalidUriKind};
use crate::response::{HttpResponse, ResponseBody};
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Full;
use tower::{Service, ServiceExt};

/// HTTP request builder
///
/// Created by [`crate::HttpClient::get`]. Header errors are deferred and
/// reported by [`send()`](RequestBuilder::send).
#[must_use = "RequestBuilder does nothing until .send() is called"]
pub struct RequestBuilder {
    service: BufferedService,
    max_body_size: usize,
    method: http::Method,
    url: String,
    headers: Vec<(http::header::HeaderName, http::header::HeaderValue)>,
    error: Option<HttpError>,
    transport_security: TransportSecurity,
}

impl RequestBuilder {
    pub(crate) fn new(
        service: BufferedService,
        max_body_size: usize,
        method: http::Method,
        url: String,
        transport_security: TransportSecurity,
    ) -> Self {
        Self {
            service,
            max_body_size,
            method,
            url,
            headers: Vec::new(),
            error: None,
            transport_security,
        }
    }

    /// Add a single header to the request
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.error.is_some() {
            return self;
        }

        let parsed = http::header::HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| HttpError::RequestBuild(e.into()))
            .and_then(|name| {
                http::header::HeaderValue::from_str(value)
                    .map(|value| (name, value))
                    .map_err(HttpError::from)
            });

        match parsed {
            Ok(pair) => self.headers.push(pair),
            Err(e) => self.error = Some(e),
        }
        self
    }

    fn validate_url(&self) -> Result<http::Uri, HttpError> {
        let uri: http::Uri =
            self.url
                .parse()
                .map_err(|e: http::uri::InvalidUri| HttpError::InvalidUri {
                    url: self.url.clone(),
                    kind: InvalidUriKind::ParseError,
                    reason: e.to_string(),
                })?;

        if uri.authority().is_none() {
            return Err(HttpError::InvalidUri {
                url: self.url.clone(),
                kind: InvalidUriKind::MissingAuthority,
                reason: "missing host/authority".to_owned(),
            });
        }

        match uri.scheme_str() {
            Some("https") => Ok(uri),
            Some("http") => match self.transport_security {
                TransportSecurity::AllowInsecureHttp => Ok(uri),
                TransportSecurity::TlsOnly => Err(HttpError::InvalidScheme {
                    scheme: "http".to_owned(),
                    reason: "HTTPS required (transport security is TlsOnly)".to_owned(),
                }),
            },
            Some(scheme) => Err(HttpError::InvalidScheme {
                scheme: scheme.to_owned(),
                reason: "only http:// and https:// schemes are supported".to_owned(),
            }),
            None => Err(HttpError::InvalidUri {
                url: self.url.clone(),
                kind: InvalidUriKind::MissingScheme,
                reason: "missing scheme".to_owned(),
            }),
        }
    }

    /// Send the request and return the response
    ///
    /// Returns `Ok` for every HTTP status; use
    /// [`HttpResponse::error_for_status`] or [`HttpResponse::json`] to turn
    /// non-2xx responses into errors.
    ///
    /// # Errors
    ///
    /// Returns `HttpError` if the URL or headers are invalid, the scheme is not
    /// allowed, the transport fails or the request times out.
    pub async fn send(mut self) -> Result<HttpResponse, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        let uri = self.validate_url()?;

        let mut builder = Request::builder().method(self.method).uri(uri);
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }
        let request = builder.body(Full::new(Bytes::new()))?;

        let service = self.service.ready().await.map_err(map_buffer_error)?;
        let inner: Response<ResponseBody> = service.call(request).await.map_err(map_buffer_error)?;

        Ok(HttpResponse {
            inner,
            max_body_size: self.max_body_size,
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::HttpClient;
    use crate::error::{HttpError, InvalidUriKind};

    #[tokio::test]
    async fn test_relative_url_rejected() {
        let client = HttpClient::builder().allow_insecure_http().build().unwrap();
        let result = client.get("/nodes?page=1").send().await;

        assert!(matches!(
            result,
            Err(HttpError::InvalidUri {
                kind: InvalidUriKind::MissingAuthority,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_unsupported_scheme_rejected() {
        let client = HttpClient::builder().allow_insecure_http().build().unwrap();
        let result = client.get("ftp://example.com/nodes").send().await;

        assert!(matches!(result, Err(HttpError::InvalidScheme { .. })));
    }

    #[tokio::test]
    async fn test_invalid_header_deferred_to_send() {
        let client = HttpClient::builder().allow_insecure_http().build().unwrap();
        let result = client
            .get("http://localhost:1/stats")
            .header("x-bad", "line\nbreak")
            .send()
            .await;

        assert!(matches!(result, Err(HttpError::InvalidHeaderValue(_))));
    }
}
