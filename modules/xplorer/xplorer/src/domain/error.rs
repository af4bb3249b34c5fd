use thiserror::Error;

/// Errors raised while setting the module up: configuration, base URLs,
/// HTTP clients and the durable geo cache.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Geo cache at {path} is unusable: {message}")]
    CacheStore { path: String, message: String },

    #[error("Invalid configuration for '{field}': {message}")]
    InvalidConfig { field: &'static str, message: String },

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("HTTP client setup failed: {0}")]
    HttpClient(#[from] xplorer_http::HttpError),
}

impl DomainError {
    #[must_use]
    pub fn cache_store(path: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::CacheStore {
            path: path.to_string(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_base_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBaseUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_culprit() {
        let err = DomainError::cache_store("/tmp/geo.json", "not a JSON object");
        assert_eq!(
            err.to_string(),
            "Geo cache at /tmp/geo.json is unusable: not a JSON object"
        );

        let err = DomainError::invalid_config("page_size", "must be 1..=100");
        assert!(err.to_string().contains("'page_size'"));
    }

    #[test]
    fn test_http_error_converts() {
        let err: DomainError =
            xplorer_http::HttpError::Timeout(std::time::Duration::from_secs(1)).into();
        assert!(matches!(err, DomainError::HttpClient(_)));
        assert!(err.to_string().starts_with("HTTP client setup failed"));
    }
}
