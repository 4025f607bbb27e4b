//! Error types for the market data client

use crate::constants::FALLBACK_STATUS_CODE;
use thiserror::Error;

/// Errors raised by an [`HttpTransport`](crate::transport::HttpTransport)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport refused the URL before sending anything
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    /// The request was sent but did not complete
    #[error("Request failed: {message}")]
    Failed {
        /// HTTP status, if the failure happened after one was received
        status: Option<u16>,
        message: String,
    },
}

impl TransportError {
    /// Creates a Failed error with no status
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            status: None,
            message: message.into(),
        }
    }
}

/// URL-family failures carried by [`CryptoApiError::UrlError`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestUrlError {
    /// The endpoint could not be turned into a valid URL
    #[error("Unsupported URL: {url}")]
    UnsupportedUrl { url: String },

    /// The URL was built but the transport rejected it
    #[error("URL rejected by transport ({url}): {message}")]
    Rejected { url: String, message: String },
}

/// Every way a fetch can fail
///
/// Exactly one variant describes a failed fetch. Variants are constructed at
/// the step that failed and forwarded unchanged.
#[derive(Debug, Error)]
pub enum CryptoApiError {
    /// URL could not be built or was rejected
    #[error("URL error: {0}")]
    UrlError(#[source] RequestUrlError),

    /// Non-success HTTP status, or a transport failure with no status
    #[error("Response error: HTTP {0}")]
    ResponseError(u16),

    /// Body did not decode into the requested model
    #[error("Decoding error: {0}")]
    DecodingError(#[from] serde_json::Error),

    /// Uncategorized failure
    #[error("Unknown error")]
    AnyError,
}

/// Fieldless tag for branching on a [`CryptoApiError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKindTag {
    Url,
    Response,
    Decoding,
    Any,
}

impl CryptoApiError {
    /// Creates an UnsupportedUrl error for the given composed URL
    pub fn unsupported_url(url: impl Into<String>) -> Self {
        Self::UrlError(RequestUrlError::UnsupportedUrl { url: url.into() })
    }

    /// Classifies a transport failure for the given request URL
    pub fn from_transport(url: &str, error: TransportError) -> Self {
        match error {
            TransportError::InvalidUrl(message) => Self::UrlError(RequestUrlError::Rejected {
                url: url.to_string(),
                message,
            }),
            TransportError::Failed { status, .. } => {
                Self::ResponseError(status.unwrap_or(FALLBACK_STATUS_CODE))
            }
        }
    }

    pub fn kind(&self) -> ErrorKindTag {
        match self {
            Self::UrlError(_) => ErrorKindTag::Url,
            Self::ResponseError(_) => ErrorKindTag::Response,
            Self::DecodingError(_) => ErrorKindTag::Decoding,
            Self::AnyError => ErrorKindTag::Any,
        }
    }

    /// HTTP status code, for ResponseError only
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ResponseError(code) => Some(*code),
            _ => None,
        }
    }
}

/// Errors raised while assembling a service
#[derive(Debug, Error)]
pub enum SetupError {
    /// HTTP client could not be built
    #[error("Transport setup failed: {0}")]
    Transport(#[from] TransportError),

    /// Called outside a tokio runtime
    #[error("No tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    /// Primary context thread could not be started
    #[error("Primary context failed to start: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_without_status_falls_back_to_500() {
        let err = CryptoApiError::from_transport(
            "https://example.com/tickers",
            TransportError::failed("connection refused"),
        );
        assert_eq!(err.status_code(), Some(500));
    }

    #[test]
    fn test_failed_with_status_keeps_it() {
        let err = CryptoApiError::from_transport(
            "https://example.com/tickers",
            TransportError::Failed {
                status: Some(502),
                message: "bad gateway".into(),
            },
        );
        assert_eq!(err.status_code(), Some(502));
    }

    #[test]
    fn test_invalid_url_maps_to_url_error() {
        let err = CryptoApiError::from_transport(
            "https://example.com/x",
            TransportError::InvalidUrl("scheme not allowed".into()),
        );
        assert_eq!(err.kind(), ErrorKindTag::Url);
        assert!(err.to_string().contains("scheme not allowed"));
    }

    #[test]
    fn test_json_error_converts_to_decoding() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: CryptoApiError = json_err.into();
        assert_eq!(err.kind(), ErrorKindTag::Decoding);
        assert_eq!(err.status_code(), None);
    }
}
