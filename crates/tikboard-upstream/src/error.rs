use thiserror::Error;

use tikboard_core::FailureKind;

/// Errors returned by the upstream service clients.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream answered with a 5xx status.
    #[error("upstream server error {status} from {url}")]
    ServerError { status: u16, url: String },

    /// The upstream answered with a non-2xx status that is not a 5xx.
    #[error("upstream rejected request with {status} from {url}")]
    ClientError { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("malformed response for {context}: {source}")]
    MalformedResponse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL is not an absolute `http(s)` URL.
    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl UpstreamError {
    /// Classifies the error into the failure taxonomy reported to callers.
    ///
    /// Transport failures other than timeouts all count as
    /// [`FailureKind::ConnectionRefused`]. A bad base URL is a configuration
    /// problem and is reported as a non-transient client error.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            UpstreamError::Http(e) if e.is_timeout() => FailureKind::Timeout,
            UpstreamError::Http(_) => FailureKind::ConnectionRefused,
            UpstreamError::ServerError { .. } => FailureKind::UpstreamServerError,
            UpstreamError::ClientError { .. } | UpstreamError::InvalidBaseUrl { .. } => {
                FailureKind::UpstreamClientError
            }
            UpstreamError::MalformedResponse { .. } => FailureKind::MalformedResponse,
        }
    }

    /// Builds the status error matching `status`.
    pub(crate) fn from_status(status: reqwest::StatusCode, url: &reqwest::Url) -> Self {
        if status.is_server_error() {
            UpstreamError::ServerError {
                status: status.as_u16(),
                url: url.to_string(),
            }
        } else {
            UpstreamError::ClientError {
                status: status.as_u16(),
                url: url.to_string(),
            }
        }
    }
}
