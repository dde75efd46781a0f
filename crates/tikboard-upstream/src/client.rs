//! Shared HTTP plumbing for the upstream service clients.
//!
//! [`UpstreamClient`] owns one `reqwest` connection pool per upstream, resolves
//! endpoint paths against the configured base URL, classifies non-2xx answers
//! and wraps every retried call in exponential back-off.

use std::time::Duration;

use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tikboard_core::{Upstream, UpstreamConfig};

use crate::error::UpstreamError;
use crate::retry::retry_with_backoff;

const USER_AGENT: &str = concat!("tikboard/", env!("CARGO_PKG_VERSION"));

/// Upper bound of the TCP connect phase, independent of the request timeout.
const MAX_CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP client bound to one upstream service.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    upstream: Upstream,
    client: Client,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl UpstreamClient {
    /// Creates a client for `upstream` from its connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`UpstreamError::InvalidBaseUrl`] if the base
    /// URL is not an absolute `http(s)` URL.
    pub fn with_config(upstream: Upstream, config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(
                config.timeout_secs.min(MAX_CONNECT_TIMEOUT_SECS),
            ))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            upstream,
            client,
            base_url: parse_base_url(&config.base_url)?,
            max_retries: config.max_retries,
            backoff_base_ms: config.backoff_base_ms,
        })
    }

    /// Resolves `path` against the base URL, keeping any base path prefix.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, UpstreamError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| UpstreamError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Sends a GET to `path` and parses the JSON body, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns the classified [`UpstreamError`] of the last attempt.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, UpstreamError> {
        let url = self.endpoint(path)?;
        let url = &url;
        retry_with_backoff(self.upstream, self.max_retries, self.backoff_base_ms, move || {
            self.send_json::<T, ()>(Method::GET, url, None)
        })
        .await
    }

    /// Sends a POST with a JSON `body` to `path` and parses the JSON answer,
    /// retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns the classified [`UpstreamError`] of the last attempt.
    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, UpstreamError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        let url = &url;
        retry_with_backoff(self.upstream, self.max_retries, self.backoff_base_ms, move || {
            self.send_json::<T, B>(Method::POST, url, Some(body))
        })
        .await
    }

    /// Performs a single reachability request bounded by `timeout`.
    ///
    /// Only the status is checked; the body is never parsed and the call is
    /// never retried.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Http`] on transport failure or timeout and a
    /// status error for any non-2xx answer.
    pub async fn ping<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        timeout: Duration,
    ) -> Result<(), UpstreamError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        let mut request = self.client.request(method, url.clone()).timeout(timeout);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::from_status(status, &url));
        }
        Ok(())
    }

    /// One attempt: send, check the status, then parse the body as `T`.
    async fn send_json<T, B>(
        &self,
        method: Method,
        url: &Url,
        body: Option<&B>,
    ) -> Result<T, UpstreamError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let context = format!("{method} {}", url.path());
        let mut request = self.client.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::from_status(status, url));
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|source| UpstreamError::MalformedResponse { context, source })
    }
}

/// Parses and normalises a base URL so that it ends with exactly one slash.
///
/// Without the trailing slash `Url::join` would replace the last path segment
/// of a base such as `http://gateway/metrics`.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, UpstreamError> {
    let invalid = |reason: String| UpstreamError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason,
    };

    let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
    let url = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> UpstreamClient {
        UpstreamClient::with_config(Upstream::Metrics, &UpstreamConfig::new(base_url))
            .expect("client construction should not fail")
    }

    #[test]
    fn endpoint_appends_path_to_base() {
        let client = test_client("http://localhost:8000");
        let url = client.endpoint("dbquery/user").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/dbquery/user");
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let client = test_client("http://gateway.local/metrics/");
        let url = client.endpoint("/dbquery/admin").unwrap();
        assert_eq!(url.as_str(), "http://gateway.local/metrics/dbquery/admin");
    }

    #[test]
    fn base_url_without_scheme_is_rejected() {
        let err = parse_base_url("localhost:8000").unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidBaseUrl { .. }), "{err:?}");
    }

    #[test]
    fn garbage_base_url_is_rejected() {
        let err = UpstreamClient::with_config(Upstream::Users, &UpstreamConfig::new("not a url"))
            .unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidBaseUrl { .. }), "{err:?}");
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let err = parse_base_url("ftp://files.local").unwrap_err();
        assert!(
            err.to_string().contains("unsupported scheme"),
            "unexpected message: {err}"
        );
    }
}
