use std::net::SocketAddr;

use crate::upstream::Upstream;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Connection settings for one upstream service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// Base URL, e.g. `http://localhost:8081`. Endpoint paths are appended.
    pub base_url: String,
    /// Per-attempt request timeout.
    pub timeout_secs: u64,
    /// Additional attempts after the first on transient failures.
    pub max_retries: u32,
    /// Base delay of the exponential backoff between attempts.
    pub backoff_base_ms: u64,
}

impl UpstreamConfig {
    /// Settings for a client pointed at `base_url` with the production
    /// defaults (30 s timeout, 2 retries, 1 s backoff base).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 30,
            max_retries: 2,
            backoff_base_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub users: UpstreamConfig,
    pub accounts: UpstreamConfig,
    pub metrics: UpstreamConfig,
    pub dashboard: UpstreamConfig,
    /// Timeout of a single health probe request. Probes are never retried.
    pub health_timeout_secs: u64,
    /// Optional wall-clock limit for one whole consolidation. Upstreams still
    /// in flight when it elapses are recorded as timed out.
    pub consolidation_deadline_ms: Option<u64>,
}

impl AppConfig {
    #[must_use]
    pub fn upstream(&self, upstream: Upstream) -> &UpstreamConfig {
        match upstream {
            Upstream::Users => &self.users,
            Upstream::Accounts => &self.accounts,
            Upstream::Metrics => &self.metrics,
            Upstream::Dashboard => &self.dashboard,
        }
    }
}
