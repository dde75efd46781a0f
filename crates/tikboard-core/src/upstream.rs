use serde::{Deserialize, Serialize};

/// One of the backend services the orchestrator fans out to.
///
/// Serialized in `snake_case` so it can key the `services_status` map of a
/// consolidated response directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Upstream {
    Users,
    Accounts,
    Metrics,
    Dashboard,
}

impl Upstream {
    /// Every upstream, in merge order.
    pub const ALL: [Upstream; 4] = [
        Upstream::Users,
        Upstream::Accounts,
        Upstream::Metrics,
        Upstream::Dashboard,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Upstream::Users => "users",
            Upstream::Accounts => "accounts",
            Upstream::Metrics => "metrics",
            Upstream::Dashboard => "dashboard",
        }
    }

    /// Upper-case token used to build per-upstream env var names,
    /// e.g. `TIKBOARD_USERS_TIMEOUT_SECS`.
    #[must_use]
    pub fn env_token(self) -> &'static str {
        match self {
            Upstream::Users => "USERS",
            Upstream::Accounts => "ACCOUNTS",
            Upstream::Metrics => "METRICS",
            Upstream::Dashboard => "DASHBOARD",
        }
    }
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified reason an upstream call failed.
///
/// The first three kinds are transient and worth retrying; the last two are
/// returned to the caller on the first occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    ConnectionRefused,
    UpstreamServerError,
    UpstreamClientError,
    MalformedResponse,
}

impl FailureKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::ConnectionRefused => "connection_refused",
            FailureKind::UpstreamServerError => "upstream_server_error",
            FailureKind::UpstreamClientError => "upstream_client_error",
            FailureKind::MalformedResponse => "malformed_response",
        }
    }

    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            FailureKind::Timeout | FailureKind::ConnectionRefused | FailureKind::UpstreamServerError
        )
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
