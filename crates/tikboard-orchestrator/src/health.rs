use std::collections::BTreeMap;

use futures::future::join_all;
use tikboard_core::Upstream;

use crate::fanout::Orchestrator;
use crate::types::HealthStatus;

impl Orchestrator {
    /// Checks every upstream once, concurrently, with the probe timeout.
    ///
    /// Probes are never retried and never fail; an unreachable upstream is
    /// reported as [`HealthStatus::Unhealthy`].
    pub async fn probe(&self) -> BTreeMap<Upstream, HealthStatus> {
        join_all(Upstream::ALL.map(|upstream| self.probe_one(upstream)))
            .await
            .into_iter()
            .collect()
    }

    async fn probe_one(&self, upstream: Upstream) -> (Upstream, HealthStatus) {
        let timeout = self.health_timeout;
        let result = match upstream {
            Upstream::Users => self.users.ping(timeout).await,
            Upstream::Accounts => self.accounts.ping(timeout).await,
            Upstream::Metrics => self.metrics.ping(timeout).await,
            Upstream::Dashboard => self.dashboard.ping(timeout).await,
        };

        let status = match result {
            Ok(()) => HealthStatus::Healthy,
            Err(err) => {
                tracing::debug!(upstream = %upstream, error = %err, "health probe failed");
                HealthStatus::Unhealthy(err.kind())
            }
        };
        (upstream, status)
    }
}
