//! Concurrent fan-out to the four upstreams and the partial-failure merge.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tikboard_core::{
    AppConfig, DashboardEntry, FailureKind, MetricsReport, ScrapedAccount, Upstream, User,
};
use tikboard_upstream::{
    AccountsClient, DashboardClient, FetchOutcome, MetricsClient, UpstreamError, UsersClient,
};
use tokio::time::Instant;

use crate::aggregate::summarize;
use crate::types::{ConsolidatedResult, Metadata, ServiceStatus, SummaryResult};

/// Holds one client per upstream and answers dashboard requests.
///
/// Cheap to share behind an `Arc`; no state is written after construction.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    pub(crate) users: UsersClient,
    pub(crate) accounts: AccountsClient,
    pub(crate) metrics: MetricsClient,
    pub(crate) dashboard: DashboardClient,
    pub(crate) health_timeout: Duration,
    deadline: Option<Duration>,
}

impl Orchestrator {
    /// Builds the four upstream clients from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] if any client cannot be constructed, e.g. an
    /// upstream base URL is invalid.
    pub fn new(config: &AppConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            users: UsersClient::new(&config.users)?,
            accounts: AccountsClient::new(&config.accounts)?,
            metrics: MetricsClient::new(&config.metrics)?,
            dashboard: DashboardClient::new(&config.dashboard)?,
            health_timeout: Duration::from_secs(config.health_timeout_secs),
            deadline: config.consolidation_deadline_ms.map(Duration::from_millis),
        })
    }

    /// Fetches all four upstreams concurrently and merges whatever succeeded.
    ///
    /// Never fails: a failed upstream contributes its empty default and a
    /// `failed` status entry. When `user_id` is set, users, accounts and
    /// metrics are filtered to that user; the dashboard feed never is.
    pub async fn consolidate(&self, user_id: Option<i64>) -> ConsolidatedResult {
        tracing::info!(?user_id, "starting consolidation");
        let deadline = self.deadline.map(|d| Instant::now() + d);

        let (users, accounts, metrics, dashboard) = tokio::join!(
            settle(Upstream::Users, deadline, self.fetch_users(user_id)),
            settle(Upstream::Accounts, deadline, self.fetch_accounts(user_id)),
            settle(
                Upstream::Metrics,
                deadline,
                self.metrics.query_user_metrics(user_id, None)
            ),
            settle(Upstream::Dashboard, deadline, self.dashboard.dashboard_info()),
        );

        let consolidated = merge(users, accounts, metrics, dashboard, Utc::now());
        let failed = consolidated
            .metadata
            .services_status
            .values()
            .filter(|s| **s != ServiceStatus::Ok)
            .count();
        tracing::info!(
            ?user_id,
            total_users = consolidated.metadata.total_users,
            total_accounts = consolidated.metadata.total_accounts,
            total_posts = consolidated.metadata.total_posts_analyzed,
            failed,
            "consolidation completed"
        );
        consolidated
    }

    /// Consolidates, then summarizes the result.
    pub async fn summary(&self, user_id: Option<i64>) -> SummaryResult {
        let consolidated = self.consolidate(user_id).await;
        let summary = summarize(&consolidated);
        tracing::info!(
            top_users = summary.rankings.top_users.len(),
            top_accounts = summary.rankings.top_accounts.len(),
            "summary generated"
        );
        summary
    }

    async fn fetch_users(&self, user_id: Option<i64>) -> Result<Vec<User>, UpstreamError> {
        match user_id {
            Some(id) => Ok(self.users.get_profile(id).await?.into_iter().collect()),
            None => self.users.list_users().await,
        }
    }

    async fn fetch_accounts(
        &self,
        user_id: Option<i64>,
    ) -> Result<Vec<ScrapedAccount>, UpstreamError> {
        match user_id {
            Some(id) => self.accounts.list_accounts_by_user(id).await,
            None => self.accounts.list_accounts().await,
        }
    }
}

/// Drives one upstream call to a terminal outcome, bounded by `deadline`.
async fn settle<T, F>(upstream: Upstream, deadline: Option<Instant>, call: F) -> FetchOutcome<T>
where
    F: Future<Output = Result<T, UpstreamError>>,
{
    let outcome = match deadline {
        Some(at) => match tokio::time::timeout_at(at, call).await {
            Ok(result) => FetchOutcome::from_result(result),
            Err(_) => FetchOutcome::deadline_exceeded(),
        },
        None => FetchOutcome::from_result(call.await),
    };

    if let FetchOutcome::Failure { kind, message } = &outcome {
        tracing::warn!(
            upstream = %upstream,
            kind = %kind,
            error = %message,
            "upstream failed, serving empty slot"
        );
    }
    outcome
}

/// Merges the four settled outcomes into a [`ConsolidatedResult`].
pub(crate) fn merge(
    users: FetchOutcome<Vec<User>>,
    accounts: FetchOutcome<Vec<ScrapedAccount>>,
    metrics: FetchOutcome<MetricsReport>,
    dashboard: FetchOutcome<Vec<DashboardEntry>>,
    timestamp: DateTime<Utc>,
) -> ConsolidatedResult {
    let mut services_status = BTreeMap::new();
    let mut record = |upstream: Upstream, failure: Option<FailureKind>| {
        let status = failure.map_or(ServiceStatus::Ok, ServiceStatus::Failed);
        services_status.insert(upstream, status);
    };

    let (users, failure) = users.into_parts();
    record(Upstream::Users, failure);
    let (scraped_accounts, failure) = accounts.into_parts();
    record(Upstream::Accounts, failure);
    let (metrics, failure) = metrics.into_parts();
    record(Upstream::Metrics, failure);
    let (dashboard_data, failure) = dashboard.into_parts();
    record(Upstream::Dashboard, failure);

    let metadata = Metadata {
        total_users: users.len(),
        total_accounts: scraped_accounts.len(),
        total_posts_analyzed: metrics.count.max(metrics.items.len() as u64),
        timestamp,
        services_status,
    };

    ConsolidatedResult {
        users,
        scraped_accounts,
        metrics,
        dashboard_data,
        metadata,
    }
}
