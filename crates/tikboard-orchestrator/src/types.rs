//! Response shapes produced by the orchestrator.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use tikboard_core::{
    DashboardEntry, FailureKind, MetricsReport, PostId, ScrapedAccount, Upstream, User,
};

/// Merge of the four upstream payloads for one request.
///
/// Every slot is always present; a failed upstream leaves its slot at the
/// empty default and its status at [`ServiceStatus::Failed`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidatedResult {
    pub users: Vec<User>,
    pub scraped_accounts: Vec<ScrapedAccount>,
    pub metrics: MetricsReport,
    pub dashboard_data: Vec<DashboardEntry>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub total_users: usize,
    pub total_accounts: usize,
    pub total_posts_analyzed: u64,
    /// Captured once, after every upstream call settled.
    pub timestamp: DateTime<Utc>,
    pub services_status: BTreeMap<Upstream, ServiceStatus>,
}

/// Per-upstream result of a consolidation. Serialized as `"ok"` or
/// `"failed: <kind>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Ok,
    Failed(FailureKind),
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceStatus::Ok => f.write_str("ok"),
            ServiceStatus::Failed(kind) => write!(f, "failed: {kind}"),
        }
    }
}

impl Serialize for ServiceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Reachability of one upstream. Serialized as `"healthy"` or
/// `"unhealthy: <kind>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(FailureKind),
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => f.write_str("healthy"),
            HealthStatus::Unhealthy(kind) => write!(f, "unhealthy: {kind}"),
        }
    }
}

impl Serialize for HealthStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Statistics, rankings and trends derived from a [`ConsolidatedResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryResult {
    pub summary: SummaryStats,
    pub rankings: Rankings,
    pub trends: Trends,
    /// Timestamp of the consolidation the summary was computed from.
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_users: usize,
    pub total_accounts: usize,
    pub average_engagement: f64,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_interactions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rankings {
    pub top_users: Vec<TopUser>,
    pub top_accounts: Vec<TopAccount>,
    pub best_engagement: Vec<TopPost>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopUser {
    pub user_id: i64,
    pub accounts_count: usize,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopAccount {
    pub account: String,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_engagement: f64,
    pub post_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPost {
    pub post_id: Option<PostId>,
    pub account: Option<String>,
    pub engagement: Option<f64>,
    pub views: u64,
    pub likes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trends {
    /// Percent change of mean engagement from the older half of the posts to
    /// the newer half.
    pub growth_rate: f64,
    pub engagement_trend: EngagementTrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementTrend {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn service_status_serializes_as_label() {
        assert_eq!(serde_json::to_value(ServiceStatus::Ok).unwrap(), json!("ok"));
        assert_eq!(
            serde_json::to_value(ServiceStatus::Failed(FailureKind::Timeout)).unwrap(),
            json!("failed: timeout")
        );
    }

    #[test]
    fn health_status_serializes_as_label() {
        assert_eq!(
            serde_json::to_value(HealthStatus::Healthy).unwrap(),
            json!("healthy")
        );
        assert_eq!(
            serde_json::to_value(HealthStatus::Unhealthy(FailureKind::ConnectionRefused))
                .unwrap(),
            json!("unhealthy: connection_refused")
        );
    }

    #[test]
    fn status_map_is_keyed_by_upstream_name() {
        let map: BTreeMap<Upstream, ServiceStatus> = Upstream::ALL
            .into_iter()
            .map(|u| (u, ServiceStatus::Ok))
            .collect();
        let value = serde_json::to_value(&map).unwrap();
        assert_eq!(
            value,
            json!({"users": "ok", "accounts": "ok", "metrics": "ok", "dashboard": "ok"})
        );
    }

    #[test]
    fn trend_serializes_in_snake_case() {
        assert_eq!(
            serde_json::to_value(EngagementTrend::InsufficientData).unwrap(),
            json!("insufficient_data")
        );
    }
}
