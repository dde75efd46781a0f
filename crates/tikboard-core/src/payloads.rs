//! Typed response bodies of the four upstream services.
//!
//! Every field an upstream may omit carries `#[serde(default)]`, so a partial
//! record still parses. Each collection type has an empty `Default` that the
//! orchestrator substitutes when an upstream fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A registered dashboard user, as returned by the users service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
}

/// A TikTok account a user asked the scraper to follow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedAccount {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, alias = "accountName")]
    pub account_name: Option<String>,
    /// Owner of the account. The accounts service emits both `user_id` and
    /// `userId` depending on the endpoint.
    #[serde(default, alias = "userId")]
    pub user_id: Option<i64>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
}

/// Post identifier; the metrics service emits either numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostId {
    Numeric(i64),
    Text(String),
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostId::Numeric(n) => write!(f, "{n}"),
            PostId::Text(s) => f.write_str(s),
        }
    }
}

/// Per-post engagement metrics from the metrics service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostMetric {
    #[serde(default, rename = "postId")]
    pub post_id: Option<PostId>,
    #[serde(default, rename = "usernameTiktokAccount")]
    pub account: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    /// Engagement ratio in percent. `None` when the upstream did not score
    /// the post.
    #[serde(default)]
    pub engagement: Option<f64>,
    #[serde(default, rename = "totalInteractions")]
    pub total_interactions: u64,
    #[serde(default, rename = "datePosted")]
    pub date_posted: Option<String>,
}

/// Body of the metrics service's `dbquery` endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    #[serde(default)]
    pub items: Vec<PostMetric>,
    /// Number of posts the query matched. May exceed `items.len()` when the
    /// upstream paginates.
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub dashboard: Vec<Value>,
}

/// One entry of the global dashboard feed. The shape belongs to the
/// dashboard service and is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DashboardEntry(pub Value);

/// A stored scraper question. Passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Question(pub Value);
