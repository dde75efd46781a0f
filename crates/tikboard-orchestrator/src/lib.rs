//! Fan-out, merge and aggregation behind the dashboard API.
//!
//! [`Orchestrator::consolidate`] queries the users, accounts, metrics and
//! dashboard services concurrently and merges whatever succeeded;
//! [`summarize`] derives statistics and rankings from the merge;
//! [`Orchestrator::probe`] reports upstream reachability.

pub mod aggregate;
pub mod fanout;
pub mod health;
pub mod types;

pub use aggregate::{summarize, TOP_N};
pub use fanout::Orchestrator;
pub use types::{
    ConsolidatedResult, EngagementTrend, HealthStatus, Metadata, Rankings, ServiceStatus,
    SummaryResult, SummaryStats, TopAccount, TopPost, TopUser, Trends,
};
