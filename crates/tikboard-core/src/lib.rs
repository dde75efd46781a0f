//! Shared configuration and payload types for the tikboard orchestrator.

pub mod app_config;
pub mod config;
pub mod payloads;
pub mod upstream;

pub use app_config::{AppConfig, Environment, UpstreamConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use payloads::{
    DashboardEntry, MetricsReport, PostId, PostMetric, Question, ScrapedAccount, User,
};
pub use upstream::{FailureKind, Upstream};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
