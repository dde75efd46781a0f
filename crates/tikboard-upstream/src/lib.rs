//! HTTP clients for the services behind the dashboard.
//!
//! Every call runs with the upstream's configured timeout, retries transient
//! failures with exponential back-off and reports the rest as a classified
//! [`UpstreamError`].

pub mod client;
pub mod error;
pub mod outcome;
pub(crate) mod retry;
pub mod services;

pub use client::UpstreamClient;
pub use error::UpstreamError;
pub use outcome::FetchOutcome;
pub use services::{AccountsClient, DashboardClient, MetricsClient, UsersClient};
