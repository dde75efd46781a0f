//! Typed clients for the four upstream services.
//!
//! Each client maps one service's endpoints onto [`UpstreamClient`] calls and
//! decodes the answer into the payload records of `tikboard_core`. A `null`
//! body is accepted wherever the service may send one and decodes to the empty
//! payload.

use std::time::Duration;

use reqwest::Method;
use serde_json::{Map, Value};
use tikboard_core::{
    DashboardEntry, MetricsReport, Question, ScrapedAccount, Upstream, UpstreamConfig, User,
};

use crate::client::UpstreamClient;
use crate::error::UpstreamError;

/// Builds the JSON body of a metrics `dbquery` call.
///
/// `filters` are merged after the identifier, so a filter with the same key
/// overrides it.
pub(crate) fn query_body(
    id_field: &str,
    id: Option<i64>,
    filters: Option<&Map<String, Value>>,
) -> Value {
    let mut body = Map::new();
    if let Some(id) = id {
        body.insert(id_field.to_owned(), Value::from(id));
    }
    if let Some(filters) = filters {
        body.extend(filters.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    Value::Object(body)
}

/// Client for the users service.
#[derive(Debug, Clone)]
pub struct UsersClient {
    inner: UpstreamClient,
}

impl UsersClient {
    /// # Errors
    ///
    /// Returns [`UpstreamError`] if the client cannot be constructed.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            inner: UpstreamClient::with_config(Upstream::Users, config)?,
        })
    }

    /// `GET /api/v1/auth/users`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`UpstreamError`] after retries are exhausted.
    pub async fn list_users(&self) -> Result<Vec<User>, UpstreamError> {
        let users: Option<Vec<User>> = self.inner.get_json("api/v1/auth/users").await?;
        Ok(users.unwrap_or_default())
    }

    /// `GET /api/v1/auth/profile/{user_id}`. `None` when the service answers `null`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`UpstreamError`] after retries are exhausted.
    pub async fn get_profile(&self, user_id: i64) -> Result<Option<User>, UpstreamError> {
        self.inner
            .get_json(&format!("api/v1/auth/profile/{user_id}"))
            .await
    }

    /// Single unretried request against the user listing.
    ///
    /// # Errors
    ///
    /// Returns the classified [`UpstreamError`] of the attempt.
    pub async fn ping(&self, timeout: Duration) -> Result<(), UpstreamError> {
        self.inner
            .ping(Method::GET, "api/v1/auth/users", None::<&()>, timeout)
            .await
    }
}

/// Client for the scraped-accounts service.
#[derive(Debug, Clone)]
pub struct AccountsClient {
    inner: UpstreamClient,
}

impl AccountsClient {
    /// # Errors
    ///
    /// Returns [`UpstreamError`] if the client cannot be constructed.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            inner: UpstreamClient::with_config(Upstream::Accounts, config)?,
        })
    }

    /// `GET /scrapedAccounts`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`UpstreamError`] after retries are exhausted.
    pub async fn list_accounts(&self) -> Result<Vec<ScrapedAccount>, UpstreamError> {
        let accounts: Option<Vec<ScrapedAccount>> =
            self.inner.get_json("scrapedAccounts").await?;
        Ok(accounts.unwrap_or_default())
    }

    /// `GET /scrapedAccounts/user/{user_id}`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`UpstreamError`] after retries are exhausted.
    pub async fn list_accounts_by_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<ScrapedAccount>, UpstreamError> {
        let accounts: Option<Vec<ScrapedAccount>> = self
            .inner
            .get_json(&format!("scrapedAccounts/user/{user_id}"))
            .await?;
        Ok(accounts.unwrap_or_default())
    }

    /// `GET /questions`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`UpstreamError`] after retries are exhausted.
    pub async fn list_questions(&self) -> Result<Vec<Question>, UpstreamError> {
        let questions: Option<Vec<Question>> = self.inner.get_json("questions").await?;
        Ok(questions.unwrap_or_default())
    }

    /// Single unretried request against the account listing.
    ///
    /// # Errors
    ///
    /// Returns the classified [`UpstreamError`] of the attempt.
    pub async fn ping(&self, timeout: Duration) -> Result<(), UpstreamError> {
        self.inner
            .ping(Method::GET, "scrapedAccounts", None::<&()>, timeout)
            .await
    }
}

/// Client for the post metrics service.
#[derive(Debug, Clone)]
pub struct MetricsClient {
    inner: UpstreamClient,
}

impl MetricsClient {
    /// # Errors
    ///
    /// Returns [`UpstreamError`] if the client cannot be constructed.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            inner: UpstreamClient::with_config(Upstream::Metrics, config)?,
        })
    }

    /// `POST /dbquery/user` with `{"userId": user_id, ...filters}`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`UpstreamError`] after retries are exhausted.
    pub async fn query_user_metrics(
        &self,
        user_id: Option<i64>,
        filters: Option<&Map<String, Value>>,
    ) -> Result<MetricsReport, UpstreamError> {
        let body = query_body("userId", user_id, filters);
        let report: Option<MetricsReport> = self.inner.post_json("dbquery/user", &body).await?;
        Ok(report.unwrap_or_default())
    }

    /// `POST /dbquery/admin` with `{"adminId": admin_id, ...filters}`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`UpstreamError`] after retries are exhausted.
    pub async fn query_admin_metrics(
        &self,
        admin_id: Option<i64>,
        filters: Option<&Map<String, Value>>,
    ) -> Result<MetricsReport, UpstreamError> {
        let body = query_body("adminId", admin_id, filters);
        let report: Option<MetricsReport> = self.inner.post_json("dbquery/admin", &body).await?;
        Ok(report.unwrap_or_default())
    }

    /// Single unretried unfiltered user query.
    ///
    /// # Errors
    ///
    /// Returns the classified [`UpstreamError`] of the attempt.
    pub async fn ping(&self, timeout: Duration) -> Result<(), UpstreamError> {
        let body = Value::Object(Map::new());
        self.inner
            .ping(Method::POST, "dbquery/user", Some(&body), timeout)
            .await
    }
}

/// Client for the global dashboard service.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    inner: UpstreamClient,
}

impl DashboardClient {
    /// # Errors
    ///
    /// Returns [`UpstreamError`] if the client cannot be constructed.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            inner: UpstreamClient::with_config(Upstream::Dashboard, config)?,
        })
    }

    /// `GET /getDashboardInfo`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`UpstreamError`] after retries are exhausted.
    pub async fn dashboard_info(&self) -> Result<Vec<DashboardEntry>, UpstreamError> {
        let entries: Option<Vec<DashboardEntry>> =
            self.inner.get_json("getDashboardInfo").await?;
        Ok(entries.unwrap_or_default())
    }

    /// Single unretried request against the dashboard feed.
    ///
    /// # Errors
    ///
    /// Returns the classified [`UpstreamError`] of the attempt.
    pub async fn ping(&self, timeout: Duration) -> Result<(), UpstreamError> {
        self.inner
            .ping(Method::GET, "getDashboardInfo", None::<&()>, timeout)
            .await
    }
}
