//! End-to-end fan-out tests against wiremock upstreams.

use std::net::SocketAddr;
use std::time::Duration;

use serde_json::json;
use tikboard_core::{AppConfig, Environment, FailureKind, Upstream, UpstreamConfig};
use tikboard_orchestrator::{summarize, HealthStatus, Orchestrator, ServiceStatus};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Port 1 on loopback is never listening.
const UNREACHABLE: &str = "http://127.0.0.1:1";

fn upstream(base_url: &str) -> UpstreamConfig {
    UpstreamConfig {
        base_url: base_url.to_owned(),
        timeout_secs: 5,
        max_retries: 0,
        backoff_base_ms: 0,
    }
}

fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        log_level: "debug".to_owned(),
        users: upstream(base_url),
        accounts: upstream(base_url),
        metrics: upstream(base_url),
        dashboard: upstream(base_url),
        health_timeout_secs: 2,
        consolidation_deadline_ms: None,
    }
}

async fn mount_json(server: &MockServer, http_method: &str, route: &str, body: serde_json::Value) {
    Mock::given(method(http_method))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_all_upstreams(server: &MockServer) {
    mount_json(
        server,
        "GET",
        "/api/v1/auth/users",
        json!([{"id": 1, "email": "ana@example.com"}, {"id": 2, "email": "leo@example.com"}]),
    )
    .await;
    mount_json(
        server,
        "GET",
        "/scrapedAccounts",
        json!([
            {"id": 10, "accountName": "chef", "userId": 1},
            {"id": 11, "accountName": "baker", "user_id": 1}
        ]),
    )
    .await;
    mount_json(
        server,
        "POST",
        "/dbquery/user",
        json!({
            "items": [
                {"postId": 1, "usernameTiktokAccount": "chef", "views": 100, "likes": 10,
                 "engagement": 4.0, "totalInteractions": 15, "datePosted": "2024-01-01"},
                {"postId": 2, "usernameTiktokAccount": "baker", "views": 50, "likes": 5,
                 "engagement": 8.0, "totalInteractions": 7, "datePosted": "2024-02-01"}
            ],
            "count": 2,
            "dashboard": []
        }),
    )
    .await;
    mount_json(server, "GET", "/getDashboardInfo", json!([{"totalPosts": 2}])).await;
}

#[tokio::test]
async fn consolidates_all_four_upstreams() {
    let server = MockServer::start().await;
    mount_all_upstreams(&server).await;

    let orchestrator = Orchestrator::new(&test_config(&server.uri())).unwrap();
    let result = orchestrator.consolidate(None).await;

    assert_eq!(result.users.len(), 2);
    assert_eq!(result.scraped_accounts.len(), 2);
    assert_eq!(result.metrics.items.len(), 2);
    assert_eq!(result.dashboard_data.len(), 1);
    assert_eq!(result.metadata.total_users, 2);
    assert_eq!(result.metadata.total_accounts, 2);
    assert_eq!(result.metadata.total_posts_analyzed, 2);
    assert!(result
        .metadata
        .services_status
        .values()
        .all(|s| *s == ServiceStatus::Ok));
}

#[tokio::test]
async fn slow_accounts_upstream_leaves_only_its_slot_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/scrapedAccounts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 10, "userId": 1}]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    mount_all_upstreams(&server).await;

    let mut config = test_config(&server.uri());
    config.accounts.timeout_secs = 1;
    let orchestrator = Orchestrator::new(&config).unwrap();
    let result = orchestrator.consolidate(None).await;

    assert_eq!(result.users.len(), 2);
    assert_eq!(result.metrics.items.len(), 2);
    assert_eq!(result.dashboard_data.len(), 1);
    assert!(result.scraped_accounts.is_empty());
    assert_eq!(
        result.metadata.services_status[&Upstream::Accounts],
        ServiceStatus::Failed(FailureKind::Timeout)
    );

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(
        value["metadata"]["services_status"]["accounts"],
        json!("failed: timeout")
    );
}

#[tokio::test]
async fn user_filter_reaches_every_filterable_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/profile/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 1, "email": "ana@example.com"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/scrapedAccounts/user/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 10, "userId": 1}])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/dbquery/user"))
        .and(body_json(json!({"userId": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [], "count": 0})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/getDashboardInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(&test_config(&server.uri())).unwrap();
    let result = orchestrator.consolidate(Some(1)).await;

    assert_eq!(result.users.len(), 1, "profile is wrapped in a list");
    assert_eq!(result.scraped_accounts.len(), 1);
    assert!(result
        .metadata
        .services_status
        .values()
        .all(|s| *s == ServiceStatus::Ok));
}

#[tokio::test]
async fn null_profile_yields_empty_users() {
    let server = MockServer::start().await;
    mount_all_upstreams(&server).await;
    mount_json(&server, "GET", "/api/v1/auth/profile/9", json!(null)).await;
    mount_json(&server, "GET", "/scrapedAccounts/user/9", json!([])).await;

    let orchestrator = Orchestrator::new(&test_config(&server.uri())).unwrap();
    let result = orchestrator.consolidate(Some(9)).await;

    assert!(result.users.is_empty());
    assert_eq!(
        result.metadata.services_status[&Upstream::Users],
        ServiceStatus::Ok
    );
}

#[tokio::test]
async fn empty_upstreams_summarize_to_zeros() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/api/v1/auth/users", json!([])).await;
    mount_json(&server, "GET", "/scrapedAccounts", json!([])).await;
    mount_json(&server, "POST", "/dbquery/user", json!({"items": [], "count": 0})).await;
    mount_json(&server, "GET", "/getDashboardInfo", json!([])).await;

    let orchestrator = Orchestrator::new(&test_config(&server.uri())).unwrap();
    let summary = orchestrator.summary(None).await;

    assert_eq!(summary.summary.total_users, 0);
    assert_eq!(summary.summary.total_accounts, 0);
    assert!(summary.summary.average_engagement.abs() < f64::EPSILON);
    assert!(summary.rankings.top_users.is_empty());
    assert!(summary.rankings.top_accounts.is_empty());
    assert!(summary.rankings.best_engagement.is_empty());
}

#[tokio::test]
async fn accounts_with_equal_engagement_rank_by_name() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/api/v1/auth/users", json!([])).await;
    mount_json(&server, "GET", "/scrapedAccounts", json!([])).await;
    mount_json(
        &server,
        "POST",
        "/dbquery/user",
        json!({"items": [
            {"postId": 1, "usernameTiktokAccount": "b", "engagement": 10.0},
            {"postId": 2, "usernameTiktokAccount": "a", "engagement": 10.0}
        ], "count": 2}),
    )
    .await;
    mount_json(&server, "GET", "/getDashboardInfo", json!([])).await;

    let orchestrator = Orchestrator::new(&test_config(&server.uri())).unwrap();
    let top = orchestrator.summary(None).await.rankings.top_accounts;

    let names: Vec<&str> = top.iter().map(|a| a.account.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[tokio::test]
async fn summary_matches_summarize_of_the_consolidation() {
    let server = MockServer::start().await;
    mount_all_upstreams(&server).await;

    let orchestrator = Orchestrator::new(&test_config(&server.uri())).unwrap();
    let consolidated = orchestrator.consolidate(None).await;
    let summary = summarize(&consolidated);

    assert_eq!(summary.summary.total_views, 150);
    assert_eq!(summary.summary.total_interactions, 22);
    assert!((summary.summary.average_engagement - 6.0).abs() < f64::EPSILON);
    assert_eq!(summary.rankings.top_users[0].user_id, 1);
    assert_eq!(summary.rankings.top_users[0].accounts_count, 2);
    assert_eq!(summary.rankings.top_users[0].email, "ana@example.com");
    assert_eq!(summary.rankings.best_engagement[0].account.as_deref(), Some("baker"));
    assert_eq!(summary.timestamp, consolidated.metadata.timestamp);
}

#[tokio::test]
async fn all_upstreams_down_still_returns_every_slot() {
    let orchestrator = Orchestrator::new(&test_config(UNREACHABLE)).unwrap();
    let result = orchestrator.consolidate(None).await;

    assert!(result.users.is_empty());
    assert!(result.scraped_accounts.is_empty());
    assert!(result.metrics.items.is_empty());
    assert!(result.dashboard_data.is_empty());
    assert_eq!(result.metadata.services_status.len(), 4);
    for upstream in Upstream::ALL {
        assert_eq!(
            result.metadata.services_status[&upstream],
            ServiceStatus::Failed(FailureKind::ConnectionRefused),
            "{upstream}"
        );
    }
}

#[tokio::test]
async fn consolidation_deadline_abandons_slow_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/getDashboardInfo"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    mount_all_upstreams(&server).await;

    let mut config = test_config(&server.uri());
    config.consolidation_deadline_ms = Some(500);
    let orchestrator = Orchestrator::new(&config).unwrap();
    let result = orchestrator.consolidate(None).await;

    assert_eq!(
        result.metadata.services_status[&Upstream::Dashboard],
        ServiceStatus::Failed(FailureKind::Timeout)
    );
    assert_eq!(
        result.metadata.services_status[&Upstream::Users],
        ServiceStatus::Ok
    );
    assert_eq!(result.users.len(), 2);
}

#[tokio::test]
async fn probe_reports_each_upstream_and_is_repeatable() {
    let server = MockServer::start().await;
    mount_all_upstreams(&server).await;

    let mut config = test_config(&server.uri());
    config.accounts.base_url = UNREACHABLE.to_owned();
    let orchestrator = Orchestrator::new(&config).unwrap();

    let first = orchestrator.probe().await;
    let second = orchestrator.probe().await;

    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
    assert_eq!(first[&Upstream::Users], HealthStatus::Healthy);
    assert_eq!(first[&Upstream::Metrics], HealthStatus::Healthy);
    assert_eq!(first[&Upstream::Dashboard], HealthStatus::Healthy);
    assert_eq!(
        first[&Upstream::Accounts],
        HealthStatus::Unhealthy(FailureKind::ConnectionRefused)
    );
}

#[tokio::test]
async fn probe_does_not_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/getDashboardInfo"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    mount_all_upstreams(&server).await;

    let mut config = test_config(&server.uri());
    config.dashboard.max_retries = 3;
    let orchestrator = Orchestrator::new(&config).unwrap();
    let health = orchestrator.probe().await;

    assert_eq!(
        health[&Upstream::Dashboard],
        HealthStatus::Unhealthy(FailureKind::UpstreamServerError)
    );
}
