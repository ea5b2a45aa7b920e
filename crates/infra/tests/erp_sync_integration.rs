//! ERP status sync adapter against a mock ERP and a real token store.

mod support;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use procura_core::ErpStatusSync;
use procura_domain::{
    ErpConfig, ErpTokenRecord, ExternalStatus, SkipReason, SyncOutcome, SyncReport, TokenSet,
};
use procura_infra::{
    ErpAuthClient, ErpStatusClient, ErpStatusSyncAdapter, ErpTokenManager, ErpTokenStore,
    SqliteTokenRepository,
};
use support::{TestDatabase, TENANT};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Fixture {
    _db: TestDatabase,
    store: Arc<SqliteTokenRepository>,
    adapter: ErpStatusSyncAdapter,
}

fn erp_config(server: &MockServer, retries: u32, timeout_secs: u64) -> ErpConfig {
    ErpConfig {
        enabled: true,
        base_url: format!("{}/api", server.uri()),
        token_url: format!("{}/oauth/token", server.uri()),
        client_id: "procura".into(),
        client_secret: Some("s3cret".into()),
        request_timeout_secs: timeout_secs,
        max_rate_limit_retries: retries,
        base_backoff_ms: 1,
        ..ErpConfig::default()
    }
}

fn fixture(config: &ErpConfig) -> Fixture {
    let db = TestDatabase::new();
    let store = Arc::new(SqliteTokenRepository::new(Arc::clone(&db.manager)));
    let tokens = Arc::new(ErpTokenManager::new(
        Arc::clone(&store) as Arc<dyn ErpTokenStore>,
        ErpAuthClient::new(config).expect("auth client"),
        config.refresh_buffer_secs,
    ));
    let client = Arc::new(ErpStatusClient::new(config).expect("status client"));
    let adapter = ErpStatusSyncAdapter::new(tokens, client, config);
    Fixture { _db: db, store, adapter }
}

async fn seed_token(store: &SqliteTokenRepository, access: &str, expires_in: i64) {
    let record = ErpTokenRecord::from_token_set(
        TENANT,
        TokenSet { access_token: access.into(), refresh_token: "refresh-1".into(), expires_in },
        Utc::now(),
    );
    store.save(&record).await.expect("seed token");
}

#[tokio::test]
async fn disabled_adapter_skips_without_network() {
    let adapter = ErpStatusSyncAdapter::disabled();
    assert!(!adapter.is_enabled());

    let report = adapter.push_status(TENANT, "PO-1", ExternalStatus::InProgress).await;
    assert_eq!(report, SyncReport::skipped(SkipReason::Disabled));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_authorization_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("PUT")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;
    let f = fixture(&erp_config(&server, 2, 2));

    let report = f.adapter.push_status(TENANT, "PO-1", ExternalStatus::InProgress).await;
    assert!(matches!(report.outcome, SyncOutcome::Unavailable(_)), "got {report:?}");
    assert!(report.warning().is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn expired_token_is_refreshed_persisted_and_used() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "access-2",
            "refresh_token": "refresh-2",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/orders/PO-1/status/1"))
        .and(header("authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let f = fixture(&erp_config(&server, 2, 2));
    seed_token(&f.store, "access-1", 10).await;

    let report = f.adapter.push_status(TENANT, "PO-1", ExternalStatus::Fulfilled).await;
    assert_eq!(report, SyncReport::synced(0));

    let stored = f.store.load(TENANT).await.expect("load").expect("record exists");
    assert_eq!(stored.access_token, "access-2");
    assert_eq!(stored.refresh_token, "refresh-2");
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_refresh_keeps_the_old_pair() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

    let f = fixture(&erp_config(&server, 2, 2));
    seed_token(&f.store, "access-1", 0).await;

    let report = f.adapter.push_status(TENANT, "PO-1", ExternalStatus::Canceled).await;
    assert!(matches!(report.outcome, SyncOutcome::Unavailable(_)), "got {report:?}");

    let stored = f.store.load(TENANT).await.expect("load").expect("record exists");
    assert_eq!(stored.access_token, "access-1");
    assert_eq!(stored.refresh_token, "refresh-1");
}

#[tokio::test(flavor = "multi_thread")]
async fn persistent_rate_limit_is_reported_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/orders/PO-1/status/3"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let f = fixture(&erp_config(&server, 2, 2));
    seed_token(&f.store, "access-1", 3600).await;

    let report = f.adapter.push_status(TENANT, "PO-1", ExternalStatus::InProgress).await;
    assert_eq!(report, SyncReport::rate_limited(2));
    assert!(report.is_rate_limited());
}

#[tokio::test(flavor = "multi_thread")]
async fn retry_after_waits_beyond_request_timeouts_still_end_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/orders/PO-1/status/3"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "2"))
        .expect(3)
        .mount(&server)
        .await;

    // Two 2s waits exceed three 1s request timeouts.
    let f = fixture(&erp_config(&server, 2, 1));
    seed_token(&f.store, "access-1", 3600).await;

    let started = std::time::Instant::now();
    let report = f.adapter.push_status(TENANT, "PO-1", ExternalStatus::InProgress).await;
    assert_eq!(report, SyncReport::rate_limited(2));
    assert!(started.elapsed() >= Duration::from_secs(4));
}

#[tokio::test(flavor = "multi_thread")]
async fn slow_erp_is_bounded_by_the_request_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let f = fixture(&erp_config(&server, 0, 1));
    seed_token(&f.store, "access-1", 3600).await;

    let started = std::time::Instant::now();
    let report = f.adapter.push_status(TENANT, "PO-1", ExternalStatus::InProgress).await;
    assert!(matches!(report.outcome, SyncOutcome::Failed(_)), "got {report:?}");
    assert!(started.elapsed() < Duration::from_secs(4));
}
