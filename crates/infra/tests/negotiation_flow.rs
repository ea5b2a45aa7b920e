//! Full negotiation flows through `AppContext`: SQLite persistence plus a
//! mock ERP.

mod support;

use procura_domain::{
    Config, DatabaseConfig, ErpConfig, ExternalStatus, OrderStatus, ProposalStatus, ProposalTerms,
    SkipReason, SyncOutcome, SyncReport, TimelineEventType, TokenSet,
};
use procura_infra::AppContext;
use rust_decimal_macros::dec;
use support::*;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Env {
    ctx: AppContext,
    _dir: TempDir,
}

async fn context(server: Option<&MockServer>) -> Env {
    let dir = TempDir::new().expect("temp dir");
    let erp = match server {
        Some(server) => ErpConfig {
            enabled: true,
            base_url: server.uri(),
            token_url: format!("{}/oauth/token", server.uri()),
            client_id: "procura".into(),
            request_timeout_secs: 2,
            max_rate_limit_retries: 1,
            base_backoff_ms: 1,
            ..ErpConfig::default()
        },
        None => ErpConfig::default(),
    };
    let config = Config {
        database: DatabaseConfig {
            path: dir.path().join("procura.db").to_string_lossy().into_owned(),
            ..DatabaseConfig::default()
        },
        erp,
        ..Config::default()
    };

    let ctx = AppContext::new(config).await.expect("context should build");
    if let Some(tokens) = &ctx.erp_tokens {
        tokens
            .store_initial(
                TENANT,
                TokenSet {
                    access_token: "access-1".into(),
                    refresh_token: "refresh-1".into(),
                    expires_in: 3600,
                },
            )
            .await
            .expect("store initial tokens");
    }
    Env { ctx, _dir: dir }
}

async fn mount_status(server: &MockServer, external_ref: &str, code: u8, status: u16) {
    Mock::given(method("PUT"))
        .and(path(format!("/orders/{external_ref}/status/{code}")))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn negotiated_order_is_finalized_and_mirrored() {
    let server = MockServer::start().await;
    mount_status(&server, "PO-77", 3, 204).await;
    mount_status(&server, "PO-77", 1, 204).await;
    let env = context(Some(&server)).await;
    let service = &env.ctx.negotiation;

    let draft = service
        .create_draft(&buyer(), SUPPLIER, None, &[urgent_product("sku-1", dec!(10.00))])
        .await
        .expect("create draft")
        .order;
    let linked = service.attach_external_ref(&buyer(), &draft.id, "PO-77").await.expect("link");
    assert_eq!(linked.sync, SyncReport::skipped(SkipReason::NotMirrored));

    let sent = service.send_to_supplier(&buyer(), &draft.id).await.expect("send");
    assert_eq!(sent.sync, SyncReport::synced(0));
    assert_eq!(sent.order.external_status, Some(ExternalStatus::InProgress));

    let line_id = sent.order.lines[0].id.clone();
    let proposed = service
        .submit_proposal(
            &supplier(),
            &draft.id,
            ProposalTerms { delivery_lead_time_days: Some(5), ..ProposalTerms::default() },
            vec![proposal_line(&line_id, 150, dec!(10), 6)],
        )
        .await
        .expect("propose");
    assert_eq!(proposed.order.status, OrderStatus::ProposalPending);

    let finalized = service.finalize(&buyer(), &draft.id).await.expect("finalize");
    assert_eq!(finalized.sync, SyncReport::synced(0));
    assert_eq!(finalized.order.status, OrderStatus::Finalized);
    assert_eq!(finalized.order.lines[0].quantity, 150);
    assert_eq!(finalized.order.lines[0].bonus_quantity, 6);
    // 150 × 9.00
    assert_eq!(finalized.order.totals.grand_total, dec!(1350.00));

    let view = service.order_view(&buyer(), &draft.id).await.expect("order view");
    assert_eq!(view.order.external_status, Some(ExternalStatus::Fulfilled));
    assert!(!view.order.mirror_is_stale());
    assert_eq!(view.proposals.len(), 1);
    assert_eq!(view.proposals[0].status, ProposalStatus::Accepted);
    let events: Vec<TimelineEventType> = view.timeline.iter().map(|e| e.event_type).collect();
    assert_eq!(
        events,
        vec![
            TimelineEventType::DraftCreated,
            TimelineEventType::ErpLinked,
            TimelineEventType::SentToSupplier,
            TimelineEventType::ProposalSubmitted,
            TimelineEventType::Finalized,
        ]
    );
    assert!(view.timeline.iter().all(|event| event.sync_warning.is_none()));
    assert!(view.allowed_events.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_push_keeps_local_commit_and_resync_catches_up() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/orders/PO-9/status/3"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_status(&server, "PO-9", 3, 200).await;
    let env = context(Some(&server)).await;
    let service = &env.ctx.negotiation;

    let draft = service
        .create_draft(&buyer(), SUPPLIER, None, &[urgent_product("sku-1", dec!(10.00))])
        .await
        .expect("create draft")
        .order;
    service.attach_external_ref(&buyer(), &draft.id, "PO-9").await.expect("link");

    let sent = service.send_to_supplier(&buyer(), &draft.id).await.expect("send");
    assert!(matches!(sent.sync.outcome, SyncOutcome::Failed(_)), "got {:?}", sent.sync);
    assert_eq!(sent.order.status, OrderStatus::SentToSupplier);
    assert_eq!(sent.order.external_status, None);

    let view = service.order_view(&buyer(), &draft.id).await.expect("order view");
    let sent_event = view
        .timeline
        .iter()
        .find(|event| event.event_type == TimelineEventType::SentToSupplier)
        .expect("send event recorded");
    assert!(sent_event.sync_warning.is_some());

    let results = service.resync_stale(TENANT, 10).await.expect("resync stale");
    assert_eq!(results, vec![(draft.id.clone(), SyncReport::synced(0))]);

    let view = service.order_view(&buyer(), &draft.id).await.expect("order view");
    assert_eq!(view.order.external_status, Some(ExternalStatus::InProgress));
    assert_eq!(view.timeline.last().map(|e| e.event_type), Some(TimelineEventType::ErpResynced));
    assert!(service.resync_stale(TENANT, 10).await.expect("resync stale").is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn erp_disabled_deployment_negotiates_locally() {
    let env = context(None).await;
    assert!(env.ctx.erp_tokens.is_none());
    let service = &env.ctx.negotiation;

    let draft = service
        .create_draft(&buyer(), SUPPLIER, None, &[urgent_product("sku-1", dec!(10.00))])
        .await
        .expect("create draft")
        .order;
    service.attach_external_ref(&buyer(), &draft.id, "PO-1").await.expect("link");

    let sent = service.send_to_supplier(&buyer(), &draft.id).await.expect("send");
    assert_eq!(sent.sync, SyncReport::skipped(SkipReason::Disabled));

    let canceled = service.cancel(&buyer(), &draft.id, "budget frozen").await.expect("cancel");
    assert_eq!(canceled.order.status, OrderStatus::Canceled);
    assert_eq!(canceled.order.close_reason.as_deref(), Some("budget frozen"));

    let health = env.ctx.health_check().await;
    assert!(health.database);
    assert_eq!(health.erp, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn counterpart_without_account_gets_a_public_link() {
    let env = context(None).await;
    env.ctx.parties.upsert_party(&supplier_party(false)).await.expect("upsert party");
    let service = &env.ctx.negotiation;

    let draft = service
        .create_draft(&buyer(), SUPPLIER, None, &[urgent_product("sku-1", dec!(10.00))])
        .await
        .expect("create draft")
        .order;

    let payload = service
        .counterpart_contact(&buyer(), &draft.id)
        .await
        .expect("contact")
        .expect("payload for a counterpart without account");
    assert_eq!(payload.recipient_name, "Acme Distribuidora");
    assert_eq!(payload.phone, "+55 11 99999-0000");
    assert_eq!(payload.public_order_link, format!("http://localhost:3000/orders/{}", draft.id));

    env.ctx.parties.upsert_party(&supplier_party(true)).await.expect("upsert party");
    assert!(service.counterpart_contact(&buyer(), &draft.id).await.expect("contact").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn health_check_reports_erp_reachability() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let env = context(Some(&server)).await;

    let health = env.ctx.health_check().await;
    assert!(health.database);
    assert_eq!(health.erp, Some(true));
}
