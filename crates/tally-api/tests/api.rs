//! HTTP scenarios against the full router.

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tally_api::{create_router, create_router_with_timeout, AppConfig, AppState};
use tally_core::{
    BoxedCounterStore, BoxedPaymentGateway, CounterStore, GatewayOrder, OrderRequest,
    OrderTemplate, PaymentGateway, TallyError, TallyResult, TokenIssuer,
};
use tally_razorpay::{payment_signature, RazorpayConfig, RazorpayGateway};
use tally_store::FileCounterStore;
use tempfile::TempDir;

const KEY_SECRET: &str = "s3cr3t";
const JWT_SECRET: &str = "test-jwt-secret";

/// Gateway whose orders are canned and whose failures are configurable
struct StubGateway {
    fail_with: Option<String>,
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_order(&self, request: &OrderRequest) -> TallyResult<GatewayOrder> {
        if let Some(message) = &self.fail_with {
            return Err(TallyError::Upstream {
                provider: "stub".to_string(),
                message: message.clone(),
            });
        }
        Ok(serde_json::from_value(json!({
            "id": "order_stub_1",
            "entity": "order",
            "amount": request.amount,
            "currency": request.currency,
            "receipt": request.receipt,
            "status": "created"
        }))
        .unwrap())
    }

    fn verify_payment(&self, _order_id: &str, _payment_id: &str, _signature: &str) -> bool {
        false
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

struct Harness {
    server: TestServer,
    store: BoxedCounterStore,
    _dir: TempDir,
}

fn app_config() -> AppConfig {
    AppConfig::from_lookup(|name| match name {
        "JWT_SECRET" => Some(JWT_SECRET.to_string()),
        _ => None,
    })
    .unwrap()
}

async fn harness_with(gateway: BoxedPaymentGateway) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store: BoxedCounterStore = Arc::new(FileCounterStore::new(dir.path().join("data.json")));
    store.init().await.unwrap();

    let config = app_config();
    let tokens = config.token_issuer().unwrap();
    let state = AppState::from_parts(
        gateway,
        store.clone(),
        tokens,
        OrderTemplate::default(),
        config,
    );

    Harness {
        server: TestServer::new(create_router(state)).unwrap(),
        store,
        _dir: dir,
    }
}

async fn harness() -> Harness {
    let gateway = RazorpayGateway::new(RazorpayConfig::new("rzp_test_abc123", KEY_SECRET)).unwrap();
    harness_with(Arc::new(gateway)).await
}

fn verify_body(order_id: &str, payment_id: &str) -> Value {
    json!({
        "razorpay_order_id": order_id,
        "razorpay_payment_id": payment_id,
        "razorpay_signature": payment_signature(KEY_SECRET, order_id, payment_id),
    })
}

#[tokio::test]
async fn test_root_is_plaintext() {
    let h = harness().await;
    let response = h.server.get("/").await;

    response.assert_status(StatusCode::OK);
    response.assert_text("rupee-tally API is running");
}

#[tokio::test]
async fn test_health_reports_storage() {
    let h = harness().await;
    let body: Value = h.server.get("/health").await.json();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "file");
}

#[tokio::test]
async fn test_verify_valid_signature() {
    let h = harness().await;
    let before = h.store.get().await.unwrap();

    let response = h
        .server
        .post("/verify")
        .json(&verify_body("order_1", "pay_1"))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], before + 1);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(h.store.get().await.unwrap(), before + 1);
}

#[tokio::test]
async fn test_verify_missing_field() {
    let h = harness().await;
    let response = h
        .server
        .post("/verify")
        .json(&json!({
            "razorpay_order_id": "order_1",
            "razorpay_payment_id": "pay_1"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"success": false, "message": "Missing fields"}));
    assert_eq!(h.store.get().await.unwrap(), 0);
}

#[tokio::test]
async fn test_verify_non_json_body_is_missing_fields() {
    let h = harness().await;
    let response = h.server.post("/verify").text("order_1").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"success": false, "message": "Missing fields"}));
}

#[tokio::test]
async fn test_verify_invalid_signature() {
    let h = harness().await;
    let mut body = verify_body("order_1", "pay_1");
    body["razorpay_payment_id"] = json!("pay_2");

    let response = h.server.post("/verify").json(&body).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"success": false, "message": "Invalid signature"}));
    assert_eq!(h.store.get().await.unwrap(), 0);
}

#[tokio::test]
async fn test_verify_replay_counts_again() {
    let h = harness().await;
    let body = verify_body("order_1", "pay_1");

    h.server.post("/verify").json(&body).await.assert_status_ok();
    let second: Value = h.server.post("/verify").json(&body).await.json();

    assert_eq!(second["count"], 2);
}

#[tokio::test]
async fn test_count_without_token() {
    let h = harness().await;
    let response = h.server.get("/count").await;

    response.assert_status(StatusCode::FORBIDDEN);
    response.assert_json(&json!({"message": "Unauthorized"}));
}

#[tokio::test]
async fn test_count_with_non_bearer_header() {
    let h = harness().await;
    let response = h
        .server
        .get("/count")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Basic cnpwOnNlY3JldA=="))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_count_with_token_from_verify() {
    let h = harness().await;
    let verified: Value = h
        .server
        .post("/verify")
        .json(&verify_body("order_1", "pay_1"))
        .await
        .json();
    let token = verified["token"].as_str().unwrap().to_string();

    let response = h.server.get("/count").authorization_bearer(token).await;

    response.assert_status(StatusCode::OK);
    response.assert_json(&json!({"count": 1}));
}

#[tokio::test]
async fn test_count_with_expired_token() {
    let h = harness().await;
    let issuer = TokenIssuer::new(JWT_SECRET, Duration::days(7)).unwrap();
    let stale = issuer.issue_at(Utc::now() - Duration::days(8)).unwrap();

    let response = h.server.get("/count").authorization_bearer(stale).await;

    response.assert_status(StatusCode::FORBIDDEN);
    response.assert_json(&json!({"message": "Unauthorized"}));
}

#[tokio::test]
async fn test_count_with_foreign_token() {
    let h = harness().await;
    let foreign = TokenIssuer::new("another-secret", Duration::days(7))
        .unwrap()
        .issue()
        .unwrap();

    let response = h.server.get("/count").authorization_bearer(foreign).await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_order_returns_gateway_order() {
    let h = harness_with(Arc::new(StubGateway { fail_with: None })).await;
    let response = h.server.post("/create-order").await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["id"], "order_stub_1");
    assert_eq!(body["amount"], 100);
    assert_eq!(body["currency"], "INR");
    assert!(body["receipt"].as_str().unwrap().starts_with("receipt_"));
}

#[tokio::test]
async fn test_create_order_gateway_failure() {
    let h = harness_with(Arc::new(StubGateway {
        fail_with: Some("Authentication failed".to_string()),
    }))
    .await;
    let response = h.server.post("/create-order").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({"error": "Authentication failed"}));
}

/// Store that accepts init but fails every read and write
struct BrokenStore;

#[async_trait]
impl CounterStore for BrokenStore {
    async fn init(&self) -> TallyResult<()> {
        Ok(())
    }

    async fn increment_and_get(&self) -> TallyResult<i64> {
        Err(TallyError::storage("disk on fire"))
    }

    async fn get(&self) -> TallyResult<i64> {
        Err(TallyError::storage("disk on fire"))
    }

    fn backend_name(&self) -> &'static str {
        "broken"
    }
}

#[tokio::test]
async fn test_storage_failure_is_generic_500() {
    let config = app_config();
    let tokens = config.token_issuer().unwrap();
    let token = tokens.issue().unwrap();
    let gateway = RazorpayGateway::new(RazorpayConfig::new("rzp_test_abc123", KEY_SECRET)).unwrap();
    let state = AppState::from_parts(
        Arc::new(gateway),
        Arc::new(BrokenStore),
        tokens,
        OrderTemplate::default(),
        config,
    );
    let server = TestServer::new(create_router(state)).unwrap();

    let response = server
        .post("/verify")
        .json(&verify_body("order_1", "pay_1"))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({"success": false, "message": "Storage error"}));

    let response = server.get("/count").authorization_bearer(token).await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({"message": "Storage error"}));
}

/// Gateway that never answers within the request bound
struct StalledGateway;

#[async_trait]
impl PaymentGateway for StalledGateway {
    async fn create_order(&self, _request: &OrderRequest) -> TallyResult<GatewayOrder> {
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        Err(TallyError::Internal("unreachable".to_string()))
    }

    fn verify_payment(&self, _order_id: &str, _payment_id: &str, _signature: &str) -> bool {
        false
    }

    fn provider_name(&self) -> &'static str {
        "stalled"
    }
}

#[tokio::test]
async fn test_request_timeout_is_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let store: BoxedCounterStore = Arc::new(FileCounterStore::new(dir.path().join("data.json")));
    store.init().await.unwrap();

    let config = app_config();
    let tokens = config.token_issuer().unwrap();
    let state = AppState::from_parts(
        Arc::new(StalledGateway),
        store,
        tokens,
        OrderTemplate::default(),
        config,
    );
    let server = TestServer::new(create_router_with_timeout(
        state,
        std::time::Duration::from_millis(100),
    ))
    .unwrap();

    let response = server.post("/create-order").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}
