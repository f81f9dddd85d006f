//! HTTP router tests driven through `tower::ServiceExt::oneshot`.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use common::*;
use ethers::types::U256;
use metis_balance_agent::{
    agent::{prompts, Agent, OfflineModel, WindowBufferMemory},
    api::create_router,
    blockchain::BalanceAdapter,
    config::Config,
    AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn create_test_app(reader: MockReader) -> Router {
    let config = Config::default();
    let agent = Agent::new(prompts::preamble(&config.network), OfflineModel, WindowBufferMemory::new(10));
    create_router(AppState::new(config, BalanceAdapter::new(reader).unwrap(), agent))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_network() {
    let (status, body) = send(create_test_app(MockReader::new()), get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["chain_id"], 59902);
}

#[tokio::test]
async fn balance_returns_report_json() {
    let app = create_test_app(test_token(U256::from(500_000_000_000_000_000u64)));

    let (status, body) = send(app, get(&format!("/api/balance/{}/{}", TOKEN, WALLET))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token"]["symbol"], "TT");
    assert_eq!(body["token"]["decimals"], 18);
    assert_eq!(body["token"]["total_supply"], "1");
    assert_eq!(body["raw_balance"], "500000000000000000");
    assert_eq!(body["formatted_balance"], "0.5");
    assert_eq!(body["wallet"], WALLET);
    assert!(body["report"].as_str().unwrap().contains("Balance: 0.500000 TT"));
}

#[tokio::test]
async fn balance_rejects_malformed_address() {
    let (status, body) = send(
        create_test_app(test_token(U256::one())),
        get(&format!("/api/balance/0x123/{}", WALLET)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("❌ Invalid address format"));
}

#[tokio::test]
async fn balance_read_failure_is_bad_gateway() {
    let reader = test_token(U256::one()).with("decimals()", Reply::Empty);
    let (status, body) = send(create_test_app(reader), get(&format!("/api/balance/{}/{}", TOKEN, WALLET))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("decimals()"));
}

#[tokio::test]
async fn chat_replies_and_validates_input() {
    let request = |message: &str| {
        Request::builder()
            .method(Method::POST)
            .uri("/api/chat")
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "message": message }).to_string()))
            .unwrap()
    };

    let (status, body) = send(create_test_app(MockReader::new()), request("hello")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["reply"].as_str().unwrap().contains("without a language model"));

    let (status, _) = send(create_test_app(MockReader::new()), request("   ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chat_accepts_session_id() {
    let app = create_test_app(MockReader::new());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/chat")
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "message": "what is metis", "session": "s-1" }).to_string()))
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["reply"].as_str().is_some());
}
