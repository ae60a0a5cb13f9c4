//! End-to-end relay tests against the router and a mock invoicing API.
//!
//! Verifies the inbound contract (immediate acknowledgment, lenient body
//! handling, body size cap) and the reshape observed on the outbound wire.

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use ponte_api::{create_router, AppState, Config};
use ponte_core::RelayError;
use ponte_forward::ForwardError;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn state_with(config: Config) -> AppState {
    AppState::from_config(config).expect("state should build")
}

/// Configuration pointed at a mock invoicing API.
fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.vendus_api_key = Some("test-key".to_string());
    config.vendus_documents_url = format!("{}/ws/v1.1/documents", server.uri());
    config
}

fn post_order(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(body.into())
        .expect("request should build")
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

/// Waits until the mock server has seen `count` requests.
async fn wait_for_requests(server: &MockServer, count: usize) -> Vec<wiremock::Request> {
    for _ in 0..50 {
        if let Some(requests) = server.received_requests().await {
            if requests.len() >= count {
                return requests;
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("mock server did not receive {count} request(s) in time");
}

#[tokio::test]
async fn liveness_probe_returns_ok() {
    let app = create_router(state_with(Config::default()));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .expect("failed to make request");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("X-Request-Id"));
    assert_eq!(body_string(response).await, "OK");
}

#[tokio::test]
async fn health_returns_ok_json() {
    let app = create_router(state_with(Config::default()));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .expect("failed to make request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_str(&body_string(response).await).expect("valid JSON");
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn webhook_acknowledges_without_credential_configured() {
    // No API key anywhere: the relay logs a configuration error, but the
    // sender still gets its immediate 200.
    let app = create_router(state_with(Config::default()));

    let response = app.oneshot(post_order(r#"{}"#)).await.expect("failed to make request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");
}

#[tokio::test]
async fn webhook_acknowledges_malformed_and_empty_bodies() {
    for body in ["{broken", ""] {
        let app = create_router(state_with(Config::default()));
        let response =
            app.oneshot(post_order(body.to_string())).await.expect("failed to make request");
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let app = create_router(state_with(Config::default()));

    let oversized = vec![b'x'; 1024 * 1024 + 1];
    let response = app.oneshot(post_order(oversized)).await.expect("failed to make request");

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn realistic_order_is_reshaped_into_an_invoice_document() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ws/v1.1/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
        .mount(&server)
        .await;

    let app = create_router(state_with(config_for(&server)));

    let payload = json!({
        "order_id": "12345",
        "customer": {"name": "Maria Santos", "email": "maria@example.pt"},
        "items": [
            {"id": "BIF-1", "name": "Bifana", "quantity": 2, "price": 4.5},
            {"sku": "COF-2", "qty": "1", "price": "1.10"},
            {"price": 0.5},
        ],
    });

    let response =
        app.oneshot(post_order(payload.to_string())).await.expect("failed to make request");
    assert_eq!(response.status(), StatusCode::OK);

    let requests = wait_for_requests(&server, 1).await;
    let wire: Value = serde_json::from_slice(&requests[0].body).expect("body should be JSON");

    assert_eq!(wire["api_key"], "test-key");
    assert_eq!(wire["type"], "FT");
    assert_eq!(wire["customer"], json!({"name": "Maria Santos", "email": "maria@example.pt"}));
    assert_eq!(wire["notes"], "GloriaFood Order #12345");
    assert_eq!(wire["external_reference"], "12345");

    let lines = wire["lines"].as_array().expect("lines should be an array");
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["ref"], "BIF-1");
    assert_eq!(lines[0]["qty"].as_f64(), Some(2.0));
    assert_eq!(lines[0]["description"], "Bifana");
    assert_eq!(lines[1]["ref"], "COF-2");
    assert_eq!(lines[1]["price"].as_f64(), Some(1.1));
    // Third line has no identifier: positional reference.
    assert_eq!(lines[2]["ref"], "3");
    assert_eq!(lines[2]["qty"].as_f64(), Some(1.0));
}

#[tokio::test]
async fn acknowledgment_does_not_wait_for_the_outbound_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let app = create_router(state_with(config_for(&server)));

    let started = Instant::now();
    let response =
        app.oneshot(post_order(r#"{"order_id":"slow"}"#)).await.expect("failed to make request");
    let elapsed = started.elapsed();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        elapsed < Duration::from_secs(2),
        "acknowledgment blocked on the outbound call: {elapsed:?}"
    );
}

#[tokio::test]
async fn concurrent_deliveries_are_all_acknowledged_and_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

    let state = state_with(config_for(&server));

    let mut handles = Vec::new();
    for i in 0..10 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            let app = create_router(state);
            app.oneshot(post_order(format!(r#"{{"order_id":"{i}"}}"#)))
                .await
                .expect("failed to make request")
        }));
    }

    for response in futures::future::join_all(handles).await {
        assert_eq!(response.expect("task should complete").status(), StatusCode::OK);
    }

    let requests = wait_for_requests(&server, 10).await;
    assert_eq!(requests.len(), 10);
}

mod pipeline {
    //! Direct tests of the forwarding pipeline, independent of HTTP
    //! acknowledgment timing.

    use axum::http::HeaderMap;
    use ponte_api::handlers::{relay_order, RelayOutcome};

    use super::*;

    #[tokio::test]
    async fn missing_credential_skips_the_outbound_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

        let mut config = config_for(&server);
        config.vendus_api_key = None;
        let state = state_with(config);

        let outcome = relay_order(&state, &HeaderMap::new(), &json!({})).await;

        assert!(
            matches!(outcome, RelayOutcome::Skipped(RelayError::MissingCredential)),
            "got {outcome:?}"
        );
        assert!(server.received_requests().await.expect("recording enabled").is_empty());
    }

    #[tokio::test]
    async fn empty_payload_is_still_forwarded_with_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

        let state = state_with(config_for(&server));

        let outcome = relay_order(&state, &HeaderMap::new(), &json!({})).await;
        assert!(matches!(outcome, RelayOutcome::Forwarded(_)), "got {outcome:?}");

        let requests = server.received_requests().await.expect("recording enabled");
        let wire: Value = serde_json::from_slice(&requests[0].body).expect("body should be JSON");

        assert_eq!(wire["customer"]["name"], "Cliente Online");
        assert_eq!(wire["customer"]["email"], "");
        assert_eq!(wire["lines"], json!([]));
        assert_eq!(wire["notes"], "GloriaFood Order #unknown");
        assert!(wire.get("external_reference").is_none());
    }

    #[tokio::test]
    async fn forwarding_failure_is_contained() {
        let mut config = Config::default();
        config.vendus_api_key = Some("test-key".to_string());
        // Nothing listens on port 1.
        config.vendus_documents_url = "http://127.0.0.1:1/ws/v1.1/documents".to_string();
        let state = state_with(config);

        let outcome = relay_order(&state, &HeaderMap::new(), &json!({"order_id": "1"})).await;

        assert!(
            matches!(outcome, RelayOutcome::Failed(ForwardError::Network { .. })),
            "got {outcome:?}"
        );
    }

    #[tokio::test]
    async fn api_rejection_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string("bad document"))
            .mount(&server)
            .await;

        let state = state_with(config_for(&server));

        let outcome = relay_order(&state, &HeaderMap::new(), &json!({"order_id": "1"})).await;

        match outcome {
            RelayOutcome::Failed(ForwardError::Api { status, body }) => {
                assert_eq!(status, 422);
                assert_eq!(body, "bad document");
            },
            other => panic!("expected Api failure, got {other:?}"),
        }
    }
}
