//! HTTP-level tests driving the Axum router with `oneshot`.

#![allow(clippy::panic)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use proofstream_gateway::api;
use proofstream_gateway::app_state::AppState;
use proofstream_gateway::config::QueueConfig;
use proofstream_gateway::domain::{WebsiteId, WidgetId};
use proofstream_gateway::normalizer::EventNormalizer;
use proofstream_gateway::persistence::InMemoryStore;

fn app() -> Router {
    let state = AppState::new(
        Arc::new(InMemoryStore::new()),
        EventNormalizer::new(),
        QueueConfig::default(),
    );
    api::build_router().with_state(state)
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let built = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    };
    let Ok(req) = built else {
        panic!("valid request");
    };
    req
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = match app.clone().oneshot(req).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    let status = response.status();
    let Ok(collected) = response.into_body().collect().await else {
        panic!("readable body");
    };
    let bytes = collected.to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_reports_backend() {
    let app = app();
    let (status, body) = send(&app, request("GET", "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("status"), Some(&json!("healthy")));
    assert_eq!(body.get("store"), Some(&json!("memory")));
}

#[tokio::test]
async fn event_type_catalog_lists_every_type() {
    let app = app();
    let (status, body) = send(&app, request("GET", "/config/event-types", None)).await;
    assert_eq!(status, StatusCode::OK);
    let Some(types) = body.as_array() else {
        panic!("expected array");
    };
    assert_eq!(types.len(), 9);
    let custom = types
        .iter()
        .find(|t| t.get("event_type") == Some(&json!("custom")));
    assert_eq!(custom.and_then(|t| t.get("weight")), Some(&json!(5)));
}

#[tokio::test]
async fn missing_widget_id_is_a_validation_error() {
    let app = app();
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/events",
            Some(json!({"source": "shopify", "payload": {}})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.pointer("/error/code"), Some(&json!(1001)));
}

#[tokio::test]
async fn ingest_then_build_queue() {
    let app = app();
    let widget_id = WidgetId::new();

    let (status, event) = send(
        &app,
        request(
            "POST",
            "/api/v1/events",
            Some(json!({
                "source": "shopify",
                "event_type": "orders/create",
                "widget_id": widget_id.to_string(),
                "payload": {
                    "customer": {"first_name": "Sam"},
                    "billing_address": {"city": "Austin", "country": "US"},
                    "line_items": [{"name": "Mug"}],
                    "total_price": "12.00",
                    "currency": "USD"
                }
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event.get("event_type"), Some(&json!("purchase")));
    assert_eq!(event.get("moderation_status"), Some(&json!("approved")));

    let (status, queue) = send(
        &app,
        request(
            "POST",
            "/api/v1/queue",
            Some(json!({
                "website_id": WebsiteId::new().to_string(),
                "widget_ids": [widget_id.to_string()],
                "target_size": 5
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        queue.pointer("/events/0/message"),
        Some(&json!("Sam from Austin, US just bought Mug"))
    );
    assert_eq!(queue.pointer("/queue_metadata/queue_size"), Some(&json!(1)));
    assert_eq!(
        queue.pointer("/queue_metadata/weights_applied/purchase"),
        Some(&json!(10))
    );
}

#[tokio::test]
async fn empty_widget_list_is_rejected() {
    let app = app();
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/queue",
            Some(json!({"website_id": WebsiteId::new().to_string(), "widget_ids": []})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.pointer("/error/code"), Some(&json!(1002)));
}

#[tokio::test]
async fn batch_reports_each_item() {
    let app = app();
    let widget_id = WidgetId::new().to_string();
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/events/batch",
            Some(json!({"events": [
                {"source": "api", "event_type": "signup", "widget_id": widget_id, "payload": {"name": "Ana"}},
                {"source": "api", "event_type": "signup", "payload": {"name": "Nobody"}},
                {"source": "form", "widget_id": widget_id, "payload": "not an object"}
            ]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("accepted"), Some(&json!(1)));
    assert_eq!(body.get("rejected"), Some(&json!(2)));
    assert_eq!(body.pointer("/results/0/status"), Some(&json!("accepted")));
    assert_eq!(body.pointer("/results/1/error/code"), Some(&json!(1001)));
    assert_eq!(body.pointer("/results/2/status"), Some(&json!("rejected")));
}

#[tokio::test]
async fn normalize_does_not_store() {
    let app = app();
    let widget_id = WidgetId::new();
    let (status, event) = send(
        &app,
        request(
            "POST",
            "/api/v1/events/normalize",
            Some(json!({
                "source": "stripe",
                "event_type": "invoice.paid",
                "widget_id": widget_id.to_string(),
                "payload": {"data": {"object": {"amount_paid": 1250, "currency": "usd"}}}
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event.get("event_type"), Some(&json!("subscription")));
    assert_eq!(event.pointer("/event_data/amount"), Some(&json!("12.50")));
    assert_eq!(event.pointer("/event_data/currency"), Some(&json!("USD")));

    let (_, queue) = send(
        &app,
        request(
            "POST",
            "/api/v1/queue",
            Some(json!({
                "website_id": WebsiteId::new().to_string(),
                "widget_ids": [widget_id.to_string()]
            })),
        ),
    )
    .await;
    assert_eq!(queue.pointer("/queue_metadata/total_available"), Some(&json!(0)));
}

#[tokio::test]
async fn weight_overrides_round_trip() {
    let app = app();
    let website_id = WebsiteId::new();
    let uri = format!("/api/v1/websites/{website_id}/weights/announcement");

    let (status, body) = send(&app, request("PUT", &uri, Some(json!({"weight": 0})))).await;
    assert_eq!(status, StatusCode::OK);
    let Some(rules) = body.get("rules").and_then(Value::as_array) else {
        panic!("expected rules");
    };
    let announcement = rules
        .iter()
        .find(|r| r.get("event_type") == Some(&json!("announcement")));
    assert_eq!(announcement.and_then(|r| r.get("enabled")), Some(&json!(false)));
    assert_eq!(announcement.and_then(|r| r.get("ttl_days")), Some(&json!(30)));

    let (status, body) = send(
        &app,
        request("GET", &format!("/api/v1/websites/{website_id}/weights"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("website_id"), Some(&json!(website_id.to_string())));

    let bad = format!("/api/v1/websites/{website_id}/weights/teleport");
    let (status, _) = send(&app, request("PUT", &bad, Some(json!({"weight": 3})))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_ttl_is_rejected_and_queue_still_builds() {
    let app = app();
    let website_id = WebsiteId::new();
    let uri = format!("/api/v1/websites/{website_id}/weights/purchase");

    let (status, body) = send(
        &app,
        request("PUT", &uri, Some(json!({"ttl_days": u32::MAX}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.pointer("/error/code"), Some(&json!(1002)));

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/v1/queue",
            Some(json!({
                "website_id": website_id.to_string(),
                "widget_ids": [WidgetId::new().to_string()]
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn render_endpoint_blanks_missing_keys() {
    let app = app();
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/templates/render",
            Some(json!({"template": "{{a}} {{b}}", "data": {"a": "X"}})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("message"), Some(&json!("X ")));
}
