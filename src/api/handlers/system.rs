//! System endpoints: health check and event type catalog.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::template::fallback_template;
use crate::domain::{EventType, NotificationWeight};

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    store: String,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, store backend, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store: state.store.backend().to_string(),
        }),
    )
}

/// Supported event type info.
#[derive(Debug, Serialize, ToSchema)]
struct EventTypeInfo {
    event_type: EventType,
    weight: u32,
    max_per_queue: usize,
    ttl_days: u32,
    has_default_rule: bool,
    fallback_template: &'static str,
}

/// `GET /config/event-types`: List canonical event types.
#[utoipa::path(
    get,
    path = "/config/event-types",
    tag = "System",
    summary = "List event types",
    description = "Returns every canonical event type with its default rule and fallback template.",
    responses(
        (status = 200, description = "Event type catalog", body = Vec<EventTypeInfo>),
    )
)]
pub async fn event_types_handler() -> impl IntoResponse {
    let types: Vec<EventTypeInfo> = EventType::ALL
        .into_iter()
        .map(|event_type| {
            let default = NotificationWeight::default_for(event_type);
            let rule = default.unwrap_or(NotificationWeight::FALLBACK);
            EventTypeInfo {
                event_type,
                weight: rule.weight,
                max_per_queue: rule.max_per_queue,
                ttl_days: rule.ttl_days,
                has_default_rule: default.is_some(),
                fallback_template: fallback_template(event_type),
            }
        })
        .collect();
    (StatusCode::OK, Json(types))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/event-types", get(event_types_handler))
}
