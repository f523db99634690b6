//! Website weight handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::dto::{UpsertWeightRequest, WeightTableResponse};
use crate::app_state::AppState;
use crate::domain::{EventType, WebsiteId, WeightOverride};
use crate::error::{ErrorResponse, GatewayError};

/// `GET /websites/{id}/weights`: Effective weight table.
///
/// # Errors
///
/// Never fails: unreadable overrides fall back to the defaults.
#[utoipa::path(
    get,
    path = "/api/v1/websites/{id}/weights",
    tag = "Weights",
    summary = "Get effective weights",
    description = "Returns the rule per event type after applying the website's overrides on top of the defaults.",
    params(
        ("id" = uuid::Uuid, Path, description = "Website UUID"),
    ),
    responses(
        (status = 200, description = "Effective weight table", body = WeightTableResponse),
    )
)]
pub async fn get_weights(
    State(state): State<AppState>,
    Path(website_id): Path<WebsiteId>,
) -> Result<impl IntoResponse, GatewayError> {
    let table = state.queue_service.weight_table(website_id).await;
    Ok(Json(WeightTableResponse::new(website_id, &table)))
}

/// `PUT /websites/{id}/weights/{event_type}`: Upsert an override.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for an unknown event type or a
/// `ttl_days` above [`crate::domain::NotificationWeight::MAX_TTL_DAYS`].
#[utoipa::path(
    put,
    path = "/api/v1/websites/{id}/weights/{event_type}",
    tag = "Weights",
    summary = "Override a weight rule",
    description = "Stores an override for one event type. Omitted fields keep the default; a weight of 0 disables the type.",
    params(
        ("id" = uuid::Uuid, Path, description = "Website UUID"),
        ("event_type" = String, Path, description = "Canonical event type tag"),
    ),
    request_body = UpsertWeightRequest,
    responses(
        (status = 200, description = "Updated weight table", body = WeightTableResponse),
        (status = 400, description = "Unknown event type or ttl_days out of range", body = ErrorResponse),
    )
)]
pub async fn upsert_weight(
    State(state): State<AppState>,
    Path((website_id, event_type)): Path<(WebsiteId, String)>,
    Json(req): Json<UpsertWeightRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let event_type = EventType::from_tag(&event_type)
        .ok_or_else(|| GatewayError::InvalidRequest(format!("unknown event type: {event_type}")))?;

    let row = WeightOverride {
        website_id,
        event_type,
        weight: req.weight,
        max_per_queue: req.max_per_queue,
        ttl_days: req.ttl_days,
    };
    let table = state.queue_service.upsert_weight(&row).await?;
    Ok(Json(WeightTableResponse::new(website_id, &table)))
}

/// Weight routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/websites/{id}/weights", get(get_weights))
        .route("/websites/{id}/weights/{event_type}", put(upsert_weight))
}
