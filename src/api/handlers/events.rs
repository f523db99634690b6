//! Event ingest handlers: single, batch, and dry-run normalization.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{
    BatchIngestRequest, BatchIngestResponse, BatchItemResult, IngestEventRequest,
};
use crate::app_state::AppState;
use crate::domain::NormalizedEvent;
use crate::error::{ErrorBody, ErrorResponse, GatewayError};

/// `POST /events`: Normalize and store one raw event.
///
/// # Errors
///
/// Returns [`GatewayError::Validation`] for a malformed envelope, or a
/// persistence error if the store rejects the insert.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Ingest a raw event",
    description = "Validates the shared envelope, normalizes the payload with the strategy registered for its source, and stores the result. Trusted sources are auto-approved; review platforms and forms start pending.",
    request_body = IngestEventRequest,
    responses(
        (status = 201, description = "Event normalized and stored", body = NormalizedEvent),
        (status = 400, description = "Malformed envelope", body = ErrorResponse),
        (status = 500, description = "Store rejected the insert", body = ErrorResponse),
    )
)]
pub async fn ingest_event(
    State(state): State<AppState>,
    Json(req): Json<IngestEventRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let raw = req.into_raw().inspect_err(|e| {
        tracing::warn!(error = %e, "raw event rejected");
    })?;
    let event = state.ingest_service.ingest(&raw).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// `POST /events/batch`: Ingest many raw events independently.
///
/// # Errors
///
/// Never fails as a whole; per-item failures are reported in the body.
#[utoipa::path(
    post,
    path = "/api/v1/events/batch",
    tag = "Events",
    summary = "Ingest a batch of raw events",
    description = "Each item is validated, normalized, and stored on its own. A rejected item does not affect the others.",
    request_body = BatchIngestRequest,
    responses(
        (status = 200, description = "Per-item report", body = BatchIngestResponse),
    )
)]
pub async fn ingest_batch(
    State(state): State<AppState>,
    Json(req): Json<BatchIngestRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let outcomes = state
        .ingest_service
        .ingest_batch(req.into_raw_events())
        .await;

    let results: Vec<BatchItemResult> = outcomes
        .into_iter()
        .enumerate()
        .map(|(index, outcome)| match outcome {
            Ok(event) => BatchItemResult {
                index,
                status: "accepted".to_string(),
                event_id: Some(event.id),
                error: None,
            },
            Err(e) => BatchItemResult {
                index,
                status: "rejected".to_string(),
                event_id: None,
                error: Some(ErrorBody {
                    code: e.error_code(),
                    message: e.to_string(),
                    details: None,
                }),
            },
        })
        .collect();
    let accepted = results.iter().filter(|r| r.event_id.is_some()).count();

    Ok(Json(BatchIngestResponse {
        accepted,
        rejected: results.len() - accepted,
        results,
    }))
}

/// `POST /events/normalize`: Normalize without storing.
///
/// # Errors
///
/// Returns [`GatewayError::Validation`] for a malformed envelope.
#[utoipa::path(
    post,
    path = "/api/v1/events/normalize",
    tag = "Events",
    summary = "Preview normalization",
    description = "Runs the same normalization as ingest and returns the record without storing it.",
    request_body = IngestEventRequest,
    responses(
        (status = 200, description = "Normalized record", body = NormalizedEvent),
        (status = 400, description = "Malformed envelope", body = ErrorResponse),
    )
)]
pub async fn normalize_event(
    State(state): State<AppState>,
    Json(req): Json<IngestEventRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let raw = req.into_raw()?;
    let event = state.ingest_service.preview(&raw).await;
    Ok(Json(event))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(ingest_event))
        .route("/events/batch", post(ingest_batch))
        .route("/events/normalize", post(normalize_event))
}
