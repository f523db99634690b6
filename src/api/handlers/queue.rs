//! Queue build handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::BuildQueueRequest;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};
use crate::queue::QueueResponse;
use crate::service::QueueRequest;

/// `POST /queue`: Build a weighted notification queue.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for an empty widget list, or
/// [`GatewayError::StoreUnavailable`] if no candidates could be fetched.
#[utoipa::path(
    post,
    path = "/api/v1/queue",
    tag = "Queue",
    summary = "Build a notification queue",
    description = "Fetches approved, in-window candidates per event type, interleaves them by weighted round-robin without replacement, and renders each message. A type whose fetch fails contributes nothing; the queue may be shorter than requested.",
    request_body = BuildQueueRequest,
    responses(
        (status = 200, description = "Rendered queue with build metadata", body = QueueResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 503, description = "Event store unavailable", body = ErrorResponse),
    )
)]
pub async fn build_queue(
    State(state): State<AppState>,
    Json(req): Json<BuildQueueRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let request = QueueRequest::from(req);
    let response = state.queue_service.build_queue(&request).await?;
    Ok(Json(response))
}

/// Queue routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/queue", post(build_queue))
}
