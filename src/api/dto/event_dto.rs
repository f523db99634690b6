//! Event ingest DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{EventId, RawEvent};
use crate::error::{ErrorBody, GatewayError};

/// Request body for `POST /events` and `POST /events/normalize`.
///
/// This is the shared envelope every integration delivers. Only
/// `widget_id` and an object `payload` are required.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngestEventRequest {
    /// Integration tag (e.g. `"shopify"`); unknown tags are accepted.
    #[serde(default)]
    pub source: String,
    /// Source-specific type string (e.g. `"orders/create"`).
    #[serde(default)]
    pub event_type: Option<String>,
    /// Target widget UUID.
    #[serde(default)]
    pub widget_id: Option<String>,
    /// Source payload; must be a JSON object.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub payload: Value,
}

impl IngestEventRequest {
    /// Validates the envelope.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] if the widget id is missing or
    /// malformed or the payload is not an object.
    pub fn into_raw(self) -> Result<RawEvent, GatewayError> {
        RawEvent::from_envelope(
            &self.source,
            self.event_type.as_deref(),
            self.widget_id.as_deref(),
            self.payload,
        )
    }
}

/// Request body for `POST /events/batch`.
///
/// Items are kept as raw JSON so that a malformed item is rejected on its
/// own instead of failing the whole request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BatchIngestRequest {
    /// Envelopes shaped like [`IngestEventRequest`].
    #[schema(value_type = Vec<Object>)]
    pub events: Vec<Value>,
}

impl BatchIngestRequest {
    /// Validates every envelope, keeping input order.
    #[must_use]
    pub fn into_raw_events(self) -> Vec<Result<RawEvent, GatewayError>> {
        self.events
            .into_iter()
            .map(|item| {
                serde_json::from_value::<IngestEventRequest>(item)
                    .map_err(|e| GatewayError::Validation(e.to_string()))
                    .and_then(IngestEventRequest::into_raw)
            })
            .collect()
    }
}

/// Per-item result in a batch response.
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchItemResult {
    /// Position in the request.
    pub index: usize,
    /// `"accepted"` or `"rejected"`.
    pub status: String,
    /// Stored event id when accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
    /// Failure when rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Response body for `POST /events/batch`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchIngestResponse {
    /// Number of stored events.
    pub accepted: usize,
    /// Number of rejected items.
    pub rejected: usize,
    /// Per-item results in request order.
    pub results: Vec<BatchItemResult>,
}
