//! Raw and normalized event records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::{EventId, EventSource, EventType, IntegrationType, ModerationStatus, WidgetId};
use crate::error::GatewayError;

/// Untyped key/value payload as delivered by an integration.
pub type Payload = Map<String, Value>;

/// A payload as delivered by an integration, before normalization.
///
/// Ephemeral: a `RawEvent` is normalized immediately and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    /// Integration the payload came from.
    pub source: IntegrationType,
    /// Source-specific type string (e.g. `"orders/create"`).
    pub event_type: String,
    /// Opaque payload object.
    pub payload: Payload,
    /// Widget the event is delivered to.
    pub widget_id: WidgetId,
}

impl RawEvent {
    /// Creates a raw event from already-validated parts.
    #[must_use]
    pub fn new(
        source: IntegrationType,
        event_type: impl Into<String>,
        payload: Payload,
        widget_id: WidgetId,
    ) -> Self {
        Self {
            source,
            event_type: event_type.into(),
            payload,
            widget_id,
        }
    }

    /// Validates the shared envelope and builds a `RawEvent`.
    ///
    /// The envelope needs a parsable widget id and a JSON object payload.
    /// The source tag is free-form; unknown tags map to
    /// [`IntegrationType::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] if the widget id is missing or
    /// malformed, or if the payload is not a JSON object.
    pub fn from_envelope(
        source: &str,
        event_type: Option<&str>,
        widget_id: Option<&str>,
        payload: Value,
    ) -> Result<Self, GatewayError> {
        let widget_id = widget_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| GatewayError::Validation("missing widget_id".to_string()))?;
        let widget_id: WidgetId = widget_id
            .parse()
            .map_err(|e| GatewayError::Validation(format!("invalid widget_id: {e}")))?;

        let Value::Object(payload) = payload else {
            return Err(GatewayError::Validation(
                "payload must be a JSON object".to_string(),
            ));
        };

        Ok(Self::new(
            IntegrationType::parse(source),
            event_type.unwrap_or_default().trim(),
            payload,
            widget_id,
        ))
    }
}

/// Canonical event record produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NormalizedEvent {
    /// Unique event identifier.
    pub id: EventId,
    /// Owning widget.
    pub widget_id: WidgetId,
    /// Canonical type tag.
    pub event_type: EventType,
    /// Raw payload merged with derived canonical fields.
    #[schema(value_type = Object)]
    pub event_data: Payload,
    /// Display name of the actor.
    pub user_name: Option<String>,
    /// Email of the actor. Never rendered.
    pub user_email: Option<String>,
    /// Human-readable location (`"Austin, US"`).
    pub user_location: Option<String>,
    /// Message template with `{{field}}` placeholders.
    pub message_template: String,
    /// Originating source kind.
    pub integration_type: IntegrationType,
    /// Moderation state.
    pub moderation_status: ModerationStatus,
    /// Completeness score in `0..=100`.
    pub quality_score: u8,
    /// Natural capture or quick-win entry.
    pub source: EventSource,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Optional hard expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

impl NormalizedEvent {
    /// Whether the event is past its explicit expiry at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}
