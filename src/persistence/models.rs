//! Database rows for events, weight overrides, and templates.
//!
//! Enum columns are stored as their snake_case tags. Reading a row back is
//! lenient: unknown tags map to the catch-all variant instead of failing
//! the whole query.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{
    EventId, EventSource, EventType, IntegrationType, MessageTemplate, ModerationStatus,
    NormalizedEvent, Payload, WebsiteId, WeightOverride, WidgetId,
};

/// A row of the `events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    /// Event identifier.
    pub id: Uuid,
    /// Owning widget.
    pub widget_id: Uuid,
    /// Canonical type tag.
    pub event_type: String,
    /// JSONB canonical fields.
    pub event_data: Value,
    /// Display name.
    pub user_name: Option<String>,
    /// Email.
    pub user_email: Option<String>,
    /// Location.
    pub user_location: Option<String>,
    /// Unrendered template.
    pub message_template: String,
    /// Source tag.
    pub integration_type: String,
    /// Moderation tag.
    pub moderation_status: String,
    /// Completeness score.
    pub quality_score: i16,
    /// Provenance tag.
    pub source: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&NormalizedEvent> for EventRow {
    fn from(event: &NormalizedEvent) -> Self {
        Self {
            id: *event.id.as_uuid(),
            widget_id: *event.widget_id.as_uuid(),
            event_type: event.event_type.as_str().to_string(),
            event_data: Value::Object(event.event_data.clone()),
            user_name: event.user_name.clone(),
            user_email: event.user_email.clone(),
            user_location: event.user_location.clone(),
            message_template: event.message_template.clone(),
            integration_type: event.integration_type.as_str().to_string(),
            moderation_status: event.moderation_status.as_str().to_string(),
            quality_score: i16::from(event.quality_score),
            source: event.source.as_str().to_string(),
            created_at: event.created_at,
            expires_at: event.expires_at,
        }
    }
}

impl From<EventRow> for NormalizedEvent {
    fn from(row: EventRow) -> Self {
        let event_data = match row.event_data {
            Value::Object(map) => map,
            _ => Payload::new(),
        };
        Self {
            id: EventId::from_uuid(row.id),
            widget_id: WidgetId::from_uuid(row.widget_id),
            event_type: EventType::from_tag_or_custom(&row.event_type),
            event_data,
            user_name: row.user_name,
            user_email: row.user_email,
            user_location: row.user_location,
            message_template: row.message_template,
            integration_type: IntegrationType::parse(&row.integration_type),
            moderation_status: ModerationStatus::parse(&row.moderation_status),
            quality_score: u8::try_from(row.quality_score.clamp(0, 100)).unwrap_or(0),
            source: EventSource::parse(&row.source),
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

/// A row of the `notification_weights` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WeightRow {
    /// Owning website.
    pub website_id: Uuid,
    /// Canonical type tag.
    pub event_type: String,
    /// Overridden weight.
    pub weight: Option<i32>,
    /// Overridden cap.
    pub max_per_queue: Option<i32>,
    /// Overridden window in days.
    pub ttl_days: Option<i32>,
}

impl From<WeightRow> for WeightOverride {
    fn from(row: WeightRow) -> Self {
        Self {
            website_id: WebsiteId::from_uuid(row.website_id),
            event_type: EventType::from_tag_or_custom(&row.event_type),
            weight: row.weight.and_then(|v| u32::try_from(v).ok()),
            max_per_queue: row.max_per_queue.and_then(|v| usize::try_from(v).ok()),
            ttl_days: row.ttl_days.and_then(|v| u32::try_from(v).ok()),
        }
    }
}

impl From<&WeightOverride> for WeightRow {
    fn from(o: &WeightOverride) -> Self {
        Self {
            website_id: *o.website_id.as_uuid(),
            event_type: o.event_type.as_str().to_string(),
            weight: o.weight.map(|v| i32::try_from(v).unwrap_or(i32::MAX)),
            max_per_queue: o.max_per_queue.map(|v| i32::try_from(v).unwrap_or(i32::MAX)),
            ttl_days: o.ttl_days.map(|v| i32::try_from(v).unwrap_or(i32::MAX)),
        }
    }
}

/// A row of the `message_templates` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TemplateRow {
    /// Row identifier.
    pub id: Uuid,
    /// Canonical type tag.
    pub event_type: String,
    /// Source tag; `NULL` matches every source.
    pub integration_type: Option<String>,
    /// Template body.
    pub template: String,
    /// Higher wins.
    pub priority: i32,
    /// Inactive rows are ignored.
    pub is_active: bool,
}

impl From<TemplateRow> for MessageTemplate {
    fn from(row: TemplateRow) -> Self {
        Self {
            id: row.id,
            event_type: EventType::from_tag_or_custom(&row.event_type),
            integration_type: row.integration_type.as_deref().map(IntegrationType::parse),
            template: row.template,
            priority: row.priority,
            is_active: row.is_active,
        }
    }
}
