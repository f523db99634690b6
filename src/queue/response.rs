//! The render-ready queue handed to client widgets.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use utoipa::ToSchema;

use super::builder;
use crate::domain::template::{render_event, time_ago};
use crate::domain::{
    EventId, EventSource, EventType, IntegrationType, NormalizedEvent, Payload, WeightTable,
    WidgetId,
};

/// One queue entry with its rendered message.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenderedNotification {
    /// Event identifier.
    pub id: EventId,
    /// Owning widget.
    pub widget_id: WidgetId,
    /// Canonical type.
    pub event_type: EventType,
    /// Final display string.
    pub message: String,
    /// Display name, if known.
    pub user_name: Option<String>,
    /// Location, if known.
    pub user_location: Option<String>,
    /// Canonical fields for client-side decoration (images, links).
    #[schema(value_type = Object)]
    pub event_data: Payload,
    /// Completeness score.
    pub quality_score: u8,
    /// Originating source.
    pub integration_type: IntegrationType,
    /// Provenance.
    pub source: EventSource,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Relative age at build time.
    pub time_ago: String,
}

impl RenderedNotification {
    /// Renders `event` as of `now`.
    #[must_use]
    pub fn render(event: NormalizedEvent, now: DateTime<Utc>) -> Self {
        let message = render_event(&event, now);
        let time_ago = time_ago(event.created_at, now);
        let mut event_data = event.event_data;
        event_data.remove("email");
        event_data.remove("user_email");
        Self {
            id: event.id,
            widget_id: event.widget_id,
            event_type: event.event_type,
            message,
            user_name: event.user_name,
            user_location: event.user_location,
            event_data,
            quality_score: event.quality_score,
            integration_type: event.integration_type,
            source: event.source,
            created_at: event.created_at,
            time_ago,
        }
    }
}

/// Build statistics returned next to the queue.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QueueMetadata {
    /// Candidates available across all types before interleaving.
    pub total_available: usize,
    /// Events taken per type.
    pub distribution: BTreeMap<String, usize>,
    /// Weight used per participating type.
    pub weights_applied: BTreeMap<String, u32>,
    /// Number of events in the queue.
    pub queue_size: usize,
    /// Build timestamp.
    pub generated_at: DateTime<Utc>,
}

/// Ordered queue plus metadata.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QueueResponse {
    /// Render-ready events in display order.
    pub events: Vec<RenderedNotification>,
    /// Build statistics.
    pub queue_metadata: QueueMetadata,
}

/// Interleaves candidate pools and renders the result.
///
/// Pure apart from `rng`: the same pools, table, seed, and `now` always
/// give the same response.
pub fn assemble<R: Rng + ?Sized>(
    grouped: &BTreeMap<EventType, Vec<NormalizedEvent>>,
    table: &WeightTable,
    target_size: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> QueueResponse {
    let weights = table.weights();
    let queue = builder::build(grouped, &weights, target_size, rng);

    let distribution = builder::distribution(&queue)
        .into_iter()
        .map(|(t, n)| (t.to_string(), n))
        .collect();
    let weights_applied = grouped
        .keys()
        .map(|t| (t.to_string(), table.get(*t).weight))
        .filter(|(_, w)| *w > 0)
        .collect();
    let total_available = grouped.values().map(Vec::len).sum();
    let queue_size = queue.len();

    QueueResponse {
        events: queue
            .into_iter()
            .map(|event| RenderedNotification::render(event, now))
            .collect(),
        queue_metadata: QueueMetadata {
            total_available,
            distribution,
            weights_applied,
            queue_size,
            generated_at: now,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ModerationStatus, WeightOverride, WebsiteId};
    use chrono::Duration;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    fn purchase(name: &str, product: &str, now: DateTime<Utc>) -> NormalizedEvent {
        let mut event_data = Payload::new();
        event_data.insert("product_name".to_string(), json!(product));
        event_data.insert("email".to_string(), json!("hidden@example.com"));
        NormalizedEvent {
            id: EventId::new(),
            widget_id: WidgetId::new(),
            event_type: EventType::Purchase,
            event_data,
            user_name: Some(name.to_string()),
            user_email: Some("hidden@example.com".to_string()),
            user_location: Some("Austin, US".to_string()),
            message_template: "{{user_name}} from {{user_location}} just bought {{product_name}}"
                .to_string(),
            integration_type: IntegrationType::Shopify,
            moderation_status: ModerationStatus::Approved,
            quality_score: 85,
            source: EventSource::Natural,
            created_at: now - Duration::minutes(5),
            expires_at: None,
        }
    }

    #[test]
    fn renders_and_reports_metadata() {
        let now = Utc::now();
        let mut grouped = BTreeMap::new();
        grouped.insert(
            EventType::Purchase,
            vec![purchase("Sam", "Mug", now), purchase("Ana", "Tea", now)],
        );
        grouped.insert(EventType::Signup, Vec::new());

        let response = assemble(
            &grouped,
            &WeightTable::defaults(),
            15,
            now,
            &mut StdRng::seed_from_u64(5),
        );

        assert_eq!(response.events.len(), 2);
        let first = response.events.first().map(|e| e.message.clone());
        assert_eq!(first.as_deref(), Some("Sam from Austin, US just bought Mug"));
        assert!(response.events.iter().all(|e| e.time_ago == "5 minutes ago"));
        assert!(response.events.iter().all(|e| !e.event_data.contains_key("email")));

        let meta = &response.queue_metadata;
        assert_eq!(meta.total_available, 2);
        assert_eq!(meta.queue_size, 2);
        assert_eq!(meta.distribution.get("purchase"), Some(&2));
        assert_eq!(meta.weights_applied.get("purchase"), Some(&10));
        assert_eq!(meta.weights_applied.get("signup"), Some(&6));
    }

    #[test]
    fn disabled_types_are_left_out_of_weights_applied() {
        let now = Utc::now();
        let mut grouped = BTreeMap::new();
        grouped.insert(EventType::Purchase, vec![purchase("Sam", "Mug", now)]);
        let table = WeightTable::resolve(&[WeightOverride {
            website_id: WebsiteId::new(),
            event_type: EventType::Purchase,
            weight: Some(0),
            max_per_queue: None,
            ttl_days: None,
        }]);
        let response = assemble(&grouped, &table, 15, now, &mut StdRng::seed_from_u64(1));
        assert!(response.events.is_empty());
        assert!(response.queue_metadata.weights_applied.is_empty());
    }

    #[test]
    fn serializes_outbound_contract() {
        let now = Utc::now();
        let response = assemble(
            &BTreeMap::new(),
            &WeightTable::defaults(),
            15,
            now,
            &mut StdRng::seed_from_u64(1),
        );
        let value = serde_json::to_value(&response).unwrap_or_default();
        assert!(value.get("events").is_some_and(serde_json::Value::is_array));
        let meta = value.get("queue_metadata");
        for key in [
            "total_available",
            "distribution",
            "weights_applied",
            "queue_size",
            "generated_at",
        ] {
            assert!(meta.and_then(|m| m.get(key)).is_some(), "missing {key}");
        }
    }
}
