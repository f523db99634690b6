//! Ingest service: normalizes raw events and appends them to the store.

use std::sync::Arc;

use crate::domain::{NormalizedEvent, RawEvent, TemplateCatalog};
use crate::error::GatewayError;
use crate::normalizer::EventNormalizer;
use crate::persistence::EventStore;

/// Outcome of one item in a batch ingest.
pub type IngestOutcome = Result<NormalizedEvent, GatewayError>;

/// Orchestrates normalization and storage of raw events.
///
/// Normalization itself never fails; only envelope validation (done by
/// the caller when building a [`RawEvent`]) and the store insert can
/// reject an event.
#[derive(Debug, Clone)]
pub struct IngestService {
    store: Arc<dyn EventStore>,
    normalizer: Arc<EventNormalizer>,
}

impl IngestService {
    /// Creates a new `IngestService`.
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>, normalizer: Arc<EventNormalizer>) -> Self {
        Self { store, normalizer }
    }

    /// Loads the template catalog, falling back to an empty one when the
    /// store cannot serve it.
    pub async fn catalog(&self) -> TemplateCatalog {
        match self.store.query_templates().await {
            Ok(rows) => TemplateCatalog::new(rows),
            Err(e) => {
                tracing::warn!(error = %e, "template catalog unavailable, using fallbacks");
                TemplateCatalog::default()
            }
        }
    }

    /// Normalizes `raw` without storing it.
    pub async fn preview(&self, raw: &RawEvent) -> NormalizedEvent {
        let catalog = self.catalog().await;
        self.normalizer.normalize(raw, &catalog)
    }

    /// Normalizes and stores one event.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the store rejects the insert.
    pub async fn ingest(&self, raw: &RawEvent) -> Result<NormalizedEvent, GatewayError> {
        let catalog = self.catalog().await;
        self.ingest_with(raw, &catalog).await
    }

    /// Normalizes and stores a batch.
    ///
    /// Each item succeeds or fails on its own; a rejected item never stops
    /// the rest of the batch. Outcomes keep the input order.
    pub async fn ingest_batch(
        &self,
        items: Vec<Result<RawEvent, GatewayError>>,
    ) -> Vec<IngestOutcome> {
        let catalog = self.catalog().await;
        let mut outcomes = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let outcome = match item {
                Ok(raw) => self.ingest_with(&raw, &catalog).await,
                Err(e) => {
                    tracing::warn!(index, error = %e, "raw event rejected");
                    Err(e)
                }
            };
            outcomes.push(outcome);
        }
        let accepted = outcomes.iter().filter(|o| o.is_ok()).count();
        tracing::info!(
            accepted,
            rejected = outcomes.len() - accepted,
            "batch ingested"
        );
        outcomes
    }

    async fn ingest_with(
        &self,
        raw: &RawEvent,
        catalog: &TemplateCatalog,
    ) -> Result<NormalizedEvent, GatewayError> {
        let event = self.normalizer.normalize(raw, catalog);
        if let Err(e) = self.store.insert_event(&event).await {
            tracing::warn!(
                widget_id = %event.widget_id,
                event_type = %event.event_type,
                error = %e,
                "event insert failed"
            );
            return Err(e);
        }
        tracing::info!(
            event_id = %event.id,
            widget_id = %event.widget_id,
            event_type = %event.event_type,
            source = %event.integration_type,
            moderation = event.moderation_status.as_str(),
            "event ingested"
        );
        Ok(event)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{
        EventType, IntegrationType, MessageTemplate, ModerationStatus, WidgetId,
    };
    use crate::persistence::InMemoryStore;
    use serde_json::json;

    fn raw(source: IntegrationType, kind: &str, payload: serde_json::Value) -> RawEvent {
        let serde_json::Value::Object(payload) = payload else {
            panic!("payload must be an object");
        };
        RawEvent::new(source, kind, payload, WidgetId::new())
    }

    fn service(store: Arc<InMemoryStore>) -> IngestService {
        IngestService::new(store, Arc::new(EventNormalizer::new()))
    }

    #[tokio::test]
    async fn ingest_stores_normalized_event() {
        let store = Arc::new(InMemoryStore::new());
        let svc = service(Arc::clone(&store));
        let Ok(event) = svc
            .ingest(&raw(
                IntegrationType::Shopify,
                "orders/create",
                json!({"customer": {"first_name": "Sam"}}),
            ))
            .await
        else {
            panic!("ingest failed");
        };
        assert_eq!(event.event_type, EventType::Purchase);
        assert_eq!(event.moderation_status, ModerationStatus::Approved);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn stored_template_is_attached() {
        let store = Arc::new(InMemoryStore::with_templates(vec![MessageTemplate {
            id: uuid::Uuid::new_v4(),
            event_type: EventType::Signup,
            integration_type: None,
            template: "Welcome {{user_name}}!".to_string(),
            priority: 1,
            is_active: true,
        }]));
        let svc = service(store);
        let event = svc
            .preview(&raw(IntegrationType::Form, "newsletter", json!({"name": "Ana"})))
            .await;
        assert_eq!(event.message_template, "Welcome {{user_name}}!");
        assert_eq!(event.moderation_status, ModerationStatus::Pending);
    }

    #[tokio::test]
    async fn batch_isolates_failures() {
        let store = Arc::new(InMemoryStore::new());
        let svc = service(Arc::clone(&store));
        let items = vec![
            Ok(raw(IntegrationType::Api, "signup", json!({"name": "A"}))),
            Err(GatewayError::Validation("missing widget_id".to_string())),
            Ok(raw(IntegrationType::Unknown, "whatever", json!({}))),
        ];
        let outcomes = svc.ingest_batch(items).await;
        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes.first(), Some(Ok(_))));
        assert!(matches!(outcomes.get(1), Some(Err(GatewayError::Validation(_)))));
        assert!(matches!(outcomes.get(2), Some(Ok(e)) if e.event_type == EventType::Custom));
        assert_eq!(store.len().await, 2);
    }
}
