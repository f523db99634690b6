//! In-process event store.
//!
//! [`InMemoryStore`] keeps every table behind its own
//! [`tokio::sync::RwLock`], so concurrent queue builds read in parallel
//! while inserts are serialized.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{EventStore, EventWindowQuery, retention_cutoff};
use crate::domain::{EventType, MessageTemplate, NormalizedEvent, WebsiteId, WeightOverride};
use crate::error::GatewayError;

/// Event store held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    events: RwLock<Vec<NormalizedEvent>>,
    weights: RwLock<HashMap<(WebsiteId, EventType), WeightOverride>>,
    templates: RwLock<Vec<MessageTemplate>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store preloaded with template rows.
    #[must_use]
    pub fn with_templates(templates: Vec<MessageTemplate>) -> Self {
        Self {
            templates: RwLock::new(templates),
            ..Self::default()
        }
    }

    /// Adds a template row.
    pub async fn insert_template(&self, template: MessageTemplate) {
        self.templates.write().await.push(template);
    }

    /// Number of stored events.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Returns `true` if no events are stored.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn insert_event(&self, event: &NormalizedEvent) -> Result<(), GatewayError> {
        let mut events = self.events.write().await;
        if events.iter().any(|e| e.id == event.id) {
            return Err(GatewayError::PersistenceError(format!(
                "event {} already exists",
                event.id
            )));
        }
        events.push(event.clone());
        Ok(())
    }

    async fn query_by_type_and_window(
        &self,
        query: &EventWindowQuery,
    ) -> Result<Vec<NormalizedEvent>, GatewayError> {
        let events = self.events.read().await;
        let mut rows: Vec<NormalizedEvent> =
            events.iter().filter(|e| query.matches(e)).cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(query.limit);
        Ok(rows)
    }

    async fn query_weights(
        &self,
        website_id: WebsiteId,
    ) -> Result<Vec<WeightOverride>, GatewayError> {
        let weights = self.weights.read().await;
        let mut rows: Vec<WeightOverride> = weights
            .values()
            .filter(|o| o.website_id == website_id)
            .cloned()
            .collect();
        rows.sort_by_key(|o| o.event_type);
        Ok(rows)
    }

    async fn upsert_weight(&self, row: &WeightOverride) -> Result<(), GatewayError> {
        self.weights
            .write()
            .await
            .insert((row.website_id, row.event_type), row.clone());
        Ok(())
    }

    async fn query_templates(&self) -> Result<Vec<MessageTemplate>, GatewayError> {
        Ok(self.templates.read().await.clone())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, GatewayError> {
        let longest = self
            .weights
            .read()
            .await
            .values()
            .filter_map(|o| o.ttl_days)
            .max();
        let cutoff = retention_cutoff(now, longest);
        let mut events = self.events.write().await;
        let before = events.len();
        events.retain(|e| !e.is_expired(now) && e.created_at >= cutoff);
        Ok(u64::try_from(before - events.len()).unwrap_or(u64::MAX))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
