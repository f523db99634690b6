//! Persistence layer: the event store collaborator.
//!
//! The pipeline depends on storage only through the [`EventStore`] trait.
//! Two backends are provided: [`PostgresStore`] over `sqlx::PgPool` and
//! [`InMemoryStore`] for tests and single-node runs without a database.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

use crate::domain::{
    EventSource, EventType, MessageTemplate, ModerationStatus, NormalizedEvent,
    NotificationWeight, WebsiteId, WeightOverride, WidgetId,
};
use crate::error::GatewayError;
use crate::queue::{EligibilityRules, eligibility};

/// Parameters of a per-type candidate fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventWindowQuery {
    /// Widgets whose events are eligible.
    pub widget_ids: Vec<WidgetId>,
    /// Type being fetched.
    pub event_type: EventType,
    /// Oldest `created_at` returned.
    pub since: DateTime<Utc>,
    /// Maximum number of rows.
    pub limit: usize,
    /// Required moderation state.
    pub moderation_status: ModerationStatus,
    /// Skip quick-win rows.
    pub natural_only: bool,
    /// Rows with `expires_at <= as_of` are skipped.
    pub as_of: DateTime<Utc>,
}

impl EventWindowQuery {
    /// Query for approved candidates of `event_type` under `rules`.
    #[must_use]
    pub fn for_rules(
        widget_ids: Vec<WidgetId>,
        event_type: EventType,
        rules: &EligibilityRules,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            widget_ids,
            event_type,
            since: rules.window_start(now),
            limit: rules.max_per_queue,
            moderation_status: ModerationStatus::Approved,
            natural_only: rules.natural_only,
            as_of: now,
        }
    }

    /// Whether `event` satisfies every filter except the row limit.
    #[must_use]
    pub fn matches(&self, event: &NormalizedEvent) -> bool {
        self.widget_ids.contains(&event.widget_id)
            && event.event_type == self.event_type
            && event.created_at >= self.since
            && event.moderation_status == self.moderation_status
            && !event.is_expired(self.as_of)
            && !(self.natural_only && event.source == EventSource::QuickWin)
    }
}

/// Cutoff before which events are past every eligibility window.
///
/// The horizon is the longest default TTL, stretched to
/// `longest_override` days when a stored override reaches further back.
#[must_use]
pub fn retention_cutoff(now: DateTime<Utc>, longest_override: Option<u32>) -> DateTime<Utc> {
    let days = longest_override.map_or(NotificationWeight::retention_days(), |d| {
        d.max(NotificationWeight::retention_days())
    });
    eligibility::days_before(now, days)
}

/// Storage operations the pipeline depends on.
///
/// Implementations must be safe to share across request tasks.
#[async_trait]
pub trait EventStore: Send + Sync + fmt::Debug {
    /// Appends a normalized event.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn insert_event(&self, event: &NormalizedEvent) -> Result<(), GatewayError>;

    /// Fetches candidates for one type, newest first, at most
    /// `query.limit` rows.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn query_by_type_and_window(
        &self,
        query: &EventWindowQuery,
    ) -> Result<Vec<NormalizedEvent>, GatewayError>;

    /// Returns the override rows stored for `website_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn query_weights(
        &self,
        website_id: WebsiteId,
    ) -> Result<Vec<WeightOverride>, GatewayError>;

    /// Inserts or replaces the override for `(website_id, event_type)`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn upsert_weight(&self, row: &WeightOverride) -> Result<(), GatewayError>;

    /// Returns every stored message template.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn query_templates(&self) -> Result<Vec<MessageTemplate>, GatewayError>;

    /// Deletes events that have expired or fallen behind
    /// [`retention_cutoff`] for the longest stored override. Returns the
    /// number removed.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, GatewayError>;

    /// Short backend name for health reporting.
    fn backend(&self) -> &'static str;
}
