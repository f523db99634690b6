//! PostgreSQL implementation of the event store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{EventRow, TemplateRow, WeightRow};
use super::{EventStore, EventWindowQuery, retention_cutoff};
use crate::domain::{MessageTemplate, NormalizedEvent, WebsiteId, WeightOverride};
use crate::error::GatewayError;

const EVENT_COLUMNS: &str = "id, widget_id, event_type, event_data, user_name, user_email, \
     user_location, message_template, integration_type, moderation_status, quality_score, \
     source, created_at, expires_at";

/// PostgreSQL-backed event store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), GatewayError> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))
    }
}

#[async_trait]
impl EventStore for PostgresStore {
    async fn insert_event(&self, event: &NormalizedEvent) -> Result<(), GatewayError> {
        let row = EventRow::from(event);
        sqlx::query(
            "INSERT INTO events (id, widget_id, event_type, event_data, user_name, user_email, \
             user_location, message_template, integration_type, moderation_status, \
             quality_score, source, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(row.id)
        .bind(row.widget_id)
        .bind(row.event_type)
        .bind(row.event_data)
        .bind(row.user_name)
        .bind(row.user_email)
        .bind(row.user_location)
        .bind(row.message_template)
        .bind(row.integration_type)
        .bind(row.moderation_status)
        .bind(row.quality_score)
        .bind(row.source)
        .bind(row.created_at)
        .bind(row.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(())
    }

    async fn query_by_type_and_window(
        &self,
        query: &EventWindowQuery,
    ) -> Result<Vec<NormalizedEvent>, GatewayError> {
        let widget_ids: Vec<Uuid> = query.widget_ids.iter().map(|w| *w.as_uuid()).collect();
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE widget_id = ANY($1) AND event_type = $2 AND created_at >= $3 \
             AND moderation_status = $4 \
             AND (expires_at IS NULL OR expires_at > $5) \
             AND (NOT $6 OR source = 'natural') \
             ORDER BY created_at DESC LIMIT $7"
        );

        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(widget_ids)
            .bind(query.event_type.as_str())
            .bind(query.since)
            .bind(query.moderation_status.as_str())
            .bind(query.as_of)
            .bind(query.natural_only)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(rows.into_iter().map(NormalizedEvent::from).collect())
    }

    async fn query_weights(
        &self,
        website_id: WebsiteId,
    ) -> Result<Vec<WeightOverride>, GatewayError> {
        let rows = sqlx::query_as::<_, WeightRow>(
            "SELECT website_id, event_type, weight, max_per_queue, ttl_days \
             FROM notification_weights WHERE website_id = $1 ORDER BY updated_at ASC",
        )
        .bind(*website_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(rows.into_iter().map(WeightOverride::from).collect())
    }

    async fn upsert_weight(&self, row: &WeightOverride) -> Result<(), GatewayError> {
        let row = WeightRow::from(row);
        sqlx::query(
            "INSERT INTO notification_weights (website_id, event_type, weight, max_per_queue, ttl_days) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (website_id, event_type) DO UPDATE SET \
             weight = EXCLUDED.weight, max_per_queue = EXCLUDED.max_per_queue, \
             ttl_days = EXCLUDED.ttl_days, updated_at = NOW()",
        )
        .bind(row.website_id)
        .bind(row.event_type)
        .bind(row.weight)
        .bind(row.max_per_queue)
        .bind(row.ttl_days)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(())
    }

    async fn query_templates(&self) -> Result<Vec<MessageTemplate>, GatewayError> {
        let rows = sqlx::query_as::<_, TemplateRow>(
            "SELECT id, event_type, integration_type, template, priority, is_active \
             FROM message_templates",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(rows.into_iter().map(MessageTemplate::from).collect())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, GatewayError> {
        let longest: Option<i32> =
            sqlx::query_scalar("SELECT MAX(ttl_days) FROM notification_weights")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        let longest = longest.and_then(|d| u32::try_from(d).ok());

        let result =
            sqlx::query("DELETE FROM events WHERE expires_at <= $1 OR created_at < $2")
                .bind(now)
                .bind(retention_cutoff(now, longest))
                .execute(&self.pool)
                .await
                .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(result.rows_affected())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
