//! Queue service: resolves weights, fetches candidates, and builds queues.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::QueueConfig;
use crate::domain::{
    EventType, NormalizedEvent, NotificationWeight, WebsiteId, WeightOverride, WeightTable,
    WidgetId,
};
use crate::error::GatewayError;
use crate::persistence::{EventStore, EventWindowQuery};
use crate::queue::{EligibilityRules, QueueResponse, eligibility, response};

/// Parameters of one queue build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueRequest {
    /// Website whose weight overrides apply.
    pub website_id: WebsiteId,
    /// Widgets whose events are eligible.
    pub widget_ids: Vec<WidgetId>,
    /// Requested size; the configured default when `None`.
    pub target_size: Option<usize>,
    /// Exclude quick-win events.
    pub natural_only: bool,
}

/// Candidate pools per type, ready for interleaving.
pub type CandidatePools = BTreeMap<EventType, Vec<NormalizedEvent>>;

/// Builds notification queues on demand.
///
/// Every build is independent: the only shared state is the store, and
/// the per-build cursor state lives inside [`crate::queue::builder`].
#[derive(Debug, Clone)]
pub struct QueueService {
    store: Arc<dyn EventStore>,
    config: QueueConfig,
}

impl QueueService {
    /// Creates a new `QueueService`.
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>, config: QueueConfig) -> Self {
        Self { store, config }
    }

    /// Queue settings in effect.
    #[must_use]
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Effective weight table for a website.
    ///
    /// Falls back to the defaults when the overrides cannot be read.
    pub async fn weight_table(&self, website_id: WebsiteId) -> WeightTable {
        match self.store.query_weights(website_id).await {
            Ok(overrides) => WeightTable::resolve(&overrides),
            Err(e) => {
                let err = GatewayError::Configuration(e.to_string());
                tracing::debug!(%website_id, error = %err, "using default weights");
                WeightTable::defaults()
            }
        }
    }

    /// Stores an override and returns the resulting table.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if `ttl_days` exceeds
    /// [`NotificationWeight::MAX_TTL_DAYS`], or a [`GatewayError`] if the
    /// store rejects the write.
    pub async fn upsert_weight(&self, row: &WeightOverride) -> Result<WeightTable, GatewayError> {
        if let Some(days) = row.ttl_days.filter(|d| *d > NotificationWeight::MAX_TTL_DAYS) {
            return Err(GatewayError::InvalidRequest(format!(
                "ttl_days {days} exceeds the limit of {}",
                NotificationWeight::MAX_TTL_DAYS
            )));
        }
        self.store.upsert_weight(row).await?;
        tracing::info!(
            website_id = %row.website_id,
            event_type = %row.event_type,
            "weight override stored"
        );
        Ok(self.weight_table(row.website_id).await)
    }

    /// Builds a queue using entropy-seeded randomness and the current time.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if no widget is given, or
    /// [`GatewayError::StoreUnavailable`] if every per-type fetch fails.
    pub async fn build_queue(&self, request: &QueueRequest) -> Result<QueueResponse, GatewayError> {
        let now = Utc::now();
        let (table, pools) = self.prepare(request, now).await?;
        let mut rng = StdRng::from_entropy();
        Ok(self.finish(request, &table, &pools, now, &mut rng))
    }

    /// Builds a queue as of `now` drawing from `rng`.
    ///
    /// # Errors
    ///
    /// Same as [`QueueService::build_queue`].
    pub async fn build_queue_with<R: Rng + ?Sized>(
        &self,
        request: &QueueRequest,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<QueueResponse, GatewayError> {
        let (table, pools) = self.prepare(request, now).await?;
        Ok(self.finish(request, &table, &pools, now, rng))
    }

    async fn prepare(
        &self,
        request: &QueueRequest,
        now: DateTime<Utc>,
    ) -> Result<(WeightTable, CandidatePools), GatewayError> {
        if request.widget_ids.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "widget_ids must not be empty".to_string(),
            ));
        }
        let table = self.weight_table(request.website_id).await;
        let pools = self.fetch_candidates(request, &table, now).await?;
        Ok((table, pools))
    }

    fn finish<R: Rng + ?Sized>(
        &self,
        request: &QueueRequest,
        table: &WeightTable,
        pools: &CandidatePools,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> QueueResponse {
        let target = self.config.target_size(request.target_size);
        let response = response::assemble(pools, table, target, now, rng);
        tracing::info!(
            website_id = %request.website_id,
            widgets = request.widget_ids.len(),
            total_available = response.queue_metadata.total_available,
            queue_size = response.queue_metadata.queue_size,
            "queue built"
        );
        response
    }

    /// Fetches one candidate pool per enabled type, concurrently.
    ///
    /// A type whose fetch fails or times out contributes an empty pool.
    async fn fetch_candidates(
        &self,
        request: &QueueRequest,
        table: &WeightTable,
        now: DateTime<Utc>,
    ) -> Result<CandidatePools, GatewayError> {
        let store = self.store.as_ref();
        let deadline = self.config.fetch_timeout;

        let fetches = table.enabled().map(move |(event_type, weight)| {
            let rules = EligibilityRules::from_weight(weight, request.natural_only);
            let query =
                EventWindowQuery::for_rules(request.widget_ids.clone(), event_type, &rules, now);
            async move {
                let fetched =
                    match tokio::time::timeout(deadline, store.query_by_type_and_window(&query))
                        .await
                    {
                        Ok(Ok(rows)) => Ok(eligibility::select(&rows, event_type, &rules, now)),
                        Ok(Err(e)) => Err(e.to_string()),
                        Err(_) => Err(GatewayError::Timeout(
                            u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                        )
                        .to_string()),
                    };
                (
                    event_type,
                    fetched.map_err(|message| GatewayError::SourceFetch {
                        event_type,
                        message,
                    }),
                )
            }
        });
        let results = join_all(fetches).await;

        let attempted = results.len();
        let mut failed = 0usize;
        let mut pools = CandidatePools::new();
        for (event_type, fetched) in results {
            match fetched {
                Ok(pool) => {
                    pools.insert(event_type, pool);
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(%event_type, error = %e, "candidate fetch degraded to empty");
                    pools.insert(event_type, Vec::new());
                }
            }
        }

        if attempted > 0 && failed == attempted {
            return Err(GatewayError::StoreUnavailable(format!(
                "all {attempted} candidate fetches failed"
            )));
        }
        Ok(pools)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{
        EventId, EventSource, IntegrationType, MessageTemplate, ModerationStatus, Payload,
    };
    use crate::persistence::InMemoryStore;
    use async_trait::async_trait;
    use chrono::Duration;
    use serde_json::json;

    fn event(widget_id: WidgetId, event_type: EventType, age: Duration) -> NormalizedEvent {
        let mut event_data = Payload::new();
        event_data.insert("product_name".to_string(), json!("Mug"));
        NormalizedEvent {
            id: EventId::new(),
            widget_id,
            event_type,
            event_data,
            user_name: Some("Sam".to_string()),
            user_email: None,
            user_location: None,
            message_template: "{{user_name}} bought {{product_name}}".to_string(),
            integration_type: IntegrationType::Shopify,
            moderation_status: ModerationStatus::Approved,
            quality_score: 60,
            source: EventSource::Natural,
            created_at: Utc::now() - age,
            expires_at: None,
        }
    }

    fn request(website_id: WebsiteId, widget_id: WidgetId) -> QueueRequest {
        QueueRequest {
            website_id,
            widget_ids: vec![widget_id],
            target_size: None,
            natural_only: false,
        }
    }

    /// Store whose reads fail for selected types.
    #[derive(Debug)]
    struct FlakyStore {
        inner: InMemoryStore,
        failing: Vec<EventType>,
        fail_weights: bool,
    }

    #[async_trait]
    impl EventStore for FlakyStore {
        async fn insert_event(&self, event: &NormalizedEvent) -> Result<(), GatewayError> {
            self.inner.insert_event(event).await
        }

        async fn query_by_type_and_window(
            &self,
            query: &EventWindowQuery,
        ) -> Result<Vec<NormalizedEvent>, GatewayError> {
            if self.failing.contains(&query.event_type) {
                return Err(GatewayError::PersistenceError("connection reset".to_string()));
            }
            self.inner.query_by_type_and_window(query).await
        }

        async fn query_weights(
            &self,
            website_id: WebsiteId,
        ) -> Result<Vec<WeightOverride>, GatewayError> {
            if self.fail_weights {
                return Err(GatewayError::PersistenceError("no weights table".to_string()));
            }
            self.inner.query_weights(website_id).await
        }

        async fn upsert_weight(&self, row: &WeightOverride) -> Result<(), GatewayError> {
            self.inner.upsert_weight(row).await
        }

        async fn query_templates(&self) -> Result<Vec<MessageTemplate>, GatewayError> {
            self.inner.query_templates().await
        }

        async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, GatewayError> {
            self.inner.purge_expired(now).await
        }

        fn backend(&self) -> &'static str {
            "flaky"
        }
    }

    #[tokio::test]
    async fn builds_from_stored_events() {
        let store = Arc::new(InMemoryStore::new());
        let widget = WidgetId::new();
        for i in 0..3 {
            assert!(
                store
                    .insert_event(&event(widget, EventType::Purchase, Duration::minutes(i)))
                    .await
                    .is_ok()
            );
        }
        let svc = QueueService::new(store, QueueConfig::default());
        let mut rng = StdRng::seed_from_u64(1);
        let Ok(queue) = svc
            .build_queue_with(&request(WebsiteId::new(), widget), Utc::now(), &mut rng)
            .await
        else {
            panic!("build failed");
        };
        assert_eq!(queue.events.len(), 3);
        assert!(queue.events.iter().all(|e| e.message == "Sam bought Mug"));
    }

    #[tokio::test]
    async fn disabled_type_is_not_fetched_or_drawn() {
        let store = Arc::new(InMemoryStore::new());
        let widget = WidgetId::new();
        let website_id = WebsiteId::new();
        assert!(
            store
                .insert_event(&event(widget, EventType::Purchase, Duration::minutes(1)))
                .await
                .is_ok()
        );
        assert!(
            store
                .insert_event(&event(widget, EventType::Signup, Duration::minutes(1)))
                .await
                .is_ok()
        );
        let svc = QueueService::new(store, QueueConfig::default());
        let Ok(table) = svc
            .upsert_weight(&WeightOverride {
                website_id,
                event_type: EventType::Signup,
                weight: Some(0),
                max_per_queue: None,
                ttl_days: None,
            })
            .await
        else {
            panic!("upsert failed");
        };
        assert_eq!(table.get(EventType::Signup).weight, 0);

        let Ok(queue) = svc.build_queue(&request(website_id, widget)).await else {
            panic!("build failed");
        };
        assert_eq!(queue.events.len(), 1);
        assert!(!queue.queue_metadata.weights_applied.contains_key("signup"));
    }

    #[tokio::test]
    async fn failing_type_degrades_to_empty() {
        let widget = WidgetId::new();
        let store = FlakyStore {
            inner: InMemoryStore::new(),
            failing: vec![EventType::Review],
            fail_weights: true,
        };
        assert!(
            store
                .insert_event(&event(widget, EventType::Purchase, Duration::minutes(1)))
                .await
                .is_ok()
        );
        assert!(
            store
                .insert_event(&event(widget, EventType::Review, Duration::minutes(1)))
                .await
                .is_ok()
        );
        let svc = QueueService::new(Arc::new(store), QueueConfig::default());
        let Ok(queue) = svc.build_queue(&request(WebsiteId::new(), widget)).await else {
            panic!("partial failure must not abort the build");
        };
        assert_eq!(queue.events.len(), 1);
        assert_eq!(queue.queue_metadata.distribution.get("purchase"), Some(&1));
        assert_eq!(queue.queue_metadata.weights_applied.get("purchase"), Some(&10));
    }

    #[tokio::test]
    async fn total_failure_is_store_unavailable() {
        let store = FlakyStore {
            inner: InMemoryStore::new(),
            failing: EventType::ALL.to_vec(),
            fail_weights: false,
        };
        let svc = QueueService::new(Arc::new(store), QueueConfig::default());
        let result = svc.build_queue(&request(WebsiteId::new(), WidgetId::new())).await;
        assert!(matches!(result, Err(GatewayError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn empty_widget_list_is_rejected() {
        let svc = QueueService::new(Arc::new(InMemoryStore::new()), QueueConfig::default());
        let req = QueueRequest {
            widget_ids: Vec::new(),
            ..request(WebsiteId::new(), WidgetId::new())
        };
        let result = svc.build_queue(&req).await;
        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn target_size_is_respected() {
        let store = Arc::new(InMemoryStore::new());
        let widget = WidgetId::new();
        for i in 0..10 {
            assert!(
                store
                    .insert_event(&event(widget, EventType::Signup, Duration::minutes(i)))
                    .await
                    .is_ok()
            );
        }
        let svc = QueueService::new(store, QueueConfig::default());
        let req = QueueRequest {
            target_size: Some(4),
            ..request(WebsiteId::new(), widget)
        };
        let Ok(queue) = svc.build_queue(&req).await else {
            panic!("build failed");
        };
        assert_eq!(queue.queue_metadata.queue_size, 4);
    }

    #[tokio::test]
    async fn oversized_ttl_override_is_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let website_id = WebsiteId::new();
        let dyn_store: Arc<dyn EventStore> = Arc::clone(&store) as Arc<dyn EventStore>;
        let svc = QueueService::new(dyn_store, QueueConfig::default());
        let row = WeightOverride {
            website_id,
            event_type: EventType::Purchase,
            weight: None,
            max_per_queue: None,
            ttl_days: Some(NotificationWeight::MAX_TTL_DAYS + 1),
        };
        let result = svc.upsert_weight(&row).await;
        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
        let Ok(stored) = store.query_weights(website_id).await else {
            panic!("weights query failed");
        };
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn stored_unbounded_ttl_still_builds() {
        let store = Arc::new(InMemoryStore::new());
        let widget = WidgetId::new();
        let website_id = WebsiteId::new();
        let row = WeightOverride {
            website_id,
            event_type: EventType::Purchase,
            weight: None,
            max_per_queue: None,
            ttl_days: Some(u32::MAX),
        };
        assert!(store.upsert_weight(&row).await.is_ok());
        assert!(
            store
                .insert_event(&event(widget, EventType::Purchase, Duration::days(400)))
                .await
                .is_ok()
        );
        let svc = QueueService::new(store, QueueConfig::default());
        let Ok(queue) = svc.build_queue(&request(website_id, widget)).await else {
            panic!("build failed");
        };
        assert_eq!(queue.events.len(), 1);
    }
}
