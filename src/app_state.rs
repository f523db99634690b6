//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::QueueConfig;
use crate::normalizer::EventNormalizer;
use crate::persistence::EventStore;
use crate::service::{IngestService, QueueService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Normalization and storage of raw events.
    pub ingest_service: Arc<IngestService>,
    /// Weight resolution and queue builds.
    pub queue_service: Arc<QueueService>,
    /// Backing store, for health reporting.
    pub store: Arc<dyn EventStore>,
}

impl AppState {
    /// Wires both services over one store.
    #[must_use]
    pub fn new(
        store: Arc<dyn EventStore>,
        normalizer: EventNormalizer,
        queue_config: QueueConfig,
    ) -> Self {
        let ingest_service = Arc::new(IngestService::new(
            Arc::clone(&store),
            Arc::new(normalizer),
        ));
        let queue_service = Arc::new(QueueService::new(Arc::clone(&store), queue_config));
        Self {
            ingest_service,
            queue_service,
            store,
        }
    }
}
