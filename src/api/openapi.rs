//! OpenAPI document for every REST endpoint.

use utoipa::OpenApi;

use super::handlers;

/// Generated OpenAPI description of the gateway.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "proofstream-gateway",
        description = "Social-proof event ingestion and weighted notification queues."
    ),
    paths(
        handlers::events::ingest_event,
        handlers::events::ingest_batch,
        handlers::events::normalize_event,
        handlers::queue::build_queue,
        handlers::weights::get_weights,
        handlers::weights::upsert_weight,
        handlers::templates::render_template,
        handlers::system::health_handler,
        handlers::system::event_types_handler,
    ),
    tags(
        (name = "Events", description = "Raw event ingestion and normalization"),
        (name = "Queue", description = "Weighted notification queues"),
        (name = "Weights", description = "Per-website selection rules"),
        (name = "Templates", description = "Message template rendering"),
        (name = "System", description = "Health and configuration"),
    )
)]
pub struct ApiDoc;
