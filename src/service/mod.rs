//! Service layer: business logic orchestration.
//!
//! [`IngestService`] normalizes and stores raw events; [`QueueService`]
//! resolves weights, fetches candidate pools, and builds queues. Both talk
//! to storage only through [`crate::persistence::EventStore`].

pub mod ingest_service;
pub mod queue_service;

pub use ingest_service::{IngestOutcome, IngestService};
pub use queue_service::{CandidatePools, QueueRequest, QueueService};
