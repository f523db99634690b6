//! # proofstream-gateway
//!
//! Social-proof pipeline as an HTTP service: integration payloads are
//! normalized into canonical events, stored, and later interleaved into
//! weighted notification queues that client widgets display.
//!
//! ## Architecture
//!
//! ```text
//! Integrations (webhooks, SDK, forms)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── IngestService ── EventNormalizer (normalizer/)
//!     ├── QueueService ─── eligibility → builder → renderer (queue/)
//!     │
//!     ├── EventStore (persistence/)
//!     │
//!     └── PostgreSQL or in-memory
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod normalizer;
pub mod persistence;
pub mod queue;
pub mod service;
