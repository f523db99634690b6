//! Queue construction: eligibility filtering, weighted interleaving, and
//! the rendered response.
//!
//! ```text
//! event history ─► eligibility::select (per type)
//!                      │
//!                      ▼
//!               builder::build (weighted round-robin)
//!                      │
//!                      ▼
//!               response::assemble (render + metadata)
//! ```

pub mod builder;
pub mod eligibility;
pub mod response;

pub use eligibility::EligibilityRules;
pub use response::{QueueMetadata, QueueResponse, RenderedNotification};
