//! Data Transfer Objects for REST request/response serialization.
//!
//! Domain records (normalized events, queue responses) are serialized
//! directly; the types here only cover request envelopes and reports.

pub mod event_dto;
pub mod queue_dto;
pub mod template_dto;
pub mod weight_dto;

pub use event_dto::*;
pub use queue_dto::*;
pub use template_dto::*;
pub use weight_dto::*;
