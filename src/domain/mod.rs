//! Domain layer: identifiers, event records, weights, and templates.
//!
//! Everything here is pure data plus pure functions. The normalizer,
//! queue builder, and services are built on top of these types.

pub mod event;
pub mod event_type;
pub mod ids;
pub mod integration;
pub mod template;
pub mod weight;

pub use event::{NormalizedEvent, Payload, RawEvent};
pub use event_type::EventType;
pub use ids::{EventId, WebsiteId, WidgetId};
pub use integration::{EventSource, IntegrationType, ModerationStatus};
pub use template::{MessageTemplate, TemplateCatalog};
pub use weight::{NotificationWeight, WeightOverride, WeightTable};
