//! The per-source mapping interface.

use std::fmt;

use crate::domain::{EventType, Payload};

/// Identity fields extracted from a payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    /// Display name.
    pub name: Option<String>,
    /// Email address.
    pub email: Option<String>,
}

/// Maps one family of raw payloads onto canonical fields.
///
/// Implementations must be total: a missing field yields `None` or an
/// empty map, never an error. The normalizer fills any gaps from the
/// generic mapping.
pub trait SourceStrategy: Send + Sync + fmt::Debug {
    /// Extracts the actor's display name and email.
    fn extract_identity(&self, payload: &Payload) -> Identity;

    /// Extracts a human-readable location.
    fn extract_location(&self, payload: &Payload) -> Option<String>;

    /// Computes canonical domain fields to merge into `event_data`.
    fn extract_domain_fields(&self, payload: &Payload) -> Payload;

    /// Canonical type for a raw type string from this source.
    fn default_event_type(&self, raw_type: &str) -> EventType;
}

/// Maps well-known raw type strings from any source to a canonical type.
///
/// Canonical tags are accepted as-is; otherwise a fixed alias table is
/// consulted. Returns `None` when nothing matches so each strategy can
/// apply its own default.
#[must_use]
pub fn canonical_alias(raw_type: &str) -> Option<EventType> {
    if let Some(event_type) = EventType::from_tag(raw_type) {
        return Some(event_type);
    }
    let raw = raw_type.trim().to_ascii_lowercase();
    let event_type = match raw.as_str() {
        "order" | "orders/create" | "orders/paid" | "order_created" | "order.completed"
        | "order.created" | "checkout" | "checkout.session.completed" | "charge.succeeded"
        | "payment_intent.succeeded" | "payment" => EventType::Purchase,
        "subscribe" | "subscription_created" | "customer.subscription.created"
        | "customer.subscription.updated" | "invoice.paid" | "invoice.payment_succeeded" => {
            EventType::Subscription
        }
        "register" | "sign_up" | "signed_up" | "user_registered" | "account_created"
        | "customers/create" | "customer.created" | "newsletter" => EventType::Signup,
        "form" | "form_submitted" | "lead" | "contact" => EventType::FormSubmission,
        "rating" | "review_created" | "review.created" => EventType::Review,
        "quote" => EventType::Testimonial,
        "visitors" | "live_visitor_count" | "visitor_count" => EventType::LiveVisitors,
        _ => return None,
    };
    Some(event_type)
}
