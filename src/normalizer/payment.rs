//! Payment processor events (Stripe).
//!
//! Stripe wraps the interesting object in `data.object`; when present it is
//! used as the lookup root, otherwise the payload itself is.

use super::fields::{self, LocationFields, NameFields};
use super::strategy::{Identity, SourceStrategy, canonical_alias};
use crate::domain::{EventType, Payload};

const NAME: NameFields = NameFields {
    first: &["metadata.first_name"],
    last: &["metadata.last_name"],
    full: &[
        "customer_details.name",
        "customer_name",
        "billing_details.name",
        "shipping.name",
        "metadata.customer_name",
    ],
};

const EMAIL: &[&str] = &[
    "customer_details.email",
    "customer_email",
    "receipt_email",
    "billing_details.email",
    "email",
];

const LOCATION: LocationFields = LocationFields {
    direct: &["metadata.location"],
    prefixes: &[
        "customer_details.address",
        "billing_details.address",
        "shipping.address",
        "customer_address",
    ],
};

const PLAN: &[&str] = &[
    "plan.nickname",
    "items.data.0.plan.nickname",
    "items.data.0.price.nickname",
    "lines.data.0.plan.nickname",
    "lines.data.0.description",
    "metadata.plan_name",
    "description",
];

const AMOUNT: &[&str] = &[
    "amount_total",
    "amount_paid",
    "amount",
    "plan.amount",
    "items.data.0.price.unit_amount",
];

/// Maps payment processor payloads. Amounts arrive in minor units.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentStrategy;

impl PaymentStrategy {
    fn root(payload: &Payload) -> &Payload {
        match fields::lookup(payload, "data.object") {
            Some(serde_json::Value::Object(object)) => object,
            _ => payload,
        }
    }
}

impl SourceStrategy for PaymentStrategy {
    fn extract_identity(&self, payload: &Payload) -> Identity {
        let root = Self::root(payload);
        Identity {
            name: fields::resolve_name(root, &NAME),
            email: fields::first_text(root, EMAIL),
        }
    }

    fn extract_location(&self, payload: &Payload) -> Option<String> {
        fields::resolve_location(Self::root(payload), &LOCATION)
    }

    fn extract_domain_fields(&self, payload: &Payload) -> Payload {
        let root = Self::root(payload);
        let mut out = Payload::new();
        fields::put(&mut out, "plan_name", fields::first_text(root, PLAN));
        fields::put(&mut out, "amount", fields::minor_units_amount(root, AMOUNT));
        fields::put(
            &mut out,
            "currency",
            fields::currency(root, &["currency", "plan.currency"]),
        );
        fields::put(
            &mut out,
            "interval",
            fields::first_text(root, &["plan.interval", "items.data.0.plan.interval"]),
        );
        out
    }

    fn default_event_type(&self, raw_type: &str) -> EventType {
        canonical_alias(raw_type).unwrap_or(EventType::Subscription)
    }
}
