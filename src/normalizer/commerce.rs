//! Commerce platform orders (Shopify, WooCommerce).

use serde_json::Value;

use super::fields::{self, LocationFields, NameFields};
use super::strategy::{Identity, SourceStrategy, canonical_alias};
use crate::domain::{EventType, Payload};

const NAME: NameFields = NameFields {
    first: &[
        "customer.first_name",
        "billing_address.first_name",
        "billing.first_name",
        "shipping_address.first_name",
        "shipping.first_name",
    ],
    last: &[
        "customer.last_name",
        "billing_address.last_name",
        "billing.last_name",
        "shipping_address.last_name",
        "shipping.last_name",
    ],
    full: &["customer.name", "billing_address.name", "shipping_address.name"],
};

const EMAIL: &[&str] = &[
    "customer.email",
    "email",
    "contact_email",
    "billing.email",
    "billing_address.email",
];

const LOCATION: LocationFields = LocationFields {
    direct: &[],
    prefixes: &[
        "billing_address",
        "shipping_address",
        "billing",
        "shipping",
        "customer.default_address",
    ],
};

/// Maps order payloads from commerce platforms.
///
/// Orders always normalize to [`EventType::Purchase`] unless the raw type
/// names something else (a `customers/create` webhook becomes a signup).
#[derive(Debug, Clone, Copy, Default)]
pub struct CommerceStrategy;

impl SourceStrategy for CommerceStrategy {
    fn extract_identity(&self, payload: &Payload) -> Identity {
        Identity {
            name: fields::resolve_name(payload, &NAME),
            email: fields::first_text(payload, EMAIL),
        }
    }

    fn extract_location(&self, payload: &Payload) -> Option<String> {
        fields::resolve_location(payload, &LOCATION)
    }

    fn extract_domain_fields(&self, payload: &Payload) -> Payload {
        let mut out = Payload::new();
        fields::put(
            &mut out,
            "product_name",
            fields::first_text(
                payload,
                &["line_items.0.name", "line_items.0.title", "product_name"],
            ),
        );
        fields::put(
            &mut out,
            "amount",
            fields::amount(payload, &["total_price", "total", "current_total_price"]),
        );
        fields::put(
            &mut out,
            "currency",
            fields::currency(payload, &["currency", "presentment_currency", "currency_code"]),
        );
        fields::put(
            &mut out,
            "order_id",
            fields::first_text(payload, &["order_number", "number", "id"]),
        );
        if let Some(Value::Array(items)) = fields::lookup(payload, "line_items") {
            out.insert("product_count".to_string(), Value::from(items.len()));
        }
        out
    }

    fn default_event_type(&self, raw_type: &str) -> EventType {
        canonical_alias(raw_type).unwrap_or(EventType::Purchase)
    }
}
