//! First-party captures: SDK calls and form submissions.

use serde_json::Value;

use super::fields::{self, LocationFields, NameFields};
use super::strategy::{Identity, SourceStrategy, canonical_alias};
use crate::domain::{EventType, Payload};

const SDK_NAME: NameFields = NameFields {
    first: &["user.first_name", "first_name"],
    last: &["user.last_name", "last_name"],
    full: &["user.name", "user_name", "name", "customer.name"],
};

const SDK_EMAIL: &[&str] = &["user.email", "user_email", "email"];

const SDK_LOCATION: LocationFields = LocationFields {
    direct: &["user.location", "user_location", "location"],
    prefixes: &["user", "geo", ""],
};

/// Maps custom events sent through the embeddable SDK.
///
/// The SDK nests caller data under `properties` (and optionally
/// `metadata`); scalar entries of both are lifted into `event_data`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SdkStrategy;

impl SourceStrategy for SdkStrategy {
    fn extract_identity(&self, payload: &Payload) -> Identity {
        Identity {
            name: fields::resolve_name(payload, &SDK_NAME),
            email: fields::first_text(payload, SDK_EMAIL),
        }
    }

    fn extract_location(&self, payload: &Payload) -> Option<String> {
        fields::resolve_location(payload, &SDK_LOCATION)
    }

    fn extract_domain_fields(&self, payload: &Payload) -> Payload {
        let mut out = Payload::new();
        fields::flatten_object_into(payload, "properties", &mut out);
        fields::flatten_object_into(payload, "metadata", &mut out);
        if !payload.contains_key("product_name") && !out.contains_key("product_name") {
            fields::put(
                &mut out,
                "product_name",
                fields::first_text(payload, &["product.name", "product"]),
            );
        }
        out
    }

    fn default_event_type(&self, raw_type: &str) -> EventType {
        canonical_alias(raw_type).unwrap_or(EventType::Custom)
    }
}

const FORM_NAME: NameFields = NameFields {
    first: &["first_name", "fields.first_name", "data.first_name"],
    last: &["last_name", "fields.last_name", "data.last_name"],
    full: &["name", "full_name", "your_name", "fields.name", "data.name"],
};

const FORM_EMAIL: &[&str] = &["email", "email_address", "fields.email", "data.email"];

const FORM_LOCATION: LocationFields = LocationFields {
    direct: &["location", "fields.location"],
    prefixes: &["", "fields", "data"],
};

/// Fallback label when a form submission names no form.
pub const UNNAMED_FORM: &str = "a form";

/// Maps captured form submissions.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormStrategy;

impl SourceStrategy for FormStrategy {
    fn extract_identity(&self, payload: &Payload) -> Identity {
        Identity {
            name: fields::resolve_name(payload, &FORM_NAME),
            email: fields::first_text(payload, FORM_EMAIL),
        }
    }

    fn extract_location(&self, payload: &Payload) -> Option<String> {
        fields::resolve_location(payload, &FORM_LOCATION)
    }

    fn extract_domain_fields(&self, payload: &Payload) -> Payload {
        let mut out = Payload::new();
        let form_name = fields::first_text(payload, &["form_name", "form.name", "form_title", "form_id"])
            .unwrap_or_else(|| UNNAMED_FORM.to_string());
        out.insert("form_name".to_string(), Value::String(form_name));
        if let Some(Value::Object(submitted)) = fields::lookup(payload, "fields") {
            out.insert("field_count".to_string(), Value::from(submitted.len()));
        }
        out
    }

    fn default_event_type(&self, raw_type: &str) -> EventType {
        canonical_alias(raw_type).unwrap_or(EventType::FormSubmission)
    }
}
