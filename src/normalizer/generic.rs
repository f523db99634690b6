//! Raw API calls and the catch-all mapping.

use super::fields::{self, LocationFields, NameFields};
use super::strategy::{Identity, SourceStrategy, canonical_alias};
use crate::domain::{EventType, Payload};

const NAME: NameFields = NameFields {
    first: &["first_name"],
    last: &["last_name"],
    full: &["user_name", "name", "customer_name", "username"],
};

const EMAIL: &[&str] = &["user_email", "email", "email_address"];

const LOCATION: LocationFields = LocationFields {
    direct: &["user_location", "location"],
    prefixes: &[""],
};

/// Catch-all mapping: copies only top-level name, email, and location keys.
///
/// Used for unknown sources and to fill gaps left by any other strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericStrategy;

impl SourceStrategy for GenericStrategy {
    fn extract_identity(&self, payload: &Payload) -> Identity {
        Identity {
            name: fields::resolve_name(payload, &NAME),
            email: fields::first_text(payload, EMAIL),
        }
    }

    fn extract_location(&self, payload: &Payload) -> Option<String> {
        fields::resolve_location(payload, &LOCATION)
    }

    fn extract_domain_fields(&self, _payload: &Payload) -> Payload {
        Payload::new()
    }

    fn default_event_type(&self, raw_type: &str) -> EventType {
        canonical_alias(raw_type).unwrap_or(EventType::Custom)
    }
}

/// Direct calls to the events API (and manual entries made through it).
///
/// Identity is read like the generic mapping, but a nested `data` object
/// is also searched and its scalar entries lifted into `event_data`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiStrategy;

const API_NAME: NameFields = NameFields {
    first: &["first_name", "data.first_name"],
    last: &["last_name", "data.last_name"],
    full: &["user_name", "name", "data.user_name", "data.name"],
};

const API_EMAIL: &[&str] = &["user_email", "email", "data.user_email", "data.email"];

const API_LOCATION: LocationFields = LocationFields {
    direct: &["user_location", "location", "data.user_location", "data.location"],
    prefixes: &["", "data"],
};

impl SourceStrategy for ApiStrategy {
    fn extract_identity(&self, payload: &Payload) -> Identity {
        Identity {
            name: fields::resolve_name(payload, &API_NAME),
            email: fields::first_text(payload, API_EMAIL),
        }
    }

    fn extract_location(&self, payload: &Payload) -> Option<String> {
        fields::resolve_location(payload, &API_LOCATION)
    }

    fn extract_domain_fields(&self, payload: &Payload) -> Payload {
        let mut out = Payload::new();
        fields::flatten_object_into(payload, "data", &mut out);
        out
    }

    fn default_event_type(&self, raw_type: &str) -> EventType {
        canonical_alias(raw_type).unwrap_or(EventType::Custom)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn payload(value: Value) -> Payload {
        let Value::Object(map) = value else {
            panic!("test payload must be an object");
        };
        map
    }

    #[test]
    fn generic_reads_top_level_keys_only() {
        let p = payload(json!({
            "name": "Jo",
            "email": "jo@example.com",
            "location": "Lima",
            "customer": {"first_name": "Nested"}
        }));
        let identity = GenericStrategy.extract_identity(&p);
        assert_eq!(identity.name.as_deref(), Some("Jo"));
        assert_eq!(identity.email.as_deref(), Some("jo@example.com"));
        assert_eq!(GenericStrategy.extract_location(&p).as_deref(), Some("Lima"));
        assert!(GenericStrategy.extract_domain_fields(&p).is_empty());
    }

    #[test]
    fn generic_defaults_to_custom() {
        assert_eq!(GenericStrategy.default_event_type("???"), EventType::Custom);
        assert_eq!(GenericStrategy.default_event_type("purchase"), EventType::Purchase);
    }

    #[test]
    fn api_searches_data_object() {
        let p = payload(json!({
            "data": {"name": "Quinn", "city": "Dublin", "country": "IE", "message": "Hello"}
        }));
        assert_eq!(ApiStrategy.extract_identity(&p).name.as_deref(), Some("Quinn"));
        assert_eq!(ApiStrategy.extract_location(&p).as_deref(), Some("Dublin, IE"));
        let fields = ApiStrategy.extract_domain_fields(&p);
        assert_eq!(fields.get("message"), Some(&json!("Hello")));
    }
}
