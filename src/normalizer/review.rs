//! Review platform reviews (Google, Trustpilot).

use serde_json::Value;

use super::fields::{self, LocationFields, NameFields};
use super::strategy::{Identity, SourceStrategy, canonical_alias};
use crate::domain::{EventType, IntegrationType, Payload};

const NAME: NameFields = NameFields {
    first: &[],
    last: &[],
    full: &[
        "author_name",
        "reviewer.displayName",
        "reviewer.name",
        "consumer.displayName",
        "consumer.name",
        "author.name",
        "name",
    ],
};

const EMAIL: &[&str] = &["reviewer.email", "consumer.email", "email"];

const LOCATION: LocationFields = LocationFields {
    direct: &["reviewer.location", "consumer.location", "location"],
    prefixes: &["", "consumer", "reviewer"],
};

const RATING: &[&str] = &["rating", "stars", "starRating", "review.rating"];

const TEXT: &[&str] = &["text", "comment", "content", "review_text", "review.text"];

/// Maps review payloads. Word ratings (`"FIVE"`) become numbers.
#[derive(Debug, Clone, Copy)]
pub struct ReviewStrategy {
    platform: IntegrationType,
}

impl ReviewStrategy {
    /// Creates a strategy that tags reviews with `platform`.
    #[must_use]
    pub const fn new(platform: IntegrationType) -> Self {
        Self { platform }
    }
}

impl SourceStrategy for ReviewStrategy {
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
        if let Some(rating) = RATING.iter().find_map(|path| rating_at(payload, path)) {
            out.insert("rating".to_string(), Value::from(rating));
        }
        let text = fields::first_text(payload, TEXT);
        if !payload.contains_key("message") {
            fields::put(&mut out, "message", text.clone());
        }
        fields::put(&mut out, "review_text", text);
        fields::put(
            &mut out,
            "review_title",
            fields::first_text(payload, &["title", "review_title"]),
        );
        out.insert(
            "platform".to_string(),
            Value::String(self.platform.as_str().to_string()),
        );
        out
    }

    fn default_event_type(&self, raw_type: &str) -> EventType {
        canonical_alias(raw_type).unwrap_or(EventType::Review)
    }
}

fn rating_at(payload: &Payload, path: &str) -> Option<u64> {
    let raw = fields::text(payload, path)?;
    match raw.to_ascii_uppercase().as_str() {
        "ONE" => Some(1),
        "TWO" => Some(2),
        "THREE" => Some(3),
        "FOUR" => Some(4),
        "FIVE" => Some(5),
        other => star_count(other.parse::<f64>().ok()?),
    }
}

/// Rounds a numeric rating to whole stars; `None` outside one to five.
fn star_count(value: f64) -> Option<u64> {
    let rounded = value.round();
    if !(1.0..=5.0).contains(&rounded) {
        return None;
    }
    (1u8..=5)
        .find(|stars| rounded <= f64::from(*stars))
        .map(u64::from)
}
