//! Message templates: stored catalog, fallbacks, and the `{{field}}` renderer.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::{EventType, IntegrationType, NormalizedEvent};

/// Placeholder name shown when an event has no usable display name.
pub const ANONYMOUS_NAME: &str = "Someone";

/// Template used when neither a stored row nor a per-type fallback exists.
pub const GENERIC_TEMPLATE: &str = "{{user_name}} just took action";

/// `{{identifier}}` token.
static PLACEHOLDER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").ok());

/// Substitutes `{{identifier}}` tokens in `template` from `data`.
///
/// Missing keys render as the empty string. The scan is single-pass:
/// substituted values are never re-scanned, so a value containing `{{x}}`
/// is emitted literally.
#[must_use]
pub fn render(template: &str, data: &HashMap<String, String>) -> String {
    let Some(re) = PLACEHOLDER.as_ref() else {
        return template.to_string();
    };
    re.replace_all(template, |caps: &Captures<'_>| {
        caps.get(1)
            .and_then(|key| data.get(key.as_str()))
            .cloned()
            .unwrap_or_default()
    })
    .into_owned()
}

/// Deterministic fallback template for an event type.
#[must_use]
pub const fn fallback_template(event_type: EventType) -> &'static str {
    match event_type {
        EventType::Purchase => "{{user_name}} from {{user_location}} just bought {{product_name}}",
        EventType::Subscription => "{{user_name}} just subscribed to {{plan_name}}",
        EventType::Review => "{{user_name}} left a {{rating}}-star review",
        EventType::Signup => "{{user_name}} from {{user_location}} just signed up",
        EventType::FormSubmission => "{{user_name}} just submitted {{form_name}}",
        EventType::Testimonial => "\"{{message}}\" - {{user_name}}",
        EventType::Announcement => "{{message}}",
        EventType::LiveVisitors => "{{visitor_count}} people are viewing this page right now",
        EventType::Custom => GENERIC_TEMPLATE,
    }
}

/// A stored template row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageTemplate {
    /// Row identifier.
    pub id: uuid::Uuid,
    /// Event type the template applies to.
    pub event_type: EventType,
    /// Source the template applies to; `None` matches every source.
    pub integration_type: Option<IntegrationType>,
    /// Template body.
    pub template: String,
    /// Higher wins.
    pub priority: i32,
    /// Inactive rows are ignored.
    pub is_active: bool,
}

/// In-memory snapshot of stored templates used during normalization.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    rows: Vec<MessageTemplate>,
}

impl TemplateCatalog {
    /// Creates a catalog from stored rows.
    #[must_use]
    pub fn new(rows: Vec<MessageTemplate>) -> Self {
        Self { rows }
    }

    /// Number of rows held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the catalog holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds the best stored template for `(event_type, integration_type)`.
    ///
    /// Highest priority active row wins; on a tie a source-specific row
    /// beats a wildcard row.
    #[must_use]
    pub fn lookup(&self, event_type: EventType, integration_type: IntegrationType) -> Option<&str> {
        self.rows
            .iter()
            .filter(|row| row.is_active && row.event_type == event_type)
            .filter(|row| row.integration_type.is_none_or(|s| s == integration_type))
            .max_by_key(|row| (row.priority, row.integration_type.is_some()))
            .map(|row| row.template.as_str())
    }

    /// Stored template if any, else the per-type fallback.
    #[must_use]
    pub fn resolve(&self, event_type: EventType, integration_type: IntegrationType) -> String {
        self.lookup(event_type, integration_type)
            .unwrap_or_else(|| fallback_template(event_type))
            .to_string()
    }
}

/// Builds the substitution map for an event.
///
/// Scalar top-level `event_data` fields are exposed as strings, together
/// with `user_name` (defaulting to [`ANONYMOUS_NAME`]), `user_location`,
/// and a relative `time_ago`. The email is never exposed.
#[must_use]
pub fn render_data(event: &NormalizedEvent, now: DateTime<Utc>) -> HashMap<String, String> {
    let mut data: HashMap<String, String> = event
        .event_data
        .iter()
        .filter_map(|(key, value)| scalar_to_string(value).map(|s| (key.clone(), s)))
        .collect();
    data.remove("user_email");
    data.remove("email");
    data.insert(
        "user_name".to_string(),
        event
            .user_name
            .clone()
            .unwrap_or_else(|| ANONYMOUS_NAME.to_string()),
    );
    if let Some(location) = &event.user_location {
        data.insert("user_location".to_string(), location.clone());
    }
    data.insert("time_ago".to_string(), time_ago(event.created_at, now));
    data
}

/// Renders the event's own template.
#[must_use]
pub fn render_event(event: &NormalizedEvent, now: DateTime<Utc>) -> String {
    render(&event.message_template, &render_data(event, now))
}

/// Human-readable age of `at` relative to `now`.
#[must_use]
pub fn time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(at);
    let minutes = age.num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    let (amount, unit) = if minutes < 60 {
        (minutes, "minute")
    } else if age.num_hours() < 24 {
        (age.num_hours(), "hour")
    } else {
        (age.num_days(), "day")
    };
    let plural = if amount == 1 { "" } else { "s" };
    format!("{amount} {unit}{plural} ago")
}

/// String form of a scalar JSON value; `None` for null, arrays, and
/// objects.
#[must_use]
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
