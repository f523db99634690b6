//! Event normalization: raw integration payloads to canonical records.
//!
//! [`EventNormalizer`] keeps a registry from [`IntegrationType`] to a
//! [`SourceStrategy`]. Normalizing a raw event picks the registered
//! strategy (or the generic one), fills identity and location gaps from
//! the generic mapping, merges domain fields into `event_data`, attaches a
//! message template, and scores the result.

pub mod capture;
pub mod commerce;
pub mod fields;
pub mod generic;
pub mod payment;
pub mod quality;
pub mod review;
pub mod strategy;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

pub use quality::calculate_quality_score;
pub use strategy::{Identity, SourceStrategy};

use crate::domain::{
    EventId, EventSource, IntegrationType, ModerationStatus, NormalizedEvent, RawEvent,
    TemplateCatalog,
};

/// Registry-driven normalizer.
#[derive(Debug, Clone)]
pub struct EventNormalizer {
    strategies: HashMap<IntegrationType, Arc<dyn SourceStrategy>>,
    generic: Arc<dyn SourceStrategy>,
}

impl EventNormalizer {
    /// Creates a normalizer with no registered strategies; every source
    /// uses the generic mapping.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
            generic: Arc::new(generic::GenericStrategy),
        }
    }

    /// Creates a normalizer with a strategy for every built-in source.
    #[must_use]
    pub fn new() -> Self {
        Self::empty()
            .with(IntegrationType::Shopify, commerce::CommerceStrategy)
            .with(IntegrationType::WooCommerce, commerce::CommerceStrategy)
            .with(IntegrationType::Stripe, payment::PaymentStrategy)
            .with(
                IntegrationType::GoogleReviews,
                review::ReviewStrategy::new(IntegrationType::GoogleReviews),
            )
            .with(
                IntegrationType::Trustpilot,
                review::ReviewStrategy::new(IntegrationType::Trustpilot),
            )
            .with(IntegrationType::Sdk, capture::SdkStrategy)
            .with(IntegrationType::Form, capture::FormStrategy)
            .with(IntegrationType::Api, generic::ApiStrategy)
            .with(IntegrationType::Manual, generic::ApiStrategy)
    }

    /// Registers (or replaces) the strategy for `source`.
    #[must_use]
    pub fn with(mut self, source: IntegrationType, strategy: impl SourceStrategy + 'static) -> Self {
        self.register(source, Arc::new(strategy));
        self
    }

    /// Registers (or replaces) the strategy for `source` in place.
    pub fn register(&mut self, source: IntegrationType, strategy: Arc<dyn SourceStrategy>) {
        self.strategies.insert(source, strategy);
    }

    /// Returns the strategy used for `source`.
    #[must_use]
    pub fn strategy_for(&self, source: IntegrationType) -> &dyn SourceStrategy {
        self.strategies
            .get(&source)
            .unwrap_or(&self.generic)
            .as_ref()
    }

    /// Normalizes `raw` using the current time.
    #[must_use]
    pub fn normalize(&self, raw: &RawEvent, templates: &TemplateCatalog) -> NormalizedEvent {
        self.normalize_at(raw, templates, Utc::now())
    }

    /// Normalizes `raw` as of `now`.
    ///
    /// Total: missing fields are left empty, never reported as errors.
    #[must_use]
    pub fn normalize_at(
        &self,
        raw: &RawEvent,
        templates: &TemplateCatalog,
        now: DateTime<Utc>,
    ) -> NormalizedEvent {
        let strategy = self.strategy_for(raw.source);
        let payload = &raw.payload;

        let identity = strategy.extract_identity(payload);
        let fallback = self.generic.extract_identity(payload);
        let user_name = identity.name.or(fallback.name);
        let user_email = identity.email.or(fallback.email);
        let user_location = strategy
            .extract_location(payload)
            .or_else(|| self.generic.extract_location(payload));

        let mut event_data = payload.clone();
        event_data.extend(strategy.extract_domain_fields(payload));

        let event_type = strategy.default_event_type(&raw.event_type);
        let message_template = templates.resolve(event_type, raw.source);

        let mut event = NormalizedEvent {
            id: EventId::new(),
            widget_id: raw.widget_id,
            event_type,
            event_data,
            user_name,
            user_email,
            user_location,
            message_template,
            integration_type: raw.source,
            moderation_status: if raw.source.is_trusted() {
                ModerationStatus::Approved
            } else {
                ModerationStatus::Pending
            },
            quality_score: 0,
            source: provenance(raw),
            created_at: now,
            expires_at: fields::text(payload, "expires_at")
                .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|at| at.with_timezone(&Utc)),
        };
        event.quality_score = calculate_quality_score(&event);

        tracing::debug!(
            widget_id = %event.widget_id,
            source = %raw.source,
            event_type = %event.event_type,
            quality_score = event.quality_score,
            "event normalized"
        );
        event
    }
}

impl Default for EventNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn provenance(raw: &RawEvent) -> EventSource {
    if raw.source == IntegrationType::Manual {
        return EventSource::QuickWin;
    }
    let demo_flag = matches!(raw.payload.get("demo"), Some(Value::Bool(true)));
    let tagged = fields::text(&raw.payload, "source").map(|s| EventSource::parse(&s));
    if demo_flag || tagged == Some(EventSource::QuickWin) {
        EventSource::QuickWin
    } else {
        EventSource::Natural
    }
}
