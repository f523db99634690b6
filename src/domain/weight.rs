//! Per-type selection weights, caps, and eligibility windows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EventType, WebsiteId};

/// Effective display rule for one event type on one website.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NotificationWeight {
    /// Relative selection probability. Zero disables the type.
    pub weight: u32,
    /// Hard cap on how many events of this type enter a build.
    pub max_per_queue: usize,
    /// Eligibility window in days.
    pub ttl_days: u32,
}

impl NotificationWeight {
    /// Rule used for types with neither an override nor a default row.
    pub const FALLBACK: Self = Self::new(5, 10, 7);

    /// Longest eligibility window an override may set, in days.
    pub const MAX_TTL_DAYS: u32 = 3650;

    /// Creates a rule.
    #[must_use]
    pub const fn new(weight: u32, max_per_queue: usize, ttl_days: u32) -> Self {
        Self {
            weight,
            max_per_queue,
            ttl_days,
        }
    }

    /// Hardcoded default for a type, if one exists.
    #[must_use]
    pub const fn default_for(event_type: EventType) -> Option<Self> {
        match event_type {
            EventType::Purchase => Some(Self::new(10, 20, 7)),
            EventType::Subscription => Some(Self::new(8, 15, 14)),
            EventType::Review => Some(Self::new(7, 15, 90)),
            EventType::Signup => Some(Self::new(6, 20, 14)),
            EventType::FormSubmission => Some(Self::new(5, 10, 7)),
            EventType::Testimonial => Some(Self::new(8, 15, 180)),
            EventType::Announcement => Some(Self::new(4, 5, 30)),
            EventType::LiveVisitors => Some(Self::new(2, 3, 1)),
            EventType::Custom => None,
        }
    }

    /// Whether the type takes part in queue builds at all.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.weight > 0 && self.max_per_queue > 0
    }

    /// Longest default TTL across all types, in days.
    ///
    /// Events older than this are past every default window and may be
    /// purged.
    #[must_use]
    pub fn retention_days() -> u32 {
        EventType::ALL
            .into_iter()
            .map(|t| Self::default_for(t).unwrap_or(Self::FALLBACK).ttl_days)
            .max()
            .unwrap_or(Self::FALLBACK.ttl_days)
    }
}

/// A website-specific override row. `None` fields keep the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WeightOverride {
    /// Website the override belongs to.
    pub website_id: WebsiteId,
    /// Event type being overridden.
    pub event_type: EventType,
    /// Replacement weight.
    pub weight: Option<u32>,
    /// Replacement cap.
    pub max_per_queue: Option<usize>,
    /// Replacement window.
    pub ttl_days: Option<u32>,
}

impl WeightOverride {
    /// Applies this override on top of `base`.
    #[must_use]
    pub fn apply(&self, base: NotificationWeight) -> NotificationWeight {
        NotificationWeight {
            weight: self.weight.unwrap_or(base.weight),
            max_per_queue: self.max_per_queue.unwrap_or(base.max_per_queue),
            ttl_days: self.ttl_days.unwrap_or(base.ttl_days),
        }
    }
}

/// Effective rules for every event type on one website.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WeightTable {
    rules: BTreeMap<EventType, NotificationWeight>,
}

impl WeightTable {
    /// Table holding only the hardcoded defaults.
    #[must_use]
    pub fn defaults() -> Self {
        Self::resolve(&[])
    }

    /// Resolves the effective rule for every type.
    ///
    /// Per type: the website override if present, else the default row,
    /// else [`NotificationWeight::FALLBACK`]. When several overrides target
    /// the same type the last one wins.
    #[must_use]
    pub fn resolve(overrides: &[WeightOverride]) -> Self {
        let rules = EventType::ALL
            .into_iter()
            .map(|event_type| {
                let base = NotificationWeight::default_for(event_type).unwrap_or_else(|| {
                    tracing::debug!(%event_type, "no default weight row, using fallback");
                    NotificationWeight::FALLBACK
                });
                let rule = overrides
                    .iter()
                    .rev()
                    .find(|o| o.event_type == event_type)
                    .map_or(base, |o| o.apply(base));
                (event_type, rule)
            })
            .collect();
        Self { rules }
    }

    /// Returns the rule for `event_type`.
    #[must_use]
    pub fn get(&self, event_type: EventType) -> NotificationWeight {
        self.rules
            .get(&event_type)
            .copied()
            .unwrap_or(NotificationWeight::FALLBACK)
    }

    /// Iterates over enabled types and their rules.
    pub fn enabled(&self) -> impl Iterator<Item = (EventType, NotificationWeight)> + '_ {
        self.rules
            .iter()
            .filter(|(_, rule)| rule.is_enabled())
            .map(|(t, rule)| (*t, *rule))
    }

    /// Iterates over all types and their rules.
    pub fn iter(&self) -> impl Iterator<Item = (EventType, NotificationWeight)> + '_ {
        self.rules.iter().map(|(t, rule)| (*t, *rule))
    }

    /// Selection weights for the queue builder.
    #[must_use]
    pub fn weights(&self) -> BTreeMap<EventType, u32> {
        self.rules.iter().map(|(t, rule)| (*t, rule.weight)).collect()
    }
}
