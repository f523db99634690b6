//! Weight table DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EventType, NotificationWeight, WebsiteId, WeightTable};

/// One effective rule.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeightRuleDto {
    /// Event type.
    pub event_type: EventType,
    /// Relative selection weight.
    pub weight: u32,
    /// Candidate pool cap.
    pub max_per_queue: usize,
    /// Eligibility window in days.
    pub ttl_days: u32,
    /// Whether the type takes part in builds.
    pub enabled: bool,
}

impl WeightRuleDto {
    fn new(event_type: EventType, rule: NotificationWeight) -> Self {
        Self {
            event_type,
            weight: rule.weight,
            max_per_queue: rule.max_per_queue,
            ttl_days: rule.ttl_days,
            enabled: rule.is_enabled(),
        }
    }
}

/// Response body for the weight endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeightTableResponse {
    /// Website the table belongs to.
    pub website_id: WebsiteId,
    /// Effective rule per event type.
    pub rules: Vec<WeightRuleDto>,
}

impl WeightTableResponse {
    /// Flattens a resolved table.
    #[must_use]
    pub fn new(website_id: WebsiteId, table: &WeightTable) -> Self {
        Self {
            website_id,
            rules: table
                .iter()
                .map(|(event_type, rule)| WeightRuleDto::new(event_type, rule))
                .collect(),
        }
    }
}

/// Request body for `PUT /websites/{id}/weights/{event_type}`.
///
/// Omitted fields keep the default for that type.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpsertWeightRequest {
    /// Replacement weight; 0 disables the type.
    #[serde(default)]
    pub weight: Option<u32>,
    /// Replacement cap.
    #[serde(default)]
    pub max_per_queue: Option<usize>,
    /// Replacement window in days, at most 3650.
    #[serde(default)]
    pub ttl_days: Option<u32>,
}
