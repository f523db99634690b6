//! Queue build DTOs.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{WebsiteId, WidgetId};
use crate::service::QueueRequest;

/// Request body for `POST /queue`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BuildQueueRequest {
    /// Website whose weight overrides apply.
    pub website_id: WebsiteId,
    /// Widgets whose events are eligible.
    pub widget_ids: Vec<WidgetId>,
    /// Requested queue length (default 15, capped by configuration).
    #[serde(default)]
    pub target_size: Option<usize>,
    /// Exclude quick-win (demo) events.
    #[serde(default)]
    pub natural_only: bool,
}

impl From<BuildQueueRequest> for QueueRequest {
    fn from(req: BuildQueueRequest) -> Self {
        Self {
            website_id: req.website_id,
            widget_ids: req.widget_ids,
            target_size: req.target_size,
            natural_only: req.natural_only,
        }
    }
}
