//! Template rendering DTOs.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::template::scalar_to_string;

/// Request body for `POST /templates/render`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RenderTemplateRequest {
    /// Template with `{{identifier}}` placeholders.
    pub template: String,
    /// Substitution values; non-scalar values are ignored.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: BTreeMap<String, Value>,
}

impl RenderTemplateRequest {
    /// Substitution map with scalar values stringified.
    #[must_use]
    pub fn substitutions(&self) -> HashMap<String, String> {
        self.data
            .iter()
            .filter_map(|(k, v)| scalar_to_string(v).map(|s| (k.clone(), s)))
            .collect()
    }
}

/// Response body for `POST /templates/render`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenderTemplateResponse {
    /// Rendered message.
    pub message: String,
}
