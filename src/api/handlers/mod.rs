//! REST endpoint handlers organized by resource.

pub mod events;
pub mod queue;
pub mod system;
pub mod templates;
pub mod weights;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(events::routes())
        .merge(queue::routes())
        .merge(weights::routes())
        .merge(templates::routes())
}
