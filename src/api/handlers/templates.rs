//! Ad-hoc template rendering.

use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{RenderTemplateRequest, RenderTemplateResponse};
use crate::app_state::AppState;
use crate::domain::template::render;

/// `POST /templates/render`: Render a template against a data map.
#[utoipa::path(
    post,
    path = "/api/v1/templates/render",
    tag = "Templates",
    summary = "Render a template",
    description = "Substitutes each {{identifier}} with its value from `data`. Unknown placeholders render empty and substituted values are never re-scanned.",
    request_body = RenderTemplateRequest,
    responses(
        (status = 200, description = "Rendered message", body = RenderTemplateResponse),
    )
)]
pub async fn render_template(Json(req): Json<RenderTemplateRequest>) -> impl IntoResponse {
    let message = render(&req.template, &req.substitutions());
    Json(RenderTemplateResponse { message })
}

/// Template routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/templates/render", post(render_template))
}
