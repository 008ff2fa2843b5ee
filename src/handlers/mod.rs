/// Handler modules, one per resource. Public and admin handlers for the same
/// resource live together; the routers decide who may reach them.
pub mod achievements;
pub mod auth;
pub mod contact;
pub mod events;
pub mod messages;
pub mod projects;
pub mod settings;
pub mod stats;
pub mod team;
pub mod upload;

use axum::{
    Json,
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

use crate::{AppState, error::ApiError};

/// health
///
/// Liveness probe for load balancers. Does not touch the database.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

/// serve_frontend
///
/// Fallback for every unmatched path. Unknown `/api` routes answer with a JSON
/// 404; everything else is served from the static bundle, with `index.html`
/// standing in for client-side routes.
pub async fn serve_frontend(State(state): State<AppState>, request: Request) -> Response {
    if is_api_path(request.uri().path()) {
        return ApiError::NotFound("Route").into_response();
    }

    let static_dir = &state.config.static_dir;
    let frontend = ServeDir::new(static_dir)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(format!("{static_dir}/index.html")));

    match frontend.oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_paths_are_matched_by_segment() {
        assert!(is_api_path("/api"));
        assert!(is_api_path("/api/unknown"));
        assert!(!is_api_path("/apiary"));
        assert!(!is_api_path("/about"));
    }
}
