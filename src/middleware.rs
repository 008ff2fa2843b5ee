use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{AppState, auth::{AdminUser, resolve_admin}};

/// require_admin
///
/// Guards the admin API. Extracting `AdminUser` performs the full identity
/// lookup and rejects with 401 on failure; the resolved identity is stored in
/// the request extensions so handlers extracting it again skip the lookup.
pub async fn require_admin(admin: AdminUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(admin);
    next.run(request).await
}

fn is_admin_page(path: &str) -> bool {
    path == "/admin" || path.starts_with("/admin/")
}

/// page_gate
///
/// Redirects for the browser-facing pages:
/// - `/admin` and `/admin/*` without an admin identity go to
///   `/login?callbackUrl=<original path>`.
/// - `/login` with an admin identity goes to `/admin`.
///
/// Other paths, including the whole `/api` tree, pass through untouched.
pub async fn page_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    let admin_page = is_admin_page(path);
    if !admin_page && path != "/login" {
        return next.run(request).await;
    }

    let identity = resolve_admin(request.headers(), state.repo.as_ref(), &state.config).await;

    match (admin_page, identity) {
        (true, None) => {
            let target = request
                .uri()
                .path_and_query()
                .map_or(path, |pq| pq.as_str());
            let query = serde_urlencoded::to_string([("callbackUrl", target)]).unwrap_or_default();
            tracing::debug!(%target, "unauthenticated page request");
            Redirect::to(&format!("/login?{query}")).into_response()
        }
        (false, Some(_)) => Redirect::to("/admin").into_response(),
        _ => next.run(request).await,
    }
}
