use crate::{AppState, handlers::auth};
use axum::{
    Router,
    routing::{get, post},
};

/// Auth Router Module
///
/// Mounted under `/api/auth`. `/me` never fails with 401 so the frontend can
/// call it unconditionally.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        // Google authorization-code flow.
        .route("/google", get(auth::google_sign_in))
        .route("/google/callback", get(auth::google_callback))
}
