use crate::{
    AppState,
    handlers::{self, achievements, contact, events, projects, settings, team},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints the public site renders from. Team listings only expose active
/// members; everything else is published as soon as it is saved.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/team", get(team::list_team))
        .route("/api/team/{id}", get(team::get_team_member))
        // GET /api/events?status=upcoming|past
        .route("/api/events", get(events::list_events))
        .route("/api/events/{id}", get(events::get_event))
        // GET /api/projects?featured=true
        .route("/api/projects", get(projects::list_projects))
        .route("/api/projects/{id}", get(projects::get_project))
        .route("/api/achievements", get(achievements::list_achievements))
        .route("/api/achievements/{id}", get(achievements::get_achievement))
        .route("/api/settings/{page}", get(settings::get_page_settings))
        // Rate limited per client IP.
        .route("/api/contact", post(contact::submit_contact))
}
