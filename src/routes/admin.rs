use crate::{
    AppState,
    handlers::{achievements, events, messages, projects, settings, stats, team, upload},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

/// Multipart framing overhead allowed on top of the file size limit, so an
/// oversized file is reported by the upload handler itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Admin Router Module
///
/// Mounted under `/api/admin` behind the `require_admin` layer, which rejects
/// any request without an admin identity before it reaches a handler.
pub fn admin_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats::get_stats))
        // GET lists inactive members too.
        .route(
            "/team",
            get(team::list_all_team).post(team::create_team_member),
        )
        .route(
            "/team/{id}",
            put(team::update_team_member).delete(team::delete_team_member),
        )
        .route("/events", post(events::create_event))
        .route(
            "/events/{id}",
            put(events::update_event).delete(events::delete_event),
        )
        .route("/projects", post(projects::create_project))
        .route(
            "/projects/{id}",
            put(projects::update_project).delete(projects::delete_project),
        )
        .route("/achievements", post(achievements::create_achievement))
        .route(
            "/achievements/{id}",
            put(achievements::update_achievement).delete(achievements::delete_achievement),
        )
        .route("/settings/{page}", put(settings::update_page_settings))
        .route("/messages", get(messages::list_messages))
        .route(
            "/messages/{id}",
            get(messages::get_message)
                .patch(messages::mark_message_read)
                .delete(messages::delete_message),
        )
        .route(
            "/upload",
            post(upload::upload_image)
                .delete(upload::delete_image)
                .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD)),
        )
}
