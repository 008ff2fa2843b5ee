use axum::{
    Router,
    extract::FromRef,
    http::{HeaderName, HeaderValue, Method, header},
    middleware::from_fn_with_state,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod oauth;
pub mod rate_limit;
pub mod repository;
pub mod storage;
pub mod validation;

pub mod routes;
use routes::{admin, auth as auth_routes, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use oauth::{GoogleOAuthClient, OAuthState};
pub use rate_limit::RateLimiter;
pub use repository::{InMemoryRepository, MongoRepository, RepositoryState};
pub use storage::{CloudinaryClient, MockImageStore, StorageState};

use handlers::{
    achievements, auth as auth_handlers, contact, events, messages, projects, settings, stats,
    team, upload,
};

/// ApiDoc
///
/// OpenAPI document for every route, served at `/api-docs/openapi.json` and
/// browsable through Swagger UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        team::list_team, team::get_team_member, team::list_all_team,
        team::create_team_member, team::update_team_member, team::delete_team_member,
        events::list_events, events::get_event, events::create_event,
        events::update_event, events::delete_event,
        projects::list_projects, projects::get_project, projects::create_project,
        projects::update_project, projects::delete_project,
        achievements::list_achievements, achievements::get_achievement,
        achievements::create_achievement, achievements::update_achievement,
        achievements::delete_achievement,
        settings::get_page_settings, settings::update_page_settings,
        contact::submit_contact,
        messages::list_messages, messages::get_message, messages::mark_message_read,
        messages::delete_message,
        stats::get_stats,
        upload::upload_image, upload::delete_image,
        auth_handlers::login, auth_handlers::logout, auth_handlers::me,
        auth_handlers::google_sign_in, auth_handlers::google_callback,
    ),
    components(
        schemas(
            models::TeamMember, models::CreateTeamMemberRequest, models::UpdateTeamMemberRequest,
            models::Event, models::CreateEventRequest, models::UpdateEventRequest,
            models::Project, models::CreateProjectRequest, models::UpdateProjectRequest,
            models::Achievement, models::CreateAchievementRequest, models::UpdateAchievementRequest,
            models::PageSettings, models::PageSettingsRequest,
            models::Message, models::ContactRequest, models::MarkReadRequest,
            models::LoginRequest, models::AdminProfile, models::AuthStatus,
            models::DashboardStats, models::UploadedImage, models::DeleteImageRequest,
            events::EventStatus,
        )
    ),
    tags(
        (name = "club-site", description = "Club website content and admin API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single container of shared services handed to every handler. Cloning is
/// cheap; every service sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub storage: StorageState,
    pub oauth: OAuthState,
    pub rate_limiter: Arc<RateLimiter>,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for OAuthState {
    fn from_ref(app_state: &AppState) -> OAuthState {
        app_state.oauth.clone()
    }
}

impl FromRef<AppState> for Arc<RateLimiter> {
    fn from_ref(app_state: &AppState) -> Arc<RateLimiter> {
        app_state.rate_limiter.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Credentialed CORS forbids wildcards, so methods and headers are explicit.
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

/// create_router
///
/// Assembles the whole application: public, auth and admin API routes, the
/// Swagger UI, the static frontend bundle with its page gate, and the
/// observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .nest("/api/auth", auth_routes::auth_routes())
        .nest(
            "/api/admin",
            admin::admin_routes(state.config.max_upload_bytes).route_layer(from_fn_with_state(
                state.clone(),
                middleware::require_admin,
            )),
        )
        .fallback(handlers::serve_frontend)
        .layer(from_fn_with_state(state.clone(), middleware::page_gate))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for every request, tagged with the `x-request-id` set by
/// `SetRequestIdLayer` so all log lines of one request correlate.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
