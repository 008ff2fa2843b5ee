use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;

use crate::{
    AppState,
    auth::AdminUser,
    error::{ApiError, ApiResult},
    models::{PageKey, PageSettings, PageSettingsRequest},
    validation::ValidatedJson,
};

fn parse_page(page: &str) -> ApiResult<PageKey> {
    page.parse().map_err(|_| ApiError::NotFound("Page"))
}

/// get_page_settings
///
/// [Public Route] Pages never edited from the dashboard get their built-in defaults.
#[utoipa::path(
    get,
    path = "/api/settings/{page}",
    params(("page" = String, Path, description = "home, team, projects, achievements, events or contact")),
    responses(
        (status = 200, description = "Page settings", body = PageSettings),
        (status = 404, description = "Unknown page")
    )
)]
pub async fn get_page_settings(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> ApiResult<Json<PageSettings>> {
    let page = parse_page(&page)?;
    let settings = state
        .repo
        .get_page_settings(page)
        .await?
        .unwrap_or_else(|| PageSettings::defaults_for(page, Utc::now()));
    Ok(Json(settings))
}

/// update_page_settings
///
/// [Admin Route] Upsert. Fields missing from the request keep their stored (or
/// default) values.
#[utoipa::path(
    put,
    path = "/api/admin/settings/{page}",
    params(("page" = String, Path, description = "Page key")),
    request_body = PageSettingsRequest,
    responses(
        (status = 200, description = "Saved", body = PageSettings),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Unknown page")
    )
)]
pub async fn update_page_settings(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(page): Path<String>,
    ValidatedJson(payload): ValidatedJson<PageSettingsRequest>,
) -> ApiResult<Json<PageSettings>> {
    let page = parse_page(&page)?;
    let now = Utc::now();
    let current = state
        .repo
        .get_page_settings(page)
        .await?
        .unwrap_or_else(|| PageSettings::defaults_for(page, now));

    let saved = state
        .repo
        .upsert_page_settings(current.apply(payload, now))
        .await?;
    tracing::info!(admin = %admin.email, %page, "page settings saved");
    Ok(Json(saved))
}
