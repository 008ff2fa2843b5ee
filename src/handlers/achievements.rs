use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::{
    AppState,
    auth::AdminUser,
    error::{ApiError, ApiResult},
    models::{Achievement, CreateAchievementRequest, UpdateAchievementRequest},
    validation::ValidatedJson,
};

#[utoipa::path(
    get,
    path = "/api/achievements",
    responses((status = 200, description = "Achievements, most recent first", body = [Achievement]))
)]
pub async fn list_achievements(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Achievement>>> {
    Ok(Json(state.repo.list_achievements().await?))
}

#[utoipa::path(
    get,
    path = "/api/achievements/{id}",
    params(("id" = String, Path, description = "Achievement ID")),
    responses(
        (status = 200, description = "Found", body = Achievement),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_achievement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Achievement>> {
    state
        .repo
        .get_achievement(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Achievement"))
}

#[utoipa::path(
    post,
    path = "/api/admin/achievements",
    request_body = CreateAchievementRequest,
    responses(
        (status = 201, description = "Created", body = Achievement),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_achievement(
    admin: AdminUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateAchievementRequest>,
) -> ApiResult<(StatusCode, Json<Achievement>)> {
    let achievement = state
        .repo
        .create_achievement(payload.into_document(Utc::now()))
        .await?;
    tracing::info!(admin = %admin.email, id = %achievement.id, "achievement created");
    Ok((StatusCode::CREATED, Json(achievement)))
}

#[utoipa::path(
    put,
    path = "/api/admin/achievements/{id}",
    params(("id" = String, Path, description = "Achievement ID")),
    request_body = UpdateAchievementRequest,
    responses(
        (status = 200, description = "Updated", body = Achievement),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_achievement(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateAchievementRequest>,
) -> ApiResult<Json<Achievement>> {
    let achievement = state
        .repo
        .update_achievement(&id, payload)
        .await?
        .ok_or(ApiError::NotFound("Achievement"))?;
    tracing::info!(admin = %admin.email, %id, "achievement updated");
    Ok(Json(achievement))
}

#[utoipa::path(
    delete,
    path = "/api/admin/achievements/{id}",
    params(("id" = String, Path, description = "Achievement ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_achievement(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if !state.repo.delete_achievement(&id).await? {
        return Err(ApiError::NotFound("Achievement"));
    }
    tracing::info!(admin = %admin.email, %id, "achievement deleted");
    Ok(StatusCode::NO_CONTENT)
}
