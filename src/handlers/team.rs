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
    models::{CreateTeamMemberRequest, TeamMember, UpdateTeamMemberRequest},
    validation::ValidatedJson,
};

/// list_team
///
/// [Public Route] Active members ordered by `order`, then by join date.
#[utoipa::path(
    get,
    path = "/api/team",
    responses((status = 200, description = "Active team members", body = [TeamMember]))
)]
pub async fn list_team(State(state): State<AppState>) -> ApiResult<Json<Vec<TeamMember>>> {
    Ok(Json(state.repo.list_team_members(true).await?))
}

/// get_team_member
///
/// [Public Route] Inactive members are reported as missing.
#[utoipa::path(
    get,
    path = "/api/team/{id}",
    params(("id" = String, Path, description = "Team member ID")),
    responses(
        (status = 200, description = "Found", body = TeamMember),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_team_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<TeamMember>> {
    state
        .repo
        .get_team_member(&id)
        .await?
        .filter(|member| member.active)
        .map(Json)
        .ok_or(ApiError::NotFound("Team member"))
}

/// list_all_team
///
/// [Admin Route] Every member including inactive ones, in display order.
#[utoipa::path(
    get,
    path = "/api/admin/team",
    responses((status = 200, description = "All team members", body = [TeamMember]))
)]
pub async fn list_all_team(State(state): State<AppState>) -> ApiResult<Json<Vec<TeamMember>>> {
    Ok(Json(state.repo.list_team_members(false).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/team",
    request_body = CreateTeamMemberRequest,
    responses(
        (status = 201, description = "Created", body = TeamMember),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_team_member(
    admin: AdminUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateTeamMemberRequest>,
) -> ApiResult<(StatusCode, Json<TeamMember>)> {
    let member = state
        .repo
        .create_team_member(payload.into_document(Utc::now()))
        .await?;
    tracing::info!(admin = %admin.email, id = %member.id, "team member created");
    Ok((StatusCode::CREATED, Json(member)))
}

#[utoipa::path(
    put,
    path = "/api/admin/team/{id}",
    params(("id" = String, Path, description = "Team member ID")),
    request_body = UpdateTeamMemberRequest,
    responses(
        (status = 200, description = "Updated", body = TeamMember),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_team_member(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateTeamMemberRequest>,
) -> ApiResult<Json<TeamMember>> {
    let member = state
        .repo
        .update_team_member(&id, payload)
        .await?
        .ok_or(ApiError::NotFound("Team member"))?;
    tracing::info!(admin = %admin.email, %id, "team member updated");
    Ok(Json(member))
}

#[utoipa::path(
    delete,
    path = "/api/admin/team/{id}",
    params(("id" = String, Path, description = "Team member ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_team_member(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if !state.repo.delete_team_member(&id).await? {
        return Err(ApiError::NotFound("Team member"));
    }
    tracing::info!(admin = %admin.email, %id, "team member deleted");
    Ok(StatusCode::NO_CONTENT)
}
