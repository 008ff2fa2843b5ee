use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    AppState,
    auth::AdminUser,
    error::{ApiError, ApiResult},
    models::{CreateProjectRequest, Project, UpdateProjectRequest},
    validation::ValidatedJson,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ProjectFilter {
    /// When true only featured projects are returned.
    #[serde(default)]
    pub featured: bool,
}

/// list_projects
///
/// [Public Route] Featured projects first, then by `order`, newest first on ties.
#[utoipa::path(
    get,
    path = "/api/projects",
    params(ProjectFilter),
    responses((status = 200, description = "Projects", body = [Project]))
)]
pub async fn list_projects(
    State(state): State<AppState>,
    Query(filter): Query<ProjectFilter>,
) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(state.repo.list_projects(filter.featured).await?))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Found", body = Project),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Project>> {
    state
        .repo
        .get_project(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Project"))
}

#[utoipa::path(
    post,
    path = "/api/admin/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Created", body = Project),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_project(
    admin: AdminUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = state
        .repo
        .create_project(payload.into_document(Utc::now()))
        .await?;
    tracing::info!(admin = %admin.email, id = %project.id, "project created");
    Ok((StatusCode::CREATED, Json(project)))
}

#[utoipa::path(
    put,
    path = "/api/admin/projects/{id}",
    params(("id" = String, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Updated", body = Project),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_project(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    let project = state
        .repo
        .update_project(&id, payload)
        .await?
        .ok_or(ApiError::NotFound("Project"))?;
    tracing::info!(admin = %admin.email, %id, "project updated");
    Ok(Json(project))
}

#[utoipa::path(
    delete,
    path = "/api/admin/projects/{id}",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_project(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if !state.repo.delete_project(&id).await? {
        return Err(ApiError::NotFound("Project"));
    }
    tracing::info!(admin = %admin.email, %id, "project deleted");
    Ok(StatusCode::NO_CONTENT)
}
