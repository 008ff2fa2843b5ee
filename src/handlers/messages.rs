use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    AppState,
    auth::AdminUser,
    error::{ApiError, ApiResult},
    models::{MarkReadRequest, Message},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct MessageFilter {
    /// When true only unread messages are returned.
    #[serde(default)]
    pub unread: bool,
}

/// list_messages
///
/// [Admin Route] Contact-form inbox, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/messages",
    params(MessageFilter),
    responses((status = 200, description = "Messages", body = [Message]))
)]
pub async fn list_messages(
    State(state): State<AppState>,
    Query(filter): Query<MessageFilter>,
) -> ApiResult<Json<Vec<Message>>> {
    Ok(Json(state.repo.list_messages(filter.unread).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/messages/{id}",
    params(("id" = String, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message", body = Message),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Message>> {
    let message = state
        .repo
        .get_message(&id)
        .await?
        .ok_or(ApiError::NotFound("Message"))?;
    Ok(Json(message))
}

#[utoipa::path(
    patch,
    path = "/api/admin/messages/{id}",
    params(("id" = String, Path, description = "Message ID")),
    request_body = MarkReadRequest,
    responses(
        (status = 200, description = "Updated", body = Message),
        (status = 400, description = "Malformed body"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn mark_message_read(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MarkReadRequest>, JsonRejection>,
) -> ApiResult<Json<Message>> {
    let Json(payload) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let message = state
        .repo
        .set_message_read(&id, payload.read)
        .await?
        .ok_or(ApiError::NotFound("Message"))?;
    tracing::debug!(admin = %admin.email, %id, read = payload.read, "message read flag set");
    Ok(Json(message))
}

#[utoipa::path(
    delete,
    path = "/api/admin/messages/{id}",
    params(("id" = String, Path, description = "Message ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_message(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if !state.repo.delete_message(&id).await? {
        return Err(ApiError::NotFound("Message"));
    }
    tracing::info!(admin = %admin.email, %id, "message deleted");
    Ok(StatusCode::NO_CONTENT)
}
