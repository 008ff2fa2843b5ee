use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    AppState,
    auth::AdminUser,
    error::{ApiError, ApiResult},
    models::{CreateEventRequest, Event, UpdateEventRequest},
    validation::ValidatedJson,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Past,
}

/// EventFilter
///
/// Query parameters for GET /api/events. Without `status` every event is
/// returned in chronological order.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct EventFilter {
    /// `upcoming` (soonest first) or `past` (most recent first).
    pub status: Option<EventStatus>,
}

/// Splits `events` (sorted by start date) according to `status` relative to `now`.
pub fn filter_events(
    events: Vec<Event>,
    status: Option<EventStatus>,
    now: chrono::DateTime<Utc>,
) -> Vec<Event> {
    match status {
        None => events,
        Some(EventStatus::Upcoming) => events.into_iter().filter(|e| e.is_upcoming(now)).collect(),
        Some(EventStatus::Past) => events
            .into_iter()
            .rev()
            .filter(|e| !e.is_upcoming(now))
            .collect(),
    }
}

#[utoipa::path(
    get,
    path = "/api/events",
    params(EventFilter),
    responses((status = 200, description = "Events", body = [Event]))
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> ApiResult<Json<Vec<Event>>> {
    let events = state.repo.list_events().await?;
    Ok(Json(filter_events(events, filter.status, Utc::now())))
}

#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Found", body = Event),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Event>> {
    state
        .repo
        .get_event(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Event"))
}

#[utoipa::path(
    post,
    path = "/api/admin/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Created", body = Event),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_event(
    admin: AdminUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    let event = state.repo.create_event(payload.into_document(Utc::now())).await?;
    tracing::info!(admin = %admin.email, id = %event.id, "event created");
    Ok((StatusCode::CREATED, Json(event)))
}

/// update_event
///
/// [Admin Route] Partial update. When only one of `date`/`endDate` is sent the
/// resulting range is checked against the stored value as well.
#[utoipa::path(
    put,
    path = "/api/admin/events/{id}",
    params(("id" = String, Path, description = "Event ID")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Updated", body = Event),
        (status = 400, description = "End date before start date"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_event(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateEventRequest>,
) -> ApiResult<Json<Event>> {
    if payload.date.is_some() != payload.end_date.is_some() {
        let current = state
            .repo
            .get_event(&id)
            .await?
            .ok_or(ApiError::NotFound("Event"))?;
        let start = payload.date.unwrap_or(current.date);
        if let Some(end) = payload.end_date.or(current.end_date) {
            if end < start {
                return Err(ApiError::BadRequest(
                    "endDate must not be before date".to_string(),
                ));
            }
        }
    }

    let event = state
        .repo
        .update_event(&id, payload)
        .await?
        .ok_or(ApiError::NotFound("Event"))?;
    tracing::info!(admin = %admin.email, %id, "event updated");
    Ok(Json(event))
}

#[utoipa::path(
    delete,
    path = "/api/admin/events/{id}",
    params(("id" = String, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_event(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if !state.repo.delete_event(&id).await? {
        return Err(ApiError::NotFound("Event"));
    }
    tracing::info!(admin = %admin.email, %id, "event deleted");
    Ok(StatusCode::NO_CONTENT)
}
