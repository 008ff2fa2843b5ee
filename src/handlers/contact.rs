use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use chrono::Utc;
use serde_json::{Value, json};
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    models::ContactRequest,
    rate_limit::{RateDecision, client_ip},
};

/// submit_contact
///
/// [Public Route] Stores a contact-form message for the dashboard inbox.
///
/// The rate limit is checked before the body is parsed, so malformed or invalid
/// submissions still consume the caller's quota.
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Message received"),
        (status = 400, description = "Validation failed"),
        (status = 429, description = "Too many submissions")
    )
)]
pub async fn submit_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let ip = client_ip(&headers);
    if let RateDecision::Limited { retry_after } = state.rate_limiter.check(&ip) {
        tracing::warn!(%ip, "contact form rate limit hit");
        // Round up so clients never retry a moment too early.
        let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
        return Err(ApiError::RateLimited { retry_after_secs: secs.max(1) });
    }

    let Json(payload) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let payload = payload.trimmed();
    payload.validate()?;

    let message = state
        .repo
        .create_message(payload.into_document(Utc::now()))
        .await?;
    tracing::info!(id = %message.id, "contact message stored");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "id": message.id })),
    ))
}
