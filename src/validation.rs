use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use validator::Validate;

use crate::error::ApiError;

/// Wrapper for [`axum`] JSON extraction with [`validator`] support.
///
/// Malformed bodies and validation failures both reject with a 400, the latter
/// carrying the per-field errors.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
