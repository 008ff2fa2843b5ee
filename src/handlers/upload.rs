use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};

use crate::{
    AppState,
    auth::AdminUser,
    error::{ApiError, ApiResult},
    models::{DeleteImageRequest, UploadedImage},
    storage::{ALLOWED_IMAGE_TYPES, ImageUpload},
    validation::ValidatedJson,
};

fn multipart_error(err: MultipartError, limit: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge { limit }
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

/// Checks an incoming file against the accepted MIME types and the size limit.
pub fn check_image(content_type: &str, len: usize, limit: usize) -> ApiResult<()> {
    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(ApiError::UnsupportedMediaType(content_type.to_string()));
    }
    if len > limit {
        return Err(ApiError::PayloadTooLarge { limit });
    }
    Ok(())
}

/// upload_image
///
/// [Admin Route] Forwards a multipart `file` to the image host. An optional
/// `folder` field selects a sub-folder below the configured root.
#[utoipa::path(
    post,
    path = "/api/admin/upload",
    request_body(content_type = "multipart/form-data", description = "Fields: file (required), folder (optional)"),
    responses(
        (status = 201, description = "Uploaded", body = UploadedImage),
        (status = 400, description = "No file provided"),
        (status = 413, description = "File too large"),
        (status = 415, description = "Not an accepted image type")
    )
)]
pub async fn upload_image(
    admin: AdminUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadedImage>)> {
    let limit = state.config.max_upload_bytes;
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut folder = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let content_type = field.content_type().unwrap_or("unknown").to_string();
                let file_name = field.file_name().unwrap_or("upload").to_string();
                // Reject on type before reading the body.
                check_image(&content_type, 0, limit)?;
                let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
                check_image(&content_type, bytes.len(), limit)?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            Some("folder") => {
                let value = field.text().await.map_err(|e| multipart_error(e, limit))?;
                folder = Some(value).filter(|v| !v.trim().is_empty());
            }
            _ => {}
        }
    }

    let (file_name, content_type, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;

    let image = state
        .storage
        .upload_image(ImageUpload {
            bytes,
            file_name,
            content_type,
            folder,
        })
        .await?;
    tracing::info!(admin = %admin.email, public_id = %image.public_id, "image uploaded");

    Ok((StatusCode::CREATED, Json(image)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/upload",
    request_body = DeleteImageRequest,
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such image")
    )
)]
pub async fn delete_image(
    admin: AdminUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<DeleteImageRequest>,
) -> ApiResult<StatusCode> {
    if !state.storage.delete_image(&payload.public_id).await? {
        return Err(ApiError::NotFound("Image"));
    }
    tracing::info!(admin = %admin.email, public_id = %payload.public_id, "image deleted");
    Ok(StatusCode::NO_CONTENT)
}
