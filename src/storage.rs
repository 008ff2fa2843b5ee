use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use reqwest::{
    Client, StatusCode,
    multipart::{Form, Part},
};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::{sync::Arc, time::Duration};
use thiserror::Error;

use crate::{config::AppConfig, models::UploadedImage};

/// MIME types accepted by the upload endpoint.
pub const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/avif",
];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("image host request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The image host refused the asset itself (corrupt file, bad public id...).
    #[error("image rejected: {0}")]
    Rejected(String),
    #[error("image host returned an unexpected response: {0}")]
    Unexpected(String),
}

/// ImageUpload
///
/// A validated file ready to be forwarded to the image host.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
    // Sub-folder below the configured root folder, e.g. "team".
    pub folder: Option<String>,
}

/// ImageStore
///
/// Contract for the image host. The site never stores image bytes itself; it
/// forwards them and keeps only the returned URL.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload_image(&self, upload: ImageUpload) -> Result<UploadedImage, StorageError>;

    /// Returns `false` when the host has no asset under `public_id`.
    async fn delete_image(&self, public_id: &str) -> Result<bool, StorageError>;
}

pub type StorageState = Arc<dyn ImageStore>;

/// sanitize_key
///
/// Removes directory navigation (`..`, `.`) and empty segments from a
/// user-provided folder or public id.
pub fn sanitize_key(key: &str) -> String {
    key.split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// sign_params
///
/// Cloudinary request signature: parameters sorted by name, joined as
/// `k=v&k=v`, the API secret appended, hashed with SHA-256. Empty values are
/// not signed.
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut signed: Vec<_> = params.iter().filter(|(_, value)| !value.is_empty()).collect();
    signed.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = signed
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// CloudinaryClient
///
/// `ImageStore` backed by the Cloudinary upload API using signed requests.
#[derive(Clone)]
pub struct CloudinaryClient {
    http_client: Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    root_folder: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    width: Option<u32>,
    height: Option<u32>,
    format: Option<String>,
    bytes: Option<u64>,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorMessage,
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

impl CloudinaryClient {
    pub fn new(config: &AppConfig, timeout: Duration) -> Result<Self, StorageError> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_base: config.cloudinary_api_base.trim_end_matches('/').to_string(),
            cloud_name: config.cloudinary_cloud_name.clone(),
            api_key: config.cloudinary_api_key.clone(),
            api_secret: config.cloudinary_api_secret.clone(),
            root_folder: sanitize_key(&config.cloudinary_folder),
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{}", self.api_base, self.cloud_name, action)
    }

    fn folder_for(&self, sub_folder: Option<&str>) -> String {
        let sub_folder = sub_folder.map(sanitize_key).unwrap_or_default();
        match (self.root_folder.is_empty(), sub_folder.is_empty()) {
            (_, true) => self.root_folder.clone(),
            (true, false) => sub_folder,
            (false, false) => format!("{}/{}", self.root_folder, sub_folder),
        }
    }

    /// Turns a 4xx reply into `Rejected` with Cloudinary's own message.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
        let status = response.status();
        if status.is_client_error() && status != StatusCode::UNAUTHORIZED {
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error.message,
                Err(_) => status.to_string(),
            };
            return Err(StorageError::Rejected(message));
        }
        Ok(response.error_for_status()?)
    }
}

#[async_trait]
impl ImageStore for CloudinaryClient {
    async fn upload_image(&self, upload: ImageUpload) -> Result<UploadedImage, StorageError> {
        let folder = self.folder_for(upload.folder.as_deref());
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("folder", folder.clone()), ("timestamp", timestamp.clone())],
            &self.api_secret,
        );

        let file = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)?;

        let mut form = Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        if !folder.is_empty() {
            form = form.text("folder", folder);
        }

        let response = self
            .http_client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        let body: UploadResponse = Self::check(response).await?.json().await?;

        tracing::info!(public_id = %body.public_id, bytes = ?body.bytes, "image uploaded");

        Ok(UploadedImage {
            url: body.secure_url,
            public_id: body.public_id,
            width: body.width,
            height: body.height,
            format: body.format,
            bytes: body.bytes,
        })
    }

    async fn delete_image(&self, public_id: &str) -> Result<bool, StorageError> {
        let public_id = sanitize_key(public_id);
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("public_id", public_id.clone()), ("timestamp", timestamp.clone())],
            &self.api_secret,
        );

        let response = self
            .http_client
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", public_id.as_str()),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.api_key.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await?;
        let body: DestroyResponse = Self::check(response).await?.json().await?;

        match body.result.as_str() {
            "ok" => {
                tracing::info!(%public_id, "image deleted");
                Ok(true)
            }
            "not found" => Ok(false),
            other => Err(StorageError::Unexpected(other.to_string())),
        }
    }
}

/// MockImageStore
///
/// In-memory `ImageStore` for tests. Remembers uploaded public ids so deletes
/// can report whether the asset existed.
#[derive(Default)]
pub struct MockImageStore {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
    uploads: DashMap<String, usize>,
}

impl MockImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn contains(&self, public_id: &str) -> bool {
        self.uploads.contains_key(public_id)
    }
}

#[async_trait]
impl ImageStore for MockImageStore {
    async fn upload_image(&self, upload: ImageUpload) -> Result<UploadedImage, StorageError> {
        if self.should_fail {
            return Err(StorageError::Unexpected("simulated failure".to_string()));
        }

        let stem = upload
            .file_name
            .rsplit_once('.')
            .map_or(upload.file_name.as_str(), |(stem, _)| stem);
        let public_id = match upload.folder.as_deref().map(sanitize_key) {
            Some(folder) if !folder.is_empty() => format!("{folder}/{}", sanitize_key(stem)),
            _ => sanitize_key(stem),
        };
        self.uploads.insert(public_id.clone(), upload.bytes.len());

        Ok(UploadedImage {
            url: format!("https://res.cloudinary.test/mock/image/upload/{public_id}"),
            public_id,
            width: None,
            height: None,
            format: upload.content_type.strip_prefix("image/").map(str::to_string),
            bytes: Some(upload.bytes.len() as u64),
        })
    }

    async fn delete_image(&self, public_id: &str) -> Result<bool, StorageError> {
        if self.should_fail {
            return Err(StorageError::Unexpected("simulated failure".to_string()));
        }
        Ok(self.uploads.remove(&sanitize_key(public_id)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_matches_cloudinary_sha256_scheme() {
        let signature = sign_params(
            &[
                ("timestamp", "1700000000".to_string()),
                ("folder", "club-site/team".to_string()),
                ("tags", String::new()),
            ],
            "test-secret",
        );

        assert_eq!(
            signature,
            "2c9b2a95a996b9fdb6aa98305231e7c4535669f0afdbda3f88325e5e732f8bf1"
        );
    }

    #[test]
    fn sanitize_key_strips_traversal() {
        assert_eq!(sanitize_key("../../etc/./passwd"), "etc/passwd");
        assert_eq!(sanitize_key("/team//2025/"), "team/2025");
    }

    #[test]
    fn folder_is_nested_below_configured_root() {
        let client = CloudinaryClient::new(&AppConfig::default(), Duration::from_secs(1)).unwrap();

        assert_eq!(client.folder_for(None), "club-site");
        assert_eq!(client.folder_for(Some("../team")), "club-site/team");
    }
}
