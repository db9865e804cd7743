//! Image upload for post covers.

use std::path::Path;

use inkpost_api_types::UploadResponse;
use reqwest::multipart::{Form, Part};
use tracing::info;

use crate::client::{ApiClient, ApiError};
use crate::domain::uploads::validate_image;
use crate::infra::error::InfraError;

use super::context::AppContext;
use super::error::AppError;

const UPLOAD_PATH: &str = "/api/upload";
const UPLOAD_FIELD: &str = "image";

pub struct UploadService {
    api: ApiClient,
}

impl UploadService {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            api: ctx.api().clone(),
        }
    }

    /// Validate a local image and upload it; returns the hosted URL.
    pub async fn upload_image(&self, path: &Path) -> Result<String, AppError> {
        let metadata = tokio::fs::metadata(path).await.map_err(InfraError::from)?;
        let mime = validate_image(path, metadata.len())?;
        let bytes = tokio::fs::read(path).await.map_err(InfraError::from)?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.essence_str())
            .map_err(ApiError::from_transport)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response: UploadResponse = self.api.post_multipart(UPLOAD_PATH, form).await?;
        info!(url = %response.image_url, "image uploaded");
        Ok(response.image_url)
    }
}
