//! Image upload handler.

use std::sync::Arc;

use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::Json;
use futures::future::try_join_all;

use emlak_core::error::CoreError;
use emlak_core::gateway::{ImageHost, ImageUpload};

use crate::error::{AppError, AppResult};
use crate::response::UploadResponse;
use crate::state::AppState;

/// Multipart field carrying the images.
const FILES_FIELD: &str = "files";

/// Accepted extensions and the content type each maps to.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
];

/// POST /api/v1/uploads
///
/// Accepts one or more `files` parts, publishes them to the image host
/// concurrently and returns their URLs in the order they were sent. Any
/// single failure fails the whole request.
pub async fn upload_images(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let mut multipart = multipart?;

    let mut images = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        images.push(read_image(field).await?);
    }

    if images.is_empty() {
        return Err(AppError::BadRequest("No files provided".into()));
    }

    let host: Arc<dyn ImageHost> = state
        .images
        .clone()
        .ok_or_else(|| AppError::InternalError("Image host is not configured".into()))?;

    let count = images.len();
    let urls = try_join_all(images.into_iter().map(|image| {
        let host = Arc::clone(&host);
        async move { host.upload(image).await }
    }))
    .await
    .map_err(CoreError::from)?;

    tracing::info!(count, "Images uploaded");
    Ok(Json(UploadResponse { urls }))
}

async fn read_image(field: Field<'_>) -> AppResult<ImageUpload> {
    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = image_content_type(&file_name, field.content_type()).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Unsupported file type for '{file_name}'. Allowed: jpg, jpeg, png, webp, gif"
        ))
    })?;

    let bytes = field.bytes().await?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest(format!("File '{file_name}' is empty")));
    }

    Ok(ImageUpload {
        file_name,
        content_type: content_type.to_string(),
        bytes: bytes.to_vec(),
    })
}

/// Resolve the image type from the declared content type, falling back to
/// the file extension when the client sent none or a generic one.
fn image_content_type(file_name: &str, declared: Option<&str>) -> Option<&'static str> {
    let declared = declared
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

    match declared {
        Some(ct) => IMAGE_TYPES
            .iter()
            .map(|(_, mime)| *mime)
            .find(|mime| *mime == ct),
        None => {
            let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
            IMAGE_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, mime)| *mime)
        }
    }
}
