use std::collections::HashMap;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{DefaultBodyLimit, Multipart};
use axum::http::StatusCode;
use common::storage::{MediaFolder, PublicId};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::filename::upload_extension;

/// An image part read from a multipart body.
pub struct ImagePart {
    pub extension: String,
    pub data: Vec<u8>,
}

/// Text parts keyed by name, plus the image part if one was sent.
#[derive(Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub image: Option<ImagePart>,
}

impl UploadForm {
    pub fn text(&self, key: &str) -> &str {
        self.fields.get(key).map(|v| v.trim()).unwrap_or_default()
    }
}

/// Drain a multipart body. The part named `file_field` is read as an image
/// of at most `max_size` bytes; an empty file part counts as absent.
pub async fn read_upload_form(
    multipart: &mut Multipart,
    file_field: &str,
    max_size: u64,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == file_field {
            form.image = read_image(field, max_size).await?;
        } else {
            let text = field.text().await.map_err(multipart_error)?;
            form.fields.insert(name, text);
        }
    }

    Ok(form)
}

async fn read_image(mut field: Field<'_>, max_size: u64) -> Result<Option<ImagePart>, AppError> {
    let file_name = field
        .file_name()
        .map(str::to_string)
        .filter(|n| !n.is_empty());
    let content_type = field.content_type().map(str::to_string);

    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(multipart_error)?
    {
        if (data.len() + chunk.len()) as u64 > max_size {
            return Err(AppError::PayloadTooLarge(format!(
                "File is too large (limit {} KiB)",
                max_size / 1024
            )));
        }
        data.extend_from_slice(&chunk);
    }

    if data.is_empty() {
        return Ok(None);
    }

    let extension = upload_extension(file_name.as_deref(), content_type.as_deref())?;
    Ok(Some(ImagePart { extension, data }))
}

/// Upload an image and return `(url, public_id)`.
pub async fn store_image(
    state: &AppState,
    folder: MediaFolder,
    image: &ImagePart,
) -> Result<(String, String), AppError> {
    let id = state
        .media
        .upload(folder, &image.extension, &image.data)
        .await?;
    Ok((state.media.url_for(&id), id.to_string()))
}

/// Delete a stored asset, logging instead of failing.
pub async fn discard_media(state: &AppState, public_id: &str) {
    let id = match public_id.parse::<PublicId>() {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(public_id, "Skipping delete of unparseable media id: {}", e);
            return;
        }
    };
    match state.media.destroy(&id).await {
        Ok(true) => {}
        Ok(false) => tracing::debug!(public_id, "Media already gone"),
        Err(e) => tracing::warn!(public_id, "Failed to delete media: {}", e),
    }
}

/// Body limit for a route that takes one image of at most `max_size` bytes,
/// with headroom for the text parts.
pub fn upload_body_limit(max_size: u64) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_size as usize + 256 * 1024)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Multipart error: {}", e.body_text()))
    }
}
