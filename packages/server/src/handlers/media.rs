use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::MediaType;
use common::api::MessageEnvelope;
use common::storage::{MediaFolder, PublicId};
use sea_orm::*;
use tracing::instrument;

use crate::audit;
use crate::entity::media;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::handlers::upload::{read_upload_form, store_image};
use crate::models::media::{MediaEnvelope, MediaListQuery, MediaListResponse, MediaResponse};
use crate::models::shared::{max_chars, required};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Media",
    operation_id = "uploadMedia",
    summary = "Upload a gallery, banner or event image",
    description = "Multipart fields `title`, `mediaType` (`banner`, `gallery` or `event`) and `file` (an image of at most `storage.max_media_size` bytes).",
    request_body(content_type = "multipart/form-data", description = "Image with title and type"),
    responses(
        (status = 201, description = "Media stored", body = MediaEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 413, description = "File too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 502, description = "Media host failed (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, multipart))]
pub async fn upload_media(
    _admin: AdminUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_upload_form(&mut multipart, "file", state.config.storage.max_media_size)
        .await?;

    let title = required("title", form.text("title"))?;
    max_chars("title", &title, 256)?;
    let media_type: MediaType = form
        .text("mediaType")
        .parse()
        .map_err(|_| AppError::Validation("mediaType must be banner, gallery or event".into()))?;
    let image = form
        .image
        .as_ref()
        .ok_or_else(|| AppError::Validation("Please upload an image file".into()))?;

    let (image_url, public_id) = store_image(&state, MediaFolder::MediaUploads, image).await?;

    let model = media::ActiveModel {
        title: Set(title.clone()),
        media_type: Set(media_type),
        image_url: Set(image_url),
        public_id: Set(public_id),
        uploaded_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    audit::record(&state.db, format!("Principal uploaded {media_type} media: {title}")).await;

    Ok((
        StatusCode::CREATED,
        Json(MediaEnvelope {
            success: true,
            message: "Media uploaded successfully".into(),
            media: model.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Media",
    operation_id = "listMedia",
    summary = "List media, newest first",
    params(MediaListQuery),
    responses(
        (status = 200, description = "Media items", body = MediaListResponse),
        (status = 400, description = "Unknown media type (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_media(
    State(state): State<AppState>,
    Query(query): Query<MediaListQuery>,
) -> Result<Json<MediaListResponse>, AppError> {
    let mut select = media::Entity::find();
    if let Some(media_type) = query.media_type {
        select = select.filter(media::Column::MediaType.eq(media_type));
    }

    let media: Vec<MediaResponse> = select
        .order_by_desc(media::Column::UploadedAt)
        .order_by_desc(media::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(MediaResponse::from)
        .collect();

    Ok(Json(MediaListResponse {
        success: true,
        count: media.len(),
        media,
    }))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Media",
    operation_id = "deleteMedia",
    summary = "Delete a media item",
    description = "Removes the stored image first, then the row. If the media host fails the row is kept.",
    params(("id" = i32, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Media deleted", body = MessageEnvelope),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Media not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Media host failed (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn delete_media(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageEnvelope>, AppError> {
    let model = media::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Media not found".into()))?;

    let shared = media::Entity::find()
        .filter(media::Column::PublicId.eq(&model.public_id))
        .filter(media::Column::Id.ne(model.id))
        .count(&state.db)
        .await?;
    if shared == 0 {
        match model.public_id.parse::<PublicId>() {
            Ok(public_id) => {
                state.media.destroy(&public_id).await?;
            }
            Err(e) => tracing::warn!(public_id = %model.public_id, "Unparseable media id: {}", e),
        }
    }

    media::Entity::delete_by_id(model.id).exec(&state.db).await?;

    audit::record(&state.db, format!("Principal deleted media: {}", model.title)).await;

    Ok(Json(MessageEnvelope::ok("Media deleted successfully")))
}
