use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::api::MessageEnvelope;
use common::storage::MediaFolder;
use sea_orm::*;
use tracing::instrument;

use crate::audit;
use crate::entity::announcement;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::handlers::upload::{read_upload_form, store_image};
use crate::models::announcement::{
    AnnouncementEnvelope, AnnouncementListResponse, AnnouncementResponse, NewAnnouncement,
};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Announcements",
    operation_id = "createAnnouncement",
    summary = "Publish an announcement",
    description = "Multipart fields `title`, `description`, `isImportant`, `expiryDate` (YYYY-MM-DD, inclusive) and an optional `attachment` image.",
    request_body(content_type = "multipart/form-data", description = "Announcement with optional attachment"),
    responses(
        (status = 201, description = "Announcement created", body = AnnouncementEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 413, description = "Attachment too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, multipart))]
pub async fn create_announcement(
    _admin: AdminUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_upload_form(
        &mut multipart,
        "attachment",
        state.config.storage.max_media_size,
    )
    .await?;
    let new = NewAnnouncement::from_fields(&form.fields)?;

    let attachment = match &form.image {
        Some(image) => {
            Some(store_image(&state, MediaFolder::AnnouncementUploads, image).await?)
        }
        None => None,
    };

    let model = announcement::ActiveModel {
        title: Set(new.title.clone()),
        description: Set(new.description),
        attachment_url: Set(attachment.as_ref().map(|(url, _)| url.clone())),
        attachment_public_id: Set(attachment.map(|(_, id)| id)),
        is_important: Set(new.is_important),
        expiry_date: Set(new.expiry_date),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    audit::record(
        &state.db,
        format!("Principal created announcement: {}", new.title),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(AnnouncementEnvelope {
            success: true,
            message: "Announcement created successfully".into(),
            announcement: model.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Announcements",
    operation_id = "listAnnouncements",
    summary = "Active announcements, newest first",
    description = "Public. Only active announcements whose expiry date is unset or not yet passed.",
    responses(
        (status = 200, description = "Announcements", body = AnnouncementListResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn list_announcements(
    State(state): State<AppState>,
) -> Result<Json<AnnouncementListResponse>, AppError> {
    let now = Utc::now();
    let announcements: Vec<AnnouncementResponse> = announcement::Entity::find()
        .filter(announcement::Column::IsActive.eq(true))
        .filter(
            Condition::any()
                .add(announcement::Column::ExpiryDate.is_null())
                .add(announcement::Column::ExpiryDate.gte(now)),
        )
        .order_by_desc(announcement::Column::CreatedAt)
        .order_by_desc(announcement::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(AnnouncementResponse::from)
        .collect();

    Ok(Json(AnnouncementListResponse {
        success: true,
        count: announcements.len(),
        announcements,
    }))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Announcements",
    operation_id = "deactivateAnnouncement",
    summary = "Take an announcement down",
    description = "Marks the announcement inactive. The row and its attachment are kept.",
    params(("id" = i32, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Announcement deactivated", body = MessageEnvelope),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Announcement not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn deactivate_announcement(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageEnvelope>, AppError> {
    let model = announcement::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Announcement not found".into()))?;

    let mut active = model.into_active_model();
    active.is_active = Set(false);
    active.update(&state.db).await?;

    Ok(Json(MessageEnvelope::ok("Announcement removed successfully")))
}
