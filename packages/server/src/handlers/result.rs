use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::api::{MessageEnvelope, ResultPage, StudentEnvelope, page_count};
use common::storage::MediaFolder;
use common::student::StudentResult;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::audit;
use crate::entity::student_result;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::AppJson;
use crate::handlers::upload::{discard_media, read_upload_form, store_image};
use crate::models::result::{
    ResultDocument, ResultListQuery, SORT_KEYS, UpdateResultRequest, payload_from_fields,
    to_student,
};
use crate::models::shared::{PageRequest, escape_like};
use crate::state::AppState;

const DUPLICATE_ROLL_NO: &str = "A result with this roll number already exists";

#[utoipa::path(
    post,
    path = "/",
    tag = "Results",
    operation_id = "createResult",
    summary = "Upload a student result",
    description = "Creates a result from multipart text fields. `subjects` and `coScholasticAreas` are JSON-encoded lists; \
        either subject shape (`annualExam`/`halfYearly` or the older `maxMarks`/`marksObtained`) is accepted. \
        An optional `photo` image (at most `storage.max_photo_size` bytes) is stored with the record. \
        Grades, attendance and the aggregate are computed server-side.",
    request_body(content_type = "multipart/form-data", description = "Result fields with optional photo"),
    responses(
        (status = 201, description = "Result created", body = StudentEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Roll number already exists (CONFLICT)", body = ErrorBody),
        (status = 413, description = "Photo too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 502, description = "Media host failed (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, multipart))]
pub async fn create_result(
    _admin: AdminUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_upload_form(&mut multipart, "photo", state.config.storage.max_photo_size)
        .await?;
    let doc = ResultDocument::from_payload(payload_from_fields(&form.fields)?)?;
    let roll_no = doc.roll_no.clone();

    let existing = student_result::Entity::find()
        .filter(student_result::Column::RollNo.eq(&roll_no))
        .count(&state.db)
        .await?;
    if existing > 0 {
        return Err(AppError::Conflict(DUPLICATE_ROLL_NO.into()));
    }

    let photo = match &form.image {
        Some(image) => Some(store_image(&state, MediaFolder::StudentPhotos, image).await?),
        None => None,
    };

    let now = Utc::now();
    let mut active = student_result::ActiveModel {
        photo_url: Set(photo.as_ref().map(|(url, _)| url.clone())),
        photo_public_id: Set(photo.as_ref().map(|(_, id)| id.clone())),
        created_at: Set(now),
        ..Default::default()
    };
    doc.write_to(&mut active, now)?;

    let model = match active.insert(&state.db).await {
        Ok(model) => model,
        Err(e) => {
            if let Some((_, public_id)) = &photo {
                release_photo(&state, public_id).await;
            }
            return Err(match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    tracing::debug!("Duplicate roll number caught on insert");
                    AppError::Conflict(DUPLICATE_ROLL_NO.into())
                }
                _ => AppError::from(e),
            });
        }
    };

    audit::record(
        &state.db,
        format!("Principal uploaded result for rollNo: {roll_no}"),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(StudentEnvelope {
            success: true,
            message: Some("Result uploaded successfully".into()),
            student: to_student(model)?,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/{key}",
    tag = "Results",
    operation_id = "getResultByRollNo",
    summary = "Look up a result by roll number",
    description = "Public. Returns the full record regardless of `feesPaid`; clients decide what to show.",
    params(("key" = String, Path, description = "Roll number")),
    responses(
        (status = 200, description = "Result found", body = StudentEnvelope),
        (status = 404, description = "No result for this roll number (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_result(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<StudentEnvelope>, AppError> {
    let model = student_result::Entity::find()
        .filter(student_result::Column::RollNo.eq(key.trim()))
        .one(&state.db)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(StudentEnvelope {
        success: true,
        message: None,
        student: to_student(model)?,
    }))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Results",
    operation_id = "listResults",
    summary = "List results with pagination, filtering and search",
    description = "Filters by exact `className` and by case-insensitive `search` over name and roll number. \
        `sortBy` is one of `name` (default), `rollNo`, `className`, `createdAt`, `updatedAt`.",
    params(ResultListQuery),
    responses(
        (status = 200, description = "One page of results", body = ResultPage),
        (status = 400, description = "Bad sort key (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, query))]
pub async fn list_results(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ResultListQuery>,
) -> Result<Json<ResultPage>, AppError> {
    let page = PageRequest::resolve(query.page, query.limit, 10);

    let sort_column = match query.sort_by.as_deref().unwrap_or("name") {
        "name" => student_result::Column::Name,
        "rollNo" => student_result::Column::RollNo,
        "className" => student_result::Column::ClassName,
        "createdAt" => student_result::Column::CreatedAt,
        "updatedAt" => student_result::Column::UpdatedAt,
        _ => {
            return Err(AppError::Validation(format!(
                "sortBy must be one of: {}",
                SORT_KEYS.join(", ")
            )));
        }
    };
    let sort_order = match query.sort_order.as_deref() {
        None | Some("asc") => Order::Asc,
        Some("desc") => Order::Desc,
        Some(_) => {
            return Err(AppError::Validation(
                "sortOrder must be asc or desc".into(),
            ));
        }
    };

    let mut select = student_result::Entity::find();

    if let Some(class_name) = query.class_name.as_deref().map(str::trim)
        && !class_name.is_empty()
    {
        select = select.filter(student_result::Column::ClassName.eq(class_name));
    }

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(student_result::Column::Name)))
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(student_result::Column::RollNo)))
                            .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            );
        }
    }

    let total = select
        .clone()
        .paginate(&state.db, page.limit)
        .num_items()
        .await?;

    let rows = select
        .order_by(sort_column, sort_order)
        .order_by_asc(student_result::Column::Id)
        .offset(Some(page.offset()))
        .limit(Some(page.limit))
        .all(&state.db)
        .await?;

    let results = rows
        .into_iter()
        .map(to_student)
        .collect::<Result<Vec<StudentResult>, _>>()?;

    Ok(Json(ResultPage {
        success: true,
        count: results.len() as u64,
        total,
        page: page.page,
        pages: page_count(total, page.limit),
        results,
    }))
}

#[utoipa::path(
    put,
    path = "/{key}",
    tag = "Results",
    operation_id = "updateResult",
    summary = "Update a result",
    description = "Partial update by internal id. Absent fields are left unchanged. Unknown fields and a changed `rollNo` \
        are rejected. Grades, attendance and the aggregate are recomputed.",
    params(("key" = i32, Path, description = "Result ID")),
    request_body = UpdateResultRequest,
    responses(
        (status = 200, description = "Result updated", body = StudentEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Result not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload))]
pub async fn update_result(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(key): Path<i32>,
    AppJson(payload): AppJson<UpdateResultRequest>,
) -> Result<Json<StudentEnvelope>, AppError> {
    let model = find_result(&state.db, key).await?;

    let mut doc = ResultDocument::from_model(&model)?;
    doc.apply(payload)?;
    let roll_no = doc.roll_no.clone();

    let mut active = model.into_active_model();
    doc.write_to(&mut active, Utc::now())?;
    let updated = active.update(&state.db).await?;

    audit::record(
        &state.db,
        format!("Principal updated result for rollNo: {roll_no}"),
    )
    .await;

    Ok(Json(StudentEnvelope {
        success: true,
        message: Some("Result updated successfully".into()),
        student: to_student(updated)?,
    }))
}

#[utoipa::path(
    put,
    path = "/{key}/photo",
    tag = "Results",
    operation_id = "replaceResultPhoto",
    summary = "Replace a student's photo",
    description = "Stores the `photo` image part and points the record at it. The previous photo is deleted best-effort.",
    params(("key" = i32, Path, description = "Result ID")),
    request_body(content_type = "multipart/form-data", description = "`photo` image file"),
    responses(
        (status = 200, description = "Photo replaced", body = StudentEnvelope),
        (status = 400, description = "Missing or non-image file (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Result not found (NOT_FOUND)", body = ErrorBody),
        (status = 413, description = "Photo too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, multipart))]
pub async fn replace_photo(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(key): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<StudentEnvelope>, AppError> {
    let model = find_result(&state.db, key).await?;

    let form = read_upload_form(&mut multipart, "photo", state.config.storage.max_photo_size)
        .await?;
    let image = form
        .image
        .ok_or_else(|| AppError::Validation("photo file is required".into()))?;
    let (url, public_id) = store_image(&state, MediaFolder::StudentPhotos, &image).await?;

    let old_public_id = model.photo_public_id.clone();
    let mut active = model.into_active_model();
    active.photo_url = Set(Some(url));
    active.photo_public_id = Set(Some(public_id.clone()));
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    if let Some(old) = old_public_id
        && old != public_id
    {
        release_photo(&state, &old).await;
    }

    Ok(Json(StudentEnvelope {
        success: true,
        message: Some("Photo updated successfully".into()),
        student: to_student(updated)?,
    }))
}

#[utoipa::path(
    delete,
    path = "/{key}",
    tag = "Results",
    operation_id = "deleteResult",
    summary = "Delete a result",
    description = "Deletes the record, then its photo best-effort.",
    params(("key" = i32, Path, description = "Result ID")),
    responses(
        (status = 200, description = "Result deleted", body = MessageEnvelope),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Result not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn delete_result(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(key): Path<i32>,
) -> Result<Json<MessageEnvelope>, AppError> {
    let model = find_result(&state.db, key).await?;

    student_result::Entity::delete_by_id(model.id)
        .exec(&state.db)
        .await?;

    if let Some(public_id) = &model.photo_public_id {
        release_photo(&state, public_id).await;
    }

    audit::record(
        &state.db,
        format!("Principal deleted result for rollNo: {}", model.roll_no),
    )
    .await;

    Ok(Json(MessageEnvelope::ok("Result deleted successfully")))
}

fn not_found() -> AppError {
    AppError::NotFound("Student result not found".into())
}

async fn find_result(db: &DatabaseConnection, id: i32) -> Result<student_result::Model, AppError> {
    student_result::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(not_found)
}

/// Delete a photo unless another record still points at it. Identical
/// uploads share one stored file.
///
/// The count and the delete are not atomic. A create carrying the same bytes
/// that has stored its file but not yet inserted its row is not counted, and
/// can lose the file. Like updates, this is last-write-wins.
async fn release_photo(state: &AppState, public_id: &str) {
    let in_use = student_result::Entity::find()
        .filter(student_result::Column::PhotoPublicId.eq(public_id))
        .count(&state.db)
        .await;
    match in_use {
        Ok(0) => discard_media(state, public_id).await,
        Ok(n) => tracing::debug!(public_id, refs = n, "Photo still referenced, keeping it"),
        Err(e) => tracing::warn!(public_id, "Failed to check photo references: {}", e),
    }
}
