use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::ContactStatus;
use common::api::{MessageEnvelope, page_count};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::contact;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::AppJson;
use crate::models::contact::{
    ContactEnvelope, ContactListQuery, ContactPage, ContactRequest, ContactResponse,
    UpdateContactStatusRequest,
};
use crate::models::shared::{PageRequest, escape_like};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/contact",
    tag = "Contact",
    operation_id = "submitContact",
    summary = "Send a message to the school",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Message received", body = ContactEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn submit_contact(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ContactRequest>,
) -> Result<impl IntoResponse, AppError> {
    let req = payload.validated()?;

    let model = contact::ActiveModel {
        name: Set(req.name),
        email: Set(req.email),
        phone: Set(req.phone),
        subject: Set(req.subject),
        message: Set(req.message),
        status: Set(ContactStatus::New),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ContactEnvelope {
            success: true,
            message: "Thank you for contacting us. We will get back to you soon.".into(),
            contact: model.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/contacts",
    tag = "Contact",
    operation_id = "listContacts",
    summary = "Inbox, newest first",
    params(ContactListQuery),
    responses(
        (status = 200, description = "One page of messages", body = ContactPage),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, query))]
pub async fn list_contacts(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ContactListQuery>,
) -> Result<Json<ContactPage>, AppError> {
    let page = PageRequest::resolve(query.page, query.limit, 20);

    let mut select = contact::Entity::find();
    if let Some(status) = query.status {
        select = select.filter(contact::Column::Status.eq(status));
    }
    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            let like = |column: contact::Column| {
                Expr::expr(Func::lower(Expr::col(column)))
                    .like(LikeExpr::new(pattern.clone()).escape('\\'))
            };
            select = select.filter(
                Condition::any()
                    .add(like(contact::Column::Name))
                    .add(like(contact::Column::Email))
                    .add(like(contact::Column::Subject)),
            );
        }
    }

    let total = select
        .clone()
        .paginate(&state.db, page.limit)
        .num_items()
        .await?;

    let contacts: Vec<ContactResponse> = select
        .order_by_desc(contact::Column::CreatedAt)
        .order_by_desc(contact::Column::Id)
        .offset(Some(page.offset()))
        .limit(Some(page.limit))
        .all(&state.db)
        .await?
        .into_iter()
        .map(ContactResponse::from)
        .collect();

    Ok(Json(ContactPage {
        success: true,
        count: contacts.len() as u64,
        total,
        page: page.page,
        pages: page_count(total, page.limit),
        contacts,
    }))
}

#[utoipa::path(
    patch,
    path = "/contacts/{id}",
    tag = "Contact",
    operation_id = "updateContactStatus",
    summary = "Set a message's status",
    params(("id" = i32, Path, description = "Contact ID")),
    request_body = UpdateContactStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ContactEnvelope),
        (status = 400, description = "Unknown status (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Message not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload))]
pub async fn update_contact_status(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateContactStatusRequest>,
) -> Result<Json<ContactEnvelope>, AppError> {
    let model = find_contact(&state.db, id).await?;

    let mut active = model.into_active_model();
    active.status = Set(payload.status);
    let updated = active.update(&state.db).await?;

    Ok(Json(ContactEnvelope {
        success: true,
        message: "Status updated successfully".into(),
        contact: updated.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/contacts/{id}",
    tag = "Contact",
    operation_id = "deleteContact",
    summary = "Delete a message",
    params(("id" = i32, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Message deleted", body = MessageEnvelope),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Message not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn delete_contact(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageEnvelope>, AppError> {
    let model = find_contact(&state.db, id).await?;
    contact::Entity::delete_by_id(model.id)
        .exec(&state.db)
        .await?;
    Ok(Json(MessageEnvelope::ok("Message deleted successfully")))
}

async fn find_contact(db: &DatabaseConnection, id: i32) -> Result<contact::Model, AppError> {
    contact::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Message not found".into()))
}
