use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::*;
use tracing::instrument;

use crate::audit;
use crate::entity::admin;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    AdminEnvelope, AdminProfile, LoginRequest, LoginResponse, RegisterRequest,
    validate_login_request, validate_register_request,
};
use crate::state::AppState;
use crate::utils::{hash, jwt};

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    operation_id = "registerAdmin",
    summary = "Create another admin account",
    description = "Creates an admin account. Only an existing admin may do this; the first account comes from `auth.bootstrap_admin`.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Admin created", body = AdminEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "User name or email already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(user_name = %payload.user_name))]
pub async fn register(
    _admin: AdminUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let user_name = payload.user_name.trim().to_string();
    let email = payload.email.trim().to_lowercase();

    let taken = admin::Entity::find()
        .filter(
            Condition::any()
                .add(admin::Column::UserName.eq(&user_name))
                .add(admin::Column::Email.eq(&email)),
        )
        .one(&state.db)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(
            "An admin with this user name or email already exists".into(),
        ));
    }

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let new_admin = admin::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        user_name: Set(user_name),
        email: Set(email),
        password: Set(hash),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_admin.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Registration race: unique constraint caught on insert");
            AppError::Conflict("An admin with this user name or email already exists".into())
        }
        _ => AppError::from(e),
    })?;

    Ok((
        StatusCode::CREATED,
        Json(AdminEnvelope {
            success: true,
            message: Some("Admin registered successfully".into()),
            admin: model.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in as an admin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing user name or password (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong user name or password (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_name = %payload.user_name))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let model = admin::Entity::find()
        .filter(admin::Column::UserName.eq(payload.user_name.trim()))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &model.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = jwt::sign(
        model.id,
        &model.user_name,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_hours,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    audit::record(&state.db, "Principal logged in").await;

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".into(),
        token,
        admin: model.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "me",
    summary = "Current admin profile",
    responses(
        (status = 200, description = "Profile of the token's admin", body = AdminEnvelope),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin_user), fields(admin_id = admin_user.admin_id))]
pub async fn me(
    admin_user: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<AdminEnvelope>, AppError> {
    // The account may have been removed after the token was issued.
    let model = admin::Entity::find_by_id(admin_user.admin_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::TokenInvalid)?;

    Ok(Json(AdminEnvelope {
        success: true,
        message: None,
        admin: AdminProfile::from(model),
    }))
}
