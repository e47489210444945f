use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::admin;
use crate::error::AppError;

/// Request body for creating another admin account.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "R. K. Sharma")]
    pub name: String,
    /// Unique login name (1-32 chars, letters, digits and underscores).
    #[schema(example = "principal")]
    pub user_name: String,
    #[schema(example = "principal@example.org")]
    pub email: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    let user_name = payload.user_name.trim();
    if user_name.is_empty() || user_name.chars().count() > 32 {
        return Err(AppError::Validation(
            "User name must be 1-32 characters".into(),
        ));
    }
    if !user_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::Validation(
            "User name must contain only letters, digits, and underscores".into(),
        ));
    }
    if !payload.email.contains('@') {
        return Err(AppError::Validation("Email is invalid".into()));
    }
    if payload.password.len() < 8 || payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "principal")]
    pub user_name: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.user_name.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Please provide user name and password".into(),
        ));
    }
    Ok(())
}

/// Admin account as shown to clients. The password hash is never included.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    #[schema(example = 1)]
    pub id: i32,
    pub name: String,
    #[schema(example = "principal")]
    pub user_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<admin::Model> for AdminProfile {
    fn from(admin: admin::Model) -> Self {
        Self {
            id: admin.id,
            name: admin.name,
            user_name: admin.user_name,
            email: admin.email,
            created_at: admin.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    #[schema(example = "Login successful")]
    pub message: String,
    /// Bearer token for admin routes.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub admin: AdminProfile,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub admin: AdminProfile,
}
