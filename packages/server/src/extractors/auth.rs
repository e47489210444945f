use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::error::AppError;
use crate::state::JwtSecret;
use crate::utils::jwt;

/// Authenticated admin extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require an admin session.
pub struct AdminUser {
    pub admin_id: i32,
    pub user_name: String,
}

impl<S> FromRequestParts<S> for AdminUser
where
    JwtSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let JwtSecret(secret) = JwtSecret::from_ref(state);
        let claims = jwt::verify(token, &secret).map_err(|_| AppError::TokenInvalid)?;

        Ok(AdminUser {
            admin_id: claims.uid,
            user_name: claims.sub,
        })
    }
}
