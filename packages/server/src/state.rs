use std::sync::Arc;

use axum::extract::FromRef;
use common::storage::MediaStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub media: Arc<dyn MediaStore>,
}

/// Signing secret, extracted by [`crate::extractors::auth::AdminUser`].
#[derive(Clone)]
pub struct JwtSecret(pub Arc<str>);

impl FromRef<AppState> for JwtSecret {
    fn from_ref(state: &AppState) -> Self {
        JwtSecret(Arc::from(state.config.auth.jwt_secret.as_str()))
    }
}
