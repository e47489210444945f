use chrono::Utc;
use sea_orm::*;
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::entity::admin;
use crate::utils::hash;

/// Create the configured bootstrap admin when the admin table is empty.
///
/// Returns `true` if an account was created.
pub async fn seed_bootstrap_admin(
    db: &DatabaseConnection,
    auth: &AuthConfig,
) -> anyhow::Result<bool> {
    if admin::Entity::find().count(db).await? > 0 {
        return Ok(false);
    }

    let Some(bootstrap) = &auth.bootstrap_admin else {
        warn!("No admin accounts exist and auth.bootstrap_admin is not set; nobody can log in");
        return Ok(false);
    };

    let password = hash::hash_password(&bootstrap.password)
        .map_err(|e| anyhow::anyhow!("Password hash error: {e}"))?;

    let model = admin::ActiveModel {
        name: Set(bootstrap.name.trim().to_string()),
        user_name: Set(bootstrap.user_name.trim().to_string()),
        email: Set(bootstrap.email.trim().to_lowercase()),
        password: Set(password),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = admin::Entity::insert(model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(admin::Column::UserName)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(0) | Err(DbErr::RecordNotInserted) => Ok(false),
        Ok(_) => {
            info!(user_name = %bootstrap.user_name, "Created bootstrap admin");
            Ok(true)
        }
        Err(e) => Err(e.into()),
    }
}
