use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use crate::entity::activity;

/// Append an entry to the admin activity feed.
///
/// Failures are logged and swallowed; the action being recorded has already
/// happened.
pub async fn record(db: &DatabaseConnection, description: impl Into<String>) {
    let description = description.into();
    let entry = activity::ActiveModel {
        description: Set(description.clone()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    if let Err(e) = entry.insert(db).await {
        tracing::warn!(%description, "Failed to record activity: {}", e);
    }
}
