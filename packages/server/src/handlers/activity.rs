use axum::Json;
use axum::extract::{Query, State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::activity;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::models::activity::{ActivityListResponse, ActivityQuery, ActivityResponse};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Activity",
    operation_id = "listActivity",
    summary = "Recent admin activity, newest first",
    params(ActivityQuery),
    responses(
        (status = 200, description = "Activity entries", body = ActivityListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn list_activity(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityListResponse>, AppError> {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let activities: Vec<ActivityResponse> = activity::Entity::find()
        .order_by_desc(activity::Column::CreatedAt)
        .order_by_desc(activity::Column::Id)
        .limit(limit)
        .all(&state.db)
        .await?
        .into_iter()
        .map(ActivityResponse::from)
        .collect();

    Ok(Json(ActivityListResponse {
        success: true,
        count: activities.len(),
        activities,
    }))
}
