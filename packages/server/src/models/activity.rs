use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::activity;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityQuery {
    /// Number of entries, 1-100. Default 20.
    pub limit: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub id: i32,
    #[schema(example = "Principal uploaded result for rollNo: 8A028")]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<activity::Model> for ActivityResponse {
    fn from(a: activity::Model) -> Self {
        Self {
            id: a.id,
            description: a.description,
            created_at: a.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ActivityListResponse {
    pub success: bool,
    pub count: usize,
    pub activities: Vec<ActivityResponse>,
}
