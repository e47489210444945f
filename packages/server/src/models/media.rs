use chrono::{DateTime, Utc};
use common::MediaType;
use serde::{Deserialize, Serialize};

use crate::entity::media;

#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MediaListQuery {
    /// Only items of this type (`banner`, `gallery` or `event`).
    pub media_type: Option<MediaType>,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaResponse {
    #[schema(example = 4)]
    pub id: i32,
    #[schema(example = "Annual Day 2024")]
    pub title: String,
    pub media_type: MediaType,
    pub image_url: String,
    pub public_id: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<media::Model> for MediaResponse {
    fn from(m: media::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            media_type: m.media_type,
            image_url: m.image_url,
            public_id: m.public_id,
            uploaded_at: m.uploaded_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MediaListResponse {
    pub success: bool,
    pub count: usize,
    pub media: Vec<MediaResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MediaEnvelope {
    pub success: bool,
    #[schema(example = "Media uploaded successfully")]
    pub message: String,
    pub media: MediaResponse,
}
