use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use common::student::loose_bool;
use serde::Serialize;

use crate::entity::announcement;
use crate::error::AppError;
use crate::models::shared::{max_chars, required};

/// Fields of a new announcement, read from multipart text parts.
#[derive(Debug, PartialEq)]
pub struct NewAnnouncement {
    pub title: String,
    pub description: String,
    pub is_important: bool,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl NewAnnouncement {
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, AppError> {
        let get = |key: &str| fields.get(key).map(String::as_str).unwrap_or_default();

        let title = required("title", get("title"))?;
        max_chars("title", &title, 256)?;
        let description = required("description", get("description"))?;

        Ok(Self {
            title,
            description,
            is_important: loose_bool(get("isImportant")),
            expiry_date: parse_expiry(get("expiryDate").trim())?,
        })
    }
}

/// A bare date expires at the end of that day (UTC).
fn parse_expiry(raw: &str) -> Result<Option<DateTime<Utc>>, AppError> {
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default();
        return Ok(Some(date.and_time(end_of_day).and_utc()));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|_| AppError::Validation("expiryDate must be a date (YYYY-MM-DD)".into()))
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementResponse {
    pub id: i32,
    #[schema(example = "School closed on Friday")]
    pub title: String,
    pub description: String,
    pub attachment_url: Option<String>,
    pub is_important: bool,
    pub expiry_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<announcement::Model> for AnnouncementResponse {
    fn from(a: announcement::Model) -> Self {
        Self {
            id: a.id,
            title: a.title,
            description: a.description,
            attachment_url: a.attachment_url,
            is_important: a.is_important,
            expiry_date: a.expiry_date,
            is_active: a.is_active,
            created_at: a.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AnnouncementListResponse {
    pub success: bool,
    pub count: usize,
    pub announcements: Vec<AnnouncementResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AnnouncementEnvelope {
    pub success: bool,
    pub message: String,
    pub announcement: AnnouncementResponse,
}
