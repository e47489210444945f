use chrono::{DateTime, Utc};
use common::ContactStatus;
use serde::{Deserialize, Serialize};

use crate::entity::contact;
use crate::error::AppError;
use crate::models::shared::{max_chars, required};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ContactRequest {
    #[schema(example = "Meera Iyer")]
    pub name: String,
    #[schema(example = "meera@example.org")]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[schema(example = "Admission enquiry")]
    pub subject: String,
    pub message: String,
}

impl ContactRequest {
    /// Trimmed copy, or the first validation failure.
    pub fn validated(self) -> Result<Self, AppError> {
        let name = required("name", &self.name)?;
        let email = required("email", &self.email)?;
        if !email.contains('@') {
            return Err(AppError::Validation("email is invalid".into()));
        }
        let subject = required("subject", &self.subject)?;
        let message = required("message", &self.message)?;
        max_chars("subject", &subject, 256)?;
        max_chars("message", &message, 5000)?;

        Ok(Self {
            name,
            email,
            phone: self
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            subject,
            message,
        })
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContactListQuery {
    pub status: Option<ContactStatus>,
    /// Case-insensitive substring of name, email or subject.
    pub search: Option<String>,
    pub page: Option<u64>,
    /// Page size, 1-100. Default 20.
    pub limit: Option<u64>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateContactStatusRequest {
    pub status: ContactStatus,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
}

impl From<contact::Model> for ContactResponse {
    fn from(c: contact::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
            subject: c.subject,
            message: c.message,
            status: c.status,
            created_at: c.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContactEnvelope {
    pub success: bool,
    pub message: String,
    pub contact: ContactResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContactPage {
    pub success: bool,
    pub count: u64,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
    pub contacts: Vec<ContactResponse>,
}
