//! Response envelopes shared by the server and its clients.
//!
//! Every response, success or failure, carries `success` so clients can branch
//! on it instead of the HTTP status alone.

use serde::{Deserialize, Serialize};

use crate::student::StudentResult;

/// `{success, message?, student}` for single-record responses.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StudentEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub student: StudentResult,
}

/// Paged result listing.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ResultPage {
    pub success: bool,
    /// Number of records on this page.
    #[schema(example = 10)]
    pub count: u64,
    /// Number of records matching the filter.
    #[schema(example = 47)]
    pub total: u64,
    /// Current page, 1-based.
    #[schema(example = 1)]
    pub page: u64,
    /// `ceil(total / limit)`.
    #[schema(example = 5)]
    pub pages: u64,
    pub results: Vec<StudentResult>,
}

/// Body of a response that carries only a status message.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageEnvelope {
    pub success: bool,
    #[schema(example = "Result deleted successfully")]
    pub message: String,
}

impl MessageEnvelope {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Error body returned with every non-2xx status.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    /// Machine-readable error code.
    #[schema(example = "NOT_FOUND")]
    pub code: String,
    #[schema(example = "Student result not found")]
    pub message: String,
    /// Underlying error detail, present only in development mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Number of pages needed for `total` items at `limit` per page.
pub fn page_count(total: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}
