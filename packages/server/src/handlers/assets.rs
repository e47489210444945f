use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use common::storage::PublicId;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Serve a stored image by public id. Content addressed, so it can be cached
/// for a long time.
#[instrument(skip(state))]
pub async fn serve_media(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id: PublicId = public_id
        .parse()
        .map_err(|_| AppError::NotFound("Media not found".into()))?;

    let reader = state.media.open(&id).await?;
    let mime = mime_guess::from_ext(id.extension()).first_or_octet_stream();

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError::Internal(e.to_string()))
}
