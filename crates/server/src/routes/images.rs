use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::IntoResponse;
use std::io;
use std::sync::Arc;

/// Serve a previously generated image by file name.
///
/// Names that could escape the image directory are treated as missing.
pub async fn generated_image(
    State(state): State<Arc<ServerState>>,
    Path(file_name): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let path = state
        .pipeline
        .images()
        .path_for(&file_name)
        .ok_or(ServerError::NotFound)?;

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ServerError::NotFound),
        Err(e) => {
            return Err(ServerError::Internal(format!(
                "reading generated image {file_name}: {e}"
            )))
        }
    };

    // File names embed a unique timestamp, so content never changes.
    Ok((
        [
            (CONTENT_TYPE, "image/png"),
            (CACHE_CONTROL, "public, max-age=86400, immutable"),
        ],
        bytes,
    ))
}
