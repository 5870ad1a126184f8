use crate::error::{ServerError, ServerResult};
use crate::middleware::RequestId;
use crate::state::ServerState;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use handscribe::SampleUpload;
use serde::Serialize;
use std::sync::Arc;

/// Response from a successful submission
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub message: String,
    pub storage_location: String,
}

/// Accept handwriting samples and store the derived style profile.
///
/// Multipart body: a `user_id` (or `userId`) text field plus one or more
/// image file parts. The part names are free-form; the web client sends
/// `alphabet_sample`, `numbers_sample` and `symbols_sample`.
///
/// Resubmitting replaces the previous profile.
pub async fn submit_handwriting(
    State(state): State<Arc<ServerState>>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    mut multipart: Multipart,
) -> ServerResult<impl IntoResponse> {
    let limit_mb = state.config.max_body_size_mb;
    let form_error = |e: MultipartError| multipart_error(e, limit_mb);

    let mut user_id: Option<String> = None;
    let mut samples = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);

        match (name.as_str(), file_name) {
            ("user_id" | "userId", None) => {
                user_id = Some(field.text().await.map_err(form_error)?);
            }
            (_, Some(file_name)) => {
                let bytes = field.bytes().await.map_err(form_error)?;
                if bytes.is_empty() {
                    tracing::debug!(field = %name, "skipping empty upload");
                    continue;
                }
                samples.push(SampleUpload::new(Some(file_name), bytes));
            }
            (other, None) => {
                tracing::debug!(field = %other, "ignoring form field");
            }
        }
    }

    let user_id = user_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ServerError::BadRequest("user_id is required".to_string()))?;
    if samples.is_empty() {
        return Err(ServerError::BadRequest(
            "at least one handwriting sample image is required".to_string(),
        ));
    }

    tracing::info!(
        user_id = %user_id,
        samples = samples.len(),
        "received handwriting samples"
    );

    let receipt = state
        .pipeline
        .submit_samples_for_request(&request_id, &user_id, samples)
        .await?;

    Ok(Json(SubmitResponse {
        message: "Handwriting style analyzed and saved successfully.".to_string(),
        storage_location: receipt.storage_location,
    }))
}

pub(crate) fn multipart_error(err: MultipartError, limit_mb: usize) -> ServerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(limit_mb)
    } else {
        ServerError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}
