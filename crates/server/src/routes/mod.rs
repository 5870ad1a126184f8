//! API route handlers
//!
//! - `health`: liveness and Prometheus metrics
//! - `samples`: handwriting sample submission
//! - `generate`: handwriting generation
//! - `images`: generated image downloads

pub mod generate;
pub mod health;
pub mod images;
pub mod samples;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// Returns server information including version and available endpoints.
///
/// # Response
///
/// ```json
/// {
///   "name": "Handscribe Server",
///   "version": "0.1.0",
///   "message": "Handscribe backend is running.",
///   "endpoints": ["..."]
/// }
/// ```
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Handscribe Server",
        "version": env!("CARGO_PKG_VERSION"),
        "message": "Handscribe backend is running.",
        "endpoints": [
            "/api/submit-handwriting",
            "/api/generate",
            "/generated_images/{file}",
            "/health",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
