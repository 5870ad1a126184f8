use crate::error::{ServerError, ServerResult};
use crate::routes::samples::multipart_error;
use crate::state::ServerState;
use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::{Form, Json};
use handscribe::Tier;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Generation form fields. Unknown fields (the web client's `style`) are
/// ignored.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateForm {
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    /// `standard` or `premium`; wins over `is_premium`
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default, alias = "isPremium")]
    pub is_premium: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub image_url: String,
}

/// Render a prompt in the caller's stored handwriting style.
///
/// Accepts `multipart/form-data` (what the web client sends) or
/// `application/x-www-form-urlencoded`.
pub async fn generate_image(
    State(state): State<Arc<ServerState>>,
    request: Request,
) -> ServerResult<impl IntoResponse> {
    let form = if is_multipart(request.headers()) {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| ServerError::BadRequest(e.body_text()))?;
        read_multipart(multipart, state.config.max_body_size_mb).await?
    } else {
        let Form(form) = Form::<GenerateForm>::from_request(request, &state)
            .await
            .map_err(|e| ServerError::BadRequest(e.body_text()))?;
        form
    };

    let user_id = form
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ServerError::BadRequest("user_id is required".to_string()))?;
    let prompt = form
        .prompt
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest("prompt is required".to_string()))?;
    let tier = resolve_tier(form.tier.as_deref(), form.is_premium.as_deref())?;

    tracing::info!(user_id = %user_id, tier = %tier, "generation requested");

    let image = state.pipeline.generate(user_id, prompt, tier).await?;

    Ok(Json(GenerateResponse {
        image_url: state.image_url(&image.file_name),
    }))
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

async fn read_multipart(mut multipart: Multipart, limit_mb: usize) -> ServerResult<GenerateForm> {
    let form_error = |e: MultipartError| multipart_error(e, limit_mb);
    let mut form = GenerateForm::default();

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let slot = match name.as_str() {
            "user_id" | "userId" => &mut form.user_id,
            "prompt" => &mut form.prompt,
            "tier" => &mut form.tier,
            "is_premium" | "isPremium" => &mut form.is_premium,
            _ => continue,
        };
        *slot = Some(field.text().await.map_err(form_error)?);
    }

    Ok(form)
}

/// An explicit `tier` wins; otherwise `is_premium` picks premium.
pub(crate) fn resolve_tier(tier: Option<&str>, is_premium: Option<&str>) -> ServerResult<Tier> {
    if let Some(tier) = tier.map(str::trim).filter(|t| !t.is_empty()) {
        return tier
            .parse::<Tier>()
            .map_err(|e| ServerError::BadRequest(e.to_string()));
    }
    let premium = match is_premium.map(str::trim) {
        None | Some("") => false,
        Some(flag) => parse_flag(flag)?,
    };
    Ok(Tier::from_premium_flag(premium))
}

fn parse_flag(value: &str) -> ServerResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ServerError::BadRequest(format!(
            "is_premium must be a boolean, got '{other}'"
        ))),
    }
}
