use async_trait::async_trait;
use bytes::Bytes;
use profile::StyleProfile;
use prompt::PromptBundle;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::{GenerationCapability, GenerationError};

/// Wire body of `POST {endpoint}/generate`.
#[derive(Debug, Serialize)]
pub struct RemoteRequest<'a> {
    pub style_profile: &'a StyleProfile,
    pub prompt: &'a str,
    pub is_premium: bool,
}

/// Delegates generation to an inference service. The response body is the
/// image.
#[derive(Debug, Clone)]
pub struct RemoteGenerator {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteGenerator {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GenerationError> {
        let base = base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(GenerationError::InvalidConfig(
                "remote generation needs a service URL".into(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GenerationError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{base}/generate"),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationCapability for RemoteGenerator {
    fn name(&self) -> &str {
        "remote"
    }

    async fn generate(
        &self,
        profile: &StyleProfile,
        bundle: &PromptBundle,
    ) -> Result<Bytes, GenerationError> {
        // The service applies its own templates, so it gets the raw text.
        let body = RemoteRequest {
            style_profile: profile,
            prompt: &bundle.text,
            is_premium: bundle.tier.is_premium(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                endpoint = %self.endpoint,
                "generation service rejected request"
            );
            return Err(GenerationError::RemoteError {
                status: status.as_u16(),
                detail: error_detail(&text),
            });
        }

        let image = response.bytes().await.map_err(unavailable)?;
        if image.is_empty() {
            return Err(GenerationError::RemoteError {
                status: status.as_u16(),
                detail: "generation service returned an empty body".into(),
            });
        }
        Ok(image)
    }
}

fn unavailable(err: reqwest::Error) -> GenerationError {
    let reason = if err.is_timeout() {
        format!("timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    GenerationError::RemoteUnavailable(reason)
}

/// `{"detail": "..."}` when the service sends it, else the raw body.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(detail)) => detail.clone(),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        _ => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use profile::PROFILE_VERSION;
    use prompt::{PromptPolicy, Tier};
    use serde_json::json;

    fn generator(server: &MockServer) -> RemoteGenerator {
        RemoteGenerator::new(&server.base_url(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn posts_profile_prompt_and_premium_flag() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/generate").json_body(json!({
                "style_profile": {
                    "style_embedding": vec![0.5f32; 600],
                    "version": PROFILE_VERSION,
                },
                "prompt": "hello world",
                "is_premium": true,
            }));
            then.status(200)
                .header("content-type", "image/png")
                .body(b"\x89PNG fake bytes");
        });

        let profile = StyleProfile::new(vec![0.5; 600]);
        let bundle = PromptPolicy::default().build("hello world", Tier::Premium);
        let bytes = generator(&server).generate(&profile, &bundle).await.unwrap();

        mock.assert();
        assert_eq!(&bytes[..], b"\x89PNG fake bytes");
    }

    #[tokio::test]
    async fn non_success_keeps_status_and_detail() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/generate");
            then.status(400)
                .json_body(serde_json::json!({ "detail": "Style embedding not found in profile." }));
        });

        let bundle = PromptPolicy::default().build("x", Tier::Standard);
        let err = generator(&server)
            .generate(&StyleProfile::new(vec![0.1]), &bundle)
            .await
            .unwrap_err();

        match err {
            GenerationError::RemoteError { status, detail } => {
                assert_eq!(status, 400);
                assert_eq!(detail, "Style embedding not found in profile.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn plain_text_error_body_is_the_detail() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/generate");
            then.status(500).body("worker crashed");
        });

        let bundle = PromptPolicy::default().build("x", Tier::Standard);
        let err = generator(&server)
            .generate(&StyleProfile::new(vec![0.1]), &bundle)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::RemoteError { status: 500, ref detail } if detail == "worker crashed"
        ));
    }

    #[tokio::test]
    async fn unreachable_service_is_unavailable() {
        // Nothing listens on the discard port.
        let generator = RemoteGenerator::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let bundle = PromptPolicy::default().build("x", Tier::Standard);
        let err = generator
            .generate(&StyleProfile::new(vec![0.1]), &bundle)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::RemoteUnavailable(_)));
    }

    #[tokio::test]
    async fn slow_service_times_out_as_unavailable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/generate");
            then.status(200)
                .delay(Duration::from_millis(500))
                .body("late");
        });

        let generator =
            RemoteGenerator::new(&server.base_url(), Duration::from_millis(100)).unwrap();
        let bundle = PromptPolicy::default().build("x", Tier::Standard);
        let err = generator
            .generate(&StyleProfile::new(vec![0.1]), &bundle)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::RemoteUnavailable(_)));
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let generator =
            RemoteGenerator::new("https://gen.example.com/", Duration::from_secs(1)).unwrap();
        assert_eq!(generator.endpoint(), "https://gen.example.com/generate");
        assert!(RemoteGenerator::new("  ", Duration::from_secs(1)).is_err());
    }
}
