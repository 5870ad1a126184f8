use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::{ImageFormat, RgbImage};
use serde_json::{json, Value};
use std::io::Cursor;
use std::time::Duration;

use crate::{AnalysisError, StyleEncoder};

/// Remote feature-extraction endpoint.
///
/// Sends `{"images": ["<base64 png>", ...]}` and accepts any of
/// `[[f32]]`, `{"embeddings": [[f32]]}` or `{"data": [{"embedding": [f32]}]}`.
#[derive(Debug, Clone)]
pub struct ApiEncoder {
    client: reqwest::Client,
    url: String,
    auth_header: Option<String>,
    dimension: usize,
}

impl ApiEncoder {
    pub fn new(
        url: impl Into<String>,
        auth_header: Option<String>,
        dimension: usize,
        timeout: Duration,
    ) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AnalysisError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            auth_header,
            dimension,
        })
    }
}

#[async_trait]
impl StyleEncoder for ApiEncoder {
    fn name(&self) -> &str {
        "api"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn encode(&self, images: &[RgbImage]) -> Result<Vec<Vec<f32>>, AnalysisError> {
        if images.is_empty() {
            return Ok(Vec::new());
        }

        let encoded = images
            .iter()
            .map(png_base64)
            .collect::<Result<Vec<_>, _>>()?;
        let payload = json!({ "images": encoded });

        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(header) = self.auth_header.as_deref() {
            request = request.header("Authorization", header);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AnalysisError::Encoder(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Encoder(format!("HTTP error {status}: {body}")));
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|e| AnalysisError::Encoder(format!("Invalid JSON response: {e}")))?;

        parse_embeddings_from_value(value)
    }
}

fn png_base64(image: &RgbImage) -> Result<String, AnalysisError> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| AnalysisError::Encoder(format!("PNG encoding failed: {e}")))?;
    Ok(BASE64.encode(buf.into_inner()))
}

fn parse_embeddings_from_value(value: Value) -> Result<Vec<Vec<f32>>, AnalysisError> {
    match value {
        Value::Object(mut map) => {
            if let Some(embeddings) = map.remove("embeddings") {
                return parse_embedding_collection(embeddings);
            }

            if let Some(Value::Array(items)) = map.remove("data") {
                return items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(mut obj) => match obj.remove("embedding") {
                            Some(embedding) => parse_embedding_vector(embedding),
                            None => Err(AnalysisError::Encoder(
                                "missing `embedding` field in data item".into(),
                            )),
                        },
                        _ => Err(AnalysisError::Encoder(
                            "unexpected entry inside `data` array".into(),
                        )),
                    })
                    .collect();
            }

            Err(AnalysisError::Encoder("unsupported API response shape".into()))
        }
        other => parse_embedding_collection(other),
    }
}

fn parse_embedding_collection(value: Value) -> Result<Vec<Vec<f32>>, AnalysisError> {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                Ok(Vec::new())
            } else if items.iter().all(|item| matches!(item, Value::Array(_))) {
                items.into_iter().map(parse_embedding_vector).collect()
            } else {
                parse_embedding_vector(Value::Array(items)).map(|vec| vec![vec])
            }
        }
        other => parse_embedding_vector(other).map(|vec| vec![vec]),
    }
}

fn parse_embedding_vector(value: Value) -> Result<Vec<f32>, AnalysisError> {
    let Value::Array(values) = value else {
        return Err(AnalysisError::Encoder(format!(
            "embedding vector must be an array, got {value:?}"
        )));
    };
    if values.is_empty() {
        return Err(AnalysisError::Encoder("embedding vector is empty".into()));
    }
    values
        .into_iter()
        .map(|entry| {
            let Value::Number(num) = entry else {
                return Err(AnalysisError::Encoder(format!(
                    "embedding entries must be numbers, got {entry:?}"
                )));
            };
            // Values past f32::MAX turn into infinity on the cast.
            match num.as_f64().map(|f| f as f32) {
                Some(f) if f.is_finite() => Ok(f),
                _ => Err(AnalysisError::Encoder(format!(
                    "embedding value {num} does not fit in f32"
                ))),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use image::Rgb;

    #[test]
    fn parses_nested_arrays() {
        let vectors = parse_embeddings_from_value(json!([[0.1, 0.2], [0.3, 0.4]])).unwrap();
        assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[test]
    fn parses_flat_array_as_single_vector() {
        let vectors = parse_embeddings_from_value(json!([0.5, 0.25])).unwrap();
        assert_eq!(vectors, vec![vec![0.5, 0.25]]);
    }

    #[test]
    fn parses_embeddings_key() {
        let vectors = parse_embeddings_from_value(json!({ "embeddings": [[1.0], [2.0]] })).unwrap();
        assert_eq!(vectors, vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn parses_openai_style_data() {
        let vectors = parse_embeddings_from_value(json!({
            "data": [{ "embedding": [0.5] }, { "embedding": [0.75] }]
        }))
        .unwrap();
        assert_eq!(vectors, vec![vec![0.5], vec![0.75]]);
    }

    #[test]
    fn rejects_unknown_shapes() {
        assert!(parse_embeddings_from_value(json!({ "vectors": [] })).is_err());
        assert!(parse_embeddings_from_value(json!([["a"]])).is_err());
        assert!(parse_embeddings_from_value(json!({ "data": [{ "vec": [1] }] })).is_err());
    }

    #[test]
    fn rejects_empty_and_out_of_range_vectors() {
        assert!(matches!(
            parse_embeddings_from_value(json!([[]])),
            Err(AnalysisError::Encoder(msg)) if msg.contains("empty")
        ));
        assert!(matches!(
            parse_embeddings_from_value(json!({ "embeddings": [[0.5, 1e39]] })),
            Err(AnalysisError::Encoder(msg)) if msg.contains("f32")
        ));
        assert!(parse_embeddings_from_value(json!({ "data": [{ "embedding": [-1e300] }] })).is_err());
    }

    #[tokio::test]
    async fn posts_base64_images_and_reads_vectors() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/embed")
                .header("Authorization", "Bearer token")
                .body_contains("\"images\"");
            then.status(200)
                .json_body(json!({ "embeddings": [[0.1, 0.2, 0.3], [0.3, 0.2, 0.1]] }));
        });

        let encoder = ApiEncoder::new(
            server.url("/embed"),
            Some("Bearer token".into()),
            3,
            Duration::from_secs(5),
        )
        .unwrap();
        let images = vec![
            RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])),
            RgbImage::from_pixel(4, 4, Rgb([255, 255, 255])),
        ];

        let vectors = encoder.encode(&images).await.unwrap();

        mock.assert();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0], vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn http_errors_become_encoder_failures() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/embed");
            then.status(500).body("model crashed");
        });

        let encoder =
            ApiEncoder::new(server.url("/embed"), None, 3, Duration::from_secs(5)).unwrap();
        let err = encoder
            .encode(&[RgbImage::from_pixel(2, 2, Rgb([1, 1, 1]))])
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Encoder(msg) if msg.contains("model crashed")));
    }
}
