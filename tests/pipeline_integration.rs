//! End-to-end pipeline runs against stub capabilities and a mocked remote
//! generation service.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use handscribe::{
    ErrorKind, GenerationConfig, Pipeline, PipelineConfig, SampleUpload, Tier,
};
use httpmock::prelude::*;
use image::{ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;

fn png_sample(seed: u8) -> Vec<u8> {
    let img = RgbImage::from_fn(24, 24, |x, y| {
        let v = (x as u8).wrapping_mul(seed).wrapping_add(y as u8);
        Rgb([v, v / 2, 255 - v])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn three_samples() -> Vec<SampleUpload> {
    ["alphabet_sample.png", "numbers_sample.png", "symbols_sample.png"]
        .iter()
        .enumerate()
        .map(|(i, name)| SampleUpload::new(Some(name.to_string()), png_sample(i as u8 + 3)))
        .collect()
}

struct Fixture {
    data: TempDir,
    scratch: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            data: TempDir::new().unwrap(),
            scratch: TempDir::new().unwrap(),
        }
    }

    fn config(&self, generation: GenerationConfig) -> PipelineConfig {
        let mut config = PipelineConfig {
            data_dir: self.data.path().to_path_buf(),
            scratch_dir: Some(self.scratch.path().to_path_buf()),
            generation,
            ..Default::default()
        };
        config.encoder.dimension = 32;
        config
    }

    fn stub_pipeline(&self) -> Pipeline {
        let generation = GenerationConfig {
            stub_width: 64,
            stub_height: 64,
            ..Default::default()
        };
        Pipeline::from_config(&self.config(generation)).unwrap()
    }

    fn remote_pipeline(&self, server: &MockServer) -> Pipeline {
        let generation = GenerationConfig {
            mode: "remote".into(),
            remote_url: Some(server.base_url()),
            remote_timeout_secs: 5,
            ..Default::default()
        };
        Pipeline::from_config(&self.config(generation)).unwrap()
    }

    fn generated_dir(&self) -> std::path::PathBuf {
        self.data.path().join("generated_images")
    }
}

fn entries(dir: &Path) -> usize {
    fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

#[tokio::test]
async fn alice_submits_then_generates_and_bob_is_not_found() {
    let fx = Fixture::new();
    let pipeline = fx.stub_pipeline();

    let receipt = pipeline.submit_samples("alice", three_samples()).await.unwrap();
    let profile_path = fx.data.path().join("profiles").join("alice_style.json");
    assert_eq!(receipt.storage_location, profile_path.display().to_string());

    let stored: serde_json::Value =
        serde_json::from_slice(&fs::read(&profile_path).unwrap()).unwrap();
    assert_eq!(stored["style_embedding"].as_array().unwrap().len(), 32);
    assert_eq!(stored["version"], "1.1-ip-adapter-ready");

    let image = pipeline
        .generate("alice", "hello world", Tier::Standard)
        .await
        .unwrap();
    assert!(image.file_name.starts_with("alice_generated_"));
    assert_eq!(image.path.parent().unwrap(), fx.generated_dir());
    let decoded = image::load_from_memory(&fs::read(&image.path).unwrap()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (64, 64));
    assert_eq!(pipeline.images().path_for(&image.file_name), Some(image.path));

    let err = pipeline
        .generate("bob", "hello world", Tier::Standard)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn scratch_space_is_released_on_success_and_failure() {
    let fx = Fixture::new();
    let pipeline = fx.stub_pipeline();

    pipeline.submit_samples("alice", three_samples()).await.unwrap();
    assert_eq!(entries(fx.scratch.path()), 0);

    let garbage = vec![
        SampleUpload::new(Some("ok.png".into()), png_sample(1)),
        SampleUpload::new(Some("broken.png".into()), b"definitely not an image".to_vec()),
    ];
    let err = pipeline.submit_samples("carol", garbage).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AnalysisFailure);
    assert_eq!(entries(fx.scratch.path()), 0);

    // A failed extraction must not leave a profile behind either.
    let err = pipeline.generate("carol", "hi", Tier::Standard).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn resubmission_replaces_the_profile() {
    let fx = Fixture::new();
    let pipeline = fx.stub_pipeline();
    let user = handscribe::UserId::parse("alice").unwrap();

    pipeline.submit_samples("alice", three_samples()).await.unwrap();
    let first = pipeline.store().load(&user).unwrap();

    pipeline
        .submit_samples("alice", vec![SampleUpload::new(None, png_sample(99))])
        .await
        .unwrap();
    let second = pipeline.store().load(&user).unwrap();

    assert_eq!(first.dimension(), second.dimension());
    assert_ne!(first.embedding, second.embedding);
}

#[tokio::test]
async fn rejects_bad_input_before_doing_work() {
    let fx = Fixture::new();
    let pipeline = fx.stub_pipeline();

    let err = pipeline.submit_samples("alice", Vec::new()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);

    let err = pipeline
        .submit_samples("../../etc", three_samples())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);

    pipeline.submit_samples("alice", three_samples()).await.unwrap();
    let err = pipeline.generate("alice", "   ", Tier::Premium).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    assert_eq!(entries(&fx.generated_dir()), 0);
}

#[tokio::test]
async fn remote_generation_forwards_tier_and_stores_the_image() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/generate")
            .body_contains("\"prompt\":\"hello world\"")
            .body_contains("\"is_premium\":true")
            .body_contains("\"style_embedding\"");
        then.status(200)
            .header("content-type", "image/png")
            .body(png_sample(7));
    });

    let fx = Fixture::new();
    let pipeline = fx.remote_pipeline(&server);
    pipeline.submit_samples("alice", three_samples()).await.unwrap();

    let image = pipeline
        .generate("alice", "hello world", Tier::Premium)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(fs::read(&image.path).unwrap(), png_sample(7));
}

#[tokio::test]
async fn remote_failure_leaves_no_image_behind() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/generate");
        then.status(400)
            .json_body(serde_json::json!({ "detail": "Style embedding not found in profile." }));
    });

    let fx = Fixture::new();
    let pipeline = fx.remote_pipeline(&server);
    pipeline.submit_samples("alice", three_samples()).await.unwrap();

    let err = pipeline
        .generate("alice", "hello world", Tier::Standard)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RemoteError);
    assert!(err.to_string().contains("Style embedding not found in profile."));
    assert_eq!(entries(&fx.generated_dir()), 0);
}
