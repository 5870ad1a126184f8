use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use generation::Orchestrator;
use profile::{ProfileStore, UserId};
use prompt::{PromptPolicy, Tier};
use serde::Serialize;
use style::{AnalysisError, StyleExtractor};
use tempfile::TempDir;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::images::{GeneratedImageRef, ImageStore};

/// One uploaded handwriting sample.
#[derive(Debug, Clone)]
pub struct SampleUpload {
    /// Client-supplied file name, if any. Only used to name the scratch file.
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

impl SampleUpload {
    pub fn new(file_name: Option<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name,
            bytes: bytes.into(),
        }
    }
}

/// Result of a successful sample submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub storage_location: String,
    /// Id the submission was logged and staged under.
    pub request_id: String,
}

/// Submission and generation, wired to injected capabilities.
pub struct Pipeline {
    store: Arc<dyn ProfileStore>,
    extractor: StyleExtractor,
    policy: PromptPolicy,
    orchestrator: Orchestrator,
    images: ImageStore,
    scratch_dir: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        extractor: StyleExtractor,
        policy: PromptPolicy,
        orchestrator: Orchestrator,
        images: ImageStore,
    ) -> Self {
        Self {
            store,
            extractor,
            policy,
            orchestrator,
            images,
            scratch_dir: None,
        }
    }

    /// Put per-request sample scratch directories under `dir` instead of
    /// the system temp dir.
    pub fn with_scratch_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Construct every capability named by `config`. Any failure here is a
    /// startup failure.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let store = config.store_config()?.build()?;
        let extractor = StyleExtractor::new(config.encoder.build()?);
        let policy = PromptPolicy::new(config.tiers.table()?)?;
        let orchestrator = Orchestrator::new(config.generation.build()?);
        let images = ImageStore::open(&config.data_dir).map_err(|e| {
            PipelineError::io(
                format!("creating image directory under {}", config.data_dir.display()),
                e,
            )
        })?;

        tracing::info!(
            data_dir = %config.data_dir.display(),
            store = %config.store,
            encoder = extractor.encoder().name(),
            generation = orchestrator.capability().name(),
            "pipeline ready"
        );

        let pipeline = Self::new(store, extractor, policy, orchestrator, images);
        Ok(match &config.scratch_dir {
            Some(dir) => pipeline.with_scratch_dir(dir),
            None => pipeline,
        })
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn policy(&self) -> &PromptPolicy {
        &self.policy
    }

    pub fn store(&self) -> &Arc<dyn ProfileStore> {
        &self.store
    }

    /// Derive a style profile from `samples` and store it for `user_id`,
    /// replacing any previous one.
    ///
    /// Uploads are staged in a scratch directory that is removed before this
    /// returns, on every path.
    pub async fn submit_samples(
        &self,
        user_id: &str,
        samples: Vec<SampleUpload>,
    ) -> Result<SubmissionReceipt, PipelineError> {
        let request_id = uuid::Uuid::new_v4().simple().to_string();
        self.submit_samples_for_request(&request_id, user_id, samples)
            .await
    }

    /// [`submit_samples`](Self::submit_samples) under a caller-supplied
    /// request id, such as the one an HTTP layer already logs with.
    ///
    /// The id is reduced to `[A-Za-z0-9_-]` before it is used in file names.
    pub async fn submit_samples_for_request(
        &self,
        request_id: &str,
        user_id: &str,
        samples: Vec<SampleUpload>,
    ) -> Result<SubmissionReceipt, PipelineError> {
        let request_id = sanitize_request_id(request_id);
        let result = self.submit_inner(request_id, user_id, samples).await;
        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!("handscribe_submissions_total", "outcome" => outcome).increment(1);
        result
    }

    async fn submit_inner(
        &self,
        request_id: String,
        user_id: &str,
        samples: Vec<SampleUpload>,
    ) -> Result<SubmissionReceipt, PipelineError> {
        let user_id = UserId::parse(user_id)?;
        if samples.is_empty() {
            return Err(AnalysisError::NoSamples.into());
        }

        let scratch = self.scratch()?;
        let paths = write_samples(scratch.path(), &request_id, &samples).await?;

        let extracted = self.extractor.extract(&paths).await;
        if let Err(e) = scratch.close() {
            tracing::warn!(%user_id, %request_id, error = %e, "failed to remove sample scratch directory");
        }
        let profile = extracted?;

        let store = Arc::clone(&self.store);
        let owner = user_id.clone();
        let profile = blocking("saving style profile", move || {
            store.save(&owner, &profile)?;
            Ok(profile)
        })
        .await?;
        let storage_location = self.store.location(&user_id);

        tracing::info!(
            %user_id,
            %request_id,
            samples = samples.len(),
            dimension = profile.dimension(),
            location = %storage_location,
            "style profile saved"
        );

        Ok(SubmissionReceipt {
            storage_location,
            request_id,
        })
    }

    /// Render `prompt` in the stored handwriting of `user_id` and persist the
    /// image.
    pub async fn generate(
        &self,
        user_id: &str,
        prompt: &str,
        tier: Tier,
    ) -> Result<GeneratedImageRef, PipelineError> {
        let start = Instant::now();
        let result = self.generate_inner(user_id, prompt, tier).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(err) => err.kind().as_str(),
        };
        metrics::counter!(
            "handscribe_generations_total",
            "tier" => tier.as_str(),
            "outcome" => outcome
        )
        .increment(1);
        metrics::histogram!("handscribe_generation_seconds", "tier" => tier.as_str())
            .record(start.elapsed().as_secs_f64());

        result
    }

    async fn generate_inner(
        &self,
        user_id: &str,
        prompt: &str,
        tier: Tier,
    ) -> Result<GeneratedImageRef, PipelineError> {
        let user_id = UserId::parse(user_id)?;
        if prompt.trim().is_empty() {
            return Err(PipelineError::InvalidRequest("prompt must not be empty".into()));
        }

        let store = Arc::clone(&self.store);
        let owner = user_id.clone();
        let profile = blocking("loading style profile", move || Ok(store.load(&owner)?)).await?;
        let bundle = self.policy.build(prompt, tier);
        let png = self.orchestrator.generate(&profile, &bundle).await?;

        let images = self.images.clone();
        let owner = user_id.clone();
        let image = blocking("writing generated image", move || {
            images
                .persist(&owner, &png)
                .map_err(|e| PipelineError::io("writing generated image", e))
        })
        .await?;

        tracing::info!(
            %user_id,
            tier = %tier,
            steps = bundle.inference_steps,
            scale = bundle.style_scale,
            file = %image.file_name,
            "generated image stored"
        );

        Ok(image)
    }

    fn scratch(&self) -> Result<TempDir, PipelineError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("handscribe-samples-");
        let scratch = match &self.scratch_dir {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        };
        scratch.map_err(|e| PipelineError::io("creating sample scratch directory", e))
    }
}

/// Run filesystem-bound work on the blocking pool.
async fn blocking<T, F>(context: &'static str, work: F) -> Result<T, PipelineError>
where
    F: FnOnce() -> Result<T, PipelineError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PipelineError::io(context, std::io::Error::other(e.to_string())))?
}

async fn write_samples(
    dir: &Path,
    request_id: &str,
    samples: &[SampleUpload],
) -> Result<Vec<PathBuf>, PipelineError> {
    let mut paths = Vec::with_capacity(samples.len());
    for (index, sample) in samples.iter().enumerate() {
        let name = sanitize_file_name(sample.file_name.as_deref());
        let path = dir.join(format!("{request_id}_{index}_{name}"));
        tokio::fs::write(&path, &sample.bytes)
            .await
            .map_err(|e| PipelineError::io("staging sample upload", e))?;
        paths.push(path);
    }
    Ok(paths)
}

fn sanitize_request_id(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .take(64)
        .collect();
    if cleaned.is_empty() {
        uuid::Uuid::new_v4().simple().to_string()
    } else {
        cleaned
    }
}

/// Last path component, restricted to `[A-Za-z0-9._-]`.
fn sanitize_file_name(raw: Option<&str>) -> String {
    let base = raw
        .unwrap_or_default()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(100)
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "sample".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread::{self, ThreadId};

    use generation::GenerationConfig;
    use profile::{InMemoryProfileStore, StoreError, StyleProfile};
    use prompt::TierTable;
    use style::StubEncoder;

    /// Remembers which thread each store call ran on.
    #[derive(Default)]
    struct ThreadRecordingStore {
        inner: InMemoryProfileStore,
        threads: Mutex<Vec<ThreadId>>,
    }

    impl ThreadRecordingStore {
        fn record(&self) {
            self.threads.lock().unwrap().push(thread::current().id());
        }
    }

    impl ProfileStore for ThreadRecordingStore {
        fn save(&self, user_id: &UserId, profile: &StyleProfile) -> Result<(), StoreError> {
            self.record();
            self.inner.save(user_id, profile)
        }

        fn load(&self, user_id: &UserId) -> Result<StyleProfile, StoreError> {
            self.record();
            self.inner.load(user_id)
        }

        fn location(&self, user_id: &UserId) -> String {
            self.inner.location(user_id)
        }
    }

    fn pipeline(store: Arc<dyn ProfileStore>, data: &Path) -> Pipeline {
        let generation = GenerationConfig {
            stub_width: 16,
            stub_height: 16,
            ..Default::default()
        };
        Pipeline::new(
            store,
            StyleExtractor::new(Arc::new(StubEncoder::new(8))),
            PromptPolicy::new(TierTable::default()).unwrap(),
            Orchestrator::new(generation.build().unwrap()),
            ImageStore::open(data).unwrap(),
        )
        .with_scratch_dir(data)
    }

    fn sample() -> SampleUpload {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([40, 80, 120]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        SampleUpload::new(Some("scan.png".into()), buf.into_inner())
    }

    #[tokio::test]
    async fn store_io_runs_off_the_calling_thread() {
        let data = tempfile::tempdir().unwrap();
        let store = Arc::new(ThreadRecordingStore::default());
        let pipeline = pipeline(store.clone(), data.path());

        pipeline.submit_samples("alice", vec![sample()]).await.unwrap();
        pipeline
            .generate("alice", "hello", Tier::Standard)
            .await
            .unwrap();

        let caller = thread::current().id();
        let threads = store.threads.lock().unwrap();
        assert_eq!(threads.len(), 2);
        assert!(threads.iter().all(|id| *id != caller));
    }

    #[tokio::test]
    async fn caller_request_id_is_kept_and_made_file_safe() {
        let data = tempfile::tempdir().unwrap();
        let pipeline = pipeline(Arc::new(InMemoryProfileStore::new()), data.path());

        let receipt = pipeline
            .submit_samples_for_request("req/../42!", "alice", vec![sample()])
            .await
            .unwrap();
        assert_eq!(receipt.request_id, "req42");

        let receipt = pipeline
            .submit_samples_for_request("///", "alice", vec![sample()])
            .await
            .unwrap();
        assert_eq!(receipt.request_id.len(), 32);
    }

    #[test]
    fn sanitize_keeps_plain_names() {
        assert_eq!(sanitize_file_name(Some("alphabet.png")), "alphabet.png");
        assert_eq!(sanitize_file_name(Some("my-sample_2.JPG")), "my-sample_2.JPG");
    }

    #[test]
    fn sanitize_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_file_name(Some("../../etc/passwd")), "passwd");
        assert_eq!(sanitize_file_name(Some("C:\\Users\\me\\scan 1.png")), "scan_1.png");
        assert_eq!(sanitize_file_name(Some("..")), "sample");
        assert_eq!(sanitize_file_name(Some("")), "sample");
        assert_eq!(sanitize_file_name(None), "sample");
    }

    #[test]
    fn sanitize_bounds_length() {
        let long = "a".repeat(500);
        assert_eq!(sanitize_file_name(Some(&long)).len(), 100);
    }
}
