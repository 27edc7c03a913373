//! Shared mocks and fixtures for pipeline tests.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use keepsake_core::GeneratedMetadata;
use keepsake_db::{RecordRepository, RecordStore};
use keepsake_enrich::{AspectRatio, EnrichError, Enricher, GenerativeClient, RetryPolicy};
use keepsake_processing::{ExtractionError, MediaSampler, MediaSource, Sample};
use keepsake_storage::{
    LocalStorage, Storage, StorageBackend, StorageError, StorageResult,
};

use crate::ingest::IngestPipeline;
use crate::publisher::AssetPublisher;

pub struct TestHarness {
    pub store: RecordStore,
    pub storage: Arc<LocalStorage>,
    storage_dir: TempDir,
    media_dir: TempDir,
}

impl TestHarness {
    pub async fn new() -> Self {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        RecordRepository::migrate(&pool).await.unwrap();

        let storage_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(
            storage_dir.path(),
            "http://localhost:3000/assets".to_string(),
        )
        .await
        .unwrap();

        Self {
            store: RecordStore::new(pool),
            storage: Arc::new(storage),
            storage_dir,
            media_dir: TempDir::new().unwrap(),
        }
    }

    /// Write a fixture media file and return its path.
    pub fn media_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.media_dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn storage_root(&self) -> &std::path::Path {
        self.storage_dir.path()
    }

    /// Storage that rejects uploads whose key contains `marker`, backed by
    /// this harness's local store for everything else.
    pub fn rejecting_storage(&self, marker: &'static str) -> Arc<RejectingStorage> {
        Arc::new(RejectingStorage {
            inner: (*self.storage).clone(),
            marker,
        })
    }
}

pub fn test_pipeline(
    harness: &TestHarness,
    sampler: MockSampler,
    client: MockClient,
) -> IngestPipeline {
    pipeline_over(harness, sampler, client, harness.storage.clone())
}

pub fn pipeline_over(
    harness: &TestHarness,
    sampler: MockSampler,
    client: MockClient,
    storage: Arc<dyn Storage>,
) -> IngestPipeline {
    let enricher = Enricher::new(
        Arc::new(client),
        RetryPolicy {
            max_attempts: 1,
            initial_delay: Duration::from_millis(10),
        },
        Duration::from_millis(1),
    );
    IngestPipeline::new(
        Arc::new(sampler),
        enricher,
        AssetPublisher::new(storage),
        harness.store.clone(),
        3,
    )
}

/// Storage that fails uploads for keys containing a marker and delegates
/// everything else, for exercising degraded publish paths.
pub struct RejectingStorage {
    inner: LocalStorage,
    marker: &'static str,
}

#[async_trait]
impl Storage for RejectingStorage {
    async fn upload(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        if storage_key.contains(self.marker) {
            return Err(StorageError::UploadFailed(format!(
                "rejected key {}",
                storage_key
            )));
        }
        self.inner.upload(storage_key, data, content_type).await
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.inner.download(storage_key).await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.inner.delete(storage_key).await
    }

    async fn delete_prefix(&self, prefix: &str) -> StorageResult<()> {
        self.inner.delete_prefix(prefix).await
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.inner.exists(storage_key).await
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}

/// Sampler returning canned frames without touching ffmpeg.
pub struct MockSampler {
    samples: Vec<Sample>,
    fail: bool,
}

impl Default for MockSampler {
    fn default() -> Self {
        Self {
            samples: (0..3)
                .map(|i| Sample {
                    data: format!("frame {}", i).into_bytes(),
                    content_type: "image/jpeg",
                })
                .collect(),
            fail: false,
        }
    }
}

impl MockSampler {
    pub fn photos(contents: &[&[u8]]) -> Self {
        Self {
            samples: contents
                .iter()
                .map(|c| Sample {
                    data: c.to_vec(),
                    content_type: "image/jpeg",
                })
                .collect(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            samples: vec![],
            fail: true,
        }
    }
}

#[async_trait]
impl MediaSampler for MockSampler {
    async fn sample(
        &self,
        _source: &MediaSource,
        _count: usize,
    ) -> Result<Vec<Sample>, ExtractionError> {
        if self.fail {
            Err(ExtractionError::InvalidMedia(
                "declared resolution is 0x0".to_string(),
            ))
        } else {
            Ok(self.samples.clone())
        }
    }
}

/// Generative client with scriptable failures.
#[derive(Default)]
pub struct MockClient {
    /// When set, every analyze call fails with this error.
    pub analyze_error: Option<fn() -> EnrichError>,
    /// 1-based index of the generate-image call that should fail.
    pub fail_on_image_call: Option<u32>,
    pub image_calls: Arc<AtomicU32>,
}

impl MockClient {
    pub fn image_call_count(&self) -> Arc<AtomicU32> {
        self.image_calls.clone()
    }
}

#[async_trait]
impl GenerativeClient for MockClient {
    async fn analyze(
        &self,
        _samples: &[Sample],
        _comic_mode: bool,
    ) -> Result<GeneratedMetadata, EnrichError> {
        if let Some(make_error) = self.analyze_error {
            return Err(make_error());
        }
        Ok(GeneratedMetadata {
            title: "Beach Day".to_string(),
            description: "An afternoon of sandcastles and waves.".to_string(),
            search_context: "beach sand waves sandcastle summer".to_string(),
            genre: vec!["Family".to_string()],
            mood: "joyful".to_string(),
        })
    }

    async fn generate_image(
        &self,
        _reference: &Sample,
        _prompt: &str,
        _aspect: AspectRatio,
    ) -> Result<Vec<u8>, EnrichError> {
        let call = self.image_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_image_call == Some(call) {
            Err(EnrichError::Unauthorized("scripted failure".to_string()))
        } else {
            Ok(format!("image {}", call).into_bytes())
        }
    }
}
