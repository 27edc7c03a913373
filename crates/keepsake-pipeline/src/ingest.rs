//! The ingestion orchestrator.
//!
//! One call takes a media source through sampling, analysis, generation
//! and persistence, reporting progress over a watch channel. Analysis and
//! poster generation degrade rather than fail the run; the primary media
//! upload and the final save are the only fatal steps besides extraction.

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use rand::Rng;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

use keepsake_core::{
    AiStatus, GeneratedMetadata, IngestProgress, IngestStage, MediaKind, MediaRecord,
    ProgressTracker,
};
use keepsake_db::RecordStore;
use keepsake_enrich::Enricher;
use keepsake_processing::{MediaSampler, MediaSource, Sample};

use crate::publisher::AssetPublisher;

/// What to ingest and how.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub source: MediaSource,
    /// Retell the memory as a generated four-page comic.
    pub comic: bool,
    /// When off, analysis and generation are skipped and the record is
    /// saved with placeholder metadata.
    pub magic: bool,
    pub folder_name: Option<String>,
}

pub struct IngestPipeline {
    sampler: Arc<dyn MediaSampler>,
    enricher: Enricher,
    publisher: AssetPublisher,
    store: RecordStore,
    sample_count: usize,
}

impl IngestPipeline {
    pub fn new(
        sampler: Arc<dyn MediaSampler>,
        enricher: Enricher,
        publisher: AssetPublisher,
        store: RecordStore,
        sample_count: usize,
    ) -> Self {
        Self {
            sampler,
            enricher,
            publisher,
            store,
            sample_count,
        }
    }

    /// Run one ingestion, publishing progress snapshots as stages advance.
    ///
    /// A failed run removes whatever it already published, so no assets
    /// outlive a record that was never saved.
    pub async fn ingest(
        &self,
        request: IngestRequest,
        progress: &watch::Sender<IngestProgress>,
    ) -> Result<MediaRecord> {
        let mut tracker = ProgressTracker::new();
        let record_id = Uuid::new_v4();

        match self.run(record_id, &request, &mut tracker, progress).await {
            Ok(record) => {
                tracing::info!(record_id = %record.id, title = %record.title, "Ingestion complete");
                Ok(record)
            }
            Err(e) => {
                tracing::error!(record_id = %record_id, error = %e, "Ingestion failed");
                self.publisher.remove_all(record_id).await;
                if let Ok(snapshot) = tracker.advance(IngestStage::Error) {
                    let _ = progress.send(snapshot);
                }
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        record_id: Uuid,
        request: &IngestRequest,
        tracker: &mut ProgressTracker,
        progress: &watch::Sender<IngestProgress>,
    ) -> Result<MediaRecord> {
        let filename = request.source.primary_filename();

        advance(tracker, progress, IngestStage::Extracting)?;
        let samples = self
            .sampler
            .sample(&request.source, self.sample_count)
            .await
            .context("extracting samples from source media")?;

        advance(tracker, progress, IngestStage::Analyzing)?;
        let (meta, ai_status) = if request.magic {
            self.enricher
                .analyze_with_fallback(&samples, request.comic, &filename)
                .await
        } else {
            tracing::debug!(filename = %filename, "Magic disabled, using placeholder metadata");
            (GeneratedMetadata::placeholder(&filename), AiStatus::Pending)
        };

        advance(tracker, progress, IngestStage::Generating)?;
        let main_data = tokio::fs::read(main_asset_path(&request.source)?)
            .await
            .context("reading primary media file")?;
        let extension = file_extension(&filename);
        let main_asset_url = self
            .publisher
            .publish_main(record_id, main_data, &extension, content_type_for(&extension))
            .await
            .context("uploading primary media")?;

        let reference = samples.first();
        let generated_poster = match reference {
            Some(reference) if request.magic && ai_status == AiStatus::Completed => {
                self.enricher.generate_poster(reference, &meta).await
            }
            _ => None,
        };
        let thumbnail_url = self
            .publish_thumbnail(record_id, generated_poster, reference, &main_asset_url)
            .await;

        let (media_type, pages) = match (&request.source, request.comic) {
            (_, true) => {
                advance(tracker, progress, IngestStage::GeneratingComic)?;
                let reference = reference.context("no sample available for comic generation")?;
                let page_images = self
                    .enricher
                    .generate_comic_pages(reference, &meta)
                    .await
                    .context("generating comic pages")?;
                let urls = self
                    .publisher
                    .publish_pages(record_id, &page_images, "image/webp")
                    .await;
                (MediaKind::Comic, urls)
            }
            (MediaSource::Photos(_), false) => {
                let images: Vec<Vec<u8>> = samples.iter().map(|s| s.data.clone()).collect();
                let urls = self
                    .publisher
                    .publish_pages(record_id, &images, "image/jpeg")
                    .await;
                (MediaKind::Photo, urls)
            }
            (MediaSource::Video(_), false) => (MediaKind::Video, vec![]),
        };

        advance(tracker, progress, IngestStage::Saving)?;
        let created_at = Utc::now();
        let record = MediaRecord {
            id: record_id,
            title: meta.title,
            description: meta.description,
            search_context: fold_mood(meta.search_context, meta.mood),
            media_type,
            thumbnail_url,
            main_asset_url,
            pages,
            year: created_at.year(),
            created_at,
            end_date: None,
            genre: meta.genre,
            match_score: rand::rng().random_range(70..=99),
            folder_name: request.folder_name.clone(),
            ai_status,
            is_featured: false,
        };
        self.store.save(&record).await.context("saving record")?;

        advance(tracker, progress, IngestStage::Complete)?;
        Ok(record)
    }

    /// Resolve the thumbnail through the fallback chain: generated poster,
    /// else raw reference frame, else the main asset URL.
    async fn publish_thumbnail(
        &self,
        record_id: Uuid,
        generated_poster: Option<Vec<u8>>,
        reference: Option<&Sample>,
        main_asset_url: &str,
    ) -> String {
        let mut candidates: Vec<(Vec<u8>, &str)> = Vec::new();
        if let Some(poster) = generated_poster {
            candidates.push((poster, "image/webp"));
        }
        if let Some(reference) = reference {
            candidates.push((reference.data.clone(), reference.content_type));
        }

        for (data, content_type) in candidates {
            match self
                .publisher
                .publish_poster(record_id, data, content_type)
                .await
            {
                Ok(url) => return url,
                Err(e) => {
                    tracing::warn!(record_id = %record_id, error = %e, "Poster upload failed");
                }
            }
        }

        // Last resort; for a video this is not a real image, so call the
        // degraded state out loudly.
        tracing::warn!(
            record_id = %record_id,
            "No poster could be published, thumbnail falls back to the main asset URL"
        );
        main_asset_url.to_string()
    }
}

fn advance(
    tracker: &mut ProgressTracker,
    progress: &watch::Sender<IngestProgress>,
    stage: IngestStage,
) -> Result<()> {
    let snapshot = tracker.advance(stage)?;
    tracing::debug!(stage = %snapshot.stage, percent = snapshot.percent, "Ingestion stage");
    let _ = progress.send(snapshot);
    Ok(())
}

fn main_asset_path(source: &MediaSource) -> Result<&std::path::PathBuf> {
    match source {
        MediaSource::Video(path) => Ok(path),
        MediaSource::Photos(paths) => paths
            .first()
            .context("photo ingestion requires at least one file"),
    }
}

fn file_extension(filename: &str) -> String {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_else(|| "bin".to_string())
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

fn fold_mood(search_context: String, mood: String) -> String {
    if mood.is_empty() {
        search_context
    } else {
        format!("{} {}", search_context, mood).trim().to_string()
    }
}
