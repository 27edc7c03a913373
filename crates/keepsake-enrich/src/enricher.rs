//! Enrichment orchestration: retries, graceful degradation and the
//! all-or-nothing comic batch.

use std::sync::Arc;
use std::time::Duration;

use keepsake_core::{AiStatus, GeneratedMetadata};
use keepsake_processing::Sample;

use crate::client::{AspectRatio, GenerativeClient};
use crate::retry::{with_retry, RetryPolicy};
use crate::EnrichError;

/// Pages of a generated comic, in reading order.
pub type ComicPages = Vec<Vec<u8>>;

/// Every comic has exactly this many pages.
pub const COMIC_PAGE_COUNT: usize = 4;

/// Drives the generative calls for one ingestion.
pub struct Enricher {
    client: Arc<dyn GenerativeClient>,
    policy: RetryPolicy,
    comic_page_delay: Duration,
}

impl Enricher {
    pub fn new(
        client: Arc<dyn GenerativeClient>,
        policy: RetryPolicy,
        comic_page_delay: Duration,
    ) -> Self {
        Self {
            client,
            policy,
            comic_page_delay,
        }
    }

    /// Analyze the samples, degrading to placeholder metadata when the
    /// provider stays down.
    ///
    /// Degradation keeps the ingestion alive: the record is saved with
    /// filename-derived metadata and stays marked pending so a later run
    /// can fill it in.
    pub async fn analyze_with_fallback(
        &self,
        samples: &[Sample],
        comic_mode: bool,
        filename: &str,
    ) -> (GeneratedMetadata, AiStatus) {
        let result = with_retry(self.policy, "analyze", || {
            self.client.analyze(samples, comic_mode)
        })
        .await;

        match result {
            Ok(meta) => (meta, AiStatus::Completed),
            Err(e) => {
                tracing::warn!(
                    filename,
                    error = %e,
                    "Analysis unavailable, falling back to placeholder metadata"
                );
                (GeneratedMetadata::placeholder(filename), AiStatus::Pending)
            }
        }
    }

    /// Generate the poster image, or `None` when generation keeps failing.
    ///
    /// The poster is decorative: a missing one falls back to the extracted
    /// thumbnail, so failure here never aborts the ingestion.
    pub async fn generate_poster(
        &self,
        reference: &Sample,
        meta: &GeneratedMetadata,
    ) -> Option<Vec<u8>> {
        let prompt = crate::prompts::poster_prompt(meta);

        let result = with_retry(self.policy, "generate_poster", || {
            self.client
                .generate_image(reference, &prompt, AspectRatio::Portrait)
        })
        .await;

        match result {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(error = %e, "Poster generation failed, keeping extracted thumbnail");
                None
            }
        }
    }

    /// Generate all four comic pages sequentially, pausing between pages
    /// to stay under provider rate limits.
    ///
    /// A partial comic is worse than none, so any page failure aborts the
    /// whole batch.
    pub async fn generate_comic_pages(
        &self,
        reference: &Sample,
        meta: &GeneratedMetadata,
    ) -> Result<ComicPages, EnrichError> {
        let prompts = crate::prompts::comic_page_prompts(meta);
        let mut pages = Vec::with_capacity(COMIC_PAGE_COUNT);

        for (index, prompt) in prompts.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.comic_page_delay).await;
            }

            let operation = format!("generate_comic_page_{}", index + 1);
            let bytes = with_retry(self.policy, &operation, || {
                self.client
                    .generate_image(reference, prompt, AspectRatio::Portrait)
            })
            .await?;

            tracing::debug!(page = index + 1, size_bytes = bytes.len(), "Comic page generated");
            pages.push(bytes);
        }

        Ok(pages)
    }
}
