//! Publishes derived assets under the record's key prefix.

use base64::Engine;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use keepsake_storage::keys;
use keepsake_storage::{Storage, StorageResult};

/// Uploads record assets under deterministic keys.
///
/// The main asset is the only one whose failure is fatal; posters and
/// pages degrade with a log line.
#[derive(Clone)]
pub struct AssetPublisher {
    storage: Arc<dyn Storage>,
}

impl AssetPublisher {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Upload the primary media file. Failure here aborts the ingestion.
    pub async fn publish_main(
        &self,
        record_id: Uuid,
        data: Vec<u8>,
        extension: &str,
        content_type: &str,
    ) -> StorageResult<String> {
        self.storage
            .upload(&keys::main_key(record_id, extension), data, content_type)
            .await
    }

    /// Upload the poster image.
    pub async fn publish_poster(
        &self,
        record_id: Uuid,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        self.storage
            .upload(&keys::poster_key(record_id), data, content_type)
            .await
    }

    /// Upload page images and return their URLs in order.
    ///
    /// Keys carry a short content digest, so re-publishing identical
    /// content lands on the same key and the resulting URL list is
    /// deduplicated. A failed upload degrades to an inline data URI, so a
    /// page that was generated is never lost to a storage hiccup.
    pub async fn publish_pages(
        &self,
        record_id: Uuid,
        pages: &[Vec<u8>],
        content_type: &str,
    ) -> Vec<String> {
        let mut urls = Vec::with_capacity(pages.len());
        let mut seen = HashSet::new();

        for (index, data) in pages.iter().enumerate() {
            let digest = short_digest(data);
            let key = keys::page_key(record_id, index, &digest);
            let url = match self
                .storage
                .upload(&key, data.clone(), content_type)
                .await
            {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(
                        record_id = %record_id,
                        page = index,
                        error = %e,
                        "Page upload failed, inlining as data URI"
                    );
                    data_uri(data, content_type)
                }
            };
            if seen.insert(digest) {
                urls.push(url);
            }
        }

        urls
    }

    /// Remove every asset under the record's prefix. Best effort: a
    /// storage failure is logged, never propagated, so the row delete can
    /// still proceed.
    pub async fn remove_all(&self, record_id: Uuid) {
        if let Err(e) = self.storage.delete_prefix(&keys::record_prefix(record_id)).await {
            tracing::warn!(
                record_id = %record_id,
                error = %e,
                "Asset cascade delete failed, assets may be orphaned"
            );
        }
    }
}

/// Inline fallback representation of a page whose upload failed.
fn data_uri(data: &[u8], content_type: &str) -> String {
    format!(
        "data:{};base64,{}",
        content_type,
        base64::engine::general_purpose::STANDARD.encode(data)
    )
}

/// First 8 hex characters of the content's SHA-256.
fn short_digest(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    let mut out = String::with_capacity(8);
    for byte in &digest[..4] {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}
