//! Record edits and deletion.
//!
//! Edits are expressed as one [`RecordPatch`] applied atomically: validate
//! against the loaded record, re-encode, upsert. Deletion cascades the
//! asset prefix before removing the row.

use thiserror::Error;
use uuid::Uuid;

use keepsake_db::{RecordStore, StoreError};

use crate::publisher::AssetPublisher;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("Record not found: {0}")]
    NotFound(Uuid),

    #[error("An album must keep at least one page")]
    NoPagesLeft,

    #[error("Page is not part of the record: {0}")]
    UnknownPage(String),

    #[error("Cover must be one of the record's pages: {0}")]
    CoverNotAPage(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One edit intent against a record.
///
/// `folder` distinguishes "leave unchanged" (`None`) from "set or clear"
/// (`Some(...)`); `pages` may only reorder or remove existing pages.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub folder: Option<Option<String>>,
    pub cover_url: Option<String>,
    pub pages: Option<Vec<String>>,
}

pub struct RecordEditor {
    store: RecordStore,
    publisher: AssetPublisher,
}

impl RecordEditor {
    pub fn new(store: RecordStore, publisher: AssetPublisher) -> Self {
        Self { store, publisher }
    }

    /// Apply a patch and persist the result.
    pub async fn apply(
        &self,
        id: Uuid,
        patch: RecordPatch,
    ) -> Result<keepsake_core::MediaRecord, EditError> {
        let mut record = self.store.load(id).await?.ok_or(EditError::NotFound(id))?;

        if let Some(title) = patch.title {
            record.title = title;
        }
        if let Some(description) = patch.description {
            record.description = description;
        }
        if let Some(folder) = patch.folder {
            record.folder_name = folder.filter(|f| !f.is_empty());
        }

        if let Some(pages) = patch.pages {
            if !record.pages.is_empty() && pages.is_empty() {
                return Err(EditError::NoPagesLeft);
            }
            for page in &pages {
                if !record.pages.contains(page) {
                    return Err(EditError::UnknownPage(page.clone()));
                }
            }
            record.pages = pages;
        }

        if let Some(cover) = patch.cover_url {
            if !record.pages.contains(&cover) {
                return Err(EditError::CoverNotAPage(cover));
            }
            // The cover is whichever page the thumbnail points at.
            record.thumbnail_url = cover;
        }

        self.store.save(&record).await?;
        tracing::info!(record_id = %id, "Record updated");
        Ok(record)
    }

    /// Delete a record and its published assets.
    ///
    /// Asset removal is best effort; the row delete is what makes the
    /// record gone.
    pub async fn delete(&self, id: Uuid) -> Result<bool, EditError> {
        self.publisher.remove_all(id).await;
        let deleted = self.store.delete(id).await?;
        if deleted {
            tracing::info!(record_id = %id, "Record deleted");
        }
        Ok(deleted)
    }
}
