use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

/// Media kind for a persisted record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Video,
    Photo,
    Comic,
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Photo => write!(f, "photo"),
            MediaKind::Comic => write!(f, "comic"),
        }
    }
}

impl FromStr for MediaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(MediaKind::Video),
            "photo" => Ok(MediaKind::Photo),
            "comic" => Ok(MediaKind::Comic),
            _ => Err(anyhow::anyhow!("Invalid media kind: {}", s)),
        }
    }
}

/// Enrichment status of a record.
///
/// `Pending` marks a record saved with placeholder metadata because
/// analysis did not complete; there is no automatic backfill job, the
/// record is only re-enriched through an explicit re-ingest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl Display for AiStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AiStatus::Pending => write!(f, "pending"),
            AiStatus::Completed => write!(f, "completed"),
            AiStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for AiStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AiStatus::Pending),
            "completed" => Ok(AiStatus::Completed),
            "failed" => Ok(AiStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid ai status: {}", s)),
        }
    }
}

/// The persisted unit of the library.
///
/// Only `id`, `title`, `description` and `created_at` are real row-store
/// columns; every other attribute travels through the metadata codec
/// packed into the description column (see [`crate::codec`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: Uuid,
    pub title: String,
    /// User-visible text; may start as AI-placeholder text.
    pub description: String,
    /// Hidden AI-derived keyword/transcription blob, used only for search
    /// matching and never shown verbatim.
    pub search_context: String,
    pub media_type: MediaKind,
    /// Always resolvable: generated poster, else raw sample frame, else the
    /// prior value.
    pub thumbnail_url: String,
    pub main_asset_url: String,
    /// Ordered secondary image assets. Non-empty and order-significant for
    /// comics and multi-photo records. The entry equal to `thumbnail_url`
    /// (if any) is the cover.
    pub pages: Vec<String>,
    pub year: i32,
    pub created_at: DateTime<Utc>,
    /// Set for range records.
    pub end_date: Option<DateTime<Utc>>,
    /// Short labels; order only matters for display truncation.
    pub genre: Vec<String>,
    /// Decorative affinity value.
    pub match_score: i32,
    /// User-assigned label; presence removes the record from automatic
    /// clustering.
    pub folder_name: Option<String>,
    pub ai_status: AiStatus,
    pub is_featured: bool,
}

impl MediaRecord {
    /// Index of the cover page, designated by equality with the thumbnail.
    pub fn cover_index(&self) -> Option<usize> {
        self.pages.iter().position(|p| *p == self.thumbnail_url)
    }
}
