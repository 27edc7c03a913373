//! Domain models for the media library.

pub mod metadata;
pub mod progress;
pub mod record;

pub use metadata::GeneratedMetadata;
pub use progress::{IngestProgress, IngestStage, ProgressError, ProgressTracker};
pub use record::{AiStatus, MediaKind, MediaRecord};
