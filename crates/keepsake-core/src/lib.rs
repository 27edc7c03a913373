//! Keepsake core: domain models, metadata codec, ingest progress state
//! machine, and configuration.
//!
//! This crate has no I/O. Everything here is shared by the storage, db,
//! processing, enrichment, and pipeline crates.

pub mod codec;
pub mod config;
pub mod models;

pub use config::AppConfig;
pub use models::{
    AiStatus, GeneratedMetadata, IngestProgress, IngestStage, MediaKind, MediaRecord,
    ProgressError, ProgressTracker,
};
