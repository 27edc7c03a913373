//! Frame sampler: turns a raw media file into normalized still-image
//! samples for enrichment.
//!
//! Video frames are extracted with ffmpeg (downscaled so the longer edge
//! is at most 512 px); photos pass through unresized. Extraction errors
//! are never retried here; they propagate to the ingestion pipeline.

pub mod photo;
pub mod sampler;
pub mod video;

use thiserror::Error;

pub use sampler::{FfmpegSampler, MediaSampler, MediaSource, Sample};

/// The longer edge of an extracted video frame.
pub const MAX_SAMPLE_EDGE: u32 = 512;

/// Frame extraction errors.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Decoded dimensions were unusable (e.g. 0x0).
    #[error("Invalid media: {0}")]
    InvalidMedia(String),

    /// The global extraction timeout elapsed.
    #[error("Frame extraction timed out")]
    Timeout,

    /// The container or image format could not be decoded.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
