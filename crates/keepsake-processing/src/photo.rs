//! Photo pass-through sampling.
//!
//! Source photos are assumed already suitable as AI input, so they are
//! emitted unresized; only the format is sniffed to reject undecodable
//! files early.

use std::path::Path;

use crate::{ExtractionError, Sample};

/// Read one photo file as a sample.
pub async fn photo_sample(path: &Path) -> Result<Sample, ExtractionError> {
    let data = tokio::fs::read(path).await?;
    let content_type = sniff_content_type(&data).ok_or_else(|| {
        ExtractionError::UnsupportedFormat(format!("undecodable image: {}", path.display()))
    })?;
    Ok(Sample { data, content_type })
}

/// Sniff the image content type, or `None` for formats the enrichment
/// providers cannot accept.
pub fn sniff_content_type(data: &[u8]) -> Option<&'static str> {
    match image::guess_format(data).ok()? {
        image::ImageFormat::Jpeg => Some("image/jpeg"),
        image::ImageFormat::Png => Some("image/png"),
        image::ImageFormat::Gif => Some("image/gif"),
        image::ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}
