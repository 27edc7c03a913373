//! The sampler seam: one trait, one ffmpeg-backed implementation.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

use crate::photo::photo_sample;
use crate::video::FfmpegService;
use crate::ExtractionError;

/// A normalized still image derived from a video frame or source photo.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub data: Vec<u8>,
    pub content_type: &'static str,
}

/// What to sample.
#[derive(Debug, Clone)]
pub enum MediaSource {
    Video(PathBuf),
    /// Each photo becomes one sample, in input order.
    Photos(Vec<PathBuf>),
}

impl MediaSource {
    /// Filename used for placeholder titles and the main-asset extension.
    pub fn primary_filename(&self) -> String {
        let path = match self {
            MediaSource::Video(p) => p,
            MediaSource::Photos(ps) => match ps.first() {
                Some(p) => p,
                None => return String::new(),
            },
        };
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string()
    }
}

/// Produces ordered samples from a media source.
#[async_trait]
pub trait MediaSampler: Send + Sync {
    async fn sample(
        &self,
        source: &MediaSource,
        count: usize,
    ) -> Result<Vec<Sample>, ExtractionError>;
}

/// ffmpeg-backed sampler with a global wall-clock timeout per extraction
/// run. All decoder state and scratch files live in a per-run temp dir
/// released on every exit path.
pub struct FfmpegSampler {
    service: FfmpegService,
    timeout: Duration,
}

impl FfmpegSampler {
    pub fn new(ffmpeg_path: String, ffprobe_path: String, timeout: Duration) -> Self {
        Self {
            service: FfmpegService::new(ffmpeg_path, ffprobe_path),
            timeout,
        }
    }

    async fn sample_video(
        &self,
        path: &PathBuf,
        count: usize,
    ) -> Result<Vec<Sample>, ExtractionError> {
        let info = self.service.probe(path).await?;
        let timestamps = seek_timestamps(info.duration_secs, count);

        tracing::debug!(
            input = %path.display(),
            duration_secs = info.duration_secs,
            resolution = %format!("{}x{}", info.width, info.height),
            frame_count = timestamps.len(),
            "Sampling video frames"
        );

        let scratch = TempDir::new()?;
        let mut samples = Vec::with_capacity(timestamps.len());

        for (i, ts) in timestamps.iter().enumerate() {
            let frame_path = scratch.path().join(format!("frame_{}.jpg", i));
            self.service.extract_frame(path, *ts, &frame_path).await?;
            let data = tokio::fs::read(&frame_path).await?;
            samples.push(Sample {
                data,
                content_type: "image/jpeg",
            });
        }

        Ok(samples)
    }
}

#[async_trait]
impl MediaSampler for FfmpegSampler {
    async fn sample(
        &self,
        source: &MediaSource,
        count: usize,
    ) -> Result<Vec<Sample>, ExtractionError> {
        match source {
            MediaSource::Video(path) => {
                tokio::time::timeout(self.timeout, self.sample_video(path, count))
                    .await
                    .map_err(|_| ExtractionError::Timeout)?
            }
            MediaSource::Photos(paths) => {
                let mut samples = Vec::with_capacity(paths.len());
                for path in paths {
                    samples.push(photo_sample(path).await?);
                }
                Ok(samples)
            }
        }
    }
}

/// Compute `count` seek timestamps spread across the middle 60% of the
/// duration (the first and last 20% tend to be black frames, openings, or
/// credits). For a single sample, seek to `min(2s, duration/2)`.
pub fn seek_timestamps(duration_secs: f64, count: usize) -> Vec<f64> {
    if count == 0 || duration_secs <= 0.0 {
        return vec![];
    }
    if count == 1 {
        return vec![(duration_secs / 2.0).min(2.0)];
    }

    let start = duration_secs * 0.2;
    let span = duration_secs * 0.6;
    let step = span / (count as f64 - 1.0);
    (0..count).map(|i| start + step * i as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_samples_within_middle_band() {
        let d = 100.0;
        let ts = seek_timestamps(d, 2);
        assert_eq!(ts.len(), 2);
        for t in &ts {
            assert!(*t >= 0.2 * d && *t <= 0.8 * d, "timestamp {} out of band", t);
        }
        assert!(ts[0] < ts[1]);
    }

    #[test]
    fn test_many_samples_monotone_and_bounded() {
        let d = 37.5;
        let ts = seek_timestamps(d, 5);
        assert_eq!(ts.len(), 5);
        assert!((ts[0] - 0.2 * d).abs() < 1e-9);
        assert!((ts[4] - 0.8 * d).abs() < 1e-9);
        for pair in ts.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_single_sample_short_video() {
        // duration/2 < 2s, so seek to the midpoint.
        let ts = seek_timestamps(3.0, 1);
        assert_eq!(ts, vec![1.5]);
    }

    #[test]
    fn test_single_sample_long_video() {
        let ts = seek_timestamps(600.0, 1);
        assert_eq!(ts, vec![2.0]);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(seek_timestamps(0.0, 3).is_empty());
        assert!(seek_timestamps(10.0, 0).is_empty());
    }

    #[test]
    fn test_primary_filename() {
        let source = MediaSource::Video(PathBuf::from("/tmp/videos/summer_trip.mp4"));
        assert_eq!(source.primary_filename(), "summer_trip.mp4");

        let empty = MediaSource::Photos(vec![]);
        assert_eq!(empty.primary_filename(), "");
    }
}
