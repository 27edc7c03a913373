//! FFmpeg/ffprobe invocation: probe container metadata, extract single
//! frames at seek timestamps.

use serde::Deserialize;
use std::path::Path;
use tokio::process::Command;

use crate::{ExtractionError, MAX_SAMPLE_EDGE};

/// Container metadata relevant to sampling.
#[derive(Debug, Clone, Copy)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Wrapper over the ffmpeg/ffprobe binaries configured at startup.
#[derive(Debug, Clone)]
pub struct FfmpegService {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl FfmpegService {
    pub fn new(ffmpeg_path: String, ffprobe_path: String) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
        }
    }

    /// Probe a video file. Rejects files whose decoded dimensions are 0x0
    /// with `InvalidMedia`; undecodable containers map to
    /// `UnsupportedFormat`.
    pub async fn probe(&self, input: &Path) -> Result<VideoInfo, ExtractionError> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(input)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::UnsupportedFormat(format!(
                "ffprobe failed for {}: {}",
                input.display(),
                stderr.trim()
            )));
        }

        let probe: ProbeOutput = serde_json::from_slice(&output.stdout).map_err(|e| {
            ExtractionError::UnsupportedFormat(format!("unparseable ffprobe output: {}", e))
        })?;

        let stream = probe
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| {
                ExtractionError::UnsupportedFormat("no video stream found".to_string())
            })?;

        let width = stream.width.unwrap_or(0);
        let height = stream.height.unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(ExtractionError::InvalidMedia(format!(
                "decoded dimensions {}x{}",
                width, height
            )));
        }

        let duration_secs = probe
            .format
            .and_then(|f| f.duration)
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        Ok(VideoInfo {
            width,
            height,
            duration_secs,
        })
    }

    /// Seek to `timestamp_secs`, decode one frame, downscale so the longer
    /// edge is at most [`MAX_SAMPLE_EDGE`] preserving aspect ratio, and
    /// encode it as JPEG at `output`.
    pub async fn extract_frame(
        &self,
        input: &Path,
        timestamp_secs: f64,
        output: &Path,
    ) -> Result<(), ExtractionError> {
        let scale = format!(
            "scale='min({max},iw)':'min({max},ih)':force_original_aspect_ratio=decrease",
            max = MAX_SAMPLE_EDGE
        );

        let result = Command::new(&self.ffmpeg_path)
            .args(["-y", "-v", "error", "-ss", &format!("{:.3}", timestamp_secs)])
            .arg("-i")
            .arg(input)
            .args(["-frames:v", "1", "-vf", &scale, "-q:v", "4"])
            .arg(output)
            .output()
            .await?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ExtractionError::UnsupportedFormat(format!(
                "ffmpeg frame extraction failed at {:.3}s: {}",
                timestamp_secs,
                stderr.trim()
            )));
        }

        Ok(())
    }
}
