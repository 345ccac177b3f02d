use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tempfile::TempPath;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("probe failed: {0}")]
    Probe(String),

    #[error("probe output could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no video stream found")]
    NoStream,

    #[error("remux failed: {0}")]
    Remux(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Pixel dimensions of the first video stream in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoGeometry {
    pub width: u32,
    pub height: u32,
}

/// Aspect-ratio bucket used as the storage-key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
    Other,
}

impl Orientation {
    /// Classify by integer quotient against the 16:9 reference ratio.
    ///
    /// Deliberately coarse: anything whose quotient rounds to the reference
    /// lands in the bucket, so e.g. 2560x1080 still classifies as Landscape.
    /// Zero dimensions classify as Other.
    pub fn classify(width: u32, height: u32) -> Self {
        let (w, h) = (width as u64, height as u64);
        if h > 0 && (w * 9) / (h * 16) == 1 {
            Orientation::Landscape
        } else if w > 0 && (h * 9) / (w * 16) == 1 {
            Orientation::Portrait
        } else {
            Orientation::Other
        }
    }

    pub fn key_prefix(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Other => "other",
        }
    }
}

/// Narrow seam over the external media toolchain so the upload handler and
/// tests do not depend on real binaries.
#[async_trait]
pub trait MediaProcessor: Send + Sync {
    /// Extract the first video stream's dimensions.
    async fn probe(&self, path: &Path) -> Result<VideoGeometry, MediaError>;

    /// Rewrite the container with its index atoms up front (no re-encoding),
    /// returning the path of the new file. The path removes itself on drop.
    async fn remux(&self, path: &Path) -> Result<TempPath, MediaError>;
}

/// Production implementation backed by the ffprobe and ffmpeg CLIs on PATH.
#[derive(Debug, Default)]
pub struct FfmpegMediaProcessor;

impl FfmpegMediaProcessor {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

fn geometry_from_probe_json(stdout: &[u8]) -> Result<VideoGeometry, MediaError> {
    let parsed: ProbeOutput = serde_json::from_slice(stdout)?;
    parsed
        .streams
        .iter()
        .find_map(|s| match (s.width, s.height) {
            (Some(width), Some(height)) => Some(VideoGeometry { width, height }),
            _ => None,
        })
        .ok_or(MediaError::NoStream)
}

#[async_trait]
impl MediaProcessor for FfmpegMediaProcessor {
    async fn probe(&self, path: &Path) -> Result<VideoGeometry, MediaError> {
        let output = Command::new("ffprobe")
            .arg("-v")
            .arg("error")
            .arg("-print_format")
            .arg("json")
            .arg("-show_streams")
            .arg(path)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::Probe(stderr.trim().to_string()));
        }

        geometry_from_probe_json(&output.stdout)
    }

    async fn remux(&self, path: &Path) -> Result<TempPath, MediaError> {
        let output_path = tempfile::Builder::new()
            .suffix(".mp4")
            .tempfile()?
            .into_temp_path();

        let output = Command::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(path)
            .arg("-c")
            .arg("copy")
            .arg("-movflags")
            .arg("faststart")
            .arg("-f")
            .arg("mp4")
            .arg(output_path.as_os_str())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::Remux(stderr.trim().to_string()));
        }

        let written = tokio::fs::metadata(&*output_path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if written == 0 {
            return Err(MediaError::Remux(
                "ffmpeg produced no output file".to_string(),
            ));
        }

        Ok(output_path)
    }
}
