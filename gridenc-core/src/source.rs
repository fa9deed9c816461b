//! Source media description produced by the prober.

use std::path::PathBuf;

/// Properties of the video stream selected for encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoStreamInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub pix_fmt: Option<String>,
}

/// Properties of one audio stream in the source container.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioStreamInfo {
    pub codec: Option<String>,
    pub sample_rate: Option<u32>,
    pub channels: u32,
}

/// Immutable description of the input media, probed once before a batch
/// starts. Read-only to the scheduler; every task validates against it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub path: PathBuf,
    pub video: VideoStreamInfo,
    pub audio_streams: Vec<AudioStreamInfo>,
    pub duration_secs: f64,
    pub size_bytes: u64,
}

impl SourceInfo {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.video.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.video.height
    }

    #[must_use]
    pub fn fps(&self) -> f64 {
        self.video.fps
    }

    /// Whether the container carries at least one audio stream.
    #[must_use]
    pub fn has_audio(&self) -> bool {
        !self.audio_streams.is_empty()
    }
}
