//! Batch and per-cell encode configuration.

use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::resolution::Resolution;
use crate::source::SourceInfo;

/// Frame rate used when the caller does not request one.
pub const DEFAULT_FRAME_RATE: u32 = 30;

/// Default CRF quality value. Lower values produce higher quality but larger
/// files.
pub const DEFAULT_CRF: u8 = 23;

/// One sweep dimension: an inclusive `min..=max` range sampled at `steps`
/// points. `steps == 1` always yields `[max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSpec<T> {
    pub min: T,
    pub max: T,
    pub steps: usize,
}

impl<T> AxisSpec<T> {
    pub fn new(min: T, max: T, steps: usize) -> Self {
        Self { min, max, steps }
    }
}

/// Parameters for a single grid cell's encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeConfig {
    pub resolution: Resolution,
    pub fps: u32,
    pub crf: u8,
    pub keep_audio: bool,
}

impl EncodeConfig {
    /// File-name suffix identifying this configuration, in the fixed
    /// `--res-WxH--fps-F--crf-Q` form downstream tooling parses.
    #[must_use]
    pub fn file_name_suffix(&self) -> String {
        format!(
            "--res-{}--fps-{}--crf-{}",
            self.resolution.file_name(),
            self.fps,
            self.crf
        )
    }

    /// Validates this configuration against the probed source.
    ///
    /// Rejects any upscaling request (resolution or frame rate above the
    /// source) and audio passthrough when the source has no audio stream.
    /// The message becomes the cell's failure diagnostic; it never aborts
    /// the batch.
    pub fn validate(&self, source: &SourceInfo) -> Result<(), String> {
        if self.resolution.width() > source.width() || self.resolution.height() > source.height() {
            return Err(format!(
                "Resolution upscaling detected: {} > {}x{}",
                self.resolution.label(),
                source.width(),
                source.height()
            ));
        }

        if f64::from(self.fps) > source.fps() {
            return Err(format!(
                "FPS upscaling detected: {} > {:.2}",
                self.fps,
                source.fps()
            ));
        }

        if self.keep_audio && !source.has_audio() {
            return Err("Audio required but not present in source video".to_string());
        }

        Ok(())
    }
}

/// Output path for one cell: `<stem><suffix>.<source extension>` inside the
/// output directory.
#[must_use]
pub fn output_path(source: &SourceInfo, config: &EncodeConfig, output_dir: &Path) -> PathBuf {
    let stem = source
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    let mut name = format!("{stem}{}", config.file_name_suffix());
    if let Some(ext) = source.path.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    output_dir.join(name)
}

/// Everything needed to start one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Directory where encoded cell outputs are written.
    pub output_dir: PathBuf,

    /// Resolution sweep, generated ascending from `min` to `max`.
    pub resolution_axis: AxisSpec<Resolution>,

    /// CRF sweep, generated descending from `max` to `min`.
    pub quality_axis: AxisSpec<u8>,

    /// Frame rate applied to every cell.
    pub frame_rate: u32,

    /// Whether cells keep the source audio (transcoded to AAC).
    pub keep_audio: bool,

    /// Worker pool size. Values above the available parallelism simply
    /// oversubscribe the pool.
    pub max_threads: usize,
}

impl BatchConfig {
    /// Creates a configuration with a single-cell grid and library defaults.
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            resolution_axis: AxisSpec::new(Resolution::R720p, Resolution::R720p, 1),
            quality_axis: AxisSpec::new(DEFAULT_CRF, DEFAULT_CRF, 1),
            frame_rate: DEFAULT_FRAME_RATE,
            keep_audio: true,
            max_threads: num_cpus::get(),
        }
    }

    /// Checks the parts not covered by axis generation.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_threads == 0 {
            return Err(CoreError::Config(
                "max_threads must be at least 1".to_string(),
            ));
        }
        if self.frame_rate == 0 {
            return Err(CoreError::Config("frame_rate must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{AudioStreamInfo, VideoStreamInfo};

    fn source(width: u32, height: u32, fps: f64, audio_streams: usize) -> SourceInfo {
        SourceInfo {
            path: PathBuf::from("/videos/sample.mp4"),
            video: VideoStreamInfo {
                width,
                height,
                fps,
                pix_fmt: Some("yuv420p".to_string()),
            },
            audio_streams: vec![
                AudioStreamInfo {
                    codec: Some("aac".to_string()),
                    sample_rate: Some(48_000),
                    channels: 2,
                };
                audio_streams
            ],
            duration_secs: 60.0,
            size_bytes: 1_000_000,
        }
    }

    fn config(resolution: Resolution, fps: u32, keep_audio: bool) -> EncodeConfig {
        EncodeConfig {
            resolution,
            fps,
            crf: DEFAULT_CRF,
            keep_audio,
        }
    }

    #[test]
    fn accepts_downscale() {
        let src = source(1920, 1080, 30.0, 1);
        assert!(config(Resolution::R720p, 30, true).validate(&src).is_ok());
    }

    #[test]
    fn rejects_resolution_upscale() {
        let src = source(1280, 720, 30.0, 1);
        let err = config(Resolution::R1080p, 30, true).validate(&src).unwrap_err();
        assert_eq!(err, "Resolution upscaling detected: 1080p (FHD) > 1280x720");
    }

    #[test]
    fn rejects_fps_upscale() {
        let src = source(1920, 1080, 24.0, 1);
        let err = config(Resolution::R720p, 30, true).validate(&src).unwrap_err();
        assert_eq!(err, "FPS upscaling detected: 30 > 24.00");
    }

    #[test]
    fn rejects_audio_without_source_audio() {
        let src = source(1920, 1080, 30.0, 0);
        let err = config(Resolution::R720p, 30, true).validate(&src).unwrap_err();
        assert_eq!(err, "Audio required but not present in source video");
        assert!(config(Resolution::R720p, 30, false).validate(&src).is_ok());
    }

    #[test]
    fn suffix_matches_naming_convention() {
        let cfg = config(Resolution::R720p, 30, true);
        assert_eq!(cfg.file_name_suffix(), "--res-1280x720--fps-30--crf-23");
    }

    #[test]
    fn output_path_keeps_source_extension() {
        let src = source(1920, 1080, 30.0, 1);
        let cfg = EncodeConfig {
            resolution: Resolution::R480p,
            fps: 24,
            crf: 35,
            keep_audio: false,
        };
        let path = output_path(&src, &cfg, Path::new("/out"));
        assert_eq!(
            path,
            PathBuf::from("/out/sample--res-854x480--fps-24--crf-35.mp4")
        );
    }

    #[test]
    fn batch_config_rejects_zero_threads() {
        let mut cfg = BatchConfig::new(PathBuf::from("/out"));
        cfg.max_threads = 0;
        assert!(cfg.validate().is_err());
    }
}
