//! Production [`Encoder`] driving ffmpeg through `ffmpeg-sidecar`.

use std::path::Path;
use std::process::ExitStatus;

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};

use crate::config::EncodeConfig;
use crate::error::{command_failed_error, command_wait_error, CoreResult};
use crate::external::Encoder;
use crate::source::SourceInfo;

/// Encodes one cell with libx264 at the cell's resolution, frame rate and
/// CRF, transcoding audio to AAC when requested and present.
#[derive(Debug, Clone, Default)]
pub struct SidecarEncoder;

impl SidecarEncoder {
    pub fn new() -> Self {
        Self
    }

    fn build_command(
        &self,
        source: &SourceInfo,
        config: &EncodeConfig,
        output: &Path,
    ) -> FfmpegCommand {
        let (width, height) = config.resolution.dimensions();

        let mut cmd = FfmpegCommand::new();
        cmd.hide_banner();
        cmd.overwrite();
        cmd.input(source.path.to_string_lossy().as_ref());
        cmd.args(["-c:v", "libx264"]);
        cmd.args(["-s", &format!("{width}x{height}")]);
        cmd.args(["-r", &config.fps.to_string()]);
        cmd.args(["-crf", &config.crf.to_string()]);
        if config.keep_audio && source.has_audio() {
            cmd.args(["-c:a", "aac"]);
        } else {
            cmd.arg("-an");
        }
        cmd.output(output.to_string_lossy().as_ref());
        cmd
    }
}

impl Encoder for SidecarEncoder {
    fn encode(&self, source: &SourceInfo, config: &EncodeConfig, output: &Path) -> CoreResult<()> {
        log::info!(
            "Starting encode: {} ({} crf {} fps {})",
            output.display(),
            config.resolution.label(),
            config.crf,
            config.fps
        );

        let mut cmd = self.build_command(source, config, output);

        let mut child = cmd.spawn().map_err(|e| {
            command_failed_error("ffmpeg", ExitStatus::default(), format!("Failed to start: {e}"))
        })?;

        // Keep the tail of ffmpeg's error output for the diagnostic message.
        let mut stderr_lines: Vec<String> = Vec::new();
        let events = child.iter().map_err(|e| {
            command_failed_error(
                "ffmpeg",
                ExitStatus::default(),
                format!("Failed to get event iterator: {e}"),
            )
        })?;
        for event in events {
            match event {
                FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line)
                | FfmpegEvent::Error(line) => {
                    stderr_lines.push(line);
                }
                _ => {}
            }
        }

        let status = child.wait().map_err(|e| command_wait_error("ffmpeg", e))?;
        if status.success() {
            log::info!("Encode finished: {}", output.display());
            Ok(())
        } else {
            let detail = stderr_lines.join("\n");
            log::warn!("Encode failed for {}: {detail}", output.display());
            Err(command_failed_error("ffmpeg", status, detail))
        }
    }
}
