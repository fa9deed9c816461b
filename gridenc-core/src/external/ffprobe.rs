//! Prober: source metadata extraction via ffprobe.

use std::path::Path;

use ffprobe::{ffprobe, FfProbeError};

use crate::error::{command_failed_error, command_start_error, CoreError, CoreResult};
use crate::source::{AudioStreamInfo, SourceInfo, VideoStreamInfo};

/// Probes the input file and assembles the immutable [`SourceInfo`] a batch
/// validates against. Fails when the file has no video stream or when ffprobe
/// itself fails; either is fatal to starting a batch.
pub fn probe(input_path: &Path) -> CoreResult<SourceInfo> {
    log::debug!("Running ffprobe on: {}", input_path.display());

    let metadata = match ffprobe(input_path) {
        Ok(metadata) => metadata,
        Err(err) => {
            log::error!("ffprobe failed for {}: {err:?}", input_path.display());
            return Err(map_ffprobe_error(err));
        }
    };

    let video_stream = metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| CoreError::NoVideoStream(input_path.display().to_string()))?;

    let width = video_stream.width.ok_or_else(|| {
        CoreError::FfprobeParse(format!(
            "Video stream missing width in {}",
            input_path.display()
        ))
    })?;
    let height = video_stream.height.ok_or_else(|| {
        CoreError::FfprobeParse(format!(
            "Video stream missing height in {}",
            input_path.display()
        ))
    })?;
    if width <= 0 || height <= 0 {
        return Err(CoreError::FfprobeParse(format!(
            "Invalid dimensions in {}: width={width}, height={height}",
            input_path.display()
        )));
    }

    let fps = parse_frame_rate(&video_stream.r_frame_rate).ok_or_else(|| {
        CoreError::FfprobeParse(format!(
            "Failed to parse frame rate '{}' for {}",
            video_stream.r_frame_rate,
            input_path.display()
        ))
    })?;

    let duration_secs = metadata
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| {
            CoreError::FfprobeParse(format!(
                "Failed to parse duration for {}",
                input_path.display()
            ))
        })?;

    let size_bytes = metadata.format.size.parse::<u64>().unwrap_or(0);

    let audio_streams: Vec<AudioStreamInfo> = metadata
        .streams
        .iter()
        .filter(|s| s.codec_type.as_deref() == Some("audio"))
        .map(|s| AudioStreamInfo {
            codec: s.codec_name.clone(),
            sample_rate: s.sample_rate.as_deref().and_then(|r| r.parse().ok()),
            channels: s.channels.map_or(0, |c| c.max(0) as u32),
        })
        .collect();
    if audio_streams.is_empty() {
        log::debug!("No audio streams found in {}", input_path.display());
    }

    Ok(SourceInfo {
        path: input_path.to_path_buf(),
        video: VideoStreamInfo {
            width: width as u32,
            height: height as u32,
            fps,
            pix_fmt: video_stream.pix_fmt.clone(),
        },
        audio_streams,
        duration_secs,
        size_bytes,
    })
}

/// Parses an ffprobe frame rate, either rational ("30000/1001") or plain ("29.97").
fn parse_frame_rate(raw: &str) -> Option<f64> {
    if let Some((num, den)) = raw.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den == 0.0 {
            return None;
        }
        return Some(num / den);
    }
    raw.parse().ok()
}

fn map_ffprobe_error(err: FfProbeError) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error("ffprobe", io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error("ffprobe", output.status, stderr)
        }
        FfProbeError::Deserialize(err) => {
            CoreError::FfprobeParse(format!("output deserialization: {err}"))
        }
        _ => CoreError::FfprobeParse(format!("Unknown ffprobe error: {err:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rational_and_decimal_frame_rates() {
        assert_eq!(parse_frame_rate("30"), Some(30.0));
        assert_eq!(parse_frame_rate("29.97"), Some(29.97));
        assert_eq!(parse_frame_rate("30000/1001"), Some(30000.0 / 1001.0));
        assert_eq!(parse_frame_rate("25/1"), Some(25.0));
        assert_eq!(parse_frame_rate("25/0"), None);
        assert_eq!(parse_frame_rate("garbage"), None);
    }
}
