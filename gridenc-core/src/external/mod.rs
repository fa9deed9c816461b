//! Collaborator contracts and interactions with external tools.
//!
//! The scheduler only ever talks to the [`Encoder`] and
//! [`FileMetadataProvider`] traits, so tests can inject scripted
//! implementations; the default implementations here shell out to ffmpeg via
//! `ffmpeg-sidecar` and to ffprobe via the `ffprobe` crate.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::config::EncodeConfig;
use crate::error::{CoreError, CoreResult};
use crate::source::SourceInfo;

pub mod ffmpeg;
pub mod ffprobe;

pub use ffmpeg::SidecarEncoder;
pub use ffprobe::probe;

/// A collaborator performing one blocking transcode.
///
/// Implementations must be safe to call concurrently from the worker pool.
/// Upscale/audio validation happens before dispatch, so `encode` may assume a
/// config that passed [`EncodeConfig::validate`].
pub trait Encoder {
    fn encode(&self, source: &SourceInfo, config: &EncodeConfig, output: &Path)
        -> CoreResult<()>;
}

/// Abstraction over file metadata access, injected for the post-encode
/// output-size lookup.
pub trait FileMetadataProvider {
    /// Size of the file at `path` in bytes.
    fn get_size(&self, path: &Path) -> CoreResult<u64>;
}

/// Default [`FileMetadataProvider`] backed by `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct StdFsMetadataProvider;

impl FileMetadataProvider for StdFsMetadataProvider {
    fn get_size(&self, path: &Path) -> CoreResult<u64> {
        Ok(std::fs::metadata(path)?.len())
    }
}

/// Checks that a required external command exists and starts.
///
/// Runs `<cmd> -version` with output discarded; distinguishes a missing
/// binary from one that is present but fails to start.
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{cmd_name}' not found.");
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check for '{cmd_name}': {e}");
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}
