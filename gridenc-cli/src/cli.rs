// gridenc-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::Parser;
use gridenc_core::Resolution;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "gridenc: resolution x CRF encode sweeps",
    long_about = "Sweeps a grid of encoding parameters (resolution ladder x CRF) against one \
                  source video, running every cell concurrently via ffmpeg and reporting a \
                  per-cell result matrix."
)]
pub struct Cli {
    /// Source video file
    #[arg(required = true, value_name = "INPUT_FILE")]
    pub input: PathBuf,

    /// Directory where encoded outputs are written
    #[arg(short = 'o', long = "output", required = true, value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    // --- Resolution axis ---
    /// Smallest resolution in the sweep (240p..4320p)
    #[arg(long, default_value = "480p", value_parser = Resolution::from_str)]
    pub min_res: Resolution,

    /// Largest resolution in the sweep
    #[arg(long, default_value = "1080p", value_parser = Resolution::from_str)]
    pub max_res: Resolution,

    /// Number of resolution samples (1 = max only)
    #[arg(long, default_value_t = 3, value_name = "STEPS")]
    pub res_steps: usize,

    // --- Quality axis ---
    /// Lowest CRF (highest quality) in the sweep
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u8).range(0..=51))]
    pub min_crf: u8,

    /// Highest CRF (lowest quality) in the sweep
    #[arg(long, default_value_t = 35, value_parser = clap::value_parser!(u8).range(0..=51))]
    pub max_crf: u8,

    /// Number of CRF samples (1 = max only)
    #[arg(long, default_value_t = 4, value_name = "STEPS")]
    pub crf_steps: usize,

    // --- Encoding options ---
    /// Output frame rate for every cell
    #[arg(long, default_value_t = gridenc_core::DEFAULT_FRAME_RATE, value_name = "FPS")]
    pub fps: u32,

    /// Drop audio from every output
    #[arg(long, default_value_t = false)]
    pub no_audio: bool,

    /// Maximum concurrent encodes. Can also be set via GRIDENC_THREADS.
    #[arg(short = 'j', long, env = "GRIDENC_THREADS", default_value_t = num_cpus::get(), value_name = "N")]
    pub threads: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_a_full_sweep_invocation() {
        let cli = Cli::parse_from([
            "gridenc",
            "clip.mp4",
            "-o",
            "out",
            "--min-res",
            "720p",
            "--max-res",
            "2160p",
            "--res-steps",
            "2",
            "--min-crf",
            "18",
            "--max-crf",
            "30",
            "--crf-steps",
            "3",
            "--no-audio",
            "-j",
            "4",
        ]);
        assert_eq!(cli.min_res, Resolution::R720p);
        assert_eq!(cli.max_res, Resolution::R2160p);
        assert_eq!(cli.res_steps, 2);
        assert_eq!(cli.min_crf, 18);
        assert_eq!(cli.max_crf, 30);
        assert_eq!(cli.crf_steps, 3);
        assert!(cli.no_audio);
        assert_eq!(cli.threads, 4);
    }
}
