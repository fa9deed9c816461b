// Integration tests driving BatchScheduler directly with scripted encoders.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use gridenc_core::{
    build_grid, AxisSpec, BatchConfig, BatchScheduler, CellState, CoreError, CoreResult,
    EncodeConfig, Encoder, FileMetadataProvider, Resolution, ResultMatrix, SourceInfo,
};
use gridenc_core::axis::{quality_axis, resolution_axis};
use gridenc_core::source::{AudioStreamInfo, VideoStreamInfo};
use tempfile::tempdir;

fn test_source(width: u32, height: u32, fps: f64) -> SourceInfo {
    SourceInfo {
        path: "/videos/clip.mp4".into(),
        video: VideoStreamInfo {
            width,
            height,
            fps,
            pix_fmt: Some("yuv420p".to_string()),
        },
        audio_streams: vec![AudioStreamInfo {
            codec: Some("aac".to_string()),
            sample_rate: Some(48_000),
            channels: 2,
        }],
        duration_secs: 60.0,
        size_bytes: 4_000_000,
    }
}

/// Scripted encoder: records calls, tracks concurrency, optionally fails one
/// configuration, optionally writes the output file.
#[derive(Default)]
struct MockEncoder {
    fail_on: Option<(Resolution, u8)>,
    error_message: String,
    create_output: bool,
    delay: Option<Duration>,
    calls: Mutex<Vec<(Resolution, u8)>>,
    concurrent: AtomicUsize,
    max_concurrent: AtomicUsize,
}

impl MockEncoder {
    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Encoder for MockEncoder {
    fn encode(
        &self,
        _source: &SourceInfo,
        config: &EncodeConfig,
        output: &Path,
    ) -> CoreResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((config.resolution, config.crf));

        let in_flight = self.concurrent.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(in_flight, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        self.concurrent.fetch_sub(1, Ordering::SeqCst);

        if self.fail_on == Some((config.resolution, config.crf)) {
            return Err(CoreError::OperationFailed(self.error_message.clone()));
        }
        if self.create_output {
            fs::write(output, b"encoded")?;
        }
        Ok(())
    }
}

fn run_grid(
    encoder: Arc<MockEncoder>,
    source: &SourceInfo,
    resolutions: AxisSpec<Resolution>,
    quality: AxisSpec<u8>,
    threads: usize,
) -> (ResultMatrix, gridenc_core::BatchSummary) {
    let output_dir = tempdir().unwrap();
    let mut config = BatchConfig::new(output_dir.path().to_path_buf());
    config.resolution_axis = resolutions;
    config.quality_axis = quality;
    config.max_threads = threads;

    let res = resolution_axis(&config.resolution_axis).unwrap();
    let crf = quality_axis(&config.quality_axis).unwrap();
    let tasks = build_grid(&res, &crf, config.frame_rate, config.keep_audio);
    let matrix = ResultMatrix::new(crf.len(), res.len());

    let scheduler = BatchScheduler::new(encoder).max_threads(threads);
    let summary = scheduler
        .run(source, &config, &tasks, &matrix, &AtomicBool::new(false))
        .unwrap();
    // Keep the tempdir alive until here; outputs are not inspected further.
    drop(output_dir);
    (matrix, summary)
}

#[test]
fn all_cells_succeed_on_happy_path() {
    let encoder = Arc::new(MockEncoder {
        create_output: true,
        ..Default::default()
    });
    let source = test_source(1920, 1080, 60.0);
    let (matrix, summary) = run_grid(
        Arc::clone(&encoder),
        &source,
        AxisSpec::new(Resolution::R720p, Resolution::R1080p, 2),
        AxisSpec::new(20, 35, 2),
        2,
    );

    assert_eq!(summary.success_count, 4);
    assert_eq!(summary.total_tasks, 4);
    assert!(matrix.is_complete());
    assert_eq!(encoder.call_count(), 4);
    for row in 0..2 {
        for col in 0..2 {
            assert!(matches!(matrix.cell(row, col), CellState::Succeeded(_)));
        }
    }
}

#[test]
fn single_failure_is_isolated() {
    let encoder = Arc::new(MockEncoder {
        create_output: true,
        fail_on: Some((Resolution::R720p, 35)),
        error_message: "simulated encoder crash".to_string(),
        ..Default::default()
    });
    let source = test_source(1920, 1080, 60.0);
    let (matrix, summary) = run_grid(
        Arc::clone(&encoder),
        &source,
        AxisSpec::new(Resolution::R720p, Resolution::R1080p, 2),
        AxisSpec::new(20, 35, 2),
        2,
    );

    assert_eq!(summary.success_count, 3);
    assert_eq!(summary.total_tasks, 4);
    assert!(matrix.is_complete());

    // Quality axis descends: row 0 is CRF 35; column 0 is 720p.
    match matrix.cell(0, 0) {
        CellState::Failed(msg) => assert!(
            msg.contains("simulated encoder crash"),
            "unexpected message: {msg}"
        ),
        other => panic!("expected failed cell, got {other:?}"),
    }
    assert!(matches!(matrix.cell(0, 1), CellState::Succeeded(_)));
    assert!(matches!(matrix.cell(1, 0), CellState::Succeeded(_)));
    assert!(matches!(matrix.cell(1, 1), CellState::Succeeded(_)));
}

#[test]
fn concurrency_limit_is_respected() {
    for threads in [1usize, 2, 4] {
        let encoder = Arc::new(MockEncoder {
            create_output: true,
            delay: Some(Duration::from_millis(25)),
            ..Default::default()
        });
        let source = test_source(3840, 2160, 60.0);
        let (_, summary) = run_grid(
            Arc::clone(&encoder),
            &source,
            AxisSpec::new(Resolution::R240p, Resolution::R1080p, 4),
            AxisSpec::new(20, 35, 2),
            threads,
        );

        assert_eq!(summary.total_tasks, 8);
        assert_eq!(encoder.call_count(), 8);
        let observed = encoder.max_concurrent.load(Ordering::SeqCst);
        assert!(
            observed <= threads,
            "observed {observed} concurrent encodes with limit {threads}"
        );
    }
}

#[test]
fn upscaling_cells_fail_without_invoking_encoder() {
    let encoder = Arc::new(MockEncoder {
        create_output: true,
        ..Default::default()
    });
    // Source is 1080p; the axis reaches 1440p, so the last column upscales.
    let source = test_source(1920, 1080, 60.0);
    let (matrix, summary) = run_grid(
        Arc::clone(&encoder),
        &source,
        AxisSpec::new(Resolution::R720p, Resolution::R1440p, 3),
        AxisSpec::new(23, 23, 1),
        2,
    );

    assert_eq!(summary.total_tasks, 3);
    assert_eq!(summary.success_count, 2);
    match matrix.cell(0, 2) {
        CellState::Failed(msg) => {
            assert!(msg.contains("Resolution upscaling detected"), "got: {msg}");
        }
        other => panic!("expected failed cell, got {other:?}"),
    }
    // The rejected configuration never reached the encoder.
    let calls = encoder.calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert!(!calls.iter().any(|(res, _)| *res == Resolution::R1440p));
}

#[test]
fn unreadable_output_after_success_is_its_own_failure() {
    // Encoder reports success but never writes the file.
    let encoder = Arc::new(MockEncoder::default());
    let source = test_source(1920, 1080, 60.0);
    let (matrix, summary) = run_grid(
        Arc::clone(&encoder),
        &source,
        AxisSpec::new(Resolution::R720p, Resolution::R720p, 1),
        AxisSpec::new(23, 23, 1),
        1,
    );

    assert_eq!(summary.success_count, 0);
    assert_eq!(summary.total_tasks, 1);
    match matrix.cell(0, 0) {
        CellState::Failed(msg) => assert!(
            msg.contains("output file size could not be read"),
            "got: {msg}"
        ),
        other => panic!("expected failed cell, got {other:?}"),
    }
}

#[test]
fn injected_metadata_provider_reports_sizes() {
    struct FixedSize;
    impl FileMetadataProvider for FixedSize {
        fn get_size(&self, _path: &Path) -> CoreResult<u64> {
            Ok(42)
        }
    }

    let encoder = Arc::new(MockEncoder::default());
    let source = test_source(1920, 1080, 60.0);
    let output_dir = tempdir().unwrap();
    let mut config = BatchConfig::new(output_dir.path().to_path_buf());
    config.resolution_axis = AxisSpec::new(Resolution::R720p, Resolution::R720p, 1);
    config.quality_axis = AxisSpec::new(23, 23, 1);

    let res = resolution_axis(&config.resolution_axis).unwrap();
    let crf = quality_axis(&config.quality_axis).unwrap();
    let tasks = build_grid(&res, &crf, config.frame_rate, config.keep_audio);
    let matrix = ResultMatrix::new(1, 1);

    let scheduler = BatchScheduler::new(encoder)
        .max_threads(1)
        .metadata_provider(Arc::new(FixedSize));
    scheduler
        .run(&source, &config, &tasks, &matrix, &AtomicBool::new(false))
        .unwrap();

    match matrix.cell(0, 0) {
        CellState::Succeeded(output) => assert_eq!(output.size_bytes, 42),
        other => panic!("expected succeeded cell, got {other:?}"),
    }
}
