// gridenc-cli/src/main.rs
//
// CLI front end for gridenc-core: parses the sweep parameters, probes the
// source, starts the batch, drives an overall progress bar, and renders the
// per-cell result matrix once the batch finishes.

use std::process;
use std::sync::Arc;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use gridenc_core::{
    check_dependency, format_bytes, format_duration, probe, AxisSpec, BatchConfig,
    BatchController, BatchState, CellState, CoreResult, Resolution, ResultMatrix, SidecarEncoder,
    SourceInfo,
};

mod cli;

use cli::Cli;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Cli::parse();

    match run(args) {
        Ok(failed_cells) => {
            if failed_cells > 0 {
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    }
}

/// Runs the sweep; returns the number of cells that did not succeed.
fn run(args: Cli) -> CoreResult<usize> {
    check_dependency("ffmpeg")?;
    check_dependency("ffprobe")?;

    log::info!("Probing source: {}", args.input.display());
    let source = probe(&args.input)?;
    print_source_summary(&source);

    let mut config = BatchConfig::new(args.output_dir.clone());
    config.resolution_axis = AxisSpec::new(args.min_res, args.max_res, args.res_steps);
    config.quality_axis = AxisSpec::new(args.min_crf, args.max_crf, args.crf_steps);
    config.frame_rate = args.fps;
    config.keep_audio = !args.no_audio;
    config.max_threads = args.threads;

    let controller = BatchController::new(Arc::new(SidecarEncoder::new()));
    let handle = controller.start(source, config)?;

    let bar = ProgressBar::new(handle.total_tasks() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} cells")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let progress_bar = bar.clone();
    handle.subscribe_progress(move |completed, _total| {
        progress_bar.set_position(completed as u64);
    });

    let summary = handle.await_summary()?;
    bar.finish_and_clear();

    let matrix = handle.matrix();
    print_matrix(&matrix, handle.crf_values(), handle.resolutions());

    if handle.state() == BatchState::Cancelled {
        println!("\nBatch cancelled.");
    }
    println!(
        "\n{}/{} cells succeeded",
        summary.success_count, summary.total_tasks
    );

    Ok(summary.total_tasks - summary.success_count)
}

fn print_source_summary(source: &SourceInfo) {
    println!("Source: {}", source.path.display());
    println!(
        "  video:    {}x{} @ {:.2} fps",
        source.width(),
        source.height(),
        source.fps()
    );
    println!("  duration: {}", format_duration(source.duration_secs));
    println!(
        "  audio:    {} stream(s)",
        source.audio_streams.len()
    );
    println!("  size:     {}", format_bytes(source.size_bytes));
    println!();
}

fn cell_text(state: &CellState) -> String {
    match state {
        CellState::Pending => "-".to_string(),
        CellState::Running => "running".to_string(),
        CellState::Succeeded(output) => format_bytes(output.size_bytes),
        CellState::Failed(_) => "failed".to_string(),
    }
}

/// Renders the result matrix as a table: rows = CRF values (best first),
/// columns = resolutions (ascending), plus per-cell failure details below.
fn print_matrix(matrix: &ResultMatrix, crf_values: &[u8], resolutions: &[Resolution]) {
    let snapshot = matrix.snapshot();
    let row_labels: Vec<String> = crf_values.iter().map(|crf| format!("CRF {crf}")).collect();
    let headers: Vec<&str> = resolutions.iter().map(|r| r.label()).collect();

    let label_width = row_labels.iter().map(String::len).max().unwrap_or(0);
    let col_widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            snapshot
                .iter()
                .map(|row| cell_text(&row[col]).len())
                .chain(std::iter::once(header.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    print!("{:label_width$}", "");
    for (header, width) in headers.iter().zip(col_widths.iter().copied()) {
        print!("  {header:>width$}");
    }
    println!();

    for (row_label, row) in row_labels.iter().zip(&snapshot) {
        print!("{row_label:label_width$}");
        for (state, width) in row.iter().zip(col_widths.iter().copied()) {
            print!("  {:>width$}", cell_text(state));
        }
        println!();
    }

    let mut failures = Vec::new();
    for (row, states) in snapshot.iter().enumerate() {
        for (col, state) in states.iter().enumerate() {
            if let CellState::Failed(msg) = state {
                failures.push(format!(
                    "  CRF {} / {}: {msg}",
                    crf_values[row],
                    resolutions[col].label()
                ));
            }
        }
    }
    if !failures.is_empty() {
        println!("\nFailures:");
        for line in failures {
            println!("{line}");
        }
    }
}
