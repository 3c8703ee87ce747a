//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::DateTime;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::Array2;
use tracing::debug;

use qbench_adapter_sim::SimulatorBackend;
use qbench_bench::{ComplexMatrix, FileCache, Session, Timestamp};

use crate::config::Config;

/// Matrices wider than this are summarized instead of printed.
const MAX_PRINTED_DIM: usize = 4;

/// Create a simulator session from the configuration.
pub fn build_session(config: &Config, shots: Option<u32>) -> Result<Session> {
    let mut backend = SimulatorBackend::new();
    if let Some(seed) = config.session.seed {
        backend = backend.with_seed(seed);
    }
    if let Some(readout) = &config.session.readout_error {
        backend = backend.with_readout_error(readout.clone());
    }
    let shots = shots.unwrap_or(config.session.shots);
    Session::new(Arc::new(backend), shots).context("Failed to create session")
}

/// Open the file cache, creating its root directory.
pub fn open_cache(config: &Config, dir: Option<&Path>) -> Result<FileCache> {
    let root = match dir {
        Some(dir) => dir.to_path_buf(),
        None => config.cache_dir()?,
    };
    fs::create_dir_all(&root)
        .with_context(|| format!("Failed to create cache directory: {}", root.display()))?;
    debug!(root = %root.display(), "opened result cache");
    Ok(FileCache::new(root))
}

/// A steadily ticking spinner with `message`.
pub fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Timestamp with its UTC wall-clock rendering.
pub fn format_timestamp(timestamp: Timestamp) -> String {
    match DateTime::from_timestamp(timestamp.0, 0) {
        Some(time) => format!("{timestamp} ({})", time.format("%Y-%m-%d %H:%M:%S UTC")),
        None => timestamp.to_string(),
    }
}

/// Write `contents` to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, contents)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            println!(
                "{} Wrote {}",
                style("✓").green().bold(),
                style(path.display()).green()
            );
        }
        None => print!("{contents}"),
    }
    Ok(())
}

/// Print a real matrix row by row.
pub fn print_real_matrix(matrix: &Array2<f64>) {
    if matrix.nrows() > MAX_PRINTED_DIM * 4 {
        println!("  {}x{} matrix", matrix.nrows(), matrix.ncols());
        return;
    }
    for row in matrix.rows() {
        let cells: Vec<String> = row.iter().map(|v| format!("{v:>8.4}")).collect();
        println!("  {}", cells.join(" "));
    }
}

/// Print a complex matrix, or its diagonal when it is large.
pub fn print_complex_matrix(matrix: &ComplexMatrix) {
    if matrix.nrows() > MAX_PRINTED_DIM {
        let diagonal: Vec<String> = matrix.diag().iter().map(|z| format!("{:.4}", z.re)).collect();
        println!(
            "  {}x{} matrix, diagonal: [{}]",
            matrix.nrows(),
            matrix.ncols(),
            diagonal.join(", ")
        );
        return;
    }
    for row in matrix.rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|z| format!("{:>7.4}{:+.4}i", z.re, z.im))
            .collect();
        println!("  {}", cells.join("  "));
    }
}
