//! PyGSTi command implementation.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use qbench_bench::{Metric, PyGstiBenchmark, PyGstiResults};

use super::common::{build_session, format_timestamp, open_cache, spinner, write_output};
use crate::config::Config;

/// Execute a circuit list and emit the PyGSTi dataset.
#[allow(clippy::too_many_arguments)]
pub fn execute(
    input: &Path,
    qubits: usize,
    shots: Option<u32>,
    force_new: bool,
    cache_dir: Option<&Path>,
    output: Option<&Path>,
    config: &Config,
    verbose: bool,
) -> Result<()> {
    let file = File::open(input)
        .with_context(|| format!("Failed to open circuit list: {}", input.display()))?;
    let session = build_session(config, shots)?;
    let workflow = PyGstiBenchmark::new(BufReader::new(file), qubits, session)
        .with_context(|| format!("Failed to parse circuit list: {}", input.display()))?;
    let cache = open_cache(config, cache_dir)?;

    let metric = PyGstiResults::new(workflow);
    let progress = spinner(format!("Executing circuits from {}...", input.display()));
    let values = metric.evaluate(&cache, force_new, verbose, None);
    progress.finish_and_clear();

    let (timestamp, dataset) = values?
        .pop_last()
        .context("No dataset was produced")?;

    if output.is_some() {
        println!(
            "{} {} circuits on {} qubit(s), run {}",
            style("✓").green().bold(),
            dataset.rows().len(),
            dataset.num_qubits(),
            format_timestamp(timestamp)
        );
    }
    write_output(output, &dataset.to_text())
}
