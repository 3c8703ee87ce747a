//! Cache inspection commands.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use qbench_bench::{Task, TaskCache};

use super::common::{format_timestamp, open_cache};
use crate::config::Config;

/// List the cached runs of `workflow`, task by task.
pub fn execute_list(workflow: &str, cache_dir: Option<&Path>, config: &Config) -> Result<()> {
    let cache = open_cache(config, cache_dir)?;
    println!(
        "{} {} in {}",
        style("Workflow:").bold(),
        style(workflow).cyan(),
        style(cache.root().display()).dim()
    );

    let mut total = 0;
    for task in Task::ALL {
        let timestamps = cache
            .timestamps(workflow, task)
            .with_context(|| format!("Failed to list {task} entries"))?;
        if timestamps.is_empty() {
            continue;
        }
        total += timestamps.len();
        println!("  {}", style(task).yellow());
        for timestamp in timestamps {
            println!("    {}", format_timestamp(timestamp));
        }
    }

    if total == 0 {
        println!("  {}", style("no cached entries").dim());
    }
    Ok(())
}
