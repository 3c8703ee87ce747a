//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - quantum benchmarking with cached execution and tomography",
        style("qbench").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qbench-ir           Circuit intermediate representation");
    println!("  qbench-hal          Circuit executor abstraction and counts");
    println!("  qbench-adapter-sim  Statevector simulator with readout noise");
    println!("  qbench-bench        Workflows, result cache, tomography and metrics");
    println!("  qbench-cli          Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
