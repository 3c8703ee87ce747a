//! Evaluate command implementation.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use console::style;
use ndarray::Array2;
use serde::Serialize;

use qbench_bench::tomography::calculate_average_gate_fidelity;
use qbench_bench::{
    CircuitFidelity, ComplexMatrix, ConfusionMatrix, FileCache, Metric, ProcessTomography,
    QuantumProcessFidelity, QuantumProcessMatrix, QuantumStateDensity, QuantumStateFidelity,
    Rotation, RotationSweep, Session, SpamBenchmark, SpamConfusionMatrix, StateTomography,
    Timestamp, Workflow,
};

use super::common::{
    build_session, format_timestamp, open_cache, print_complex_matrix, print_real_matrix,
    spinner, write_output,
};
use crate::config::Config;

/// Arguments of `qbench evaluate`.
#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Metric to compute
    #[arg(short, long, value_enum)]
    pub metric: MetricKind,

    /// Workflow producing the circuits
    #[arg(short, long, value_enum, default_value = "rotation-sweep")]
    pub workflow: WorkflowKind,

    /// Rotation axis per qubit for the sweep (e.g. "YX")
    #[arg(long, default_value = "X")]
    pub rotations: String,

    /// First sweep angle in degrees
    #[arg(long, default_value_t = -90.0, allow_negative_numbers = true)]
    pub start: f64,

    /// Last sweep angle in degrees
    #[arg(long, default_value_t = 90.0, allow_negative_numbers = true)]
    pub end: f64,

    /// Number of sweep points
    #[arg(long, default_value_t = 2)]
    pub points: usize,

    /// Number of qubits for the SPAM workflow
    #[arg(short, long, default_value_t = 1)]
    pub qubits: usize,

    /// Shots per circuit (overrides the configuration)
    #[arg(short, long)]
    pub shots: Option<u32>,

    /// Always execute a new run instead of reusing cached results
    #[arg(long)]
    pub force_new: bool,

    /// Project reconstructed densities onto physical states
    #[arg(long)]
    pub mle: bool,

    /// Correct measured counts with a freshly evaluated confusion matrix
    #[arg(long)]
    pub spam_correct: bool,

    /// Cache identifier of the base workflow
    #[arg(long)]
    pub identifier: Option<String>,

    /// Cache directory (overrides the configuration)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Write results as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Metrics selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MetricKind {
    Confusion,
    CircuitFidelity,
    StateDensity,
    ProcessMatrix,
    StateFidelity,
    ProcessFidelity,
}

/// Base workflows selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum WorkflowKind {
    RotationSweep,
    Spam,
}

/// Value of one run, shaped for printing and JSON output.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Report {
    Matrix(Array2<f64>),
    Values(Vec<f64>),
    Matrices(Vec<ComplexMatrix>),
}

/// Result of one metric evaluation.
#[derive(Debug, Serialize)]
struct Evaluation {
    metric: &'static str,
    workflow: String,
    num_qubits: usize,
    results: BTreeMap<Timestamp, Report>,
}

struct EvalContext<'a> {
    cache: &'a FileCache,
    force_new: bool,
    verbose: bool,
    mle: bool,
    spam: Option<&'a SpamConfusionMatrix>,
}

/// Execute the evaluate command.
pub fn execute(args: &EvaluateArgs, config: &Config, verbose: bool) -> Result<()> {
    let session = build_session(config, args.shots)?;
    let cache = open_cache(config, args.cache_dir.as_deref())?;

    let spam = if args.spam_correct {
        let num_qubits = match args.workflow {
            WorkflowKind::Spam => args.qubits,
            WorkflowKind::RotationSweep => Rotation::parse_sequence(&args.rotations)?.len(),
        };
        Some(calibrate(&session, num_qubits, &cache, args.force_new, verbose)?)
    } else {
        None
    };

    let ctx = EvalContext {
        cache: &cache,
        force_new: args.force_new,
        verbose,
        mle: args.mle || config.tomography.maximum_likelihood,
        spam: spam.as_ref(),
    };

    let evaluation = match args.workflow {
        WorkflowKind::Spam => {
            let mut workflow = SpamBenchmark::new(args.qubits, session)?;
            if let Some(identifier) = &args.identifier {
                workflow = workflow.with_identifier(identifier);
            }
            if args.metric == MetricKind::Confusion {
                run(ConfusionMatrix::new(workflow), &ctx, Report::Matrix)?
            } else {
                dispatch(args.metric, workflow, &ctx)?
            }
        }
        WorkflowKind::RotationSweep => {
            let rotations = Rotation::parse_sequence(&args.rotations)?;
            let mut workflow =
                RotationSweep::new(rotations, args.start, args.end, args.points, session)?;
            if let Some(identifier) = &args.identifier {
                workflow = workflow.with_identifier(identifier);
            }
            dispatch(args.metric, workflow, &ctx)?
        }
    };

    print_evaluation(&evaluation);

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&evaluation)
            .context("Failed to serialize results")?;
        write_output(Some(path), &json)?;
    }

    Ok(())
}

/// Evaluate the confusion matrix of a SPAM benchmark on `num_qubits`.
fn calibrate(
    session: &Session,
    num_qubits: usize,
    cache: &FileCache,
    force_new: bool,
    verbose: bool,
) -> Result<SpamConfusionMatrix> {
    let metric = ConfusionMatrix::new(SpamBenchmark::new(num_qubits, session.clone())?);
    let progress = spinner(format!("Calibrating readout on {num_qubits} qubit(s)..."));
    let values = metric.evaluate(cache, force_new, verbose, None);
    progress.finish_and_clear();

    let (timestamp, matrix) = values?
        .pop_last()
        .context("Calibration produced no confusion matrix")?;
    println!(
        "{} Readout calibration from run {}",
        style("✓").green().bold(),
        format_timestamp(timestamp)
    );
    Ok(SpamConfusionMatrix::new(matrix)?)
}

fn dispatch<W: Workflow>(
    metric: MetricKind,
    workflow: W,
    ctx: &EvalContext<'_>,
) -> Result<Evaluation> {
    let tomography = |workflow: W| StateTomography::new(workflow).with_maximum_likelihood(ctx.mle);
    match metric {
        MetricKind::Confusion => bail!("The confusion metric requires --workflow spam"),
        MetricKind::CircuitFidelity => run(CircuitFidelity::new(workflow), ctx, Report::Values),
        MetricKind::StateDensity => run(
            QuantumStateDensity::new(tomography(workflow)),
            ctx,
            Report::Matrices,
        ),
        MetricKind::StateFidelity => run(
            QuantumStateFidelity::new(tomography(workflow)),
            ctx,
            Report::Values,
        ),
        MetricKind::ProcessMatrix => run(
            QuantumProcessMatrix::new(ProcessTomography::new(tomography(workflow))),
            ctx,
            Report::Matrices,
        ),
        MetricKind::ProcessFidelity => run(
            QuantumProcessFidelity::new(ProcessTomography::new(tomography(workflow))),
            ctx,
            Report::Values,
        ),
    }
}

fn run<M: Metric>(
    metric: M,
    ctx: &EvalContext<'_>,
    report: fn(M::Value) -> Report,
) -> Result<Evaluation> {
    let workflow = metric.workflow();
    let progress = spinner(format!(
        "Evaluating {} on {}...",
        metric.name(),
        workflow.identifier()
    ));
    let values = metric.evaluate(ctx.cache, ctx.force_new, ctx.verbose, ctx.spam);
    progress.finish_and_clear();

    let values = values
        .with_context(|| format!("Failed to evaluate {}", metric.name()))?;
    Ok(Evaluation {
        metric: metric.name(),
        workflow: workflow.identifier().to_string(),
        num_qubits: workflow.num_qubits(),
        results: values.into_iter().map(|(ts, v)| (ts, report(v))).collect(),
    })
}

fn print_evaluation(evaluation: &Evaluation) {
    println!(
        "{} {} on {}",
        style("Metric:").bold(),
        style(evaluation.metric).cyan(),
        style(&evaluation.workflow).cyan()
    );

    for (timestamp, report) in &evaluation.results {
        println!("  {} {}", style("Run").dim(), format_timestamp(*timestamp));
        match report {
            Report::Matrix(matrix) => print_real_matrix(matrix),
            Report::Values(values) => {
                for (i, value) in values.iter().enumerate() {
                    if evaluation.metric == "quantum_process_fidelity" {
                        let average =
                            calculate_average_gate_fidelity(*value, evaluation.num_qubits);
                        println!("  [{i:>3}] {value:.6}  (average gate fidelity {average:.6})");
                    } else {
                        println!("  [{i:>3}] {value:.6}");
                    }
                }
            }
            Report::Matrices(matrices) => {
                for (i, matrix) in matrices.iter().enumerate() {
                    println!("  [{i:>3}]");
                    print_complex_matrix(matrix);
                }
            }
        }
    }
}
