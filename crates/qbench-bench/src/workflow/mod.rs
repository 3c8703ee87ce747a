//! Benchmark workflows.
//!
//! A [`Workflow`] owns the circuits of one experiment and knows which
//! [`Task`]s it can produce. Measured counts and session snapshots come for
//! free from the session; ideal artifacts are opt-in per workflow.
//!
//! Metrics never name a concrete workflow type. They bound on the capability
//! traits in this module instead ([`ConfusionSource`], [`PyGstiSource`],
//! [`StateReconstruction`], [`ProcessReconstruction`]).

mod pygsti;
mod rotation_sweep;
mod simple;
mod spam;

pub use pygsti::PyGstiBenchmark;
pub use rotation_sweep::{Rotation, RotationSweep};
pub use simple::SimpleCircuitExecution;
pub use spam::SpamBenchmark;

use std::hash::{Hash, Hasher};

use ndarray::Array2;
use rustc_hash::FxHasher;
use tracing::debug;

use qbench_hal::Counts;
use qbench_ir::Circuit;

use crate::error::{BenchError, BenchResult};
use crate::linalg::ComplexMatrix;
use crate::session::{Session, SessionInfo};
use crate::task::{Artifact, Task};

/// A circuit-generating benchmark experiment.
pub trait Workflow {
    /// Cache namespace of this workflow instance.
    fn identifier(&self) -> &str;

    /// Session the circuits execute in.
    fn session(&self) -> &Session;

    /// Width of every circuit.
    fn num_qubits(&self) -> usize;

    /// The circuits to execute, in result order.
    fn circuits(&self) -> BenchResult<Vec<Circuit>>;

    /// Whether `task` has a producing hook.
    fn supports(&self, task: Task) -> bool {
        matches!(task, Task::MeasureCounts | Task::Session)
    }

    /// Execute every circuit through the session executor.
    fn measure_counts(&self) -> BenchResult<Vec<Counts>> {
        let circuits = self.circuits()?;
        debug!(
            workflow = self.identifier(),
            circuits = circuits.len(),
            "executing circuits"
        );
        circuits
            .iter()
            .map(|circuit| self.session().execute(circuit))
            .collect()
    }

    /// Noiseless counts, one per circuit.
    fn ideal_counts(&self) -> BenchResult<Vec<Counts>> {
        Err(self.unsupported(Task::IdealCounts))
    }

    /// Ideal density matrices, one per base circuit.
    fn ideal_densities(&self) -> BenchResult<Vec<ComplexMatrix>> {
        Err(self.unsupported(Task::IdealDensity))
    }

    /// Ideal process matrices, one per base circuit.
    fn ideal_processes(&self) -> BenchResult<Vec<ComplexMatrix>> {
        Err(self.unsupported(Task::IdealProcess))
    }

    /// Snapshot of the session.
    fn session_infos(&self) -> BenchResult<Vec<SessionInfo>> {
        Ok(vec![self.session().info(self.num_qubits())])
    }

    /// Produce the artifact for `task`, or `None` when unsupported.
    fn try_produce(&self, task: Task) -> Option<BenchResult<Artifact>> {
        if !self.supports(task) {
            return None;
        }
        Some(match task {
            Task::MeasureCounts => self.measure_counts().map(Artifact::MeasuredCounts),
            Task::IdealCounts => self.ideal_counts().map(Artifact::IdealCounts),
            Task::IdealDensity => self.ideal_densities().map(Artifact::Densities),
            Task::IdealProcess => self.ideal_processes().map(Artifact::Processes),
            Task::Session => self.session_infos().map(Artifact::Sessions),
        })
    }

    /// Capability error for `task`.
    fn unsupported(&self, task: Task) -> BenchError {
        BenchError::Capability {
            workflow: self.identifier().to_string(),
            task,
        }
    }
}

/// Workflows whose measured counts calibrate readout.
pub trait ConfusionSource: Workflow {
    /// Row-stochastic confusion matrix from the measured counts.
    fn confusion_matrix(&self, counts: &[Counts]) -> BenchResult<Array2<f64>>;
}

/// Workflows replaying PyGSTi circuit strings.
pub trait PyGstiSource: Workflow {
    /// Input circuit strings, in circuit order.
    fn circuit_strings(&self) -> &[String];
}

/// Workflows whose measured counts determine density matrices.
pub trait StateReconstruction: Workflow {
    /// One density matrix per base circuit.
    fn reconstruct_densities(&self, counts: &[Counts]) -> BenchResult<Vec<ComplexMatrix>>;
}

/// Workflows whose measured counts determine process matrices.
pub trait ProcessReconstruction: Workflow {
    /// One χ-matrix per base circuit.
    fn reconstruct_processes(&self, counts: &[Counts]) -> BenchResult<Vec<ComplexMatrix>>;
}

/// `<prefix>_<digest>`, so workflows built from different circuits never
/// share cache entries.
pub(crate) fn content_identifier(prefix: &str, content: impl Hash) -> String {
    let mut hasher = FxHasher::default();
    content.hash(&mut hasher);
    format!("{prefix}_{:016x}", hasher.finish())
}
