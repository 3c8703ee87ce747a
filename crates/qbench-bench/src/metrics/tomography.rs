//! Tomographic reconstructions and their fidelities.

use super::{Metric, MetricInputs, length_mismatch};
use crate::error::BenchResult;
use crate::linalg::ComplexMatrix;
use crate::task::Task;
use crate::tomography::{calculate_process_fidelity, calculate_state_fidelity};
use crate::workflow::{ProcessReconstruction, StateReconstruction};

/// Reconstructed density matrix per base circuit.
#[derive(Debug, Clone)]
pub struct QuantumStateDensity<W> {
    workflow: W,
}

impl<W: StateReconstruction> QuantumStateDensity<W> {
    pub fn new(workflow: W) -> Self {
        Self { workflow }
    }
}

impl<W: StateReconstruction> Metric for QuantumStateDensity<W> {
    type Value = Vec<ComplexMatrix>;
    type Workflow = W;

    fn name(&self) -> &'static str {
        "quantum_state_density"
    }

    fn required_tasks(&self) -> &'static [Task] {
        &[Task::MeasureCounts, Task::Session]
    }

    fn workflow(&self) -> &W {
        &self.workflow
    }

    fn compute(&self, inputs: &MetricInputs) -> BenchResult<Vec<ComplexMatrix>> {
        self.workflow.reconstruct_densities(inputs.measured_counts()?)
    }
}

/// Reconstructed χ-matrix per base circuit.
#[derive(Debug, Clone)]
pub struct QuantumProcessMatrix<W> {
    workflow: W,
}

impl<W: ProcessReconstruction> QuantumProcessMatrix<W> {
    pub fn new(workflow: W) -> Self {
        Self { workflow }
    }
}

impl<W: ProcessReconstruction> Metric for QuantumProcessMatrix<W> {
    type Value = Vec<ComplexMatrix>;
    type Workflow = W;

    fn name(&self) -> &'static str {
        "quantum_process_matrix"
    }

    fn required_tasks(&self) -> &'static [Task] {
        &[Task::MeasureCounts, Task::Session]
    }

    fn workflow(&self) -> &W {
        &self.workflow
    }

    fn compute(&self, inputs: &MetricInputs) -> BenchResult<Vec<ComplexMatrix>> {
        self.workflow.reconstruct_processes(inputs.measured_counts()?)
    }
}

/// Uhlmann fidelity of each reconstructed state against its ideal.
#[derive(Debug, Clone)]
pub struct QuantumStateFidelity<W> {
    workflow: W,
}

impl<W: StateReconstruction> QuantumStateFidelity<W> {
    pub fn new(workflow: W) -> Self {
        Self { workflow }
    }
}

impl<W: StateReconstruction> Metric for QuantumStateFidelity<W> {
    type Value = Vec<f64>;
    type Workflow = W;

    fn name(&self) -> &'static str {
        "quantum_state_fidelity"
    }

    fn required_tasks(&self) -> &'static [Task] {
        &[Task::MeasureCounts, Task::IdealDensity, Task::Session]
    }

    fn workflow(&self) -> &W {
        &self.workflow
    }

    fn compute(&self, inputs: &MetricInputs) -> BenchResult<Vec<f64>> {
        let measured = self.workflow.reconstruct_densities(inputs.measured_counts()?)?;
        let ideal = inputs.ideal_densities()?;
        if measured.len() != ideal.len() {
            return Err(length_mismatch("state fidelity", measured.len(), ideal.len()));
        }
        measured
            .iter()
            .zip(ideal)
            .map(|(rho, sigma)| calculate_state_fidelity(rho, sigma))
            .collect()
    }
}

/// Process fidelity of each reconstructed χ-matrix against its ideal.
#[derive(Debug, Clone)]
pub struct QuantumProcessFidelity<W> {
    workflow: W,
}

impl<W: ProcessReconstruction> QuantumProcessFidelity<W> {
    pub fn new(workflow: W) -> Self {
        Self { workflow }
    }
}

impl<W: ProcessReconstruction> Metric for QuantumProcessFidelity<W> {
    type Value = Vec<f64>;
    type Workflow = W;

    fn name(&self) -> &'static str {
        "quantum_process_fidelity"
    }

    fn required_tasks(&self) -> &'static [Task] {
        &[Task::MeasureCounts, Task::IdealProcess, Task::Session]
    }

    fn workflow(&self) -> &W {
        &self.workflow
    }

    fn compute(&self, inputs: &MetricInputs) -> BenchResult<Vec<f64>> {
        let measured = self.workflow.reconstruct_processes(inputs.measured_counts()?)?;
        let ideal = inputs.ideal_processes()?;
        if measured.len() != ideal.len() {
            return Err(length_mismatch("process fidelity", measured.len(), ideal.len()));
        }
        measured
            .iter()
            .zip(ideal)
            .map(|(chi, ideal)| calculate_process_fidelity(chi, ideal))
            .collect()
    }
}
