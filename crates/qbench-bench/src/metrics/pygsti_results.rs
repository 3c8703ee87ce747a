//! Measured counts exported as a PyGSTi dataset.

use super::{Metric, MetricInputs};
use crate::error::BenchResult;
use crate::pygsti::PyGstiDataset;
use crate::task::Task;
use crate::workflow::PyGstiSource;

/// Pairs each input circuit string with its measured counts.
#[derive(Debug, Clone)]
pub struct PyGstiResults<W> {
    workflow: W,
}

impl<W: PyGstiSource> PyGstiResults<W> {
    pub fn new(workflow: W) -> Self {
        Self { workflow }
    }
}

impl<W: PyGstiSource> Metric for PyGstiResults<W> {
    type Value = PyGstiDataset;
    type Workflow = W;

    fn name(&self) -> &'static str {
        "pygsti_results"
    }

    fn required_tasks(&self) -> &'static [Task] {
        &[Task::MeasureCounts, Task::Session]
    }

    fn workflow(&self) -> &W {
        &self.workflow
    }

    fn compute(&self, inputs: &MetricInputs) -> BenchResult<PyGstiDataset> {
        PyGstiDataset::new(
            self.workflow.circuit_strings(),
            inputs.measured_counts()?,
            self.workflow.num_qubits(),
        )
    }
}
