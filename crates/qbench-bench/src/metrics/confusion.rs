//! Readout confusion matrix.

use ndarray::Array2;

use super::{Metric, MetricInputs};
use crate::error::BenchResult;
use crate::task::Task;
use crate::workflow::ConfusionSource;

/// Row-stochastic readout confusion matrix of a calibration workflow.
#[derive(Debug, Clone)]
pub struct ConfusionMatrix<W> {
    workflow: W,
}

impl<W: ConfusionSource> ConfusionMatrix<W> {
    pub fn new(workflow: W) -> Self {
        Self { workflow }
    }
}

impl<W: ConfusionSource> Metric for ConfusionMatrix<W> {
    type Value = Array2<f64>;
    type Workflow = W;

    fn name(&self) -> &'static str {
        "confusion_matrix"
    }

    fn required_tasks(&self) -> &'static [Task] {
        &[Task::MeasureCounts, Task::Session]
    }

    fn workflow(&self) -> &W {
        &self.workflow
    }

    fn compute(&self, inputs: &MetricInputs) -> BenchResult<Array2<f64>> {
        self.workflow.confusion_matrix(inputs.measured_counts()?)
    }
}
