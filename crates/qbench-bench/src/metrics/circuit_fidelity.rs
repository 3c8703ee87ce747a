//! Normalized Hellinger fidelity between measured and ideal counts.

use qbench_hal::Counts;

use super::{Metric, MetricInputs, length_mismatch};
use crate::error::{BenchError, BenchResult};
use crate::task::Task;
use crate::workflow::Workflow;

/// Classical fidelity `(Σ √(p·q))²` of two distributions.
pub fn hellinger_fidelity(p: &[f64], q: &[f64]) -> f64 {
    let overlap: f64 = p
        .iter()
        .zip(q)
        .map(|(a, b)| (a.max(0.0) * b.max(0.0)).sqrt())
        .sum();
    overlap * overlap
}

/// Hellinger fidelity of `measured` against `ideal`, rescaled so that the
/// uniform distribution scores 0 and a perfect match scores 1.
///
/// When the ideal distribution is itself uniform the raw fidelity is
/// returned.
pub fn normalized_fidelity(measured: &Counts, ideal: &Counts) -> BenchResult<f64> {
    if measured.width() != ideal.width() {
        return Err(BenchError::shape(format!(
            "measured counts have {:?}-bit outcomes, ideal counts {:?}-bit",
            measured.width(),
            ideal.width()
        )));
    }
    let p = measured.probabilities();
    let q = ideal.probabilities();
    let uniform = vec![1.0 / q.len() as f64; q.len()];

    let fidelity = hellinger_fidelity(&p, &q);
    let baseline = hellinger_fidelity(&uniform, &q);
    if (1.0 - baseline).abs() < 1e-12 {
        return Ok(fidelity);
    }
    Ok(((fidelity - baseline) / (1.0 - baseline)).max(0.0))
}

/// Per-circuit normalized fidelity of the measured counts.
#[derive(Debug, Clone)]
pub struct CircuitFidelity<W> {
    workflow: W,
}

impl<W: Workflow> CircuitFidelity<W> {
    pub fn new(workflow: W) -> Self {
        Self { workflow }
    }
}

impl<W: Workflow> Metric for CircuitFidelity<W> {
    type Value = Vec<f64>;
    type Workflow = W;

    fn name(&self) -> &'static str {
        "circuit_fidelity"
    }

    fn required_tasks(&self) -> &'static [Task] {
        &[Task::MeasureCounts, Task::IdealCounts, Task::Session]
    }

    fn workflow(&self) -> &W {
        &self.workflow
    }

    fn compute(&self, inputs: &MetricInputs) -> BenchResult<Vec<f64>> {
        let measured = inputs.measured_counts()?;
        let ideal = inputs.ideal_counts()?;
        if measured.len() != ideal.len() {
            return Err(length_mismatch("circuit fidelity", measured.len(), ideal.len()));
        }
        measured
            .iter()
            .zip(ideal)
            .map(|(m, i)| normalized_fidelity(m, i))
            .collect()
    }
}
