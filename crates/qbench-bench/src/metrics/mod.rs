//! Metric evaluation.
//!
//! A [`Metric`] names the tasks it needs, lets a [`TaskRunner`] resolve them
//! against the cache, then computes its value from the resulting
//! [`MetricInputs`]. Metrics are generic over the capability traits in
//! [`crate::workflow`], so any workflow with the right capability can feed
//! any metric.

mod circuit_fidelity;
mod confusion;
mod pygsti_results;
mod tomography;

pub use circuit_fidelity::{CircuitFidelity, hellinger_fidelity, normalized_fidelity};
pub use confusion::ConfusionMatrix;
pub use pygsti_results::PyGstiResults;
pub use tomography::{
    QuantumProcessFidelity, QuantumProcessMatrix, QuantumStateDensity, QuantumStateFidelity,
};

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use tracing::debug;

use qbench_hal::Counts;

use crate::cache::TaskCache;
use crate::error::{BenchError, BenchResult};
use crate::linalg::ComplexMatrix;
use crate::runner::TaskRunner;
use crate::session::SessionInfo;
use crate::spam::SpamConfusionMatrix;
use crate::task::{Artifact, Task, Timestamp};
use crate::workflow::Workflow;

/// Artifacts of one resolved run, with measured counts already corrected.
#[derive(Debug, Clone)]
pub struct MetricInputs {
    timestamp: Timestamp,
    artifacts: FxHashMap<Task, Artifact>,
}

impl MetricInputs {
    /// Bundle `artifacts`, applying `spam` to the measured counts.
    pub fn new(
        timestamp: Timestamp,
        mut artifacts: FxHashMap<Task, Artifact>,
        spam: Option<&SpamConfusionMatrix>,
    ) -> BenchResult<Self> {
        if let (Some(spam), Some(Artifact::MeasuredCounts(counts))) =
            (spam, artifacts.get_mut(&Task::MeasureCounts))
        {
            debug!(circuits = counts.len(), "applying SPAM correction");
            *counts = spam.correct_all(counts)?;
        }
        Ok(Self {
            timestamp,
            artifacts,
        })
    }

    /// Timestamp of the run the artifacts belong to.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn get(&self, task: Task) -> BenchResult<&Artifact> {
        self.artifacts.get(&task).ok_or_else(|| {
            BenchError::InvalidConfig(format!("metric input '{task}' was not resolved"))
        })
    }

    /// Measured counts, SPAM-corrected when a confusion matrix was given.
    pub fn measured_counts(&self) -> BenchResult<&[Counts]> {
        match self.get(Task::MeasureCounts)? {
            Artifact::MeasuredCounts(counts) => Ok(counts),
            other => Err(mismatch(Task::MeasureCounts, other)),
        }
    }

    /// Noiseless counts.
    pub fn ideal_counts(&self) -> BenchResult<&[Counts]> {
        match self.get(Task::IdealCounts)? {
            Artifact::IdealCounts(counts) => Ok(counts),
            other => Err(mismatch(Task::IdealCounts, other)),
        }
    }

    /// Ideal density matrices.
    pub fn ideal_densities(&self) -> BenchResult<&[ComplexMatrix]> {
        match self.get(Task::IdealDensity)? {
            Artifact::Densities(matrices) => Ok(matrices),
            other => Err(mismatch(Task::IdealDensity, other)),
        }
    }

    /// Ideal process matrices.
    pub fn ideal_processes(&self) -> BenchResult<&[ComplexMatrix]> {
        match self.get(Task::IdealProcess)? {
            Artifact::Processes(matrices) => Ok(matrices),
            other => Err(mismatch(Task::IdealProcess, other)),
        }
    }

    /// Session snapshots.
    pub fn sessions(&self) -> BenchResult<&[SessionInfo]> {
        match self.get(Task::Session)? {
            Artifact::Sessions(sessions) => Ok(sessions),
            other => Err(mismatch(Task::Session, other)),
        }
    }
}

fn mismatch(task: Task, artifact: &Artifact) -> BenchError {
    BenchError::InvalidConfig(format!(
        "metric input '{task}' holds a '{}' artifact",
        artifact.task()
    ))
}

/// A quantity computed from the artifacts of a workflow run.
pub trait Metric {
    /// Computed value.
    type Value;
    /// Workflow the metric draws its artifacts from.
    type Workflow: Workflow + ?Sized;

    /// Short human-readable name.
    fn name(&self) -> &'static str;

    /// Tasks that must be resolved before [`Metric::compute`].
    fn required_tasks(&self) -> &'static [Task];

    /// The wrapped workflow.
    fn workflow(&self) -> &Self::Workflow;

    /// Compute the value from resolved inputs.
    fn compute(&self, inputs: &MetricInputs) -> BenchResult<Self::Value>;

    /// Resolve the required tasks and compute the value.
    ///
    /// The result maps the timestamp of the resolved run to its value.
    fn evaluate(
        &self,
        cache: &dyn TaskCache,
        force_new: bool,
        verbose: bool,
        spam: Option<&SpamConfusionMatrix>,
    ) -> BenchResult<BTreeMap<Timestamp, Self::Value>> {
        let tasks = self.required_tasks();
        let mut runner = TaskRunner::new(cache);
        let timestamp = runner.run(self.workflow(), tasks, force_new, verbose)?;

        let artifacts = tasks
            .iter()
            .filter_map(|&task| runner.take_artifact(task).map(|a| (task, a)))
            .collect();
        let inputs = MetricInputs::new(timestamp, artifacts, spam)?;
        let value = self.compute(&inputs)?;
        debug!(
            metric = self.name(),
            workflow = self.workflow().identifier(),
            timestamp = %timestamp,
            "metric computed"
        );
        Ok(BTreeMap::from([(timestamp, value)]))
    }

    /// Compute the value for every cached batch holding all required tasks.
    ///
    /// Nothing is executed; an empty map means no complete batch is cached.
    fn history(
        &self,
        cache: &dyn TaskCache,
        spam: Option<&SpamConfusionMatrix>,
    ) -> BenchResult<BTreeMap<Timestamp, Self::Value>> {
        let id = self.workflow().identifier();
        let tasks = self.required_tasks();

        let mut common: Option<Vec<Timestamp>> = None;
        for &task in tasks {
            let stamps = cache.timestamps(id, task)?;
            common = Some(match common {
                None => stamps,
                Some(prev) => prev.into_iter().filter(|ts| stamps.contains(ts)).collect(),
            });
        }

        let mut values = BTreeMap::new();
        for timestamp in common.unwrap_or_default() {
            let mut artifacts = FxHashMap::default();
            for &task in tasks {
                let bytes = cache.read(id, task, timestamp)?.ok_or_else(|| {
                    BenchError::storage(id, task, Some(timestamp), "cached entry disappeared")
                })?;
                let artifact: Artifact = serde_json::from_slice(&bytes)
                    .map_err(|e| BenchError::storage(id, task, Some(timestamp), e))?;
                artifacts.insert(task, artifact);
            }
            let inputs = MetricInputs::new(timestamp, artifacts, spam)?;
            values.insert(timestamp, self.compute(&inputs)?);
        }
        Ok(values)
    }
}

/// Error for per-circuit inputs of different lengths.
pub(crate) fn length_mismatch(what: &str, left: usize, right: usize) -> BenchError {
    BenchError::shape(format!("{what}: {left} measured entries but {right} ideal entries"))
}
