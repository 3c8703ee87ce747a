//! Memoized task execution.
//!
//! The [`TaskRunner`] decides, per run, whether the requested tasks can be
//! served from the cache or whether the workflow must execute again. All
//! tasks produced together share one [`Timestamp`].

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use tracing::instrument;

use crate::cache::TaskCache;
use crate::error::{BenchError, BenchResult};
use crate::task::{Artifact, Task, Timestamp};
use crate::workflow::Workflow;

/// Logs at `info` when the caller asked for progress, `debug` otherwise.
macro_rules! progress {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

/// Runs workflows against a cache and holds the artifacts of the last run.
pub struct TaskRunner<'c> {
    cache: &'c dyn TaskCache,
    results: FxHashMap<Task, Artifact>,
    timestamp: Option<Timestamp>,
}

impl<'c> TaskRunner<'c> {
    /// Create a runner over `cache`.
    pub fn new(cache: &'c dyn TaskCache) -> Self {
        Self {
            cache,
            results: FxHashMap::default(),
            timestamp: None,
        }
    }

    /// Timestamp of the last successful run.
    pub fn timestamp(&self) -> Option<Timestamp> {
        self.timestamp
    }

    /// Artifact of `task` from the last successful run.
    pub fn artifact(&self, task: Task) -> Option<&Artifact> {
        self.results.get(&task)
    }

    /// Remove and return the artifact of `task`.
    pub fn take_artifact(&mut self, task: Task) -> Option<Artifact> {
        self.results.remove(&task)
    }

    /// Resolve `tasks` for `workflow`.
    ///
    /// Without `force_new`, and when every requested task has a cached
    /// entry, the latest entries are loaded and the most recent of their
    /// timestamps is returned. Otherwise the workflow executes once and
    /// every artifact is written under a fresh timestamp, later than any
    /// cached one.
    #[instrument(skip(self, workflow), fields(workflow = workflow.identifier()))]
    pub fn run<W: Workflow + ?Sized>(
        &mut self,
        workflow: &W,
        tasks: &[Task],
        force_new: bool,
        verbose: bool,
    ) -> BenchResult<Timestamp> {
        self.results.clear();
        self.timestamp = None;

        let tasks: BTreeSet<Task> = tasks.iter().copied().collect();
        if tasks.is_empty() {
            return Err(BenchError::InvalidConfig("no tasks requested".into()));
        }
        if let Some(&task) = tasks.iter().find(|&&task| !workflow.supports(task)) {
            return Err(workflow.unsupported(task));
        }

        let id = workflow.identifier();
        let mut latest = Vec::with_capacity(tasks.len());
        for &task in &tasks {
            latest.push((task, self.cache.latest_timestamp(id, task)?));
        }

        let cached: Option<Vec<(Task, Timestamp)>> =
            latest.iter().map(|&(task, ts)| ts.map(|ts| (task, ts))).collect();

        let timestamp = match cached {
            Some(entries) if !force_new => self.load(id, &entries, verbose)?,
            _ => {
                let newest = latest.iter().filter_map(|&(_, ts)| ts).max();
                let now = Timestamp::now();
                let timestamp = match newest {
                    Some(ts) if ts >= now => ts.next(),
                    _ => now,
                };
                self.execute(workflow, &tasks, timestamp, verbose)?;
                timestamp
            }
        };

        self.timestamp = Some(timestamp);
        Ok(timestamp)
    }

    fn load(
        &mut self,
        id: &str,
        entries: &[(Task, Timestamp)],
        verbose: bool,
    ) -> BenchResult<Timestamp> {
        let mut newest = None;
        for &(task, ts) in entries {
            let bytes = self.cache.read(id, task, ts)?.ok_or_else(|| {
                BenchError::storage(id, task, Some(ts), "cached entry disappeared")
            })?;
            let artifact: Artifact = serde_json::from_slice(&bytes)
                .map_err(|e| BenchError::storage(id, task, Some(ts), e))?;
            if artifact.task() != task {
                return Err(BenchError::storage(
                    id,
                    task,
                    Some(ts),
                    format!("entry holds a '{}' artifact", artifact.task()),
                ));
            }
            progress!(verbose, workflow = id, task = %task, timestamp = %ts, "loaded cached artifact");
            self.results.insert(task, artifact);
            newest = newest.max(Some(ts));
        }
        newest.ok_or_else(|| BenchError::InvalidConfig("no tasks requested".into()))
    }

    fn execute<W: Workflow + ?Sized>(
        &mut self,
        workflow: &W,
        tasks: &BTreeSet<Task>,
        timestamp: Timestamp,
        verbose: bool,
    ) -> BenchResult<()> {
        let id = workflow.identifier();
        progress!(verbose, workflow = id, timestamp = %timestamp, tasks = tasks.len(), "executing workflow");

        // Produce everything before writing anything, so a failing hook
        // leaves no partial batch behind.
        let mut produced = Vec::with_capacity(tasks.len());
        for &task in tasks {
            let artifact = workflow
                .try_produce(task)
                .ok_or_else(|| workflow.unsupported(task))??;
            progress!(verbose, workflow = id, task = %task, "produced artifact");
            produced.push(artifact);
        }

        for artifact in produced {
            let task = artifact.task();
            let bytes = serde_json::to_vec_pretty(&artifact)
                .map_err(|e| BenchError::storage(id, task, Some(timestamp), e))?;
            self.cache.write(id, task, timestamp, &bytes)?;
            self.results.insert(task, artifact);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::session::Session;
    use crate::workflow::SpamBenchmark;
    use qbench_adapter_sim::SimulatorBackend;
    use std::sync::Arc;

    fn spam() -> SpamBenchmark {
        let session = Session::new(Arc::new(SimulatorBackend::new().with_seed(7)), 200).unwrap();
        SpamBenchmark::new(1, session).unwrap()
    }

    #[test]
    fn test_second_run_reuses_cache() {
        let cache = MemoryCache::new();
        let mut runner = TaskRunner::new(&cache);
        let workflow = spam();
        let tasks = [Task::MeasureCounts, Task::Session];

        let first = runner.run(&workflow, &tasks, false, false).unwrap();
        let counts = runner.artifact(Task::MeasureCounts).cloned();
        assert_eq!(cache.len(), 2);

        let second = runner.run(&workflow, &tasks, false, true).unwrap();
        assert_eq!(first, second);
        assert_eq!(runner.artifact(Task::MeasureCounts).cloned(), counts);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_force_new_bumps_timestamp() {
        let cache = MemoryCache::new();
        let mut runner = TaskRunner::new(&cache);
        let workflow = spam();
        let first = runner.run(&workflow, &[Task::MeasureCounts], false, false).unwrap();
        let second = runner.run(&workflow, &[Task::MeasureCounts], true, false).unwrap();
        assert!(second > first);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_partial_cache_runs_everything() {
        let cache = MemoryCache::new();
        let mut runner = TaskRunner::new(&cache);
        let workflow = spam();
        let first = runner.run(&workflow, &[Task::MeasureCounts], false, false).unwrap();
        let second = runner
            .run(&workflow, &[Task::MeasureCounts, Task::IdealCounts], false, false)
            .unwrap();
        assert!(second > first);
        assert!(runner.artifact(Task::IdealCounts).is_some());
        assert_eq!(runner.timestamp(), Some(second));
    }

    #[test]
    fn test_unsupported_task_fails_before_io() {
        let cache = MemoryCache::new();
        let mut runner = TaskRunner::new(&cache);
        let err = runner
            .run(&spam(), &[Task::MeasureCounts, Task::IdealProcess], false, false)
            .unwrap_err();
        assert!(matches!(
            err,
            BenchError::Capability {
                task: Task::IdealProcess,
                ..
            }
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_mismatched_cache_entry_is_storage_error() {
        let cache = MemoryCache::new();
        let bytes = serde_json::to_vec(&Artifact::Sessions(vec![])).unwrap();
        cache
            .write("SPAMBenchmark", Task::MeasureCounts, Timestamp(10), &bytes)
            .unwrap();
        let mut runner = TaskRunner::new(&cache);
        let err = runner
            .run(&spam(), &[Task::MeasureCounts], false, false)
            .unwrap_err();
        assert!(matches!(err, BenchError::Storage { .. }));
    }
}
