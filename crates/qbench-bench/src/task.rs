//! Task kinds, execution timestamps and the artifacts tasks produce.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use qbench_hal::Counts;

use crate::linalg::ComplexMatrix;
use crate::session::SessionInfo;

/// A kind of artifact a workflow can derive.
///
/// Selects both the workflow hook that produces the artifact and the cache
/// slot it is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    /// Counts measured by the circuit executor.
    MeasureCounts,
    /// Noiseless counts computed without the executor.
    IdealCounts,
    /// Ideal density matrix per base circuit.
    IdealDensity,
    /// Ideal process matrix per base circuit.
    IdealProcess,
    /// Snapshot of the execution session.
    Session,
}

impl Task {
    /// Every task kind.
    pub const ALL: [Task; 5] = [
        Task::MeasureCounts,
        Task::IdealCounts,
        Task::IdealDensity,
        Task::IdealProcess,
        Task::Session,
    ];

    /// Stable cache slot name.
    pub fn name(self) -> &'static str {
        match self {
            Task::MeasureCounts => "measured_counts",
            Task::IdealCounts => "ideal_counts",
            Task::IdealDensity => "ideal_densities",
            Task::IdealProcess => "ideal_processes",
            Task::Session => "session_infos",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifies one execution batch, in seconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current wall-clock time.
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    /// The following second.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The payload produced for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Artifact {
    /// Measured counts, one entry per circuit.
    MeasuredCounts(Vec<Counts>),
    /// Ideal counts, one entry per circuit.
    IdealCounts(Vec<Counts>),
    /// Ideal densities, one per base circuit.
    Densities(Vec<ComplexMatrix>),
    /// Ideal process matrices, one per base circuit.
    Processes(Vec<ComplexMatrix>),
    /// Session snapshots.
    Sessions(Vec<SessionInfo>),
}

impl Artifact {
    /// The task this payload belongs to.
    pub fn task(&self) -> Task {
        match self {
            Artifact::MeasuredCounts(_) => Task::MeasureCounts,
            Artifact::IdealCounts(_) => Task::IdealCounts,
            Artifact::Densities(_) => Task::IdealDensity,
            Artifact::Processes(_) => Task::IdealProcess,
            Artifact::Sessions(_) => Task::Session,
        }
    }

    /// Counts held by either counts variant.
    pub fn counts(&self) -> Option<&[Counts]> {
        match self {
            Artifact::MeasuredCounts(c) | Artifact::IdealCounts(c) => Some(c),
            _ => None,
        }
    }

    /// Matrices held by either matrix variant.
    pub fn matrices(&self) -> Option<&[ComplexMatrix]> {
        match self {
            Artifact::Densities(m) | Artifact::Processes(m) => Some(m),
            _ => None,
        }
    }

    /// Session snapshots, if this is a session artifact.
    pub fn sessions(&self) -> Option<&[SessionInfo]> {
        match self {
            Artifact::Sessions(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_names_are_distinct() {
        let mut names: Vec<_> = Task::ALL.iter().map(|t| t.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Task::ALL.len());
    }

    #[test]
    fn test_artifact_task_tag() {
        let artifact = Artifact::IdealCounts(vec![]);
        assert_eq!(artifact.task(), Task::IdealCounts);
        assert!(artifact.counts().is_some());
        assert!(artifact.matrices().is_none());
    }

    #[test]
    fn test_artifact_json_roundtrip() {
        let mut counts = Counts::new();
        counts.insert("10".parse().unwrap(), 3).unwrap();
        let artifact = Artifact::MeasuredCounts(vec![counts]);

        let json = serde_json::to_string(&artifact).unwrap();
        assert!(json.contains(r#""kind":"measured_counts""#));
        let back: Artifact = serde_json::from_str(&json).unwrap();
        assert_eq!(back, artifact);
    }

    #[test]
    fn test_timestamp_now_is_recent() {
        assert!(Timestamp::now() > Timestamp(1_600_000_000));
        assert_eq!(Timestamp(5).next(), Timestamp(6));
    }
}
