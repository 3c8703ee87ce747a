//! Benchmark error types.

use thiserror::Error;

use qbench_hal::HalError;
use qbench_ir::IrError;

use crate::task::{Task, Timestamp};

/// Result type for benchmark operations.
pub type BenchResult<T> = Result<T, BenchError>;

/// Errors that can occur while running or evaluating a benchmark.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BenchError {
    /// The workflow has no hook producing the requested task.
    #[error("Workflow '{workflow}' cannot produce task '{task}'")]
    Capability { workflow: String, task: Task },

    /// Cache I/O or (de)serialization failed.
    #[error("Storage error for '{workflow}/{task}'{}: {message}", format_timestamp(.timestamp))]
    Storage {
        workflow: String,
        task: Task,
        timestamp: Option<Timestamp>,
        message: String,
    },

    /// Counts, circuits or matrices whose dimensions do not fit together.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Numerical reconstruction failed.
    #[error("Reconstruction failed: {0}")]
    Reconstruction(String),

    /// Invalid workflow or session parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed PyGSTi input.
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The circuit executor failed.
    #[error("Executor error: {0}")]
    Executor(#[from] HalError),

    /// A circuit could not be built.
    #[error("Circuit error: {0}")]
    Circuit(#[from] IrError),
}

fn format_timestamp(timestamp: &Option<Timestamp>) -> String {
    match timestamp {
        Some(ts) => format!(" at {ts}"),
        None => String::new(),
    }
}

impl BenchError {
    pub(crate) fn storage(
        workflow: &str,
        task: Task,
        timestamp: Option<Timestamp>,
        message: impl ToString,
    ) -> Self {
        Self::Storage {
            workflow: workflow.to_string(),
            task,
            timestamp,
            message: message.to_string(),
        }
    }

    pub(crate) fn shape(message: impl Into<String>) -> Self {
        Self::ShapeMismatch(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_message_carries_context() {
        let err = BenchError::storage(
            "RotationSweep",
            Task::MeasureCounts,
            Some(Timestamp(42)),
            "disk full",
        );
        assert_eq!(
            err.to_string(),
            "Storage error for 'RotationSweep/measured_counts' at 42: disk full"
        );
    }

    #[test]
    fn test_capability_message() {
        let err = BenchError::Capability {
            workflow: "PyGSTiBenchmark".into(),
            task: Task::IdealProcess,
        };
        assert!(err.to_string().contains("ideal_processes"));
    }
}
