//! Execution sessions.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use qbench_hal::{CircuitExecutor, Counts};
use qbench_ir::Circuit;

use crate::error::{BenchError, BenchResult};

/// An executor plus the shot count every circuit runs with.
#[derive(Clone)]
pub struct Session {
    executor: Arc<dyn CircuitExecutor>,
    shots: u32,
}

impl Session {
    /// Create a session. Zero shots are rejected.
    pub fn new(executor: Arc<dyn CircuitExecutor>, shots: u32) -> BenchResult<Self> {
        if shots == 0 {
            return Err(BenchError::InvalidConfig(
                "a session needs at least one shot".into(),
            ));
        }
        Ok(Self { executor, shots })
    }

    /// The executor circuits run on.
    pub fn executor(&self) -> &dyn CircuitExecutor {
        self.executor.as_ref()
    }

    /// Shots per circuit.
    pub fn shots(&self) -> u32 {
        self.shots
    }

    /// Run one circuit and check the shot total.
    pub fn execute(&self, circuit: &Circuit) -> BenchResult<Counts> {
        let counts = self.executor.execute(circuit, self.shots)?;
        debug!(
            circuit = circuit.name(),
            outcomes = counts.len(),
            "executed circuit"
        );
        if counts.total() != u64::from(self.shots) {
            return Err(BenchError::shape(format!(
                "executor '{}' returned {} shots for '{}', expected {}",
                self.executor.name(),
                counts.total(),
                circuit.name(),
                self.shots
            )));
        }
        Ok(counts)
    }

    /// Snapshot of this session for a workflow of `num_qubits` qubits.
    pub fn info(&self, num_qubits: usize) -> SessionInfo {
        SessionInfo {
            accelerator: self.executor.name().to_string(),
            num_qubits,
            shots: self.shots,
            noise_model: self.executor.noise_model(),
            seed: self.executor.seed(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("executor", &self.executor.name())
            .field("shots", &self.shots)
            .finish()
    }
}

/// Serializable snapshot of the configuration a batch ran with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Executor name.
    pub accelerator: String,
    /// Qubits used by the workflow.
    pub num_qubits: usize,
    /// Shots per circuit.
    pub shots: u32,
    /// Noise model identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_model: Option<String>,
    /// Sampling seed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbench_adapter_sim::SimulatorBackend;

    #[test]
    fn test_zero_shots_rejected() {
        let err = Session::new(Arc::new(SimulatorBackend::new()), 0).unwrap_err();
        assert!(matches!(err, BenchError::InvalidConfig(_)));
    }

    #[test]
    fn test_info_snapshot() {
        let session = Session::new(Arc::new(SimulatorBackend::new().with_seed(9)), 128).unwrap();
        let info = session.info(3);
        assert_eq!(info.accelerator, "simulator");
        assert_eq!(info.num_qubits, 3);
        assert_eq!(info.shots, 128);
        assert_eq!(info.seed, Some(9));
        assert_eq!(info.noise_model, None);
    }
}
