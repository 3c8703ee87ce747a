//! Passthrough execution of user-supplied circuits.

use qbench_adapter_sim::Statevector;
use qbench_hal::Counts;
use qbench_ir::Circuit;

use super::{Workflow, content_identifier};
use crate::counts::counts_from_probabilities;
use crate::error::{BenchError, BenchResult};
use crate::linalg::{ComplexMatrix, outer};
use crate::session::Session;
use crate::task::Task;
use crate::tomography::{ideal_unitary, unitary_to_process};

/// Runs arbitrary circuits; ideals come from noiseless simulation.
///
/// The default identifier is derived from the circuits.
#[derive(Debug, Clone)]
pub struct SimpleCircuitExecution {
    identifier: String,
    circuits: Vec<Circuit>,
    num_qubits: usize,
    session: Session,
}

impl SimpleCircuitExecution {
    /// Wrap `circuits`, which must all have the same width.
    pub fn new(circuits: Vec<Circuit>, session: Session) -> BenchResult<Self> {
        let Some(first) = circuits.first() else {
            return Err(BenchError::InvalidConfig("no circuits to execute".into()));
        };
        let num_qubits = first.num_qubits();
        if let Some(other) = circuits.iter().find(|c| c.num_qubits() != num_qubits) {
            return Err(BenchError::shape(format!(
                "circuit '{}' has {} qubits, expected {num_qubits}",
                other.name(),
                other.num_qubits()
            )));
        }
        let encoded = serde_json::to_vec(&circuits)
            .map_err(|e| BenchError::InvalidConfig(format!("unserializable circuit: {e}")))?;
        Ok(Self {
            identifier: content_identifier("SimpleCircuitExecution", &encoded),
            circuits,
            num_qubits,
            session,
        })
    }

    /// Override the cache identifier.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }
}

impl Workflow for SimpleCircuitExecution {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn circuits(&self) -> BenchResult<Vec<Circuit>> {
        Ok(self.circuits.clone())
    }

    fn supports(&self, _task: Task) -> bool {
        true
    }

    fn ideal_counts(&self) -> BenchResult<Vec<Counts>> {
        let shots = u64::from(self.session.shots());
        self.circuits
            .iter()
            .map(|circuit| {
                let measured: Vec<usize> =
                    circuit.readout_qubits().iter().map(|q| q.index()).collect();
                let sv = Statevector::from_circuit(&circuit.without_measurements());
                counts_from_probabilities(
                    &sv.marginal_probabilities(&measured),
                    measured.len(),
                    shots,
                )
            })
            .collect()
    }

    fn ideal_densities(&self) -> BenchResult<Vec<ComplexMatrix>> {
        Ok(self
            .circuits
            .iter()
            .map(|circuit| {
                outer(&Statevector::from_circuit(&circuit.without_measurements()).amplitudes())
            })
            .collect())
    }

    fn ideal_processes(&self) -> BenchResult<Vec<ComplexMatrix>> {
        self.circuits
            .iter()
            .map(|circuit| unitary_to_process(&ideal_unitary(circuit)))
            .collect()
    }
}
