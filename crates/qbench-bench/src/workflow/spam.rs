//! Readout calibration over every computational basis state.

use ndarray::Array2;

use qbench_hal::{Bitstring, Counts};
use qbench_ir::{Circuit, QubitId};

use super::{ConfusionSource, Workflow};
use crate::counts::counts_from_probabilities;
use crate::error::{BenchError, BenchResult};
use crate::linalg::ComplexMatrix;
use crate::session::Session;
use crate::spam::SpamConfusionMatrix;
use crate::task::Task;

/// Prepares and measures each of the `2^n` basis states in integer order.
#[derive(Debug, Clone)]
pub struct SpamBenchmark {
    identifier: String,
    num_qubits: usize,
    session: Session,
}

impl SpamBenchmark {
    /// Create a calibration workflow over `num_qubits` qubits.
    pub fn new(num_qubits: usize, session: Session) -> BenchResult<Self> {
        if num_qubits == 0 {
            return Err(BenchError::InvalidConfig(
                "SPAM calibration needs at least one qubit".into(),
            ));
        }
        Ok(Self {
            identifier: "SPAMBenchmark".into(),
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

    fn dim(&self) -> usize {
        1 << self.num_qubits
    }
}

impl Workflow for SpamBenchmark {
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
        let n = self.num_qubits;
        (0..self.dim())
            .map(|index| {
                let label = Bitstring::from_index(index, n);
                let mut circuit = Circuit::with_size(format!("spam_{label}"), n as u32, n as u32);
                for (q, bit) in label.bits().iter().enumerate() {
                    if *bit {
                        circuit.x(QubitId(q as u32))?;
                    }
                }
                circuit.measure_all()?;
                Ok(circuit)
            })
            .collect()
    }

    fn supports(&self, task: Task) -> bool {
        !matches!(task, Task::IdealProcess)
    }

    fn ideal_counts(&self) -> BenchResult<Vec<Counts>> {
        let shots = u64::from(self.session.shots());
        (0..self.dim())
            .map(|index| {
                let mut probs = vec![0.0; self.dim()];
                probs[index] = 1.0;
                counts_from_probabilities(&probs, self.num_qubits, shots)
            })
            .collect()
    }

    fn ideal_densities(&self) -> BenchResult<Vec<ComplexMatrix>> {
        Ok((0..self.dim())
            .map(|index| {
                let mut rho: ComplexMatrix = Array2::zeros((self.dim(), self.dim()));
                rho[[index, index]] = crate::linalg::c(1.0, 0.0);
                rho
            })
            .collect())
    }
}

impl ConfusionSource for SpamBenchmark {
    fn confusion_matrix(&self, counts: &[Counts]) -> BenchResult<Array2<f64>> {
        if counts.len() != self.dim() {
            return Err(BenchError::shape(format!(
                "SPAM calibration expects {} counts, got {}",
                self.dim(),
                counts.len()
            )));
        }
        Ok(SpamConfusionMatrix::from_counts(counts)?.matrix().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbench_adapter_sim::{ReadoutError, SimulatorBackend};
    use std::sync::Arc;

    #[test]
    fn test_circuits_prepare_basis_states() {
        let session = Session::new(Arc::new(SimulatorBackend::new()), 10).unwrap();
        let spam = SpamBenchmark::new(2, session).unwrap();
        let counts = spam.measure_counts().unwrap();
        assert_eq!(counts.len(), 4);
        for (index, c) in counts.iter().enumerate() {
            assert_eq!(c.get(&Bitstring::from_index(index, 2)), 10);
        }
        assert_eq!(spam.circuits().unwrap()[2].name(), "spam_10");
    }

    #[test]
    fn test_confusion_matrix_from_noisy_readout() {
        let backend = SimulatorBackend::new()
            .with_seed(11)
            .with_readout_error(ReadoutError::Uniform { p01: 0.05, p10: 0.1 });
        let session = Session::new(Arc::new(backend), 100_000).unwrap();
        let spam = SpamBenchmark::new(1, session).unwrap();
        let matrix = spam.confusion_matrix(&spam.measure_counts().unwrap()).unwrap();

        assert!((matrix[[0, 1]] - 0.05).abs() < 0.01);
        assert!((matrix[[1, 0]] - 0.1).abs() < 0.01);
        for row in matrix.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_no_ideal_process() {
        let session = Session::new(Arc::new(SimulatorBackend::new()), 10).unwrap();
        let spam = SpamBenchmark::new(1, session).unwrap();
        assert!(!spam.supports(Task::IdealProcess));
        assert!(spam.try_produce(Task::IdealProcess).is_none());
        assert!(spam.ideal_processes().is_err());
    }
}
