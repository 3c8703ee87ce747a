//! Replay of PyGSTi circuit lists.

use std::io::BufRead;

use qbench_adapter_sim::Statevector;
use qbench_hal::Counts;
use qbench_ir::Circuit;

use super::{PyGstiSource, Workflow, content_identifier};
use crate::counts::counts_from_probabilities;
use crate::error::{BenchError, BenchResult};
use crate::pygsti::parse_circuit;
use crate::session::Session;
use crate::task::Task;

/// Executes one circuit per non-blank, non-`#` input line, in input order.
///
/// The default identifier is derived from the circuit list, so cached
/// counts are only ever paired with the circuits that produced them.
#[derive(Debug, Clone)]
pub struct PyGstiBenchmark {
    identifier: String,
    num_qubits: usize,
    circuit_strings: Vec<String>,
    circuits: Vec<Circuit>,
    session: Session,
}

impl PyGstiBenchmark {
    /// Read and parse a circuit list.
    pub fn new(reader: impl BufRead, num_qubits: usize, session: Session) -> BenchResult<Self> {
        if num_qubits == 0 {
            return Err(BenchError::InvalidConfig(
                "PyGSTi circuits need at least one qubit".into(),
            ));
        }

        let mut circuit_strings = Vec::new();
        let mut circuits = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line.map_err(|e| BenchError::Parse {
                line: line_no,
                message: e.to_string(),
            })?;
            let text = line.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            circuits.push(parse_circuit(text, num_qubits, line_no)?);
            circuit_strings.push(text.to_string());
        }

        if circuits.is_empty() {
            return Err(BenchError::InvalidConfig(
                "no circuit strings in PyGSTi input".into(),
            ));
        }

        Ok(Self {
            identifier: content_identifier("PyGSTiBenchmark", (num_qubits, &circuit_strings)),
            num_qubits,
            circuit_strings,
            circuits,
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

impl Workflow for PyGstiBenchmark {
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

    fn supports(&self, task: Task) -> bool {
        matches!(task, Task::MeasureCounts | Task::IdealCounts | Task::Session)
    }

    fn ideal_counts(&self) -> BenchResult<Vec<Counts>> {
        let shots = u64::from(self.session.shots());
        self.circuits
            .iter()
            .map(|circuit| {
                let sv = Statevector::from_circuit(&circuit.without_measurements());
                counts_from_probabilities(&sv.probabilities(), self.num_qubits, shots)
            })
            .collect()
    }
}

impl PyGstiSource for PyGstiBenchmark {
    fn circuit_strings(&self) -> &[String] {
        &self.circuit_strings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbench_adapter_sim::SimulatorBackend;
    use std::io::Cursor;
    use std::sync::Arc;

    fn session() -> Session {
        Session::new(Arc::new(SimulatorBackend::new()), 100).unwrap()
    }

    #[test]
    fn test_skips_blank_and_comment_lines() {
        let input = "# header\n{}\n\n  Gxpi2Gxpi2  \n# trailing\n";
        let workflow = PyGstiBenchmark::new(Cursor::new(input), 1, session()).unwrap();
        assert_eq!(workflow.circuit_strings(), ["{}", "Gxpi2Gxpi2"]);
        assert_eq!(workflow.circuits().unwrap().len(), 2);
    }

    #[test]
    fn test_ideal_counts_follow_circuits() {
        let input = "{}\nGxpi2Gxpi2\n";
        let workflow = PyGstiBenchmark::new(Cursor::new(input), 1, session()).unwrap();
        let counts = workflow.ideal_counts().unwrap();
        assert_eq!(counts[0].get_str("0"), 100);
        assert_eq!(counts[1].get_str("1"), 100);
    }

    #[test]
    fn test_identifier_follows_circuit_list() {
        let a = PyGstiBenchmark::new(Cursor::new("{}\n"), 1, session()).unwrap();
        let again = PyGstiBenchmark::new(Cursor::new("# same\n{}\n"), 1, session()).unwrap();
        let b = PyGstiBenchmark::new(Cursor::new("Gxpi:0\n"), 1, session()).unwrap();
        let wider = PyGstiBenchmark::new(Cursor::new("{}\n"), 2, session()).unwrap();

        assert!(a.identifier().starts_with("PyGSTiBenchmark_"));
        assert_eq!(a.identifier(), again.identifier());
        assert_ne!(a.identifier(), b.identifier());
        assert_ne!(a.identifier(), wider.identifier());
        assert_eq!(a.with_identifier("mine").identifier(), "mine");
    }

    #[test]
    fn test_parse_error_reports_line() {
        let input = "{}\n\nGbogus\n";
        let err = PyGstiBenchmark::new(Cursor::new(input), 1, session()).unwrap_err();
        assert!(matches!(err, BenchError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(PyGstiBenchmark::new(Cursor::new("# nothing\n"), 1, session()).is_err());
    }
}
