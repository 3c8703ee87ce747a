//! Quantum state tomography.

use ndarray::Array2;
use tracing::debug;

use qbench_hal::Counts;
use qbench_ir::Circuit;

use super::basis::{MeasurementBasis, check_width, measurement_circuits};
use super::mle::project_to_physical;
use crate::counts::probabilities_of_width;
use crate::error::{BenchError, BenchResult};
use crate::linalg::{ComplexMatrix, c, pauli_digits, pauli_string};
use crate::session::Session;
use crate::task::Task;
use crate::workflow::{StateReconstruction, Workflow};

/// Measures every circuit of `W` in all `3^n` product Pauli bases.
#[derive(Debug, Clone)]
pub struct StateTomography<W> {
    inner: W,
    identifier: String,
    maximum_likelihood: bool,
}

impl<W: Workflow> StateTomography<W> {
    /// Wrap `inner`; the identifier becomes `<inner>_QST`.
    pub fn new(inner: W) -> Self {
        let identifier = format!("{}_QST", inner.identifier());
        Self {
            inner,
            identifier,
            maximum_likelihood: false,
        }
    }

    /// Override the cache identifier.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Project reconstructed densities onto physical states.
    #[must_use]
    pub fn with_maximum_likelihood(mut self, enabled: bool) -> Self {
        self.maximum_likelihood = enabled;
        self
    }

    /// Whether maximum-likelihood projection is enabled.
    pub fn maximum_likelihood(&self) -> bool {
        self.maximum_likelihood
    }

    /// The wrapped workflow.
    pub fn inner(&self) -> &W {
        &self.inner
    }

    /// Number of measurement settings per base circuit.
    pub fn settings_per_circuit(&self) -> usize {
        3usize.pow(self.num_qubits() as u32)
    }

    /// Circuits of the wrapped workflow, checked for width.
    pub(crate) fn base_circuits(&self) -> BenchResult<Vec<Circuit>> {
        let circuits = self.inner.circuits()?;
        for circuit in &circuits {
            check_width(circuit, self.num_qubits())?;
        }
        Ok(circuits)
    }

    /// Density matrix from one block of `3^n` setting counts.
    pub(crate) fn reconstruct_block(&self, block: &[Counts]) -> BenchResult<ComplexMatrix> {
        let rho = linear_inversion(block, self.num_qubits())?;
        if self.maximum_likelihood {
            project_to_physical(&rho)
        } else {
            Ok(rho)
        }
    }
}

impl<W: Workflow> Workflow for StateTomography<W> {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn session(&self) -> &Session {
        self.inner.session()
    }

    fn num_qubits(&self) -> usize {
        self.inner.num_qubits()
    }

    fn circuits(&self) -> BenchResult<Vec<Circuit>> {
        let mut circuits = Vec::new();
        for base in self.base_circuits()? {
            circuits.extend(measurement_circuits(&base)?);
        }
        Ok(circuits)
    }

    fn supports(&self, task: Task) -> bool {
        match task {
            Task::MeasureCounts | Task::Session => true,
            Task::IdealDensity | Task::IdealProcess => self.inner.supports(task),
            Task::IdealCounts => false,
        }
    }

    fn ideal_densities(&self) -> BenchResult<Vec<ComplexMatrix>> {
        self.inner.ideal_densities()
    }

    fn ideal_processes(&self) -> BenchResult<Vec<ComplexMatrix>> {
        self.inner.ideal_processes()
    }
}

impl<W: Workflow> StateReconstruction for StateTomography<W> {
    fn reconstruct_densities(&self, counts: &[Counts]) -> BenchResult<Vec<ComplexMatrix>> {
        let block = self.settings_per_circuit();
        let expected = self.base_circuits()?.len() * block;
        if counts.len() != expected {
            return Err(BenchError::shape(format!(
                "state tomography of '{}' expects {expected} counts, got {}",
                self.identifier,
                counts.len()
            )));
        }
        debug!(
            workflow = %self.identifier,
            densities = counts.len() / block,
            maximum_likelihood = self.maximum_likelihood,
            "reconstructing densities"
        );
        counts
            .chunks(block)
            .map(|chunk| self.reconstruct_block(chunk))
            .collect()
    }
}

/// Linear-inversion estimate `ρ = 2^{-n} Σ_P ⟨P⟩ P` from the counts of all
/// `3^n` measurement settings, in setting order.
///
/// Each `⟨P⟩` averages every setting that measures the non-identity factors
/// of `P` in their own basis.
pub fn linear_inversion(counts: &[Counts], num_qubits: usize) -> BenchResult<ComplexMatrix> {
    let n = num_qubits;
    let num_settings = 3usize.pow(n as u32);
    if counts.len() != num_settings {
        return Err(BenchError::shape(format!(
            "{n}-qubit state tomography needs {num_settings} settings, got {}",
            counts.len()
        )));
    }

    let settings: Vec<Vec<usize>> = (0..num_settings)
        .map(|s| {
            MeasurementBasis::setting(s, n)
                .into_iter()
                .map(MeasurementBasis::pauli_index)
                .collect()
        })
        .collect();
    let distributions = counts
        .iter()
        .map(|c| probabilities_of_width(c, n))
        .collect::<BenchResult<Vec<_>>>()?;

    let d = 1usize << n;
    let mut rho: ComplexMatrix = Array2::zeros((d, d));
    for label in 0..4usize.pow(n as u32) {
        let digits = pauli_digits(label, n);
        let mut total = 0.0;
        let mut compatible = 0usize;
        for (setting, probs) in settings.iter().zip(&distributions) {
            let matches = digits
                .iter()
                .zip(setting)
                .all(|(&p, &b)| p == 0 || p == b);
            if !matches {
                continue;
            }
            compatible += 1;
            total += probs
                .iter()
                .enumerate()
                .map(|(outcome, &prob)| {
                    let parity = digits
                        .iter()
                        .enumerate()
                        .filter(|&(q, &p)| p != 0 && (outcome >> (n - 1 - q)) & 1 == 1)
                        .count();
                    if parity % 2 == 0 { prob } else { -prob }
                })
                .sum::<f64>();
        }
        let expectation = total / compatible as f64;
        rho.scaled_add(c(expectation, 0.0), &pauli_string(label, n));
    }

    Ok(rho.mapv(|z| z / d as f64))
}
