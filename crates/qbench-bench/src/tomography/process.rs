//! Quantum process tomography.

use ndarray::Array2;
use num_complex::Complex64;
use tracing::debug;

use qbench_hal::Counts;
use qbench_ir::Circuit;

use super::basis::{measurement_circuits, prepared_circuit};
use super::state::StateTomography;
use crate::error::{BenchError, BenchResult};
use crate::linalg::{ComplexMatrix, c, pauli_string};
use crate::session::Session;
use crate::task::Task;
use crate::workflow::{ProcessReconstruction, Workflow};

/// Coefficients expressing `|i⟩⟨j|` in the preparation densities
/// `ρ₀, ρ₁, ρ₊, ρ₊ᵢ`, indexed `[2i + j][state]`.
const MATRIX_UNIT_COEFFICIENTS: [[Complex64; 4]; 4] = [
    [c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(0.0, 0.0)],
    [c(-0.5, -0.5), c(-0.5, -0.5), c(1.0, 0.0), c(0.0, 1.0)],
    [c(-0.5, 0.5), c(-0.5, 0.5), c(1.0, 0.0), c(0.0, -1.0)],
    [c(0.0, 0.0), c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0)],
];

/// Runs state tomography on every input state of `4^n` product preparations.
#[derive(Debug, Clone)]
pub struct ProcessTomography<W> {
    state: StateTomography<W>,
    identifier: String,
}

impl<W: Workflow> ProcessTomography<W> {
    /// Wrap `state`; the identifier becomes `<state>_QPT`.
    pub fn new(state: StateTomography<W>) -> Self {
        let identifier = format!("{}_QPT", state.identifier());
        Self { state, identifier }
    }

    /// Override the cache identifier.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// The wrapped state tomography.
    pub fn state_tomography(&self) -> &StateTomography<W> {
        &self.state
    }

    fn preparations(&self) -> usize {
        4usize.pow(self.num_qubits() as u32)
    }
}

impl<W: Workflow> Workflow for ProcessTomography<W> {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn session(&self) -> &Session {
        self.state.session()
    }

    fn num_qubits(&self) -> usize {
        self.state.num_qubits()
    }

    fn circuits(&self) -> BenchResult<Vec<Circuit>> {
        let mut circuits = Vec::new();
        for base in self.state.base_circuits()? {
            for p in 0..self.preparations() {
                circuits.extend(measurement_circuits(&prepared_circuit(&base, p)?)?);
            }
        }
        Ok(circuits)
    }

    fn supports(&self, task: Task) -> bool {
        match task {
            Task::MeasureCounts | Task::Session => true,
            Task::IdealProcess => self.state.inner().supports(task),
            Task::IdealCounts | Task::IdealDensity => false,
        }
    }

    fn ideal_processes(&self) -> BenchResult<Vec<ComplexMatrix>> {
        self.state.inner().ideal_processes()
    }
}

impl<W: Workflow> ProcessReconstruction for ProcessTomography<W> {
    fn reconstruct_processes(&self, counts: &[Counts]) -> BenchResult<Vec<ComplexMatrix>> {
        let settings = self.state.settings_per_circuit();
        let block = self.preparations() * settings;
        let expected = self.state.base_circuits()?.len() * block;
        if counts.len() != expected {
            return Err(BenchError::shape(format!(
                "process tomography of '{}' expects {expected} counts, got {}",
                self.identifier,
                counts.len()
            )));
        }
        debug!(
            workflow = %self.identifier,
            processes = counts.len() / block,
            "reconstructing processes"
        );

        counts
            .chunks(block)
            .map(|chunk| {
                let densities = chunk
                    .chunks(settings)
                    .map(|setting_counts| self.state.reconstruct_block(setting_counts))
                    .collect::<BenchResult<Vec<_>>>()?;
                assemble_process(&densities, self.num_qubits())
            })
            .collect()
    }
}

/// χ-matrix from the output densities of all `4^n` product preparations.
///
/// `E(|i⟩⟨j|)` is recovered by linearity from the preparation outputs, then
/// `χ_mn = d⁻² Σ_ij (P_m E(|i⟩⟨j|) P_n)_ij`.
pub fn assemble_process(densities: &[ComplexMatrix], num_qubits: usize) -> BenchResult<ComplexMatrix> {
    let n = num_qubits;
    let d = 1usize << n;
    let num_preparations = 4usize.pow(n as u32);
    if densities.len() != num_preparations {
        return Err(BenchError::shape(format!(
            "{n}-qubit process tomography needs {num_preparations} densities, got {}",
            densities.len()
        )));
    }
    if let Some(bad) = densities.iter().find(|rho| rho.dim() != (d, d)) {
        return Err(BenchError::shape(format!(
            "expected {d}x{d} densities, got {:?}",
            bad.dim()
        )));
    }

    let paulis: Vec<ComplexMatrix> = (0..d * d).map(|m| pauli_string(m, n)).collect();
    let mut chi: ComplexMatrix = Array2::zeros((d * d, d * d));

    for i in 0..d {
        for j in 0..d {
            let image = matrix_unit_image(densities, i, j, n);
            // Row i of P_m · E(|i⟩⟨j|) for every m.
            let rows: Vec<Vec<Complex64>> = paulis
                .iter()
                .map(|pm| pm.row(i).dot(&image).to_vec())
                .collect();
            for (m, row) in rows.iter().enumerate() {
                for (k, pn) in paulis.iter().enumerate() {
                    let entry: Complex64 = row.iter().zip(pn.column(j)).map(|(a, b)| a * b).sum();
                    chi[[m, k]] += entry;
                }
            }
        }
    }

    Ok(chi.mapv(|z| z / (d * d) as f64))
}

/// `E(|i⟩⟨j|)` as a combination of preparation outputs.
fn matrix_unit_image(densities: &[ComplexMatrix], i: usize, j: usize, n: usize) -> ComplexMatrix {
    let d = 1usize << n;
    let mut image: ComplexMatrix = Array2::zeros((d, d));
    for (p, rho) in densities.iter().enumerate() {
        let mut weight = c(1.0, 0.0);
        for q in 0..n {
            let shift = n - 1 - q;
            let unit = 2 * ((i >> shift) & 1) + ((j >> shift) & 1);
            let state = (p / 4usize.pow(shift as u32)) % 4;
            weight *= MATRIX_UNIT_COEFFICIENTS[unit][state];
        }
        if weight.norm() > 0.0 {
            image.scaled_add(weight, rho);
        }
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{dagger, kron_all, max_abs_diff};
    use crate::tomography::{PreparationState, rotation_process, unitary_to_process};
    use crate::workflow::{Rotation, RotationSweep};
    use qbench_adapter_sim::SimulatorBackend;
    use std::sync::Arc;

    fn channel_outputs(u: &ComplexMatrix, n: usize) -> Vec<ComplexMatrix> {
        (0..4usize.pow(n as u32))
            .map(|p| {
                let rho = kron_all(
                    PreparationState::setting(p, n)
                        .into_iter()
                        .map(PreparationState::density),
                );
                u.dot(&rho).dot(&dagger(u))
            })
            .collect()
    }

    #[test]
    fn test_matrix_units_from_preparations() {
        let outputs: Vec<_> = (0..4)
            .map(|p| PreparationState::setting(p, 1)[0].density())
            .collect();
        for i in 0..2 {
            for j in 0..2 {
                let unit = matrix_unit_image(&outputs, i, j, 1);
                for r in 0..2 {
                    for s in 0..2 {
                        let expected = if (r, s) == (i, j) { 1.0 } else { 0.0 };
                        assert!((unit[[r, s]] - c(expected, 0.0)).norm() < 1e-12);
                    }
                }
            }
        }
    }

    #[test]
    fn test_assemble_rotation() {
        let theta = 0.9;
        let u = ndarray::array![
            [c((theta / 2.0f64).cos(), 0.0), c(-(theta / 2.0f64).sin(), 0.0)],
            [c((theta / 2.0f64).sin(), 0.0), c((theta / 2.0f64).cos(), 0.0)]
        ];
        let chi = assemble_process(&channel_outputs(&u, 1), 1).unwrap();
        assert!(max_abs_diff(&chi, &rotation_process(2, theta)) < 1e-12);
    }

    #[test]
    fn test_assemble_two_qubit_unitary() {
        let mut circuit = Circuit::with_size("cx", 2, 0);
        circuit
            .h(qbench_ir::QubitId(0))
            .unwrap()
            .cx(qbench_ir::QubitId(0), qbench_ir::QubitId(1))
            .unwrap();
        let u = crate::tomography::ideal_unitary(&circuit);
        let chi = assemble_process(&channel_outputs(&u, 2), 2).unwrap();
        assert!(max_abs_diff(&chi, &unitary_to_process(&u).unwrap()) < 1e-12);
    }

    #[test]
    fn test_circuit_layout() {
        let session = Session::new(Arc::new(SimulatorBackend::new()), 100).unwrap();
        let sweep =
            RotationSweep::new(vec![Rotation::Y, Rotation::X], -90.0, 90.0, 2, session).unwrap();
        let qpt = ProcessTomography::new(StateTomography::new(sweep));
        assert_eq!(qpt.identifier(), "RotationSweep_QST_QPT");
        assert_eq!(qpt.circuits().unwrap().len(), 2 * 16 * 9);
        assert!(qpt.supports(Task::IdealProcess));
        assert!(!qpt.supports(Task::IdealDensity));
    }

    #[test]
    fn test_wrong_density_count() {
        let densities = vec![Array2::zeros((2, 2)); 3];
        assert!(matches!(
            assemble_process(&densities, 1),
            Err(BenchError::ShapeMismatch(_))
        ));
    }
}
