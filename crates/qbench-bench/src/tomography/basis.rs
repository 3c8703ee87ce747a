//! Measurement and preparation settings.

use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

use qbench_ir::{Circuit, QubitId};

use crate::error::{BenchError, BenchResult};
use crate::linalg::{ComplexMatrix, c, outer};

/// Single-qubit measurement basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementBasis {
    X,
    Y,
    Z,
}

impl MeasurementBasis {
    const ALL: [MeasurementBasis; 3] = [Self::X, Self::Y, Self::Z];

    /// Pauli index measured by this basis (1 = X, 2 = Y, 3 = Z).
    pub fn pauli_index(self) -> usize {
        match self {
            Self::X => 1,
            Self::Y => 2,
            Self::Z => 3,
        }
    }

    /// The per-qubit bases of setting `index`, qubit 0 the most significant
    /// base-3 digit.
    pub fn setting(index: usize, num_qubits: usize) -> Vec<Self> {
        digits(index, 3, num_qubits)
            .into_iter()
            .map(|d| Self::ALL[d])
            .collect()
    }

    fn rotate(self, circuit: &mut Circuit, qubit: QubitId) -> BenchResult<()> {
        match self {
            Self::X => {
                circuit.h(qubit)?;
            }
            Self::Y => {
                circuit.sdg(qubit)?.h(qubit)?;
            }
            Self::Z => {}
        }
        Ok(())
    }
}

/// Single-qubit input state for process tomography.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreparationState {
    Zero,
    One,
    Plus,
    PlusI,
}

impl PreparationState {
    const ALL: [PreparationState; 4] = [Self::Zero, Self::One, Self::Plus, Self::PlusI];

    /// The per-qubit states of preparation `index`, qubit 0 the most
    /// significant base-4 digit.
    pub fn setting(index: usize, num_qubits: usize) -> Vec<Self> {
        digits(index, 4, num_qubits)
            .into_iter()
            .map(|d| Self::ALL[d])
            .collect()
    }

    /// State vector.
    pub fn state(self) -> [Complex64; 2] {
        let h = FRAC_1_SQRT_2;
        match self {
            Self::Zero => [c(1.0, 0.0), c(0.0, 0.0)],
            Self::One => [c(0.0, 0.0), c(1.0, 0.0)],
            Self::Plus => [c(h, 0.0), c(h, 0.0)],
            Self::PlusI => [c(h, 0.0), c(0.0, h)],
        }
    }

    /// Density matrix.
    pub fn density(self) -> ComplexMatrix {
        outer(&self.state())
    }

    fn prepare(self, circuit: &mut Circuit, qubit: QubitId) -> BenchResult<()> {
        match self {
            Self::Zero => {}
            Self::One => {
                circuit.x(qubit)?;
            }
            Self::Plus => {
                circuit.h(qubit)?;
            }
            Self::PlusI => {
                circuit.h(qubit)?.s(qubit)?;
            }
        }
        Ok(())
    }
}

fn digits(mut index: usize, base: usize, width: usize) -> Vec<usize> {
    let mut out = vec![0; width];
    for slot in out.iter_mut().rev() {
        *slot = index % base;
        index /= base;
    }
    out
}

pub(crate) fn check_width(circuit: &Circuit, num_qubits: usize) -> BenchResult<()> {
    if circuit.num_qubits() != num_qubits {
        return Err(BenchError::shape(format!(
            "circuit '{}' has {} qubits, the workflow has {}",
            circuit.name(),
            circuit.num_qubits(),
            num_qubits
        )));
    }
    Ok(())
}

/// One circuit per measurement setting: `base` without its measurements,
/// followed by basis changes and a full measurement.
pub(crate) fn measurement_circuits(base: &Circuit) -> BenchResult<Vec<Circuit>> {
    let n = base.num_qubits();
    let body = base.without_measurements();
    (0..3usize.pow(n as u32))
        .map(|s| {
            let mut circuit = body.clone().with_name(format!("{}_m{s}", base.name()));
            for (q, basis) in MeasurementBasis::setting(s, n).into_iter().enumerate() {
                basis.rotate(&mut circuit, QubitId(q as u32))?;
            }
            circuit.measure_all()?;
            Ok(circuit)
        })
        .collect()
}

/// `base` preceded by preparation `index`, measurements stripped.
pub(crate) fn prepared_circuit(base: &Circuit, index: usize) -> BenchResult<Circuit> {
    let n = base.num_qubits();
    let mut circuit = Circuit::with_size(format!("{}_p{index}", base.name()), n as u32, 0);
    for (q, state) in PreparationState::setting(index, n).into_iter().enumerate() {
        state.prepare(&mut circuit, QubitId(q as u32))?;
    }
    circuit.compose(&base.without_measurements())?;
    Ok(circuit)
}
