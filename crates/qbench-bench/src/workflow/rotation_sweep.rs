//! Single-axis rotation sweeps with closed-form ideals.

use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use qbench_hal::Counts;
use qbench_ir::{Circuit, QubitId};

use super::Workflow;
use crate::counts::counts_from_probabilities;
use crate::error::{BenchError, BenchResult};
use crate::linalg::{ComplexMatrix, c, kron_all, outer};
use crate::session::Session;
use crate::task::Task;
use crate::tomography::rotation_process;

/// Angles closer to zero than this are simulated as exactly zero.
const ZERO_ANGLE_CUTOFF: f64 = 1e-6;

/// Rotation axis applied to one qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    X,
    Y,
    Z,
    I,
}

impl Rotation {
    /// Parse one axis per character, e.g. `"YX"`.
    pub fn parse_sequence(text: &str) -> BenchResult<Vec<Rotation>> {
        text.chars().map(|ch| ch.to_string().parse()).collect()
    }

    /// Pauli index of the axis (0 = I, 1 = X, 2 = Y, 3 = Z).
    fn pauli_index(self) -> usize {
        match self {
            Rotation::I => 0,
            Rotation::X => 1,
            Rotation::Y => 2,
            Rotation::Z => 3,
        }
    }

    /// Outcome probabilities of measuring `R(θ)|0⟩`.
    fn probabilities(self, theta: f64) -> [f64; 2] {
        match self {
            Rotation::X | Rotation::Y => {
                let (s, co) = (theta / 2.0).sin_cos();
                [co * co, s * s]
            }
            Rotation::Z | Rotation::I => [1.0, 0.0],
        }
    }

    /// `R(θ)|0⟩`.
    fn state(self, theta: f64) -> [Complex64; 2] {
        let (s, co) = (theta / 2.0).sin_cos();
        match self {
            Rotation::X => [c(co, 0.0), c(0.0, -s)],
            Rotation::Y => [c(co, 0.0), c(s, 0.0)],
            Rotation::Z => [Complex64::from_polar(1.0, -theta / 2.0), c(0.0, 0.0)],
            Rotation::I => [c(1.0, 0.0), c(0.0, 0.0)],
        }
    }

    fn process(self, theta: f64) -> ComplexMatrix {
        match self {
            Rotation::I => rotation_process(0, 0.0),
            axis => rotation_process(axis.pauli_index(), theta),
        }
    }
}

impl FromStr for Rotation {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "X" => Ok(Rotation::X),
            "Y" => Ok(Rotation::Y),
            "Z" => Ok(Rotation::Z),
            "I" => Ok(Rotation::I),
            other => Err(BenchError::InvalidConfig(format!(
                "unknown rotation axis '{other}', expected one of X, Y, Z, I"
            ))),
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axis = match self {
            Rotation::X => "X",
            Rotation::Y => "Y",
            Rotation::Z => "Z",
            Rotation::I => "I",
        };
        f.write_str(axis)
    }
}

/// Rotates every qubit about its own axis through a range of angles.
///
/// Circuit `k` applies `R_q(start + k·step)` to each qubit `q`, where
/// `step = (end - start) / (n_points - 1)`, then measures all qubits.
#[derive(Debug, Clone)]
pub struct RotationSweep {
    identifier: String,
    rotations: Vec<Rotation>,
    angles: Vec<f64>,
    session: Session,
}

impl RotationSweep {
    /// Create a sweep from `start_deg` to `end_deg` inclusive.
    pub fn new(
        rotations: Vec<Rotation>,
        start_deg: f64,
        end_deg: f64,
        n_points: usize,
        session: Session,
    ) -> BenchResult<Self> {
        if rotations.is_empty() {
            return Err(BenchError::InvalidConfig(
                "a rotation sweep needs at least one qubit".into(),
            ));
        }
        if n_points < 2 {
            return Err(BenchError::InvalidConfig(format!(
                "a rotation sweep needs at least 2 points, got {n_points}"
            )));
        }
        if !start_deg.is_finite() || !end_deg.is_finite() {
            return Err(BenchError::InvalidConfig(
                "sweep bounds must be finite".into(),
            ));
        }

        let start = start_deg.to_radians();
        let step = (end_deg - start_deg).to_radians() / (n_points - 1) as f64;
        let angles = (0..n_points)
            .map(|k| {
                let theta = start + k as f64 * step;
                if theta.abs() < ZERO_ANGLE_CUTOFF { 0.0 } else { theta }
            })
            .collect();

        Ok(Self {
            identifier: "RotationSweep".into(),
            rotations,
            angles,
            session,
        })
    }

    /// Override the cache identifier.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Rotation axis per qubit.
    pub fn rotations(&self) -> &[Rotation] {
        &self.rotations
    }

    /// Sweep angles in radians.
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// Exact outcome distribution per circuit, qubit 0 most significant.
    pub fn ideal_probabilities(&self) -> Vec<Vec<f64>> {
        let n = self.rotations.len();
        self.angles
            .iter()
            .map(|&theta| {
                let per_qubit: Vec<[f64; 2]> = self
                    .rotations
                    .iter()
                    .map(|r| r.probabilities(theta))
                    .collect();
                (0..1usize << n)
                    .map(|index| {
                        per_qubit
                            .iter()
                            .enumerate()
                            .map(|(q, p)| p[(index >> (n - 1 - q)) & 1])
                            .product()
                    })
                    .collect()
            })
            .collect()
    }
}

impl Workflow for RotationSweep {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn num_qubits(&self) -> usize {
        self.rotations.len()
    }

    fn circuits(&self) -> BenchResult<Vec<Circuit>> {
        let n = self.rotations.len() as u32;
        self.angles
            .iter()
            .enumerate()
            .map(|(k, &theta)| {
                let mut circuit = Circuit::with_size(format!("rotation_sweep_{k}"), n, n);
                for (q, rotation) in self.rotations.iter().enumerate() {
                    let qubit = QubitId(q as u32);
                    match rotation {
                        Rotation::X => circuit.rx(theta, qubit)?,
                        Rotation::Y => circuit.ry(theta, qubit)?,
                        Rotation::Z => circuit.rz(theta, qubit)?,
                        Rotation::I => circuit.id(qubit)?,
                    };
                }
                circuit.measure_all()?;
                Ok(circuit)
            })
            .collect()
    }

    fn supports(&self, _task: Task) -> bool {
        true
    }

    fn ideal_counts(&self) -> BenchResult<Vec<Counts>> {
        let shots = u64::from(self.session.shots());
        self.ideal_probabilities()
            .iter()
            .map(|probs| counts_from_probabilities(probs, self.num_qubits(), shots))
            .collect()
    }

    fn ideal_densities(&self) -> BenchResult<Vec<ComplexMatrix>> {
        Ok(self
            .angles
            .iter()
            .map(|&theta| {
                kron_all(self.rotations.iter().map(|r| outer(&r.state(theta))))
            })
            .collect())
    }

    fn ideal_processes(&self) -> BenchResult<Vec<ComplexMatrix>> {
        Ok(self
            .angles
            .iter()
            .map(|&theta| kron_all(self.rotations.iter().map(|r| r.process(theta))))
            .collect())
    }
}
