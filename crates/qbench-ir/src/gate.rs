//! Standard gate set and its unitary action.

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4, PI};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// A 2×2 complex matrix, row-major.
pub type Matrix2 = [[Complex64; 2]; 2];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// Gates a benchmark circuit may contain. Angles are in radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    I,
    X,
    Y,
    Z,
    H,
    S,
    Sdg,
    T,
    Tdg,
    SX,
    Rx(f64),
    Ry(f64),
    Rz(f64),
    /// Phase gate `diag(1, e^{iθ})`.
    P(f64),
    /// `U(θ, φ, λ)` in the OpenQASM convention.
    U(f64, f64, f64),
    /// Controlled-X; operands are `[control, target]`.
    CX,
    CY,
    CZ,
    Swap,
    /// Controlled phase.
    CP(f64),
    /// Toffoli; operands are `[control, control, target]`.
    CCX,
}

impl StandardGate {
    /// Lowercase mnemonic.
    pub fn name(&self) -> &'static str {
        use StandardGate::*;
        match self {
            I => "id",
            X => "x",
            Y => "y",
            Z => "z",
            H => "h",
            S => "s",
            Sdg => "sdg",
            T => "t",
            Tdg => "tdg",
            SX => "sx",
            Rx(_) => "rx",
            Ry(_) => "ry",
            Rz(_) => "rz",
            P(_) => "p",
            U(..) => "u",
            CX => "cx",
            CY => "cy",
            CZ => "cz",
            Swap => "swap",
            CP(_) => "cp",
            CCX => "ccx",
        }
    }

    /// Number of operands.
    pub fn num_qubits(&self) -> u32 {
        match self {
            Self::CX | Self::CY | Self::CZ | Self::Swap | Self::CP(_) => 2,
            Self::CCX => 3,
            _ => 1,
        }
    }

    /// Unitary of a single-qubit gate; `None` for multi-qubit gates.
    pub fn matrix(&self) -> Option<Matrix2> {
        let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
        let m = match self {
            Self::I => [[ONE, ZERO], [ZERO, ONE]],
            Self::X => pauli_x(),
            Self::Y => pauli_y(),
            Self::Z => phase(PI),
            Self::H => [[h, h], [h, -h]],
            Self::S => phase(FRAC_PI_2),
            Self::Sdg => phase(-FRAC_PI_2),
            Self::T => phase(FRAC_PI_4),
            Self::Tdg => phase(-FRAC_PI_4),
            Self::SX => rx(FRAC_PI_2),
            Self::Rx(theta) => rx(*theta),
            Self::Ry(theta) => {
                let (s, c) = (theta / 2.0).sin_cos();
                [[c.into(), (-s).into()], [s.into(), c.into()]]
            }
            Self::Rz(theta) => [
                [Complex64::from_polar(1.0, -theta / 2.0), ZERO],
                [ZERO, Complex64::from_polar(1.0, theta / 2.0)],
            ],
            Self::P(theta) => phase(*theta),
            Self::U(theta, phi, lambda) => {
                let (s, c) = (theta / 2.0).sin_cos();
                [
                    [c.into(), -Complex64::from_polar(s, *lambda)],
                    [Complex64::from_polar(s, *phi), Complex64::from_polar(c, phi + lambda)],
                ]
            }
            _ => return None,
        };
        Some(m)
    }

    /// Target unitary of a singly-controlled gate.
    pub fn controlled_target(&self) -> Option<Matrix2> {
        match self {
            Self::CX => Some(pauli_x()),
            Self::CY => Some(pauli_y()),
            Self::CZ => Some(phase(PI)),
            Self::CP(theta) => Some(phase(*theta)),
            _ => None,
        }
    }
}

fn pauli_x() -> Matrix2 {
    [[ZERO, ONE], [ONE, ZERO]]
}

fn pauli_y() -> Matrix2 {
    let i = Complex64::new(0.0, 1.0);
    [[ZERO, -i], [i, ZERO]]
}

fn phase(theta: f64) -> Matrix2 {
    [[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, theta)]]
}

fn rx(theta: f64) -> Matrix2 {
    let (s, c) = (theta / 2.0).sin_cos();
    let off = Complex64::new(0.0, -s);
    [[c.into(), off], [off, c.into()]]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &Matrix2, b: &Matrix2) -> bool {
        a.iter()
            .flatten()
            .zip(b.iter().flatten())
            .all(|(x, y)| (x - y).norm() < 1e-12)
    }

    fn mul(a: &Matrix2, b: &Matrix2) -> Matrix2 {
        let mut out = [[ZERO; 2]; 2];
        for r in 0..2 {
            for c in 0..2 {
                out[r][c] = a[r][0] * b[0][c] + a[r][1] * b[1][c];
            }
        }
        out
    }

    #[test]
    fn test_arity() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CP(0.3).num_qubits(), 2);
        assert_eq!(StandardGate::CCX.num_qubits(), 3);
        assert_eq!(StandardGate::Rx(PI).name(), "rx");
    }

    #[test]
    fn test_single_qubit_matrices() {
        let s = StandardGate::S.matrix().unwrap();
        assert!(close(&mul(&s, &s), &StandardGate::Z.matrix().unwrap()));
        let sx = StandardGate::SX.matrix().unwrap();
        assert!(close(&mul(&sx, &sx), &StandardGate::Rx(PI).matrix().unwrap()));
        // U(θ, -π/2, π/2) is Rx(θ).
        let u = StandardGate::U(0.4, -FRAC_PI_2, FRAC_PI_2).matrix().unwrap();
        assert!(close(&u, &StandardGate::Rx(0.4).matrix().unwrap()));
        assert!(StandardGate::CX.matrix().is_none());
    }

    #[test]
    fn test_controlled_targets() {
        assert!(close(
            &StandardGate::CZ.controlled_target().unwrap(),
            &StandardGate::Z.matrix().unwrap()
        ));
        assert!(StandardGate::Swap.controlled_target().is_none());
        assert!(StandardGate::H.controlled_target().is_none());
    }
}
