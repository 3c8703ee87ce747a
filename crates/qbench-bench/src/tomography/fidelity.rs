//! Fidelities and ideal process matrices.

use ndarray::Array2;
use num_complex::Complex64;

use qbench_adapter_sim::Statevector;
use qbench_ir::Circuit;

use crate::error::{BenchError, BenchResult};
use crate::linalg::{ComplexMatrix, c, dagger, hermitian_eigen, pauli_string, psd_sqrt, trace};

fn check_same_shape(a: &ComplexMatrix, b: &ComplexMatrix, what: &str) -> BenchResult<()> {
    if a.dim() != b.dim() || a.nrows() != a.ncols() {
        return Err(BenchError::shape(format!(
            "{what} fidelity of {:?} and {:?} matrices",
            a.dim(),
            b.dim()
        )));
    }
    Ok(())
}

/// `|tr(ideal† · measured)|`.
///
/// Not divided by the dimension: with χ normalized to unit trace, a unitary
/// process compared with itself scores exactly 1.
pub fn calculate_process_fidelity(
    measured: &ComplexMatrix,
    ideal: &ComplexMatrix,
) -> BenchResult<f64> {
    check_same_shape(measured, ideal, "process")?;
    Ok(trace(&dagger(ideal).dot(measured)).norm())
}

/// `(d·F + 1) / (d + 1)` with `d = 2^n`.
pub fn calculate_average_gate_fidelity(process_fidelity: f64, num_qubits: usize) -> f64 {
    let d = (1usize << num_qubits) as f64;
    (d * process_fidelity + 1.0) / (d + 1.0)
}

/// Uhlmann fidelity `(tr √(√ρ σ √ρ))²`.
pub fn calculate_state_fidelity(rho: &ComplexMatrix, sigma: &ComplexMatrix) -> BenchResult<f64> {
    check_same_shape(rho, sigma, "state")?;
    let root = psd_sqrt(rho)?;
    let inner = root.dot(sigma).dot(&root);
    let (values, _) = hermitian_eigen(&inner)?;
    let sum: f64 = values.iter().map(|v| v.max(0.0).sqrt()).sum();
    Ok(sum * sum)
}

/// χ-matrix of the unitary `u`: `χ_mn = u_m · conj(u_n)` with
/// `u_m = tr(P_m U) / d`.
pub fn unitary_to_process(u: &ComplexMatrix) -> BenchResult<ComplexMatrix> {
    let d = u.nrows();
    if d == 0 || d != u.ncols() || !d.is_power_of_two() {
        return Err(BenchError::shape(format!(
            "unitary must be 2^n x 2^n, got {:?}",
            u.dim()
        )));
    }
    let n = d.trailing_zeros() as usize;
    let coefficients: Vec<Complex64> = (0..d * d)
        .map(|m| trace(&pauli_string(m, n).dot(u)) / d as f64)
        .collect();
    Ok(Array2::from_shape_fn((d * d, d * d), |(m, k)| {
        coefficients[m] * coefficients[k].conj()
    }))
}

/// χ-matrix of the single-qubit rotation `exp(-iθP/2)` about Pauli `pauli`
/// (0 = I, 1 = X, 2 = Y, 3 = Z).
pub fn rotation_process(pauli: usize, theta: f64) -> ComplexMatrix {
    let (s, co) = (theta / 2.0).sin_cos();
    let mut u = [c(0.0, 0.0); 4];
    u[0] += c(co, 0.0);
    u[pauli.min(3)] += c(0.0, -s);
    Array2::from_shape_fn((4, 4), |(m, k)| u[m] * u[k].conj())
}

/// Unitary implemented by the gates of `circuit`, measurements ignored.
///
/// Column `k` is the image of basis state `k` (qubit 0 most significant).
pub fn ideal_unitary(circuit: &Circuit) -> ComplexMatrix {
    let n = circuit.num_qubits();
    let d = 1usize << n;
    let body = circuit.without_measurements();
    let mut u = Array2::zeros((d, d));
    for k in 0..d {
        let mut sv = Statevector::from_basis_state(n, k);
        sv.run(&body);
        for (i, amp) in sv.amplitudes().into_iter().enumerate() {
            u[[i, k]] = amp;
        }
    }
    u
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{identity, max_abs_diff, outer};
    use qbench_ir::QubitId;
    use std::f64::consts::PI;

    #[test]
    fn test_rotation_process_entries() {
        let theta: f64 = 0.7;
        let (s, co) = (theta / 2.0).sin_cos();
        let chi = rotation_process(2, theta);
        assert!((chi[[0, 0]] - c(co * co, 0.0)).norm() < 1e-12);
        assert!((chi[[2, 2]] - c(s * s, 0.0)).norm() < 1e-12);
        assert!((chi[[0, 2]] - c(0.0, s * co)).norm() < 1e-12);
        assert!((chi[[2, 0]] - c(0.0, -s * co)).norm() < 1e-12);
        assert!((trace(&chi).re - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unitary_to_process_matches_rotation() {
        let mut circuit = Circuit::with_size("rx", 1, 0);
        circuit.rx(1.1, QubitId(0)).unwrap();
        let chi = unitary_to_process(&ideal_unitary(&circuit)).unwrap();
        assert!(max_abs_diff(&chi, &rotation_process(1, 1.1)) < 1e-12);
    }

    #[test]
    fn test_process_self_fidelity_is_one() {
        let mut circuit = Circuit::with_size("u", 2, 0);
        circuit
            .ry(0.3, QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .rz(PI / 5.0, QubitId(1))
            .unwrap();
        let chi = unitary_to_process(&ideal_unitary(&circuit)).unwrap();
        let f = calculate_process_fidelity(&chi, &chi).unwrap();
        assert!((f - 1.0).abs() < 1e-12);
        assert!((calculate_average_gate_fidelity(f, 2) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_orthogonal_processes() {
        let identity_chi = rotation_process(0, 0.0);
        let x_flip = rotation_process(1, PI);
        let f = calculate_process_fidelity(&x_flip, &identity_chi).unwrap();
        assert!(f < 1e-12);
        assert!((calculate_average_gate_fidelity(0.0, 1) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_state_fidelity() {
        let zero = outer(&[c(1.0, 0.0), c(0.0, 0.0)]);
        let plus = outer(&[c(0.5f64.sqrt(), 0.0), c(0.5f64.sqrt(), 0.0)]);
        let mixed = identity(2).mapv(|z| z * 0.5);

        assert!((calculate_state_fidelity(&zero, &zero).unwrap() - 1.0).abs() < 1e-9);
        assert!((calculate_state_fidelity(&zero, &plus).unwrap() - 0.5).abs() < 1e-9);
        assert!((calculate_state_fidelity(&mixed, &zero).unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_shape_mismatch() {
        assert!(matches!(
            calculate_process_fidelity(&identity(4), &identity(16)),
            Err(BenchError::ShapeMismatch(_))
        ));
    }
}
