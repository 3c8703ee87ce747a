//! Dense complex linear algebra on `ndarray` matrices.
//!
//! Basis indices follow the bitstring convention: qubit 0 is the most
//! significant bit of a density-matrix index and the most significant base-4
//! digit of a Pauli-string index.

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{BenchError, BenchResult};

/// Dense complex square matrix.
pub type ComplexMatrix = Array2<Complex64>;

const EIGEN_EPS: f64 = 1e-14;
const EIGEN_MAX_ITER: usize = 10_000;

pub(crate) const fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// `d × d` identity.
pub fn identity(d: usize) -> ComplexMatrix {
    Array2::from_shape_fn((d, d), |(i, j)| if i == j { c(1.0, 0.0) } else { c(0.0, 0.0) })
}

/// Single-qubit Pauli matrix: 0 = I, 1 = X, 2 = Y, 3 = Z.
pub fn pauli(k: usize) -> ComplexMatrix {
    let (a, b, cc, d) = match k {
        0 => (c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(1.0, 0.0)),
        1 => (c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)),
        2 => (c(0.0, 0.0), c(0.0, -1.0), c(0.0, 1.0), c(0.0, 0.0)),
        _ => (c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(-1.0, 0.0)),
    };
    ndarray::array![[a, b], [cc, d]]
}

/// Per-qubit Pauli digits of a Pauli-string index, qubit 0 first.
pub fn pauli_digits(index: usize, num_qubits: usize) -> Vec<usize> {
    (0..num_qubits)
        .map(|q| (index / 4usize.pow((num_qubits - 1 - q) as u32)) % 4)
        .collect()
}

/// The `n`-qubit Pauli string with base-4 label `index`.
pub fn pauli_string(index: usize, num_qubits: usize) -> ComplexMatrix {
    kron_all(pauli_digits(index, num_qubits).into_iter().map(pauli))
}

/// Kronecker product `a ⊗ b`.
pub fn kron(a: &ComplexMatrix, b: &ComplexMatrix) -> ComplexMatrix {
    let (ar, ac) = a.dim();
    let (br, bc) = b.dim();
    Array2::from_shape_fn((ar * br, ac * bc), |(i, j)| {
        a[[i / br, j / bc]] * b[[i % br, j % bc]]
    })
}

/// Kronecker product of a sequence, first factor most significant.
pub fn kron_all(factors: impl IntoIterator<Item = ComplexMatrix>) -> ComplexMatrix {
    factors
        .into_iter()
        .fold(identity(1), |acc, m| kron(&acc, &m))
}

/// Conjugate transpose.
pub fn dagger(a: &ComplexMatrix) -> ComplexMatrix {
    a.t().mapv(|z| z.conj())
}

/// Matrix trace.
pub fn trace(a: &ComplexMatrix) -> Complex64 {
    a.diag().sum()
}

/// `|ψ⟩⟨ψ|`.
pub fn outer(psi: &[Complex64]) -> ComplexMatrix {
    Array2::from_shape_fn((psi.len(), psi.len()), |(i, j)| psi[i] * psi[j].conj())
}

/// `(a + a†) / 2`.
pub fn hermitian_part(a: &ComplexMatrix) -> ComplexMatrix {
    (a + &dagger(a)).mapv(|z| z * 0.5)
}

/// Largest entrywise distance between `a` and `b`.
pub fn max_abs_diff(a: &ComplexMatrix, b: &ComplexMatrix) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}

/// Eigen-decomposition of a Hermitian matrix.
///
/// Returns eigenvalues in ascending order with eigenvectors as the matching
/// columns.
pub fn hermitian_eigen(a: &ComplexMatrix) -> BenchResult<(Vec<f64>, ComplexMatrix)> {
    let (rows, cols) = a.dim();
    if rows != cols {
        return Err(BenchError::shape(format!(
            "eigen-decomposition needs a square matrix, got {rows}x{cols}"
        )));
    }
    let h = hermitian_part(a);
    let m = DMatrix::from_fn(rows, cols, |i, j| h[[i, j]]);
    let eigen = SymmetricEigen::try_new(m, EIGEN_EPS, EIGEN_MAX_ITER).ok_or_else(|| {
        BenchError::Reconstruction(format!(
            "eigen-decomposition of a {rows}x{rows} matrix did not converge"
        ))
    })?;

    let mut order: Vec<usize> = (0..rows).collect();
    order.sort_by(|&x, &y| eigen.eigenvalues[x].total_cmp(&eigen.eigenvalues[y]));

    let values = order.iter().map(|&k| eigen.eigenvalues[k]).collect();
    let vectors = Array2::from_shape_fn((rows, rows), |(i, j)| eigen.eigenvectors[(i, order[j])]);
    Ok((values, vectors))
}

/// `Σ_k λ_k |v_k⟩⟨v_k|` from eigenvalues and eigenvector columns.
pub fn from_eigen(values: &[f64], vectors: &ComplexMatrix) -> ComplexMatrix {
    let d = vectors.nrows();
    Array2::from_shape_fn((d, d), |(i, j)| {
        values
            .iter()
            .enumerate()
            .map(|(k, &lambda)| vectors[[i, k]] * vectors[[j, k]].conj() * lambda)
            .sum()
    })
}

/// Principal square root of a positive semidefinite matrix. Negative
/// eigenvalues from round-off are treated as zero.
pub fn psd_sqrt(a: &ComplexMatrix) -> BenchResult<ComplexMatrix> {
    let (values, vectors) = hermitian_eigen(a)?;
    let roots: Vec<f64> = values.iter().map(|v| v.max(0.0).sqrt()).collect();
    Ok(from_eigen(&roots, &vectors))
}

/// Invert a real square matrix.
pub fn invert_real(a: &Array2<f64>) -> BenchResult<Array2<f64>> {
    let (rows, cols) = a.dim();
    let m = DMatrix::from_fn(rows, cols, |i, j| a[[i, j]]);
    let inverse = m
        .try_inverse()
        .ok_or_else(|| BenchError::Reconstruction("matrix is singular".into()))?;
    Ok(Array2::from_shape_fn((rows, cols), |(i, j)| inverse[(i, j)]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pauli_string_order() {
        // Label 1 = I ⊗ X: X acts on the least significant qubit.
        let ix = pauli_string(1, 2);
        assert_eq!(ix[[0, 1]], c(1.0, 0.0));
        assert_eq!(ix[[0, 2]], c(0.0, 0.0));
        assert_eq!(pauli_digits(6, 2), vec![1, 2]);
    }

    #[test]
    fn test_paulis_are_orthogonal() {
        for a in 0..16 {
            for b in 0..16 {
                let overlap = trace(&dagger(&pauli_string(a, 2)).dot(&pauli_string(b, 2)));
                let expected = if a == b { 4.0 } else { 0.0 };
                assert!((overlap - c(expected, 0.0)).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn test_hermitian_eigen_reconstructs() {
        let y = pauli(2);
        let (values, vectors) = hermitian_eigen(&y).unwrap();
        assert!((values[0] + 1.0).abs() < 1e-12);
        assert!((values[1] - 1.0).abs() < 1e-12);
        assert!(max_abs_diff(&from_eigen(&values, &vectors), &y) < 1e-12);
    }

    #[test]
    fn test_psd_sqrt() {
        let a = identity(2).mapv(|z| z * 4.0);
        let root = psd_sqrt(&a).unwrap();
        assert!(max_abs_diff(&root, &identity(2).mapv(|z| z * 2.0)) < 1e-12);
    }

    #[test]
    fn test_invert_real() {
        let a = ndarray::array![[0.9, 0.1], [0.2, 0.8]];
        let inv = invert_real(&a).unwrap();
        let id = a.dot(&inv);
        assert!((id[[0, 0]] - 1.0).abs() < 1e-12);
        assert!(id[[0, 1]].abs() < 1e-12);

        let singular = ndarray::array![[0.5, 0.5], [0.5, 0.5]];
        assert!(matches!(
            invert_real(&singular),
            Err(BenchError::Reconstruction(_))
        ));
    }
}
