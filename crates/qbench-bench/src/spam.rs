//! SPAM confusion matrices and readout correction.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use qbench_hal::Counts;

use crate::counts::{probabilities_of_width, round_to_total};
use crate::error::{BenchError, BenchResult};
use crate::linalg::invert_real;

const ROW_SUM_TOLERANCE: f64 = 1e-6;

/// Row-stochastic readout confusion matrix.
///
/// Row `i` is the outcome distribution observed after preparing basis state
/// `i`; both indices follow integer bitstring order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Array2<f64>", into = "Array2<f64>")]
pub struct SpamConfusionMatrix {
    matrix: Array2<f64>,
    num_qubits: usize,
}

impl SpamConfusionMatrix {
    /// Validate and wrap a matrix.
    pub fn new(matrix: Array2<f64>) -> BenchResult<Self> {
        let (rows, cols) = matrix.dim();
        if rows != cols {
            return Err(BenchError::shape(format!(
                "confusion matrix must be square, got {rows}x{cols}"
            )));
        }
        if rows == 0 || !rows.is_power_of_two() {
            return Err(BenchError::shape(format!(
                "confusion matrix dimension {rows} is not a power of two"
            )));
        }
        for (i, row) in matrix.rows().into_iter().enumerate() {
            if row.iter().any(|&p| p < 0.0) {
                return Err(BenchError::InvalidConfig(format!(
                    "confusion matrix row {i} has a negative entry"
                )));
            }
            let sum = row.sum();
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(BenchError::InvalidConfig(format!(
                    "confusion matrix row {i} sums to {sum}"
                )));
            }
        }
        Ok(Self {
            num_qubits: rows.trailing_zeros() as usize,
            matrix,
        })
    }

    /// Build from calibration counts, one entry per prepared basis state in
    /// integer order.
    pub fn from_counts(counts: &[Counts]) -> BenchResult<Self> {
        let dim = counts.len();
        if dim == 0 || !dim.is_power_of_two() {
            return Err(BenchError::shape(format!(
                "expected 2^n calibration circuits, got {dim}"
            )));
        }
        let width = dim.trailing_zeros() as usize;
        let mut matrix = Array2::zeros((dim, dim));
        for (i, c) in counts.iter().enumerate() {
            let probs = probabilities_of_width(c, width)?;
            matrix.row_mut(i).assign(&Array1::from(probs));
        }
        Self::new(matrix)
    }

    /// The underlying matrix.
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Number of qubits the matrix describes.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Undo readout error on `counts`.
    ///
    /// Solves `ideal = observed · C⁻¹`, clips negative entries, renormalizes
    /// and rounds back to integers with the original shot total.
    pub fn correct(&self, counts: &Counts) -> BenchResult<Counts> {
        let observed = Array1::from(probabilities_of_width(counts, self.num_qubits)?);
        let inverse = invert_real(&self.matrix)?;
        let ideal = observed.dot(&inverse).mapv(|p| p.max(0.0));
        if ideal.sum() <= 0.0 {
            return Err(BenchError::Reconstruction(
                "corrected distribution has no positive mass".into(),
            ));
        }
        let rounded = round_to_total(&ideal.to_vec(), counts.total());
        Ok(Counts::from_dense(self.num_qubits, &rounded)?)
    }

    /// Correct every entry of `counts`.
    pub fn correct_all(&self, counts: &[Counts]) -> BenchResult<Vec<Counts>> {
        counts.iter().map(|c| self.correct(c)).collect()
    }
}

impl TryFrom<Array2<f64>> for SpamConfusionMatrix {
    type Error = BenchError;

    fn try_from(matrix: Array2<f64>) -> Result<Self, Self::Error> {
        Self::new(matrix)
    }
}

impl From<SpamConfusionMatrix> for Array2<f64> {
    fn from(spam: SpamConfusionMatrix) -> Self {
        spam.matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_validation() {
        assert!(SpamConfusionMatrix::new(array![[1.0, 0.0], [0.0, 1.0]]).is_ok());
        assert!(matches!(
            SpamConfusionMatrix::new(array![[1.0, 0.0, 0.0]]),
            Err(BenchError::ShapeMismatch(_))
        ));
        assert!(matches!(
            SpamConfusionMatrix::new(Array2::eye(3)),
            Err(BenchError::ShapeMismatch(_))
        ));
        assert!(matches!(
            SpamConfusionMatrix::new(array![[0.9, 0.2], [0.0, 1.0]]),
            Err(BenchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_counts() {
        let calibration = vec![
            Counts::from_dense(1, &[90, 10]).unwrap(),
            Counts::from_dense(1, &[20, 80]).unwrap(),
        ];
        let spam = SpamConfusionMatrix::from_counts(&calibration).unwrap();
        assert_eq!(spam.num_qubits(), 1);
        assert!((spam.matrix()[[0, 1]] - 0.1).abs() < 1e-12);
        assert!((spam.matrix()[[1, 0]] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_correct_inverts_readout() {
        let spam = SpamConfusionMatrix::new(array![[0.9, 0.1], [0.2, 0.8]]).unwrap();
        // Ideal [0.5, 0.5] observes [0.55, 0.45].
        let observed = Counts::from_dense(1, &[5500, 4500]).unwrap();
        let corrected = spam.correct(&observed).unwrap();
        assert_eq!(corrected.total(), 10_000);
        assert_eq!(corrected.get_str("0"), 5000);
    }

    #[test]
    fn test_singular_matrix() {
        let spam = SpamConfusionMatrix::new(array![[0.5, 0.5], [0.5, 0.5]]).unwrap();
        let counts = Counts::from_dense(1, &[1, 1]).unwrap();
        assert!(matches!(
            spam.correct(&counts),
            Err(BenchError::Reconstruction(_))
        ));
    }

    #[test]
    fn test_width_mismatch() {
        let spam = SpamConfusionMatrix::new(Array2::eye(4)).unwrap();
        let counts = Counts::from_dense(1, &[1, 1]).unwrap();
        assert!(matches!(
            spam.correct(&counts),
            Err(BenchError::ShapeMismatch(_))
        ));
    }
}
