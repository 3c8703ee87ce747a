//! Projection of estimates onto physical density matrices.
//!
//! Uses the Smolin–Gambetta–Smith procedure: normalize the trace, take the
//! eigen-decomposition, zero the most negative eigenvalues and spread their
//! weight evenly over the rest until every eigenvalue is non-negative. The
//! result is the closest physical state in 2-norm.

use crate::error::{BenchError, BenchResult};
use crate::linalg::{ComplexMatrix, from_eigen, hermitian_eigen, hermitian_part, trace};

/// Project `estimate` onto unit-trace positive semidefinite matrices.
pub fn project_to_physical(estimate: &ComplexMatrix) -> BenchResult<ComplexMatrix> {
    let hermitian = hermitian_part(estimate);
    let tr = trace(&hermitian).re;
    if tr <= f64::EPSILON {
        return Err(BenchError::Reconstruction(format!(
            "estimate has non-positive trace {tr}"
        )));
    }
    let normalized = hermitian.mapv(|z| z / tr);

    let (mut values, vectors) = hermitian_eigen(&normalized)?;
    clip_spectrum(&mut values);

    Ok(hermitian_part(&from_eigen(&values, &vectors)))
}

/// Clip ascending `values` (summing to 1) to a non-negative spectrum with
/// the same sum.
fn clip_spectrum(values: &mut [f64]) {
    let mut remaining = values.len();
    let mut deficit = 0.0;
    let mut first_kept = 0;

    while first_kept < values.len() && values[first_kept] + deficit / (remaining as f64) < 0.0 {
        deficit += values[first_kept];
        values[first_kept] = 0.0;
        remaining -= 1;
        first_kept += 1;
    }
    if remaining == 0 {
        return;
    }
    let shift = deficit / remaining as f64;
    for v in &mut values[first_kept..] {
        *v += shift;
    }
}
