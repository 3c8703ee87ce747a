//! Conversions between probability vectors and integer counts.

use qbench_hal::Counts;

use crate::error::{BenchError, BenchResult};

/// Round `probs` to integer counts summing exactly to `total`.
///
/// Largest-remainder apportionment: every entry gets the floor of its share,
/// then the leftover units go to the largest fractional parts (lowest index
/// first on ties). `probs` is normalized first.
pub fn round_to_total(probs: &[f64], total: u64) -> Vec<u64> {
    let norm: f64 = probs.iter().map(|p| p.max(0.0)).sum();
    if norm <= 0.0 || probs.is_empty() {
        return vec![0; probs.len()];
    }

    let shares: Vec<f64> = probs
        .iter()
        .map(|p| p.max(0.0) / norm * total as f64)
        .collect();
    let mut rounded: Vec<u64> = shares.iter().map(|s| s.floor() as u64).collect();
    let assigned: u64 = rounded.iter().sum();

    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = shares[a] - shares[a].floor();
        let fb = shares[b] - shares[b].floor();
        fb.total_cmp(&fa).then(a.cmp(&b))
    });
    for &i in order.iter().take(total.saturating_sub(assigned) as usize) {
        rounded[i] += 1;
    }
    rounded
}

/// Dense counts over every `width`-bit outcome, zeros included.
pub fn counts_from_probabilities(probs: &[f64], width: usize, total: u64) -> BenchResult<Counts> {
    Ok(Counts::from_dense(width, &round_to_total(probs, total))?)
}

/// Check that `counts` has `width`-bit outcomes and return its distribution.
pub(crate) fn probabilities_of_width(counts: &Counts, width: usize) -> BenchResult<Vec<f64>> {
    match counts.width() {
        Some(w) if w == width => Ok(counts.probabilities()),
        Some(w) => Err(BenchError::shape(format!(
            "expected {width}-bit outcomes, got {w}-bit outcomes"
        ))),
        None => Err(BenchError::shape("counts are empty")),
    }
}
