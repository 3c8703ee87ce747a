//! Readout noise applied to sampled measurement outcomes.

use serde::{Deserialize, Serialize};

use qbench_hal::{HalError, HalResult};

/// Misclassification probabilities of a single qubit's readout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QubitReadout {
    /// Probability of reading 1 when the qubit is in |0⟩.
    pub p01: f64,
    /// Probability of reading 0 when the qubit is in |1⟩.
    pub p10: f64,
}

impl QubitReadout {
    fn validate(&self) -> HalResult<()> {
        for (name, p) in [("p01", self.p01), ("p10", self.p10)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(HalError::Backend(format!(
                    "readout probability {name} = {p} is outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// A readout-noise model.
///
/// Modelled as an independent classical bit-flip per measured qubit, applied
/// to the ideal outcome distribution before sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReadoutError {
    /// Same probabilities on every qubit.
    Uniform { p01: f64, p10: f64 },
    /// One entry per physical qubit; qubits past the end are noiseless.
    PerQubit { qubits: Vec<QubitReadout> },
}

impl ReadoutError {
    /// Reject probabilities outside `[0, 1]`.
    pub fn validate(&self) -> HalResult<()> {
        match self {
            Self::Uniform { p01, p10 } => QubitReadout {
                p01: *p01,
                p10: *p10,
            }
            .validate(),
            Self::PerQubit { qubits } => qubits.iter().try_for_each(QubitReadout::validate),
        }
    }

    /// Readout probabilities of physical qubit `qubit`.
    pub fn for_qubit(&self, qubit: usize) -> QubitReadout {
        match self {
            Self::Uniform { p01, p10 } => QubitReadout {
                p01: *p01,
                p10: *p10,
            },
            Self::PerQubit { qubits } => qubits.get(qubit).copied().unwrap_or(QubitReadout {
                p01: 0.0,
                p10: 0.0,
            }),
        }
    }

    /// Short identifier recorded in session snapshots.
    pub fn identifier(&self) -> String {
        match self {
            Self::Uniform { p01, p10 } => format!("readout_uniform(p01={p01},p10={p10})"),
            Self::PerQubit { qubits } => format!("readout_per_qubit({})", qubits.len()),
        }
    }

    /// Push the distribution over `measured` qubits through the readout
    /// channel. Index bit `k` (from the most significant end) belongs to
    /// `measured[k]`.
    pub fn apply(&self, probs: &mut [f64], measured: &[usize]) {
        let width = measured.len();
        for (k, &qubit) in measured.iter().enumerate() {
            let QubitReadout { p01, p10 } = self.for_qubit(qubit);
            let mask = 1 << (width - 1 - k);
            for i in 0..probs.len() {
                if i & mask == 0 {
                    let j = i | mask;
                    let p0 = probs[i];
                    let p1 = probs[j];
                    probs[i] = (1.0 - p01) * p0 + p10 * p1;
                    probs[j] = p01 * p0 + (1.0 - p10) * p1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_flip() {
        let noise = ReadoutError::Uniform { p01: 0.1, p10: 0.2 };
        let mut probs = vec![1.0, 0.0];
        noise.apply(&mut probs, &[0]);
        assert!((probs[0] - 0.9).abs() < 1e-12);
        assert!((probs[1] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_per_qubit_targets_physical_qubit() {
        let noise = ReadoutError::PerQubit {
            qubits: vec![
                QubitReadout { p01: 0.0, p10: 0.0 },
                QubitReadout { p01: 0.5, p10: 0.0 },
            ],
        };
        // Measured order (1, 0): qubit 1 is the most significant bit.
        let mut probs = vec![1.0, 0.0, 0.0, 0.0];
        noise.apply(&mut probs, &[1, 0]);
        assert!((probs[0b00] - 0.5).abs() < 1e-12);
        assert!((probs[0b10] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_validate() {
        assert!(ReadoutError::Uniform { p01: 1.5, p10: 0.0 }.validate().is_err());
        assert!(ReadoutError::Uniform { p01: 0.0, p10: 0.3 }.validate().is_ok());
    }

    #[test]
    fn test_serde_tagged() {
        let noise: ReadoutError =
            serde_json::from_str(r#"{"kind":"uniform","p01":0.02,"p10":0.03}"#).unwrap();
        assert_eq!(noise, ReadoutError::Uniform { p01: 0.02, p10: 0.03 });
    }
}
