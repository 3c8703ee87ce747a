//! Error types for the HAL crate.

use thiserror::Error;

/// Errors that can occur in HAL operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// Invalid circuit.
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// Circuit exceeds executor capabilities.
    #[error("Circuit exceeds executor capabilities: {0}")]
    CircuitTooLarge(String),

    /// Invalid number of shots.
    #[error("Invalid shots: {0}")]
    InvalidShots(String),

    /// A bitstring did not match the width of the counts it was added to.
    #[error("Bitstring width mismatch: expected {expected} bits, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    /// Text that is not a string of `0` and `1`.
    #[error("Invalid bitstring: {0:?}")]
    InvalidBitstring(String),

    /// Generic executor error.
    #[error("Executor error: {0}")]
    Backend(String),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
