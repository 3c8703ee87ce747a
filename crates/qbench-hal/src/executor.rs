//! The circuit executor seam.
//!
//! Benchmark workflows never talk to a device directly: they hand circuits to
//! a [`CircuitExecutor`] and get [`Counts`] back. The call is synchronous and
//! blocking; an executor that needs I/O does it inside `execute`.

use qbench_ir::Circuit;

use crate::error::HalResult;
use crate::result::Counts;

/// Anything that can run a circuit for a number of shots.
///
/// # Contract
///
/// - `execute` returns counts whose bitstrings have one bit per measured
///   qubit (per qubit when the circuit has no measurements), in measurement
///   order, and whose total equals `shots`.
/// - Outcomes that were never observed are omitted.
/// - `shots == 0` is rejected with [`HalError::InvalidShots`](crate::HalError::InvalidShots).
pub trait CircuitExecutor: Send + Sync {
    /// Get the name of this executor.
    fn name(&self) -> &str;

    /// Largest circuit width this executor accepts.
    fn max_qubits(&self) -> u32;

    /// Identifier of the noise model in effect, if any.
    fn noise_model(&self) -> Option<String> {
        None
    }

    /// Seed of the sampling RNG, if the executor is deterministic.
    fn seed(&self) -> Option<u64> {
        None
    }

    /// Run `circuit` for `shots` shots.
    fn execute(&self, circuit: &Circuit, shots: u32) -> HalResult<Counts>;
}
