//! qbench Hardware Abstraction Layer
//!
//! The seam between benchmark workflows and whatever runs circuits:
//!
//! - [`CircuitExecutor`]: synchronous `execute(circuit, shots)`
//! - [`Counts`] and [`Bitstring`]: measurement outcomes
//! - [`HalError`]: executor and result errors
//!
//! # Example
//!
//! ```ignore
//! use qbench_hal::CircuitExecutor;
//! use qbench_adapter_sim::SimulatorBackend;
//! use qbench_ir::Circuit;
//!
//! let backend = SimulatorBackend::new();
//! let counts = backend.execute(&Circuit::bell()?, 1000)?;
//! if let Some((bitstring, count)) = counts.most_frequent() {
//!     println!("Most frequent: {} ({} times)", bitstring, count);
//! }
//! ```

pub mod error;
pub mod executor;
pub mod result;

pub use error::{HalError, HalResult};
pub use executor::CircuitExecutor;
pub use result::{Bitstring, Counts};
