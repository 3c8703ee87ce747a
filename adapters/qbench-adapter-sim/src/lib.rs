//! qbench Local Statevector Simulator
//!
//! A [`CircuitExecutor`](qbench_hal::CircuitExecutor) for tests, the CLI and
//! small experiments. Each circuit is simulated once; shots are sampled from
//! the exact outcome distribution, optionally distorted by a
//! [`ReadoutError`] model.
//!
//! # Performance
//!
//! | Qubits | Memory | Simulation Speed |
//! |--------|--------|------------------|
//! | 10 | ~16 KB | Instant |
//! | 15 | ~512 KB | Fast |
//! | 20 | ~16 MB | Moderate |
//!
//! # Example
//!
//! ```rust
//! use qbench_adapter_sim::SimulatorBackend;
//! use qbench_hal::CircuitExecutor;
//! use qbench_ir::Circuit;
//!
//! let backend = SimulatorBackend::new().with_seed(1);
//! let counts = backend.execute(&Circuit::bell().unwrap(), 1000).unwrap();
//! assert_eq!(counts.get_str("00") + counts.get_str("11"), 1000);
//! ```

mod noise;
mod simulator;
pub mod statevector;

pub use noise::{QubitReadout, ReadoutError};
pub use simulator::{SimulatorBackend, SimulatorConfig};
pub use statevector::Statevector;
