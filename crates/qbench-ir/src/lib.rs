//! qbench Circuit Representation
//!
//! This crate provides the circuit data structures shared by the qbench
//! executors and benchmark workflows.
//!
//! # Core Components
//!
//! - **Qubits and Classical Bits**: [`QubitId`], [`ClbitId`] index the registers
//! - **Gates**: [`StandardGate`] for built-in gates (H, X, CX, rotations, ...)
//! - **Instructions**: [`Instruction`] combining gates with their operands
//! - **Circuit**: [`Circuit`] builder with validated appends
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qbench_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2, 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.gate_count(), 2);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `I`, `X`, `Y`, `Z` | 1 | Identity and Pauli gates |
//! | `H`, `S`, `Sdg`, `T`, `Tdg`, `SX` | 1 | Clifford+T gates |
//! | `Rx`, `Ry`, `Rz`, `P`, `U` | 1 | Rotation and phase gates |
//! | `CX`, `CY`, `CZ`, `Swap`, `CP` | 2 | Two-qubit gates |
//! | `CCX` | 3 | Toffoli gate |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{Matrix2, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId};
