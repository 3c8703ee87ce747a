//! State and process tomography.
//!
//! [`StateTomography`] wraps a workflow and measures each of its circuits in
//! every product Pauli basis; [`ProcessTomography`] wraps a state tomography
//! and additionally prepares every product input state from
//! `{|0⟩, |1⟩, |+⟩, |+i⟩}`.
//!
//! Process matrices are χ-matrices in the Pauli basis:
//! `E(ρ) = Σ_mn χ_mn P_m ρ P_n†`, normalized so a trace-preserving process has
//! `tr χ = 1`.

mod basis;
mod fidelity;
mod mle;
mod process;
mod state;

pub use basis::{MeasurementBasis, PreparationState};
pub use fidelity::{
    calculate_average_gate_fidelity, calculate_process_fidelity, calculate_state_fidelity,
    ideal_unitary, rotation_process, unitary_to_process,
};
pub use mle::project_to_physical;
pub use process::{ProcessTomography, assemble_process};
pub use state::{StateTomography, linear_inversion};
