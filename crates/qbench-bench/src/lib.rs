//! Benchmark execution, result caching and tomographic reconstruction.
//!
//! The pipeline, from the outside in:
//!
//! - [`metrics`]: a [`Metric`] names the [`Task`]s it needs and computes a
//!   value from their artifacts
//! - [`runner`]: the [`TaskRunner`] serves those tasks from a [`TaskCache`]
//!   or runs the [`Workflow`] once and stores every artifact under a fresh
//!   [`Timestamp`]
//! - [`workflow`]: benchmark experiments ([`RotationSweep`],
//!   [`SpamBenchmark`], [`PyGstiBenchmark`], [`SimpleCircuitExecution`])
//! - [`tomography`]: state and process tomography wrappers and their
//!   reconstructions
//! - [`spam`]: readout-error correction of measured counts
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use qbench_adapter_sim::SimulatorBackend;
//! use qbench_bench::{
//!     FileCache, Metric, ProcessTomography, QuantumProcessFidelity, Rotation, RotationSweep,
//!     Session, StateTomography,
//! };
//!
//! let session = Session::new(Arc::new(SimulatorBackend::new()), 10_000)?;
//! let sweep = RotationSweep::new(vec![Rotation::Y, Rotation::X], -90.0, 90.0, 2, session)?;
//! let metric = QuantumProcessFidelity::new(ProcessTomography::new(StateTomography::new(sweep)));
//!
//! let cache = FileCache::new("/tmp/qbench-cache");
//! for (timestamp, fidelities) in metric.evaluate(&cache, false, true, None)? {
//!     println!("{timestamp}: {fidelities:?}");
//! }
//! ```

pub mod cache;
pub mod counts;
pub mod error;
pub mod linalg;
pub mod metrics;
pub mod pygsti;
pub mod runner;
pub mod session;
pub mod spam;
pub mod task;
pub mod tomography;
pub mod workflow;

pub use cache::{FileCache, MemoryCache, TaskCache};
pub use error::{BenchError, BenchResult};
pub use linalg::ComplexMatrix;
pub use metrics::{
    CircuitFidelity, ConfusionMatrix, Metric, MetricInputs, PyGstiResults, QuantumProcessFidelity,
    QuantumProcessMatrix, QuantumStateDensity, QuantumStateFidelity,
};
pub use pygsti::{PyGstiDataset, PyGstiRow};
pub use runner::TaskRunner;
pub use session::{Session, SessionInfo};
pub use spam::SpamConfusionMatrix;
pub use task::{Artifact, Task, Timestamp};
pub use tomography::{ProcessTomography, StateTomography};
pub use workflow::{
    ConfusionSource, ProcessReconstruction, PyGstiBenchmark, PyGstiSource, Rotation,
    RotationSweep, SimpleCircuitExecution, SpamBenchmark, StateReconstruction, Workflow,
};
