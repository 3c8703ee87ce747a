//! Simulator executor implementation.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Binomial, Distribution};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, instrument};

use qbench_hal::{Bitstring, CircuitExecutor, Counts, HalError, HalResult};
use qbench_ir::Circuit;

use crate::noise::ReadoutError;
use crate::statevector::Statevector;

/// Settings of a [`SimulatorBackend`].
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Maximum number of qubits accepted.
    pub max_qubits: u32,
    /// Sampling seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Optional readout-noise model.
    pub readout: Option<ReadoutError>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_qubits: 20,
            seed: None,
            readout: None,
        }
    }
}

/// Local simulator executor.
///
/// Each circuit is simulated once as a statevector; shots are drawn from the
/// resulting outcome distribution. Circuits up to ~20 qubits are practical.
pub struct SimulatorBackend {
    config: SimulatorConfig,
    rng: Mutex<StdRng>,
}

impl SimulatorBackend {
    /// Create a new simulator with default settings.
    pub fn new() -> Self {
        Self::with_config(SimulatorConfig::default())
    }

    /// Create a simulator with custom max qubits.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self::with_config(SimulatorConfig {
            max_qubits,
            ..SimulatorConfig::default()
        })
    }

    /// Create a simulator from explicit settings.
    pub fn with_config(config: SimulatorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Set the sampling seed.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        Self::with_config(SimulatorConfig {
            seed: Some(seed),
            ..self.config
        })
    }

    /// Attach a readout-noise model.
    #[must_use]
    pub fn with_readout_error(self, readout: ReadoutError) -> Self {
        Self::with_config(SimulatorConfig {
            readout: Some(readout),
            ..self.config
        })
    }

    /// Draw `shots` samples from `probs` with a chain of binomials.
    fn sample(&self, probs: &[f64], shots: u32) -> HalResult<Vec<u64>> {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut samples = vec![0u64; probs.len()];
        let mut remaining = u64::from(shots);
        let mut remaining_mass = 1.0;
        let last = probs.len() - 1;

        for (i, &p) in probs.iter().enumerate() {
            if remaining == 0 {
                break;
            }
            if i == last {
                samples[i] = remaining;
                break;
            }
            let conditional = if remaining_mass > 0.0 {
                (p / remaining_mass).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let binomial = Binomial::new(remaining, conditional)
                .map_err(|e| HalError::Backend(format!("sampling failed: {e}")))?;
            let n = binomial.sample(&mut *rng);
            samples[i] = n;
            remaining -= n;
            remaining_mass -= p;
        }

        Ok(samples)
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    fn run_simulation(&self, circuit: &Circuit, shots: u32) -> HalResult<Counts> {
        let start = Instant::now();

        let measured: Vec<usize> = circuit.readout_qubits().iter().map(|q| q.index()).collect();
        debug!(
            "Starting simulation: {} qubits, {} measured, {} shots",
            circuit.num_qubits(),
            measured.len(),
            shots
        );

        let sv = Statevector::from_circuit(circuit);
        let mut probs = sv.marginal_probabilities(&measured);
        if let Some(readout) = &self.config.readout {
            readout.apply(&mut probs, &measured);
        }

        let samples = self.sample(&probs, shots)?;
        let mut counts = Counts::new();
        for (index, &n) in samples.iter().enumerate() {
            if n > 0 {
                counts.add(Bitstring::from_index(index, measured.len()), n)?;
            }
        }

        debug!("Simulation completed in {:?}", start.elapsed());
        Ok(counts)
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitExecutor for SimulatorBackend {
    fn name(&self) -> &str {
        "simulator"
    }

    fn max_qubits(&self) -> u32 {
        self.config.max_qubits
    }

    fn noise_model(&self) -> Option<String> {
        self.config.readout.as_ref().map(ReadoutError::identifier)
    }

    fn seed(&self) -> Option<u64> {
        self.config.seed
    }

    fn execute(&self, circuit: &Circuit, shots: u32) -> HalResult<Counts> {
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be positive".into()));
        }
        if circuit.num_qubits() > self.config.max_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                self.config.max_qubits
            )));
        }
        if circuit.num_qubits() == 0 {
            return Err(HalError::InvalidCircuit(format!(
                "circuit '{}' has no qubits",
                circuit.name()
            )));
        }
        if let Some(readout) = &self.config.readout {
            readout.validate()?;
        }

        self.run_simulation(circuit, shots)
    }
}
