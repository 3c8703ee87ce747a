//! Statevector simulation engine.
//!
//! Amplitudes are stored with qubit `q` at bit `1 << q` of the index. The
//! public accessors that return whole vectors reorder them so qubit 0 is the
//! most significant bit, matching [`Bitstring`](qbench_hal::Bitstring)
//! integer order.

use num_complex::Complex64;

use qbench_ir::{Circuit, Instruction, InstructionKind, Matrix2, StandardGate};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// A pure quantum state over `n` qubits.
#[derive(Debug, Clone)]
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        Self::from_basis_state(num_qubits, 0)
    }

    /// The computational basis state whose integer label is `index`, qubit 0
    /// most significant.
    pub fn from_basis_state(num_qubits: usize, index: usize) -> Self {
        let mut amplitudes = vec![ZERO; 1 << num_qubits];
        amplitudes[reverse_bits(index, num_qubits)] = ONE;
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Simulate every gate of `circuit` starting from |0...0⟩.
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let mut sv = Self::new(circuit.num_qubits());
        sv.run(circuit);
        sv
    }

    /// Apply every instruction of `circuit`. Measurements are deferred.
    pub fn run(&mut self, circuit: &Circuit) {
        for inst in circuit.instructions() {
            self.apply(inst);
        }
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Apply an instruction to the statevector.
    pub fn apply(&mut self, instruction: &Instruction) {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let qubits: Vec<_> = instruction.qubits.iter().map(|q| q.index()).collect();
                self.apply_standard_gate(gate, &qubits);
            }
            InstructionKind::Measure | InstructionKind::Barrier => {}
        }
    }

    fn apply_standard_gate(&mut self, gate: &StandardGate, qubits: &[usize]) {
        if let Some(m) = gate.matrix() {
            self.apply_single(qubits[0], &m);
        } else if let Some(m) = gate.controlled_target() {
            self.apply_controlled(qubits[0], qubits[1], &m);
        } else {
            match gate {
                StandardGate::Swap => self.apply_swap(qubits[0], qubits[1]),
                StandardGate::CCX => self.apply_ccx(qubits[0], qubits[1], qubits[2]),
                _ => {}
            }
        }
    }

    fn apply_single(&mut self, qubit: usize, m: &Matrix2) {
        let mask = 1 << qubit;
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    fn apply_controlled(&mut self, control: usize, target: usize, m: &Matrix2) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..(1 << self.num_qubits) {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..(1 << self.num_qubits) {
            if (i & mask1 != 0) && (i & mask2 == 0) {
                let j = (i & !mask1) | mask2;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_ccx(&mut self, c1: usize, c2: usize, target: usize) {
        let ctrl_mask = (1 << c1) | (1 << c2);
        let tgt_mask = 1 << target;
        for i in 0..(1 << self.num_qubits) {
            if (i & ctrl_mask == ctrl_mask) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    /// Amplitudes indexed with qubit 0 as the most significant bit.
    pub fn amplitudes(&self) -> Vec<Complex64> {
        (0..self.amplitudes.len())
            .map(|k| self.amplitudes[reverse_bits(k, self.num_qubits)])
            .collect()
    }

    /// Outcome probabilities indexed with qubit 0 as the most significant bit.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes().iter().map(Complex64::norm_sqr).collect()
    }

    /// Joint outcome distribution of `qubits`, the first listed qubit being
    /// the most significant bit of the result index.
    pub fn marginal_probabilities(&self, qubits: &[usize]) -> Vec<f64> {
        let width = qubits.len();
        let mut probs = vec![0.0; 1 << width];
        for (i, amp) in self.amplitudes.iter().enumerate() {
            let outcome = qubits
                .iter()
                .enumerate()
                .fold(0usize, |acc, (k, &q)| acc | (((i >> q) & 1) << (width - 1 - k)));
            probs[outcome] += amp.norm_sqr();
        }
        probs
    }
}

fn reverse_bits(index: usize, width: usize) -> usize {
    (0..width).fold(0, |acc, q| acc | (((index >> q) & 1) << (width - 1 - q)))
}
