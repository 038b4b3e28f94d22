//! Statevector simulation engine.
//!
//! Qubit `k` is bit `k` of the amplitude index. The trajectory method runs
//! one [`Statevector`] per shot and samples every measurement and Kraus
//! branch; the same type also represents the ideal encoded states that
//! noisy snapshots are compared against.

use num_complex::Complex64;
use rand::Rng;

use qecsim_ir::{Pauli, PauliString, StandardGate};

use crate::density_matrix::DensityMatrix;
use crate::error::{SimError, SimResult};
use crate::gates::{GateMatrix, Matrix2, Matrix4, gate_matrix};

/// Probabilities below this are treated as impossible branches.
pub(crate) const PROB_EPSILON: f64 = 1e-14;

/// A statevector representing a pure quantum state.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Wrap a list of amplitudes. The length must be a power of two.
    pub fn from_amplitudes(amplitudes: Vec<Complex64>) -> SimResult<Self> {
        let len = amplitudes.len();
        if len == 0 || !len.is_power_of_two() {
            return Err(SimError::InvalidState(format!(
                "{len} amplitudes is not a power of two"
            )));
        }
        Ok(Self {
            num_qubits: len.trailing_zeros() as usize,
            amplitudes,
        })
    }

    /// The computational basis state `index`.
    pub fn basis(num_qubits: usize, index: usize) -> SimResult<Self> {
        let dim = 1usize << num_qubits;
        if index >= dim {
            return Err(SimError::DimensionMismatch {
                expected: dim,
                got: index,
            });
        }
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); dim];
        amplitudes[index] = Complex64::new(1.0, 0.0);
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Hilbert-space dimension.
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// The amplitudes, indexed little-endian by qubit.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Consume into the raw amplitudes.
    pub fn into_amplitudes(self) -> Vec<Complex64> {
        self.amplitudes
    }

    fn check_qubit(&self, qubit: usize) -> SimResult<()> {
        if qubit >= self.num_qubits {
            return Err(SimError::QubitOutOfRange {
                qubit,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }

    /// Apply a standard gate to the given qubits.
    pub fn apply_gate(&mut self, gate: &StandardGate, qubits: &[usize]) -> SimResult<()> {
        for &q in qubits {
            self.check_qubit(q)?;
        }
        match (gate_matrix(gate), qubits) {
            (GateMatrix::Single(m), [q]) => self.apply_single(*q, &m),
            (GateMatrix::Two(m), [q0, q1]) => self.apply_two(*q0, *q1, &m),
            (_, _) => {
                return Err(SimError::DimensionMismatch {
                    expected: gate.num_qubits() as usize,
                    got: qubits.len(),
                });
            }
        }
        Ok(())
    }

    /// Apply a 2×2 matrix (not necessarily unitary) to one qubit.
    pub fn apply_single(&mut self, qubit: usize, m: &Matrix2) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    /// Apply a 4×4 matrix to two qubits, `q0` as the low local bit.
    pub fn apply_two(&mut self, q0: usize, q1: usize, m: &Matrix4) {
        let m0 = 1 << q0;
        let m1 = 1 << q1;
        for i in 0..self.amplitudes.len() {
            if i & (m0 | m1) == 0 {
                let idx = [i, i | m0, i | m1, i | m0 | m1];
                let v = idx.map(|k| self.amplitudes[k]);
                for (r, &k) in idx.iter().enumerate() {
                    self.amplitudes[k] = (0..4).map(|c| m[r][c] * v[c]).sum();
                }
            }
        }
    }

    /// Apply a Pauli string; factor `k` acts on `qubits[k]`.
    pub fn apply_pauli(&mut self, pauli: &PauliString, qubits: &[usize]) -> SimResult<()> {
        if pauli.len() != qubits.len() {
            return Err(SimError::DimensionMismatch {
                expected: qubits.len(),
                got: pauli.len(),
            });
        }
        for (op, &q) in pauli.ops().iter().zip(qubits) {
            let gate = match op {
                Pauli::I => continue,
                Pauli::X => StandardGate::X,
                Pauli::Y => StandardGate::Y,
                Pauli::Z => StandardGate::Z,
            };
            self.apply_gate(&gate, &[q])?;
        }
        Ok(())
    }

    /// Squared norm ⟨ψ|ψ⟩.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum()
    }

    /// Rescale to unit norm.
    pub fn normalize(&mut self) -> SimResult<()> {
        let norm = self.norm_sqr().sqrt();
        if norm < PROB_EPSILON {
            return Err(SimError::InvalidState("cannot normalize a zero vector".into()));
        }
        for amp in &mut self.amplitudes {
            *amp /= norm;
        }
        Ok(())
    }

    /// Inner product ⟨self|other⟩.
    pub fn inner(&self, other: &Statevector) -> SimResult<Complex64> {
        if self.dim() != other.dim() {
            return Err(SimError::DimensionMismatch {
                expected: self.dim(),
                got: other.dim(),
            });
        }
        Ok(self
            .amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// Tensor product with `self` on the low qubits and `other` above.
    pub fn tensor(&self, other: &Statevector) -> Statevector {
        let mut amplitudes = Vec::with_capacity(self.dim() * other.dim());
        for b in &other.amplitudes {
            for a in &self.amplitudes {
                amplitudes.push(a * b);
            }
        }
        Statevector {
            amplitudes,
            num_qubits: self.num_qubits + other.num_qubits,
        }
    }

    /// The projector |ψ⟩⟨ψ|.
    pub fn to_density_matrix(&self) -> DensityMatrix {
        let dim = self.dim();
        let mut data = Vec::with_capacity(dim * dim);
        for a in &self.amplitudes {
            for b in &self.amplitudes {
                data.push(a * b.conj());
            }
        }
        DensityMatrix::from_raw(self.num_qubits, data)
    }

    /// Expectation value ⟨ψ|P|ψ⟩ of a Pauli string over `qubits`.
    pub fn expectation(&self, pauli: &PauliString, qubits: &[usize]) -> SimResult<f64> {
        let mut image = self.clone();
        image.apply_pauli(pauli, qubits)?;
        Ok(self.inner(&image)?.re)
    }

    /// Probability that measuring `qubit` yields `outcome`.
    pub fn probability(&self, qubit: usize, outcome: u8) -> f64 {
        let mask = 1 << qubit;
        let want = if outcome == 0 { 0 } else { mask };
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask == want)
            .map(|(_, a)| a.norm_sqr())
            .sum()
    }

    /// Measure `qubit`, collapsing the state. Returns the outcome.
    pub fn measure<R: Rng + ?Sized>(&mut self, qubit: usize, rng: &mut R) -> SimResult<u8> {
        self.check_qubit(qubit)?;
        let p1 = self.probability(qubit, 1) / self.norm_sqr();
        let outcome = u8::from(rng.r#gen::<f64>() < p1);
        let mask = 1 << qubit;
        let keep = if outcome == 0 { 0 } else { mask };
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != keep {
                *amp = Complex64::new(0.0, 0.0);
            }
        }
        self.normalize()?;
        Ok(outcome)
    }

    /// Apply one operator of a Kraus set, chosen with the Born weights.
    ///
    /// Returns the index of the operator that was applied.
    pub fn apply_kraus_sampled<R: Rng + ?Sized>(
        &mut self,
        qubit: usize,
        kraus: &[Matrix2],
        rng: &mut R,
    ) -> SimResult<usize> {
        self.check_qubit(qubit)?;
        let total = self.norm_sqr();
        let r = rng.r#gen::<f64>() * total;
        let mut cumulative = 0.0;
        let mut fallback = None;
        for (k, op) in kraus.iter().enumerate() {
            let mut branch = self.clone();
            branch.apply_single(qubit, op);
            let weight = branch.norm_sqr();
            if weight < PROB_EPSILON {
                continue;
            }
            cumulative += weight;
            if r < cumulative {
                *self = branch;
                self.normalize()?;
                return Ok(k);
            }
            fallback = Some((k, branch));
        }
        // Rounding left r just above the cumulative sum; take the last
        // branch with weight.
        let (k, branch) = fallback
            .ok_or_else(|| SimError::InvalidState("Kraus set annihilates the state".into()))?;
        *self = branch;
        self.normalize()?;
        Ok(k)
    }

    /// Replace `qubits` with `state`, sampling the discarded part.
    ///
    /// Averaged over shots this equals Tr_S(ρ) ⊗ |φ⟩⟨φ|.
    pub fn initialize_sampled<R: Rng + ?Sized>(
        &mut self,
        qubits: &[usize],
        state: &Statevector,
        rng: &mut R,
    ) -> SimResult<()> {
        if state.num_qubits != qubits.len() {
            return Err(SimError::DimensionMismatch {
                expected: qubits.len(),
                got: state.num_qubits,
            });
        }
        let mut outcome = 0usize;
        for &q in qubits {
            if self.measure(q, rng)? == 1 {
                outcome |= 1 << q;
            }
        }
        let sel_mask: usize = qubits.iter().map(|&q| 1usize << q).sum();
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); self.dim()];
        for (i, amp) in amplitudes.iter_mut().enumerate() {
            let rest = self.amplitudes[(i & !sel_mask) | outcome];
            let local = gather_bits(i, qubits);
            *amp = rest * state.amplitudes[local];
        }
        self.amplitudes = amplitudes;
        Ok(())
    }

    /// Sample a full basis-state outcome.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let r: f64 = rng.r#gen::<f64>() * self.norm_sqr();
        let mut cumulative = 0.0;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            cumulative += amp.norm_sqr();
            if r < cumulative {
                return i;
            }
        }
        self.amplitudes.len() - 1
    }
}

/// Collect bits `positions[k]` of `index` into bit `k` of the result.
pub(crate) fn gather_bits(index: usize, positions: &[usize]) -> usize {
    positions
        .iter()
        .enumerate()
        .fold(0, |acc, (k, &p)| acc | (((index >> p) & 1) << k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(1.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(0.0, 0.0)));
    }

    #[test]
    fn test_bell_state() {
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::H, &[0]).unwrap();
        sv.apply_gate(&StandardGate::CX, &[0, 1]).unwrap();

        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(sqrt2_inv, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(sqrt2_inv, 0.0)));
    }

    #[test]
    fn test_cx_direction() {
        // |q0=0, q1=1⟩: control q1 is set, so q0 flips.
        let mut sv = Statevector::basis(2, 0b10).unwrap();
        sv.apply_gate(&StandardGate::CX, &[1, 0]).unwrap();
        assert!(approx_eq(sv.amplitudes[0b11], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let mut sv = Statevector::new(2);
        assert!(sv.apply_gate(&StandardGate::CZ, &[0]).is_err());
        assert!(sv.apply_gate(&StandardGate::X, &[5]).is_err());
    }

    #[test]
    fn test_pauli_expectation() {
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::H, &[0]).unwrap();
        let xi: PauliString = "XI".parse().unwrap();
        let zz: PauliString = "ZZ".parse().unwrap();
        assert!((sv.expectation(&xi, &[0, 1]).unwrap() - 1.0).abs() < 1e-12);
        assert!(sv.expectation(&zz, &[0, 1]).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_tensor_ordering() {
        let one = Statevector::basis(1, 1).unwrap();
        let zero = Statevector::new(1);
        let joint = one.tensor(&zero);
        // qubit 0 = |1⟩, qubit 1 = |0⟩ → index 1
        assert!(approx_eq(joint.amplitudes[1], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_measure_deterministic() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut sv = Statevector::basis(1, 1).unwrap();
        for _ in 0..20 {
            assert_eq!(sv.measure(0, &mut rng).unwrap(), 1);
        }
    }

    #[test]
    fn test_initialize_sampled_product_state() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sv = Statevector::basis(2, 0b10).unwrap();
        let plus = Statevector::from_amplitudes(vec![
            Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0),
            Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0),
        ])
        .unwrap();
        sv.initialize_sampled(&[0], &plus, &mut rng).unwrap();
        assert!((sv.probability(1, 1) - 1.0).abs() < 1e-12);
        assert!((sv.probability(0, 0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_gather_bits() {
        assert_eq!(gather_bits(0b1010, &[1, 3]), 0b11);
        assert_eq!(gather_bits(0b1010, &[0, 2]), 0b00);
        assert_eq!(gather_bits(0b0100, &[2]), 0b1);
    }
}
