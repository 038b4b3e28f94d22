//! Density-matrix state.
//!
//! The matrix is stored row-major over 2^n × 2^n entries with qubit `k` at
//! bit `k` of both row and column index. Branches of the ensemble method are
//! kept unnormalized: the trace of a branch is its probability weight.

use num_complex::Complex64;

use qecsim_ir::{NoiseChannel, Pauli, PauliString, StandardGate};

use crate::channels::{kraus_operators, reset_kraus};
use crate::error::{SimError, SimResult};
use crate::gates::{GateMatrix, Matrix2, Matrix4, gate_matrix};
use crate::statevector::{Statevector, gather_bits};

/// A (possibly unnormalized) density matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityMatrix {
    num_qubits: usize,
    data: Vec<Complex64>,
}

impl DensityMatrix {
    /// |0...0⟩⟨0...0|.
    pub fn new(num_qubits: usize) -> Self {
        let dim = 1usize << num_qubits;
        let mut data = vec![Complex64::new(0.0, 0.0); dim * dim];
        data[0] = Complex64::new(1.0, 0.0);
        Self { num_qubits, data }
    }

    /// The all-zero matrix, used as an accumulator.
    pub fn zeros(num_qubits: usize) -> Self {
        let dim = 1usize << num_qubits;
        Self {
            num_qubits,
            data: vec![Complex64::new(0.0, 0.0); dim * dim],
        }
    }

    /// Build from row-major data of length 4^n.
    pub fn from_data(num_qubits: usize, data: Vec<Complex64>) -> SimResult<Self> {
        let dim = 1usize << num_qubits;
        if data.len() != dim * dim {
            return Err(SimError::DimensionMismatch {
                expected: dim * dim,
                got: data.len(),
            });
        }
        Ok(Self { num_qubits, data })
    }

    pub(crate) fn from_raw(num_qubits: usize, data: Vec<Complex64>) -> Self {
        Self { num_qubits, data }
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Matrix dimension 2^n.
    pub fn dim(&self) -> usize {
        1 << self.num_qubits
    }

    /// Row-major entries.
    pub fn data(&self) -> &[Complex64] {
        &self.data
    }

    /// Entry ρ[row][col].
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[row * self.dim() + col]
    }

    /// Tr ρ.
    pub fn trace(&self) -> Complex64 {
        let dim = self.dim();
        (0..dim).map(|i| self.data[i * dim + i]).sum()
    }

    /// Tr ρ², assuming ρ is Hermitian.
    pub fn purity(&self) -> f64 {
        self.data.iter().map(Complex64::norm_sqr).sum()
    }

    /// Whether ρ = ρ† within `tol`.
    pub fn is_hermitian(&self, tol: f64) -> bool {
        let dim = self.dim();
        (0..dim).all(|i| (i..dim).all(|j| (self.get(i, j) - self.get(j, i).conj()).norm() <= tol))
    }

    /// Multiply every entry by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.data {
            *v *= factor;
        }
    }

    /// Add another matrix of the same size entrywise.
    pub fn add_assign(&mut self, other: &DensityMatrix) -> SimResult<()> {
        if self.data.len() != other.data.len() {
            return Err(SimError::DimensionMismatch {
                expected: self.dim(),
                got: other.dim(),
            });
        }
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += b;
        }
        Ok(())
    }

    /// A copy rescaled to unit trace. Zero-trace matrices are returned as is.
    pub fn normalized(&self) -> DensityMatrix {
        let tr = self.trace().re;
        let mut out = self.clone();
        if tr > 0.0 {
            out.scale(1.0 / tr);
        }
        out
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

    /// Apply a standard gate as ρ → UρU†.
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

    /// ρ → MρM† for a single-qubit operator `m`.
    pub fn apply_single(&mut self, qubit: usize, m: &Matrix2) {
        let dim = self.dim();
        let mask = 1 << qubit;
        // Left multiplication: rows i and i|mask mix within each column.
        for i in 0..dim {
            if i & mask != 0 {
                continue;
            }
            let j = i | mask;
            for col in 0..dim {
                let a = self.data[i * dim + col];
                let b = self.data[j * dim + col];
                self.data[i * dim + col] = m[0][0] * a + m[0][1] * b;
                self.data[j * dim + col] = m[1][0] * a + m[1][1] * b;
            }
        }
        // Right multiplication by M†: columns mix within each row.
        for row in 0..dim {
            let base = row * dim;
            for i in 0..dim {
                if i & mask != 0 {
                    continue;
                }
                let j = i | mask;
                let a = self.data[base + i];
                let b = self.data[base + j];
                self.data[base + i] = a * m[0][0].conj() + b * m[0][1].conj();
                self.data[base + j] = a * m[1][0].conj() + b * m[1][1].conj();
            }
        }
    }

    /// ρ → MρM† for a two-qubit operator, `q0` as the low local bit.
    pub fn apply_two(&mut self, q0: usize, q1: usize, m: &Matrix4) {
        let dim = self.dim();
        let m0 = 1 << q0;
        let m1 = 1 << q1;
        let groups: Vec<[usize; 4]> = (0..dim)
            .filter(|i| i & (m0 | m1) == 0)
            .map(|i| [i, i | m0, i | m1, i | m0 | m1])
            .collect();

        for idx in &groups {
            for col in 0..dim {
                let v = idx.map(|k| self.data[k * dim + col]);
                for (r, &k) in idx.iter().enumerate() {
                    self.data[k * dim + col] = (0..4).map(|c| m[r][c] * v[c]).sum();
                }
            }
        }
        for row in 0..dim {
            let base = row * dim;
            for idx in &groups {
                let v = idx.map(|k| self.data[base + k]);
                for (r, &k) in idx.iter().enumerate() {
                    self.data[base + k] = (0..4).map(|c| v[c] * m[r][c].conj()).sum();
                }
            }
        }
    }

    /// ρ → Σ_k K_k ρ K_k† on one qubit.
    pub fn apply_kraus(&mut self, qubit: usize, kraus: &[Matrix2]) -> SimResult<()> {
        self.check_qubit(qubit)?;
        let mut acc = DensityMatrix::zeros(self.num_qubits);
        for op in kraus {
            let mut term = self.clone();
            term.apply_single(qubit, op);
            acc.add_assign(&term)?;
        }
        *self = acc;
        Ok(())
    }

    /// Apply a noise channel to one qubit.
    pub fn apply_channel(&mut self, channel: &NoiseChannel, qubit: usize) -> SimResult<()> {
        if channel.is_identity() {
            return Ok(());
        }
        let kraus = kraus_operators(channel)?;
        self.apply_kraus(qubit, &kraus)
    }

    /// Reset a qubit to |0⟩, keeping the rest of the state.
    pub fn reset(&mut self, qubit: usize) -> SimResult<()> {
        self.apply_kraus(qubit, &reset_kraus())
    }

    /// Weight of the `outcome` branch of measuring `qubit`.
    pub fn probability(&self, qubit: usize, outcome: u8) -> f64 {
        let dim = self.dim();
        let mask = 1 << qubit;
        let want = if outcome == 0 { 0 } else { mask };
        (0..dim)
            .filter(|i| i & mask == want)
            .map(|i| self.data[i * dim + i].re)
            .sum()
    }

    /// Project onto `outcome` of `qubit` without renormalizing.
    pub fn project(&mut self, qubit: usize, outcome: u8) -> SimResult<()> {
        self.check_qubit(qubit)?;
        let dim = self.dim();
        let mask = 1 << qubit;
        let want = if outcome == 0 { 0 } else { mask };
        for row in 0..dim {
            for col in 0..dim {
                if row & mask != want || col & mask != want {
                    self.data[row * dim + col] = Complex64::new(0.0, 0.0);
                }
            }
        }
        Ok(())
    }

    /// Non-selective measurement: drop coherences across `qubit`'s basis.
    pub fn dephase(&mut self, qubit: usize) -> SimResult<()> {
        self.check_qubit(qubit)?;
        let dim = self.dim();
        let mask = 1 << qubit;
        for row in 0..dim {
            for col in 0..dim {
                if (row ^ col) & mask != 0 {
                    self.data[row * dim + col] = Complex64::new(0.0, 0.0);
                }
            }
        }
        Ok(())
    }

    /// Reduced state on `keep`; `keep[k]` becomes qubit `k` of the result.
    pub fn partial_trace(&self, keep: &[usize]) -> SimResult<DensityMatrix> {
        for &q in keep {
            self.check_qubit(q)?;
        }
        let dim = self.dim();
        let keep_mask: usize = keep.iter().map(|&q| 1usize << q).sum();
        let out_dim = 1usize << keep.len();
        let mut out = vec![Complex64::new(0.0, 0.0); out_dim * out_dim];
        for row in 0..dim {
            let r = gather_bits(row, keep);
            let traced = row & !keep_mask;
            // Columns that agree with `row` on every traced qubit.
            for c in 0..out_dim {
                let col = traced | scatter_bits(c, keep);
                out[r * out_dim + c] += self.data[row * dim + col];
            }
        }
        Ok(DensityMatrix::from_raw(keep.len(), out))
    }

    /// Tr(Pρ) for a Pauli string over `qubits`.
    pub fn expectation(&self, pauli: &PauliString, qubits: &[usize]) -> SimResult<f64> {
        if pauli.len() != qubits.len() {
            return Err(SimError::DimensionMismatch {
                expected: qubits.len(),
                got: pauli.len(),
            });
        }
        for &q in qubits {
            self.check_qubit(q)?;
        }
        let mut flip = 0usize;
        for (op, &q) in pauli.ops().iter().zip(qubits) {
            if matches!(op, Pauli::X | Pauli::Y) {
                flip |= 1 << q;
            }
        }
        let dim = self.dim();
        let mut total = Complex64::new(0.0, 0.0);
        // P|k⟩ = phase(k)|k ^ flip⟩, so Tr(Pρ) = Σ_k phase(k) ρ[k][k ^ flip].
        for k in 0..dim {
            let mut phase = Complex64::new(1.0, 0.0);
            for (op, &q) in pauli.ops().iter().zip(qubits) {
                let bit = (k >> q) & 1;
                phase *= match (op, bit) {
                    (Pauli::Z, 1) => Complex64::new(-1.0, 0.0),
                    (Pauli::Y, 0) => Complex64::new(0.0, 1.0),
                    (Pauli::Y, _) => Complex64::new(0.0, -1.0),
                    _ => Complex64::new(1.0, 0.0),
                };
            }
            total += phase * self.data[k * dim + (k ^ flip)];
        }
        Ok(total.re)
    }

    /// Replace `qubits` with the pure state `state`: Tr_S(ρ) ⊗ |ψ⟩⟨ψ|.
    pub fn initialize(&mut self, qubits: &[usize], state: &Statevector) -> SimResult<()> {
        if state.num_qubits() != qubits.len() {
            return Err(SimError::DimensionMismatch {
                expected: qubits.len(),
                got: state.num_qubits(),
            });
        }
        let rest: Vec<usize> = (0..self.num_qubits).filter(|q| !qubits.contains(q)).collect();
        let reduced = self.partial_trace(&rest)?;
        let psi = state.amplitudes();
        let dim = self.dim();
        for row in 0..dim {
            let (r_rest, r_sel) = (gather_bits(row, &rest), gather_bits(row, qubits));
            for col in 0..dim {
                let (c_rest, c_sel) = (gather_bits(col, &rest), gather_bits(col, qubits));
                self.data[row * dim + col] =
                    reduced.get(r_rest, c_rest) * psi[r_sel] * psi[c_sel].conj();
            }
        }
        Ok(())
    }
}

/// Inverse of [`gather_bits`]: spread bit `k` of `value` to `positions[k]`.
pub(crate) fn scatter_bits(value: usize, positions: &[usize]) -> usize {
    positions
        .iter()
        .enumerate()
        .fold(0, |acc, (k, &p)| acc | (((value >> k) & 1) << p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn test_new_is_pure_ground_state() {
        let rho = DensityMatrix::new(2);
        assert!(close(rho.trace().re, 1.0));
        assert!(close(rho.purity(), 1.0));
        assert!(close(rho.get(0, 0).re, 1.0));
    }

    #[test]
    fn test_gate_matches_statevector() {
        let mut sv = Statevector::new(3);
        let mut rho = DensityMatrix::new(3);
        let ops: [(StandardGate, Vec<usize>); 5] = [
            (StandardGate::H, vec![0]),
            (StandardGate::CX, vec![0, 2]),
            (StandardGate::Ry(0.7), vec![1]),
            (StandardGate::CZ, vec![1, 2]),
            (StandardGate::Sdg, vec![2]),
        ];
        for (gate, qubits) in &ops {
            sv.apply_gate(gate, qubits).unwrap();
            rho.apply_gate(gate, qubits).unwrap();
        }
        let expected = sv.to_density_matrix();
        for (a, b) in rho.data().iter().zip(expected.data()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn test_dephase_kills_coherence() {
        let mut rho = DensityMatrix::new(1);
        rho.apply_gate(&StandardGate::H, &[0]).unwrap();
        rho.dephase(0).unwrap();
        assert!(rho.get(0, 1).norm() < 1e-12);
        assert!(close(rho.get(0, 0).re, 0.5));
    }

    #[test]
    fn test_project_keeps_branch_weight() {
        let mut rho = DensityMatrix::new(2);
        rho.apply_gate(&StandardGate::H, &[0]).unwrap();
        rho.apply_gate(&StandardGate::CX, &[0, 1]).unwrap();
        assert!(close(rho.probability(1, 1), 0.5));
        rho.project(1, 1).unwrap();
        assert!(close(rho.trace().re, 0.5));
        assert!(close(rho.get(3, 3).re, 0.5));
    }

    #[test]
    fn test_partial_trace_of_bell_pair() {
        let mut rho = DensityMatrix::new(2);
        rho.apply_gate(&StandardGate::H, &[0]).unwrap();
        rho.apply_gate(&StandardGate::CX, &[0, 1]).unwrap();
        let reduced = rho.partial_trace(&[1]).unwrap();
        assert_eq!(reduced.num_qubits(), 1);
        assert!(close(reduced.get(0, 0).re, 0.5));
        assert!(close(reduced.get(1, 1).re, 0.5));
        assert!(reduced.get(0, 1).norm() < 1e-12);
    }

    #[test]
    fn test_partial_trace_reorders_qubits() {
        // q0 = |1⟩, q1 = |0⟩; keep [1, 0] puts q1 at bit 0.
        let rho = Statevector::basis(2, 0b01).unwrap().to_density_matrix();
        let swapped = rho.partial_trace(&[1, 0]).unwrap();
        assert!(close(swapped.get(0b10, 0b10).re, 1.0));
    }

    #[test]
    fn test_expectation_matches_statevector() {
        let mut sv = Statevector::new(3);
        sv.apply_gate(&StandardGate::U(0.3, 1.1, -0.4), &[0]).unwrap();
        sv.apply_gate(&StandardGate::H, &[1]).unwrap();
        sv.apply_gate(&StandardGate::CY, &[1, 2]).unwrap();
        let rho = sv.to_density_matrix();
        for text in ["XYZ", "YYI", "ZIZ", "IXY"] {
            let p: PauliString = text.parse().unwrap();
            let a = sv.expectation(&p, &[0, 1, 2]).unwrap();
            let b = rho.expectation(&p, &[0, 1, 2]).unwrap();
            assert!(close(a, b), "{text}: {a} vs {b}");
        }
    }

    #[test]
    fn test_reset_returns_ground_state() {
        let mut rho = DensityMatrix::new(2);
        rho.apply_gate(&StandardGate::H, &[0]).unwrap();
        rho.apply_gate(&StandardGate::CX, &[0, 1]).unwrap();
        rho.reset(1).unwrap();
        assert!(close(rho.trace().re, 1.0));
        assert!(close(rho.probability(1, 0), 1.0));
        // q0 is left maximally mixed
        assert!(close(rho.probability(0, 1), 0.5));
    }

    #[test]
    fn test_initialize_traces_out_old_state() {
        let mut rho = DensityMatrix::new(2);
        rho.apply_gate(&StandardGate::H, &[0]).unwrap();
        rho.apply_gate(&StandardGate::CX, &[0, 1]).unwrap();
        let one = Statevector::basis(1, 1).unwrap();
        rho.initialize(&[0], &one).unwrap();
        assert!(close(rho.trace().re, 1.0));
        assert!(close(rho.probability(0, 1), 1.0));
        assert!(close(rho.probability(1, 1), 0.5));
        assert!(rho.is_hermitian(1e-12));
    }

    #[test]
    fn test_scatter_inverts_gather() {
        let positions = [4, 1, 6];
        for v in 0..8 {
            assert_eq!(gather_bits(scatter_bits(v, &positions), &positions), v);
        }
    }
}
