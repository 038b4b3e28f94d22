//! State fidelity.

use faer::{Mat, Side};
use num_complex::Complex64;

use crate::density_matrix::DensityMatrix;
use crate::error::{SimError, SimResult};
use crate::statevector::Statevector;

/// A pure or mixed state.
#[derive(Debug, Clone, PartialEq)]
pub enum QuantumState {
    /// State vector |ψ⟩.
    Pure(Statevector),
    /// Density matrix ρ.
    Mixed(DensityMatrix),
}

impl QuantumState {
    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        match self {
            QuantumState::Pure(sv) => sv.num_qubits(),
            QuantumState::Mixed(dm) => dm.num_qubits(),
        }
    }
}

impl From<Statevector> for QuantumState {
    fn from(sv: Statevector) -> Self {
        QuantumState::Pure(sv)
    }
}

impl From<DensityMatrix> for QuantumState {
    fn from(dm: DensityMatrix) -> Self {
        QuantumState::Mixed(dm)
    }
}

/// Fidelity between two states.
///
/// Pure–pure is |⟨a|b⟩|², pure–mixed is ⟨ψ|ρ|ψ⟩, and mixed–mixed is the
/// Uhlmann fidelity (Tr √(√ρ σ √ρ))², from self-adjoint eigendecompositions
/// of the real embeddings.
pub fn state_fidelity(a: &QuantumState, b: &QuantumState) -> SimResult<f64> {
    if a.num_qubits() != b.num_qubits() {
        return Err(SimError::DimensionMismatch {
            expected: 1 << a.num_qubits(),
            got: 1 << b.num_qubits(),
        });
    }
    match (a, b) {
        (QuantumState::Pure(x), QuantumState::Pure(y)) => Ok(x.inner(y)?.norm_sqr()),
        (QuantumState::Pure(psi), QuantumState::Mixed(rho))
        | (QuantumState::Mixed(rho), QuantumState::Pure(psi)) => Ok(overlap(psi, rho)),
        (QuantumState::Mixed(rho), QuantumState::Mixed(sigma)) => uhlmann(rho, sigma),
    }
}

/// ⟨ψ|ρ|ψ⟩.
fn overlap(psi: &Statevector, rho: &DensityMatrix) -> f64 {
    let amps = psi.amplitudes();
    let dim = rho.dim();
    let mut total = Complex64::new(0.0, 0.0);
    for (i, a) in amps.iter().enumerate() {
        let row: Complex64 = (0..dim).map(|j| rho.get(i, j) * amps[j]).sum();
        total += a.conj() * row;
    }
    total.re
}

fn uhlmann(rho: &DensityMatrix, sigma: &DensityMatrix) -> SimResult<f64> {
    let dim = rho.dim();
    let sqrt_rho = hermitian_sqrt(rho.data(), dim)?;
    let m = matmul(&matmul(&sqrt_rho, sigma.data(), dim), &sqrt_rho, dim);
    let eigenvalues = real_embedding(&m, dim)
        .self_adjoint_eigenvalues(Side::Lower)
        .map_err(|e| SimError::Eigendecomposition(format!("{e:?}")))?;
    // Each eigenvalue of the embedding appears twice.
    let trace_sqrt: f64 = 0.5 * eigenvalues.iter().map(|l| l.max(0.0).sqrt()).sum::<f64>();
    Ok(trace_sqrt * trace_sqrt)
}

fn matmul(a: &[Complex64], b: &[Complex64], dim: usize) -> Vec<Complex64> {
    let mut out = vec![Complex64::new(0.0, 0.0); dim * dim];
    for i in 0..dim {
        for k in 0..dim {
            let aik = a[i * dim + k];
            if aik.norm_sqr() == 0.0 {
                continue;
            }
            for j in 0..dim {
                out[i * dim + j] += aik * b[k * dim + j];
            }
        }
    }
    out
}

/// Real symmetric embedding [[A, −B], [B, A]] of H = A + iB.
fn real_embedding(h: &[Complex64], dim: usize) -> Mat<f64> {
    Mat::from_fn(2 * dim, 2 * dim, |i, j| {
        let v = h[(i % dim) * dim + (j % dim)];
        match (i < dim, j < dim) {
            (true, true) | (false, false) => v.re,
            (true, false) => -v.im,
            (false, true) => v.im,
        }
    })
}

/// √H of a positive semidefinite Hermitian matrix.
///
/// The embedding is an algebra homomorphism, so the square root of the
/// embedding is the embedding of the square root.
fn hermitian_sqrt(h: &[Complex64], dim: usize) -> SimResult<Vec<Complex64>> {
    let evd = real_embedding(h, dim)
        .self_adjoint_eigen(Side::Lower)
        .map_err(|e| SimError::Eigendecomposition(format!("{e:?}")))?;
    let vectors = evd.U();
    let values = evd.S().column_vector();
    let roots: Vec<f64> = (0..2 * dim).map(|k| values[k].max(0.0).sqrt()).collect();

    let mut out = vec![Complex64::new(0.0, 0.0); dim * dim];
    for i in 0..dim {
        for j in 0..dim {
            let mut re = 0.0;
            let mut im = 0.0;
            for (k, root) in roots.iter().enumerate() {
                re += vectors[(i, k)] * root * vectors[(j, k)];
                im += vectors[(i + dim, k)] * root * vectors[(j, k)];
            }
            out[i * dim + j] = Complex64::new(re, im);
        }
    }
    Ok(out)
}
