//! Projection of physical density matrices onto the logical qubit.
//!
//! All projections take the reduced state of the code block (5 qubits) or
//! of the code block with its ancillas (7 qubits) and normalize by the
//! code-space probability P_L = Tr(ρ I_L), where I_L is the projector onto
//! span{|0_L⟩, |1_L⟩}.

use num_complex::Complex64;

use qecsim_ir::PauliString;
use qecsim_sim::gates::{Matrix2, identity2, pauli_x, pauli_y, pauli_z};
use qecsim_sim::{DensityMatrix, SimError, Statevector};

use crate::error::{CodeError, CodeResult};
use crate::stabilizers::{NUM_ANCILLAS, NUM_CODE_QUBITS, logical_states, logical_x, logical_y, logical_z};

/// P_L below this is treated as zero.
const MIN_CODE_SPACE_PROBABILITY: f64 = 1e-12;

/// Logical basis matching the size of `rho`.
fn logical_basis(rho: &DensityMatrix) -> CodeResult<[Statevector; 2]> {
    match rho.num_qubits() {
        NUM_CODE_QUBITS => logical_states(false),
        n if n == NUM_CODE_QUBITS + NUM_ANCILLAS => logical_states(true),
        n => Err(CodeError::UnsupportedState(n)),
    }
}

/// ⟨bra|ρ|ket⟩.
fn sandwich(rho: &DensityMatrix, bra: &Statevector, ket: &Statevector) -> CodeResult<Complex64> {
    let dim = rho.dim();
    if bra.dim() != dim || ket.dim() != dim {
        return Err(SimError::DimensionMismatch {
            expected: dim,
            got: bra.dim().max(ket.dim()),
        }
        .into());
    }
    let (a, b) = (bra.amplitudes(), ket.amplitudes());
    let mut total = Complex64::new(0.0, 0.0);
    for (row, ar) in a.iter().enumerate() {
        if ar.norm_sqr() == 0.0 {
            continue;
        }
        let mut inner = Complex64::new(0.0, 0.0);
        for (col, bc) in b.iter().enumerate() {
            inner += rho.get(row, col) * bc;
        }
        total += ar.conj() * inner;
    }
    Ok(total)
}

/// Logical Paulis `[I, X_L, Y_L, Z_L]` extended to the size of `basis`.
fn logical_paulis(num_qubits: usize) -> [Option<PauliString>; 4] {
    let pad = |p: PauliString| {
        let mut ops = p.ops().to_vec();
        ops.resize(num_qubits, qecsim_ir::Pauli::I);
        PauliString::new(ops)
    };
    [
        None,
        Some(pad(logical_x())),
        Some(pad(logical_y())),
        Some(pad(logical_z())),
    ]
}

/// Images `P|j_L⟩` of the logical basis under each logical Pauli.
fn pauli_images(basis: &[Statevector; 2]) -> CodeResult<Vec<[Statevector; 2]>> {
    let num_qubits = basis[0].num_qubits();
    let qubits: Vec<usize> = (0..num_qubits).collect();
    logical_paulis(num_qubits)
        .into_iter()
        .map(|pauli| {
            let mut images = basis.clone();
            if let Some(p) = pauli {
                for image in &mut images {
                    image.apply_pauli(&p, &qubits)?;
                }
            }
            Ok(images)
        })
        .collect()
}

/// Logical basis, its Pauli images and the weights Tr(ρ P I_L).
struct Decomposition {
    basis: [Statevector; 2],
    images: Vec<[Statevector; 2]>,
    weights: [f64; 4],
    p_l: f64,
}

fn decompose(rho: &DensityMatrix) -> CodeResult<Decomposition> {
    let basis = logical_basis(rho)?;
    let images = pauli_images(&basis)?;
    let mut weights = [0.0; 4];
    for (weight, image) in weights.iter_mut().zip(&images) {
        // Tr(ρ P I_L) = Σ_j ⟨j_L|ρ P|j_L⟩
        let mut total = Complex64::new(0.0, 0.0);
        for (state, mapped) in basis.iter().zip(image) {
            total += sandwich(rho, state, mapped)?;
        }
        *weight = total.re;
    }
    let p_l = weights[0];
    if p_l < MIN_CODE_SPACE_PROBABILITY {
        return Err(CodeError::OutsideCodeSpace(p_l));
    }
    Ok(Decomposition {
        basis,
        images,
        weights,
        p_l,
    })
}

/// Probability P_L = Σ_i ⟨i_L|ρ|i_L⟩ that `rho` lies in the code space.
pub fn code_space_probability(rho: &DensityMatrix) -> CodeResult<f64> {
    let basis = logical_basis(rho)?;
    let mut total = 0.0;
    for state in &basis {
        total += sandwich(rho, state, state)?.re;
    }
    Ok(total)
}

/// Logical 2×2 density matrix ρ_L[i][j] = ⟨i_L|ρ|j_L⟩ / P_L.
pub fn project_dm_to_logical_subspace_v1(rho: &DensityMatrix) -> CodeResult<DensityMatrix> {
    let basis = logical_basis(rho)?;
    let p_l = code_space_probability(rho)?;
    if p_l < MIN_CODE_SPACE_PROBABILITY {
        return Err(CodeError::OutsideCodeSpace(p_l));
    }
    let mut data = Vec::with_capacity(4);
    for bra in &basis {
        for ket in &basis {
            data.push(sandwich(rho, bra, ket)? / p_l);
        }
    }
    Ok(DensityMatrix::from_data(1, data)?)
}

/// Code-space projection Σ_P Tr(ρ M_P) M_P / (2 P_L) at full size, with
/// M_P = P I_L for P in {I, X_L, Y_L, Z_L}.
pub fn project_dm_to_logical_subspace_v2(rho: &DensityMatrix) -> CodeResult<DensityMatrix> {
    let d = decompose(rho)?;
    let dim = rho.dim();
    let mut data = vec![Complex64::new(0.0, 0.0); dim * dim];
    for (weight, image) in d.weights.iter().zip(&d.images) {
        let scale = weight / (2.0 * d.p_l);
        // M_P = Σ_j P|j_L⟩⟨j_L|
        for (state, mapped) in d.basis.iter().zip(image) {
            for (row, m) in mapped.amplitudes().iter().enumerate() {
                if m.norm_sqr() == 0.0 {
                    continue;
                }
                for (col, s) in state.amplitudes().iter().enumerate() {
                    data[row * dim + col] += m * s.conj() * scale;
                }
            }
        }
    }
    Ok(DensityMatrix::from_data(rho.num_qubits(), data)?)
}

/// Logical 2×2 density matrix Σ_P Tr(ρ M_P) σ_P / (2 P_L) from the
/// logical Pauli decomposition.
pub fn project_dm_to_logical_subspace_v3(rho: &DensityMatrix) -> CodeResult<DensityMatrix> {
    let d = decompose(rho)?;
    let sigmas: [Matrix2; 4] = [identity2(), pauli_x(), pauli_y(), pauli_z()];
    let mut data = vec![Complex64::new(0.0, 0.0); 4];
    for (weight, sigma) in d.weights.iter().zip(&sigmas) {
        for r in 0..2 {
            for c in 0..2 {
                data[r * 2 + c] += sigma[r][c] * (weight / (2.0 * d.p_l));
            }
        }
    }
    Ok(DensityMatrix::from_data(1, data)?)
}
