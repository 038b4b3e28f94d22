//! Stabilizers, logical operators and logical states of the [[5,1,3]] code.

use std::collections::BTreeMap;

use num_complex::Complex64;

use qecsim_ir::{Pauli, PauliString};
use qecsim_sim::Statevector;

use crate::error::CodeResult;

/// Number of data qubits in the code block.
pub const NUM_CODE_QUBITS: usize = 5;

/// Number of syndrome ancillas.
pub const NUM_ANCILLAS: usize = 2;

/// Stabilizer generators, qubit 0 first.
pub const STABILIZERS: [&str; 4] = ["XZZXI", "IXZZX", "XIXZZ", "ZXIXZ"];

fn from_static(text: &str) -> PauliString {
    PauliString::new(
        text.chars()
            .map(|c| match c {
                'X' => Pauli::X,
                'Y' => Pauli::Y,
                'Z' => Pauli::Z,
                _ => Pauli::I,
            })
            .collect(),
    )
}

/// The four stabilizer generators.
pub fn stabilizers() -> Vec<PauliString> {
    STABILIZERS.iter().map(|s| from_static(s)).collect()
}

/// Logical X = XXXXX.
pub fn logical_x() -> PauliString {
    PauliString::uniform(Pauli::X, NUM_CODE_QUBITS)
}

/// Logical Y = YYYYY.
pub fn logical_y() -> PauliString {
    PauliString::uniform(Pauli::Y, NUM_CODE_QUBITS)
}

/// Logical Z = ZZZZZ.
pub fn logical_z() -> PauliString {
    PauliString::uniform(Pauli::Z, NUM_CODE_QUBITS)
}

fn code_positions() -> Vec<usize> {
    (0..NUM_CODE_QUBITS).collect()
}

/// The logical basis `[|0_L⟩, |1_L⟩]`.
///
/// |0_L⟩ is the normalized projection of |00000⟩ onto the code space and
/// |1_L⟩ = X_L|0_L⟩. With `include_ancillas` both are extended by two
/// ancillas in |00⟩ on qubits 5 and 6.
pub fn logical_states(include_ancillas: bool) -> CodeResult<[Statevector; 2]> {
    let qubits = code_positions();
    let mut zero = Statevector::new(NUM_CODE_QUBITS);
    for generator in stabilizers() {
        let mut image = zero.clone();
        image.apply_pauli(&generator, &qubits)?;
        let sum = zero
            .amplitudes()
            .iter()
            .zip(image.amplitudes())
            .map(|(a, b)| a + b)
            .collect();
        zero = Statevector::from_amplitudes(sum)?;
    }
    zero.normalize()?;

    let mut one = zero.clone();
    one.apply_pauli(&logical_x(), &qubits)?;

    if include_ancillas {
        let ancillas = Statevector::new(NUM_ANCILLAS);
        Ok([zero.tensor(&ancillas), one.tensor(&ancillas)])
    } else {
        Ok([zero, one])
    }
}

/// cos(θ/2)|0_L⟩ + e^{iφ} sin(θ/2)|1_L⟩.
pub fn get_encoded_state(theta: f64, phi: f64, include_ancillas: bool) -> CodeResult<Statevector> {
    let [zero, one] = logical_states(include_ancillas)?;
    let a = Complex64::new((theta / 2.0).cos(), 0.0);
    let b = Complex64::from_polar((theta / 2.0).sin(), phi);
    let amplitudes = zero
        .amplitudes()
        .iter()
        .zip(one.amplitudes())
        .map(|(z, o)| a * z + b * o)
        .collect();
    Ok(Statevector::from_amplitudes(amplitudes)?)
}

/// Single-qubit Pauli that undoes one syndrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Correction {
    /// Operator to apply.
    pub pauli: Pauli,
    /// Code qubit it acts on.
    pub qubit: usize,
}

/// Syndrome of a Pauli error on the code block; bit `k` is stabilizer `k`.
pub fn syndrome(error: &PauliString) -> u64 {
    stabilizers()
        .iter()
        .enumerate()
        .filter(|(_, g)| !g.commutes_with(error))
        .map(|(k, _)| 1u64 << k)
        .sum()
}

/// Lookup table from each nonzero syndrome to its single-qubit correction.
///
/// The code is perfect, so the 15 single-qubit Paulis fill the 15 nonzero
/// syndromes exactly.
pub fn syndrome_table() -> BTreeMap<u64, Correction> {
    let mut table = BTreeMap::new();
    for qubit in 0..NUM_CODE_QUBITS {
        for pauli in [Pauli::X, Pauli::Y, Pauli::Z] {
            let error = PauliString::single(pauli, qubit, NUM_CODE_QUBITS);
            table.insert(syndrome(&error), Correction { pauli, qubit });
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generators_commute() {
        let gens = stabilizers();
        for a in &gens {
            for b in &gens {
                assert!(a.commutes_with(b));
            }
            for logical in [logical_x(), logical_y(), logical_z()] {
                assert!(a.commutes_with(&logical));
            }
        }
        assert!(!logical_x().commutes_with(&logical_z()));
    }

    #[test]
    fn test_logical_states_are_stabilized() {
        let [zero, one] = logical_states(false).unwrap();
        let qubits = code_positions();
        for g in stabilizers() {
            assert!((zero.expectation(&g, &qubits).unwrap() - 1.0).abs() < 1e-12);
            assert!((one.expectation(&g, &qubits).unwrap() - 1.0).abs() < 1e-12);
        }
        assert!((zero.expectation(&logical_z(), &qubits).unwrap() - 1.0).abs() < 1e-12);
        assert!((one.expectation(&logical_z(), &qubits).unwrap() + 1.0).abs() < 1e-12);
        assert!(zero.inner(&one).unwrap().norm() < 1e-12);
    }

    #[test]
    fn test_ancillas_on_high_qubits() {
        let [zero, _] = logical_states(true).unwrap();
        assert_eq!(zero.num_qubits(), 7);
        // No amplitude with either ancilla set.
        assert!(zero.amplitudes()[32..].iter().all(|a| a.norm() < 1e-15));
    }

    #[test]
    fn test_encoded_state_superposition() {
        let plus = get_encoded_state(std::f64::consts::FRAC_PI_2, 0.0, false).unwrap();
        let qubits = code_positions();
        assert!((plus.expectation(&logical_x(), &qubits).unwrap() - 1.0).abs() < 1e-12);
        assert!(plus.expectation(&logical_z(), &qubits).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_syndrome_table_is_complete() {
        let table = syndrome_table();
        assert_eq!(table.len(), 15);
        assert!(!table.contains_key(&0));
        assert!(table.keys().all(|&s| s > 0 && s < 16));
        // X on qubit 0 anticommutes with the Z of ZXIXZ only.
        assert_eq!(
            table[&0b1000],
            Correction {
                pauli: Pauli::X,
                qubit: 0
            }
        );
    }
}
