//! Unitary encoder for the state of code qubit 0.
//!
//! The generators are brought to a form where generator `k` is the only
//! one that flips qubit `k + 1`. With those qubits in |0⟩, a Hadamard on
//! the pivot followed by the rest of the generator controlled on the pivot
//! applies (I + g)/√2, so the four steps together project onto the code
//! space. Qubit 0 carries the input; a phase gate first turns
//! α|0⟩ + β|1⟩ into α|00000⟩ + β X̃|00000⟩ for a logical X representative
//! X̃ that leaves the pivots alone.

use qecsim_ir::{Circuit, Pauli, QubitId, StandardGate};
use tracing::debug;

use crate::error::{CodeError, CodeResult};
use crate::operators::PhasedPauli;
use crate::registers::StabilizerRegisters;
use crate::stabilizers::{NUM_CODE_QUBITS, logical_x, stabilizers};

/// Generators in reduced form; generator `k` pivots on code qubit `k + 1`.
pub fn pivot_generators() -> CodeResult<Vec<PhasedPauli>> {
    let mut rows: Vec<PhasedPauli> = stabilizers().iter().map(PhasedPauli::from).collect();
    for (r, pivot) in (1..NUM_CODE_QUBITS).enumerate() {
        let found = (r..rows.len())
            .find(|&i| rows[i].flips(pivot))
            .ok_or_else(|| CodeError::Encoder(format!("no generator flips qubit {pivot}")))?;
        rows.swap(r, found);
        let pivot_row = rows[r].clone();
        for (i, row) in rows.iter_mut().enumerate() {
            if i != r && row.flips(pivot) {
                *row = row.mul(&pivot_row);
            }
        }
    }
    Ok(rows)
}

/// Phase gate diag(1, i^power).
fn phase_gate(circuit: &mut Circuit, qubit: QubitId, power: u8) -> CodeResult<()> {
    let gate = match power % 4 {
        1 => StandardGate::S,
        2 => StandardGate::Z,
        3 => StandardGate::Sdg,
        _ => return Ok(()),
    };
    circuit.gate(gate, [qubit])?;
    Ok(())
}

/// Extra power of `i` picked up when `op` maps |0⟩ to |1⟩.
fn flip_phase(op: Pauli) -> u8 {
    u8::from(op == Pauli::Y)
}

/// Controlled form of a single-qubit Pauli.
pub(crate) fn controlled(op: Pauli) -> Option<StandardGate> {
    match op {
        Pauli::I => None,
        Pauli::X => Some(StandardGate::CX),
        Pauli::Y => Some(StandardGate::CY),
        Pauli::Z => Some(StandardGate::CZ),
    }
}

/// Encode the state of code qubit 0 into the code block.
///
/// Code qubits 1 to 4 must be in |0⟩. The result is exactly
/// α|0_L⟩ + β|1_L⟩ for an input α|0⟩ + β|1⟩.
pub fn encode_input(circuit: &mut Circuit, registers: &StabilizerRegisters) -> CodeResult<()> {
    let code = &registers.code_qubits;
    let generators = pivot_generators()?;

    let mut logical = PhasedPauli::from(&logical_x());
    for (r, generator) in generators.iter().enumerate() {
        if logical.flips(r + 1) {
            logical = logical.mul(generator);
        }
    }
    if !logical.flips(0) {
        return Err(CodeError::Encoder(format!(
            "logical X representative {} does not flip qubit 0",
            logical.pauli_string()
        )));
    }
    phase_gate(circuit, code[0], logical.phase + flip_phase(logical.ops[0]))?;

    for (r, generator) in generators.iter().enumerate() {
        let pivot = r + 1;
        circuit.h(code[pivot])?;
        for (q, &op) in generator.ops.iter().enumerate() {
            if q == pivot {
                continue;
            }
            if let Some(gate) = controlled(op) {
                circuit.gate(gate, [code[pivot], code[q]])?;
            }
        }
        phase_gate(
            circuit,
            code[pivot],
            generator.phase + flip_phase(generator.ops[pivot]),
        )?;
    }

    debug!(
        logical_x = %logical.pauli_string(),
        "Appended encoder"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pivot_form() {
        let rows = pivot_generators().unwrap();
        for (r, row) in rows.iter().enumerate() {
            for pivot in 1..NUM_CODE_QUBITS {
                assert_eq!(row.flips(pivot), pivot == r + 1, "row {r} pivot {pivot}");
            }
            // Products of commuting generators stay Hermitian.
            assert_eq!(row.phase % 2, 0);
        }
    }
}
