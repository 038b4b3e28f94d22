//! Syndrome extraction and recovery.

use qecsim_ir::{Circuit, Pauli, StandardGate};
use qecsim_sim::GateTimes;

use crate::encoder::controlled;
use crate::error::CodeResult;
use crate::registers::StabilizerRegisters;
use crate::stabilizers::{stabilizers, syndrome_table};

/// Append one round of stabilizer measurements.
///
/// Stabilizer `k` is measured on ancilla `k mod 2` into syndrome bit `k` of
/// `cycle`. Without `reset` the ancilla keeps its outcome into the next
/// measurement. With `recovery` the code block waits one feedback time and
/// the correction for the measured syndrome is applied.
pub fn unflagged_stabilizer_cycle(
    circuit: &mut Circuit,
    registers: &StabilizerRegisters,
    cycle: usize,
    reset: bool,
    recovery: bool,
    gate_times: &GateTimes,
) -> CodeResult<()> {
    let syndrome = registers.cycle_bits(cycle)?.to_vec();
    for (k, generator) in stabilizers().iter().enumerate() {
        let ancilla = registers.ancillas[k % registers.ancillas.len()];
        circuit.h(ancilla)?;
        for (&op, &qubit) in generator.ops().iter().zip(&registers.code_qubits) {
            if let Some(gate) = controlled(op) {
                circuit.gate(gate, [ancilla, qubit])?;
            }
        }
        circuit.h(ancilla)?;
        circuit.measure(ancilla, syndrome[k])?;
        if reset {
            circuit.reset(ancilla)?;
        }
    }

    if recovery {
        circuit.barrier_all()?;
        circuit.delay(registers.all_qubits(), gate_times.feedback())?;
        add_recovery(circuit, registers, cycle)?;
    }
    Ok(())
}

/// Apply the tabulated correction for each nonzero syndrome of `cycle`.
pub fn add_recovery(
    circuit: &mut Circuit,
    registers: &StabilizerRegisters,
    cycle: usize,
) -> CodeResult<()> {
    let register = registers.cycle_register(cycle)?.to_string();
    for (value, correction) in syndrome_table() {
        let gate = match correction.pauli {
            Pauli::X => StandardGate::X,
            Pauli::Y => StandardGate::Y,
            Pauli::Z => StandardGate::Z,
            Pauli::I => continue,
        };
        circuit.gate_if(
            gate,
            [registers.code_qubits[correction.qubit]],
            &register,
            value,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::get_empty_stabilizer_circuit;

    #[test]
    fn test_cycle_gate_count() {
        let (mut circuit, regs) = get_empty_stabilizer_circuit(1, false);
        unflagged_stabilizer_cycle(&mut circuit, &regs, 0, true, false, &GateTimes::wacqt())
            .unwrap();
        // 4 × (2 H + 4 controlled Paulis + measure + reset)
        assert_eq!(circuit.num_ops(), 32);
    }

    #[test]
    fn test_recovery_needs_cycle_register() {
        let (mut circuit, regs) = get_empty_stabilizer_circuit(1, false);
        assert!(add_recovery(&mut circuit, &regs, 0).is_err());

        let (mut circuit, regs) = get_empty_stabilizer_circuit(1, true);
        add_recovery(&mut circuit, &regs, 0).unwrap();
        assert_eq!(circuit.num_ops(), 15);
    }
}
