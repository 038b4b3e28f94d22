//! Register layout of a stabilizer experiment.

use qecsim_ir::{Circuit, ClbitId, QubitId};

use crate::error::{CodeError, CodeResult};
use crate::stabilizers::{NUM_ANCILLAS, NUM_CODE_QUBITS, STABILIZERS};

/// Quantum register holding the code block.
pub const CODE_REGISTER: &str = "code_qubit";
/// Quantum register holding the syndrome ancillas.
pub const ANCILLA_REGISTER: &str = "ancilla_qubit";
/// Shared syndrome register used when no cycle is read back.
pub const SYNDROME_REGISTER: &str = "syndrome_bit";
/// Classical register for the final code-qubit measurement.
pub const READOUT_REGISTER: &str = "readout";

/// Syndrome bits per cycle.
pub const SYNDROME_BITS: usize = STABILIZERS.len();

/// Name of the syndrome register of `cycle` when cycles are kept apart.
pub fn syndrome_register_name(cycle: usize) -> String {
    format!("syndrome_cycle_{cycle}")
}

/// Classical registers holding the syndromes of `n_cycles` cycles.
///
/// Recovery conditions a gate on one cycle's syndrome, so it needs one
/// register per cycle. Otherwise all syndromes share `syndrome_bit`.
pub fn get_classical_register(n_cycles: usize, recovery: bool) -> Vec<(String, u32)> {
    let bits = SYNDROME_BITS as u32;
    if recovery {
        (0..n_cycles)
            .map(|cycle| (syndrome_register_name(cycle), bits))
            .collect()
    } else if n_cycles > 0 {
        vec![(SYNDROME_REGISTER.to_string(), bits * n_cycles as u32)]
    } else {
        Vec::new()
    }
}

/// Qubits and classical bits of a stabilizer circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilizerRegisters {
    /// Code block, five qubits.
    pub code_qubits: Vec<QubitId>,
    /// Syndrome ancillas, used alternately.
    pub ancillas: Vec<QubitId>,
    /// Syndrome bits of each cycle, bit `k` for stabilizer `k`.
    pub syndrome: Vec<Vec<ClbitId>>,
    /// Register name per cycle, present only with one register per cycle.
    pub cycle_registers: Option<Vec<String>>,
    /// Final measurement of the code block.
    pub readout: Vec<ClbitId>,
}

impl StabilizerRegisters {
    /// Number of cycles with syndrome storage.
    pub fn n_cycles(&self) -> usize {
        self.syndrome.len()
    }

    /// Syndrome bits of `cycle`.
    pub fn cycle_bits(&self, cycle: usize) -> CodeResult<&[ClbitId]> {
        self.syndrome
            .get(cycle)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                CodeError::InvalidOptions(format!(
                    "cycle {cycle} has no syndrome register ({} cycles allocated)",
                    self.syndrome.len()
                ))
            })
    }

    /// Register holding exactly the syndrome of `cycle`.
    pub fn cycle_register(&self, cycle: usize) -> CodeResult<&str> {
        let names = self.cycle_registers.as_ref().ok_or_else(|| {
            CodeError::InvalidOptions("syndromes share one register; recovery needs one per cycle".into())
        })?;
        names.get(cycle).map(String::as_str).ok_or_else(|| {
            CodeError::InvalidOptions(format!("cycle {cycle} has no syndrome register"))
        })
    }

    /// Every qubit, code block first.
    pub fn all_qubits(&self) -> Vec<QubitId> {
        self.code_qubits
            .iter()
            .chain(&self.ancillas)
            .copied()
            .collect()
    }
}

/// Allocate the registers of an `n_cycles` experiment on an empty circuit.
pub fn get_empty_stabilizer_circuit(n_cycles: usize, recovery: bool) -> (Circuit, StabilizerRegisters) {
    let mut circuit = Circuit::new("stabilizer_513");
    let code_qubits = circuit.add_qreg(CODE_REGISTER, NUM_CODE_QUBITS as u32);
    let ancillas = circuit.add_qreg(ANCILLA_REGISTER, NUM_ANCILLAS as u32);

    let mut syndrome = Vec::with_capacity(n_cycles);
    let mut names = Vec::new();
    for (name, size) in get_classical_register(n_cycles, recovery) {
        let bits = circuit.add_creg(name.clone(), size);
        syndrome.extend(bits.chunks(SYNDROME_BITS).map(<[ClbitId]>::to_vec));
        names.push(name);
    }
    let readout = circuit.add_creg(READOUT_REGISTER, NUM_CODE_QUBITS as u32);

    let registers = StabilizerRegisters {
        code_qubits,
        ancillas,
        syndrome,
        cycle_registers: recovery.then_some(names),
        readout,
    };
    (circuit, registers)
}
