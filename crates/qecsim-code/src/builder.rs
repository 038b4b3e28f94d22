//! Full stabilizer experiment circuits.

use serde::{Deserialize, Serialize};
use tracing::debug;

use qecsim_ir::{Circuit, PauliString};
use qecsim_sim::GateTimes;

use crate::cycle::unflagged_stabilizer_cycle;
use crate::encoder::encode_input;
use crate::error::{CodeError, CodeResult};
use crate::registers::{StabilizerRegisters, get_empty_stabilizer_circuit};
use crate::snapshot::{SnapshotType, add_snapshot};
use crate::stabilizers::{get_encoded_state, logical_z};

/// Options of a full stabilizer circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerOptions {
    /// Number of stabilizer cycles.
    pub n_cycles: usize,
    /// Reset each ancilla after it is measured.
    pub reset: bool,
    /// Correct the measured syndrome after every cycle.
    pub recovery: bool,
    /// Keep only runs with trivial syndromes.
    pub conditional: bool,
    /// Prepare the logical state with the encoder instead of initializing it.
    pub encoding: bool,
    /// What every snapshot records.
    pub snapshot_type: SnapshotType,
    /// Observable of expectation snapshots, over the code block.
    pub pauli: PauliString,
    /// Surround snapshots with barriers on all qubits.
    pub include_barriers: bool,
    /// Polar angle of the logical state.
    pub theta: f64,
    /// Azimuthal angle of the logical state.
    pub phi: f64,
    /// Gate times, used for the feedback wait.
    pub gate_times: GateTimes,
}

impl Default for StabilizerOptions {
    fn default() -> Self {
        Self {
            n_cycles: 1,
            reset: true,
            recovery: false,
            conditional: false,
            encoding: false,
            snapshot_type: SnapshotType::Dm,
            pauli: logical_z(),
            include_barriers: true,
            theta: 0.0,
            phi: 0.0,
            gate_times: GateTimes::wacqt(),
        }
    }
}

impl StabilizerOptions {
    /// Reject combinations the circuit cannot express.
    pub fn validate(&self) -> CodeResult<()> {
        if self.recovery && !self.reset {
            return Err(CodeError::InvalidOptions(
                "recovery requires the ancillas to be reset".into(),
            ));
        }
        if self.recovery && self.conditional {
            return Err(CodeError::InvalidOptions(
                "recovery and post-selection cannot be combined".into(),
            ));
        }
        Ok(())
    }
}

/// Prepare the logical state, run `n_cycles` cycles with a snapshot after
/// each, and measure the code block into `readout`.
///
/// Snapshot `i` follows cycle `i - 1`; snapshot 0 records the prepared
/// state.
pub fn get_full_stabilizer_circuit(
    options: &StabilizerOptions,
) -> CodeResult<(Circuit, StabilizerRegisters)> {
    options.validate()?;
    let (mut circuit, registers) = get_empty_stabilizer_circuit(options.n_cycles, options.recovery);
    let code = registers.code_qubits.clone();

    if options.encoding {
        circuit.u(options.theta, options.phi, 0.0, code[0])?;
        encode_input(&mut circuit, &registers)?;
    } else {
        let state = get_encoded_state(options.theta, options.phi, false)?;
        circuit.initialize(code.iter().copied(), state.into_amplitudes())?;
    }
    add_snapshot(
        &mut circuit,
        options.snapshot_type,
        0,
        &code,
        &options.pauli,
        options.include_barriers,
        None,
    )?;

    for cycle in 0..options.n_cycles {
        unflagged_stabilizer_cycle(
            &mut circuit,
            &registers,
            cycle,
            options.reset,
            options.recovery,
            &options.gate_times,
        )?;
        let post_select = if options.conditional {
            Some(registers.cycle_bits(cycle)?)
        } else {
            None
        };
        add_snapshot(
            &mut circuit,
            options.snapshot_type,
            cycle + 1,
            &code,
            &options.pauli,
            options.include_barriers,
            post_select,
        )?;
    }

    circuit.measure_many(code.iter().copied(), registers.readout.iter().copied())?;

    debug!(
        n_cycles = options.n_cycles,
        reset = options.reset,
        recovery = options.recovery,
        conditional = options.conditional,
        encoding = options.encoding,
        ops = circuit.num_ops(),
        "Built stabilizer circuit"
    );
    Ok((circuit, registers))
}
