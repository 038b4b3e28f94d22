//! Reference circuits that only decay.
//!
//! A state is prepared at time zero and relaxes between consecutive
//! snapshot times, with no gates at all. They give the decay an unprotected
//! qubit or an unprotected code block would see over the same schedule as
//! a stabilizer experiment.

use num_complex::Complex64;

use qecsim_ir::{Circuit, NoiseChannel, NoiseOrigin, PauliString, QubitId};
use qecsim_sim::Statevector;

use crate::error::{CodeError, CodeResult};
use crate::snapshot::SnapshotType;
use crate::stabilizers::get_encoded_state;

/// cos(θ/2)|0⟩ + e^{iφ} sin(θ/2)|1⟩.
pub fn single_qubit_state(theta: f64, phi: f64) -> CodeResult<Statevector> {
    Ok(Statevector::from_amplitudes(vec![
        Complex64::new((theta / 2.0).cos(), 0.0),
        Complex64::from_polar((theta / 2.0).sin(), phi),
    ])?)
}

fn idle_circuit(
    name: &str,
    state: Statevector,
    times: &[f64],
    kinds: &[SnapshotType],
    t1: f64,
    t2: f64,
    pauli: &PauliString,
) -> CodeResult<Circuit> {
    let num_qubits = state.num_qubits() as u32;
    let mut circuit = Circuit::with_size(name, num_qubits, 0);
    let qubits: Vec<QubitId> = circuit.qubit_ids();
    circuit.initialize(qubits.iter().copied(), state.into_amplitudes())?;

    let mut now = 0.0;
    for (index, &time) in times.iter().enumerate() {
        let wait = time - now;
        if wait < 0.0 || !time.is_finite() {
            return Err(CodeError::InvalidTimes(format!(
                "snapshot {index} at {time} ns comes before {now} ns"
            )));
        }
        if wait > 0.0 {
            let channel = NoiseChannel::thermal_relaxation(t1, t2, wait)?;
            for &q in &qubits {
                circuit.noise(channel.clone(), q, NoiseOrigin::Idle)?;
            }
        }
        for &kind in kinds {
            match kind {
                SnapshotType::Dm => {
                    circuit.snapshot_density_matrix(kind.label(index), qubits.iter().copied())?
                }
                SnapshotType::Exp => circuit.snapshot_expectation(
                    kind.label(index),
                    pauli.clone(),
                    qubits.iter().copied(),
                )?,
            };
        }
        now = time;
    }
    Ok(circuit)
}

/// A single qubit relaxing between `times`, with one snapshot per kind and
/// time labelled `{kind}_{index}`.
pub fn idle_single_qubit_circuit(
    times: &[f64],
    kinds: &[SnapshotType],
    t1: f64,
    t2: f64,
    theta: f64,
    phi: f64,
    pauli: &PauliString,
) -> CodeResult<Circuit> {
    let state = single_qubit_state(theta, phi)?;
    idle_circuit("idle_single_qubit", state, times, kinds, t1, t2, pauli)
}

/// The encoded state relaxing on all five code qubits between `times`.
pub fn idle_encoded_circuit(
    times: &[f64],
    kinds: &[SnapshotType],
    t1: f64,
    t2: f64,
    theta: f64,
    phi: f64,
    pauli: &PauliString,
) -> CodeResult<Circuit> {
    let state = get_encoded_state(theta, phi, false)?;
    idle_circuit("idle_encoded_513", state, times, kinds, t1, t2, pauli)
}
