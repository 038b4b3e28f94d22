//! Decay of an idle qubit against an idle code block.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use qecsim_code::{
    SnapshotType, code_space_probability, get_encoded_state, idle_encoded_circuit,
    idle_single_qubit_circuit, project_dm_to_logical_subspace_v1, single_qubit_state,
};
use qecsim_ir::PauliString;
use qecsim_sim::{DensityMatrixSimulator, ExecutionResult, QuantumState, state_fidelity};

use crate::error::{AnalysisError, AnalysisResult};
use crate::fidelity::snapshot_value;

const KINDS: [SnapshotType; 2] = [SnapshotType::Exp, SnapshotType::Dm];

/// Curves of one idle state over a time grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdleCurves {
    /// Sample times in ns.
    pub times: Vec<f64>,
    /// Fidelity to the state at time zero.
    pub fidelity: Vec<f64>,
    /// Expectation value of the observable.
    pub expectation: Vec<f64>,
    /// Fidelity of the projected logical qubit, for the code block.
    pub logical_fidelity: Option<Vec<f64>>,
    /// Probability of being in the code space, for the code block.
    pub code_space_probability: Option<Vec<f64>>,
}

/// `points` evenly spaced times from `start` to `stop` inclusive.
pub fn time_grid(start: f64, stop: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (points - 1) as f64;
            (0..points).map(|i| start + step * i as f64).collect()
        }
    }
}

fn run_idle(circuit: &qecsim_ir::Circuit) -> AnalysisResult<ExecutionResult> {
    Ok(DensityMatrixSimulator::new().run(circuit, 0, None)?)
}

fn base_curves(
    result: &ExecutionResult,
    times: &[f64],
    start: &QuantumState,
) -> AnalysisResult<IdleCurves> {
    let mut curves = IdleCurves {
        times: times.to_vec(),
        fidelity: Vec::with_capacity(times.len()),
        expectation: Vec::with_capacity(times.len()),
        logical_fidelity: None,
        code_space_probability: None,
    };
    for index in 0..times.len() {
        curves
            .fidelity
            .push(snapshot_value(result, SnapshotType::Dm, index, start)?);
        curves
            .expectation
            .push(snapshot_value(result, SnapshotType::Exp, index, start)?);
    }
    Ok(curves)
}

/// A bare qubit prepared in `u(θ, φ, 0)|0⟩` relaxing over `times`.
#[instrument(skip(times, pauli), fields(points = times.len()))]
pub fn idle_single_qubit_curves(
    times: &[f64],
    t1: f64,
    t2: f64,
    theta: f64,
    phi: f64,
    pauli: &PauliString,
) -> AnalysisResult<IdleCurves> {
    let circuit = idle_single_qubit_circuit(times, &KINDS, t1, t2, theta, phi, pauli)?;
    let result = run_idle(&circuit)?;
    let start = QuantumState::Pure(single_qubit_state(theta, phi)?);
    base_curves(&result, times, &start)
}

/// The encoded state relaxing over `times` without stabilizer cycles.
///
/// Besides the physical fidelity, each sample is projected onto the logical
/// qubit, so `code_space_probability · logical_fidelity` equals `fidelity`.
#[instrument(skip(times, pauli), fields(points = times.len()))]
pub fn idle_encoded_curves(
    times: &[f64],
    t1: f64,
    t2: f64,
    theta: f64,
    phi: f64,
    pauli: &PauliString,
) -> AnalysisResult<IdleCurves> {
    let circuit = idle_encoded_circuit(times, &KINDS, t1, t2, theta, phi, pauli)?;
    let result = run_idle(&circuit)?;
    let start = QuantumState::Pure(get_encoded_state(theta, phi, false)?);
    let mut curves = base_curves(&result, times, &start)?;

    let logical_start = QuantumState::Pure(single_qubit_state(theta, phi)?);
    let mut logical = Vec::with_capacity(times.len());
    let mut probability = Vec::with_capacity(times.len());
    for index in 0..times.len() {
        let label = SnapshotType::Dm.label(index);
        let rho = result
            .snapshot(&label)
            .and_then(|record| record.density_matrix())
            .ok_or(AnalysisError::MissingSnapshot(label))?;
        probability.push(code_space_probability(rho)?);
        let projected = project_dm_to_logical_subspace_v1(rho)?;
        logical.push(state_fidelity(
            &logical_start,
            &QuantumState::Mixed(projected),
        )?);
    }
    curves.logical_fidelity = Some(logical);
    curves.code_space_probability = Some(probability);
    Ok(curves)
}
