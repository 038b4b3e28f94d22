//! Fidelity experiments.
//!
//! Each experiment builds a circuit, simulates it and reads the labelled
//! snapshots back as one value per snapshot: a fidelity for density-matrix
//! snapshots, or the recorded value for expectation snapshots.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use qecsim_code::{
    SnapshotType, StabilizerOptions, add_snapshot, encode_input, get_empty_stabilizer_circuit,
    get_encoded_state, get_full_stabilizer_circuit, idle_encoded_circuit,
    idle_single_qubit_circuit, logical_z, single_qubit_state, unflagged_stabilizer_cycle,
};
use qecsim_ir::{Circuit, NoiseChannel, NoiseOrigin, Pauli, PauliString};
use qecsim_sim::{
    CircuitTimes, DensityMatrixSimulator, ExecutionResult, GateTimes, NoiseModel, QuantumState,
    SimulationMethod, add_idle_noise, circuit_time, state_fidelity,
};

use crate::error::{AnalysisError, AnalysisResult};

// =============================================================================
// Configuration
// =============================================================================

/// How syndrome information is used in [`fidelity_from_scratch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataProcess {
    /// Conditional recovery after every cycle.
    #[default]
    Recovery,
    /// Keep only runs with trivial syndromes.
    PostSelect,
    /// Relaxation only, over the schedule of the stabilizer circuit.
    EmptyCircuit,
    /// Measure syndromes and ignore them.
    None,
    /// Offline processing of measured syndromes; not implemented.
    PostProcess,
}

impl DataProcess {
    /// `(recovery, conditional)` flags of the stabilizer circuit.
    fn flags(self) -> AnalysisResult<(bool, bool)> {
        match self {
            DataProcess::Recovery => Ok((true, false)),
            DataProcess::PostSelect => Ok((false, true)),
            DataProcess::EmptyCircuit | DataProcess::None => Ok((false, false)),
            DataProcess::PostProcess => Err(AnalysisError::Unsupported(
                "post_process data processing".into(),
            )),
        }
    }
}

impl fmt::Display for DataProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataProcess::Recovery => "recovery",
            DataProcess::PostSelect => "post_select",
            DataProcess::EmptyCircuit => "empty_circuit",
            DataProcess::None => "none",
            DataProcess::PostProcess => "post_process",
        };
        f.write_str(name)
    }
}

impl FromStr for DataProcess {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recovery" => Ok(DataProcess::Recovery),
            "post_select" => Ok(DataProcess::PostSelect),
            "empty_circuit" => Ok(DataProcess::EmptyCircuit),
            "none" => Ok(DataProcess::None),
            "post_process" => Ok(DataProcess::PostProcess),
            other => Err(AnalysisError::InvalidParameter(format!(
                "unknown data process '{other}'"
            ))),
        }
    }
}

/// Settings of [`fidelity_from_scratch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FidelityConfig {
    /// Number of stabilizer cycles.
    pub n_cycles: usize,
    /// Shots used to sample readout counts.
    pub shots: u32,
    /// Gate times; invalid tables fall back to the standard times.
    pub gate_times: GateTimes,
    /// Relaxation time in ns.
    pub t1: f64,
    /// Dephasing time in ns.
    pub t2: f64,
    /// Reset ancillas after measurement.
    pub reset: bool,
    /// Use of the measured syndromes.
    pub data_process: DataProcess,
    /// Fill idle gaps with relaxation.
    pub idle_noise: bool,
    /// What the snapshots record.
    pub snapshot_type: SnapshotType,
    /// Prepare the logical state with the encoder.
    pub encoding: bool,
    /// Polar angle of the logical state.
    pub theta: f64,
    /// Azimuthal angle of the logical state.
    pub phi: f64,
    /// Observable of expectation snapshots.
    pub pauli: PauliString,
    /// Simulation method name; unknown names fall back to `density_matrix`.
    pub simulator_type: String,
    /// Seed for sampled outcomes.
    pub seed: Option<u64>,
}

impl Default for FidelityConfig {
    fn default() -> Self {
        Self {
            n_cycles: 8,
            shots: 2048,
            gate_times: GateTimes::wacqt(),
            t1: 40e3,
            t2: 60e3,
            reset: true,
            data_process: DataProcess::Recovery,
            idle_noise: true,
            snapshot_type: SnapshotType::Dm,
            encoding: true,
            theta: 0.0,
            phi: 0.0,
            pauli: logical_z(),
            simulator_type: "density_matrix".into(),
            seed: None,
        }
    }
}

impl FidelityConfig {
    fn simulator(&self) -> DensityMatrixSimulator {
        simulator(
            SimulationMethod::from_str_or_default(&self.simulator_type),
            self.seed,
        )
    }
}

/// Values of one experiment, one per snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FidelityRun {
    /// Fidelity or expectation value of snapshots `0..=n_cycles`.
    pub fidelities: Vec<f64>,
    /// Snapshot schedule of the experiment.
    pub times: Option<CircuitTimes>,
    /// Expected surviving shots at each snapshot, under post-selection.
    pub select_counts: Option<Vec<f64>>,
}

// =============================================================================
// Helpers
// =============================================================================

fn simulator(method: SimulationMethod, seed: Option<u64>) -> DensityMatrixSimulator {
    let sim = DensityMatrixSimulator::new().with_method(method);
    match seed {
        Some(seed) => sim.with_seed(seed),
        None => sim,
    }
}

/// Value of snapshot `index` of `kind`: fidelity to `reference` or the
/// expectation value.
pub(crate) fn snapshot_value(
    result: &ExecutionResult,
    kind: SnapshotType,
    index: usize,
    reference: &QuantumState,
) -> AnalysisResult<f64> {
    let label = kind.label(index);
    let record = result
        .snapshot(&label)
        .ok_or_else(|| AnalysisError::MissingSnapshot(label.clone()))?;
    match kind {
        SnapshotType::Dm => {
            let dm = record
                .density_matrix()
                .ok_or_else(|| AnalysisError::MissingSnapshot(label.clone()))?;
            Ok(state_fidelity(reference, &QuantumState::Mixed(dm.clone()))?)
        }
        SnapshotType::Exp => record
            .expectation()
            .ok_or(AnalysisError::MissingSnapshot(label)),
    }
}

fn snapshot_series(
    result: &ExecutionResult,
    kind: SnapshotType,
    count: usize,
    reference: &QuantumState,
) -> AnalysisResult<Vec<f64>> {
    (0..count)
        .map(|index| snapshot_value(result, kind, index, reference))
        .collect()
}

fn check_lifetimes(t1: f64, t2: f64) -> AnalysisResult<()> {
    if !(t1 > 0.0 && t2 > 0.0 && t2 <= 2.0 * t1) {
        return Err(AnalysisError::InvalidParameter(format!(
            "T1 = {t1} ns and T2 = {t2} ns must be positive with T2 <= 2 T1"
        )));
    }
    Ok(())
}

fn relax_all(circuit: &mut Circuit, t1: f64, t2: f64, time: f64) -> AnalysisResult<()> {
    let channel = NoiseChannel::thermal_relaxation(t1, t2, time)?;
    for qubit in circuit.qubit_ids() {
        circuit.noise(channel.clone(), qubit, NoiseOrigin::Idle)?;
    }
    Ok(())
}

// =============================================================================
// Experiments
// =============================================================================

/// Run the noisy stabilizer experiment described by `config`.
///
/// Returns `n_cycles + 1` values. Density-matrix snapshots are compared with
/// the ideal encoded state. Under post-selection the schedule is omitted and
/// the expected number of surviving shots is reported instead.
#[instrument(skip(config), fields(n_cycles = config.n_cycles, data_process = %config.data_process))]
pub fn fidelity_from_scratch(config: &FidelityConfig) -> AnalysisResult<FidelityRun> {
    let (recovery, conditional) = config.data_process.flags()?;
    check_lifetimes(config.t1, config.t2)?;
    let gate_times = config.gate_times.clone().validated_or_default();
    let noise = NoiseModel::thermal_relaxation(config.t1, config.t2, gate_times.clone())?;

    let options = StabilizerOptions {
        n_cycles: config.n_cycles,
        reset: config.reset,
        recovery,
        conditional,
        encoding: config.encoding,
        snapshot_type: config.snapshot_type,
        pauli: config.pauli.clone(),
        include_barriers: true,
        theta: config.theta,
        phi: config.phi,
        gate_times: gate_times.clone(),
    };
    let (circuit, _) = get_full_stabilizer_circuit(&options)?;
    let reference = QuantumState::Pure(get_encoded_state(config.theta, config.phi, false)?);
    let sim = config.simulator();
    let count = config.n_cycles + 1;

    if config.data_process == DataProcess::EmptyCircuit {
        let times = circuit_time(&circuit, &gate_times)?;
        let empty = idle_encoded_circuit(
            &times.snapshot_times(),
            &[config.snapshot_type],
            config.t1,
            config.t2,
            config.theta,
            config.phi,
            &config.pauli,
        )?;
        let result = sim.run(&empty, config.shots, None)?;
        return Ok(FidelityRun {
            fidelities: snapshot_series(&result, config.snapshot_type, count, &reference)?,
            times: Some(times),
            select_counts: None,
        });
    }

    let (circuit, times) = if config.idle_noise {
        add_idle_noise(&circuit, &gate_times, config.t1, config.t2)?
    } else {
        let times = circuit_time(&circuit, &gate_times)?;
        (circuit, times)
    };
    let result = sim.run(&circuit, config.shots, Some(&noise))?;
    let fidelities = snapshot_series(&result, config.snapshot_type, count, &reference)?;

    debug!(
        end_ns = times.end,
        final_value = fidelities.last().copied().unwrap_or(f64::NAN),
        "Stabilizer experiment finished"
    );

    if conditional {
        let select_counts = (0..count)
            .map(|index| {
                let label = config.snapshot_type.label(index);
                result
                    .snapshot(&label)
                    .map(|record| record.probability * f64::from(config.shots))
                    .ok_or(AnalysisError::MissingSnapshot(label))
            })
            .collect::<AnalysisResult<Vec<_>>>()?;
        return Ok(FidelityRun {
            fidelities,
            times: None,
            select_counts: Some(select_counts),
        });
    }

    Ok(FidelityRun {
        fidelities,
        times: Some(times),
        select_counts: None,
    })
}

/// Decay of a single unprotected qubit over the schedule of the
/// stabilizer experiment.
///
/// The schedule is that of `n_cycles` cycles without reset or recovery.
/// Density-matrix values are fidelities to the initial state, so the first
/// is exactly 1.
#[allow(clippy::too_many_arguments)]
#[instrument(skip(gate_times, pauli))]
pub fn fid_single_qubit(
    n_cycles: usize,
    shots: u32,
    gate_times: &GateTimes,
    snapshot_type: SnapshotType,
    t1: f64,
    t2: f64,
    theta: f64,
    phi: f64,
    pauli: &PauliString,
) -> AnalysisResult<FidelityRun> {
    check_lifetimes(t1, t2)?;
    let gate_times = gate_times.clone().validated_or_default();
    let options = StabilizerOptions {
        n_cycles,
        reset: false,
        recovery: false,
        conditional: false,
        snapshot_type,
        theta,
        phi,
        gate_times: gate_times.clone(),
        ..Default::default()
    };
    let (circuit, _) = get_full_stabilizer_circuit(&options)?;
    let (_, times) = add_idle_noise(&circuit, &gate_times, t1, t2)?;

    let idle = idle_single_qubit_circuit(
        &times.snapshot_times(),
        &[snapshot_type],
        t1,
        t2,
        theta,
        phi,
        pauli,
    )?;
    let result = simulator(SimulationMethod::DensityMatrix, None).run(&idle, shots, None)?;
    let start = QuantumState::Pure(single_qubit_state(theta, phi)?);

    let mut fidelities = snapshot_series(&result, snapshot_type, times.len(), &start)?;
    if snapshot_type == SnapshotType::Dm {
        if let Some(first) = fidelities.first_mut() {
            *first = 1.0;
        }
    }
    Ok(FidelityRun {
        fidelities,
        times: Some(times),
        select_counts: None,
    })
}

/// Fidelity of the noisy encoder output with the ideal encoded state.
///
/// Code qubit 0 is rotated to `u(θ, φ, 0)|0⟩` and encoded with gates. In
/// expectation mode the value of `pauli` is returned instead.
#[allow(clippy::too_many_arguments)]
#[instrument(skip(gate_times, pauli))]
pub fn encoding_fidelity(
    shots: u32,
    gate_times: &GateTimes,
    t1: f64,
    t2: f64,
    idle_noise: bool,
    theta: f64,
    phi: f64,
    snapshot_type: SnapshotType,
    pauli: &PauliString,
) -> AnalysisResult<f64> {
    check_lifetimes(t1, t2)?;
    let gate_times = gate_times.clone().validated_or_default();
    let (mut circuit, registers) = get_empty_stabilizer_circuit(0, false);
    circuit.u(theta, phi, 0.0, registers.code_qubits[0])?;
    encode_input(&mut circuit, &registers)?;
    add_snapshot(
        &mut circuit,
        snapshot_type,
        0,
        &registers.code_qubits,
        pauli,
        true,
        None,
    )?;

    let circuit = if idle_noise {
        add_idle_noise(&circuit, &gate_times, t1, t2)?.0
    } else {
        circuit
    };
    let noise = NoiseModel::thermal_relaxation(t1, t2, gate_times)?;
    let result = simulator(SimulationMethod::DensityMatrix, None).run(&circuit, shots, Some(&noise))?;
    let reference = QuantumState::Pure(get_encoded_state(theta, phi, false)?);
    snapshot_value(&result, snapshot_type, 0, &reference)
}

/// Stabilizer cycles without gate noise, separated by relaxation blocks.
///
/// Every cycle is preceded by thermal relaxation on all seven qubits for
/// the nominal cycle time `8 t_1q + 16 t_2q + 4 t_meas + t_feedback`, so
/// snapshot `i` sits at `i` cycle times.
#[allow(clippy::too_many_arguments)]
#[instrument(skip(gate_times, pauli))]
pub fn perfect_stab_circuit(
    n_cycles: usize,
    shots: u32,
    gate_times: &GateTimes,
    t1: f64,
    t2: f64,
    reset: bool,
    recovery: bool,
    snapshot_type: SnapshotType,
    theta: f64,
    phi: f64,
    pauli: &PauliString,
) -> AnalysisResult<FidelityRun> {
    check_lifetimes(t1, t2)?;
    let gate_times = gate_times.clone().validated_or_default();
    StabilizerOptions {
        reset,
        recovery,
        ..Default::default()
    }
    .validate()?;

    let cycle_time = 8.0 * gate_times.single_qubit()
        + 16.0 * gate_times.two_qubit()
        + 4.0 * gate_times.measure()
        + gate_times.feedback();

    let (mut circuit, registers) = get_empty_stabilizer_circuit(n_cycles, recovery);
    let code = registers.code_qubits.clone();
    let state = get_encoded_state(theta, phi, false)?;
    circuit.initialize(code.iter().copied(), state.clone().into_amplitudes())?;
    add_snapshot(&mut circuit, snapshot_type, 0, &code, pauli, true, None)?;
    relax_all(&mut circuit, t1, t2, cycle_time)?;
    for cycle in 0..n_cycles {
        unflagged_stabilizer_cycle(&mut circuit, &registers, cycle, reset, recovery, &gate_times)?;
        add_snapshot(&mut circuit, snapshot_type, cycle + 1, &code, pauli, true, None)?;
        relax_all(&mut circuit, t1, t2, cycle_time)?;
    }
    circuit.measure_many(code.iter().copied(), registers.readout.iter().copied())?;

    let result = simulator(SimulationMethod::DensityMatrix, None).run(&circuit, shots, None)?;
    let fidelities = snapshot_series(
        &result,
        snapshot_type,
        n_cycles + 1,
        &QuantumState::Pure(state),
    )?;
    let times = CircuitTimes {
        snapshots: (0..=n_cycles)
            .map(|i| (snapshot_type.label(i), i as f64 * cycle_time))
            .collect(),
        end: (n_cycles + 1) as f64 * cycle_time,
    };
    debug!(cycle_time, n_cycles, "Perfect stabilizer experiment finished");
    Ok(FidelityRun {
        fidelities,
        times: Some(times),
        select_counts: None,
    })
}

/// Z on a single qubit, the default observable of single-qubit runs.
pub fn single_qubit_z() -> PauliString {
    PauliString::single(Pauli::Z, 0, 1)
}
