//! Encoder, syndrome extraction and recovery on the simulator.

use proptest::prelude::*;

use qecsim_code::{
    NUM_CODE_QUBITS, SnapshotType, StabilizerOptions, encode_input, get_empty_stabilizer_circuit,
    get_encoded_state, get_full_stabilizer_circuit, syndrome_table, unflagged_stabilizer_cycle,
};
use qecsim_ir::{Circuit, Pauli, PauliString, QubitId, StandardGate};
use qecsim_sim::{
    DensityMatrix, DensityMatrixSimulator, ExecutionResult, GateTimes, NoiseModel, QuantumState,
    state_fidelity,
};

fn run(circuit: &Circuit) -> ExecutionResult {
    DensityMatrixSimulator::new()
        .with_seed(7)
        .run(circuit, 0, None)
        .unwrap()
}

fn fidelity_to_encoded(dm: &DensityMatrix, theta: f64, phi: f64) -> f64 {
    let ideal = QuantumState::Pure(get_encoded_state(theta, phi, false).unwrap());
    state_fidelity(&ideal, &QuantumState::Mixed(dm.clone())).unwrap()
}

fn pauli_gate(pauli: Pauli) -> StandardGate {
    match pauli {
        Pauli::X => StandardGate::X,
        Pauli::Y => StandardGate::Y,
        Pauli::Z => StandardGate::Z,
        Pauli::I => StandardGate::I,
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

fn encoded_snapshot(theta: f64, phi: f64) -> DensityMatrix {
    let (mut circuit, regs) = get_empty_stabilizer_circuit(0, false);
    circuit.u(theta, phi, 0.0, regs.code_qubits[0]).unwrap();
    encode_input(&mut circuit, &regs).unwrap();
    circuit
        .snapshot_density_matrix("dm_0", regs.code_qubits.iter().copied())
        .unwrap();
    run(&circuit).data["dm_0"].density_matrix().unwrap().clone()
}

#[test]
fn encoder_reproduces_logical_basis() {
    for (theta, phi) in [(0.0, 0.0), (std::f64::consts::PI, 0.0), (1.3, 2.1), (2.5, -0.7)] {
        let dm = encoded_snapshot(theta, phi);
        let fidelity = fidelity_to_encoded(&dm, theta, phi);
        assert!((fidelity - 1.0).abs() < 1e-10, "θ={theta} φ={phi}: {fidelity}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn encoder_matches_encoded_state(theta in 0.0f64..std::f64::consts::PI, phi in -3.0f64..3.0) {
        let dm = encoded_snapshot(theta, phi);
        prop_assert!((fidelity_to_encoded(&dm, theta, phi) - 1.0).abs() < 1e-10);
    }
}

#[test]
fn encoding_and_initialization_agree() {
    for encoding in [true, false] {
        let options = StabilizerOptions {
            n_cycles: 0,
            encoding,
            theta: 0.8,
            phi: 1.2,
            ..Default::default()
        };
        let (circuit, _) = get_full_stabilizer_circuit(&options).unwrap();
        let dm = run(&circuit).data["dm_0"].density_matrix().unwrap().clone();
        assert!((fidelity_to_encoded(&dm, 0.8, 1.2) - 1.0).abs() < 1e-10);
    }
}

// ---------------------------------------------------------------------------
// Syndromes
// ---------------------------------------------------------------------------

#[test]
fn noiseless_cycles_give_trivial_syndrome() {
    let options = StabilizerOptions {
        n_cycles: 3,
        conditional: true,
        encoding: true,
        theta: 1.0,
        ..Default::default()
    };
    let (circuit, _) = get_full_stabilizer_circuit(&options).unwrap();
    let result = run(&circuit);
    for cycle in 0..=3 {
        let record = &result.data[&format!("dm_{cycle}")];
        assert!((record.probability - 1.0).abs() < 1e-10);
        let fidelity = fidelity_to_encoded(record.density_matrix().unwrap(), 1.0, 0.0);
        assert!((fidelity - 1.0).abs() < 1e-10);
    }
}

#[test]
fn single_qubit_errors_produce_tabulated_syndromes() {
    for (value, correction) in syndrome_table() {
        let (mut circuit, regs) = get_empty_stabilizer_circuit(1, false);
        let state = get_encoded_state(0.9, 0.3, false).unwrap();
        circuit
            .initialize(regs.code_qubits.iter().copied(), state.into_amplitudes())
            .unwrap()
            .gate(pauli_gate(correction.pauli), [regs.code_qubits[correction.qubit]])
            .unwrap();
        unflagged_stabilizer_cycle(&mut circuit, &regs, 0, true, false, &GateTimes::wacqt())
            .unwrap();
        circuit
            .post_select(regs.cycle_bits(0).unwrap().iter().copied(), value)
            .unwrap()
            .snapshot_density_matrix("dm_1", regs.code_qubits.iter().copied())
            .unwrap();

        let record = &run(&circuit).data["dm_1"];
        assert!(
            (record.probability - 1.0).abs() < 1e-10,
            "{:?} on qubit {} gave syndrome other than {value:04b}",
            correction.pauli,
            correction.qubit
        );
    }
}

#[test]
fn recovery_restores_every_single_qubit_error() {
    for (_, correction) in syndrome_table() {
        let (mut circuit, regs) = get_empty_stabilizer_circuit(1, true);
        let state = get_encoded_state(2.2, -1.1, false).unwrap();
        circuit
            .initialize(regs.code_qubits.iter().copied(), state.into_amplitudes())
            .unwrap()
            .gate(pauli_gate(correction.pauli), [regs.code_qubits[correction.qubit]])
            .unwrap();
        unflagged_stabilizer_cycle(&mut circuit, &regs, 0, true, true, &GateTimes::wacqt())
            .unwrap();
        circuit
            .snapshot_density_matrix("dm_1", regs.code_qubits.iter().copied())
            .unwrap();

        let dm = run(&circuit).data["dm_1"].density_matrix().unwrap().clone();
        let fidelity = fidelity_to_encoded(&dm, 2.2, -1.1);
        assert!((fidelity - 1.0).abs() < 1e-10, "{correction:?}: {fidelity}");
    }
}

// ---------------------------------------------------------------------------
// Noisy experiments
// ---------------------------------------------------------------------------

#[test]
fn noisy_cycles_lose_fidelity() {
    let options = StabilizerOptions {
        n_cycles: 2,
        recovery: true,
        encoding: false,
        snapshot_type: SnapshotType::Dm,
        ..Default::default()
    };
    let (circuit, _) = get_full_stabilizer_circuit(&options).unwrap();
    let noise = NoiseModel::thermal_relaxation(30e3, 40e3, GateTimes::wacqt()).unwrap();
    let result = DensityMatrixSimulator::new()
        .run(&circuit, 0, Some(&noise))
        .unwrap();

    let fidelities: Vec<f64> = (0..=2)
        .map(|i| {
            let dm = result.data[&format!("dm_{i}")].density_matrix().unwrap();
            fidelity_to_encoded(dm, 0.0, 0.0)
        })
        .collect();
    assert!((fidelities[0] - 1.0).abs() < 1e-10);
    assert!(fidelities[1] < 1.0 && fidelities[1] > 0.8, "{fidelities:?}");
    assert!(fidelities[2] < fidelities[0]);
}

#[test]
fn expectation_snapshots_track_logical_z() {
    let options = StabilizerOptions {
        n_cycles: 1,
        snapshot_type: SnapshotType::Exp,
        pauli: PauliString::uniform(Pauli::Z, NUM_CODE_QUBITS),
        theta: std::f64::consts::PI,
        ..Default::default()
    };
    let (circuit, regs) = get_full_stabilizer_circuit(&options).unwrap();
    let result = run(&circuit);
    assert!((result.data["exp_0"].expectation().unwrap() + 1.0).abs() < 1e-10);
    assert!((result.data["exp_1"].expectation().unwrap() + 1.0).abs() < 1e-10);
    assert_eq!(regs.code_qubits, (0..5).map(QubitId).collect::<Vec<_>>());
}
