//! Ensemble and trajectory execution on small circuits.

use qecsim_ir::{Circuit, ClbitId, QubitId, StandardGate};
use qecsim_sim::{
    DensityMatrixSimulator, ExecutionResult, GateTimes, NoiseModel, QuantumState,
    SimulationMethod, add_idle_noise, state_fidelity,
};

fn run(
    circuit: &Circuit,
    method: SimulationMethod,
    shots: u32,
    noise: Option<&NoiseModel>,
) -> ExecutionResult {
    DensityMatrixSimulator::new()
        .with_method(method)
        .with_seed(1234)
        .run(circuit, shots, noise)
        .unwrap()
}

/// Prepare a qubit, copy its Z value onto an ancilla, and undo a flip on
/// the ancilla with feed-forward.
fn feedback_circuit() -> Circuit {
    let mut circuit = Circuit::new("feedback");
    let q = circuit.add_qreg("q", 2);
    let m = circuit.add_creg("m", 1);
    let r = circuit.add_creg("r", 1);
    circuit
        .ry(1.2, q[0])
        .unwrap()
        .cx(q[0], q[1])
        .unwrap()
        .measure(q[1], m[0])
        .unwrap()
        .gate_if(StandardGate::X, [q[1]], "m", 1)
        .unwrap()
        .snapshot_density_matrix("dm_0", [q[0], q[1]])
        .unwrap()
        .measure(q[0], r[0])
        .unwrap();
    circuit
}

// ---------------------------------------------------------------------------
// Agreement between methods
// ---------------------------------------------------------------------------

#[test]
fn ensemble_and_trajectory_agree_with_noise() {
    let circuit = feedback_circuit();
    let noise = NoiseModel::thermal_relaxation(5e3, 6e3, GateTimes::wacqt()).unwrap();

    let exact = run(&circuit, SimulationMethod::DensityMatrix, 4000, Some(&noise));
    let sampled = run(&circuit, SimulationMethod::Trajectory, 4000, Some(&noise));

    let a = QuantumState::Mixed(exact.data["dm_0"].density_matrix().unwrap().clone());
    let b = QuantumState::Mixed(sampled.data["dm_0"].density_matrix().unwrap().clone());
    let fidelity = state_fidelity(&a, &b).unwrap();
    assert!(fidelity > 0.99, "fidelity {fidelity}");

    let p_exact = exact.counts.get("1") as f64 / 4000.0;
    let p_sampled = sampled.counts.get("1") as f64 / 4000.0;
    assert!((p_exact - p_sampled).abs() < 0.05);
}

#[test]
fn feedback_resets_ancilla_in_both_methods() {
    let circuit = feedback_circuit();
    for method in [SimulationMethod::DensityMatrix, SimulationMethod::Trajectory] {
        let result = run(&circuit, method, 200, None);
        let rho = result.data["dm_0"].density_matrix().unwrap();
        // The ancilla (qubit 1 of the snapshot) ends in |0⟩.
        let p_ancilla_one = rho.get(2, 2).re + rho.get(3, 3).re;
        assert!(p_ancilla_one.abs() < 1e-12, "{method}");
    }
}

// ---------------------------------------------------------------------------
// Post-selection
// ---------------------------------------------------------------------------

#[test]
fn post_select_acceptance_matches_analytic() {
    let theta: f64 = 0.9;
    let mut circuit = Circuit::with_size("ps", 1, 1);
    circuit
        .rx(theta, QubitId(0))
        .unwrap()
        .measure(QubitId(0), ClbitId(0))
        .unwrap()
        .post_select([ClbitId(0)], 1)
        .unwrap()
        .snapshot_density_matrix("dm_0", [QubitId(0)])
        .unwrap();

    let expected = (theta / 2.0).sin().powi(2);
    let exact = run(&circuit, SimulationMethod::DensityMatrix, 2000, None);
    assert!((exact.data["dm_0"].probability - expected).abs() < 1e-12);
    assert!((exact.data["dm_0"].density_matrix().unwrap().get(1, 1).re - 1.0).abs() < 1e-12);

    // Rejected shots do not appear in the counts.
    let accepted = exact.counts.get("1") as f64 / 2000.0;
    assert_eq!(exact.counts.get("0"), 0);
    assert!((accepted - expected).abs() < 0.05);

    let sampled = run(&circuit, SimulationMethod::Trajectory, 2000, None);
    assert!((sampled.data["dm_0"].probability - expected).abs() < 0.05);
}

// ---------------------------------------------------------------------------
// Idle noise
// ---------------------------------------------------------------------------

#[test]
fn waiting_qubit_relaxes_for_the_schedule() {
    let (t1, t2) = (20e3, 30e3);
    let mut circuit = Circuit::with_size("idle", 2, 0);
    circuit
        .x(QubitId(1))
        .unwrap()
        .h(QubitId(0))
        .unwrap()
        .h(QubitId(0))
        .unwrap()
        .h(QubitId(0))
        .unwrap()
        .cz(QubitId(0), QubitId(1))
        .unwrap()
        .snapshot_density_matrix("dm_0", [QubitId(1)])
        .unwrap();

    let gate_times = GateTimes::wacqt();
    let (noisy, times) = add_idle_noise(&circuit, &gate_times, t1, t2).unwrap();
    assert_eq!(times.get("dm_0"), Some(160.0));
    assert_eq!(times.end, 160.0);

    // Idle gaps only: qubit 1 waits 40 ns for the Hadamards.
    let idle_only = run(&noisy, SimulationMethod::DensityMatrix, 0, None);
    let rho = idle_only.data["dm_0"].density_matrix().unwrap();
    assert!((rho.get(1, 1).re - (-40.0 / t1).exp()).abs() < 1e-9);

    // With gate noise the qubit relaxes for the whole schedule.
    let noise = NoiseModel::thermal_relaxation(t1, t2, gate_times).unwrap();
    let full = run(&noisy, SimulationMethod::DensityMatrix, 0, Some(&noise));
    let rho = full.data["dm_0"].density_matrix().unwrap();
    assert!((rho.get(1, 1).re - (-160.0 / t1).exp()).abs() < 1e-9);
}
