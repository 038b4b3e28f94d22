//! Idle reference circuits and logical projections.

use qecsim_code::{
    SnapshotType, code_space_probability, get_encoded_state, idle_encoded_circuit,
    idle_single_qubit_circuit, project_dm_to_logical_subspace_v1, single_qubit_state,
};
use qecsim_ir::{Pauli, PauliString};
use qecsim_sim::{DensityMatrixSimulator, QuantumState, state_fidelity};

const T1: f64 = 40e3;
const T2: f64 = 60e3;

// ---------------------------------------------------------------------------
// Single qubit
// ---------------------------------------------------------------------------

#[test]
fn single_qubit_decays_to_ground() {
    let times = [0.0, 10e3, 50e3, 400e3];
    let circuit = idle_single_qubit_circuit(
        &times,
        &[SnapshotType::Exp],
        T1,
        T2,
        std::f64::consts::PI,
        0.0,
        &PauliString::single(Pauli::Z, 0, 1),
    )
    .unwrap();
    let result = DensityMatrixSimulator::new().run(&circuit, 0, None).unwrap();
    for (i, &t) in times.iter().enumerate() {
        // ⟨Z⟩ = 1 - 2 e^{-t/T1} starting from |1⟩.
        let expected = 1.0 - 2.0 * (-t / T1).exp();
        let z = result.data[&format!("exp_{i}")].expectation().unwrap();
        assert!((z - expected).abs() < 1e-9, "t={t}: {z} vs {expected}");
    }
}

// ---------------------------------------------------------------------------
// Encoded block
// ---------------------------------------------------------------------------

#[test]
fn logical_fidelity_times_code_probability_is_physical_fidelity() {
    let (theta, phi) = (1.2, 0.6);
    let times = [0.0, 2e3, 8e3, 20e3];
    let circuit = idle_encoded_circuit(
        &times,
        &[SnapshotType::Dm],
        T1,
        T2,
        theta,
        phi,
        &PauliString::uniform(Pauli::Z, 5),
    )
    .unwrap();
    let result = DensityMatrixSimulator::new().run(&circuit, 0, None).unwrap();

    let ideal = QuantumState::Pure(get_encoded_state(theta, phi, false).unwrap());
    let ideal_logical = QuantumState::Pure(single_qubit_state(theta, phi).unwrap());
    let mut previous = f64::INFINITY;
    for i in 0..times.len() {
        let rho = result.data[&format!("dm_{i}")].density_matrix().unwrap().clone();
        let f_phys = state_fidelity(&ideal, &QuantumState::Mixed(rho.clone())).unwrap();
        let p_l = code_space_probability(&rho).unwrap();
        let logical = project_dm_to_logical_subspace_v1(&rho).unwrap();
        let f_logical = state_fidelity(&ideal_logical, &QuantumState::Mixed(logical)).unwrap();

        assert!((p_l * f_logical - f_phys).abs() < 1e-10, "snapshot {i}");
        assert!(f_phys < previous);
        previous = f_phys;
    }
}
