//! Five-qubit [[5,1,3]] stabilizer code
//!
//! Circuits for one logical qubit protected by the perfect five-qubit code:
//! logical states and operators, a unitary encoder, syndrome extraction on
//! two alternating ancillas, lookup-table recovery, labelled snapshots,
//! and projections of noisy density matrices back onto the logical qubit.
//!
//! # Example: one noiseless cycle keeps the logical state
//!
//! ```rust
//! use qecsim_code::{StabilizerOptions, get_encoded_state, get_full_stabilizer_circuit};
//! use qecsim_sim::{DensityMatrixSimulator, QuantumState, state_fidelity};
//!
//! let options = StabilizerOptions {
//!     n_cycles: 1,
//!     encoding: true,
//!     theta: 1.0,
//!     phi: 0.5,
//!     ..Default::default()
//! };
//! let (circuit, _) = get_full_stabilizer_circuit(&options)?;
//! let result = DensityMatrixSimulator::new().run(&circuit, 0, None)?;
//!
//! let ideal = QuantumState::Pure(get_encoded_state(1.0, 0.5, false)?);
//! let after = QuantumState::Mixed(result.data["dm_1"].density_matrix().unwrap().clone());
//! assert!((state_fidelity(&ideal, &after)? - 1.0).abs() < 1e-9);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Layout
//!
//! Code qubits are 0–4 and ancillas 5–6. Stabilizer `k` of cycle `c` lands
//! in syndrome bit `k` of that cycle, so syndrome value `s` has bit `k` set
//! when stabilizer `k` measured −1.

pub mod builder;
pub mod cycle;
pub mod encoder;
pub mod error;
pub mod idle;
pub mod operators;
pub mod projection;
pub mod registers;
pub mod snapshot;
pub mod stabilizers;

pub use builder::{StabilizerOptions, get_full_stabilizer_circuit};
pub use cycle::{add_recovery, unflagged_stabilizer_cycle};
pub use encoder::{encode_input, pivot_generators};
pub use error::{CodeError, CodeResult};
pub use idle::{idle_encoded_circuit, idle_single_qubit_circuit, single_qubit_state};
pub use operators::PhasedPauli;
pub use projection::{
    code_space_probability, project_dm_to_logical_subspace_v1, project_dm_to_logical_subspace_v2,
    project_dm_to_logical_subspace_v3,
};
pub use registers::{
    StabilizerRegisters, get_classical_register, get_empty_stabilizer_circuit,
    syndrome_register_name,
};
pub use snapshot::{SnapshotType, add_snapshot};
pub use stabilizers::{
    Correction, NUM_ANCILLAS, NUM_CODE_QUBITS, STABILIZERS, get_encoded_state, logical_states,
    logical_x, logical_y, logical_z, stabilizers, syndrome, syndrome_table,
};
