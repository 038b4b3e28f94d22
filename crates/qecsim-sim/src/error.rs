//! Error types for the sim crate.

use thiserror::Error;

/// Errors produced while preparing or running a simulation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// Circuit builder or DAG returned an error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] qecsim_ir::IrError),

    /// Circuit is larger than the simulator accepts.
    #[error("Circuit has {qubits} qubits but simulator only supports {max}")]
    CircuitTooLarge {
        /// Qubits in the circuit.
        qubits: usize,
        /// Configured limit.
        max: usize,
    },

    /// Classical memory does not fit the 128-bit memory word.
    #[error("Circuit has {0} classical bits, at most 128 are supported")]
    TooManyClbits(usize),

    /// Two states or operators of different dimension were combined.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        got: usize,
    },

    /// A qubit index outside the state.
    #[error("Qubit {qubit} out of range for a {num_qubits}-qubit state")]
    QubitOutOfRange {
        /// The offending index.
        qubit: usize,
        /// Size of the state.
        num_qubits: usize,
    },

    /// State data that is not a valid quantum state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Noise model parameters outside their physical range.
    #[error("Invalid noise model: {0}")]
    InvalidNoiseModel(String),

    /// A negative or non-finite gate time.
    #[error("Invalid gate time for '{name}': {value} ns")]
    InvalidGateTime {
        /// Gate name.
        name: String,
        /// Offending value.
        value: f64,
    },

    /// Simulation method name not recognised.
    #[error("Unknown simulation method '{0}'")]
    UnknownMethod(String),

    /// Dense linear algebra did not converge.
    #[error("Eigendecomposition failed: {0}")]
    Eigendecomposition(String),

    /// Two snapshots share a label.
    #[error("Duplicate snapshot label '{0}'")]
    DuplicateSnapshot(String),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
