//! Error types for the code crate.

use thiserror::Error;

/// Errors raised while building or post-processing code circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodeError {
    /// Circuit builder or DAG returned an error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] qecsim_ir::IrError),

    /// State or simulator error.
    #[error("Simulation error: {0}")]
    Sim(#[from] qecsim_sim::SimError),

    /// Conflicting or unsupported circuit options.
    #[error("Invalid stabilizer options: {0}")]
    InvalidOptions(String),

    /// Snapshot times that are negative or decreasing.
    #[error("Invalid snapshot times: {0}")]
    InvalidTimes(String),

    /// The generators do not admit an encoder onto code qubit 0.
    #[error("Cannot build encoder: {0}")]
    Encoder(String),

    /// A state that is neither the code block nor the code block with ancillas.
    #[error("Expected a 5- or 7-qubit state, got {0} qubits")]
    UnsupportedState(usize),

    /// Projection of a state with no weight in the code space.
    #[error("State has no weight in the code space (P_L = {0})")]
    OutsideCodeSpace(f64),
}

/// Result type for code operations.
pub type CodeResult<T> = Result<T, CodeError>;
