//! Error types for the analysis crate.

use thiserror::Error;

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors raised by experiments, fits and sweeps.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    /// Circuit builder or DAG returned an error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] qecsim_ir::IrError),

    /// Simulator error.
    #[error("Simulation error: {0}")]
    Sim(#[from] qecsim_sim::SimError),

    /// Stabilizer circuit error.
    #[error("Code error: {0}")]
    Code(#[from] qecsim_code::CodeError),

    /// A processing mode that exists by name but is not implemented.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// An expected snapshot is absent or has the wrong kind.
    #[error("Missing snapshot '{0}'")]
    MissingSnapshot(String),

    /// Parameters outside the range an experiment accepts.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A fit that cannot be evaluated.
    #[error("Fit error: {0}")]
    Fit(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization error.
    #[error("Export error: {0}")]
    Export(String),
}

impl From<serde_json::Error> for AnalysisError {
    fn from(e: serde_json::Error) -> Self {
        AnalysisError::Export(e.to_string())
    }
}
