//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit not found in circuit.
    #[error("Qubit {qubit} not found in circuit{}", format_context(.context))]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Optional instruction name for context.
        context: Option<String>,
    },

    /// Classical bit not found in circuit.
    #[error("Classical bit {clbit} not found in circuit{}", format_context(.context))]
    ClbitNotFound {
        /// The classical bit that was not found.
        clbit: ClbitId,
        /// Optional instruction name for context.
        context: Option<String>,
    },

    /// Classical register not found in circuit.
    #[error("Classical register '{0}' not found in circuit")]
    RegisterNotFound(String),

    /// Invalid DAG structure.
    #[error("Invalid DAG structure: {0}")]
    InvalidDag(String),

    /// Invalid node index.
    #[error("Invalid node index")]
    InvalidNode,

    /// Gate requires different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// Duplicate qubit in operation.
    #[error("Duplicate qubit {qubit} in operation{}", format_context(.context))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional instruction name for context.
        context: Option<String>,
    },

    /// Statevector passed to `initialize` has the wrong shape or norm.
    #[error("Invalid initial state: {0}")]
    InvalidState(String),

    /// Pauli string could not be parsed or does not fit its qubits.
    #[error("Invalid Pauli string '{text}': {reason}")]
    InvalidPauli {
        /// The offending text.
        text: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Noise channel parameters outside their physical range.
    #[error("Invalid noise channel {channel}: {reason}")]
    InvalidChannel {
        /// Display form of the channel.
        channel: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Delay with a negative or non-finite duration.
    #[error("Invalid duration {0} ns")]
    InvalidDuration(f64),

    /// Post-selection or condition value does not fit its bits.
    #[error("Classical value {value} does not fit in {width} bits")]
    ValueOutOfRange {
        /// The value that was supplied.
        value: u64,
        /// Number of bits it is compared against.
        width: usize,
    },
}

#[allow(clippy::ref_option)]
fn format_context(context: &Option<String>) -> String {
    match context {
        Some(name) => format!(" (instruction: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
