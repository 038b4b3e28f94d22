//! qecsim circuit intermediate representation
//!
//! Core data structures for the circuits the error-correction experiments
//! run: qubits and classical bits, gates with optional classical
//! conditions, noise channels, snapshots and post-selection, all recorded
//! in a petgraph DAG behind the fluent [`Circuit`] builder.
//!
//! # Example: Bell pair with a density-matrix snapshot
//!
//! ```rust
//! use qecsim_ir::{Circuit, ClbitId, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell", 2, 2);
//! circuit
//!     .h(QubitId(0))?
//!     .cx(QubitId(0), QubitId(1))?
//!     .snapshot_density_matrix("dm_0", [QubitId(0), QubitId(1)])?
//!     .measure(QubitId(0), ClbitId(0))?
//!     .measure(QubitId(1), ClbitId(1))?;
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth()?, 3);
//! # Ok::<(), qecsim_ir::IrError>(())
//! ```
//!
//! # Conventions
//!
//! - Qubit `k` is bit `k` of a basis-state index; classical bit `k` is bit
//!   `k` of the memory word.
//! - A [`PauliString`] is positional over whatever qubit list it is paired
//!   with.
//! - Durations and time constants are nanoseconds.

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod noise;
pub mod pauli;
pub mod qubit;

pub use circuit::Circuit;
pub use dag::{CircuitDag, DagEdge, DagNode, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::{ClassicalCondition, Gate, StandardGate, read_bits};
pub use instruction::{Instruction, InstructionKind, SnapshotKind};
pub use noise::{NoiseChannel, NoiseOrigin};
pub use pauli::{Pauli, PauliString};
pub use qubit::{Clbit, ClbitId, Qubit, QubitId};
