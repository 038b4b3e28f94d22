//! qecsim density-matrix simulator
//!
//! Executes `qecsim-ir` circuits on small registers with the features the
//! error-correction experiments need:
//!
//! - **States**: [`Statevector`] and row-major [`DensityMatrix`], with
//!   partial traces, Pauli expectation values and state fidelity.
//! - **Noise**: Kraus sets for every [`NoiseChannel`](qecsim_ir::NoiseChannel),
//!   a gate-attached thermal relaxation [`NoiseModel`] and an ASAP
//!   scheduler that fills idle gaps with relaxation ([`add_idle_noise`]).
//! - **Execution**: [`DensityMatrixSimulator`] supports mid-circuit
//!   measurement, classically conditioned gates, post-selection and
//!   snapshots.
//!
//! # Example
//!
//! ```rust
//! use qecsim_ir::{Circuit, QubitId};
//! use qecsim_sim::{DensityMatrixSimulator, GateTimes, NoiseModel};
//!
//! let mut circuit = Circuit::with_size("decay", 1, 0);
//! circuit
//!     .x(QubitId(0))?
//!     .delay([QubitId(0)], 1000.0)?
//!     .snapshot_density_matrix("dm_0", [QubitId(0)])?;
//!
//! let (noisy, times) = qecsim_sim::add_idle_noise(&circuit, &GateTimes::wacqt(), 40e3, 60e3)?;
//! let noise = NoiseModel::thermal_relaxation(40e3, 60e3, GateTimes::wacqt())?;
//! let result = DensityMatrixSimulator::new().run(&noisy, 0, Some(&noise))?;
//!
//! let rho = result.data["dm_0"].density_matrix().unwrap();
//! let expected = (-times.end / 40e3).exp();
//! assert!((rho.get(1, 1).re - expected).abs() < 1e-9);
//! # Ok::<(), qecsim_sim::SimError>(())
//! ```
//!
//! # Conventions
//!
//! Qubit `k` is bit `k` of a basis index. Two-qubit matrices are indexed by
//! `b0 + 2 * b1` where `b0` belongs to the first listed qubit.

pub mod channels;
pub mod density_matrix;
pub mod error;
pub mod fidelity;
pub mod gate_times;
pub mod gates;
pub mod noise_model;
pub mod result;
pub mod schedule;
pub mod simulator;
pub mod statevector;

pub use channels::{is_trace_preserving, kraus_operators, thermal_relaxation_parameters};
pub use density_matrix::DensityMatrix;
pub use error::{SimError, SimResult};
pub use fidelity::{QuantumState, state_fidelity};
pub use gate_times::GateTimes;
pub use noise_model::NoiseModel;
pub use result::{Counts, ExecutionResult, SnapshotRecord, SnapshotValue};
pub use schedule::{CircuitTimes, add_idle_noise, circuit_time};
pub use simulator::{DensityMatrixSimulator, SimulationMethod};
pub use statevector::Statevector;
