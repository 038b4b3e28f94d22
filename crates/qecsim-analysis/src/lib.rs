//! Experiments and fits on the five-qubit code
//!
//! Runs the noisy stabilizer experiments of `qecsim-code` on the
//! `qecsim-sim` simulator and turns their snapshots into numbers:
//!
//! - **Fidelity experiments**: [`fidelity_from_scratch`] with recovery,
//!   post-selection or neither, plus the references [`fid_single_qubit`],
//!   [`encoding_fidelity`] and [`perfect_stab_circuit`].
//! - **Fits**: [`curve_fit`] of [`mono_exp`] decays and the log-linear
//!   [`get_error_rate`].
//! - **Sweeps**: [`sweep_parameter_space`] fits a logical lifetime at every
//!   combination of T1, T2 and gate times.
//! - **Idle comparison**: [`idle_single_qubit_curves`] and
//!   [`idle_encoded_curves`].
//! - **Export**: JSON [`Report`]s with a creation timestamp.
//!
//! # Example
//!
//! ```rust
//! use qecsim_analysis::{DataProcess, FidelityConfig, fidelity_from_scratch};
//!
//! let config = FidelityConfig {
//!     n_cycles: 1,
//!     data_process: DataProcess::Recovery,
//!     ..Default::default()
//! };
//! let run = fidelity_from_scratch(&config)?;
//! assert_eq!(run.fidelities.len(), 2);
//! assert!(run.fidelities.iter().all(|f| *f > 0.5 && *f <= 1.0 + 1e-9));
//! assert!(run.times.is_some());
//! # Ok::<(), qecsim_analysis::AnalysisError>(())
//! ```

pub mod error;
pub mod export;
pub mod fidelity;
pub mod fit;
pub mod idle;
pub mod sweep;

pub use error::{AnalysisError, AnalysisResult};
pub use export::{ExportConfig, Report, SCHEMA_VERSION, from_file, to_file, to_json};
pub use fidelity::{
    DataProcess, FidelityConfig, FidelityRun, encoding_fidelity, fid_single_qubit,
    fidelity_from_scratch, perfect_stab_circuit, single_qubit_z,
};
pub use fit::{CurveFit, ErrorRate, curve_fit, get_array_indexes, get_error_rate, mono_exp};
pub use idle::{IdleCurves, idle_encoded_curves, idle_single_qubit_curves, time_grid};
pub use sweep::{
    SCALED_KINDS, SweepMode, SweepOptions, SweepParameters, SweepPoint, SweepProgress,
    SweepResult, scale_gate_times, scale_gate_times_per_kind, sweep_parameter_space,
};
