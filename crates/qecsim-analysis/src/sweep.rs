//! Logical lifetime over a grid of hardware parameters.
//!
//! Every combination of T1, T2 and gate times runs one experiment, fits
//! [`mono_exp`] to its fidelity decay and stores the fitted lifetime `T`
//! and its variance in N-d arrays indexed like the parameter axes.

use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use qecsim_code::SnapshotType;
use qecsim_sim::GateTimes;

use crate::error::{AnalysisError, AnalysisResult};
use crate::export::{ExportConfig, to_file};
use crate::fidelity::{
    FidelityConfig, FidelityRun, fid_single_qubit, fidelity_from_scratch, perfect_stab_circuit,
    single_qubit_z,
};
use crate::fit::{curve_fit, get_array_indexes, mono_exp};

const ANGLE_TOLERANCE: f64 = 1e-9;

/// Gate-time keys scaled by [`scale_gate_times_per_kind`].
pub const SCALED_KINDS: [&str; 4] = ["single_qubit_gate", "two_qubit_gate", "measure", "feedback"];

// =============================================================================
// Parameters
// =============================================================================

/// Values of every swept axis, all in ns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepParameters {
    /// Relaxation times.
    pub t1: Vec<f64>,
    /// Dephasing times.
    pub t2: Vec<f64>,
    /// Single-qubit gate durations.
    pub single_qubit_gate: Vec<f64>,
    /// Two-qubit gate durations.
    pub two_qubit_gate: Vec<f64>,
    /// Measurement durations.
    pub measure: Vec<f64>,
    /// Feedback latencies.
    pub feedback: Vec<f64>,
}

impl Default for SweepParameters {
    fn default() -> Self {
        let wacqt = GateTimes::wacqt();
        Self {
            t1: vec![40e3],
            t2: vec![60e3],
            single_qubit_gate: vec![wacqt.single_qubit()],
            two_qubit_gate: vec![wacqt.two_qubit()],
            measure: vec![wacqt.measure()],
            feedback: vec![wacqt.feedback()],
        }
    }
}

/// One combination of swept values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Relaxation time.
    pub t1: f64,
    /// Dephasing time.
    pub t2: f64,
    /// Single-qubit gate duration.
    pub single_qubit_gate: f64,
    /// Two-qubit gate duration.
    pub two_qubit_gate: f64,
    /// Measurement duration.
    pub measure: f64,
    /// Feedback latency.
    pub feedback: f64,
}

impl SweepPoint {
    /// Standard gate times with this point's durations.
    pub fn gate_times(&self) -> GateTimes {
        GateTimes::wacqt().get_gate_times(&BTreeMap::from([
            ("single_qubit_gate".to_string(), self.single_qubit_gate),
            ("two_qubit_gate".to_string(), self.two_qubit_gate),
            ("measure".to_string(), self.measure),
            ("feedback".to_string(), self.feedback),
        ]))
    }
}

impl SweepParameters {
    /// Sweep T1 and T2 with every gate time scaled by each of `scalings`.
    pub fn from_scalings(
        t1: Vec<f64>,
        t2: Vec<f64>,
        gate_times: &GateTimes,
        scalings: &[f64],
    ) -> Self {
        let mut scaled = scale_gate_times_per_kind(gate_times, scalings);
        let mut take = |key: &str| scaled.remove(key).unwrap_or_default();
        Self {
            t1,
            t2,
            single_qubit_gate: take("single_qubit_gate"),
            two_qubit_gate: take("two_qubit_gate"),
            measure: take("measure"),
            feedback: take("feedback"),
        }
    }

    fn axes(&self) -> [&[f64]; 6] {
        [
            &self.t1,
            &self.t2,
            &self.single_qubit_gate,
            &self.two_qubit_gate,
            &self.measure,
            &self.feedback,
        ]
    }

    /// Length of every axis.
    pub fn shape(&self) -> Vec<usize> {
        self.axes().iter().map(|axis| axis.len()).collect()
    }

    /// Number of combinations.
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    /// Whether some axis has no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The combination at N-d `index`.
    pub fn point(&self, index: &[usize]) -> SweepPoint {
        SweepPoint {
            t1: self.t1[index[0]],
            t2: self.t2[index[1]],
            single_qubit_gate: self.single_qubit_gate[index[2]],
            two_qubit_gate: self.two_qubit_gate[index[3]],
            measure: self.measure[index[4]],
            feedback: self.feedback[index[5]],
        }
    }

    /// Reject empty axes and non-physical values.
    pub fn validate(&self) -> AnalysisResult<()> {
        const NAMES: [&str; 6] = [
            "t1",
            "t2",
            "single_qubit_gate",
            "two_qubit_gate",
            "measure",
            "feedback",
        ];
        for (name, axis) in NAMES.iter().zip(self.axes()) {
            if axis.is_empty() {
                return Err(AnalysisError::InvalidParameter(format!(
                    "sweep axis '{name}' has no values"
                )));
            }
            if let Some(bad) = axis.iter().find(|v| !v.is_finite() || **v < 0.0) {
                return Err(AnalysisError::InvalidParameter(format!(
                    "sweep axis '{name}' contains {bad}"
                )));
            }
        }
        if let Some(bad) = self.t1.iter().chain(&self.t2).find(|v| **v <= 0.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "coherence time {bad} must be positive"
            )));
        }
        Ok(())
    }
}

/// Which experiment each combination runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepMode {
    /// [`fidelity_from_scratch`] with recovery.
    #[default]
    Full,
    /// [`fid_single_qubit`].
    SingleQubit,
    /// [`perfect_stab_circuit`] with reset and recovery.
    PerfectStab,
}

impl fmt::Display for SweepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepMode::Full => write!(f, "full"),
            SweepMode::SingleQubit => write!(f, "single_qubit"),
            SweepMode::PerfectStab => write!(f, "perfect_stab"),
        }
    }
}

impl FromStr for SweepMode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "full" => Ok(SweepMode::Full),
            "single_qubit" => Ok(SweepMode::SingleQubit),
            "perfect_stab" => Ok(SweepMode::PerfectStab),
            other => Err(AnalysisError::InvalidParameter(format!(
                "unknown sweep mode '{other}', expected full, single_qubit or perfect_stab"
            ))),
        }
    }
}

/// Settings shared by every combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepOptions {
    /// Stabilizer cycles per experiment.
    pub n_cycles: usize,
    /// Shots per experiment.
    pub shots: u32,
    /// Experiment to run.
    pub mode: SweepMode,
    /// Polar angle of the prepared state.
    pub theta: f64,
    /// Azimuthal angle of the prepared state.
    pub phi: f64,
    /// Write the result here as JSON when set.
    pub save: Option<PathBuf>,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            n_cycles: 8,
            shots: 2048,
            mode: SweepMode::Full,
            theta: 0.0,
            phi: 0.0,
            save: None,
        }
    }
}

/// Fitted lifetimes over the parameter grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResult {
    /// Fitted `T` per combination in ns, 0 where skipped.
    pub lifetimes: ArrayD<f64>,
    /// Variance of the fitted `T`, 0 where skipped.
    pub variances: ArrayD<f64>,
    /// The swept axes.
    pub parameters: SweepParameters,
    /// The shared settings.
    pub options: SweepOptions,
    /// Combinations skipped because T2 > 2 T1.
    pub skipped: usize,
    /// When the sweep finished.
    pub created_at: DateTime<Utc>,
}

/// Progress of a running sweep.
#[derive(Debug, Clone, Copy)]
pub struct SweepProgress {
    /// Combinations finished, including skipped ones.
    pub done: usize,
    /// Total combinations.
    pub total: usize,
    /// The combination just finished.
    pub point: SweepPoint,
    /// Its fitted lifetime, or `None` when skipped.
    pub lifetime: Option<f64>,
}

// =============================================================================
// Sweep
// =============================================================================

fn run_point(point: &SweepPoint, options: &SweepOptions) -> AnalysisResult<FidelityRun> {
    let gate_times = point.gate_times();
    match options.mode {
        SweepMode::SingleQubit => {
            let mut run = fid_single_qubit(
                options.n_cycles,
                options.shots,
                &gate_times,
                SnapshotType::Dm,
                point.t1,
                point.t2,
                options.theta,
                options.phi,
                &single_qubit_z(),
            )?;
            // Rescale so the fully mixed state reads 0.
            if (options.theta - FRAC_PI_2).abs() < ANGLE_TOLERANCE
                && (options.phi - FRAC_PI_2).abs() < ANGLE_TOLERANCE
            {
                for f in &mut run.fidelities {
                    *f = 2.0 * *f - 1.0;
                }
            }
            Ok(run)
        }
        SweepMode::PerfectStab => perfect_stab_circuit(
            options.n_cycles,
            options.shots,
            &gate_times,
            point.t1,
            point.t2,
            true,
            true,
            SnapshotType::Dm,
            options.theta,
            options.phi,
            &qecsim_code::logical_z(),
        ),
        SweepMode::Full => fidelity_from_scratch(&FidelityConfig {
            n_cycles: options.n_cycles,
            shots: options.shots,
            gate_times,
            t1: point.t1,
            t2: point.t2,
            theta: options.theta,
            phi: options.phi,
            ..Default::default()
        }),
    }
}

/// Fit `mono_exp` to snapshots `1..=n_cycles` of `run`; returns `(T, var T)`.
fn fit_lifetime(run: &FidelityRun, t1: f64, n_cycles: usize) -> AnalysisResult<(f64, f64)> {
    let times = run
        .times
        .as_ref()
        .ok_or_else(|| AnalysisError::Fit("experiment returned no schedule".into()))?
        .snapshot_times();
    if times.len() <= n_cycles || run.fidelities.len() <= n_cycles {
        return Err(AnalysisError::Fit(format!(
            "expected {} snapshots, got {} times and {} values",
            n_cycles + 1,
            times.len(),
            run.fidelities.len()
        )));
    }
    let fit = curve_fit(
        |t, p| mono_exp(t, p[0], p[1], p[2]),
        &times[1..=n_cycles],
        &run.fidelities[1..=n_cycles],
        &[t1, 0.0, 0.9],
    )?;
    Ok((fit.params[0], fit.variance(0)))
}

/// Sweep every combination of `parameters`.
///
/// Combinations with T2 > 2 T1 are skipped and left at 0. `progress` is
/// called after every combination.
#[instrument(skip_all, fields(points = parameters.len(), mode = ?options.mode))]
pub fn sweep_parameter_space<P>(
    parameters: &SweepParameters,
    options: &SweepOptions,
    mut progress: P,
) -> AnalysisResult<SweepResult>
where
    P: FnMut(SweepProgress),
{
    parameters.validate()?;
    if options.n_cycles == 0 {
        return Err(AnalysisError::InvalidParameter(
            "a lifetime fit needs at least one cycle".into(),
        ));
    }

    let shape = parameters.shape();
    let total = parameters.len();
    let mut lifetimes = ArrayD::<f64>::zeros(IxDyn(&shape));
    let mut variances = ArrayD::<f64>::zeros(IxDyn(&shape));
    let mut skipped = 0;

    for flat in 0..total {
        let index = get_array_indexes(flat, &shape);
        let point = parameters.point(&index);

        let lifetime = if point.t2 > 2.0 * point.t1 {
            debug!(t1 = point.t1, t2 = point.t2, "Skipping T2 > 2 T1");
            skipped += 1;
            None
        } else {
            let run = run_point(&point, options)?;
            let (lifetime, variance) = fit_lifetime(&run, point.t1, options.n_cycles)?;
            lifetimes[IxDyn(&index)] = lifetime;
            variances[IxDyn(&index)] = variance;
            Some(lifetime)
        };

        progress(SweepProgress {
            done: flat + 1,
            total,
            point,
            lifetime,
        });
    }

    if skipped == total {
        warn!(total, "Every sweep combination had T2 > 2 T1");
    }
    let result = SweepResult {
        lifetimes,
        variances,
        parameters: parameters.clone(),
        options: options.clone(),
        skipped,
        created_at: Utc::now(),
    };
    if let Some(path) = &options.save {
        to_file(&result, path, &ExportConfig::default())?;
        info!(path = %path.display(), "Saved sweep");
    }
    info!(total, skipped, "Sweep finished");
    Ok(result)
}

// =============================================================================
// Gate time scaling
// =============================================================================

/// `gate_times` with single-qubit, two-qubit, measure and feedback times all
/// multiplied by each of `scalings`. Virtual Z gates stay instantaneous.
pub fn scale_gate_times(gate_times: &GateTimes, scalings: &[f64]) -> Vec<GateTimes> {
    scalings
        .iter()
        .map(|&s| {
            GateTimes::wacqt().get_gate_times(&BTreeMap::from([
                ("single_qubit_gate".to_string(), s * gate_times.single_qubit()),
                ("two_qubit_gate".to_string(), s * gate_times.two_qubit()),
                ("measure".to_string(), s * gate_times.measure()),
                ("feedback".to_string(), s * gate_times.feedback()),
            ]))
        })
        .collect()
}

/// The scaled times of [`scale_gate_times`] as one list per key of
/// [`SCALED_KINDS`].
pub fn scale_gate_times_per_kind(
    gate_times: &GateTimes,
    scalings: &[f64],
) -> BTreeMap<String, Vec<f64>> {
    let base = [
        gate_times.single_qubit(),
        gate_times.two_qubit(),
        gate_times.measure(),
        gate_times.feedback(),
    ];
    SCALED_KINDS
        .iter()
        .zip(base)
        .map(|(kind, t)| (kind.to_string(), scalings.iter().map(|s| s * t).collect()))
        .collect()
}
