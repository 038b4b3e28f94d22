//! Exponential decay fits.
//!
//! [`curve_fit`] is a Levenberg–Marquardt least-squares fit with a
//! forward-difference Jacobian; damped normal equations are solved by faer's
//! Cholesky factorization. Its covariance is `s² (JᵀJ)⁻¹` with
//! `s² = SSR / (n - m)`, and is infinite when there are no more points than
//! parameters.

use faer::linalg::solvers::Solve;
use faer::{Mat, Side};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use qecsim_sim::CircuitTimes;

use crate::error::{AnalysisError, AnalysisResult};

const MAX_ITERATIONS: usize = 500;
const MAX_DAMPING: f64 = 1e16;
const TOLERANCE: f64 = 1e-12;

/// `(A - c) e^{-t/T} + c`: decay from `A` at `t = 0` towards `c`.
pub fn mono_exp(t: f64, lifetime: f64, offset: f64, amplitude: f64) -> f64 {
    (amplitude - offset) * (-t / lifetime).exp() + offset
}

/// Fitted parameters and their covariance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveFit {
    /// Best-fit parameters, in the order of the initial guess.
    pub params: Vec<f64>,
    /// Parameter covariance, `m × m`.
    pub covariance: Array2<f64>,
    /// Sum of squared residuals at `params`.
    pub residual: f64,
    /// Iterations taken.
    pub iterations: usize,
}

impl CurveFit {
    /// Variance of parameter `index`.
    pub fn variance(&self, index: usize) -> f64 {
        self.covariance[[index, index]]
    }
}

fn residuals<F>(f: &F, x: &[f64], y: &[f64], params: &[f64]) -> Array1<f64>
where
    F: Fn(f64, &[f64]) -> f64,
{
    x.iter()
        .zip(y)
        .map(|(&xi, &yi)| yi - f(xi, params))
        .collect()
}

fn jacobian<F>(f: &F, x: &[f64], params: &[f64]) -> Array2<f64>
where
    F: Fn(f64, &[f64]) -> f64,
{
    let step_scale = f64::EPSILON.sqrt();
    let mut jac = Array2::zeros((x.len(), params.len()));
    let mut shifted = params.to_vec();
    for j in 0..params.len() {
        let h = step_scale * params[j].abs().max(1.0);
        shifted[j] = params[j] + h;
        for (i, &xi) in x.iter().enumerate() {
            jac[[i, j]] = (f(xi, &shifted) - f(xi, params)) / h;
        }
        shifted[j] = params[j];
    }
    jac
}

fn to_mat(a: &Array2<f64>) -> Mat<f64> {
    Mat::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

/// Solve `a · x = b` for symmetric positive definite `a` by Cholesky.
fn solve_spd(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let llt = to_mat(a).llt(Side::Lower).ok()?;
    let rhs = Mat::from_fn(b.len(), 1, |i, _| b[i]);
    let x = llt.solve(&rhs);
    let out: Array1<f64> = (0..b.len()).map(|i| x[(i, 0)]).collect();
    out.iter().all(|v| v.is_finite()).then_some(out)
}

/// Inverse of a symmetric positive definite matrix.
fn invert_spd(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let llt = to_mat(a).llt(Side::Lower).ok()?;
    let identity = Mat::<f64>::identity(n, n);
    let inverse = llt.solve(&identity);
    let out = Array2::from_shape_fn((n, n), |(i, j)| inverse[(i, j)]);
    out.iter().all(|v| v.is_finite()).then_some(out)
}

/// Fit `f(x, params)` to `(x, y)` starting from `p0`.
pub fn curve_fit<F>(f: F, x: &[f64], y: &[f64], p0: &[f64]) -> AnalysisResult<CurveFit>
where
    F: Fn(f64, &[f64]) -> f64,
{
    if x.len() != y.len() {
        return Err(AnalysisError::Fit(format!(
            "{} x values but {} y values",
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() || p0.is_empty() {
        return Err(AnalysisError::Fit("nothing to fit".into()));
    }

    let mut params = p0.to_vec();
    let mut r = residuals(&f, x, y, &params);
    let mut cost = r.dot(&r);
    if !cost.is_finite() {
        return Err(AnalysisError::Fit(format!(
            "model is not finite at the initial guess {p0:?}"
        )));
    }

    let mut damping = 1e-3;
    let mut iterations = 0;
    while iterations < MAX_ITERATIONS {
        iterations += 1;
        let jac = jacobian(&f, x, &params);
        let jtj = jac.t().dot(&jac);
        let gradient = jac.t().dot(&r);

        let mut improved = false;
        while damping < MAX_DAMPING {
            let mut damped = jtj.clone();
            for k in 0..params.len() {
                damped[[k, k]] += damping * jtj[[k, k]].max(TOLERANCE);
            }
            let Some(step) = solve_spd(&damped, &gradient) else {
                damping *= 10.0;
                continue;
            };
            let trial: Vec<f64> = params.iter().zip(&step).map(|(p, s)| p + s).collect();
            let trial_r = residuals(&f, x, y, &trial);
            let trial_cost = trial_r.dot(&trial_r);
            if trial_cost.is_finite() && trial_cost <= cost {
                let step_norm = step.dot(&step).sqrt();
                let param_norm = params.iter().map(|p| p * p).sum::<f64>().sqrt();
                let reduction = cost - trial_cost;
                params = trial;
                r = trial_r;
                cost = trial_cost;
                damping = (damping / 10.0).max(1e-12);
                improved = reduction > TOLERANCE * cost.max(TOLERANCE)
                    && step_norm > TOLERANCE * (param_norm + TOLERANCE);
                break;
            }
            damping *= 10.0;
        }
        if !improved {
            break;
        }
    }

    let m = params.len();
    let n = x.len();
    let covariance = if n > m {
        let jac = jacobian(&f, x, &params);
        let s2 = cost / (n - m) as f64;
        invert_spd(&jac.t().dot(&jac))
            .map(|inv| inv * s2)
            .unwrap_or_else(|| Array2::from_elem((m, m), f64::INFINITY))
    } else {
        Array2::from_elem((m, m), f64::INFINITY)
    };

    debug!(iterations, residual = cost, ?params, "Curve fit finished");
    Ok(CurveFit {
        params,
        covariance,
        residual: cost,
        iterations,
    })
}

/// Coefficients of `ln F = θ₀ + θ₁ x` and the fit error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorRate {
    /// `[θ₀, θ₁]`; `-θ₁` is the error rate per unit of `x`.
    pub theta: [f64; 2],
    /// Sum of squared differences between `e^{θ₀ + θ₁ x}` and the data.
    pub mse: f64,
}

/// Fit the decay of `fidelity[1..]` by linear least squares on its logarithm.
///
/// `x` is the 1-based cycle number, or the snapshot start time in µs when a
/// schedule is given.
pub fn get_error_rate(fidelity: &[f64], time: Option<&CircuitTimes>) -> AnalysisResult<ErrorRate> {
    if fidelity.len() < 3 {
        return Err(AnalysisError::Fit(format!(
            "need at least two cycles, got {} fidelities",
            fidelity.len()
        )));
    }
    let n = fidelity.len() - 1;
    let x: Vec<f64> = match time {
        Some(times) => {
            let starts = times.snapshot_times();
            if starts.len() < fidelity.len() {
                return Err(AnalysisError::Fit(format!(
                    "{} fidelities but only {} snapshot times",
                    fidelity.len(),
                    starts.len()
                )));
            }
            starts[1..=n].iter().map(|t| t * 1e-3).collect()
        }
        None => (1..=n).map(|c| c as f64).collect(),
    };
    let y = fidelity[1..]
        .iter()
        .map(|&f| {
            if f > 0.0 {
                Ok(f.ln())
            } else {
                Err(AnalysisError::Fit(format!(
                    "fidelity {f} has no logarithm"
                )))
            }
        })
        .collect::<AnalysisResult<Vec<f64>>>()?;

    // Normal equations of the n × 2 design matrix [1, x].
    let count = n as f64;
    let sx: f64 = x.iter().sum();
    let sxx: f64 = x.iter().map(|v| v * v).sum();
    let sy: f64 = y.iter().sum();
    let sxy: f64 = x.iter().zip(&y).map(|(a, b)| a * b).sum();
    let det = count * sxx - sx * sx;
    if det.abs() < f64::MIN_POSITIVE {
        return Err(AnalysisError::Fit("time axis is degenerate".into()));
    }
    let theta = [(sxx * sy - sx * sxy) / det, (count * sxy - sx * sy) / det];

    let mse = x
        .iter()
        .zip(&fidelity[1..])
        .map(|(xi, fi)| ((theta[0] + theta[1] * xi).exp() - fi).powi(2))
        .sum();
    Ok(ErrorRate { theta, mse })
}

/// Row-major N-d index of flat position `index` in an array of `lengths`.
pub fn get_array_indexes(index: usize, lengths: &[usize]) -> Vec<usize> {
    let mut out = vec![0; lengths.len()];
    let mut rest = index;
    for (slot, &len) in out.iter_mut().zip(lengths).rev() {
        let len = len.max(1);
        *slot = rest % len;
        rest /= len;
    }
    out
}
