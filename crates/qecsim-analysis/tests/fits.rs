//! Curve fitting, error rates and grid indexing.

use approx::assert_relative_eq;
use ndarray::{ArrayD, IxDyn};
use proptest::prelude::*;

use qecsim_analysis::{curve_fit, get_array_indexes, get_error_rate, mono_exp};
use qecsim_sim::CircuitTimes;

// ---------------------------------------------------------------------------
// mono_exp
// ---------------------------------------------------------------------------

#[test]
fn fit_recovers_exponential_decay() {
    let (lifetime, offset, amplitude) = (25e3, 0.1, 0.95);
    let x: Vec<f64> = (0..12).map(|i| 4e3 * f64::from(i)).collect();
    let y: Vec<f64> = x
        .iter()
        .map(|&t| mono_exp(t, lifetime, offset, amplitude))
        .collect();

    let fit = curve_fit(
        |t, p| mono_exp(t, p[0], p[1], p[2]),
        &x,
        &y,
        &[40e3, 0.0, 0.9],
    )
    .unwrap();

    assert_relative_eq!(fit.params[0], lifetime, max_relative = 1e-4);
    assert_relative_eq!(fit.params[1], offset, epsilon = 1e-5);
    assert_relative_eq!(fit.params[2], amplitude, epsilon = 1e-5);
    assert!(fit.residual < 1e-12);
    assert!(fit.variance(0).is_finite());
}

#[test]
fn noisy_fit_reports_variance() {
    let x: Vec<f64> = (1..=10).map(|i| 1e3 * f64::from(i)).collect();
    let y: Vec<f64> = x
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            let wobble = if i % 2 == 0 { 2e-3 } else { -2e-3 };
            mono_exp(t, 8e3, 0.0, 1.0) + wobble
        })
        .collect();

    let fit = curve_fit(|t, p| mono_exp(t, p[0], p[1], p[2]), &x, &y, &[5e3, 0.0, 0.9]).unwrap();
    assert_relative_eq!(fit.params[0], 8e3, max_relative = 0.05);
    assert!(fit.variance(0) > 0.0);
    assert!(fit.covariance.is_square());
}

// ---------------------------------------------------------------------------
// get_error_rate
// ---------------------------------------------------------------------------

#[test]
fn error_rate_per_cycle() {
    let fidelity: Vec<f64> = (0..6).map(|i| 0.98 * (-0.1 * f64::from(i)).exp()).collect();
    let rate = get_error_rate(&fidelity, None).unwrap();
    assert_relative_eq!(rate.theta[1], -0.1, epsilon = 1e-12);
    assert_relative_eq!(rate.theta[0], 0.98f64.ln(), epsilon = 1e-12);
    assert!(rate.mse < 1e-20);
}

#[test]
fn error_rate_per_microsecond() {
    let fidelity: Vec<f64> = (0..5).map(|i| (-0.1 * f64::from(i)).exp()).collect();
    let times = CircuitTimes {
        snapshots: (0..5)
            .map(|i| (format!("dm_{i}"), 2000.0 * f64::from(i)))
            .collect(),
        end: 10_000.0,
    };
    let rate = get_error_rate(&fidelity, Some(&times)).unwrap();
    assert_relative_eq!(rate.theta[1], -0.05, epsilon = 1e-12);
    assert_relative_eq!(rate.theta[0], 0.0, epsilon = 1e-12);
}

#[test]
fn error_rate_needs_schedule_for_every_snapshot() {
    let times = CircuitTimes {
        snapshots: vec![("dm_0".into(), 0.0), ("dm_1".into(), 1.0)],
        end: 2.0,
    };
    assert!(get_error_rate(&[1.0, 0.9, 0.8], Some(&times)).is_err());
}

// ---------------------------------------------------------------------------
// Grid indexing
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn array_indexes_match_row_major(shape in prop::collection::vec(1usize..4, 1..5)) {
        let total: usize = shape.iter().product();
        let grid = ArrayD::from_shape_vec(IxDyn(&shape), (0..total).collect::<Vec<_>>()).unwrap();
        for flat in 0..total {
            let index = get_array_indexes(flat, &shape);
            prop_assert_eq!(grid[IxDyn(&index)], flat);
        }
    }
}
