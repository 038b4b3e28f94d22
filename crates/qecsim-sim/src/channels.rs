//! Kraus representations of the single-qubit noise channels.

use num_complex::Complex64;

use qecsim_ir::NoiseChannel;

use crate::error::{SimError, SimResult};
use crate::gates::{Matrix2, dagger2, identity2, mul2, pauli_x, pauli_y, pauli_z};

fn real(v: f64) -> Complex64 {
    Complex64::new(v, 0.0)
}

fn scaled(m: Matrix2, factor: f64) -> Matrix2 {
    m.map(|row| row.map(|v| v * factor))
}

/// Kraus operators {|0⟩⟨0|, |0⟩⟨1|} of a reset to |0⟩.
pub fn reset_kraus() -> Vec<Matrix2> {
    let zero = real(0.0);
    vec![
        [[real(1.0), zero], [zero, zero]],
        [[zero, real(1.0)], [zero, zero]],
    ]
}

fn amplitude_damping(gamma: f64) -> Vec<Matrix2> {
    let zero = real(0.0);
    vec![
        [[real(1.0), zero], [zero, real((1.0 - gamma).sqrt())]],
        [[zero, real(gamma.sqrt())], [zero, zero]],
    ]
}

fn phase_damping(lambda: f64) -> Vec<Matrix2> {
    let zero = real(0.0);
    vec![
        [[real(1.0), zero], [zero, real((1.0 - lambda).sqrt())]],
        [[zero, zero], [zero, real(lambda.sqrt())]],
    ]
}

/// Damping parameters (γ, λ) of thermal relaxation over `time`.
///
/// γ = 1 − e^{−t/T1} and λ = 1 − e^{−2t/Tφ} with 1/Tφ = 1/T2 − 1/(2T1).
pub fn thermal_relaxation_parameters(t1: f64, t2: f64, time: f64) -> (f64, f64) {
    let gamma = 1.0 - (-time / t1).exp();
    let dephasing_rate = (1.0 / t2 - 1.0 / (2.0 * t1)).max(0.0);
    let lambda = 1.0 - (-2.0 * time * dephasing_rate).exp();
    (gamma, lambda)
}

/// Kraus operators of a noise channel.
pub fn kraus_operators(channel: &NoiseChannel) -> SimResult<Vec<Matrix2>> {
    channel.validate().map_err(SimError::from)?;
    let ops = match channel {
        NoiseChannel::Depolarizing { p } => vec![
            scaled(identity2(), (1.0 - 0.75 * p).sqrt()),
            scaled(pauli_x(), (p / 4.0).sqrt()),
            scaled(pauli_y(), (p / 4.0).sqrt()),
            scaled(pauli_z(), (p / 4.0).sqrt()),
        ],
        NoiseChannel::AmplitudeDamping { gamma } => amplitude_damping(*gamma),
        NoiseChannel::PhaseDamping { lambda } => phase_damping(*lambda),
        NoiseChannel::BitFlip { p } => vec![
            scaled(identity2(), (1.0 - p).sqrt()),
            scaled(pauli_x(), p.sqrt()),
        ],
        NoiseChannel::PhaseFlip { p } => vec![
            scaled(identity2(), (1.0 - p).sqrt()),
            scaled(pauli_z(), p.sqrt()),
        ],
        NoiseChannel::ThermalRelaxation { t1, t2, time } => {
            let (gamma, lambda) = thermal_relaxation_parameters(*t1, *t2, *time);
            // Amplitude damping first, then dephasing: K = P_j · A_i.
            let mut ops = Vec::with_capacity(4);
            for a in amplitude_damping(gamma) {
                for p in phase_damping(lambda) {
                    let k = mul2(&p, &a);
                    if k.iter().flatten().any(|v| v.norm() > 0.0) {
                        ops.push(k);
                    }
                }
            }
            ops
        }
        other => {
            return Err(SimError::InvalidNoiseModel(format!(
                "no Kraus form for {other}"
            )));
        }
    };
    Ok(ops)
}

/// Whether Σ K†K = I within `tol`.
pub fn is_trace_preserving(kraus: &[Matrix2], tol: f64) -> bool {
    let mut sum = [[real(0.0); 2]; 2];
    for k in kraus {
        let p = mul2(&dagger2(k), k);
        for r in 0..2 {
            for c in 0..2 {
                sum[r][c] += p[r][c];
            }
        }
    }
    let id = identity2();
    (0..2).all(|r| (0..2).all(|c| (sum[r][c] - id[r][c]).norm() <= tol))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_is_trace_preserving() {
        assert!(is_trace_preserving(&reset_kraus(), 1e-12));
    }

    #[test]
    fn test_thermal_relaxation_parameters() {
        let (gamma, lambda) = thermal_relaxation_parameters(40e3, 60e3, 0.0);
        assert_eq!(gamma, 0.0);
        assert_eq!(lambda, 0.0);

        // T2 = 2 T1 is pure amplitude damping.
        let (_, lambda) = thermal_relaxation_parameters(40e3, 80e3, 1000.0);
        assert!(lambda.abs() < 1e-15);
    }

    #[test]
    fn test_invalid_channel_rejected() {
        let channel = NoiseChannel::ThermalRelaxation {
            t1: 10.0,
            t2: 30.0,
            time: 1.0,
        };
        assert!(kraus_operators(&channel).is_err());
    }

    #[test]
    fn test_every_channel_trace_preserving() {
        let channels = [
            NoiseChannel::Depolarizing { p: 0.2 },
            NoiseChannel::AmplitudeDamping { gamma: 0.3 },
            NoiseChannel::PhaseDamping { lambda: 0.4 },
            NoiseChannel::BitFlip { p: 0.1 },
            NoiseChannel::PhaseFlip { p: 0.9 },
            NoiseChannel::ThermalRelaxation {
                t1: 40e3,
                t2: 60e3,
                time: 5000.0,
            },
        ];
        for channel in &channels {
            let ops = kraus_operators(channel).unwrap();
            assert!(is_trace_preserving(&ops, 1e-12), "{channel}");
        }
    }
}
