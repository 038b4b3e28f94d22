//! Noise channel types.
//!
//! Noise is a first-class instruction in the IR. A channel instruction is
//! tagged with its [`NoiseOrigin`] so that passes and reports can tell gate
//! errors apart from decoherence accumulated while a qubit waits.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};

/// A single-qubit noise channel.
///
/// Time constants and durations share one unit, nanoseconds throughout
/// this workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum NoiseChannel {
    /// Depolarizing channel: with probability `p`, replaces the state
    /// with the maximally mixed state.
    Depolarizing {
        /// Error probability (0.0 to 1.0).
        p: f64,
    },

    /// Amplitude damping: energy relaxation towards |0⟩.
    AmplitudeDamping {
        /// Damping parameter (0.0 to 1.0).
        gamma: f64,
    },

    /// Phase damping: dephasing without energy loss.
    PhaseDamping {
        /// Dephasing parameter (0.0 to 1.0).
        lambda: f64,
    },

    /// Bit-flip channel: flips |0⟩ ↔ |1⟩ with probability `p`.
    BitFlip {
        /// Flip probability (0.0 to 1.0).
        p: f64,
    },

    /// Phase-flip channel: applies Z with probability `p`.
    PhaseFlip {
        /// Flip probability (0.0 to 1.0).
        p: f64,
    },

    /// Thermal relaxation over `time` for a qubit with the given T1 and T2.
    ///
    /// Assumes zero excited-state population at equilibrium.
    ThermalRelaxation {
        /// Energy relaxation time.
        t1: f64,
        /// Dephasing time, at most `2 * t1`.
        t2: f64,
        /// Duration the channel acts for.
        time: f64,
    },
}

impl NoiseChannel {
    /// Build a thermal relaxation channel, checking `t2 <= 2 * t1`.
    pub fn thermal_relaxation(t1: f64, t2: f64, time: f64) -> IrResult<Self> {
        let channel = NoiseChannel::ThermalRelaxation { t1, t2, time };
        channel.validate()?;
        Ok(channel)
    }

    /// Get a human-readable name for this channel.
    pub fn name(&self) -> &str {
        match self {
            NoiseChannel::Depolarizing { .. } => "depolarizing",
            NoiseChannel::AmplitudeDamping { .. } => "amplitude_damping",
            NoiseChannel::PhaseDamping { .. } => "phase_damping",
            NoiseChannel::BitFlip { .. } => "bit_flip",
            NoiseChannel::PhaseFlip { .. } => "phase_flip",
            NoiseChannel::ThermalRelaxation { .. } => "thermal_relaxation",
        }
    }

    /// Check that the parameters describe a physical channel.
    pub fn validate(&self) -> IrResult<()> {
        let invalid = |reason: String| IrError::InvalidChannel {
            channel: self.to_string(),
            reason,
        };
        match self {
            NoiseChannel::Depolarizing { p }
            | NoiseChannel::BitFlip { p }
            | NoiseChannel::PhaseFlip { p } => {
                if !(0.0..=1.0).contains(p) {
                    return Err(invalid(format!("probability {p} outside [0, 1]")));
                }
            }
            NoiseChannel::AmplitudeDamping { gamma: x } | NoiseChannel::PhaseDamping { lambda: x } => {
                if !(0.0..=1.0).contains(x) {
                    return Err(invalid(format!("parameter {x} outside [0, 1]")));
                }
            }
            NoiseChannel::ThermalRelaxation { t1, t2, time } => {
                if *t1 <= 0.0 || *t2 <= 0.0 {
                    return Err(invalid("T1 and T2 must be positive".into()));
                }
                if *t2 > 2.0 * *t1 {
                    return Err(invalid(format!("T2 = {t2} exceeds 2*T1 = {}", 2.0 * t1)));
                }
                if *time < 0.0 {
                    return Err(invalid(format!("negative duration {time}")));
                }
            }
        }
        Ok(())
    }

    /// Whether the channel acts as the identity.
    pub fn is_identity(&self) -> bool {
        match self {
            NoiseChannel::Depolarizing { p }
            | NoiseChannel::BitFlip { p }
            | NoiseChannel::PhaseFlip { p } => *p == 0.0,
            NoiseChannel::AmplitudeDamping { gamma } => *gamma == 0.0,
            NoiseChannel::PhaseDamping { lambda } => *lambda == 0.0,
            NoiseChannel::ThermalRelaxation { time, .. } => *time == 0.0,
        }
    }
}

impl std::fmt::Display for NoiseChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoiseChannel::Depolarizing { p } => write!(f, "depolarizing(p={p:.4})"),
            NoiseChannel::AmplitudeDamping { gamma } => {
                write!(f, "amplitude_damping(γ={gamma:.4})")
            }
            NoiseChannel::PhaseDamping { lambda } => write!(f, "phase_damping(λ={lambda:.4})"),
            NoiseChannel::BitFlip { p } => write!(f, "bit_flip(p={p:.4})"),
            NoiseChannel::PhaseFlip { p } => write!(f, "phase_flip(p={p:.4})"),
            NoiseChannel::ThermalRelaxation { t1, t2, time } => {
                write!(f, "thermal_relaxation(T1={t1}, T2={t2}, t={time})")
            }
        }
    }
}

/// Where a noise channel instruction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoiseOrigin {
    /// Error attached to a gate or measurement by a noise model.
    Gate,
    /// Decoherence while the qubit waits for others.
    Idle,
    /// Placed explicitly when building the circuit.
    Explicit,
}

impl std::fmt::Display for NoiseOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoiseOrigin::Gate => write!(f, "gate"),
            NoiseOrigin::Idle => write!(f, "idle"),
            NoiseOrigin::Explicit => write!(f, "explicit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_channel_names() {
        assert_eq!(NoiseChannel::Depolarizing { p: 0.01 }.name(), "depolarizing");
        assert_eq!(
            NoiseChannel::AmplitudeDamping { gamma: 0.02 }.name(),
            "amplitude_damping"
        );
        assert_eq!(
            NoiseChannel::ThermalRelaxation {
                t1: 40e3,
                t2: 60e3,
                time: 20.0
            }
            .name(),
            "thermal_relaxation"
        );
    }

    #[test]
    fn test_noise_channel_display() {
        let m = NoiseChannel::Depolarizing { p: 0.03 };
        assert_eq!(format!("{m}"), "depolarizing(p=0.0300)");
    }

    #[test]
    fn test_thermal_relaxation_rejects_t2_above_twice_t1() {
        assert!(NoiseChannel::thermal_relaxation(40e3, 80e3, 10.0).is_ok());
        let err = NoiseChannel::thermal_relaxation(40e3, 80_001.0, 10.0).unwrap_err();
        assert!(matches!(err, IrError::InvalidChannel { .. }));
    }

    #[test]
    fn test_thermal_relaxation_rejects_negative_time() {
        assert!(NoiseChannel::thermal_relaxation(40e3, 60e3, -1.0).is_err());
    }

    #[test]
    fn test_probability_range() {
        assert!(NoiseChannel::BitFlip { p: 1.5 }.validate().is_err());
        assert!(NoiseChannel::PhaseDamping { lambda: 0.5 }.validate().is_ok());
    }

    #[test]
    fn test_identity_channels() {
        assert!(NoiseChannel::BitFlip { p: 0.0 }.is_identity());
        assert!(
            NoiseChannel::ThermalRelaxation {
                t1: 1.0,
                t2: 1.0,
                time: 0.0
            }
            .is_identity()
        );
        assert!(!NoiseChannel::Depolarizing { p: 0.1 }.is_identity());
    }

    #[test]
    fn test_origin_display() {
        assert_eq!(format!("{}", NoiseOrigin::Idle), "idle");
        assert_eq!(format!("{}", NoiseOrigin::Gate), "gate");
    }
}
