//! Gate durations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::error::{SimError, SimResult};

/// Gate durations in nanoseconds.
///
/// Gates without a custom entry take the single- or two-qubit default by
/// arity. Besides gate names, the table carries the non-gate keys
/// `measure`, `reset` and `feedback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateTimes {
    /// Duration of single-qubit gates without a custom entry.
    pub single_qubit_default: f64,
    /// Duration of two-qubit gates without a custom entry.
    pub two_qubit_default: f64,
    /// Per-name overrides.
    #[serde(default)]
    pub custom: BTreeMap<String, f64>,
}

impl GateTimes {
    /// Create a table from defaults and overrides.
    pub fn new(
        single_qubit_default: f64,
        two_qubit_default: f64,
        custom: impl IntoIterator<Item = (String, f64)>,
    ) -> Self {
        Self {
            single_qubit_default,
            two_qubit_default,
            custom: custom.into_iter().collect(),
        }
    }

    /// The standard (WACQT target) times.
    pub fn wacqt() -> Self {
        Self::new(
            20.0,
            100.0,
            [
                ("u1", 0.0),
                ("z", 0.0),
                ("rz", 0.0),
                ("measure", 300.0),
                ("feedback", 350.0),
                ("reset", 0.0),
            ]
            .map(|(k, v)| (k.to_string(), v)),
        )
    }

    /// These times with `custom` entries merged on top.
    ///
    /// The keys `single_qubit_gate` and `two_qubit_gate` replace the
    /// defaults rather than adding a gate entry.
    #[must_use]
    pub fn get_gate_times(&self, custom: &BTreeMap<String, f64>) -> Self {
        let mut merged = self.clone();
        for (name, &value) in custom {
            match name.as_str() {
                "single_qubit_gate" => merged.single_qubit_default = value,
                "two_qubit_gate" => merged.two_qubit_default = value,
                _ => {
                    merged.custom.insert(name.clone(), value);
                }
            }
        }
        merged
    }

    /// Duration of a named operation acting on `num_qubits` qubits.
    pub fn get(&self, name: &str, num_qubits: usize) -> f64 {
        if let Some(&t) = self.custom.get(name) {
            return t;
        }
        if num_qubits >= 2 {
            self.two_qubit_default
        } else {
            self.single_qubit_default
        }
    }

    /// Duration of a single-qubit gate such as `x`.
    pub fn single_qubit(&self) -> f64 {
        self.get("x", 1)
    }

    /// Duration of a two-qubit gate such as `cz`.
    pub fn two_qubit(&self) -> f64 {
        self.get("cz", 2)
    }

    /// Measurement duration.
    pub fn measure(&self) -> f64 {
        self.get("measure", 1)
    }

    /// Classical feedback latency before conditional recovery.
    pub fn feedback(&self) -> f64 {
        self.get("feedback", 1)
    }

    /// Reset duration.
    pub fn reset(&self) -> f64 {
        self.get("reset", 1)
    }

    /// Check every duration is finite and non-negative.
    pub fn validate(&self) -> SimResult<()> {
        let named = [
            ("single_qubit_gate", self.single_qubit_default),
            ("two_qubit_gate", self.two_qubit_default),
        ];
        for (name, value) in named
            .iter()
            .map(|(n, v)| (*n, *v))
            .chain(self.custom.iter().map(|(n, v)| (n.as_str(), *v)))
        {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::InvalidGateTime {
                    name: name.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }

    /// These times if valid, otherwise the standard times with a warning.
    #[must_use]
    pub fn validated_or_default(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(e) => {
                warn!(error = %e, "Invalid gate times, assuming WACQT gate times");
                Self::wacqt()
            }
        }
    }
}

impl Default for GateTimes {
    fn default() -> Self {
        Self::wacqt()
    }
}
