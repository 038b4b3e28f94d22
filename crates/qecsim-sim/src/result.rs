//! Simulation results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::density_matrix::DensityMatrix;
use crate::simulator::SimulationMethod;

/// Measurement counts keyed by bitstring.
///
/// Character `k` of a key is the `k`-th readout bit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts(BTreeMap<String, u64>);

impl Counts {
    /// Create empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.0.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Occurrences of `bitstring`.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.0.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of recorded outcomes.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(bitstring, count)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.0.iter()
    }

    /// Relative frequencies.
    #[allow(clippy::cast_precision_loss)]
    pub fn probabilities(&self) -> BTreeMap<String, f64> {
        let total = self.total().max(1) as f64;
        self.0
            .iter()
            .map(|(k, &v)| (k.clone(), v as f64 / total))
            .collect()
    }
}

/// Recorded snapshot value.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotValue {
    /// Reduced density matrix of the snapshot qubits.
    DensityMatrix(DensityMatrix),
    /// Pauli expectation value.
    Expectation(f64),
}

/// A snapshot together with how often it was reached.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRecord {
    /// The recorded value, averaged over the surviving ensemble.
    pub value: SnapshotValue,
    /// Probability that a run survived every post-selection before the
    /// snapshot.
    pub probability: f64,
}

impl SnapshotRecord {
    /// The density matrix, if this is a density matrix snapshot.
    pub fn density_matrix(&self) -> Option<&DensityMatrix> {
        match &self.value {
            SnapshotValue::DensityMatrix(dm) => Some(dm),
            SnapshotValue::Expectation(_) => None,
        }
    }

    /// The expectation value, if this is an expectation snapshot.
    pub fn expectation(&self) -> Option<f64> {
        match self.value {
            SnapshotValue::Expectation(v) => Some(v),
            SnapshotValue::DensityMatrix(_) => None,
        }
    }
}

/// Result of running a circuit.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Readout counts.
    pub counts: Counts,
    /// Number of shots requested.
    pub shots: u32,
    /// Snapshots by label.
    pub data: BTreeMap<String, SnapshotRecord>,
    /// Wall-clock execution time.
    pub execution_time_ms: u64,
    /// How the circuit was simulated.
    pub method: SimulationMethod,
}

impl ExecutionResult {
    /// Snapshot `label`.
    pub fn snapshot(&self, label: &str) -> Option<&SnapshotRecord> {
        self.data.get(label)
    }
}
