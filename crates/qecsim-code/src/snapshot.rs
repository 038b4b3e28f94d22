//! Labelled snapshots of the code block.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use qecsim_ir::{Circuit, ClbitId, PauliString, QubitId};

use crate::error::{CodeError, CodeResult};

/// What a snapshot records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotType {
    /// Reduced density matrix.
    #[default]
    #[serde(alias = "density_matrix")]
    Dm,
    /// Pauli expectation value.
    #[serde(alias = "expectation_value")]
    Exp,
}

impl SnapshotType {
    /// Label prefix, `dm` or `exp`.
    pub fn prefix(self) -> &'static str {
        match self {
            SnapshotType::Dm => "dm",
            SnapshotType::Exp => "exp",
        }
    }

    /// Label of snapshot `index`, e.g. `dm_3`.
    pub fn label(self, index: usize) -> String {
        format!("{}_{index}", self.prefix())
    }
}

impl fmt::Display for SnapshotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for SnapshotType {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dm" | "density_matrix" => Ok(SnapshotType::Dm),
            "exp" | "expectation_value" => Ok(SnapshotType::Exp),
            other => Err(CodeError::InvalidOptions(format!(
                "unknown snapshot type '{other}', expected 'dm' or 'exp'"
            ))),
        }
    }
}

/// Append snapshot `index` over `qubits`.
///
/// `pauli` is only used for expectation snapshots. With `post_select` the
/// snapshot keeps only runs where those bits read zero.
pub fn add_snapshot(
    circuit: &mut Circuit,
    kind: SnapshotType,
    index: usize,
    qubits: &[QubitId],
    pauli: &PauliString,
    include_barriers: bool,
    post_select: Option<&[ClbitId]>,
) -> CodeResult<()> {
    if include_barriers {
        circuit.barrier_all()?;
    }
    if let Some(clbits) = post_select {
        circuit.post_select(clbits.iter().copied(), 0)?;
    }
    let label = kind.label(index);
    match kind {
        SnapshotType::Dm => circuit.snapshot_density_matrix(label, qubits.iter().copied())?,
        SnapshotType::Exp => {
            circuit.snapshot_expectation(label, pauli.clone(), qubits.iter().copied())?
        }
    };
    if include_barriers {
        circuit.barrier_all()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qecsim_ir::InstructionKind;

    #[test]
    fn test_labels_and_parsing() {
        assert_eq!(SnapshotType::Dm.label(0), "dm_0");
        assert_eq!(SnapshotType::Exp.label(12), "exp_12");
        assert_eq!("EXP".parse::<SnapshotType>().unwrap(), SnapshotType::Exp);
        assert!("trace".parse::<SnapshotType>().is_err());
        let parsed: SnapshotType = serde_json::from_str("\"density_matrix\"").unwrap();
        assert_eq!(parsed, SnapshotType::Dm);
    }

    #[test]
    fn test_post_select_precedes_snapshot() {
        let mut circuit = Circuit::with_size("s", 2, 1);
        let pauli: PauliString = "ZZ".parse().unwrap();
        add_snapshot(
            &mut circuit,
            SnapshotType::Exp,
            1,
            &[QubitId(0), QubitId(1)],
            &pauli,
            true,
            Some(&[ClbitId(0)]),
        )
        .unwrap();
        let kinds: Vec<&str> = circuit
            .instructions()
            .unwrap()
            .iter()
            .map(|inst| match &inst.kind {
                InstructionKind::Barrier => "barrier",
                InstructionKind::PostSelect { .. } => "post_select",
                InstructionKind::Snapshot { .. } => "snapshot",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["barrier", "post_select", "snapshot", "barrier"]);
    }
}
