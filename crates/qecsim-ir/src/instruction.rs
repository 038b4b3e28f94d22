//! Circuit instructions combining operations with operands.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::gate::{Gate, StandardGate};
use crate::noise::{NoiseChannel, NoiseOrigin};
use crate::pauli::PauliString;
use crate::qubit::{ClbitId, QubitId};

/// What a snapshot records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SnapshotKind {
    /// Reduced density matrix of the snapshot qubits.
    DensityMatrix,
    /// Expectation value of a Pauli string over the snapshot qubits.
    ExpectationValue(PauliString),
}

impl SnapshotKind {
    /// Label prefix used for snapshots of this kind (`dm` / `exp`).
    pub fn prefix(&self) -> &'static str {
        match self {
            SnapshotKind::DensityMatrix => "dm",
            SnapshotKind::ExpectationValue(_) => "exp",
        }
    }
}

/// The kind of instruction in a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A quantum gate operation, possibly classically conditioned.
    Gate(Gate),
    /// Measurement of each qubit into the matching classical bit.
    Measure,
    /// Reset qubit to |0⟩.
    Reset,
    /// Barrier (synchronization point).
    Barrier,
    /// Idle for a fixed time.
    Delay {
        /// Duration in nanoseconds.
        duration: f64,
    },
    /// Noise channel applied to each listed qubit.
    NoiseChannel {
        /// The physical process.
        channel: NoiseChannel,
        /// Where the channel came from.
        origin: NoiseOrigin,
    },
    /// Record the state of the listed qubits without disturbing it.
    Snapshot {
        /// Result key.
        label: String,
        /// What to record.
        kind: SnapshotKind,
    },
    /// Discard every run whose classical bits differ from `value`.
    PostSelect {
        /// Expected little-endian value of the instruction's clbits.
        value: u64,
    },
    /// Overwrite the listed qubits with a pure state, tracing out what was there.
    Initialize {
        /// Amplitudes over the listed qubits, qubit `k` of the list at bit `k`.
        amplitudes: Vec<Complex64>,
    },
}

/// A complete instruction with operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The kind of instruction.
    pub kind: InstructionKind,
    /// Qubits this instruction operates on.
    pub qubits: Vec<QubitId>,
    /// Classical bits written (measure) or read (post-select).
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    /// Create a gate instruction.
    pub fn gate(gate: impl Into<Gate>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Gate(gate.into()),
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// Create a single-qubit gate instruction.
    pub fn single_qubit_gate(gate: StandardGate, qubit: QubitId) -> Self {
        Self::gate(gate, [qubit])
    }

    /// Create a two-qubit gate instruction.
    pub fn two_qubit_gate(gate: StandardGate, q1: QubitId, q2: QubitId) -> Self {
        Self::gate(gate, [q1, q2])
    }

    /// Create a measurement instruction.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            clbits: vec![clbit],
        }
    }

    /// Create a multi-qubit measurement instruction.
    ///
    /// Returns an error if the number of qubits and classical bits do not match.
    pub fn measure_all(
        qubits: impl IntoIterator<Item = QubitId>,
        clbits: impl IntoIterator<Item = ClbitId>,
    ) -> crate::error::IrResult<Self> {
        let qubits: Vec<_> = qubits.into_iter().collect();
        let clbits: Vec<_> = clbits.into_iter().collect();
        if qubits.len() != clbits.len() {
            return Err(crate::error::IrError::InvalidDag(format!(
                "measure: qubit count ({}) does not match clbit count ({})",
                qubits.len(),
                clbits.len(),
            )));
        }
        Ok(Self {
            kind: InstructionKind::Measure,
            qubits,
            clbits,
        })
    }

    /// Create a reset instruction.
    pub fn reset(qubit: QubitId) -> Self {
        Self {
            kind: InstructionKind::Reset,
            qubits: vec![qubit],
            clbits: vec![],
        }
    }

    /// Create a barrier instruction.
    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Barrier,
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// Create a delay instruction.
    pub fn delay(qubits: impl IntoIterator<Item = QubitId>, duration: f64) -> Self {
        Self {
            kind: InstructionKind::Delay { duration },
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// Create a noise channel instruction.
    pub fn noise_channel(channel: NoiseChannel, origin: NoiseOrigin, qubit: QubitId) -> Self {
        Self {
            kind: InstructionKind::NoiseChannel { channel, origin },
            qubits: vec![qubit],
            clbits: vec![],
        }
    }

    /// Create a snapshot instruction.
    pub fn snapshot(
        label: impl Into<String>,
        kind: SnapshotKind,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> Self {
        Self {
            kind: InstructionKind::Snapshot {
                label: label.into(),
                kind,
            },
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// Create a post-selection instruction over `clbits`.
    pub fn post_select(clbits: impl IntoIterator<Item = ClbitId>, value: u64) -> Self {
        Self {
            kind: InstructionKind::PostSelect { value },
            qubits: vec![],
            clbits: clbits.into_iter().collect(),
        }
    }

    /// Create a state initialization instruction.
    pub fn initialize(qubits: impl IntoIterator<Item = QubitId>, amplitudes: Vec<Complex64>) -> Self {
        Self {
            kind: InstructionKind::Initialize { amplitudes },
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// Check if this is a noise channel instruction.
    pub fn is_noise_channel(&self) -> bool {
        matches!(self.kind, InstructionKind::NoiseChannel { .. })
    }

    /// Check if this is a gate instruction.
    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    /// Check if this is a classically conditioned gate.
    pub fn is_conditional(&self) -> bool {
        matches!(&self.kind, InstructionKind::Gate(g) if g.is_conditional())
    }

    /// Check if this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    /// Check if this is a reset.
    pub fn is_reset(&self) -> bool {
        matches!(self.kind, InstructionKind::Reset)
    }

    /// Check if this is a barrier.
    pub fn is_barrier(&self) -> bool {
        matches!(self.kind, InstructionKind::Barrier)
    }

    /// Check if this is a snapshot.
    pub fn is_snapshot(&self) -> bool {
        matches!(self.kind, InstructionKind::Snapshot { .. })
    }

    /// Get the gate if this is a gate instruction.
    pub fn as_gate(&self) -> Option<&Gate> {
        match &self.kind {
            InstructionKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    /// Classical bits whose values this instruction depends on.
    pub fn reads(&self) -> Vec<ClbitId> {
        match &self.kind {
            InstructionKind::Gate(g) => g
                .condition
                .as_ref()
                .map(|c| c.clbits.clone())
                .unwrap_or_default(),
            InstructionKind::PostSelect { .. } => self.clbits.clone(),
            _ => vec![],
        }
    }

    /// Classical bits this instruction overwrites.
    pub fn writes(&self) -> &[ClbitId] {
        match self.kind {
            InstructionKind::Measure => &self.clbits,
            _ => &[],
        }
    }

    /// Get the name of the instruction.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Reset => "reset",
            InstructionKind::Barrier => "barrier",
            InstructionKind::Delay { .. } => "delay",
            InstructionKind::NoiseChannel { origin, .. } => match origin {
                NoiseOrigin::Gate => "noise_gate",
                NoiseOrigin::Idle => "noise_idle",
                NoiseOrigin::Explicit => "noise",
            },
            InstructionKind::Snapshot { .. } => "snapshot",
            InstructionKind::PostSelect { .. } => "post_select",
            InstructionKind::Initialize { .. } => "initialize",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::ClassicalCondition;

    #[test]
    fn test_gate_instruction() {
        let inst = Instruction::single_qubit_gate(StandardGate::H, QubitId(0));
        assert!(inst.is_gate());
        assert!(!inst.is_conditional());
        assert_eq!(inst.qubits.len(), 1);
        assert_eq!(inst.name(), "h");
    }

    #[test]
    fn test_measure_instruction() {
        let inst = Instruction::measure(QubitId(5), ClbitId(2));
        assert!(inst.is_measure());
        assert_eq!(inst.writes(), &[ClbitId(2)]);
        assert!(inst.reads().is_empty());
    }

    #[test]
    fn test_measure_all_mismatch() {
        assert!(Instruction::measure_all([QubitId(0), QubitId(1)], [ClbitId(0)]).is_err());
    }

    #[test]
    fn test_conditional_gate_reads_condition_bits() {
        let cond = ClassicalCondition::new("syndrome_cycle_0", vec![ClbitId(0), ClbitId(1)], 3);
        let inst = Instruction::gate(
            Gate::standard(StandardGate::X).with_condition(cond),
            [QubitId(2)],
        );
        assert!(inst.is_conditional());
        assert_eq!(inst.reads(), vec![ClbitId(0), ClbitId(1)]);
        assert!(inst.writes().is_empty());
    }

    #[test]
    fn test_post_select_reads_its_bits() {
        let inst = Instruction::post_select([ClbitId(4), ClbitId(5)], 0);
        assert_eq!(inst.name(), "post_select");
        assert_eq!(inst.reads(), vec![ClbitId(4), ClbitId(5)]);
    }

    #[test]
    fn test_noise_channel_instruction() {
        let inst = Instruction::noise_channel(
            NoiseChannel::ThermalRelaxation {
                t1: 40e3,
                t2: 60e3,
                time: 100.0,
            },
            NoiseOrigin::Idle,
            QubitId(3),
        );
        assert!(inst.is_noise_channel());
        assert_eq!(inst.name(), "noise_idle");
    }

    #[test]
    fn test_snapshot_prefix() {
        let inst = Instruction::snapshot("dm_0", SnapshotKind::DensityMatrix, [QubitId(0)]);
        assert!(inst.is_snapshot());
        assert_eq!(SnapshotKind::DensityMatrix.prefix(), "dm");
        let exp = SnapshotKind::ExpectationValue("ZZZZZ".parse().unwrap());
        assert_eq!(exp.prefix(), "exp");
    }
}
