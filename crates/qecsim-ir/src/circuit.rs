//! High-level circuit builder API.

use num_complex::Complex64;

use crate::dag::CircuitDag;
use crate::error::{IrError, IrResult};
use crate::gate::{ClassicalCondition, Gate, StandardGate};
use crate::instruction::{Instruction, InstructionKind, SnapshotKind};
use crate::noise::{NoiseChannel, NoiseOrigin};
use crate::pauli::PauliString;
use crate::qubit::{Clbit, ClbitId, Qubit, QubitId};

/// Tolerance on the norm of an initial statevector.
const NORM_TOLERANCE: f64 = 1e-6;

/// A quantum circuit.
///
/// Builder methods validate their operands and return `&mut Self` so calls
/// chain with `?`. Qubits and classical bits are numbered in the order they
/// are added, across registers.
#[derive(Debug, Clone)]
pub struct Circuit {
    name: String,
    qubits: Vec<Qubit>,
    clbits: Vec<Clbit>,
    qregs: Vec<(String, Vec<QubitId>)>,
    cregs: Vec<(String, Vec<ClbitId>)>,
    dag: CircuitDag,
    next_qubit_id: u32,
    next_clbit_id: u32,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            qregs: vec![],
            cregs: vec![],
            dag: CircuitDag::new(),
            next_qubit_id: 0,
            next_clbit_id: 0,
        }
    }

    /// Create a circuit with registers `q` and `c` of the given sizes.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        if num_qubits > 0 {
            circuit.add_qreg("q", num_qubits);
        }
        if num_clbits > 0 {
            circuit.add_creg("c", num_clbits);
        }
        circuit
    }

    /// A circuit with the same name, bits and registers but no operations.
    pub fn copy_empty(&self) -> Self {
        let mut dag = CircuitDag::new();
        for q in &self.qubits {
            dag.add_qubit(q.id);
        }
        for c in &self.clbits {
            dag.add_clbit(c.id);
        }
        Self {
            name: self.name.clone(),
            qubits: self.qubits.clone(),
            clbits: self.clbits.clone(),
            qregs: self.qregs.clone(),
            cregs: self.cregs.clone(),
            dag,
            next_qubit_id: self.next_qubit_id,
            next_clbit_id: self.next_clbit_id,
        }
    }

    /// Add a quantum register with multiple qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> Vec<QubitId> {
        let name = name.into();
        let mut ids = vec![];
        for i in 0..size {
            let id = QubitId(self.next_qubit_id);
            self.next_qubit_id += 1;
            self.qubits.push(Qubit::with_register(id, &name, i));
            self.dag.add_qubit(id);
            ids.push(id);
        }
        self.qregs.push((name, ids.clone()));
        ids
    }

    /// Add a classical register with multiple bits.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> Vec<ClbitId> {
        let name = name.into();
        let mut ids = vec![];
        for i in 0..size {
            let id = ClbitId(self.next_clbit_id);
            self.next_clbit_id += 1;
            self.clbits.push(Clbit::with_register(id, &name, i));
            self.dag.add_clbit(id);
            ids.push(id);
        }
        self.cregs.push((name, ids.clone()));
        ids
    }

    /// Qubits of the named quantum register.
    pub fn qreg(&self, name: &str) -> IrResult<Vec<QubitId>> {
        self.qregs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, ids)| ids.clone())
            .ok_or_else(|| IrError::RegisterNotFound(name.to_string()))
    }

    /// Bits of the named classical register, least significant first.
    pub fn creg(&self, name: &str) -> IrResult<Vec<ClbitId>> {
        self.cregs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, ids)| ids.clone())
            .ok_or_else(|| IrError::RegisterNotFound(name.to_string()))
    }

    /// Append an instruction after checking the operands the DAG cannot see.
    pub fn append(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        validate_payload(&instruction)?;
        self.dag.apply(instruction)?;
        Ok(self)
    }

    fn single(&mut self, gate: StandardGate, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(gate, qubit))
    }

    fn pair(&mut self, gate: StandardGate, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::two_qubit_gate(gate, q1, q2))
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply the identity gate.
    pub fn i(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::I, qubit)
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::X, qubit)
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::Y, qubit)
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::Z, qubit)
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::H, qubit)
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::S, qubit)
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::Sdg, qubit)
    }

    /// Apply sqrt(X) gate.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::SX, qubit)
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::Rx(theta), qubit)
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::Ry(theta), qubit)
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::Rz(theta), qubit)
    }

    /// Apply universal U gate.
    pub fn u(&mut self, theta: f64, phi: f64, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::U(theta, phi, lambda), qubit)
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.pair(StandardGate::CX, control, target)
    }

    /// Apply controlled-Y gate.
    pub fn cy(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.pair(StandardGate::CY, control, target)
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.pair(StandardGate::CZ, control, target)
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.pair(StandardGate::Swap, q1, q2)
    }

    /// Apply iSWAP gate.
    pub fn iswap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.pair(StandardGate::ISwap, q1, q2)
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Apply an arbitrary gate.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::gate(gate, qubits))
    }

    /// Apply `gate` only when the bits of `register` equal `value`.
    pub fn gate_if(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
        register: &str,
        value: u64,
    ) -> IrResult<&mut Self> {
        let clbits = self.creg(register)?;
        let condition = ClassicalCondition::new(register, clbits, value);
        self.append(Instruction::gate(
            Gate::standard(gate).with_condition(condition),
            qubits,
        ))
    }

    /// Measure a qubit to a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.append(Instruction::measure(qubit, clbit))
    }

    /// Measure each qubit into the matching classical bit.
    pub fn measure_many(
        &mut self,
        qubits: impl IntoIterator<Item = QubitId>,
        clbits: impl IntoIterator<Item = ClbitId>,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::measure_all(qubits, clbits)?)
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::reset(qubit))
    }

    /// Apply a barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.append(Instruction::barrier(qubits))
    }

    /// Apply a barrier to all qubits.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits = self.qubit_ids();
        self.append(Instruction::barrier(qubits))
    }

    /// Idle the listed qubits for `duration` nanoseconds.
    pub fn delay(
        &mut self,
        qubits: impl IntoIterator<Item = QubitId>,
        duration: f64,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::delay(qubits, duration))
    }

    /// Apply a noise channel to a qubit.
    pub fn noise(
        &mut self,
        channel: NoiseChannel,
        qubit: QubitId,
        origin: NoiseOrigin,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::noise_channel(channel, origin, qubit))
    }

    /// Record the reduced density matrix of `qubits` under `label`.
    pub fn snapshot_density_matrix(
        &mut self,
        label: impl Into<String>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::snapshot(
            label,
            SnapshotKind::DensityMatrix,
            qubits,
        ))
    }

    /// Record the expectation value of `pauli` over `qubits` under `label`.
    pub fn snapshot_expectation(
        &mut self,
        label: impl Into<String>,
        pauli: PauliString,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::snapshot(
            label,
            SnapshotKind::ExpectationValue(pauli),
            qubits,
        ))
    }

    /// Keep only runs in which `clbits` read `value`.
    pub fn post_select(
        &mut self,
        clbits: impl IntoIterator<Item = ClbitId>,
        value: u64,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::post_select(clbits, value))
    }

    /// Replace the state of `qubits` with the pure state `amplitudes`.
    pub fn initialize(
        &mut self,
        qubits: impl IntoIterator<Item = QubitId>,
        amplitudes: Vec<Complex64>,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::initialize(qubits, amplitudes))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Get the number of operations.
    pub fn num_ops(&self) -> usize {
        self.dag.num_ops()
    }

    /// Get the circuit depth.
    pub fn depth(&self) -> IrResult<usize> {
        self.dag.depth()
    }

    /// Get a reference to the underlying DAG.
    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    /// Instructions in execution order.
    pub fn instructions(&self) -> IrResult<Vec<&Instruction>> {
        Ok(self
            .dag
            .topological_ops()?
            .into_iter()
            .map(|(_, inst)| inst)
            .collect())
    }

    /// Get the qubits in the circuit.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Get the classical bits in the circuit.
    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    /// All qubit ids in order.
    pub fn qubit_ids(&self) -> Vec<QubitId> {
        self.qubits.iter().map(|q| q.id).collect()
    }

    /// Quantum registers in the order they were added.
    pub fn qregs(&self) -> &[(String, Vec<QubitId>)] {
        &self.qregs
    }

    /// Classical registers in the order they were added.
    pub fn cregs(&self) -> &[(String, Vec<ClbitId>)] {
        &self.cregs
    }
}

fn fits(value: u64, width: usize) -> bool {
    width >= 64 || value < (1u64 << width)
}

/// Checks on instruction payloads that do not depend on circuit wiring.
fn validate_payload(instruction: &Instruction) -> IrResult<()> {
    match &instruction.kind {
        InstructionKind::Gate(gate) => {
            if let Some(cond) = &gate.condition {
                if !fits(cond.value, cond.clbits.len()) {
                    return Err(IrError::ValueOutOfRange {
                        value: cond.value,
                        width: cond.clbits.len(),
                    });
                }
            }
        }
        InstructionKind::Delay { duration } => {
            if !duration.is_finite() || *duration < 0.0 {
                return Err(IrError::InvalidDuration(*duration));
            }
        }
        InstructionKind::NoiseChannel { channel, .. } => channel.validate()?,
        InstructionKind::Snapshot {
            kind: SnapshotKind::ExpectationValue(pauli),
            ..
        } => {
            if pauli.len() != instruction.qubits.len() {
                return Err(IrError::InvalidPauli {
                    text: pauli.to_string(),
                    reason: format!(
                        "length {} does not match {} snapshot qubits",
                        pauli.len(),
                        instruction.qubits.len()
                    ),
                });
            }
        }
        InstructionKind::PostSelect { value } => {
            if !fits(*value, instruction.clbits.len()) {
                return Err(IrError::ValueOutOfRange {
                    value: *value,
                    width: instruction.clbits.len(),
                });
            }
        }
        InstructionKind::Initialize { amplitudes } => {
            let k = instruction.qubits.len();
            if k == 0 || amplitudes.len() != 1usize << k {
                return Err(IrError::InvalidState(format!(
                    "{} amplitudes for {k} qubits",
                    amplitudes.len()
                )));
            }
            let norm: f64 = amplitudes.iter().map(Complex64::norm_sqr).sum();
            if (norm - 1.0).abs() > NORM_TOLERANCE {
                return Err(IrError::InvalidState(format!(
                    "squared norm {norm:.6} is not 1"
                )));
            }
        }
        InstructionKind::Measure
        | InstructionKind::Reset
        | InstructionKind::Barrier
        | InstructionKind::Snapshot { .. } => {}
    }
    Ok(())
}
