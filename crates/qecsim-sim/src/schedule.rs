//! ASAP scheduling and idle-noise insertion.
//!
//! Every operation starts as soon as all its qubits and classical bits are
//! free. Barriers and snapshots start together on all their qubits, so a
//! snapshot observes every listed qubit at the same instant.

use serde::{Deserialize, Serialize};
use tracing::debug;

use qecsim_ir::{Circuit, Instruction, InstructionKind, NoiseChannel, NoiseOrigin, QubitId};

use crate::error::SimResult;
use crate::gate_times::GateTimes;

/// Gaps shorter than this (ns) are not filled with idle noise.
const IDLE_EPSILON: f64 = 1e-9;

/// Start times of the snapshots of a scheduled circuit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CircuitTimes {
    /// `(label, start time in ns)` in circuit order.
    pub snapshots: Vec<(String, f64)>,
    /// Time at which the last operation ends.
    pub end: f64,
}

impl CircuitTimes {
    /// Start time of the snapshot `label`.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.snapshots
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, t)| *t)
    }

    /// Snapshot start times in circuit order.
    pub fn snapshot_times(&self) -> Vec<f64> {
        self.snapshots.iter().map(|(_, t)| *t).collect()
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the circuit has no snapshots.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Duration of an instruction in the schedule.
pub fn instruction_duration(instruction: &Instruction, gate_times: &GateTimes) -> f64 {
    match &instruction.kind {
        InstructionKind::Gate(gate) => gate_times.get(gate.name(), instruction.qubits.len()),
        InstructionKind::Measure => gate_times.measure(),
        InstructionKind::Reset => gate_times.reset(),
        InstructionKind::Delay { duration } => *duration,
        _ => 0.0,
    }
}

/// Free time of every qubit and classical bit.
struct Timeline {
    qubit_time: Vec<f64>,
    clbit_time: Vec<f64>,
}

impl Timeline {
    fn new(circuit: &Circuit) -> Self {
        Self {
            qubit_time: vec![0.0; circuit.num_qubits()],
            clbit_time: vec![0.0; circuit.num_clbits()],
        }
    }

    fn start(&self, instruction: &Instruction) -> f64 {
        let qubits = instruction.qubits.iter().map(|q| self.qubit_time[q.index()]);
        let clbits = instruction
            .writes()
            .iter()
            .copied()
            .chain(instruction.reads())
            .map(|c| self.clbit_time[c.index()]);
        qubits.chain(clbits).fold(0.0, f64::max)
    }

    fn occupy(&mut self, instruction: &Instruction, until: f64) {
        for q in &instruction.qubits {
            self.qubit_time[q.index()] = until;
        }
        for c in instruction.writes().iter().copied().chain(instruction.reads()) {
            self.clbit_time[c.index()] = until;
        }
    }

    fn end(&self) -> f64 {
        self.qubit_time
            .iter()
            .chain(&self.clbit_time)
            .copied()
            .fold(0.0, f64::max)
    }
}

/// Schedule `circuit` and report when each snapshot starts.
pub fn circuit_time(circuit: &Circuit, gate_times: &GateTimes) -> SimResult<CircuitTimes> {
    let mut timeline = Timeline::new(circuit);
    let mut times = CircuitTimes::default();

    for inst in circuit.instructions()? {
        let start = timeline.start(inst);
        if let InstructionKind::Snapshot { label, .. } = &inst.kind {
            times.snapshots.push((label.clone(), start));
        }
        timeline.occupy(inst, start + instruction_duration(inst, gate_times));
    }

    times.end = timeline.end();
    Ok(times)
}

/// Fill every idle gap with thermal relaxation.
///
/// Returns the rewritten circuit and its schedule. Each qubit relaxes for
/// the time it waits before an operation, each `Delay` becomes relaxation
/// for its duration, and every qubit is padded to the end of the circuit.
pub fn add_idle_noise(
    circuit: &Circuit,
    gate_times: &GateTimes,
    t1: f64,
    t2: f64,
) -> SimResult<(Circuit, CircuitTimes)> {
    let mut out = circuit.copy_empty();
    let mut timeline = Timeline::new(circuit);
    let mut times = CircuitTimes::default();
    let mut idle_channels = 0usize;

    let mut relax = |out: &mut Circuit, qubit: QubitId, time: f64| -> SimResult<()> {
        if time > IDLE_EPSILON {
            let channel = NoiseChannel::thermal_relaxation(t1, t2, time)?;
            out.noise(channel, qubit, NoiseOrigin::Idle)?;
            idle_channels += 1;
        }
        Ok(())
    };

    for inst in circuit.instructions()? {
        let start = timeline.start(inst);
        let duration = instruction_duration(inst, gate_times);

        for &q in &inst.qubits {
            relax(&mut out, q, start - timeline.qubit_time[q.index()])?;
        }

        match &inst.kind {
            InstructionKind::Delay { duration } => {
                for &q in &inst.qubits {
                    relax(&mut out, q, *duration)?;
                }
            }
            InstructionKind::Snapshot { label, .. } => {
                times.snapshots.push((label.clone(), start));
                out.append(inst.clone())?;
            }
            _ => {
                out.append(inst.clone())?;
            }
        }
        timeline.occupy(inst, start + duration);
    }

    let end = timeline.end();
    for (index, qubit) in circuit.qubit_ids().into_iter().enumerate() {
        relax(&mut out, qubit, end - timeline.qubit_time[index])?;
    }
    times.end = end;

    debug!(
        idle_channels,
        end_ns = end,
        snapshots = times.len(),
        "Inserted idle noise"
    );
    Ok((out, times))
}
