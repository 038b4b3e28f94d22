//! Density-matrix simulator with mid-circuit measurement and feed-forward.
//!
//! Two methods are available:
//!
//! - [`SimulationMethod::DensityMatrix`] evolves an exact ensemble. The
//!   state is a set of unnormalized density matrices keyed by the classical
//!   memory that is still needed. Only measurements whose result is read
//!   later (by a condition or a post-selection) or that end up in the
//!   readout split the ensemble; every other measurement dephases. Bits are
//!   dropped from the key after their last read and equal branches merge.
//! - [`SimulationMethod::Trajectory`] runs one pure state per shot, sampling
//!   measurements and Kraus operators, and averages the snapshots over the
//!   shots that survive post-selection.

use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, instrument, warn};

use qecsim_ir::{Circuit, ClbitId, Instruction, InstructionKind, SnapshotKind, read_bits};

use crate::channels::{kraus_operators, reset_kraus};
use crate::density_matrix::DensityMatrix;
use crate::error::{SimError, SimResult};
use crate::gates::Matrix2;
use crate::noise_model::NoiseModel;
use crate::result::{Counts, ExecutionResult, SnapshotRecord, SnapshotValue};
use crate::statevector::{PROB_EPSILON, Statevector};

/// Width of the classical memory word.
const MAX_CLBITS: usize = 128;

/// How a circuit is simulated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMethod {
    /// Exact branch ensemble of density matrices.
    #[default]
    DensityMatrix,
    /// Sampled pure-state trajectories, one per shot.
    #[serde(alias = "statevector")]
    Trajectory,
}

impl SimulationMethod {
    /// Parse a method name, falling back to the default with a warning.
    pub fn from_str_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|e: SimError| {
            warn!(error = %e, "Falling back to density_matrix simulation");
            Self::default()
        })
    }
}

impl FromStr for SimulationMethod {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "density_matrix" | "dm" => Ok(Self::DensityMatrix),
            "statevector" | "trajectory" => Ok(Self::Trajectory),
            _ => Err(SimError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for SimulationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DensityMatrix => write!(f, "density_matrix"),
            Self::Trajectory => write!(f, "trajectory"),
        }
    }
}

/// Local simulator for noisy circuits with classical feed-forward.
#[derive(Debug, Clone)]
pub struct DensityMatrixSimulator {
    method: SimulationMethod,
    max_qubits: usize,
    seed: Option<u64>,
}

impl DensityMatrixSimulator {
    /// Create a simulator with the default method and a 10-qubit limit.
    pub fn new() -> Self {
        Self {
            method: SimulationMethod::default(),
            max_qubits: 10,
            seed: None,
        }
    }

    /// Use `method`.
    #[must_use]
    pub fn with_method(mut self, method: SimulationMethod) -> Self {
        self.method = method;
        self
    }

    /// Accept circuits of at most `max_qubits` qubits.
    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Seed the sampler for reproducible counts and trajectories.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The configured method.
    pub fn method(&self) -> SimulationMethod {
        self.method
    }

    /// Run `circuit` for `shots` shots, attaching `noise` to every timed
    /// operation when given.
    #[instrument(skip(self, circuit, noise), fields(method = %self.method))]
    pub fn run(
        &self,
        circuit: &Circuit,
        shots: u32,
        noise: Option<&NoiseModel>,
    ) -> SimResult<ExecutionResult> {
        let start = Instant::now();

        if circuit.num_qubits() > self.max_qubits {
            return Err(SimError::CircuitTooLarge {
                qubits: circuit.num_qubits(),
                max: self.max_qubits,
            });
        }
        if circuit.num_clbits() > MAX_CLBITS {
            return Err(SimError::TooManyClbits(circuit.num_clbits()));
        }

        let instructions = circuit.instructions()?;
        let ops = match noise {
            Some(model) => model.expand_all(instructions)?,
            None => instructions.into_iter().cloned().collect(),
        };
        let program = Program::prepare(circuit.num_qubits(), ops)?;
        debug!(
            "Starting simulation: {} qubits, {} operations, {} shots",
            program.num_qubits,
            program.ops.len(),
            shots
        );

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let (counts, data) = match self.method {
            SimulationMethod::DensityMatrix => program.run_ensemble(shots, &mut rng)?,
            SimulationMethod::Trajectory => program.run_trajectories(shots, &mut rng)?,
        };

        let elapsed = start.elapsed();
        debug!("Simulation completed in {:?}", elapsed);

        Ok(ExecutionResult {
            counts,
            shots,
            data,
            execution_time_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            method: self.method,
        })
    }
}

impl Default for DensityMatrixSimulator {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Program preparation
// =============================================================================

/// Instruction list with the classical liveness the ensemble needs.
struct Program {
    num_qubits: usize,
    ops: Vec<Instruction>,
    /// Qubit positions of each op.
    positions: Vec<Vec<usize>>,
    /// Whether each (single-qubit) measurement splits the ensemble.
    branching: Vec<bool>,
    /// Bits no longer needed after each op.
    release_after: Vec<u128>,
    /// Statevectors of `Initialize` ops.
    states: Vec<Option<Statevector>>,
    /// Bits reported in the counts, in clbit order.
    readout: Vec<ClbitId>,
}

#[derive(Clone, Copy, PartialEq)]
enum BitEvent {
    Read,
    Write,
}

impl Program {
    fn prepare(num_qubits: usize, instructions: Vec<Instruction>) -> SimResult<Self> {
        // One measurement per op so each carries a single branching flag.
        let mut ops = Vec::with_capacity(instructions.len());
        for inst in instructions {
            if inst.is_measure() && inst.qubits.len() > 1 {
                for (&q, &c) in inst.qubits.iter().zip(&inst.clbits) {
                    ops.push(Instruction::measure(q, c));
                }
            } else {
                ops.push(inst);
            }
        }

        let mut labels = FxHashSet::default();
        let mut states = Vec::with_capacity(ops.len());
        for inst in &ops {
            match &inst.kind {
                InstructionKind::Snapshot { label, .. } if !labels.insert(label.clone()) => {
                    return Err(SimError::DuplicateSnapshot(label.clone()));
                }
                InstructionKind::Initialize { amplitudes } => {
                    states.push(Some(Statevector::from_amplitudes(amplitudes.clone())?));
                }
                _ => states.push(None),
            }
        }

        let positions = ops
            .iter()
            .map(|inst| inst.qubits.iter().map(|q| q.index()).collect())
            .collect();

        let num_clbits = ops
            .iter()
            .flat_map(|inst| inst.clbits.iter().copied().chain(inst.reads()))
            .map(|c| c.index() + 1)
            .max()
            .unwrap_or(0);
        if num_clbits > MAX_CLBITS {
            return Err(SimError::TooManyClbits(num_clbits));
        }

        let (branching, release_after, readout) = classical_liveness(&ops, num_clbits);

        Ok(Self {
            num_qubits,
            ops,
            positions,
            branching,
            release_after,
            states,
            readout,
        })
    }

    fn snapshot_sums(&self) -> BTreeMap<String, SnapshotSum> {
        self.ops
            .iter()
            .filter_map(|inst| match &inst.kind {
                InstructionKind::Snapshot { label, kind } => {
                    Some((label.clone(), SnapshotSum::new(kind, inst.qubits.len())))
                }
                _ => None,
            })
            .collect()
    }
}

/// Decide which measurements branch and when bits can be forgotten.
///
/// A measurement branches when the next access to its bit is a read, or
/// when it is the final write to a readout bit. A readout bit is one whose
/// final write is a measurement with no later quantum operation on the
/// measured qubit.
#[allow(clippy::cast_possible_truncation)]
fn classical_liveness(
    ops: &[Instruction],
    num_clbits: usize,
) -> (Vec<bool>, Vec<u128>, Vec<ClbitId>) {
    let mut events: Vec<Vec<(usize, BitEvent)>> = vec![vec![]; num_clbits];
    for (i, inst) in ops.iter().enumerate() {
        for c in inst.reads() {
            events[c.index()].push((i, BitEvent::Read));
        }
        for c in inst.writes() {
            events[c.index()].push((i, BitEvent::Write));
        }
    }

    let qubit_terminal = |i: usize| -> bool {
        let qubit = ops[i].qubits[0];
        !ops[i + 1..].iter().any(|later| {
            later.qubits.contains(&qubit)
                && matches!(
                    later.kind,
                    InstructionKind::Gate(_)
                        | InstructionKind::Measure
                        | InstructionKind::Reset
                        | InstructionKind::Initialize { .. }
                )
        })
    };

    let mut branching = vec![false; ops.len()];
    let mut release_after = vec![0u128; ops.len()];
    let mut readout = Vec::new();

    for (bit, bit_events) in events.iter().enumerate() {
        let last_write = bit_events
            .iter()
            .rev()
            .find(|(_, e)| *e == BitEvent::Write)
            .map(|(i, _)| *i);
        let counted = last_write.is_some_and(qubit_terminal);
        if counted {
            readout.push(ClbitId(bit as u32));
        }

        for (k, &(i, event)) in bit_events.iter().enumerate() {
            let next = bit_events.get(k + 1).map(|(_, e)| *e);
            match event {
                BitEvent::Write => {
                    branching[i] |= next == Some(BitEvent::Read)
                        || (counted && Some(i) == last_write);
                }
                BitEvent::Read => {
                    let done = match next {
                        Some(BitEvent::Write) => true,
                        Some(BitEvent::Read) => false,
                        None => !counted,
                    };
                    if done {
                        release_after[i] |= 1u128 << bit;
                    }
                }
            }
        }
    }

    (branching, release_after, readout)
}

// =============================================================================
// Snapshots
// =============================================================================

/// Running sum of a snapshot over branches or shots.
enum Accumulated {
    Matrix(DensityMatrix),
    Expectation(f64),
}

struct SnapshotSum {
    acc: Accumulated,
    visits: u32,
}

impl SnapshotSum {
    fn new(kind: &SnapshotKind, num_qubits: usize) -> Self {
        let acc = match kind {
            SnapshotKind::DensityMatrix => Accumulated::Matrix(DensityMatrix::zeros(num_qubits)),
            SnapshotKind::ExpectationValue(_) => Accumulated::Expectation(0.0),
        };
        Self { acc, visits: 0 }
    }

    /// Divide the sum by `weight` and attach the survival probability.
    fn finish(self, weight: f64, probability: f64) -> SnapshotRecord {
        let value = match self.acc {
            Accumulated::Matrix(mut dm) => {
                if weight > PROB_EPSILON {
                    dm.scale(1.0 / weight);
                }
                SnapshotValue::DensityMatrix(dm)
            }
            Accumulated::Expectation(v) => {
                SnapshotValue::Expectation(if weight > PROB_EPSILON { v / weight } else { 0.0 })
            }
        };
        SnapshotRecord {
            value,
            probability: probability.clamp(0.0, 1.0),
        }
    }
}

fn format_bits(value: u128, width: usize) -> String {
    (0..width)
        .map(|k| if (value >> k) & 1 == 1 { '1' } else { '0' })
        .collect()
}

// =============================================================================
// Ensemble method
// =============================================================================

type Branches = BTreeMap<u128, DensityMatrix>;

fn insert_branch(branches: &mut Branches, key: u128, rho: DensityMatrix) -> SimResult<()> {
    match branches.entry(key) {
        Entry::Vacant(e) => {
            e.insert(rho);
        }
        Entry::Occupied(mut e) => e.get_mut().add_assign(&rho)?,
    }
    Ok(())
}

fn split_on_measurement(branches: Branches, qubit: usize, bit: usize) -> SimResult<Branches> {
    let mask = 1u128 << bit;
    let mut out = Branches::new();
    for (key, rho) in branches {
        for outcome in [0u8, 1] {
            if rho.probability(qubit, outcome) < PROB_EPSILON {
                continue;
            }
            let mut branch = rho.clone();
            branch.project(qubit, outcome)?;
            let key = if outcome == 1 { key | mask } else { key & !mask };
            insert_branch(&mut out, key, branch)?;
        }
    }
    Ok(out)
}

fn forget_bits(branches: Branches, mask: u128) -> SimResult<Branches> {
    let mut out = Branches::new();
    for (key, rho) in branches {
        insert_branch(&mut out, key & !mask, rho)?;
    }
    Ok(out)
}

impl Program {
    fn run_ensemble(
        &self,
        shots: u32,
        rng: &mut StdRng,
    ) -> SimResult<(Counts, BTreeMap<String, SnapshotRecord>)> {
        let mut branches = Branches::from([(0u128, DensityMatrix::new(self.num_qubits))]);
        let mut data = BTreeMap::new();
        let mut peak = 1usize;

        for (i, inst) in self.ops.iter().enumerate() {
            let qubits = &self.positions[i];
            match &inst.kind {
                InstructionKind::Gate(gate) => {
                    for (key, rho) in &mut branches {
                        if gate.condition.as_ref().is_none_or(|c| c.is_satisfied(*key)) {
                            rho.apply_gate(&gate.kind, qubits)?;
                        }
                    }
                }
                InstructionKind::Measure => {
                    if self.branching[i] {
                        branches =
                            split_on_measurement(branches, qubits[0], inst.clbits[0].index())?;
                        peak = peak.max(branches.len());
                    } else {
                        for rho in branches.values_mut() {
                            rho.dephase(qubits[0])?;
                        }
                    }
                }
                InstructionKind::Reset => {
                    for rho in branches.values_mut() {
                        for &q in qubits {
                            rho.reset(q)?;
                        }
                    }
                }
                InstructionKind::NoiseChannel { channel, .. } => {
                    if !channel.is_identity() {
                        let kraus = kraus_operators(channel)?;
                        for rho in branches.values_mut() {
                            for &q in qubits {
                                rho.apply_kraus(q, &kraus)?;
                            }
                        }
                    }
                }
                InstructionKind::Initialize { .. } => {
                    if let Some(state) = &self.states[i] {
                        for rho in branches.values_mut() {
                            rho.initialize(qubits, state)?;
                        }
                    }
                }
                InstructionKind::PostSelect { value } => {
                    branches.retain(|key, _| read_bits(*key, &inst.clbits) == u128::from(*value));
                }
                InstructionKind::Snapshot { label, kind } => {
                    let record = ensemble_snapshot(&branches, self.num_qubits, kind, qubits)?;
                    data.insert(label.clone(), record);
                }
                InstructionKind::Barrier | InstructionKind::Delay { .. } => {}
            }

            if self.release_after[i] != 0 {
                branches = forget_bits(branches, self.release_after[i])?;
            }
        }
        debug!(peak_branches = peak, final_branches = branches.len(), "Ensemble finished");

        let counts = self.sample_counts(&branches, shots, rng);
        Ok((counts, data))
    }

    /// Draw `shots` outcomes; rejected weight is drawn but not recorded.
    fn sample_counts(&self, branches: &Branches, shots: u32, rng: &mut StdRng) -> Counts {
        let mut counts = Counts::new();
        if self.readout.is_empty() || shots == 0 {
            return counts;
        }

        let mut outcomes: BTreeMap<u128, f64> = BTreeMap::new();
        for (key, rho) in branches {
            *outcomes.entry(read_bits(*key, &self.readout)).or_insert(0.0) +=
                rho.trace().re.max(0.0);
        }
        let accepted: f64 = outcomes.values().sum();
        let (values, mut weights): (Vec<u128>, Vec<f64>) = outcomes.into_iter().unzip();
        weights.push((1.0 - accepted).max(0.0));

        let Ok(dist) = WeightedIndex::new(&weights) else {
            warn!("No outcome has positive probability; counts are empty");
            return counts;
        };
        let mut tally = vec![0u64; weights.len()];
        for _ in 0..shots {
            tally[dist.sample(rng)] += 1;
        }
        for (value, n) in values.iter().zip(&tally) {
            if *n > 0 {
                counts.insert(format_bits(*value, self.readout.len()), *n);
            }
        }
        counts
    }
}

fn ensemble_snapshot(
    branches: &Branches,
    num_qubits: usize,
    kind: &SnapshotKind,
    qubits: &[usize],
) -> SimResult<SnapshotRecord> {
    let mut total = DensityMatrix::zeros(num_qubits);
    for rho in branches.values() {
        total.add_assign(rho)?;
    }
    let weight = total.trace().re;
    if weight <= PROB_EPSILON {
        warn!("Snapshot reached with zero probability");
        return Ok(SnapshotSum::new(kind, qubits.len()).finish(0.0, 0.0));
    }
    let acc = match kind {
        SnapshotKind::DensityMatrix => Accumulated::Matrix(total.partial_trace(qubits)?),
        SnapshotKind::ExpectationValue(pauli) => {
            Accumulated::Expectation(total.expectation(pauli, qubits)?)
        }
    };
    Ok(SnapshotSum { acc, visits: 1 }.finish(weight, weight))
}

// =============================================================================
// Trajectory method
// =============================================================================

impl Program {
    fn is_stochastic(&self, kraus: &[Option<Vec<Matrix2>>]) -> bool {
        kraus.iter().any(Option::is_some)
            || self.ops.iter().any(|inst| {
                matches!(
                    inst.kind,
                    InstructionKind::Measure
                        | InstructionKind::Reset
                        | InstructionKind::Initialize { .. }
                )
            })
    }

    fn run_trajectories(
        &self,
        shots: u32,
        rng: &mut StdRng,
    ) -> SimResult<(Counts, BTreeMap<String, SnapshotRecord>)> {
        let kraus = self
            .ops
            .iter()
            .map(|inst| match &inst.kind {
                InstructionKind::NoiseChannel { channel, .. } if !channel.is_identity() => {
                    kraus_operators(channel).map(Some)
                }
                _ => Ok(None),
            })
            .collect::<SimResult<Vec<_>>>()?;
        let reset_ops = reset_kraus();

        let runs = if self.is_stochastic(&kraus) {
            shots.max(1)
        } else {
            1
        };
        let mut sums = self.snapshot_sums();
        let mut counts = Counts::new();

        for run in 0..runs {
            let mut sv = Statevector::new(self.num_qubits);
            let mut memory = 0u128;
            let mut accepted = true;

            for (i, inst) in self.ops.iter().enumerate() {
                let qubits = &self.positions[i];
                match &inst.kind {
                    InstructionKind::Gate(gate) => {
                        if gate.condition.as_ref().is_none_or(|c| c.is_satisfied(memory)) {
                            sv.apply_gate(&gate.kind, qubits)?;
                        }
                    }
                    InstructionKind::Measure => {
                        let mask = 1u128 << inst.clbits[0].index();
                        if sv.measure(qubits[0], rng)? == 1 {
                            memory |= mask;
                        } else {
                            memory &= !mask;
                        }
                    }
                    InstructionKind::Reset => {
                        for &q in qubits {
                            sv.apply_kraus_sampled(q, &reset_ops, rng)?;
                        }
                    }
                    InstructionKind::NoiseChannel { .. } => {
                        if let Some(ops) = &kraus[i] {
                            for &q in qubits {
                                sv.apply_kraus_sampled(q, ops, rng)?;
                            }
                        }
                    }
                    InstructionKind::Initialize { .. } => {
                        if let Some(state) = &self.states[i] {
                            sv.initialize_sampled(qubits, state, rng)?;
                        }
                    }
                    InstructionKind::PostSelect { value } => {
                        if read_bits(memory, &inst.clbits) != u128::from(*value) {
                            accepted = false;
                            break;
                        }
                    }
                    InstructionKind::Snapshot { label, kind } => {
                        if let Some(sum) = sums.get_mut(label) {
                            match (&mut sum.acc, kind) {
                                (Accumulated::Matrix(acc), SnapshotKind::DensityMatrix) => {
                                    acc.add_assign(&sv.to_density_matrix().partial_trace(qubits)?)?;
                                }
                                (
                                    Accumulated::Expectation(acc),
                                    SnapshotKind::ExpectationValue(pauli),
                                ) => {
                                    *acc += sv.expectation(pauli, qubits)?;
                                }
                                _ => {}
                            }
                            sum.visits += 1;
                        }
                    }
                    InstructionKind::Barrier | InstructionKind::Delay { .. } => {}
                }
            }

            if accepted && run < shots && !self.readout.is_empty() {
                counts.insert(
                    format_bits(read_bits(memory, &self.readout), self.readout.len()),
                    1,
                );
            }
            if run > 0 && run % 1000 == 0 {
                debug!("Completed {} trajectories", run);
            }
        }

        let data = sums
            .into_iter()
            .map(|(label, sum)| {
                let survivors = f64::from(sum.visits);
                let record = sum.finish(survivors, survivors / f64::from(runs));
                (label, record)
            })
            .collect();
        Ok((counts, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qecsim_ir::{QubitId, StandardGate};

    fn dm_of(result: &ExecutionResult, label: &str) -> DensityMatrix {
        result.data[label].density_matrix().unwrap().clone()
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!(
            "density_matrix".parse::<SimulationMethod>().unwrap(),
            SimulationMethod::DensityMatrix
        );
        assert_eq!(
            "statevector".parse::<SimulationMethod>().unwrap(),
            SimulationMethod::Trajectory
        );
        assert!("stabilizer".parse::<SimulationMethod>().is_err());
        assert_eq!(
            SimulationMethod::from_str_or_default("stabilizer"),
            SimulationMethod::DensityMatrix
        );
    }

    #[test]
    fn test_circuit_too_large() {
        let circuit = Circuit::with_size("big", 12, 0);
        let err = DensityMatrixSimulator::new().run(&circuit, 1, None).unwrap_err();
        assert!(matches!(err, SimError::CircuitTooLarge { qubits: 12, max: 10 }));
    }

    #[test]
    fn test_duplicate_snapshot_label() {
        let mut circuit = Circuit::with_size("dup", 1, 0);
        circuit
            .snapshot_density_matrix("dm_0", [QubitId(0)])
            .unwrap()
            .snapshot_density_matrix("dm_0", [QubitId(0)])
            .unwrap();
        let err = DensityMatrixSimulator::new().run(&circuit, 1, None).unwrap_err();
        assert!(matches!(err, SimError::DuplicateSnapshot(_)));
    }

    #[test]
    fn test_bell_counts() {
        let mut circuit = Circuit::with_size("bell", 2, 2);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap()
            .measure(QubitId(1), ClbitId(1))
            .unwrap();

        for method in [SimulationMethod::DensityMatrix, SimulationMethod::Trajectory] {
            let result = DensityMatrixSimulator::new()
                .with_method(method)
                .with_seed(7)
                .run(&circuit, 1000, None)
                .unwrap();
            assert_eq!(result.counts.total(), 1000);
            assert_eq!(result.counts.get("01") + result.counts.get("10"), 0);
            let zeros = result.counts.get("00");
            assert!((400..600).contains(&zeros), "{method}: {zeros}");
        }
    }

    #[test]
    fn test_feed_forward_corrects_flip() {
        // Measure |1⟩ and flip it back when the bit reads 1.
        let mut circuit = Circuit::new("ff");
        let q = circuit.add_qreg("q", 1);
        let c = circuit.add_creg("m", 1);
        circuit
            .x(q[0])
            .unwrap()
            .measure(q[0], c[0])
            .unwrap()
            .gate_if(StandardGate::X, [q[0]], "m", 1)
            .unwrap()
            .snapshot_density_matrix("dm_0", [q[0]])
            .unwrap();

        let result = DensityMatrixSimulator::new().run(&circuit, 0, None).unwrap();
        let rho = dm_of(&result, "dm_0");
        assert!((rho.get(0, 0).re - 1.0).abs() < 1e-12);
        assert!((result.data["dm_0"].probability - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_post_select_probability() {
        let mut circuit = Circuit::with_size("ps", 2, 1);
        circuit
            .ry(1.0, QubitId(1))
            .unwrap()
            .h(QubitId(0))
            .unwrap()
            .measure(QubitId(1), ClbitId(0))
            .unwrap()
            .post_select([ClbitId(0)], 0)
            .unwrap()
            .snapshot_density_matrix("dm_0", [QubitId(0)])
            .unwrap();

        let result = DensityMatrixSimulator::new().run(&circuit, 0, None).unwrap();
        let expected = (0.5f64).cos().powi(2);
        let record = &result.data["dm_0"];
        assert!((record.probability - expected).abs() < 1e-12);
        let rho = record.density_matrix().unwrap();
        assert!((rho.get(0, 1).re - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unread_measurement_dephases() {
        let mut circuit = Circuit::with_size("deph", 2, 1);
        circuit
            .h(QubitId(0))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap()
            .h(QubitId(0))
            .unwrap()
            .snapshot_expectation("exp_0", "Z".parse().unwrap(), [QubitId(0)])
            .unwrap();

        let result = DensityMatrixSimulator::new().run(&circuit, 0, None).unwrap();
        let z = result.data["exp_0"].expectation().unwrap();
        assert!(z.abs() < 1e-12);
        assert!(result.counts.is_empty());
    }

    #[test]
    fn test_classical_liveness() {
        let mut circuit = Circuit::new("live");
        let q = circuit.add_qreg("q", 2);
        let s = circuit.add_creg("s", 1);
        let r = circuit.add_creg("r", 1);
        circuit
            .measure(q[0], s[0])
            .unwrap()
            .gate_if(StandardGate::X, [q[1]], "s", 1)
            .unwrap()
            .reset(q[0])
            .unwrap()
            .measure(q[1], r[0])
            .unwrap();
        let ops: Vec<_> = circuit.instructions().unwrap().into_iter().cloned().collect();
        let (branching, release, readout) = classical_liveness(&ops, 2);
        assert_eq!(branching, vec![true, false, false, true]);
        assert_eq!(release, vec![0, 1, 0, 0]);
        assert_eq!(readout, vec![ClbitId(1)]);
    }
}
