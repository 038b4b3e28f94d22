//! DAG-based circuit representation.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node in the circuit DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    /// Input node for a wire.
    In(WireId),
    /// Output node for a wire.
    Out(WireId),
    /// Operation node containing an instruction.
    Op(Instruction),
}

impl DagNode {
    /// Get the instruction if this is an operation node.
    #[inline]
    fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            _ => None,
        }
    }
}

/// Identifier for a wire in the DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireId {
    /// A quantum wire.
    Qubit(QubitId),
    /// A classical wire.
    Clbit(ClbitId),
}

impl From<QubitId> for WireId {
    fn from(q: QubitId) -> Self {
        WireId::Qubit(q)
    }
}

impl From<ClbitId> for WireId {
    fn from(c: ClbitId) -> Self {
        WireId::Clbit(c)
    }
}

/// An edge in the circuit DAG representing a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    /// The wire this edge represents.
    pub wire: WireId,
}

/// DAG-based circuit representation.
///
/// Nodes are wire inputs, wire outputs, or operations; edges are wire
/// segments. An operation sits on every qubit it acts on and on every
/// classical bit it writes or reads, so a conditional gate or a
/// post-selection is ordered after the measurement that feeds it.
///
/// `wire_front` maps each wire to the node just before its output node,
/// giving O(1) predecessor lookups in [`CircuitDag::apply`].
#[derive(Debug, Clone)]
pub struct CircuitDag {
    graph: DiGraph<DagNode, DagEdge, u32>,
    inputs: FxHashMap<WireId, NodeIndex>,
    outputs: FxHashMap<WireId, NodeIndex>,
    wire_front: FxHashMap<WireId, NodeIndex>,
    num_qubits: usize,
    num_clbits: usize,
}

impl CircuitDag {
    /// Create a new empty circuit DAG.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::default(),
            inputs: FxHashMap::default(),
            outputs: FxHashMap::default(),
            wire_front: FxHashMap::default(),
            num_qubits: 0,
            num_clbits: 0,
        }
    }

    fn add_wire(&mut self, wire: WireId) -> bool {
        if self.inputs.contains_key(&wire) {
            return false;
        }
        let in_node = self.graph.add_node(DagNode::In(wire));
        let out_node = self.graph.add_node(DagNode::Out(wire));
        self.graph.add_edge(in_node, out_node, DagEdge { wire });
        self.inputs.insert(wire, in_node);
        self.outputs.insert(wire, out_node);
        self.wire_front.insert(wire, in_node);
        true
    }

    /// Add a qubit to the circuit.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        if self.add_wire(WireId::Qubit(qubit)) {
            self.num_qubits += 1;
        }
    }

    /// Add a classical bit to the circuit.
    pub fn add_clbit(&mut self, clbit: ClbitId) {
        if self.add_wire(WireId::Clbit(clbit)) {
            self.num_clbits += 1;
        }
    }

    #[inline]
    fn has_qubit(&self, qubit: QubitId) -> bool {
        self.inputs.contains_key(&WireId::Qubit(qubit))
    }

    #[inline]
    fn has_clbit(&self, clbit: ClbitId) -> bool {
        self.inputs.contains_key(&WireId::Clbit(clbit))
    }

    /// Apply an instruction to the circuit.
    #[allow(clippy::needless_pass_by_value, clippy::cast_possible_truncation)]
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        let context = Some(instruction.name().to_string());

        // Validate gate arity matches qubit count
        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits() as usize;
            let got = instruction.qubits.len();
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected: expected as u32,
                    got: got as u32,
                });
            }
        }

        for &qubit in &instruction.qubits {
            if !self.has_qubit(qubit) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    context: context.clone(),
                });
            }
        }

        let reads = instruction.reads();
        for &clbit in instruction.clbits.iter().chain(&reads) {
            if !self.has_clbit(clbit) {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    context: context.clone(),
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    context: context.clone(),
                });
            }
        }

        let mut wires: Vec<WireId> = instruction.qubits.iter().map(|&q| q.into()).collect();
        for &clbit in instruction.clbits.iter().chain(&reads) {
            let wire = WireId::Clbit(clbit);
            if !wires.contains(&wire) {
                wires.push(wire);
            }
        }

        let op_node = self.graph.add_node(DagNode::Op(instruction));
        for wire in wires {
            self.connect(op_node, wire)?;
        }

        Ok(op_node)
    }

    /// Splice `op_node` in front of the output node of `wire`.
    fn connect(&mut self, op_node: NodeIndex, wire: WireId) -> IrResult<()> {
        let out_node = self.outputs[&wire];
        let prev_node = self.wire_front[&wire];

        let eid = self
            .graph
            .edges_directed(prev_node, Direction::Outgoing)
            .find(|e| e.weight().wire == wire && e.target() == out_node)
            .map(|e| e.id())
            .ok_or_else(|| {
                IrError::InvalidDag(format!(
                    "Missing edge from predecessor to output for wire {wire:?}"
                ))
            })?;
        self.graph.remove_edge(eid);
        self.graph.add_edge(prev_node, op_node, DagEdge { wire });
        self.graph.add_edge(op_node, out_node, DagEdge { wire });
        self.wire_front.insert(wire, op_node);
        Ok(())
    }

    /// Operations in topological order, ties broken by append order.
    ///
    /// Append order is itself topological, so this returns the operations
    /// exactly as they were appended. A post-selection therefore stays ahead
    /// of a later snapshot even when the two share no wire.
    pub fn topological_ops(&self) -> IrResult<Vec<(NodeIndex, &Instruction)>> {
        let order = self.stable_toposort()?;
        Ok(order
            .into_iter()
            .filter_map(|idx| self.graph[idx].instruction().map(|inst| (idx, inst)))
            .collect())
    }

    /// Kahn's algorithm, always taking the lowest ready node index.
    fn stable_toposort(&self) -> IrResult<Vec<NodeIndex>> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|n| self.graph.edges_directed(n, Direction::Incoming).count())
            .collect();
        let mut ready: BinaryHeap<Reverse<NodeIndex>> = self
            .graph
            .node_indices()
            .filter(|n| in_degree[n.index()] == 0)
            .map(Reverse)
            .collect();

        let mut order = Vec::with_capacity(in_degree.len());
        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for edge in self.graph.edges_directed(node, Direction::Outgoing) {
                let target = edge.target();
                in_degree[target.index()] -= 1;
                if in_degree[target.index()] == 0 {
                    ready.push(Reverse(target));
                }
            }
        }

        if order.len() != self.graph.node_count() {
            return Err(IrError::InvalidDag("cycle detected in circuit graph".into()));
        }
        Ok(order)
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get the number of classical bits.
    #[inline]
    pub fn num_clbits(&self) -> usize {
        self.num_clbits
    }

    /// Get the number of operations.
    #[inline]
    pub fn num_ops(&self) -> usize {
        self.graph.node_count().saturating_sub(2 * self.inputs.len())
    }

    /// Calculate the circuit depth.
    ///
    /// Barriers, snapshots and post-selections are bookkeeping and do not add
    /// a layer.
    pub fn depth(&self) -> IrResult<usize> {
        let order = self.stable_toposort()?;
        let mut depths: FxHashMap<NodeIndex, usize> =
            FxHashMap::with_capacity_and_hasher(order.len(), Default::default());

        let mut max_depth = 0usize;
        for node in order {
            let max_pred_depth = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .map(|e| depths.get(&e.source()).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);

            let counts = match &self.graph[node] {
                DagNode::Op(inst) => !matches!(
                    inst.kind,
                    InstructionKind::Barrier
                        | InstructionKind::Snapshot { .. }
                        | InstructionKind::PostSelect { .. }
                ),
                _ => false,
            };
            let node_depth = max_pred_depth + usize::from(counts);
            max_depth = max_depth.max(node_depth);
            depths.insert(node, node_depth);
        }

        Ok(max_depth)
    }

    /// Verify the structural integrity of the DAG.
    ///
    /// Checks that the graph is acyclic and that every wire forms an
    /// unbroken path from its In node to its Out node.
    pub fn verify_integrity(&self) -> IrResult<()> {
        if petgraph::algo::is_cyclic_directed(&self.graph) {
            return Err(IrError::InvalidDag("Graph contains a cycle".into()));
        }

        for (&wire, &in_node) in &self.inputs {
            let out_node = self.outputs.get(&wire).copied().ok_or_else(|| {
                IrError::InvalidDag(format!("Wire {wire:?} has an In node but no Out node"))
            })?;

            let mut current = in_node;
            let max_steps = self.graph.node_count();
            let mut steps = 0;
            while current != out_node {
                current = self
                    .graph
                    .edges_directed(current, Direction::Outgoing)
                    .find(|e| e.weight().wire == wire)
                    .map(|e| e.target())
                    .ok_or_else(|| {
                        IrError::InvalidDag(format!(
                            "Wire {wire:?} is broken: no outgoing edge from node {current:?}"
                        ))
                    })?;
                steps += 1;
                if steps > max_steps {
                    return Err(IrError::InvalidDag(format!(
                        "Wire {wire:?} has too many steps"
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for CircuitDag {
    fn default() -> Self {
        Self::new()
    }
}
