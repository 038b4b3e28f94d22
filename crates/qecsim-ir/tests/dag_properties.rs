//! Property-based tests for circuit construction.
//!
//! Random circuits mixing gates, measurements and conditional gates must
//! always produce a well-formed DAG in which every conditional operation
//! is ordered after the measurements it reads.

use qecsim_ir::{Circuit, ClbitId, InstructionKind, QubitId, StandardGate};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    H(u32),
    X(u32),
    Cz(u32, u32),
    Measure(u32, u32),
    XIf(u32, u64),
    Reset(u32),
}

impl Op {
    fn apply(self, circuit: &mut Circuit) -> bool {
        let result = match self {
            Op::H(q) => circuit.h(QubitId(q)),
            Op::X(q) => circuit.x(QubitId(q)),
            Op::Cz(a, b) => circuit.cz(QubitId(a), QubitId(b)),
            Op::Measure(q, c) => circuit.measure(QubitId(q), ClbitId(c)),
            Op::XIf(q, v) => circuit.gate_if(StandardGate::X, [QubitId(q)], "c", v),
            Op::Reset(q) => circuit.reset(QubitId(q)),
        };
        result.is_ok()
    }
}

fn arb_op(num_qubits: u32, num_clbits: u32) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..num_qubits).prop_map(Op::H),
        (0..num_qubits).prop_map(Op::X),
        (0..num_qubits, 0..num_qubits)
            .prop_filter("distinct qubits", |(a, b)| a != b)
            .prop_map(|(a, b)| Op::Cz(a, b)),
        (0..num_qubits, 0..num_clbits).prop_map(|(q, c)| Op::Measure(q, c)),
        (0..num_qubits, 0..(1u64 << num_clbits)).prop_map(|(q, v)| Op::XIf(q, v)),
        (0..num_qubits).prop_map(Op::Reset),
    ]
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (2_u32..=5, 1_u32..=3).prop_flat_map(|(nq, nc)| {
        prop::collection::vec(arb_op(nq, nc), 1..=20).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("random", nq, nc);
            for op in ops {
                op.apply(&mut circuit);
            }
            circuit
        })
    })
}

proptest! {
    #[test]
    fn test_random_circuits_are_well_formed(circuit in arb_circuit()) {
        prop_assert!(circuit.dag().verify_integrity().is_ok());
        let depth = circuit.depth().unwrap();
        prop_assert!(depth <= circuit.num_ops());
        prop_assert_eq!(circuit.instructions().unwrap().len(), circuit.num_ops());
    }

    #[test]
    fn test_classical_wire_order_matches_append_order(
        (nq, nc, ops) in (2_u32..=4, 1_u32..=3).prop_flat_map(|(nq, nc)| {
            (Just(nq), Just(nc), prop::collection::vec(arb_op(nq, nc), 1..=20))
        })
    ) {
        let mut circuit = Circuit::with_size("random", nq, nc);
        let mut expected: Vec<Vec<String>> = vec![vec![]; nc as usize];
        for op in ops {
            let touched: Vec<u32> = match op {
                Op::Measure(_, c) => vec![c],
                Op::XIf(..) => (0..nc).collect(),
                _ => vec![],
            };
            let name = if matches!(op, Op::Measure(..)) { "measure" } else { "x" };
            if op.apply(&mut circuit) {
                for c in touched {
                    expected[c as usize].push(name.to_string());
                }
            }
        }

        let insts = circuit.instructions().unwrap();
        for c in 0..nc {
            let bit = ClbitId(c);
            let actual: Vec<String> = insts
                .iter()
                .filter(|inst| inst.writes().contains(&bit) || inst.reads().contains(&bit))
                .map(|inst| inst.name().to_string())
                .collect();
            prop_assert_eq!(&actual, &expected[c as usize]);
        }
    }
}

#[test]
fn test_measure_then_condition_order_is_preserved() {
    let mut circuit = Circuit::new("feedforward");
    let q = circuit.add_qreg("q", 2);
    let c = circuit.add_creg("syndrome", 1);
    circuit.h(q[1]).unwrap();
    circuit.measure(q[1], c[0]).unwrap();
    circuit.gate_if(StandardGate::X, [q[0]], "syndrome", 1).unwrap();
    circuit.measure(q[1], c[0]).unwrap();

    let names: Vec<_> = circuit
        .instructions()
        .unwrap()
        .iter()
        .map(|inst| inst.name().to_string())
        .collect();
    assert_eq!(names, vec!["h", "measure", "x", "measure"]);
}

#[test]
fn test_post_select_reads_register() {
    let mut circuit = Circuit::new("select");
    let q = circuit.add_qreg("q", 1);
    let c = circuit.add_creg("c", 1);
    circuit.measure(q[0], c[0]).unwrap();
    circuit.post_select(c.clone(), 0).unwrap();

    let ops = circuit.instructions().unwrap();
    assert!(matches!(ops[1].kind, InstructionKind::PostSelect { value: 0 }));
    assert_eq!(ops[1].reads(), c);
}
