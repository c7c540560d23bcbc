//! Property-based tests for circuit construction and verification helpers.

use qsynth_ir::unitary::{DenseUnitary, circuit_unitary};
use qsynth_ir::{Circuit, Control, Instruction, QubitId, classical};
use proptest::prelude::*;

/// Gate operations that can be applied to a circuit.
#[derive(Debug, Clone)]
enum GateOp {
    X(u32),
    Cx(u32, u32),
    Ccx(u32, u32, u32, bool),
    Rz(u32, f64),
    Ry(u32, f64),
    U(u32, f64, f64, f64),
}

impl GateOp {
    fn apply(self, circuit: &mut Circuit) {
        // Invalid operand combinations are rejected by the circuit; skip them.
        let _ = match self {
            GateOp::X(q) => circuit.x(QubitId(q)),
            GateOp::Cx(c, t) => circuit.cx(QubitId(c), QubitId(t)),
            GateOp::Ccx(a, b, t, pol) => circuit.mcx(
                [
                    Control::positive(QubitId(a)),
                    Control::with_polarity(QubitId(b), pol),
                ],
                QubitId(t),
            ),
            GateOp::Rz(q, t) => circuit.rz(t, QubitId(q)),
            GateOp::Ry(q, t) => circuit.ry(t, QubitId(q)),
            GateOp::U(q, a, b, c) => circuit.u(a, b, c, QubitId(q)),
        };
    }
}

fn arb_gate_op(n: u32, classical_only: bool) -> BoxedStrategy<GateOp> {
    let angle = -3.2f64..3.2;
    let classical = prop_oneof![
        (0..n).prop_map(GateOp::X),
        (0..n, 0..n).prop_map(|(c, t)| GateOp::Cx(c, t)),
        (0..n, 0..n, 0..n, any::<bool>()).prop_map(|(a, b, t, p)| GateOp::Ccx(a, b, t, p)),
    ];
    if classical_only {
        return classical.boxed();
    }
    prop_oneof![
        classical,
        (0..n, angle.clone()).prop_map(|(q, t)| GateOp::Rz(q, t)),
        (0..n, angle.clone()).prop_map(|(q, t)| GateOp::Ry(q, t)),
        (0..n, angle.clone(), angle.clone(), angle).prop_map(|(q, a, b, c)| GateOp::U(q, a, b, c)),
    ]
    .boxed()
}

fn arb_circuit(classical_only: bool) -> impl Strategy<Value = Circuit> {
    (1_u32..=4).prop_flat_map(move |n| {
        prop::collection::vec(arb_gate_op(n, classical_only), 0..=12).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("random", n);
            for op in ops {
                op.apply(&mut circuit);
            }
            circuit
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A circuit followed by its inverse is the identity.
    #[test]
    fn prop_inverse_cancels(circuit in arb_circuit(false)) {
        let mut both = circuit.clone();
        for inst in circuit.inverse().into_instructions() {
            both.apply(inst).unwrap();
        }
        let u = circuit_unitary(&both).unwrap();
        prop_assert!(u.approx_eq(&DenseUnitary::identity(circuit.num_qubits()), 1e-9));
    }

    /// Basis-state simulation agrees with the dense unitary on NOT-type circuits.
    #[test]
    fn prop_classical_matches_unitary(circuit in arb_circuit(true), seed in any::<u64>()) {
        let n = circuit.num_qubits() as usize;
        let input = seed & ((1u64 << n) - 1);
        let out = classical::simulate(&circuit, &classical::bits_of(input, n)).unwrap();
        let out_index = out
            .iter()
            .enumerate()
            .fold(0usize, |acc, (i, &b)| acc | (usize::from(b) << i));
        let u = circuit_unitary(&circuit).unwrap();
        prop_assert!((u.get(out_index, input as usize).re - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_instruction_json_shape() {
    let inst = Instruction::mcx(
        [Control::positive(QubitId(0)), Control::negative(QubitId(1))],
        QubitId(2),
    );
    let json = serde_json::to_value(&inst).unwrap();
    assert_eq!(json["gate"], "MCX");
    assert_eq!(json["target"], 2);
    assert_eq!(json["controls"][1]["positive"], false);
    let back: Instruction = serde_json::from_value(json).unwrap();
    assert_eq!(back, inst);
}
