//! Network synthesis driver.

use qsynth_ir::{GateSink, Instruction, QubitId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::ancilla::AncillaStats;
use crate::config::LogicSynthesisParams;
use crate::error::SynthResult;
use crate::interpreter::ActionInterpreter;
use crate::lut::SingleTargetSynthesis;
use crate::network::{LogicNetwork, NodeId, NodeKind};
use crate::schedule::MappingStrategy;

/// Outcome of [`synthesize_network`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisStats {
    /// Ancilla lines added to the register, including output copies.
    pub required_ancillae: u32,
    /// Qubit of each primary input, in declaration order.
    pub input_indexes: Vec<QubitId>,
    /// Qubit of each primary output, in declaration order.
    pub output_indexes: Vec<QubitId>,
    /// Pool counters.
    pub ancillae: AncillaStats,
    /// Register size after synthesis.
    pub num_qubits: u32,
}

/// Synthesize `network` into `sink` following the schedule of `strategy`.
///
/// Each primary input gets a new line, the constant node gets a line when
/// something reads it, and every primary output ends on its own line holding
/// the output value. All other ancillas are returned to |0⟩.
///
/// The schedule is computed before anything is added to `sink`, so a
/// strategy failure leaves the sink untouched.
#[instrument(skip(sink, network, strategy, stg))]
pub fn synthesize_network<N, S, M>(
    sink: &mut S,
    network: &N,
    strategy: &mut M,
    stg: Option<&dyn SingleTargetSynthesis>,
    params: LogicSynthesisParams,
) -> SynthResult<SynthesisStats>
where
    N: LogicNetwork + ?Sized,
    S: GateSink + ?Sized,
    M: MappingStrategy<N> + ?Sized,
{
    let steps = strategy.compute_steps(network)?;
    info!(
        "Synthesizing network with {} nodes, {} inputs, {} outputs using {} ({} steps)",
        network.size(),
        network.primary_inputs().len(),
        network.primary_outputs().len(),
        strategy.name(),
        steps.len()
    );

    let mut interp = ActionInterpreter::new(network, sink, stg, params);
    let mut stats = SynthesisStats::default();

    for &pi in network.primary_inputs() {
        let q = interp.sink.add_qubit();
        interp.place(pi, q);
        stats.input_indexes.push(q);
    }
    prepare_constants(&mut interp)?;

    interp.run(&steps)?;

    stats.output_indexes = prepare_outputs(&mut interp)?;
    stats.ancillae = interp.pool().stats();
    stats.required_ancillae = stats.ancillae.fresh;
    stats.num_qubits = interp.sink.num_qubits();

    if params.verbose {
        info!(
            "Synthesis done: {} qubits, {} ancillae ({} reused, {} released)",
            stats.num_qubits, stats.required_ancillae, stats.ancillae.reused, stats.ancillae.released
        );
    } else {
        debug!("Synthesis done: {} qubits", stats.num_qubits);
    }
    Ok(stats)
}

fn prepare_constants<N, S>(interp: &mut ActionInterpreter<'_, N, S>) -> SynthResult<()>
where
    N: LogicNetwork + ?Sized,
    S: GateSink + ?Sized,
{
    let network = interp.network;
    for node in network.nodes() {
        let NodeKind::Constant(value) = network.kind(node) else {
            continue;
        };
        if network.fanout_size(node) == 0 {
            continue;
        }
        let q = interp.sink.add_qubit();
        if *value {
            interp.emit(Instruction::x(q))?;
        }
        interp.place(node, q);
    }
    Ok(())
}

/// Give every primary output its own line holding the output value.
fn prepare_outputs<N, S>(interp: &mut ActionInterpreter<'_, N, S>) -> SynthResult<Vec<QubitId>>
where
    N: LogicNetwork + ?Sized,
    S: GateSink + ?Sized,
{
    let network = interp.network;
    // Node -> complement already applied to its line by an earlier output.
    let mut seen: FxHashMap<NodeId, bool> = FxHashMap::default();
    let mut outputs = Vec::with_capacity(network.primary_outputs().len());

    for &po in network.primary_outputs() {
        let top = interp.top(po.node)?;
        let applied = seen.get(&po.node).copied();
        if applied.is_some() || network.is_pi(po.node) {
            let copy = interp.pool.allocate_fresh(&mut *interp.sink);
            interp.emit(Instruction::cx(top, copy))?;
            if po.complemented != applied.unwrap_or(false) {
                interp.emit(Instruction::x(copy))?;
            }
            outputs.push(copy);
        } else {
            if po.complemented {
                interp.emit(Instruction::x(top))?;
            }
            seen.insert(po.node, po.complemented);
            outputs.push(top);
        }
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;
    use crate::schedule::{Action, BennettStrategy, FixedSchedule};
    use crate::error::SynthError;
    use qsynth_ir::{Circuit, classical};

    fn check_network(ntk: &Network, circuit: &Circuit, stats: &SynthesisStats) {
        let n = stats.input_indexes.len();
        let width = circuit.num_qubits() as usize;
        for v in 0..(1u64 << n) {
            let assignment = classical::bits_of(v, n);
            let mut state = vec![false; width];
            for (q, &bit) in stats.input_indexes.iter().zip(&assignment) {
                state[q.index()] = bit;
            }
            let out = classical::simulate(circuit, &state).unwrap();
            let expected = ntk.simulate(&assignment).unwrap();
            for (q, e) in stats.output_indexes.iter().zip(&expected) {
                assert_eq!(out[q.index()], *e, "output {q} on input {v}");
            }
            for q in 0..width {
                let is_input = stats.input_indexes.iter().any(|i| i.index() == q);
                let is_output = stats.output_indexes.iter().any(|o| o.index() == q);
                if is_input {
                    assert_eq!(out[q], state[q]);
                } else if !is_output {
                    assert!(!out[q], "qubit {q} dirty on input {v}");
                }
            }
        }
    }

    #[test]
    fn test_full_adder() {
        let mut ntk = Network::new();
        let a = ntk.create_pi();
        let b = ntk.create_pi();
        let cin = ntk.create_pi();
        let sum = ntk.create_xor3(a, b, cin);
        let carry = ntk.create_maj(a, b, cin);
        ntk.create_po(sum);
        ntk.create_po(carry);

        let mut circuit = Circuit::new("adder");
        let stats = synthesize_network(
            &mut circuit,
            &ntk,
            &mut BennettStrategy::new(),
            None,
            LogicSynthesisParams::default(),
        )
        .unwrap();
        assert_eq!(stats.input_indexes, vec![QubitId(0), QubitId(1), QubitId(2)]);
        assert_eq!(stats.required_ancillae, 2);
        assert_eq!(stats.num_qubits, 5);
        check_network(&ntk, &circuit, &stats);
    }

    #[test]
    fn test_shared_and_input_outputs_are_copied() {
        let mut ntk = Network::new();
        let a = ntk.create_pi();
        let b = ntk.create_pi();
        let and = ntk.create_and(a, b);
        ntk.create_po(and);
        ntk.create_po(!and);
        ntk.create_po(!a);

        let mut circuit = Circuit::new("copies");
        let stats = synthesize_network(
            &mut circuit,
            &ntk,
            &mut BennettStrategy::new(),
            None,
            LogicSynthesisParams::new().with_verbose(true),
        )
        .unwrap();
        assert_eq!(stats.output_indexes.len(), 3);
        assert_ne!(stats.output_indexes[0], stats.output_indexes[1]);
        assert_ne!(stats.output_indexes[2], QubitId(0));
        assert_eq!(stats.required_ancillae, 3);
        check_network(&ntk, &circuit, &stats);
    }

    #[test]
    fn test_constant_line_prepared() {
        let mut ntk = Network::new();
        let a = ntk.create_pi();
        let one = ntk.get_constant(true);
        let and = ntk.create_and(a, one);
        ntk.create_po(!and);

        let mut circuit = Circuit::new("const");
        let stats = synthesize_network(
            &mut circuit,
            &ntk,
            &mut BennettStrategy::new(),
            None,
            LogicSynthesisParams::default(),
        )
        .unwrap();
        assert_eq!(stats.num_qubits, 3);
        let width = circuit.num_qubits() as usize;
        for v in [false, true] {
            let mut state = vec![false; width];
            state[0] = v;
            let out = classical::simulate(&circuit, &state).unwrap();
            assert_eq!(out[stats.output_indexes[0].index()], !v);
        }
    }

    #[test]
    fn test_failed_schedule_emits_nothing() {
        let mut ntk = Network::new();
        let a = ntk.create_pi();
        ntk.create_po(a);
        let mut schedule = FixedSchedule::default();
        schedule.push(NodeId(42), Action::compute());

        let mut circuit = Circuit::new("fail");
        let err = synthesize_network(
            &mut circuit,
            &ntk,
            &mut schedule,
            None,
            LogicSynthesisParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SynthError::ScheduleFailed(_)));
        assert_eq!(circuit.num_qubits(), 0);
        assert!(circuit.is_empty());
    }
}
