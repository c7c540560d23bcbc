//! Multiplexed X and multiplexed phase.
//!
//! A multiplexed phase of `θ` over qubits `q_0 … q_{k−1}` multiplies the
//! all-ones basis state by `e^{iθ}` and leaves every other state alone.

use qsynth_ir::{Control, GateSink, Instruction, QubitId};
use tracing::debug;

use crate::config::PhaseStrategy;
use crate::error::DecomposeResult;

/// Emit an X on `target` that fires when every control is one.
pub fn multiplexed_x<S: GateSink + ?Sized>(
    sink: &mut S,
    controls: &[QubitId],
    target: QubitId,
) -> DecomposeResult<()> {
    sink.add_gate(Instruction::mcx(
        controls.iter().copied().map(Control::positive),
        target,
    ))?;
    Ok(())
}

/// Emit `e^{iθ}` on the subspace where every qubit in `qubits` is one.
///
/// No qubits means an unconditional global phase; one qubit is a plain
/// phase gate.
pub fn multiplexed_phase<S: GateSink + ?Sized>(
    sink: &mut S,
    qubits: &[QubitId],
    theta: f64,
    strategy: PhaseStrategy,
) -> DecomposeResult<()> {
    debug!(
        "multiplexed phase {theta} over {} qubits ({strategy:?})",
        qubits.len()
    );
    match qubits {
        [] => {
            sink.add_gate(Instruction::gphase(theta))?;
            Ok(())
        }
        [q] => {
            sink.add_gate(Instruction::p(theta, *q))?;
            Ok(())
        }
        _ => match strategy {
            PhaseStrategy::BorrowedAncilla => incrementer_phase(sink, qubits, theta),
            PhaseStrategy::AncillaFree => recursive_phase(sink, qubits, theta),
        },
    }
}

/// Add `q_0` to the number held on `q_1 … q_{k−1}` (little-endian), mod
/// `2^{k−1}`.
fn controlled_increment(qubits: &[QubitId]) -> Vec<Instruction> {
    (1..qubits.len())
        .rev()
        .map(|j| {
            Instruction::mcx(
                qubits[..j].iter().copied().map(Control::positive),
                qubits[j],
            )
        })
        .collect()
}

/// Phase kickback through a controlled incrementer.
///
/// With `y` the number on `q_1 …` and `g(y) = θ·y / 2^{k−1}` the linear
/// phase applied by the halving-angle gates, the sequence
/// `inc, e^{−ig}, dec, e^{ig}, P(θ/2^{k−1}) q_0` contributes
/// `g(y) − g(y + q_0) + θ·q_0 / 2^{k−1}`, which is `θ` exactly when all
/// lines are one and zero otherwise.
fn incrementer_phase<S: GateSink + ?Sized>(
    sink: &mut S,
    qubits: &[QubitId],
    theta: f64,
) -> DecomposeResult<()> {
    let k = qubits.len();
    let weight = |j: usize| theta / (1u64 << (k - j)) as f64;
    let increment = controlled_increment(qubits);

    for gate in &increment {
        sink.add_gate(gate.clone())?;
    }
    for j in (1..k).rev() {
        sink.add_gate(Instruction::p(-weight(j), qubits[j]))?;
    }
    for gate in increment.iter().rev() {
        sink.add_gate(gate.clone())?;
    }
    for j in (1..k).rev() {
        sink.add_gate(Instruction::p(weight(j), qubits[j]))?;
    }
    sink.add_gate(Instruction::p(weight(1), qubits[0]))?;
    Ok(())
}

/// Split off the last qubit: two multi-controlled X gates around a half
/// phase leave `θ/2` on the remaining qubits, which recurses.
fn recursive_phase<S: GateSink + ?Sized>(
    sink: &mut S,
    qubits: &[QubitId],
    theta: f64,
) -> DecomposeResult<()> {
    let mut rest = qubits;
    let mut theta = theta;
    while let [controls @ .., last] = rest {
        if controls.is_empty() {
            sink.add_gate(Instruction::p(theta, *last))?;
            break;
        }
        multiplexed_x(sink, controls, *last)?;
        sink.add_gate(Instruction::p(-theta / 2.0, *last))?;
        multiplexed_x(sink, controls, *last)?;
        sink.add_gate(Instruction::p(theta / 2.0, *last))?;
        rest = controls;
        theta /= 2.0;
    }
    Ok(())
}
