//! Controlled U3 through the A·X·B·X·C factorization.
//!
//! With `U3(θ, φ, λ) = e^{i(φ+λ)/2} · Rz(φ) · Ry(θ) · Rz(λ)` and
//!
//! ```text
//! A = Rz(φ) · Ry(θ/2)
//! B = Ry(−θ/2) · Rz(−(φ+λ)/2)
//! C = Rz((λ−φ)/2)
//! ```
//!
//! `A·B·C = I` and `A·X·B·X·C = Rz(φ)·Ry(θ)·Rz(λ)`. Only the two multiplexed
//! X gates and the closing multiplexed phase `e^{i(φ+λ)/2}` on the controls
//! grow with the number of controls.

use qsynth_ir::{GateSink, Instruction, QubitId};
use tracing::debug;

use crate::config::PhaseStrategy;
use crate::error::DecomposeResult;
use crate::multiplexed::{multiplexed_phase, multiplexed_x};

/// Emit `U3(theta, phi, lambda)` on `target`, applied only when every
/// control is one.
///
/// Without controls this is the U3 gate itself.
pub fn controlled_u3<S: GateSink + ?Sized>(
    sink: &mut S,
    (theta, phi, lambda): (f64, f64, f64),
    controls: &[QubitId],
    target: QubitId,
    strategy: PhaseStrategy,
) -> DecomposeResult<()> {
    debug_assert!(!controls.contains(&target), "target is also a control");
    if controls.is_empty() {
        sink.add_gate(Instruction::u(theta, phi, lambda, target))?;
        return Ok(());
    }
    debug!(
        "abc u3({theta}, {phi}, {lambda}) with {} controls",
        controls.len()
    );

    sink.add_gate(Instruction::rz((lambda - phi) / 2.0, target))?;
    multiplexed_x(sink, controls, target)?;
    sink.add_gate(Instruction::rz(-(lambda + phi) / 2.0, target))?;
    sink.add_gate(Instruction::ry(-theta / 2.0, target))?;
    multiplexed_x(sink, controls, target)?;
    sink.add_gate(Instruction::ry(theta / 2.0, target))?;
    sink.add_gate(Instruction::rz(phi, target))?;
    multiplexed_phase(sink, controls, (lambda + phi) / 2.0, strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsynth_ir::unitary::{circuit_unitary, controlled_unitary};
    use qsynth_ir::{Circuit, Control, Unitary2x2};

    #[test]
    fn test_zero_controls_is_u3() {
        let mut circuit = Circuit::with_size("u", 1);
        controlled_u3(
            &mut circuit,
            (0.3, 0.2, 0.1),
            &[],
            QubitId(0),
            PhaseStrategy::default(),
        )
        .unwrap();
        assert_eq!(circuit.instructions(), &[Instruction::u(0.3, 0.2, 0.1, QubitId(0))]);
    }

    #[test]
    fn test_controlled_u3_exact() {
        let params = (1.1, -0.7, 2.3);
        for strategy in [PhaseStrategy::BorrowedAncilla, PhaseStrategy::AncillaFree] {
            for n in 1..=3u32 {
                let controls: Vec<QubitId> = (0..n).map(QubitId).collect();
                let target = QubitId(n);
                let mut circuit = Circuit::with_size("abc", n + 1);
                controlled_u3(&mut circuit, params, &controls, target, strategy).unwrap();

                let got = circuit_unitary(&circuit).unwrap();
                let positive: Vec<Control> = controls.iter().copied().map(Control::from).collect();
                let u = Unitary2x2::u3(params.0, params.1, params.2);
                let want = controlled_unitary(n + 1, &positive, target, &u);
                assert!(got.approx_eq(&want, 1e-9), "{strategy:?} with {n} controls");
            }
        }
    }
}
