//! Gray-code decomposition of multi-controlled single-axis rotations.
//!
//! A rotation `R(θ)` that fires only when all `n` controls are one is
//! rewritten with the identity
//!
//! ```text
//! Σ_{g ≠ 0} (−1)^{|g|+1} · (g · x mod 2) = 2^{n−1} · [x = 1…1]
//! ```
//!
//! so it equals the product over every non-zero control pattern `g` of
//! `R(±θ / 2^{n−1})` controlled by the parity `g · x`. Walking the patterns
//! in Gray-code order lets one CNOT update the parity held on the pattern's
//! leading control between steps. Rotations about one axis commute, which is
//! what makes the reordering exact.
//!
//! Cost is `2^n − 1` controlled rotations; there is no cheaper fallback for
//! large `n`.

use std::f64::consts::FRAC_PI_2;

use qsynth_ir::{GateSink, Instruction, QubitId};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::DecomposeResult;

/// Axis of a single-qubit rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationAxis {
    /// `Rx(θ)`.
    X,
    /// `Ry(θ)`.
    Y,
    /// `Rz(θ)`.
    Z,
    /// The phase gate `P(θ)`.
    Phase,
}

impl RotationAxis {
    /// The uncontrolled gate for angle `theta`.
    pub fn gate(self, theta: f64, target: QubitId) -> Instruction {
        match self {
            RotationAxis::X => Instruction::rx(theta, target),
            RotationAxis::Y => Instruction::ry(theta, target),
            RotationAxis::Z => Instruction::rz(theta, target),
            RotationAxis::Phase => Instruction::p(theta, target),
        }
    }

    /// Get the axis name.
    pub fn name(self) -> &'static str {
        match self {
            RotationAxis::X => "rx",
            RotationAxis::Y => "ry",
            RotationAxis::Z => "rz",
            RotationAxis::Phase => "p",
        }
    }
}

/// The reflected binary Gray code of `n` bits, starting at zero.
pub fn gray_code(n: u32) -> impl Iterator<Item = u64> {
    (0..1u64 << n).map(|k| k ^ (k >> 1))
}

/// Index of the highest set bit of a non-zero word.
#[inline]
fn highest_bit(word: u64) -> usize {
    63 - word.leading_zeros() as usize
}

/// Emit `R(angle)` on `target` controlled by the single qubit `control`.
fn controlled_rotation<S: GateSink + ?Sized>(
    sink: &mut S,
    axis: RotationAxis,
    angle: f64,
    control: QubitId,
    target: QubitId,
) -> DecomposeResult<()> {
    let half = angle / 2.0;
    let gates = match axis {
        RotationAxis::X => vec![
            Instruction::rz(-FRAC_PI_2, target),
            Instruction::cx(control, target),
            Instruction::ry(half, target),
            Instruction::cx(control, target),
            Instruction::ry(-half, target),
            Instruction::rz(FRAC_PI_2, target),
        ],
        // The phase on |11⟩ splits into half phases on each line.
        RotationAxis::Phase => vec![
            Instruction::p(half, control),
            Instruction::cx(control, target),
            Instruction::p(-half, target),
            Instruction::cx(control, target),
            Instruction::p(half, target),
        ],
        RotationAxis::Y | RotationAxis::Z => vec![
            Instruction::cx(control, target),
            axis.gate(-half, target),
            Instruction::cx(control, target),
            axis.gate(half, target),
        ],
    };
    for gate in gates {
        sink.add_gate(gate)?;
    }
    Ok(())
}

/// Emit `R(theta)` on `target`, applied only when every control is one.
///
/// All controls are positive. The result is exact, including the global
/// phase.
pub fn multiplexed_rotation<S: GateSink + ?Sized>(
    sink: &mut S,
    axis: RotationAxis,
    theta: f64,
    controls: &[QubitId],
    target: QubitId,
) -> DecomposeResult<()> {
    debug_assert!(!controls.contains(&target), "target is also a control");
    let n = controls.len();
    debug!("gray-code {}({theta}) with {n} controls", axis.name());
    if n == 0 {
        sink.add_gate(axis.gate(theta, target))?;
        return Ok(());
    }

    let step = theta / (1u64 << (n - 1)) as f64;
    let mut previous = 0u64;
    for word in gray_code(n as u32).skip(1) {
        let leading = highest_bit(word);
        if previous != 0 {
            let pivot = highest_bit(word ^ previous);
            if pivot != leading {
                sink.add_gate(Instruction::cx(controls[pivot], controls[leading]))?;
            } else {
                for i in (0..n).filter(|&i| i != leading && (word >> i) & 1 == 1) {
                    sink.add_gate(Instruction::cx(controls[i], controls[leading]))?;
                }
            }
        }
        // Odd patterns add, even patterns subtract.
        let angle = if word.count_ones() % 2 == 1 { step } else { -step };
        trace!("pattern {word:#b}: leading control {}, angle {angle}", controls[leading]);
        controlled_rotation(sink, axis, angle, controls[leading], target)?;
        previous = word;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsynth_ir::unitary::{controlled_unitary, instructions_unitary};
    use qsynth_ir::{Circuit, Control, Unitary2x2};

    fn ideal(axis: RotationAxis, theta: f64) -> Unitary2x2 {
        match axis {
            RotationAxis::X => Unitary2x2::rx(theta),
            RotationAxis::Y => Unitary2x2::ry(theta),
            RotationAxis::Z => Unitary2x2::rz(theta),
            RotationAxis::Phase => Unitary2x2::p(theta),
        }
    }

    #[test]
    fn test_gray_code_sequence() {
        let words: Vec<u64> = gray_code(3).collect();
        assert_eq!(words, vec![0, 1, 3, 2, 6, 7, 5, 4]);
    }

    #[test]
    fn test_matches_controlled_rotation() {
        for axis in [
            RotationAxis::X,
            RotationAxis::Y,
            RotationAxis::Z,
            RotationAxis::Phase,
        ] {
            for n in 0..=3u32 {
                let theta = 0.37 + f64::from(n);
                let controls: Vec<QubitId> = (0..n).map(QubitId).collect();
                let target = QubitId(n);
                let mut circuit = Circuit::with_size("gray", n + 1);
                multiplexed_rotation(&mut circuit, axis, theta, &controls, target).unwrap();

                let got = instructions_unitary(n + 1, circuit.instructions()).unwrap();
                let positive: Vec<Control> = controls.iter().copied().map(Control::from).collect();
                let want = controlled_unitary(n + 1, &positive, target, &ideal(axis, theta));
                assert!(got.approx_eq(&want, 1e-9), "{} with {n} controls", axis.name());
            }
        }
    }

    #[test]
    fn test_rotation_count() {
        for n in 1..=4u32 {
            let controls: Vec<QubitId> = (0..n).map(QubitId).collect();
            let target = QubitId(n);
            let mut circuit = Circuit::with_size("gray", n + 1);
            multiplexed_rotation(&mut circuit, RotationAxis::Z, 1.0, &controls, target).unwrap();
            let onto_target = circuit
                .instructions()
                .iter()
                .filter(|i| i.is_entangling() && i.target == Some(target))
                .count();
            assert_eq!(onto_target, 2 * ((1 << n) - 1));
        }
    }
}
