//! Decomposition of arbitrary controlled gates into the elementary set.

use qsynth_ir::matrix::EPSILON;
use qsynth_ir::{Circuit, Control, GateSink, Instruction, QubitId, StandardGate, Unitary2x2};
use tracing::{debug, info, instrument};

use crate::abc::controlled_u3;
use crate::config::DecomposeConfig;
use crate::error::{DecomposeError, DecomposeResult};
use crate::gray_code::{RotationAxis, multiplexed_rotation};
use crate::multiplexed::multiplexed_phase;

/// Tolerance for accepting a matrix as unitary.
const UNITARY_TOLERANCE: f64 = 1e-8;

/// Rewrites controlled gates into single-qubit gates, multi-controlled X,
/// and global phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decomposer {
    config: DecomposeConfig,
}

impl Decomposer {
    /// Create a decomposer.
    pub fn new(config: DecomposeConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &DecomposeConfig {
        &self.config
    }

    /// Emit the elementary gates of `instruction`.
    ///
    /// Elementary instructions are copied through unchanged.
    pub fn decompose_instruction<S: GateSink + ?Sized>(
        &self,
        sink: &mut S,
        instruction: &Instruction,
    ) -> DecomposeResult<()> {
        if instruction.is_elementary() {
            sink.add_gate(instruction.clone())?;
            return Ok(());
        }
        debug!("decomposing {instruction}");

        let strategy = self.config.phase_strategy;
        let controls = &instruction.controls;
        let rotation = |axis: RotationAxis, theta: f64, target: QubitId, sink: &mut S| {
            conjugated(sink, controls, |sink, qubits| {
                multiplexed_rotation(sink, axis, theta, qubits, target)
            })
        };
        match (instruction.gate, instruction.target) {
            (StandardGate::Rx(theta), Some(t)) => rotation(RotationAxis::X, theta, t, sink),
            (StandardGate::Ry(theta), Some(t)) => rotation(RotationAxis::Y, theta, t, sink),
            (StandardGate::Rz(theta), Some(t)) => rotation(RotationAxis::Z, theta, t, sink),
            (StandardGate::P(theta), Some(t)) => rotation(RotationAxis::Phase, theta, t, sink),
            (StandardGate::U(theta, phi, lambda), Some(target)) => {
                conjugated(sink, controls, |sink, qubits| {
                    controlled_u3(sink, (theta, phi, lambda), qubits, target, strategy)
                })
            }
            (StandardGate::GPhase(theta), None) => conjugated(sink, controls, |sink, qubits| {
                multiplexed_phase(sink, qubits, theta, strategy)
            }),
            _ => Err(DecomposeError::UnsupportedGate(instruction.to_string())),
        }
    }

    /// Emit `u` on `target`, applied only when every control fires.
    ///
    /// The matrix is split into U3 parameters and a global phase; the phase
    /// becomes a multiplexed phase over the controls so the result is exact.
    pub fn decompose_unitary<S: GateSink + ?Sized>(
        &self,
        sink: &mut S,
        u: &Unitary2x2,
        controls: &[Control],
        target: QubitId,
    ) -> DecomposeResult<()> {
        if !u.is_unitary(UNITARY_TOLERANCE) {
            return Err(DecomposeError::NotUnitary);
        }
        let (theta, phi, lambda, phase) = u.to_u3();
        debug!(
            "unitary -> u3({theta}, {phi}, {lambda}) with phase {phase} and {} controls",
            controls.len()
        );
        let strategy = self.config.phase_strategy;
        conjugated(sink, controls, |sink, qubits| {
            controlled_u3(sink, (theta, phi, lambda), qubits, target, strategy)?;
            if phase.abs() > EPSILON {
                multiplexed_phase(sink, qubits, phase, strategy)?;
            }
            Ok(())
        })
    }

    /// Decompose every instruction of `circuit` into a new circuit.
    #[instrument(skip(self, circuit), fields(name = circuit.name()))]
    pub fn decompose_circuit(&self, circuit: &Circuit) -> DecomposeResult<Circuit> {
        info!(
            "Decomposing circuit with {} qubits and {} instructions",
            circuit.num_qubits(),
            circuit.len()
        );
        let mut out = Circuit::with_size(circuit.name(), circuit.num_qubits());
        for instruction in circuit.instructions() {
            self.decompose_instruction(&mut out, instruction)?;
        }
        info!(
            "Decomposition completed: {} instructions, {} entangling",
            out.len(),
            out.entangling_count()
        );
        Ok(out)
    }
}

/// Run `body` with every negative control flipped to positive.
fn conjugated<S, F>(sink: &mut S, controls: &[Control], body: F) -> DecomposeResult<()>
where
    S: GateSink + ?Sized,
    F: FnOnce(&mut S, &[QubitId]) -> DecomposeResult<()>,
{
    let negative: Vec<QubitId> = controls
        .iter()
        .filter(|c| !c.positive)
        .map(|c| c.qubit)
        .collect();
    let qubits: Vec<QubitId> = controls.iter().map(|c| c.qubit).collect();

    for &q in &negative {
        sink.add_gate(Instruction::x(q))?;
    }
    body(sink, &qubits)?;
    for &q in &negative {
        sink.add_gate(Instruction::x(q))?;
    }
    Ok(())
}
