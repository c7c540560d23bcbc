//! Gate instructions combining a gate with its operands.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gate::StandardGate;
use crate::qubit::{Control, QubitId};

/// One emitted gate with polarity-tagged controls and an optional target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The gate.
    pub gate: StandardGate,
    /// Control lines, in emission order.
    pub controls: Vec<Control>,
    /// Target qubit; `None` only for global phase.
    pub target: Option<QubitId>,
}

impl Instruction {
    /// Create an instruction from its parts.
    pub fn gate(
        gate: StandardGate,
        controls: impl IntoIterator<Item = Control>,
        target: Option<QubitId>,
    ) -> Self {
        Self {
            gate,
            controls: controls.into_iter().collect(),
            target,
        }
    }

    /// Create an uncontrolled single-qubit gate.
    pub fn single(gate: StandardGate, target: QubitId) -> Self {
        Self::gate(gate, [], Some(target))
    }

    /// Create a NOT gate.
    pub fn x(target: QubitId) -> Self {
        Self::single(StandardGate::X, target)
    }

    /// Create a CNOT with a positive control.
    pub fn cx(control: QubitId, target: QubitId) -> Self {
        Self::gate(StandardGate::CX, [Control::positive(control)], Some(target))
    }

    /// Create a CNOT with explicit control polarity.
    pub fn cx_polarity(control: Control, target: QubitId) -> Self {
        Self::gate(StandardGate::CX, [control], Some(target))
    }

    /// Create a multi-controlled X.
    ///
    /// Zero controls yields `X`, one control yields `CX`.
    pub fn mcx(controls: impl IntoIterator<Item = Control>, target: QubitId) -> Self {
        let controls: Vec<Control> = controls.into_iter().collect();
        let gate = match controls.len() {
            0 => StandardGate::X,
            1 => StandardGate::CX,
            _ => StandardGate::MCX,
        };
        Self {
            gate,
            controls,
            target: Some(target),
        }
    }

    /// Create an Rx gate.
    pub fn rx(theta: f64, target: QubitId) -> Self {
        Self::single(StandardGate::Rx(theta), target)
    }

    /// Create an Ry gate.
    pub fn ry(theta: f64, target: QubitId) -> Self {
        Self::single(StandardGate::Ry(theta), target)
    }

    /// Create an Rz gate.
    pub fn rz(theta: f64, target: QubitId) -> Self {
        Self::single(StandardGate::Rz(theta), target)
    }

    /// Create a phase gate.
    pub fn p(lambda: f64, target: QubitId) -> Self {
        Self::single(StandardGate::P(lambda), target)
    }

    /// Create a U3 gate.
    pub fn u(theta: f64, phi: f64, lambda: f64, target: QubitId) -> Self {
        Self::single(StandardGate::U(theta, phi, lambda), target)
    }

    /// Create an uncontrolled global phase.
    pub fn gphase(theta: f64) -> Self {
        Self::gate(StandardGate::GPhase(theta), [], None)
    }

    /// All qubits touched by this instruction, controls first.
    pub fn qubits(&self) -> Vec<QubitId> {
        self.controls
            .iter()
            .map(|c| c.qubit)
            .chain(self.target)
            .collect()
    }

    /// Get the gate name.
    pub fn name(&self) -> &'static str {
        self.gate.name()
    }

    /// Check if this instruction only permutes basis states.
    pub fn is_classical(&self) -> bool {
        self.gate.is_classical()
    }

    /// Check if this instruction is in the elementary output gate set.
    ///
    /// Elementary means an uncontrolled single-qubit gate, a global phase,
    /// or an X with any number of controls.
    pub fn is_elementary(&self) -> bool {
        self.controls.is_empty() || self.is_classical()
    }

    /// Check if this instruction touches two or more qubits.
    pub fn is_entangling(&self) -> bool {
        self.qubits().len() >= 2
    }

    /// Get the inverse instruction.
    pub fn inverse(&self) -> Self {
        Self {
            gate: self.gate.inverse(),
            controls: self.controls.clone(),
            target: self.target,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gate)?;
        let controls: Vec<String> = self.controls.iter().map(ToString::to_string).collect();
        match (controls.is_empty(), self.target) {
            (true, Some(t)) => write!(f, " {t}"),
            (false, Some(t)) => write!(f, " {} -> {t}", controls.join(", ")),
            (false, None) => write!(f, " {}", controls.join(", ")),
            (true, None) => Ok(()),
        }
    }
}
