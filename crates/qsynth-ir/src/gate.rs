//! Elementary gate definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::matrix::Unitary2x2;

/// The elementary gates emitted by the synthesizers.
///
/// Every gate acts on one target qubit and may carry any number of
/// polarity-tagged controls, except [`StandardGate::GPhase`] which has no
/// target: uncontrolled it is a scalar, controlled it is a phase on the
/// subspace where all controls fire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Pauli-X (NOT).
    X,
    /// Controlled-X with exactly one control.
    CX,
    /// Multi-controlled X.
    MCX,
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Phase gate `diag(1, e^{iλ})`.
    P(f64),
    /// Generic single-qubit rotation U3(θ, φ, λ).
    U(f64, f64, f64),
    /// Global phase `e^{iθ}`.
    GPhase(f64),
}

impl StandardGate {
    /// Get the lowercase gate name.
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::X => "x",
            StandardGate::CX => "cx",
            StandardGate::MCX => "mcx",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U(..) => "u3",
            StandardGate::GPhase(_) => "gphase",
        }
    }

    /// Angle parameters in declaration order.
    pub fn parameters(&self) -> Vec<f64> {
        match *self {
            StandardGate::X | StandardGate::CX | StandardGate::MCX => vec![],
            StandardGate::Rx(t)
            | StandardGate::Ry(t)
            | StandardGate::Rz(t)
            | StandardGate::P(t)
            | StandardGate::GPhase(t) => vec![t],
            StandardGate::U(theta, phi, lambda) => vec![theta, phi, lambda],
        }
    }

    /// Check if this is a NOT-type gate (permutes basis states).
    pub fn is_classical(&self) -> bool {
        matches!(self, StandardGate::X | StandardGate::CX | StandardGate::MCX)
    }

    /// Check if this gate has a target qubit.
    pub fn has_target(&self) -> bool {
        !matches!(self, StandardGate::GPhase(_))
    }

    /// Check if applying the gate twice yields the identity.
    pub fn is_self_inverse(&self) -> bool {
        self.is_classical()
    }

    /// Get the inverse of this gate.
    pub fn inverse(&self) -> StandardGate {
        match *self {
            StandardGate::X => StandardGate::X,
            StandardGate::CX => StandardGate::CX,
            StandardGate::MCX => StandardGate::MCX,
            StandardGate::Rx(t) => StandardGate::Rx(-t),
            StandardGate::Ry(t) => StandardGate::Ry(-t),
            StandardGate::Rz(t) => StandardGate::Rz(-t),
            StandardGate::P(t) => StandardGate::P(-t),
            StandardGate::U(theta, phi, lambda) => StandardGate::U(-theta, -lambda, -phi),
            StandardGate::GPhase(t) => StandardGate::GPhase(-t),
        }
    }

    /// The 2x2 matrix applied to the target when all controls fire.
    ///
    /// Returns `None` for [`StandardGate::GPhase`], which has no target.
    pub fn base_matrix(&self) -> Option<Unitary2x2> {
        let m = match *self {
            StandardGate::X | StandardGate::CX | StandardGate::MCX => Unitary2x2::x(),
            StandardGate::Rx(t) => Unitary2x2::rx(t),
            StandardGate::Ry(t) => Unitary2x2::ry(t),
            StandardGate::Rz(t) => Unitary2x2::rz(t),
            StandardGate::P(t) => Unitary2x2::p(t),
            StandardGate::U(theta, phi, lambda) => Unitary2x2::u3(theta, phi, lambda),
            StandardGate::GPhase(_) => return None,
        };
        Some(m)
    }
}

impl fmt::Display for StandardGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.parameters();
        if params.is_empty() {
            write!(f, "{}", self.name())
        } else {
            let rendered: Vec<String> = params.iter().map(|p| format!("{p}")).collect();
            write!(f, "{}({})", self.name(), rendered.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_names() {
        assert_eq!(StandardGate::MCX.name(), "mcx");
        assert_eq!(StandardGate::U(0.0, 0.0, 0.0).name(), "u3");
        assert_eq!(format!("{}", StandardGate::Rz(0.5)), "rz(0.5)");
        assert_eq!(format!("{}", StandardGate::CX), "cx");
    }

    #[test]
    fn test_inverse_u3() {
        let u = StandardGate::U(0.4, 1.0, -0.3);
        let m = u.base_matrix().unwrap();
        let inv = u.inverse().base_matrix().unwrap();
        assert!((m * inv).approx_eq(&Unitary2x2::identity(), 1e-10));
    }

    #[test]
    fn test_classical_gates() {
        assert!(StandardGate::MCX.is_classical());
        assert!(StandardGate::CX.is_self_inverse());
        assert!(!StandardGate::P(0.1).is_classical());
        assert!(!StandardGate::GPhase(0.1).has_target());
        assert!(StandardGate::GPhase(0.1).base_matrix().is_none());
    }
}
