//! Error types for the IR crate.

use crate::qubit::QubitId;
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit not allocated in the circuit.
    #[error("Qubit {qubit} not found in circuit{}", format_gate_context(.gate_name))]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// The same qubit appears twice in one instruction.
    #[error("Duplicate qubit {qubit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// A gate that acts on a qubit was given no target.
    #[error("Gate '{gate_name}' requires a target qubit")]
    MissingTarget {
        /// Name of the gate.
        gate_name: String,
    },

    /// Gate requires a different number of controls.
    #[error("Gate '{gate_name}' requires {expected} controls, got {got}")]
    ControlCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of controls.
        expected: usize,
        /// Actual number of controls provided.
        got: usize,
    },

    /// Basis-state simulation met a gate that does not permute basis states.
    #[error("Gate '{0}' is not a classical reversible gate")]
    NotReversible(String),

    /// Simulation input does not match the register width.
    #[error("Expected {expected} input bits, got {got}")]
    InputWidthMismatch {
        /// Register width.
        expected: usize,
        /// Bits supplied.
        got: usize,
    },
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
