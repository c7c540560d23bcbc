//! Error types for gate decomposition.

use thiserror::Error;

/// Errors that can occur while decomposing controlled gates.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecomposeError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] qsynth_ir::IrError),

    /// The instruction has no decomposition.
    #[error("Unsupported gate: {0}")]
    UnsupportedGate(String),

    /// The matrix to decompose is not unitary.
    #[error("Matrix is not unitary")]
    NotUnitary,
}

/// Result type for decomposition operations.
pub type DecomposeResult<T> = Result<T, DecomposeError>;
