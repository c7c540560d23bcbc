//! Error types for logic synthesis.

use thiserror::Error;

use crate::network::NodeId;

/// Errors that can occur during logic-network and oracle synthesis.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SynthError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] qsynth_ir::IrError),

    /// The mapping strategy could not produce a schedule.
    #[error("Strategy could not be computed: {0}")]
    ScheduleFailed(String),

    /// A LUT node was reached with no single-target synthesizer installed.
    #[error("Node {0} is a LUT but no single-target synthesizer is configured")]
    MissingLutSynthesizer(NodeId),

    /// The node kind cannot be realised by the requested action.
    #[error("Node {node} of kind '{kind}' is not supported here")]
    UnsupportedNodeKind {
        /// The offending node.
        node: NodeId,
        /// Kind name.
        kind: &'static str,
    },

    /// In-place computation was requested for a non-linear node.
    #[error("Node {node} of kind '{kind}' cannot be computed in place")]
    InPlaceNotLinear {
        /// The offending node.
        node: NodeId,
        /// Kind name.
        kind: &'static str,
    },

    /// A node's location stack was read while empty.
    #[error("Node {0} has no current qubit location")]
    EmptyLocation(NodeId),

    /// A truth table is malformed or has the wrong arity.
    #[error("Invalid truth table: {0}")]
    InvalidTruthTable(String),

    /// A network reference points outside the network.
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),
}

/// Result type for synthesis operations.
pub type SynthResult<T> = Result<T, SynthError>;
