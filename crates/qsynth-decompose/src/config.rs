//! Decomposition configuration.

use serde::{Deserialize, Serialize};

/// How a multiplexed phase over more than one qubit is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStrategy {
    /// Borrow the first qubit as the control of an incrementer over the
    /// others, with halving-angle phases on each line. Linear in the number
    /// of qubits.
    #[default]
    BorrowedAncilla,
    /// Peel one qubit at a time with two multi-controlled X gates and
    /// recurse on the rest.
    AncillaFree,
}

/// Configuration for [`crate::Decomposer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecomposeConfig {
    /// Emission strategy for multiplexed phases.
    pub phase_strategy: PhaseStrategy,
}

impl DecomposeConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the multiplexed-phase strategy.
    #[must_use]
    pub fn with_phase_strategy(mut self, strategy: PhaseStrategy) -> Self {
        self.phase_strategy = strategy;
        self
    }
}
