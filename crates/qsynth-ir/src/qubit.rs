//! Qubit handles and polarity-tagged controls.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a qubit line in a register.
///
/// Indices grow monotonically and are never destroyed. Releasing a qubit
/// only returns its index for logical reuse; the line itself persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// The index as a `usize`, for addressing bit positions and slices.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// A control line with polarity.
///
/// A positive control fires on |1⟩, a negative control on |0⟩.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Control {
    /// The controlling qubit.
    pub qubit: QubitId,
    /// `true` when the control fires on |1⟩.
    pub positive: bool,
}

impl Control {
    /// A control that fires on |1⟩.
    pub fn positive(qubit: QubitId) -> Self {
        Self {
            qubit,
            positive: true,
        }
    }

    /// A control that fires on |0⟩.
    pub fn negative(qubit: QubitId) -> Self {
        Self {
            qubit,
            positive: false,
        }
    }

    /// A control with explicit polarity.
    pub fn with_polarity(qubit: QubitId, positive: bool) -> Self {
        Self { qubit, positive }
    }

    /// Check whether this control fires for the given basis value of its qubit.
    #[inline]
    pub fn fires(&self, value: bool) -> bool {
        value == self.positive
    }
}

impl From<QubitId> for Control {
    fn from(qubit: QubitId) -> Self {
        Control::positive(qubit)
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.positive {
            write!(f, "{}", self.qubit)
        } else {
            write!(f, "!{}", self.qubit)
        }
    }
}
