//! Ancilla bookkeeping: the free list of reusable qubits and the per-node
//! location stacks.

use qsynth_ir::{GateSink, QubitId};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{SynthError, SynthResult};
use crate::network::NodeId;

/// Allocation counters of an [`AncillaPool`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncillaStats {
    /// Lines added to the register by the pool.
    pub fresh: u32,
    /// Requests served from the free list.
    pub reused: u32,
    /// Calls to [`AncillaPool::release`].
    pub released: u32,
}

/// Free list of released qubit indices.
///
/// Released qubits must already be back in |0⟩; the pool does not check.
#[derive(Debug, Clone, Default)]
pub struct AncillaPool {
    free: Vec<QubitId>,
    stats: AncillaStats,
}

impl AncillaPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grow the register by one clean line.
    pub fn allocate_fresh<S: GateSink + ?Sized>(&mut self, sink: &mut S) -> QubitId {
        let q = sink.add_qubit();
        self.stats.fresh += 1;
        trace!("fresh ancilla {q}");
        q
    }

    /// Reuse the most recently released qubit, or grow the register.
    pub fn allocate_recycled<S: GateSink + ?Sized>(&mut self, sink: &mut S) -> QubitId {
        match self.free.pop() {
            Some(q) => {
                self.stats.reused += 1;
                trace!("recycled ancilla {q}");
                q
            }
            None => self.allocate_fresh(sink),
        }
    }

    /// Return a qubit for logical reuse.
    pub fn release(&mut self, qubit: QubitId) {
        self.stats.released += 1;
        self.free.push(qubit);
    }

    /// Number of qubits currently on the free list.
    pub fn num_free(&self) -> usize {
        self.free.len()
    }

    /// Allocation counters.
    pub fn stats(&self) -> AncillaStats {
        self.stats
    }
}

/// Per-node stacks of the qubit currently holding each node's value.
#[derive(Debug, Clone, Default)]
pub struct QubitLocationTable {
    stacks: Vec<Vec<QubitId>>,
}

impl QubitLocationTable {
    /// Create a table for `num_nodes` nodes.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            stacks: vec![Vec::new(); num_nodes],
        }
    }

    fn stack_mut(&mut self, node: NodeId) -> &mut Vec<QubitId> {
        if node.index() >= self.stacks.len() {
            self.stacks.resize_with(node.index() + 1, Vec::new);
        }
        &mut self.stacks[node.index()]
    }

    /// Record `qubit` as the current location of `node`.
    pub fn push(&mut self, node: NodeId, qubit: QubitId) {
        self.stack_mut(node).push(qubit);
    }

    /// Drop the current location of `node`, returning it.
    pub fn pop(&mut self, node: NodeId) -> SynthResult<QubitId> {
        self.stack_mut(node).pop().ok_or(SynthError::EmptyLocation(node))
    }

    /// The current location of `node`.
    pub fn top(&self, node: NodeId) -> SynthResult<QubitId> {
        self.stacks
            .get(node.index())
            .and_then(|s| s.last().copied())
            .ok_or(SynthError::EmptyLocation(node))
    }

    /// Number of live locations of `node`.
    pub fn depth(&self, node: NodeId) -> usize {
        self.stacks.get(node.index()).map_or(0, Vec::len)
    }
}
