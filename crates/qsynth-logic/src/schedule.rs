//! Synthesis schedules and the strategies that produce them.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SynthError, SynthResult};
use crate::network::{LogicNetwork, NodeId};
use crate::truth_table::TruthTable;

/// A function realised on explicit leaves instead of the node's fan-ins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellOverride {
    /// Function over the leaves; variable `i` is leaf `i`.
    pub function: TruthTable,
    /// Leaf nodes supplying the function's inputs.
    pub leaves: Vec<NodeId>,
}

/// One operand cone of a two-input node in a level.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cone {
    /// The node whose value the cone computes.
    pub root: NodeId,
    /// Leaves whose XOR is the cone value, sorted ascending.
    pub leaves: Vec<NodeId>,
    /// Leaves pre-accumulated into a shared copy ancilla, sorted ascending.
    pub copies: Vec<NodeId>,
    /// Node whose qubit hosts the cone value instead of a new ancilla.
    pub target: Option<NodeId>,
    /// Whether the operand is used complemented.
    pub complemented: bool,
}

impl Cone {
    /// A cone over `leaves` with no copies and no target override.
    pub fn new(root: NodeId, leaves: Vec<NodeId>) -> Self {
        let mut leaves = leaves;
        leaves.sort_unstable();
        Self {
            root,
            leaves,
            ..Self::default()
        }
    }

    /// Use a shared copy ancilla holding the XOR of `copies`.
    #[must_use]
    pub fn with_copies(mut self, copies: Vec<NodeId>) -> Self {
        self.copies = copies;
        self.copies.sort_unstable();
        self
    }

    /// Host the cone value on `target`'s current qubit.
    #[must_use]
    pub fn with_target(mut self, target: NodeId) -> Self {
        self.target = Some(target);
        self
    }

    /// Mark the operand as complemented.
    #[must_use]
    pub fn complemented(mut self, complemented: bool) -> Self {
        self.complemented = complemented;
        self
    }

    /// Leaves not covered by the copy ancilla (sorted symmetric difference).
    pub fn remaining_leaves(&self) -> Vec<NodeId> {
        let copies: FxHashSet<NodeId> = self.copies.iter().copied().collect();
        let leaves: FxHashSet<NodeId> = self.leaves.iter().copied().collect();
        let mut rem: Vec<NodeId> = self
            .leaves
            .iter()
            .filter(|l| !copies.contains(l))
            .chain(self.copies.iter().filter(|c| !leaves.contains(c)))
            .copied()
            .collect();
        rem.sort_unstable();
        rem
    }
}

/// One node of a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelNode {
    /// A two-input AND or XOR node fed by two cones.
    Binary {
        /// The node being computed.
        node: NodeId,
        /// Operand cones, in fan-in order.
        cones: [Cone; 2],
    },
    /// An n-ary XOR computed directly from its fan-ins.
    NaryXor {
        /// The node being computed.
        node: NodeId,
    },
}

impl LevelNode {
    /// The node this entry computes.
    pub fn node(&self) -> NodeId {
        match self {
            LevelNode::Binary { node, .. } | LevelNode::NaryXor { node } => *node,
        }
    }
}

/// An instruction to the action interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Compute the node into a new ancilla.
    Compute {
        /// Compute the XOR of these leaves instead of the node function.
        leaves: Option<Vec<NodeId>>,
        /// Compute this function of explicit leaves instead.
        cell_override: Option<CellOverride>,
    },
    /// Uncompute the node from its current qubit and release it.
    Uncompute {
        /// Leaves used by the matching compute.
        leaves: Option<Vec<NodeId>>,
        /// Override used by the matching compute.
        cell_override: Option<CellOverride>,
    },
    /// Compute a linear node onto another node's current qubit.
    ComputeInPlace {
        /// Node whose qubit is overwritten.
        target: NodeId,
        /// Compute the XOR of these leaves instead of the node function.
        leaves: Option<Vec<NodeId>>,
    },
    /// Undo a [`Action::ComputeInPlace`].
    UncomputeInPlace {
        /// Node whose qubit was overwritten.
        target: NodeId,
        /// Leaves used by the matching compute.
        leaves: Option<Vec<NodeId>>,
    },
    /// Alias `leaf`'s current qubit as `target`'s location.
    Buffer {
        /// Node whose location is reused.
        leaf: NodeId,
        /// Node that receives the alias.
        target: NodeId,
    },
    /// Compute a batch of independent nodes with cone sharing.
    ComputeLevel(Vec<LevelNode>),
    /// Undo a [`Action::ComputeLevel`].
    UncomputeLevel(Vec<LevelNode>),
}

impl Action {
    /// A plain compute of the node function.
    pub fn compute() -> Self {
        Action::Compute {
            leaves: None,
            cell_override: None,
        }
    }

    /// A plain uncompute of the node function.
    pub fn uncompute() -> Self {
        Action::Uncompute {
            leaves: None,
            cell_override: None,
        }
    }

    /// Get the action name.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Compute { .. } => "compute",
            Action::Uncompute { .. } => "uncompute",
            Action::ComputeInPlace { .. } => "compute_inplace",
            Action::UncomputeInPlace { .. } => "uncompute_inplace",
            Action::Buffer { .. } => "buffer",
            Action::ComputeLevel(_) => "compute_level",
            Action::UncomputeLevel(_) => "uncompute_level",
        }
    }
}

/// A scheduled action on a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// The node the action refers to.
    pub node: NodeId,
    /// What to do.
    pub action: Action,
}

impl Step {
    /// Create a step.
    pub fn new(node: NodeId, action: Action) -> Self {
        Self { node, action }
    }
}

/// Produces the ordered action stream for a network.
///
/// The returned order must be feasible: every compute precedes its uses, and
/// every compute whose node is not a primary output is matched by exactly one
/// later uncompute. The interpreter does not validate this.
pub trait MappingStrategy<N: LogicNetwork + ?Sized> {
    /// Get the strategy name.
    fn name(&self) -> &str;

    /// Compute the schedule for `network`.
    fn compute_steps(&mut self, network: &N) -> SynthResult<Vec<Step>>;
}

/// Computes every gate in topological order and uncomputes every non-output
/// gate in reverse order.
#[derive(Debug, Clone, Copy, Default)]
pub struct BennettStrategy;

impl BennettStrategy {
    /// Create the strategy.
    pub fn new() -> Self {
        Self
    }
}

impl<N: LogicNetwork + ?Sized> MappingStrategy<N> for BennettStrategy {
    fn name(&self) -> &str {
        "bennett"
    }

    fn compute_steps(&mut self, network: &N) -> SynthResult<Vec<Step>> {
        let gates = network.gates();
        let mut graph: DiGraph<NodeId, ()> = DiGraph::with_capacity(gates.len(), gates.len() * 2);
        let mut index_of = vec![None::<NodeIndex>; network.size()];
        for &g in &gates {
            index_of[g.index()] = Some(graph.add_node(g));
        }
        for &g in &gates {
            for fanin in network.fanins(g) {
                let Some(slot) = index_of.get(fanin.node.index()) else {
                    return Err(SynthError::ScheduleFailed(format!(
                        "node {g} references missing node {}",
                        fanin.node
                    )));
                };
                if let (Some(from), Some(to)) = (*slot, index_of[g.index()]) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        let order = toposort(&graph, None).map_err(|cycle| {
            SynthError::ScheduleFailed(format!(
                "network has a cycle through node {}",
                graph[cycle.node_id()]
            ))
        })?;

        let outputs: FxHashSet<NodeId> =
            network.primary_outputs().iter().map(|s| s.node).collect();
        let mut steps: Vec<Step> = order
            .iter()
            .map(|&ix| Step::new(graph[ix], Action::compute()))
            .collect();
        steps.extend(
            order
                .iter()
                .rev()
                .map(|&ix| graph[ix])
                .filter(|n| !outputs.contains(n))
                .map(|n| Step::new(n, Action::uncompute())),
        );
        debug!("Bennett schedule: {} steps for {} gates", steps.len(), gates.len());
        Ok(steps)
    }
}

/// An externally supplied schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedSchedule {
    steps: Vec<Step>,
}

impl FixedSchedule {
    /// Wrap an action list.
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Append a step.
    pub fn push(&mut self, node: NodeId, action: Action) -> &mut Self {
        self.steps.push(Step::new(node, action));
        self
    }
}

impl<N: LogicNetwork + ?Sized> MappingStrategy<N> for FixedSchedule {
    fn name(&self) -> &str {
        "fixed"
    }

    fn compute_steps(&mut self, network: &N) -> SynthResult<Vec<Step>> {
        if let Some(step) = self.steps.iter().find(|s| s.node.index() >= network.size()) {
            return Err(SynthError::ScheduleFailed(format!(
                "step references node {} outside the network",
                step.node
            )));
        }
        Ok(self.steps.clone())
    }
}
