//! Boolean logic networks.
//!
//! [`LogicNetwork`] is the read-only view the synthesizer consumes;
//! [`Network`] is a concrete builder whose node ids are assigned in creation
//! order, so every fan-in precedes its fan-out.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Not;

use crate::error::{SynthError, SynthResult};
use crate::truth_table::TruthTable;

/// Index of a node in a logic network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The index as a `usize`.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reference to a node, optionally complemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signal {
    /// The referenced node.
    pub node: NodeId,
    /// Whether the node's value is negated.
    pub complemented: bool,
}

impl Signal {
    /// A non-complemented reference.
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            complemented: false,
        }
    }
}

impl Not for Signal {
    type Output = Signal;

    fn not(self) -> Signal {
        Signal {
            node: self.node,
            complemented: !self.complemented,
        }
    }
}

/// The function computed by a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A constant with the given value.
    Constant(bool),
    /// A primary input.
    Input,
    /// Two-input AND.
    And,
    /// Two-input OR.
    Or,
    /// Two-input XOR.
    Xor,
    /// Three-input XOR.
    Xor3,
    /// XOR of any number of inputs.
    NaryXor,
    /// Three-input majority.
    Maj,
    /// Arbitrary function of the fan-ins; variable `i` is fan-in `i`.
    Lut(TruthTable),
}

impl NodeKind {
    /// Get the kind name.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Constant(_) => "constant",
            NodeKind::Input => "input",
            NodeKind::And => "and",
            NodeKind::Or => "or",
            NodeKind::Xor => "xor",
            NodeKind::Xor3 => "xor3",
            NodeKind::NaryXor => "nary_xor",
            NodeKind::Maj => "maj",
            NodeKind::Lut(_) => "lut",
        }
    }

    /// Check if the node computes a linear (XOR-type) function.
    pub fn is_linear(&self) -> bool {
        matches!(self, NodeKind::Xor | NodeKind::Xor3 | NodeKind::NaryXor)
    }

    /// Check if the node is a gate, i.e. neither constant nor input.
    pub fn is_gate(&self) -> bool {
        !matches!(self, NodeKind::Constant(_) | NodeKind::Input)
    }

    /// Evaluate the node on the values of its fan-in signals.
    pub fn evaluate(&self, fanins: &[bool]) -> bool {
        match self {
            NodeKind::Constant(v) => *v,
            NodeKind::Input => false,
            NodeKind::And => fanins.iter().all(|&b| b),
            NodeKind::Or => fanins.iter().any(|&b| b),
            NodeKind::Xor | NodeKind::Xor3 | NodeKind::NaryXor => {
                fanins.iter().fold(false, |acc, &b| acc ^ b)
            }
            NodeKind::Maj => fanins.iter().filter(|&&b| b).count() * 2 > fanins.len(),
            NodeKind::Lut(tt) => {
                let x = fanins
                    .iter()
                    .enumerate()
                    .fold(0u64, |acc, (i, &b)| acc | (u64::from(b) << i));
                tt.get(x)
            }
        }
    }
}

/// Read-only view of a logic network.
pub trait LogicNetwork {
    /// Number of nodes, including constants and inputs.
    fn size(&self) -> usize;

    /// The function of `node`.
    fn kind(&self, node: NodeId) -> &NodeKind;

    /// Ordered, polarity-tagged fan-ins of `node`.
    fn fanins(&self, node: NodeId) -> &[Signal];

    /// Number of references to `node` from other nodes and primary outputs.
    fn fanout_size(&self, node: NodeId) -> u32;

    /// Primary inputs in declaration order.
    fn primary_inputs(&self) -> &[NodeId];

    /// Primary outputs in declaration order.
    fn primary_outputs(&self) -> &[Signal];

    /// Check if `node` is a constant.
    fn is_constant(&self, node: NodeId) -> bool {
        matches!(self.kind(node), NodeKind::Constant(_))
    }

    /// Check if `node` is a primary input.
    fn is_pi(&self, node: NodeId) -> bool {
        matches!(self.kind(node), NodeKind::Input)
    }

    /// All node ids in index order.
    fn nodes(&self) -> Vec<NodeId> {
        (0..self.size() as u32).map(NodeId).collect()
    }

    /// All gate nodes in index order.
    fn gates(&self) -> Vec<NodeId> {
        self.nodes()
            .into_iter()
            .filter(|&n| self.kind(n).is_gate())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NodeData {
    kind: NodeKind,
    fanins: Vec<Signal>,
    fanout: u32,
}

/// A logic network built node by node.
///
/// Node `0` is the constant-false node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    nodes: Vec<NodeData>,
    inputs: Vec<NodeId>,
    outputs: Vec<Signal>,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    /// Create a network holding only the constant node.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Constant(false),
                fanins: vec![],
                fanout: 0,
            }],
            inputs: vec![],
            outputs: vec![],
        }
    }

    /// The constant signal with the given value.
    pub fn get_constant(&self, value: bool) -> Signal {
        Signal {
            node: NodeId(0),
            complemented: value,
        }
    }

    fn add_node(&mut self, kind: NodeKind, fanins: Vec<Signal>) -> Signal {
        for s in &fanins {
            debug_assert!(s.node.index() < self.nodes.len(), "fan-in {} does not exist", s.node);
            self.nodes[s.node.index()].fanout += 1;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            fanins,
            fanout: 0,
        });
        Signal::new(id)
    }

    /// Add a primary input.
    pub fn create_pi(&mut self) -> Signal {
        let s = self.add_node(NodeKind::Input, vec![]);
        self.inputs.push(s.node);
        s
    }

    /// Declare a primary output.
    pub fn create_po(&mut self, signal: Signal) {
        self.nodes[signal.node.index()].fanout += 1;
        self.outputs.push(signal);
    }

    /// Add an AND node.
    pub fn create_and(&mut self, a: Signal, b: Signal) -> Signal {
        self.add_node(NodeKind::And, vec![a, b])
    }

    /// Add an OR node.
    pub fn create_or(&mut self, a: Signal, b: Signal) -> Signal {
        self.add_node(NodeKind::Or, vec![a, b])
    }

    /// Add a two-input XOR node.
    pub fn create_xor(&mut self, a: Signal, b: Signal) -> Signal {
        self.add_node(NodeKind::Xor, vec![a, b])
    }

    /// Add a three-input XOR node.
    pub fn create_xor3(&mut self, a: Signal, b: Signal, c: Signal) -> Signal {
        self.add_node(NodeKind::Xor3, vec![a, b, c])
    }

    /// Add an n-ary XOR node.
    pub fn create_nary_xor(&mut self, fanins: Vec<Signal>) -> Signal {
        self.add_node(NodeKind::NaryXor, fanins)
    }

    /// Add a majority node.
    pub fn create_maj(&mut self, a: Signal, b: Signal, c: Signal) -> Signal {
        self.add_node(NodeKind::Maj, vec![a, b, c])
    }

    /// Add a LUT node computing `function` of `fanins`.
    pub fn create_lut(&mut self, fanins: Vec<Signal>, function: TruthTable) -> SynthResult<Signal> {
        if function.num_vars() as usize != fanins.len() {
            return Err(SynthError::InvalidTruthTable(format!(
                "LUT has {} fan-ins but its function has {} variables",
                fanins.len(),
                function.num_vars()
            )));
        }
        Ok(self.add_node(NodeKind::Lut(function), fanins))
    }

    /// Evaluate every primary output on the given input assignment.
    pub fn simulate(&self, inputs: &[bool]) -> SynthResult<Vec<bool>> {
        if inputs.len() != self.inputs.len() {
            return Err(SynthError::InvalidNetwork(format!(
                "expected {} input values, got {}",
                self.inputs.len(),
                inputs.len()
            )));
        }
        let mut values = vec![false; self.nodes.len()];
        for (&pi, &v) in self.inputs.iter().zip(inputs) {
            values[pi.index()] = v;
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if matches!(node.kind, NodeKind::Input) {
                continue;
            }
            let fanins: Vec<bool> = node
                .fanins
                .iter()
                .map(|s| values[s.node.index()] ^ s.complemented)
                .collect();
            values[i] = node.kind.evaluate(&fanins);
        }
        Ok(self
            .outputs
            .iter()
            .map(|s| values[s.node.index()] ^ s.complemented)
            .collect())
    }
}

impl LogicNetwork for Network {
    fn size(&self) -> usize {
        self.nodes.len()
    }

    fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.index()].kind
    }

    fn fanins(&self, node: NodeId) -> &[Signal] {
        &self.nodes[node.index()].fanins
    }

    fn fanout_size(&self, node: NodeId) -> u32 {
        self.nodes[node.index()].fanout
    }

    fn primary_inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    fn primary_outputs(&self) -> &[Signal] {
        &self.outputs
    }
}
