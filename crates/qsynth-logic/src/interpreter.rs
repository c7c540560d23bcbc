//! The action interpreter: walks a schedule and emits gates.

use std::fmt;

use qsynth_ir::{Control, GateSink, Instruction, QubitId};
use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::ancilla::{AncillaPool, QubitLocationTable};
use crate::config::LogicSynthesisParams;
use crate::error::{SynthError, SynthResult};
use crate::lut::SingleTargetSynthesis;
use crate::network::{LogicNetwork, NodeId, NodeKind, Signal};
use crate::schedule::{Action, CellOverride, Step};
use crate::truth_table::TruthTable;

/// Executes schedule steps against a gate sink.
///
/// Every node's value is read from the top of its location stack, so a
/// qubit index may be reassigned any number of times. The schedule is
/// trusted to be feasible; reading an empty location is reported as
/// [`SynthError::EmptyLocation`].
pub struct ActionInterpreter<'a, N: LogicNetwork + ?Sized, S: GateSink + ?Sized> {
    pub(crate) network: &'a N,
    pub(crate) sink: &'a mut S,
    stg: Option<&'a dyn SingleTargetSynthesis>,
    pub(crate) params: LogicSynthesisParams,
    pub(crate) pool: AncillaPool,
    pub(crate) locations: QubitLocationTable,
    outputs: FxHashSet<NodeId>,
}

impl<'a, N: LogicNetwork + ?Sized, S: GateSink + ?Sized> ActionInterpreter<'a, N, S> {
    /// Create an interpreter over `network` writing into `sink`.
    pub fn new(
        network: &'a N,
        sink: &'a mut S,
        stg: Option<&'a dyn SingleTargetSynthesis>,
        params: LogicSynthesisParams,
    ) -> Self {
        let outputs = network.primary_outputs().iter().map(|s| s.node).collect();
        Self {
            network,
            sink,
            stg,
            params,
            pool: AncillaPool::new(),
            locations: QubitLocationTable::new(network.size()),
            outputs,
        }
    }

    /// The ancilla pool.
    pub fn pool(&self) -> &AncillaPool {
        &self.pool
    }

    /// The per-node location stacks.
    pub fn locations(&self) -> &QubitLocationTable {
        &self.locations
    }

    /// Record `qubit` as the current location of `node`.
    pub fn place(&mut self, node: NodeId, qubit: QubitId) {
        self.locations.push(node, qubit);
    }

    /// Execute every step in order.
    pub fn run(&mut self, steps: &[Step]) -> SynthResult<()> {
        for step in steps {
            self.execute(step)?;
        }
        Ok(())
    }

    /// Execute one step.
    pub fn execute(&mut self, step: &Step) -> SynthResult<()> {
        let node = step.node;
        match &step.action {
            Action::Compute {
                leaves,
                cell_override,
            } => {
                let t = if self.outputs.contains(&node) {
                    self.pool.allocate_fresh(&mut *self.sink)
                } else {
                    self.pool.allocate_recycled(&mut *self.sink)
                };
                self.locations.push(node, t);
                self.report(format_args!("compute {node} in qubit {t}"));
                self.compute_variant(node, t, leaves.as_deref(), cell_override.as_ref())
            }
            Action::Uncompute {
                leaves,
                cell_override,
            } => {
                let t = self.top(node)?;
                self.report(format_args!("uncompute {node} from qubit {t}"));
                self.compute_variant(node, t, leaves.as_deref(), cell_override.as_ref())?;
                self.locations.pop(node)?;
                self.pool.release(t);
                Ok(())
            }
            Action::ComputeInPlace { target, leaves } => {
                let t = self.top(*target)?;
                self.locations.push(node, t);
                self.report(format_args!("compute {node} inplace onto node {target}"));
                match leaves {
                    Some(leaves) => self.compute_big_xor(t, leaves),
                    None => self.compute_node_inplace(node, t),
                }
            }
            Action::UncomputeInPlace { target, leaves } => {
                let t = self.top(node)?;
                self.report(format_args!("uncompute {node} inplace to {target}"));
                match leaves {
                    Some(leaves) => self.compute_big_xor(t, leaves)?,
                    None => self.compute_node_inplace(node, t)?,
                }
                self.locations.pop(node)?;
                Ok(())
            }
            Action::Buffer { leaf, target } => {
                self.report(format_args!("compute buffer from node {leaf} to node {target}"));
                let q = self.top(*leaf)?;
                self.locations.push(*target, q);
                Ok(())
            }
            Action::ComputeLevel(level) => {
                if let Some(first) = level.first() {
                    self.report(format_args!("compute level with node {}", first.node()));
                }
                self.compute_level(level)
            }
            Action::UncomputeLevel(level) => {
                if let Some(first) = level.first() {
                    self.report(format_args!("uncompute level with node {}", first.node()));
                }
                self.uncompute_level(level)
            }
        }
    }

    fn report(&self, message: fmt::Arguments<'_>) {
        if self.params.verbose {
            info!("{message}");
        } else {
            debug!("{message}");
        }
    }

    pub(crate) fn top(&self, node: NodeId) -> SynthResult<QubitId> {
        self.locations.top(node)
    }

    pub(crate) fn emit(&mut self, instruction: Instruction) -> SynthResult<()> {
        self.sink.add_gate(instruction)?;
        Ok(())
    }

    /// The control that fires when `signal` is true.
    fn literal(&self, signal: Signal) -> SynthResult<Control> {
        Ok(Control::with_polarity(
            self.top(signal.node)?,
            !signal.complemented,
        ))
    }

    fn constant_value(&self, signal: Signal) -> Option<bool> {
        match self.network.kind(signal.node) {
            NodeKind::Constant(v) => Some(*v ^ signal.complemented),
            _ => None,
        }
    }

    fn compute_variant(
        &mut self,
        node: NodeId,
        t: QubitId,
        leaves: Option<&[NodeId]>,
        cell_override: Option<&CellOverride>,
    ) -> SynthResult<()> {
        if let Some(cell) = cell_override {
            let controls = cell
                .leaves
                .iter()
                .map(|&l| self.top(l))
                .collect::<SynthResult<Vec<_>>>()?;
            self.compute_lut(node, &cell.function, &controls, t)
        } else if let Some(leaves) = leaves {
            self.compute_big_xor(t, leaves)
        } else {
            self.compute_node(node, t)
        }
    }

    /// XOR the current values of `leaves` into `t`, skipping `t` itself.
    pub(crate) fn compute_big_xor(&mut self, t: QubitId, leaves: &[NodeId]) -> SynthResult<()> {
        for &leaf in leaves {
            let c = self.top(leaf)?;
            if c != t {
                self.emit(Instruction::cx(c, t))?;
            }
        }
        Ok(())
    }

    /// Emit the gates computing `node` into `t`.
    pub(crate) fn compute_node(&mut self, node: NodeId, t: QubitId) -> SynthResult<()> {
        let network = self.network;
        let fanins = network.fanins(node);
        match network.kind(node) {
            NodeKind::And => {
                let controls = fanins
                    .iter()
                    .map(|&s| self.literal(s))
                    .collect::<SynthResult<Vec<_>>>()?;
                self.compute_and(controls, t)
            }
            NodeKind::Or => {
                let controls = fanins
                    .iter()
                    .map(|&s| self.literal(!s))
                    .collect::<SynthResult<Vec<_>>>()?;
                self.compute_or(controls, t)
            }
            NodeKind::Xor | NodeKind::Xor3 | NodeKind::NaryXor => self.compute_linear(fanins, t),
            NodeKind::Maj => self.compute_maj(node, fanins, t),
            NodeKind::Lut(function) => {
                let (function, inverted) = self.normalize_lut(function, fanins);
                let controls = fanins
                    .iter()
                    .map(|s| self.top(s.node))
                    .collect::<SynthResult<Vec<_>>>()?;
                self.compute_lut(node, &function, &controls, t)?;
                if inverted {
                    self.emit(Instruction::x(t))?;
                }
                Ok(())
            }
            kind @ (NodeKind::Constant(_) | NodeKind::Input) => {
                Err(SynthError::UnsupportedNodeKind {
                    node,
                    kind: kind.name(),
                })
            }
        }
    }

    /// Emit the gates turning the value on `t` into the value of `node`.
    fn compute_node_inplace(&mut self, node: NodeId, t: QubitId) -> SynthResult<()> {
        let network = self.network;
        let fanins = network.fanins(node);
        match network.kind(node) {
            NodeKind::Xor | NodeKind::Xor3 | NodeKind::NaryXor => self.compute_linear(fanins, t),
            NodeKind::Lut(function) => {
                let (function, inverted) = self.normalize_lut(function, fanins);
                if !function.is_parity() {
                    return Err(SynthError::InPlaceNotLinear {
                        node,
                        kind: "lut",
                    });
                }
                let controls = fanins
                    .iter()
                    .map(|s| self.top(s.node))
                    .collect::<SynthResult<Vec<_>>>()?;
                self.compute_xor_block(&controls, t)?;
                if inverted {
                    self.emit(Instruction::x(t))?;
                }
                Ok(())
            }
            kind => Err(SynthError::InPlaceNotLinear {
                node,
                kind: kind.name(),
            }),
        }
    }

    /// AND of the control literals into `t`.
    ///
    /// A qubit named twice is merged; a literal together with its negation
    /// makes the product constant false and nothing is emitted.
    pub(crate) fn compute_and(&mut self, controls: Vec<Control>, t: QubitId) -> SynthResult<()> {
        let mut merged: Vec<Control> = Vec::with_capacity(controls.len());
        for c in controls {
            match merged.iter().find(|m| m.qubit == c.qubit) {
                Some(m) if m.positive != c.positive => return Ok(()),
                Some(_) => {}
                None => merged.push(c),
            }
        }
        self.emit(Instruction::mcx(merged, t))
    }

    /// OR by De Morgan; expects the negated literals as `controls`.
    fn compute_or(&mut self, controls: Vec<Control>, t: QubitId) -> SynthResult<()> {
        self.compute_and(controls, t)?;
        self.emit(Instruction::x(t))
    }

    /// XOR the value of a single signal into `t`.
    fn copy_signal(&mut self, signal: Signal, t: QubitId) -> SynthResult<()> {
        match self.constant_value(signal) {
            Some(true) => self.emit(Instruction::x(t)),
            Some(false) => Ok(()),
            None => {
                let control = self.literal(signal)?;
                self.emit(Instruction::mcx([control], t))
            }
        }
    }

    /// XOR of the fan-in signals into `t`.
    ///
    /// Constant fan-ins fold into the final inversion and a fan-in already
    /// living on `t` is skipped, which makes this usable in place.
    fn compute_linear(&mut self, fanins: &[Signal], t: QubitId) -> SynthResult<()> {
        let mut inverted = false;
        for &s in fanins {
            if let Some(value) = self.constant_value(s) {
                inverted ^= value;
                continue;
            }
            inverted ^= s.complemented;
            let c = self.top(s.node)?;
            if c != t {
                self.emit(Instruction::cx(c, t))?;
            }
        }
        if inverted {
            self.emit(Instruction::x(t))?;
        }
        Ok(())
    }

    pub(crate) fn compute_xor(
        &mut self,
        c1: QubitId,
        c2: QubitId,
        inverted: bool,
        t: QubitId,
    ) -> SynthResult<()> {
        self.emit(Instruction::cx(c1, t))?;
        self.emit(Instruction::cx(c2, t))?;
        if inverted {
            self.emit(Instruction::x(t))?;
        }
        Ok(())
    }

    fn compute_xor_block(&mut self, controls: &[QubitId], t: QubitId) -> SynthResult<()> {
        for &c in controls {
            if c != t {
                self.emit(Instruction::cx(c, t))?;
            }
        }
        Ok(())
    }

    fn compute_maj(&mut self, node: NodeId, fanins: &[Signal], t: QubitId) -> SynthResult<()> {
        let &[a, b, c] = fanins else {
            return Err(SynthError::InvalidNetwork(format!(
                "majority node {node} has {} fan-ins",
                fanins.len()
            )));
        };

        // Majority is symmetric: move a constant fan-in to the front.
        let mut fanins = [a, b, c];
        if let Some(i) = fanins.iter().position(|&s| self.constant_value(s).is_some()) {
            fanins.swap(0, i);
        }
        let [a, b, c] = fanins;

        // MAJ(1, b, c) = b | c and MAJ(0, b, c) = b & c
        if let Some(value) = self.constant_value(a) {
            return if value {
                let controls = vec![self.literal(!b)?, self.literal(!c)?];
                self.compute_or(controls, t)
            } else {
                let controls = vec![self.literal(b)?, self.literal(c)?];
                self.compute_and(controls, t)
            };
        }

        // MAJ(x, x, z) = x and MAJ(x, !x, z) = z
        for (x, y, z) in [(a, b, c), (a, c, b), (b, c, a)] {
            if x.node == y.node {
                let survivor = if x.complemented == y.complemented { x } else { z };
                return self.copy_signal(survivor, t);
            }
        }

        let (c1, c2, c3) = (self.top(a.node)?, self.top(b.node)?, self.top(c.node)?);
        // c1 and c3 carry their signal, c2 carries the negated signal.
        let flips: Vec<QubitId> = [(c1, a.complemented), (c2, !b.complemented), (c3, c.complemented)]
            .into_iter()
            .filter_map(|(q, flip)| flip.then_some(q))
            .collect();
        for &q in &flips {
            self.emit(Instruction::x(q))?;
        }

        self.emit(Instruction::cx(c1, c2))?;
        self.emit(Instruction::cx(c3, c1))?;
        self.emit(Instruction::cx(c3, t))?;
        self.emit(Instruction::mcx(
            [Control::positive(c1), Control::positive(c2)],
            t,
        ))?;
        self.emit(Instruction::cx(c3, c1))?;
        self.emit(Instruction::cx(c1, c2))?;

        for &q in flips.iter().rev() {
            self.emit(Instruction::x(q))?;
        }
        Ok(())
    }

    /// Fold complemented fan-ins into the function.
    ///
    /// Returns the function over the fan-in node values, reduced so that a
    /// negated parity becomes a parity plus an output inversion.
    fn normalize_lut(&self, function: &TruthTable, fanins: &[Signal]) -> (TruthTable, bool) {
        let mut f = function.clone();
        for (i, s) in fanins.iter().enumerate() {
            if s.complemented {
                f = f.flip(i as u32);
            }
        }
        let negated = f.complement();
        if negated.is_parity() {
            (negated, true)
        } else {
            (f, false)
        }
    }

    fn compute_lut(
        &mut self,
        node: NodeId,
        function: &TruthTable,
        controls: &[QubitId],
        t: QubitId,
    ) -> SynthResult<()> {
        if function.is_parity() {
            return self.compute_xor_block(controls, t);
        }
        let Some(stg) = self.stg else {
            return Err(SynthError::MissingLutSynthesizer(node));
        };
        let mut qubits = controls.to_vec();
        qubits.push(t);
        let mut sink: &mut S = &mut *self.sink;
        stg.synthesize(&mut sink, &qubits, function)
    }
}
