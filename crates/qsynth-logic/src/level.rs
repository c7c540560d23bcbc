//! Level batching with cone sharing.
//!
//! A level is a set of independent AND/XOR nodes whose operands are XORs of
//! leaf sets (cones). Leaves shared between cones can be pre-accumulated
//! once into a copy ancilla; each cone root is then completed with the
//! remaining leaves, used as a control, and restored.

use qsynth_ir::{Control, GateSink, QubitId};
use tracing::trace;

use crate::error::{SynthError, SynthResult};
use crate::interpreter::ActionInterpreter;
use crate::network::{LogicNetwork, NodeId, NodeKind};
use crate::schedule::{Cone, LevelNode};

/// Two-input primitive of a level node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Primitive {
    And,
    Xor,
}

impl<N: LogicNetwork + ?Sized, S: GateSink + ?Sized> ActionInterpreter<'_, N, S> {
    fn primitive(&self, node: NodeId) -> SynthResult<Primitive> {
        match self.network.kind(node) {
            NodeKind::And => Ok(Primitive::And),
            NodeKind::Xor => Ok(Primitive::Xor),
            kind => Err(SynthError::UnsupportedNodeKind {
                node,
                kind: kind.name(),
            }),
        }
    }

    fn apply_primitive(
        &mut self,
        primitive: Primitive,
        controls: [Control; 2],
        target: QubitId,
    ) -> SynthResult<()> {
        match primitive {
            Primitive::And => self.compute_and(controls.to_vec(), target),
            Primitive::Xor => self.compute_xor(
                controls[0].qubit,
                controls[1].qubit,
                controls[0].positive != controls[1].positive,
                target,
            ),
        }
    }

    /// Allocate copy ancillas and pick the root qubit of every cone.
    ///
    /// Returns the cone roots of every level entry together with the scratch
    /// ancillas that only need releasing.
    fn compute_copies(
        &mut self,
        level: &[LevelNode],
    ) -> SynthResult<(Vec<[QubitId; 2]>, Vec<QubitId>)> {
        let mut roots = Vec::with_capacity(level.len());
        let mut scratch = Vec::new();
        for entry in level {
            let LevelNode::Binary { cones, .. } = entry else {
                roots.push([QubitId(0); 2]);
                continue;
            };
            let mut pair = [QubitId(0); 2];
            for (slot, cone) in pair.iter_mut().zip(cones) {
                *slot = if !cone.copies.is_empty() {
                    let tcp = self.pool.allocate_recycled(&mut *self.sink);
                    self.compute_big_xor(tcp, &cone.copies)?;
                    tcp
                } else if let [leaf] = cone.leaves.as_slice() {
                    self.top(*leaf)?
                } else if let Some(target) = cone.target {
                    self.top(target)?
                } else {
                    let q = self.pool.allocate_recycled(&mut *self.sink);
                    scratch.push(q);
                    q
                };
            }
            roots.push(pair);
        }
        Ok((roots, scratch))
    }

    fn remove_copies(&mut self, level: &[LevelNode], roots: &[[QubitId; 2]]) -> SynthResult<()> {
        for (entry, pair) in level.iter().zip(roots) {
            let LevelNode::Binary { cones, .. } = entry else {
                continue;
            };
            for (cone, &tcp) in cones.iter().zip(pair) {
                if cone.copies.is_empty() {
                    continue;
                }
                self.compute_big_xor(tcp, &cone.copies)?;
                self.pool.release(tcp);
            }
        }
        Ok(())
    }

    /// Compute every node of `level` into a new ancilla.
    ///
    /// All cone, copy, and offset ancillas are back in |0⟩ and released when
    /// this returns; only the node targets stay allocated.
    pub(crate) fn compute_level(&mut self, level: &[LevelNode]) -> SynthResult<()> {
        for entry in level {
            if let LevelNode::Binary { node, .. } = entry {
                self.primitive(*node)?;
            }
        }

        let (roots, scratch) = self.compute_copies(level)?;
        let mut offsets = Vec::new();

        for (entry, pair) in level.iter().zip(&roots) {
            let target = self.pool.allocate_recycled(&mut *self.sink);
            let (node, cones) = match entry {
                LevelNode::NaryXor { node } => {
                    self.compute_node(*node, target)?;
                    self.locations.push(*node, target);
                    continue;
                }
                LevelNode::Binary { node, cones } => (*node, cones),
            };

            let mut controls = [Control::positive(QubitId(0)); 2];
            for (i, cone) in cones.iter().enumerate() {
                let tcp = pair[i];
                controls[i] = Control::with_polarity(tcp, !cone.complemented);
                self.compute_big_xor(tcp, &cone.remaining_leaves())?;
                self.locations.push(cone.root, tcp);
            }

            let primitive = self.primitive(node)?;
            if primitive == Primitive::And && self.params.low_tdepth_and {
                offsets.push(self.pool.allocate_recycled(&mut *self.sink));
            }
            self.apply_primitive(primitive, controls, target)?;
            self.locations.push(node, target);
            trace!("level node {node} computed into {target}");

            for i in [1, 0] {
                self.compute_big_xor(pair[i], &cones[i].remaining_leaves())?;
            }
            self.locations.pop(cones[0].root)?;
            self.locations.pop(cones[1].root)?;
        }

        for q in offsets {
            self.pool.release(q);
        }
        self.remove_copies(level, &roots)?;
        for q in scratch {
            self.pool.release(q);
        }
        Ok(())
    }

    /// Place a cone's value for uncomputation.
    ///
    /// Returns the root qubit and whether it was allocated here.
    fn place_cone(&mut self, cone: &Cone) -> SynthResult<(QubitId, bool)> {
        if let [leaf] = cone.leaves.as_slice() {
            return Ok((self.top(*leaf)?, false));
        }
        let (q, allocated) = match cone.target {
            Some(target) => (self.top(target)?, false),
            None => (self.pool.allocate_recycled(&mut *self.sink), true),
        };
        self.compute_big_xor(q, &cone.leaves)?;
        self.locations.push(cone.root, q);
        Ok((q, allocated))
    }

    /// Undo a computed level in reverse node order.
    ///
    /// Each node's target is uncomputed from freshly rebuilt cone roots and
    /// released.
    pub(crate) fn uncompute_level(&mut self, level: &[LevelNode]) -> SynthResult<()> {
        for entry in level.iter().rev() {
            let (node, cones) = match entry {
                LevelNode::NaryXor { node } => {
                    let t = self.top(*node)?;
                    self.compute_node(*node, t)?;
                    self.locations.pop(*node)?;
                    self.pool.release(t);
                    continue;
                }
                LevelNode::Binary { node, cones } => (*node, cones),
            };
            let primitive = self.primitive(node)?;

            let mut controls = [Control::positive(QubitId(0)); 2];
            let mut allocated = Vec::new();
            for (i, cone) in cones.iter().enumerate() {
                let (q, fresh) = self.place_cone(cone)?;
                controls[i] = Control::with_polarity(q, !cone.complemented);
                if fresh {
                    allocated.push(q);
                }
            }

            let target = self.top(node)?;
            self.apply_primitive(primitive, controls, target)?;
            self.locations.pop(node)?;
            self.pool.release(target);

            for i in [1, 0] {
                let cone = &cones[i];
                if cone.leaves.len() == 1 {
                    continue;
                }
                let q = self.top(cone.root)?;
                self.compute_big_xor(q, &cone.leaves)?;
                self.locations.pop(cone.root)?;
            }
            for q in allocated {
                self.pool.release(q);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::LogicSynthesisParams;
    use crate::interpreter::ActionInterpreter;
    use crate::network::{LogicNetwork, Network, Signal};
    use crate::schedule::{Action, Cone, LevelNode, Step};
    use qsynth_ir::{Circuit, QubitId, classical};

    /// x = (a ^ b) & (b ^ c), y = (a ^ b) ^ c
    fn shared_cone_network() -> (Network, [Signal; 3], [Signal; 2], [Signal; 2]) {
        let mut ntk = Network::new();
        let a = ntk.create_pi();
        let b = ntk.create_pi();
        let c = ntk.create_pi();
        let ab = ntk.create_xor(a, b);
        let bc = ntk.create_xor(b, c);
        let x = ntk.create_and(ab, bc);
        let y = ntk.create_xor(ab, !c);
        ntk.create_po(x);
        ntk.create_po(y);
        (ntk, [a, b, c], [ab, bc], [x, y])
    }

    fn level(ntk_parts: &([Signal; 3], [Signal; 2], [Signal; 2])) -> Vec<LevelNode> {
        let ([a, b, c], [ab, bc], [x, y]) = *ntk_parts;
        vec![
            LevelNode::Binary {
                node: x.node,
                cones: [
                    Cone::new(ab.node, vec![a.node, b.node]).with_copies(vec![b.node]),
                    Cone::new(bc.node, vec![b.node, c.node]).with_copies(vec![b.node]),
                ],
            },
            LevelNode::Binary {
                node: y.node,
                cones: [
                    Cone::new(ab.node, vec![a.node, b.node]),
                    Cone::new(c.node, vec![c.node]).complemented(true),
                ],
            },
        ]
    }

    #[test]
    fn test_level_computes_and_cleans() {
        let (ntk, pis, mids, outs) = shared_cone_network();
        let level = level(&(pis, mids, outs));

        for low_tdepth_and in [false, true] {
            let mut circuit = Circuit::with_size("level", 3);
            let params = LogicSynthesisParams::new().with_low_tdepth_and(low_tdepth_and);
            let mut interp = ActionInterpreter::new(&ntk, &mut circuit, None, params);
            for (i, pi) in ntk.primary_inputs().iter().enumerate() {
                interp.place(*pi, QubitId(i as u32));
            }
            interp
                .execute(&Step::new(outs[0].node, Action::ComputeLevel(level.clone())))
                .unwrap();
            let x_q = interp.locations().top(outs[0].node).unwrap();
            let y_q = interp.locations().top(outs[1].node).unwrap();
            for m in [mids[0].node, mids[1].node] {
                assert_eq!(interp.locations().depth(m), 0);
            }
            // Only the two node targets stay live.
            let stats = interp.pool().stats();
            assert_eq!(stats.fresh - interp.pool().num_free() as u32, 2);

            let width = circuit.num_qubits() as usize;
            for v in 0..8u64 {
                let mut input = classical::bits_of(v, 3);
                input.resize(width, false);
                let out = classical::simulate(&circuit, &input).unwrap();
                let expected = ntk.simulate(&input[..3]).unwrap();
                assert_eq!(out[x_q.index()], expected[0], "x on input {v}");
                assert_eq!(out[y_q.index()], expected[1], "y on input {v}");
                for (q, bit) in out.iter().enumerate() {
                    if q < 3 {
                        assert_eq!(*bit, input[q]);
                    } else if q != x_q.index() && q != y_q.index() {
                        assert!(!bit, "ancilla {q} dirty on input {v}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_level_roundtrip_is_identity() {
        let (ntk, pis, mids, outs) = shared_cone_network();
        let level = level(&(pis, mids, outs));
        let mut circuit = Circuit::with_size("roundtrip", 3);
        let mut interp =
            ActionInterpreter::new(&ntk, &mut circuit, None, LogicSynthesisParams::default());
        for (i, pi) in ntk.primary_inputs().iter().enumerate() {
            interp.place(*pi, QubitId(i as u32));
        }
        interp
            .run(&[
                Step::new(outs[0].node, Action::ComputeLevel(level.clone())),
                Step::new(outs[0].node, Action::UncomputeLevel(level)),
            ])
            .unwrap();
        assert_eq!(interp.locations().depth(outs[0].node), 0);
        assert_eq!(interp.locations().depth(outs[1].node), 0);
        assert_eq!(interp.pool().stats().fresh as usize, interp.pool().num_free());

        let width = circuit.num_qubits() as usize;
        for v in 0..8u64 {
            let mut input = classical::bits_of(v, 3);
            input.resize(width, false);
            assert_eq!(classical::simulate(&circuit, &input).unwrap(), input);
        }
    }

    /// Compute `level`, check every entry against the primary output of the
    /// same index, then uncompute and check that all lines are restored and
    /// the pool is balanced.
    ///
    /// Returns the number of ancillas the compute step created.
    fn assert_level_roundtrip(ntk: &Network, level: Vec<LevelNode>) -> u32 {
        let n = ntk.primary_inputs().len();
        let head = level[0].node();
        let mut circuit = Circuit::with_size("level", n as u32);
        let mut interp =
            ActionInterpreter::new(ntk, &mut circuit, None, LogicSynthesisParams::default());
        for (i, pi) in ntk.primary_inputs().iter().enumerate() {
            interp.place(*pi, QubitId(i as u32));
        }

        interp
            .execute(&Step::new(head, Action::ComputeLevel(level.clone())))
            .unwrap();
        let targets: Vec<QubitId> = level
            .iter()
            .map(|entry| interp.locations().top(entry.node()).unwrap())
            .collect();
        let fresh = interp.pool().stats().fresh;
        assert_eq!(fresh as usize - interp.pool().num_free(), level.len());
        let computed = interp.sink.len();

        interp
            .execute(&Step::new(head, Action::UncomputeLevel(level.clone())))
            .unwrap();
        for entry in &level {
            assert_eq!(interp.locations().depth(entry.node()), 0);
        }
        assert_eq!(interp.pool().stats().fresh as usize, interp.pool().num_free());

        let width = circuit.num_qubits() as usize;
        for v in 0..(1u64 << n) {
            let mut input = classical::bits_of(v, n);
            input.resize(width, false);
            let expected = ntk.simulate(&input[..n]).unwrap();
            let mut state = input.clone();
            for inst in &circuit.instructions()[..computed] {
                classical::step(&mut state, inst).unwrap();
            }
            for (q, e) in targets.iter().zip(&expected) {
                assert_eq!(state[q.index()], *e, "node on {q} for input {v}");
            }
            for (q, bit) in state.iter().enumerate() {
                if !targets.iter().any(|t| t.index() == q) {
                    assert_eq!(*bit, input[q], "line {q} not restored for input {v}");
                }
            }
            assert_eq!(classical::simulate(&circuit, &input).unwrap(), input);
        }
        fresh
    }

    #[test]
    fn test_cone_on_declared_target() {
        // x = (a ^ b) & !c with a ^ b accumulated on a's line
        let mut ntk = Network::new();
        let a = ntk.create_pi();
        let b = ntk.create_pi();
        let c = ntk.create_pi();
        let ab = ntk.create_xor(a, b);
        let x = ntk.create_and(ab, !c);
        ntk.create_po(x);

        let level = vec![LevelNode::Binary {
            node: x.node,
            cones: [
                Cone::new(ab.node, vec![a.node, b.node]).with_target(a.node),
                Cone::new(c.node, vec![c.node]).complemented(true),
            ],
        }];
        // Only the node target is allocated.
        assert_eq!(assert_level_roundtrip(&ntk, level), 1);
    }

    #[test]
    fn test_nary_xor_entry() {
        // n = a ^ !b ^ c next to x = a & b
        let mut ntk = Network::new();
        let a = ntk.create_pi();
        let b = ntk.create_pi();
        let c = ntk.create_pi();
        let n = ntk.create_nary_xor(vec![a, !b, c]);
        let x = ntk.create_and(a, b);
        ntk.create_po(n);
        ntk.create_po(x);

        let level = vec![
            LevelNode::NaryXor { node: n.node },
            LevelNode::Binary {
                node: x.node,
                cones: [Cone::new(a.node, vec![a.node]), Cone::new(b.node, vec![b.node])],
            },
        ];
        assert_eq!(assert_level_roundtrip(&ntk, level), 2);
    }

    #[test]
    fn test_level_rejects_or_node() {
        let mut ntk = Network::new();
        let a = ntk.create_pi();
        let b = ntk.create_pi();
        let or = ntk.create_or(a, b);
        let mut circuit = Circuit::with_size("or", 2);
        let mut interp =
            ActionInterpreter::new(&ntk, &mut circuit, None, LogicSynthesisParams::default());
        interp.place(a.node, QubitId(0));
        interp.place(b.node, QubitId(1));
        let level = vec![LevelNode::Binary {
            node: or.node,
            cones: [Cone::new(a.node, vec![a.node]), Cone::new(b.node, vec![b.node])],
        }];
        assert!(interp
            .execute(&Step::new(or.node, Action::ComputeLevel(level)))
            .is_err());
        assert!(circuit.is_empty());
    }
}
