//! High-level circuit builder API.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::Instruction;
use crate::qubit::{Control, QubitId};
use crate::sink::GateSink;

/// A flat, append-only quantum circuit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Number of qubit lines.
    num_qubits: u32,
    /// Instructions in execution order.
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            num_qubits: 0,
            instructions: Vec::new(),
        }
    }

    /// Create a circuit with the given number of qubits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            instructions: Vec::new(),
        }
    }

    /// Add a qubit and return its ID.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.num_qubits);
        self.num_qubits += 1;
        id
    }

    /// Add `size` qubits and return their IDs.
    pub fn add_qreg(&mut self, size: u32) -> Vec<QubitId> {
        (0..size).map(|_| self.add_qubit()).collect()
    }

    /// Validate and append an instruction.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.validate(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = Some(instruction.name().to_string());

        if instruction.gate.has_target() != instruction.target.is_some() {
            return Err(IrError::MissingTarget {
                gate_name: instruction.name().to_string(),
            });
        }
        if instruction.gate == StandardGate::CX && instruction.controls.len() != 1 {
            return Err(IrError::ControlCountMismatch {
                gate_name: instruction.name().to_string(),
                expected: 1,
                got: instruction.controls.len(),
            });
        }

        let mut seen = vec![false; self.num_qubits as usize];
        for qubit in instruction.qubits() {
            let Some(slot) = seen.get_mut(qubit.index()) else {
                return Err(IrError::QubitNotFound { qubit, gate_name });
            };
            if *slot {
                return Err(IrError::DuplicateQubit { qubit, gate_name });
            }
            *slot = true;
        }
        Ok(())
    }

    /// Apply a NOT gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::x(qubit))
    }

    /// Apply a CNOT.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::cx(control, target))
    }

    /// Apply a multi-controlled X.
    pub fn mcx(
        &mut self,
        controls: impl IntoIterator<Item = Control>,
        target: QubitId,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::mcx(controls, target))
    }

    /// Apply an Rx gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::rx(theta, qubit))
    }

    /// Apply an Ry gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::ry(theta, qubit))
    }

    /// Apply an Rz gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::rz(theta, qubit))
    }

    /// Apply a phase gate.
    pub fn p(&mut self, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::p(lambda, qubit))
    }

    /// Apply a U3 gate.
    pub fn u(&mut self, theta: f64, phi: f64, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::u(theta, phi, lambda, qubit))
    }

    /// Apply a global phase.
    pub fn gphase(&mut self, theta: f64) -> IrResult<&mut Self> {
        self.apply(Instruction::gphase(theta))
    }

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Get the instructions in execution order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Consume the circuit and return its instructions.
    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Check if no instruction was emitted.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Count instructions by gate name.
    pub fn count_ops(&self) -> FxHashMap<&'static str, usize> {
        let mut counts = FxHashMap::default();
        for inst in &self.instructions {
            *counts.entry(inst.name()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of instructions touching two or more qubits.
    pub fn entangling_count(&self) -> usize {
        self.instructions
            .iter()
            .filter(|inst| inst.is_entangling())
            .count()
    }

    /// Circuit depth over qubit lines; uncontrolled global phases do not count.
    pub fn depth(&self) -> usize {
        let mut layer = vec![0usize; self.num_qubits as usize];
        let mut depth = 0;
        for inst in &self.instructions {
            let qubits = inst.qubits();
            if qubits.is_empty() {
                continue;
            }
            let next = qubits
                .iter()
                .filter_map(|q| layer.get(q.index()))
                .max()
                .copied()
                .unwrap_or(0)
                + 1;
            for q in qubits {
                if let Some(slot) = layer.get_mut(q.index()) {
                    *slot = next;
                }
            }
            depth = depth.max(next);
        }
        depth
    }

    /// Sum of all uncontrolled global phases.
    pub fn global_phase(&self) -> f64 {
        self.instructions
            .iter()
            .filter(|inst| inst.controls.is_empty())
            .filter_map(|inst| match inst.gate {
                StandardGate::GPhase(t) => Some(t),
                _ => None,
            })
            .sum()
    }

    /// The inverse circuit: reversed order, each gate inverted.
    pub fn inverse(&self) -> Self {
        Self {
            name: format!("{}_dg", self.name),
            num_qubits: self.num_qubits,
            instructions: self
                .instructions
                .iter()
                .rev()
                .map(Instruction::inverse)
                .collect(),
        }
    }
}

impl GateSink for Circuit {
    fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    fn add_qubit(&mut self) -> QubitId {
        Circuit::add_qubit(self)
    }

    fn add_gate(&mut self, instruction: Instruction) -> IrResult<()> {
        self.apply(instruction).map(|_| ())
    }
}
