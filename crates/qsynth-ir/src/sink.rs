//! The append-only gate sink the synthesizers write into.

use crate::error::IrResult;
use crate::instruction::Instruction;
use crate::qubit::QubitId;

/// Append-only destination for emitted gates.
///
/// Emission order is execution order. Qubits are only ever added; there is
/// no removal.
pub trait GateSink {
    /// Number of qubit lines currently in the register.
    fn num_qubits(&self) -> u32;

    /// Grow the register by one line and return its index.
    fn add_qubit(&mut self) -> QubitId;

    /// Append one gate.
    fn add_gate(&mut self, instruction: Instruction) -> IrResult<()>;

    /// Append a sequence of gates in order.
    fn extend_gates<I>(&mut self, instructions: I) -> IrResult<()>
    where
        I: IntoIterator<Item = Instruction>,
        Self: Sized,
    {
        for instruction in instructions {
            self.add_gate(instruction)?;
        }
        Ok(())
    }
}

impl<T: GateSink + ?Sized> GateSink for &mut T {
    fn num_qubits(&self) -> u32 {
        (**self).num_qubits()
    }

    fn add_qubit(&mut self) -> QubitId {
        (**self).add_qubit()
    }

    fn add_gate(&mut self, instruction: Instruction) -> IrResult<()> {
        (**self).add_gate(instruction)
    }
}
