//! Basis-state simulation of reversible circuits.

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::Instruction;

/// Run a circuit of NOT-type gates on one basis state.
///
/// `input[i]` is the initial value of qubit `i`. Uncontrolled global phases
/// are ignored; any other non-classical gate is an error.
pub fn simulate(circuit: &Circuit, input: &[bool]) -> IrResult<Vec<bool>> {
    let width = circuit.num_qubits() as usize;
    if input.len() != width {
        return Err(IrError::InputWidthMismatch {
            expected: width,
            got: input.len(),
        });
    }
    let mut state = input.to_vec();
    for inst in circuit.instructions() {
        step(&mut state, inst)?;
    }
    Ok(state)
}

/// Apply one instruction to a basis state in place.
pub fn step(state: &mut [bool], instruction: &Instruction) -> IrResult<()> {
    match instruction.gate {
        StandardGate::GPhase(_) if instruction.controls.is_empty() => Ok(()),
        gate if gate.is_classical() => {
            let Some(target) = instruction.target else {
                return Err(IrError::MissingTarget {
                    gate_name: gate.name().to_string(),
                });
            };
            let mut fires = true;
            for c in &instruction.controls {
                let value = *state.get(c.qubit.index()).ok_or(IrError::QubitNotFound {
                    qubit: c.qubit,
                    gate_name: Some(gate.name().to_string()),
                })?;
                fires &= c.fires(value);
            }
            let slot = state.get_mut(target.index()).ok_or(IrError::QubitNotFound {
                qubit: target,
                gate_name: Some(gate.name().to_string()),
            })?;
            if fires {
                *slot = !*slot;
            }
            Ok(())
        }
        gate => Err(IrError::NotReversible(gate.name().to_string())),
    }
}

/// Pack the first `n` bits of `value` (little-endian) into a bool vector.
pub fn bits_of(value: u64, n: usize) -> Vec<bool> {
    (0..n).map(|i| (value >> i) & 1 == 1).collect()
}
