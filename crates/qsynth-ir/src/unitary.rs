//! Dense unitary construction for verifying emitted circuits.
//!
//! Qubit `i` is bit `i` of a basis index (little-endian). These helpers are
//! exponential in the register width and meant for tests and small checks.

use num_complex::Complex64;

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::Instruction;
use crate::matrix::Unitary2x2;
use crate::qubit::{Control, QubitId};

/// A dense `2^n x 2^n` complex matrix, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseUnitary {
    num_qubits: u32,
    data: Vec<Complex64>,
}

impl DenseUnitary {
    /// The identity on `num_qubits` qubits.
    pub fn identity(num_qubits: u32) -> Self {
        let dim = 1usize << num_qubits;
        let mut data = vec![Complex64::new(0.0, 0.0); dim * dim];
        for i in 0..dim {
            data[i * dim + i] = Complex64::new(1.0, 0.0);
        }
        Self { num_qubits, data }
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Matrix dimension `2^n`.
    pub fn dim(&self) -> usize {
        1usize << self.num_qubits
    }

    /// Entry at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[row * self.dim() + col]
    }

    /// Apply `f` to every column, treating it as a state vector.
    fn map_columns(&mut self, mut f: impl FnMut(&mut [Complex64])) {
        let dim = self.dim();
        let mut column = vec![Complex64::new(0.0, 0.0); dim];
        for c in 0..dim {
            for r in 0..dim {
                column[r] = self.data[r * dim + c];
            }
            f(&mut column);
            for r in 0..dim {
                self.data[r * dim + c] = column[r];
            }
        }
    }

    /// Left-multiply by an instruction.
    pub fn apply(&mut self, instruction: &Instruction) -> IrResult<()> {
        check_qubits(self.num_qubits, instruction)?;
        self.map_columns(|state| apply_instruction(state, instruction));
        Ok(())
    }

    /// Left-multiply by a 2x2 matrix on `target` conditioned on `controls`.
    pub fn apply_controlled(&mut self, controls: &[Control], target: QubitId, u: &Unitary2x2) {
        self.map_columns(|state| apply_controlled_matrix(state, controls, target, u));
    }

    /// Left-multiply by a phase `e^{iθ}` on the subspace where all controls fire.
    pub fn apply_controlled_phase(&mut self, controls: &[Control], theta: f64) {
        self.map_columns(|state| apply_phase(state, controls, theta));
    }

    /// Entry-wise comparison within `tol`.
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        self.num_qubits == other.num_qubits
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| (a - b).norm() < tol)
    }

    /// Comparison up to one global phase factor.
    pub fn approx_eq_up_to_phase(&self, other: &Self, tol: f64) -> bool {
        if self.num_qubits != other.num_qubits {
            return false;
        }
        let Some(pivot) = (0..self.data.len()).max_by(|&a, &b| {
            other.data[a].norm().total_cmp(&other.data[b].norm())
        }) else {
            return true;
        };
        if self.data[pivot].norm() < 1e-12 {
            return false;
        }
        let ratio = other.data[pivot] / self.data[pivot];
        if (ratio.norm() - 1.0).abs() > tol {
            return false;
        }
        self.data
            .iter()
            .zip(&other.data)
            .all(|(a, b)| (a * ratio - b).norm() < tol)
    }
}

fn check_qubits(num_qubits: u32, instruction: &Instruction) -> IrResult<()> {
    for qubit in instruction.qubits() {
        if qubit.0 >= num_qubits {
            return Err(IrError::QubitNotFound {
                qubit,
                gate_name: Some(instruction.name().to_string()),
            });
        }
    }
    Ok(())
}

#[inline]
fn controls_fire(index: usize, controls: &[Control]) -> bool {
    controls
        .iter()
        .all(|c| c.fires((index >> c.qubit.index()) & 1 == 1))
}

/// Apply a 2x2 matrix on `target` wherever all `controls` fire.
pub fn apply_controlled_matrix(
    state: &mut [Complex64],
    controls: &[Control],
    target: QubitId,
    u: &Unitary2x2,
) {
    let mask = 1usize << target.index();
    let [a, b, c, d] = u.data;
    for i in 0..state.len() {
        if i & mask != 0 || !controls_fire(i, controls) {
            continue;
        }
        let j = i | mask;
        let (lo, hi) = (state[i], state[j]);
        state[i] = a * lo + b * hi;
        state[j] = c * lo + d * hi;
    }
}

/// Multiply by `e^{iθ}` wherever all `controls` fire.
pub fn apply_phase(state: &mut [Complex64], controls: &[Control], theta: f64) {
    let factor = Complex64::from_polar(1.0, theta);
    for (i, amp) in state.iter_mut().enumerate() {
        if controls_fire(i, controls) {
            *amp *= factor;
        }
    }
}

/// Apply one instruction to a state vector.
pub fn apply_instruction(state: &mut [Complex64], instruction: &Instruction) {
    match (instruction.gate, instruction.target) {
        (StandardGate::GPhase(theta), _) => apply_phase(state, &instruction.controls, theta),
        (gate, Some(target)) => {
            if let Some(u) = gate.base_matrix() {
                apply_controlled_matrix(state, &instruction.controls, target, &u);
            }
        }
        (_, None) => {}
    }
}

/// Compute the full unitary of a circuit.
pub fn circuit_unitary(circuit: &Circuit) -> IrResult<DenseUnitary> {
    instructions_unitary(circuit.num_qubits(), circuit.instructions())
}

/// Compute the unitary of an instruction list over `num_qubits` qubits.
pub fn instructions_unitary(
    num_qubits: u32,
    instructions: &[Instruction],
) -> IrResult<DenseUnitary> {
    for inst in instructions {
        check_qubits(num_qubits, inst)?;
    }
    let mut u = DenseUnitary::identity(num_qubits);
    u.map_columns(|state| {
        for inst in instructions {
            apply_instruction(state, inst);
        }
    });
    Ok(u)
}

/// The ideal controlled-`u` on a register of `num_qubits` qubits.
pub fn controlled_unitary(
    num_qubits: u32,
    controls: &[Control],
    target: QubitId,
    u: &Unitary2x2,
) -> DenseUnitary {
    let mut m = DenseUnitary::identity(num_qubits);
    m.apply_controlled(controls, target, u);
    m
}
