//! Truth-table oracle compilation.

use qsynth_ir::{Circuit, Control, GateSink, Instruction, QubitId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::qm::{Implicant, minimize_implicants};
use crate::error::{SynthError, SynthResult};
use crate::truth_table::{MAX_VARS, TruthTable};

/// An `n`-input, `m`-output boolean function given as one minterm list per
/// output row.
///
/// Input qubit `i` carries bit `n - 1 - i` of a minterm, so minterm `1` of a
/// two-input table is `q0 = 0, q1 = 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleTable {
    num_inputs: u32,
    rows: Vec<Vec<u64>>,
}

impl OracleTable {
    /// Create a table, checking every minterm against `num_inputs`.
    pub fn new(num_inputs: u32, rows: Vec<Vec<u64>>) -> SynthResult<Self> {
        if num_inputs > MAX_VARS {
            return Err(SynthError::InvalidTruthTable(format!(
                "oracle has {num_inputs} inputs, at most {MAX_VARS} are supported"
            )));
        }
        let limit = 1u64 << num_inputs;
        for (r, row) in rows.iter().enumerate() {
            if let Some(m) = row.iter().find(|&&m| m >= limit) {
                return Err(SynthError::InvalidTruthTable(format!(
                    "row {r}: minterm {m} out of range for {num_inputs} inputs"
                )));
            }
        }
        Ok(Self { num_inputs, rows })
    }

    /// Create a table from one truth table per output.
    ///
    /// Variable `j` of each truth table is input qubit `j`.
    pub fn from_truth_tables(functions: &[TruthTable]) -> SynthResult<Self> {
        let Some(first) = functions.first() else {
            return Self::new(0, Vec::new());
        };
        let n = first.num_vars();
        let mut rows = Vec::with_capacity(functions.len());
        for f in functions {
            if f.num_vars() != n {
                return Err(SynthError::InvalidTruthTable(format!(
                    "oracle rows mix {n} and {} variables",
                    f.num_vars()
                )));
            }
            rows.push(f.minterms().into_iter().map(|x| reverse_bits(x, n)).collect());
        }
        Self::new(n, rows)
    }

    /// Number of input qubits.
    pub fn num_inputs(&self) -> u32 {
        self.num_inputs
    }

    /// Number of output rows.
    pub fn num_outputs(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Width of the qubit skeleton: inputs followed by outputs.
    pub fn num_qubits(&self) -> u32 {
        self.num_inputs + self.num_outputs()
    }

    /// Minterms of output `row`.
    pub fn row(&self, row: usize) -> &[u64] {
        &self.rows[row]
    }

    /// Evaluate every output on the values of the input qubits.
    pub fn evaluate(&self, inputs: &[bool]) -> Vec<bool> {
        let n = self.num_inputs as usize;
        let minterm = inputs
            .iter()
            .take(n)
            .enumerate()
            .fold(0u64, |acc, (i, &b)| acc | (u64::from(b) << (n - 1 - i)));
        self.rows.iter().map(|row| row.contains(&minterm)).collect()
    }
}

fn reverse_bits(x: u64, n: u32) -> u64 {
    (0..n).fold(0, |acc, j| acc | (((x >> j) & 1) << (n - 1 - j)))
}

/// Rewrite a cover so that no two terms share an assignment.
///
/// The union of the terms is unchanged.
pub fn disjoint_cover(cover: &[Implicant]) -> Vec<Implicant> {
    let mut disjoint: Vec<Implicant> = Vec::with_capacity(cover.len());
    for term in cover {
        let mut pieces = vec![*term];
        for placed in &disjoint {
            pieces = pieces.iter().flat_map(|p| p.sharp(placed)).collect();
        }
        disjoint.extend(pieces);
    }
    disjoint
}

/// The multi-controlled X realising `out ^= term(inputs)`.
fn term_gate(term: &Implicant, inputs: &[QubitId], output: QubitId) -> Instruction {
    let controls = (0..term.num_vars()).filter_map(|var| {
        term.literal(var)
            .map(|value| Control::with_polarity(inputs[var as usize], value))
    });
    Instruction::mcx(controls, output)
}

/// Emit the oracle onto an existing skeleton.
///
/// `qubits` holds the input qubits followed by one output qubit per row.
/// Each row becomes one block of multi-controlled X gates XOR-ing the row
/// function into its output qubit; blocks follow row order. Returns the
/// number of gates emitted.
#[instrument(skip(sink, table, qubits))]
pub fn emit_oracle<S: GateSink + ?Sized>(
    sink: &mut S,
    table: &OracleTable,
    qubits: &[QubitId],
) -> SynthResult<usize> {
    if qubits.len() != table.num_qubits() as usize {
        return Err(SynthError::InvalidNetwork(format!(
            "oracle needs {} qubits, skeleton has {}",
            table.num_qubits(),
            qubits.len()
        )));
    }
    info!(
        "Compiling oracle with {} inputs and {} outputs",
        table.num_inputs(),
        table.num_outputs()
    );

    let (inputs, outputs) = qubits.split_at(table.num_inputs as usize);
    let mut emitted = 0;
    for (r, (row, &output)) in table.rows.iter().zip(outputs).enumerate() {
        if row.is_empty() {
            continue;
        }
        let cover = minimize_implicants(table.num_inputs, row);
        let terms = disjoint_cover(&cover);
        debug!(
            "oracle row {r}: {} minterms, cover of {}, {} disjoint terms",
            row.len(),
            cover.len(),
            terms.len()
        );
        for term in &terms {
            sink.add_gate(term_gate(term, inputs, output))?;
        }
        emitted += terms.len();
    }
    Ok(emitted)
}

/// Compile `table` into a fresh circuit over its skeleton.
pub fn synthesize_oracle(table: &OracleTable) -> SynthResult<Circuit> {
    let mut circuit = Circuit::with_size("oracle", table.num_qubits());
    let qubits: Vec<QubitId> = (0..table.num_qubits()).map(QubitId).collect();
    emit_oracle(&mut circuit, table, &qubits)?;
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsynth_ir::StandardGate;

    #[test]
    fn test_single_term_row() {
        let table = OracleTable::new(2, vec![vec![1, 3]]).unwrap();
        let circuit = synthesize_oracle(&table).unwrap();
        assert_eq!(
            circuit.instructions(),
            &[Instruction::cx(QubitId(1), QubitId(2))]
        );
    }

    #[test]
    fn test_empty_and_constant_rows() {
        let table = OracleTable::new(2, vec![vec![], vec![0, 1, 2, 3]]).unwrap();
        let circuit = synthesize_oracle(&table).unwrap();
        assert_eq!(circuit.instructions(), &[Instruction::x(QubitId(3))]);
    }

    #[test]
    fn test_negative_literals() {
        // f = !q0 & q1
        let table = OracleTable::new(2, vec![vec![1]]).unwrap();
        let circuit = synthesize_oracle(&table).unwrap();
        let gate = &circuit.instructions()[0];
        assert_eq!(gate.gate, StandardGate::MCX);
        assert_eq!(
            gate.controls,
            vec![Control::negative(QubitId(0)), Control::positive(QubitId(1))]
        );
    }

    #[test]
    fn test_skeleton_width_checked() {
        let table = OracleTable::new(2, vec![vec![1]]).unwrap();
        let mut circuit = Circuit::with_size("bad", 4);
        let qubits = [QubitId(0), QubitId(1)];
        assert!(matches!(
            emit_oracle(&mut circuit, &table, &qubits),
            Err(SynthError::InvalidNetwork(_))
        ));
    }

    #[test]
    fn test_out_of_range_minterm() {
        assert!(OracleTable::new(2, vec![vec![4]]).is_err());
    }

    #[test]
    fn test_from_truth_tables_bit_order() {
        // Variable 0 alone, i.e. qubit 0.
        let tt = TruthTable::nth_var(2, 0);
        let table = OracleTable::from_truth_tables(&[tt]).unwrap();
        assert_eq!(table.row(0), &[2, 3]);
        assert_eq!(table.evaluate(&[true, false]), vec![true]);
        assert_eq!(table.evaluate(&[false, true]), vec![false]);
    }

    #[test]
    fn test_overlapping_cover_made_disjoint() {
        let cover = [
            Implicant::parse("1-").unwrap(),
            Implicant::parse("-1").unwrap(),
        ];
        let disjoint = disjoint_cover(&cover);
        for m in 0..4u64 {
            let hits = disjoint.iter().filter(|t| t.covers(m)).count();
            let wanted = cover.iter().any(|t| t.covers(m));
            assert_eq!(hits, usize::from(wanted));
        }
    }
}
