//! Single-target gate synthesis for LUT nodes.

use qsynth_ir::{Control, GateSink, Instruction, QubitId};
use tracing::trace;

use crate::error::{SynthError, SynthResult};
use crate::truth_table::TruthTable;

/// Realises `target ^= f(controls)` for a truth table `f`.
///
/// `qubits` holds the controls followed by the target; control `i` is
/// variable `i` of `function`.
pub trait SingleTargetSynthesis {
    /// Append the gates for one single-target gate.
    fn synthesize(
        &self,
        sink: &mut dyn GateSink,
        qubits: &[QubitId],
        function: &TruthTable,
    ) -> SynthResult<()>;
}

impl<F> SingleTargetSynthesis for F
where
    F: Fn(&mut dyn GateSink, &[QubitId], &TruthTable) -> SynthResult<()>,
{
    fn synthesize(
        &self,
        sink: &mut dyn GateSink,
        qubits: &[QubitId],
        function: &TruthTable,
    ) -> SynthResult<()> {
        self(sink, qubits, function)
    }
}

/// Emits one multi-controlled X per monomial of the positive-polarity
/// Reed-Muller expansion.
#[derive(Debug, Clone, Copy, Default)]
pub struct PprmSynthesis;

impl SingleTargetSynthesis for PprmSynthesis {
    fn synthesize(
        &self,
        sink: &mut dyn GateSink,
        qubits: &[QubitId],
        function: &TruthTable,
    ) -> SynthResult<()> {
        let Some((&target, controls)) = qubits.split_last() else {
            return Err(SynthError::InvalidTruthTable(
                "single-target gate needs a target qubit".into(),
            ));
        };
        if controls.len() != function.num_vars() as usize {
            return Err(SynthError::InvalidTruthTable(format!(
                "{} controls for a function of {} variables",
                controls.len(),
                function.num_vars()
            )));
        }

        let monomials = function.pprm();
        trace!("pprm: {} monomials on {}", monomials.len(), target);
        for mask in monomials {
            let gate_controls = controls
                .iter()
                .enumerate()
                .filter(|(i, _)| (mask >> i) & 1 == 1)
                .map(|(_, &q)| Control::positive(q));
            sink.add_gate(Instruction::mcx(gate_controls, target))?;
        }
        Ok(())
    }
}
