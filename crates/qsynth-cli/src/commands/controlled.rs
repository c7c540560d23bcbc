//! Controlled-gate decomposition command implementation.

use anyhow::{Context, Result};
use console::style;
use num_complex::Complex64;

use qsynth_decompose::Decomposer;
use qsynth_ir::{Circuit, Control, Instruction, QubitId, StandardGate, Unitary2x2};

use super::common::{CliConfig, OutputFormat, parse_controls, parse_list, register_width, write_result};

/// Raw arguments of the controlled command.
#[derive(Debug, Clone, Copy)]
pub struct GateRequest<'a> {
    pub gate: Option<&'a str>,
    pub angles: &'a str,
    pub controls: &'a str,
    pub target: Option<u32>,
    pub unitary: Option<&'a str>,
}

/// Execute the controlled command.
pub fn execute(
    request: &GateRequest<'_>,
    config: &CliConfig,
    format: OutputFormat,
    output: Option<&str>,
) -> Result<()> {
    let controls = parse_controls(request.controls)?;
    let target = request.target.map(QubitId);
    let decomposer = Decomposer::new(config.decompose);

    let circuit = match request.unitary {
        Some(entries) => {
            let target = target.context("--target is required with --unitary")?;
            let u = parse_unitary(entries)?;
            let mut circuit = Circuit::with_size("controlled", width(&controls, Some(target)));
            check_operands(&controls, Some(target))?;
            decomposer
                .decompose_unitary(&mut circuit, &u, &controls, target)
                .context("Decomposition failed")?;
            circuit
        }
        None => {
            let name = request.gate.context("--gate or --unitary is required")?;
            let gate = parse_gate(name, &parse_list::<f64>(request.angles)?)?;
            let target = match gate {
                StandardGate::GPhase(_) => None,
                _ => Some(target.context("--target is required for this gate")?),
            };
            check_operands(&controls, target)?;
            let instruction = match (gate, target) {
                (StandardGate::MCX, Some(t)) => Instruction::mcx(controls.iter().copied(), t),
                _ => Instruction::gate(gate, controls.iter().copied(), target),
            };
            let mut circuit = Circuit::with_size("controlled", width(&controls, target));
            decomposer
                .decompose_instruction(&mut circuit, &instruction)
                .context("Decomposition failed")?;
            circuit
        }
    };

    if format == OutputFormat::Text && output.is_none() {
        println!(
            "{} Decomposed with {} controls ({:?})",
            style("→").cyan().bold(),
            style(controls.len()).green(),
            config.decompose.phase_strategy
        );
    }

    write_result::<()>(&circuit, None, format, output)
}

fn width(controls: &[Control], target: Option<QubitId>) -> u32 {
    register_width(controls.iter().map(|c| c.qubit).chain(target))
}

fn check_operands(controls: &[Control], target: Option<QubitId>) -> Result<()> {
    let mut seen: Vec<QubitId> = controls.iter().map(|c| c.qubit).chain(target).collect();
    seen.sort_unstable();
    if let Some(pair) = seen.windows(2).find(|w| w[0] == w[1]) {
        anyhow::bail!("Qubit {} is used twice", pair[0]);
    }
    Ok(())
}

/// Build a gate from its name and angle list.
fn parse_gate(name: &str, angles: &[f64]) -> Result<StandardGate> {
    let expect = |count: usize| -> Result<()> {
        if angles.len() != count {
            anyhow::bail!(
                "Gate '{name}' takes {count} angle(s), got {}",
                angles.len()
            );
        }
        Ok(())
    };
    let gate = match name.to_lowercase().as_str() {
        "x" | "cx" | "mcx" => {
            expect(0)?;
            StandardGate::MCX
        }
        "rx" => {
            expect(1)?;
            StandardGate::Rx(angles[0])
        }
        "ry" => {
            expect(1)?;
            StandardGate::Ry(angles[0])
        }
        "rz" => {
            expect(1)?;
            StandardGate::Rz(angles[0])
        }
        "p" | "phase" => {
            expect(1)?;
            StandardGate::P(angles[0])
        }
        "u" | "u3" => {
            expect(3)?;
            StandardGate::U(angles[0], angles[1], angles[2])
        }
        "gphase" => {
            expect(1)?;
            StandardGate::GPhase(angles[0])
        }
        other => {
            anyhow::bail!("Unknown gate: '{other}'. Available: x, rx, ry, rz, p, u, gphase");
        }
    };
    Ok(gate)
}

/// Parse eight numbers into a row-major 2x2 complex matrix.
fn parse_unitary(entries: &str) -> Result<Unitary2x2> {
    let values: Vec<f64> = parse_list(entries)?;
    let &[a_re, a_im, b_re, b_im, c_re, c_im, d_re, d_im] = values.as_slice() else {
        anyhow::bail!("--unitary takes 8 numbers, got {}", values.len());
    };
    Ok(Unitary2x2::new(
        Complex64::new(a_re, a_im),
        Complex64::new(b_re, b_im),
        Complex64::new(c_re, c_im),
        Complex64::new(d_re, d_im),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gate() {
        assert_eq!(parse_gate("RY", &[0.5]).unwrap(), StandardGate::Ry(0.5));
        assert_eq!(
            parse_gate("u", &[0.1, 0.2, 0.3]).unwrap(),
            StandardGate::U(0.1, 0.2, 0.3)
        );
        assert_eq!(parse_gate("x", &[]).unwrap(), StandardGate::MCX);
        assert!(parse_gate("ry", &[]).is_err());
        assert!(parse_gate("h", &[]).is_err());
    }

    #[test]
    fn test_parse_unitary() {
        let u = parse_unitary("0,0, 1,0, 1,0, 0,0").unwrap();
        assert!(u.approx_eq(&Unitary2x2::x(), 1e-12));
        assert!(parse_unitary("1,0,0").is_err());
    }

    #[test]
    fn test_operand_checks() {
        let controls = parse_controls("0,!1").unwrap();
        assert!(check_operands(&controls, Some(QubitId(2))).is_ok());
        assert!(check_operands(&controls, Some(QubitId(1))).is_err());
        assert_eq!(width(&controls, Some(QubitId(4))), 5);
        assert_eq!(width(&controls, None), 2);
    }
}
