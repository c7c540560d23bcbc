//! Shared helpers for CLI commands.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::ValueEnum;
use console::style;
use serde::{Deserialize, Serialize};

use qsynth_decompose::DecomposeConfig;
use qsynth_ir::{Circuit, Control, QubitId};
use qsynth_logic::LogicSynthesisParams;

/// Configuration file contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Network synthesis parameters.
    pub logic: LogicSynthesisParams,
    /// Controlled-gate decomposition parameters.
    pub decompose: DecomposeConfig,
}

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable gate list.
    Text,
    /// Machine-readable JSON report.
    Json,
}

/// Load the configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&str>) -> Result<CliConfig> {
    let Some(path) = path else {
        return Ok(CliConfig::default());
    };
    if !Path::new(path).exists() {
        anyhow::bail!("Config file not found: {path}");
    }
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read config: {path}"))?;
    serde_json::from_str(&source).with_context(|| format!("Invalid config: {path}"))
}

/// Parse a comma-separated list, ignoring blanks.
pub fn parse_list<T>(list: &str) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<T>()
                .with_context(|| format!("Invalid list entry '{item}'"))
        })
        .collect()
}

/// Parse a control list such as `0,!2,3`; `!` marks a negative control.
pub fn parse_controls(list: &str) -> Result<Vec<Control>> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (positive, index) = match item.strip_prefix('!') {
                Some(rest) => (false, rest),
                None => (true, item),
            };
            let qubit: u32 = index
                .parse()
                .with_context(|| format!("Invalid control qubit '{item}'"))?;
            Ok(Control::with_polarity(QubitId(qubit), positive))
        })
        .collect()
}

/// Gate counts and shape of a circuit.
#[derive(Debug, Serialize)]
pub struct CircuitSummary {
    pub num_qubits: u32,
    pub num_gates: usize,
    pub entangling: usize,
    pub depth: usize,
    pub ops: BTreeMap<&'static str, usize>,
}

impl CircuitSummary {
    pub fn of(circuit: &Circuit) -> Self {
        Self {
            num_qubits: circuit.num_qubits(),
            num_gates: circuit.len(),
            entangling: circuit.entangling_count(),
            depth: circuit.depth(),
            ops: circuit.count_ops().into_iter().collect(),
        }
    }
}

#[derive(Serialize)]
struct Report<'a, T: Serialize> {
    summary: CircuitSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a T>,
    circuit: &'a Circuit,
}

/// Print `circuit` in the requested format, with optional command-specific
/// details, to stdout or `output`.
pub fn write_result<T: Serialize>(
    circuit: &Circuit,
    details: Option<&T>,
    format: OutputFormat,
    output: Option<&str>,
) -> Result<()> {
    let content = match format {
        OutputFormat::Json => {
            let report = Report {
                summary: CircuitSummary::of(circuit),
                details,
                circuit,
            };
            let mut json = serde_json::to_string_pretty(&report)?;
            json.push('\n');
            json
        }
        OutputFormat::Text => render_text(circuit),
    };

    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write file: {path}"))?;
            println!("  Output: {}", style(path).green());
        }
        None => print!("{content}"),
    }
    Ok(())
}

fn render_text(circuit: &Circuit) -> String {
    let summary = CircuitSummary::of(circuit);
    let ops: Vec<String> = summary
        .ops
        .iter()
        .map(|(name, count)| format!("{name}: {count}"))
        .collect();
    let mut text = format!(
        "// {} qubits, {} gates, {} entangling, depth {}\n// {}\n",
        summary.num_qubits,
        summary.num_gates,
        summary.entangling,
        summary.depth,
        ops.join(", ")
    );
    for instruction in circuit.instructions() {
        text.push_str(&instruction.to_string());
        text.push('\n');
    }
    text
}

/// Register width needed to hold every listed qubit.
pub fn register_width(qubits: impl IntoIterator<Item = QubitId>) -> u32 {
    qubits.into_iter().map(|q| q.0 + 1).max().unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_controls() {
        let controls = parse_controls("0, !2,3").unwrap();
        assert_eq!(
            controls,
            vec![
                Control::positive(QubitId(0)),
                Control::negative(QubitId(2)),
                Control::positive(QubitId(3)),
            ]
        );
        assert!(parse_controls("").unwrap().is_empty());
        assert!(parse_controls("a").is_err());
    }

    #[test]
    fn test_parse_list() {
        let angles: Vec<f64> = parse_list("0.5,-1.25").unwrap();
        assert_eq!(angles, vec![0.5, -1.25]);
        let minterms: Vec<u64> = parse_list("3, 5,,7").unwrap();
        assert_eq!(minterms, vec![3, 5, 7]);
        assert!(parse_list::<u64>("1,x").is_err());
    }

    #[test]
    fn test_config_sections() {
        let config: CliConfig = serde_json::from_str(
            r#"{ "logic": { "low_tdepth_and": true }, "decompose": { "phase_strategy": "ancilla_free" } }"#,
        )
        .unwrap();
        assert!(config.logic.low_tdepth_and);
        assert_eq!(
            config.decompose.phase_strategy,
            qsynth_decompose::PhaseStrategy::AncillaFree
        );
        assert!(serde_json::from_str::<CliConfig>(r#"{ "oops": 1 }"#).is_err());
    }

    #[test]
    fn test_load_missing_config() {
        assert_eq!(load_config(None).unwrap(), CliConfig::default());
        let err = load_config(Some("/nonexistent/qsynth.json")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_text_rendering() {
        let mut circuit = Circuit::with_size("t", 2);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        let text = render_text(&circuit);
        assert!(text.starts_with("// 2 qubits, 1 gates"));
        assert!(text.contains("cx: 1"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_register_width() {
        assert_eq!(register_width([QubitId(0), QubitId(4)]), 5);
        assert_eq!(register_width([]), 1);
    }
}
