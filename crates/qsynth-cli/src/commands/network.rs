//! Network synthesis command implementation.
//!
//! Networks are read from JSON. Node `0` is the constant false, nodes
//! `1..=inputs` are the primary inputs, and every gate adds the next node.
//! Signals are literals `2·node + complemented`, so `1` is constant true.
//!
//! ```json
//! {
//!   "inputs": 3,
//!   "gates": [
//!     { "op": "xor3", "fanins": [2, 4, 6] },
//!     { "op": "maj", "fanins": [2, 4, 6] }
//!   ],
//!   "outputs": [8, 10]
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use serde::{Deserialize, Serialize};
use tracing::info;

use qsynth_ir::{Circuit, classical};
use qsynth_logic::{
    BennettStrategy, Network, PprmSynthesis, Signal, SynthesisStats, TruthTable,
    synthesize_network,
};

use super::common::{CliConfig, OutputFormat, write_result};

/// Networks wider than this are not verified exhaustively.
const MAX_VERIFY_INPUTS: u32 = 16;

/// JSON description of a logic network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkSpec {
    pub inputs: u32,
    #[serde(default)]
    pub gates: Vec<GateSpec>,
    pub outputs: Vec<u32>,
}

/// One gate of a [`NetworkSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum GateSpec {
    And { fanins: [u32; 2] },
    Or { fanins: [u32; 2] },
    Xor { fanins: [u32; 2] },
    Xor3 { fanins: [u32; 3] },
    Maj { fanins: [u32; 3] },
    NaryXor { fanins: Vec<u32> },
    /// `function` is a binary truth table, most significant entry first;
    /// variable `i` is fan-in `i`.
    Lut { fanins: Vec<u32>, function: String },
}

impl NetworkSpec {
    /// Build the network, checking that every literal refers to an earlier
    /// node.
    pub fn build(&self) -> Result<Network> {
        let mut ntk = Network::new();
        let mut nodes = vec![ntk.get_constant(false)];
        for _ in 0..self.inputs {
            nodes.push(ntk.create_pi());
        }

        for (i, gate) in self.gates.iter().enumerate() {
            let lit = |l: u32| {
                literal(&nodes, l).with_context(|| format!("gate {i} ({})", gate.name()))
            };
            let signal = match gate {
                GateSpec::And { fanins: [a, b] } => ntk.create_and(lit(*a)?, lit(*b)?),
                GateSpec::Or { fanins: [a, b] } => ntk.create_or(lit(*a)?, lit(*b)?),
                GateSpec::Xor { fanins: [a, b] } => ntk.create_xor(lit(*a)?, lit(*b)?),
                GateSpec::Xor3 { fanins: [a, b, c] } => {
                    ntk.create_xor3(lit(*a)?, lit(*b)?, lit(*c)?)
                }
                GateSpec::Maj { fanins: [a, b, c] } => {
                    ntk.create_maj(lit(*a)?, lit(*b)?, lit(*c)?)
                }
                GateSpec::NaryXor { fanins } => {
                    let fanins = fanins.iter().map(|&l| lit(l)).collect::<Result<_>>()?;
                    ntk.create_nary_xor(fanins)
                }
                GateSpec::Lut { fanins, function } => {
                    let fanins = fanins.iter().map(|&l| lit(l)).collect::<Result<_>>()?;
                    let function = TruthTable::from_binary_str(function)
                        .with_context(|| format!("gate {i}: invalid LUT function"))?;
                    ntk.create_lut(fanins, function)?
                }
            };
            nodes.push(signal);
        }

        for &l in &self.outputs {
            ntk.create_po(literal(&nodes, l).context("output")?);
        }
        Ok(ntk)
    }
}

impl GateSpec {
    fn name(&self) -> &'static str {
        match self {
            GateSpec::And { .. } => "and",
            GateSpec::Or { .. } => "or",
            GateSpec::Xor { .. } => "xor",
            GateSpec::Xor3 { .. } => "xor3",
            GateSpec::Maj { .. } => "maj",
            GateSpec::NaryXor { .. } => "nary_xor",
            GateSpec::Lut { .. } => "lut",
        }
    }
}

fn literal(nodes: &[Signal], lit: u32) -> Result<Signal> {
    let node = (lit / 2) as usize;
    let Some(&signal) = nodes.get(node) else {
        anyhow::bail!("literal {lit} refers to node {node}, which is not defined yet");
    };
    Ok(if lit % 2 == 1 { !signal } else { signal })
}

/// Load a network description from a JSON file.
pub fn load_network(path: &str) -> Result<NetworkSpec> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
    serde_json::from_str(&source).with_context(|| format!("Invalid network description: {path}"))
}

/// Simulate `circuit` on every input assignment and compare the output
/// lines against the network.
pub fn verify(network: &Network, circuit: &Circuit, stats: &SynthesisStats) -> Result<u64> {
    let n = stats.input_indexes.len() as u32;
    if n > MAX_VERIFY_INPUTS {
        anyhow::bail!("{n} inputs are too many to verify exhaustively (limit {MAX_VERIFY_INPUTS})");
    }
    let width = circuit.num_qubits() as usize;
    for x in 0..(1u64 << n) {
        let inputs = classical::bits_of(x, n as usize);
        let mut state = vec![false; width];
        for (q, &v) in stats.input_indexes.iter().zip(&inputs) {
            state[q.index()] = v;
        }
        let out = classical::simulate(circuit, &state)?;
        let expected = network.simulate(&inputs)?;
        for (i, (q, want)) in stats.output_indexes.iter().zip(expected).enumerate() {
            if out[q.index()] != want {
                anyhow::bail!("output {i} is wrong for input assignment {x:#b}");
            }
        }
    }
    Ok(1u64 << n)
}

/// Execute the network command.
pub fn execute(
    input: &str,
    do_verify: bool,
    config: &CliConfig,
    format: OutputFormat,
    output: Option<&str>,
) -> Result<()> {
    let spec = load_network(input)?;
    let network = spec.build()?;
    info!(
        "Loaded network with {} inputs, {} gates, {} outputs",
        spec.inputs,
        spec.gates.len(),
        spec.outputs.len()
    );

    let mut circuit = Circuit::new("network");
    let stats = synthesize_network(
        &mut circuit,
        &network,
        &mut BennettStrategy::new(),
        Some(&PprmSynthesis),
        config.logic,
    )
    .context("Network synthesis failed")?;

    let chatty = format == OutputFormat::Text && output.is_none();
    if chatty {
        println!(
            "{} Synthesized {} into {} qubits ({} ancillae)",
            style("→").cyan().bold(),
            style(input).green(),
            style(stats.num_qubits).yellow(),
            stats.required_ancillae
        );
    }

    if do_verify {
        let checked = verify(&network, &circuit, &stats)?;
        if chatty {
            println!(
                "{} Verified {checked} input assignments",
                style("✓").green().bold()
            );
        }
    }

    write_result(&circuit, Some(&stats), format, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_adder() -> NetworkSpec {
        serde_json::from_str(
            r#"{
                "inputs": 3,
                "gates": [
                    { "op": "xor3", "fanins": [2, 4, 6] },
                    { "op": "maj", "fanins": [2, 4, 6] }
                ],
                "outputs": [8, 10]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_full_adder_verifies() {
        let network = full_adder().build().unwrap();
        let mut circuit = Circuit::new("adder");
        let stats = synthesize_network(
            &mut circuit,
            &network,
            &mut BennettStrategy::new(),
            None,
            Default::default(),
        )
        .unwrap();
        assert_eq!(verify(&network, &circuit, &stats).unwrap(), 8);
    }

    #[test]
    fn test_complemented_outputs_and_lut() {
        let spec: NetworkSpec = serde_json::from_str(
            r#"{
                "inputs": 2,
                "gates": [
                    { "op": "and", "fanins": [3, 4] },
                    { "op": "lut", "fanins": [2, 5], "function": "0110" }
                ],
                "outputs": [7, 8, 1]
            }"#,
        )
        .unwrap();
        let network = spec.build().unwrap();
        let mut circuit = Circuit::new("mixed");
        let stats = synthesize_network(
            &mut circuit,
            &network,
            &mut BennettStrategy::new(),
            Some(&PprmSynthesis),
            Default::default(),
        )
        .unwrap();
        assert_eq!(verify(&network, &circuit, &stats).unwrap(), 4);
    }

    #[test]
    fn test_forward_reference_rejected() {
        let spec = NetworkSpec {
            inputs: 1,
            gates: vec![GateSpec::And { fanins: [2, 6] }],
            outputs: vec![4],
        };
        let err = spec.build().unwrap_err();
        assert!(format!("{err:#}").contains("not defined yet"));
    }

    #[test]
    fn test_unknown_op_rejected() {
        let result: Result<NetworkSpec, _> =
            serde_json::from_str(r#"{ "inputs": 1, "gates": [{ "op": "nand", "fanins": [2, 2] }], "outputs": [] }"#);
        assert!(result.is_err());
    }
}
