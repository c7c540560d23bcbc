//! Oracle command implementation.

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;

use qsynth_logic::TruthTable;
use qsynth_logic::oracle::{OracleTable, minimize, synthesize_oracle};

use super::common::{OutputFormat, parse_list, write_result};

/// Minimized cover of one output row.
#[derive(Debug, Serialize)]
struct RowCover {
    output: usize,
    minterms: Vec<u64>,
    cover: Vec<String>,
}

/// Execute the oracle command.
///
/// Minterms follow the oracle convention: the most significant bit of a
/// minterm is input qubit 0.
pub fn execute(
    inputs: Option<u32>,
    minterms: &[String],
    truth_tables: &[String],
    format: OutputFormat,
    output: Option<&str>,
) -> Result<()> {
    let table = build_table(inputs, minterms, truth_tables)?;

    let covers: Vec<RowCover> = (0..table.num_outputs() as usize)
        .map(|output| RowCover {
            output,
            minterms: table.row(output).to_vec(),
            cover: minimize(table.num_inputs(), table.row(output)),
        })
        .collect();

    let circuit = synthesize_oracle(&table).context("Oracle synthesis failed")?;

    if format == OutputFormat::Text && output.is_none() {
        println!(
            "{} Oracle over {} inputs with {} outputs",
            style("→").cyan().bold(),
            style(table.num_inputs()).green(),
            style(table.num_outputs()).green()
        );
        for row in &covers {
            println!(
                "  out{} = {}",
                row.output,
                if row.cover.is_empty() {
                    "0".to_string()
                } else {
                    row.cover.join(" + ")
                }
            );
        }
    }

    write_result(&circuit, Some(&covers), format, output)
}

fn build_table(
    inputs: Option<u32>,
    minterms: &[String],
    truth_tables: &[String],
) -> Result<OracleTable> {
    if !truth_tables.is_empty() {
        let functions = truth_tables
            .iter()
            .map(|bits| TruthTable::from_binary_str(bits.trim()))
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid truth table")?;
        let table = OracleTable::from_truth_tables(&functions)?;
        match inputs {
            Some(n) if n != table.num_inputs() => anyhow::bail!(
                "--inputs is {n} but the truth tables have {} variables",
                table.num_inputs()
            ),
            _ => {}
        }
        return Ok(table);
    }

    if minterms.is_empty() {
        anyhow::bail!("Give at least one --minterms or --truth-table row");
    }
    let Some(n) = inputs else {
        anyhow::bail!("--inputs is required with --minterms");
    };
    let rows = minterms
        .iter()
        .map(|row| parse_list::<u64>(row))
        .collect::<Result<Vec<_>>>()?;
    Ok(OracleTable::new(n, rows)?)
}
