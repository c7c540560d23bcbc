//! qsynth Command-Line Interface
//!
//! The main entry point for the `qsynth` tool. Each subcommand drives one of
//! the synthesizers and prints the resulting gate list.
//!
//! ```text
//! qsynth oracle      truth table   ──► minimized MCX cascade
//! qsynth controlled  gate/matrix   ──► elementary gates
//! qsynth network     logic network ──► reversible circuit
//! ```

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::{OutputFormat, load_config};
use commands::{controlled, network, oracle, version};

/// qsynth - reversible logic synthesis and controlled-gate decomposition
#[derive(Parser)]
#[command(name = "qsynth")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON configuration file with `logic` and `decompose` sections
    #[arg(short, long, global = true, env = "QSYNTH_CONFIG")]
    config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Write the result to a file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a multi-output truth table into an XOR oracle
    Oracle {
        /// Number of input variables (required with --minterms)
        #[arg(short = 'n', long)]
        inputs: Option<u32>,

        /// Minterms of one output, comma separated (repeat per output)
        #[arg(short, long, conflicts_with = "truth_table")]
        minterms: Vec<String>,

        /// Truth table of one output as a binary string, most significant
        /// input first (repeat per output)
        #[arg(short, long)]
        truth_table: Vec<String>,
    },

    /// Decompose a controlled gate or 2x2 unitary into elementary gates
    Controlled {
        /// Gate to control (x, rx, ry, rz, p, u, gphase)
        #[arg(short, long, required_unless_present = "unitary")]
        gate: Option<String>,

        /// Gate angles, comma separated
        #[arg(short, long, default_value = "", allow_hyphen_values = true)]
        angles: String,

        /// Control qubits, comma separated; prefix `!` for negative polarity
        #[arg(long, default_value = "")]
        controls: String,

        /// Target qubit
        #[arg(short, long)]
        target: Option<u32>,

        /// Row-major 2x2 matrix as eight numbers (re, im) per entry
        #[arg(
            short,
            long,
            conflicts_with = "gate",
            requires = "target",
            allow_hyphen_values = true
        )]
        unitary: Option<String>,
    },

    /// Synthesize a logic network described in JSON
    Network {
        /// Network description file
        #[arg(short, long)]
        input: String,

        /// Check every input assignment by classical simulation
        #[arg(long)]
        verify: bool,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = load_config(cli.config.as_deref()).and_then(|config| {
        let output = cli.output.as_deref();
        match cli.command {
            Commands::Oracle {
                inputs,
                minterms,
                truth_table,
            } => oracle::execute(inputs, &minterms, &truth_table, cli.format, output),

            Commands::Controlled {
                gate,
                angles,
                controls,
                target,
                unitary,
            } => controlled::execute(
                &controlled::GateRequest {
                    gate: gate.as_deref(),
                    angles: &angles,
                    controls: &controls,
                    target,
                    unitary: unitary.as_deref(),
                },
                &config,
                cli.format,
                output,
            ),

            Commands::Network { input, verify } => {
                network::execute(&input, verify, &config, cli.format, output)
            }

            Commands::Version => {
                version::execute();
                Ok(())
            }
        }
    });

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
