//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - reversible logic synthesis and controlled-gate decomposition",
        style("qsynth").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qsynth-ir         Gate IR, circuit sink, verification helpers");
    println!("  qsynth-logic      Network synthesis and truth-table oracles");
    println!("  qsynth-decompose  Multi-controlled gate decomposition");
    println!("  qsynth-cli        Command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
