//! End-to-end tests running the `qsynth` binary.

use std::fs;
use std::process::{Command, Output};

use serde_json::Value;

fn qsynth(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qsynth"))
        .args(args)
        .env_remove("QSYNTH_CONFIG")
        .output()
        .unwrap()
}

fn json(args: &[&str]) -> Value {
    let mut all = vec!["--format", "json"];
    all.extend_from_slice(args);
    let out = qsynth(&all);
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).unwrap()
}

// ============================================================================
// oracle
// ============================================================================

#[test]
fn test_oracle_json_report() {
    let report = json(&["oracle", "-n", "2", "-m", "1,3"]);
    assert_eq!(report["summary"]["num_qubits"], 3);
    assert_eq!(report["summary"]["num_gates"], 1);
    assert_eq!(report["details"][0]["cover"][0], "-1");
}

#[test]
fn test_oracle_truth_table_text() {
    let out = qsynth(&["oracle", "-t", "11101000"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("out0 = "));
    assert!(stdout.contains("mcx"));
}

#[test]
fn test_oracle_bad_minterm() {
    let out = qsynth(&["oracle", "-n", "2", "-m", "9"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Error:"));
}

// ============================================================================
// controlled
// ============================================================================

#[test]
fn test_controlled_negative_control() {
    let report = json(&["controlled", "-g", "ry", "-a", "0.5", "--controls", "0,!1", "-t", "2"]);
    assert_eq!(report["summary"]["num_qubits"], 3);
    assert_eq!(report["summary"]["ops"]["x"], 2);
    let instructions = report["circuit"]["instructions"].as_array().unwrap();
    assert!(instructions.iter().all(|i| {
        let controls = i["controls"].as_array().unwrap().len();
        controls <= 1
    }));
}

#[test]
fn test_controlled_unitary_negative_entries() {
    // Pauli-Y: [[0, -i], [i, 0]]
    let report = json(&[
        "controlled",
        "-u",
        "0,0,0,-1,0,1,0,0",
        "--controls",
        "0,1",
        "-t",
        "2",
    ]);
    assert!(report["summary"]["num_gates"].as_u64().unwrap() > 0);
}

#[test]
fn test_controlled_rejects_non_unitary() {
    let out = qsynth(&["controlled", "-u", "1,0,1,0,0,0,1,0", "-t", "0"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("not unitary"));
}

#[test]
fn test_controlled_config_strategy() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("qsynth.json");
    fs::write(&config, r#"{ "decompose": { "phase_strategy": "ancilla_free" } }"#).unwrap();

    let out = qsynth(&[
        "--config",
        config.to_str().unwrap(),
        "controlled",
        "-g",
        "gphase",
        "-a",
        "0.3",
        "--controls",
        "0,1,2",
    ]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("AncillaFree"));
}

// ============================================================================
// network
// ============================================================================

#[test]
fn test_network_full_adder_verified() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("adder.json");
    fs::write(
        &path,
        r#"{
            "inputs": 3,
            "gates": [
                { "op": "xor3", "fanins": [2, 4, 6] },
                { "op": "maj", "fanins": [2, 4, 6] }
            ],
            "outputs": [8, 10]
        }"#,
    )
    .unwrap();

    let out = qsynth(&["network", "-i", path.to_str().unwrap(), "--verify"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("Verified 8 input assignments"));

    let report = json(&["network", "-i", path.to_str().unwrap()]);
    assert_eq!(report["details"]["required_ancillae"], 2);
    assert_eq!(report["details"]["num_qubits"], 5);
}

#[test]
fn test_network_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("and.json");
    let output = dir.path().join("and.out.json");
    fs::write(
        &path,
        r#"{ "inputs": 2, "gates": [{ "op": "and", "fanins": [2, 4] }], "outputs": [6] }"#,
    )
    .unwrap();

    let out = qsynth(&[
        "--format",
        "json",
        "-o",
        output.to_str().unwrap(),
        "network",
        "-i",
        path.to_str().unwrap(),
    ]);
    assert!(out.status.success());
    let report: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(report["summary"]["ops"]["mcx"], 1);
}

#[test]
fn test_network_missing_file() {
    let out = qsynth(&["network", "-i", "/nonexistent/network.json"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("File not found"));
}

#[test]
fn test_version() {
    let out = qsynth(&["version"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("qsynth"));
}
