//! End-to-end tests of the `qecsim` binary.

use std::process::{Command, Output};

fn qecsim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qecsim"))
        .args(args)
        .output()
        .expect("failed to run qecsim")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ============================================================================
// Argument handling
// ============================================================================

#[test]
fn version_lists_components() {
    let output = qecsim(&["version"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("qecsim-analysis"));
    assert!(text.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn verbosity_flags_accepted() {
    for flag in ["-v", "-vv", "-vvv"] {
        assert!(qecsim(&[flag, "version"]).status.success());
    }
}

#[test]
fn missing_subcommand_fails() {
    assert!(!qecsim(&[]).status.success());
    assert!(!qecsim(&["foobar"]).status.success());
}

#[test]
fn bad_data_process_rejected_by_parser() {
    let output = qecsim(&["fidelity", "--data-process", "offline"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("offline"));
}

#[test]
fn library_errors_exit_with_status_one() {
    let output = qecsim(&["fidelity", "-n", "1", "--data-process", "post_process"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error:"));
}

#[test]
fn missing_sweep_config_reported() {
    let output = qecsim(&["sweep", "--config", "/nonexistent/sweep.yaml"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("File not found"));
}

// ============================================================================
// Commands
// ============================================================================

#[test]
fn fidelity_json_report() {
    let output = qecsim(&[
        "fidelity",
        "-n",
        "2",
        "--t1",
        "1e15",
        "--t2",
        "1e15",
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["kind"], "fidelity");
    assert!(report["created_at"].is_string());
    let fidelities = report["data"]["run"]["fidelities"].as_array().unwrap();
    assert_eq!(fidelities.len(), 3);
    for f in fidelities {
        assert!((f.as_f64().unwrap() - 1.0).abs() < 1e-6);
    }
}

#[test]
fn fidelity_table_output() {
    let output = qecsim(&["fidelity", "-n", "1", "--no-encoding", "-g", "measure=500"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Cycle"));
    assert!(text.contains("recovery"));
}

#[test]
fn encoding_prints_fidelity() {
    let output = qecsim(&["encoding", "--theta", "1.2", "--phi", "-0.4"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Encoding fidelity"));
}

#[test]
fn idle_writes_report_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("idle.json");
    let output = qecsim(&[
        "idle",
        "--t-max",
        "20000",
        "--points",
        "3",
        "--output",
        path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(report["kind"], "idle");
    assert_eq!(report["data"]["encoded"]["times"].as_array().unwrap().len(), 3);
    assert!(report["data"]["single_qubit"]["logical_fidelity"].is_null());
}

#[test]
fn sweep_from_yaml_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("sweep.yaml");
    let result = dir.path().join("sweep.json");
    std::fs::write(
        &config,
        "t1: [40000]\nt2: [60000, 100000]\nn_cycles: 3\nshots: 0\nmode: single_qubit\ntheta: 3.141592653589793\n",
    )
    .unwrap();

    let output = qecsim(&[
        "sweep",
        "--config",
        config.to_str().unwrap(),
        "--output",
        result.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("1 skipped"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&result).unwrap()).unwrap();
    assert_eq!(saved["skipped"], 1);
    assert_eq!(saved["options"]["mode"], "single_qubit");
}

#[test]
fn sweep_inline_flags() {
    let output = qecsim(&[
        "sweep",
        "--t1",
        "40000,50000",
        "--mode",
        "single-qubit",
        "-n",
        "3",
        "--theta",
        "3.141592653589793",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Swept 2 points (0 skipped)"));
}
