use regex::Regex;
use std::process::{Command, Output};

fn hitmap(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hitmap"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(args)
        .output()
        .expect("Failed to execute binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_cli_show_mesh() {
    let output = hitmap(&["show", "--threshold", "50"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("mesh_xtal1 (mesh 5x4)"), "{}", out);
    assert!(out.contains("12.6"));
    // 0.4 is below half of 12.6
    assert!(!out.contains(" 0.4 "));
}

#[test]
fn test_cli_show_line_axis() {
    let output = hitmap(&[
        "show",
        "--acquisition",
        "data/demo/line_collection.json",
        "--results",
        "data/demo/line_results.csv",
    ]);
    assert!(output.status.success());
    let out = stdout(&output);
    let axis = Regex::new(r"Axis: inf \| [0-9]+\.[0-9]{2}").unwrap();
    assert!(axis.is_match(&out), "{}", out);
}

#[test]
fn test_cli_points_json() {
    let output = hitmap(&["points", "--threshold", "50", "--json"]);
    assert!(output.status.success());
    let points: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let points = points.as_array().unwrap();
    // 7.9, 9.4 and 12.6 pass 50 % of 12.6
    assert_eq!(points.len(), 3);
    assert!(points.iter().all(|p| p["motors"]["phiy"].is_number()));
}

#[test]
fn test_cli_best_table_and_rewrite() {
    let output = hitmap(&["best", "--config", "data/demo/config.json", "--row", "1"]);
    assert!(output.status.success());
    let out = stdout(&output);
    let first_row = Regex::new(r"\|\s*10\s*\|\s*12\.60\s*\|\s*42\s*\|").unwrap();
    assert!(first_row.is_match(&out), "{}", out);
    assert!(out.contains("/ramdisk/visitor/mx2112/20241015/xtal1/mesh_1_0010.cbf"));
}

#[test]
fn test_cli_inspect_readout() {
    let output = hitmap(&["inspect", "-x", "2.5", "-y", "2.5", "--action", "centring-point"]);
    assert!(output.status.success());
    let out = stdout(&output);
    let info = Regex::new(r"Image \d+, value: 12\.6").unwrap();
    assert!(info.is_match(&out), "{}", out);
    assert!(out.contains("Create centring point"));
}

#[test]
fn test_cli_missing_input_fails() {
    let output = hitmap(&["show", "--results", "/nonexistent/results.json"]);
    assert!(!output.status.success());
}
