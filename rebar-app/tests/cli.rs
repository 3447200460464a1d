use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn rebar() -> Command {
    let mut cmd = Command::cargo_bin("rebar-modelling").unwrap();
    cmd.env_remove("REBAR_CONFIG").env("RUST_LOG", "off");
    cmd
}

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp config");
    file.write_all(content.as_bytes()).expect("write temp config");
    file
}

#[test]
fn outputs_tool_name() {
    rebar()
        .arg("--version")
        .assert()
        .success()
        .stdout("rebar-modelling 0.1.0\n");
}

#[test]
fn text_report_for_x_axis() {
    rebar()
        .args(["tests/data/slab.dxf", "--axis", "x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("标准钢筋长度: 4.850"))
        .stdout(predicate::str::contains("标准配筋区宽度: 3.200"))
        .stdout(predicate::str::contains("bottom_left: (-1.425, -0.100)"))
        .stdout(predicate::str::contains("top_left: (-1.425, 3.100)"));
}

#[test]
fn json_report_for_y_axis() {
    let output = rebar()
        .args(["tests/data/slab.dxf", "-a", "y", "--json"])
        .output()
        .expect("run rebar-modelling");
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be json");
    assert_eq!(value["axis"], "y");
    assert_eq!(value["minimal_rebar_length"], 5.0);
    assert_eq!(value["rebar_length"], 5.85);
    let zone = value["zone"].as_object().expect("zone object");
    let mut labels: Vec<_> = zone.keys().map(String::as_str).collect();
    labels.sort_unstable();
    assert_eq!(
        labels,
        ["bottom_left", "bottom_right", "top_left", "top_right"]
    );
}

#[test]
fn axis_is_case_insensitive() {
    rebar()
        .args(["tests/data/slab.dxf", "--axis", "X"])
        .assert()
        .success()
        .stdout(predicate::str::contains("钢筋方向: x"));
}

#[test]
fn layer_option_limits_entities() {
    rebar()
        .args(["tests/data/slab.dxf", "--axis", "x", "--layer", "COLUMN"])
        .assert()
        .success()
        .stdout(predicate::str::contains("最小钢筋长度: 2.500"))
        .stdout(predicate::str::contains("标准钢筋长度: 2.900"));

    rebar()
        .args(["tests/data/slab.dxf", "--axis", "x", "--layer", "MISSING"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("MISSING"));
}

#[test]
fn missing_axis_is_usage_error() {
    rebar()
        .arg("tests/data/slab.dxf")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--axis"));
}

#[test]
fn unknown_axis_is_usage_error() {
    rebar()
        .args(["tests/data/slab.dxf", "--axis", "z"])
        .assert()
        .code(2);
}

#[test]
fn missing_file_is_usage_error() {
    rebar()
        .args(["tests/data/nothing_here.dxf", "--axis", "x"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nothing_here.dxf"));
}

#[test]
fn plain_text_exits_with_one() {
    rebar()
        .args(["tests/data/readme.txt", "--axis", "x"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("not a DXF file"));
}

#[test]
fn failure_is_reported_once_with_logging_enabled() {
    let output = rebar()
        .env("RUST_LOG", "info")
        .args(["tests/data/readme.txt", "--axis", "x"])
        .output()
        .expect("run rebar-modelling");
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("not a DXF file").count(), 1, "stderr: {stderr}");
}

#[test]
fn layer_name_matches_case_insensitively() {
    rebar()
        .args(["tests/data/slab.dxf", "--axis", "x", "--layer", "column"])
        .assert()
        .success()
        .stdout(predicate::str::contains("标准钢筋长度: 2.900"));
}

#[test]
fn corrupt_dxf_exits_with_two() {
    rebar()
        .args(["tests/data/corrupt.dxf", "--axis", "x"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid document structure"));
}

#[test]
fn oversized_geometry_exits_with_three() {
    rebar()
        .args(["tests/data/oversized.dxf", "--axis", "x"])
        .assert()
        .code(3);

    rebar()
        .args(["tests/data/oversized.dxf", "--axis", "y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("标准钢筋长度: 3.900"));
}

#[test]
fn explicit_config_controls_output() {
    let config = write_config("[output]\nformat = \"json\"\n\n[design]\ncatalog_mm = [6000, 12000]\n");
    let output = rebar()
        .args(["tests/data/slab.dxf", "--axis", "x", "--config"])
        .arg(config.path())
        .output()
        .expect("run rebar-modelling");
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be json");
    assert_eq!(value["rebar_length"], 6.0);
}

#[test]
fn broken_config_exits_with_four() {
    let config = write_config("[design]\npitch_mm = 0.0\n");
    rebar()
        .args(["tests/data/slab.dxf", "--axis", "x", "--config"])
        .arg(config.path())
        .assert()
        .code(4);

    rebar()
        .args([
            "tests/data/slab.dxf",
            "--axis",
            "x",
            "--config",
            "tests/data/absent.toml",
        ])
        .assert()
        .code(4);
}

#[test]
fn discovered_config_via_environment() {
    let config = write_config("[output]\nprecision = 1\n");
    rebar()
        .env("REBAR_CONFIG", config.path())
        .args(["tests/data/slab.dxf", "--axis", "x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("标准钢筋长度: 4.8"))
        .stdout(predicate::str::contains("标准钢筋长度: 4.85").not());
}
