use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

// 24 kHz bench crystal so a two-second timer period fits in a short run.
const BOARD_YAML: &str = r#"
name: bench
crystal_hz: 24000
peripherals:
  - id: uart0
    type: uart
    base_address: 270471168
  - id: timer
    type: timer
    base_address: 1208221696
    irq: 68
  - id: intc
    type: intc
    base_address: 1210056704
  - id: cm
    type: clock
    base_address: 1155530752
"#;

fn temp_dir(tag: &str) -> PathBuf {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("tickbed-tests-{tag}-{nonce}"));
    std::fs::create_dir_all(&dir).expect("Failed to create temp dir");
    dir
}

#[test]
fn test_cli_test_mode_outputs() {
    let dir = temp_dir("outputs");

    // Board referenced by relative path to check scenario-dir resolution
    std::fs::write(dir.join("board.yaml"), BOARD_YAML).expect("Failed to write board");

    let script_path = dir.join("script.yaml");
    let script_content = r#"
schema_version: "1.0"
board: board.yaml
limits:
  max_cycles: 200000
run:
  iterations: 3
  delay_cycles: 100
assertions:
  - uart_contains: "interrupts enabled"
  - uart_contains: "606\n775\n924"
  - tick_count: 0
  - expected_stop_reason: main_done
"#;
    std::fs::write(&script_path, script_content).expect("Failed to write script");

    let output_dir = dir.join("artifacts");

    let output = Command::new(env!("CARGO_BIN_EXE_tickbed"))
        .args([
            "test",
            "--script",
            script_path.to_str().unwrap(),
            "--no-uart-stdout",
            "--output-dir",
            output_dir.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());

    let result_path = output_dir.join("result.json");
    assert!(result_path.exists());

    let junit_path = output_dir.join("junit.xml");
    assert!(junit_path.exists());
    let junit = std::fs::read_to_string(&junit_path).unwrap();
    assert!(junit.contains("<testsuite"));
    assert!(junit.contains("<testcase"));

    let result_content = std::fs::read_to_string(&result_path).unwrap();
    let result: serde_json::Value = serde_json::from_str(&result_content).unwrap();

    assert_eq!(result["status"], "pass");
    assert_eq!(result["stop_reason"], "main_done");
    assert!(result["scenario_hash"].as_str().is_some());
    assert!(result["config"]["script"]
        .as_str()
        .unwrap()
        .contains("script.yaml"));
    assert_eq!(result["config"]["board"], "board.yaml");

    // Clean up
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_test_mode_junit_flag_writes_file() {
    let dir = temp_dir("junit-flag");
    let script_path = dir.join("script.yaml");
    std::fs::write(
        &script_path,
        r#"
schema_version: "1.0"
limits:
  max_cycles: 100000
run:
  iterations: 1
  delay_cycles: 100
assertions:
  - expected_stop_reason: main_done
"#,
    )
    .expect("Failed to write script");

    let junit_path = dir.join("extra-junit.xml");

    let output = Command::new(env!("CARGO_BIN_EXE_tickbed"))
        .args([
            "test",
            "--script",
            script_path.to_str().unwrap(),
            "--no-uart-stdout",
            "--output-dir",
            dir.join("artifacts").to_str().unwrap(),
            "--junit",
            junit_path.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert!(junit_path.exists());

    let junit = std::fs::read_to_string(&junit_path).unwrap();
    assert!(junit.contains("<testsuite"));
    assert!(junit.contains("tickbed test"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_test_mode_assert_fail() {
    let dir = temp_dir("assert-fail");
    let script_path = dir.join("script.yaml");
    std::fs::write(
        &script_path,
        r#"
schema_version: "1.0"
limits:
  max_cycles: 100000
run:
  iterations: 1
  delay_cycles: 100
assertions:
  - uart_contains: "ThisTextWillNeverBeFound"
"#,
    )
    .expect("Failed to write script");

    let output = Command::new(env!("CARGO_BIN_EXE_tickbed"))
        .args([
            "test",
            "--script",
            script_path.to_str().unwrap(),
            "--no-uart-stdout",
            "--output-dir",
            dir.join("artifacts").to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1)); // EXIT_ASSERT_FAIL

    let result_content =
        std::fs::read_to_string(dir.join("artifacts").join("result.json")).unwrap();
    let result: serde_json::Value = serde_json::from_str(&result_content).unwrap();
    assert_eq!(result["status"], "fail");
    assert_eq!(result["assertions"][0]["passed"], false);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_test_mode_max_cycles_guard() {
    let dir = temp_dir("guard");
    let script_path = dir.join("script.yaml");
    std::fs::write(
        &script_path,
        r#"
schema_version: "1.0"
limits:
  max_cycles: 60000000000
"#,
    )
    .expect("Failed to write script");

    let output = Command::new(env!("CARGO_BIN_EXE_tickbed"))
        .args(["test", "--script", script_path.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    // Should fail due to MAX_ALLOWED_CYCLES guard
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2)); // EXIT_CONFIG_ERROR

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_test_mode_rejects_unknown_scenario_fields() {
    let dir = temp_dir("unknown-field");
    let script_path = dir.join("script.yaml");
    std::fs::write(
        &script_path,
        r#"
schema_version: "1.0"
limits:
  max_cycles: 1000
firmware: "whatever.elf"
"#,
    )
    .expect("Failed to write script");

    let output = Command::new(env!("CARGO_BIN_EXE_tickbed"))
        .args(["test", "--script", script_path.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));

    let _ = std::fs::remove_dir_all(&dir);
}
