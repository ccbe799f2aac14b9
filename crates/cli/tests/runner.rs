use std::process::Command;

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_tickbed"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("TickBed"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("test"));
}

#[test]
fn test_cli_run_missing_board() {
    let output = Command::new(env!("CARGO_BIN_EXE_tickbed"))
        .args(["run", "--board", "non_existent_board.yaml"])
        .output()
        .expect("Failed to execute command");

    // It should fail because the descriptor is missing
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_cli_test_missing_script() {
    let output = Command::new(env!("CARGO_BIN_EXE_tickbed"))
        .args(["test", "--script", "non_existent_script.yaml"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
}
