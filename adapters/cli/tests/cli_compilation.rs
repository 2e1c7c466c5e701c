use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "dread-maze"])
        .status()
        .expect("failed to invoke cargo check for dread-maze CLI binary");

    assert!(status.success(), "cargo check --bin dread-maze should succeed");
}

#[test]
fn short_run_prints_a_summary() {
    let output = Command::new(env!("CARGO_BIN_EXE_dread-maze"))
        .args([
            "--seed", "5", "--width", "15", "--height", "11", "--ticks", "120", "--print-map",
        ])
        .output()
        .expect("failed to run dread-maze");

    assert!(output.status.success(), "dread-maze exited with failure");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Welcome to Dread Maze."));
    assert!(stdout.contains("outcome:"));
    assert!(stdout.contains('@'));
}

#[test]
fn missing_config_file_is_reported() {
    let output = Command::new(env!("CARGO_BIN_EXE_dread-maze"))
        .args(["--config", "no/such/run.toml", "--ticks", "1"])
        .output()
        .expect("failed to run dread-maze");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no/such/run.toml"));
}
