use assert_cmd::Command;
use tempfile::tempdir;

fn walletgen() -> Command {
    let mut cmd = Command::cargo_bin("walletgen").expect("walletgen binary");
    cmd.env("WALLETGEN_PACING_MS", "0")
        .env_remove("WALLETGEN_CONFIG")
        .env_remove("WALLETGEN_OUTPUT_DIR");
    cmd
}

#[test]
fn generates_and_exports_with_flags() {
    let dir = tempdir().unwrap();
    let output = walletgen()
        .args(["--chain", "eth", "--count", "2", "--skip-guard", "--output-dir"])
        .arg(dir.path())
        .output()
        .expect("failed to run walletgen");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "walletgen failed: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Export succeeded"), "stdout was: {}", stdout);
    assert!(stdout.contains("Program end"));
    assert!(dir.path().join("eth_wallets").join("eth_wallets.xlsx").exists());
}

#[test]
fn custom_filename_is_used() {
    let dir = tempdir().unwrap();
    walletgen()
        .args(["--chain", "sol", "--count", "1", "--skip-guard", "--filename", "mine.xlsx", "--output-dir"])
        .arg(dir.path())
        .assert()
        .success();
    assert!(dir.path().join("sol_wallets").join("mine.xlsx").exists());
}

#[test]
fn prompts_when_flags_missing() {
    let dir = tempdir().unwrap();
    let output = walletgen()
        .args(["--skip-guard", "--output-dir"])
        .arg(dir.path())
        .write_stdin("doge\nsol\n1\n")
        .output()
        .expect("failed to run walletgen");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout was: {}", stdout);
    assert!(stdout.contains("valid chain"));
    assert!(dir.path().join("sol_wallets").join("sol_wallets.xlsx").exists());
}

#[test]
fn invalid_count_flag_exits_with_validation_code() {
    walletgen().args(["--chain", "eth", "--count", "0", "--skip-guard"]).assert().code(1);
}

#[test]
fn closed_stdin_exits_with_validation_code() {
    let dir = tempdir().unwrap();
    walletgen()
        .args(["--chain", "eth", "--skip-guard", "--output-dir"])
        .arg(dir.path())
        .write_stdin("")
        .assert()
        .code(1);
}

#[test]
fn broken_config_exits_with_validation_code() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("walletgen.toml");
    std::fs::write(&config, "mnemonic_words = 13\n").unwrap();
    walletgen()
        .args(["--chain", "eth", "--count", "1", "--skip-guard", "--config"])
        .arg(&config)
        .assert()
        .code(1);
}

#[test]
fn help_exits_cleanly() {
    walletgen().arg("--help").assert().success();
}

#[cfg(unix)]
#[test]
fn ctrl_c_at_prompt_exits_with_interrupted_code() {
    use std::process::{Command as StdCommand, Stdio};
    use std::thread;
    use std::time::Duration;

    let dir = tempdir().unwrap();
    let mut child = StdCommand::new(assert_cmd::cargo::cargo_bin("walletgen"))
        .args(["--skip-guard", "--output-dir"])
        .arg(dir.path())
        .env("WALLETGEN_PACING_MS", "0")
        .env_remove("WALLETGEN_CONFIG")
        .env_remove("WALLETGEN_OUTPUT_DIR")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn walletgen");

    // stdin stays open so the prompt keeps waiting
    let _stdin = child.stdin.take();
    thread::sleep(Duration::from_millis(1500));
    let status = StdCommand::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("failed to run kill");
    assert!(status.success());

    let output = child.wait_with_output().expect("walletgen did not exit");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(2), "stdout was: {}", stdout);
    assert!(stdout.contains("Operation cancelled by user"), "stdout was: {}", stdout);
    assert!(stdout.contains("Program end"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
