// End-to-end tests for the pi-cloud-init binary
//
// Every run passes --non-interactive and a null stdin so nothing can block
// on a prompt.

use std::path::Path;
use std::process::{Command, Output, Stdio};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pi-cloud-init"))
        .arg("--non-interactive")
        .args(args)
        .env_remove("TAILSCALE_AUTHKEY")
        .stdin(Stdio::null())
        .output()
        .expect("Failed to run pi-cloud-init")
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_dry_run_prints_both_documents() {
    let output = run(&["--dry-run", "-H", "nodeA", "-T", "UTC", "-U", "pi"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let (user_data, network) = stdout
        .strip_prefix("=== user-data\n")
        .and_then(|rest| rest.split_once("=== network-config\n"))
        .expect("Both delimiters present");

    assert!(user_data.starts_with("#cloud-config\n"));
    assert!(user_data.contains("hostname: \"nodeA\"\n"));
    assert!(user_data.contains("timezone: \"UTC\"\n"));
    assert!(network.starts_with("network:\n  version: 2\n"));
    assert!(!network.contains("addresses"));
}

#[test]
fn test_writes_files_into_directory() {
    let dir = tempfile::tempdir().unwrap();
    let dir_arg = dir.path().to_str().unwrap();
    let output = run(&["--file", dir_arg, "--hostname", "nodeA", "--user", "pi"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());

    assert_eq!(file_names(dir.path()), vec!["network-config", "user-data"]);
    let user_data = std::fs::read_to_string(dir.path().join("user-data")).unwrap();
    assert!(user_data.ends_with("disable_root: true\n"));
    assert!(!user_data.ends_with("\n\n"));
}

#[test]
fn test_tailscale_key_from_environment() {
    let output = Command::new(env!("CARGO_BIN_EXE_pi-cloud-init"))
        .args(["--non-interactive", "--dry-run", "-H", "nodeA", "-U", "pi"])
        .env("TAILSCALE_AUTHKEY", "tskey-auth-env")
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("--auth-key=tskey-auth-env"));
    assert!(!stdout.contains("--advertise-exit-node"));
}

#[test]
#[cfg(unix)]
fn test_non_utf8_environment_is_ignored() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let output = Command::new(env!("CARGO_BIN_EXE_pi-cloud-init"))
        .args(["--non-interactive", "--dry-run", "-H", "nodeA", "-U", "pi"])
        .env("GARBLED_VALUE", OsStr::from_bytes(b"\xff\xfe"))
        .env_remove("TAILSCALE_AUTHKEY")
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("hostname: \"nodeA\""));
}

#[test]
fn test_unreadable_key_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let dir_arg = dir.path().to_str().unwrap();
    let output = run(&[
        "--file",
        dir_arg,
        "--hostname",
        "nodeA",
        "--user",
        "pi",
        "--ssh-key",
        "/no/such/key.pub",
    ]);

    assert!(!output.status.success());
    assert!(file_names(dir.path()).is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("/no/such/key.pub"), "stderr: {stderr}");
}

#[test]
fn test_missing_hostname_names_field() {
    let output = run(&["--dry-run", "--user", "pi"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("'hostname'"), "stderr: {stderr}");
}

#[test]
fn test_invalid_address_is_rejected() {
    let output = run(&[
        "--dry-run",
        "-H",
        "nodeA",
        "-U",
        "pi",
        "--static",
        "--ethernet-ip",
        "300.1.1.1/24",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("'ethernet_ip'"), "stderr: {stderr}");
}
