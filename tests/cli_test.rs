use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn accounts_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "owner, address, secret, balance").unwrap();
    writeln!(file, "alice, master, mk, 10000").unwrap();
    writeln!(file, "alice, w1, k1, 0").unwrap();
    writeln!(file, "alice, w2, k2, 0").unwrap();
    writeln!(file, "alice, w3, , 0").unwrap();
    writeln!(file, "bob, b1, kb, 1000").unwrap();
    file
}

fn lenient_config() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"{{"scheduler": {{"rate_limit_ms": 1}}, "fees": {{"transaction_fee": 50, "fan_in_reserve": 200, "fan_out_min_distributable": 0}}}}"#
    )
    .unwrap();
    file
}

#[test]
fn test_cli_fan_out() {
    let accounts = accounts_file();
    let config = lenient_config();

    let mut cmd = Command::new(cargo_bin!("fanflow"));
    cmd.arg("--accounts")
        .arg(accounts.path())
        .arg("--config")
        .arg(config.path())
        .args(["fan-out", "--owner", "alice", "--source", "master", "--secret", "mk"])
        .args(["--fraction", "0.5"]);

    // floor(10000 * 0.5) - 50 = 4950 over 3 recipients
    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["total_requested"], 3);
    assert_eq!(report["succeeded_count"], 3);
    assert_eq!(report["failed_count"], 0);

    let mut recipients: Vec<(String, u64)> = report["transfers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| {
            (
                t["account"].as_str().unwrap().to_string(),
                t["amount"].as_u64().unwrap(),
            )
        })
        .collect();
    recipients.sort();
    assert_eq!(
        recipients,
        vec![
            ("w1".to_string(), 1650),
            ("w2".to_string(), 1650),
            ("w3".to_string(), 1650)
        ]
    );
}

#[test]
fn test_cli_fan_in_sweeps_into_recipient() {
    let accounts = accounts_file();
    let config = lenient_config();

    let mut cmd = Command::new(cargo_bin!("fanflow"));
    cmd.arg("--accounts")
        .arg(accounts.path())
        .arg("--config")
        .arg(config.path())
        .args(["fan-in", "--owner", "bob", "--recipient", "vault"])
        .args(["--fraction", "0.5"]);

    // (1000 - 200 - 50) * 0.5
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"succeeded_count\": 1"))
        .stdout(predicate::str::contains("\"amount\": 375"));
}

#[test]
fn test_cli_balance() {
    let accounts = accounts_file();

    let mut cmd = Command::new(cargo_bin!("fanflow"));
    cmd.arg("--accounts")
        .arg(accounts.path())
        .arg("--rate-limit-ms")
        .arg("0")
        .args(["balance", "--owner", "alice"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"total\": 10000"));
}

#[test]
fn test_cli_transfer_prints_receipt() {
    let accounts = accounts_file();

    let mut cmd = Command::new(cargo_bin!("fanflow"));
    cmd.arg("--accounts").arg(accounts.path()).args([
        "transfer",
        "--owner",
        "bob",
        "--sender",
        "b1",
        "--secret",
        "kb",
        "--recipient",
        "alice-w1",
        "--amount",
        "100",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"receipt\": \"sim-00000001\""));
}

#[test]
fn test_cli_rejects_bad_fraction_without_output() {
    let accounts = accounts_file();

    let mut cmd = Command::new(cargo_bin!("fanflow"));
    cmd.arg("--accounts")
        .arg(accounts.path())
        .args(["fan-out", "--owner", "alice", "--source", "master", "--secret", "mk"])
        .args(["--fraction", "1.5"]);

    cmd.assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Target fraction"));
}

#[test]
fn test_cli_rejects_zero_batch_size() {
    let accounts = accounts_file();

    let mut cmd = Command::new(cargo_bin!("fanflow"));
    cmd.arg("--accounts")
        .arg(accounts.path())
        .arg("--batch-size")
        .arg("0")
        .args(["balance", "--owner", "alice"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("batch_size"));
}

#[test]
fn test_cli_skips_malformed_account_rows() {
    let mut accounts = NamedTempFile::new().unwrap();
    writeln!(accounts, "owner, address, secret, balance").unwrap();
    writeln!(accounts, "alice, a1, k1, 700").unwrap();
    writeln!(accounts, "alice, a2, k2, plenty").unwrap();
    writeln!(accounts, "alice, a3, k3, 300").unwrap();

    let mut cmd = Command::new(cargo_bin!("fanflow"));
    cmd.arg("--accounts")
        .arg(accounts.path())
        .arg("--rate-limit-ms")
        .arg("0")
        .args(["balance", "--owner", "alice"]);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Skipping unreadable account record"))
        .stdout(predicate::str::contains("\"total\": 1000"));
}
