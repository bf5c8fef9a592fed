//! Integration tests for CLI commands.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

const P256_PRIVATE: &[u8] = include_bytes!("../../../testdata/keys/p256_private.pem");
const P256_PUBLIC: &[u8] = include_bytes!("../../../testdata/keys/p256_public.pem");
const ROGUE_PRIVATE: &[u8] = include_bytes!("../../../testdata/keys/rogue_p256_private.pem");

fn sign_with(private_pem: &[u8], claims: &serde_json::Value) -> String {
    let key = EncodingKey::from_ec_pem(private_pem).unwrap();
    encode(&Header::new(Algorithm::ES256), claims, &key).unwrap()
}

fn ticket(qrmark: u64, points: i64) -> String {
    sign_with(
        P256_PRIVATE,
        &serde_json::json!({"sub": qrmark, "num": 7, "point": points}),
    )
}

/// Writes a key, a config with a journal and one school into a temp dir.
fn setup() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("key.pem"), P256_PUBLIC).unwrap();
    let config = temp_dir.path().join("qrmark.toml");
    std::fs::write(
        &config,
        r#"
key_path = "key.pem"
journal_path = "redemptions.qrj"
page_size = 2

[[schools]]
id = 1
members = [42, 99]
"#,
    )
    .unwrap();
    (temp_dir, config)
}

fn run_cli(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_qrmark"))
        .args(args)
        .env_remove("QRMARK_KEY_PATH")
        .env_remove("QRMARK_JOURNAL_PATH")
        .env_remove("QRMARK_LOCK_TIMEOUT_MS")
        .env("RUST_LOG", "off")
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute CLI");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    (output.status.code().unwrap_or(-1), stdout, stderr)
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_redeem_then_already_redeemed() {
    let (_temp_dir, config) = setup();
    let config = path_str(&config);
    let ticket = ticket(5, 10);

    let (code, stdout, _) = run_cli(&["redeem", "--config", config, "--user", "42", &ticket]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("committed qrmark=5 user=42 group=7 points=10"));

    let (code, stdout, _) = run_cli(&["redeem", "--config", config, "--user", "42", &ticket]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("already_redeemed"));

    let (code, stdout, _) = run_cli(&["redeem", "--config", config, "--user", "99", &ticket]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("committed"));

    let (_, stdout, _) = run_cli(&["total", "user", "--config", config, "42"]);
    assert_eq!(stdout.trim(), "10");
    let (_, stdout, _) = run_cli(&["total", "school", "--config", config, "1"]);
    assert_eq!(stdout.trim(), "20");
    let (_, stdout, _) = run_cli(&["total", "user", "--config", config, "7"]);
    assert_eq!(stdout.trim(), "0");
}

#[test]
fn test_redeem_json_output() {
    let (_temp_dir, config) = setup();
    let (code, stdout, _) = run_cli(&[
        "redeem",
        "--config",
        path_str(&config),
        "--user",
        "42",
        "--json",
        &ticket(3, 4),
    ]);
    assert_eq!(code, 0);

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["outcome"], "committed");
    assert_eq!(parsed["record"]["qrmark_id"], 3);
    assert_eq!(parsed["record"]["points"], 4);
}

#[test]
fn test_redeem_reads_ticket_from_stdin() {
    let (_temp_dir, config) = setup();
    let mut child = Command::new(env!("CARGO_BIN_EXE_qrmark"))
        .args(["redeem", "--config", path_str(&config), "--user", "42", "-"])
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(format!("{}\n", ticket(8, 1)).as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout).unwrap().starts_with("committed"));
}

#[test]
fn test_forged_ticket_rejected_with_reason() {
    let (_temp_dir, config) = setup();
    let forged = sign_with(
        ROGUE_PRIVATE,
        &serde_json::json!({"sub": 5, "num": 7, "point": 10}),
    );

    let (code, stdout, stderr) =
        run_cli(&["redeem", "--config", path_str(&config), "--user", "42", &forged]);
    assert_eq!(code, 1);
    assert!(stdout.is_empty());
    assert!(stderr.contains("ticket_signature_invalid"));

    let (_, stdout, _) = run_cli(&["total", "user", "--config", path_str(&config), "42"]);
    assert_eq!(stdout.trim(), "0");
}

#[test]
fn test_negative_points_rejected() {
    let (_temp_dir, config) = setup();
    let (code, _, stderr) = run_cli(&[
        "redeem",
        "--config",
        path_str(&config),
        "--user",
        "42",
        &ticket(5, -1),
    ]);
    assert_eq!(code, 1);
    assert!(stderr.contains("claim_invalid_value"));
}

#[test]
fn test_verify_command() {
    let (temp_dir, _config) = setup();
    let key = temp_dir.path().join("key.pem");

    let (code, stdout, stderr) = run_cli(&["verify", "--key", path_str(&key), &ticket(5, 10)]);
    assert_eq!(code, 0);
    assert!(stderr.contains("key fingerprint"));

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["claims"]["sub"], 5);
    assert_eq!(parsed["redemption"]["qrmark_id"], 5);
    assert_eq!(parsed["redemption"]["points"], 10);
}

#[test]
fn test_verify_missing_key() {
    let (temp_dir, _config) = setup();
    let missing = temp_dir.path().join("nope.pem");
    let (code, _, stderr) = run_cli(&["verify", "--key", path_str(&missing), &ticket(5, 10)]);
    assert_eq!(code, 1);
    assert!(stderr.contains("key_unavailable"));
}

#[test]
fn test_list_pages() {
    let (_temp_dir, config) = setup();
    let config = path_str(&config);
    for qrmark in 1..=3 {
        let (code, _, _) =
            run_cli(&["redeem", "--config", config, "--user", "42", &ticket(qrmark, 1)]);
        assert_eq!(code, 0);
    }

    let (code, stdout, _) = run_cli(&["list", "--config", config, "--user", "42", "--json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["page"], 1);
    assert_eq!(parsed["has_next"], true);
    assert_eq!(parsed["records"][0]["qrmark_id"], 3);

    let (code, stdout, _) = run_cli(&["list", "--config", config, "--page", "2"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("COMMITTED_AT"));
    assert!(!stdout.contains("(more"));

    let (code, _, stderr) = run_cli(&["list", "--config", config, "--page", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("invalid_page"));
}

#[test]
fn test_audit_command() {
    let (temp_dir, config) = setup();
    let (code, _, _) = run_cli(&[
        "redeem",
        "--config",
        path_str(&config),
        "--user",
        "42",
        &ticket(5, 10),
    ]);
    assert_eq!(code, 0);

    let journal = temp_dir.path().join("redemptions.qrj");
    let (code, stdout, _) = run_cli(&["audit", path_str(&journal), "--json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["records"], 1);
    assert_eq!(parsed["total_points"], 10);
    assert!(parsed["duplicates"].as_array().unwrap().is_empty());
}

#[test]
fn test_bad_config_reported() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("bad.toml");
    std::fs::write(&config, "key_path = \"k.pem\"\npage_size = 0\n").unwrap();

    let (code, _, stderr) = run_cli(&["total", "user", "--config", path_str(&config), "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("page_size"));
}
