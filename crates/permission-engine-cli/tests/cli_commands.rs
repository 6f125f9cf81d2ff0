// crates/permission-engine-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: End-to-end tests driving the permission-engine binary.
// Purpose: Ensure actions persist across invocations and failures exit non-zero.
// Dependencies: permission-engine-cli binary, tempfile
// ============================================================================

//! ## Overview
//! Each test writes a config into a temp directory and runs the binary once
//! per command, so every step reopens the `SQLite` ledger from disk.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const ADMIN: &str = "0x0000000000000000000000000000000000000001";
const ORG_ADMIN: &str = "0x000000000000000000000000000000000000001e";
const ADMIN_NODE: &str = "enode://admin@127.0.0.1:30303";
const ORG_NODE: &str = "enode://org2@127.0.0.1:30304";

fn permission_engine_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_permission-engine"))
}

fn write_sqlite_config(dir: &Path) -> PathBuf {
    let config_path = dir.join("permission-engine.toml");
    let ledger_path = dir.join("ledger.db");
    let events_path = dir.join("events.jsonl");
    let config = format!(
        r#"
[network]
admin_accounts = ["{ADMIN}"]
admin_nodes = ["{ADMIN_NODE}"]

[ledger]
type = "sqlite"
path = "{}"
sync_mode = "normal"

[audit]
sink = "none"

[events]
log_path = "{}"
"#,
        ledger_path.display(),
        events_path.display()
    );
    fs::write(&config_path, config).expect("write config");
    config_path
}

fn write_memory_config(dir: &Path) -> PathBuf {
    let config_path = dir.join("memory.toml");
    let config = format!("[network]\nadmin_accounts = [\"{ADMIN}\"]\n\n[audit]\nsink = \"none\"\n");
    fs::write(&config_path, config).expect("write config");
    config_path
}

fn run(config: &Path, args: &[&str]) -> Output {
    let mut full = vec!["--config", config.to_str().expect("utf-8 path")];
    full.extend_from_slice(args);
    Command::new(permission_engine_bin())
        .args(&full)
        .env_remove("PERMISSION_ENGINE_LANG")
        .output()
        .expect("run permission-engine")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn run_ok(config: &Path, args: &[&str]) -> String {
    let output = run(config, args);
    assert!(output.status.success(), "{args:?} failed: {}", stderr(&output));
    stdout(&output)
}

fn run_err(config: &Path, args: &[&str]) -> String {
    let output = run(config, args);
    assert!(!output.status.success(), "{args:?} unexpectedly succeeded");
    stderr(&output)
}

fn booted(config: &Path) {
    assert!(run_ok(config, &["network", "init"]).contains(r#""outcome":"committed""#));
    assert!(run_ok(config, &["network", "boot", "--as", ADMIN]).contains(r#""outcome":"committed""#));
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

#[test]
fn config_init_writes_a_valid_template_once() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("generated.toml");
    let target_arg = target.to_str().unwrap();
    let output = Command::new(permission_engine_bin())
        .args(["config", "init", "--output", target_arg])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Example config written"));

    let again =
        Command::new(permission_engine_bin()).args(["config", "init", "--output", target_arg]).output().unwrap();
    assert!(!again.status.success());
    assert!(stderr(&again).contains("--force"));

    let validated = run_ok(&target, &["config", "validate"]);
    assert!(validated.contains("Config validated successfully."));
}

#[test]
fn config_validate_reports_invalid_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[network]\nadmin_accounts = []\n").unwrap();
    let message = run_err(&config, &["config", "validate"]);
    assert!(message.contains("Failed to load config"), "{message}");
    assert!(message.contains("admin_accounts"), "{message}");
}

#[test]
fn version_flag_prints_package_version() {
    let output = Command::new(permission_engine_bin()).arg("--version").output().unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("permission-engine "));
}

// ============================================================================
// SECTION: Network and Orgs
// ============================================================================

#[test]
fn network_boot_persists_across_invocations() {
    let dir = TempDir::new().unwrap();
    let config = write_sqlite_config(dir.path());
    let before = run_ok(&config, &["network", "status"]);
    assert!(before.contains(r#""booted":false"#), "{before}");

    booted(&config);
    let after = run_ok(&config, &["network", "status"]);
    assert!(after.contains(r#""booted":true"#), "{after}");
    assert!(after.contains(r#""version":2"#), "{after}");
}

#[test]
fn master_org_vote_flow() {
    let dir = TempDir::new().unwrap();
    let config = write_sqlite_config(dir.path());
    booted(&config);

    let proposed = run_ok(&config, &[
        "org", "add", "--as", ADMIN, "--org", "ORG2", "--enode", ORG_NODE, "--admin", ORG_ADMIN,
    ]);
    assert!(proposed.contains(r#""outcome":"pending""#), "{proposed}");

    let pending = run_ok(&config, &["pending", "show", "--auth-org", "ADMINORG"]);
    assert!(pending.contains(r#""op_type":"add_org""#), "{pending}");
    assert!(pending.contains(r#""number_of_valid_voters":1"#), "{pending}");

    let approved = run_ok(&config, &["org", "approve", "--as", ADMIN, "--org", "ORG2"]);
    assert!(approved.contains(r#""outcome":"committed""#), "{approved}");

    let check = run_ok(&config, &["org", "check", "--org", "ORG2", "--status", "approved"]);
    assert_eq!(check.trim(), r#"{"result":true}"#);

    let account = run_ok(&config, &["account", "show", "--account", ORG_ADMIN]);
    assert!(account.contains(r#""org_admin":true"#), "{account}");
    assert!(account.contains(r#""network_admin":false"#), "{account}");
    assert!(account.contains(r#""access":"full_access""#), "{account}");
    assert!(account.contains(r#""admin_account":true"#), "{account}");

    let node = run_ok(&config, &["node", "show", "--enode", ORG_NODE]);
    assert!(node.contains(r#""status":"active""#), "{node}");
    assert!(node.contains(r#""connection_allowed":true"#), "{node}");

    let events = fs::read_to_string(dir.path().join("events.jsonl")).unwrap();
    assert!(events.contains(r#""event":"org_approved""#), "{events}");
    assert!(events.lines().all(|line| line.contains(r#""seq":"#)));
}

#[test]
fn vote_and_cancel_commands_target_the_open_item() {
    let dir = TempDir::new().unwrap();
    let config = write_sqlite_config(dir.path());
    booted(&config);
    run_ok(&config, &[
        "org", "add", "--as", ADMIN, "--org", "ORG2", "--enode", ORG_NODE, "--admin", ORG_ADMIN,
    ]);

    let mismatch = run_err(&config, &[
        "vote", "--as", ADMIN, "--auth-org", "ADMINORG", "--op", "add-org", "--target-kind", "org",
        "--target", "ORG9",
    ]);
    assert!(mismatch.contains("Permission action failed"), "{mismatch}");

    let cancelled = run_ok(&config, &[
        "cancel", "--as", ADMIN, "--auth-org", "ADMINORG", "--target-kind", "org", "--target", "ORG2",
    ]);
    assert!(cancelled.contains(r#""outcome":"cancelled""#), "{cancelled}");
    let pending = run_ok(&config, &["pending", "show", "--auth-org", "ADMINORG"]);
    assert!(pending.contains(r#""pending":null"#), "{pending}");
}

#[test]
fn unauthorized_caller_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    let config = write_sqlite_config(dir.path());
    booted(&config);
    let message = run_err(&config, &[
        "org",
        "add",
        "--as",
        "0x00000000000000000000000000000000000000ff",
        "--org",
        "ORG2",
        "--enode",
        ORG_NODE,
        "--admin",
        ORG_ADMIN,
    ]);
    assert!(message.contains("unauthorized"), "{message}");
}

#[test]
fn invalid_identifiers_are_rejected_before_the_engine() {
    let dir = TempDir::new().unwrap();
    let config = write_sqlite_config(dir.path());
    let message = run_err(&config, &["network", "boot", "--as", "0x12"]);
    assert!(message.contains("Invalid argument"), "{message}");
    let message = run_err(&config, &["org", "show", "--org", "ORG..X"]);
    assert!(message.contains("Invalid argument"), "{message}");
}

// ============================================================================
// SECTION: Roles
// ============================================================================

#[test]
fn role_commands_round_trip() {
    let dir = TempDir::new().unwrap();
    let config = write_sqlite_config(dir.path());
    booted(&config);
    let added = run_ok(&config, &[
        "role", "add", "--as", ADMIN, "--org", "ADMINORG", "--role", "AUDITOR", "--access",
        "read-only", "--voter",
    ]);
    assert!(added.contains(r#""outcome":"committed""#), "{added}");

    let shown = run_ok(&config, &["role", "show", "--org", "ADMINORG", "--role", "AUDITOR"]);
    assert!(shown.contains(r#""is_voter":true"#), "{shown}");
    assert!(shown.contains(r#""is_full_access":false"#), "{shown}");

    run_ok(&config, &["role", "remove", "--as", ADMIN, "--org", "ADMINORG", "--role", "AUDITOR"]);
    let shown = run_ok(&config, &["role", "show", "--org", "ADMINORG", "--role", "AUDITOR"]);
    assert!(shown.contains(r#""is_voter":false"#), "{shown}");
}

// ============================================================================
// SECTION: Ledger Commands
// ============================================================================

#[test]
fn ledger_commands_inspect_sqlite_history() {
    let dir = TempDir::new().unwrap();
    let config = write_sqlite_config(dir.path());
    booted(&config);

    let versions = run_ok(&config, &["ledger", "versions"]);
    assert!(versions.contains(r#""version":2"#), "{versions}");
    let mutations = run_ok(&config, &["ledger", "mutations", "--since", "1"]);
    assert!(mutations.contains("mark_network_booted"), "{mutations}");
    let verify = run_ok(&config, &["ledger", "verify"]);
    assert!(verify.contains(r#""head_version":2"#), "{verify}");
    assert!(verify.contains(r#""status":"ok""#), "{verify}");
    let pruned = run_ok(&config, &["ledger", "prune", "--keep", "1"]);
    assert!(pruned.contains(r#""pruned":1"#), "{pruned}");
}

#[test]
fn ledger_commands_require_sqlite() {
    let dir = TempDir::new().unwrap();
    let config = write_memory_config(dir.path());
    let message = run_err(&config, &["ledger", "versions"]);
    assert!(message.contains("sqlite"), "{message}");
}

#[test]
fn memory_ledger_actions_warn_on_stderr() {
    let dir = TempDir::new().unwrap();
    let config = write_memory_config(dir.path());
    let output = run(&config, &["network", "init"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("in-memory"));
    assert!(stdout(&output).contains(r#""outcome":"committed""#));
}

// ============================================================================
// SECTION: Payload Commands
// ============================================================================

#[test]
fn payload_store_requires_configuration() {
    let dir = TempDir::new().unwrap();
    let config = write_memory_config(dir.path());
    let input = dir.path().join("payload.bin");
    fs::write(&input, b"secret").unwrap();
    let message = run_err(&config, &["payload", "store-raw", "--input", input.to_str().unwrap()]);
    assert!(message.contains("[payload_store]"), "{message}");
}

#[test]
fn catalan_locale_prints_disclaimer() {
    let dir = TempDir::new().unwrap();
    let config = write_memory_config(dir.path());
    let output = run(&config, &["--lang", "ca", "config", "validate"]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("traduïda automàticament"));
    assert!(stdout(&output).contains("Configuració validada"));
}
