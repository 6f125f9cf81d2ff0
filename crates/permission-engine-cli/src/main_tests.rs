// crates/permission-engine-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and engine assembly helpers.
// Purpose: Ensure CLI inputs fail closed and configs build working engines.
// Dependencies: permission-engine-cli main helpers, tempfile
// ============================================================================

//! ## Overview
//! Validates bounded reads, locale resolution, target parsing, and the
//! engine, sink, and session builders behind every engine-backed command.
//!
//! Security posture: CLI inputs are untrusted; size limits must fail closed.

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

use permission_engine_cli::i18n::Locale;
use permission_engine_config::PermissionEngineConfig;
use permission_engine_core::AccessLevel;
use permission_engine_core::AccountAddress;
use permission_engine_core::ActionOutcome;
use permission_engine_core::AuthContext;
use permission_engine_core::NodeStatusAction;
use permission_engine_core::OrgStatus;
use permission_engine_core::PendingOpType;
use permission_engine_core::TargetKey;
use tempfile::TempDir;

use super::AccessArg;
use super::LangArg;
use super::NodeActionArg;
use super::OpArg;
use super::OrgStatusArg;
use super::ReadLimitError;
use super::Session;
use super::TargetKindArg;
use super::build_engine;
use super::canonical_output_bytes;
use super::parse_target;
use super::read_bytes_with_limit;
use super::resolve_locale;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const ADMIN: &str = "0x0000000000000000000000000000000000000001";

fn memory_config(extra: &str) -> PermissionEngineConfig {
    let content = format!(
        "[network]\nadmin_accounts = [\"{ADMIN}\"]\nadmin_nodes = [\"enode://admin@127.0.0.1:30303\"]\n\n[audit]\nsink = \"none\"\n{extra}"
    );
    PermissionEngineConfig::from_toml_str(&content).expect("config")
}

fn admin() -> AuthContext {
    AuthContext::new(AccountAddress::parse(ADMIN).expect("admin address"))
}

fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).expect("write file");
    path
}

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

#[test]
fn read_bytes_with_limit_accepts_within_limit() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "ok.bin", b"hello");
    let bytes = read_bytes_with_limit(&path, 5).expect("read within limit");
    assert_eq!(bytes, b"hello");
}

#[test]
fn read_bytes_with_limit_rejects_oversized_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "big.bin", b"toolarge");
    match read_bytes_with_limit(&path, 4) {
        Err(ReadLimitError::TooLarge {
            size,
            limit,
        }) => {
            assert_eq!(size, 8);
            assert_eq!(limit, 4);
        }
        other => panic!("expected TooLarge, got {other:?}"),
    }
}

#[test]
fn read_bytes_with_limit_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = read_bytes_with_limit(&dir.path().join("missing.bin"), 4);
    assert!(matches!(result, Err(ReadLimitError::Io(_))));
}

// ============================================================================
// SECTION: Locale Resolution
// ============================================================================

#[test]
fn resolve_locale_prefers_flag_over_env() {
    let locale = resolve_locale(Some(LangArg::Ca), Some("en")).expect("flag locale");
    assert_eq!(locale, Locale::Ca);
}

#[test]
fn resolve_locale_reads_env_with_region_tag() {
    let locale = resolve_locale(None, Some("ca_ES.UTF-8")).expect("env locale");
    assert_eq!(locale, Locale::Ca);
    assert_eq!(resolve_locale(None, None).expect("default"), Locale::En);
}

#[test]
fn resolve_locale_rejects_unknown_env_value() {
    let err = resolve_locale(None, Some("fr")).expect_err("unsupported locale");
    assert!(err.message.contains("PERMISSION_ENGINE_LANG"), "{}", err.message);
}

// ============================================================================
// SECTION: Argument Parsing
// ============================================================================

#[test]
fn parse_target_builds_each_kind() {
    let org = parse_target(TargetKindArg::Org, "ORG1.SUB").expect("org target");
    assert!(matches!(org, TargetKey::Org(id) if id.as_str() == "ORG1.SUB"));
    let node = parse_target(TargetKindArg::Node, "enode://n1@127.0.0.1:30303").expect("node");
    assert!(matches!(node, TargetKey::Node(id) if id.as_str() == "enode://n1@127.0.0.1:30303"));
    let account = parse_target(TargetKindArg::Account, ADMIN).expect("account target");
    assert!(matches!(account, TargetKey::Account(_)));
}

#[test]
fn parse_target_rejects_invalid_identifiers() {
    let err = parse_target(TargetKindArg::Account, "0xnothex").expect_err("bad address");
    assert!(err.message.starts_with("Invalid argument"), "{}", err.message);
    assert!(parse_target(TargetKindArg::Org, "ORG..SUB").is_err());
    assert!(parse_target(TargetKindArg::Node, "enode://has space").is_err());
}

#[test]
fn value_enums_map_to_engine_types() {
    assert_eq!(PendingOpType::from(OpArg::AddSubOrg), PendingOpType::AddSubOrg);
    assert_eq!(PendingOpType::from(OpArg::AssignOrgAdmin), PendingOpType::AssignOrgAdmin);
    assert_eq!(AccessLevel::from(AccessArg::ContractDeploy), AccessLevel::ContractDeploy);
    assert_eq!(OrgStatus::from(OrgStatusArg::SuspensionRevoked), OrgStatus::SuspensionRevoked);
    assert_eq!(NodeStatusAction::from(NodeActionArg::Blacklist), NodeStatusAction::Blacklist);
    assert_eq!(Locale::from(LangArg::En), Locale::En);
}

// ============================================================================
// SECTION: Output
// ============================================================================

#[test]
fn canonical_output_sorts_keys_and_appends_newline() {
    let outcome = ActionOutcome::Committed {
        version: 3,
    };
    let bytes = canonical_output_bytes(&outcome).expect("render");
    assert_eq!(bytes, b"{\"outcome\":\"committed\",\"version\":3}\n");
}

// ============================================================================
// SECTION: Engine Assembly
// ============================================================================

#[test]
fn build_engine_over_memory_ledger_bootstraps() {
    let config = memory_config("");
    let engine = build_engine(&config).expect("engine");
    let request = config.bootstrap_request().expect("bootstrap request");
    let outcome = engine.bootstrap(&request).expect("bootstrap");
    assert_eq!(outcome, ActionOutcome::Committed {
        version: 1
    });
    let booted = engine.complete_network_boot(&admin()).expect("boot");
    assert_eq!(booted, ActionOutcome::Committed {
        version: 2
    });
    assert!(engine.network_boot_status().expect("status"));
}

#[test]
fn build_engine_writes_events_to_configured_log() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("events.jsonl");
    let extra = format!("\n[events]\nlog_path = \"{}\"\n", log_path.display());
    let config = memory_config(&extra);
    let engine = build_engine(&config).expect("engine");
    engine.bootstrap(&config.bootstrap_request().expect("request")).expect("bootstrap");
    engine.complete_network_boot(&admin()).expect("boot");

    let log = fs::read_to_string(&log_path).expect("event log");
    assert!(log.lines().count() >= 2, "{log}");
    assert!(log.lines().next().expect("first line").contains("\"seq\":1"), "{log}");
    assert!(log.contains("\"event\":\"network_boot_completed\""), "{log}");
}

#[test]
fn build_engine_writes_audit_records_to_file() {
    let dir = TempDir::new().unwrap();
    let audit_path = dir.path().join("audit.jsonl");
    let content = format!(
        "[network]\nadmin_accounts = [\"{ADMIN}\"]\n\n[audit]\nsink = \"file\"\npath = \"{}\"\n",
        audit_path.display()
    );
    let config = PermissionEngineConfig::from_toml_str(&content).expect("config");
    let engine = build_engine(&config).expect("engine");
    engine.bootstrap(&config.bootstrap_request().expect("request")).expect("bootstrap");

    let audit = fs::read_to_string(&audit_path).expect("audit log");
    assert!(!audit.trim().is_empty());
}

#[test]
fn session_open_loads_config_from_disk() {
    let dir = TempDir::new().unwrap();
    let ledger_path = dir.path().join("ledger.db");
    let config_path = write_file(
        dir.path(),
        "permission-engine.toml",
        format!(
            "[network]\nadmin_accounts = [\"{ADMIN}\"]\n\n[ledger]\ntype = \"sqlite\"\npath = \"{}\"\n\n[audit]\nsink = \"none\"\n",
            ledger_path.display()
        )
        .as_bytes(),
    );

    let session = Session::open(Some(&config_path)).expect("session");
    session
        .engine
        .bootstrap(&session.config.bootstrap_request().expect("request"))
        .expect("bootstrap");
    drop(session);

    let reopened = Session::open(Some(&config_path)).expect("reopen");
    assert_eq!(reopened.engine.snapshot().expect("snapshot").version, 1);
    assert!(reopened.engine.is_network_admin(&admin().caller).expect("admin check"));
}

#[test]
fn session_open_reports_missing_config() {
    let dir = TempDir::new().unwrap();
    let result = Session::open(Some(&dir.path().join("absent.toml")));
    let Err(err) = result else {
        panic!("expected missing config to fail");
    };
    assert!(err.message.starts_with("Failed to load config"), "{}", err.message);
}
