// crates/permission-engine-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Template written by `config init` and checked by tests.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The example is static text. It must stay loadable by
//! [`crate::PermissionEngineConfig::from_toml_str`].

/// Returns a canonical example `permission-engine.toml` configuration.
#[must_use]
pub fn example_config_toml() -> String {
    String::from(
        r#"[network]
admin_org = "ADMINORG"
admin_role = "ADMIN"
org_admin_role = "ORGADMIN"
sub_org_max_depth = 4
sub_org_max_breadth = 4
default_access = "read_only"
admin_accounts = ["0xed9d02e382b34818e88b88a309c7fe71e65f419d"]
admin_nodes = [
    "enode://ac6b1096ca56b9f6d004b779ae3728bf83f8e22453404cc3cef16a3d9b96608bc67c4b30db88e0a5a6c6390213f7acbe1153ff6d23ce57380104288ae19373ef@127.0.0.1:21000?discport=0&raftport=50401",
]

[ledger]
type = "sqlite"
path = "permission-engine.db"
journal_mode = "wal"
sync_mode = "full"
busy_timeout_ms = 5000
max_versions = 1000

[retry]
max_attempts = 3
initial_backoff_ms = 50
max_backoff_ms = 1000

[audit]
sink = "stderr"

[events]
# log_path = "permission-events.jsonl"

# [payload_store]
# endpoint = "http://127.0.0.1:9080"
# timeout_ms = 30000
"#,
    )
}
