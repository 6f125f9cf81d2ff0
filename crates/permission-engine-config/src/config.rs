// crates/permission-engine-config/src/config.rs
// ============================================================================
// Module: Permission Engine Configuration
// Description: Configuration loading and validation for the permission engine.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: permission-engine-core, permission-engine-store-sqlite, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed; unknown keys are errors.
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use permission_engine_core::AccessLevel;
use permission_engine_core::AccountAddress;
use permission_engine_core::EngineConfig;
use permission_engine_core::EnodeId;
use permission_engine_core::IdentifierError;
use permission_engine_core::NetworkBootstrap;
use permission_engine_core::OrgId;
use permission_engine_core::RetryPolicy;
use permission_engine_core::RoleId;
use permission_engine_core::SubOrgLimits;
use permission_engine_core::runtime::engine::DEFAULT_ACCESS_LEVEL;
use permission_engine_core::runtime::engine::DEFAULT_NETWORK_ADMIN_ORG;
use permission_engine_core::runtime::engine::DEFAULT_NETWORK_ADMIN_ROLE;
use permission_engine_core::runtime::engine::DEFAULT_ORG_ADMIN_ROLE;
use permission_engine_core::runtime::engine::DEFAULT_RETRY_MAX_ATTEMPTS;
use permission_engine_core::runtime::orgs::DEFAULT_SUB_ORG_MAX_BREADTH;
use permission_engine_core::runtime::orgs::DEFAULT_SUB_ORG_MAX_DEPTH;
use permission_engine_store_sqlite::SqliteJournalMode;
use permission_engine_store_sqlite::SqliteLedgerConfig;
use permission_engine_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "permission-engine.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "PERMISSION_ENGINE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of bootstrap admin accounts.
pub(crate) const MAX_ADMIN_ACCOUNTS: usize = 256;
/// Maximum number of bootstrap admin nodes.
pub(crate) const MAX_ADMIN_NODES: usize = 256;
/// Maximum configurable sub-org depth.
pub(crate) const MAX_SUB_ORG_DEPTH: u32 = 16;
/// Maximum configurable sub-org breadth.
pub(crate) const MAX_SUB_ORG_BREADTH: usize = 256;
/// Maximum retry attempts.
pub(crate) const MAX_RETRY_ATTEMPTS: u32 = 10;
/// Maximum single backoff delay in milliseconds.
pub(crate) const MAX_BACKOFF_MS: u64 = 60_000;
/// Default initial backoff in milliseconds.
pub(crate) const DEFAULT_INITIAL_BACKOFF_MS: u64 = 50;
/// Default maximum backoff in milliseconds.
pub(crate) const DEFAULT_MAX_BACKOFF_MS: u64 = 1_000;
/// Default ledger busy timeout in milliseconds.
pub(crate) const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Minimum payload store timeout in milliseconds.
pub(crate) const MIN_PAYLOAD_TIMEOUT_MS: u64 = 100;
/// Maximum payload store timeout in milliseconds.
pub(crate) const MAX_PAYLOAD_TIMEOUT_MS: u64 = 300_000;
/// Default payload store timeout in milliseconds.
pub(crate) const DEFAULT_PAYLOAD_TIMEOUT_MS: u64 = 30_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Permission engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionEngineConfig {
    /// Network identity and bootstrap settings.
    pub network: NetworkConfig,
    /// Ledger backend configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Transport retry configuration.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Audit sink configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Event delivery configuration.
    #[serde(default)]
    pub events: EventsConfig,
    /// Optional encrypted payload store client configuration.
    #[serde(default)]
    pub payload_store: Option<PayloadStoreConfig>,
    /// Path the configuration was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl PermissionEngineConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.source_path = Some(resolved);
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.network.validate()?;
        self.ledger.validate()?;
        self.retry.validate()?;
        self.audit.validate()?;
        self.events.validate()?;
        if let Some(payload_store) = &self.payload_store {
            payload_store.validate()?;
        }
        Ok(())
    }

    /// Builds the engine configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an identifier fails to parse.
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        Ok(EngineConfig {
            network_admin_org: parse_field(
                "network.admin_org",
                &self.network.admin_org,
                OrgId::parse,
            )?,
            network_admin_role: parse_field(
                "network.admin_role",
                &self.network.admin_role,
                RoleId::parse,
            )?,
            org_admin_role: parse_field(
                "network.org_admin_role",
                &self.network.org_admin_role,
                RoleId::parse,
            )?,
            sub_org_limits: SubOrgLimits {
                max_depth: self.network.sub_org_max_depth,
                max_breadth: self.network.sub_org_max_breadth,
            },
            retry: self.retry.policy(),
            default_access: self.network.default_access,
        })
    }

    /// Builds the bootstrap request for the network-admin org.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an address or enode fails to parse.
    pub fn bootstrap_request(&self) -> Result<NetworkBootstrap, ConfigError> {
        let admin_accounts = self
            .network
            .admin_accounts
            .iter()
            .map(|raw| parse_field("network.admin_accounts", raw, AccountAddress::parse))
            .collect::<Result<Vec<_>, _>>()?;
        let admin_nodes = self
            .network
            .admin_nodes
            .iter()
            .map(|raw| parse_field("network.admin_nodes", raw, EnodeId::parse))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NetworkBootstrap {
            admin_accounts,
            admin_nodes,
        })
    }
}

// ============================================================================
// SECTION: Network
// ============================================================================

/// Network identity, limits, and bootstrap members.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// Network-admin org identifier.
    #[serde(default = "default_admin_org")]
    pub admin_org: String,
    /// Reserved admin role of the network-admin org.
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
    /// Admin role created in each approved master org.
    #[serde(default = "default_org_admin_role")]
    pub org_admin_role: String,
    /// Deepest org level that may still take sub-orgs.
    #[serde(default = "default_sub_org_max_depth")]
    pub sub_org_max_depth: u32,
    /// Maximum direct sub-orgs per parent.
    #[serde(default = "default_sub_org_max_breadth")]
    pub sub_org_max_breadth: usize,
    /// Access granted to accounts without an enforceable role.
    #[serde(default = "default_access")]
    pub default_access: AccessLevel,
    /// Bootstrap network admin accounts.
    #[serde(default)]
    pub admin_accounts: Vec<String>,
    /// Bootstrap nodes of the network-admin org.
    #[serde(default)]
    pub admin_nodes: Vec<String>,
}

impl NetworkConfig {
    /// Validates network configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let admin_org = parse_field("network.admin_org", &self.admin_org, OrgId::parse)?;
        if admin_org.is_sub_org() {
            return Err(ConfigError::Invalid(
                "network.admin_org must be a master org (no dots)".to_string(),
            ));
        }
        let admin_role = parse_field("network.admin_role", &self.admin_role, RoleId::parse)?;
        let org_admin_role =
            parse_field("network.org_admin_role", &self.org_admin_role, RoleId::parse)?;
        if admin_role == org_admin_role {
            return Err(ConfigError::Invalid(
                "network.admin_role and network.org_admin_role must differ".to_string(),
            ));
        }
        if self.sub_org_max_depth == 0 || self.sub_org_max_depth > MAX_SUB_ORG_DEPTH {
            return Err(ConfigError::Invalid(format!(
                "network.sub_org_max_depth must be between 1 and {MAX_SUB_ORG_DEPTH}"
            )));
        }
        if self.sub_org_max_breadth == 0 || self.sub_org_max_breadth > MAX_SUB_ORG_BREADTH {
            return Err(ConfigError::Invalid(format!(
                "network.sub_org_max_breadth must be between 1 and {MAX_SUB_ORG_BREADTH}"
            )));
        }
        if self.admin_accounts.is_empty() {
            return Err(ConfigError::Invalid(
                "network.admin_accounts must list at least one account".to_string(),
            ));
        }
        if self.admin_accounts.len() > MAX_ADMIN_ACCOUNTS {
            return Err(ConfigError::Invalid(format!(
                "network.admin_accounts exceeds {MAX_ADMIN_ACCOUNTS} entries"
            )));
        }
        if self.admin_nodes.len() > MAX_ADMIN_NODES {
            return Err(ConfigError::Invalid(format!(
                "network.admin_nodes exceeds {MAX_ADMIN_NODES} entries"
            )));
        }
        let mut accounts = BTreeSet::new();
        for raw in &self.admin_accounts {
            let address = parse_field("network.admin_accounts", raw, AccountAddress::parse)?;
            if !accounts.insert(address) {
                return Err(ConfigError::Invalid(format!(
                    "network.admin_accounts contains duplicate {raw}"
                )));
            }
        }
        let mut nodes = BTreeSet::new();
        for raw in &self.admin_nodes {
            let enode = parse_field("network.admin_nodes", raw, EnodeId::parse)?;
            if !nodes.insert(enode) {
                return Err(ConfigError::Invalid(format!(
                    "network.admin_nodes contains duplicate {raw}"
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Ledger
// ============================================================================

/// Ledger backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Ledger backend type.
    #[serde(rename = "type", default)]
    pub ledger_type: LedgerType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Optional number of snapshots to retain.
    #[serde(default)]
    pub max_versions: Option<u64>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            ledger_type: LedgerType::default(),
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteJournalMode::default(),
            sync_mode: SqliteSyncMode::default(),
            max_versions: None,
        }
    }
}

impl LedgerConfig {
    /// Validates ledger configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.ledger_type {
            LedgerType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid(
                        "memory ledger must not set path".to_string(),
                    ));
                }
                Ok(())
            }
            LedgerType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite ledger requires path".to_string())
                })?;
                validate_path_string("ledger.path", &path.to_string_lossy())?;
                if self.max_versions == Some(0) {
                    return Err(ConfigError::Invalid(
                        "ledger max_versions must be greater than zero".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Returns the `SQLite` ledger configuration for the sqlite backend.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteLedgerConfig> {
        match self.ledger_type {
            LedgerType::Memory => None,
            LedgerType::Sqlite => self.path.as_ref().map(|path| SqliteLedgerConfig {
                path: path.clone(),
                busy_timeout_ms: self.busy_timeout_ms,
                journal_mode: self.journal_mode,
                sync_mode: self.sync_mode,
                max_versions: self.max_versions,
            }),
        }
    }
}

/// Ledger backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LedgerType {
    /// In-memory ledger; state is lost on exit.
    #[default]
    Memory,
    /// `SQLite`-backed durable ledger.
    Sqlite,
}

// ============================================================================
// SECTION: Retry
// ============================================================================

/// Transport retry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay after the first failure, in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Upper bound on any single delay, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl RetryConfig {
    /// Validates retry configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 || self.max_attempts > MAX_RETRY_ATTEMPTS {
            return Err(ConfigError::Invalid(format!(
                "retry.max_attempts must be between 1 and {MAX_RETRY_ATTEMPTS}"
            )));
        }
        if self.max_backoff_ms > MAX_BACKOFF_MS {
            return Err(ConfigError::Invalid(format!(
                "retry.max_backoff_ms must be at most {MAX_BACKOFF_MS}"
            )));
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(ConfigError::Invalid(
                "retry.initial_backoff_ms must not exceed retry.max_backoff_ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the engine retry policy.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Audit sink type.
    #[serde(default)]
    pub sink: AuditSinkType,
    /// Log path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkType::File, Some(path)) => {
                validate_path_string("audit.path", &path.to_string_lossy())
            }
            (AuditSinkType::File, None) => {
                Err(ConfigError::Invalid("file audit sink requires path".to_string()))
            }
            (AuditSinkType::Stderr | AuditSinkType::None, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only allowed with the file sink".to_string(),
            )),
            (AuditSinkType::Stderr | AuditSinkType::None, None) => Ok(()),
        }
    }
}

/// Audit sink type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkType {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Audit disabled.
    None,
}

// ============================================================================
// SECTION: Events
// ============================================================================

/// Event delivery configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventsConfig {
    /// Optional JSON-line event log path.
    #[serde(default)]
    pub log_path: Option<PathBuf>,
}

impl EventsConfig {
    /// Validates event configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.log_path {
            validate_path_string("events.log_path", &path.to_string_lossy())?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Payload Store
// ============================================================================

/// Encrypted payload store client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PayloadStoreConfig {
    /// Base endpoint URL; requests go to `<endpoint>/storeraw`.
    pub endpoint: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_payload_timeout_ms")]
    pub timeout_ms: u64,
}

impl PayloadStoreConfig {
    /// Validates payload store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(self.endpoint.trim()).map_err(|err| {
            ConfigError::Invalid(format!("payload_store.endpoint is not a valid url: {err}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(
                "payload_store.endpoint must use http or https".to_string(),
            ));
        }
        if url.host().is_none() {
            return Err(ConfigError::Invalid("payload_store.endpoint missing host".to_string()));
        }
        if !(MIN_PAYLOAD_TIMEOUT_MS ..= MAX_PAYLOAD_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "payload_store.timeout_ms must be between {MIN_PAYLOAD_TIMEOUT_MS} and \
                 {MAX_PAYLOAD_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default network-admin org.
fn default_admin_org() -> String {
    DEFAULT_NETWORK_ADMIN_ORG.to_string()
}

/// Default network-admin role.
fn default_admin_role() -> String {
    DEFAULT_NETWORK_ADMIN_ROLE.to_string()
}

/// Default org-admin role.
fn default_org_admin_role() -> String {
    DEFAULT_ORG_ADMIN_ROLE.to_string()
}

/// Default sub-org depth limit.
const fn default_sub_org_max_depth() -> u32 {
    DEFAULT_SUB_ORG_MAX_DEPTH
}

/// Default sub-org breadth limit.
const fn default_sub_org_max_breadth() -> usize {
    DEFAULT_SUB_ORG_MAX_BREADTH
}

/// Default access for accounts without an enforceable role.
const fn default_access() -> AccessLevel {
    DEFAULT_ACCESS_LEVEL
}

/// Default ledger busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Default retry attempts.
const fn default_max_attempts() -> u32 {
    DEFAULT_RETRY_MAX_ATTEMPTS
}

/// Default initial backoff.
const fn default_initial_backoff_ms() -> u64 {
    DEFAULT_INITIAL_BACKOFF_MS
}

/// Default maximum backoff.
const fn default_max_backoff_ms() -> u64 {
    DEFAULT_MAX_BACKOFF_MS
}

/// Default payload store timeout.
const fn default_payload_timeout_ms() -> u64 {
    DEFAULT_PAYLOAD_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses an identifier field, naming the field on failure.
fn parse_field<T>(
    field: &str,
    raw: &str,
    parse: fn(&str) -> Result<T, IdentifierError>,
) -> Result<T, ConfigError> {
    parse(raw).map_err(|err| ConfigError::Invalid(format!("{field}: {err}")))
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}
