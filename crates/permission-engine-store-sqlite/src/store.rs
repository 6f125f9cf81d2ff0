// crates/permission-engine-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Ledger
// Description: Durable Ledger backed by SQLite WAL.
// Purpose: Persist permission state snapshots with deterministic serialization.
// Dependencies: permission-engine-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`Ledger`] using `SQLite`. Each applied
//! mutation produces a canonical JSON snapshot stored in a versioned table,
//! and the mutation itself is appended to a log that is never pruned.
//! Reads verify integrity via stored hashes and fail closed on corruption.
//! Security posture: database contents are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use permission_engine_core::HashAlgorithm;
use permission_engine_core::Ledger;
use permission_engine_core::LedgerError;
use permission_engine_core::LedgerMutation;
use permission_engine_core::LedgerQuery;
use permission_engine_core::PermissionState;
use permission_engine_core::canonical_json_bytes;
use permission_engine_core::sha256_digest;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the ledger.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum state snapshot size accepted by the ledger.
pub const MAX_STATE_BYTES: usize = 64 * 1024 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` ledger.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `max_versions`, when set, must be greater than zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteLedgerConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Optional number of state snapshots to keep (older ones pruned).
    #[serde(default)]
    pub max_versions: Option<u64>,
}

impl SqliteLedgerConfig {
    /// Returns a configuration with defaults for everything but the path.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteJournalMode::default(),
            sync_mode: SqliteSyncMode::default(),
            max_versions: None,
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` ledger errors.
///
/// # Invariants
/// - Error messages avoid embedding raw state payloads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteLedgerError {
    /// Ledger I/O error.
    #[error("sqlite ledger io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite ledger db error: {0}")]
    Db(String),
    /// Ledger corruption or hash mismatch.
    #[error("sqlite ledger corruption: {0}")]
    Corrupt(String),
    /// Ledger schema version mismatch.
    #[error("sqlite ledger version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid ledger data or configuration.
    #[error("sqlite ledger invalid data: {0}")]
    Invalid(String),
    /// Snapshot exceeded the size limit.
    #[error("sqlite ledger snapshot too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual snapshot size in bytes.
        actual_bytes: usize,
    },
    /// Mutation was planned against a stale version.
    #[error("sqlite ledger version conflict: expected {expected}, found {found}")]
    Conflict {
        /// Version the mutation was planned against.
        expected: u64,
        /// Current ledger version.
        found: u64,
    },
}

impl From<SqliteLedgerError> for LedgerError {
    fn from(error: SqliteLedgerError) -> Self {
        match error {
            SqliteLedgerError::Io(message) | SqliteLedgerError::Db(message) => {
                Self::Transport(message)
            }
            SqliteLedgerError::Corrupt(message) | SqliteLedgerError::VersionMismatch(message) => {
                Self::Corrupt(message)
            }
            SqliteLedgerError::Invalid(message) => Self::Invalid(message),
            SqliteLedgerError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "state_json exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
            SqliteLedgerError::Conflict {
                expected,
                found,
            } => Self::Conflict {
                expected,
                found,
            },
        }
    }
}

/// Maps a rusqlite error into a ledger database error.
#[allow(clippy::needless_pass_by_value, reason = "Used directly as a map_err adapter.")]
fn db_error(err: rusqlite::Error) -> SqliteLedgerError {
    SqliteLedgerError::Db(err.to_string())
}

// ============================================================================
// SECTION: Summaries
// ============================================================================

/// Metadata for one stored state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateVersionSummary {
    /// Ledger version.
    pub version: u64,
    /// Hex digest of the canonical snapshot.
    pub state_hash: String,
    /// Save time (milliseconds since epoch).
    pub saved_at_ms: i64,
}

/// One entry of the append-only mutation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationLogEntry {
    /// Version the mutation produced.
    pub version: u64,
    /// Apply time (milliseconds since epoch).
    pub applied_at_ms: i64,
    /// Mutation as submitted.
    pub mutation: LedgerMutation,
}

// ============================================================================
// SECTION: Ledger
// ============================================================================

/// `SQLite`-backed ledger with WAL support.
///
/// # Invariants
/// - State reads verify stored hashes before deserialization.
/// - `SQLite` connection access is serialized through a mutex.
#[derive(Clone)]
pub struct SqliteLedger {
    /// Ledger configuration.
    config: SqliteLedgerConfig,
    /// Shared connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteLedger {
    /// Opens an `SQLite`-backed ledger, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError`] when the database cannot be opened or
    /// initialized.
    pub fn open(config: SqliteLedgerConfig) -> Result<Self, SqliteLedgerError> {
        validate_store_path(&config.path)?;
        if config.max_versions == Some(0) {
            return Err(SqliteLedgerError::Invalid(
                "max_versions must be greater than zero".to_string(),
            ));
        }
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the ledger configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteLedgerConfig {
        &self.config
    }

    /// Verifies the ledger can execute a simple SQL statement.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError`] if the mutex is poisoned or the query fails.
    pub fn readiness(&self) -> Result<(), SqliteLedgerError> {
        let guard = self.lock()?;
        guard.execute_batch("SELECT 1").map_err(db_error)
    }

    /// Returns the latest committed version, or zero for an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError`] when the query fails.
    pub fn head_version(&self) -> Result<u64, SqliteLedgerError> {
        let guard = self.lock()?;
        Ok(latest_version(&guard)?.unwrap_or(0))
    }

    /// Lists stored snapshots, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError`] when the query fails.
    pub fn list_versions(&self) -> Result<Vec<StateVersionSummary>, SqliteLedgerError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT version, state_hash, saved_at FROM state_versions ORDER BY version DESC",
            )
            .map_err(db_error)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?))
            })
            .map_err(db_error)?;
        let mut summaries = Vec::new();
        for row in rows {
            let (version, state_hash, saved_at_ms) = row.map_err(db_error)?;
            summaries.push(StateVersionSummary {
                version: version_from_sql(version)?,
                state_hash,
                saved_at_ms,
            });
        }
        Ok(summaries)
    }

    /// Loads a specific stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError`] if `version` is zero, the snapshot fails
    /// verification, or the query fails.
    pub fn load_version(&self, version: u64) -> Result<Option<PermissionState>, SqliteLedgerError> {
        if version == 0 {
            return Err(SqliteLedgerError::Invalid("version must be >= 1".to_string()));
        }
        let guard = self.lock()?;
        load_snapshot(&guard, version_to_sql(version)?)
    }

    /// Returns mutation log entries that produced versions above `after`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError`] when the query fails or an entry cannot be
    /// decoded.
    pub fn mutations_since(&self, after: u64) -> Result<Vec<MutationLogEntry>, SqliteLedgerError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT version, mutation_json, applied_at FROM mutation_log WHERE version > ?1 \
                 ORDER BY version ASC",
            )
            .map_err(db_error)?;
        let rows = stmt
            .query_map(params![version_to_sql(after)?], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?, row.get::<_, i64>(2)?))
            })
            .map_err(db_error)?;
        let mut entries = Vec::new();
        for row in rows {
            let (version, bytes, applied_at_ms) = row.map_err(db_error)?;
            let mutation: LedgerMutation = serde_json::from_slice(&bytes)
                .map_err(|err| SqliteLedgerError::Corrupt(err.to_string()))?;
            entries.push(MutationLogEntry {
                version: version_from_sql(version)?,
                applied_at_ms,
                mutation,
            });
        }
        Ok(entries)
    }

    /// Prunes older snapshots, keeping the most recent `keep` entries. The
    /// mutation log is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError`] if `keep` is less than 1 or if the database
    /// query fails.
    pub fn prune_versions(&self, keep: u64) -> Result<u64, SqliteLedgerError> {
        if keep == 0 {
            return Err(SqliteLedgerError::Invalid("keep must be >= 1".to_string()));
        }
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_error)?;
        let Some(latest) = latest_version(&tx)? else {
            return Ok(0);
        };
        let deleted = prune_below(&tx, latest, keep)?;
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(deleted)
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteLedgerError> {
        self.connection.lock().map_err(|_| SqliteLedgerError::Io("sqlite mutex poisoned".to_string()))
    }

    /// Applies a mutation inside one transaction.
    fn apply_mutation(&self, mutation: &LedgerMutation) -> Result<u64, SqliteLedgerError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_error)?;
        let current = match latest_version(&tx)? {
            Some(version) => load_snapshot(&tx, version_to_sql(version)?)?.ok_or_else(|| {
                SqliteLedgerError::Corrupt(format!("missing state version {version}"))
            })?,
            None => PermissionState::default(),
        };
        if current.version != mutation.base_version {
            return Err(SqliteLedgerError::Conflict {
                expected: mutation.base_version,
                found: current.version,
            });
        }
        let mut next = current;
        next.apply_all(&mutation.changes);
        next.check_invariants().map_err(SqliteLedgerError::Invalid)?;
        next.version = next
            .version
            .checked_add(1)
            .ok_or_else(|| SqliteLedgerError::Corrupt("ledger version overflow".to_string()))?;
        let state_json = canonical_json_bytes(&next)
            .map_err(|err| SqliteLedgerError::Invalid(err.to_string()))?;
        if state_json.len() > MAX_STATE_BYTES {
            return Err(SqliteLedgerError::TooLarge {
                max_bytes: MAX_STATE_BYTES,
                actual_bytes: state_json.len(),
            });
        }
        let digest = sha256_digest(&state_json);
        let mutation_json = serde_json::to_vec(mutation)
            .map_err(|err| SqliteLedgerError::Invalid(err.to_string()))?;
        let version = version_to_sql(next.version)?;
        let now = unix_millis();
        tx.execute(
            "INSERT INTO state_versions (version, state_json, state_hash, hash_algorithm, \
             saved_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                version,
                state_json.as_slice(),
                digest.value.as_str(),
                digest.algorithm.as_str(),
                now
            ],
        )
        .map_err(db_error)?;
        tx.execute(
            "INSERT INTO mutation_log (version, partition, base_version, mutation_json, \
             applied_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                version,
                mutation.partition.as_str(),
                version_to_sql(mutation.base_version)?,
                mutation_json.as_slice(),
                now
            ],
        )
        .map_err(db_error)?;
        if let Some(max_versions) = self.config.max_versions {
            prune_below(&tx, next.version, max_versions)?;
        }
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(next.version)
    }

    /// Reads the latest verified state.
    fn read_state(&self, query: &LedgerQuery) -> Result<PermissionState, SqliteLedgerError> {
        let guard = self.lock()?;
        let state = match latest_version(&guard)? {
            Some(version) => load_snapshot(&guard, version_to_sql(version)?)?.ok_or_else(|| {
                SqliteLedgerError::Corrupt(format!("missing state version {version}"))
            })?,
            None => PermissionState::default(),
        };
        drop(guard);
        Ok(match query {
            LedgerQuery::Full => state,
            LedgerQuery::Org(org_id) => state.scoped_to(org_id),
        })
    }
}

impl Ledger for SqliteLedger {
    fn apply(&self, mutation: &LedgerMutation) -> Result<u64, LedgerError> {
        self.apply_mutation(mutation).map_err(LedgerError::from)
    }

    fn read(&self, query: &LedgerQuery) -> Result<PermissionState, LedgerError> {
        self.read_state(query).map_err(LedgerError::from)
    }
}

// ============================================================================
// SECTION: Snapshot Helpers
// ============================================================================

/// Returns the newest stored version.
fn latest_version(connection: &Connection) -> Result<Option<u64>, SqliteLedgerError> {
    let latest: Option<i64> = connection
        .query_row("SELECT MAX(version) FROM state_versions", [], |row| row.get(0))
        .map_err(db_error)?;
    latest.map(version_from_sql).transpose()
}

/// Loads and verifies one snapshot.
fn load_snapshot(
    connection: &Connection,
    version: i64,
) -> Result<Option<PermissionState>, SqliteLedgerError> {
    let metadata = connection
        .query_row(
            "SELECT length(state_json), state_hash, hash_algorithm FROM state_versions WHERE \
             version = ?1",
            params![version],
            |row| {
                let length: i64 = row.get(0)?;
                let hash: String = row.get(1)?;
                let algorithm: String = row.get(2)?;
                Ok((length, hash, algorithm))
            },
        )
        .optional()
        .map_err(db_error)?;
    let Some((length, hash, algorithm)) = metadata else {
        return Ok(None);
    };
    let length = usize::try_from(length).map_err(|_| {
        SqliteLedgerError::Invalid(format!("negative state length for version {version}"))
    })?;
    if length > MAX_STATE_BYTES {
        return Err(SqliteLedgerError::TooLarge {
            max_bytes: MAX_STATE_BYTES,
            actual_bytes: length,
        });
    }
    let bytes: Vec<u8> = connection
        .query_row(
            "SELECT state_json FROM state_versions WHERE version = ?1",
            params![version],
            |row| row.get(0),
        )
        .map_err(db_error)?;
    parse_hash_algorithm(&algorithm)?;
    let expected = sha256_digest(&bytes);
    if expected.value != hash {
        return Err(SqliteLedgerError::Corrupt(format!("hash mismatch for version {version}")));
    }
    let state: PermissionState = serde_json::from_slice(&bytes)
        .map_err(|err| SqliteLedgerError::Invalid(err.to_string()))?;
    if version_to_sql(state.version)? != version {
        return Err(SqliteLedgerError::Corrupt(format!(
            "version mismatch between key {version} and payload {}",
            state.version
        )));
    }
    Ok(Some(state))
}

/// Deletes snapshots older than the newest `keep`.
fn prune_below(
    tx: &rusqlite::Transaction<'_>,
    latest: u64,
    keep: u64,
) -> Result<u64, SqliteLedgerError> {
    if keep == 0 {
        return Err(SqliteLedgerError::Invalid(
            "max_versions must be greater than zero".to_string(),
        ));
    }
    if latest <= keep {
        return Ok(0);
    }
    let min_version = version_to_sql(latest - keep + 1)?;
    let deleted = tx
        .execute("DELETE FROM state_versions WHERE version < ?1", params![min_version])
        .map_err(db_error)?;
    u64::try_from(deleted)
        .map_err(|_| SqliteLedgerError::Invalid(format!("pruned count exceeds u64: {deleted}")))
}

/// Converts a ledger version into an `SQLite` integer.
fn version_to_sql(version: u64) -> Result<i64, SqliteLedgerError> {
    i64::try_from(version)
        .map_err(|_| SqliteLedgerError::Invalid(format!("version out of range: {version}")))
}

/// Converts a stored integer into a ledger version.
fn version_from_sql(version: i64) -> Result<u64, SqliteLedgerError> {
    u64::try_from(version)
        .map_err(|_| SqliteLedgerError::Corrupt(format!("negative stored version: {version}")))
}

/// Parses a hash algorithm label.
fn parse_hash_algorithm(label: &str) -> Result<HashAlgorithm, SqliteLedgerError> {
    match label {
        "sha256" => Ok(HashAlgorithm::Sha256),
        other => Err(SqliteLedgerError::Invalid(format!("unsupported hash algorithm: {other}"))),
    }
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}

// ============================================================================
// SECTION: Connection Setup
// ============================================================================

/// Ensures the parent directory of the database exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteLedgerError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteLedgerError::Io("ledger path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteLedgerError::Io(err.to_string()))
}

/// Validates ledger paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteLedgerError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteLedgerError::Invalid("ledger path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteLedgerError::Invalid("ledger path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteLedgerError::Invalid(
                "ledger path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteLedgerError::Invalid(
            "ledger path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteLedgerConfig) -> Result<Connection, SqliteLedgerError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms)).map_err(db_error)?;
    Ok(connection)
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteLedgerError> {
    let tx = connection.transaction().map_err(db_error)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS ledger_meta (version INTEGER NOT NULL);")
        .map_err(db_error)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM ledger_meta LIMIT 1", [], |row| row.get(0))
        .optional()
        .map_err(db_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO ledger_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db_error)?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS state_versions (
                    version INTEGER PRIMARY KEY,
                    state_json BLOB NOT NULL,
                    state_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL,
                    saved_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS mutation_log (
                    version INTEGER PRIMARY KEY,
                    partition TEXT NOT NULL,
                    base_version INTEGER NOT NULL,
                    mutation_json BLOB NOT NULL,
                    applied_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_mutation_log_partition
                    ON mutation_log (partition, version);",
            )
            .map_err(db_error)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteLedgerError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(db_error)?;
    Ok(())
}
