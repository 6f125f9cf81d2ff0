// crates/permission-engine-store-sqlite/src/lib.rs
// ============================================================================
// Module: Permission Engine SQLite Ledger Library
// Description: Durable ledger for the permission engine.
// Purpose: Persist permission state across restarts with integrity checks.
// Dependencies: permission-engine-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Provides [`SqliteLedger`], a [`permission_engine_core::Ledger`] that keeps
//! every committed state as a canonical JSON snapshot with its SHA-256 hash,
//! next to an append-only log of the mutations that produced it.
//! Invariants:
//! - Snapshots are verified against their stored hash before use.
//! - A mutation applies only on top of the version it was planned against.
//!
//! Security posture: database contents are untrusted and fail closed on any
//! mismatch.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_STATE_BYTES;
pub use store::MutationLogEntry;
pub use store::SqliteJournalMode;
pub use store::SqliteLedger;
pub use store::SqliteLedgerConfig;
pub use store::SqliteLedgerError;
pub use store::SqliteSyncMode;
pub use store::StateVersionSummary;
