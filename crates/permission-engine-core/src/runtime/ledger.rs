// crates/permission-engine-core/src/runtime/ledger.rs
// ============================================================================
// Module: In-Memory Ledger
// Description: Ledger implementation that keeps state and mutations in memory.
// Purpose: Back the engine in tests and embedded use without external storage.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryLedger`] applies mutations to a private [`PermissionState`] and
//! keeps every accepted mutation for inspection. It enforces the same
//! base-version check as durable ledgers so concurrency bugs surface in tests.
//! [`SharedLedger`] wraps any ledger behind an `Arc` trait object.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use crate::core::PermissionState;
use crate::interfaces::Ledger;
use crate::interfaces::LedgerError;
use crate::interfaces::LedgerMutation;
use crate::interfaces::LedgerQuery;

// ============================================================================
// SECTION: In-Memory Ledger
// ============================================================================

/// Ledger contents guarded together so version and log never disagree.
#[derive(Debug, Default)]
struct LedgerInner {
    /// Current state.
    state: PermissionState,
    /// Accepted mutations, oldest first.
    log: Vec<LedgerMutation>,
}

/// In-memory ledger for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedger {
    /// Shared contents.
    inner: Arc<Mutex<LedgerInner>>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every accepted mutation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Transport`] when the ledger mutex is poisoned.
    pub fn mutations(&self) -> Result<Vec<LedgerMutation>, LedgerError> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| LedgerError::Transport("in-memory ledger mutex poisoned".to_string()))?;
        Ok(guard.log.clone())
    }
}

impl Ledger for InMemoryLedger {
    fn apply(&self, mutation: &LedgerMutation) -> Result<u64, LedgerError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| LedgerError::Transport("in-memory ledger mutex poisoned".to_string()))?;
        if guard.state.version != mutation.base_version {
            return Err(LedgerError::Conflict {
                expected: mutation.base_version,
                found: guard.state.version,
            });
        }
        let mut next = guard.state.clone();
        next.apply_all(&mutation.changes);
        next.check_invariants().map_err(LedgerError::Invalid)?;
        next.version = guard.state.version.saturating_add(1);
        let version = next.version;
        guard.state = next;
        guard.log.push(mutation.clone());
        drop(guard);
        Ok(version)
    }

    fn read(&self, query: &LedgerQuery) -> Result<PermissionState, LedgerError> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| LedgerError::Transport("in-memory ledger mutex poisoned".to_string()))?;
        Ok(match query {
            LedgerQuery::Full => guard.state.clone(),
            LedgerQuery::Org(org_id) => guard.state.scoped_to(org_id),
        })
    }
}

// ============================================================================
// SECTION: Shared Ledger
// ============================================================================

/// Shared ledger wrapper for trait objects.
#[derive(Clone)]
pub struct SharedLedger {
    /// Inner ledger implementation.
    inner: Arc<dyn Ledger + Send + Sync>,
}

impl SharedLedger {
    /// Wraps a ledger implementation.
    #[must_use]
    pub fn from_ledger(ledger: impl Ledger + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(ledger),
        }
    }

    /// Wraps an existing shared ledger.
    #[must_use]
    pub const fn new(inner: Arc<dyn Ledger + Send + Sync>) -> Self {
        Self { inner }
    }
}

impl Ledger for SharedLedger {
    fn apply(&self, mutation: &LedgerMutation) -> Result<u64, LedgerError> {
        self.inner.apply(mutation)
    }

    fn read(&self, query: &LedgerQuery) -> Result<PermissionState, LedgerError> {
        self.inner.read(query)
    }
}
