// crates/permission-engine-core/src/runtime/locks.rs
// ============================================================================
// Module: Org Slot Locks
// Description: One mutex per auth-org slot.
// Purpose: Serialize planning within an org while other orgs proceed.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Locks are created on first use and never removed; the org set only grows.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::OrgId;
use crate::core::PermissionError;

// ============================================================================
// SECTION: Locks
// ============================================================================

/// Per-org slot locks.
#[derive(Debug, Default)]
pub(crate) struct OrgLocks {
    /// Lock per org, created lazily.
    slots: Mutex<BTreeMap<OrgId, Arc<Mutex<()>>>>,
}

impl OrgLocks {
    /// Returns the lock for an org slot, creating it if needed.
    ///
    /// The caller locks the returned mutex for as long as it plans.
    pub(crate) fn slot(&self, org_id: &OrgId) -> Result<Arc<Mutex<()>>, PermissionError> {
        let mut slots = self.slots.lock().map_err(|_| poisoned("org lock table"))?;
        Ok(Arc::clone(slots.entry(org_id.clone()).or_default()))
    }
}

/// Builds the error reported for a poisoned engine lock.
pub(crate) fn poisoned(lock: &str) -> PermissionError {
    PermissionError::Transport {
        collaborator: "engine",
        detail: format!("{lock} poisoned"),
    }
}
