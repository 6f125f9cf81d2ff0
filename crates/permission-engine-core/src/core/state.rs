// crates/permission-engine-core/src/core/state.rs
// ============================================================================
// Module: Permission State
// Description: Complete permission state and the atomic changes applied to it.
// Purpose: Provide the snapshot shared by the facade, ledgers, and readers.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`PermissionState`] is the full set of registries plus the pending-operation
//! slots and the network boot flag. The facade never edits it in place: it
//! plans a list of [`StateChange`] values, applies them to a copy, and swaps
//! the copy in once the ledger accepted the same list.
//!
//! Snapshots serialize with every registry as an ordered list so the JSON form
//! has string keys only and hashes deterministically.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::hashing::hash_canonical_json;
use crate::core::identifiers::AccountAddress;
use crate::core::identifiers::EnodeId;
use crate::core::identifiers::OrgId;
use crate::core::model::AccountRecord;
use crate::core::model::NodeRecord;
use crate::core::model::OrgRecord;
use crate::core::model::RoleKey;
use crate::core::model::RoleRecord;
use crate::core::pending::PendingOperation;
use crate::core::pending::TargetKey;

// ============================================================================
// SECTION: State Changes
// ============================================================================

/// Single atomic change to permission state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum StateChange {
    /// Insert or replace an org record.
    PutOrg {
        /// New record.
        record: OrgRecord,
    },
    /// Insert or replace a node record.
    PutNode {
        /// New record.
        record: NodeRecord,
    },
    /// Insert or replace a role record.
    PutRole {
        /// New record.
        record: RoleRecord,
    },
    /// Insert or replace an account record.
    PutAccount {
        /// New record.
        record: AccountRecord,
    },
    /// Open or update an auth org's pending operation.
    PutPendingOperation {
        /// New slot contents.
        operation: PendingOperation,
    },
    /// Clear an auth org's pending operation.
    ClearPendingOperation {
        /// Auth org whose slot is cleared.
        auth_org: OrgId,
    },
    /// Flip the one-way network boot flag.
    MarkNetworkBooted,
}

// ============================================================================
// SECTION: Permission State
// ============================================================================

/// Complete permission state at one ledger version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "StateDocument", from = "StateDocument")]
pub struct PermissionState {
    /// Ledger version this state corresponds to; 0 before any commit.
    pub version: u64,
    /// Whether network boot completed.
    pub network_booted: bool,
    /// Orgs by full identifier.
    pub orgs: BTreeMap<OrgId, OrgRecord>,
    /// Nodes by enode identifier.
    pub nodes: BTreeMap<EnodeId, NodeRecord>,
    /// Roles by `(org, role)`.
    pub roles: BTreeMap<RoleKey, RoleRecord>,
    /// Accounts by address.
    pub accounts: BTreeMap<AccountAddress, AccountRecord>,
    /// Open votes by auth org.
    pub pending: BTreeMap<OrgId, PendingOperation>,
}

impl PermissionState {
    /// Applies one change in place.
    pub fn apply(&mut self, change: &StateChange) {
        match change {
            StateChange::PutOrg { record } => {
                self.orgs.insert(record.org_id.clone(), record.clone());
            }
            StateChange::PutNode { record } => {
                self.nodes.insert(record.enode_id.clone(), record.clone());
            }
            StateChange::PutRole { record } => {
                self.roles.insert(record.key(), record.clone());
            }
            StateChange::PutAccount { record } => {
                self.accounts.insert(record.address.clone(), record.clone());
            }
            StateChange::PutPendingOperation { operation } => {
                self.pending.insert(operation.auth_org.clone(), operation.clone());
            }
            StateChange::ClearPendingOperation { auth_org } => {
                self.pending.remove(auth_org);
            }
            StateChange::MarkNetworkBooted => {
                self.network_booted = true;
            }
        }
    }

    /// Applies changes in order; later changes win.
    pub fn apply_all(&mut self, changes: &[StateChange]) {
        for change in changes {
            self.apply(change);
        }
    }

    /// Checks cross-registry invariants that every committed state must hold.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated invariant.
    pub fn check_invariants(&self) -> Result<(), String> {
        for (auth_org, operation) in &self.pending {
            if &operation.auth_org != auth_org {
                return Err(format!(
                    "pending slot {auth_org} holds an operation for {}",
                    operation.auth_org
                ));
            }
            if !self.orgs.contains_key(auth_org) {
                return Err(format!("pending operation attached to unknown org {auth_org}"));
            }
            let target_exists = match operation.target_key() {
                TargetKey::Org(org_id) => self.orgs.contains_key(&org_id),
                TargetKey::Node(enode_id) => self.nodes.contains_key(&enode_id),
                TargetKey::Account(address) => self.accounts.contains_key(&address),
            };
            if !target_exists {
                return Err(format!("pending operation in {auth_org} targets a missing record"));
            }
        }
        for node in self.nodes.values() {
            if !self.orgs.contains_key(&node.org_id) {
                return Err(format!("node {} belongs to unknown org {}", node.enode_id, node.org_id));
            }
        }
        for account in self.accounts.values() {
            if !self.orgs.contains_key(&account.org_id) {
                return Err(format!(
                    "account {} belongs to unknown org {}",
                    account.address, account.org_id
                ));
            }
        }
        let mut admin_orgs = BTreeSet::new();
        for role in self.roles.values().filter(|role| role.active && role.is_admin) {
            if !admin_orgs.insert(&role.org_id) {
                return Err(format!("org {} has more than one active admin role", role.org_id));
            }
        }
        Ok(())
    }

    /// Returns the subset of state belonging to a master org's tree.
    #[must_use]
    pub fn scoped_to(&self, org_id: &OrgId) -> Self {
        let orgs: BTreeMap<OrgId, OrgRecord> = self
            .orgs
            .iter()
            .filter(|(id, record)| *id == org_id || &record.ultimate_parent == org_id)
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect();
        Self {
            version: self.version,
            network_booted: self.network_booted,
            nodes: self
                .nodes
                .iter()
                .filter(|(_, node)| orgs.contains_key(&node.org_id))
                .map(|(id, node)| (id.clone(), node.clone()))
                .collect(),
            roles: self
                .roles
                .iter()
                .filter(|(key, _)| orgs.contains_key(&key.org_id))
                .map(|(key, role)| (key.clone(), role.clone()))
                .collect(),
            accounts: self
                .accounts
                .iter()
                .filter(|(_, account)| orgs.contains_key(&account.org_id))
                .map(|(address, account)| (address.clone(), account.clone()))
                .collect(),
            pending: self
                .pending
                .iter()
                .filter(|(auth_org, _)| orgs.contains_key(*auth_org))
                .map(|(auth_org, operation)| (auth_org.clone(), operation.clone()))
                .collect(),
            orgs,
        }
    }

    /// Returns the canonical digest of this state.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when canonicalization fails.
    pub fn fingerprint(&self) -> Result<HashDigest, HashError> {
        hash_canonical_json(self)
    }
}

// ============================================================================
// SECTION: Serialized Form
// ============================================================================

/// List-based serialized form of [`PermissionState`].
#[derive(Serialize, Deserialize)]
struct StateDocument {
    /// Ledger version.
    version: u64,
    /// Network boot flag.
    network_booted: bool,
    /// Org records.
    orgs: Vec<OrgRecord>,
    /// Node records.
    nodes: Vec<NodeRecord>,
    /// Role records.
    roles: Vec<RoleRecord>,
    /// Account records.
    accounts: Vec<AccountRecord>,
    /// Open pending operations.
    pending: Vec<PendingOperation>,
}

impl From<PermissionState> for StateDocument {
    fn from(state: PermissionState) -> Self {
        Self {
            version: state.version,
            network_booted: state.network_booted,
            orgs: state.orgs.into_values().collect(),
            nodes: state.nodes.into_values().collect(),
            roles: state.roles.into_values().collect(),
            accounts: state.accounts.into_values().collect(),
            pending: state.pending.into_values().collect(),
        }
    }
}

impl From<StateDocument> for PermissionState {
    fn from(document: StateDocument) -> Self {
        Self {
            version: document.version,
            network_booted: document.network_booted,
            orgs: document.orgs.into_iter().map(|org| (org.org_id.clone(), org)).collect(),
            nodes: document.nodes.into_iter().map(|node| (node.enode_id.clone(), node)).collect(),
            roles: document.roles.into_iter().map(|role| (role.key(), role)).collect(),
            accounts: document
                .accounts
                .into_iter()
                .map(|account| (account.address.clone(), account))
                .collect(),
            pending: document
                .pending
                .into_iter()
                .map(|operation| (operation.auth_org.clone(), operation))
                .collect(),
        }
    }
}
