// crates/permission-engine-core/src/runtime/access.rs
// ============================================================================
// Module: Access Enforcement
// Description: Account access, node connection, and transaction checks.
// Purpose: Answer the enforcement questions a network client asks per peer
// and per transaction.
// Dependencies: crate::core, crate::runtime::orgs
// ============================================================================

//! ## Overview
//! Enforcement reads never fail on unknown identifiers; they answer with the
//! most restrictive result instead. An account only acts through its access
//! level while it is Active, holds no pending admin assignment, and its org
//! and master org are both operational. Everyone else gets the configured
//! default access.
//!
//! Access levels are cached on the account when a role is assigned, so
//! deactivating a role does not narrow existing holders.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AccessLevel;
use crate::core::AccountAddress;
use crate::core::AccountRecord;
use crate::core::AccountStatus;
use crate::core::EnodeId;
use crate::core::NodeStatus;
use crate::core::PermissionState;
use crate::core::TransactionKind;
use crate::runtime::engine::EngineConfig;
use crate::runtime::orgs::OrgRegistry;
use crate::runtime::roles::RoleRegistry;

// ============================================================================
// SECTION: Access Control
// ============================================================================

/// Enforcement checks over a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct AccessControl<'a> {
    /// Snapshot being read.
    state: &'a PermissionState,
    /// Engine configuration naming the reserved roles and default access.
    config: &'a EngineConfig,
}

impl<'a> AccessControl<'a> {
    /// Creates a checker over a snapshot.
    #[must_use]
    pub const fn new(state: &'a PermissionState, config: &'a EngineConfig) -> Self {
        Self { state, config }
    }

    /// Returns the account when it is Active and its org tree is operational.
    fn enforceable(&self, address: &AccountAddress) -> Option<&'a AccountRecord> {
        let orgs = OrgRegistry::new(self.state);
        self.state.accounts.get(address).filter(|account| {
            account.status == AccountStatus::Active
                && !account.pending_approval()
                && orgs.is_active(&account.org_id)
        })
    }

    /// Returns true when the account holds one of the reserved admin roles.
    fn holds_reserved_admin_role(&self, account: &AccountRecord) -> bool {
        account.is_org_admin
            || (account.org_id == self.config.network_admin_org
                && account.role_id.as_ref() == Some(&self.config.network_admin_role))
    }

    /// Returns the access level the account may act with.
    #[must_use]
    pub fn account_access(&self, address: &AccountAddress) -> AccessLevel {
        let Some(account) = self.enforceable(address) else {
            return self.config.default_access;
        };
        if self.holds_reserved_admin_role(account) {
            return AccessLevel::FullAccess;
        }
        if account.role_id.is_some() {
            account.access_level
        } else {
            self.config.default_access
        }
    }

    /// Returns true when the account holds an admin role and may act.
    #[must_use]
    pub fn is_admin_account(&self, address: &AccountAddress) -> bool {
        self.enforceable(address).is_some_and(|account| {
            self.holds_reserved_admin_role(account)
                || account.role_id.as_ref().is_some_and(|role_id| {
                    RoleRegistry::new(self.state)
                        .resolve(&account.org_id, role_id)
                        .is_some_and(|role| role.is_admin)
                })
        })
    }

    /// Returns true when the node may connect to the network.
    ///
    /// Only Active nodes connect; a pending status change already blocks.
    #[must_use]
    pub fn connection_allowed(&self, enode_id: &EnodeId) -> bool {
        self.state.nodes.get(enode_id).is_some_and(|node| node.status == NodeStatus::Active)
    }

    /// Returns true when `from` may submit transactions through `enode_id`.
    ///
    /// Unknown accounts pass; known accounts must use an Active node
    /// belonging to their own master org's tree.
    #[must_use]
    pub fn validate_node_for_txn(&self, enode_id: &EnodeId, from: &AccountAddress) -> bool {
        let Some(account) = self.state.accounts.get(from) else {
            return true;
        };
        let Some(account_org) = self.state.orgs.get(&account.org_id) else {
            return false;
        };
        let Some(node) = self.state.nodes.get(enode_id) else {
            return false;
        };
        node.status == NodeStatus::Active
            && self
                .state
                .orgs
                .get(&node.org_id)
                .is_some_and(|node_org| node_org.ultimate_parent == account_org.ultimate_parent)
    }

    /// Returns true when the account's access level permits `kind`.
    #[must_use]
    pub fn transaction_allowed(&self, address: &AccountAddress, kind: TransactionKind) -> bool {
        self.account_access(address).permits(kind)
    }
}
