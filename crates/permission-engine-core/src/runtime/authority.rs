// crates/permission-engine-core/src/runtime/authority.rs
// ============================================================================
// Module: Caller Authority
// Description: Network-admin and org-admin privilege checks.
// Purpose: Resolve who may act on which org from a state snapshot.
// Dependencies: crate::core, crate::runtime::roles
// ============================================================================

//! ## Overview
//! A network admin is an Active account in the network-admin org holding the
//! reserved network-admin role. An org admin holds approved org-admin rights
//! in the org itself or in its ultimate parent, so master-org admins govern
//! their whole tree. Network admins may perform every org-admin action.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AccountAddress;
use crate::core::AccountRecord;
use crate::core::AccountStatus;
use crate::core::OrgId;
use crate::core::PermissionState;
use crate::runtime::engine::EngineConfig;
use crate::runtime::roles::RoleRegistry;

// ============================================================================
// SECTION: Authority
// ============================================================================

/// Privilege checks over a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Authority<'a> {
    /// Snapshot being read.
    state: &'a PermissionState,
    /// Engine configuration naming the reserved org and roles.
    config: &'a EngineConfig,
}

impl<'a> Authority<'a> {
    /// Creates a checker over a snapshot.
    #[must_use]
    pub const fn new(state: &'a PermissionState, config: &'a EngineConfig) -> Self {
        Self { state, config }
    }

    /// Returns the account if it exists and may act at all.
    fn acting_account(&self, address: &AccountAddress) -> Option<&'a AccountRecord> {
        self.state
            .accounts
            .get(address)
            .filter(|account| account.status == AccountStatus::Active && !account.pending_approval())
    }

    /// Returns true when the account is a network admin.
    #[must_use]
    pub fn is_network_admin(&self, address: &AccountAddress) -> bool {
        self.acting_account(address).is_some_and(|account| {
            account.org_id == self.config.network_admin_org
                && account.role_id.as_ref() == Some(&self.config.network_admin_role)
                && RoleRegistry::new(self.state)
                    .resolve(&account.org_id, &self.config.network_admin_role)
                    .is_some()
        })
    }

    /// Returns true when the account is an org admin of `org_id` or of its
    /// ultimate parent.
    #[must_use]
    pub fn is_org_admin(&self, address: &AccountAddress, org_id: &OrgId) -> bool {
        let Some(org) = self.state.orgs.get(org_id) else {
            return false;
        };
        self.acting_account(address).is_some_and(|account| {
            account.is_org_admin
                && (&account.org_id == org_id || account.org_id == org.ultimate_parent)
        })
    }

    /// Returns true when the account may perform org-admin actions on `org_id`.
    #[must_use]
    pub fn can_administer(&self, address: &AccountAddress, org_id: &OrgId) -> bool {
        self.is_network_admin(address) || self.is_org_admin(address, org_id)
    }
}
