// crates/permission-engine-core/src/runtime/voters.rs
// ============================================================================
// Module: Voter Registry
// Description: Live computation of the valid voter set for an auth org.
// Purpose: Derive voting eligibility from accounts and roles on every read.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Voters are not stored. An account is a valid voter for an auth org while
//! it belongs to that org, is Active, has no admin assignment pending, and its
//! role resolves to an active voter role. Revoking a role or suspending an
//! account therefore changes every open threshold immediately.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::core::AccountAddress;
use crate::core::AccountRecord;
use crate::core::AccountStatus;
use crate::core::OrgId;
use crate::core::PermissionState;
use crate::runtime::roles::RoleRegistry;

// ============================================================================
// SECTION: Voter Registry
// ============================================================================

/// Read view computing voter eligibility over a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct VoterRegistry<'a> {
    /// Snapshot being read.
    state: &'a PermissionState,
}

impl<'a> VoterRegistry<'a> {
    /// Creates a view over a snapshot.
    #[must_use]
    pub const fn new(state: &'a PermissionState) -> Self {
        Self { state }
    }

    /// Returns true when the account record is eligible to vote in its own org.
    #[must_use]
    pub fn is_eligible(&self, account: &AccountRecord) -> bool {
        account.status == AccountStatus::Active
            && !account.pending_approval()
            && account.role_id.as_ref().is_some_and(|role_id| {
                RoleRegistry::new(self.state).is_voter_role(&account.org_id, role_id)
            })
    }

    /// Returns true when `address` may vote in `auth_org`.
    #[must_use]
    pub fn is_valid_voter(&self, auth_org: &OrgId, address: &AccountAddress) -> bool {
        self.state
            .accounts
            .get(address)
            .is_some_and(|account| &account.org_id == auth_org && self.is_eligible(account))
    }

    /// Returns every valid voter of `auth_org`.
    #[must_use]
    pub fn valid_voters(&self, auth_org: &OrgId) -> BTreeSet<AccountAddress> {
        self.state
            .accounts
            .values()
            .filter(|account| &account.org_id == auth_org && self.is_eligible(account))
            .map(|account| account.address.clone())
            .collect()
    }

    /// Returns the number of valid voters of `auth_org`.
    #[must_use]
    pub fn number_of_valid_voters(&self, auth_org: &OrgId) -> usize {
        self.valid_voters(auth_org).len()
    }

    /// Returns every `(auth_org, voter)` pair in the snapshot.
    #[must_use]
    pub fn all_voters(&self) -> BTreeSet<(OrgId, AccountAddress)> {
        self.state
            .accounts
            .values()
            .filter(|account| self.is_eligible(account))
            .map(|account| (account.org_id.clone(), account.address.clone()))
            .collect()
    }
}
