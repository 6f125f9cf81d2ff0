// crates/permission-engine-core/src/runtime/accounts.rs
// ============================================================================
// Module: Account Registry
// Description: Account lookups and account change planning.
// Purpose: Validate role assignment, admin assignment, and status changes.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! An account belongs to exactly one org for its whole life. Role assignment
//! caches the role's access level on the account, so later role changes never
//! alter access retroactively. Blacklisting is terminal, and org-admin
//! accounts cannot be suspended or blacklisted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::btree_map::Values;

use serde::Deserialize;
use serde::Serialize;

use crate::core::AccessLevel;
use crate::core::AccountAddress;
use crate::core::AccountRecord;
use crate::core::AccountStatus;
use crate::core::EntityKind;
use crate::core::OrgId;
use crate::core::PermissionError;
use crate::core::PermissionState;
use crate::core::RoleId;
use crate::core::RoleRecord;

// ============================================================================
// SECTION: Status Actions
// ============================================================================

/// Requested account status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatusAction {
    /// Active -> Suspended.
    Suspend,
    /// Suspended -> Active.
    Reactivate,
    /// Any -> Blacklisted.
    Blacklist,
}

impl AccountStatusAction {
    /// Returns the status this action moves the account to.
    #[must_use]
    pub const fn target_status(self) -> AccountStatus {
        match self {
            Self::Suspend => AccountStatus::Suspended,
            Self::Reactivate => AccountStatus::Active,
            Self::Blacklist => AccountStatus::Blacklisted,
        }
    }
}

// ============================================================================
// SECTION: Account Registry
// ============================================================================

/// Read view over the accounts in a state snapshot.
#[derive(Debug, Clone, Copy)]
pub struct AccountRegistry<'a> {
    /// Snapshot being read.
    state: &'a PermissionState,
}

impl<'a> AccountRegistry<'a> {
    /// Creates a view over a snapshot.
    #[must_use]
    pub const fn new(state: &'a PermissionState) -> Self {
        Self { state }
    }

    /// Returns an account record.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotFound`] for unknown addresses.
    pub fn get_account_details(
        &self,
        address: &AccountAddress,
    ) -> Result<&'a AccountRecord, PermissionError> {
        self.state
            .accounts
            .get(address)
            .ok_or_else(|| PermissionError::not_found(EntityKind::Account, address))
    }

    /// Iterates over every account.
    pub fn list(&self) -> Values<'a, AccountAddress, AccountRecord> {
        self.state.accounts.values()
    }

    /// Returns the existing record for `address` if it may join `org_id`.
    fn joinable(
        &self,
        address: &AccountAddress,
        org_id: &OrgId,
    ) -> Result<Option<&'a AccountRecord>, PermissionError> {
        let Some(existing) = self.state.accounts.get(address) else {
            return Ok(None);
        };
        if &existing.org_id != org_id {
            return Err(PermissionError::invalid_transition(
                EntityKind::Account,
                address,
                format!("account belongs to org {}", existing.org_id),
            ));
        }
        if existing.status == AccountStatus::Blacklisted {
            return Err(PermissionError::invalid_transition(
                EntityKind::Account,
                address,
                "account is blacklisted",
            ));
        }
        if existing.pending_approval() {
            return Err(PermissionError::invalid_transition(
                EntityKind::Account,
                address,
                "account has a pending admin assignment",
            ));
        }
        Ok(Some(existing))
    }

    /// Plans assigning a non-admin role to an account, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::InvalidStateTransition`] when the role is an
    /// admin role or the account belongs to another org, is blacklisted, or
    /// awaits admin approval.
    pub fn plan_assign_role(
        &self,
        address: &AccountAddress,
        org_id: &OrgId,
        role: &RoleRecord,
    ) -> Result<AccountRecord, PermissionError> {
        if role.is_admin {
            return Err(PermissionError::invalid_transition(
                EntityKind::Role,
                role.key(),
                "admin roles are granted through org admin assignment",
            ));
        }
        let mut record = self
            .joinable(address, org_id)?
            .cloned()
            .unwrap_or_else(|| AccountRecord::unassigned(address.clone(), org_id.clone()));
        record.role_id = Some(role.role_id.clone());
        record.access_level = role.access_level;
        record.is_org_admin = false;
        Ok(record)
    }

    /// Plans clearing an account's role.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotFound`] for unknown accounts and
    /// [`PermissionError::InvalidStateTransition`] when no role is assigned.
    pub fn plan_revoke_role(
        &self,
        address: &AccountAddress,
    ) -> Result<AccountRecord, PermissionError> {
        let existing = self.get_account_details(address)?;
        if existing.role_id.is_none() {
            return Err(PermissionError::invalid_transition(
                EntityKind::Account,
                address,
                "account has no role",
            ));
        }
        let mut record = existing.clone();
        record.role_id = None;
        record.access_level = AccessLevel::NoAccess;
        record.is_org_admin = false;
        Ok(record)
    }

    /// Plans proposing an account as org admin, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::AlreadyExists`] when the account is already
    /// an org admin and [`PermissionError::InvalidStateTransition`] when it
    /// cannot join the org.
    pub fn plan_propose_admin(
        &self,
        address: &AccountAddress,
        org_id: &OrgId,
        admin_role_id: &RoleId,
    ) -> Result<AccountRecord, PermissionError> {
        let existing = self.joinable(address, org_id)?;
        if existing.is_some_and(|account| account.is_org_admin) {
            return Err(PermissionError::already_exists(EntityKind::Account, address));
        }
        let mut record = existing
            .cloned()
            .unwrap_or_else(|| AccountRecord::unassigned(address.clone(), org_id.clone()));
        record.pending_role_id = Some(admin_role_id.clone());
        Ok(record)
    }

    /// Returns the approved form of an account awaiting admin approval.
    #[must_use]
    pub fn approved_admin(account: &AccountRecord, admin_role: &RoleRecord) -> AccountRecord {
        let mut record = account.clone();
        record.role_id = Some(admin_role.role_id.clone());
        record.access_level = admin_role.access_level;
        record.is_org_admin = true;
        record.pending_role_id = None;
        record
    }

    /// Plans an account status change.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotFound`] for unknown accounts and
    /// [`PermissionError::InvalidStateTransition`] for accounts in another
    /// org, blacklisted accounts, protected admin accounts, or transitions
    /// that do not apply to the current status.
    pub fn plan_status_change(
        &self,
        org_id: &OrgId,
        address: &AccountAddress,
        action: AccountStatusAction,
    ) -> Result<AccountRecord, PermissionError> {
        let existing = self.get_account_details(address)?;
        let reject = |detail: &str| -> Result<AccountRecord, PermissionError> {
            Err(PermissionError::invalid_transition(EntityKind::Account, address, detail))
        };
        if &existing.org_id != org_id {
            return reject("account belongs to another org");
        }
        if existing.status == AccountStatus::Blacklisted {
            return reject("account is blacklisted");
        }
        match action {
            AccountStatusAction::Suspend | AccountStatusAction::Blacklist
                if existing.is_org_admin =>
            {
                return reject("org admin accounts cannot be suspended or blacklisted");
            }
            AccountStatusAction::Suspend if existing.status != AccountStatus::Active => {
                return reject("only active accounts can be suspended");
            }
            AccountStatusAction::Reactivate if existing.status != AccountStatus::Suspended => {
                return reject("only suspended accounts can be reactivated");
            }
            _ => {}
        }
        let mut record = existing.clone();
        record.status = action.target_status();
        Ok(record)
    }
}
