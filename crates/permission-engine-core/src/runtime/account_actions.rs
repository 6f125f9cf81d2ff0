// crates/permission-engine-core/src/runtime/account_actions.rs
// ============================================================================
// Module: Account and Role Action Planning
// Description: Planners for roles, account roles, org admins, and account status.
// Purpose: Combine role and account registry rules with authority and voting.
// Dependencies: crate::core, crate::runtime
// ============================================================================

//! ## Overview
//! Role and account changes commit directly once the caller administers the
//! org. The one exception is org-admin assignment, which the network admin
//! org's voters must approve; the proposer cannot approve it themselves.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AccountAddress;
use crate::core::EntityKind;
use crate::core::OrgId;
use crate::core::PendingOpType;
use crate::core::PermissionError;
use crate::core::PermissionEvent;
use crate::core::RoleId;
use crate::core::RoleKey;
use crate::core::StateChange;
use crate::core::TargetKey;
use crate::core::VoteTarget;
use crate::runtime::accounts::AccountRegistry;
use crate::runtime::accounts::AccountStatusAction;
use crate::runtime::orgs::OrgRegistry;
use crate::runtime::planner::Plan;
use crate::runtime::planner::Planner;
use crate::runtime::roles::RoleDefinition;
use crate::runtime::roles::RoleRegistry;

// ============================================================================
// SECTION: Role Planners
// ============================================================================

impl Planner<'_> {
    /// Plans creating or reactivating a role.
    pub(crate) fn add_role(&self, definition: &RoleDefinition) -> Result<Plan, PermissionError> {
        let org = OrgRegistry::new(self.state).get_operational(&definition.org_id)?;
        self.require_org_admin("add role", org)?;
        if definition.is_admin {
            self.require_network_admin("add admin role", &definition.org_id)?;
        }
        let record = RoleRegistry::new(self.state).plan_add(definition)?;
        let events = vec![PermissionEvent::RoleCreated {
            org_id: record.org_id.clone(),
            role_id: record.role_id.clone(),
            access_level: record.access_level,
            is_voter: record.is_voter,
            is_admin: record.is_admin,
        }];
        Ok(Plan::committed(
            vec![StateChange::PutRole {
                record,
            }],
            events,
        ))
    }

    /// Plans deactivating a role.
    pub(crate) fn remove_role(
        &self,
        org_id: &OrgId,
        role_id: &RoleId,
    ) -> Result<Plan, PermissionError> {
        let org = OrgRegistry::new(self.state).get_org(org_id)?;
        self.require_org_admin("remove role", org)?;
        let record = RoleRegistry::new(self.state).plan_remove(org_id, role_id)?;
        let events = vec![PermissionEvent::RoleRevoked {
            org_id: org_id.clone(),
            role_id: role_id.clone(),
        }];
        Ok(Plan::committed(
            vec![StateChange::PutRole {
                record,
            }],
            events,
        ))
    }

    // ========================================================================
    // SECTION: Account Planners
    // ========================================================================

    /// Plans assigning a role to an account in an operational org.
    pub(crate) fn assign_account_role(
        &self,
        address: &AccountAddress,
        org_id: &OrgId,
        role_id: &RoleId,
    ) -> Result<Plan, PermissionError> {
        let org = OrgRegistry::new(self.state).get_operational(org_id)?;
        self.require_org_admin("assign account role", org)?;
        let role = RoleRegistry::new(self.state).resolve(org_id, role_id).ok_or_else(|| {
            PermissionError::not_found(EntityKind::Role, RoleKey::new(org_id.clone(), role_id.clone()))
        })?;
        let record = AccountRegistry::new(self.state).plan_assign_role(address, org_id, role)?;
        let events = vec![PermissionEvent::AccountRoleAssigned {
            org_id: org_id.clone(),
            account: address.clone(),
            role_id: role.role_id.clone(),
            access_level: role.access_level,
        }];
        Ok(Plan::committed(
            vec![StateChange::PutAccount {
                record,
            }],
            events,
        ))
    }

    /// Plans clearing an account's role.
    pub(crate) fn revoke_account_role(
        &self,
        address: &AccountAddress,
    ) -> Result<Plan, PermissionError> {
        let accounts = AccountRegistry::new(self.state);
        let account = accounts.get_account_details(address)?;
        let org = OrgRegistry::new(self.state).get_org(&account.org_id)?;
        self.require_org_admin("revoke account role", org)?;
        if account.is_org_admin {
            self.require_network_admin("revoke org admin role", address)?;
        }
        let record = accounts.plan_revoke_role(address)?;
        let events = vec![PermissionEvent::AccountRoleRevoked {
            org_id: record.org_id.clone(),
            account: address.clone(),
        }];
        Ok(Plan::committed(
            vec![StateChange::PutAccount {
                record,
            }],
            events,
        ))
    }

    /// Plans proposing an account as org admin.
    pub(crate) fn assign_org_admin(
        &self,
        org_id: &OrgId,
        address: &AccountAddress,
    ) -> Result<Plan, PermissionError> {
        self.require_network_admin("assign org admin", org_id)?;
        OrgRegistry::new(self.state).get_operational(org_id)?;
        let admin_role = RoleRegistry::new(self.state).admin_role(org_id).ok_or_else(|| {
            PermissionError::not_found(EntityKind::Role, format!("{org_id}/admin"))
        })?;
        let record = AccountRegistry::new(self.state).plan_propose_admin(
            address,
            org_id,
            &admin_role.role_id,
        )?;
        let events = vec![PermissionEvent::OrgAdminProposed {
            org_id: org_id.clone(),
            account: address.clone(),
        }];
        let changes = vec![StateChange::PutAccount {
            record,
        }];
        let item = self.voting_item(
            self.config.network_admin_org.clone(),
            org_id.clone(),
            PendingOpType::AssignOrgAdmin,
            Some(TargetKey::Account(address.clone())),
        );
        self.open_vote(changes, events, item)
    }

    /// Plans the caller's approval vote for a pending org-admin assignment.
    pub(crate) fn approve_org_admin_account(
        &self,
        org_id: &OrgId,
        address: &AccountAddress,
    ) -> Result<Plan, PermissionError> {
        let account = AccountRegistry::new(self.state).get_account_details(address)?;
        if &account.org_id != org_id || !account.pending_approval() {
            return Err(PermissionError::invalid_transition(
                EntityKind::Account,
                address,
                format!("no admin assignment pending for org {org_id}"),
            ));
        }
        self.vote(
            &self.config.network_admin_org,
            &VoteTarget::new(PendingOpType::AssignOrgAdmin, TargetKey::Account(address.clone())),
        )
    }

    /// Plans an account status change.
    pub(crate) fn update_account_status(
        &self,
        org_id: &OrgId,
        address: &AccountAddress,
        action: AccountStatusAction,
    ) -> Result<Plan, PermissionError> {
        let org = OrgRegistry::new(self.state).get_org(org_id)?;
        self.require_org_admin("update account status", org)?;
        let record = AccountRegistry::new(self.state).plan_status_change(org_id, address, action)?;
        let events = vec![PermissionEvent::AccountStatusChanged {
            org_id: org_id.clone(),
            account: address.clone(),
            status: record.status,
        }];
        Ok(Plan::committed(
            vec![StateChange::PutAccount {
                record,
            }],
            events,
        ))
    }
}
