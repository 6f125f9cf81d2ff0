// crates/permission-engine-core/src/runtime/network_actions.rs
// ============================================================================
// Module: Network Action Planning
// Description: Bootstrap, boot completion, and generic vote handling.
// Purpose: Seed the network-admin org and drive the one-way boot flag.
// Dependencies: crate::core, crate::runtime
// ============================================================================

//! ## Overview
//! Bootstrap seeds the network-admin org with its reserved admin role, admin
//! accounts, and admin nodes. It may be repeated until boot completes, adding
//! further admins each time. Once booted, the flag never goes back.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AccessLevel;
use crate::core::AccountAddress;
use crate::core::AccountRecord;
use crate::core::AccountStatus;
use crate::core::EnodeId;
use crate::core::EntityKind;
use crate::core::NodeRecord;
use crate::core::NodeStatus;
use crate::core::OrgId;
use crate::core::OrgRecord;
use crate::core::OrgStatus;
use crate::core::PermissionError;
use crate::core::PermissionEvent;
use crate::core::PermissionState;
use crate::core::RoleRecord;
use crate::core::StateChange;
use crate::core::TargetKey;
use crate::core::VoteTarget;
use crate::runtime::engine::EngineConfig;
use crate::runtime::planner::Plan;
use crate::runtime::planner::Planner;
use crate::runtime::roles::RoleRegistry;

// ============================================================================
// SECTION: Bootstrap Request
// ============================================================================

/// Accounts and nodes seeded into the network-admin org before boot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkBootstrap {
    /// Network admin accounts.
    pub admin_accounts: Vec<AccountAddress>,
    /// Nodes of the network-admin org, activated without a vote.
    pub admin_nodes: Vec<EnodeId>,
}

// ============================================================================
// SECTION: Bootstrap Planning
// ============================================================================

/// Plans seeding the network-admin org.
///
/// # Errors
///
/// Returns [`PermissionError::InvalidStateTransition`] once the network is
/// booted or when a seeded account or node belongs to another org, and
/// [`PermissionError::InvalidInput`] when no admin account is given.
pub(crate) fn bootstrap(
    state: &PermissionState,
    config: &EngineConfig,
    request: &NetworkBootstrap,
) -> Result<Plan, PermissionError> {
    if state.network_booted {
        return Err(PermissionError::invalid_transition(
            EntityKind::Network,
            "network",
            "network is already booted",
        ));
    }
    if request.admin_accounts.is_empty() {
        return Err(PermissionError::InvalidInput(
            "bootstrap requires at least one network admin account".to_string(),
        ));
    }
    let org_id = &config.network_admin_org;
    let mut changes = Vec::new();
    let mut events = Vec::new();
    if !state.orgs.contains_key(org_id) {
        let mut org = OrgRecord::proposed_master(org_id.clone());
        org.status = OrgStatus::Approved;
        changes.push(StateChange::PutOrg {
            record: org,
        });
        events.push(PermissionEvent::OrgApproved {
            org_id: org_id.clone(),
        });
    }
    if RoleRegistry::new(state).resolve(org_id, &config.network_admin_role).is_none() {
        let role = RoleRecord {
            role_id: config.network_admin_role.clone(),
            org_id: org_id.clone(),
            access_level: AccessLevel::FullAccess,
            is_voter: true,
            is_admin: true,
            active: true,
        };
        events.push(PermissionEvent::RoleCreated {
            org_id: org_id.clone(),
            role_id: role.role_id.clone(),
            access_level: role.access_level,
            is_voter: role.is_voter,
            is_admin: role.is_admin,
        });
        changes.push(StateChange::PutRole {
            record: role,
        });
    }
    for address in &request.admin_accounts {
        if let Some(existing) = state.accounts.get(address)
            && &existing.org_id != org_id
        {
            return Err(PermissionError::invalid_transition(
                EntityKind::Account,
                address,
                format!("account belongs to org {}", existing.org_id),
            ));
        }
        changes.push(StateChange::PutAccount {
            record: AccountRecord {
                address: address.clone(),
                org_id: org_id.clone(),
                role_id: Some(config.network_admin_role.clone()),
                access_level: AccessLevel::FullAccess,
                status: AccountStatus::Active,
                is_org_admin: true,
                pending_role_id: None,
            },
        });
        events.push(PermissionEvent::OrgAdminApproved {
            org_id: org_id.clone(),
            account: address.clone(),
        });
    }
    for enode_id in &request.admin_nodes {
        match state.nodes.get(enode_id) {
            Some(existing) if &existing.org_id == org_id => continue,
            Some(existing) => {
                return Err(PermissionError::invalid_transition(
                    EntityKind::Node,
                    enode_id,
                    format!("node belongs to org {}", existing.org_id),
                ));
            }
            None => {}
        }
        changes.push(StateChange::PutNode {
            record: NodeRecord {
                enode_id: enode_id.clone(),
                org_id: org_id.clone(),
                status: NodeStatus::Active,
                restore_status: None,
            },
        });
        events.push(PermissionEvent::NodeActivated {
            org_id: org_id.clone(),
            enode_id: enode_id.clone(),
        });
    }
    Ok(Plan::committed(changes, events))
}

// ============================================================================
// SECTION: Network Planners
// ============================================================================

impl Planner<'_> {
    /// Plans flipping the network boot flag.
    pub(crate) fn complete_network_boot(&self) -> Result<Plan, PermissionError> {
        self.require_network_admin("complete network boot", "network")?;
        if self.state.network_booted {
            return Err(PermissionError::invalid_transition(
                EntityKind::Network,
                "network",
                "network is already booted",
            ));
        }
        Ok(Plan::committed(vec![StateChange::MarkNetworkBooted], vec![
            PermissionEvent::NetworkBootCompleted,
        ]))
    }

    /// Plans the caller's vote on an auth org's open operation.
    pub(crate) fn process_vote(
        &self,
        auth_org: &OrgId,
        target: &VoteTarget,
    ) -> Result<Plan, PermissionError> {
        self.vote(auth_org, target)
    }

    /// Plans cancelling an auth org's open operation.
    pub(crate) fn cancel_voting_item(
        &self,
        auth_org: &OrgId,
        target: &TargetKey,
    ) -> Result<Plan, PermissionError> {
        if !self.authority().can_administer(self.caller, auth_org) {
            return Err(PermissionError::unauthorized(
                self.caller,
                "cancel pending operation",
                auth_org,
            ));
        }
        self.cancel(auth_org, target)
    }
}
