// crates/permission-engine-core/src/runtime/org_actions.rs
// ============================================================================
// Module: Org Action Planning
// Description: Planners for org proposals, approvals, and status updates.
// Purpose: Combine org registry rules with authority and voting.
// Dependencies: crate::core, crate::runtime
// ============================================================================

//! ## Overview
//! Master orgs are proposed by network admins and approved by the network
//! admin org's voters. Sub-orgs are proposed by an admin of the parent tree
//! and approved by the ultimate parent's voters. A proposal left `Proposed`
//! by a cancelled vote may be proposed again, which reopens the vote.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AccountAddress;
use crate::core::EnodeId;
use crate::core::EntityKind;
use crate::core::OrgId;
use crate::core::OrgStatus;
use crate::core::PendingOpType;
use crate::core::PermissionError;
use crate::core::PermissionEvent;
use crate::core::StateChange;
use crate::core::TargetKey;
use crate::core::VoteTarget;
use crate::runtime::accounts::AccountRegistry;
use crate::runtime::nodes::NodeRegistry;
use crate::runtime::orgs::OrgRegistry;
use crate::runtime::orgs::OrgStatusAction;
use crate::runtime::planner::Plan;
use crate::runtime::planner::Planner;

// ============================================================================
// SECTION: Org Planners
// ============================================================================

impl Planner<'_> {
    /// Plans proposing a master org with its first node and admin account.
    pub(crate) fn add_org(
        &self,
        org_id: &OrgId,
        enode_id: &EnodeId,
        admin: &AccountAddress,
    ) -> Result<Plan, PermissionError> {
        self.require_network_admin("add org", org_id)?;
        let network_admin_org = self.config.network_admin_org.clone();
        if let Some(existing) = self.state.orgs.get(org_id)
            && existing.status == OrgStatus::Proposed
        {
            let item =
                self.voting_item(network_admin_org, org_id.clone(), PendingOpType::AddOrg, None);
            return self.open_vote(Vec::new(), Vec::new(), item);
        }
        let org = OrgRegistry::new(self.state).plan_add_org(org_id)?;
        let node = NodeRegistry::new(self.state).plan_propose(org_id, enode_id)?;
        let account = AccountRegistry::new(self.state).plan_propose_admin(
            admin,
            org_id,
            &self.config.org_admin_role,
        )?;
        let events = vec![
            PermissionEvent::OrgProposed {
                org_id: org_id.clone(),
                parent_org_id: None,
            },
            PermissionEvent::NodeProposed {
                org_id: org_id.clone(),
                enode_id: enode_id.clone(),
            },
            PermissionEvent::OrgAdminProposed {
                org_id: org_id.clone(),
                account: admin.clone(),
            },
        ];
        let changes = vec![
            StateChange::PutOrg {
                record: org,
            },
            StateChange::PutNode {
                record: node,
            },
            StateChange::PutAccount {
                record: account,
            },
        ];
        let item = self.voting_item(network_admin_org, org_id.clone(), PendingOpType::AddOrg, None);
        self.open_vote(changes, events, item)
    }

    /// Plans proposing a sub-org beneath an operational parent.
    pub(crate) fn add_sub_org(
        &self,
        parent_id: &OrgId,
        segment: &str,
        enode_id: Option<&EnodeId>,
    ) -> Result<Plan, PermissionError> {
        let orgs = OrgRegistry::new(self.state);
        let parent = orgs.get_operational(parent_id)?;
        self.require_org_admin("add sub-org", parent)?;
        let auth_org = parent.ultimate_parent.clone();
        let child_id = parent_id.child(segment)?;
        if let Some(existing) = self.state.orgs.get(&child_id)
            && existing.status == OrgStatus::Proposed
        {
            let item = self.voting_item(auth_org, child_id, PendingOpType::AddSubOrg, None);
            return self.open_vote(Vec::new(), Vec::new(), item);
        }
        let (child, updated_parent) =
            orgs.plan_add_sub_org(parent_id, segment, self.config.sub_org_limits)?;
        let mut changes = vec![
            StateChange::PutOrg {
                record: child,
            },
            StateChange::PutOrg {
                record: updated_parent,
            },
        ];
        let mut events = vec![PermissionEvent::OrgProposed {
            org_id: child_id.clone(),
            parent_org_id: Some(parent_id.clone()),
        }];
        if let Some(enode_id) = enode_id {
            let node = NodeRegistry::new(self.state).plan_propose(&child_id, enode_id)?;
            changes.push(StateChange::PutNode {
                record: node,
            });
            events.push(PermissionEvent::NodeProposed {
                org_id: child_id.clone(),
                enode_id: enode_id.clone(),
            });
        }
        let item = self.voting_item(auth_org, child_id, PendingOpType::AddSubOrg, None);
        self.open_vote(changes, events, item)
    }

    /// Plans the caller's approval vote for a proposed org or sub-org.
    pub(crate) fn approve_org(&self, org_id: &OrgId) -> Result<Plan, PermissionError> {
        let org = OrgRegistry::new(self.state).get_org(org_id)?;
        if org.status != OrgStatus::Proposed {
            return Err(PermissionError::invalid_transition(
                EntityKind::Org,
                org_id,
                format!("org is {}, not proposed", org.status),
            ));
        }
        let op_type =
            if org.is_master() { PendingOpType::AddOrg } else { PendingOpType::AddSubOrg };
        let auth_org = self.approval_slot(org);
        self.vote(&auth_org, &VoteTarget::new(op_type, TargetKey::Org(org_id.clone())))
    }

    /// Plans the proposal phase of an org status update.
    pub(crate) fn update_org_status(
        &self,
        org_id: &OrgId,
        action: OrgStatusAction,
    ) -> Result<Plan, PermissionError> {
        self.require_network_admin("update org status", org_id)?;
        if org_id == &self.config.network_admin_org {
            return Err(PermissionError::invalid_transition(
                EntityKind::Org,
                org_id,
                "network admin org status is fixed",
            ));
        }
        let record = OrgRegistry::new(self.state).plan_status_proposal(org_id, action)?;
        let events = vec![PermissionEvent::OrgStatusUpdateProposed {
            org_id: org_id.clone(),
            status: action.target_status(),
        }];
        let changes = vec![StateChange::PutOrg {
            record,
        }];
        let item = self.voting_item(
            self.config.network_admin_org.clone(),
            org_id.clone(),
            action.op_type(),
            None,
        );
        self.open_vote(changes, events, item)
    }

    /// Plans the caller's approval vote for a pending org status update.
    pub(crate) fn approve_org_status_update(
        &self,
        org_id: &OrgId,
        action: OrgStatusAction,
    ) -> Result<Plan, PermissionError> {
        let org = OrgRegistry::new(self.state).get_org(org_id)?;
        if org.pending_status != Some(action.target_status()) {
            return Err(PermissionError::invalid_transition(
                EntityKind::Org,
                org_id,
                format!("no pending update to {}", action.target_status()),
            ));
        }
        self.vote(
            &self.config.network_admin_org,
            &VoteTarget::new(action.op_type(), TargetKey::Org(org_id.clone())),
        )
    }
}
