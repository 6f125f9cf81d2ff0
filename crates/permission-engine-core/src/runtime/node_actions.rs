// crates/permission-engine-core/src/runtime/node_actions.rs
// ============================================================================
// Module: Node Action Planning
// Description: Planners for node proposals, status votes, and cancellation.
// Purpose: Combine node registry rules with authority and voting.
// Dependencies: crate::core, crate::runtime
// ============================================================================

//! ## Overview
//! Node changes are proposed by an admin of the node's org and voted on in
//! that org's slot. Votes name the operation implied by the node's current
//! pending status.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::EnodeId;
use crate::core::EntityKind;
use crate::core::NodeStatus;
use crate::core::OrgId;
use crate::core::PendingOpType;
use crate::core::PermissionError;
use crate::core::PermissionEvent;
use crate::core::StateChange;
use crate::core::TargetKey;
use crate::core::VoteTarget;
use crate::runtime::nodes::NodeRegistry;
use crate::runtime::nodes::NodeStatusAction;
use crate::runtime::nodes::pending_op_for;
use crate::runtime::orgs::OrgRegistry;
use crate::runtime::planner::Plan;
use crate::runtime::planner::Planner;

// ============================================================================
// SECTION: Node Planners
// ============================================================================

impl Planner<'_> {
    /// Plans proposing a node for an operational org.
    pub(crate) fn propose_node(
        &self,
        org_id: &OrgId,
        enode_id: &EnodeId,
    ) -> Result<Plan, PermissionError> {
        let org = OrgRegistry::new(self.state).get_operational(org_id)?;
        self.require_org_admin("propose node", org)?;
        let target = Some(TargetKey::Node(enode_id.clone()));
        if let Some(existing) = self.state.nodes.get(enode_id)
            && &existing.org_id == org_id
            && existing.status == NodeStatus::Proposed
        {
            let item =
                self.voting_item(org_id.clone(), org_id.clone(), PendingOpType::ApproveNode, target);
            return self.open_vote(Vec::new(), Vec::new(), item);
        }
        let node = NodeRegistry::new(self.state).plan_propose(org_id, enode_id)?;
        let events = vec![PermissionEvent::NodeProposed {
            org_id: org_id.clone(),
            enode_id: enode_id.clone(),
        }];
        let changes = vec![StateChange::PutNode {
            record: node,
        }];
        let item =
            self.voting_item(org_id.clone(), org_id.clone(), PendingOpType::ApproveNode, target);
        self.open_vote(changes, events, item)
    }

    /// Plans the caller's vote on a node's pending status change.
    pub(crate) fn vote_on_node(&self, enode_id: &EnodeId) -> Result<Plan, PermissionError> {
        let node = NodeRegistry::new(self.state).get_node(enode_id)?;
        let op_type = pending_op_for(node.status).ok_or_else(|| {
            PermissionError::invalid_transition(
                EntityKind::Node,
                enode_id,
                format!("node is {}, nothing to approve", node.status),
            )
        })?;
        self.vote(&node.org_id, &VoteTarget::new(op_type, TargetKey::Node(enode_id.clone())))
    }

    /// Plans proposing a node deactivation, reactivation, or blacklisting.
    pub(crate) fn propose_node_status(
        &self,
        enode_id: &EnodeId,
        action: NodeStatusAction,
    ) -> Result<Plan, PermissionError> {
        let nodes = NodeRegistry::new(self.state);
        let node = nodes.get_node(enode_id)?;
        let org = OrgRegistry::new(self.state).get_org(&node.org_id)?;
        self.require_org_admin("change node status", org)?;
        let record = nodes.plan_status_proposal(enode_id, action)?;
        let events = vec![action.proposal_event(&record)];
        let item = self.voting_item(
            node.org_id.clone(),
            node.org_id.clone(),
            action.op_type(),
            Some(TargetKey::Node(enode_id.clone())),
        );
        let changes = vec![StateChange::PutNode {
            record,
        }];
        self.open_vote(changes, events, item)
    }

    /// Plans cancelling the open vote on a node.
    pub(crate) fn cancel_node_operation(&self, enode_id: &EnodeId) -> Result<Plan, PermissionError> {
        let node = NodeRegistry::new(self.state).get_node(enode_id)?;
        let org = OrgRegistry::new(self.state).get_org(&node.org_id)?;
        self.require_org_admin("cancel pending operation", org)?;
        self.cancel(&node.org_id, &TargetKey::Node(enode_id.clone()))
    }
}
