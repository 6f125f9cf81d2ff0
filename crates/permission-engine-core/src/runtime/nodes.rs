// crates/permission-engine-core/src/runtime/nodes.rs
// ============================================================================
// Module: Node Registry
// Description: Node lookups and node lifecycle planning.
// Purpose: Enforce the node status machine for proposals, commits, and cancels.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Node lifecycle:
//!
//! ```text
//! Proposed --approve--> Active
//! Active --deactivate--> PendingDeactivation --vote--> Deactivated
//! Deactivated --activate--> PendingActivation --vote--> Active
//! Active|Deactivated --blacklist--> PendingBlacklist --vote--> Blacklisted
//! ```
//!
//! Every pending status remembers the stable status it left so a cancelled
//! vote can put the node back. Blacklisted is terminal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::btree_map::Values;

use serde::Deserialize;
use serde::Serialize;

use crate::core::EnodeId;
use crate::core::EntityKind;
use crate::core::NodeRecord;
use crate::core::NodeStatus;
use crate::core::OrgId;
use crate::core::PendingOpType;
use crate::core::PermissionError;
use crate::core::PermissionEvent;
use crate::core::PermissionState;

// ============================================================================
// SECTION: Status Actions
// ============================================================================

/// Requested node status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatusAction {
    /// Active -> Deactivated.
    Deactivate,
    /// Deactivated -> Active.
    Activate,
    /// Active or Deactivated -> Blacklisted.
    Blacklist,
}

impl NodeStatusAction {
    /// Returns the pending status recorded while the vote is open.
    #[must_use]
    pub const fn pending_status(self) -> NodeStatus {
        match self {
            Self::Deactivate => NodeStatus::PendingDeactivation,
            Self::Activate => NodeStatus::PendingActivation,
            Self::Blacklist => NodeStatus::PendingBlacklist,
        }
    }

    /// Returns the pending operation type voted on for this action.
    #[must_use]
    pub const fn op_type(self) -> PendingOpType {
        match self {
            Self::Deactivate => PendingOpType::DeactivateNode,
            Self::Activate => PendingOpType::ActivateNode,
            Self::Blacklist => PendingOpType::BlacklistNode,
        }
    }

    /// Returns true when the action may start from `status`.
    const fn applies_to(self, status: NodeStatus) -> bool {
        match self {
            Self::Deactivate => matches!(status, NodeStatus::Active),
            Self::Activate => matches!(status, NodeStatus::Deactivated),
            Self::Blacklist => matches!(status, NodeStatus::Active | NodeStatus::Deactivated),
        }
    }

    /// Builds the proposal event for a node.
    #[must_use]
    pub fn proposal_event(self, node: &NodeRecord) -> PermissionEvent {
        let org_id = node.org_id.clone();
        let enode_id = node.enode_id.clone();
        match self {
            Self::Deactivate => PermissionEvent::NodeDeactivationProposed { org_id, enode_id },
            Self::Activate => PermissionEvent::NodeActivationProposed { org_id, enode_id },
            Self::Blacklist => PermissionEvent::NodeBlacklistProposed { org_id, enode_id },
        }
    }
}

/// Returns the operation type that approves a node's current pending status.
#[must_use]
pub const fn pending_op_for(status: NodeStatus) -> Option<PendingOpType> {
    match status {
        NodeStatus::Proposed => Some(PendingOpType::ApproveNode),
        NodeStatus::PendingDeactivation => Some(PendingOpType::DeactivateNode),
        NodeStatus::PendingActivation => Some(PendingOpType::ActivateNode),
        NodeStatus::PendingBlacklist => Some(PendingOpType::BlacklistNode),
        NodeStatus::Active | NodeStatus::Deactivated | NodeStatus::Blacklisted => None,
    }
}

// ============================================================================
// SECTION: Node Registry
// ============================================================================

/// Read view over the nodes in a state snapshot.
#[derive(Debug, Clone, Copy)]
pub struct NodeRegistry<'a> {
    /// Snapshot being read.
    state: &'a PermissionState,
}

impl<'a> NodeRegistry<'a> {
    /// Creates a view over a snapshot.
    #[must_use]
    pub const fn new(state: &'a PermissionState) -> Self {
        Self { state }
    }

    /// Returns a node record.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotFound`] for unknown nodes.
    pub fn get_node(&self, enode_id: &EnodeId) -> Result<&'a NodeRecord, PermissionError> {
        self.state
            .nodes
            .get(enode_id)
            .ok_or_else(|| PermissionError::not_found(EntityKind::Node, enode_id))
    }

    /// Iterates over every node.
    pub fn list(&self) -> Values<'a, EnodeId, NodeRecord> {
        self.state.nodes.values()
    }

    /// Plans proposing a new node for an org.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::AlreadyExists`] when the enode is registered.
    pub fn plan_propose(
        &self,
        org_id: &OrgId,
        enode_id: &EnodeId,
    ) -> Result<NodeRecord, PermissionError> {
        if self.state.nodes.contains_key(enode_id) {
            return Err(PermissionError::already_exists(EntityKind::Node, enode_id));
        }
        Ok(NodeRecord::proposed(enode_id.clone(), org_id.clone()))
    }

    /// Plans the proposal phase of a node status change.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotFound`] for unknown nodes and
    /// [`PermissionError::InvalidStateTransition`] when the node is
    /// blacklisted, already pending, or in a status the action does not
    /// apply to.
    pub fn plan_status_proposal(
        &self,
        enode_id: &EnodeId,
        action: NodeStatusAction,
    ) -> Result<NodeRecord, PermissionError> {
        let node = self.get_node(enode_id)?;
        if node.status.is_terminal() {
            return Err(PermissionError::invalid_transition(
                EntityKind::Node,
                enode_id,
                "node is blacklisted",
            ));
        }
        if node.status.is_pending() {
            return Err(PermissionError::invalid_transition(
                EntityKind::Node,
                enode_id,
                format!("node is {}", node.status),
            ));
        }
        if !action.applies_to(node.status) {
            return Err(PermissionError::invalid_transition(
                EntityKind::Node,
                enode_id,
                format!("cannot move from {} to {}", node.status, action.pending_status()),
            ));
        }
        let mut record = node.clone();
        record.restore_status = Some(node.status);
        record.status = action.pending_status();
        Ok(record)
    }

    /// Returns the node with a committed status applied.
    #[must_use]
    pub fn with_status(node: &NodeRecord, status: NodeStatus) -> NodeRecord {
        let mut record = node.clone();
        record.status = status;
        record.restore_status = None;
        record
    }

    /// Returns the node restored to the stable status it left, if any.
    #[must_use]
    pub fn restored(node: &NodeRecord) -> Option<NodeRecord> {
        node.restore_status.map(|status| Self::with_status(node, status))
    }
}
