// crates/permission-engine-core/src/core/pending.rs
// ============================================================================
// Module: Pending Operations
// Description: Voting items, pending-operation slots, and their target keys.
// Purpose: Describe the single open vote each auth org may hold.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Each auth org owns at most one [`PendingOperation`]. The operation records
//! what is being voted on (its [`PendingOpType`] and target) and which voters
//! have approved it so far. Vote tallies are recomputed against the live voter
//! set on every vote, so the stored set holds raw approvals only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AccountAddress;
use crate::core::identifiers::EnodeId;
use crate::core::identifiers::OrgId;

// ============================================================================
// SECTION: Operation Types
// ============================================================================

/// Kind of change awaiting votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingOpType {
    /// Approve a proposed master org.
    AddOrg,
    /// Approve a proposed sub-org.
    AddSubOrg,
    /// Suspend an org.
    SuspendOrg,
    /// Lift an org suspension.
    RevokeOrgSuspension,
    /// Approve a proposed node.
    ApproveNode,
    /// Deactivate an active node.
    DeactivateNode,
    /// Reactivate a deactivated node.
    ActivateNode,
    /// Blacklist a node.
    BlacklistNode,
    /// Grant org-admin privileges to an account.
    AssignOrgAdmin,
}

impl PendingOpType {
    /// Returns true when the proposer may not approve their own proposal.
    #[must_use]
    pub const fn forbids_self_approval(self) -> bool {
        matches!(self, Self::SuspendOrg | Self::RevokeOrgSuspension | Self::AssignOrgAdmin)
    }

    /// Returns the stable label for this operation type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddOrg => "add_org",
            Self::AddSubOrg => "add_sub_org",
            Self::SuspendOrg => "suspend_org",
            Self::RevokeOrgSuspension => "revoke_org_suspension",
            Self::ApproveNode => "approve_node",
            Self::DeactivateNode => "deactivate_node",
            Self::ActivateNode => "activate_node",
            Self::BlacklistNode => "blacklist_node",
            Self::AssignOrgAdmin => "assign_org_admin",
        }
    }
}

impl fmt::Display for PendingOpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Target Keys
// ============================================================================

/// Entity a pending operation acts on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum TargetKey {
    /// An org.
    Org(OrgId),
    /// A node.
    Node(EnodeId),
    /// An account.
    Account(AccountAddress),
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Org(org_id) => write!(f, "org:{org_id}"),
            Self::Node(enode_id) => write!(f, "node:{enode_id}"),
            Self::Account(address) => write!(f, "account:{address}"),
        }
    }
}

/// What a voter believes they are voting on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTarget {
    /// Expected operation type.
    pub op_type: PendingOpType,
    /// Expected target.
    pub target: TargetKey,
}

impl VoteTarget {
    /// Builds a vote target.
    #[must_use]
    pub const fn new(op_type: PendingOpType, target: TargetKey) -> Self {
        Self { op_type, target }
    }
}

// ============================================================================
// SECTION: Voting Items
// ============================================================================

/// Proposal submitted for voting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingItem {
    /// Org whose voters decide.
    pub auth_org: OrgId,
    /// Org the operation concerns.
    pub org_id: OrgId,
    /// Node the operation concerns, for node operations.
    pub enode_id: Option<EnodeId>,
    /// Account the operation concerns, for admin assignment.
    pub account: Option<AccountAddress>,
    /// Operation type.
    pub op_type: PendingOpType,
    /// Account that proposed the operation.
    pub proposer: AccountAddress,
}

/// Open vote held in an auth org's slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOperation {
    /// Org whose voters decide.
    pub auth_org: OrgId,
    /// Org the operation concerns.
    pub org_id: OrgId,
    /// Node the operation concerns, for node operations.
    pub enode_id: Option<EnodeId>,
    /// Account the operation concerns, for admin assignment.
    pub account: Option<AccountAddress>,
    /// Operation type.
    pub op_type: PendingOpType,
    /// Account that proposed the operation.
    pub proposer: AccountAddress,
    /// Voters who approved, regardless of their current eligibility.
    pub votes: BTreeSet<AccountAddress>,
}

impl PendingOperation {
    /// Opens a slot for a voting item with no votes yet.
    #[must_use]
    pub fn open(item: VotingItem) -> Self {
        Self {
            auth_org: item.auth_org,
            org_id: item.org_id,
            enode_id: item.enode_id,
            account: item.account,
            op_type: item.op_type,
            proposer: item.proposer,
            votes: BTreeSet::new(),
        }
    }

    /// Returns the entity this operation acts on.
    #[must_use]
    pub fn target_key(&self) -> TargetKey {
        match (self.op_type, &self.enode_id, &self.account) {
            (
                PendingOpType::ApproveNode
                | PendingOpType::DeactivateNode
                | PendingOpType::ActivateNode
                | PendingOpType::BlacklistNode,
                Some(enode_id),
                _,
            ) => TargetKey::Node(enode_id.clone()),
            (PendingOpType::AssignOrgAdmin, _, Some(account)) => TargetKey::Account(account.clone()),
            _ => TargetKey::Org(self.org_id.clone()),
        }
    }

    /// Returns the vote target voters must name to approve this operation.
    #[must_use]
    pub fn vote_target(&self) -> VoteTarget {
        VoteTarget::new(self.op_type, self.target_key())
    }
}
