// crates/permission-engine-core/src/runtime/consensus.rs
// ============================================================================
// Module: Consensus Engine
// Description: Pending-operation voting with strict-majority commit.
// Purpose: Decide when a proposal commits without mutating any registry.
// Dependencies: crate::core, crate::runtime::voters
// ============================================================================

//! ## Overview
//! The consensus engine owns the pending-operation slots: it opens votes,
//! records approvals, and cancels. It never touches orgs, nodes, or accounts.
//! When a vote reaches a strict majority of the *current* valid voters it
//! returns a [`CommitInstruction`] and the facade applies the matching
//! registry change in the same atomic batch that clears the slot.
//!
//! Invariants:
//! - At most one pending operation per auth org.
//! - A voter counts once per operation; repeated votes change nothing.
//! - Only votes of currently valid voters are counted, so the threshold
//!   tracks voter churn while the vote is open.
//! - With zero valid voters, or before network boot, proposals commit
//!   immediately.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AccountAddress;
use crate::core::EntityKind;
use crate::core::EnodeId;
use crate::core::NodeStatus;
use crate::core::OrgId;
use crate::core::OrgStatus;
use crate::core::PendingOpType;
use crate::core::PendingOperation;
use crate::core::PermissionError;
use crate::core::PermissionState;
use crate::core::TargetKey;
use crate::core::VoteTarget;
use crate::core::VotingItem;
use crate::runtime::voters::VoterRegistry;

// ============================================================================
// SECTION: Threshold
// ============================================================================

/// Returns true when `votes` is a strict majority of `valid_voters`.
///
/// Zero valid voters always meets the threshold.
#[must_use]
pub const fn threshold_met(votes: usize, valid_voters: usize) -> bool {
    valid_voters == 0 || votes.saturating_mul(2) > valid_voters
}

// ============================================================================
// SECTION: Decisions
// ============================================================================

/// Registry change to apply when a vote commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitInstruction {
    /// Approve a proposed org or sub-org.
    ApproveOrg {
        /// Org to approve.
        org_id: OrgId,
    },
    /// Apply a pending org status.
    ApplyOrgStatus {
        /// Target org.
        org_id: OrgId,
        /// Status to apply.
        status: OrgStatus,
    },
    /// Apply a node status.
    ApplyNodeStatus {
        /// Target node.
        enode_id: EnodeId,
        /// Status to apply.
        status: NodeStatus,
    },
    /// Grant org-admin privileges.
    ApproveOrgAdmin {
        /// Target org.
        org_id: OrgId,
        /// Account being granted.
        account: AccountAddress,
    },
}

impl CommitInstruction {
    /// Derives the instruction for a pending operation.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::InvalidInput`] when a node or admin
    /// operation is missing its enode id or account.
    pub fn for_operation(operation: &PendingOperation) -> Result<Self, PermissionError> {
        let node_status = |status: NodeStatus| {
            operation
                .enode_id
                .clone()
                .map(|enode_id| Self::ApplyNodeStatus { enode_id, status })
                .ok_or_else(|| {
                    PermissionError::InvalidInput(format!(
                        "{} operation in {} has no enode id",
                        operation.op_type, operation.auth_org
                    ))
                })
        };
        match operation.op_type {
            PendingOpType::AddOrg | PendingOpType::AddSubOrg => Ok(Self::ApproveOrg {
                org_id: operation.org_id.clone(),
            }),
            PendingOpType::SuspendOrg => Ok(Self::ApplyOrgStatus {
                org_id: operation.org_id.clone(),
                status: OrgStatus::Suspended,
            }),
            PendingOpType::RevokeOrgSuspension => Ok(Self::ApplyOrgStatus {
                org_id: operation.org_id.clone(),
                status: OrgStatus::SuspensionRevoked,
            }),
            PendingOpType::ApproveNode | PendingOpType::ActivateNode => {
                node_status(NodeStatus::Active)
            }
            PendingOpType::DeactivateNode => node_status(NodeStatus::Deactivated),
            PendingOpType::BlacklistNode => node_status(NodeStatus::Blacklisted),
            PendingOpType::AssignOrgAdmin => operation
                .account
                .clone()
                .map(|account| Self::ApproveOrgAdmin {
                    org_id: operation.org_id.clone(),
                    account,
                })
                .ok_or_else(|| {
                    PermissionError::InvalidInput(format!(
                        "admin assignment in {} has no account",
                        operation.auth_org
                    ))
                }),
        }
    }
}

/// Result of a consensus step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteDecision {
    /// Vote opened; the slot must be stored.
    Opened {
        /// Newly opened operation.
        operation: PendingOperation,
        /// Valid voters at opening time.
        valid_voters: usize,
    },
    /// Vote processed without reaching the threshold.
    Recorded {
        /// Operation with the vote applied.
        operation: PendingOperation,
        /// Counted approvals.
        votes: usize,
        /// Valid voters.
        valid_voters: usize,
        /// False when the voter had already voted.
        newly_recorded: bool,
    },
    /// Threshold met; apply the instruction and clear the slot.
    Commit {
        /// Auth org whose slot commits.
        auth_org: OrgId,
        /// Change to apply.
        instruction: CommitInstruction,
        /// False when the proposal committed without opening a slot.
        slot_open: bool,
        /// Counted approvals.
        votes: usize,
        /// Valid voters.
        valid_voters: usize,
    },
    /// Vote cancelled; restore the target and clear the slot.
    Cancelled {
        /// Cancelled operation.
        operation: PendingOperation,
    },
}

// ============================================================================
// SECTION: Consensus Engine
// ============================================================================

/// Consensus decisions over a state snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ConsensusEngine<'a> {
    /// Snapshot being read.
    state: &'a PermissionState,
}

impl<'a> ConsensusEngine<'a> {
    /// Creates an engine over a snapshot.
    #[must_use]
    pub const fn new(state: &'a PermissionState) -> Self {
        Self { state }
    }

    /// Returns the open operation of an auth org.
    #[must_use]
    pub fn pending_operation(&self, auth_org: &OrgId) -> Option<&'a PendingOperation> {
        self.state.pending.get(auth_org)
    }

    /// Returns the number of valid voters of an auth org.
    #[must_use]
    pub fn number_of_valid_voters(&self, auth_org: &OrgId) -> usize {
        VoterRegistry::new(self.state).number_of_valid_voters(auth_org)
    }

    /// Opens a vote, or commits immediately before boot or with no voters.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::PendingOperationExists`] when the auth org
    /// already holds an open vote.
    pub fn add_voting_item(&self, item: VotingItem) -> Result<VoteDecision, PermissionError> {
        if self.state.pending.contains_key(&item.auth_org) {
            return Err(PermissionError::PendingOperationExists {
                org_id: item.auth_org.to_string(),
            });
        }
        let valid_voters = self.number_of_valid_voters(&item.auth_org);
        let operation = PendingOperation::open(item);
        if !self.state.network_booted || valid_voters == 0 {
            return Ok(VoteDecision::Commit {
                auth_org: operation.auth_org.clone(),
                instruction: CommitInstruction::for_operation(&operation)?,
                slot_open: false,
                votes: 0,
                valid_voters,
            });
        }
        Ok(VoteDecision::Opened {
            operation,
            valid_voters,
        })
    }

    /// Records a vote on the auth org's open operation.
    ///
    /// A vote on the open target that names a different operation type
    /// cancels the open operation.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotAValidVoter`] when the voter is not
    /// currently eligible, [`PermissionError::NoPendingOperation`] when no
    /// vote is open, [`PermissionError::InvalidStateTransition`] when the
    /// vote names another target, and [`PermissionError::Unauthorized`] for
    /// self-approval.
    pub fn process_vote(
        &self,
        auth_org: &OrgId,
        voter: &AccountAddress,
        expected: &VoteTarget,
    ) -> Result<VoteDecision, PermissionError> {
        let voters = VoterRegistry::new(self.state).valid_voters(auth_org);
        if !voters.contains(voter) {
            return Err(PermissionError::NotAValidVoter {
                org_id: auth_org.to_string(),
                account: voter.to_string(),
            });
        }
        let pending = self.pending_operation(auth_org).ok_or_else(|| {
            PermissionError::NoPendingOperation {
                org_id: auth_org.to_string(),
            }
        })?;
        let target = pending.target_key();
        if target != expected.target {
            return Err(PermissionError::invalid_transition(
                EntityKind::PendingOperation,
                auth_org,
                format!("open vote targets {target}, not {}", expected.target),
            ));
        }
        if pending.op_type != expected.op_type {
            return Ok(VoteDecision::Cancelled {
                operation: pending.clone(),
            });
        }
        let self_approval = (pending.op_type.forbids_self_approval() && &pending.proposer == voter)
            || matches!(&target, TargetKey::Account(account) if account == voter);
        if self_approval {
            return Err(PermissionError::unauthorized(voter, "approve own proposal", target));
        }
        let mut operation = pending.clone();
        let newly_recorded = operation.votes.insert(voter.clone());
        let votes = operation.votes.intersection(&voters).count();
        let valid_voters = voters.len();
        if threshold_met(votes, valid_voters) {
            return Ok(VoteDecision::Commit {
                auth_org: auth_org.clone(),
                instruction: CommitInstruction::for_operation(&operation)?,
                slot_open: true,
                votes,
                valid_voters,
            });
        }
        Ok(VoteDecision::Recorded {
            operation,
            votes,
            valid_voters,
            newly_recorded,
        })
    }

    /// Cancels the auth org's open operation if it targets `target`.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NoPendingOperation`] when no vote is open
    /// and [`PermissionError::InvalidStateTransition`] when it targets
    /// something else.
    pub fn cancel(
        &self,
        auth_org: &OrgId,
        target: &TargetKey,
    ) -> Result<PendingOperation, PermissionError> {
        let pending = self.pending_operation(auth_org).ok_or_else(|| {
            PermissionError::NoPendingOperation {
                org_id: auth_org.to_string(),
            }
        })?;
        let open_target = pending.target_key();
        if &open_target != target {
            return Err(PermissionError::invalid_transition(
                EntityKind::PendingOperation,
                auth_org,
                format!("open vote targets {open_target}, not {target}"),
            ));
        }
        Ok(pending.clone())
    }
}
