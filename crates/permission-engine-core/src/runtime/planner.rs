// crates/permission-engine-core/src/runtime/planner.rs
// ============================================================================
// Module: Action Planner
// Description: Pure planning of facade actions into state change batches.
// Purpose: Turn an authorized request plus a snapshot into one atomic plan.
// Dependencies: crate::core, crate::runtime
// ============================================================================

//! ## Overview
//! Planning never mutates anything. Each action reads one immutable snapshot,
//! checks authority and registry rules, asks the consensus engine for a
//! decision, and returns a [`Plan`]: the ordered [`StateChange`] batch, the
//! events to publish once it commits, and the outcome reported to the caller.
//! The facade may run the same planner twice if another commit landed first.
//!
//! Action-specific planners live in `org_actions`, `node_actions`, and
//! `account_actions`; this module holds the shared voting, commit, and
//! cancellation logic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use crate::core::AccessLevel;
use crate::core::AccountAddress;
use crate::core::EntityKind;
use crate::core::NodeStatus;
use crate::core::OrgId;
use crate::core::OrgRecord;
use crate::core::OrgStatus;
use crate::core::PendingOpType;
use crate::core::PendingOperation;
use crate::core::PermissionError;
use crate::core::PermissionEvent;
use crate::core::PermissionState;
use crate::core::RoleRecord;
use crate::core::StateChange;
use crate::core::TargetKey;
use crate::core::VoteTarget;
use crate::core::VotingItem;
use crate::runtime::accounts::AccountRegistry;
use crate::runtime::authority::Authority;
use crate::runtime::consensus::CommitInstruction;
use crate::runtime::consensus::ConsensusEngine;
use crate::runtime::consensus::VoteDecision;
use crate::runtime::engine::EngineConfig;
use crate::runtime::nodes::NodeRegistry;
use crate::runtime::orgs::OrgRegistry;
use crate::runtime::roles::RoleRegistry;

// ============================================================================
// SECTION: Plans
// ============================================================================

/// Outcome reported once a plan is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PlannedOutcome {
    /// Change committed.
    Committed,
    /// Vote open after this action.
    Pending {
        /// Auth org holding the vote.
        auth_org: OrgId,
        /// Counted approvals.
        votes: usize,
        /// Valid voters.
        valid_voters: usize,
    },
    /// Vote cancelled.
    Cancelled {
        /// Auth org that held the vote.
        auth_org: OrgId,
    },
}

/// Atomic batch produced by planning one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Plan {
    /// Ordered changes; later changes to the same record win.
    pub(crate) changes: Vec<StateChange>,
    /// Events published after the batch commits.
    pub(crate) events: Vec<PermissionEvent>,
    /// Outcome reported to the caller.
    pub(crate) outcome: PlannedOutcome,
}

impl Plan {
    /// Builds a plan that commits directly without voting.
    pub(crate) const fn committed(
        changes: Vec<StateChange>,
        events: Vec<PermissionEvent>,
    ) -> Self {
        Self {
            changes,
            events,
            outcome: PlannedOutcome::Committed,
        }
    }
}

// ============================================================================
// SECTION: Planner
// ============================================================================

/// Plans actions for one caller against one snapshot.
pub(crate) struct Planner<'a> {
    /// Snapshot being planned against.
    pub(crate) state: &'a PermissionState,
    /// Engine configuration.
    pub(crate) config: &'a EngineConfig,
    /// Calling account.
    pub(crate) caller: &'a AccountAddress,
}

impl<'a> Planner<'a> {
    /// Creates a planner.
    pub(crate) const fn new(
        state: &'a PermissionState,
        config: &'a EngineConfig,
        caller: &'a AccountAddress,
    ) -> Self {
        Self {
            state,
            config,
            caller,
        }
    }

    /// Returns the privilege checker for this snapshot.
    pub(crate) const fn authority(&self) -> Authority<'a> {
        Authority::new(self.state, self.config)
    }

    /// Requires the caller to be a network admin.
    pub(crate) fn require_network_admin(
        &self,
        action: &str,
        key: impl fmt::Display,
    ) -> Result<(), PermissionError> {
        if self.authority().is_network_admin(self.caller) {
            Ok(())
        } else {
            Err(PermissionError::unauthorized(self.caller, action, key))
        }
    }

    /// Requires the caller to administer `org`.
    pub(crate) fn require_org_admin(
        &self,
        action: &str,
        org: &OrgRecord,
    ) -> Result<(), PermissionError> {
        if self.authority().can_administer(self.caller, &org.org_id) {
            Ok(())
        } else {
            Err(PermissionError::unauthorized(self.caller, action, &org.org_id))
        }
    }

    /// Returns the auth org whose voters approve changes to `org`.
    pub(crate) fn approval_slot(&self, org: &OrgRecord) -> OrgId {
        if org.is_master() {
            self.config.network_admin_org.clone()
        } else {
            org.ultimate_parent.clone()
        }
    }

    /// Builds a voting item proposed by the caller.
    pub(crate) fn voting_item(
        &self,
        auth_org: OrgId,
        org_id: OrgId,
        op_type: PendingOpType,
        target: Option<TargetKey>,
    ) -> VotingItem {
        let (enode_id, account) = match target {
            Some(TargetKey::Node(enode_id)) => (Some(enode_id), None),
            Some(TargetKey::Account(account)) => (None, Some(account)),
            Some(TargetKey::Org(_)) | None => (None, None),
        };
        VotingItem {
            auth_org,
            org_id,
            enode_id,
            account,
            op_type,
            proposer: self.caller.clone(),
        }
    }

    /// Stages changes and opens a vote on top of them.
    ///
    /// The consensus decision is taken against the snapshot with the staged
    /// changes applied, so an immediate commit sees the records it approves.
    pub(crate) fn open_vote(
        &self,
        mut changes: Vec<StateChange>,
        mut events: Vec<PermissionEvent>,
        item: VotingItem,
    ) -> Result<Plan, PermissionError> {
        let mut scratch = self.state.clone();
        scratch.apply_all(&changes);
        let decision = ConsensusEngine::new(&scratch).add_voting_item(item)?;
        let (decided_changes, decided_events, outcome) = self.resolve(&scratch, decision)?;
        changes.extend(decided_changes);
        events.extend(decided_events);
        Ok(Plan {
            changes,
            events,
            outcome,
        })
    }

    /// Records the caller's vote on the auth org's open operation.
    pub(crate) fn vote(
        &self,
        auth_org: &OrgId,
        expected: &VoteTarget,
    ) -> Result<Plan, PermissionError> {
        let decision =
            ConsensusEngine::new(self.state).process_vote(auth_org, self.caller, expected)?;
        let (changes, events, outcome) = self.resolve(self.state, decision)?;
        Ok(Plan {
            changes,
            events,
            outcome,
        })
    }

    /// Cancels the auth org's open operation if it targets `target`.
    pub(crate) fn cancel(
        &self,
        auth_org: &OrgId,
        target: &TargetKey,
    ) -> Result<Plan, PermissionError> {
        let operation = ConsensusEngine::new(self.state).cancel(auth_org, target)?;
        let (changes, events) = cancellation(self.state, &operation)?;
        Ok(Plan {
            changes,
            events,
            outcome: PlannedOutcome::Cancelled {
                auth_org: auth_org.clone(),
            },
        })
    }

    /// Converts a consensus decision into changes, events, and an outcome.
    fn resolve(
        &self,
        state: &PermissionState,
        decision: VoteDecision,
    ) -> Result<(Vec<StateChange>, Vec<PermissionEvent>, PlannedOutcome), PermissionError> {
        match decision {
            VoteDecision::Opened {
                operation,
                valid_voters,
            } => {
                let outcome = PlannedOutcome::Pending {
                    auth_org: operation.auth_org.clone(),
                    votes: 0,
                    valid_voters,
                };
                let events = vec![PermissionEvent::ItemForApproval {
                    auth_org: operation.auth_org.clone(),
                    op_type: operation.op_type,
                    target: operation.target_key(),
                }];
                Ok((
                    vec![StateChange::PutPendingOperation {
                        operation,
                    }],
                    events,
                    outcome,
                ))
            }
            VoteDecision::Recorded {
                operation,
                votes,
                valid_voters,
                newly_recorded,
            } => {
                let outcome = PlannedOutcome::Pending {
                    auth_org: operation.auth_org.clone(),
                    votes,
                    valid_voters,
                };
                if !newly_recorded {
                    return Ok((Vec::new(), Vec::new(), outcome));
                }
                let events = vec![PermissionEvent::VoteProcessed {
                    auth_org: operation.auth_org.clone(),
                    voter: self.caller.clone(),
                    op_type: operation.op_type,
                    votes,
                    valid_voters,
                }];
                Ok((
                    vec![StateChange::PutPendingOperation {
                        operation,
                    }],
                    events,
                    outcome,
                ))
            }
            VoteDecision::Commit {
                auth_org,
                instruction,
                slot_open,
                votes,
                valid_voters,
            } => {
                let mut changes = Vec::new();
                let mut events = Vec::new();
                if slot_open {
                    if let Some(operation) = state.pending.get(&auth_org) {
                        events.push(PermissionEvent::VoteProcessed {
                            auth_org: auth_org.clone(),
                            voter: self.caller.clone(),
                            op_type: operation.op_type,
                            votes,
                            valid_voters,
                        });
                    }
                    changes.push(StateChange::ClearPendingOperation {
                        auth_org,
                    });
                }
                let (commit_changes, commit_events) = commit(state, self.config, &instruction)?;
                changes.extend(commit_changes);
                events.extend(commit_events);
                Ok((changes, events, PlannedOutcome::Committed))
            }
            VoteDecision::Cancelled {
                operation,
            } => {
                let auth_org = operation.auth_org.clone();
                let (changes, events) = cancellation(state, &operation)?;
                Ok((changes, events, PlannedOutcome::Cancelled {
                    auth_org,
                }))
            }
        }
    }
}

// ============================================================================
// SECTION: Commit
// ============================================================================

/// Builds the registry changes for a committed instruction.
pub(crate) fn commit(
    state: &PermissionState,
    config: &EngineConfig,
    instruction: &CommitInstruction,
) -> Result<(Vec<StateChange>, Vec<PermissionEvent>), PermissionError> {
    let mut changes = Vec::new();
    let mut events = Vec::new();
    match instruction {
        CommitInstruction::ApproveOrg {
            org_id,
        } => {
            let org = OrgRegistry::new(state).plan_approve(org_id)?;
            let mut admin_role = RoleRegistry::new(state).admin_role(org_id).cloned();
            if org.is_master() && admin_role.is_none() {
                let role = RoleRecord {
                    role_id: config.org_admin_role.clone(),
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
                    record: role.clone(),
                });
                admin_role = Some(role);
            }
            changes.push(StateChange::PutOrg {
                record: org,
            });
            events.push(PermissionEvent::OrgApproved {
                org_id: org_id.clone(),
            });
            for node in state
                .nodes
                .values()
                .filter(|node| &node.org_id == org_id && node.status == NodeStatus::Proposed)
            {
                changes.push(StateChange::PutNode {
                    record: NodeRegistry::with_status(node, NodeStatus::Active),
                });
                events.push(PermissionEvent::NodeActivated {
                    org_id: org_id.clone(),
                    enode_id: node.enode_id.clone(),
                });
            }
            if let Some(role) = admin_role {
                for account in state
                    .accounts
                    .values()
                    .filter(|account| &account.org_id == org_id && account.pending_approval())
                {
                    changes.push(StateChange::PutAccount {
                        record: AccountRegistry::approved_admin(account, &role),
                    });
                    events.push(PermissionEvent::OrgAdminApproved {
                        org_id: org_id.clone(),
                        account: account.address.clone(),
                    });
                }
            }
        }
        CommitInstruction::ApplyOrgStatus {
            org_id,
            status,
        } => {
            let org = OrgRegistry::new(state).get_org(org_id)?;
            changes.push(StateChange::PutOrg {
                record: OrgRegistry::with_status(org, *status),
            });
            events.push(match status {
                OrgStatus::Suspended => PermissionEvent::OrgSuspended {
                    org_id: org_id.clone(),
                },
                OrgStatus::SuspensionRevoked => PermissionEvent::OrgSuspensionRevoked {
                    org_id: org_id.clone(),
                },
                OrgStatus::Proposed | OrgStatus::Approved => {
                    return Err(PermissionError::invalid_transition(
                        EntityKind::Org,
                        org_id,
                        format!("{status} is not a voted status update"),
                    ));
                }
            });
        }
        CommitInstruction::ApplyNodeStatus {
            enode_id,
            status,
        } => {
            let node = NodeRegistry::new(state).get_node(enode_id)?;
            let org_id = node.org_id.clone();
            let enode_id = enode_id.clone();
            events.push(match status {
                NodeStatus::Active => PermissionEvent::NodeActivated {
                    org_id,
                    enode_id,
                },
                NodeStatus::Deactivated => PermissionEvent::NodeDeactivated {
                    org_id,
                    enode_id,
                },
                NodeStatus::Blacklisted => PermissionEvent::NodeBlacklisted {
                    org_id,
                    enode_id,
                },
                NodeStatus::Proposed
                | NodeStatus::PendingDeactivation
                | NodeStatus::PendingActivation
                | NodeStatus::PendingBlacklist => {
                    return Err(PermissionError::invalid_transition(
                        EntityKind::Node,
                        &node.enode_id,
                        format!("{status} is not a committed node status"),
                    ));
                }
            });
            changes.push(StateChange::PutNode {
                record: NodeRegistry::with_status(node, *status),
            });
        }
        CommitInstruction::ApproveOrgAdmin {
            org_id,
            account,
        } => {
            let record = AccountRegistry::new(state).get_account_details(account)?;
            let roles = RoleRegistry::new(state);
            let role = record
                .pending_role_id
                .as_ref()
                .and_then(|role_id| roles.resolve(org_id, role_id))
                .filter(|role| role.is_admin)
                .or_else(|| roles.admin_role(org_id))
                .ok_or_else(|| {
                    PermissionError::not_found(EntityKind::Role, format!("{org_id}/admin"))
                })?;
            changes.push(StateChange::PutAccount {
                record: AccountRegistry::approved_admin(record, role),
            });
            events.push(PermissionEvent::OrgAdminApproved {
                org_id: org_id.clone(),
                account: account.clone(),
            });
        }
    }
    Ok((changes, events))
}

// ============================================================================
// SECTION: Cancellation
// ============================================================================

/// Builds the changes that close a vote without committing it.
pub(crate) fn cancellation(
    state: &PermissionState,
    operation: &PendingOperation,
) -> Result<(Vec<StateChange>, Vec<PermissionEvent>), PermissionError> {
    let mut changes = vec![StateChange::ClearPendingOperation {
        auth_org: operation.auth_org.clone(),
    }];
    let mut events = Vec::new();
    match operation.target_key() {
        TargetKey::Node(enode_id) => {
            let node = NodeRegistry::new(state).get_node(&enode_id)?;
            if let Some(restored) = NodeRegistry::restored(node) {
                events.push(PermissionEvent::NodeStatusRestored {
                    org_id: restored.org_id.clone(),
                    enode_id,
                    status: restored.status,
                });
                changes.push(StateChange::PutNode {
                    record: restored,
                });
            }
        }
        TargetKey::Org(org_id) => {
            let org = OrgRegistry::new(state).get_org(&org_id)?;
            if org.pending_status.is_some() {
                let mut record = org.clone();
                record.pending_status = None;
                changes.push(StateChange::PutOrg {
                    record,
                });
            }
        }
        TargetKey::Account(address) => {
            let account = AccountRegistry::new(state).get_account_details(&address)?;
            if account.pending_approval() {
                let mut record = account.clone();
                record.pending_role_id = None;
                changes.push(StateChange::PutAccount {
                    record,
                });
            }
        }
    }
    events.push(PermissionEvent::PendingOperationCancelled {
        auth_org: operation.auth_org.clone(),
        op_type: operation.op_type,
        target: operation.target_key(),
    });
    Ok((changes, events))
}
