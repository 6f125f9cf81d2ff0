// crates/permission-engine-core/src/runtime/engine.rs
// ============================================================================
// Module: Permission Engine
// Description: Facade that authorizes, plans, commits, and publishes actions.
// Purpose: Single entry point for every permissioning operation and read.
// Dependencies: crate::core, crate::interfaces, crate::runtime, serde
// ============================================================================

//! ## Overview
//! [`PermissionEngine`] owns the current permission snapshot and drives each
//! action through one pipeline:
//!
//! 1. lock the action's auth-org slot and plan against the latest snapshot;
//! 2. take the commit lock, re-plan if another commit landed meanwhile;
//! 3. apply the batch to a copy, verify invariants, and write it to the
//!    ledger with bounded retries for transport errors;
//! 4. swap the snapshot and publish the events.
//!
//! Readers clone the snapshot `Arc` and never observe a half-applied batch.
//! A rejected action changes nothing and is audited with its error kind.
//!
//! Security posture: callers are identified only by the [`AuthContext`] they
//! pass in; authenticating that caller is the embedding application's job.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;
use std::thread;
use std::time::Duration;

use serde::Serialize;

use crate::core::AccessLevel;
use crate::core::AccountAddress;
use crate::core::AccountRecord;
use crate::core::EnodeId;
use crate::core::EntityKind;
use crate::core::NodeRecord;
use crate::core::OrgId;
use crate::core::OrgRecord;
use crate::core::OrgStatus;
use crate::core::PendingOperation;
use crate::core::PermissionError;
use crate::core::PermissionEvent;
use crate::core::PermissionState;
use crate::core::RoleId;
use crate::core::RoleRecord;
use crate::core::TargetKey;
use crate::core::TransactionKind;
use crate::core::VoteTarget;
use crate::interfaces::EventSink;
use crate::interfaces::Ledger;
use crate::interfaces::LedgerError;
use crate::interfaces::LedgerMutation;
use crate::interfaces::LedgerQuery;
use crate::runtime::access::AccessControl;
use crate::runtime::accounts::AccountRegistry;
use crate::runtime::accounts::AccountStatusAction;
use crate::runtime::audit::ActionAuditEvent;
use crate::runtime::audit::ActionOutcomeLabel;
use crate::runtime::audit::AuditSink;
use crate::runtime::audit::EventDeliveryAuditEvent;
use crate::runtime::audit::LedgerRetryAuditEvent;
use crate::runtime::authority::Authority;
use crate::runtime::consensus::ConsensusEngine;
use crate::runtime::locks::OrgLocks;
use crate::runtime::locks::poisoned;
use crate::runtime::network_actions::NetworkBootstrap;
use crate::runtime::network_actions::bootstrap;
use crate::runtime::nodes::NodeRegistry;
use crate::runtime::nodes::NodeStatusAction;
use crate::runtime::orgs::OrgRegistry;
use crate::runtime::orgs::OrgStatusAction;
use crate::runtime::orgs::SubOrgLimits;
use crate::runtime::planner::Plan;
use crate::runtime::planner::PlannedOutcome;
use crate::runtime::planner::Planner;
use crate::runtime::roles::RoleDefinition;
use crate::runtime::roles::RoleRegistry;
use crate::runtime::voters::VoterRegistry;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default network-admin org identifier.
pub const DEFAULT_NETWORK_ADMIN_ORG: &str = "ADMINORG";
/// Default network-admin role identifier.
pub const DEFAULT_NETWORK_ADMIN_ROLE: &str = "ADMIN";
/// Default org-admin role identifier.
pub const DEFAULT_ORG_ADMIN_ROLE: &str = "ORGADMIN";
/// Default access for accounts without an enforceable role.
pub const DEFAULT_ACCESS_LEVEL: AccessLevel = AccessLevel::ReadOnly;
/// Default ledger and event delivery attempt limit.
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
/// Default delay before the second attempt.
pub const DEFAULT_RETRY_INITIAL_BACKOFF: Duration = Duration::from_millis(50);
/// Default upper bound on a single backoff delay.
pub const DEFAULT_RETRY_MAX_BACKOFF: Duration = Duration::from_millis(1_000);

/// Bounded exponential backoff for ledger and event transport errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first; zero behaves like one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub initial_backoff: Duration,
    /// Upper bound on any single delay.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Returns the effective attempt limit.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Returns the delay after failed attempt `attempt` (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1_u32 << exponent).min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            initial_backoff: DEFAULT_RETRY_INITIAL_BACKOFF,
            max_backoff: DEFAULT_RETRY_MAX_BACKOFF,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Org whose voters approve master-org changes.
    pub network_admin_org: OrgId,
    /// Reserved admin role of the network-admin org.
    pub network_admin_role: RoleId,
    /// Admin role created in each master org on approval.
    pub org_admin_role: RoleId,
    /// Sub-org depth and breadth limits.
    pub sub_org_limits: SubOrgLimits,
    /// Transport retry policy.
    pub retry: RetryPolicy,
    /// Access granted to accounts without an enforceable role.
    pub default_access: AccessLevel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            network_admin_org: OrgId::new(DEFAULT_NETWORK_ADMIN_ORG),
            network_admin_role: RoleId::new(DEFAULT_NETWORK_ADMIN_ROLE),
            org_admin_role: RoleId::new(DEFAULT_ORG_ADMIN_ROLE),
            sub_org_limits: SubOrgLimits::default(),
            retry: RetryPolicy::default(),
            default_access: DEFAULT_ACCESS_LEVEL,
        }
    }
}

// ============================================================================
// SECTION: Requests and Results
// ============================================================================

/// Identity of the account performing an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Calling account.
    pub caller: AccountAddress,
}

impl AuthContext {
    /// Builds a context for `caller`.
    #[must_use]
    pub const fn new(caller: AccountAddress) -> Self {
        Self {
            caller,
        }
    }
}

/// Result of a successful action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// Change committed.
    Committed {
        /// Ledger version after the action.
        version: u64,
    },
    /// Vote open after this action.
    Pending {
        /// Auth org holding the vote.
        auth_org: OrgId,
        /// Counted approvals.
        votes: usize,
        /// Valid voters.
        valid_voters: usize,
        /// Ledger version after the action.
        version: u64,
    },
    /// Vote cancelled without committing.
    Cancelled {
        /// Auth org that held the vote.
        auth_org: OrgId,
        /// Ledger version after the action.
        version: u64,
    },
}

impl ActionOutcome {
    /// Builds the public outcome from a planned outcome.
    fn from_planned(outcome: PlannedOutcome, version: u64) -> Self {
        match outcome {
            PlannedOutcome::Committed => Self::Committed {
                version,
            },
            PlannedOutcome::Pending {
                auth_org,
                votes,
                valid_voters,
            } => Self::Pending {
                auth_org,
                votes,
                valid_voters,
                version,
            },
            PlannedOutcome::Cancelled {
                auth_org,
            } => Self::Cancelled {
                auth_org,
                version,
            },
        }
    }

    /// Returns the audit label for this outcome.
    const fn label(&self) -> ActionOutcomeLabel {
        match self {
            Self::Committed {
                ..
            } => ActionOutcomeLabel::Committed,
            Self::Pending {
                ..
            } => ActionOutcomeLabel::Pending,
            Self::Cancelled {
                ..
            } => ActionOutcomeLabel::Cancelled,
        }
    }

    /// Returns the ledger version after the action.
    #[must_use]
    pub const fn version(&self) -> u64 {
        match self {
            Self::Committed {
                version,
            }
            | Self::Pending {
                version,
                ..
            }
            | Self::Cancelled {
                version,
                ..
            } => *version,
        }
    }
}

/// Org with everything that belongs to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgDetails {
    /// Org record.
    pub org: OrgRecord,
    /// Nodes owned by the org.
    pub nodes: Vec<NodeRecord>,
    /// Roles defined in the org.
    pub roles: Vec<RoleRecord>,
    /// Accounts belonging to the org.
    pub accounts: Vec<AccountRecord>,
    /// Every org beneath this one, at any depth.
    pub sub_orgs: Vec<OrgId>,
    /// Vote open in the org's own slot.
    pub pending: Option<PendingOperation>,
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Permission facade over a ledger, an event sink, and an audit sink.
pub struct PermissionEngine<L, E, A> {
    /// Engine configuration.
    config: EngineConfig,
    /// Durable ledger.
    ledger: L,
    /// Receiver of committed events.
    events: E,
    /// Audit sink.
    audit: A,
    /// Current snapshot.
    state: RwLock<Arc<PermissionState>>,
    /// Serializes ledger writes and snapshot swaps.
    commit_lock: Mutex<()>,
    /// Per-org planning locks.
    org_locks: OrgLocks,
}

impl<L, E, A> PermissionEngine<L, E, A>
where
    L: Ledger,
    E: EventSink,
    A: AuditSink,
{
    /// Opens an engine over the ledger's current state.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the ledger cannot be read.
    pub fn open(
        config: EngineConfig,
        ledger: L,
        events: E,
        audit: A,
    ) -> Result<Self, PermissionError> {
        let state = ledger.read(&LedgerQuery::Full)?;
        Ok(Self {
            config,
            ledger,
            events,
            audit,
            state: RwLock::new(Arc::new(state)),
            commit_lock: Mutex::new(()),
            org_locks: OrgLocks::default(),
        })
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the ledger.
    #[must_use]
    pub const fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Rebuilds the snapshot from the ledger and returns its version.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the ledger cannot be read.
    pub fn restore(&self) -> Result<u64, PermissionError> {
        let _commit = self.commit_lock.lock().map_err(|_| poisoned("commit lock"))?;
        Ok(self.reload_snapshot()?.version)
    }

    /// Reads the full ledger state into the snapshot. The caller holds the
    /// commit lock.
    fn reload_snapshot(&self) -> Result<Arc<PermissionState>, PermissionError> {
        let state = Arc::new(self.ledger.read(&LedgerQuery::Full)?);
        *self.state.write().map_err(|_| poisoned("snapshot lock"))? = Arc::clone(&state);
        Ok(state)
    }

    // ========================================================================
    // SECTION: Network Actions
    // ========================================================================

    /// Seeds the network-admin org with admin accounts and nodes.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when the network is booted, no admin is
    /// given, or a seeded record belongs to another org.
    pub fn bootstrap(&self, request: &NetworkBootstrap) -> Result<ActionOutcome, PermissionError> {
        let slot = self.config.network_admin_org.clone();
        self.execute("system", "bootstrap", &slot, |state| {
            bootstrap(state, &self.config, request)
        })
    }

    /// Flips the one-way network boot flag.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when the caller is not a network admin or
    /// the network is already booted.
    pub fn complete_network_boot(
        &self,
        ctx: &AuthContext,
    ) -> Result<ActionOutcome, PermissionError> {
        let slot = self.config.network_admin_org.clone();
        self.act(ctx, "complete_network_boot", &slot, |planner| planner.complete_network_boot())
    }

    /// Votes on an auth org's open operation.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when the caller is not a valid voter, no
    /// vote is open, the target differs, or the vote is a self-approval.
    pub fn process_vote(
        &self,
        ctx: &AuthContext,
        auth_org: &OrgId,
        target: &VoteTarget,
    ) -> Result<ActionOutcome, PermissionError> {
        self.act(ctx, "process_vote", auth_org, |planner| planner.process_vote(auth_org, target))
    }

    /// Cancels an auth org's open operation.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when the caller cannot administer the auth
    /// org, no vote is open, or it targets something else.
    pub fn cancel_voting_item(
        &self,
        ctx: &AuthContext,
        auth_org: &OrgId,
        target: &TargetKey,
    ) -> Result<ActionOutcome, PermissionError> {
        self.act(ctx, "cancel_voting_item", auth_org, |planner| {
            planner.cancel_voting_item(auth_org, target)
        })
    }

    // ========================================================================
    // SECTION: Org Actions
    // ========================================================================

    /// Proposes a master org with its first node and admin account.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when the caller is not a network admin, a
    /// record already exists, or the network-admin slot is busy.
    pub fn add_org(
        &self,
        ctx: &AuthContext,
        org_id: &OrgId,
        enode_id: &EnodeId,
        admin: &AccountAddress,
    ) -> Result<ActionOutcome, PermissionError> {
        let slot = self.config.network_admin_org.clone();
        self.act(ctx, "add_org", &slot, |planner| planner.add_org(org_id, enode_id, admin))
    }

    /// Proposes a sub-org beneath an operational parent.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when the parent is not operational, the
    /// caller does not administer it, or a limit is exceeded.
    pub fn add_sub_org(
        &self,
        ctx: &AuthContext,
        parent_id: &OrgId,
        segment: &str,
        enode_id: Option<&EnodeId>,
    ) -> Result<ActionOutcome, PermissionError> {
        let slot = parent_id.master();
        self.act(ctx, "add_sub_org", &slot, |planner| {
            planner.add_sub_org(parent_id, segment, enode_id)
        })
    }

    /// Votes to approve a proposed org or sub-org.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when the org is not proposed or the vote
    /// is rejected.
    pub fn approve_org(
        &self,
        ctx: &AuthContext,
        org_id: &OrgId,
    ) -> Result<ActionOutcome, PermissionError> {
        let slot = if org_id.is_sub_org() {
            org_id.master()
        } else {
            self.config.network_admin_org.clone()
        };
        self.act(ctx, "approve_org", &slot, |planner| planner.approve_org(org_id))
    }

    /// Proposes suspending or reinstating a master org.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when the caller is not a network admin or
    /// the org cannot move to the requested status.
    pub fn update_org_status(
        &self,
        ctx: &AuthContext,
        org_id: &OrgId,
        action: OrgStatusAction,
    ) -> Result<ActionOutcome, PermissionError> {
        let slot = self.config.network_admin_org.clone();
        self.act(ctx, "update_org_status", &slot, |planner| {
            planner.update_org_status(org_id, action)
        })
    }

    /// Votes to approve a pending org status update.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when no matching update is pending or the
    /// vote is rejected.
    pub fn approve_org_status_update(
        &self,
        ctx: &AuthContext,
        org_id: &OrgId,
        action: OrgStatusAction,
    ) -> Result<ActionOutcome, PermissionError> {
        let slot = self.config.network_admin_org.clone();
        self.act(ctx, "approve_org_status_update", &slot, |planner| {
            planner.approve_org_status_update(org_id, action)
        })
    }

    // ========================================================================
    // SECTION: Node Actions
    // ========================================================================

    /// Proposes a node for an operational org.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when the org is not operational, the
    /// caller does not administer it, or the node exists.
    pub fn propose_node(
        &self,
        ctx: &AuthContext,
        org_id: &OrgId,
        enode_id: &EnodeId,
    ) -> Result<ActionOutcome, PermissionError> {
        self.act(ctx, "propose_node", org_id, |planner| planner.propose_node(org_id, enode_id))
    }

    /// Votes on a node's pending status change, including its first approval.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when the node has nothing pending or the
    /// vote is rejected.
    pub fn approve_node(
        &self,
        ctx: &AuthContext,
        enode_id: &EnodeId,
    ) -> Result<ActionOutcome, PermissionError> {
        let slot = self.node_slot(enode_id)?;
        self.act(ctx, "approve_node", &slot, |planner| planner.vote_on_node(enode_id))
    }

    /// Proposes deactivating, reactivating, or blacklisting a node.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when the caller does not administer the
    /// node's org or the node cannot make the transition.
    pub fn update_node_status(
        &self,
        ctx: &AuthContext,
        enode_id: &EnodeId,
        action: NodeStatusAction,
    ) -> Result<ActionOutcome, PermissionError> {
        let slot = self.node_slot(enode_id)?;
        self.act(ctx, "update_node_status", &slot, |planner| {
            planner.propose_node_status(enode_id, action)
        })
    }

    /// Cancels the open vote on a node and restores its prior status.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when the caller does not administer the
    /// node's org or the open vote targets something else.
    pub fn cancel_pending_operation(
        &self,
        ctx: &AuthContext,
        enode_id: &EnodeId,
    ) -> Result<ActionOutcome, PermissionError> {
        let slot = self.node_slot(enode_id)?;
        self.act(ctx, "cancel_pending_operation", &slot, |planner| {
            planner.cancel_node_operation(enode_id)
        })
    }

    // ========================================================================
    // SECTION: Role and Account Actions
    // ========================================================================

    /// Creates or reactivates a role.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when the org is not operational, the
    /// caller lacks authority, or the role is already active.
    pub fn add_role(
        &self,
        ctx: &AuthContext,
        definition: &RoleDefinition,
    ) -> Result<ActionOutcome, PermissionError> {
        self.act(ctx, "add_role", &definition.org_id, |planner| planner.add_role(definition))
    }

    /// Deactivates a role without touching accounts that hold it.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when the role is missing, inactive, or the
    /// org's admin role.
    pub fn remove_role(
        &self,
        ctx: &AuthContext,
        org_id: &OrgId,
        role_id: &RoleId,
    ) -> Result<ActionOutcome, PermissionError> {
        self.act(ctx, "remove_role", org_id, |planner| planner.remove_role(org_id, role_id))
    }

    /// Assigns a role to an account.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when the role does not resolve, the caller
    /// lacks authority, or the account cannot join the org.
    pub fn assign_account_role(
        &self,
        ctx: &AuthContext,
        address: &AccountAddress,
        org_id: &OrgId,
        role_id: &RoleId,
    ) -> Result<ActionOutcome, PermissionError> {
        self.act(ctx, "assign_account_role", org_id, |planner| {
            planner.assign_account_role(address, org_id, role_id)
        })
    }

    /// Clears an account's role.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when the account is unknown, holds no
    /// role, or the caller lacks authority.
    pub fn revoke_account_role(
        &self,
        ctx: &AuthContext,
        address: &AccountAddress,
    ) -> Result<ActionOutcome, PermissionError> {
        let slot = self.account_slot(address)?;
        self.act(ctx, "revoke_account_role", &slot, |planner| {
            planner.revoke_account_role(address)
        })
    }

    /// Proposes an account as org admin.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when the caller is not a network admin,
    /// the org has no admin role, or the account cannot join the org.
    pub fn assign_org_admin(
        &self,
        ctx: &AuthContext,
        org_id: &OrgId,
        address: &AccountAddress,
    ) -> Result<ActionOutcome, PermissionError> {
        let slot = self.config.network_admin_org.clone();
        self.act(ctx, "assign_org_admin", &slot, |planner| {
            planner.assign_org_admin(org_id, address)
        })
    }

    /// Votes to approve a pending org-admin assignment.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when no assignment is pending or the vote
    /// is rejected, including self-approval.
    pub fn approve_org_admin_account(
        &self,
        ctx: &AuthContext,
        org_id: &OrgId,
        address: &AccountAddress,
    ) -> Result<ActionOutcome, PermissionError> {
        let slot = self.config.network_admin_org.clone();
        self.act(ctx, "approve_org_admin_account", &slot, |planner| {
            planner.approve_org_admin_account(org_id, address)
        })
    }

    /// Suspends, reactivates, or blacklists an account.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when the caller lacks authority or the
    /// account cannot make the transition.
    pub fn update_account_status(
        &self,
        ctx: &AuthContext,
        org_id: &OrgId,
        address: &AccountAddress,
        action: AccountStatusAction,
    ) -> Result<ActionOutcome, PermissionError> {
        self.act(ctx, "update_account_status", org_id, |planner| {
            planner.update_account_status(org_id, address, action)
        })
    }

    // ========================================================================
    // SECTION: Reads
    // ========================================================================

    /// Returns the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the snapshot lock is
    /// poisoned.
    pub fn snapshot(&self) -> Result<Arc<PermissionState>, PermissionError> {
        let state = self.state.read().map_err(|_| poisoned("snapshot lock"))?;
        Ok(Arc::clone(&state))
    }

    /// Returns true once network boot has completed.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the snapshot is unavailable.
    pub fn network_boot_status(&self) -> Result<bool, PermissionError> {
        Ok(self.snapshot()?.network_booted)
    }

    /// Returns an org with its nodes, roles, accounts, and sub-orgs.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotFound`] for unknown orgs.
    pub fn org_details(&self, org_id: &OrgId) -> Result<OrgDetails, PermissionError> {
        let state = self.snapshot()?;
        let org = OrgRegistry::new(&state).get_org(org_id)?.clone();
        let prefix = format!("{org_id}.");
        Ok(OrgDetails {
            org,
            nodes: state.nodes.values().filter(|node| &node.org_id == org_id).cloned().collect(),
            roles: state.roles.values().filter(|role| &role.org_id == org_id).cloned().collect(),
            accounts: state
                .accounts
                .values()
                .filter(|account| &account.org_id == org_id)
                .cloned()
                .collect(),
            sub_orgs: state
                .orgs
                .keys()
                .filter(|candidate| candidate.as_str().starts_with(&prefix))
                .cloned()
                .collect(),
            pending: state.pending.get(org_id).cloned(),
        })
    }

    /// Lists every org.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the snapshot is unavailable.
    pub fn org_list(&self) -> Result<Vec<OrgRecord>, PermissionError> {
        Ok(OrgRegistry::new(&*self.snapshot()?).list().cloned().collect())
    }

    /// Returns whether an org currently has `status`.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotFound`] for unknown orgs.
    pub fn check_org_status(
        &self,
        org_id: &OrgId,
        status: OrgStatus,
    ) -> Result<bool, PermissionError> {
        OrgRegistry::new(&*self.snapshot()?).check_org_status(org_id, status)
    }

    /// Returns a node record.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotFound`] for unknown nodes.
    pub fn node_details(&self, enode_id: &EnodeId) -> Result<NodeRecord, PermissionError> {
        Ok(NodeRegistry::new(&*self.snapshot()?).get_node(enode_id)?.clone())
    }

    /// Lists every node.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the snapshot is unavailable.
    pub fn node_list(&self) -> Result<Vec<NodeRecord>, PermissionError> {
        Ok(NodeRegistry::new(&*self.snapshot()?).list().cloned().collect())
    }

    /// Returns a role record, active or not.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotFound`] for unknown roles.
    pub fn role_details(
        &self,
        org_id: &OrgId,
        role_id: &RoleId,
    ) -> Result<RoleRecord, PermissionError> {
        Ok(RoleRegistry::new(&*self.snapshot()?).get_role_details(org_id, role_id)?.clone())
    }

    /// Lists every role.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the snapshot is unavailable.
    pub fn role_list(&self) -> Result<Vec<RoleRecord>, PermissionError> {
        Ok(RoleRegistry::new(&*self.snapshot()?).list().cloned().collect())
    }

    /// Returns true when the role resolves to an active voter role.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the snapshot is unavailable.
    pub fn is_voter_role(&self, org_id: &OrgId, role_id: &RoleId) -> Result<bool, PermissionError> {
        Ok(RoleRegistry::new(&*self.snapshot()?).is_voter_role(org_id, role_id))
    }

    /// Returns true when the role resolves to an active full-access role.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the snapshot is unavailable.
    pub fn is_full_access_role(
        &self,
        org_id: &OrgId,
        role_id: &RoleId,
    ) -> Result<bool, PermissionError> {
        Ok(RoleRegistry::new(&*self.snapshot()?).is_full_access_role(org_id, role_id))
    }

    /// Returns an account record.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotFound`] for unknown accounts.
    pub fn account_details(
        &self,
        address: &AccountAddress,
    ) -> Result<AccountRecord, PermissionError> {
        Ok(AccountRegistry::new(&*self.snapshot()?).get_account_details(address)?.clone())
    }

    /// Lists every account.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the snapshot is unavailable.
    pub fn account_list(&self) -> Result<Vec<AccountRecord>, PermissionError> {
        Ok(AccountRegistry::new(&*self.snapshot()?).list().cloned().collect())
    }

    /// Returns true when the account is a network admin.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the snapshot is unavailable.
    pub fn is_network_admin(&self, address: &AccountAddress) -> Result<bool, PermissionError> {
        Ok(Authority::new(&*self.snapshot()?, &self.config).is_network_admin(address))
    }

    /// Returns true when the account is an org admin of `org_id` or its
    /// ultimate parent.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the snapshot is unavailable.
    pub fn is_org_admin(
        &self,
        address: &AccountAddress,
        org_id: &OrgId,
    ) -> Result<bool, PermissionError> {
        Ok(Authority::new(&*self.snapshot()?, &self.config).is_org_admin(address, org_id))
    }

    /// Returns the number of valid voters of an auth org.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the snapshot is unavailable.
    pub fn number_of_valid_voters(&self, auth_org: &OrgId) -> Result<usize, PermissionError> {
        Ok(ConsensusEngine::new(&*self.snapshot()?).number_of_valid_voters(auth_org))
    }

    /// Returns the valid voters of an auth org.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the snapshot is unavailable.
    pub fn valid_voters(&self, auth_org: &OrgId) -> Result<Vec<AccountAddress>, PermissionError> {
        Ok(VoterRegistry::new(&*self.snapshot()?).valid_voters(auth_org).into_iter().collect())
    }

    /// Returns the open operation of an auth org.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the snapshot is unavailable.
    pub fn pending_operation(
        &self,
        auth_org: &OrgId,
    ) -> Result<Option<PendingOperation>, PermissionError> {
        Ok(ConsensusEngine::new(&*self.snapshot()?).pending_operation(auth_org).cloned())
    }

    // ========================================================================
    // SECTION: Enforcement
    // ========================================================================

    /// Returns the access level an account may act with.
    ///
    /// Unknown, inactive, or suspended-org accounts get the configured
    /// default access.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the snapshot is unavailable.
    pub fn account_access(&self, address: &AccountAddress) -> Result<AccessLevel, PermissionError> {
        Ok(AccessControl::new(&*self.snapshot()?, &self.config).account_access(address))
    }

    /// Returns true when the account holds an admin role and may act.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the snapshot is unavailable.
    pub fn is_admin_account(&self, address: &AccountAddress) -> Result<bool, PermissionError> {
        Ok(AccessControl::new(&*self.snapshot()?, &self.config).is_admin_account(address))
    }

    /// Returns true when the node may connect to the network.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the snapshot is unavailable.
    pub fn connection_allowed(&self, enode_id: &EnodeId) -> Result<bool, PermissionError> {
        Ok(AccessControl::new(&*self.snapshot()?, &self.config).connection_allowed(enode_id))
    }

    /// Returns true when `from` may submit transactions through `enode_id`.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the snapshot is unavailable.
    pub fn validate_node_for_txn(
        &self,
        enode_id: &EnodeId,
        from: &AccountAddress,
    ) -> Result<bool, PermissionError> {
        Ok(AccessControl::new(&*self.snapshot()?, &self.config).validate_node_for_txn(enode_id, from))
    }

    /// Returns true when the account's access level permits `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Transport`] when the snapshot is unavailable.
    pub fn transaction_allowed(
        &self,
        address: &AccountAddress,
        kind: TransactionKind,
    ) -> Result<bool, PermissionError> {
        Ok(AccessControl::new(&*self.snapshot()?, &self.config).transaction_allowed(address, kind))
    }

    // ========================================================================
    // SECTION: Pipeline
    // ========================================================================

    /// Returns the slot lock key for an action on a node.
    fn node_slot(&self, enode_id: &EnodeId) -> Result<OrgId, PermissionError> {
        let state = self.snapshot()?;
        Ok(state
            .nodes
            .get(enode_id)
            .map_or_else(|| self.config.network_admin_org.clone(), |node| node.org_id.clone()))
    }

    /// Returns the slot lock key for an action on an account.
    fn account_slot(&self, address: &AccountAddress) -> Result<OrgId, PermissionError> {
        let state = self.snapshot()?;
        Ok(state.accounts.get(address).map_or_else(
            || self.config.network_admin_org.clone(),
            |account| account.org_id.clone(),
        ))
    }

    /// Runs a caller-initiated action through the pipeline.
    fn act<F>(
        &self,
        ctx: &AuthContext,
        action: &'static str,
        slot: &OrgId,
        plan: F,
    ) -> Result<ActionOutcome, PermissionError>
    where
        F: Fn(&Planner<'_>) -> Result<Plan, PermissionError>,
    {
        self.execute(ctx.caller.as_str(), action, slot, |state| {
            plan(&Planner::new(state, &self.config, &ctx.caller))
        })
    }

    /// Runs an action and audits its result.
    fn execute<F>(
        &self,
        actor: &str,
        action: &'static str,
        slot: &OrgId,
        plan: F,
    ) -> Result<ActionOutcome, PermissionError>
    where
        F: Fn(&PermissionState) -> Result<Plan, PermissionError>,
    {
        let result = self.commit_plan(slot, plan);
        let record = match &result {
            Ok(outcome) => ActionAuditEvent::success(
                actor,
                action,
                slot.as_str(),
                outcome.label(),
                Some(outcome.version()),
            ),
            Err(error) => ActionAuditEvent::rejected(actor, action, slot.as_str(), error),
        };
        self.audit.record_action(&record);
        result
    }

    /// Plans, writes, swaps, and publishes one action.
    ///
    /// A ledger version conflict means another writer advanced the ledger;
    /// the snapshot is reloaded and the action re-planned once.
    fn commit_plan<F>(&self, slot: &OrgId, plan: F) -> Result<ActionOutcome, PermissionError>
    where
        F: Fn(&PermissionState) -> Result<Plan, PermissionError>,
    {
        let slot_lock = self.org_locks.slot(slot)?;
        let _slot_guard = slot_lock.lock().map_err(|_| poisoned("org slot lock"))?;
        let planned_on = self.snapshot()?;
        let mut planned = plan(&planned_on)?;

        let _commit_guard = self.commit_lock.lock().map_err(|_| poisoned("commit lock"))?;
        let mut current = self.snapshot()?;
        if !Arc::ptr_eq(&planned_on, &current) {
            planned = plan(&current)?;
        }
        let mut reloaded = false;
        loop {
            if planned.changes.is_empty() {
                return Ok(ActionOutcome::from_planned(planned.outcome, current.version));
            }
            let mut next = (*current).clone();
            next.apply_all(&planned.changes);
            next.check_invariants().map_err(|detail| {
                PermissionError::invalid_transition(EntityKind::Network, slot, detail)
            })?;
            let mutation = LedgerMutation {
                partition: slot.clone(),
                base_version: current.version,
                changes: planned.changes,
            };
            match self.apply_with_retry(&mutation) {
                Ok(version) => {
                    next.version = version;
                    let mut events = planned.events;
                    events.extend(voter_changes(&current, &next));
                    *self.state.write().map_err(|_| poisoned("snapshot lock"))? = Arc::new(next);
                    for event in &events {
                        self.publish_with_retry(event);
                    }
                    return Ok(ActionOutcome::from_planned(planned.outcome, version));
                }
                Err(LedgerError::Conflict {
                    ..
                }) if !reloaded => {
                    reloaded = true;
                    current = self.reload_snapshot()?;
                    planned = plan(&current)?;
                }
                Err(error) => return Err(error.into()),
            }
        }
    }

    /// Applies a mutation, retrying transport errors with backoff.
    fn apply_with_retry(&self, mutation: &LedgerMutation) -> Result<u64, LedgerError> {
        let retry = self.config.retry;
        let max_attempts = retry.attempts();
        let mut attempt = 1;
        loop {
            match self.ledger.apply(mutation) {
                Ok(version) => return Ok(version),
                Err(error) => {
                    let will_retry = error.is_retryable() && attempt < max_attempts;
                    self.audit.record_ledger_retry(&LedgerRetryAuditEvent::new(
                        mutation.partition.as_str(),
                        attempt,
                        max_attempts,
                        will_retry,
                        error.to_string(),
                    ));
                    if !will_retry {
                        return Err(error);
                    }
                    thread::sleep(retry.backoff(attempt));
                    attempt += 1;
                }
            }
        }
    }

    /// Publishes an event, retrying transport errors; failures are audited.
    fn publish_with_retry(&self, event: &PermissionEvent) {
        let retry = self.config.retry;
        let max_attempts = retry.attempts();
        let mut attempt = 1;
        loop {
            match self.events.publish(event) {
                Ok(()) => return,
                Err(error) if error.is_retryable() && attempt < max_attempts => {
                    thread::sleep(retry.backoff(attempt));
                    attempt += 1;
                }
                Err(error) => {
                    self.audit.record_event_delivery(&EventDeliveryAuditEvent::new(
                        event.kind(),
                        attempt,
                        error.to_string(),
                    ));
                    return;
                }
            }
        }
    }
}

/// Derives voter eligibility events between two snapshots.
fn voter_changes(before: &PermissionState, after: &PermissionState) -> Vec<PermissionEvent> {
    let old = VoterRegistry::new(before).all_voters();
    let new = VoterRegistry::new(after).all_voters();
    let removed = old.difference(&new).map(|(org_id, account)| PermissionEvent::VoterRemoved {
        org_id: org_id.clone(),
        account: account.clone(),
    });
    let added = new.difference(&old).map(|(org_id, account)| PermissionEvent::VoterAdded {
        org_id: org_id.clone(),
        account: account.clone(),
    });
    removed.chain(added).collect()
}
