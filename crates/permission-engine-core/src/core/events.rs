// crates/permission-engine-core/src/core/events.rs
// ============================================================================
// Module: Permission Events
// Description: Domain events emitted after committed permission changes.
// Purpose: Give subscribers a typed, serializable change feed.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Events are emitted only after the ledger accepted the change they describe.
//! They serialize as JSON objects tagged by `event`, and each event exposes an
//! [`EventKind`] so subscribers can filter without matching payloads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AccountAddress;
use crate::core::identifiers::EnodeId;
use crate::core::identifiers::OrgId;
use crate::core::identifiers::RoleId;
use crate::core::model::AccessLevel;
use crate::core::model::AccountStatus;
use crate::core::model::NodeStatus;
use crate::core::model::OrgStatus;
use crate::core::pending::PendingOpType;
use crate::core::pending::TargetKey;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Committed permission change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PermissionEvent {
    /// Org or sub-org proposed.
    OrgProposed {
        /// Proposed org.
        org_id: OrgId,
        /// Parent for sub-orgs.
        parent_org_id: Option<OrgId>,
    },
    /// Org approved.
    OrgApproved {
        /// Approved org.
        org_id: OrgId,
    },
    /// Org status change proposed.
    OrgStatusUpdateProposed {
        /// Target org.
        org_id: OrgId,
        /// Requested status.
        status: OrgStatus,
    },
    /// Org suspended.
    OrgSuspended {
        /// Suspended org.
        org_id: OrgId,
    },
    /// Org suspension lifted.
    OrgSuspensionRevoked {
        /// Restored org.
        org_id: OrgId,
    },
    /// Node proposed.
    NodeProposed {
        /// Owning org.
        org_id: OrgId,
        /// Proposed node.
        enode_id: EnodeId,
    },
    /// Node approved or reactivated.
    NodeActivated {
        /// Owning org.
        org_id: OrgId,
        /// Activated node.
        enode_id: EnodeId,
    },
    /// Node deactivation proposed.
    NodeDeactivationProposed {
        /// Owning org.
        org_id: OrgId,
        /// Target node.
        enode_id: EnodeId,
    },
    /// Node deactivated.
    NodeDeactivated {
        /// Owning org.
        org_id: OrgId,
        /// Deactivated node.
        enode_id: EnodeId,
    },
    /// Node reactivation proposed.
    NodeActivationProposed {
        /// Owning org.
        org_id: OrgId,
        /// Target node.
        enode_id: EnodeId,
    },
    /// Node blacklisting proposed.
    NodeBlacklistProposed {
        /// Owning org.
        org_id: OrgId,
        /// Target node.
        enode_id: EnodeId,
    },
    /// Node blacklisted.
    NodeBlacklisted {
        /// Owning org.
        org_id: OrgId,
        /// Blacklisted node.
        enode_id: EnodeId,
    },
    /// Node returned to a stable status after a cancelled vote.
    NodeStatusRestored {
        /// Owning org.
        org_id: OrgId,
        /// Restored node.
        enode_id: EnodeId,
        /// Restored status.
        status: NodeStatus,
    },
    /// Role created or reactivated.
    RoleCreated {
        /// Defining org.
        org_id: OrgId,
        /// Role identifier.
        role_id: RoleId,
        /// Granted access.
        access_level: AccessLevel,
        /// Voter flag.
        is_voter: bool,
        /// Admin flag.
        is_admin: bool,
    },
    /// Role deactivated.
    RoleRevoked {
        /// Defining org.
        org_id: OrgId,
        /// Role identifier.
        role_id: RoleId,
    },
    /// Account received a role.
    AccountRoleAssigned {
        /// Owning org.
        org_id: OrgId,
        /// Account address.
        account: AccountAddress,
        /// Assigned role.
        role_id: RoleId,
        /// Cached access level.
        access_level: AccessLevel,
    },
    /// Account role cleared.
    AccountRoleRevoked {
        /// Owning org.
        org_id: OrgId,
        /// Account address.
        account: AccountAddress,
    },
    /// Org-admin assignment proposed.
    OrgAdminProposed {
        /// Target org.
        org_id: OrgId,
        /// Proposed admin account.
        account: AccountAddress,
    },
    /// Org-admin assignment approved.
    OrgAdminApproved {
        /// Target org.
        org_id: OrgId,
        /// Approved admin account.
        account: AccountAddress,
    },
    /// Account status changed.
    AccountStatusChanged {
        /// Owning org.
        org_id: OrgId,
        /// Account address.
        account: AccountAddress,
        /// New status.
        status: AccountStatus,
    },
    /// Account became a valid voter.
    VoterAdded {
        /// Auth org.
        org_id: OrgId,
        /// Voter account.
        account: AccountAddress,
    },
    /// Account stopped being a valid voter.
    VoterRemoved {
        /// Auth org.
        org_id: OrgId,
        /// Former voter account.
        account: AccountAddress,
    },
    /// Vote opened.
    ItemForApproval {
        /// Auth org holding the vote.
        auth_org: OrgId,
        /// Operation type.
        op_type: PendingOpType,
        /// Operation target.
        target: TargetKey,
    },
    /// Vote recorded.
    VoteProcessed {
        /// Auth org holding the vote.
        auth_org: OrgId,
        /// Voter account.
        voter: AccountAddress,
        /// Operation type.
        op_type: PendingOpType,
        /// Counted approvals after this vote.
        votes: usize,
        /// Valid voters at the time of the vote.
        valid_voters: usize,
    },
    /// Vote closed without committing.
    PendingOperationCancelled {
        /// Auth org that held the vote.
        auth_org: OrgId,
        /// Operation type.
        op_type: PendingOpType,
        /// Operation target.
        target: TargetKey,
    },
    /// Network boot completed; voting is now required.
    NetworkBootCompleted,
}

impl PermissionEvent {
    /// Returns the kind of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::OrgProposed { .. } => EventKind::OrgProposed,
            Self::OrgApproved { .. } => EventKind::OrgApproved,
            Self::OrgStatusUpdateProposed { .. } => EventKind::OrgStatusUpdateProposed,
            Self::OrgSuspended { .. } => EventKind::OrgSuspended,
            Self::OrgSuspensionRevoked { .. } => EventKind::OrgSuspensionRevoked,
            Self::NodeProposed { .. } => EventKind::NodeProposed,
            Self::NodeActivated { .. } => EventKind::NodeActivated,
            Self::NodeDeactivationProposed { .. } => EventKind::NodeDeactivationProposed,
            Self::NodeDeactivated { .. } => EventKind::NodeDeactivated,
            Self::NodeActivationProposed { .. } => EventKind::NodeActivationProposed,
            Self::NodeBlacklistProposed { .. } => EventKind::NodeBlacklistProposed,
            Self::NodeBlacklisted { .. } => EventKind::NodeBlacklisted,
            Self::NodeStatusRestored { .. } => EventKind::NodeStatusRestored,
            Self::RoleCreated { .. } => EventKind::RoleCreated,
            Self::RoleRevoked { .. } => EventKind::RoleRevoked,
            Self::AccountRoleAssigned { .. } => EventKind::AccountRoleAssigned,
            Self::AccountRoleRevoked { .. } => EventKind::AccountRoleRevoked,
            Self::OrgAdminProposed { .. } => EventKind::OrgAdminProposed,
            Self::OrgAdminApproved { .. } => EventKind::OrgAdminApproved,
            Self::AccountStatusChanged { .. } => EventKind::AccountStatusChanged,
            Self::VoterAdded { .. } => EventKind::VoterAdded,
            Self::VoterRemoved { .. } => EventKind::VoterRemoved,
            Self::ItemForApproval { .. } => EventKind::ItemForApproval,
            Self::VoteProcessed { .. } => EventKind::VoteProcessed,
            Self::PendingOperationCancelled { .. } => EventKind::PendingOperationCancelled,
            Self::NetworkBootCompleted => EventKind::NetworkBootCompleted,
        }
    }
}

// ============================================================================
// SECTION: Event Kinds
// ============================================================================

/// Payload-free event discriminant used for subscription filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// See [`PermissionEvent::OrgProposed`].
    OrgProposed,
    /// See [`PermissionEvent::OrgApproved`].
    OrgApproved,
    /// See [`PermissionEvent::OrgStatusUpdateProposed`].
    OrgStatusUpdateProposed,
    /// See [`PermissionEvent::OrgSuspended`].
    OrgSuspended,
    /// See [`PermissionEvent::OrgSuspensionRevoked`].
    OrgSuspensionRevoked,
    /// See [`PermissionEvent::NodeProposed`].
    NodeProposed,
    /// See [`PermissionEvent::NodeActivated`].
    NodeActivated,
    /// See [`PermissionEvent::NodeDeactivationProposed`].
    NodeDeactivationProposed,
    /// See [`PermissionEvent::NodeDeactivated`].
    NodeDeactivated,
    /// See [`PermissionEvent::NodeActivationProposed`].
    NodeActivationProposed,
    /// See [`PermissionEvent::NodeBlacklistProposed`].
    NodeBlacklistProposed,
    /// See [`PermissionEvent::NodeBlacklisted`].
    NodeBlacklisted,
    /// See [`PermissionEvent::NodeStatusRestored`].
    NodeStatusRestored,
    /// See [`PermissionEvent::RoleCreated`].
    RoleCreated,
    /// See [`PermissionEvent::RoleRevoked`].
    RoleRevoked,
    /// See [`PermissionEvent::AccountRoleAssigned`].
    AccountRoleAssigned,
    /// See [`PermissionEvent::AccountRoleRevoked`].
    AccountRoleRevoked,
    /// See [`PermissionEvent::OrgAdminProposed`].
    OrgAdminProposed,
    /// See [`PermissionEvent::OrgAdminApproved`].
    OrgAdminApproved,
    /// See [`PermissionEvent::AccountStatusChanged`].
    AccountStatusChanged,
    /// See [`PermissionEvent::VoterAdded`].
    VoterAdded,
    /// See [`PermissionEvent::VoterRemoved`].
    VoterRemoved,
    /// See [`PermissionEvent::ItemForApproval`].
    ItemForApproval,
    /// See [`PermissionEvent::VoteProcessed`].
    VoteProcessed,
    /// See [`PermissionEvent::PendingOperationCancelled`].
    PendingOperationCancelled,
    /// See [`PermissionEvent::NetworkBootCompleted`].
    NetworkBootCompleted,
}

impl EventKind {
    /// Returns the stable label for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrgProposed => "org_proposed",
            Self::OrgApproved => "org_approved",
            Self::OrgStatusUpdateProposed => "org_status_update_proposed",
            Self::OrgSuspended => "org_suspended",
            Self::OrgSuspensionRevoked => "org_suspension_revoked",
            Self::NodeProposed => "node_proposed",
            Self::NodeActivated => "node_activated",
            Self::NodeDeactivationProposed => "node_deactivation_proposed",
            Self::NodeDeactivated => "node_deactivated",
            Self::NodeActivationProposed => "node_activation_proposed",
            Self::NodeBlacklistProposed => "node_blacklist_proposed",
            Self::NodeBlacklisted => "node_blacklisted",
            Self::NodeStatusRestored => "node_status_restored",
            Self::RoleCreated => "role_created",
            Self::RoleRevoked => "role_revoked",
            Self::AccountRoleAssigned => "account_role_assigned",
            Self::AccountRoleRevoked => "account_role_revoked",
            Self::OrgAdminProposed => "org_admin_proposed",
            Self::OrgAdminApproved => "org_admin_approved",
            Self::AccountStatusChanged => "account_status_changed",
            Self::VoterAdded => "voter_added",
            Self::VoterRemoved => "voter_removed",
            Self::ItemForApproval => "item_for_approval",
            Self::VoteProcessed => "vote_processed",
            Self::PendingOperationCancelled => "pending_operation_cancelled",
            Self::NetworkBootCompleted => "network_boot_completed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
