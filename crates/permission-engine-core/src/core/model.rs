// crates/permission-engine-core/src/core/model.rs
// ============================================================================
// Module: Permission Data Model
// Description: Org, node, role, and account records with their status enums.
// Purpose: Provide the serializable records owned by the permission registries.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Records are plain data. Lifecycle rules live in the runtime registries; the
//! helpers here only classify statuses so every caller agrees on what
//! "operational" or "terminal" means.

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

// ============================================================================
// SECTION: Organizations
// ============================================================================

/// Organization lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgStatus {
    /// Awaiting approval by the network admin voters.
    Proposed,
    /// Approved and operational.
    Approved,
    /// Suspended; members keep their records but the org cannot grow.
    Suspended,
    /// Suspension lifted; operational again.
    SuspensionRevoked,
}

impl OrgStatus {
    /// Returns true when the org may take part in new admin actions.
    #[must_use]
    pub const fn is_operational(self) -> bool {
        matches!(self, Self::Approved | Self::SuspensionRevoked)
    }

    /// Returns the stable label for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Proposed => "proposed",
            Self::Approved => "approved",
            Self::Suspended => "suspended",
            Self::SuspensionRevoked => "suspension_revoked",
        }
    }
}

impl fmt::Display for OrgStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Organization record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgRecord {
    /// Full org identifier.
    pub org_id: OrgId,
    /// Direct parent for sub-orgs; `None` for master orgs.
    pub parent_org_id: Option<OrgId>,
    /// Master org at the root of this org's tree (itself for master orgs).
    pub ultimate_parent: OrgId,
    /// Depth in the org tree; master orgs are level 1.
    pub level: u32,
    /// Full identifiers of direct sub-orgs, in creation order.
    pub sub_orgs: Vec<OrgId>,
    /// Current lifecycle status.
    pub status: OrgStatus,
    /// Status awaiting approval during a two-phase status update.
    pub pending_status: Option<OrgStatus>,
}

impl OrgRecord {
    /// Builds a proposed master org record.
    #[must_use]
    pub fn proposed_master(org_id: OrgId) -> Self {
        Self {
            ultimate_parent: org_id.clone(),
            org_id,
            parent_org_id: None,
            level: 1,
            sub_orgs: Vec::new(),
            status: OrgStatus::Proposed,
            pending_status: None,
        }
    }

    /// Builds a proposed sub-org record beneath `parent`.
    #[must_use]
    pub fn proposed_sub_org(org_id: OrgId, parent: &Self) -> Self {
        Self {
            org_id,
            parent_org_id: Some(parent.org_id.clone()),
            ultimate_parent: parent.ultimate_parent.clone(),
            level: parent.level.saturating_add(1),
            sub_orgs: Vec::new(),
            status: OrgStatus::Proposed,
            pending_status: None,
        }
    }

    /// Returns true for master (top-level) orgs.
    #[must_use]
    pub const fn is_master(&self) -> bool {
        self.parent_org_id.is_none()
    }
}

// ============================================================================
// SECTION: Nodes
// ============================================================================

/// Node lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// Awaiting approval.
    Proposed,
    /// Approved and allowed to connect.
    Active,
    /// Deactivation proposed.
    PendingDeactivation,
    /// Deactivated.
    Deactivated,
    /// Reactivation proposed.
    PendingActivation,
    /// Blacklisting proposed.
    PendingBlacklist,
    /// Blacklisted; terminal.
    Blacklisted,
}

impl NodeStatus {
    /// Returns true while a status change awaits votes.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(
            self,
            Self::Proposed
                | Self::PendingDeactivation
                | Self::PendingActivation
                | Self::PendingBlacklist
        )
    }

    /// Returns true for the terminal blacklisted status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Blacklisted)
    }

    /// Returns the stable label for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Proposed => "proposed",
            Self::Active => "active",
            Self::PendingDeactivation => "pending_deactivation",
            Self::Deactivated => "deactivated",
            Self::PendingActivation => "pending_activation",
            Self::PendingBlacklist => "pending_blacklist",
            Self::Blacklisted => "blacklisted",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Network-wide node identifier.
    pub enode_id: EnodeId,
    /// Owning org.
    pub org_id: OrgId,
    /// Current lifecycle status.
    pub status: NodeStatus,
    /// Stable status to restore if the pending change is cancelled.
    pub restore_status: Option<NodeStatus>,
}

impl NodeRecord {
    /// Builds a proposed node record.
    #[must_use]
    pub const fn proposed(enode_id: EnodeId, org_id: OrgId) -> Self {
        Self {
            enode_id,
            org_id,
            status: NodeStatus::Proposed,
            restore_status: None,
        }
    }
}

// ============================================================================
// SECTION: Roles
// ============================================================================

/// Ordered access level; higher variants grant strictly more.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// No network access.
    #[default]
    NoAccess,
    /// Read-only calls.
    ReadOnly,
    /// Value transfers and contract calls.
    Transact,
    /// Contract deployment.
    ContractDeploy,
    /// Everything, including permissioning actions.
    FullAccess,
}

impl AccessLevel {
    /// Returns the stable label for this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoAccess => "no_access",
            Self::ReadOnly => "read_only",
            Self::Transact => "transact",
            Self::ContractDeploy => "contract_deploy",
            Self::FullAccess => "full_access",
        }
    }

    /// Returns true when holders of this level may submit `kind`.
    ///
    /// Read-only accounts never transact; transact accounts cannot deploy.
    #[must_use]
    pub const fn permits(self, kind: TransactionKind) -> bool {
        match self {
            Self::NoAccess | Self::ReadOnly => false,
            Self::Transact => !matches!(kind, TransactionKind::ContractDeploy),
            Self::ContractDeploy | Self::FullAccess => true,
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of transaction an account submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Plain value transfer.
    ValueTransfer,
    /// Call into a deployed contract.
    ContractCall,
    /// Contract creation.
    ContractDeploy,
}

/// Composite role key `(org, role)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleKey {
    /// Org that defines the role.
    pub org_id: OrgId,
    /// Role identifier within the org.
    pub role_id: RoleId,
}

impl RoleKey {
    /// Builds a role key.
    #[must_use]
    pub const fn new(org_id: OrgId, role_id: RoleId) -> Self {
        Self { org_id, role_id }
    }
}

impl fmt::Display for RoleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org_id, self.role_id)
    }
}

/// Role record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    /// Role identifier.
    pub role_id: RoleId,
    /// Org that defines the role.
    pub org_id: OrgId,
    /// Access granted to holders.
    pub access_level: AccessLevel,
    /// Whether holders may vote on pending operations.
    pub is_voter: bool,
    /// Whether this is the org-admin role.
    pub is_admin: bool,
    /// Inactive roles stay on record but grant nothing new.
    pub active: bool,
}

impl RoleRecord {
    /// Returns the composite key for this role.
    #[must_use]
    pub fn key(&self) -> RoleKey {
        RoleKey::new(self.org_id.clone(), self.role_id.clone())
    }
}

// ============================================================================
// SECTION: Accounts
// ============================================================================

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Account may act within its role.
    #[default]
    Active,
    /// Temporarily barred.
    Suspended,
    /// Permanently barred; terminal.
    Blacklisted,
}

impl AccountStatus {
    /// Returns the stable label for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Blacklisted => "blacklisted",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Account address.
    pub address: AccountAddress,
    /// Owning org.
    pub org_id: OrgId,
    /// Assigned role, if any.
    pub role_id: Option<RoleId>,
    /// Access cached from the role at assignment time.
    pub access_level: AccessLevel,
    /// Account status.
    pub status: AccountStatus,
    /// Whether the account holds approved org-admin privileges.
    pub is_org_admin: bool,
    /// Admin role awaiting approval, if an admin assignment is pending.
    pub pending_role_id: Option<RoleId>,
}

impl AccountRecord {
    /// Builds an active account with no role.
    #[must_use]
    pub const fn unassigned(address: AccountAddress, org_id: OrgId) -> Self {
        Self {
            address,
            org_id,
            role_id: None,
            access_level: AccessLevel::NoAccess,
            status: AccountStatus::Active,
            is_org_admin: false,
            pending_role_id: None,
        }
    }

    /// Returns true while an admin assignment awaits approval.
    #[must_use]
    pub const fn pending_approval(&self) -> bool {
        self.pending_role_id.is_some()
    }
}
