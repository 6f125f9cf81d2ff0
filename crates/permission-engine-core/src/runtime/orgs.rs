// crates/permission-engine-core/src/runtime/orgs.rs
// ============================================================================
// Module: Organization Registry
// Description: Org lookups, sub-org tree limits, and org status planning.
// Purpose: Validate org creation, approval, and two-phase status updates.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Orgs form a forest of master orgs with nested sub-orgs. A sub-org may only
//! be proposed beneath an operational parent, and the tree is bounded by a
//! configurable depth and per-parent breadth. Orgs are never deleted.
//!
//! Status updates are two-phase: the proposal records `pending_status`, and
//! the approved vote moves it into `status`. Only master orgs take status
//! updates.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::btree_map::Values;

use serde::Deserialize;
use serde::Serialize;

use crate::core::EntityKind;
use crate::core::OrgId;
use crate::core::OrgRecord;
use crate::core::OrgStatus;
use crate::core::PendingOpType;
use crate::core::PermissionError;
use crate::core::PermissionState;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default maximum org tree depth (master orgs are level 1).
pub const DEFAULT_SUB_ORG_MAX_DEPTH: u32 = 4;
/// Default maximum number of direct sub-orgs per parent.
pub const DEFAULT_SUB_ORG_MAX_BREADTH: usize = 4;

/// Sub-org tree limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubOrgLimits {
    /// Deepest allowed level; a parent at this level cannot take sub-orgs.
    pub max_depth: u32,
    /// Maximum direct sub-orgs per parent.
    pub max_breadth: usize,
}

impl Default for SubOrgLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_SUB_ORG_MAX_DEPTH,
            max_breadth: DEFAULT_SUB_ORG_MAX_BREADTH,
        }
    }
}

// ============================================================================
// SECTION: Status Actions
// ============================================================================

/// Requested org status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgStatusAction {
    /// Approved or SuspensionRevoked -> Suspended.
    Suspend,
    /// Suspended -> SuspensionRevoked.
    RevokeSuspension,
}

impl OrgStatusAction {
    /// Returns the status this action moves the org to.
    #[must_use]
    pub const fn target_status(self) -> OrgStatus {
        match self {
            Self::Suspend => OrgStatus::Suspended,
            Self::RevokeSuspension => OrgStatus::SuspensionRevoked,
        }
    }

    /// Returns the pending operation type voted on for this action.
    #[must_use]
    pub const fn op_type(self) -> PendingOpType {
        match self {
            Self::Suspend => PendingOpType::SuspendOrg,
            Self::RevokeSuspension => PendingOpType::RevokeOrgSuspension,
        }
    }
}

// ============================================================================
// SECTION: Org Registry
// ============================================================================

/// Read view over the orgs in a state snapshot.
#[derive(Debug, Clone, Copy)]
pub struct OrgRegistry<'a> {
    /// Snapshot being read.
    state: &'a PermissionState,
}

impl<'a> OrgRegistry<'a> {
    /// Creates a view over a snapshot.
    #[must_use]
    pub const fn new(state: &'a PermissionState) -> Self {
        Self { state }
    }

    /// Returns an org record.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotFound`] for unknown orgs.
    pub fn get_org(&self, org_id: &OrgId) -> Result<&'a OrgRecord, PermissionError> {
        self.state
            .orgs
            .get(org_id)
            .ok_or_else(|| PermissionError::not_found(EntityKind::Org, org_id))
    }

    /// Returns an org that is currently operational.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotFound`] for unknown orgs and
    /// [`PermissionError::InvalidStateTransition`] when the org or its
    /// ultimate parent is not Approved or SuspensionRevoked.
    pub fn get_operational(&self, org_id: &OrgId) -> Result<&'a OrgRecord, PermissionError> {
        let org = self.get_org(org_id)?;
        if !org.status.is_operational() {
            return Err(PermissionError::invalid_transition(
                EntityKind::Org,
                org_id,
                format!("org is {}", org.status),
            ));
        }
        if !self.is_tree_operational(org) {
            return Err(PermissionError::invalid_transition(
                EntityKind::Org,
                org_id,
                format!("master org {} is not operational", org.ultimate_parent),
            ));
        }
        Ok(org)
    }

    /// Returns true when the org's master org is operational.
    ///
    /// A missing master counts as not operational.
    #[must_use]
    pub fn is_tree_operational(&self, org: &OrgRecord) -> bool {
        if org.is_master() {
            return org.status.is_operational();
        }
        self.state
            .orgs
            .get(&org.ultimate_parent)
            .is_some_and(|master| master.status.is_operational())
    }

    /// Returns true when the org and its master org are both operational.
    #[must_use]
    pub fn is_active(&self, org_id: &OrgId) -> bool {
        self.state
            .orgs
            .get(org_id)
            .is_some_and(|org| org.status.is_operational() && self.is_tree_operational(org))
    }

    /// Iterates over every org.
    pub fn list(&self) -> Values<'a, OrgId, OrgRecord> {
        self.state.orgs.values()
    }

    /// Returns whether the org currently has `status`.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotFound`] for unknown orgs.
    pub fn check_org_status(
        &self,
        org_id: &OrgId,
        status: OrgStatus,
    ) -> Result<bool, PermissionError> {
        Ok(self.get_org(org_id)?.status == status)
    }

    /// Plans proposing a new master org.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::InvalidInput`] for dotted identifiers and
    /// [`PermissionError::AlreadyExists`] for existing orgs.
    pub fn plan_add_org(&self, org_id: &OrgId) -> Result<OrgRecord, PermissionError> {
        if org_id.is_sub_org() {
            return Err(PermissionError::InvalidInput(format!(
                "master org id `{org_id}` must not contain `.`"
            )));
        }
        if self.state.orgs.contains_key(org_id) {
            return Err(PermissionError::already_exists(EntityKind::Org, org_id));
        }
        Ok(OrgRecord::proposed_master(org_id.clone()))
    }

    /// Plans proposing a sub-org; returns the new child and the updated parent.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotFound`] for an unknown parent,
    /// [`PermissionError::InvalidStateTransition`] when the parent is not
    /// operational, [`PermissionError::InvalidInput`] for a bad segment,
    /// [`PermissionError::AlreadyExists`] for an existing child, and
    /// [`PermissionError::LimitExceeded`] when depth or breadth would exceed
    /// `limits`.
    pub fn plan_add_sub_org(
        &self,
        parent_id: &OrgId,
        segment: &str,
        limits: SubOrgLimits,
    ) -> Result<(OrgRecord, OrgRecord), PermissionError> {
        let parent = self.get_operational(parent_id)?;
        let child_id = parent_id.child(segment)?;
        if self.state.orgs.contains_key(&child_id) {
            return Err(PermissionError::already_exists(EntityKind::Org, &child_id));
        }
        if parent.level >= limits.max_depth {
            return Err(PermissionError::LimitExceeded {
                kind: EntityKind::Org,
                key: parent_id.to_string(),
                detail: format!("maximum depth {} reached", limits.max_depth),
            });
        }
        if parent.sub_orgs.len() >= limits.max_breadth {
            return Err(PermissionError::LimitExceeded {
                kind: EntityKind::Org,
                key: parent_id.to_string(),
                detail: format!("maximum of {} sub-orgs reached", limits.max_breadth),
            });
        }
        let child = OrgRecord::proposed_sub_org(child_id.clone(), parent);
        let mut updated_parent = parent.clone();
        updated_parent.sub_orgs.push(child_id);
        Ok((child, updated_parent))
    }

    /// Plans approving a proposed org.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotFound`] for unknown orgs and
    /// [`PermissionError::InvalidStateTransition`] unless the org is Proposed.
    pub fn plan_approve(&self, org_id: &OrgId) -> Result<OrgRecord, PermissionError> {
        let org = self.get_org(org_id)?;
        if org.status != OrgStatus::Proposed {
            return Err(PermissionError::invalid_transition(
                EntityKind::Org,
                org_id,
                format!("org is {}, not proposed", org.status),
            ));
        }
        let mut record = org.clone();
        record.status = OrgStatus::Approved;
        Ok(record)
    }

    /// Plans the first phase of a status update.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotFound`] for unknown orgs and
    /// [`PermissionError::InvalidStateTransition`] for sub-orgs, orgs with an
    /// update already pending, and transitions that do not apply.
    pub fn plan_status_proposal(
        &self,
        org_id: &OrgId,
        action: OrgStatusAction,
    ) -> Result<OrgRecord, PermissionError> {
        let org = self.get_org(org_id)?;
        let reject = |detail: String| -> Result<OrgRecord, PermissionError> {
            Err(PermissionError::invalid_transition(EntityKind::Org, org_id, detail))
        };
        if !org.is_master() {
            return reject("status updates apply to master orgs only".to_string());
        }
        if let Some(pending) = org.pending_status {
            return reject(format!("status update to {pending} already pending"));
        }
        let allowed = match action {
            OrgStatusAction::Suspend => org.status.is_operational(),
            OrgStatusAction::RevokeSuspension => org.status == OrgStatus::Suspended,
        };
        if !allowed {
            return reject(format!("cannot move from {} to {}", org.status, action.target_status()));
        }
        let mut record = org.clone();
        record.pending_status = Some(action.target_status());
        Ok(record)
    }

    /// Returns the org with a pending status applied.
    #[must_use]
    pub fn with_status(org: &OrgRecord, status: OrgStatus) -> OrgRecord {
        let mut record = org.clone();
        record.status = status;
        record.pending_status = None;
        record
    }
}
