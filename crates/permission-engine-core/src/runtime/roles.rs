// crates/permission-engine-core/src/runtime/roles.rs
// ============================================================================
// Module: Role Registry
// Description: Role lookups and role lifecycle planning.
// Purpose: Resolve roles with org inheritance and validate role changes.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Roles are keyed by `(org, role)`. Lookups first try the account's own org
//! and then fall back to its ultimate parent, so sub-orgs inherit the roles of
//! their master org. Only active roles resolve.
//!
//! Removing a role marks it inactive and never touches the accounts holding
//! it; those accounts keep their cached access level until reassigned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::btree_map::Values;

use crate::core::AccessLevel;
use crate::core::EntityKind;
use crate::core::OrgId;
use crate::core::PermissionError;
use crate::core::PermissionState;
use crate::core::RoleId;
use crate::core::RoleKey;
use crate::core::RoleRecord;

// ============================================================================
// SECTION: Role Definitions
// ============================================================================

/// Attributes for a new or reactivated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinition {
    /// Defining org.
    pub org_id: OrgId,
    /// Role identifier.
    pub role_id: RoleId,
    /// Granted access.
    pub access_level: AccessLevel,
    /// Whether holders may vote.
    pub is_voter: bool,
    /// Whether this is the org-admin role.
    pub is_admin: bool,
}

// ============================================================================
// SECTION: Role Registry
// ============================================================================

/// Read view over the roles in a state snapshot.
#[derive(Debug, Clone, Copy)]
pub struct RoleRegistry<'a> {
    /// Snapshot being read.
    state: &'a PermissionState,
}

impl<'a> RoleRegistry<'a> {
    /// Creates a view over a snapshot.
    #[must_use]
    pub const fn new(state: &'a PermissionState) -> Self {
        Self { state }
    }

    /// Returns the role defined exactly at `(org_id, role_id)`, active or not.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotFound`] when no such role was ever defined.
    pub fn get_role_details(
        &self,
        org_id: &OrgId,
        role_id: &RoleId,
    ) -> Result<&'a RoleRecord, PermissionError> {
        let key = RoleKey::new(org_id.clone(), role_id.clone());
        self.state
            .roles
            .get(&key)
            .ok_or_else(|| PermissionError::not_found(EntityKind::Role, &key))
    }

    /// Resolves an active role for an org, falling back to its ultimate parent.
    #[must_use]
    pub fn resolve(&self, org_id: &OrgId, role_id: &RoleId) -> Option<&'a RoleRecord> {
        let own = self.state.roles.get(&RoleKey::new(org_id.clone(), role_id.clone()));
        if let Some(role) = own.filter(|role| role.active) {
            return Some(role);
        }
        let parent = &self.state.orgs.get(org_id)?.ultimate_parent;
        if parent == org_id {
            return None;
        }
        self.state
            .roles
            .get(&RoleKey::new(parent.clone(), role_id.clone()))
            .filter(|role| role.active)
    }

    /// Returns true when the role resolves and carries voting rights.
    #[must_use]
    pub fn is_voter_role(&self, org_id: &OrgId, role_id: &RoleId) -> bool {
        self.resolve(org_id, role_id).is_some_and(|role| role.is_voter)
    }

    /// Returns true when the role resolves and grants full access.
    #[must_use]
    pub fn is_full_access_role(&self, org_id: &OrgId, role_id: &RoleId) -> bool {
        self.resolve(org_id, role_id)
            .is_some_and(|role| role.access_level == AccessLevel::FullAccess)
    }

    /// Returns the active admin role defined exactly in `org_id`.
    #[must_use]
    pub fn own_admin_role(&self, org_id: &OrgId) -> Option<&'a RoleRecord> {
        self.state
            .roles
            .values()
            .find(|role| &role.org_id == org_id && role.active && role.is_admin)
    }

    /// Returns the admin role governing `org_id`, inherited from its ultimate parent.
    #[must_use]
    pub fn admin_role(&self, org_id: &OrgId) -> Option<&'a RoleRecord> {
        self.own_admin_role(org_id).or_else(|| {
            let parent = &self.state.orgs.get(org_id)?.ultimate_parent;
            self.own_admin_role(parent)
        })
    }

    /// Iterates over every role, active or not.
    pub fn list(&self) -> Values<'a, RoleKey, RoleRecord> {
        self.state.roles.values()
    }

    /// Validates a role definition and returns the record to store.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotFound`] when the org is unknown and
    /// [`PermissionError::AlreadyExists`] when the role is already active or a
    /// second admin role would be created.
    pub fn plan_add(&self, definition: &RoleDefinition) -> Result<RoleRecord, PermissionError> {
        if !self.state.orgs.contains_key(&definition.org_id) {
            return Err(PermissionError::not_found(EntityKind::Org, &definition.org_id));
        }
        let key = RoleKey::new(definition.org_id.clone(), definition.role_id.clone());
        if self.state.roles.get(&key).is_some_and(|role| role.active) {
            return Err(PermissionError::already_exists(EntityKind::Role, &key));
        }
        if definition.is_admin
            && let Some(existing) = self.own_admin_role(&definition.org_id)
        {
            return Err(PermissionError::already_exists(EntityKind::Role, existing.key()));
        }
        Ok(RoleRecord {
            role_id: definition.role_id.clone(),
            org_id: definition.org_id.clone(),
            access_level: definition.access_level,
            is_voter: definition.is_voter,
            is_admin: definition.is_admin,
            active: true,
        })
    }

    /// Validates a role removal and returns the deactivated record.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::NotFound`] for unknown roles and
    /// [`PermissionError::InvalidStateTransition`] for inactive or admin roles.
    pub fn plan_remove(
        &self,
        org_id: &OrgId,
        role_id: &RoleId,
    ) -> Result<RoleRecord, PermissionError> {
        let role = self.get_role_details(org_id, role_id)?;
        if !role.active {
            return Err(PermissionError::invalid_transition(
                EntityKind::Role,
                role.key(),
                "role is already inactive",
            ));
        }
        if role.is_admin {
            return Err(PermissionError::invalid_transition(
                EntityKind::Role,
                role.key(),
                "admin role cannot be removed",
            ));
        }
        let mut record = role.clone();
        record.active = false;
        Ok(record)
    }
}
