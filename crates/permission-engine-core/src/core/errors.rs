// crates/permission-engine-core/src/core/errors.rs
// ============================================================================
// Module: Permission Errors
// Description: Typed error taxonomy shared by registries, consensus, and facade.
// Purpose: Give every rejected call a stable kind and the key it concerns.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every error carries the entity key it concerns so callers can correlate a
//! rejection with the record involved. [`ErrorKind`] provides stable labels
//! for audit records and CLI output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::IdentifierError;

// ============================================================================
// SECTION: Entity Kinds
// ============================================================================

/// Entity classes referenced by errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Organization.
    Org,
    /// Node.
    Node,
    /// Account.
    Account,
    /// Role.
    Role,
    /// Pending operation slot.
    PendingOperation,
    /// Network-wide state such as the boot flag.
    Network,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Org => "org",
            Self::Node => "node",
            Self::Account => "account",
            Self::Role => "role",
            Self::PendingOperation => "pending operation",
            Self::Network => "network",
        })
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors returned by permission operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    /// Referenced record does not exist.
    #[error("{kind} not found: {key}")]
    NotFound {
        /// Entity kind.
        kind: EntityKind,
        /// Entity key.
        key: String,
    },
    /// Record already exists.
    #[error("{kind} already exists: {key}")]
    AlreadyExists {
        /// Entity kind.
        kind: EntityKind,
        /// Entity key.
        key: String,
    },
    /// Caller lacks the privilege for the action.
    #[error("unauthorized: {caller} may not {action} for {key}")]
    Unauthorized {
        /// Calling account.
        caller: String,
        /// Attempted action.
        action: String,
        /// Entity key the action targets.
        key: String,
    },
    /// Requested status change is not allowed from the current state.
    #[error("invalid state transition for {kind} {key}: {detail}")]
    InvalidStateTransition {
        /// Entity kind.
        kind: EntityKind,
        /// Entity key.
        key: String,
        /// Reason.
        detail: String,
    },
    /// The auth org already has an open vote.
    #[error("pending operation already exists for org {org_id}")]
    PendingOperationExists {
        /// Auth org holding the open vote.
        org_id: String,
    },
    /// The auth org has no open vote.
    #[error("no pending operation for org {org_id}")]
    NoPendingOperation {
        /// Auth org.
        org_id: String,
    },
    /// Voter is not currently eligible in the auth org.
    #[error("account {account} is not a valid voter for org {org_id}")]
    NotAValidVoter {
        /// Auth org.
        org_id: String,
        /// Voting account.
        account: String,
    },
    /// Malformed identifier or request.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A configured structural limit would be exceeded.
    #[error("limit exceeded for {kind} {key}: {detail}")]
    LimitExceeded {
        /// Entity kind.
        kind: EntityKind,
        /// Entity key.
        key: String,
        /// Limit description.
        detail: String,
    },
    /// A collaborator (ledger, event sink) failed.
    #[error("{collaborator} transport error: {detail}")]
    Transport {
        /// Collaborator label.
        collaborator: &'static str,
        /// Failure detail.
        detail: String,
    },
}

impl PermissionError {
    /// Builds a not-found error.
    pub fn not_found(kind: EntityKind, key: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    /// Builds an already-exists error.
    pub fn already_exists(kind: EntityKind, key: impl fmt::Display) -> Self {
        Self::AlreadyExists {
            kind,
            key: key.to_string(),
        }
    }

    /// Builds an unauthorized error.
    pub fn unauthorized(
        caller: impl fmt::Display,
        action: impl Into<String>,
        key: impl fmt::Display,
    ) -> Self {
        Self::Unauthorized {
            caller: caller.to_string(),
            action: action.into(),
            key: key.to_string(),
        }
    }

    /// Builds an invalid-transition error.
    pub fn invalid_transition(
        kind: EntityKind,
        key: impl fmt::Display,
        detail: impl Into<String>,
    ) -> Self {
        Self::InvalidStateTransition {
            kind,
            key: key.to_string(),
            detail: detail.into(),
        }
    }

    /// Returns the stable kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidStateTransition { .. } => ErrorKind::InvalidStateTransition,
            Self::PendingOperationExists { .. } => ErrorKind::PendingOperationExists,
            Self::NoPendingOperation { .. } => ErrorKind::NoPendingOperation,
            Self::NotAValidVoter { .. } => ErrorKind::NotAValidVoter,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            Self::Transport { .. } => ErrorKind::Transport,
        }
    }
}

impl From<IdentifierError> for PermissionError {
    fn from(error: IdentifierError) -> Self {
        Self::InvalidInput(error.to_string())
    }
}

/// Stable error classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`PermissionError::NotFound`].
    NotFound,
    /// See [`PermissionError::AlreadyExists`].
    AlreadyExists,
    /// See [`PermissionError::Unauthorized`].
    Unauthorized,
    /// See [`PermissionError::InvalidStateTransition`].
    InvalidStateTransition,
    /// See [`PermissionError::PendingOperationExists`].
    PendingOperationExists,
    /// See [`PermissionError::NoPendingOperation`].
    NoPendingOperation,
    /// See [`PermissionError::NotAValidVoter`].
    NotAValidVoter,
    /// See [`PermissionError::InvalidInput`].
    InvalidInput,
    /// See [`PermissionError::LimitExceeded`].
    LimitExceeded,
    /// See [`PermissionError::Transport`].
    Transport,
}

impl ErrorKind {
    /// Returns the stable label for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::Unauthorized => "unauthorized",
            Self::InvalidStateTransition => "invalid_state_transition",
            Self::PendingOperationExists => "pending_operation_exists",
            Self::NoPendingOperation => "no_pending_operation",
            Self::NotAValidVoter => "not_a_valid_voter",
            Self::InvalidInput => "invalid_input",
            Self::LimitExceeded => "limit_exceeded",
            Self::Transport => "transport",
        }
    }
}
