// crates/permission-engine-core/src/interfaces/mod.rs
// ============================================================================
// Module: Permission Interfaces
// Description: Collaborator contracts for ledgers, event sinks, and payload stores.
// Purpose: Keep the permission engine independent of storage and transport.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! The engine talks to the outside world through three seams: a [`Ledger`]
//! that durably applies state changes, an [`EventSink`] that receives
//! committed events, and a [`PayloadStore`] for encrypted private payloads.
//! Implementations must fail closed: an error means nothing was applied.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::OrgId;
use crate::core::PermissionError;
use crate::core::PermissionEvent;
use crate::core::PermissionState;
use crate::core::StateChange;
use crate::core::hex_encode;

// ============================================================================
// SECTION: Ledger
// ============================================================================

/// Atomic batch of changes submitted to a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerMutation {
    /// Auth org slot the batch was planned under.
    pub partition: OrgId,
    /// Ledger version the batch was planned against.
    pub base_version: u64,
    /// Ordered changes.
    pub changes: Vec<StateChange>,
}

/// Ledger read scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerQuery {
    /// Entire permission state.
    Full,
    /// One master org's tree and its pending slots.
    Org(OrgId),
}

/// Ledger failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Temporary I/O failure; safe to retry.
    #[error("ledger transport error: {0}")]
    Transport(String),
    /// Base version does not match the ledger head.
    #[error("ledger version conflict: expected {expected}, found {found}")]
    Conflict {
        /// Version the mutation was planned against.
        expected: u64,
        /// Current ledger version.
        found: u64,
    },
    /// Persisted data failed verification.
    #[error("ledger corruption: {0}")]
    Corrupt(String),
    /// Mutation or stored data is invalid.
    #[error("ledger invalid data: {0}")]
    Invalid(String),
}

impl LedgerError {
    /// Returns true when retrying the same mutation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<LedgerError> for PermissionError {
    fn from(error: LedgerError) -> Self {
        Self::Transport {
            collaborator: "ledger",
            detail: error.to_string(),
        }
    }
}

/// Durable store of permission state.
pub trait Ledger {
    /// Applies a mutation atomically and returns the new ledger version.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the mutation cannot be applied; nothing is
    /// applied in that case.
    fn apply(&self, mutation: &LedgerMutation) -> Result<u64, LedgerError>;

    /// Reads the current state for the requested scope.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when state cannot be read or verified.
    fn read(&self, query: &LedgerQuery) -> Result<PermissionState, LedgerError>;
}

// ============================================================================
// SECTION: Event Sink
// ============================================================================

/// Event delivery failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventSinkError {
    /// Temporary delivery failure; safe to retry.
    #[error("event sink transport error: {0}")]
    Transport(String),
    /// Sink refused the event.
    #[error("event sink rejected event: {0}")]
    Rejected(String),
}

impl EventSinkError {
    /// Returns true when retrying delivery may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Receiver of committed permission events.
pub trait EventSink {
    /// Publishes one event.
    ///
    /// # Errors
    ///
    /// Returns [`EventSinkError`] when delivery fails.
    fn publish(&self, event: &PermissionEvent) -> Result<(), EventSinkError>;
}

// ============================================================================
// SECTION: Payload Store
// ============================================================================

/// Content hash returned by the payload store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PayloadHash(Vec<u8>);

impl PayloadHash {
    /// Wraps raw hash bytes.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the raw hash bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for PayloadHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex_encode(&self.0))
    }
}

/// Payload store failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadStoreError {
    /// Request could not be sent or the response could not be read.
    #[error("payload store transport error: {0}")]
    Transport(String),
    /// Store answered with a non-success status.
    #[error("payload store returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        body: String,
    },
    /// Response body was not the expected shape.
    #[error("payload store response invalid: {0}")]
    InvalidResponse(String),
}

/// Client for the encrypted private-payload store.
pub trait PayloadStore {
    /// Stores a payload and returns its content hash.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadStoreError`] on any failure; callers must not assume
    /// the payload was stored.
    fn store_raw(&self, payload: &[u8], sender_hint: &str)
    -> Result<PayloadHash, PayloadStoreError>;
}
