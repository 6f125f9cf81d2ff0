// crates/permission-engine-core/src/core/mod.rs
// ============================================================================
// Module: Permission Core Types
// Description: Identifiers, records, pending operations, events, and state.
// Purpose: Provide the stable, serializable types every crate shares.
// Dependencies: serde, serde_jcs, sha2, thiserror
// ============================================================================

//! ## Overview
//! Core types carry no behavior beyond validation and classification. They are
//! the canonical shapes persisted by ledgers and published to subscribers.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod errors;
pub mod events;
pub mod hashing;
pub mod identifiers;
pub mod model;
pub mod pending;
pub mod state;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use errors::EntityKind;
pub use errors::ErrorKind;
pub use errors::PermissionError;
pub use events::EventKind;
pub use events::PermissionEvent;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use hashing::canonical_json_bytes;
pub use hashing::hash_canonical_json;
pub use hashing::hex_encode;
pub use hashing::sha256_digest;
pub use identifiers::AccountAddress;
pub use identifiers::EnodeId;
pub use identifiers::IdentifierError;
pub use identifiers::OrgId;
pub use identifiers::RoleId;
pub use model::AccessLevel;
pub use model::AccountRecord;
pub use model::AccountStatus;
pub use model::NodeRecord;
pub use model::NodeStatus;
pub use model::OrgRecord;
pub use model::OrgStatus;
pub use model::RoleKey;
pub use model::RoleRecord;
pub use model::TransactionKind;
pub use pending::PendingOpType;
pub use pending::PendingOperation;
pub use pending::TargetKey;
pub use pending::VoteTarget;
pub use pending::VotingItem;
pub use state::PermissionState;
pub use state::StateChange;
