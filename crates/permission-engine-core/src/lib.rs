// crates/permission-engine-core/src/lib.rs
// ============================================================================
// Module: Permission Engine Core Library
// Description: Multi-org, voter-gated permissioning engine.
// Purpose: Govern orgs, nodes, roles, and accounts through majority votes.
// Dependencies: serde, serde_json, serde_jcs, sha2, thiserror
// ============================================================================

//! ## Overview
//! Permission Engine Core decides who may join a permissioned network and how
//! administrative changes reach consensus before they take effect. It has no
//! I/O of its own: state is persisted through a [`Ledger`] and committed
//! events go to an [`EventSink`].
//! Invariants:
//! - Each auth org holds at most one pending operation.
//! - A vote commits once strictly more than half of the current valid voters
//!   approve; with no valid voters, or before network boot, it commits at once.
//! - Every action is applied as one atomic batch or not at all.
//!
//! Security posture: callers are identified by an explicit [`AuthContext`];
//! authentication happens outside this crate.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::EventSink;
pub use interfaces::EventSinkError;
pub use interfaces::Ledger;
pub use interfaces::LedgerError;
pub use interfaces::LedgerMutation;
pub use interfaces::LedgerQuery;
pub use interfaces::PayloadHash;
pub use interfaces::PayloadStore;
pub use interfaces::PayloadStoreError;
pub use runtime::*;
