// crates/permission-engine-core/src/runtime/mod.rs
// ============================================================================
// Module: Permission Runtime
// Description: Registries, consensus, planning, and the permission engine.
// Purpose: Turn authorized requests into atomic, voter-gated state changes.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Registries are read-only views over a snapshot that plan single-record
//! changes. The consensus engine owns pending-operation slots and only
//! returns decisions. The engine applies whole plans atomically through the
//! ledger and publishes events once they commit.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod access;
mod account_actions;
pub mod accounts;
pub mod audit;
pub mod authority;
pub mod consensus;
pub mod engine;
pub mod event_log;
pub mod ledger;
mod locks;
mod network_actions;
mod node_actions;
pub mod nodes;
mod org_actions;
pub mod orgs;
mod planner;
pub mod roles;
pub mod voters;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use access::AccessControl;
pub use accounts::AccountRegistry;
pub use accounts::AccountStatusAction;
pub use audit::ActionAuditEvent;
pub use audit::ActionOutcomeLabel;
pub use audit::AuditSink;
pub use audit::EventDeliveryAuditEvent;
pub use audit::FileAuditSink;
pub use audit::InMemoryAuditSink;
pub use audit::LedgerRetryAuditEvent;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use authority::Authority;
pub use consensus::CommitInstruction;
pub use consensus::ConsensusEngine;
pub use consensus::VoteDecision;
pub use consensus::threshold_met;
pub use engine::ActionOutcome;
pub use engine::AuthContext;
pub use engine::EngineConfig;
pub use engine::OrgDetails;
pub use engine::PermissionEngine;
pub use engine::RetryPolicy;
pub use event_log::InMemoryEventLog;
pub use event_log::SharedEventSink;
pub use ledger::InMemoryLedger;
pub use ledger::SharedLedger;
pub use network_actions::NetworkBootstrap;
pub use nodes::NodeRegistry;
pub use nodes::NodeStatusAction;
pub use orgs::OrgRegistry;
pub use orgs::OrgStatusAction;
pub use orgs::SubOrgLimits;
pub use roles::RoleDefinition;
pub use roles::RoleRegistry;
pub use voters::VoterRegistry;
