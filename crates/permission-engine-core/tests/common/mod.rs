// crates/permission-engine-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared fixtures for permission engine tests.
// Purpose: Build bootstrapped engines with orgs, roles, and voters.
// Dependencies: permission-engine-core
// ============================================================================

//! ## Overview
//! Fixtures lean on the pre-boot shortcut: everything created before
//! `boot()` commits without a vote, so tests start from a known tree.

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]
#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use permission_engine_core::AccessLevel;
use permission_engine_core::AccountAddress;
use permission_engine_core::ActionOutcome;
use permission_engine_core::AuthContext;
use permission_engine_core::EngineConfig;
use permission_engine_core::EnodeId;
use permission_engine_core::InMemoryAuditSink;
use permission_engine_core::InMemoryEventLog;
use permission_engine_core::InMemoryLedger;
use permission_engine_core::NetworkBootstrap;
use permission_engine_core::OrgId;
use permission_engine_core::PermissionEngine;
use permission_engine_core::RetryPolicy;
use permission_engine_core::RoleDefinition;
use permission_engine_core::RoleId;

/// Engine type used across suites.
pub type TestEngine = PermissionEngine<InMemoryLedger, InMemoryEventLog, InMemoryAuditSink>;

/// Voter role created by [`Fixture::with_voters`].
pub const VOTER_ROLE: &str = "VOTER";

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Returns a deterministic account address.
pub fn addr(n: u32) -> AccountAddress {
    AccountAddress::new(format!("0x{n:040x}"))
}

/// Returns an org identifier.
pub fn org(id: &str) -> OrgId {
    OrgId::new(id)
}

/// Returns a role identifier.
pub fn role(id: &str) -> RoleId {
    RoleId::new(id)
}

/// Returns an enode identifier.
pub fn enode(id: &str) -> EnodeId {
    EnodeId::new(format!("enode://{id}@127.0.0.1:30303"))
}

/// Returns an auth context for `caller`.
pub fn ctx(caller: &AccountAddress) -> AuthContext {
    AuthContext::new(caller.clone())
}

/// Returns true when the outcome committed.
pub const fn committed(outcome: &ActionOutcome) -> bool {
    matches!(outcome, ActionOutcome::Committed { .. })
}

/// Returns true when the outcome left a vote open.
pub const fn pending(outcome: &ActionOutcome) -> bool {
    matches!(outcome, ActionOutcome::Pending { .. })
}

// ============================================================================
// SECTION: Fixture
// ============================================================================

/// Engine with its in-memory collaborators.
pub struct Fixture {
    /// Engine under test.
    pub engine: TestEngine,
    /// Ledger shared with the engine.
    pub ledger: InMemoryLedger,
    /// Event log shared with the engine.
    pub events: InMemoryEventLog,
    /// Audit sink shared with the engine.
    pub audit: InMemoryAuditSink,
    /// Network admin accounts.
    pub admins: Vec<AccountAddress>,
}

impl Fixture {
    /// Returns the configuration used by fixtures: no retry delays.
    pub fn config() -> EngineConfig {
        EngineConfig {
            retry: RetryPolicy::none(),
            ..EngineConfig::default()
        }
    }

    /// Opens an engine over an empty ledger without bootstrapping it.
    pub fn empty() -> Self {
        let ledger = InMemoryLedger::new();
        let events = InMemoryEventLog::new();
        let audit = InMemoryAuditSink::new();
        let engine =
            PermissionEngine::open(Self::config(), ledger.clone(), events.clone(), audit.clone())
                .expect("open engine");
        Self {
            engine,
            ledger,
            events,
            audit,
            admins: Vec::new(),
        }
    }

    /// Bootstraps `admins` network admins (addresses 1..=admins) and one
    /// admin node. The network is not booted yet.
    pub fn bootstrapped(admins: u32) -> Self {
        let mut fixture = Self::empty();
        fixture.admins = (1 ..= admins).map(addr).collect();
        fixture
            .engine
            .bootstrap(&NetworkBootstrap {
                admin_accounts: fixture.admins.clone(),
                admin_nodes: vec![enode("admin-node")],
            })
            .expect("bootstrap");
        fixture
    }

    /// Bootstraps and completes network boot.
    pub fn booted(admins: u32) -> Self {
        let fixture = Self::bootstrapped(admins);
        fixture.boot();
        fixture
    }

    /// Completes network boot as the first admin.
    pub fn boot(&self) {
        self.engine.complete_network_boot(&self.admin(0)).expect("complete boot");
    }

    /// Returns the auth context of network admin `index`.
    pub fn admin(&self, index: usize) -> AuthContext {
        ctx(&self.admins[index])
    }

    /// Adds an approved master org with `admin` as its org admin. Must run
    /// before boot.
    pub fn with_org(&self, org_id: &str, node: &str, admin: &AccountAddress) {
        let outcome = self
            .engine
            .add_org(&self.admin(0), &org(org_id), &enode(node), admin)
            .expect("add org");
        assert!(committed(&outcome), "pre-boot add_org should commit: {outcome:?}");
    }

    /// Creates the voter role in `org_id` and assigns it to `voters`. Must
    /// run before boot.
    pub fn with_voters(&self, org_id: &str, admin: &AccountAddress, voters: &[AccountAddress]) {
        let admin_ctx = ctx(admin);
        let org_id = org(org_id);
        if self.engine.role_details(&org_id, &role(VOTER_ROLE)).is_err() {
            self.engine
                .add_role(&admin_ctx, &RoleDefinition {
                    org_id: org_id.clone(),
                    role_id: role(VOTER_ROLE),
                    access_level: AccessLevel::Transact,
                    is_voter: true,
                    is_admin: false,
                })
                .expect("add voter role");
        }
        for voter in voters {
            self.engine
                .assign_account_role(&admin_ctx, voter, &org_id, &role(VOTER_ROLE))
                .expect("assign voter role");
        }
    }

    /// Returns the current ledger version.
    pub fn version(&self) -> u64 {
        self.engine.snapshot().expect("snapshot").version
    }
}
