// crates/permission-engine-core/tests/engine_pipeline.rs
// ============================================================================
// Module: Engine Pipeline Tests
// Description: Ledger writes, retries, auditing, restore, and concurrency.
// Purpose: Validate the plan/commit/publish pipeline around the registries.
// ============================================================================

//! ## Overview
//! Exercises the facade against misbehaving collaborators: ledgers that fail
//! transiently or conflict, and sinks that refuse events.

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

mod common;

use std::sync::Arc;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use common::Fixture;
use common::addr;
use common::committed;
use common::ctx;
use common::enode;
use common::org;
use common::role;
use permission_engine_core::AccessLevel;
use permission_engine_core::EngineConfig;
use permission_engine_core::ErrorKind;
use permission_engine_core::EventSink;
use permission_engine_core::EventSinkError;
use permission_engine_core::InMemoryAuditSink;
use permission_engine_core::InMemoryEventLog;
use permission_engine_core::InMemoryLedger;
use permission_engine_core::Ledger;
use permission_engine_core::LedgerError;
use permission_engine_core::LedgerMutation;
use permission_engine_core::LedgerQuery;
use permission_engine_core::NetworkBootstrap;
use permission_engine_core::NodeStatus;
use permission_engine_core::PermissionEngine;
use permission_engine_core::PermissionError;
use permission_engine_core::PermissionEvent;
use permission_engine_core::PermissionState;
use permission_engine_core::RetryPolicy;
use permission_engine_core::RoleDefinition;
use serde_json::Value;

// ============================================================================
// SECTION: Collaborators
// ============================================================================

/// Ledger that fails a configurable number of applies before delegating.
#[derive(Clone, Default)]
struct FlakyLedger {
    /// Backing ledger.
    inner: InMemoryLedger,
    /// Applies still to fail.
    failures: Arc<AtomicU32>,
}

impl FlakyLedger {
    /// Makes the next `count` applies fail with a transport error.
    fn fail_next(&self, count: u32) {
        self.failures.store(count, Ordering::SeqCst);
    }
}

impl Ledger for FlakyLedger {
    fn apply(&self, mutation: &LedgerMutation) -> Result<u64, LedgerError> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(LedgerError::Transport("connection reset".to_string()));
        }
        self.inner.apply(mutation)
    }

    fn read(&self, query: &LedgerQuery) -> Result<PermissionState, LedgerError> {
        self.inner.read(query)
    }
}

/// Ledger that reports a configurable number of version conflicts.
#[derive(Clone, Default)]
struct ContendedLedger {
    /// Backing ledger.
    inner: InMemoryLedger,
    /// Conflicts still to report.
    conflicts: Arc<AtomicU32>,
}

impl Ledger for ContendedLedger {
    fn apply(&self, mutation: &LedgerMutation) -> Result<u64, LedgerError> {
        let remaining = self.conflicts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.conflicts.store(remaining - 1, Ordering::SeqCst);
            return Err(LedgerError::Conflict {
                expected: mutation.base_version,
                found: mutation.base_version + 1,
            });
        }
        self.inner.apply(mutation)
    }

    fn read(&self, query: &LedgerQuery) -> Result<PermissionState, LedgerError> {
        self.inner.read(query)
    }
}

/// Event sink that refuses every event.
#[derive(Clone, Default)]
struct RefusingSink {
    /// Delivery attempts seen.
    attempts: Arc<AtomicU32>,
}

impl EventSink for RefusingSink {
    fn publish(&self, _event: &PermissionEvent) -> Result<(), EventSinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(EventSinkError::Rejected("subscriber gone".to_string()))
    }
}

/// Retry policy with three attempts and no delay.
const fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_backoff: Duration::ZERO,
        max_backoff: Duration::ZERO,
    }
}

/// Bootstraps a single admin network over `ledger`.
fn bootstrapped_over<L: Ledger, E: EventSink>(
    ledger: L,
    events: E,
    audit: InMemoryAuditSink,
) -> PermissionEngine<L, E, InMemoryAuditSink> {
    let config = EngineConfig {
        retry: fast_retry(),
        ..EngineConfig::default()
    };
    let engine = PermissionEngine::open(config, ledger, events, audit).unwrap();
    engine
        .bootstrap(&NetworkBootstrap {
            admin_accounts: vec![addr(1)],
            admin_nodes: vec![enode("admin-node")],
        })
        .unwrap();
    engine
}

/// Returns audit records whose `event` field equals `name`.
fn records_named(audit: &InMemoryAuditSink, name: &str) -> Vec<Value> {
    audit.records().into_iter().filter(|record| record["event"] == name).collect()
}

/// Role definition used by pipeline tests.
fn transact_role(org_id: &str, role_id: &str) -> RoleDefinition {
    RoleDefinition {
        org_id: org(org_id),
        role_id: role(role_id),
        access_level: AccessLevel::Transact,
        is_voter: false,
        is_admin: false,
    }
}

// ============================================================================
// SECTION: Ledger Writes
// ============================================================================

#[test]
fn each_commit_appends_one_mutation() {
    let fixture = Fixture::bootstrapped(1);
    fixture.with_org("ORG1", "org1-node", &addr(10));
    let before = fixture.version();
    fixture.engine.add_role(&ctx(&addr(10)), &transact_role("ORG1", "TX")).unwrap();

    let mutations = fixture.ledger.mutations().unwrap();
    let last = mutations.last().unwrap();
    assert_eq!(last.partition, org("ORG1"));
    assert_eq!(last.base_version, before);
    assert_eq!(fixture.version(), before + 1);
    assert_eq!(u64::try_from(mutations.len()).unwrap(), fixture.version());
}

#[test]
fn outcome_reports_committed_version() {
    let fixture = Fixture::bootstrapped(1);
    let outcome = fixture
        .engine
        .add_org(&fixture.admin(0), &org("ORG1"), &enode("org1-node"), &addr(10))
        .unwrap();
    assert!(committed(&outcome));
    assert_eq!(outcome.version(), fixture.version());
    assert_eq!(fixture.ledger.read(&LedgerQuery::Full).unwrap().version, outcome.version());
}

#[test]
fn scoped_read_returns_one_org_tree() {
    let fixture = Fixture::bootstrapped(1);
    fixture.with_org("ORG1", "org1-node", &addr(10));
    fixture.with_org("ORG2", "org2-node", &addr(20));
    fixture.engine.add_sub_org(&ctx(&addr(10)), &org("ORG1"), "A", None).unwrap();

    let scoped = fixture.ledger.read(&LedgerQuery::Org(org("ORG1"))).unwrap();
    assert_eq!(scoped.orgs.keys().cloned().collect::<Vec<_>>(), vec![org("ORG1"), org("ORG1.A")]);
    assert_eq!(scoped.nodes.len(), 1);
    assert!(scoped.accounts.contains_key(&addr(10)));
    assert!(!scoped.accounts.contains_key(&addr(20)));
}

#[test]
fn restore_rebuilds_snapshot_from_ledger() {
    let fixture = Fixture::bootstrapped(1);
    fixture.with_org("ORG1", "org1-node", &addr(10));
    fixture.boot();
    fixture.engine.propose_node(&ctx(&addr(10)), &org("ORG1"), &enode("n2")).unwrap();

    let reopened = PermissionEngine::open(
        Fixture::config(),
        fixture.ledger.clone(),
        InMemoryEventLog::new(),
        InMemoryAuditSink::new(),
    )
    .unwrap();
    let original = fixture.engine.snapshot().unwrap();
    let restored = reopened.snapshot().unwrap();
    assert_eq!(original.fingerprint().unwrap(), restored.fingerprint().unwrap());
    assert!(reopened.pending_operation(&org("ORG1")).unwrap().is_some());
    assert_eq!(reopened.restore().unwrap(), fixture.version());
}

#[test]
fn state_survives_json_round_trip() {
    let fixture = Fixture::bootstrapped(2);
    fixture.with_org("ORG1", "org1-node", &addr(10));
    fixture.engine.add_role(&ctx(&addr(10)), &transact_role("ORG1", "TX")).unwrap();
    fixture.boot();
    fixture.engine.propose_node(&ctx(&addr(10)), &org("ORG1"), &enode("n2")).unwrap();

    let snapshot = fixture.engine.snapshot().unwrap();
    let json = serde_json::to_string(&*snapshot).unwrap();
    let decoded: PermissionState = serde_json::from_str(&json).unwrap();
    assert_eq!(&decoded, &*snapshot);
}

// ============================================================================
// SECTION: Retries
// ============================================================================

#[test]
fn transient_ledger_failures_are_retried() {
    let ledger = FlakyLedger::default();
    let audit = InMemoryAuditSink::new();
    let engine = bootstrapped_over(ledger.clone(), InMemoryEventLog::new(), audit.clone());
    ledger.fail_next(2);

    let outcome = engine.complete_network_boot(&ctx(&addr(1))).unwrap();
    assert!(committed(&outcome));
    assert!(engine.network_boot_status().unwrap());

    let retries = records_named(&audit, "ledger_retry");
    assert_eq!(retries.len(), 2);
    assert!(retries.iter().all(|record| record["will_retry"] == true));
    assert_eq!(retries[1]["attempt"], 2);
    assert_eq!(retries[1]["max_attempts"], 3);
}

#[test]
fn exhausted_retries_reject_action() {
    let ledger = FlakyLedger::default();
    let audit = InMemoryAuditSink::new();
    let engine = bootstrapped_over(ledger.clone(), InMemoryEventLog::new(), audit.clone());
    let version = engine.snapshot().unwrap().version;
    ledger.fail_next(5);

    let error = engine.complete_network_boot(&ctx(&addr(1))).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Transport);
    assert!(!engine.network_boot_status().unwrap());
    assert_eq!(engine.snapshot().unwrap().version, version);

    let retries = records_named(&audit, "ledger_retry");
    assert_eq!(retries.len(), 3);
    assert_eq!(retries[2]["will_retry"], false);
    let actions = records_named(&audit, "permission_action");
    let last = actions.last().unwrap();
    assert_eq!(last["outcome"], "rejected");
    assert_eq!(last["error_kind"], "transport");
}

#[test]
fn version_conflict_reloads_and_replans_once() {
    let fixture = Fixture::bootstrapped(1);
    let head = fixture.version();
    fixture
        .ledger
        .apply(&LedgerMutation {
            partition: Fixture::config().network_admin_org,
            base_version: head,
            changes: Vec::new(),
        })
        .unwrap();

    let outcome = fixture.engine.complete_network_boot(&fixture.admin(0)).unwrap();
    assert!(committed(&outcome));
    assert_eq!(outcome.version(), head + 2);
    assert_eq!(fixture.version(), head + 2);
    assert!(fixture.engine.network_boot_status().unwrap());

    let retries = records_named(&fixture.audit, "ledger_retry");
    assert_eq!(retries.len(), 1);
    assert_eq!(retries[0]["will_retry"], false);
}

#[test]
fn stale_engine_picks_up_other_writer_commits() {
    let fixture = Fixture::bootstrapped(1);
    let other = PermissionEngine::open(
        Fixture::config(),
        fixture.ledger.clone(),
        InMemoryEventLog::new(),
        InMemoryAuditSink::new(),
    )
    .unwrap();
    other.add_org(&ctx(&addr(1)), &org("ORG1"), &enode("org1-node"), &addr(10)).unwrap();

    let outcome = fixture
        .engine
        .add_org(&fixture.admin(0), &org("ORG2"), &enode("org2-node"), &addr(20))
        .unwrap();
    assert!(committed(&outcome));
    let snapshot = fixture.engine.snapshot().unwrap();
    assert!(snapshot.orgs.contains_key(&org("ORG1")));
    assert!(snapshot.orgs.contains_key(&org("ORG2")));
    assert_eq!(snapshot.version, fixture.ledger.read(&LedgerQuery::Full).unwrap().version);
}

#[test]
fn replan_after_conflict_sees_other_writer_state() {
    let fixture = Fixture::bootstrapped(1);
    let other = PermissionEngine::open(
        Fixture::config(),
        fixture.ledger.clone(),
        InMemoryEventLog::new(),
        InMemoryAuditSink::new(),
    )
    .unwrap();
    other.add_org(&ctx(&addr(1)), &org("ORG1"), &enode("org1-node"), &addr(10)).unwrap();
    let head = fixture.ledger.read(&LedgerQuery::Full).unwrap().version;

    let error = fixture
        .engine
        .add_org(&fixture.admin(0), &org("ORG1"), &enode("other-node"), &addr(20))
        .unwrap_err();
    assert!(matches!(error, PermissionError::AlreadyExists { .. }));
    assert_eq!(fixture.version(), head);
    assert!(fixture.engine.org_details(&org("ORG1")).is_ok());
}

#[test]
fn repeated_conflict_rejects_after_one_replan() {
    let ledger = ContendedLedger::default();
    let audit = InMemoryAuditSink::new();
    let engine = bootstrapped_over(ledger.clone(), InMemoryEventLog::new(), audit.clone());
    let version = engine.snapshot().unwrap().version;
    ledger.conflicts.store(5, Ordering::SeqCst);

    let error = engine.complete_network_boot(&ctx(&addr(1))).unwrap_err();
    assert!(matches!(error, PermissionError::Transport { collaborator: "ledger", .. }));
    assert_eq!(ledger.conflicts.load(Ordering::SeqCst), 3);
    assert!(!engine.network_boot_status().unwrap());
    assert_eq!(engine.snapshot().unwrap().version, version);
    assert_eq!(records_named(&audit, "ledger_retry").len(), 2);
}

// ============================================================================
// SECTION: Auditing and Delivery
// ============================================================================

#[test]
fn rejected_actions_are_audited_without_writes() {
    let fixture = Fixture::bootstrapped(1);
    let version = fixture.version();
    let error = fixture
        .engine
        .add_org(&ctx(&addr(99)), &org("ORG1"), &enode("org1-node"), &addr(10))
        .unwrap_err();
    assert!(matches!(error, PermissionError::Unauthorized { .. }));
    assert_eq!(fixture.version(), version);

    let record = fixture.audit.records().pop().unwrap();
    assert_eq!(record["action"], "add_org");
    assert_eq!(record["actor"], addr(99).as_str());
    assert_eq!(record["outcome"], "rejected");
    assert_eq!(record["error_kind"], "unauthorized");
    assert_eq!(record["version"], Value::Null);
}

#[test]
fn successful_actions_are_audited_with_version() {
    let fixture = Fixture::bootstrapped(1);
    fixture.boot();
    let record = fixture.audit.records().pop().unwrap();
    assert_eq!(record["action"], "complete_network_boot");
    assert_eq!(record["outcome"], "committed");
    assert_eq!(record["version"], fixture.version());
    assert_eq!(record["org_id"], Fixture::config().network_admin_org.as_str());
}

#[test]
fn undeliverable_events_are_audited() {
    let sink = RefusingSink::default();
    let audit = InMemoryAuditSink::new();
    let engine = bootstrapped_over(InMemoryLedger::new(), sink.clone(), audit.clone());

    let outcome = engine.complete_network_boot(&ctx(&addr(1))).unwrap();
    assert!(committed(&outcome));
    let failures = records_named(&audit, "event_delivery_failed");
    let delivered_attempts = sink.attempts.load(Ordering::SeqCst) as usize;
    assert_eq!(failures.len(), delivered_attempts);
    let last = failures.last().unwrap();
    assert_eq!(last["kind"], "network_boot_completed");
    assert_eq!(last["attempts"], 1);
}

// ============================================================================
// SECTION: Concurrency
// ============================================================================

#[test]
fn actions_in_different_orgs_run_concurrently() {
    let fixture = Fixture::bootstrapped(1);
    let orgs = ["ORG1", "ORG2", "ORG3", "ORG4"];
    for (index, org_id) in orgs.iter().enumerate() {
        let admin = addr(10 + u32::try_from(index).unwrap());
        fixture.with_org(org_id, &format!("{org_id}-node"), &admin);
    }
    fixture.boot();
    let start = fixture.version();

    thread::scope(|scope| {
        for (index, org_id) in orgs.iter().enumerate() {
            let engine = &fixture.engine;
            scope.spawn(move || {
                let admin = ctx(&addr(10 + u32::try_from(index).unwrap()));
                for n in 0 .. 10 {
                    engine.add_role(&admin, &transact_role(org_id, &format!("R{n}"))).unwrap();
                }
            });
        }
    });

    assert_eq!(fixture.version(), start + 40);
    for org_id in orgs {
        assert_eq!(fixture.engine.org_details(&org(org_id)).unwrap().roles.len(), 11);
    }
    let bases: Vec<u64> =
        fixture.ledger.mutations().unwrap().iter().map(|mutation| mutation.base_version).collect();
    assert!(bases.windows(2).all(|pair| pair[1] == pair[0] + 1));
}

#[test]
fn concurrent_votes_in_one_slot_commit_once() {
    let fixture = Fixture::bootstrapped(1);
    fixture.with_org("ORG1", "org1-node", &addr(10));
    let voters: Vec<_> = (11 ..= 14).map(addr).collect();
    fixture.with_voters("ORG1", &addr(10), &voters);
    fixture.boot();
    fixture.engine.propose_node(&ctx(&addr(10)), &org("ORG1"), &enode("n2")).unwrap();

    let accepted = thread::scope(|scope| {
        let handles: Vec<_> = voters
            .iter()
            .map(|voter| {
                let engine = &fixture.engine;
                scope.spawn(move || engine.approve_node(&ctx(voter), &enode("n2")))
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).filter(Result::is_ok).count()
    });
    assert_eq!(accepted, 3);

    let node = fixture.engine.node_details(&enode("n2")).unwrap();
    assert_eq!(node.status, NodeStatus::Active);
    assert!(fixture.engine.pending_operation(&org("ORG1")).unwrap().is_none());
    let activations = fixture
        .events
        .events()
        .into_iter()
        .filter(|event| {
            matches!(event, PermissionEvent::NodeActivated { enode_id, .. } if *enode_id == enode("n2"))
        })
        .count();
    assert_eq!(activations, 1);
}
