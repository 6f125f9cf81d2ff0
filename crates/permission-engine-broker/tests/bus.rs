// crates/permission-engine-broker/tests/bus.rs
// ============================================================================
// Module: Broadcast Event Bus Tests
// Description: Subscription filtering and engine integration for the bus.
// Purpose: Validate per-kind subscriptions, ordering, and lag reporting.
// Dependencies: permission-engine-broker, permission-engine-core, tokio
// ============================================================================

//! ## Overview
//! Subscriptions are tokio streams; tests drive them on the tokio runtime.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::time::Duration;

use common::org_approved;
use common::org_proposed;
use permission_engine_broker::BroadcastEventBus;
use permission_engine_broker::SubscriptionError;
use permission_engine_core::AccountAddress;
use permission_engine_core::AuthContext;
use permission_engine_core::EngineConfig;
use permission_engine_core::EnodeId;
use permission_engine_core::EventKind;
use permission_engine_core::EventSink;
use permission_engine_core::InMemoryLedger;
use permission_engine_core::NetworkBootstrap;
use permission_engine_core::NoopAuditSink;
use permission_engine_core::PermissionEngine;
use permission_engine_core::RetryPolicy;
use tokio::time::timeout;
use tokio_stream::StreamExt;

// ============================================================================
// SECTION: Filtering
// ============================================================================

/// Tests a subscription yields only the requested kinds in publish order.
#[tokio::test]
async fn subscription_filters_by_kind() {
    let bus = BroadcastEventBus::new();
    let mut approvals = bus.subscribe(&[EventKind::OrgApproved]);

    bus.publish(&org_proposed("ORG1")).unwrap();
    bus.publish(&org_approved("ORG1")).unwrap();
    bus.publish(&org_proposed("ORG2")).unwrap();
    bus.publish(&org_approved("ORG2")).unwrap();

    assert_eq!(approvals.next().await.unwrap().unwrap(), org_approved("ORG1"));
    assert_eq!(approvals.next().await.unwrap().unwrap(), org_approved("ORG2"));
    let nothing = timeout(Duration::from_millis(50), approvals.next()).await;
    assert!(nothing.is_err(), "no further events expected");
}

/// Tests an empty kind list subscribes to everything.
#[tokio::test]
async fn empty_kind_list_receives_all_events() {
    let bus = BroadcastEventBus::new();
    let mut all = bus.subscribe(&[]);
    assert!(all.accepts(EventKind::NetworkBootCompleted));

    bus.publish(&org_proposed("ORG1")).unwrap();
    bus.publish(&org_approved("ORG1")).unwrap();

    assert_eq!(all.next().await.unwrap().unwrap().kind(), EventKind::OrgProposed);
    assert_eq!(all.next().await.unwrap().unwrap().kind(), EventKind::OrgApproved);
}

/// Tests publishing with no subscribers still succeeds.
#[test]
fn publish_without_subscribers_is_fire_and_forget() {
    let bus = BroadcastEventBus::new();
    assert_eq!(bus.subscriber_count(), 0);
    bus.publish(&org_approved("ORG1")).unwrap();
}

/// Tests a slow subscriber observes a lag error and then resumes.
#[tokio::test]
async fn slow_subscriber_reports_lag() {
    let bus = BroadcastEventBus::with_capacity(2);
    let mut sub = bus.subscribe(&[]);
    for index in 0 .. 4 {
        bus.publish(&org_approved(&format!("ORG{index}"))).unwrap();
    }
    assert_eq!(sub.next().await.unwrap(), Err(SubscriptionError::Lagged(2)));
    assert_eq!(sub.next().await.unwrap().unwrap(), org_approved("ORG2"));
    assert_eq!(sub.next().await.unwrap().unwrap(), org_approved("ORG3"));
}

/// Tests the stream ends once every bus handle is dropped.
#[tokio::test]
async fn subscription_ends_when_bus_dropped() {
    let bus = BroadcastEventBus::new();
    let mut sub = bus.subscribe(&[]);
    bus.publish(&org_approved("ORG1")).unwrap();
    drop(bus);
    assert!(sub.next().await.unwrap().is_ok());
    assert!(sub.next().await.is_none());
}

// ============================================================================
// SECTION: Engine Integration
// ============================================================================

/// Tests committed engine events reach bus subscribers.
#[tokio::test]
async fn engine_commits_reach_subscribers() {
    let bus = BroadcastEventBus::new();
    let mut boots = bus.subscribe(&[EventKind::NetworkBootCompleted]);
    let mut approvals = bus.subscribe(&[EventKind::OrgApproved]);
    let config = EngineConfig {
        retry: RetryPolicy::none(),
        ..EngineConfig::default()
    };
    let engine =
        PermissionEngine::open(config, InMemoryLedger::new(), bus.clone(), NoopAuditSink)
            .unwrap();
    let admin = AccountAddress::new(format!("0x{:040x}", 7));
    engine
        .bootstrap(&NetworkBootstrap {
            admin_accounts: vec![admin.clone()],
            admin_nodes: vec![EnodeId::new("enode://admin@127.0.0.1:30303")],
        })
        .unwrap();
    engine.complete_network_boot(&AuthContext::new(admin)).unwrap();

    let approved = approvals.next().await.unwrap().unwrap();
    assert_eq!(approved.kind(), EventKind::OrgApproved);
    assert_eq!(boots.next().await.unwrap().unwrap().kind(), EventKind::NetworkBootCompleted);
}
