// crates/permission-engine-broker/tests/sinks.rs
// ============================================================================
// Module: Event Sink Tests
// Description: Tests for log, callback, and fanout event sinks.
// Purpose: Validate JSON-line output, handler invocation, and error reporting.
// Dependencies: permission-engine-broker, permission-engine-core, serde_json
// ============================================================================

//! ## Overview
//! Exercises the synchronous sinks the engine publishes committed events to.

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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;

use common::FailingWriter;
use common::SharedBuffer;
use common::org_approved;
use common::org_proposed;
use permission_engine_broker::CallbackEventSink;
use permission_engine_broker::FanoutEventSink;
use permission_engine_broker::LogEventSink;
use permission_engine_core::EventKind;
use permission_engine_core::EventSink;
use permission_engine_core::EventSinkError;
use permission_engine_core::PermissionEvent;
use serde_json::Value;

// ============================================================================
// SECTION: Log Sink
// ============================================================================

/// Tests log sink writes one numbered JSON record per event.
#[test]
fn log_sink_writes_numbered_json_lines() {
    let buffer = SharedBuffer::new();
    let sink = LogEventSink::new(buffer.clone());

    sink.publish(&org_proposed("ORG1")).unwrap();
    sink.publish(&org_approved("ORG1")).unwrap();

    let lines = buffer.lines();
    assert_eq!(lines.len(), 2);
    let first: Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(first["seq"], 1);
    assert_eq!(first["event"], "org_proposed");
    assert_eq!(first["org_id"], "ORG1");
    let second: Value = serde_json::from_str(&lines[1]).unwrap();
    assert_eq!(second["seq"], 2);
    assert_eq!(second["event"], "org_approved");
}

/// Tests log sink reports write failures as transport errors.
#[test]
fn log_sink_write_failure_is_retryable() {
    let sink = LogEventSink::new(FailingWriter);
    let error = sink.publish(&org_approved("ORG1")).unwrap_err();
    assert!(matches!(error, EventSinkError::Transport(_)));
    assert!(error.is_retryable());
}

// ============================================================================
// SECTION: Callback Sink
// ============================================================================

/// Tests callback sink invokes its handler with each event.
#[test]
fn callback_sink_invokes_handler() {
    let seen: Arc<Mutex<Vec<EventKind>>> = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&seen);
    let sink = CallbackEventSink::infallible(move |event: &PermissionEvent| {
        captured.lock().unwrap().push(event.kind());
    });

    sink.publish(&org_proposed("ORG1")).unwrap();
    sink.publish(&org_approved("ORG1")).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![EventKind::OrgProposed, EventKind::OrgApproved]);
}

/// Tests callback sink propagates handler errors.
#[test]
fn callback_sink_propagates_rejection() {
    let sink = CallbackEventSink::new(|_event| Err(EventSinkError::Rejected("nope".to_string())));
    let error = sink.publish(&org_approved("ORG1")).unwrap_err();
    assert_eq!(error, EventSinkError::Rejected("nope".to_string()));
}

// ============================================================================
// SECTION: Fanout Sink
// ============================================================================

/// Tests fanout delivers to every sink even when one fails.
#[test]
fn fanout_attempts_every_sink() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let buffer = SharedBuffer::new();
    let fanout = FanoutEventSink::new()
        .with_sink(CallbackEventSink::new(|_event| {
            Err(EventSinkError::Rejected("first".to_string()))
        }))
        .with_sink(LogEventSink::new(buffer.clone()))
        .with_sink(CallbackEventSink::infallible(move |_event| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
    assert_eq!(fanout.len(), 3);

    let error = fanout.publish(&org_approved("ORG1")).unwrap_err();
    assert_eq!(error, EventSinkError::Rejected("first".to_string()));
    assert_eq!(buffer.lines().len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Tests fanout prefers a retryable error so the engine retries delivery.
#[test]
fn fanout_prefers_retryable_errors() {
    let fanout = FanoutEventSink::new()
        .with_sink(CallbackEventSink::new(|_event| {
            Err(EventSinkError::Rejected("hard".to_string()))
        }))
        .with_sink(LogEventSink::new(FailingWriter));
    let error = fanout.publish(&org_approved("ORG1")).unwrap_err();
    assert!(error.is_retryable());
}

/// Tests an empty fanout accepts every event.
#[test]
fn empty_fanout_is_a_noop() {
    let fanout = FanoutEventSink::new();
    assert!(fanout.is_empty());
    fanout.publish(&org_approved("ORG1")).unwrap();
}
