// crates/permission-engine-core/src/runtime/audit.rs
// ============================================================================
// Module: Permission Audit Logging
// Description: Structured audit records for facade actions and collaborator retries.
// Purpose: Emit JSON-line audit logs without a logging framework dependency.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every facade action produces one [`ActionAuditEvent`], whether it committed,
//! opened a vote, cancelled one, or was rejected. Ledger retries and failed
//! event deliveries produce their own records so transient collaborator
//! failures stay visible even when the action eventually succeeds.
//!
//! Sinks serialize records as single JSON lines. Write failures are swallowed:
//! auditing must never change the outcome of a permission action.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use serde_json::Value;

use crate::core::ErrorKind;
use crate::core::EventKind;
use crate::core::PermissionError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome label for an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcomeLabel {
    /// Change committed.
    Committed,
    /// Vote opened or recorded without committing.
    Pending,
    /// Vote cancelled.
    Cancelled,
    /// Action rejected.
    Rejected,
}

/// Audit record for one facade action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Calling account, or `system` for bootstrap.
    pub actor: String,
    /// Action name.
    pub action: &'static str,
    /// Org slot the action was serialized under.
    pub org_id: String,
    /// Action outcome.
    pub outcome: ActionOutcomeLabel,
    /// Ledger version after the action, when it wrote one.
    pub version: Option<u64>,
    /// Error kind for rejected actions.
    pub error_kind: Option<ErrorKind>,
    /// Error message for rejected actions.
    pub error: Option<String>,
}

impl ActionAuditEvent {
    /// Builds a record for a successful action.
    #[must_use]
    pub fn success(
        actor: &str,
        action: &'static str,
        org_id: &str,
        outcome: ActionOutcomeLabel,
        version: Option<u64>,
    ) -> Self {
        Self {
            event: "permission_action",
            timestamp_ms: now_ms(),
            actor: actor.to_string(),
            action,
            org_id: org_id.to_string(),
            outcome,
            version,
            error_kind: None,
            error: None,
        }
    }

    /// Builds a record for a rejected action.
    #[must_use]
    pub fn rejected(actor: &str, action: &'static str, org_id: &str, error: &PermissionError) -> Self {
        Self {
            event: "permission_action",
            timestamp_ms: now_ms(),
            actor: actor.to_string(),
            action,
            org_id: org_id.to_string(),
            outcome: ActionOutcomeLabel::Rejected,
            version: None,
            error_kind: Some(error.kind()),
            error: Some(error.to_string()),
        }
    }
}

/// Audit record for one failed ledger attempt.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerRetryAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Org slot of the mutation.
    pub org_id: String,
    /// Attempt number, starting at 1.
    pub attempt: u32,
    /// Configured attempt limit.
    pub max_attempts: u32,
    /// Whether another attempt follows.
    pub will_retry: bool,
    /// Ledger error message.
    pub error: String,
}

impl LedgerRetryAuditEvent {
    /// Builds a retry record.
    #[must_use]
    pub fn new(org_id: &str, attempt: u32, max_attempts: u32, will_retry: bool, error: String) -> Self {
        Self {
            event: "ledger_retry",
            timestamp_ms: now_ms(),
            org_id: org_id.to_string(),
            attempt,
            max_attempts,
            will_retry,
            error,
        }
    }
}

/// Audit record for an event that could not be delivered.
#[derive(Debug, Clone, Serialize)]
pub struct EventDeliveryAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Kind of the undelivered event.
    pub kind: EventKind,
    /// Attempts made.
    pub attempts: u32,
    /// Last delivery error.
    pub error: String,
}

impl EventDeliveryAuditEvent {
    /// Builds a delivery failure record.
    #[must_use]
    pub fn new(kind: EventKind, attempts: u32, error: String) -> Self {
        Self {
            event: "event_delivery_failed",
            timestamp_ms: now_ms(),
            kind,
            attempts,
            error,
        }
    }
}

/// Returns milliseconds since the Unix epoch, or zero if the clock is earlier.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for permission activity.
pub trait AuditSink: Send + Sync {
    /// Records a facade action.
    fn record_action(&self, event: &ActionAuditEvent);

    /// Records a failed ledger attempt.
    fn record_ledger_retry(&self, _event: &LedgerRetryAuditEvent) {}

    /// Records an undelivered event.
    fn record_event_delivery(&self, _event: &EventDeliveryAuditEvent) {}
}

impl<T: AuditSink + ?Sized> AuditSink for Arc<T> {
    fn record_action(&self, event: &ActionAuditEvent) {
        (**self).record_action(event);
    }

    fn record_ledger_retry(&self, event: &LedgerRetryAuditEvent) {
        (**self).record_ledger_retry(event);
    }

    fn record_event_delivery(&self, event: &EventDeliveryAuditEvent) {
        (**self).record_event_delivery(event);
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl StderrAuditSink {
    /// Writes one record to stderr.
    fn write<T: Serialize>(event: &T) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

impl AuditSink for StderrAuditSink {
    fn record_action(&self, event: &ActionAuditEvent) {
        Self::write(event);
    }

    fn record_ledger_retry(&self, event: &LedgerRetryAuditEvent) {
        Self::write(event);
    }

    fn record_event_delivery(&self, event: &EventDeliveryAuditEvent) {
        Self::write(event);
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<File>,
}

impl FileAuditSink {
    /// Opens the audit log in append mode, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one record and flushes.
    fn write<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record_action(&self, event: &ActionAuditEvent) {
        self.write(event);
    }

    fn record_ledger_retry(&self, event: &LedgerRetryAuditEvent) {
        self.write(event);
    }

    fn record_event_delivery(&self, event: &EventDeliveryAuditEvent) {
        self.write(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record_action(&self, _event: &ActionAuditEvent) {}
}

/// Audit sink that keeps records in memory, for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAuditSink {
    /// Recorded events as JSON values, in order.
    records: Arc<Mutex<Vec<Value>>>,
}

impl InMemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every recorded event.
    #[must_use]
    pub fn records(&self) -> Vec<Value> {
        self.records.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Stores one record.
    fn push<T: Serialize>(&self, event: &T) {
        if let Ok(value) = serde_json::to_value(event)
            && let Ok(mut guard) = self.records.lock()
        {
            guard.push(value);
        }
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record_action(&self, event: &ActionAuditEvent) {
        self.push(event);
    }

    fn record_ledger_retry(&self, event: &LedgerRetryAuditEvent) {
        self.push(event);
    }

    fn record_event_delivery(&self, event: &EventDeliveryAuditEvent) {
        self.push(event);
    }
}
