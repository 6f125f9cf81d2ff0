// crates/permission-engine-core/src/runtime/event_log.rs
// ============================================================================
// Module: In-Memory Event Log
// Description: Event sink that records published events in order.
// Purpose: Observe committed events in tests and short-lived processes.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryEventLog`] is a cloneable event sink; clones share one log.
//! [`SharedEventSink`] wraps any sink behind an `Arc` trait object.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use crate::core::EventKind;
use crate::core::PermissionEvent;
use crate::interfaces::EventSink;
use crate::interfaces::EventSinkError;

// ============================================================================
// SECTION: In-Memory Event Log
// ============================================================================

/// In-memory event sink.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventLog {
    /// Published events, oldest first.
    events: Arc<Mutex<Vec<PermissionEvent>>>,
}

impl InMemoryEventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every published event.
    #[must_use]
    pub fn events(&self) -> Vec<PermissionEvent> {
        self.events.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Returns the kinds of every published event.
    #[must_use]
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events().iter().map(PermissionEvent::kind).collect()
    }

    /// Removes and returns every published event.
    #[must_use]
    pub fn drain(&self) -> Vec<PermissionEvent> {
        self.events.lock().map(|mut guard| std::mem::take(&mut *guard)).unwrap_or_default()
    }
}

impl EventSink for InMemoryEventLog {
    fn publish(&self, event: &PermissionEvent) -> Result<(), EventSinkError> {
        self.events
            .lock()
            .map_err(|_| EventSinkError::Transport("event log mutex poisoned".to_string()))?
            .push(event.clone());
        Ok(())
    }
}

// ============================================================================
// SECTION: Shared Event Sink
// ============================================================================

/// Shared event sink wrapper for trait objects.
#[derive(Clone)]
pub struct SharedEventSink {
    /// Inner sink implementation.
    inner: Arc<dyn EventSink + Send + Sync>,
}

impl SharedEventSink {
    /// Wraps a sink implementation.
    #[must_use]
    pub fn from_sink(sink: impl EventSink + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(sink),
        }
    }
}

impl EventSink for SharedEventSink {
    fn publish(&self, event: &PermissionEvent) -> Result<(), EventSinkError> {
        self.inner.publish(event)
    }
}
