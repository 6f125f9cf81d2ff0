// crates/permission-engine-broker/src/sink.rs
// ============================================================================
// Module: Event Sinks
// Description: Reference event sink implementations.
// Purpose: Deliver committed events to logs, callbacks, and multiple sinks.
// Dependencies: permission-engine-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Sinks here are synchronous and report failures to the engine, which
//! retries transport errors under its retry policy.
//! Invariants:
//! - [`LogEventSink`] writes one JSON object per line and flushes each event.
//! - [`FanoutEventSink`] attempts every inner sink even after a failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;

use permission_engine_core::EventSink;
use permission_engine_core::EventSinkError;
use permission_engine_core::PermissionEvent;
use serde::Serialize;

// ============================================================================
// SECTION: Log Sink
// ============================================================================

/// JSON-line record written by [`LogEventSink`].
#[derive(Serialize)]
struct EventLogRecord<'a> {
    /// Sequence number within this sink, starting at 1.
    seq: u64,
    /// Event payload.
    #[serde(flatten)]
    event: &'a PermissionEvent,
}

/// Event sink that writes JSON lines to a writer.
pub struct LogEventSink<W> {
    /// Writer and running sequence number.
    inner: Mutex<(W, u64)>,
}

impl<W: Write + Send> LogEventSink<W> {
    /// Creates a log sink over `writer`.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new((writer, 0)),
        }
    }

    /// Consumes the sink and returns the writer.
    ///
    /// # Errors
    ///
    /// Returns [`EventSinkError::Transport`] when the writer mutex is poisoned.
    pub fn into_inner(self) -> Result<W, EventSinkError> {
        self.inner
            .into_inner()
            .map(|(writer, _)| writer)
            .map_err(|_| EventSinkError::Transport("log sink mutex poisoned".to_string()))
    }
}

impl<W: Write + Send> EventSink for LogEventSink<W> {
    fn publish(&self, event: &PermissionEvent) -> Result<(), EventSinkError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| EventSinkError::Transport("log sink mutex poisoned".to_string()))?;
        let (writer, seq) = &mut *guard;
        let record = EventLogRecord {
            seq: seq.saturating_add(1),
            event,
        };
        let line = serde_json::to_string(&record)
            .map_err(|err| EventSinkError::Rejected(err.to_string()))?;
        writeln!(writer, "{line}").map_err(|err| EventSinkError::Transport(err.to_string()))?;
        writer.flush().map_err(|err| EventSinkError::Transport(err.to_string()))?;
        *seq = record.seq;
        drop(guard);
        Ok(())
    }
}

// ============================================================================
// SECTION: Callback Sink
// ============================================================================

/// Handler signature used by [`CallbackEventSink`].
type EventHandler = dyn Fn(&PermissionEvent) -> Result<(), EventSinkError> + Send + Sync;

/// Event sink that invokes a caller-supplied handler.
pub struct CallbackEventSink {
    /// Handler invoked per event.
    handler: Box<EventHandler>,
}

impl CallbackEventSink {
    /// Creates a sink from a fallible handler.
    #[must_use]
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&PermissionEvent) -> Result<(), EventSinkError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
        }
    }

    /// Creates a sink from a handler that cannot fail.
    #[must_use]
    pub fn infallible<F>(handler: F) -> Self
    where
        F: Fn(&PermissionEvent) + Send + Sync + 'static,
    {
        Self::new(move |event| {
            handler(event);
            Ok(())
        })
    }
}

impl EventSink for CallbackEventSink {
    fn publish(&self, event: &PermissionEvent) -> Result<(), EventSinkError> {
        (self.handler)(event)
    }
}

// ============================================================================
// SECTION: Fanout Sink
// ============================================================================

/// Event sink that publishes to several sinks in order.
#[derive(Clone, Default)]
pub struct FanoutEventSink {
    /// Inner sinks.
    sinks: Vec<Arc<dyn EventSink + Send + Sync>>,
}

impl FanoutEventSink {
    /// Creates an empty fanout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    #[must_use]
    pub fn with_sink(mut self, sink: impl EventSink + Send + Sync + 'static) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Returns the number of inner sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns true when no sinks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for FanoutEventSink {
    /// Publishes to every sink and returns the first failure, preferring a
    /// retryable one. A retry republishes to every sink, including those that
    /// already succeeded.
    fn publish(&self, event: &PermissionEvent) -> Result<(), EventSinkError> {
        let mut first_error: Option<EventSinkError> = None;
        for sink in &self.sinks {
            if let Err(error) = sink.publish(event) {
                match &first_error {
                    None => first_error = Some(error),
                    Some(existing) if !existing.is_retryable() && error.is_retryable() => {
                        first_error = Some(error);
                    }
                    Some(_) => {}
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
