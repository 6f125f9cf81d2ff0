// crates/permission-engine-broker/src/bus.rs
// ============================================================================
// Module: Broadcast Event Bus
// Description: In-process fan-out of committed permission events.
// Purpose: Let async consumers subscribe to selected event kinds.
// Dependencies: permission-engine-core, tokio, tokio-stream, thiserror
// ============================================================================

//! ## Overview
//! [`BroadcastEventBus`] is an [`EventSink`] backed by a tokio broadcast
//! channel. Each call to [`BroadcastEventBus::subscribe`] returns a stream
//! that yields only the requested [`EventKind`] values, in publish order.
//! Invariants:
//! - Publishing never blocks; with no subscribers the event is dropped.
//! - A subscriber that falls more than the channel capacity behind observes
//!   [`SubscriptionError::Lagged`] and then resumes with newer events.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use permission_engine_core::EventKind;
use permission_engine_core::EventSink;
use permission_engine_core::EventSinkError;
use permission_engine_core::PermissionEvent;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::Stream;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default number of events buffered per subscriber.
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors yielded by an event subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    /// Subscriber fell behind and missed events.
    #[error("subscription lagged; {0} events skipped")]
    Lagged(u64),
}

// ============================================================================
// SECTION: Bus
// ============================================================================

/// Broadcast event bus.
///
/// # Invariants
/// - Clones share one channel.
#[derive(Debug, Clone)]
pub struct BroadcastEventBus {
    /// Channel sender; receivers are created per subscription.
    sender: broadcast::Sender<PermissionEvent>,
}

impl BroadcastEventBus {
    /// Creates a bus with [`DEFAULT_BUS_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUS_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events per subscriber.
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
        }
    }

    /// Subscribes to events of the given kinds. An empty slice subscribes to
    /// every kind.
    #[must_use]
    pub fn subscribe(&self, kinds: &[EventKind]) -> EventSubscription {
        let kinds = if kinds.is_empty() { None } else { Some(kinds.iter().copied().collect()) };
        EventSubscription {
            inner: BroadcastStream::new(self.sender.subscribe()),
            kinds,
        }
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for BroadcastEventBus {
    fn publish(&self, event: &PermissionEvent) -> Result<(), EventSinkError> {
        // Send only fails when nobody is listening.
        let _ = self.sender.send(event.clone());
        Ok(())
    }
}

// ============================================================================
// SECTION: Subscription
// ============================================================================

/// Stream of events filtered by kind.
pub struct EventSubscription {
    /// Underlying broadcast stream.
    inner: BroadcastStream<PermissionEvent>,
    /// Requested kinds; `None` accepts every kind.
    kinds: Option<BTreeSet<EventKind>>,
}

impl EventSubscription {
    /// Returns true when the subscription accepts `kind`.
    #[must_use]
    pub fn accepts(&self, kind: EventKind) -> bool {
        self.kinds.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

impl Stream for EventSubscription {
    type Item = Result<PermissionEvent, SubscriptionError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => {
                    if this.accepts(event.kind()) {
                        return Poll::Ready(Some(Ok(event)));
                    }
                }
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(skipped)))) => {
                    return Poll::Ready(Some(Err(SubscriptionError::Lagged(skipped))));
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
