// crates/permission-engine-broker/src/lib.rs
// ============================================================================
// Module: Permission Engine Broker Library
// Description: Event sinks and the encrypted payload store client.
// Purpose: Deliver committed permission events and store private payloads.
// Dependencies: permission-engine-core, reqwest, tokio, tokio-stream, url
// ============================================================================

//! ## Overview
//! Permission Engine Broker provides ready-made [`EventSink`] implementations
//! and an HTTP [`PayloadStore`] client.
//! Invariants:
//! - Sinks report failure instead of dropping events silently, except the
//!   broadcast bus, which is fire-and-forget when nobody subscribes.
//! - Subscriptions only yield events whose kind was requested.
//! - The payload store never retries; any non-200 answer is a hard error.
//!
//! Security posture: the payload store endpoint is an external system; treat
//! its responses as untrusted.
//!
//! [`EventSink`]: permission_engine_core::EventSink
//! [`PayloadStore`]: permission_engine_core::PayloadStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod bus;
pub mod payload_store;
pub mod sink;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use bus::BroadcastEventBus;
pub use bus::DEFAULT_BUS_CAPACITY;
pub use bus::EventSubscription;
pub use bus::SubscriptionError;
pub use payload_store::DEFAULT_PAYLOAD_TIMEOUT;
pub use payload_store::HttpPayloadStore;
pub use payload_store::MAX_RESPONSE_BYTES;
pub use sink::CallbackEventSink;
pub use sink::FanoutEventSink;
pub use sink::LogEventSink;
