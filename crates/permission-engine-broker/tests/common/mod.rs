// crates/permission-engine-broker/tests/common/mod.rs
// ============================================================================
// Module: Common Broker Test Utilities
// Description: Shared writers and sample events for broker tests.
// Purpose: Reduce duplication across sink, bus, and payload store suites.
// Dependencies: permission-engine-core
// ============================================================================

//! ## Overview
//! Helpers for capturing sink output and building sample events.

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

use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;

use permission_engine_core::OrgId;
use permission_engine_core::PermissionEvent;

// ============================================================================
// SECTION: Sample Events
// ============================================================================

/// Returns an org-proposed event.
pub fn org_proposed(org: &str) -> PermissionEvent {
    PermissionEvent::OrgProposed {
        org_id: OrgId::new(org),
        parent_org_id: None,
    }
}

/// Returns an org-approved event.
pub fn org_approved(org: &str) -> PermissionEvent {
    PermissionEvent::OrgApproved {
        org_id: OrgId::new(org),
    }
}

// ============================================================================
// SECTION: Shared Buffer
// ============================================================================

/// Writer that stores bytes in a shared buffer.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Creates a new empty shared buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the contents as a string.
    pub fn to_string_lossy(&self) -> String {
        let guard = self.inner.lock().expect("buffer lock");
        String::from_utf8_lossy(&guard).to_string()
    }

    /// Returns the contents split into lines.
    pub fn lines(&self) -> Vec<String> {
        self.to_string_lossy().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.lock().expect("buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Failing Writer
// ============================================================================

/// A writer that always fails, for testing error paths.
pub struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::other("simulated write failure"))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
