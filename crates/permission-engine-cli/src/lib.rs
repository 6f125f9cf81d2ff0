// crates/permission-engine-cli/src/lib.rs
// ============================================================================
// Module: Permission Engine CLI Library
// Description: Shared helpers for the permission-engine binary.
// Purpose: Expose the message catalog to the binary and its tests.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The library target only carries the i18n catalog; command dispatch lives in
//! the binary.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod i18n;
