// crates/permission-engine-core/src/core/identifiers.rs
// ============================================================================
// Module: Permission Identifiers
// Description: Strongly typed identifiers for orgs, nodes, roles, and accounts.
// Purpose: Validate external identifiers once at the boundary.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Identifiers serialize as plain strings. `new` constructors are unchecked and
//! intended for trusted data (ledger snapshots, tests); `parse` constructors
//! validate untrusted input and are what the CLI and config loaders call.
//!
//! Org identifiers are dotted paths: a master org is a single segment and a
//! sub-org appends `.child` to its parent's full identifier.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum length of a full org identifier, including separators.
pub const MAX_ORG_ID_LENGTH: usize = 512;
/// Maximum length of a role identifier.
pub const MAX_ROLE_ID_LENGTH: usize = 128;
/// Maximum length of an enode identifier.
pub const MAX_ENODE_ID_LENGTH: usize = 1024;
/// Number of hex digits in an account address (excluding the `0x` prefix).
const ACCOUNT_HEX_DIGITS: usize = 40;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Identifier validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} `{value}`: {reason}")]
pub struct IdentifierError {
    /// Identifier kind label.
    pub kind: &'static str,
    /// Offending raw value.
    pub value: String,
    /// Human-readable reason.
    pub reason: String,
}

impl IdentifierError {
    /// Builds a validation error for the given identifier kind.
    fn new(kind: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Returns true when the segment is non-empty and uses only `[A-Za-z0-9_-]`.
fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-')
}

// ============================================================================
// SECTION: Org Identifier
// ============================================================================

/// Organization identifier (`master` or `master.child.grandchild`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgId(String);

impl OrgId {
    /// Creates an org identifier without validation.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses and validates a full org identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when any segment is empty or contains
    /// characters outside `[A-Za-z0-9_-]`, or the identifier is too long.
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        if raw.len() > MAX_ORG_ID_LENGTH {
            return Err(IdentifierError::new("org id", raw, "identifier too long"));
        }
        if !raw.split('.').all(is_valid_segment) {
            return Err(IdentifierError::new(
                "org id",
                raw,
                "segments must be non-empty and use only letters, digits, `_` or `-`",
            ));
        }
        Ok(Self(raw.to_string()))
    }

    /// Builds the full identifier of a direct sub-org named `segment`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the segment is invalid or the combined
    /// identifier exceeds the length limit.
    pub fn child(&self, segment: &str) -> Result<Self, IdentifierError> {
        if !is_valid_segment(segment) {
            return Err(IdentifierError::new(
                "org id",
                segment,
                "sub-org name must be a single segment of letters, digits, `_` or `-`",
            ));
        }
        Self::parse(&format!("{}.{segment}", self.0))
    }

    /// Returns the master org at the root of this identifier's path.
    #[must_use]
    pub fn master(&self) -> Self {
        Self(self.0.split('.').next().unwrap_or_default().to_string())
    }

    /// Returns true when this identifier names a sub-org.
    #[must_use]
    pub fn is_sub_org(&self) -> bool {
        self.0.contains('.')
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for OrgId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Role Identifier
// ============================================================================

/// Role identifier, unique within an org.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
    /// Creates a role identifier without validation.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses and validates a role identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the identifier is empty, too long, or
    /// contains characters outside `[A-Za-z0-9_-]`.
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        if raw.len() > MAX_ROLE_ID_LENGTH {
            return Err(IdentifierError::new("role id", raw, "identifier too long"));
        }
        if !is_valid_segment(raw) {
            return Err(IdentifierError::new(
                "role id",
                raw,
                "must be non-empty and use only letters, digits, `_` or `-`",
            ));
        }
        Ok(Self(raw.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for RoleId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Enode Identifier
// ============================================================================

/// Network node identifier, unique network-wide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnodeId(String);

impl EnodeId {
    /// Creates an enode identifier without validation.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses and validates an enode identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the identifier is empty, too long, or
    /// contains whitespace or control characters.
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        if raw.is_empty() {
            return Err(IdentifierError::new("enode id", raw, "must not be empty"));
        }
        if raw.len() > MAX_ENODE_ID_LENGTH {
            return Err(IdentifierError::new("enode id", raw, "identifier too long"));
        }
        if raw.chars().any(|ch| ch.is_whitespace() || ch.is_control()) {
            return Err(IdentifierError::new(
                "enode id",
                raw,
                "must not contain whitespace or control characters",
            ));
        }
        Ok(Self(raw.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for EnodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Account Address
// ============================================================================

/// Account address: `0x` followed by 40 lowercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountAddress(String);

impl AccountAddress {
    /// Creates an account address without validation.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Parses an address, normalizing hex digits to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the value is not `0x` + 40 hex digits.
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let Some(digits) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) else {
            return Err(IdentifierError::new("account address", raw, "missing `0x` prefix"));
        };
        if digits.len() != ACCOUNT_HEX_DIGITS || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(IdentifierError::new(
                "account address",
                raw,
                "expected 40 hexadecimal digits",
            ));
        }
        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for AccountAddress {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
