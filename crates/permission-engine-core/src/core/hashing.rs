// crates/permission-engine-core/src/core/hashing.rs
// ============================================================================
// Module: Canonical Hashing
// Description: RFC 8785 JSON canonicalization and SHA-256 content digests.
// Purpose: Fingerprint permission state so persisted snapshots can be verified.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Permission state is hashed over its RFC 8785 (JCS) canonical JSON form, so
//! two snapshots with equal content always share a digest regardless of map
//! ordering or whitespace. Ledger backends store the digest next to each
//! snapshot and refuse to load one whose bytes no longer match.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Digest
// ============================================================================

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256.
    Sha256,
}

impl HashAlgorithm {
    /// Returns the stable label stored next to persisted digests.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

/// Content digest with its algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDigest {
    /// Digest algorithm.
    pub algorithm: HashAlgorithm,
    /// Lowercase hex digest.
    pub value: String,
}

/// Canonicalization failures.
#[derive(Debug, Error)]
pub enum HashError {
    /// Value could not be serialized as canonical JSON.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serializes a value as RFC 8785 canonical JSON.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Hashes a value over its canonical JSON bytes.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn hash_canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<HashDigest, HashError> {
    let bytes = canonical_json_bytes(value)?;
    Ok(sha256_digest(&bytes))
}

/// Computes the SHA-256 digest of raw bytes.
#[must_use]
pub fn sha256_digest(bytes: &[u8]) -> HashDigest {
    let digest = Sha256::digest(bytes);
    HashDigest {
        algorithm: HashAlgorithm::Sha256,
        value: hex_encode(&digest),
    }
}

/// Encodes bytes as lowercase hex.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(char::from(HEX[usize::from(byte >> 4)]));
        out.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }
    out
}
