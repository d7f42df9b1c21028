// crates/authority-gate-core/src/core/hashing.rs
// ============================================================================
// Module: Authority Gate Canonical Hashing
// Description: RFC 8785 JSON canonicalization and content hashing utilities.
// Purpose: Provide deterministic digests that bind intents, verdicts, and
//          witness records to their content.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Every hash in Authority Gate is computed over RFC 8785 (JCS) canonical
//! JSON: object keys sorted lexicographically at every depth, arrays in
//! order, minimal scalar encodings, no insignificant whitespace. Two
//! semantically identical documents therefore always produce the same
//! digest, and any field mutation produces a different one.
//!
//! Domain objects are hashed through a plain map view of their fields that
//! excludes any self-referential hash field.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Hash Algorithm
// ============================================================================

/// Supported hash algorithms for governance artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256 hashing (FIPS-friendly default).
    Sha256,
}

/// Default hash algorithm for Authority Gate.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

// ============================================================================
// SECTION: Hash Digest
// ============================================================================

/// Deterministic content hash representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDigest {
    /// Hash algorithm identifier.
    pub algorithm: HashAlgorithm,
    /// Lowercase hex-encoded digest bytes.
    pub value: String,
}

impl HashDigest {
    /// Creates a new digest from raw bytes.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm, bytes: &[u8]) -> Self {
        Self {
            algorithm,
            value: hex_encode(bytes),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when computing canonical hashes.
#[derive(Debug, Error)]
pub enum HashError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
    /// Canonical payload exceeds the allowed size.
    #[error("canonical payload too large: {actual} bytes (max {limit})")]
    SizeLimitExceeded {
        /// Maximum allowed bytes.
        limit: usize,
        /// Actual canonical payload size in bytes.
        actual: usize,
    },
}

// ============================================================================
// SECTION: Hashing Helpers
// ============================================================================

/// Returns canonical JSON bytes for a serializable value using RFC 8785.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails (for
/// example on non-finite floats, which have no canonical JSON form).
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Returns canonical JSON bytes, rejecting payloads above `max_bytes`.
///
/// Intent parameters are opaque caller-supplied maps, so hashing paths that
/// accept untrusted input bound the canonical form before digesting it.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails, or
/// [`HashError::SizeLimitExceeded`] when the canonical form is too large.
pub fn canonical_json_bytes_with_limit<T: Serialize + ?Sized>(
    value: &T,
    max_bytes: usize,
) -> Result<Vec<u8>, HashError> {
    let bytes = canonical_json_bytes(value)?;
    if bytes.len() > max_bytes {
        return Err(HashError::SizeLimitExceeded {
            limit: max_bytes,
            actual: bytes.len(),
        });
    }
    Ok(bytes)
}

/// Hashes canonical JSON using the provided algorithm.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn hash_canonical_json<T: Serialize + ?Sized>(
    algorithm: HashAlgorithm,
    value: &T,
) -> Result<HashDigest, HashError> {
    let bytes = canonical_json_bytes(value)?;
    Ok(hash_bytes(algorithm, &bytes))
}

/// Hashes canonical JSON with a size limit on the canonical form.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails, or
/// [`HashError::SizeLimitExceeded`] when the canonical form is too large.
pub fn hash_canonical_json_with_limit<T: Serialize + ?Sized>(
    algorithm: HashAlgorithm,
    value: &T,
    max_bytes: usize,
) -> Result<HashDigest, HashError> {
    let bytes = canonical_json_bytes_with_limit(value, max_bytes)?;
    Ok(hash_bytes(algorithm, &bytes))
}

/// Hashes raw bytes using the provided algorithm.
#[must_use]
pub fn hash_bytes(algorithm: HashAlgorithm, bytes: &[u8]) -> HashDigest {
    match algorithm {
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(bytes);
            let digest = hasher.finalize();
            HashDigest::new(HashAlgorithm::Sha256, &digest)
        }
    }
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
