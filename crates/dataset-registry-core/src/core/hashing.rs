// crates/dataset-registry-core/src/core/hashing.rs
// ============================================================================
// Module: Dataset Registry Record Digests
// Description: Canonical JSON encoding and hex digests for stored records.
// Purpose: Give every persisted record one byte form and one digest.
// Dependencies: serde, serde_jcs, serde_json, sha2
// ============================================================================

//! ## Overview
//! Stores write dataset records as RFC 8785 (JCS) canonical JSON next to a
//! lowercase hex digest and the digest's algorithm label. On load the digest
//! is recomputed from the stored bytes and a mismatch fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

// ============================================================================
// SECTION: Algorithms
// ============================================================================

/// Digest algorithm recorded alongside a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// SHA-256.
    Sha256,
}

impl HashAlgorithm {
    /// Returns the label persisted with each digest.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }

    /// Parses a persisted label; unknown labels yield `None`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        (label == "sha256").then_some(Self::Sha256)
    }
}

/// Algorithm used for newly written records.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

// ============================================================================
// SECTION: Encoding
// ============================================================================

/// Serializes `value` as RFC 8785 canonical JSON.
///
/// # Errors
///
/// Returns the serializer error when `value` cannot be represented as JSON.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(
    value: &T,
) -> Result<Vec<u8>, serde_json::Error> {
    serde_jcs::to_vec(value)
}

/// Digests `bytes` and returns the lowercase hex form.
#[must_use]
pub fn hash_hex(algorithm: HashAlgorithm, bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let digest = match algorithm {
        HashAlgorithm::Sha256 => Sha256::digest(bytes),
    };
    let mut out = String::with_capacity(digest.len() * 2);
    for &byte in &digest {
        out.push(char::from(HEX[usize::from(byte >> 4)]));
        out.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }
    out
}
