// crates/dataset-registry-cli/src/input.rs
// ============================================================================
// Module: CLI Bounded Input
// Description: Size-limited reads of JSON request files.
// Purpose: Keep untrusted CLI inputs from exhausting memory.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Request payloads (dataset fields, metadata updates, import records) are
//! read from JSON files. Reads stop one byte past the limit so an oversized
//! or growing file fails closed instead of being loaded in full.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a JSON request file.
pub const MAX_INPUT_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors returned by bounded input reads.
#[derive(Debug, Error)]
pub enum InputError {
    /// File I/O failure.
    #[error("failed to read {path}: {error}")]
    Io {
        /// Input path.
        path: String,
        /// Underlying error message.
        error: String,
    },
    /// File size exceeds the limit.
    #[error("{path} is {size} bytes, exceeding the {limit} byte limit")]
    TooLarge {
        /// Input path.
        path: String,
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
    /// File contents are not the expected JSON shape.
    #[error("invalid json in {path}: {error}")]
    Json {
        /// Input path.
        path: String,
        /// Parser error message.
        error: String,
    },
}

// ============================================================================
// SECTION: Reads
// ============================================================================

/// Reads a file from disk while enforcing a hard size limit.
///
/// # Errors
///
/// Returns [`InputError`] when the file cannot be read or exceeds
/// `max_bytes`.
pub fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, InputError> {
    let file = File::open(path).map_err(|err| io_error(path, &err))?;
    let size = file.metadata().map_err(|err| io_error(path, &err))?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(InputError::TooLarge {
            path: path.display().to_string(),
            size,
            limit: max_bytes,
        });
    }
    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(|err| io_error(path, &err))?;
    if bytes.len() > max_bytes {
        return Err(InputError::TooLarge {
            path: path.display().to_string(),
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Maps an I/O failure on `path` into an input error.
fn io_error(path: &Path, err: &std::io::Error) -> InputError {
    InputError::Io {
        path: path.display().to_string(),
        error: err.to_string(),
    }
}

/// Reads and deserializes a JSON request file.
///
/// # Errors
///
/// Returns [`InputError`] when the file cannot be read, is too large, or
/// does not deserialize into `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, InputError> {
    let bytes = read_bytes_with_limit(path, MAX_INPUT_BYTES)?;
    serde_json::from_slice(&bytes).map_err(|err| InputError::Json {
        path: path.display().to_string(),
        error: err.to_string(),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
