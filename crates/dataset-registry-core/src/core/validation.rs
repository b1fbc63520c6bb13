// crates/dataset-registry-core/src/core/validation.rs
// ============================================================================
// Module: Dataset Field Validation
// Description: Pure well-formedness and range checks for dataset fields.
// Purpose: Reject malformed input before any registry state is touched.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Validation is a set of pure predicates over caller-supplied values. Every
//! mutation path runs these checks before writing, so every stored record
//! satisfied them at the time it was last written. Coordinates are expressed
//! in micro-degrees and checked against inclusive bounds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::record::DatasetFields;
use crate::core::record::MetadataUpdate;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum dataset name length in characters.
pub const MAX_NAME_CHARS: usize = 100;
/// Maximum dataset description length in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;
/// Maximum data type label length in characters.
pub const MAX_DATA_TYPE_CHARS: usize = 50;
/// Maximum content address length in characters.
pub const MAX_IPFS_HASH_CHARS: usize = 100;
/// Inclusive latitude bound in micro-degrees.
pub const LATITUDE_LIMIT: i64 = 90_000_000;
/// Inclusive longitude bound in micro-degrees.
pub const LONGITUDE_LIMIT: i64 = 180_000_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Field validation failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages name the offending field but never echo its full value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field is empty.
    #[error("{0} must be non-empty")]
    EmptyField(&'static str),
    /// A text field exceeds its length bound.
    #[error("{field} exceeds {max} characters")]
    TooLong {
        /// Field name.
        field: &'static str,
        /// Maximum allowed characters.
        max: usize,
    },
    /// Collection date is zero.
    #[error("collection_date must be positive")]
    ZeroCollectionDate,
    /// Altitude range is inverted.
    #[error("altitude_max ({max}) is below altitude_min ({min})")]
    AltitudeInverted {
        /// Supplied minimum altitude.
        min: u64,
        /// Supplied maximum altitude.
        max: u64,
    },
    /// Latitude is out of range.
    #[error("latitude {0} outside [-90000000, 90000000]")]
    LatitudeOutOfRange(i64),
    /// Longitude is out of range.
    #[error("longitude {0} outside [-180000000, 180000000]")]
    LongitudeOutOfRange(i64),
}

// ============================================================================
// SECTION: Validators
// ============================================================================

/// Validates a complete dataset field set.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered, checking text fields,
/// collection date, altitude ordering, then coordinates.
pub fn validate_fields(fields: &DatasetFields) -> Result<(), ValidationError> {
    validate_descriptive_text(&fields.name, &fields.description, &fields.data_type)?;
    check_length("ipfs_hash", &fields.ipfs_hash, MAX_IPFS_HASH_CHARS)?;
    if fields.collection_date == 0 {
        return Err(ValidationError::ZeroCollectionDate);
    }
    if fields.altitude_max < fields.altitude_min {
        return Err(ValidationError::AltitudeInverted {
            min: fields.altitude_min,
            max: fields.altitude_max,
        });
    }
    validate_coordinates(fields.latitude, fields.longitude)
}

/// Validates the replacement values of a metadata update.
///
/// # Errors
///
/// Returns [`ValidationError`] when a text field is empty or too long.
pub fn validate_update(update: &MetadataUpdate) -> Result<(), ValidationError> {
    validate_descriptive_text(&update.name, &update.description, &update.data_type)
}

/// Returns true when the field set passes validation.
#[must_use]
pub fn is_valid(fields: &DatasetFields) -> bool {
    validate_fields(fields).is_ok()
}

/// Validates latitude and longitude against their inclusive bounds.
///
/// # Errors
///
/// Returns [`ValidationError`] when either coordinate is out of range.
pub const fn validate_coordinates(latitude: i64, longitude: i64) -> Result<(), ValidationError> {
    if latitude < -LATITUDE_LIMIT || latitude > LATITUDE_LIMIT {
        return Err(ValidationError::LatitudeOutOfRange(latitude));
    }
    if longitude < -LONGITUDE_LIMIT || longitude > LONGITUDE_LIMIT {
        return Err(ValidationError::LongitudeOutOfRange(longitude));
    }
    Ok(())
}

/// Validates the three editable text fields.
fn validate_descriptive_text(
    name: &str,
    description: &str,
    data_type: &str,
) -> Result<(), ValidationError> {
    check_required("name", name, MAX_NAME_CHARS)?;
    check_required("description", description, MAX_DESCRIPTION_CHARS)?;
    check_required("data_type", data_type, MAX_DATA_TYPE_CHARS)
}

/// Rejects empty or over-long required text.
fn check_required(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    check_length(field, value, max)
}

/// Rejects text longer than `max` characters.
fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field,
            max,
        });
    }
    Ok(())
}
