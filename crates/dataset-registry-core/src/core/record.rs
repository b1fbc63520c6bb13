// crates/dataset-registry-core/src/core/record.rs
// ============================================================================
// Module: Dataset Records
// Description: Dataset record model, mutability state, and mutation inputs.
// Purpose: Provide the canonical, serializable shape of stored dataset metadata.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`DatasetRecord`] couples an immutable identity (id, creation time,
//! sampling coordinates) with descriptive metadata that stays editable until
//! the record is frozen. Freezing is modeled as [`Mutability`] rather than a
//! bare flag; ownership is outside the frozen set and can always be
//! transferred.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::DatasetId;
use crate::core::identifiers::OwnerId;

// ============================================================================
// SECTION: Status
// ============================================================================

/// Lifecycle status label carried by a dataset record.
///
/// # Invariants
/// - Records are created `Active`; no registry operation transitions a record
///   to `Deprecated`. Only administrative import can write `Deprecated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DatasetStatus {
    /// Dataset is current.
    #[default]
    Active,
    /// Dataset is superseded but retained.
    Deprecated,
}

// ============================================================================
// SECTION: Mutability
// ============================================================================

/// Mutability state of a record's descriptive metadata.
///
/// # Invariants
/// - `Frozen` is terminal: no operation moves a record back to `Editable`.
/// - Ownership transfer is permitted in both states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mutability {
    /// Name, description, data type, and visibility may change.
    #[default]
    Editable,
    /// Descriptive metadata is permanently fixed.
    Frozen,
}

impl Mutability {
    /// Returns true when metadata is frozen.
    #[must_use]
    pub const fn is_frozen(self) -> bool {
        matches!(self, Self::Frozen)
    }
}

// ============================================================================
// SECTION: Field Sets
// ============================================================================

/// Caller-supplied dataset fields used by register and import.
///
/// # Invariants
/// - Values are unchecked; [`crate::validate_fields`] enforces range and
///   length constraints before any write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFields {
    /// Human-readable dataset name.
    pub name: String,
    /// Free-form dataset description.
    pub description: String,
    /// Instrument or measurement type label.
    pub data_type: String,
    /// Caller-supplied collection timestamp (must be positive).
    pub collection_date: u64,
    /// Minimum sampling altitude.
    pub altitude_min: u64,
    /// Maximum sampling altitude.
    pub altitude_max: u64,
    /// Latitude in micro-degrees.
    pub latitude: i64,
    /// Longitude in micro-degrees.
    pub longitude: i64,
    /// Content address of the dataset payload (may be empty).
    pub ipfs_hash: String,
    /// Whether the dataset is publicly listed.
    pub is_public: bool,
}

/// Replacement values accepted by metadata updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataUpdate {
    /// New dataset name.
    pub name: String,
    /// New dataset description.
    pub description: String,
    /// New data type label.
    pub data_type: String,
    /// New visibility flag.
    pub is_public: bool,
}

/// Administrative backfill request carrying a complete record.
///
/// # Invariants
/// - `id` is raw; zero is rejected by the registry as invalid input.
/// - `created_at`, `status`, and `mutability` are written verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetImport {
    /// Requested dataset identifier.
    pub id: u64,
    /// Owner identity for the imported record.
    pub owner: OwnerId,
    /// Dataset fields.
    pub fields: DatasetFields,
    /// Metadata mutability state.
    pub mutability: Mutability,
    /// Original creation time.
    pub created_at: u64,
    /// Lifecycle status.
    pub status: DatasetStatus,
}

// ============================================================================
// SECTION: Dataset Record
// ============================================================================

/// Stored dataset metadata record.
///
/// # Invariants
/// - `id`, `created_at`, and all coordinate fields never change after creation.
/// - `fields` satisfied the validator when the record was last written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRecord {
    /// Dataset identifier.
    pub id: DatasetId,
    /// Current owner identity.
    pub owner: OwnerId,
    /// Dataset fields.
    #[serde(flatten)]
    pub fields: DatasetFields,
    /// Metadata mutability state.
    pub mutability: Mutability,
    /// Creation time.
    pub created_at: u64,
    /// Lifecycle status.
    pub status: DatasetStatus,
}

impl DatasetRecord {
    /// Returns true when descriptive metadata is frozen.
    #[must_use]
    pub const fn metadata_frozen(&self) -> bool {
        self.mutability.is_frozen()
    }
}
