// crates/dataset-registry-core/src/core/state.rs
// ============================================================================
// Module: Registry Persistence Shapes
// Description: Serializable snapshot and change-set types exchanged with stores.
// Purpose: Decouple in-memory registry structures from persisted representations.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Stores never see the registry's in-memory index structures. They receive a
//! [`RegistryChangeSet`] per committed mutation and hand back a
//! [`RegistrySnapshot`] on startup. Owner index entries carry the full ordered
//! id list for the owner so order survives a round trip.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::DatasetId;
use crate::core::identifiers::OwnerId;
use crate::core::record::DatasetRecord;

// ============================================================================
// SECTION: Registry Meta
// ============================================================================

/// Registry-wide scalar state.
///
/// # Invariants
/// - `counter` never decreases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryMeta {
    /// Highest assigned dataset identifier (0 when empty).
    pub counter: u64,
    /// Administrator identity.
    pub admin: OwnerId,
    /// Whether non-admin mutations are blocked.
    pub paused: bool,
}

/// Ordered dataset ids controlled by one owner.
///
/// # Invariants
/// - `dataset_ids` is in insertion order and duplicate-free.
/// - An empty list means the owner has no entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerIndexEntry {
    /// Owner identity.
    pub owner: OwnerId,
    /// Dataset ids in insertion order.
    pub dataset_ids: Vec<DatasetId>,
}

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Full persisted registry state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Registry-wide scalar state.
    pub meta: RegistryMeta,
    /// All stored records.
    pub records: Vec<DatasetRecord>,
    /// Non-empty owner index entries.
    pub owners: Vec<OwnerIndexEntry>,
}

// ============================================================================
// SECTION: Change Set
// ============================================================================

/// Writes produced by one committed registry mutation.
///
/// # Invariants
/// - `meta` is always the post-mutation value.
/// - `records` holds the post-mutation value of every touched record.
/// - `owners` holds the full post-mutation list of every touched owner; an
///   empty list instructs the store to drop that owner's entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryChangeSet {
    /// Registry-wide scalar state after the mutation.
    pub meta: RegistryMeta,
    /// Upserted records.
    pub records: Vec<DatasetRecord>,
    /// Replaced owner index entries.
    pub owners: Vec<OwnerIndexEntry>,
}
