// crates/dataset-registry-core/src/runtime/owner_index.rs
// ============================================================================
// Module: Owner Index
// Description: Bounded, ordered, duplicate-free dataset id lists per owner.
// Purpose: Answer "which datasets does this owner control" without scanning records.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Each owner maps to an append-only sequence of dataset ids paired with a
//! hash set for O(1) membership. Adding an id that is already present is a
//! successful no-op; removing preserves the relative order of the remaining
//! ids. Owners whose sequence becomes empty are dropped from the map.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashSet;

use thiserror::Error;

use crate::core::DatasetId;
use crate::core::OwnerId;
use crate::core::OwnerIndexEntry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum number of dataset ids a single owner may control.
pub const OWNER_INDEX_CAPACITY: usize = 1000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Owner index errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OwnerIndexError {
    /// Owner already controls the maximum number of datasets.
    #[error("owner {owner} already controls {capacity} datasets")]
    CapacityExceeded {
        /// Owner identity.
        owner: OwnerId,
        /// Configured capacity.
        capacity: usize,
    },
    /// Restored entry lists the same id twice.
    #[error("owner {owner} lists dataset {dataset_id} more than once")]
    Duplicate {
        /// Owner identity.
        owner: OwnerId,
        /// Duplicated dataset id.
        dataset_id: DatasetId,
    },
}

// ============================================================================
// SECTION: Owner Index
// ============================================================================

/// Ordered dataset ids for one owner.
#[derive(Debug, Clone, Default)]
struct OwnedDatasets {
    /// Ids in insertion order.
    order: Vec<DatasetId>,
    /// Membership set mirroring `order`.
    members: HashSet<DatasetId>,
}

/// Per-owner dataset id index.
///
/// # Invariants
/// - No owner sequence exceeds [`OWNER_INDEX_CAPACITY`].
/// - No owner sequence contains duplicates.
/// - Stored sequences are never empty.
#[derive(Debug, Clone, Default)]
pub struct OwnerIndex {
    /// Owner entries keyed by identity.
    entries: BTreeMap<OwnerId, OwnedDatasets>,
}

impl OwnerIndex {
    /// Creates an empty owner index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds an index from persisted entries, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`OwnerIndexError`] when an entry exceeds capacity or repeats an id.
    pub fn from_entries(entries: Vec<OwnerIndexEntry>) -> Result<Self, OwnerIndexError> {
        let mut index = Self::new();
        for entry in entries {
            for dataset_id in entry.dataset_ids {
                if index.contains(&entry.owner, dataset_id) {
                    return Err(OwnerIndexError::Duplicate {
                        owner: entry.owner,
                        dataset_id,
                    });
                }
                index.add(&entry.owner, dataset_id)?;
            }
        }
        Ok(index)
    }

    /// Appends `dataset_id` to the owner's sequence.
    ///
    /// Returns `Ok(true)` when the id was appended and `Ok(false)` when it was
    /// already present.
    ///
    /// # Errors
    ///
    /// Returns [`OwnerIndexError::CapacityExceeded`] when the sequence is full.
    pub fn add(&mut self, owner: &OwnerId, dataset_id: DatasetId) -> Result<bool, OwnerIndexError> {
        if self.contains(owner, dataset_id) {
            return Ok(false);
        }
        if self.count(owner) >= OWNER_INDEX_CAPACITY {
            return Err(OwnerIndexError::CapacityExceeded {
                owner: owner.clone(),
                capacity: OWNER_INDEX_CAPACITY,
            });
        }
        let entry = self.entries.entry(owner.clone()).or_default();
        entry.order.push(dataset_id);
        entry.members.insert(dataset_id);
        Ok(true)
    }

    /// Removes `dataset_id` from the owner's sequence.
    ///
    /// Returns the position the id occupied, or `None` when it was absent.
    pub fn remove(&mut self, owner: &OwnerId, dataset_id: DatasetId) -> Option<usize> {
        let entry = self.entries.get_mut(owner)?;
        if !entry.members.remove(&dataset_id) {
            return None;
        }
        let position = entry.order.iter().position(|id| *id == dataset_id)?;
        entry.order.remove(position);
        if entry.order.is_empty() {
            self.entries.remove(owner);
        }
        Some(position)
    }

    /// Reinserts an id at a previous position (rollback path only).
    pub(crate) fn restore_at(&mut self, owner: &OwnerId, position: usize, dataset_id: DatasetId) {
        let entry = self.entries.entry(owner.clone()).or_default();
        if entry.members.insert(dataset_id) {
            let position = position.min(entry.order.len());
            entry.order.insert(position, dataset_id);
        }
    }

    /// Returns the owner's sequence, empty when the owner has no entry.
    #[must_use]
    pub fn list(&self, owner: &OwnerId) -> &[DatasetId] {
        self.entries.get(owner).map(|entry| entry.order.as_slice()).unwrap_or(&[])
    }

    /// Returns true when the owner's sequence contains `dataset_id`.
    #[must_use]
    pub fn contains(&self, owner: &OwnerId, dataset_id: DatasetId) -> bool {
        self.entries.get(owner).is_some_and(|entry| entry.members.contains(&dataset_id))
    }

    /// Returns the length of the owner's sequence.
    #[must_use]
    pub fn count(&self, owner: &OwnerId) -> usize {
        self.entries.get(owner).map_or(0, |entry| entry.order.len())
    }

    /// Returns the persisted form of one owner's entry.
    #[must_use]
    pub fn entry(&self, owner: &OwnerId) -> OwnerIndexEntry {
        OwnerIndexEntry {
            owner: owner.clone(),
            dataset_ids: self.list(owner).to_vec(),
        }
    }

    /// Returns every non-empty entry in owner order.
    #[must_use]
    pub fn entries(&self) -> Vec<OwnerIndexEntry> {
        self.entries
            .iter()
            .map(|(owner, entry)| OwnerIndexEntry {
                owner: owner.clone(),
                dataset_ids: entry.order.clone(),
            })
            .collect()
    }
}
