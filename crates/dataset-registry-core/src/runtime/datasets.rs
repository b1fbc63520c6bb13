// crates/dataset-registry-core/src/runtime/datasets.rs
// ============================================================================
// Module: Primary Dataset Store
// Description: In-memory map from dataset identifier to dataset record.
// Purpose: Own record storage for the registry state.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The primary store is a plain ordered map. It enforces no policy of its
//! own; the registry coordinator decides when records may be written.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::DatasetId;
use crate::core::DatasetRecord;

// ============================================================================
// SECTION: Primary Store
// ============================================================================

/// Dataset records keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    /// Records in identifier order.
    records: BTreeMap<DatasetId, DatasetRecord>,
}

impl DatasetStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record for `id`, if present.
    #[must_use]
    pub fn get(&self, id: DatasetId) -> Option<&DatasetRecord> {
        self.records.get(&id)
    }

    /// Returns true when a record exists for `id`.
    #[must_use]
    pub fn contains(&self, id: DatasetId) -> bool {
        self.records.contains_key(&id)
    }

    /// Writes a record, returning the value it replaced.
    pub fn put(&mut self, record: DatasetRecord) -> Option<DatasetRecord> {
        self.records.insert(record.id, record)
    }

    /// Removes a record (rollback path only).
    pub(crate) fn remove(&mut self, id: DatasetId) -> Option<DatasetRecord> {
        self.records.remove(&id)
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &DatasetRecord> {
        self.records.values()
    }
}
