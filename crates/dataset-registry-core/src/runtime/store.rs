// crates/dataset-registry-core/src/runtime/store.rs
// ============================================================================
// Module: Dataset Registry In-Memory Store
// Description: Simple in-memory registry state store for tests and demos.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`RegistryStateStore`]
//! for tests and local demos. Cloned handles share the same backing state, so
//! a test can keep one handle and inspect what the registry persisted. It is
//! not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::DatasetId;
use crate::core::DatasetRecord;
use crate::core::OwnerId;
use crate::core::OwnerIndexEntry;
use crate::core::RegistryChangeSet;
use crate::core::RegistryMeta;
use crate::core::RegistrySnapshot;
use crate::interfaces::RegistryStateStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Persisted registry contents.
#[derive(Debug, Default)]
struct StoredRegistry {
    /// Scalar state; `None` until the first change set is applied.
    meta: Option<RegistryMeta>,
    /// Records keyed by identifier.
    records: BTreeMap<DatasetId, DatasetRecord>,
    /// Owner index sequences keyed by owner.
    owners: BTreeMap<OwnerId, Vec<DatasetId>>,
}

/// In-memory registry state store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRegistryStateStore {
    /// Stored registry protected by a mutex.
    inner: Arc<Mutex<StoredRegistry>>,
}

impl InMemoryRegistryStateStore {
    /// Creates a new, empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegistryStateStore for InMemoryRegistryStateStore {
    fn load(&self) -> Result<Option<RegistrySnapshot>, StoreError> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| StoreError::Store("registry state store mutex poisoned".to_string()))?;
        let Some(meta) = guard.meta.clone() else {
            return Ok(None);
        };
        Ok(Some(RegistrySnapshot {
            meta,
            records: guard.records.values().cloned().collect(),
            owners: guard
                .owners
                .iter()
                .map(|(owner, dataset_ids)| OwnerIndexEntry {
                    owner: owner.clone(),
                    dataset_ids: dataset_ids.clone(),
                })
                .collect(),
        }))
    }

    fn apply(&self, changes: &RegistryChangeSet) -> Result<(), StoreError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| StoreError::Store("registry state store mutex poisoned".to_string()))?;
        guard.meta = Some(changes.meta.clone());
        for record in &changes.records {
            guard.records.insert(record.id, record.clone());
        }
        for entry in &changes.owners {
            if entry.dataset_ids.is_empty() {
                guard.owners.remove(&entry.owner);
            } else {
                guard.owners.insert(entry.owner.clone(), entry.dataset_ids.clone());
            }
        }
        drop(guard);
        Ok(())
    }
}
