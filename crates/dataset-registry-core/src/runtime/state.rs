// crates/dataset-registry-core/src/runtime/state.rs
// ============================================================================
// Module: Registry State
// Description: Explicit registry context holding scalar state, records, and index.
// Purpose: Replace process-wide registry globals with one owned value.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! [`RegistryState`] is the complete in-memory registry: counter, admin,
//! pause flag, primary store, and owner index. It is owned by the registry
//! coordinator and only mutated through a transaction. Restoring from a
//! snapshot re-checks every cross-structure invariant and fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::OwnerId;
use crate::core::RegistryMeta;
use crate::core::RegistrySnapshot;
use crate::core::validate_fields;
use crate::interfaces::StoreError;
use crate::runtime::datasets::DatasetStore;
use crate::runtime::owner_index::OwnerIndex;

// ============================================================================
// SECTION: Registry State
// ============================================================================

/// Complete in-memory registry state.
///
/// # Invariants
/// - Every record id appears exactly once, in its owner's index only.
/// - Every record id is <= `counter`.
#[derive(Debug, Clone)]
pub struct RegistryState {
    /// Highest assigned dataset identifier.
    pub(crate) counter: u64,
    /// Administrator identity.
    pub(crate) admin: OwnerId,
    /// Whether non-admin mutations are blocked.
    pub(crate) paused: bool,
    /// Primary record store.
    pub(crate) datasets: DatasetStore,
    /// Owner to dataset id index.
    pub(crate) owners: OwnerIndex,
}

impl RegistryState {
    /// Creates an empty registry administered by `admin`.
    #[must_use]
    pub fn genesis(admin: OwnerId, paused: bool) -> Self {
        Self {
            counter: 0,
            admin,
            paused,
            datasets: DatasetStore::new(),
            owners: OwnerIndex::new(),
        }
    }

    /// Restores state from a persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] when the snapshot violates a registry invariant.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Result<Self, StoreError> {
        let RegistrySnapshot {
            meta,
            records,
            owners,
        } = snapshot;
        let owners = OwnerIndex::from_entries(owners)
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;
        let mut datasets = DatasetStore::new();
        for record in records {
            if record.id.get() > meta.counter {
                return Err(StoreError::Corrupt(format!(
                    "dataset {} exceeds counter {}",
                    record.id, meta.counter
                )));
            }
            validate_fields(&record.fields).map_err(|err| {
                StoreError::Corrupt(format!("dataset {} fails validation: {err}", record.id))
            })?;
            if !owners.contains(&record.owner, record.id) {
                return Err(StoreError::Corrupt(format!(
                    "dataset {} missing from owner index",
                    record.id
                )));
            }
            let id = record.id;
            if datasets.put(record).is_some() {
                return Err(StoreError::Corrupt(format!("dataset {id} stored twice")));
            }
        }
        let indexed: usize =
            owners.entries().iter().map(|entry| entry.dataset_ids.len()).sum();
        if indexed != datasets.len() {
            return Err(StoreError::Corrupt(format!(
                "owner index lists {indexed} ids for {} records",
                datasets.len()
            )));
        }
        Ok(Self {
            counter: meta.counter,
            admin: meta.admin,
            paused: meta.paused,
            datasets,
            owners,
        })
    }

    /// Returns the scalar registry state.
    #[must_use]
    pub fn meta(&self) -> RegistryMeta {
        RegistryMeta {
            counter: self.counter,
            admin: self.admin.clone(),
            paused: self.paused,
        }
    }

    /// Returns a full snapshot of the state.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            meta: self.meta(),
            records: self.datasets.iter().cloned().collect(),
            owners: self.owners.entries(),
        }
    }
}
