// crates/dataset-registry-core/src/runtime/transaction.rs
// ============================================================================
// Module: Registry Transaction
// Description: Undo-logged mutation scope over the registry state.
// Purpose: Make compound record/index/counter updates all-or-nothing.
// Dependencies: crate::core, crate::runtime
// ============================================================================

//! ## Overview
//! A [`RegistryTransaction`] borrows the registry state mutably and records
//! the inverse of every write it performs. Dropping a transaction that was
//! not committed replays the undo log in reverse, restoring the state
//! exactly, including owner index positions. The transaction also tracks
//! which records and owners were touched so the coordinator can hand a
//! minimal change set to the state store before committing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::core::DatasetId;
use crate::core::DatasetRecord;
use crate::core::OwnerId;
use crate::core::RegistryChangeSet;
use crate::runtime::owner_index::OwnerIndexError;
use crate::runtime::state::RegistryState;

// ============================================================================
// SECTION: Undo Log
// ============================================================================

/// Inverse of a single state write.
#[derive(Debug)]
enum UndoEntry {
    /// Restore a record slot to its previous value (or absence).
    Record {
        /// Dataset identifier.
        id: DatasetId,
        /// Value before the write.
        previous: Option<DatasetRecord>,
    },
    /// Remove an id appended to an owner's sequence.
    IndexAdded {
        /// Owner identity.
        owner: OwnerId,
        /// Appended id.
        dataset_id: DatasetId,
    },
    /// Reinsert an id removed from an owner's sequence.
    IndexRemoved {
        /// Owner identity.
        owner: OwnerId,
        /// Former position.
        position: usize,
        /// Removed id.
        dataset_id: DatasetId,
    },
    /// Restore the previous counter.
    Counter(u64),
    /// Restore the previous admin.
    Admin(OwnerId),
    /// Restore the previous pause flag.
    Paused(bool),
}

// ============================================================================
// SECTION: Transaction
// ============================================================================

/// Undo-logged mutation scope.
///
/// # Invariants
/// - Until [`RegistryTransaction::commit`] is called, dropping the
///   transaction restores the state it borrowed.
pub(crate) struct RegistryTransaction<'a> {
    /// Borrowed registry state.
    state: &'a mut RegistryState,
    /// Inverse operations in application order.
    undo: Vec<UndoEntry>,
    /// Records written in this transaction.
    touched_records: BTreeSet<DatasetId>,
    /// Owners whose index changed in this transaction.
    touched_owners: BTreeSet<OwnerId>,
    /// Dataset the operation concerns, for auditing.
    subject: Option<DatasetId>,
    /// Set once the transaction is committed.
    committed: bool,
}

impl<'a> RegistryTransaction<'a> {
    /// Opens a transaction over `state`.
    pub(crate) fn begin(state: &'a mut RegistryState, subject: Option<DatasetId>) -> Self {
        Self {
            state,
            undo: Vec::new(),
            touched_records: BTreeSet::new(),
            touched_owners: BTreeSet::new(),
            subject,
            committed: false,
        }
    }

    /// Returns the state as currently modified.
    pub(crate) fn state(&self) -> &RegistryState {
        self.state
    }

    /// Returns the dataset this transaction concerns.
    pub(crate) fn subject(&self) -> Option<DatasetId> {
        self.subject
    }

    /// Records the dataset this transaction concerns.
    pub(crate) fn set_subject(&mut self, id: DatasetId) {
        self.subject = Some(id);
    }

    /// Writes a record.
    pub(crate) fn put_record(&mut self, record: DatasetRecord) {
        let id = record.id;
        let previous = self.state.datasets.put(record);
        self.undo.push(UndoEntry::Record {
            id,
            previous,
        });
        self.touched_records.insert(id);
    }

    /// Adds an id to an owner's sequence.
    pub(crate) fn index_add(
        &mut self,
        owner: &OwnerId,
        dataset_id: DatasetId,
    ) -> Result<(), OwnerIndexError> {
        if self.state.owners.add(owner, dataset_id)? {
            self.undo.push(UndoEntry::IndexAdded {
                owner: owner.clone(),
                dataset_id,
            });
            self.touched_owners.insert(owner.clone());
        }
        Ok(())
    }

    /// Removes an id from an owner's sequence.
    pub(crate) fn index_remove(&mut self, owner: &OwnerId, dataset_id: DatasetId) {
        if let Some(position) = self.state.owners.remove(owner, dataset_id) {
            self.undo.push(UndoEntry::IndexRemoved {
                owner: owner.clone(),
                position,
                dataset_id,
            });
            self.touched_owners.insert(owner.clone());
        }
    }

    /// Sets the id counter.
    pub(crate) fn set_counter(&mut self, counter: u64) {
        let previous = std::mem::replace(&mut self.state.counter, counter);
        self.undo.push(UndoEntry::Counter(previous));
    }

    /// Sets the admin identity.
    pub(crate) fn set_admin(&mut self, admin: OwnerId) {
        let previous = std::mem::replace(&mut self.state.admin, admin);
        self.undo.push(UndoEntry::Admin(previous));
    }

    /// Sets the pause flag.
    pub(crate) fn set_paused(&mut self, paused: bool) {
        let previous = std::mem::replace(&mut self.state.paused, paused);
        self.undo.push(UndoEntry::Paused(previous));
    }

    /// Builds the change set describing every write so far.
    pub(crate) fn change_set(&self) -> RegistryChangeSet {
        RegistryChangeSet {
            meta: self.state.meta(),
            records: self
                .touched_records
                .iter()
                .filter_map(|id| self.state.datasets.get(*id).cloned())
                .collect(),
            owners: self.touched_owners.iter().map(|owner| self.state.owners.entry(owner)).collect(),
        }
    }

    /// Commits the transaction, discarding the undo log.
    pub(crate) fn commit(mut self) {
        self.undo.clear();
        self.committed = true;
    }

    /// Replays the undo log in reverse.
    fn rollback(&mut self) {
        while let Some(entry) = self.undo.pop() {
            match entry {
                UndoEntry::Record {
                    id,
                    previous,
                } => match previous {
                    Some(record) => {
                        self.state.datasets.put(record);
                    }
                    None => {
                        self.state.datasets.remove(id);
                    }
                },
                UndoEntry::IndexAdded {
                    owner,
                    dataset_id,
                } => {
                    self.state.owners.remove(&owner, dataset_id);
                }
                UndoEntry::IndexRemoved {
                    owner,
                    position,
                    dataset_id,
                } => self.state.owners.restore_at(&owner, position, dataset_id),
                UndoEntry::Counter(counter) => self.state.counter = counter,
                UndoEntry::Admin(admin) => self.state.admin = admin,
                UndoEntry::Paused(paused) => self.state.paused = paused,
            }
        }
    }
}

impl Drop for RegistryTransaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.rollback();
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use super::*;
    use crate::core::DatasetFields;
    use crate::core::DatasetStatus;
    use crate::core::Mutability;

    fn record(id: u64, owner: &str) -> DatasetRecord {
        DatasetRecord {
            id: DatasetId::from_raw(id).unwrap(),
            owner: OwnerId::new(owner),
            fields: DatasetFields {
                name: "ozone".to_string(),
                description: "column ozone".to_string(),
                data_type: "lidar".to_string(),
                collection_date: 1,
                altitude_min: 0,
                altitude_max: 10,
                latitude: 0,
                longitude: 0,
                ipfs_hash: String::new(),
                is_public: true,
            },
            mutability: Mutability::Editable,
            created_at: 7,
            status: DatasetStatus::Active,
        }
    }

    fn id(raw: u64) -> DatasetId {
        DatasetId::from_raw(raw).unwrap()
    }

    #[test]
    fn dropped_transaction_restores_index_positions() {
        let alice = OwnerId::new("alice");
        let bob = OwnerId::new("bob");
        let mut state = RegistryState::genesis(OwnerId::new("admin"), false);
        {
            let mut tx = RegistryTransaction::begin(&mut state, None);
            for raw in 1 ..= 3 {
                tx.put_record(record(raw, "alice"));
                tx.index_add(&alice, id(raw)).unwrap();
            }
            tx.set_counter(3);
            tx.commit();
        }

        {
            let mut tx = RegistryTransaction::begin(&mut state, Some(id(2)));
            let mut moved = record(2, "bob");
            moved.owner = bob.clone();
            tx.put_record(moved);
            tx.index_remove(&alice, id(2));
            tx.index_add(&bob, id(2)).unwrap();
            tx.set_paused(true);
            assert_eq!(tx.state().owners.list(&alice), &[id(1), id(3)]);
        }

        assert_eq!(state.owners.list(&alice), &[id(1), id(2), id(3)]);
        assert!(state.owners.list(&bob).is_empty());
        assert_eq!(state.datasets.get(id(2)).unwrap().owner, alice);
        assert!(!state.paused);
        assert_eq!(state.counter, 3);
    }

    #[test]
    fn change_set_reports_touched_owners_including_emptied() {
        let alice = OwnerId::new("alice");
        let bob = OwnerId::new("bob");
        let mut state = RegistryState::genesis(OwnerId::new("admin"), false);
        let mut tx = RegistryTransaction::begin(&mut state, None);
        tx.put_record(record(1, "alice"));
        tx.index_add(&alice, id(1)).unwrap();
        tx.set_counter(1);
        tx.commit();

        let mut tx = RegistryTransaction::begin(&mut state, Some(id(1)));
        tx.index_remove(&alice, id(1));
        tx.index_add(&bob, id(1)).unwrap();
        let changes = tx.change_set();
        assert!(changes.records.is_empty());
        assert_eq!(changes.owners.len(), 2);
        assert!(changes.owners.iter().any(|entry| entry.owner == alice
            && entry.dataset_ids.is_empty()));
        assert_eq!(changes.meta.counter, 1);
    }
}
