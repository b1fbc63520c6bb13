// crates/dataset-registry-core/src/runtime/registry.rs
// ============================================================================
// Module: Dataset Registry Coordinator
// Description: Authorization, pause gating, and atomic mutation of registry state.
// Purpose: Serve every registry operation against one explicit state value.
// Dependencies: crate::{core, interfaces, runtime}, thiserror
// ============================================================================

//! ## Overview
//! [`DatasetRegistry`] owns the registry state behind a single mutex. Every
//! mutating call runs inside a registry transaction: checks run first
//! (pause, existence, authorization, freeze, validation), writes are applied
//! with an undo log, the resulting change set is persisted through the
//! [`RegistryStateStore`], and only then is the transaction committed. Any
//! failure, including a store failure, leaves the registry exactly as it was.
//! One audit event is emitted per mutating call, whatever its outcome.
//! Caller identities are trusted as supplied by the host.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use thiserror::Error;

use crate::core::DatasetFields;
use crate::core::DatasetId;
use crate::core::DatasetImport;
use crate::core::DatasetRecord;
use crate::core::DatasetStatus;
use crate::core::MAX_DATASET_ID;
use crate::core::MAX_IDENTITY_CHARS;
use crate::core::MetadataUpdate;
use crate::core::Mutability;
use crate::core::OwnerId;
use crate::core::RegistryChangeSet;
use crate::core::RegistrySnapshot;
use crate::core::ValidationError;
use crate::core::validate_fields;
use crate::core::validate_update;
use crate::interfaces::AuditOutcome;
use crate::interfaces::Clock;
use crate::interfaces::RegistryAuditEvent;
use crate::interfaces::RegistryAuditSink;
use crate::interfaces::RegistryOperation;
use crate::interfaces::RegistryStateStore;
use crate::interfaces::StoreError;
use crate::runtime::owner_index::OwnerIndexError;
use crate::runtime::pagination::DEFAULT_MAX_PAGE_SIZE;
use crate::runtime::pagination::MAX_PAGE_SIZE_LIMIT;
use crate::runtime::pagination::Page;
use crate::runtime::pagination::page_id_range;
use crate::runtime::pagination::page_sequence;
use crate::runtime::state::RegistryState;
use crate::runtime::transaction::RegistryTransaction;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Registry configuration.
///
/// `admin` and `start_paused` only seed a registry whose store is empty; a
/// registry reopened from a persisted snapshot keeps its stored values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Initial administrator identity.
    pub admin: OwnerId,
    /// Initial pause flag.
    pub start_paused: bool,
    /// Maximum number of items returned by one page.
    pub max_page_size: u64,
}

impl RegistryConfig {
    /// Creates a configuration with default page size for `admin`.
    #[must_use]
    pub fn new(admin: OwnerId) -> Self {
        Self {
            admin,
            start_paused: false,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidParams`] when the admin is empty or
    /// overlong, or the page size is outside `1..=1000`.
    pub fn validate(&self) -> Result<(), RegistryError> {
        ensure_identity(&self.admin, "admin")?;
        if self.max_page_size == 0 || self.max_page_size > MAX_PAGE_SIZE_LIMIT {
            return Err(RegistryError::InvalidParams(format!(
                "max_page_size must be between 1 and {MAX_PAGE_SIZE_LIMIT}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registry operation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - A returned error means no state change was committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Input failed validation or would break an index bound.
    #[error("invalid params: {0}")]
    InvalidParams(String),
    /// Caller lacks the required role.
    #[error("caller is not authorized")]
    NotAuthorized,
    /// Dataset does not exist.
    #[error("dataset {0} not found")]
    NotFound(DatasetId),
    /// Dataset metadata is frozen.
    #[error("dataset {0} metadata is frozen")]
    MetadataFrozen(DatasetId),
    /// Registry is paused for non-admin callers.
    #[error("registry is paused")]
    ContractPaused,
    /// Dataset id is already taken.
    #[error("dataset {0} already exists")]
    AlreadyExists(DatasetId),
    /// State store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// Returns the stable label for this error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidParams(_) => "invalid_params",
            Self::NotAuthorized => "not_authorized",
            Self::NotFound(_) => "not_found",
            Self::MetadataFrozen(_) => "metadata_frozen",
            Self::ContractPaused => "contract_paused",
            Self::AlreadyExists(_) => "already_exists",
            Self::Store(_) => "store",
        }
    }
}

impl From<ValidationError> for RegistryError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidParams(err.to_string())
    }
}

impl From<OwnerIndexError> for RegistryError {
    fn from(err: OwnerIndexError) -> Self {
        Self::InvalidParams(err.to_string())
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Audit event identifier for registry mutations.
const AUDIT_EVENT: &str = "registry_mutation";

/// Dataset metadata registry.
pub struct DatasetRegistry<S, C> {
    /// Page size bound for read operations.
    max_page_size: u64,
    /// Registry state guarded by a single lock.
    state: Mutex<RegistryState>,
    /// Persistence backend.
    store: S,
    /// Time source for record creation and audit events.
    clock: C,
    /// Audit sink.
    audit: Arc<dyn RegistryAuditSink>,
}

impl<S, C> DatasetRegistry<S, C>
where
    S: RegistryStateStore,
    C: Clock,
{
    /// Opens a registry over `store`, seeding it from `config` when empty.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidParams`] for an invalid configuration and
    /// [`RegistryError::Store`] when the snapshot cannot be loaded, fails
    /// integrity checks, or the genesis state cannot be persisted.
    pub fn open(
        config: &RegistryConfig,
        store: S,
        clock: C,
        audit: Arc<dyn RegistryAuditSink>,
    ) -> Result<Self, RegistryError> {
        config.validate()?;
        let state = if let Some(snapshot) = store.load()? {
            RegistryState::from_snapshot(snapshot)?
        } else {
            let state = RegistryState::genesis(config.admin.clone(), config.start_paused);
            store.apply(&RegistryChangeSet {
                meta: state.meta(),
                records: Vec::new(),
                owners: Vec::new(),
            })?;
            state
        };
        Ok(Self {
            max_page_size: config.max_page_size,
            state: Mutex::new(state),
            store,
            clock,
            audit,
        })
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Registers a new dataset owned by `caller` and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ContractPaused`] while paused for non-admins and
    /// [`RegistryError::InvalidParams`] when the caller identity is empty or
    /// overlong, validation fails, the identifier space is exhausted, or the
    /// caller's index is full.
    pub fn register(
        &self,
        caller: &OwnerId,
        fields: DatasetFields,
    ) -> Result<DatasetId, RegistryError> {
        let created_at = self.clock.now();
        self.mutate(RegistryOperation::Register, caller, None, |tx| {
            ensure_unpaused(tx.state(), caller)?;
            ensure_identity(caller, "owner")?;
            let raw = tx.state().counter.saturating_add(1);
            if raw > MAX_DATASET_ID {
                return Err(RegistryError::InvalidParams(
                    "dataset identifier space exhausted".to_string(),
                ));
            }
            let id = DatasetId::from_raw(raw).ok_or_else(|| {
                RegistryError::InvalidParams("dataset identifier must be positive".to_string())
            })?;
            tx.set_subject(id);
            validate_fields(&fields)?;
            tx.put_record(DatasetRecord {
                id,
                owner: caller.clone(),
                fields,
                mutability: Mutability::Editable,
                created_at,
                status: DatasetStatus::Active,
            });
            tx.index_add(caller, id)?;
            tx.set_counter(raw);
            Ok(id)
        })
    }

    /// Replaces the descriptive metadata of an editable dataset.
    ///
    /// # Errors
    ///
    /// Returns, in check order, [`RegistryError::ContractPaused`],
    /// [`RegistryError::NotFound`], [`RegistryError::NotAuthorized`],
    /// [`RegistryError::MetadataFrozen`], and [`RegistryError::InvalidParams`].
    pub fn update_metadata(
        &self,
        caller: &OwnerId,
        id: DatasetId,
        update: MetadataUpdate,
    ) -> Result<(), RegistryError> {
        self.mutate(RegistryOperation::UpdateMetadata, caller, Some(id), |tx| {
            ensure_unpaused(tx.state(), caller)?;
            let mut record = owned_record(tx.state(), caller, id)?;
            if record.metadata_frozen() {
                return Err(RegistryError::MetadataFrozen(id));
            }
            validate_update(&update)?;
            record.fields.name = update.name;
            record.fields.description = update.description;
            record.fields.data_type = update.data_type;
            record.fields.is_public = update.is_public;
            tx.put_record(record);
            Ok(())
        })
    }

    /// Freezes a dataset's metadata. Freezing a frozen dataset succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ContractPaused`], [`RegistryError::NotFound`],
    /// or [`RegistryError::NotAuthorized`].
    pub fn freeze_metadata(&self, caller: &OwnerId, id: DatasetId) -> Result<(), RegistryError> {
        self.mutate(RegistryOperation::FreezeMetadata, caller, Some(id), |tx| {
            ensure_unpaused(tx.state(), caller)?;
            let mut record = owned_record(tx.state(), caller, id)?;
            if !record.metadata_frozen() {
                record.mutability = Mutability::Frozen;
                tx.put_record(record);
            }
            Ok(())
        })
    }

    /// Transfers a dataset to `new_owner`, frozen or not.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ContractPaused`], [`RegistryError::NotFound`],
    /// [`RegistryError::NotAuthorized`], or [`RegistryError::InvalidParams`]
    /// when the new owner is empty or already controls the maximum number of
    /// datasets.
    pub fn transfer(
        &self,
        caller: &OwnerId,
        id: DatasetId,
        new_owner: &OwnerId,
    ) -> Result<(), RegistryError> {
        self.mutate(RegistryOperation::Transfer, caller, Some(id), |tx| {
            ensure_unpaused(tx.state(), caller)?;
            let mut record = owned_record(tx.state(), caller, id)?;
            ensure_identity(new_owner, "new owner")?;
            if record.owner == *new_owner {
                return Ok(());
            }
            let previous_owner = std::mem::replace(&mut record.owner, new_owner.clone());
            tx.put_record(record);
            tx.index_remove(&previous_owner, id);
            tx.index_add(new_owner, id)?;
            Ok(())
        })
    }

    /// Writes a record verbatim at a caller-chosen identifier (admin only).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ContractPaused`],
    /// [`RegistryError::NotAuthorized`], [`RegistryError::InvalidParams`] for an
    /// id of zero or above [`MAX_DATASET_ID`], a bad owner, or invalid fields, and
    /// [`RegistryError::AlreadyExists`] on an id collision.
    pub fn import(
        &self,
        caller: &OwnerId,
        import: DatasetImport,
    ) -> Result<DatasetId, RegistryError> {
        self.mutate(RegistryOperation::Import, caller, DatasetId::from_raw(import.id), |tx| {
            ensure_unpaused(tx.state(), caller)?;
            ensure_admin(tx.state(), caller)?;
            let id = DatasetId::from_raw(import.id).ok_or_else(|| {
                RegistryError::InvalidParams("dataset identifier must be positive".to_string())
            })?;
            if id.get() > MAX_DATASET_ID {
                return Err(RegistryError::InvalidParams(format!(
                    "dataset identifier exceeds {MAX_DATASET_ID}"
                )));
            }
            ensure_identity(&import.owner, "owner")?;
            validate_fields(&import.fields)?;
            if tx.state().datasets.contains(id) {
                return Err(RegistryError::AlreadyExists(id));
            }
            let DatasetImport {
                owner,
                fields,
                mutability,
                created_at,
                status,
                ..
            } = import;
            tx.index_add(&owner, id)?;
            tx.put_record(DatasetRecord {
                id,
                owner,
                fields,
                mutability,
                created_at,
                status,
            });
            if id.get() > tx.state().counter {
                tx.set_counter(id.get());
            }
            Ok(id)
        })
    }

    /// Replaces the administrator and returns the new identity.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotAuthorized`] unless `caller` is the admin,
    /// and [`RegistryError::InvalidParams`] for an empty or overlong identity.
    pub fn set_admin(&self, caller: &OwnerId, new_admin: OwnerId) -> Result<OwnerId, RegistryError> {
        self.mutate(RegistryOperation::SetAdmin, caller, None, |tx| {
            ensure_admin(tx.state(), caller)?;
            ensure_identity(&new_admin, "admin")?;
            tx.set_admin(new_admin.clone());
            Ok(new_admin)
        })
    }

    /// Sets the pause flag and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotAuthorized`] unless `caller` is the admin.
    pub fn set_paused(&self, caller: &OwnerId, paused: bool) -> Result<bool, RegistryError> {
        self.mutate(RegistryOperation::SetPaused, caller, None, |tx| {
            ensure_admin(tx.state(), caller)?;
            tx.set_paused(paused);
            Ok(paused)
        })
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Returns the record stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when no record exists.
    pub fn get(&self, id: DatasetId) -> Result<DatasetRecord, RegistryError> {
        self.lock_state()?.datasets.get(id).cloned().ok_or(RegistryError::NotFound(id))
    }

    /// Returns every dataset id controlled by `owner`, in acquisition order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the registry lock is poisoned.
    pub fn get_owner_ids(&self, owner: &OwnerId) -> Result<Vec<DatasetId>, RegistryError> {
        Ok(self.lock_state()?.owners.list(owner).to_vec())
    }

    /// Returns the highest assigned dataset identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the registry lock is poisoned.
    pub fn get_count(&self) -> Result<u64, RegistryError> {
        Ok(self.lock_state()?.counter)
    }

    /// Pages the global identifier space.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the registry lock is poisoned.
    pub fn page_ids(&self, offset: u64, limit: u64) -> Result<Page<DatasetId>, RegistryError> {
        let counter = self.lock_state()?.counter;
        Ok(page_id_range(counter, offset, limit, self.max_page_size))
    }

    /// Pages one owner's dataset ids.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the registry lock is poisoned.
    pub fn page_owner_ids(
        &self,
        owner: &OwnerId,
        offset: u64,
        limit: u64,
    ) -> Result<Page<DatasetId>, RegistryError> {
        let state = self.lock_state()?;
        Ok(page_sequence(state.owners.list(owner), offset, limit, self.max_page_size))
    }

    /// Pages full records over the global identifier space.
    ///
    /// Identifiers skipped by import are omitted; the cursor still advances
    /// over them.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the registry lock is poisoned.
    pub fn page_records(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Page<DatasetRecord>, RegistryError> {
        let state = self.lock_state()?;
        let ids = page_id_range(state.counter, offset, limit, self.max_page_size);
        Ok(Page {
            items: ids.items.iter().filter_map(|id| state.datasets.get(*id).cloned()).collect(),
            next_offset: ids.next_offset,
        })
    }

    /// Pages full records controlled by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the registry lock is poisoned.
    pub fn page_owner_records(
        &self,
        owner: &OwnerId,
        offset: u64,
        limit: u64,
    ) -> Result<Page<DatasetRecord>, RegistryError> {
        let state = self.lock_state()?;
        let ids = page_sequence(state.owners.list(owner), offset, limit, self.max_page_size);
        Ok(Page {
            items: ids.items.iter().filter_map(|id| state.datasets.get(*id).cloned()).collect(),
            next_offset: ids.next_offset,
        })
    }

    /// Returns the administrator identity.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the registry lock is poisoned.
    pub fn get_admin(&self) -> Result<OwnerId, RegistryError> {
        Ok(self.lock_state()?.admin.clone())
    }

    /// Returns the pause flag.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the registry lock is poisoned.
    pub fn is_paused(&self) -> Result<bool, RegistryError> {
        Ok(self.lock_state()?.paused)
    }

    /// Returns the configured maximum page size.
    #[must_use]
    pub const fn max_page_size(&self) -> u64 {
        self.max_page_size
    }

    /// Returns a full snapshot of the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the registry lock is poisoned.
    pub fn snapshot(&self) -> Result<RegistrySnapshot, RegistryError> {
        Ok(self.lock_state()?.snapshot())
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Runs `apply` in a transaction, persists and commits it, then audits.
    fn mutate<T, F>(
        &self,
        operation: RegistryOperation,
        caller: &OwnerId,
        subject: Option<DatasetId>,
        apply: F,
    ) -> Result<T, RegistryError>
    where
        F: FnOnce(&mut RegistryTransaction<'_>) -> Result<T, RegistryError>,
    {
        let mut dataset_id = subject;
        let result = self.run_transaction(&mut dataset_id, apply);
        self.emit_audit(operation, caller, dataset_id, result.as_ref().err());
        result
    }

    /// Executes one transaction under the registry lock.
    fn run_transaction<T, F>(
        &self,
        dataset_id: &mut Option<DatasetId>,
        apply: F,
    ) -> Result<T, RegistryError>
    where
        F: FnOnce(&mut RegistryTransaction<'_>) -> Result<T, RegistryError>,
    {
        let mut guard = self.lock_state()?;
        let mut tx = RegistryTransaction::begin(&mut *guard, *dataset_id);
        let outcome = apply(&mut tx);
        *dataset_id = tx.subject();
        let value = outcome?;
        self.store.apply(&tx.change_set())?;
        tx.commit();
        Ok(value)
    }

    /// Records the audit event for a mutation.
    fn emit_audit(
        &self,
        operation: RegistryOperation,
        caller: &OwnerId,
        dataset_id: Option<DatasetId>,
        error: Option<&RegistryError>,
    ) {
        let event = RegistryAuditEvent {
            event: AUDIT_EVENT,
            timestamp: self.clock.now(),
            operation,
            caller: caller.clone(),
            dataset_id,
            outcome: if error.is_some() { AuditOutcome::Error } else { AuditOutcome::Ok },
            error_kind: error.map(RegistryError::kind),
        };
        self.audit.record(&event);
    }

    /// Acquires the registry lock.
    fn lock_state(&self) -> Result<MutexGuard<'_, RegistryState>, RegistryError> {
        self.state.lock().map_err(|_| {
            RegistryError::Store(StoreError::Store("registry state mutex poisoned".to_string()))
        })
    }
}

// ============================================================================
// SECTION: Checks
// ============================================================================

/// Rejects non-admin callers while the registry is paused.
fn ensure_unpaused(state: &RegistryState, caller: &OwnerId) -> Result<(), RegistryError> {
    if state.paused && state.admin != *caller {
        return Err(RegistryError::ContractPaused);
    }
    Ok(())
}

/// Rejects callers other than the admin.
fn ensure_admin(state: &RegistryState, caller: &OwnerId) -> Result<(), RegistryError> {
    if state.admin != *caller {
        return Err(RegistryError::NotAuthorized);
    }
    Ok(())
}

/// Rejects empty or overlong identities.
fn ensure_identity(identity: &OwnerId, label: &str) -> Result<(), RegistryError> {
    if identity.as_str().trim().is_empty() {
        return Err(RegistryError::InvalidParams(format!("{label} identity is empty")));
    }
    if identity.as_str().chars().count() > MAX_IDENTITY_CHARS {
        return Err(RegistryError::InvalidParams(format!(
            "{label} identity exceeds {MAX_IDENTITY_CHARS} characters"
        )));
    }
    Ok(())
}

/// Returns a copy of the record at `id` after checking `caller` owns it.
fn owned_record(
    state: &RegistryState,
    caller: &OwnerId,
    id: DatasetId,
) -> Result<DatasetRecord, RegistryError> {
    let record = state.datasets.get(id).ok_or(RegistryError::NotFound(id))?;
    if record.owner != *caller {
        return Err(RegistryError::NotAuthorized);
    }
    Ok(record.clone())
}
