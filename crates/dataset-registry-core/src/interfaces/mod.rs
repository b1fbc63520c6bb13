// crates/dataset-registry-core/src/interfaces/mod.rs
// ============================================================================
// Module: Dataset Registry Interfaces
// Description: Backend-agnostic interfaces for persistence, time, and auditing.
// Purpose: Define the contract surfaces the registry runtime depends on.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! The registry consumes three collaborators: a state store that persists
//! committed change sets, a clock that supplies the creation time for new
//! records, and an audit sink that receives one event per mutating call.
//! Implementations must be deterministic for a given input and fail closed on
//! invalid data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use thiserror::Error;

use crate::core::DatasetId;
use crate::core::OwnerId;
use crate::core::RegistryChangeSet;
use crate::core::RegistrySnapshot;

// ============================================================================
// SECTION: State Store
// ============================================================================

/// Registry state store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("registry store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("registry store corruption: {0}")]
    Corrupt(String),
    /// Store data version is incompatible.
    #[error("registry store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("registry store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("registry store error: {0}")]
    Store(String),
}

/// Persistence backend for registry state.
pub trait RegistryStateStore {
    /// Loads the persisted snapshot, or `None` when the store is empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails or data is corrupt.
    fn load(&self) -> Result<Option<RegistrySnapshot>, StoreError>;

    /// Applies a change set atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the change set cannot be persisted; in that
    /// case nothing from the change set may be visible to later loads.
    fn apply(&self, changes: &RegistryChangeSet) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Source of ledger time for newly registered records.
pub trait Clock {
    /// Returns the current time value.
    fn now(&self) -> u64;
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Registry operation label used in audit events.
///
/// # Invariants
/// - Variants are stable for audit labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryOperation {
    /// Dataset registration.
    Register,
    /// Metadata update.
    UpdateMetadata,
    /// Metadata freeze.
    FreezeMetadata,
    /// Ownership transfer.
    Transfer,
    /// Administrative import.
    Import,
    /// Administrator change.
    SetAdmin,
    /// Pause flag change.
    SetPaused,
}

/// Registry mutation outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Mutation committed.
    Ok,
    /// Mutation rejected or rolled back.
    Error,
}

/// Audit event emitted for every mutating registry call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp from the registry clock.
    pub timestamp: u64,
    /// Operation attempted.
    pub operation: RegistryOperation,
    /// Caller identity.
    pub caller: OwnerId,
    /// Dataset touched, when known.
    pub dataset_id: Option<DatasetId>,
    /// Mutation outcome.
    pub outcome: AuditOutcome,
    /// Normalized error kind label on failure.
    pub error_kind: Option<&'static str>,
}

/// Audit sink for registry mutations.
pub trait RegistryAuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, event: &RegistryAuditEvent);
}
