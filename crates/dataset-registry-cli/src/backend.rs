// crates/dataset-registry-cli/src/backend.rs
// ============================================================================
// Module: CLI Registry Backend
// Description: Opens the configured state store, audit sink, and registry.
// Purpose: Turn a validated config into a ready-to-use registry.
// Dependencies: dataset-registry-core, dataset-registry-config,
//               dataset-registry-store-sqlite, thiserror
// ============================================================================

//! ## Overview
//! [`RegistryBackend`] selects between the in-memory and `SQLite` state stores
//! at runtime so the CLI can hold one concrete registry type. The audit sink
//! is chosen from the `[audit]` table: disabled audit discards events, a path
//! appends JSON lines to that file, and otherwise events go to stderr.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use dataset_registry_config::AuditConfig;
use dataset_registry_config::DatasetRegistryConfig;
use dataset_registry_config::StoreConfig;
use dataset_registry_config::StoreType;
use dataset_registry_core::DatasetRegistry;
use dataset_registry_core::FileAuditSink;
use dataset_registry_core::InMemoryRegistryStateStore;
use dataset_registry_core::NoopAuditSink;
use dataset_registry_core::RegistryAuditSink;
use dataset_registry_core::RegistryChangeSet;
use dataset_registry_core::RegistryError;
use dataset_registry_core::RegistrySnapshot;
use dataset_registry_core::RegistryStateStore;
use dataset_registry_core::StderrAuditSink;
use dataset_registry_core::StoreError;
use dataset_registry_core::SystemClock;
use dataset_registry_store_sqlite::SqliteRegistryStore;
use dataset_registry_store_sqlite::SqliteStoreError;
use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Registry type used by the CLI.
pub type CliRegistry = DatasetRegistry<RegistryBackend, SystemClock>;

/// State store selected by configuration.
#[derive(Clone)]
pub enum RegistryBackend {
    /// Process-local store; state is discarded on exit.
    Memory(InMemoryRegistryStateStore),
    /// Durable `SQLite` store.
    Sqlite(SqliteRegistryStore),
}

impl RegistryStateStore for RegistryBackend {
    fn load(&self) -> Result<Option<RegistrySnapshot>, StoreError> {
        match self {
            Self::Memory(store) => store.load(),
            Self::Sqlite(store) => store.load(),
        }
    }

    fn apply(&self, changes: &RegistryChangeSet) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.apply(changes),
            Self::Sqlite(store) => store.apply(changes),
        }
    }
}

/// Errors raised while assembling a registry from configuration.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Store configuration is incomplete.
    #[error("store config invalid: {0}")]
    Config(String),
    /// `SQLite` store could not be opened.
    #[error(transparent)]
    Sqlite(#[from] SqliteStoreError),
    /// Audit log could not be opened.
    #[error("audit log unavailable: {0}")]
    Audit(String),
    /// Registry failed to open over the store.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl BackendError {
    /// Returns the stable label for this error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Sqlite(_) | Self::Audit(_) => "store",
            Self::Registry(err) => err.kind(),
        }
    }
}

// ============================================================================
// SECTION: Construction
// ============================================================================

/// Opens the state store described by `[store]`.
///
/// # Errors
///
/// Returns [`BackendError`] when the `SQLite` store cannot be opened.
pub fn open_store(config: &StoreConfig) -> Result<RegistryBackend, BackendError> {
    match config.store_type {
        StoreType::Memory => Ok(RegistryBackend::Memory(InMemoryRegistryStateStore::new())),
        StoreType::Sqlite => {
            let sqlite = config
                .sqlite_config()
                .ok_or_else(|| BackendError::Config("sqlite store requires path".to_string()))?;
            Ok(RegistryBackend::Sqlite(SqliteRegistryStore::new(&sqlite)?))
        }
    }
}

/// Builds the audit sink described by `[audit]`.
///
/// # Errors
///
/// Returns [`BackendError::Audit`] when the audit file cannot be opened.
pub fn audit_sink(config: &AuditConfig) -> Result<Arc<dyn RegistryAuditSink>, BackendError> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.path {
        Some(path) => {
            let sink = FileAuditSink::new(path).map_err(|err| BackendError::Audit(err.to_string()))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

/// Opens a registry over the configured store and audit sink.
///
/// # Errors
///
/// Returns [`BackendError`] when the store, audit sink, or registry snapshot
/// cannot be opened.
pub fn open_registry(config: &DatasetRegistryConfig) -> Result<CliRegistry, BackendError> {
    let store = open_store(&config.store)?;
    let audit = audit_sink(&config.audit)?;
    Ok(DatasetRegistry::open(&config.registry_config(), store, SystemClock, audit)?)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
