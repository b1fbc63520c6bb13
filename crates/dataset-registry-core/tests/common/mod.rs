// crates/dataset-registry-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared fixtures for dataset registry integration tests.
// Purpose: Build registries, field sets, and failing stores deterministically.
// Dependencies: dataset-registry-core
// ============================================================================

//! ## Overview
//! Shared helpers for registry tests: a valid field set, a registry wired to an
//! in-memory store with a fixed clock and a recording audit sink, and a store
//! that can be told to reject the next change set.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use dataset_registry_core::DatasetFields;
use dataset_registry_core::DatasetId;
use dataset_registry_core::DatasetRegistry;
use dataset_registry_core::FixedClock;
use dataset_registry_core::InMemoryRegistryStateStore;
use dataset_registry_core::MemoryAuditSink;
use dataset_registry_core::MetadataUpdate;
use dataset_registry_core::OwnerId;
use dataset_registry_core::RegistryChangeSet;
use dataset_registry_core::RegistryConfig;
use dataset_registry_core::RegistrySnapshot;
use dataset_registry_core::RegistryStateStore;
use dataset_registry_core::StoreError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Admin identity used by fixtures.
pub const ADMIN: &str = "admin";
/// Fixed clock value used by fixtures.
pub const NOW: u64 = 1_700_000_000;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Registry type used by most tests.
pub type TestRegistry = DatasetRegistry<InMemoryRegistryStateStore, FixedClock>;

/// Returns an owner identity.
pub fn owner(name: &str) -> OwnerId {
    OwnerId::new(name)
}

/// Returns a dataset id from a raw value.
pub fn id(raw: u64) -> DatasetId {
    DatasetId::from_raw(raw).expect("non-zero id")
}

/// Returns a valid field set.
pub fn sample_fields() -> DatasetFields {
    DatasetFields {
        name: "Boulder ozone sonde".to_string(),
        description: "Balloon-borne ozone profile".to_string(),
        data_type: "ozonesonde".to_string(),
        collection_date: 1_690_000_000,
        altitude_min: 1000,
        altitude_max: 5000,
        latitude: 40_000_000,
        longitude: -74_000_000,
        ipfs_hash: "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi".to_string(),
        is_public: true,
    }
}

/// Returns a valid metadata update.
pub fn sample_update() -> MetadataUpdate {
    MetadataUpdate {
        name: "Boulder ozone sonde (rev 2)".to_string(),
        description: "Reprocessed profile".to_string(),
        data_type: "ozonesonde".to_string(),
        is_public: false,
    }
}

/// Returns a registry config administered by [`ADMIN`].
pub fn config() -> RegistryConfig {
    RegistryConfig::new(owner(ADMIN))
}

/// Opens a registry over a fresh in-memory store.
pub fn registry() -> (TestRegistry, InMemoryRegistryStateStore, Arc<MemoryAuditSink>) {
    registry_with(&config())
}

/// Opens a registry over a fresh in-memory store with `config`.
pub fn registry_with(
    config: &RegistryConfig,
) -> (TestRegistry, InMemoryRegistryStateStore, Arc<MemoryAuditSink>) {
    let store = InMemoryRegistryStateStore::new();
    let audit = Arc::new(MemoryAuditSink::new());
    let registry =
        DatasetRegistry::open(config, store.clone(), FixedClock::new(NOW), audit.clone())
            .expect("open registry");
    (registry, store, audit)
}

// ============================================================================
// SECTION: Failing Store
// ============================================================================

/// In-memory store that rejects change sets while armed.
#[derive(Debug, Clone, Default)]
pub struct FlakyStore {
    /// Backing store.
    pub inner: InMemoryRegistryStateStore,
    /// When set, every apply fails.
    pub fail: Arc<AtomicBool>,
}

impl FlakyStore {
    /// Makes subsequent applies fail or succeed.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

impl RegistryStateStore for FlakyStore {
    fn load(&self) -> Result<Option<RegistrySnapshot>, StoreError> {
        self.inner.load()
    }

    fn apply(&self, changes: &RegistryChangeSet) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Io("disk unavailable".to_string()));
        }
        self.inner.apply(changes)
    }
}
