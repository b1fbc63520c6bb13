// crates/dataset-registry-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Registry Store Tests
// Description: Persistence fidelity and integrity checks for the SQLite store.
// Purpose: Validate reopen fidelity, schema versioning, path safety, and
//          corruption detection.
// ============================================================================

//! ## Overview
//! Integration tests for the `SQLite` registry store:
//! - A registry reopened from disk reproduces counter, admin, pause flag,
//!   records, and owner index order
//! - Emptied owner entries disappear on reload
//! - Hash mismatches, broken index positions, and schema version drift fail
//!   closed
//! - The identifier ceiling gives the same results as the in-memory store
//! - Directory paths are rejected

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::Path;
use std::sync::Arc;

use dataset_registry_core::DatasetFields;
use dataset_registry_core::DatasetId;
use dataset_registry_core::DatasetImport;
use dataset_registry_core::DatasetRegistry;
use dataset_registry_core::DatasetStatus;
use dataset_registry_core::FixedClock;
use dataset_registry_core::InMemoryRegistryStateStore;
use dataset_registry_core::MAX_DATASET_ID;
use dataset_registry_core::Mutability;
use dataset_registry_core::NoopAuditSink;
use dataset_registry_core::OwnerId;
use dataset_registry_core::RegistryConfig;
use dataset_registry_core::RegistryError;
use dataset_registry_core::RegistryStateStore;
use dataset_registry_core::StoreError;
use dataset_registry_store_sqlite::SqliteRegistryStore;
use dataset_registry_store_sqlite::SqliteStoreConfig;
use dataset_registry_store_sqlite::SqliteStoreError;
use dataset_registry_store_sqlite::SqliteStoreMode;
use dataset_registry_store_sqlite::SqliteSyncMode;
use rusqlite::Connection;
use rusqlite::params;
use tempfile::TempDir;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn fields() -> DatasetFields {
    DatasetFields {
        name: "Mauna Loa CO2".to_string(),
        description: "Flask samples".to_string(),
        data_type: "co2".to_string(),
        collection_date: 1_650_000_000,
        altitude_min: 3397,
        altitude_max: 3397,
        latitude: 19_536_000,
        longitude: -155_576_000,
        ipfs_hash: String::new(),
        is_public: true,
    }
}

fn id(raw: u64) -> DatasetId {
    DatasetId::from_raw(raw).unwrap()
}

fn store_at(path: &Path) -> SqliteRegistryStore {
    SqliteRegistryStore::new(&SqliteStoreConfig::new(path)).unwrap()
}

fn open_registry(path: &Path) -> DatasetRegistry<SqliteRegistryStore, FixedClock> {
    DatasetRegistry::open(
        &RegistryConfig::new(OwnerId::new("admin")),
        store_at(path),
        FixedClock::new(42),
        Arc::new(NoopAuditSink),
    )
    .unwrap()
}

fn populated(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("registry.db");
    let registry = open_registry(&path);
    let alice = OwnerId::new("alice");
    let bob = OwnerId::new("bob");
    for _ in 0 .. 4 {
        registry.register(&alice, fields()).unwrap();
    }
    registry.transfer(&alice, id(2), &bob).unwrap();
    registry.freeze_metadata(&alice, id(3)).unwrap();
    registry
        .import(
            &OwnerId::new("admin"),
            DatasetImport {
                id: 9,
                owner: bob,
                fields: fields(),
                mutability: Mutability::Frozen,
                created_at: 7,
                status: DatasetStatus::Deprecated,
            },
        )
        .unwrap();
    path
}

// ============================================================================
// SECTION: Fidelity
// ============================================================================

#[test]
fn empty_store_loads_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(&dir.path().join("empty.db"));
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn reopened_registry_reproduces_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = populated(&dir);
    let before = open_registry(&path).snapshot().unwrap();

    let registry = open_registry(&path);
    registry.set_paused(&OwnerId::new("admin"), true).unwrap();
    registry.set_admin(&OwnerId::new("admin"), OwnerId::new("ops")).unwrap();
    drop(registry);

    let reopened = open_registry(&path);
    let after = reopened.snapshot().unwrap();
    assert_eq!(after.records, before.records);
    assert_eq!(after.owners, before.owners);
    assert_eq!(after.meta.counter, 9);
    assert_eq!(reopened.get_admin().unwrap(), OwnerId::new("ops"));
    assert!(reopened.is_paused().unwrap());
    assert_eq!(
        reopened.get_owner_ids(&OwnerId::new("alice")).unwrap(),
        vec![id(1), id(3), id(4)]
    );
    assert_eq!(reopened.get_owner_ids(&OwnerId::new("bob")).unwrap(), vec![id(2), id(9)]);
    assert!(reopened.get(id(3)).unwrap().metadata_frozen());
    assert_eq!(reopened.get(id(9)).unwrap().status, DatasetStatus::Deprecated);
    assert!(matches!(reopened.get(id(5)), Err(RegistryError::NotFound(_))));
}

/// Runs the identifier-ceiling requests against `store` and reports the
/// outcome of each as an id or an error kind.
fn ceiling_outcomes<S: RegistryStateStore>(store: S) -> Vec<Result<u64, &'static str>> {
    let registry = DatasetRegistry::open(
        &RegistryConfig::new(OwnerId::new("admin")),
        store,
        FixedClock::new(42),
        Arc::new(NoopAuditSink),
    )
    .unwrap();
    let admin = OwnerId::new("admin");
    let request = |raw: u64| DatasetImport {
        id: raw,
        owner: OwnerId::new("carol"),
        fields: fields(),
        mutability: Mutability::Editable,
        created_at: 7,
        status: DatasetStatus::Active,
    };
    let outcome = |result: Result<DatasetId, RegistryError>| {
        result.map(DatasetId::get).map_err(|err| err.kind())
    };
    vec![
        outcome(registry.import(&admin, request(MAX_DATASET_ID + 1))),
        outcome(registry.import(&admin, request(MAX_DATASET_ID))),
        outcome(registry.register(&OwnerId::new("alice"), fields())),
        Ok(registry.get_count().unwrap()),
    ]
}

#[test]
fn identifier_ceiling_behaves_the_same_on_both_stores() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ceiling.db");
    let expected = vec![
        Err("invalid_params"),
        Ok(MAX_DATASET_ID),
        Err("invalid_params"),
        Ok(MAX_DATASET_ID),
    ];
    assert_eq!(ceiling_outcomes(InMemoryRegistryStateStore::new()), expected);
    assert_eq!(ceiling_outcomes(store_at(&path)), expected);

    let reopened = open_registry(&path);
    assert_eq!(reopened.get_count().unwrap(), MAX_DATASET_ID);
    assert_eq!(reopened.get(id(MAX_DATASET_ID)).unwrap().owner, OwnerId::new("carol"));
}

#[test]
fn emptied_owner_disappears_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");
    let registry = open_registry(&path);
    let alice = OwnerId::new("alice");
    registry.register(&alice, fields()).unwrap();
    registry.transfer(&alice, id(1), &OwnerId::new("carol")).unwrap();
    drop(registry);

    let snapshot = store_at(&path).load().unwrap().unwrap();
    assert_eq!(snapshot.owners.len(), 1);
    assert_eq!(snapshot.owners[0].owner, OwnerId::new("carol"));
    assert_eq!(snapshot.records[0].owner, OwnerId::new("carol"));
}

#[test]
fn alternate_pragmas_open() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = SqliteStoreConfig::new(dir.path().join("nested/registry.db"));
    config.journal_mode = SqliteStoreMode::Delete;
    config.sync_mode = SqliteSyncMode::Normal;
    config.busy_timeout_ms = 100;
    let store = SqliteRegistryStore::new(&config).unwrap();
    assert_eq!(store.load().unwrap(), None);
}

// ============================================================================
// SECTION: Integrity
// ============================================================================

#[test]
fn tampered_record_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    let path = populated(&dir);
    let connection = Connection::open(&path).unwrap();
    connection
        .execute(
            "UPDATE datasets SET record_json = ?1 WHERE dataset_id = 1",
            params![b"{\"tampered\":true}".to_vec()],
        )
        .unwrap();
    drop(connection);

    let err = store_at(&path).load().unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)));
    let open = DatasetRegistry::open(
        &RegistryConfig::new(OwnerId::new("admin")),
        store_at(&path),
        FixedClock::new(0),
        Arc::new(NoopAuditSink),
    );
    assert!(matches!(open, Err(RegistryError::Store(StoreError::Corrupt(_)))));
}

#[test]
fn unknown_hash_algorithm_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let path = populated(&dir);
    let connection = Connection::open(&path).unwrap();
    connection.execute("UPDATE datasets SET hash_algorithm = 'md5'", params![]).unwrap();
    drop(connection);
    assert!(matches!(store_at(&path).load(), Err(StoreError::Invalid(_))));
}

#[test]
fn owner_index_gap_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    let path = populated(&dir);
    let connection = Connection::open(&path).unwrap();
    connection
        .execute("UPDATE owner_index SET position = 7 WHERE owner = 'alice' AND position = 1", params![])
        .unwrap();
    drop(connection);
    assert!(matches!(store_at(&path).load(), Err(StoreError::Corrupt(_))));
}

#[test]
fn index_pointing_at_missing_record_fails_registry_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = populated(&dir);
    let connection = Connection::open(&path).unwrap();
    connection
        .execute(
            "INSERT INTO owner_index (owner, position, dataset_id) VALUES ('mallory', 0, 5)",
            params![],
        )
        .unwrap();
    drop(connection);
    let open = DatasetRegistry::open(
        &RegistryConfig::new(OwnerId::new("admin")),
        store_at(&path),
        FixedClock::new(0),
        Arc::new(NoopAuditSink),
    );
    assert!(matches!(open, Err(RegistryError::Store(StoreError::Corrupt(_)))));
}

#[test]
fn schema_version_mismatch_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");
    drop(store_at(&path));
    let connection = Connection::open(&path).unwrap();
    connection.execute("UPDATE store_meta SET version = 99", params![]).unwrap();
    drop(connection);
    let result = SqliteRegistryStore::new(&SqliteStoreConfig::new(&path));
    assert!(matches!(result, Err(SqliteStoreError::VersionMismatch(_))));
}

#[test]
fn directory_path_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let result = SqliteRegistryStore::new(&SqliteStoreConfig::new(dir.path()));
    assert!(matches!(result, Err(SqliteStoreError::Invalid(_))));
}

#[test]
fn overlong_path_component_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a".repeat(300));
    let result = SqliteRegistryStore::new(&SqliteStoreConfig::new(path));
    assert!(matches!(result, Err(SqliteStoreError::Invalid(_))));
}
