// crates/dataset-registry-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Registry State Store
// Description: Durable RegistryStateStore backed by SQLite.
// Purpose: Persist registry change sets with canonical, hashed records.
// Dependencies: dataset-registry-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`RegistryStateStore`] using `SQLite`.
//! Registry scalars live in a single-row table, each record is stored as RFC
//! 8785 canonical JSON alongside its digest, and owner index sequences are
//! stored as `(owner, position, dataset_id)` rows so their order survives a
//! reload. A change set is applied in one SQL transaction. Loads verify every
//! digest and fail closed on corruption; database contents are untrusted.

// ============================================================================//
// SECTION: Imports
// ============================================================================//

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use dataset_registry_core::DEFAULT_HASH_ALGORITHM;
use dataset_registry_core::DatasetId;
use dataset_registry_core::DatasetRecord;
use dataset_registry_core::HashAlgorithm;
use dataset_registry_core::OwnerId;
use dataset_registry_core::OwnerIndexEntry;
use dataset_registry_core::RegistryChangeSet;
use dataset_registry_core::RegistryMeta;
use dataset_registry_core::RegistrySnapshot;
use dataset_registry_core::RegistryStateStore;
use dataset_registry_core::StoreError;
use dataset_registry_core::canonical_json_bytes;
use dataset_registry_core::hash_hex;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================//
// SECTION: Constants
// ============================================================================//

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum canonical record size accepted by the store.
pub const MAX_RECORD_BYTES: usize = 64 * 1024;

// ============================================================================//
// SECTION: Config
// ============================================================================//

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` registry store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a configuration for `path` with default pragmas.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================//
// SECTION: Errors
// ============================================================================//

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or hash mismatch.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Store payload exceeded configured size limits.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "record_json exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
        }
    }
}

/// Maps an engine error into a store error.
fn db_error(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================//
// SECTION: Rows
// ============================================================================//

/// Raw `datasets` row.
struct RecordRow {
    /// Primary key.
    dataset_id: i64,
    /// Owner column.
    owner: String,
    /// Canonical JSON payload.
    record_json: Vec<u8>,
    /// Stored digest.
    record_hash: String,
    /// Digest algorithm label.
    hash_algorithm: String,
}

/// Record prepared for insertion.
struct EncodedRecord {
    /// Primary key.
    dataset_id: i64,
    /// Owner column.
    owner: String,
    /// Canonical JSON payload.
    record_json: Vec<u8>,
    /// Digest of the payload.
    record_hash: String,
    /// Digest algorithm label.
    hash_algorithm: &'static str,
}

// ============================================================================//
// SECTION: Store
// ============================================================================//

/// `SQLite`-backed registry state store.
#[derive(Clone)]
pub struct SqliteRegistryStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteRegistryStore {
    /// Opens an `SQLite`-backed registry store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }
}

impl RegistryStateStore for SqliteRegistryStore {
    fn load(&self) -> Result<Option<RegistrySnapshot>, StoreError> {
        self.load_snapshot().map_err(StoreError::from)
    }

    fn apply(&self, changes: &RegistryChangeSet) -> Result<(), StoreError> {
        self.apply_changes(changes).map_err(StoreError::from)
    }
}

impl SqliteRegistryStore {
    /// Loads the persisted registry snapshot.
    fn load_snapshot(&self) -> Result<Option<RegistrySnapshot>, SqliteStoreError> {
        let (meta, record_rows, index_rows) = {
            let mut guard = self
                .connection
                .lock()
                .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
            let tx = guard.transaction().map_err(db_error)?;
            let meta = read_meta(&tx)?;
            let record_rows = read_records(&tx)?;
            let index_rows = read_owner_index(&tx)?;
            tx.commit().map_err(db_error)?;
            drop(guard);
            (meta, record_rows, index_rows)
        };
        let Some(meta) = meta else {
            if record_rows.is_empty() && index_rows.is_empty() {
                return Ok(None);
            }
            return Err(SqliteStoreError::Corrupt(
                "registry rows present without registry_meta".to_string(),
            ));
        };
        let records =
            record_rows.into_iter().map(decode_record).collect::<Result<Vec<_>, _>>()?;
        let owners = assemble_owner_index(index_rows)?;
        Ok(Some(RegistrySnapshot {
            meta,
            records,
            owners,
        }))
    }

    /// Applies a change set in a single transaction.
    fn apply_changes(&self, changes: &RegistryChangeSet) -> Result<(), SqliteStoreError> {
        let encoded =
            changes.records.iter().map(encode_record).collect::<Result<Vec<_>, _>>()?;
        let counter = to_sql_integer(changes.meta.counter, "counter")?;
        let updated_at = unix_millis();
        {
            let mut guard = self
                .connection
                .lock()
                .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
            let tx = guard.transaction().map_err(db_error)?;
            tx.execute(
                "INSERT INTO registry_meta (id, counter, admin, paused) VALUES (1, ?1, ?2, ?3) \
                 ON CONFLICT(id) DO UPDATE SET counter = excluded.counter, admin = \
                 excluded.admin, paused = excluded.paused",
                params![counter, changes.meta.admin.as_str(), changes.meta.paused],
            )
            .map_err(db_error)?;
            for record in &encoded {
                tx.execute(
                    "INSERT INTO datasets (dataset_id, owner, record_json, record_hash, \
                     hash_algorithm, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6) ON \
                     CONFLICT(dataset_id) DO UPDATE SET owner = excluded.owner, record_json = \
                     excluded.record_json, record_hash = excluded.record_hash, hash_algorithm = \
                     excluded.hash_algorithm, updated_at = excluded.updated_at",
                    params![
                        record.dataset_id,
                        record.owner,
                        record.record_json,
                        record.record_hash,
                        record.hash_algorithm,
                        updated_at
                    ],
                )
                .map_err(db_error)?;
            }
            for entry in &changes.owners {
                replace_owner_entry(&tx, entry)?;
            }
            tx.commit().map_err(db_error)?;
            drop(guard);
        }
        Ok(())
    }
}

// ============================================================================//
// SECTION: Row Access
// ============================================================================//

/// Reads the registry scalar row.
fn read_meta(tx: &Transaction<'_>) -> Result<Option<RegistryMeta>, SqliteStoreError> {
    let row: Option<(i64, String, bool)> = tx
        .query_row("SELECT counter, admin, paused FROM registry_meta WHERE id = 1", [], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })
        .optional()
        .map_err(db_error)?;
    let Some((counter, admin, paused)) = row else {
        return Ok(None);
    };
    let counter = u64::try_from(counter)
        .map_err(|_| SqliteStoreError::Corrupt(format!("negative registry counter {counter}")))?;
    Ok(Some(RegistryMeta {
        counter,
        admin: OwnerId::new(admin),
        paused,
    }))
}

/// Reads every dataset row in identifier order.
fn read_records(tx: &Transaction<'_>) -> Result<Vec<RecordRow>, SqliteStoreError> {
    let mut statement = tx
        .prepare(
            "SELECT dataset_id, owner, record_json, record_hash, hash_algorithm FROM datasets \
             ORDER BY dataset_id",
        )
        .map_err(db_error)?;
    let rows = statement
        .query_map([], |row| {
            Ok(RecordRow {
                dataset_id: row.get(0)?,
                owner: row.get(1)?,
                record_json: row.get(2)?,
                record_hash: row.get(3)?,
                hash_algorithm: row.get(4)?,
            })
        })
        .map_err(db_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(db_error)?;
    Ok(rows)
}

/// Reads every owner index row ordered by owner then position.
fn read_owner_index(tx: &Transaction<'_>) -> Result<Vec<(String, i64, i64)>, SqliteStoreError> {
    let mut statement = tx
        .prepare("SELECT owner, position, dataset_id FROM owner_index ORDER BY owner, position")
        .map_err(db_error)?;
    let rows = statement
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .map_err(db_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(db_error)?;
    Ok(rows)
}

/// Rewrites one owner's index rows.
fn replace_owner_entry(
    tx: &Transaction<'_>,
    entry: &OwnerIndexEntry,
) -> Result<(), SqliteStoreError> {
    tx.execute("DELETE FROM owner_index WHERE owner = ?1", params![entry.owner.as_str()])
        .map_err(db_error)?;
    for (position, dataset_id) in entry.dataset_ids.iter().enumerate() {
        let position = i64::try_from(position)
            .map_err(|_| SqliteStoreError::Invalid("owner index position overflow".to_string()))?;
        let dataset_id = to_sql_integer(dataset_id.get(), "dataset_id")?;
        tx.execute(
            "INSERT INTO owner_index (owner, position, dataset_id) VALUES (?1, ?2, ?3)",
            params![entry.owner.as_str(), position, dataset_id],
        )
        .map_err(db_error)?;
    }
    Ok(())
}

// ============================================================================//
// SECTION: Encoding
// ============================================================================//

/// Canonicalizes and hashes a record for storage.
fn encode_record(record: &DatasetRecord) -> Result<EncodedRecord, SqliteStoreError> {
    let record_json = canonical_json_bytes(record)
        .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    if record_json.len() > MAX_RECORD_BYTES {
        return Err(SqliteStoreError::TooLarge {
            max_bytes: MAX_RECORD_BYTES,
            actual_bytes: record_json.len(),
        });
    }
    let record_hash = hash_hex(DEFAULT_HASH_ALGORITHM, &record_json);
    Ok(EncodedRecord {
        dataset_id: to_sql_integer(record.id.get(), "dataset_id")?,
        owner: record.owner.as_str().to_string(),
        record_json,
        record_hash,
        hash_algorithm: DEFAULT_HASH_ALGORITHM.as_str(),
    })
}

/// Verifies and decodes a stored record.
fn decode_record(row: RecordRow) -> Result<DatasetRecord, SqliteStoreError> {
    if row.record_json.len() > MAX_RECORD_BYTES {
        return Err(SqliteStoreError::TooLarge {
            max_bytes: MAX_RECORD_BYTES,
            actual_bytes: row.record_json.len(),
        });
    }
    let algorithm = HashAlgorithm::from_label(&row.hash_algorithm).ok_or_else(|| {
        SqliteStoreError::Invalid(format!("unsupported hash algorithm: {}", row.hash_algorithm))
    })?;
    if hash_hex(algorithm, &row.record_json) != row.record_hash {
        return Err(SqliteStoreError::Corrupt(format!(
            "hash mismatch for dataset {}",
            row.dataset_id
        )));
    }
    let record: DatasetRecord = serde_json::from_slice(&row.record_json)
        .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    if i64::try_from(record.id.get()).ok() != Some(row.dataset_id) {
        return Err(SqliteStoreError::Invalid(
            "dataset_id mismatch between key and payload".to_string(),
        ));
    }
    if record.owner.as_str() != row.owner {
        return Err(SqliteStoreError::Invalid(
            "owner mismatch between column and payload".to_string(),
        ));
    }
    Ok(record)
}

/// Groups positioned index rows into owner entries.
fn assemble_owner_index(
    rows: Vec<(String, i64, i64)>,
) -> Result<Vec<OwnerIndexEntry>, SqliteStoreError> {
    let mut entries: Vec<OwnerIndexEntry> = Vec::new();
    for (owner, position, raw_id) in rows {
        let dataset_id = u64::try_from(raw_id).ok().and_then(DatasetId::from_raw).ok_or_else(|| {
            SqliteStoreError::Corrupt(format!("invalid dataset id {raw_id} in owner index"))
        })?;
        let continues = entries.last().is_some_and(|entry| entry.owner.as_str() == owner);
        let expected_position = if continues {
            entries.last().map_or(0, |entry| entry.dataset_ids.len())
        } else {
            0
        };
        if usize::try_from(position).ok() != Some(expected_position) {
            return Err(SqliteStoreError::Corrupt(format!(
                "owner index positions for {owner} are not contiguous"
            )));
        }
        if continues {
            if let Some(entry) = entries.last_mut() {
                entry.dataset_ids.push(dataset_id);
            }
        } else {
            entries.push(OwnerIndexEntry {
                owner: OwnerId::new(owner),
                dataset_ids: vec![dataset_id],
            });
        }
    }
    Ok(entries)
}

/// Converts an unsigned value to a `SQLite` integer.
fn to_sql_integer(value: u64, label: &str) -> Result<i64, SqliteStoreError> {
    i64::try_from(value)
        .map_err(|_| SqliteStoreError::Invalid(format!("{label} exceeds sqlite integer range")))
}

// ============================================================================//
// SECTION: Helpers
// ============================================================================//

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_error)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(db_error)?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(db_error)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(db_error)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db_error)?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS registry_meta (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    counter INTEGER NOT NULL,
                    admin TEXT NOT NULL,
                    paused INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS datasets (
                    dataset_id INTEGER PRIMARY KEY,
                    owner TEXT NOT NULL,
                    record_json BLOB NOT NULL,
                    record_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL,
                    updated_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS owner_index (
                    owner TEXT NOT NULL,
                    position INTEGER NOT NULL,
                    dataset_id INTEGER NOT NULL,
                    PRIMARY KEY (owner, position)
                );",
            )
            .map_err(db_error)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(db_error)?;
    Ok(())
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
