// crates/dataset-registry-config/src/config.rs
// ============================================================================
// Module: Dataset Registry Configuration
// Description: Configuration loading and validation for the dataset registry.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: dataset-registry-core, dataset-registry-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed. The file has three tables:
//! `[registry]` seeds the coordinator, `[store]` selects the state store
//! backend, and `[audit]` selects where mutation events are written.
//! Config inputs are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use dataset_registry_core::DEFAULT_MAX_PAGE_SIZE;
use dataset_registry_core::MAX_IDENTITY_CHARS;
use dataset_registry_core::MAX_PAGE_SIZE_LIMIT;
use dataset_registry_core::OwnerId;
use dataset_registry_core::RegistryConfig;
use dataset_registry_store_sqlite::SqliteStoreConfig;
use dataset_registry_store_sqlite::SqliteStoreMode;
use dataset_registry_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "dataset-registry.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "DATASET_REGISTRY_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of the admin identity, in characters.
pub const MAX_ADMIN_CHARS: usize = MAX_IDENTITY_CHARS;
/// Default `SQLite` busy timeout (ms).
const DEFAULT_STORE_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Upper bound for the `SQLite` busy timeout (ms).
const MAX_STORE_BUSY_TIMEOUT_MS: u64 = 600_000;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Dataset registry configuration.
///
/// # Invariants
/// - A value returned by [`DatasetRegistryConfig::load`] has passed
///   [`DatasetRegistryConfig::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetRegistryConfig {
    /// Registry coordinator settings.
    #[serde(default)]
    pub registry: RegistrySection,
    /// State store backend settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Audit sink settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl DatasetRegistryConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path is taken from `path`, then from `DATASET_REGISTRY_CONFIG`,
    /// then defaults to `dataset-registry.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Parses and validates configuration from raw file contents.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the contents exceed the size limit, are
    /// not UTF-8, fail to parse, or fail validation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.registry.validate()?;
        self.store.validate()?;
        self.audit.validate()?;
        Ok(())
    }

    /// Returns the coordinator configuration described by `[registry]`.
    #[must_use]
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            admin: OwnerId::new(self.registry.admin.trim()),
            start_paused: self.registry.start_paused,
            max_page_size: self.registry.max_page_size,
        }
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// `[registry]` table.
///
/// `admin` and `start_paused` seed an empty store only; a persisted registry
/// keeps its stored admin and pause flag.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrySection {
    /// Initial administrator identity.
    #[serde(default)]
    pub admin: String,
    /// Whether a fresh registry starts paused.
    #[serde(default)]
    pub start_paused: bool,
    /// Maximum number of items a page may return.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            admin: String::new(),
            start_paused: false,
            max_page_size: default_max_page_size(),
        }
    }
}

impl RegistrySection {
    /// Validates registry settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let admin = self.admin.trim();
        if admin.is_empty() {
            return Err(ConfigError::Invalid("registry.admin must be non-empty".to_string()));
        }
        if admin.chars().count() > MAX_ADMIN_CHARS {
            return Err(ConfigError::Invalid(format!(
                "registry.admin exceeds {MAX_ADMIN_CHARS} characters"
            )));
        }
        if self.max_page_size == 0 || self.max_page_size > MAX_PAGE_SIZE_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "registry.max_page_size must be between 1 and {MAX_PAGE_SIZE_LIMIT}"
            )));
        }
        Ok(())
    }
}

/// Returns the default page size.
const fn default_max_page_size() -> u64 {
    DEFAULT_MAX_PAGE_SIZE
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `[store]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            path: None,
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid("memory store must not set path".to_string()));
                }
                Ok(())
            }
            StoreType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite store requires path".to_string())
                })?;
                validate_field_path("store.path", path)?;
                if self.busy_timeout_ms > MAX_STORE_BUSY_TIMEOUT_MS {
                    return Err(ConfigError::Invalid(format!(
                        "store.busy_timeout_ms must be at most {MAX_STORE_BUSY_TIMEOUT_MS}"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Returns the `SQLite` store configuration, if the sqlite backend is
    /// selected.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteStoreConfig> {
        match (self.store_type, &self.path) {
            (StoreType::Sqlite, Some(path)) => Some(SqliteStoreConfig {
                path: path.clone(),
                busy_timeout_ms: self.busy_timeout_ms,
                journal_mode: self.journal_mode,
                sync_mode: self.sync_mode,
            }),
            _ => None,
        }
    }
}

/// State store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Use the in-memory store; state is lost when the process exits.
    #[default]
    Memory,
    /// Use the `SQLite`-backed durable store.
    Sqlite,
}

/// Returns the default busy timeout for `SQLite` stores.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_STORE_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// `[audit]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Whether mutation events are emitted.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// JSON-lines file receiving events; stderr when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            if !self.enabled {
                return Err(ConfigError::Invalid(
                    "audit.path must not be set when audit is disabled".to_string(),
                ));
            }
            validate_field_path("audit.path", path)?;
        }
        Ok(())
    }
}

/// Audit is on unless explicitly disabled.
const fn default_audit_enabled() -> bool {
    true
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved config path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path field against length constraints.
fn validate_field_path(field: &str, path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
