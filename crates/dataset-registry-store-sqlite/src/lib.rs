// crates/dataset-registry-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Registry State Store
// Description: Durable RegistryStateStore backend using SQLite.
// Purpose: Persist dataset registry state across process restarts.
// Dependencies: dataset-registry-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`RegistryStateStore`] implementation
//! that persists registry scalars, hashed canonical records, and positioned
//! owner index rows. Each change set lands in one SQL transaction, and loads
//! fail closed on any integrity violation.
//!
//! [`RegistryStateStore`]: dataset_registry_core::RegistryStateStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_RECORD_BYTES;
pub use store::SqliteRegistryStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
