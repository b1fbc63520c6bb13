// crates/dataset-registry-core/src/lib.rs
// ============================================================================
// Module: Dataset Registry Core Library
// Description: Public API surface for the dataset registry core.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Dataset registry core stores atmospheric-dataset metadata records, indexes
//! them by owner, and pages through both the global identifier space and each
//! owner's holdings. Mutations are authorized, pause-gated, validated, and
//! applied atomically. Persistence, time, and auditing are reached through
//! explicit interfaces so hosts choose their own backends.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AuditOutcome;
pub use interfaces::Clock;
pub use interfaces::RegistryAuditEvent;
pub use interfaces::RegistryAuditSink;
pub use interfaces::RegistryOperation;
pub use interfaces::RegistryStateStore;
pub use interfaces::StoreError;
pub use runtime::DEFAULT_MAX_PAGE_SIZE;
pub use runtime::DatasetRegistry;
pub use runtime::DatasetStore;
pub use runtime::FileAuditSink;
pub use runtime::FixedClock;
pub use runtime::InMemoryRegistryStateStore;
pub use runtime::MAX_PAGE_SIZE_LIMIT;
pub use runtime::MemoryAuditSink;
pub use runtime::NoopAuditSink;
pub use runtime::OWNER_INDEX_CAPACITY;
pub use runtime::OwnerIndex;
pub use runtime::OwnerIndexError;
pub use runtime::Page;
pub use runtime::RegistryConfig;
pub use runtime::RegistryError;
pub use runtime::RegistryState;
pub use runtime::StderrAuditSink;
pub use runtime::SystemClock;
