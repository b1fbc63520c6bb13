// crates/dataset-registry-core/src/runtime/mod.rs
// ============================================================================
// Module: Dataset Registry Runtime
// Description: Registry coordinator, indexes, pagination, and helpers.
// Purpose: Execute registry operations over explicit, transactional state.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the primary store, the bounded owner index, the
//! paginator, the undo-logged transaction, and the registry coordinator that
//! ties them together. All external surfaces must call into the same
//! coordinator to preserve its invariants.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod clock;
pub mod datasets;
pub mod owner_index;
pub mod pagination;
pub mod registry;
pub mod state;
pub mod store;
pub(crate) mod transaction;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::MemoryAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use datasets::DatasetStore;
pub use owner_index::OWNER_INDEX_CAPACITY;
pub use owner_index::OwnerIndex;
pub use owner_index::OwnerIndexError;
pub use pagination::DEFAULT_MAX_PAGE_SIZE;
pub use pagination::MAX_PAGE_SIZE_LIMIT;
pub use pagination::Page;
pub use pagination::next_cursor;
pub use pagination::page_id_range;
pub use pagination::page_sequence;
pub use pagination::slice;
pub use registry::DatasetRegistry;
pub use registry::RegistryConfig;
pub use registry::RegistryError;
pub use state::RegistryState;
pub use store::InMemoryRegistryStateStore;
