// crates/dataset-registry-core/src/core/mod.rs
// ============================================================================
// Module: Dataset Registry Core Types
// Description: Canonical dataset record model, validation, and persistence shapes.
// Purpose: Provide stable, serializable types shared by the runtime and stores.
// Dependencies: serde, serde_jcs, sha2, thiserror
// ============================================================================

//! ## Overview
//! Core types define dataset records, identifiers, validation rules, and the
//! snapshot/change-set shapes exchanged with state stores. These types are the
//! canonical source of truth for any derived surface (CLI or SDKs).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod hashing;
pub mod identifiers;
pub mod record;
pub mod state;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::canonical_json_bytes;
pub use hashing::hash_hex;
pub use identifiers::DatasetId;
pub use identifiers::MAX_DATASET_ID;
pub use identifiers::MAX_IDENTITY_CHARS;
pub use identifiers::OwnerId;
pub use record::DatasetFields;
pub use record::DatasetImport;
pub use record::DatasetRecord;
pub use record::DatasetStatus;
pub use record::MetadataUpdate;
pub use record::Mutability;
pub use state::OwnerIndexEntry;
pub use state::RegistryChangeSet;
pub use state::RegistryMeta;
pub use state::RegistrySnapshot;
pub use validation::ValidationError;
pub use validation::is_valid;
pub use validation::validate_coordinates;
pub use validation::validate_fields;
pub use validation::validate_update;
