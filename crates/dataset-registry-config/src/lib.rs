// crates/dataset-registry-config/src/lib.rs
// ============================================================================
// Module: Dataset Registry Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for dataset-registry.toml semantics.
// Dependencies: dataset-registry-core, dataset-registry-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `dataset-registry-config` defines the configuration model for the dataset
//! registry: the admin and paging settings that seed the coordinator, the
//! state store backend, and the audit sink. Validation is strict and
//! fail-closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
