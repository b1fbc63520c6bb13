// crates/dataset-registry-cli/src/lib.rs
// ============================================================================
// Module: Dataset Registry CLI Library
// Description: Shared helpers for the dataset registry command-line interface.
// Purpose: Build registries from configuration and read bounded inputs.
// Dependencies: dataset-registry-core, dataset-registry-config,
//               dataset-registry-store-sqlite
// ============================================================================

//! ## Overview
//! This library houses the pieces of the CLI that are independent of argument
//! parsing: opening the configured state store and audit sink, and reading
//! JSON request files under a size limit. The binary entry point
//! (`src/main.rs`) imports these helpers.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Store backend and registry construction.
pub mod backend;
/// Bounded file input helpers.
pub mod input;
