// crates/dataset-registry-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for dataset-registry-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use dataset_registry_config::ConfigError;
use dataset_registry_config::DatasetRegistryConfig;

/// Parses a TOML string into a `DatasetRegistryConfig` without validating.
pub fn config_from_toml(toml_str: &str) -> Result<DatasetRegistryConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal valid config: an admin and every other value defaulted.
pub fn minimal_config() -> Result<DatasetRegistryConfig, toml::de::Error> {
    config_from_toml("[registry]\nadmin = \"admin\"\n")
}

/// Asserts that `result` is an error whose message contains `needle`.
pub fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> Result<(), String> {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}
