// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::DynplugConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Upper bound for `dynamic_plugins.load_timeout_secs`.
const MAX_LOAD_TIMEOUT_SECS: u64 = 3600;

/// Validate a deserialized configuration, collecting every failure.
pub fn validate_config(config: &DynplugConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if let Some(root) = &config.dynamic_plugins.root_directory
        && root.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "dynamic_plugins.root_directory must not be empty; remove the key to disable dynamic plugins".to_string(),
        });
    }

    let timeout = config.dynamic_plugins.load_timeout_secs;
    if timeout == 0 || timeout > MAX_LOAD_TIMEOUT_SECS {
        errors.push(ConfigError::Validation {
            message: format!(
                "dynamic_plugins.load_timeout_secs must be between 1 and {MAX_LOAD_TIMEOUT_SECS}, got {timeout}"
            ),
        });
    }

    if let Some(root) = &config.host.root
        && root.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "host.root must not be empty".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.host.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "host.log_level `{}` is not one of: {}",
                config.host.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
