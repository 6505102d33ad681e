// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the dynplug plugin host.
//!
//! TOML configuration with strict key checking, an XDG file hierarchy,
//! `DYNPLUG_` environment overrides, and miette diagnostics with typo
//! suggestions.
//!
//! ```no_run
//! use dynplug_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("plugin root: {:?}", config.dynamic_plugins.root_directory);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{DynamicPluginsConfig, DynplugConfig, HostConfig};

/// Load configuration from the standard hierarchy and validate it.
pub fn load_and_validate() -> Result<DynplugConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load a specific configuration file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<DynplugConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
            let sources = std::fs::read_to_string(&resolved)
                .map(|content| vec![(resolved.display().to_string(), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<DynplugConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Contents of every configuration file that exists, for error spans.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut candidates = vec![std::path::PathBuf::from(loader::SYSTEM_CONFIG_PATH)];
    candidates.extend(loader::user_config_path());
    // Figment records the local file under its absolute path.
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(loader::LOCAL_CONFIG_FILE));
    }

    candidates
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            Some((path.display().to_string(), content))
        })
        .collect()
}
