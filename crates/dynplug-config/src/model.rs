// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the dynplug host.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level dynplug configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DynplugConfig {
    /// Host installation settings.
    #[serde(default)]
    pub host: HostConfig,

    /// Dynamic plugin discovery and loading settings.
    #[serde(default)]
    pub dynamic_plugins: DynamicPluginsConfig,
}

/// Host installation configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Root of the host installation. Defaults to the working directory.
    #[serde(default)]
    pub root: Option<String>,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            root: None,
            log_level: default_log_level(),
        }
    }
}

impl HostConfig {
    /// Resolve the host root to an absolute path.
    ///
    /// A relative `root` is taken relative to `cwd`.
    pub fn resolve_root(&self, cwd: &Path) -> PathBuf {
        match &self.root {
            Some(root) if Path::new(root).is_absolute() => PathBuf::from(root),
            Some(root) => cwd.join(root),
            None => cwd.to_path_buf(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Dynamic plugin configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DynamicPluginsConfig {
    /// Directory holding one subdirectory per plugin package.
    /// `None` disables dynamic plugins entirely.
    #[serde(default)]
    pub root_directory: Option<String>,

    /// Load a package's `alpha` subdirectory in place of the stable entry.
    #[serde(default = "default_prefer_alpha")]
    pub prefer_alpha: bool,

    /// Upper bound on activating a single plugin module.
    #[serde(default = "default_load_timeout_secs")]
    pub load_timeout_secs: u64,
}

impl Default for DynamicPluginsConfig {
    fn default() -> Self {
        Self {
            root_directory: None,
            prefer_alpha: default_prefer_alpha(),
            load_timeout_secs: default_load_timeout_secs(),
        }
    }
}

impl DynamicPluginsConfig {
    /// Configuration with a root directory and every other value defaulted.
    pub fn with_root(root_directory: impl Into<String>) -> Self {
        Self {
            root_directory: Some(root_directory.into()),
            ..Self::default()
        }
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }
}

fn default_prefer_alpha() -> bool {
    true
}

fn default_load_timeout_secs() -> u64 {
    30
}
