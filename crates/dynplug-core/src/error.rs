// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the dynplug plugin system.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type used across scanning, loading, and the registry.
///
/// `Scan`, `Isolation`, `UnknownRole` and `Config` abort a whole scan.
/// `Manifest` and `Hook` are per-package and normally absorbed into logs.
#[derive(Debug, Error)]
pub enum DynplugError {
    /// Configuration errors (invalid values, unresolvable host root).
    #[error("configuration error: {0}")]
    Config(String),

    /// The configured plugin root is missing, unreadable, or not a directory.
    #[error("cannot scan dynamic plugin root '{}': {message}", path.display())]
    Scan { path: PathBuf, message: String },

    /// The plugin root cannot reach the host's own libraries.
    #[error(
        "dynamic plugins under '{}' cannot access host modules in '{}'; add '{}' to {env_var} when running the host",
        plugin_root.display(),
        required.display(),
        required.display()
    )]
    Isolation {
        plugin_root: PathBuf,
        required: PathBuf,
        env_var: String,
    },

    /// A package declared a role outside the closed role table.
    #[error("unknown package role '{0}'")]
    UnknownRole(String),

    /// A package manifest is missing or cannot be parsed.
    #[error("invalid package manifest '{}': {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    /// A plugin hook failed while the host was wiring it.
    #[error("plugin '{plugin}' hook failed: {message}")]
    Hook { plugin: String, message: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DynplugError {
    /// Whether this error aborts a whole scan rather than a single package.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DynplugError::Config(_)
                | DynplugError::Scan { .. }
                | DynplugError::Isolation { .. }
                | DynplugError::UnknownRole(_)
        )
    }
}
