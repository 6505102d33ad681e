// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Isolation guard between the plugin root and the host's libraries.
//!
//! Plugins loaded from outside the host installation still have to resolve
//! the host's own libraries. That works when the plugin root sits inside the
//! host root, or when the host's dependency directory is on the module search
//! path. Anything else would fail later with an opaque resolution error, so
//! the scan refuses up front with one actionable message.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use dynplug_core::DynplugError;

/// Environment variable holding the module search path.
pub const MODULE_PATH_ENV: &str = "DYNPLUG_MODULE_PATH";

/// Directory under the host root that holds the host's own libraries.
pub const HOST_DEPENDENCY_DIR: &str = "lib";

/// The ordered module search path, captured once per scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSearchPath {
    entries: Vec<PathBuf>,
}

impl ModuleSearchPath {
    pub fn new<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a delimiter-separated value using the platform path separator.
    /// Empty segments are dropped.
    pub fn parse(value: &OsStr) -> Self {
        Self {
            entries: std::env::split_paths(value)
                .filter(|p| !p.as_os_str().is_empty())
                .collect(),
        }
    }

    /// Read `DYNPLUG_MODULE_PATH` from the process environment.
    pub fn from_env() -> Self {
        std::env::var_os(MODULE_PATH_ENV)
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Whether `dir` is on the search path, comparing normalised paths.
    pub fn contains(&self, dir: &Path) -> bool {
        let wanted = normalize_path(dir);
        self.entries.iter().any(|entry| normalize_path(entry) == wanted)
    }
}

/// The host's dependency directory for a given host root.
pub fn host_dependency_dir(host_root: &Path) -> PathBuf {
    normalize_path(&host_root.join(HOST_DEPENDENCY_DIR))
}

/// Check that plugins under `plugin_root` can reach the host's libraries.
pub fn check_isolation(
    plugin_root: &Path,
    host_root: &Path,
    search_path: &ModuleSearchPath,
) -> Result<(), DynplugError> {
    let plugin_root = normalize_path(plugin_root);
    let host_root = normalize_path(host_root);

    let contained = plugin_root
        .parent()
        .is_some_and(|parent| parent.starts_with(&host_root));
    if contained {
        return Ok(());
    }

    let required = host_dependency_dir(&host_root);
    if search_path.contains(&required) {
        return Ok(());
    }

    Err(DynplugError::Isolation {
        plugin_root,
        required,
        env_var: MODULE_PATH_ENV.to_string(),
    })
}

/// Lexically normalise a path: drop `.` and resolve `..` against the
/// preceding component. Does not touch the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
