// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Package manifest parsing from `package.json` files.
//!
//! Only the fields the scanner needs are read; everything else a package
//! metadata file carries is ignored.

use std::path::{Path, PathBuf};

use dynplug_core::DynplugError;
use serde::{Deserialize, Serialize};

/// File name of the package metadata file in every plugin directory.
pub const MANIFEST_FILE: &str = "package.json";

/// Parsed package manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Package name, unique within a scan.
    pub name: String,
    pub version: String,
    /// Entry module, relative to the package directory. Required for
    /// node-platform plugins only.
    #[serde(default)]
    pub main: Option<String>,
    /// The reserved stanza declaring what kind of package this is.
    pub plugin: PluginStanza,
}

/// The reserved `plugin` object of a package manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginStanza {
    /// Role string, classified against the closed role table later.
    pub role: String,
}

/// Parse a manifest from JSON content. `path` is only used in errors.
pub fn parse_package_manifest(content: &str, path: &Path) -> Result<PackageManifest, DynplugError> {
    let manifest: PackageManifest =
        serde_json::from_str(content).map_err(|e| DynplugError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if manifest.name.trim().is_empty() {
        return Err(DynplugError::Manifest {
            path: path.to_path_buf(),
            message: "name must not be empty".to_string(),
        });
    }

    if manifest.version.trim().is_empty() {
        return Err(DynplugError::Manifest {
            path: path.to_path_buf(),
            message: "version must not be empty".to_string(),
        });
    }

    Ok(manifest)
}

/// Read and parse `<package_dir>/package.json`.
pub async fn read_package_manifest(package_dir: &Path) -> Result<PackageManifest, DynplugError> {
    let path: PathBuf = package_dir.join(MANIFEST_FILE);
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| DynplugError::Manifest {
            path: path.clone(),
            message: e.to_string(),
        })?;
    parse_package_manifest(&content, &path)
}
