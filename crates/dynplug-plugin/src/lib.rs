// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dynamic plugin discovery and loading.
//!
//! The scanner walks a configured root directory for plugin packages, the
//! isolation guard checks that those packages can reach the host's libraries,
//! the backend loader activates node-platform plugin modules, and the
//! registry publishes the result as an atomically swapped snapshot.

pub mod isolation;
pub mod loader;
pub mod manifest;
pub mod native;
pub mod registry;
pub mod roles;
pub mod scanner;

pub use isolation::{check_isolation, ModuleSearchPath, HOST_DEPENDENCY_DIR, MODULE_PATH_ENV};
pub use loader::{validate_export, BackendLoader, LoadError, LoadedModule, ModuleLoader};
pub use manifest::{parse_package_manifest, read_package_manifest, PackageManifest, MANIFEST_FILE};
pub use native::NativeModuleLoader;
pub use registry::{PluginManager, RegistrySnapshot, SearchPathSource};
pub use roles::classify;
pub use scanner::{PluginScanner, ScannedPackage};
