// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend loader: activates a scanned package's entry module and turns the
//! installer it exports into a [`BackendDynamicPlugin`].
//!
//! Activation goes through the [`ModuleLoader`] seam so the registry can be
//! driven by the native loader in production and by fakes in tests. Every
//! failure is contained here: [`BackendLoader::load`] logs and returns `None`.

use std::any::Any;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use dynplug_core::{
    BackendDynamicPlugin, BackendInstaller, InstallerExport, InstallerKind, ModuleHandle,
};
use thiserror::Error;
use tracing::{error, info};

use crate::isolation::normalize_path;
use crate::scanner::ScannedPackage;

/// Why a single package could not be loaded. Never fatal for a scan.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("package declares no entry point")]
    MissingEntryPoint,

    #[error("entry point '{}' lies outside the package directory", path.display())]
    EntryOutsidePackage { path: PathBuf },

    /// The module could not be opened or its initialisation failed.
    #[error("failed to activate module '{}': {message}", path.display())]
    Activation { path: PathBuf, message: String },

    #[error("module '{}' does not export an installer", path.display())]
    MissingExport { path: PathBuf },

    /// The export's discriminator does not match the payload it carries.
    #[error("installer of kind '{kind}' is invalid: {reason}")]
    InvalidShape { kind: String, reason: String },

    #[error("module activation timed out after {0:?}")]
    Timeout(Duration),

    #[error("module activation panicked: {0}")]
    Panicked(String),
}

impl LoadError {
    /// The module loaded but does not look like a plugin. Logged at `info`
    /// since ordinary libraries under the root hit this.
    pub fn is_shape_problem(&self) -> bool {
        matches!(
            self,
            LoadError::MissingExport { .. } | LoadError::InvalidShape { .. }
        )
    }
}

/// What activating a module produced.
pub struct LoadedModule {
    pub export: Option<InstallerExport>,
    pub handle: Option<ModuleHandle>,
}

impl LoadedModule {
    /// A module exporting `export`, with nothing extra to keep alive.
    pub fn exporting(export: InstallerExport) -> Self {
        Self {
            export: Some(export),
            handle: None,
        }
    }

    /// A module that loaded but exports no installer.
    pub fn without_export() -> Self {
        Self {
            export: None,
            handle: None,
        }
    }

    pub fn with_handle(mut self, handle: ModuleHandle) -> Self {
        self.handle = Some(handle);
        self
    }
}

/// Activates the module at an entry path.
///
/// Called on the blocking pool; implementations may block and may panic.
pub trait ModuleLoader: Send + Sync + 'static {
    fn load_module(&self, path: &Path) -> Result<LoadedModule, LoadError>;
}

/// Check an export's discriminator against its payload.
pub fn validate_export(export: InstallerExport) -> Result<BackendInstaller, LoadError> {
    let invalid = |reason: &str| LoadError::InvalidShape {
        kind: export.kind.clone(),
        reason: reason.to_string(),
    };

    let kind = InstallerKind::from_str(&export.kind)
        .map_err(|_| invalid("unrecognised installer kind"))?;

    match kind {
        InstallerKind::Legacy => {
            if export.features.is_some() {
                return Err(invalid("legacy installer also carries an install entry point"));
            }
            let legacy = export
                .legacy
                .ok_or_else(|| invalid("legacy installer carries no hooks"))?;
            Ok(BackendInstaller::Legacy(legacy))
        }
        InstallerKind::New => {
            if export.legacy.is_some() {
                return Err(invalid("new installer also carries legacy hooks"));
            }
            let features = export
                .features
                .ok_or_else(|| invalid("new installer has no install entry point"))?;
            Ok(BackendInstaller::New(features))
        }
    }
}

/// Resolve a package's entry module, refusing paths that leave the package.
pub fn entry_point(package: &ScannedPackage) -> Result<PathBuf, LoadError> {
    let entry = package.entry_point().ok_or(LoadError::MissingEntryPoint)?;
    let entry = normalize_path(&entry);
    if !entry.starts_with(normalize_path(&package.location)) {
        return Err(LoadError::EntryOutsidePackage { path: entry });
    }
    Ok(entry)
}

/// Loads backend plugin packages one at a time.
#[derive(Clone)]
pub struct BackendLoader {
    modules: Arc<dyn ModuleLoader>,
    timeout: Duration,
}

impl BackendLoader {
    pub fn new(modules: Arc<dyn ModuleLoader>, timeout: Duration) -> Self {
        Self { modules, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Load one package, logging and returning `None` on any failure.
    pub async fn load(&self, package: &ScannedPackage) -> Option<BackendDynamicPlugin> {
        match self.try_load(package).await {
            Ok(plugin) => {
                info!(
                    plugin = %plugin.name,
                    version = %plugin.version,
                    location = %package.location.display(),
                    installer = %plugin.installer.kind(),
                    "loaded dynamic backend plugin"
                );
                Some(plugin)
            }
            Err(e) if e.is_shape_problem() => {
                info!(
                    plugin = %package.name(),
                    location = %package.location.display(),
                    reason = %e,
                    "dynamic backend plugin skipped"
                );
                None
            }
            Err(e) => {
                error!(
                    plugin = %package.name(),
                    location = %package.location.display(),
                    error = %e,
                    "failed to load dynamic backend plugin"
                );
                None
            }
        }
    }

    /// Load packages in order. A failing package never affects the others.
    pub async fn load_all(&self, packages: &[ScannedPackage]) -> Vec<BackendDynamicPlugin> {
        let mut loaded = Vec::with_capacity(packages.len());
        for package in packages {
            if let Some(plugin) = self.load(package).await {
                loaded.push(plugin);
            }
        }
        loaded
    }

    /// Load one package, surfacing the failure reason.
    pub async fn try_load(&self, package: &ScannedPackage) -> Result<BackendDynamicPlugin, LoadError> {
        let entry = entry_point(package)?;

        let modules = Arc::clone(&self.modules);
        let path = entry.clone();
        let task = tokio::task::spawn_blocking(move || modules.load_module(&path));

        // On timeout the blocking task keeps running detached and its result
        // is dropped when it finishes.
        let module = match tokio::time::timeout(self.timeout, task).await {
            Err(_) => return Err(LoadError::Timeout(self.timeout)),
            Ok(Err(join)) if join.is_panic() => {
                return Err(LoadError::Panicked(panic_message(join.into_panic())));
            }
            Ok(Err(join)) => {
                return Err(LoadError::Activation {
                    path: entry,
                    message: join.to_string(),
                });
            }
            Ok(Ok(result)) => result?,
        };

        let LoadedModule { export, handle } = module;
        let export = export.ok_or(LoadError::MissingExport { path: entry })?;
        let installer = validate_export(export)?;

        let mut plugin = BackendDynamicPlugin::new(
            package.name(),
            package.version(),
            package.role.role,
            installer,
        )
        .with_location(package.location.clone());
        if let Some(handle) = handle {
            plugin = plugin.with_module(handle);
        }
        Ok(plugin)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
