// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Native module loader backed by `libloading`.

use std::path::Path;

use dynplug_core::{InstallerConstructor, ModuleHandle, INSTALLER_SYMBOL};
use libloading::Library;
use tracing::debug;

use crate::loader::{LoadError, LoadedModule, ModuleLoader};

/// Opens entry modules as dynamic libraries and calls their exported
/// `dynamic_plugin_installer` constructor.
///
/// Plugin libraries are built against `dynplug-core` with the same compiler
/// as the host, since the constructor uses the Rust ABI.
///
/// A library stays mapped for the rest of the process once opened. Hook
/// objects the host cloned out of an installer point into its code, and a
/// rescan must not invalidate them.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeModuleLoader;

impl NativeModuleLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleLoader for NativeModuleLoader {
    fn load_module(&self, path: &Path) -> Result<LoadedModule, LoadError> {
        // SAFETY: loading a library runs its initialisers. Plugin roots are
        // operator-controlled and only trusted code is expected there.
        let library = unsafe { Library::new(path) }.map_err(|e| LoadError::Activation {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        // Never unmapped: see the type docs.
        let library: &'static Library = Box::leak(Box::new(library));

        // SAFETY: the symbol type matches what `export_installer!` emits.
        let constructor = unsafe { library.get::<InstallerConstructor>(INSTALLER_SYMBOL.as_bytes()) }
            .map(|symbol| *symbol);

        let module = match constructor {
            Ok(constructor) => LoadedModule::exporting(constructor()),
            Err(e) => {
                debug!(location = %path.display(), error = %e, "no installer symbol");
                LoadedModule::without_export()
            }
        };
        Ok(module.with_handle(ModuleHandle::new(library)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_activation_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = NativeModuleLoader::new().load_module(&dir.path().join("absent.so"));
        assert!(matches!(result, Err(LoadError::Activation { .. })));
    }

    #[test]
    fn non_library_file_is_an_activation_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.js");
        std::fs::write(&path, "module.exports = {};").unwrap();
        let err = NativeModuleLoader::new().load_module(&path).err().unwrap();
        assert!(err.to_string().contains("index.js"));
    }
}
