// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock module loader for deterministic testing.
//!
//! `MockModuleLoader` implements `ModuleLoader` with behaviour scripted per
//! entry file name, so tests can mix working, broken, panicking, and slow
//! plugins without building dynamic libraries.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use dynplug_core::{BackendFeature, InstallerExport, LegacyInstaller, ModuleHandle};
use dynplug_plugin::{LoadError, LoadedModule, ModuleLoader};

/// What loading a given entry file does.
#[derive(Debug, Clone)]
pub enum MockModule {
    /// Exports an empty legacy installer.
    Legacy,
    /// Exports a new-style installer returning these features.
    Features(Vec<BackendFeature>),
    /// Exports this value as-is, valid or not.
    Export(InstallerExport),
    /// Loads but exports nothing.
    NoExport,
    /// Activation fails with this message.
    Fail(String),
    /// Activation panics with this message.
    Panic(String),
    /// Sleeps, then exports an empty legacy installer.
    Slow(Duration),
}

/// A module loader returning scripted results.
///
/// Entries are matched on file name. Unscripted entries fail activation.
#[derive(Default)]
pub struct MockModuleLoader {
    modules: Mutex<HashMap<String, MockModule>>,
    calls: Mutex<Vec<PathBuf>>,
}

impl MockModuleLoader {
    /// Create a loader with no scripted modules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the behaviour for entries named `file_name`.
    pub fn with_module(self, file_name: impl Into<String>, module: MockModule) -> Self {
        self.set_module(file_name, module);
        self
    }

    /// Script or replace behaviour after construction.
    pub fn set_module(&self, file_name: impl Into<String>, module: MockModule) {
        if let Ok(mut modules) = self.modules.lock() {
            modules.insert(file_name.into(), module);
        }
    }

    /// Entry paths passed to `load_module`, in call order.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    fn scripted(&self, path: &Path) -> Option<MockModule> {
        let file_name = path.file_name()?.to_str()?;
        self.modules.lock().ok()?.get(file_name).cloned()
    }
}

impl ModuleLoader for MockModuleLoader {
    fn load_module(&self, path: &Path) -> Result<LoadedModule, LoadError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(path.to_path_buf());
        }

        let Some(module) = self.scripted(path) else {
            return Err(LoadError::Activation {
                path: path.to_path_buf(),
                message: "module not found".into(),
            });
        };

        let handle = ModuleHandle::new(path.to_path_buf());
        match module {
            MockModule::Legacy => Ok(legacy().with_handle(handle)),
            MockModule::Features(features) => Ok(LoadedModule::exporting(
                InstallerExport::features(move || features.clone()),
            )
            .with_handle(handle)),
            MockModule::Export(export) => Ok(LoadedModule::exporting(export).with_handle(handle)),
            MockModule::NoExport => Ok(LoadedModule::without_export().with_handle(handle)),
            MockModule::Fail(message) => Err(LoadError::Activation {
                path: path.to_path_buf(),
                message,
            }),
            MockModule::Panic(message) => panic!("{message}"),
            MockModule::Slow(delay) => {
                std::thread::sleep(delay);
                Ok(legacy().with_handle(handle))
            }
        }
    }
}

fn legacy() -> LoadedModule {
    LoadedModule::exporting(InstallerExport::legacy(LegacyInstaller::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynplug_core::FeatureKind;

    #[test]
    fn scripted_modules_follow_file_name() {
        let loader = MockModuleLoader::new()
            .with_module("todo.so", MockModule::Legacy)
            .with_module("plain.so", MockModule::NoExport);

        let loaded = loader.load_module(Path::new("/plugins/todo/lib/todo.so")).unwrap();
        assert_eq!(loaded.export.unwrap().kind, "legacy");
        assert!(loaded.handle.is_some());

        let plain = loader.load_module(Path::new("/plugins/plain/plain.so")).unwrap();
        assert!(plain.export.is_none());

        assert!(loader.load_module(Path::new("/plugins/x/other.so")).is_err());
        assert_eq!(loader.call_count(), 3);
        assert_eq!(loader.calls()[0], PathBuf::from("/plugins/todo/lib/todo.so"));
    }

    #[test]
    fn feature_modules_export_new_installers() {
        let loader = MockModuleLoader::new().with_module(
            "search.so",
            MockModule::Features(vec![BackendFeature::new("search", FeatureKind::Plugin)]),
        );
        let export = loader
            .load_module(Path::new("search.so"))
            .unwrap()
            .export
            .unwrap();
        assert_eq!(export.kind, "new");
        assert_eq!(export.features.unwrap().install().len(), 1);
    }
}
