// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk plugin tree builder.
//!
//! `PluginTree` owns a temporary host root containing a dynamic plugin root,
//! and writes package directories and manifests into it. The tree is removed
//! when the value is dropped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dynplug_config::DynamicPluginsConfig;
use dynplug_plugin::{ModuleLoader, ModuleSearchPath, PluginManager, MANIFEST_FILE};
use tempfile::TempDir;

/// Name of the plugin root directory inside the host root.
pub const PLUGIN_ROOT_DIR: &str = "dynamic-plugins";

/// A temporary host root with a dynamic plugin root inside it.
pub struct PluginTree {
    dir: TempDir,
}

impl PluginTree {
    /// Create the host root and an empty plugin root.
    pub fn new() -> io::Result<Self> {
        let dir = TempDir::new()?;
        fs::create_dir_all(dir.path().join(PLUGIN_ROOT_DIR))?;
        Ok(Self { dir })
    }

    pub fn host_root(&self) -> &Path {
        self.dir.path()
    }

    pub fn plugin_root(&self) -> PathBuf {
        self.dir.path().join(PLUGIN_ROOT_DIR)
    }

    /// Plugin configuration pointing at this tree's plugin root.
    pub fn config(&self) -> DynamicPluginsConfig {
        DynamicPluginsConfig::with_root(PLUGIN_ROOT_DIR)
    }

    /// A manager over this tree with an empty module search path.
    pub fn manager(&self, modules: Arc<dyn ModuleLoader>) -> PluginManager {
        PluginManager::new(self.host_root(), self.config(), modules)
            .with_search_path(ModuleSearchPath::default())
    }

    /// Write `<root>/<dir>/package.json` and return the package directory.
    pub fn add_package(
        &self,
        dir: &str,
        name: &str,
        version: &str,
        role: &str,
        main: Option<&str>,
    ) -> io::Result<PathBuf> {
        let home = self.plugin_root().join(dir);
        write_manifest(&home, name, version, role, main)?;
        Ok(home)
    }

    /// Shorthand for a backend plugin package named after its directory.
    pub fn add_backend_plugin(&self, dir: &str, main: &str) -> io::Result<PathBuf> {
        self.add_package(dir, dir, "1.0.0", "backend-plugin", Some(main))
    }

    /// Write an `alpha` variant inside an existing package directory.
    pub fn add_alpha(
        &self,
        dir: &str,
        name: &str,
        version: &str,
        role: &str,
        main: &str,
    ) -> io::Result<PathBuf> {
        let home = self.plugin_root().join(dir).join("alpha");
        write_manifest(&home, name, version, role, Some(main))?;
        Ok(home)
    }

    /// Write a package directory whose manifest is `contents` verbatim.
    pub fn add_raw_manifest(&self, dir: &str, contents: &str) -> io::Result<PathBuf> {
        let home = self.plugin_root().join(dir);
        fs::create_dir_all(&home)?;
        fs::write(home.join(MANIFEST_FILE), contents)?;
        Ok(home)
    }

    /// Write a file at `relative`, below the host root.
    pub fn add_file(&self, relative: &str, contents: &str) -> io::Result<PathBuf> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Create `<root>/<link_name>` pointing at `target`.
    #[cfg(unix)]
    pub fn symlink(&self, target: &Path, link_name: &str) -> io::Result<PathBuf> {
        let link = self.plugin_root().join(link_name);
        std::os::unix::fs::symlink(target, &link)?;
        Ok(link)
    }

    /// Absolute entry path for `main` inside package directory `dir`.
    pub fn entry_path(&self, dir: &str, main: &str) -> PathBuf {
        self.plugin_root().join(dir).join(main)
    }
}

fn write_manifest(
    home: &Path,
    name: &str,
    version: &str,
    role: &str,
    main: Option<&str>,
) -> io::Result<()> {
    fs::create_dir_all(home)?;
    let mut manifest = serde_json::json!({
        "name": name,
        "version": version,
        "plugin": { "role": role },
    });
    if let Some(main) = main {
        manifest["main"] = serde_json::Value::from(main);
    }
    fs::write(home.join(MANIFEST_FILE), manifest.to_string())
}
