// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry for dynamically discovered plugins.
//!
//! The `PluginManager` owns the current generation of scanned packages and
//! loaded plugins as one immutable [`RegistrySnapshot`]. A rescan builds the
//! next snapshot privately and publishes it with a single swap, so readers
//! always see a complete batch and a failed scan leaves the old one in place.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use dynplug_config::{DynamicPluginsConfig, DynplugConfig};
use dynplug_core::{
    BackendDynamicPlugin, BackendPluginProvider, DynamicPlugin, DynplugError, PackagePlatform,
    PluginDiscovery, PluginEnvironment,
};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::isolation::ModuleSearchPath;
use crate::loader::{BackendLoader, ModuleLoader};
use crate::scanner::{PluginScanner, ScannedPackage};

/// One published generation of registry state.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    /// Incremented by every successful scan. Zero before the first one.
    pub generation: u64,
    pub scanned: Arc<Vec<ScannedPackage>>,
    /// Plugins produced by the scan, in enumeration order.
    pub discovered: Arc<Vec<DynamicPlugin>>,
    /// Plugins added by the host; carried across rescans.
    pub added: Vec<Arc<BackendDynamicPlugin>>,
}

/// Where the module search path comes from at scan time.
#[derive(Debug, Clone)]
pub enum SearchPathSource {
    /// Read `DYNPLUG_MODULE_PATH` at the start of every scan.
    Environment,
    Fixed(ModuleSearchPath),
}

impl SearchPathSource {
    pub fn resolve(&self) -> ModuleSearchPath {
        match self {
            SearchPathSource::Environment => ModuleSearchPath::from_env(),
            SearchPathSource::Fixed(search_path) => search_path.clone(),
        }
    }
}

/// Discovers, loads, and serves dynamic plugins.
pub struct PluginManager {
    host_root: PathBuf,
    config: ArcSwap<DynamicPluginsConfig>,
    modules: Arc<dyn ModuleLoader>,
    search_path: SearchPathSource,
    state: ArcSwap<RegistrySnapshot>,
    writer: Mutex<()>,
}

impl PluginManager {
    /// Create an empty manager. Nothing is scanned until [`rescan`](Self::rescan).
    pub fn new(
        host_root: impl Into<PathBuf>,
        config: DynamicPluginsConfig,
        modules: Arc<dyn ModuleLoader>,
    ) -> Self {
        Self {
            host_root: host_root.into(),
            config: ArcSwap::from_pointee(config),
            modules,
            search_path: SearchPathSource::Environment,
            state: ArcSwap::from_pointee(RegistrySnapshot::default()),
            writer: Mutex::new(()),
        }
    }

    /// Use a fixed search path instead of reading the environment.
    pub fn with_search_path(mut self, search_path: ModuleSearchPath) -> Self {
        self.search_path = SearchPathSource::Fixed(search_path);
        self
    }

    /// Build a manager from host configuration and run the initial scan.
    ///
    /// A fatal scan error fails construction.
    pub async fn from_config(
        config: &DynplugConfig,
        modules: Arc<dyn ModuleLoader>,
    ) -> Result<Self, DynplugError> {
        let cwd = std::env::current_dir()
            .map_err(|e| DynplugError::Config(format!("cannot resolve working directory: {e}")))?;
        let host_root = config.host.resolve_root(&cwd);
        let manager = Self::new(host_root, config.dynamic_plugins.clone(), modules);
        manager.rescan().await?;
        Ok(manager)
    }

    pub fn host_root(&self) -> &Path {
        &self.host_root
    }

    /// The plugin configuration the current snapshot was built from.
    pub fn config(&self) -> Arc<DynamicPluginsConfig> {
        self.config.load_full()
    }

    /// Scan and load with the current configuration, then publish.
    pub async fn rescan(&self) -> Result<Arc<RegistrySnapshot>, DynplugError> {
        let _writer = self.writer.lock().await;
        let config = self.config.load_full();
        self.scan_and_publish(&config).await
    }

    /// Replace the plugin configuration and rescan.
    ///
    /// The new configuration is committed only when its scan succeeds.
    pub async fn update_config(
        &self,
        config: DynamicPluginsConfig,
    ) -> Result<Arc<RegistrySnapshot>, DynplugError> {
        let _writer = self.writer.lock().await;
        let snapshot = self.scan_and_publish(&config).await?;
        self.config.store(Arc::new(config));
        Ok(snapshot)
    }

    /// Register a plugin built by the host itself. Visible immediately.
    pub fn add_backend_plugin(&self, plugin: BackendDynamicPlugin) {
        let plugin = Arc::new(plugin);
        info!(plugin = %plugin.name, "added backend plugin");
        self.state.rcu(|current| {
            let mut next = RegistrySnapshot::clone(current);
            next.added.push(Arc::clone(&plugin));
            next
        });
    }

    /// Backend plugins of the current generation, then host-added ones.
    pub fn backend_plugins(&self) -> Vec<Arc<BackendDynamicPlugin>> {
        let snapshot = self.state.load();
        snapshot
            .discovered
            .iter()
            .filter_map(DynamicPlugin::as_backend)
            .cloned()
            .chain(snapshot.added.iter().cloned())
            .collect()
    }

    /// Every descriptor of the current generation, then host-added ones.
    pub fn plugins(&self) -> Vec<DynamicPlugin> {
        let snapshot = self.state.load();
        snapshot
            .discovered
            .iter()
            .cloned()
            .chain(snapshot.added.iter().cloned().map(DynamicPlugin::Backend))
            .collect()
    }

    pub fn scanned_packages(&self) -> Arc<Vec<ScannedPackage>> {
        Arc::clone(&self.state.load().scanned)
    }

    pub fn generation(&self) -> u64 {
        self.state.load().generation
    }

    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.state.load_full()
    }

    /// Environment for wiring `plugin_id`'s legacy hooks against this registry.
    pub fn environment(
        self: &Arc<Self>,
        plugin_id: impl Into<String>,
        config: serde_json::Value,
        discovery: Arc<dyn PluginDiscovery>,
    ) -> PluginEnvironment {
        let provider: Arc<dyn BackendPluginProvider> = Arc::clone(self) as _;
        PluginEnvironment::new(plugin_id, config, discovery, provider)
    }

    /// Caller holds the writer lock.
    async fn scan_and_publish(
        &self,
        config: &DynamicPluginsConfig,
    ) -> Result<Arc<RegistrySnapshot>, DynplugError> {
        let scanner = PluginScanner::new(&self.host_root, config.clone());
        let scanned = match scanner.scan_root(&self.search_path.resolve()).await {
            Ok(scanned) => scanned,
            Err(e) => {
                error!(error = %e, "dynamic plugin scan failed, keeping previous plugins");
                return Err(e);
            }
        };

        let loader = BackendLoader::new(Arc::clone(&self.modules), config.load_timeout());
        let mut discovered = Vec::with_capacity(scanned.len());
        for package in &scanned {
            match package.role.platform {
                PackagePlatform::Node if package.role.is_plugin => {
                    if let Some(plugin) = loader.load(package).await {
                        discovered.push(DynamicPlugin::from(plugin));
                    }
                }
                PackagePlatform::Node => warn!(
                    plugin = %package.name(),
                    role = %package.role.role,
                    location = %package.location.display(),
                    "skipping node package that is not a plugin"
                ),
                PackagePlatform::Web => {
                    if let Some(frontend) = package.to_frontend() {
                        discovered.push(DynamicPlugin::Frontend(frontend));
                    }
                }
            }
        }

        let scanned = Arc::new(scanned);
        let discovered = Arc::new(discovered);
        self.state.rcu(|current| RegistrySnapshot {
            generation: current.generation + 1,
            scanned: Arc::clone(&scanned),
            discovered: Arc::clone(&discovered),
            added: current.added.clone(),
        });

        let snapshot = self.state.load_full();
        info!(
            generation = snapshot.generation,
            scanned = snapshot.scanned.len(),
            loaded = snapshot.discovered.len(),
            "dynamic plugin scan complete"
        );
        Ok(snapshot)
    }
}

impl BackendPluginProvider for PluginManager {
    fn backend_plugins(&self) -> Vec<Arc<BackendDynamicPlugin>> {
        PluginManager::backend_plugins(self)
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("host_root", &self.host_root)
            .field("search_path", &self.search_path)
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{LoadError, LoadedModule};
    use dynplug_core::{
        BackendInstaller, InstallerExport, LegacyInstaller, PackageRole, StaticDiscovery,
    };
    use std::fs;
    use tracing_test::traced_test;

    /// Exports a legacy installer for every entry except `broken.so`.
    struct FakeModules;

    impl ModuleLoader for FakeModules {
        fn load_module(&self, path: &Path) -> Result<LoadedModule, LoadError> {
            if path.ends_with("broken.so") {
                return Err(LoadError::Activation {
                    path: path.to_path_buf(),
                    message: "bad ELF header".into(),
                });
            }
            Ok(LoadedModule::exporting(InstallerExport::legacy(
                LegacyInstaller::new(),
            )))
        }
    }

    struct Host {
        dir: tempfile::TempDir,
    }

    impl Host {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            fs::create_dir_all(dir.path().join("plugins")).unwrap();
            Self { dir }
        }

        fn package(&self, dir: &str, role: &str, main: &str) {
            let home = self.dir.path().join("plugins").join(dir);
            fs::create_dir_all(&home).unwrap();
            let json = serde_json::json!({
                "name": dir,
                "version": "1.0.0",
                "main": main,
                "plugin": { "role": role },
            });
            fs::write(home.join("package.json"), json.to_string()).unwrap();
        }

        fn manager(&self) -> PluginManager {
            PluginManager::new(
                self.dir.path(),
                DynamicPluginsConfig::with_root("plugins"),
                Arc::new(FakeModules),
            )
            .with_search_path(ModuleSearchPath::default())
        }
    }

    fn host_plugin(name: &str) -> BackendDynamicPlugin {
        BackendDynamicPlugin::new(
            name,
            "0.0.1",
            PackageRole::BackendPlugin,
            BackendInstaller::Legacy(LegacyInstaller::new()),
        )
    }

    #[tokio::test]
    async fn rescan_loads_backend_and_frontend_plugins() {
        let host = Host::new();
        host.package("catalog", "backend-plugin", "lib/catalog.so");
        host.package("broken", "backend-plugin", "broken.so");
        host.package("todo", "frontend-plugin", "dist/index.js");
        host.package("utils", "node-library", "lib/utils.so");

        let manager = host.manager();
        let snapshot = manager.rescan().await.unwrap();
        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.scanned.len(), 4);

        let names: Vec<_> = manager.plugins().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["catalog", "todo"]);
        assert_eq!(manager.backend_plugins().len(), 1);
    }

    #[tokio::test]
    async fn added_plugins_are_visible_without_a_scan() {
        let host = Host::new();
        let manager = host.manager();
        manager.add_backend_plugin(host_plugin("static-backend"));

        assert_eq!(manager.generation(), 0);
        let backend = manager.backend_plugins();
        assert_eq!(backend.len(), 1);
        assert_eq!(backend[0].name, "static-backend");
        assert!(backend[0].location().is_none());
    }

    #[tokio::test]
    async fn added_plugins_survive_rescans_and_follow_discovered_ones() {
        let host = Host::new();
        host.package("catalog", "backend-plugin", "lib/catalog.so");
        let manager = host.manager();
        manager.add_backend_plugin(host_plugin("static-backend"));

        manager.rescan().await.unwrap();
        manager.rescan().await.unwrap();

        let names: Vec<_> = manager.backend_plugins().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["catalog", "static-backend"]);
        assert_eq!(manager.generation(), 2);
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_rescan_keeps_previous_snapshot() {
        let host = Host::new();
        host.package("catalog", "backend-plugin", "lib/catalog.so");
        let manager = host.manager();
        manager.rescan().await.unwrap();

        host.package("odd", "backend-gadget", "lib/odd.so");
        let err = manager.rescan().await.unwrap_err();
        assert!(matches!(err, DynplugError::UnknownRole(_)));
        assert_eq!(manager.generation(), 1);
        assert_eq!(manager.backend_plugins().len(), 1);
        assert!(logs_contain("keeping previous plugins"));
    }

    #[tokio::test]
    async fn update_config_commits_only_on_success() {
        let host = Host::new();
        host.package("catalog", "backend-plugin", "lib/catalog.so");
        let manager = host.manager();
        manager.rescan().await.unwrap();

        let missing = DynamicPluginsConfig::with_root("missing");
        assert!(manager.update_config(missing).await.is_err());
        assert_eq!(manager.config().root_directory.as_deref(), Some("plugins"));
        assert_eq!(manager.backend_plugins().len(), 1);

        let disabled = DynamicPluginsConfig::default();
        let snapshot = manager.update_config(disabled).await.unwrap();
        assert!(snapshot.discovered.is_empty());
        assert!(manager.config().root_directory.is_none());
    }

    #[tokio::test]
    async fn environment_exposes_registry_to_hooks() {
        let host = Host::new();
        host.package("catalog", "backend-plugin", "lib/catalog.so");
        let manager = Arc::new(host.manager());
        manager.rescan().await.unwrap();

        let env = manager.environment(
            "catalog",
            serde_json::json!({ "refresh": 30 }),
            Arc::new(StaticDiscovery::new("http://localhost:7007")),
        );
        assert_eq!(env.plugin_provider.backend_plugins().len(), 1);
        assert_eq!(env.base_url(), "http://localhost:7007/api/catalog");
    }
}
