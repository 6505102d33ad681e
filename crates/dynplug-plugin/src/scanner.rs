// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Root scanner: finds plugin packages under the configured root directory.
//!
//! Each immediate subdirectory (or symlink to a directory) of the root is a
//! candidate package. A problem with one package skips that package; a
//! problem with the root itself fails the whole scan.

use std::path::{Path, PathBuf};

use dynplug_config::DynamicPluginsConfig;
use dynplug_core::{DynplugError, FrontendDynamicPlugin, PackagePlatform, RoleInfo};
use tokio::fs;
use tracing::{debug, warn};

use crate::isolation::{check_isolation, normalize_path, ModuleSearchPath};
use crate::manifest::{read_package_manifest, PackageManifest};
use crate::roles::classify;

/// Name of the optional subdirectory holding a package's alpha variant.
pub const ALPHA_DIR: &str = "alpha";

/// A package found by a scan: its manifest, classified role, and location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedPackage {
    /// Absolute package directory (the `alpha` directory when preferred).
    pub location: PathBuf,
    pub manifest: PackageManifest,
    pub role: RoleInfo,
    /// Whether the alpha variant replaced the stable entry point.
    pub alpha: bool,
}

impl ScannedPackage {
    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn version(&self) -> &str {
        &self.manifest.version
    }

    /// Absolute path of the entry module, if the manifest declares one.
    pub fn entry_point(&self) -> Option<PathBuf> {
        self.manifest.main.as_ref().map(|main| self.location.join(main))
    }

    /// Node-platform plugin packages are activated by the backend loader.
    pub fn is_backend_plugin(&self) -> bool {
        self.role.platform == PackagePlatform::Node && self.role.is_plugin
    }

    /// Descriptor for a web-platform package, which is not loaded here.
    pub fn to_frontend(&self) -> Option<FrontendDynamicPlugin> {
        (self.role.platform == PackagePlatform::Web).then(|| FrontendDynamicPlugin {
            name: self.manifest.name.clone(),
            version: self.manifest.version.clone(),
            role: self.role.role,
            location: self.location.clone(),
        })
    }
}

/// Scans one configured plugin root.
#[derive(Debug, Clone)]
pub struct PluginScanner {
    host_root: PathBuf,
    config: DynamicPluginsConfig,
}

impl PluginScanner {
    pub fn new(host_root: impl Into<PathBuf>, config: DynamicPluginsConfig) -> Self {
        Self {
            host_root: host_root.into(),
            config,
        }
    }

    /// The configured root as an absolute, normalised path.
    ///
    /// Relative roots resolve against the host root. `None` when dynamic
    /// plugins are not configured.
    pub fn root_path(&self) -> Option<PathBuf> {
        let root = self.config.root_directory.as_deref()?;
        let root = Path::new(root);
        let absolute = if root.is_absolute() {
            root.to_path_buf()
        } else {
            self.host_root.join(root)
        };
        Some(normalize_path(&absolute))
    }

    /// Scan the root and return one record per package, in file-name order.
    pub async fn scan_root(
        &self,
        search_path: &ModuleSearchPath,
    ) -> Result<Vec<ScannedPackage>, DynplugError> {
        let Some(root) = self.root_path() else {
            debug!("no dynamic plugin root configured");
            return Ok(Vec::new());
        };

        check_isolation(&root, &self.host_root, search_path)?;

        check_root(&root).await?;

        let mut scanned: Vec<ScannedPackage> = Vec::new();
        for home in list_candidates(&root).await? {
            let Some(package) = self.scan_package(&home).await? else {
                continue;
            };

            match scanned.iter_mut().find(|p| p.name() == package.name()) {
                Some(previous) => {
                    warn!(
                        plugin = %package.name(),
                        replaced = %previous.location.display(),
                        location = %package.location.display(),
                        "duplicate dynamic plugin name, keeping the later package"
                    );
                    *previous = package;
                }
                None => scanned.push(package),
            }
        }

        Ok(scanned)
    }

    /// Read one candidate directory. `Ok(None)` skips the package.
    async fn scan_package(&self, home: &Path) -> Result<Option<ScannedPackage>, DynplugError> {
        let manifest = match read_package_manifest(home).await {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!(
                    location = %home.display(),
                    error = %e,
                    "skipping dynamic plugin package with unreadable manifest"
                );
                return Ok(None);
            }
        };

        let role = classify(&manifest.plugin.role)?;
        let stable = ScannedPackage {
            location: home.to_path_buf(),
            manifest,
            role,
            alpha: false,
        };

        if self.config.prefer_alpha && stable.is_backend_plugin() {
            return Ok(Some(self.prefer_alpha(stable).await));
        }
        Ok(Some(stable))
    }

    /// Swap in the `alpha` variant's code while keeping the stable role.
    async fn prefer_alpha(&self, stable: ScannedPackage) -> ScannedPackage {
        let alpha_home = stable.location.join(ALPHA_DIR);
        let is_dir = fs::symlink_metadata(&alpha_home)
            .await
            .is_ok_and(|m| m.is_dir());
        if !is_dir {
            return stable;
        }

        match read_package_manifest(&alpha_home).await {
            Ok(alpha) => {
                debug!(
                    plugin = %stable.name(),
                    location = %alpha_home.display(),
                    "using alpha variant"
                );
                ScannedPackage {
                    location: alpha_home,
                    manifest: PackageManifest {
                        plugin: stable.manifest.plugin,
                        ..alpha
                    },
                    role: stable.role,
                    alpha: true,
                }
            }
            Err(e) => {
                warn!(
                    plugin = %stable.name(),
                    location = %alpha_home.display(),
                    error = %e,
                    "ignoring alpha variant with unreadable manifest"
                );
                stable
            }
        }
    }
}

/// Immediate subdirectories of `root`, plus symlinks whose target is a
/// directory, sorted by file name.
async fn list_candidates(root: &Path) -> Result<Vec<PathBuf>, DynplugError> {
    let mut dir = fs::read_dir(root)
        .await
        .map_err(|e| scan_error(root, e.to_string()))?;

    let mut entries = Vec::new();
    while let Some(entry) = dir
        .next_entry()
        .await
        .map_err(|e| scan_error(root, e.to_string()))?
    {
        entries.push(entry);
    }
    entries.sort_by_key(|entry| entry.file_name());

    let mut candidates = Vec::new();
    for entry in entries {
        let path = entry.path();
        let file_type = match entry.file_type().await {
            Ok(file_type) => file_type,
            Err(e) => {
                debug!(location = %path.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if file_type.is_dir() || (file_type.is_symlink() && symlink_targets_dir(root, &path).await)
        {
            candidates.push(path);
        } else {
            debug!(location = %path.display(), "skipping non-directory entry");
        }
    }
    Ok(candidates)
}

/// The root must be a directory, or a symlink followed once to a directory.
async fn check_root(root: &Path) -> Result<(), DynplugError> {
    let metadata = fs::symlink_metadata(root)
        .await
        .map_err(|e| scan_error(root, e.to_string()))?;
    if metadata.is_dir() {
        return Ok(());
    }
    let base = root.parent().unwrap_or(root);
    if metadata.file_type().is_symlink() && symlink_targets_dir(base, root).await {
        return Ok(());
    }
    Err(scan_error(root, "not a directory"))
}

/// Follow `link` exactly one level and report whether it lands on a directory.
/// Relative targets resolve against `base`, the directory holding the link.
async fn symlink_targets_dir(base: &Path, link: &Path) -> bool {
    let Ok(target) = fs::read_link(link).await else {
        return false;
    };
    let target = if target.is_absolute() {
        target
    } else {
        base.join(target)
    };
    fs::symlink_metadata(&target)
        .await
        .is_ok_and(|m| m.is_dir())
}

fn scan_error(path: &Path, message: impl Into<String>) -> DynplugError {
    DynplugError::Scan {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynplug_core::PackageRole;
    use std::fs as stdfs;
    use tempfile::TempDir;

    struct Tree {
        dir: TempDir,
    }

    impl Tree {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            stdfs::create_dir_all(dir.path().join("plugins")).unwrap();
            Self { dir }
        }

        fn host(&self) -> PathBuf {
            self.dir.path().to_path_buf()
        }

        fn root(&self) -> PathBuf {
            self.dir.path().join("plugins")
        }

        fn package(&self, dir: &str, name: &str, version: &str, role: &str, main: &str) -> PathBuf {
            let home = self.root().join(dir);
            write_manifest(&home, name, version, role, main);
            home
        }

        fn scanner(&self) -> PluginScanner {
            PluginScanner::new(self.host(), DynamicPluginsConfig::with_root("plugins"))
        }
    }

    fn write_manifest(home: &Path, name: &str, version: &str, role: &str, main: &str) {
        stdfs::create_dir_all(home).unwrap();
        let json = serde_json::json!({
            "name": name,
            "version": version,
            "main": main,
            "plugin": { "role": role },
        });
        stdfs::write(home.join("package.json"), json.to_string()).unwrap();
    }

    async fn scan(scanner: &PluginScanner) -> Result<Vec<ScannedPackage>, DynplugError> {
        scanner.scan_root(&ModuleSearchPath::default()).await
    }

    #[tokio::test]
    async fn unconfigured_root_yields_nothing() {
        let tree = Tree::new();
        let scanner = PluginScanner::new(tree.host(), DynamicPluginsConfig::default());
        assert!(scan(&scanner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_root_fails_scan() {
        let tree = Tree::new();
        let scanner = PluginScanner::new(tree.host(), DynamicPluginsConfig::with_root("absent"));
        let err = scan(&scanner).await.unwrap_err();
        assert!(matches!(err, DynplugError::Scan { .. }));
    }

    #[tokio::test]
    async fn file_root_fails_scan() {
        let tree = Tree::new();
        stdfs::write(tree.host().join("not-a-dir"), "x").unwrap();
        let scanner = PluginScanner::new(tree.host(), DynamicPluginsConfig::with_root("not-a-dir"));
        let err = scan(&scanner).await.unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[tokio::test]
    async fn packages_are_returned_in_name_order() {
        let tree = Tree::new();
        tree.package("b-pkg", "b", "1.0.0", "backend-plugin", "lib/b.so");
        tree.package("a-pkg", "a", "1.0.0", "frontend-plugin", "dist/index.js");
        stdfs::write(tree.root().join("README.md"), "docs").unwrap();

        let scanned = scan(&tree.scanner()).await.unwrap();
        let names: Vec<_> = scanned.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(scanned[1].role.role, PackageRole::BackendPlugin);
        assert_eq!(
            scanned[1].entry_point().unwrap(),
            tree.root().join("b-pkg/lib/b.so")
        );
    }

    #[tokio::test]
    async fn unreadable_manifest_skips_package() {
        let tree = Tree::new();
        tree.package("good", "good", "1.0.0", "backend-plugin", "lib/good.so");
        stdfs::create_dir_all(tree.root().join("empty")).unwrap();
        let broken = tree.root().join("broken");
        stdfs::create_dir_all(&broken).unwrap();
        stdfs::write(broken.join("package.json"), "{").unwrap();

        let scanned = scan(&tree.scanner()).await.unwrap();
        assert_eq!(scanned.len(), 1);
        assert_eq!(scanned[0].name(), "good");
    }

    #[tokio::test]
    async fn unknown_role_fails_scan() {
        let tree = Tree::new();
        tree.package("odd", "odd", "1.0.0", "backend-gizmo", "lib/odd.so");
        let err = scan(&tree.scanner()).await.unwrap_err();
        assert!(matches!(err, DynplugError::UnknownRole(ref r) if r == "backend-gizmo"));
    }

    #[tokio::test]
    async fn duplicate_names_keep_the_later_package() {
        let tree = Tree::new();
        tree.package("one", "same", "1.0.0", "backend-plugin", "lib/one.so");
        tree.package("two", "same", "2.0.0", "backend-plugin", "lib/two.so");

        let scanned = scan(&tree.scanner()).await.unwrap();
        assert_eq!(scanned.len(), 1);
        assert_eq!(scanned[0].version(), "2.0.0");
        assert!(scanned[0].location.ends_with("two"));
    }

    #[tokio::test]
    async fn alpha_variant_keeps_stable_role() {
        let tree = Tree::new();
        let home = tree.package("todo", "todo-backend", "1.0.0", "backend-plugin", "lib/stable.so");
        write_manifest(
            &home.join("alpha"),
            "todo-backend",
            "1.1.0-alpha",
            "node-library",
            "lib/alpha.so",
        );

        let scanned = scan(&tree.scanner()).await.unwrap();
        assert_eq!(scanned.len(), 1);
        let package = &scanned[0];
        assert!(package.alpha);
        assert_eq!(package.version(), "1.1.0-alpha");
        assert_eq!(package.manifest.plugin.role, "backend-plugin");
        assert_eq!(package.role.role, PackageRole::BackendPlugin);
        assert_eq!(package.entry_point().unwrap(), home.join("alpha/lib/alpha.so"));
    }

    #[tokio::test]
    async fn alpha_ignored_when_not_preferred_or_not_backend() {
        let tree = Tree::new();
        let backend = tree.package("todo", "todo-backend", "1.0.0", "backend-plugin", "lib/a.so");
        write_manifest(&backend.join("alpha"), "todo-backend", "2.0.0", "backend-plugin", "a.so");
        let web = tree.package("web", "todo", "1.0.0", "frontend-plugin", "dist/index.js");
        write_manifest(&web.join("alpha"), "todo", "2.0.0", "frontend-plugin", "a.js");

        let config = DynamicPluginsConfig {
            prefer_alpha: false,
            ..DynamicPluginsConfig::with_root("plugins")
        };
        let scanned = scan(&PluginScanner::new(tree.host(), config)).await.unwrap();
        assert!(scanned.iter().all(|p| !p.alpha));

        let scanned = scan(&tree.scanner()).await.unwrap();
        let web = scanned.iter().find(|p| p.name() == "todo").unwrap();
        assert!(!web.alpha);
        assert_eq!(web.version(), "1.0.0");
    }

    #[tokio::test]
    async fn alpha_file_instead_of_directory_is_ignored() {
        let tree = Tree::new();
        let home = tree.package("todo", "todo-backend", "1.0.0", "backend-plugin", "lib/a.so");
        stdfs::write(home.join("alpha"), "not a directory").unwrap();
        let scanned = scan(&tree.scanner()).await.unwrap();
        assert!(!scanned[0].alpha);
    }

    #[tokio::test]
    async fn isolation_failure_aborts_scan() {
        let tree = Tree::new();
        let outside = tempfile::tempdir().unwrap();
        let config = DynamicPluginsConfig::with_root(outside.path().display().to_string());
        let scanner = PluginScanner::new(tree.host(), config);
        let err = scan(&scanner).await.unwrap_err();
        assert!(matches!(err, DynplugError::Isolation { .. }));

        let search_path = ModuleSearchPath::new([tree.host().join("lib")]);
        assert!(scanner.scan_root(&search_path).await.unwrap().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinks_are_followed_only_to_directories() {
        use std::os::unix::fs::symlink;

        let tree = Tree::new();
        let elsewhere = tree.host().join("elsewhere");
        write_manifest(&elsewhere, "linked", "1.0.0", "backend-plugin", "lib/l.so");
        stdfs::write(tree.host().join("file.txt"), "x").unwrap();

        symlink(&elsewhere, tree.root().join("linked")).unwrap();
        symlink(tree.host().join("file.txt"), tree.root().join("to-file")).unwrap();
        symlink(tree.host().join("missing"), tree.root().join("dangling")).unwrap();
        symlink("../elsewhere", tree.root().join("relative")).unwrap();

        let scanned = scan(&tree.scanner()).await.unwrap();
        let locations: Vec<_> = scanned
            .iter()
            .map(|p| p.location.file_name().unwrap().to_owned())
            .collect();
        // "linked" and "relative" share a package name; the later one wins.
        assert_eq!(locations, vec![std::ffi::OsString::from("relative")]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn root_symlink_is_followed_once() {
        use std::os::unix::fs::symlink;

        let tree = Tree::new();
        tree.package("todo", "todo", "1.0.0", "backend-plugin", "lib/todo.so");
        stdfs::write(tree.host().join("file.txt"), "x").unwrap();
        symlink("plugins", tree.host().join("linked-root")).unwrap();
        symlink("linked-root", tree.host().join("chained-root")).unwrap();
        symlink(tree.host().join("file.txt"), tree.host().join("file-root")).unwrap();

        let scanner = |root: &str| {
            PluginScanner::new(tree.host(), DynamicPluginsConfig::with_root(root))
        };
        let scanned = scan(&scanner("linked-root")).await.unwrap();
        assert_eq!(scanned.len(), 1);

        for root in ["chained-root", "file-root"] {
            let err = scan(&scanner(root)).await.unwrap_err();
            assert!(err.to_string().contains("not a directory"), "{root}: {err}");
        }
    }

    #[test]
    fn root_path_resolution() {
        let scanner = PluginScanner::new("/srv/host", DynamicPluginsConfig::with_root("./plugins/../dyn"));
        assert_eq!(scanner.root_path(), Some(PathBuf::from("/srv/host/dyn")));

        let scanner = PluginScanner::new("/srv/host", DynamicPluginsConfig::with_root("/opt/dyn"));
        assert_eq!(scanner.root_path(), Some(PathBuf::from("/opt/dyn")));
    }
}
