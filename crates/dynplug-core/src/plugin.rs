// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin descriptors held by the registry.

use std::any::Any;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::installer::BackendInstaller;
use crate::types::{PackagePlatform, PackageRole};

/// Opaque handle to the module an installer came from.
///
/// For natively loaded plugins this refers to the dynamic library, which the
/// native loader keeps mapped for the life of the process.
#[derive(Clone)]
pub struct ModuleHandle(Arc<dyn Any + Send + Sync>);

impl ModuleHandle {
    pub fn new(inner: impl Any + Send + Sync) -> Self {
        Self(Arc::new(inner))
    }
}

impl fmt::Debug for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ModuleHandle")
    }
}

/// A plugin that runs in the host backend process.
pub struct BackendDynamicPlugin {
    pub name: String,
    pub version: String,
    pub role: PackageRole,
    pub installer: BackendInstaller,
    location: Option<PathBuf>,
    module: Option<ModuleHandle>,
}

impl BackendDynamicPlugin {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        role: PackageRole,
        installer: BackendInstaller,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            role,
            installer,
            location: None,
            module: None,
        }
    }

    /// Record the package directory the plugin was loaded from.
    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Attach the handle that keeps the plugin's module loaded.
    pub fn with_module(mut self, module: ModuleHandle) -> Self {
        self.module = Some(module);
        self
    }

    pub fn platform(&self) -> PackagePlatform {
        PackagePlatform::Node
    }

    /// Package directory, or `None` for plugins added by the host itself.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }
}

impl fmt::Debug for BackendDynamicPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendDynamicPlugin")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("role", &self.role)
            .field("installer", &self.installer)
            .field("location", &self.location)
            .field("module", &self.module.is_some())
            .finish()
    }
}

/// A plugin activated by the browser-side host; carries no installer here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendDynamicPlugin {
    pub name: String,
    pub version: String,
    pub role: PackageRole,
    pub location: PathBuf,
}

impl FrontendDynamicPlugin {
    pub fn platform(&self) -> PackagePlatform {
        PackagePlatform::Web
    }
}

/// Any descriptor the registry holds.
#[derive(Debug, Clone)]
pub enum DynamicPlugin {
    Backend(Arc<BackendDynamicPlugin>),
    Frontend(FrontendDynamicPlugin),
}

impl DynamicPlugin {
    pub fn name(&self) -> &str {
        match self {
            DynamicPlugin::Backend(p) => &p.name,
            DynamicPlugin::Frontend(p) => &p.name,
        }
    }

    pub fn version(&self) -> &str {
        match self {
            DynamicPlugin::Backend(p) => &p.version,
            DynamicPlugin::Frontend(p) => &p.version,
        }
    }

    pub fn role(&self) -> PackageRole {
        match self {
            DynamicPlugin::Backend(p) => p.role,
            DynamicPlugin::Frontend(p) => p.role,
        }
    }

    pub fn platform(&self) -> PackagePlatform {
        match self {
            DynamicPlugin::Backend(p) => p.platform(),
            DynamicPlugin::Frontend(p) => p.platform(),
        }
    }

    pub fn as_backend(&self) -> Option<&Arc<BackendDynamicPlugin>> {
        match self {
            DynamicPlugin::Backend(p) => Some(p),
            DynamicPlugin::Frontend(_) => None,
        }
    }
}

impl From<BackendDynamicPlugin> for DynamicPlugin {
    fn from(plugin: BackendDynamicPlugin) -> Self {
        DynamicPlugin::Backend(Arc::new(plugin))
    }
}

impl From<FrontendDynamicPlugin> for DynamicPlugin {
    fn from(plugin: FrontendDynamicPlugin) -> Self {
        DynamicPlugin::Frontend(plugin)
    }
}
