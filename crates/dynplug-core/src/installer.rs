// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Installer contracts a backend plugin module exports.
//!
//! Two shapes exist: the legacy multi-hook bag and the new single
//! `install()` entry point. They are modelled as one tagged union,
//! [`BackendInstaller`], so the host pattern-matches on the tag instead of
//! probing for individual hooks.
//!
//! A module hands the host an [`InstallerExport`]: the raw, unvalidated
//! value carrying a `kind` discriminator. The loader validates it into a
//! [`BackendInstaller`] or rejects the module.

use std::fmt;
use std::sync::Arc;

use strum::{Display, EnumString};

use crate::traits::hooks::{
    CatalogHook, EventsHook, PermissionPolicy, RouterHook, ScaffolderHook, SearchHook,
};
use crate::traits::installer::FeatureInstaller;

/// Discriminator of the two recognised installer shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum InstallerKind {
    Legacy,
    New,
}

/// Permission settings a legacy plugin may contribute.
#[derive(Clone, Default)]
pub struct PermissionsHook {
    pub policy: Option<Arc<dyn PermissionPolicy>>,
}

/// The legacy installer: any subset of named extension-point hooks.
#[derive(Clone, Default)]
pub struct LegacyInstaller {
    pub router: Option<Arc<dyn RouterHook>>,
    pub catalog: Option<Arc<dyn CatalogHook>>,
    pub scaffolder: Option<Arc<dyn ScaffolderHook>>,
    pub search: Option<Arc<dyn SearchHook>>,
    pub events: Option<Arc<dyn EventsHook>>,
    pub permissions: Option<PermissionsHook>,
}

impl LegacyInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_router(mut self, hook: impl RouterHook + 'static) -> Self {
        self.router = Some(Arc::new(hook));
        self
    }

    pub fn with_catalog(mut self, hook: impl CatalogHook + 'static) -> Self {
        self.catalog = Some(Arc::new(hook));
        self
    }

    pub fn with_scaffolder(mut self, hook: impl ScaffolderHook + 'static) -> Self {
        self.scaffolder = Some(Arc::new(hook));
        self
    }

    pub fn with_search(mut self, hook: impl SearchHook + 'static) -> Self {
        self.search = Some(Arc::new(hook));
        self
    }

    pub fn with_events(mut self, hook: impl EventsHook + 'static) -> Self {
        self.events = Some(Arc::new(hook));
        self
    }

    pub fn with_permission_policy(mut self, policy: impl PermissionPolicy + 'static) -> Self {
        self.permissions = Some(PermissionsHook {
            policy: Some(Arc::new(policy)),
        });
        self
    }

    /// Names of the hooks this installer provides, in a fixed order.
    pub fn hook_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.router.is_some() {
            names.push("router");
        }
        if self.catalog.is_some() {
            names.push("catalog");
        }
        if self.scaffolder.is_some() {
            names.push("scaffolder");
        }
        if self.search.is_some() {
            names.push("search");
        }
        if self.events.is_some() {
            names.push("events");
        }
        if self.permissions.is_some() {
            names.push("permissions");
        }
        names
    }
}

impl fmt::Debug for LegacyInstaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyInstaller")
            .field("hooks", &self.hook_names())
            .finish()
    }
}

/// A validated installer of one of the two recognised shapes.
#[derive(Clone)]
pub enum BackendInstaller {
    Legacy(LegacyInstaller),
    New(Arc<dyn FeatureInstaller>),
}

impl BackendInstaller {
    pub fn kind(&self) -> InstallerKind {
        match self {
            BackendInstaller::Legacy(_) => InstallerKind::Legacy,
            BackendInstaller::New(_) => InstallerKind::New,
        }
    }

    pub fn new_style(installer: impl FeatureInstaller) -> Self {
        BackendInstaller::New(Arc::new(installer))
    }
}

impl fmt::Debug for BackendInstaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendInstaller::Legacy(legacy) => f.debug_tuple("Legacy").field(legacy).finish(),
            BackendInstaller::New(_) => f.write_str("New(..)"),
        }
    }
}

/// Symbol a native plugin library exports its installer constructor under.
pub const INSTALLER_SYMBOL: &str = "dynamic_plugin_installer";

/// Signature of the exported installer constructor.
///
/// This is a Rust-ABI function: the plugin library must be built by the
/// same compiler as the host.
pub type InstallerConstructor = fn() -> InstallerExport;

/// Export an installer constructor from a plugin library.
///
/// ```ignore
/// fn installer() -> dynplug_core::InstallerExport {
///     dynplug_core::InstallerExport::legacy(dynplug_core::LegacyInstaller::new())
/// }
///
/// dynplug_core::export_installer!(installer);
/// ```
#[macro_export]
macro_rules! export_installer {
    ($constructor:path) => {
        #[unsafe(no_mangle)]
        pub fn dynamic_plugin_installer() -> $crate::InstallerExport {
            $constructor()
        }
    };
}

/// The raw installer value a plugin module exports.
///
/// `kind` is a free-form string so that a module built against a newer or
/// older contract can still be inspected and rejected cleanly.
#[derive(Clone, Default)]
pub struct InstallerExport {
    pub kind: String,
    pub legacy: Option<LegacyInstaller>,
    pub features: Option<Arc<dyn FeatureInstaller>>,
}

impl InstallerExport {
    /// Export a legacy installer.
    pub fn legacy(installer: LegacyInstaller) -> Self {
        Self {
            kind: InstallerKind::Legacy.to_string(),
            legacy: Some(installer),
            features: None,
        }
    }

    /// Export a new-style installer.
    pub fn features(installer: impl FeatureInstaller) -> Self {
        Self {
            kind: InstallerKind::New.to_string(),
            legacy: None,
            features: Some(Arc::new(installer)),
        }
    }
}

impl fmt::Debug for InstallerExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallerExport")
            .field("kind", &self.kind)
            .field("legacy", &self.legacy)
            .field("features", &self.features.is_some())
            .finish()
    }
}
