// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the scanner, loader, registry, and plugins.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Where a package runs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PackagePlatform {
    /// Loaded and executed inside the host backend process.
    Node,
    /// Activated separately by a browser-side host.
    Web,
}

/// The closed vocabulary of package roles.
///
/// The table is authoritative: a role string outside it fails to parse.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PackageRole {
    Frontend,
    Backend,
    Cli,
    WebLibrary,
    NodeLibrary,
    FrontendPlugin,
    FrontendPluginModule,
    BackendPlugin,
    BackendPluginModule,
}

/// Classification of a role: its platform and whether it is a plugin role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleInfo {
    pub role: PackageRole,
    pub platform: PackagePlatform,
    pub is_plugin: bool,
}

impl PackageRole {
    /// Every role in the table, in declaration order.
    pub const ALL: [PackageRole; 9] = [
        PackageRole::Frontend,
        PackageRole::Backend,
        PackageRole::Cli,
        PackageRole::WebLibrary,
        PackageRole::NodeLibrary,
        PackageRole::FrontendPlugin,
        PackageRole::FrontendPluginModule,
        PackageRole::BackendPlugin,
        PackageRole::BackendPluginModule,
    ];

    /// Look up the platform and plugin flag for this role.
    pub fn info(self) -> RoleInfo {
        let (platform, is_plugin) = match self {
            PackageRole::Frontend => (PackagePlatform::Web, false),
            PackageRole::Backend => (PackagePlatform::Node, false),
            PackageRole::Cli => (PackagePlatform::Node, false),
            PackageRole::WebLibrary => (PackagePlatform::Web, false),
            PackageRole::NodeLibrary => (PackagePlatform::Node, false),
            PackageRole::FrontendPlugin => (PackagePlatform::Web, true),
            PackageRole::FrontendPluginModule => (PackagePlatform::Web, true),
            PackageRole::BackendPlugin => (PackagePlatform::Node, true),
            PackageRole::BackendPluginModule => (PackagePlatform::Node, true),
        };
        RoleInfo {
            role: self,
            platform,
            is_plugin,
        }
    }
}

// --- Extension-point values handed to and returned from installer hooks ---

/// An HTTP router produced by a legacy router hook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Router {
    pub plugin_id: String,
    pub routes: Vec<String>,
}

impl Router {
    pub fn new(plugin_id: impl Into<String>) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            routes: Vec::new(),
        }
    }

    pub fn route(mut self, path: impl Into<String>) -> Self {
        self.routes.push(path.into());
        self
    }
}

/// Host catalog builder that catalog hooks extend.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    pub entity_providers: Vec<String>,
    pub processors: Vec<String>,
}

impl CatalogBuilder {
    pub fn add_entity_provider(&mut self, name: impl Into<String>) {
        self.entity_providers.push(name.into());
    }

    pub fn add_processor(&mut self, name: impl Into<String>) {
        self.processors.push(name.into());
    }
}

/// A scaffolder template action contributed by a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateAction {
    pub id: String,
    pub description: String,
}

/// Host search index builder that search hooks register collators with.
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    pub collators: Vec<String>,
}

impl IndexBuilder {
    pub fn add_collator(&mut self, name: impl Into<String>) {
        self.collators.push(name.into());
    }
}

/// Schedule a search hook should run its collators on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSchedule {
    pub frequency: Duration,
    pub timeout: Duration,
}

/// Host events backend that events hooks subscribe to.
#[derive(Debug, Clone, Default)]
pub struct EventsBackend {
    pub subscribers: Vec<String>,
}

impl EventsBackend {
    pub fn subscribe(&mut self, name: impl Into<String>) {
        self.subscribers.push(name.into());
    }
}

/// An HTTP ingress an events hook asks the host to expose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpPostIngressOptions {
    pub topic: String,
}

/// A permission check evaluated by a plugin-provided policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequest {
    pub permission: String,
    pub user: Option<String>,
}

/// Outcome of a permission policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Deny,
    Conditional,
}

/// Kind of backend feature returned by a new-style installer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum FeatureKind {
    Plugin,
    Module,
    Service,
}

/// An opaque backend feature descriptor; the host decides how to start it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendFeature {
    pub id: String,
    pub kind: FeatureKind,
}

impl BackendFeature {
    pub fn new(id: impl Into<String>, kind: FeatureKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}
