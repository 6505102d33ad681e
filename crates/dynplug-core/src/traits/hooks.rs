// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extension-point callbacks carried by a legacy installer.
//!
//! Each hook is independently optional. The host calls the ones a plugin
//! provides while it wires its subsystems, passing the shared
//! [`PluginEnvironment`].

use async_trait::async_trait;

use crate::environment::PluginEnvironment;
use crate::error::DynplugError;
use crate::types::{
    CatalogBuilder, EventsBackend, HttpPostIngressOptions, IndexBuilder, PermissionRequest,
    PolicyDecision, Router, TaskSchedule, TemplateAction,
};

/// Builds the HTTP router a plugin is mounted under.
#[async_trait]
pub trait RouterHook: Send + Sync {
    /// Identifier the router is mounted as (`/api/<plugin_id>`).
    fn plugin_id(&self) -> &str;

    async fn create_router(&self, env: &PluginEnvironment) -> Result<Router, DynplugError>;
}

/// Adds entity providers or processors to the host catalog.
pub trait CatalogHook: Send + Sync {
    fn extend(&self, builder: &mut CatalogBuilder, env: &PluginEnvironment);
}

/// Contributes scaffolder template actions.
pub trait ScaffolderHook: Send + Sync {
    fn actions(&self, env: &PluginEnvironment) -> Vec<TemplateAction>;
}

/// Registers search collators on the host index.
pub trait SearchHook: Send + Sync {
    fn register(&self, index: &mut IndexBuilder, schedule: &TaskSchedule, env: &PluginEnvironment);
}

/// Subscribes to host events and requests HTTP ingresses.
pub trait EventsHook: Send + Sync {
    fn ingresses(
        &self,
        events: &mut EventsBackend,
        env: &PluginEnvironment,
    ) -> Vec<HttpPostIngressOptions>;
}

/// A permission policy supplied by a plugin.
#[async_trait]
pub trait PermissionPolicy: Send + Sync {
    async fn handle(&self, request: &PermissionRequest) -> PolicyDecision;
}
