// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The shared service bundle handed to legacy installer hooks.

use std::fmt;
use std::sync::Arc;

use crate::traits::provider::{BackendPluginProvider, PluginDiscovery};

/// Host services a legacy hook may use while it is wired.
#[derive(Clone)]
pub struct PluginEnvironment {
    /// Identifier of the plugin the environment was built for.
    pub plugin_id: String,
    /// The plugin's slice of host configuration.
    pub config: Arc<serde_json::Value>,
    pub discovery: Arc<dyn PluginDiscovery>,
    pub plugin_provider: Arc<dyn BackendPluginProvider>,
}

impl PluginEnvironment {
    pub fn new(
        plugin_id: impl Into<String>,
        config: serde_json::Value,
        discovery: Arc<dyn PluginDiscovery>,
        plugin_provider: Arc<dyn BackendPluginProvider>,
    ) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            config: Arc::new(config),
            discovery,
            plugin_provider,
        }
    }

    /// A tracing span scoped to this plugin; hooks log inside it.
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!("plugin", plugin = %self.plugin_id)
    }

    /// This plugin's own base URL.
    pub fn base_url(&self) -> String {
        self.discovery.base_url(&self.plugin_id)
    }
}

impl fmt::Debug for PluginEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginEnvironment")
            .field("plugin_id", &self.plugin_id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
